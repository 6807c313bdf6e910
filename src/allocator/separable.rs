/*!

A separable input-first allocator.

The matching is computed in two arbitration waves. First each client elects one of its own requests; then each resource elects one among the clients that pointed at it. Each wave favors the highest priority of its side and breaks ties with a rotating pointer. A pointer advances only past a position that actually got granted, which keeps every persistent requester eventually served.

*/

use ::rand::rngs::StdRng;

use crate::allocator::{Allocator,AllocatorBuilderArgument,GrantedRequests,Request,RequestTable};
use crate::config_parser::ConfigurationValue;
use crate::error::{Error,SourceLocation};
use crate::{error,source_location,match_object_panic};

///The tie-break policy of both arbitration waves.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum ArbiterKind
{
	///Only the rotating pointer decides.
	RoundRobin,
	///Highest priority first, rotating pointer among equals.
	Priority,
}

impl ArbiterKind
{
	pub fn from_name(name:&str) -> Result<ArbiterKind,Error>
	{
		match name
		{
			"round_robin" => Ok(ArbiterKind::RoundRobin),
			"priority" => Ok(ArbiterKind::Priority),
			_ => Err(error!(unknown_policy,"arbiter".to_string(),name.to_string())),
		}
	}
}

pub struct SeparableInputFirst
{
	arbiter: ArbiterKind,
	table: RequestTable,
	///Rotation pointer of each client over the resources.
	client_pointer: Vec<usize>,
	///Rotation pointer of each resource over the clients.
	resource_pointer: Vec<usize>,
	///`client_match[client]` is the resource granted to the client.
	client_match: Vec<Option<usize>>,
	///`resource_match[resource]` is the client the resource was granted to.
	resource_match: Vec<Option<usize>>,
}

impl SeparableInputFirst
{
	pub fn new(arg:AllocatorBuilderArgument) -> Result<SeparableInputFirst,Error>
	{
		let mut arbiter=ArbiterKind::RoundRobin;
		match_object_panic!(arg.cv,"SeparableInputFirst",value,
			"arbiter" => arbiter=ArbiterKind::from_name(value.as_str().expect("bad value for arbiter"))?,
		);
		SeparableInputFirst::with_size(arg.num_clients,arg.num_resources,arbiter)
	}
	pub fn with_size(num_clients:usize, num_resources:usize, arbiter:ArbiterKind) -> Result<SeparableInputFirst,Error>
	{
		if num_clients==0 || num_resources==0
		{
			return Err(error!(out_of_range,"num_clients/num_resources".to_string()));
		}
		Ok(SeparableInputFirst{
			arbiter,
			table: RequestTable::new(num_clients,num_resources),
			client_pointer: vec![0;num_clients],
			resource_pointer: vec![0;num_resources],
			client_match: vec![None;num_clients],
			resource_match: vec![None;num_resources],
		})
	}
	///The priority actually arbitrated with; the round-robin arbiter flattens them all.
	fn effective_priority(&self, priority:i32) -> i32
	{
		match self.arbiter
		{
			ArbiterKind::RoundRobin => 0,
			ArbiterKind::Priority => priority,
		}
	}
}

impl Allocator for SeparableInputFirst
{
	fn clear(&mut self)
	{
		self.table.clear();
		for entry in self.client_match.iter_mut()
		{
			*entry=None;
		}
		for entry in self.resource_match.iter_mut()
		{
			*entry=None;
		}
	}
	fn add_request(&mut self, request:Request)
	{
		self.table.add(request);
	}
	fn perform_allocation(&mut self, _rng:&mut StdRng) -> GrantedRequests
	{
		let num_clients=self.table.num_clients();
		let num_resources=self.table.num_resources();
		for entry in self.client_match.iter_mut()
		{
			*entry=None;
		}
		for entry in self.resource_match.iter_mut()
		{
			*entry=None;
		}
		//First wave: each client elects one of its requests.
		//Key is (priority, closeness to the rotating pointer).
		let elected:Vec<Option<usize>> = (0..num_clients).map(|client|{
			let pointer=self.client_pointer[client];
			let mut best:Option<(i32,usize,usize)>=None;
			for resource in 0..num_resources
			{
				if let Some(request)=self.table.get(client,resource)
				{
					let priority=self.effective_priority(request.client_priority);
					let distance=(resource+num_resources-pointer)%num_resources;
					let better=match best
					{
						None => true,
						Some((best_priority,best_distance,_)) => priority>best_priority || (priority==best_priority && distance<best_distance),
					};
					if better
					{
						best=Some((priority,distance,resource));
					}
				}
			}
			best.map(|(_,_,resource)|resource)
		}).collect();
		//Second wave: each resource elects one among the clients that pointed at it.
		let mut granted=GrantedRequests::default();
		for resource in 0..num_resources
		{
			let pointer=self.resource_pointer[resource];
			let mut best:Option<(i32,usize,usize)>=None;
			for client in 0..num_clients
			{
				if elected[client]==Some(resource)
				{
					let request=self.table.get(client,resource).expect("an elected request is in the table");
					let priority=self.effective_priority(request.resource_priority);
					let distance=(client+num_clients-pointer)%num_clients;
					let better=match best
					{
						None => true,
						Some((best_priority,best_distance,_)) => priority>best_priority || (priority==best_priority && distance<best_distance),
					};
					if better
					{
						best=Some((priority,distance,client));
					}
				}
			}
			if let Some((_,_,client))=best
			{
				self.client_match[client]=Some(resource);
				self.resource_match[resource]=Some(client);
				granted.add_granted_request(*self.table.get(client,resource).expect("an elected request is in the table"));
				//Pointers advance only past granted positions.
				self.client_pointer[client]=(resource+1)%num_resources;
				self.resource_pointer[resource]=(client+1)%num_clients;
			}
		}
		granted
	}
	fn client_assigned(&self, resource:usize) -> Option<usize>
	{
		self.resource_match[resource]
	}
	fn resource_assigned(&self, client:usize) -> Option<usize>
	{
		self.client_match[client]
	}
	fn read_request(&self, client:usize, resource:usize) -> Option<Request>
	{
		self.table.get(client,resource).copied()
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use ::rand::SeedableRng;

	fn request(client:usize, resource:usize, client_priority:i32, resource_priority:i32) -> Request
	{
		Request{client,resource,label:0,client_priority,resource_priority}
	}

	///Two clients fighting for the same resource alternate across rounds.
	#[test]
	fn persistent_conflict_alternates()
	{
		let mut rng=StdRng::seed_from_u64(1);
		let mut allocator=SeparableInputFirst::with_size(2,2,ArbiterKind::RoundRobin).expect("valid sizes");
		let mut winners=vec![];
		for _round in 0..4
		{
			allocator.clear();
			allocator.add_request(request(0,0,0,0));
			allocator.add_request(request(1,0,0,0));
			allocator.perform_allocation(&mut rng);
			winners.push(allocator.client_assigned(0).expect("some client wins"));
		}
		assert_eq!(winners,vec![0,1,0,1]);
	}

	///With the priority arbiter the client side elects its highest priority request.
	#[test]
	fn priority_elects_best_request()
	{
		let mut rng=StdRng::seed_from_u64(1);
		let mut allocator=SeparableInputFirst::with_size(2,3,ArbiterKind::Priority).expect("valid sizes");
		allocator.clear();
		allocator.add_request(request(0,0,1,0));
		allocator.add_request(request(0,2,7,0));
		allocator.perform_allocation(&mut rng);
		assert_eq!(allocator.resource_assigned(0),Some(2));
	}

	///With the priority arbiter the resource side favors the highest resource priority.
	#[test]
	fn priority_beats_rotation_on_resources()
	{
		let mut rng=StdRng::seed_from_u64(1);
		let mut allocator=SeparableInputFirst::with_size(2,1,ArbiterKind::Priority).expect("valid sizes");
		for _round in 0..3
		{
			allocator.clear();
			allocator.add_request(request(0,0,0,1));
			allocator.add_request(request(1,0,0,9));
			allocator.perform_allocation(&mut rng);
			assert_eq!(allocator.client_assigned(0),Some(1));
		}
	}

	///A loser does not move its pointer; it keeps first claim on the next chance.
	#[test]
	fn pointers_only_advance_on_grant()
	{
		let mut rng=StdRng::seed_from_u64(1);
		let mut allocator=SeparableInputFirst::with_size(3,1,ArbiterKind::RoundRobin).expect("valid sizes");
		//Client 2 requests every round. Clients 0 and 1 only at the first one.
		allocator.clear();
		allocator.add_request(request(0,0,0,0));
		allocator.add_request(request(1,0,0,0));
		allocator.add_request(request(2,0,0,0));
		allocator.perform_allocation(&mut rng);
		assert_eq!(allocator.client_assigned(0),Some(0));
		allocator.clear();
		allocator.add_request(request(1,0,0,0));
		allocator.add_request(request(2,0,0,0));
		allocator.perform_allocation(&mut rng);
		assert_eq!(allocator.client_assigned(0),Some(1));
		allocator.clear();
		allocator.add_request(request(2,0,0,0));
		allocator.perform_allocation(&mut rng);
		assert_eq!(allocator.client_assigned(0),Some(2));
	}
}
