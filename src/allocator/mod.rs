/*!

Bipartite matchers used by the allocation stages of the router pipeline.

An allocator receives requests from clients (input lines) for resources (output lines) and computes a matching in which every client holds at most one resource and every resource is held by at most one client. Ties are broken deterministically by each variant; the only mutable arbitration state are explicit rotation pointers.

* [SeparableInputFirst](separable::SeparableInputFirst): one arbitration per client followed by one per resource, with round-robin or priority arbiters.
* [Wavefront](wavefront::Wavefront): grants along diagonals of the request table, the starting diagonal rotating every round.
* [PrioWavefront](wavefront::PrioWavefront): as Wavefront, visiting diagonals in descending priority order.

*/

pub mod separable;
pub mod wavefront;

use ::rand::rngs::StdRng;

use crate::config_parser::ConfigurationValue;
use crate::error::{Error,SourceLocation};
use crate::matrix::Matrix;
use crate::{error,source_location,Plugs};
use self::separable::{SeparableInputFirst,ArbiterKind};
use self::wavefront::{Wavefront,PrioWavefront};

///A request from a client for a resource, alive for one allocation round.
#[derive(Clone,Copy,Debug)]
pub struct Request
{
	///The input line asking.
	pub client: usize,
	///The output line asked for.
	pub resource: usize,
	///An opaque tag given back by `read_request` after allocation.
	///The router uses it to recover which virtual channel an expanded input line was bidding for.
	pub label: i32,
	///Priority on the client side, e.g. as given by the routing function to each candidate.
	pub client_priority: i32,
	///Priority on the resource side, e.g. the priority of the requesting packet.
	pub resource_priority: i32,
}

///The set of requests granted in an allocation round.
#[derive(Default)]
pub struct GrantedRequests
{
	granted_requests: Vec<Request>,
}

impl GrantedRequests
{
	pub fn add_granted_request(&mut self, request:Request)
	{
		self.granted_requests.push(request);
	}
	pub fn iter(&self) -> std::slice::Iter<Request>
	{
		self.granted_requests.iter()
	}
	pub fn len(&self) -> usize
	{
		self.granted_requests.len()
	}
	pub fn is_empty(&self) -> bool
	{
		self.granted_requests.is_empty()
	}
}

///The dense request table shared by the allocator variants.
///At most one request is kept per (client,resource) pair; a later request replaces the
///stored one only when its client priority strictly dominates.
pub struct RequestTable
{
	requests: Matrix<Option<Request>>,
}

impl RequestTable
{
	pub fn new(num_clients:usize, num_resources:usize) -> RequestTable
	{
		RequestTable{
			requests: Matrix::constant(None,num_clients,num_resources),
		}
	}
	pub fn num_clients(&self) -> usize
	{
		self.requests.num_rows()
	}
	pub fn num_resources(&self) -> usize
	{
		self.requests.num_columns()
	}
	pub fn clear(&mut self)
	{
		self.requests.fill(None);
	}
	pub fn add(&mut self, request:Request)
	{
		if request.client>=self.num_clients() || request.resource>=self.num_resources()
		{
			panic!("The request is not valid: client={} resource={} table is {}x{}",request.client,request.resource,self.num_clients(),self.num_resources());
		}
		let replace=match self.requests.get(request.client,request.resource)
		{
			Some(previous) => request.client_priority>previous.client_priority,
			None => true,
		};
		if replace
		{
			*self.requests.get_mut(request.client,request.resource)=Some(request);
		}
	}
	pub fn get(&self, client:usize, resource:usize) -> Option<&Request>
	{
		self.requests.get(client,resource).as_ref()
	}
}

///The interface of the bipartite matchers.
///`clear` begins a round, requests are added, and `perform_allocation` computes the matching,
///which stays queryable until the next `clear`.
pub trait Allocator
{
	///Drop every pending request and the matching of the previous round.
	fn clear(&mut self);
	///Record a request. A request for a (client,resource) pair already requested replaces
	///the previous one only if its client priority strictly dominates.
	fn add_request(&mut self, request:Request);
	///Compute the matching for the current requests.
	///The rng is part of the signature for variants that could want it; the provided ones
	///are deterministic and only their rotation pointers change between rounds.
	fn perform_allocation(&mut self, rng:&mut StdRng) -> GrantedRequests;
	///The client granted the given resource in the last round, if any.
	fn client_assigned(&self, resource:usize) -> Option<usize>;
	///The resource granted to the given client in the last round, if any.
	fn resource_assigned(&self, client:usize) -> Option<usize>;
	///Recover the request stored for a (client,resource) pair, to read back its label.
	fn read_request(&self, client:usize, resource:usize) -> Option<Request>;
}

///Helper structure to build an allocator.
pub struct AllocatorBuilderArgument<'a>
{
	///A ConfigurationValue::Object defining the allocator.
	pub cv: &'a ConfigurationValue,
	///The number of input lines.
	pub num_clients: usize,
	///The number of output lines.
	pub num_resources: usize,
	///The user defined plugs. In case the allocator needs to create elements.
	pub plugs: &'a Plugs,
}

///Creates an allocator from a configuration value.
pub fn new_allocator(arg:AllocatorBuilderArgument) -> Result<Box<dyn Allocator>,Error>
{
	if let &ConfigurationValue::Object(ref cv_name, ref _cv_pairs)=arg.cv
	{
		if let Some(builder) = arg.plugs.allocators.get(cv_name)
		{
			return builder(arg);
		}
		match cv_name.as_ref()
		{
			"SeparableInputFirst" => Ok(Box::new(SeparableInputFirst::new(arg)?)),
			"Wavefront" => Ok(Box::new(Wavefront::new(arg)?)),
			"PrioWavefront" => Ok(Box::new(PrioWavefront::new(arg)?)),
			_ => Err(error!(unknown_policy,"allocator".to_string(),cv_name.to_string())),
		}
	}
	else
	{
		Err(error!(ill_formed_configuration,arg.cv.clone()).with_message("Trying to create an allocator from a non-Object".to_string()))
	}
}

///Creates an allocator from the flat `(variant name, arbiter name)` pair used by the router
///configuration keys, such as `vc_allocator` together with `vc_alloc_arb_type`.
pub fn new_allocator_by_name(name:&str, arb_type:&str, num_clients:usize, num_resources:usize) -> Result<Box<dyn Allocator>,Error>
{
	let arbiter = ArbiterKind::from_name(arb_type)?;
	match name
	{
		"separable_input_first" => Ok(Box::new(SeparableInputFirst::with_size(num_clients,num_resources,arbiter)?)),
		"wavefront" => Ok(Box::new(Wavefront::with_size(num_clients,num_resources)?)),
		"prio_wavefront" => Ok(Box::new(PrioWavefront::with_size(num_clients,num_resources)?)),
		_ => Err(error!(unknown_policy,"allocator".to_string(),name.to_string())),
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use ::rand::SeedableRng;

	fn request(client:usize, resource:usize) -> Request
	{
		Request{client,resource,label:0,client_priority:0,resource_priority:0}
	}

	///Every variant must answer all-unassigned after a `clear` followed by an empty round.
	#[test]
	fn clear_then_empty_allocation_assigns_nothing()
	{
		let mut rng=StdRng::seed_from_u64(1);
		for name in ["separable_input_first","wavefront","prio_wavefront"]
		{
			let mut allocator=new_allocator_by_name(name,"round_robin",3,3).expect("the variant exists");
			allocator.add_request(request(0,1));
			allocator.add_request(request(2,2));
			allocator.perform_allocation(&mut rng);
			allocator.clear();
			let granted=allocator.perform_allocation(&mut rng);
			assert!(granted.is_empty(),"{} granted something from nothing",name);
			for line in 0..3
			{
				assert_eq!(allocator.client_assigned(line),None,"{}",name);
				assert_eq!(allocator.resource_assigned(line),None,"{}",name);
			}
		}
	}

	///The matching must be one to one for every variant under a dense conflicting load.
	#[test]
	fn matching_is_one_to_one()
	{
		let mut rng=StdRng::seed_from_u64(1);
		for name in ["separable_input_first","wavefront","prio_wavefront"]
		{
			let mut allocator=new_allocator_by_name(name,"round_robin",4,4).expect("the variant exists");
			for round in 0..10
			{
				allocator.clear();
				for client in 0..4
				{
					for resource in 0..4
					{
						if (client+resource+round)%2==0
						{
							allocator.add_request(request(client,resource));
						}
					}
				}
				let granted=allocator.perform_allocation(&mut rng);
				let mut clients_seen=[false;4];
				let mut resources_seen=[false;4];
				for req in granted.iter()
				{
					assert!(!clients_seen[req.client],"{} granted client {} twice",name,req.client);
					assert!(!resources_seen[req.resource],"{} granted resource {} twice",name,req.resource);
					clients_seen[req.client]=true;
					resources_seen[req.resource]=true;
					assert_eq!(allocator.resource_assigned(req.client),Some(req.resource));
					assert_eq!(allocator.client_assigned(req.resource),Some(req.client));
				}
			}
		}
	}

	///A repeated request only replaces the stored one on strictly greater client priority.
	#[test]
	fn request_replacement_needs_strict_dominance()
	{
		let mut table=RequestTable::new(2,2);
		table.add(Request{client:0,resource:0,label:1,client_priority:5,resource_priority:0});
		table.add(Request{client:0,resource:0,label:2,client_priority:5,resource_priority:0});
		assert_eq!(table.get(0,0).expect("stored").label,1);
		table.add(Request{client:0,resource:0,label:3,client_priority:6,resource_priority:0});
		assert_eq!(table.get(0,0).expect("stored").label,3);
	}
}
