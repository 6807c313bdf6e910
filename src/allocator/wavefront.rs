/*!

Wavefront allocators.

The request table is swept by diagonals. Along a diagonal every request whose client and resource are both still free is granted, so no two grants of a diagonal can ever conflict. [Wavefront] visits the diagonals in rotating order, moving the starting diagonal by one every round. [PrioWavefront] visits them in descending order of the best client priority they contain, using the rotation only to break ties.

Diagonals wrap: diagonal d holds the cells `(i,(d+i) mod num_resources)`, so `num_resources` diagonals cover the whole table for any shape.

*/

use ::rand::rngs::StdRng;

use crate::allocator::{Allocator,AllocatorBuilderArgument,GrantedRequests,Request,RequestTable};
use crate::config_parser::ConfigurationValue;
use crate::error::{Error,SourceLocation};
use crate::{error,source_location,match_object_panic};

///Grant every request of diagonal `diagonal` whose endpoints are both unclaimed.
fn sweep_diagonal(table:&RequestTable, diagonal:usize, client_match:&mut [Option<usize>], resource_match:&mut [Option<usize>], granted:&mut GrantedRequests)
{
	let num_resources=table.num_resources();
	for client in 0..table.num_clients()
	{
		let resource=(diagonal+client)%num_resources;
		if client_match[client].is_none() && resource_match[resource].is_none()
		{
			if let Some(request)=table.get(client,resource)
			{
				client_match[client]=Some(resource);
				resource_match[resource]=Some(client);
				granted.add_granted_request(*request);
			}
		}
	}
}

pub struct Wavefront
{
	table: RequestTable,
	///The diagonal visited first, advancing by one every round.
	start_diagonal: usize,
	client_match: Vec<Option<usize>>,
	resource_match: Vec<Option<usize>>,
}

impl Wavefront
{
	pub fn new(arg:AllocatorBuilderArgument) -> Result<Wavefront,Error>
	{
		match_object_panic!(arg.cv,"Wavefront",_value);
		Wavefront::with_size(arg.num_clients,arg.num_resources)
	}
	pub fn with_size(num_clients:usize, num_resources:usize) -> Result<Wavefront,Error>
	{
		if num_clients==0 || num_resources==0
		{
			return Err(error!(out_of_range,"num_clients/num_resources".to_string()));
		}
		Ok(Wavefront{
			table: RequestTable::new(num_clients,num_resources),
			start_diagonal: 0,
			client_match: vec![None;num_clients],
			resource_match: vec![None;num_resources],
		})
	}
}

impl Allocator for Wavefront
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
		for entry in self.client_match.iter_mut()
		{
			*entry=None;
		}
		for entry in self.resource_match.iter_mut()
		{
			*entry=None;
		}
		let mut granted=GrantedRequests::default();
		let num_diagonals=self.table.num_resources();
		for step in 0..num_diagonals
		{
			let diagonal=(self.start_diagonal+step)%num_diagonals;
			sweep_diagonal(&self.table,diagonal,&mut self.client_match,&mut self.resource_match,&mut granted);
		}
		self.start_diagonal=(self.start_diagonal+1)%num_diagonals;
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

pub struct PrioWavefront
{
	table: RequestTable,
	start_diagonal: usize,
	client_match: Vec<Option<usize>>,
	resource_match: Vec<Option<usize>>,
}

impl PrioWavefront
{
	pub fn new(arg:AllocatorBuilderArgument) -> Result<PrioWavefront,Error>
	{
		match_object_panic!(arg.cv,"PrioWavefront",_value);
		PrioWavefront::with_size(arg.num_clients,arg.num_resources)
	}
	pub fn with_size(num_clients:usize, num_resources:usize) -> Result<PrioWavefront,Error>
	{
		if num_clients==0 || num_resources==0
		{
			return Err(error!(out_of_range,"num_clients/num_resources".to_string()));
		}
		Ok(PrioWavefront{
			table: RequestTable::new(num_clients,num_resources),
			start_diagonal: 0,
			client_match: vec![None;num_clients],
			resource_match: vec![None;num_resources],
		})
	}
	///The best client priority present in a diagonal, if it has any request.
	fn diagonal_priority(&self, diagonal:usize) -> Option<i32>
	{
		let num_resources=self.table.num_resources();
		let mut best=None;
		for client in 0..self.table.num_clients()
		{
			let resource=(diagonal+client)%num_resources;
			if let Some(request)=self.table.get(client,resource)
			{
				best=Some(match best
				{
					None => request.client_priority,
					Some(value) => request.client_priority.max(value),
				});
			}
		}
		best
	}
}

impl Allocator for PrioWavefront
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
		for entry in self.client_match.iter_mut()
		{
			*entry=None;
		}
		for entry in self.resource_match.iter_mut()
		{
			*entry=None;
		}
		let mut granted=GrantedRequests::default();
		let num_diagonals=self.table.num_resources();
		//Sort diagonals by descending best priority, rotation distance among equals.
		let mut order:Vec<(i32,usize,usize)> = (0..num_diagonals).filter_map(|diagonal|{
			self.diagonal_priority(diagonal).map(|priority|{
				let distance=(diagonal+num_diagonals-self.start_diagonal)%num_diagonals;
				(priority,distance,diagonal)
			})
		}).collect();
		order.sort_unstable_by(|a,b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)) );
		for (_,_,diagonal) in order
		{
			sweep_diagonal(&self.table,diagonal,&mut self.client_match,&mut self.resource_match,&mut granted);
		}
		self.start_diagonal=(self.start_diagonal+1)%num_diagonals;
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
