/*!

The per-input virtual channel.

Each virtual channel owns a bounded flit FIFO and a small state machine driving the packet at its head through the pipeline stages. The upstream credit protocol is what keeps the FIFO within bounds; overflowing it is an implementer bug, not a recoverable condition.

*/

use std::collections::VecDeque;
use std::fmt::{Display,Formatter};
use std::mem::size_of;

use crate::error::{Error,SourceLocation};
use crate::flit::Flit;
use crate::quantify::Quantifiable;
use crate::routing::{OutputSet,RoutingFunction,RoutingRequest};
use crate::{error,source_location,Time};

///The lifecycle of the packet currently heading a virtual channel.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum VcState
{
	///Empty or waiting for a head flit.
	Idle,
	///A head flit arrived; the routing result is being computed.
	Routing,
	///Bidding for an output virtual channel.
	VcAlloc,
	///Bidding for an output virtual channel while also bidding speculatively for the switch.
	VcSpec,
	///Won the virtual channel allocation speculatively; promoted to Active at the end of switch allocation.
	VcSpecGrant,
	///Owns an output virtual channel and forwards flits through the switch.
	Active,
}

pub struct Vc
{
	buffer: VecDeque<Flit>,
	capacity: usize,
	state: VcState,
	///Cycles elapsed since the last state change.
	state_time: Time,
	///The routing result for the packet at the head. Valid from Routing until the tail leaves.
	route_set: Option<OutputSet>,
	///The output granted by the virtual channel allocation. Valid in VcSpecGrant and Active.
	out_port: Option<usize>,
	out_vc: Option<usize>,
	///The priority of the current packet, taken from its head flit.
	priority: i32,
}

impl Vc
{
	pub fn new(capacity:usize) -> Vc
	{
		Vc{
			buffer: VecDeque::with_capacity(capacity),
			capacity,
			state: VcState::Idle,
			state_time: 0,
			route_set: None,
			out_port: None,
			out_vc: None,
			priority: 0,
		}
	}
	pub fn state(&self) -> VcState
	{
		self.state
	}
	///Move to a new state, restarting the cycles-in-state counter.
	///Going back to Idle drops the routing result and the output binding, which die with the packet.
	pub fn set_state(&mut self, state:VcState)
	{
		if let VcState::Idle=state
		{
			self.route_set=None;
			self.out_port=None;
			self.out_vc=None;
		}
		self.state=state;
		self.state_time=0;
	}
	pub fn state_time(&self) -> Time
	{
		self.state_time
	}
	///Called once at the end of every cycle.
	pub fn advance_time(&mut self)
	{
		self.state_time+=1;
	}
	pub fn add_flit(&mut self, flit:Flit) -> Result<(),Error>
	{
		if self.buffer.len()>=self.capacity
		{
			return Err(error!(exhausted_capacity).with_message(format!("buffer holds {} flits of capacity {}",self.buffer.len(),self.capacity)));
		}
		self.buffer.push_back(flit);
		Ok(())
	}
	pub fn front_flit(&self) -> Option<&Flit>
	{
		self.buffer.front()
	}
	pub fn remove_flit(&mut self) -> Option<Flit>
	{
		self.buffer.pop_front()
	}
	pub fn is_empty(&self) -> bool
	{
		self.buffer.is_empty()
	}
	pub fn len(&self) -> usize
	{
		self.buffer.len()
	}
	///Invoke the routing function on the head flit, keeping its result and the packet priority.
	pub fn route(&mut self, routing_function:&dyn RoutingFunction, request:&RoutingRequest)
	{
		self.route_set=Some(routing_function.route(request));
		self.priority=request.flit.priority;
	}
	pub fn route_set(&self) -> Option<&OutputSet>
	{
		self.route_set.as_ref()
	}
	///Record the output granted by the virtual channel allocation.
	pub fn set_output(&mut self, port:usize, virtual_channel:usize)
	{
		self.out_port=Some(port);
		self.out_vc=Some(virtual_channel);
	}
	pub fn output_port(&self) -> Option<usize>
	{
		self.out_port
	}
	pub fn output_vc(&self) -> Option<usize>
	{
		self.out_vc
	}
	pub fn priority(&self) -> i32
	{
		self.priority
	}
}

impl Display for Vc
{
	fn fmt(&self, formatter:&mut Formatter<'_>) -> Result<(),std::fmt::Error>
	{
		write!(formatter,"state={:?} state_time={} occupancy={}",self.state,self.state_time,self.buffer.len())?;
		if let (Some(port),Some(vc))=(self.out_port,self.out_vc)
		{
			write!(formatter," output=({},{})",port,vc)?;
		}
		Ok(())
	}
}

impl Quantifiable for Vc
{
	fn total_memory(&self) -> usize
	{
		return size_of::<Vc>() + (self.buffer.capacity()+1)*size_of::<Flit>() + self.route_set.as_ref().map_or(0,|rs|rs.len()*size_of::<crate::routing::CandidateEgress>());
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		unimplemented!();
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::flit::{Flit,FlitType};

	fn flit() -> Flit
	{
		Flit::new(1,FlitType::Any,0,0,0)
	}

	#[test]
	fn overflow_is_an_error()
	{
		let mut vc=Vc::new(2);
		vc.add_flit(flit()).expect("first flit fits");
		vc.add_flit(flit()).expect("second flit fits");
		assert!(vc.add_flit(flit()).is_err());
		assert_eq!(vc.len(),2);
	}

	#[test]
	fn state_time_restarts_on_transition()
	{
		let mut vc=Vc::new(2);
		vc.set_state(VcState::Routing);
		vc.advance_time();
		vc.advance_time();
		assert_eq!(vc.state_time(),2);
		vc.set_state(VcState::VcAlloc);
		assert_eq!(vc.state_time(),0);
	}

	#[test]
	fn idle_drops_the_binding()
	{
		let mut vc=Vc::new(2);
		vc.set_state(VcState::Active);
		vc.set_output(3,1);
		assert_eq!(vc.output_port(),Some(3));
		vc.set_state(VcState::Idle);
		assert_eq!(vc.output_port(),None);
		assert_eq!(vc.output_vc(),None);
		assert!(vc.route_set().is_none());
	}
}
