/*!

The two message types moving between routers.

A [Flit] travels forward along the data path. A [Credit] travels backward and reports that downstream buffer slots were freed. Both are plain owned values whose ownership is transferred on every queue push.

*/

use std::fmt::{Display,Formatter};
use std::mem::size_of;

use quantifiable_derive::Quantifiable;//the derive macro
use crate::quantify::Quantifiable;

///Number of variants of [FlitType]. Monitors keep one counter slot per variant.
pub const NUM_FLIT_TYPES: usize = 5;

///The class of the packet a flit belongs to. Virtual channels may be partitioned among classes.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum FlitType
{
	ReadRequest,
	ReadReply,
	WriteRequest,
	WriteReply,
	Any,
}

impl FlitType
{
	///Position of the variant inside monitor arrays.
	pub fn index(self) -> usize
	{
		match self
		{
			FlitType::ReadRequest => 0,
			FlitType::ReadReply => 1,
			FlitType::WriteRequest => 2,
			FlitType::WriteReply => 3,
			FlitType::Any => 4,
		}
	}
}

impl Quantifiable for FlitType
{
	fn total_memory(&self) -> usize
	{
		size_of::<FlitType>()
	}
	fn print_memory_breakdown(&self)
	{
		unimplemented!();
	}
	fn forecast_total_memory(&self) -> usize
	{
		size_of::<FlitType>()
	}
}

///A flow-control unit. The fragment of a packet that advances one hop in a cycle.
///Every packet has exactly one flit with `head` and exactly one with `tail`, possibly the same.
///All the flits of a packet enter a router by the same virtual channel and leave by the same one.
#[derive(Clone,Debug,Quantifiable)]
pub struct Flit
{
	///Identifier of the packet this flit belongs to.
	pub packet_id: u64,
	pub flit_type: FlitType,
	pub head: bool,
	pub tail: bool,
	///The router that sent the flit through its output channel. Stamped when leaving.
	pub from_router: Option<usize>,
	///The router at which the packet entered the network.
	pub source: usize,
	///The router at which the packet must leave the network.
	pub destination: usize,
	///The virtual channel given at injection time.
	pub injection_vc: usize,
	///The virtual channel the flit currently travels on. Rewritten when a new output virtual channel is granted.
	pub vc: usize,
	///Packet priority, as seen by the allocators.
	pub priority: i32,
	///Number of routers traversed so far.
	pub hops: usize,
	///Whether to trace this flit through the pipeline stages.
	pub watch: bool,
}

impl Flit
{
	///A fresh flit at its injection point.
	pub fn new(packet_id:u64, flit_type:FlitType, source:usize, destination:usize, injection_vc:usize) -> Flit
	{
		Flit{
			packet_id,
			flit_type,
			head: false,
			tail: false,
			from_router: None,
			source,
			destination,
			injection_vc,
			vc: injection_vc,
			priority: 0,
			hops: 0,
			watch: false,
		}
	}
}

impl Display for Flit
{
	fn fmt(&self, formatter:&mut Formatter<'_>) -> Result<(),std::fmt::Error>
	{
		writeln!(formatter,"  Flit packet_id={} type={:?} head={} tail={} source={} destination={} vc={} priority={} hops={}",self.packet_id,self.flit_type,self.head,self.tail,self.source,self.destination,self.vc,self.priority,self.hops)
	}
}

///A backward signal listing virtual channels whose buffer slot has been freed at the receiving router.
///At most one credit per input per cycle is produced, coalescing every freed channel of that input.
#[derive(Clone,Debug,Quantifiable)]
pub struct Credit
{
	///The freed virtual channels, one entry per released slot. Holds at most `num_vcs` entries.
	pub vc: Vec<usize>,
	///The router the credit is returned to.
	pub dest_router: Option<usize>,
}

impl Credit
{
	pub fn new(capacity:usize) -> Credit
	{
		Credit{
			vc: Vec::with_capacity(capacity),
			dest_router: None,
		}
	}
}
