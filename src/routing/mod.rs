/*!

Routing functions and their result type.

The router invokes the routing function once per packet, on the head flit, and stores the returned [OutputSet] in the virtual channel for the later allocation stages. The function itself is opaque to the pipeline: anything implementing [RoutingFunction] can be plugged in, either one of the types here or a user type registered through the plugs.

*/

use crate::config_parser::ConfigurationValue;
use crate::error::{Error,SourceLocation};
use crate::flit::{Flit,FlitType};
use crate::{error,source_location,match_object_panic,Plugs};

/// Those terms for modules that define a routing function.
pub mod prelude
{
	pub use super::{RoutingFunction,RoutingRequest,RoutingBuilderArgument,OutputSet,CandidateEgress};
	pub use crate::config_parser::ConfigurationValue;
	pub use crate::error::{Error,SourceLocation};
}

///A candidate (output port, output virtual channel) pair with the priority the routing gives it.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct CandidateEgress
{
	pub port: usize,
	pub virtual_channel: usize,
	pub priority: i32,
}

impl CandidateEgress
{
	pub fn new(port:usize, virtual_channel:usize) -> CandidateEgress
	{
		CandidateEgress{
			port,
			virtual_channel,
			priority: 0,
		}
	}
}

///The result of a routing function on a head flit.
///An ordered sequence of candidate egresses, queried per output port by the allocation stage.
#[derive(Clone,Debug,Default)]
pub struct OutputSet
{
	candidates: Vec<CandidateEgress>,
}

impl OutputSet
{
	pub fn new() -> OutputSet
	{
		OutputSet{
			candidates: vec![],
		}
	}
	pub fn add(&mut self, candidate:CandidateEgress)
	{
		self.candidates.push(candidate);
	}
	///Append every virtual channel of the closed interval `[vc_begin,vc_end]` of a port.
	pub fn add_range(&mut self, port:usize, vc_begin:usize, vc_end:usize, priority:i32)
	{
		for virtual_channel in vc_begin..vc_end+1
		{
			self.candidates.push(CandidateEgress{port,virtual_channel,priority});
		}
	}
	///How many candidate virtual channels the set holds for a port.
	pub fn num_vcs(&self, port:usize) -> usize
	{
		self.candidates.iter().filter(|c|c.port==port).count()
	}
	///The index-th candidate of a port, as `(virtual channel, priority)`.
	pub fn get_vc(&self, port:usize, index:usize) -> Option<(usize,i32)>
	{
		self.candidates.iter().filter(|c|c.port==port).nth(index).map(|c|(c.virtual_channel,c.priority))
	}
	///The port of the first candidate, used when a port must be guessed before any is bound.
	pub fn first_port(&self) -> Option<usize>
	{
		self.candidates.first().map(|c|c.port)
	}
	pub fn iter(&self) -> std::slice::Iter<CandidateEgress>
	{
		self.candidates.iter()
	}
	pub fn len(&self) -> usize
	{
		self.candidates.len()
	}
	pub fn is_empty(&self) -> bool
	{
		self.candidates.is_empty()
	}
}

///What a routing function may examine of the router invoking it.
pub struct RoutingRequest<'a>
{
	///The index of the invoking router in the network.
	pub router_index: usize,
	///Number of output ports of the router.
	pub num_outputs: usize,
	///Virtual channels per port.
	pub num_vcs: usize,
	///The port the head flit arrived by.
	pub input_port: usize,
	///The virtual channel interval the flit's class may use, as `(begin,end)` inclusive.
	pub vc_range: (usize,usize),
	///The head flit being routed.
	pub flit: &'a Flit,
}

///The interface that a routing function must follow.
pub trait RoutingFunction
{
	///Compute the candidate egresses for the head flit of a packet.
	fn route(&self, request:&RoutingRequest) -> OutputSet;
}

///Helper structure to build a routing function.
pub struct RoutingBuilderArgument<'a>
{
	///A ConfigurationValue::Object defining the routing function.
	pub cv: &'a ConfigurationValue,
	///The user defined plugs. In case the routing function needs to create elements.
	pub plugs: &'a Plugs,
}

///Creates a routing function from a configuration value.
pub fn new_routing_function(arg:RoutingBuilderArgument) -> Result<Box<dyn RoutingFunction>,Error>
{
	if let &ConfigurationValue::Object(ref cv_name, ref _cv_pairs)=arg.cv
	{
		if let Some(builder) = arg.plugs.routing_functions.get(cv_name)
		{
			return builder(arg);
		}
		match cv_name.as_ref()
		{
			"DestTag" => Ok(Box::new(DestTag::new(arg)?)),
			"Table" => Ok(Box::new(Table::new(arg)?)),
			_ => Err(error!(unknown_policy,"routing function".to_string(),cv_name.to_string())),
		}
	}
	else
	{
		Err(error!(ill_formed_configuration,arg.cv.clone()).with_message("Trying to create a routing function from a non-Object".to_string()))
	}
}

///Send the flit through the port its destination index selects directly.
///Intended for single stage networks and for driving a router in isolation.
#[derive(Debug)]
pub struct DestTag
{
}

impl RoutingFunction for DestTag
{
	fn route(&self, request:&RoutingRequest) -> OutputSet
	{
		let port=request.flit.destination % request.num_outputs;
		let (vc_begin,vc_end)=request.vc_range;
		let mut output_set=OutputSet::new();
		output_set.add_range(port,vc_begin,vc_end,0);
		output_set
	}
}

impl DestTag
{
	pub fn new(arg:RoutingBuilderArgument) -> Result<DestTag,Error>
	{
		match_object_panic!(arg.cv,"DestTag",_value);
		Ok(DestTag{})
	}
}

///A table mapping each destination router to an output port.
///```ignore
///Table{ports: [2,0,1,3]}
///```
#[derive(Debug)]
pub struct Table
{
	ports: Vec<usize>,
}

impl RoutingFunction for Table
{
	fn route(&self, request:&RoutingRequest) -> OutputSet
	{
		let port=*self.ports.get(request.flit.destination).unwrap_or_else(||panic!("destination {} is not in the routing table",request.flit.destination));
		let (vc_begin,vc_end)=request.vc_range;
		let mut output_set=OutputSet::new();
		output_set.add_range(port,vc_begin,vc_end,0);
		output_set
	}
}

impl Table
{
	pub fn new(arg:RoutingBuilderArgument) -> Result<Table,Error>
	{
		let mut ports=None;
		match_object_panic!(arg.cv,"Table",value,
			"ports" => ports=Some(value.as_array().expect("bad value for ports").iter().map(|entry|entry.as_usize().expect("bad value in ports")).collect::<Vec<usize>>()),
		);
		let ports=ports.ok_or_else(||error!(ill_formed_configuration,arg.cv.clone()).with_message("A Table routing needs its ports".to_string()))?;
		Ok(Table{ports})
	}
}

///The virtual channel intervals reserved to each packet class.
///When partitioning is off every class may use the whole range.
#[derive(Clone,Debug)]
pub struct VcClassRanges
{
	partition: bool,
	read_request: (usize,usize),
	read_reply: (usize,usize),
	write_request: (usize,usize),
	write_reply: (usize,usize),
}

impl VcClassRanges
{
	///Build the ranges, checking each interval fits in `[0,num_vcs)`.
	pub fn new(partition:bool, read_request:(usize,usize), read_reply:(usize,usize), write_request:(usize,usize), write_reply:(usize,usize), num_vcs:usize) -> Result<VcClassRanges,Error>
	{
		for (name,range) in [("read_request",read_request),("read_reply",read_reply),("write_request",write_request),("write_reply",write_reply)]
		{
			if range.0>range.1 || range.1>=num_vcs
			{
				return Err(error!(out_of_range,format!("{}_begin_vc..{}_end_vc",name,name)));
			}
		}
		Ok(VcClassRanges{
			partition,
			read_request,
			read_reply,
			write_request,
			write_reply,
		})
	}
	///The whole range for every class.
	pub fn unpartitioned(num_vcs:usize) -> VcClassRanges
	{
		let range=(0,num_vcs-1);
		VcClassRanges{
			partition: false,
			read_request: range,
			read_reply: range,
			write_request: range,
			write_reply: range,
		}
	}
	///The interval a flit of the given class may be routed into.
	pub fn range_for(&self, flit_type:FlitType, num_vcs:usize) -> (usize,usize)
	{
		if !self.partition
		{
			return (0,num_vcs-1);
		}
		match flit_type
		{
			FlitType::ReadRequest => self.read_request,
			FlitType::ReadReply => self.read_reply,
			FlitType::WriteRequest => self.write_request,
			FlitType::WriteReply => self.write_reply,
			FlitType::Any => (0,num_vcs-1),
		}
	}
}
