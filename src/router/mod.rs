
pub mod input_queued;
pub mod vc;
pub mod buffer_state;
pub mod monitor;

use std::rc::{Rc};
use std::cell::RefCell;
use ::rand::rngs::StdRng;

use crate::channel::Channel;
use crate::config_parser::ConfigurationValue;
use crate::error::{Error,SourceLocation};
use crate::flit::{Flit,Credit};
use crate::quantify::Quantifiable;
use crate::{error,source_location,Plugs,Time};
use self::input_queued::InputQueued;

/// Those terms for modules that define a router.
pub mod prelude
{
	pub use super::{Router,RouterBuilderArgument};
	pub use crate::channel::Channel;
	pub use crate::config_parser::ConfigurationValue;
	pub use crate::flit::{Flit,Credit};
	pub use crate::quantify::Quantifiable;
	pub use crate::{Plugs,Time};
}

///The interface that a router type must follow.
///
///The three phases are invoked by the enclosing driver in global order: first `read_inputs` on
///every router, then `internal_step` on every router, then `write_outputs` on every router.
///That order makes every effect between routers lag by exactly one cycle.
pub trait Router: Quantifiable
{
	///Drain the incoming flit and credit wires into the per-cycle buffers.
	fn read_inputs(&mut self, current_cycle:Time);
	///Run the internal pipeline stages and advance time by one cycle.
	fn internal_step(&mut self, current_cycle:Time, rng:&mut StdRng);
	///Drive the outgoing flit and credit wires.
	fn write_outputs(&mut self, current_cycle:Time);
	///To get the number of virtual channels the router uses.
	fn num_virtual_channels(&self) -> usize;
	///Summed downstream occupancy of an output over a virtual channel range, both ends
	///inclusive. `None` stands for the whole range. Used for load reporting.
	fn get_credit(&self, output:usize, vc_range:Option<(usize,usize)>) -> usize;
	///Total occupancy of every virtual channel of an input.
	fn get_buffer(&self, input:usize) -> usize;
	///Dump the state of every virtual channel by stdout.
	fn display(&self);
}

pub struct RouterBuilderArgument<'a>
{
	///The index of the router being created.
	pub router_index: usize,
	///A ConfigurationValue::Object defining the router.
	pub cv: &'a ConfigurationValue,
	///The user defined plugs. In case the router needs to create elements.
	pub plugs: &'a Plugs,
	///Number of input ports.
	pub inputs: usize,
	///Number of output ports.
	pub outputs: usize,
	///The wire bringing flits into each input port.
	pub input_channels: Vec<Rc<RefCell<Channel<Flit>>>>,
	///The wire taking flits out of each output port.
	pub output_channels: Vec<Rc<RefCell<Channel<Flit>>>>,
	///The wire returning credits to the upstream of each input port.
	pub input_credit_channels: Vec<Rc<RefCell<Channel<Credit>>>>,
	///The wire bringing credits back from the downstream of each output port.
	pub output_credit_channels: Vec<Rc<RefCell<Channel<Credit>>>>,
}

///Creates a router from a configuration value.
pub fn new_router(arg:RouterBuilderArgument) -> Result<Rc<RefCell<dyn Router>>,Error>
{
	if let &ConfigurationValue::Object(ref cv_name, ref _cv_pairs)=arg.cv
	{
		if let Some(builder) = arg.plugs.routers.get(cv_name)
		{
			return builder(arg);
		}
		match cv_name.as_ref()
		{
			"InputQueued" => Ok(InputQueued::new(arg)?),
			_ => Err(error!(unknown_policy,"router".to_string(),cv_name.to_string())),
		}
	}
	else
	{
		Err(error!(ill_formed_configuration,arg.cv.clone()).with_message("Trying to create a Router from a non-Object".to_string()))
	}
}
