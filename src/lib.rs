/*!

cruce-lib provides the core of a cycle-accurate simulator of input-queued virtual-channel routers, the common building block of interconnection networks for multiprocessors and networks-on-chip.

The crate models a single router as a synchronous machine executed in three per-cycle phases. An enclosing driver owning several routers must call [Router::read_inputs](router::Router::read_inputs) on every router, then [Router::internal_step](router::Router::internal_step) on every router, then [Router::write_outputs](router::Router::write_outputs) on every router, so that effects between routers always lag by exactly one cycle. Routers exchange [Flit]s forward and [Credit]s backward through shared [Channel](channel::Channel) endpoints.

Inside [InputQueued](router::input_queued::InputQueued) a cycle runs the canonical four-stage pipeline: route computation, virtual-channel allocation, switch allocation with an optional speculative stream, and switch traversal through a modeled crossbar delay. The allocation stages are served by the bipartite matchers of the [allocator] module.

Components are created from [ConfigurationValue](config_parser::ConfigurationValue) objects through `new_*` factory functions, which can be extended with user types via [Plugs].

*/

pub mod config_parser;
pub mod quantify;
pub mod error;
pub mod matrix;
pub mod pipeline;
pub mod flit;
pub mod channel;
pub mod allocator;
pub mod routing;
pub mod router;
pub mod injection;

use std::collections::BTreeMap;
use std::rc::Rc;
use std::cell::RefCell;

pub use crate::flit::{Flit,FlitType,Credit,NUM_FLIT_TYPES};

use crate::error::Error;
use crate::router::{Router,RouterBuilderArgument};
use crate::allocator::{Allocator,AllocatorBuilderArgument};
use crate::routing::{RoutingFunction,RoutingBuilderArgument};
use crate::injection::{InjectionProcess,InjectionBuilderArgument};

///Cycles are simply indexed by a u64.
pub type Time = u64;

///User-defined builders to extend the set of components known to the factory functions.
///Each factory looks its object name up in the corresponding map before trying the built-in types.
pub struct Plugs
{
	pub routers: BTreeMap<String, Box<dyn Fn(RouterBuilderArgument) -> Result<Rc<RefCell<dyn Router>>,Error>>>,
	pub allocators: BTreeMap<String, Box<dyn Fn(AllocatorBuilderArgument) -> Result<Box<dyn Allocator>,Error>>>,
	pub routing_functions: BTreeMap<String, Box<dyn Fn(RoutingBuilderArgument) -> Result<Box<dyn RoutingFunction>,Error>>>,
	pub injection_processes: BTreeMap<String, Box<dyn Fn(InjectionBuilderArgument) -> Result<Box<dyn InjectionProcess>,Error>>>,
}

impl Default for Plugs
{
	fn default() -> Plugs
	{
		Plugs{
			routers: BTreeMap::new(),
			allocators: BTreeMap::new(),
			routing_functions: BTreeMap::new(),
			injection_processes: BTreeMap::new(),
		}
	}
}
