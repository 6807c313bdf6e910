/*!

The wires joining routers.

A [Channel] holds at most one item. The global phase order, in which every router drains its incoming channels before any router drives its outgoing ones, makes an item written during `write_outputs` of cycle t visible to `read_inputs` of cycle t+1, so each channel contributes exactly one cycle of latency.

Channels live in the enclosing network. Routers keep shared handles built with [new_channel].

*/

use std::rc::Rc;
use std::cell::RefCell;

///A single-slot wire. Written once and read once per cycle.
pub struct Channel<T>
{
	slot: Option<T>,
}

impl<T> Channel<T>
{
	pub fn new() -> Channel<T>
	{
		Channel{
			slot: None,
		}
	}
	///Drive the wire for this cycle. `None` leaves it silent.
	pub fn send(&mut self, item:Option<T>)
	{
		self.slot=item;
	}
	///Take whatever the wire carries, if anything.
	pub fn receive(&mut self) -> Option<T>
	{
		self.slot.take()
	}
}

impl<T> Default for Channel<T>
{
	fn default() -> Channel<T>
	{
		Channel::new()
	}
}

///Build the shared handle a router and its neighbour keep to the same wire.
pub fn new_channel<T>() -> Rc<RefCell<Channel<T>>>
{
	Rc::new(RefCell::new(Channel::new()))
}
