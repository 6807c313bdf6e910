/*!

The view a router keeps of the buffers of the next router downstream of one of its outputs.

Occupancy grows when a flit is sent and shrinks when the matching credit returns, so `is_full_for` is the authoritative back-pressure signal. A virtual channel taken by `take_buffer` stays owned by its upstream until the tail flit has been sent and every credit of the packet has come back.

*/

use std::mem::size_of;

use crate::flit::{Flit,Credit};
use crate::quantify::Quantifiable;

pub struct BufferState
{
	///Downstream buffer capacity, in flits per virtual channel.
	buf_size: usize,
	///Flits sent and not yet credited back, per virtual channel.
	occupancy: Vec<usize>,
	///Whether some upstream virtual channel owns the downstream one.
	in_use: Vec<bool>,
	///Whether the tail of the owning packet has already been sent.
	tail_sent: Vec<bool>,
}

impl BufferState
{
	pub fn new(num_vcs:usize, buf_size:usize) -> BufferState
	{
		BufferState{
			buf_size,
			occupancy: vec![0;num_vcs],
			in_use: vec![false;num_vcs],
			tail_sent: vec![false;num_vcs],
		}
	}
	pub fn num_vcs(&self) -> usize
	{
		self.occupancy.len()
	}
	///Whether the downstream virtual channel can be granted to a new packet.
	pub fn is_available_for(&self, virtual_channel:usize) -> bool
	{
		!self.in_use[virtual_channel]
	}
	///Whether the downstream buffer cannot take one more flit.
	pub fn is_full_for(&self, virtual_channel:usize) -> bool
	{
		self.occupancy[virtual_channel]>=self.buf_size
	}
	///Reserve the downstream virtual channel for a packet. Taking a taken one is a protocol violation.
	pub fn take_buffer(&mut self, virtual_channel:usize)
	{
		if self.in_use[virtual_channel]
		{
			panic!("Taking a downstream buffer already in use, virtual_channel={}",virtual_channel);
		}
		self.in_use[virtual_channel]=true;
		self.tail_sent[virtual_channel]=false;
	}
	///Track a flit leaving towards the downstream buffer.
	pub fn sending_flit(&mut self, flit:&Flit)
	{
		let virtual_channel=flit.vc;
		self.occupancy[virtual_channel]+=1;
		if self.occupancy[virtual_channel]>self.buf_size
		{
			panic!("Downstream occupancy {} exceeds the buffer size {}",self.occupancy[virtual_channel],self.buf_size);
		}
		if flit.tail
		{
			self.tail_sent[virtual_channel]=true;
		}
	}
	///Account a returned credit. Once the tail went by and its last credit returns the channel is released.
	pub fn process_credit(&mut self, credit:&Credit)
	{
		for &virtual_channel in credit.vc.iter()
		{
			if self.occupancy[virtual_channel]==0
			{
				panic!("Received a credit for virtual_channel={} with no outstanding flits",virtual_channel);
			}
			self.occupancy[virtual_channel]-=1;
			if self.tail_sent[virtual_channel] && self.occupancy[virtual_channel]==0
			{
				self.in_use[virtual_channel]=false;
				self.tail_sent[virtual_channel]=false;
			}
		}
	}
	///Current downstream occupancy of a virtual channel.
	pub fn size(&self, virtual_channel:usize) -> usize
	{
		self.occupancy[virtual_channel]
	}
}

impl Quantifiable for BufferState
{
	fn total_memory(&self) -> usize
	{
		return size_of::<BufferState>() + self.occupancy.total_memory() + self.in_use.total_memory() + self.tail_sent.total_memory();
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
	use crate::flit::{Flit,FlitType,Credit};

	fn flit_on(vc:usize, tail:bool) -> Flit
	{
		let mut flit=Flit::new(1,FlitType::Any,0,0,vc);
		flit.tail=tail;
		flit
	}

	fn credit_for(vc:usize) -> Credit
	{
		let mut credit=Credit::new(1);
		credit.vc.push(vc);
		credit
	}

	#[test]
	fn release_waits_for_the_tail_credit()
	{
		let mut state=BufferState::new(2,4);
		state.take_buffer(0);
		assert!(!state.is_available_for(0));
		state.sending_flit(&flit_on(0,false));
		state.sending_flit(&flit_on(0,true));
		assert_eq!(state.size(0),2);
		state.process_credit(&credit_for(0));
		//The tail went by but one credit is still outstanding.
		assert!(!state.is_available_for(0));
		state.process_credit(&credit_for(0));
		assert!(state.is_available_for(0));
		assert_eq!(state.size(0),0);
	}

	#[test]
	fn full_reflects_outstanding_flits()
	{
		let mut state=BufferState::new(1,2);
		state.take_buffer(0);
		state.sending_flit(&flit_on(0,false));
		assert!(!state.is_full_for(0));
		state.sending_flit(&flit_on(0,false));
		assert!(state.is_full_for(0));
		state.process_credit(&credit_for(0));
		assert!(!state.is_full_for(0));
	}

	#[test]
	#[should_panic]
	fn double_take_is_a_violation()
	{
		let mut state=BufferState::new(2,4);
		state.take_buffer(1);
		state.take_buffer(1);
	}
}
