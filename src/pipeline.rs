/*!

A fixed-depth shift register used to model multi-cycle stage latencies, such as the crossbar traversal and the credit return path.

An item written at cycle t becomes readable exactly at cycle t+depth, counting one [advance](PipelineDelay::advance) per cycle between the write and the read. Depth zero is legal and behaves as a write-through wire within the cycle.

*/

use std::mem::{size_of};
use crate::quantify::Quantifiable;

///A pipeline with `depth+1` stages of `slots` parallel lanes.
///Writes go to the tail stage and reads take from the head stage.
///The per-cycle call order must be: writes, then `advance`, then reads.
pub struct PipelineDelay<T>
{
	///`stages[pointer]` is the stage written this cycle. After `advance` it is also the one read.
	stages: Vec<Vec<Option<T>>>,
	pointer: usize,
}

impl<T> PipelineDelay<T>
{
	pub fn new(slots:usize, depth:usize) -> PipelineDelay<T>
	{
		PipelineDelay{
			stages: (0..depth+1).map(|_| (0..slots).map(|_|None).collect() ).collect(),
			pointer: 0,
		}
	}
	///Place an item in a slot of the tail stage.
	pub fn write(&mut self, slot:usize, item:T)
	{
		self.stages[self.pointer][slot]=Some(item);
	}
	///Reset every slot of the tail stage to the given value.
	pub fn write_all(&mut self, value:Option<T>) where T:Clone
	{
		for slot in self.stages[self.pointer].iter_mut()
		{
			*slot=value.clone();
		}
	}
	///Shift the whole pipeline by one stage, discarding the head.
	pub fn advance(&mut self)
	{
		self.pointer = (self.pointer+1) % self.stages.len();
	}
	///Take the item at a slot of the head stage, if any.
	pub fn read(&mut self, slot:usize) -> Option<T>
	{
		self.stages[self.pointer][slot].take()
	}
	pub fn depth(&self) -> usize
	{
		self.stages.len()-1
	}
	pub fn num_slots(&self) -> usize
	{
		self.stages[0].len()
	}
}

impl<T:Quantifiable> Quantifiable for PipelineDelay<T>
{
	fn total_memory(&self) -> usize
	{
		return size_of::<PipelineDelay<T>>() + self.stages.total_memory();
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
