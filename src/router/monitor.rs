/*!

Activity counters used for power and utilization reporting.

Both monitors are purely additive. The pipeline bumps them at fixed points: a buffer write when a flit is received, a buffer read and a switch traversal when a flit crosses, and one cycle tick per router cycle. Readers take the totals after the run.

*/

use std::fmt::{Display,Formatter};
use std::mem::size_of;

use crate::flit::{Flit,NUM_FLIT_TYPES};
use crate::quantify::Quantifiable;
use crate::Time;

///Counts buffer reads and writes per input and flit type.
pub struct BufferMonitor
{
	cycles: Time,
	inputs: usize,
	reads: Vec<u64>,
	writes: Vec<u64>,
}

impl BufferMonitor
{
	pub fn new(inputs:usize) -> BufferMonitor
	{
		BufferMonitor{
			cycles: 0,
			inputs,
			reads: vec![0;inputs*NUM_FLIT_TYPES],
			writes: vec![0;inputs*NUM_FLIT_TYPES],
		}
	}
	fn index(&self, input:usize, flit:&Flit) -> usize
	{
		assert!(input<self.inputs,"input {} out of range in BufferMonitor",input);
		let flit_type=flit.flit_type.index();
		flit_type + NUM_FLIT_TYPES*input
	}
	pub fn cycle(&mut self)
	{
		self.cycles+=1;
	}
	pub fn write(&mut self, input:usize, flit:&Flit)
	{
		let index=self.index(input,flit);
		self.writes[index]+=1;
	}
	pub fn read(&mut self, input:usize, flit:&Flit)
	{
		let index=self.index(input,flit);
		self.reads[index]+=1;
	}
	pub fn cycles(&self) -> Time
	{
		self.cycles
	}
	pub fn reads(&self) -> &[u64]
	{
		&self.reads
	}
	pub fn writes(&self) -> &[u64]
	{
		&self.writes
	}
}

impl Display for BufferMonitor
{
	fn fmt(&self, formatter:&mut Formatter<'_>) -> Result<(),std::fmt::Error>
	{
		for input in 0..self.inputs
		{
			write!(formatter,"[ {} ] ",input)?;
			for flit_type in 0..NUM_FLIT_TYPES
			{
				let index=flit_type + NUM_FLIT_TYPES*input;
				write!(formatter,"Type={}:(R#{},W#{}) ",flit_type,self.reads[index],self.writes[index])?;
			}
			writeln!(formatter)?;
		}
		Ok(())
	}
}

impl Quantifiable for BufferMonitor
{
	fn total_memory(&self) -> usize
	{
		return size_of::<BufferMonitor>() + self.reads.total_memory() + self.writes.total_memory();
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

///Counts crossbar traversals per (input,output) pair and flit type.
pub struct SwitchMonitor
{
	cycles: Time,
	inputs: usize,
	outputs: usize,
	traversals: Vec<u64>,
}

impl SwitchMonitor
{
	pub fn new(inputs:usize, outputs:usize) -> SwitchMonitor
	{
		SwitchMonitor{
			cycles: 0,
			inputs,
			outputs,
			traversals: vec![0;inputs*outputs*NUM_FLIT_TYPES],
		}
	}
	fn index(&self, input:usize, output:usize, flit:&Flit) -> usize
	{
		assert!(input<self.inputs,"input {} out of range in SwitchMonitor",input);
		assert!(output<self.outputs,"output {} out of range in SwitchMonitor",output);
		let flit_type=flit.flit_type.index();
		flit_type + NUM_FLIT_TYPES*(output + self.outputs*input)
	}
	pub fn cycle(&mut self)
	{
		self.cycles+=1;
	}
	pub fn traversal(&mut self, input:usize, output:usize, flit:&Flit)
	{
		let index=self.index(input,output,flit);
		self.traversals[index]+=1;
	}
	pub fn cycles(&self) -> Time
	{
		self.cycles
	}
	pub fn traversals(&self) -> &[u64]
	{
		&self.traversals
	}
}

impl Display for SwitchMonitor
{
	fn fmt(&self, formatter:&mut Formatter<'_>) -> Result<(),std::fmt::Error>
	{
		for input in 0..self.inputs
		{
			for output in 0..self.outputs
			{
				write!(formatter,"[{} -> {}] ",input,output)?;
				for flit_type in 0..NUM_FLIT_TYPES
				{
					let index=flit_type + NUM_FLIT_TYPES*(output + self.outputs*input);
					write!(formatter,"{}:{} ",flit_type,self.traversals[index])?;
				}
				writeln!(formatter)?;
			}
		}
		Ok(())
	}
}

impl Quantifiable for SwitchMonitor
{
	fn total_memory(&self) -> usize
	{
		return size_of::<SwitchMonitor>() + self.traversals.total_memory();
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

	#[test]
	fn counters_accumulate_by_type()
	{
		let mut buffer_monitor=BufferMonitor::new(2);
		let mut switch_monitor=SwitchMonitor::new(2,2);
		let read_flit=Flit::new(1,FlitType::ReadRequest,0,0,0);
		let write_flit=Flit::new(2,FlitType::WriteReply,0,0,0);
		buffer_monitor.cycle();
		buffer_monitor.write(0,&read_flit);
		buffer_monitor.write(0,&read_flit);
		buffer_monitor.read(0,&read_flit);
		switch_monitor.traversal(0,1,&write_flit);
		assert_eq!(buffer_monitor.cycles(),1);
		assert_eq!(buffer_monitor.writes()[FlitType::ReadRequest.index()],2);
		assert_eq!(buffer_monitor.reads()[FlitType::ReadRequest.index()],1);
		assert_eq!(switch_monitor.traversals()[FlitType::WriteReply.index()+NUM_FLIT_TYPES*1],1);
	}
}
