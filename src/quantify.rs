/*!

Memory accounting of the long-lived simulation structures.

Implement [Quantifiable] for types whose memory use is worth tracking. For plain structs the derive macro of the `quantifiable_derive` crate generates the implementation.

*/

use std::mem::size_of;
use std::collections::VecDeque;

///Trait to report the memory a value uses, including owned heap allocations.
pub trait Quantifiable
{
	///Get the total memory currently being employed by the implementing type. Both stack and heap.
	fn total_memory(&self) -> usize;
	///Prints by stdout how much memory is used per component.
	fn print_memory_breakdown(&self);
	///Get an estimation on how much memory the type could reach during the simulation.
	fn forecast_total_memory(&self) -> usize;
}

macro_rules! quantify_plain{
	($t:ty) => {
		impl Quantifiable for $t
		{
			fn total_memory(&self) -> usize
			{
				size_of::<$t>()
			}
			fn print_memory_breakdown(&self)
			{
				println!("{}: {} bytes",stringify!($t),size_of::<$t>());
			}
			fn forecast_total_memory(&self) -> usize
			{
				size_of::<$t>()
			}
		}
	};
}

quantify_plain!(bool);
quantify_plain!(usize);
quantify_plain!(u64);
quantify_plain!(i32);
quantify_plain!(f64);

impl<T:Quantifiable> Quantifiable for Vec<T>
{
	fn total_memory(&self) -> usize
	{
		//Nominal size plus the heap of each element. Spare capacity is counted at element stack size.
		size_of::<Vec<T>>() + self.iter().map(|e|e.total_memory()).sum::<usize>() + (self.capacity()-self.len())*size_of::<T>()
	}
	fn print_memory_breakdown(&self)
	{
		println!("Vec: {} bytes",self.total_memory());
	}
	fn forecast_total_memory(&self) -> usize
	{
		self.total_memory()
	}
}

impl<T:Quantifiable> Quantifiable for VecDeque<T>
{
	fn total_memory(&self) -> usize
	{
		//We add +1 because of one hole in the implementation of VecDeque.
		size_of::<VecDeque<T>>() + self.iter().map(|e|e.total_memory()).sum::<usize>() + (self.capacity()+1-self.len())*size_of::<T>()
	}
	fn print_memory_breakdown(&self)
	{
		println!("VecDeque: {} bytes",self.total_memory());
	}
	fn forecast_total_memory(&self) -> usize
	{
		self.total_memory()
	}
}

impl<T:Quantifiable> Quantifiable for Option<T>
{
	fn total_memory(&self) -> usize
	{
		size_of::<Option<T>>() + match self
		{
			Some(ref value) => value.total_memory() - size_of::<T>(),
			None => 0,
		}
	}
	fn print_memory_breakdown(&self)
	{
		println!("Option: {} bytes",self.total_memory());
	}
	fn forecast_total_memory(&self) -> usize
	{
		self.total_memory()
	}
}
