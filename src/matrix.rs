
use std::mem::{size_of};
use crate::quantify::Quantifiable;

///A simple matrix struct. Used for the dense request tables of the allocators.
#[derive(Debug)]
pub struct Matrix<T>
{
	data: Vec<T>,
	num_rows: usize,
	num_columns: usize,
}

impl<T> Matrix<T>
{
	///Read a matrix entry.
	pub fn get(&self,row:usize,column:usize) -> &T
	{
		&self.data[row*self.num_columns+column]
	}
	///Read/write a matrix entry.
	pub fn get_mut(&mut self,row:usize,column:usize) -> &mut T
	{
		&mut self.data[row*self.num_columns+column]
	}
	///Build a matrix with constant values.
	pub fn constant(value:T,num_rows:usize,num_columns:usize) -> Matrix<T> where T:Clone
	{
		Matrix{
			data: vec![value;num_rows*num_columns],
			num_rows,
			num_columns,
		}
	}
	///Overwrite every entry with the given value. Used to reset a table kept across rounds.
	pub fn fill(&mut self,value:T) where T:Clone
	{
		for entry in self.data.iter_mut()
		{
			*entry=value.clone();
		}
	}
	pub fn num_rows(&self) -> usize
	{
		self.num_rows
	}
	pub fn num_columns(&self) -> usize
	{
		self.num_columns
	}
}

impl<T:Quantifiable> Quantifiable for Matrix<T>
{
	fn total_memory(&self) -> usize
	{
		return size_of::<Matrix<T>>() + self.data.total_memory();
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
