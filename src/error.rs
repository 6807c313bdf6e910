/*!

This module is for managing errors in the code of cruce-lib. To avoid invoking `panic!` in favor of a more graceful exit. Cases that should never happen can be kept as `panic!`.

Configuration mistakes, such as naming an unknown allocator variant, are reported to the caller of the constructor as an `Err`. Protocol violations inside the pipeline, such as overflowing a virtual channel whose credits were miscounted, indicate an implementer bug and remain loud panics.

The `error!` macro may ease the writing a little. E.g., `error!(unknown_policy,"allocator".to_string(),name.to_string())` or `error!(bad_argument)`.

To include arbitrary messages use the `with_message` method, as in `Error::bad_argument(source_location!()).with_message(format!("text: {}",thing_to_dump))`.

*/

use std::fmt::{Display,Formatter};

use crate::config_parser::ConfigurationValue;

/// The main Error class to be used in each `Result(Whatever,Error)`.
/// It contains the code source of the error and its kind.
/// An arbitrary `String` message can be optionally attached.
#[derive(Debug)]
pub struct Error
{
	pub source_location: SourceLocation,
	pub kind: ErrorKind,
	pub message: Option<String>,
}

/// A source code location where an error occurred.
/// Contains the values of the macros `std::{file,line,column}`.
#[derive(Debug)]
pub struct SourceLocation
{
	pub file: &'static str,
	pub line: u32,
	pub column: u32,
}

#[derive(Debug)]
pub enum ErrorKind
{
	/// A configuration value that could not be interpreted as what it should describe.
	IllFormedConfiguration{
		value: ConfigurationValue,
	},
	/// A name was given for a component but no type of that class has it.
	/// Keep the class of component and the offending name.
	UnknownPolicy{
		class: String,
		name: String,
	},
	/// A numeric configuration entry outside its valid interval.
	OutOfRange{
		parameter: String,
	},
	/// A bounded structure was asked to hold more than its capacity.
	ExhaustedCapacity,
	/// Some method received a bad argument. There should be an attached message with further explanation.
	BadArgument,
	/// Any other error. Better to add new types than to use this thing.
	Undetermined,
}

// source_location!()
#[macro_export]
macro_rules! source_location{
	() => {
		SourceLocation{
			file: file!(),
			line: line!(),
			column: column!(),
		}
	}
}
#[macro_export]
macro_rules! error{
	($kind:ident,$($args:tt)*) => {{
		Error::$kind( source_location!(), $($args)* )
	}};
	($kind:ident) => {{
		Error::$kind( source_location!() )
	}};
}

use ErrorKind::*;

impl Error
{
	pub fn new(source_location:SourceLocation, kind:ErrorKind) -> Error
	{
		Error{
			source_location,
			kind,
			message:None,
		}
	}
	pub fn with_message(mut self,message:String) -> Error
	{
		match self.message
		{
			Some(ref mut text) => *text += &message,
			None => self.message=Some(message),
		}
		self
	}
	pub fn ill_formed_configuration(source_location:SourceLocation,value:ConfigurationValue)->Error
	{
		Error{
			source_location,
			kind: IllFormedConfiguration{
				value,
			},
			message:None,
		}
	}
	/// example call: Error::unknown_policy(source_location!(),"allocator".to_string(),"Foo".to_string()).
	pub fn unknown_policy(source_location:SourceLocation,class:String,name:String)->Error
	{
		Error{
			source_location,
			kind: UnknownPolicy{
				class,
				name,
			},
			message:None,
		}
	}
	pub fn out_of_range(source_location:SourceLocation,parameter:String)->Error
	{
		Error{
			source_location,
			kind: OutOfRange{
				parameter,
			},
			message:None,
		}
	}
	pub fn exhausted_capacity(source_location:SourceLocation)->Error
	{
		Error{
			source_location,
			kind: ExhaustedCapacity,
			message:None,
		}
	}
	pub fn bad_argument(source_location:SourceLocation)->Error
	{
		Error{
			source_location,
			kind: BadArgument,
			message:None,
		}
	}
	pub fn undetermined(source_location:SourceLocation)->Error
	{
		Error{
			source_location,
			kind: Undetermined,
			message:None,
		}
	}
}


impl Display for Error
{
	fn fmt(&self, formatter: &mut Formatter<'_>) -> Result<(), std::fmt::Error>
	{
		let Error{source_location:location,kind,message} = self;
		writeln!(formatter,"Error at file {} at line {} column {}.",location.file,location.line,location.column)?;
		if let Some(text) = message
		{
			writeln!(formatter,"{}",text)?;
		}
		kind.fmt(formatter)?;
		Ok(())
	}
}

impl Display for ErrorKind
{
	fn fmt(&self, formatter: &mut Formatter<'_>) -> Result<(), std::fmt::Error>
	{
		match self
		{
			IllFormedConfiguration{value} =>
			{
				writeln!(formatter,"IllFormedConfiguration error: The following configuration value could not be interpreted:\n{}",value)?;
			},
			UnknownPolicy{class,name} =>
			{
				writeln!(formatter,"UnknownPolicy error: There is no {} with name `{}`.",class,name)?;
			},
			OutOfRange{parameter} =>
			{
				writeln!(formatter,"OutOfRange error: The parameter {} is outside its valid interval.",parameter)?;
			},
			ExhaustedCapacity =>
			{
				writeln!(formatter,"ExhaustedCapacity error: A bounded structure was pushed beyond its capacity.")?;
			},
			BadArgument =>
			{
				writeln!(formatter,"BadArgument: Bad arguments given to a function.")?;
			},
			Undetermined =>
			{
				writeln!(formatter,"Undetermined error: A generic error. The concrete error should be more specified.")?;
			},
		}
		Ok(())
	}
}
