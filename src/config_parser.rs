/*!

The configuration tree consumed by the component factories.

A component is described by a [ConfigurationValue::Object] whose name selects the type and whose pairs give its parameters, as in `InputQueued{num_vcs:2, vc_buf_size:4}`. The `match_object_panic` macro is the standard way for a constructor to walk those pairs.

Configurations are built programmatically. See the builders in the integration tests for the typical usage.

*/

use std::fmt::{Display,Formatter};

#[derive(Clone,Debug,PartialEq)]
pub enum ConfigurationValue
{
	Literal(String),
	Number(f64),
	Object(String,Vec<(String,ConfigurationValue)>),
	Array(Vec<ConfigurationValue>),
	True,
	False,
	None,
}

impl ConfigurationValue
{
	pub fn as_bool(&self) -> Option<bool>
	{
		match self
		{
			&ConfigurationValue::True => Some(true),
			&ConfigurationValue::False => Some(false),
			_ => None,
		}
	}
	pub fn as_f64(&self) -> Option<f64>
	{
		match self
		{
			&ConfigurationValue::Number(f) => Some(f),
			_ => None,
		}
	}
	pub fn as_usize(&self) -> Option<usize>
	{
		self.as_f64().map(|f|f as usize)
	}
	pub fn as_time(&self) -> Option<crate::Time>
	{
		self.as_f64().map(|f|f as crate::Time)
	}
	pub fn as_str(&self) -> Option<&str>
	{
		match self
		{
			&ConfigurationValue::Literal(ref s) => Some(s.as_str()),
			_ => None,
		}
	}
	pub fn as_array(&self) -> Option<&Vec<ConfigurationValue>>
	{
		match self
		{
			&ConfigurationValue::Array(ref a) => Some(a),
			_ => None,
		}
	}
}

impl Display for ConfigurationValue
{
	fn fmt(&self, formatter:&mut Formatter<'_>) -> Result<(),std::fmt::Error>
	{
		match self
		{
			ConfigurationValue::Literal(s) => write!(formatter,"\"{}\"",s)?,
			ConfigurationValue::Number(f) => write!(formatter,"{}",f)?,
			ConfigurationValue::Object(name,pairs) =>
			{
				write!(formatter,"{}{{",name)?;
				for (index,(key,value)) in pairs.iter().enumerate()
				{
					if index>0
					{
						write!(formatter,", ")?;
					}
					write!(formatter,"{}: {}",key,value)?;
				}
				write!(formatter,"}}")?;
			},
			ConfigurationValue::Array(elements) =>
			{
				write!(formatter,"[")?;
				for (index,value) in elements.iter().enumerate()
				{
					if index>0
					{
						write!(formatter,", ")?;
					}
					write!(formatter,"{}",value)?;
				}
				write!(formatter,"]")?;
			},
			ConfigurationValue::True => write!(formatter,"true")?,
			ConfigurationValue::False => write!(formatter,"false")?,
			ConfigurationValue::None => write!(formatter,"none")?,
		}
		Ok(())
	}
}

///Walk the pairs of a `ConfigurationValue::Object`, checking its name and panicking on unknown keys.
///The second macro argument is the expected object name and the third the identifier binding each pair value inside the arms.
///```ignore
///match_object_panic!(arg.cv,"Thing",value,
///	"elements" => elements = Some(value.as_usize().expect("bad value for elements")),
///);
///```
#[macro_export]
macro_rules! match_object_panic{
	($cv:expr, $name:expr, $valueid:ident) => {
		$crate::match_object_panic!($cv,$name,$valueid,);
	};
	($cv:expr, $name:expr, $valueid:ident, $($arms:tt)*) => {
		if let &ConfigurationValue::Object(ref cv_object_name, ref cv_object_pairs) = $cv
		{
			if cv_object_name!=$name
			{
				panic!("A {} must be created from a `{}` object, received `{}`.",$name,$name,cv_object_name);
			}
			for &(ref cv_pair_name, ref $valueid) in cv_object_pairs.iter()
			{
				match cv_pair_name.as_str()
				{
					$($arms)*
					"legend_name" => (),
					_ => panic!("Nothing to do with field {} in {}",cv_pair_name,$name),
				}
			}
		}
		else
		{
			panic!("Trying to create a {} from a non-Object",$name);
		}
	};
}

#[cfg(test)]
mod tests
{
	use super::*;
	#[test]
	fn object_fields_are_walked()
	{
		let cv = ConfigurationValue::Object("Thing".to_string(),vec![
			("elements".to_string(),ConfigurationValue::Number(3.0)),
			("flag".to_string(),ConfigurationValue::True),
		]);
		let mut elements=None;
		let mut flag=None;
		match_object_panic!(&cv,"Thing",value,
			"elements" => elements=value.as_usize(),
			"flag" => flag=value.as_bool(),
		);
		assert_eq!(elements,Some(3));
		assert_eq!(flag,Some(true));
	}
	#[test]
	#[should_panic]
	fn unknown_field_panics()
	{
		let cv = ConfigurationValue::Object("Thing".to_string(),vec![
			("nonsense".to_string(),ConfigurationValue::True),
		]);
		match_object_panic!(&cv,"Thing",_value);
	}
	#[test]
	fn display_round_shape()
	{
		let cv = ConfigurationValue::Object("Thing".to_string(),vec![
			("elements".to_string(),ConfigurationValue::Array(vec![ConfigurationValue::Number(1.0),ConfigurationValue::True])),
		]);
		assert_eq!(format!("{}",cv),"Thing{elements: [1, true]}");
	}
}
