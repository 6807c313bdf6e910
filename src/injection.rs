/*!

Packet injection processes.

These decide, cycle by cycle, whether a traffic source offers a new packet. They are collaborators of the enclosing driver; nothing in the router pipeline calls them.

The on/off process historically accepted its parameters as a positional list in which the initial-state vector shared a slot with the `r1` probability. Both readings are available, selected by `legacy_initial_index`.

*/

use ::rand::{Rng,rngs::StdRng};

use crate::config_parser::ConfigurationValue;
use crate::error::{Error,SourceLocation};
use crate::{error,source_location,match_object_panic,Plugs,Time};

///The interface that an injection process must follow.
pub trait InjectionProcess
{
	///Whether the given source offers a packet this cycle.
	fn should_inject(&mut self, source:usize, cycle:Time, rng:&mut StdRng) -> bool;
	///Bring the process back to its initial state.
	fn reset(&mut self, rng:&mut StdRng);
}

///Helper structure to build an injection process.
pub struct InjectionBuilderArgument<'a>
{
	///A ConfigurationValue::Object defining the injection process.
	pub cv: &'a ConfigurationValue,
	///Number of traffic sources.
	pub nodes: usize,
	///Offered load in packets per node and cycle.
	pub load: f64,
	///The user defined plugs. In case the process needs to create elements.
	pub plugs: &'a Plugs,
}

///Creates an injection process from a configuration value.
pub fn new_injection_process(arg:InjectionBuilderArgument) -> Result<Box<dyn InjectionProcess>,Error>
{
	if arg.nodes==0
	{
		return Err(error!(out_of_range,"nodes".to_string()));
	}
	if arg.load<0.0 || arg.load>1.0
	{
		return Err(error!(out_of_range,"load".to_string()));
	}
	if let &ConfigurationValue::Object(ref cv_name, ref _cv_pairs)=arg.cv
	{
		if let Some(builder) = arg.plugs.injection_processes.get(cv_name)
		{
			return builder(arg);
		}
		match cv_name.as_ref()
		{
			"Bernoulli" => Ok(Box::new(Bernoulli::new(arg)?)),
			"OnOff" => Ok(Box::new(OnOff::new(arg)?)),
			"Customized" => Ok(Box::new(Customized::new(arg)?)),
			_ => Err(error!(unknown_policy,"injection process".to_string(),cv_name.to_string())),
		}
	}
	else
	{
		Err(error!(ill_formed_configuration,arg.cv.clone()).with_message("Trying to create an injection process from a non-Object".to_string()))
	}
}

///Every source offers a packet each cycle with independent probability `load`.
pub struct Bernoulli
{
	rate: f64,
}

impl Bernoulli
{
	pub fn new(arg:InjectionBuilderArgument) -> Result<Bernoulli,Error>
	{
		let mut rate=arg.load;
		match_object_panic!(arg.cv,"Bernoulli",value,
			"load" => rate=value.as_f64().expect("bad value for load"),
		);
		if !(0.0..=1.0).contains(&rate)
		{
			return Err(error!(out_of_range,"load".to_string()));
		}
		Ok(Bernoulli{rate})
	}
}

impl InjectionProcess for Bernoulli
{
	fn should_inject(&mut self, _source:usize, _cycle:Time, rng:&mut StdRng) -> bool
	{
		rng.gen::<f64>() < self.rate
	}
	fn reset(&mut self, _rng:&mut StdRng)
	{
	}
}

///A two-state modulated process. Each source flips between on and off with probabilities
///`alpha` (off to on) and `beta` (on to off) and, while on, offers a packet with probability `r1`.
///When `r1` is not given it is derived from the load as `load*(alpha+beta)/alpha`.
pub struct OnOff
{
	nodes: usize,
	alpha: f64,
	beta: f64,
	r1: f64,
	///The configured initial on/off vector; empty means random at reset.
	initial: Vec<bool>,
	state: Vec<bool>,
}

impl OnOff
{
	pub fn new(arg:InjectionBuilderArgument) -> Result<OnOff,Error>
	{
		let mut alpha=None;
		let mut beta=None;
		let mut r1=None;
		let mut initial:Option<Vec<bool>>=None;
		let mut legacy_initial_index=true;
		let mut params:Option<&Vec<ConfigurationValue>>=None;
		match_object_panic!(arg.cv,"OnOff",value,
			"alpha" => alpha=Some(value.as_f64().expect("bad value for alpha")),
			"beta" => beta=Some(value.as_f64().expect("bad value for beta")),
			"r1" => r1=Some(value.as_f64().expect("bad value for r1")),
			"initial" => initial=Some(value.as_array().expect("bad value for initial").iter().map(|entry|entry.as_f64().expect("bad value in initial")!=0.0).collect()),
			"legacy_initial_index" => legacy_initial_index=value.as_bool().expect("bad value for legacy_initial_index"),
			"params" => params=Some(value.as_array().expect("bad value for params")),
		);
		//The positional list, when given, fills whatever the explicit keys left unset.
		//Its third slot is ambiguous: legacy configurations carried the initial-state
		//vector there, overlapping the r1 slot. The flag picks the reading.
		if let Some(params)=params
		{
			if alpha.is_none()
			{
				alpha=params.get(0).and_then(|entry|entry.as_f64());
			}
			if beta.is_none()
			{
				beta=params.get(1).and_then(|entry|entry.as_f64());
			}
			let initial_index = if legacy_initial_index { 2 } else { 3 };
			if params.len()>3 && initial.is_none()
			{
				initial=params.get(initial_index).and_then(|entry|entry.as_array()).map(|entries|
					entries.iter().map(|entry|entry.as_f64().map_or(false,|f|f!=0.0)).collect()
				);
			}
			if r1.is_none()
			{
				r1=params.get(2).and_then(|entry|entry.as_f64());
			}
		}
		let alpha=alpha.ok_or_else(||error!(ill_formed_configuration,arg.cv.clone()).with_message("OnOff needs alpha".to_string()))?;
		let beta=beta.ok_or_else(||error!(ill_formed_configuration,arg.cv.clone()).with_message("OnOff needs beta".to_string()))?;
		let r1=match r1
		{
			Some(value) => value,
			None =>
			{
				if alpha<=0.0
				{
					return Err(error!(out_of_range,"alpha".to_string()).with_message("cannot derive r1 with alpha=0".to_string()));
				}
				arg.load*(alpha+beta)/alpha
			},
		};
		for (name,value) in [("alpha",alpha),("beta",beta),("r1",r1)]
		{
			if !(0.0..=1.0).contains(&value)
			{
				return Err(error!(out_of_range,name.to_string()));
			}
		}
		let initial=match initial
		{
			Some(mut values) =>
			{
				if values.is_empty()
				{
					return Err(error!(ill_formed_configuration,arg.cv.clone()).with_message("empty initial state vector".to_string()));
				}
				let last=*values.last().expect("non-empty");
				values.resize(arg.nodes,last);
				values
			},
			None => vec![],
		};
		Ok(OnOff{
			nodes: arg.nodes,
			alpha,
			beta,
			r1,
			initial,
			state: vec![],
		})
	}
	fn ensure_state(&mut self, rng:&mut StdRng)
	{
		if self.state.len()!=self.nodes
		{
			self.reset(rng);
		}
	}
}

impl InjectionProcess for OnOff
{
	fn should_inject(&mut self, source:usize, _cycle:Time, rng:&mut StdRng) -> bool
	{
		self.ensure_state(rng);
		if self.state[source]
		{
			if rng.gen::<f64>() < self.beta
			{
				self.state[source]=false;
			}
		}
		else
		{
			if rng.gen::<f64>() < self.alpha
			{
				self.state[source]=true;
			}
		}
		self.state[source] && rng.gen::<f64>() < self.r1
	}
	fn reset(&mut self, rng:&mut StdRng)
	{
		self.state = if self.initial.is_empty()
		{
			(0..self.nodes).map(|_|rng.gen::<bool>()).collect()
		}
		else
		{
			self.initial.clone()
		};
	}
}

///One table entry of the [Customized] process.
struct CustomizedEntry
{
	source: usize,
	period: Time,
	offset: Time,
}

///Deterministic periodic injection driven by a table.
///```ignore
///Customized{entries: [Entry{source:0, period:4, offset:0}, Entry{source:3, period:2, offset:1}]}
///```
pub struct Customized
{
	entries: Vec<CustomizedEntry>,
}

impl Customized
{
	pub fn new(arg:InjectionBuilderArgument) -> Result<Customized,Error>
	{
		let mut entries=None;
		match_object_panic!(arg.cv,"Customized",value,
			"entries" => entries=Some(value.as_array().expect("bad value for entries").iter().map(|entry_cv|{
				let mut source=None;
				let mut period=None;
				let mut offset=0;
				match_object_panic!(entry_cv,"Entry",entry_value,
					"source" => source=Some(entry_value.as_usize().expect("bad value for source")),
					"period" => period=Some(entry_value.as_time().expect("bad value for period")),
					"offset" => offset=entry_value.as_time().expect("bad value for offset"),
				);
				CustomizedEntry{
					source: source.expect("There were no source"),
					period: period.expect("There were no period"),
					offset,
				}
			}).collect::<Vec<CustomizedEntry>>()),
		);
		let entries:Vec<CustomizedEntry>=entries.ok_or_else(||error!(ill_formed_configuration,arg.cv.clone()).with_message("Customized needs its entries".to_string()))?;
		for entry in entries.iter()
		{
			if entry.period==0 || entry.source>=arg.nodes
			{
				return Err(error!(out_of_range,"entries".to_string()));
			}
		}
		Ok(Customized{entries})
	}
}

impl InjectionProcess for Customized
{
	fn should_inject(&mut self, source:usize, cycle:Time, _rng:&mut StdRng) -> bool
	{
		self.entries.iter().any(|entry|entry.source==source && cycle%entry.period==entry.offset%entry.period)
	}
	fn reset(&mut self, _rng:&mut StdRng)
	{
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use ::rand::SeedableRng;

	fn plugs() -> Plugs
	{
		Plugs::default()
	}

	#[test]
	fn bernoulli_extremes_are_deterministic()
	{
		let mut rng=StdRng::seed_from_u64(1);
		let plugs=plugs();
		let cv=ConfigurationValue::Object("Bernoulli".to_string(),vec![]);
		let mut never=new_injection_process(InjectionBuilderArgument{cv:&cv,nodes:2,load:0.0,plugs:&plugs}).expect("valid");
		let mut always=new_injection_process(InjectionBuilderArgument{cv:&cv,nodes:2,load:1.0,plugs:&plugs}).expect("valid");
		for cycle in 0..50
		{
			assert!(!never.should_inject(0,cycle,&mut rng));
			assert!(always.should_inject(1,cycle,&mut rng));
		}
	}

	#[test]
	fn on_off_initial_vector_slot_depends_on_the_flag()
	{
		let mut rng=StdRng::seed_from_u64(1);
		let plugs=plugs();
		//With alpha=beta=0 the states never flip, so the initial vector decides everything.
		let legacy_cv=ConfigurationValue::Object("OnOff".to_string(),vec![
			("r1".to_string(),ConfigurationValue::Number(1.0)),
			("legacy_initial_index".to_string(),ConfigurationValue::True),
			("params".to_string(),ConfigurationValue::Array(vec![
				ConfigurationValue::Number(0.0),
				ConfigurationValue::Number(0.0),
				ConfigurationValue::Array(vec![ConfigurationValue::Number(1.0),ConfigurationValue::Number(0.0)]),
				ConfigurationValue::Array(vec![ConfigurationValue::Number(0.0),ConfigurationValue::Number(1.0)]),
			])),
		]);
		let mut legacy=new_injection_process(InjectionBuilderArgument{cv:&legacy_cv,nodes:2,load:0.5,plugs:&plugs}).expect("valid");
		assert!(legacy.should_inject(0,0,&mut rng));
		assert!(!legacy.should_inject(1,0,&mut rng));
		let modern_cv=ConfigurationValue::Object("OnOff".to_string(),vec![
			("legacy_initial_index".to_string(),ConfigurationValue::False),
			("params".to_string(),ConfigurationValue::Array(vec![
				ConfigurationValue::Number(0.0),
				ConfigurationValue::Number(0.0),
				ConfigurationValue::Number(1.0),
				ConfigurationValue::Array(vec![ConfigurationValue::Number(0.0),ConfigurationValue::Number(1.0)]),
			])),
		]);
		let mut modern=new_injection_process(InjectionBuilderArgument{cv:&modern_cv,nodes:2,load:0.5,plugs:&plugs}).expect("valid");
		assert!(!modern.should_inject(0,0,&mut rng));
		assert!(modern.should_inject(1,0,&mut rng));
	}

	#[test]
	fn customized_follows_its_table()
	{
		let mut rng=StdRng::seed_from_u64(1);
		let plugs=plugs();
		let cv=ConfigurationValue::Object("Customized".to_string(),vec![
			("entries".to_string(),ConfigurationValue::Array(vec![
				ConfigurationValue::Object("Entry".to_string(),vec![
					("source".to_string(),ConfigurationValue::Number(0.0)),
					("period".to_string(),ConfigurationValue::Number(3.0)),
					("offset".to_string(),ConfigurationValue::Number(1.0)),
				]),
			])),
		]);
		let mut process=new_injection_process(InjectionBuilderArgument{cv:&cv,nodes:2,load:0.5,plugs:&plugs}).expect("valid");
		let injections:Vec<bool>=(0..6).map(|cycle|process.should_inject(0,cycle,&mut rng)).collect();
		assert_eq!(injections,vec![false,true,false,false,true,false]);
		assert!(!process.should_inject(1,1,&mut rng));
	}
}
