/*!

The input-queued virtual-channel router.

Every cycle runs the canonical pipeline over all virtual channels: input queuing, route computation, virtual channel allocation, switch allocation and switch traversal, followed by time advancement and output queuing. Two decoupled switch allocators serve the non-speculative and the speculative request streams; a configurable filter resolves their conflicts. The crossbar and the credit return path are modeled with [PipelineDelay]s.

*/

use std::cell::RefCell;
use std::collections::VecDeque;
use std::mem::{size_of};
use std::rc::{Rc};
use ::rand::rngs::StdRng;

use super::{Router,RouterBuilderArgument};
use super::buffer_state::BufferState;
use super::monitor::{BufferMonitor,SwitchMonitor};
use super::vc::{Vc,VcState};
use crate::allocator::{Allocator,Request,new_allocator_by_name};
use crate::channel::Channel;
use crate::config_parser::ConfigurationValue;
use crate::error::{Error,SourceLocation};
use crate::flit::{Flit,Credit};
use crate::pipeline::PipelineDelay;
use crate::quantify::Quantifiable;
use crate::routing::{RoutingFunction,RoutingBuilderArgument,RoutingRequest,VcClassRanges,new_routing_function};
use crate::{error,source_location,match_object_panic,Time};

///How a speculative switch grant is checked against the non-speculative stream of the same cycle.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
enum SpecGrantFilter
{
	///Nullify if any non-speculative request existed anywhere this cycle.
	AnyNonSpecGrants,
	///Nullify if some non-speculative request targeted the same expanded output.
	ConflictingNonSpecRequests,
	///Nullify only if a non-speculative grant took the same expanded output.
	ConflictingNonSpecGrants,
}

impl SpecGrantFilter
{
	fn from_name(name:&str) -> Result<SpecGrantFilter,Error>
	{
		match name
		{
			"any_nonspec_gnts" => Ok(SpecGrantFilter::AnyNonSpecGrants),
			"confl_nonspec_reqs" => Ok(SpecGrantFilter::ConflictingNonSpecRequests),
			"confl_nonspec_gnts" => Ok(SpecGrantFilter::ConflictingNonSpecGrants),
			_ => Err(error!(unknown_policy,"filter_spec_grants".to_string(),name.to_string())),
		}
	}
}

pub struct InputQueued
{
	///Its index in the network.
	router_index: usize,
	///The cycle number of the last time InputQueued::internal_step was called. Only for debugging/assertion purposes.
	last_internal_step_at_cycle: Option<Time>,
	inputs: usize,
	outputs: usize,
	num_vcs: usize,
	///Whether virtual channels bid for the switch before their output virtual channel is confirmed.
	speculative: bool,
	filter_spec_grants: SpecGrantFilter,
	///Keep the crossbar binding across all the flits of a packet.
	hold_switch_for_packet: bool,
	input_speedup: usize,
	output_speedup: usize,
	///Cycles a virtual channel dwells in Routing before becoming eligible for allocation.
	routing_delay: Time,
	///Cycles a virtual channel dwells bidding before a virtual channel grant may be taken.
	vc_alloc_delay: Time,
	vc_ranges: VcClassRanges,
	routing_function: Box<dyn RoutingFunction>,
	///The virtual channels, indexed `[input][vc]`.
	vcs: Vec<Vec<Vc>>,
	///The state of the downstream buffers, one per output port.
	next_vcs: Vec<BufferState>,
	vc_allocator: Box<dyn Allocator>,
	sw_allocator: Box<dyn Allocator>,
	spec_sw_allocator: Box<dyn Allocator>,
	///Per expanded input, the first virtual channel looked at in switch allocation.
	///Advances only when a flit is actually forwarded.
	sw_rr_offset: Vec<usize>,
	crossbar_pipe: PipelineDelay<Flit>,
	credit_pipe: PipelineDelay<Credit>,
	///Flits received and not yet moved into their virtual channel, one queue per input.
	input_buffer: Vec<VecDeque<Flit>>,
	output_buffer: Vec<VecDeque<Flit>>,
	in_cred_buffer: Vec<VecDeque<Credit>>,
	out_cred_buffer: Vec<VecDeque<Credit>>,
	///`switch_hold_in[expanded_input]` is the expanded output held by a packet in flight, if any.
	switch_hold_in: Vec<Option<usize>>,
	switch_hold_vc: Vec<Option<usize>>,
	switch_hold_out: Vec<Option<usize>>,
	input_channels: Vec<Rc<RefCell<Channel<Flit>>>>,
	output_channels: Vec<Rc<RefCell<Channel<Flit>>>>,
	input_credit_channels: Vec<Rc<RefCell<Channel<Credit>>>>,
	output_credit_channels: Vec<Rc<RefCell<Channel<Credit>>>>,
	buffer_monitor: BufferMonitor,
	switch_monitor: SwitchMonitor,
}

impl InputQueued
{
	pub fn new(arg:RouterBuilderArgument) -> Result<Rc<RefCell<InputQueued>>,Error>
	{
		let RouterBuilderArgument{
			router_index,
			cv,
			plugs,
			inputs,
			outputs,
			input_channels,
			output_channels,
			input_credit_channels,
			output_credit_channels,
		} = arg;
		let mut num_vcs=None;
		let mut vc_buf_size=None;
		let mut speculative=false;
		let mut filter_spec_grants=SpecGrantFilter::AnyNonSpecGrants;
		let mut hold_switch_for_packet=false;
		let mut input_speedup=1;
		let mut output_speedup=1;
		let mut routing_delay=1;
		let mut vc_alloc_delay=1;
		let mut st_prepare_delay=0;
		let mut st_final_delay=1;
		let mut credit_delay=1;
		let mut vc_allocator_name="separable_input_first".to_string();
		let mut sw_allocator_name="separable_input_first".to_string();
		let mut vc_alloc_arb_type="round_robin".to_string();
		let mut sw_alloc_arb_type="round_robin".to_string();
		let mut routing_function_cv=None;
		let mut partition_vcs=false;
		let mut read_request_begin_vc=None;
		let mut read_request_end_vc=None;
		let mut read_reply_begin_vc=None;
		let mut read_reply_end_vc=None;
		let mut write_request_begin_vc=None;
		let mut write_request_end_vc=None;
		let mut write_reply_begin_vc=None;
		let mut write_reply_end_vc=None;
		match_object_panic!(cv,"InputQueued",value,
			"num_vcs" => num_vcs=Some(value.as_usize().expect("bad value for num_vcs")),
			"vc_buf_size" => vc_buf_size=Some(value.as_usize().expect("bad value for vc_buf_size")),
			"speculative" => speculative=value.as_bool().expect("bad value for speculative"),
			"filter_spec_grants" => filter_spec_grants=SpecGrantFilter::from_name(value.as_str().expect("bad value for filter_spec_grants"))?,
			"hold_switch_for_packet" => hold_switch_for_packet=value.as_bool().expect("bad value for hold_switch_for_packet"),
			"input_speedup" => input_speedup=value.as_usize().expect("bad value for input_speedup"),
			"output_speedup" => output_speedup=value.as_usize().expect("bad value for output_speedup"),
			"routing_delay" => routing_delay=value.as_time().expect("bad value for routing_delay"),
			"vc_alloc_delay" => vc_alloc_delay=value.as_time().expect("bad value for vc_alloc_delay"),
			"sw_alloc_delay" => (),//switch allocation runs every cycle
			"st_prepare_delay" => st_prepare_delay=value.as_usize().expect("bad value for st_prepare_delay"),
			"st_final_delay" => st_final_delay=value.as_usize().expect("bad value for st_final_delay"),
			"credit_delay" => credit_delay=value.as_usize().expect("bad value for credit_delay"),
			"vc_allocator" => vc_allocator_name=value.as_str().expect("bad value for vc_allocator").to_string(),
			"sw_allocator" => sw_allocator_name=value.as_str().expect("bad value for sw_allocator").to_string(),
			"vc_alloc_arb_type" => vc_alloc_arb_type=value.as_str().expect("bad value for vc_alloc_arb_type").to_string(),
			"sw_alloc_arb_type" => sw_alloc_arb_type=value.as_str().expect("bad value for sw_alloc_arb_type").to_string(),
			"routing_function" => routing_function_cv=Some(value),
			"partition_vcs" => partition_vcs=value.as_bool().expect("bad value for partition_vcs"),
			"read_request_begin_vc" => read_request_begin_vc=Some(value.as_usize().expect("bad value for read_request_begin_vc")),
			"read_request_end_vc" => read_request_end_vc=Some(value.as_usize().expect("bad value for read_request_end_vc")),
			"read_reply_begin_vc" => read_reply_begin_vc=Some(value.as_usize().expect("bad value for read_reply_begin_vc")),
			"read_reply_end_vc" => read_reply_end_vc=Some(value.as_usize().expect("bad value for read_reply_end_vc")),
			"write_request_begin_vc" => write_request_begin_vc=Some(value.as_usize().expect("bad value for write_request_begin_vc")),
			"write_request_end_vc" => write_request_end_vc=Some(value.as_usize().expect("bad value for write_request_end_vc")),
			"write_reply_begin_vc" => write_reply_begin_vc=Some(value.as_usize().expect("bad value for write_reply_begin_vc")),
			"write_reply_end_vc" => write_reply_end_vc=Some(value.as_usize().expect("bad value for write_reply_end_vc")),
		);
		let num_vcs=num_vcs.expect("There were no num_vcs");
		let vc_buf_size=vc_buf_size.expect("There were no vc_buf_size");
		let routing_function_cv=routing_function_cv.expect("There were no routing_function");
		if num_vcs==0
		{
			return Err(error!(out_of_range,"num_vcs".to_string()));
		}
		if vc_buf_size==0
		{
			return Err(error!(out_of_range,"vc_buf_size".to_string()));
		}
		if input_speedup==0 || output_speedup==0
		{
			return Err(error!(out_of_range,"input_speedup/output_speedup".to_string()));
		}
		if input_channels.len()!=inputs || input_credit_channels.len()!=inputs || output_channels.len()!=outputs || output_credit_channels.len()!=outputs
		{
			return Err(error!(bad_argument).with_message(format!("channel counts do not match inputs={} outputs={}",inputs,outputs)));
		}
		let vc_ranges = if partition_vcs
		{
			VcClassRanges::new(true,
				(read_request_begin_vc.unwrap_or(0),read_request_end_vc.unwrap_or(num_vcs-1)),
				(read_reply_begin_vc.unwrap_or(0),read_reply_end_vc.unwrap_or(num_vcs-1)),
				(write_request_begin_vc.unwrap_or(0),write_request_end_vc.unwrap_or(num_vcs-1)),
				(write_reply_begin_vc.unwrap_or(0),write_reply_end_vc.unwrap_or(num_vcs-1)),
				num_vcs)?
		}
		else
		{
			VcClassRanges::unpartitioned(num_vcs)
		};
		let routing_function=new_routing_function(RoutingBuilderArgument{cv:routing_function_cv,plugs})?;
		let vcs=(0..inputs).map(|_|
			(0..num_vcs).map(|_|Vc::new(vc_buf_size)).collect()
		).collect();
		let next_vcs=(0..outputs).map(|_|BufferState::new(num_vcs,vc_buf_size)).collect();
		let vc_allocator=new_allocator_by_name(&vc_allocator_name,&vc_alloc_arb_type,inputs*num_vcs,outputs*num_vcs)?;
		let sw_allocator=new_allocator_by_name(&sw_allocator_name,&sw_alloc_arb_type,inputs*input_speedup,outputs*output_speedup)?;
		let spec_sw_allocator=new_allocator_by_name(&sw_allocator_name,&sw_alloc_arb_type,inputs*input_speedup,outputs*output_speedup)?;
		let crossbar_pipe=PipelineDelay::new(outputs*output_speedup,st_prepare_delay+st_final_delay);
		let credit_pipe=PipelineDelay::new(inputs,credit_delay);
		let r=Rc::new(RefCell::new(InputQueued{
			router_index,
			last_internal_step_at_cycle: None,
			inputs,
			outputs,
			num_vcs,
			speculative,
			filter_spec_grants,
			hold_switch_for_packet,
			input_speedup,
			output_speedup,
			routing_delay,
			vc_alloc_delay,
			vc_ranges,
			routing_function,
			vcs,
			next_vcs,
			vc_allocator,
			sw_allocator,
			spec_sw_allocator,
			sw_rr_offset: vec![0;inputs*input_speedup],
			crossbar_pipe,
			credit_pipe,
			input_buffer: (0..inputs).map(|_|VecDeque::new()).collect(),
			output_buffer: (0..outputs).map(|_|VecDeque::new()).collect(),
			in_cred_buffer: (0..inputs).map(|_|VecDeque::new()).collect(),
			out_cred_buffer: (0..outputs).map(|_|VecDeque::new()).collect(),
			switch_hold_in: vec![None;inputs*input_speedup],
			switch_hold_vc: vec![None;inputs*input_speedup],
			switch_hold_out: vec![None;outputs*output_speedup],
			input_channels,
			output_channels,
			input_credit_channels,
			output_credit_channels,
			buffer_monitor: BufferMonitor::new(inputs),
			switch_monitor: SwitchMonitor::new(inputs,outputs),
		}));
		Ok(r)
	}

	fn receive_flits(&mut self)
	{
		self.buffer_monitor.cycle();
		for input in 0..self.inputs
		{
			if let Some(flit)=self.input_channels[input].borrow_mut().receive()
			{
				self.buffer_monitor.write(input,&flit);
				self.input_buffer[input].push_back(flit);
			}
		}
	}

	fn receive_credits(&mut self)
	{
		for output in 0..self.outputs
		{
			if let Some(credit)=self.output_credit_channels[output].borrow_mut().receive()
			{
				self.out_cred_buffer[output].push_back(credit);
			}
		}
	}

	///Move one received flit per input into its virtual channel, start routing newly headed
	///channels, and account one received credit per output.
	fn input_queuing(&mut self)
	{
		for input in 0..self.inputs
		{
			if let Some(flit)=self.input_buffer[input].pop_front()
			{
				let vc=flit.vc;
				if vc>=self.num_vcs
				{
					panic!("Received a flit for virtual channel {} of {}",vc,self.num_vcs);
				}
				if flit.watch
				{
					println!("Received flit at router {}",self.router_index);
					print!("{}",flit);
				}
				self.vcs[input][vc].add_flit(flit).expect("VC buffer overflow");
			}
		}
		for input in 0..self.inputs
		{
			for vc in 0..self.num_vcs
			{
				if let VcState::Idle=self.vcs[input][vc].state()
				{
					let head=self.vcs[input][vc].front_flit().cloned();
					if let Some(flit)=head
					{
						if !flit.head
						{
							panic!("Received non-head flit at idle VC, router={} input={} vc={}",self.router_index,input,vc);
						}
						let request=RoutingRequest{
							router_index: self.router_index,
							num_outputs: self.outputs,
							num_vcs: self.num_vcs,
							input_port: input,
							vc_range: self.vc_ranges.range_for(flit.flit_type,self.num_vcs),
							flit: &flit,
						};
						self.vcs[input][vc].route(self.routing_function.as_ref(),&request);
						self.vcs[input][vc].set_state(VcState::Routing);
					}
				}
			}
		}
		for output in 0..self.outputs
		{
			if let Some(credit)=self.out_cred_buffer[output].pop_front()
			{
				self.next_vcs[output].process_credit(&credit);
			}
		}
	}

	///Move the channels whose routing dwell has elapsed into their allocation state.
	fn route(&mut self)
	{
		for input in 0..self.inputs
		{
			for vc in 0..self.num_vcs
			{
				let cur=&mut self.vcs[input][vc];
				if cur.state()==VcState::Routing && cur.state_time()>=self.routing_delay
				{
					if self.speculative
					{
						cur.set_state(VcState::VcSpec);
					}
					else
					{
						cur.set_state(VcState::VcAlloc);
					}
				}
			}
		}
	}

	///Register one request per candidate output virtual channel that is currently available.
	fn add_vc_requests(&mut self, input:usize, vc:usize)
	{
		let cur=&self.vcs[input][vc];
		//On the input side a channel may request several output virtual channels, prioritized
		//by the routing function. On the output side competing channels are ordered by their
		//packet priorities.
		let out_priority=cur.priority();
		let watch=cur.front_flit().map_or(false,|f|f.watch);
		let route_set=cur.route_set().expect("a bidding VC keeps its routing result");
		let client=input*self.num_vcs+vc;
		for output in 0..self.outputs
		{
			let vc_cnt=route_set.num_vcs(output);
			for vc_index in 0..vc_cnt
			{
				let (out_vc,in_priority)=route_set.get_vc(output,vc_index).expect("the index was counted");
				if watch
				{
					print!("  trying vc {} (out = {}) ... ",out_vc,output);
				}
				if self.next_vcs[output].is_available_for(out_vc)
				{
					self.vc_allocator.add_request(Request{
						client,
						resource: output*self.num_vcs+out_vc,
						label: 1,
						client_priority: in_priority,
						resource_priority: out_priority,
					});
					if watch
					{
						println!("available");
					}
				}
				else if watch
				{
					println!("busy");
				}
			}
		}
	}

	///Virtual channel allocation. Eligible channels bid for every available candidate and the
	///winners take their downstream buffer.
	fn vc_alloc(&mut self, rng:&mut StdRng)
	{
		self.vc_allocator.clear();
		for input in 0..self.inputs
		{
			for vc in 0..self.num_vcs
			{
				let state=self.vcs[input][vc].state();
				if (state==VcState::VcAlloc || state==VcState::VcSpec) && self.vcs[input][vc].state_time()>=self.vc_alloc_delay
				{
					if self.vcs[input][vc].front_flit().map_or(false,|f|f.watch)
					{
						println!("VC requesting allocation at router {}",self.router_index);
						println!("  input_index = {}",input*self.num_vcs+vc);
					}
					self.add_vc_requests(input,vc);
				}
			}
		}
		let granted=self.vc_allocator.perform_allocation(rng);
		for request in granted.iter()
		{
			let match_input=request.client/self.num_vcs;
			let match_vc=request.client%self.num_vcs;
			let output=request.resource/self.num_vcs;
			let out_vc=request.resource%self.num_vcs;
			let cur=&mut self.vcs[match_input][match_vc];
			if self.speculative
			{
				cur.set_state(VcState::VcSpecGrant);
			}
			else
			{
				cur.set_state(VcState::Active);
			}
			cur.set_output(output,out_vc);
			self.next_vcs[output].take_buffer(out_vc);
			if cur.front_flit().map_or(false,|f|f.watch)
			{
				println!("Granted VC allocation at router {} (input index {})",self.router_index,request.client);
			}
		}
	}

	///The output port a speculative bid goes for: the bound one when the grant already
	///happened, the first routed candidate otherwise.
	fn speculative_port(&self, input:usize, vc:usize) -> Option<usize>
	{
		let cur=&self.vcs[input][vc];
		cur.output_port().or_else(||cur.route_set().and_then(|route_set|route_set.first_port()))
	}

	///Switch allocation and traversal.
	fn sw_alloc(&mut self, rng:&mut StdRng)
	{
		let mut any_nonspec_reqs=false;
		let mut any_nonspec_output_reqs=vec![false;self.outputs*self.output_speedup];
		self.sw_allocator.clear();
		self.spec_sw_allocator.clear();
		for input in 0..self.inputs
		{
			for s in 0..self.input_speedup
			{
				let expanded_input=s*self.inputs+input;
				//Round-robin arbitration between the several requesting virtual channels of
				//the same input, starting past the last one actually served.
				let mut vc=self.sw_rr_offset[expanded_input];
				for _v in 0..self.num_vcs
				{
					//Virtual channels are interleaved over the expanded inputs; those of
					//another speedup set are handled by a different iteration over s.
					if vc%self.input_speedup != s
					{
						vc=(vc+1)%self.num_vcs;
						continue;
					}
					let cur=&self.vcs[input][vc];
					//A channel activated this very cycle bids from the next one on; the
					//speculative stream below is what covers the grant cycle itself.
					if cur.state()==VcState::Active && cur.state_time()>=1 && !cur.is_empty()
					{
						let out_port=cur.output_port().expect("an active VC is bound to an output");
						let out_vc=cur.output_vc().expect("an active VC is bound to an output");
						if !self.next_vcs[out_port].is_full_for(out_vc)
						{
							let expanded_output=(input%self.output_speedup)*self.outputs+out_port;
							if self.switch_hold_in[expanded_input].is_none() && self.switch_hold_out[expanded_output].is_none()
							{
								//A previous virtual channel of this expanded input may have
								//requested the same pair; the allocator keeps the one with
								//the dominating priority.
								self.sw_allocator.add_request(Request{
									client: expanded_input,
									resource: expanded_output,
									label: vc as i32,
									client_priority: cur.priority(),
									resource_priority: cur.priority(),
								});
								any_nonspec_reqs=true;
								any_nonspec_output_reqs[expanded_output]=true;
							}
						}
					}
					//A channel still waiting on the virtual channel allocation bids for the
					//switch anyway. These requests live in a separate allocator so they
					//cannot interfere with the non-speculative ones; buffer availability
					//cannot be checked yet so they are admitted regardless of it.
					let enter_spec_sw_req = !cur.is_empty() &&
						(cur.state()==VcState::VcSpec || cur.state()==VcState::VcSpecGrant);
					if enter_spec_sw_req
					{
						if let Some(out_port)=self.speculative_port(input,vc)
						{
							let expanded_output=(input%self.output_speedup)*self.outputs+out_port;
							if self.switch_hold_in[expanded_input].is_none() && self.switch_hold_out[expanded_output].is_none()
							{
								let priority=self.vcs[input][vc].priority();
								self.spec_sw_allocator.add_request(Request{
									client: expanded_input,
									resource: expanded_output,
									label: vc as i32,
									client_priority: priority,
									resource_priority: priority,
								});
							}
						}
					}
					vc=(vc+1)%self.num_vcs;
				}
			}
		}
		self.sw_allocator.perform_allocation(rng);
		self.spec_sw_allocator.perform_allocation(rng);
		//Promote the speculative grants now that their switch bid has been processed. The
		//channels left unpromoted will not release the flits speculatively sent to the switch.
		for input in 0..self.inputs
		{
			for vc in 0..self.num_vcs
			{
				if self.vcs[input][vc].state()==VcState::VcSpecGrant
				{
					self.vcs[input][vc].set_state(VcState::Active);
				}
			}
		}
		//Winning flits cross the switch.
		self.crossbar_pipe.write_all(None);
		self.switch_monitor.cycle();
		for input in 0..self.inputs
		{
			let mut credit:Option<Credit>=None;
			for s in 0..self.input_speedup
			{
				let mut use_spec_grant=false;
				let expanded_input=s*self.inputs+input;
				let mut vc=None;
				let expanded_output = if let Some(held)=self.switch_hold_in[expanded_input]
				{
					let held_vc=self.switch_hold_vc[expanded_input].expect("a held input keeps its vc");
					if self.vcs[input][held_vc].is_empty()
					{
						//Cancel the held match for this cycle if the channel ran dry.
						None
					}
					else
					{
						vc=Some(held_vc);
						Some(held)
					}
				}
				else
				{
					match self.sw_allocator.resource_assigned(expanded_input)
					{
						Some(assigned) => Some(assigned),
						None => match self.spec_sw_allocator.resource_assigned(expanded_input)
						{
							Some(assigned) =>
							{
								let nullified=match self.filter_spec_grants
								{
									SpecGrantFilter::AnyNonSpecGrants => any_nonspec_reqs,
									SpecGrantFilter::ConflictingNonSpecRequests => any_nonspec_output_reqs[assigned],
									SpecGrantFilter::ConflictingNonSpecGrants => self.sw_allocator.client_assigned(assigned).is_some(),
								};
								if nullified
								{
									None
								}
								else
								{
									use_spec_grant=true;
									Some(assigned)
								}
							},
							None => None,
						},
					}
				};
				if let Some(expanded_output)=expanded_output
				{
					let output=expanded_output%self.outputs;
					if self.switch_hold_in[expanded_input].is_none()
					{
						let allocator=if use_spec_grant { &self.spec_sw_allocator } else { &self.sw_allocator };
						let request=allocator.read_request(expanded_input,expanded_output).expect("a grant points at a stored request");
						vc=Some(request.label as usize);
					}
					let vc=vc.expect("either the hold or the grant named a vc");
					//A speculative switch winner whose virtual channel allocation failed is
					//still unpromoted here; its flit is discarded without being consumed.
					if self.vcs[input][vc].state()==VcState::Active
					{
						let out_port=self.vcs[input][vc].output_port().expect("an active VC is bound to an output");
						let out_vc=self.vcs[input][vc].output_vc().expect("an active VC is bound to an output");
						assert_eq!(out_port,output,"the granted expanded output does not match the bound port");
						if self.next_vcs[out_port].is_full_for(out_vc)
						{
							//Transient back-pressure. The flit stays in place.
							continue;
						}
						let mut flit=self.vcs[input][vc].remove_flit().expect("an active non-empty VC has a flit");
						flit.hops+=1;
						self.switch_monitor.traversal(input,output,&flit);
						self.buffer_monitor.read(input,&flit);
						if flit.watch
						{
							println!("Forwarding flit through crossbar at router {}:",self.router_index);
							print!("{}",flit);
							println!("  input: {}  output: {}",expanded_input,expanded_output);
						}
						let entry=credit.get_or_insert_with(||Credit::new(self.num_vcs));
						entry.vc.push(flit.vc);
						entry.dest_router=flit.from_router;
						flit.vc=out_vc;
						self.next_vcs[out_port].sending_flit(&flit);
						let is_tail=flit.tail;
						self.crossbar_pipe.write(expanded_output,flit);
						if is_tail
						{
							self.vcs[input][vc].set_state(VcState::Idle);
							self.switch_hold_in[expanded_input]=None;
							self.switch_hold_vc[expanded_input]=None;
							self.switch_hold_out[expanded_output]=None;
						}
						else
						{
							if self.hold_switch_for_packet
							{
								self.switch_hold_in[expanded_input]=Some(expanded_output);
								self.switch_hold_vc[expanded_input]=Some(vc);
								self.switch_hold_out[expanded_output]=Some(expanded_input);
							}
							self.sw_rr_offset[expanded_input]=(vc+1)%self.num_vcs;
						}
					}
				}
			}
			if let Some(credit)=credit
			{
				self.credit_pipe.write(input,credit);
			}
		}
	}

	///Move whatever reached the head of the crossbar and credit pipelines into the outgoing queues.
	fn output_queuing(&mut self)
	{
		for output in 0..self.outputs
		{
			for t in 0..self.output_speedup
			{
				let expanded_output=self.outputs*t+output;
				if let Some(flit)=self.crossbar_pipe.read(expanded_output)
				{
					self.output_buffer[output].push_back(flit);
				}
			}
		}
		for input in 0..self.inputs
		{
			if let Some(credit)=self.credit_pipe.read(input)
			{
				self.in_cred_buffer[input].push_back(credit);
			}
		}
	}

	fn send_flits(&mut self)
	{
		for output in 0..self.outputs
		{
			let flit=self.output_buffer[output].pop_front().map(|mut flit|{
				flit.from_router=Some(self.router_index);
				flit
			});
			self.output_channels[output].borrow_mut().send(flit);
		}
	}

	fn send_credits(&mut self)
	{
		for input in 0..self.inputs
		{
			let credit=self.in_cred_buffer[input].pop_front();
			self.input_credit_channels[input].borrow_mut().send(credit);
		}
	}
}

impl Router for InputQueued
{
	fn read_inputs(&mut self, _current_cycle:Time)
	{
		self.receive_flits();
		self.receive_credits();
	}
	fn internal_step(&mut self, current_cycle:Time, rng:&mut StdRng)
	{
		if let Some(last)=self.last_internal_step_at_cycle
		{
			if last>=current_cycle
			{
				panic!("Trying to process at cycle {} a router::InputQueued already processed at {}",current_cycle,last);
			}
		}
		self.last_internal_step_at_cycle=Some(current_cycle);
		self.input_queuing();
		self.route();
		self.vc_alloc(rng);
		self.sw_alloc(rng);
		for input in 0..self.inputs
		{
			for vc in 0..self.num_vcs
			{
				self.vcs[input][vc].advance_time();
			}
		}
		self.crossbar_pipe.advance();
		self.credit_pipe.advance();
		self.output_queuing();
	}
	fn write_outputs(&mut self, _current_cycle:Time)
	{
		self.send_flits();
		self.send_credits();
	}
	fn num_virtual_channels(&self) -> usize
	{
		self.num_vcs
	}
	fn get_credit(&self, output:usize, vc_range:Option<(usize,usize)>) -> usize
	{
		if output>=self.outputs
		{
			panic!("get_credit on output {} of {}",output,self.outputs);
		}
		let (vc_begin,vc_end)=match vc_range
		{
			None => (0,self.num_vcs-1),
			Some(range) => range,
		};
		(vc_begin..vc_end+1).map(|vc|self.next_vcs[output].size(vc)).sum()
	}
	fn get_buffer(&self, input:usize) -> usize
	{
		self.vcs[input].iter().map(|vc|vc.len()).sum()
	}
	fn display(&self)
	{
		println!("Router {}:",self.router_index);
		for input in 0..self.inputs
		{
			for vc in 0..self.num_vcs
			{
				println!("  input {} vc {}: {}",input,vc,self.vcs[input][vc]);
			}
		}
	}
}

impl Quantifiable for InputQueued
{
	fn total_memory(&self) -> usize
	{
		return size_of::<InputQueued>()
			+ self.vcs.iter().flat_map(|input|input.iter()).map(|vc|vc.total_memory()).sum::<usize>()
			+ self.next_vcs.iter().map(|bs|bs.total_memory()).sum::<usize>()
			+ self.crossbar_pipe.total_memory()
			+ self.buffer_monitor.total_memory()
			+ self.switch_monitor.total_memory();
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
