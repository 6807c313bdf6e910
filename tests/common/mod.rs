use std::rc::Rc;
use std::cell::RefCell;

use rand::rngs::StdRng;

use cruce_lib::*;
use cruce_lib::channel::{Channel,new_channel};
use cruce_lib::config_parser::ConfigurationValue;
use cruce_lib::router::{Router,RouterBuilderArgument,new_router};

/*
    Auxiliary functions to create the configuration for the tests plus a small bench driving
    a single router through the global phase order.
*/

/// Encapsulates the parameters needed to create an InputQueued router.
pub struct InputQueuedRouterBuilder
{
    pub num_vcs: usize,
    pub vc_buf_size: usize,
    pub speculative: ConfigurationValue,
    pub filter_spec_grants: String,
    pub hold_switch_for_packet: ConfigurationValue,
    pub routing_function: ConfigurationValue,
    pub routing_delay: usize,
    pub vc_alloc_delay: usize,
    pub st_prepare_delay: usize,
    pub st_final_delay: usize,
    pub credit_delay: usize,
    pub input_speedup: usize,
    pub output_speedup: usize,
    pub vc_allocator: String,
    pub sw_allocator: String,
    pub vc_alloc_arb_type: String,
    pub sw_alloc_arb_type: String,
    pub partition_vcs: ConfigurationValue,
    /// Extra `*_begin_vc`/`*_end_vc` pairs appended verbatim.
    pub vc_class_ranges: Vec<(String,usize)>,
}

impl Default for InputQueuedRouterBuilder
{
    fn default() -> InputQueuedRouterBuilder
    {
        InputQueuedRouterBuilder{
            num_vcs: 2,
            vc_buf_size: 4,
            speculative: ConfigurationValue::False,
            filter_spec_grants: "any_nonspec_gnts".to_string(),
            hold_switch_for_packet: ConfigurationValue::False,
            routing_function: ConfigurationValue::Object("DestTag".to_string(),vec![]),
            routing_delay: 1,
            vc_alloc_delay: 1,
            st_prepare_delay: 0,
            st_final_delay: 1,
            credit_delay: 1,
            input_speedup: 1,
            output_speedup: 1,
            vc_allocator: "separable_input_first".to_string(),
            sw_allocator: "separable_input_first".to_string(),
            vc_alloc_arb_type: "round_robin".to_string(),
            sw_alloc_arb_type: "round_robin".to_string(),
            partition_vcs: ConfigurationValue::False,
            vc_class_ranges: vec![],
        }
    }
}

/// Creates a Configuration Value with the parameters for the InputQueued router.
pub fn create_input_queued_router(arg: InputQueuedRouterBuilder) -> ConfigurationValue
{
    let mut pairs = vec![
        ("num_vcs".to_string(),ConfigurationValue::Number(arg.num_vcs as f64)),
        ("vc_buf_size".to_string(),ConfigurationValue::Number(arg.vc_buf_size as f64)),
        ("speculative".to_string(),arg.speculative),
        ("filter_spec_grants".to_string(),ConfigurationValue::Literal(arg.filter_spec_grants)),
        ("hold_switch_for_packet".to_string(),arg.hold_switch_for_packet),
        ("routing_function".to_string(),arg.routing_function),
        ("routing_delay".to_string(),ConfigurationValue::Number(arg.routing_delay as f64)),
        ("vc_alloc_delay".to_string(),ConfigurationValue::Number(arg.vc_alloc_delay as f64)),
        ("st_prepare_delay".to_string(),ConfigurationValue::Number(arg.st_prepare_delay as f64)),
        ("st_final_delay".to_string(),ConfigurationValue::Number(arg.st_final_delay as f64)),
        ("credit_delay".to_string(),ConfigurationValue::Number(arg.credit_delay as f64)),
        ("input_speedup".to_string(),ConfigurationValue::Number(arg.input_speedup as f64)),
        ("output_speedup".to_string(),ConfigurationValue::Number(arg.output_speedup as f64)),
        ("vc_allocator".to_string(),ConfigurationValue::Literal(arg.vc_allocator)),
        ("sw_allocator".to_string(),ConfigurationValue::Literal(arg.sw_allocator)),
        ("vc_alloc_arb_type".to_string(),ConfigurationValue::Literal(arg.vc_alloc_arb_type)),
        ("sw_alloc_arb_type".to_string(),ConfigurationValue::Literal(arg.sw_alloc_arb_type)),
        ("partition_vcs".to_string(),arg.partition_vcs),
    ];
    for (key,value) in arg.vc_class_ranges
    {
        pairs.push((key,ConfigurationValue::Number(value as f64)));
    }
    ConfigurationValue::Object("InputQueued".to_string(),pairs)
}

/// A single router with its channel endpoints, driven through read/internal/write in order.
pub struct TestBench
{
    pub router: Rc<RefCell<dyn Router>>,
    pub input_channels: Vec<Rc<RefCell<Channel<Flit>>>>,
    pub output_channels: Vec<Rc<RefCell<Channel<Flit>>>>,
    pub input_credit_channels: Vec<Rc<RefCell<Channel<Credit>>>>,
    pub output_credit_channels: Vec<Rc<RefCell<Channel<Credit>>>>,
    pub cycle: Time,
}

impl TestBench
{
    pub fn new(cv:&ConfigurationValue, inputs:usize, outputs:usize) -> TestBench
    {
        let plugs=Plugs::default();
        let input_channels:Vec<_> = (0..inputs).map(|_|new_channel()).collect();
        let output_channels:Vec<_> = (0..outputs).map(|_|new_channel()).collect();
        let input_credit_channels:Vec<_> = (0..inputs).map(|_|new_channel()).collect();
        let output_credit_channels:Vec<_> = (0..outputs).map(|_|new_channel()).collect();
        let router=new_router(RouterBuilderArgument{
            router_index: 0,
            cv,
            plugs: &plugs,
            inputs,
            outputs,
            input_channels: input_channels.clone(),
            output_channels: output_channels.clone(),
            input_credit_channels: input_credit_channels.clone(),
            output_credit_channels: output_credit_channels.clone(),
        }).expect("the router configuration is valid");
        TestBench{
            router,
            input_channels,
            output_channels,
            input_credit_channels,
            output_credit_channels,
            cycle: 0,
        }
    }
    /// Offer a flit on an input wire; the router sees it in the next step.
    pub fn inject(&self, input:usize, flit:Flit)
    {
        self.input_channels[input].borrow_mut().send(Some(flit));
    }
    /// Return downstream credits for an output wire.
    pub fn feed_credit(&self, output:usize, vcs:&[usize])
    {
        let mut credit=Credit::new(vcs.len());
        credit.vc.extend_from_slice(vcs);
        self.output_credit_channels[output].borrow_mut().send(Some(credit));
    }
    /// Run one full cycle: read inputs, internal step, write outputs.
    pub fn step(&mut self, rng:&mut StdRng)
    {
        {
            let mut router=self.router.borrow_mut();
            router.read_inputs(self.cycle);
            router.internal_step(self.cycle,rng);
            router.write_outputs(self.cycle);
        }
        self.cycle+=1;
    }
    /// What the router drove on an output wire during the last step, if anything.
    pub fn collect_flit(&self, output:usize) -> Option<Flit>
    {
        self.output_channels[output].borrow_mut().receive()
    }
    /// What the router drove on an input credit wire during the last step, if anything.
    pub fn collect_credit(&self, input:usize) -> Option<Credit>
    {
        self.input_credit_channels[input].borrow_mut().receive()
    }
}

/// Builds the flits of a packet, head first and tail last. A size of one makes head==tail.
pub fn packet_flits(packet_id:u64, flit_type:FlitType, destination:usize, vc:usize, priority:i32, size:usize) -> Vec<Flit>
{
    (0..size).map(|index|{
        let mut flit=Flit::new(packet_id,flit_type,0,destination,vc);
        flit.head = index==0;
        flit.tail = index==size-1;
        flit.priority=priority;
        flit
    }).collect()
}

/// A single flit packet.
pub fn single_flit(packet_id:u64, destination:usize, vc:usize) -> Flit
{
    packet_flits(packet_id,FlitType::Any,destination,vc,0,1).remove(0)
}
