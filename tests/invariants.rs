mod common;

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng,SeedableRng};

use cruce_lib::*;
use cruce_lib::channel::new_channel;
use cruce_lib::config_parser::ConfigurationValue;
use cruce_lib::router::{Router,RouterBuilderArgument,new_router};
use common::*;

const NUM_VCS:usize=2;
const BUF_SIZE:usize=4;

///Seeded random traffic through one router, with the bench playing both the upstream
///(respecting the credit protocol) and the downstream (returning every credit). Checks
///occupancy bounds, packet framing per output virtual channel, hop counts and full delivery.
#[test]
fn random_traffic_preserves_the_core_invariants()
{
	let mut rng=StdRng::seed_from_u64(7);
	let cv=create_input_queued_router(InputQueuedRouterBuilder::default());
	let mut bench=TestBench::new(&cv,4,4);
	//Queue random packets per (input, virtual channel). Within one virtual channel the
	//flit stream is strictly sequential, as a wormhole upstream would produce it.
	let mut streams:Vec<Vec<Vec<Flit>>> = (0..4).map(|_| (0..NUM_VCS).map(|_|vec![]).collect() ).collect();
	let mut packet_sizes:HashMap<u64,usize>=HashMap::new();
	let mut injected_flits=0;
	for packet_id in 0..40u64
	{
		let input=rng.gen_range(0..4);
		let vc=rng.gen_range(0..NUM_VCS);
		let destination=rng.gen_range(0..4);
		let size=rng.gen_range(1..=4);
		packet_sizes.insert(packet_id,size);
		injected_flits+=size;
		for flit in packet_flits(packet_id,FlitType::Any,destination,vc,0,size)
		{
			streams[input][vc].push(flit);
		}
	}
	let mut cursor=vec![vec![0usize;NUM_VCS];4];
	let mut outstanding=vec![vec![0usize;NUM_VCS];4];
	let mut injection_rr=vec![0usize;4];
	//(output, output vc) -> (packet id, flits seen so far)
	let mut open:HashMap<(usize,usize),(u64,usize)>=HashMap::new();
	let mut delivered_packets=0;
	let mut delivered_flits=0;
	for _cycle in 0..2000
	{
		//One flit per input and cycle, rotating over the channels that may send.
		for input in 0..4
		{
			for offset in 0..NUM_VCS
			{
				let vc=(injection_rr[input]+offset)%NUM_VCS;
				if cursor[input][vc]<streams[input][vc].len() && outstanding[input][vc]<BUF_SIZE
				{
					bench.inject(input,streams[input][vc][cursor[input][vc]].clone());
					cursor[input][vc]+=1;
					outstanding[input][vc]+=1;
					injection_rr[input]=(vc+1)%NUM_VCS;
					break;
				}
			}
		}
		bench.step(&mut rng);
		for output in 0..4
		{
			if let Some(flit)=bench.collect_flit(output)
			{
				assert_eq!(flit.hops,1,"every traversal adds exactly one hop");
				assert_eq!(flit.from_router,Some(0));
				assert_eq!(flit.destination%4,output,"the flit left by its routed port");
				let key=(output,flit.vc);
				if flit.head
				{
					assert!(!open.contains_key(&key),"two packets interleaved on ({},{})",output,flit.vc);
					open.insert(key,(flit.packet_id,0));
				}
				let entry=open.get_mut(&key).unwrap_or_else(||panic!("body flit without open packet on ({},{})",output,flit.vc));
				assert_eq!(entry.0,flit.packet_id,"foreign flit inside an open packet");
				entry.1+=1;
				if flit.tail
				{
					let expected=packet_sizes[&flit.packet_id];
					assert_eq!(entry.1,expected,"packet {} delivered {} of {} flits",flit.packet_id,entry.1,expected);
					open.remove(&key);
					delivered_packets+=1;
				}
				delivered_flits+=1;
				bench.feed_credit(output,&[flit.vc]);
			}
			for vc in 0..NUM_VCS
			{
				assert!(bench.router.borrow().get_credit(output,Some((vc,vc)))<=BUF_SIZE,"downstream occupancy above the buffer size");
			}
		}
		for input in 0..4
		{
			if let Some(credit)=bench.collect_credit(input)
			{
				for vc in credit.vc
				{
					assert!(outstanding[input][vc]>0,"credit for an empty channel");
					outstanding[input][vc]-=1;
				}
			}
			assert!(bench.router.borrow().get_buffer(input)<=NUM_VCS*BUF_SIZE);
		}
		if delivered_packets==40 && outstanding.iter().flatten().all(|&count|count==0)
		{
			break;
		}
	}
	assert_eq!(delivered_packets,40,"some packet never fully crossed");
	assert_eq!(delivered_flits,injected_flits);
	assert!(open.is_empty());
	for input in 0..4
	{
		assert_eq!(bench.router.borrow().get_buffer(input),0,"a drained router keeps nothing buffered");
	}
	for output in 0..4
	{
		assert_eq!(bench.router.borrow().get_credit(output,None),0,"every credit came home");
	}
}

///Two routers wired back to back. The downstream router sees the flit one cycle after the
///upstream drove it, and the credit makes it back one cycle plus the credit delay after the
///downstream traversal.
#[test]
fn round_trip_through_two_routers()
{
	let mut rng=StdRng::seed_from_u64(3);
	let plugs=Plugs::default();
	let cv=create_input_queued_router(InputQueuedRouterBuilder::default());
	//Channels of router A; its output port 2 wires into input 0 of router B.
	let a_inputs:Vec<_> = (0..4).map(|_|new_channel()).collect();
	let a_outputs:Vec<_> = (0..4).map(|_|new_channel()).collect();
	let a_input_credits:Vec<_> = (0..4).map(|_|new_channel()).collect();
	let a_output_credits:Vec<_> = (0..4).map(|_|new_channel()).collect();
	let mut b_inputs:Vec<_> = (0..4).map(|_|new_channel()).collect();
	let b_outputs:Vec<_> = (0..4).map(|_|new_channel()).collect();
	let mut b_input_credits:Vec<_> = (0..4).map(|_|new_channel()).collect();
	let b_output_credits:Vec<_> = (0..4).map(|_|new_channel()).collect();
	b_inputs[0]=a_outputs[2].clone();
	b_input_credits[0]=a_output_credits[2].clone();
	let router_a=new_router(RouterBuilderArgument{
		router_index: 0,
		cv: &cv,
		plugs: &plugs,
		inputs: 4,
		outputs: 4,
		input_channels: a_inputs.clone(),
		output_channels: a_outputs.clone(),
		input_credit_channels: a_input_credits.clone(),
		output_credit_channels: a_output_credits.clone(),
	}).expect("the configuration is valid");
	let router_b=new_router(RouterBuilderArgument{
		router_index: 1,
		cv: &cv,
		plugs: &plugs,
		inputs: 4,
		outputs: 4,
		input_channels: b_inputs.clone(),
		output_channels: b_outputs.clone(),
		input_credit_channels: b_input_credits.clone(),
		output_credit_channels: b_output_credits.clone(),
	}).expect("the configuration is valid");
	a_inputs[0].borrow_mut().send(Some(single_flit(1,2,0)));
	let mut arrival=None;
	for cycle in 0..12
	{
		//The global order: all routers read, then all step, then all write.
		router_a.borrow_mut().read_inputs(cycle);
		router_b.borrow_mut().read_inputs(cycle);
		router_a.borrow_mut().internal_step(cycle,&mut rng);
		router_b.borrow_mut().internal_step(cycle,&mut rng);
		router_a.borrow_mut().write_outputs(cycle);
		router_b.borrow_mut().write_outputs(cycle);
		if let Some(flit)=b_outputs[2].borrow_mut().receive()
		{
			assert!(arrival.is_none());
			assert_eq!(flit.packet_id,1);
			assert_eq!(flit.hops,2,"one hop per traversed router");
			assert_eq!(flit.from_router,Some(1));
			arrival=Some(cycle);
		}
		//The upstream sees its downstream slot occupied until the credit returns, one
		//cycle plus the credit delay after the downstream traversal.
		if cycle==9
		{
			assert_eq!(router_a.borrow().get_credit(2,Some((0,0))),1);
		}
		if cycle==10
		{
			assert_eq!(router_a.borrow().get_credit(2,Some((0,0))),0);
		}
	}
	//Four cycles inside each router plus one cycle on each wire.
	assert_eq!(arrival,Some(9));
}

///Configuration mistakes surface as errors of the constructor instead of building a broken router.
#[test]
fn bad_configuration_names_are_reported()
{
	let plugs=Plugs::default();
	let build=|cv:&ConfigurationValue|{
		new_router(RouterBuilderArgument{
			router_index: 0,
			cv,
			plugs: &plugs,
			inputs: 4,
			outputs: 4,
			input_channels: (0..4).map(|_|new_channel()).collect(),
			output_channels: (0..4).map(|_|new_channel()).collect(),
			input_credit_channels: (0..4).map(|_|new_channel()).collect(),
			output_credit_channels: (0..4).map(|_|new_channel()).collect(),
		})
	};
	let good=create_input_queued_router(InputQueuedRouterBuilder::default());
	assert!(build(&good).is_ok());
	let bad_allocator=create_input_queued_router(InputQueuedRouterBuilder{
		vc_allocator: "nonsense".to_string(),
		..Default::default()
	});
	assert!(build(&bad_allocator).is_err());
	let bad_arbiter=create_input_queued_router(InputQueuedRouterBuilder{
		sw_alloc_arb_type: "nonsense".to_string(),
		..Default::default()
	});
	assert!(build(&bad_arbiter).is_err());
	let bad_filter=create_input_queued_router(InputQueuedRouterBuilder{
		filter_spec_grants: "nonsense".to_string(),
		..Default::default()
	});
	assert!(build(&bad_filter).is_err());
	let bad_routing=create_input_queued_router(InputQueuedRouterBuilder{
		routing_function: ConfigurationValue::Object("Nonsense".to_string(),vec![]),
		..Default::default()
	});
	assert!(build(&bad_routing).is_err());
	let bad_range=create_input_queued_router(InputQueuedRouterBuilder{
		partition_vcs: ConfigurationValue::True,
		vc_class_ranges: vec![
			("read_request_begin_vc".to_string(),0),
			("read_request_end_vc".to_string(),9),
		],
		..Default::default()
	});
	assert!(build(&bad_range).is_err());
}
