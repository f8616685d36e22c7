use std::sync::{Arc, Mutex};

use crate::net::NetWorld;
use crate::sim::{SimTime, Simulator};
use crate::topo::fat_tree::{build_fat_tree, FatTreeOpts};
use crate::traffic::{start_traffic, FlowSizeCdf, InjectFlow, TrafficOpts, TrafficState};

fn tiny_topo(world: &mut NetWorld) -> crate::topo::fat_tree::FatTreeTopology {
    build_fat_tree(
        world,
        &FatTreeOpts {
            racks: 2,
            servers_per_rack: 2,
            agg_switches: 2,
            core_switches: 1,
            server_link_gbps: 1,
            switch_link_gbps: 4,
            link_latency: SimTime::from_micros(1),
            buffer_bytes: 1024 * 1024,
        },
    )
}

#[test]
fn inject_flow_delivers_whole_flow_as_packet_train() {
    let mut sim = Simulator::default();
    let mut world = NetWorld::default();
    let topo = tiny_topo(&mut world);

    let src = topo.server(0, 0);
    let dst = topo.server(1, 1);
    sim.schedule(
        SimTime::ZERO,
        InjectFlow {
            flow_id: 9,
            src,
            dst,
            pkt_bytes: 1024,
            remaining_bytes: 5_000,
            gap: SimTime::from_micros(10),
        },
    );
    sim.run(&mut world);

    // 4 full packets plus a 904-byte tail.
    assert_eq!(world.net.stats.delivered_pkts, 5);
    assert_eq!(world.net.stats.delivered_bytes, 5_000);
    assert_eq!(world.net.stats.dropped_pkts, 0);
}

#[test]
fn generators_produce_traffic_and_stop_at_duration() {
    let mut sim = Simulator::default();
    let mut world = NetWorld::default();
    let topo = tiny_topo(&mut world);

    let duration = SimTime::from_millis(120);
    let opts = TrafficOpts {
        background_load: 0.3,
        // First incast would fire at 200 ms, past the horizon.
        incast_load: 0.0,
        incast_senders: 2,
        incast_bytes_per_sender: 2_048,
        pkt_bytes: 1024,
        server_link_gbps: 1,
        duration,
        seed: 11,
    };
    let state = Arc::new(Mutex::new(TrafficState::new(
        opts,
        FlowSizeCdf::hadoop(),
        topo.servers.clone(),
    )));
    start_traffic(&mut sim, Arc::clone(&state));

    sim.run_until(duration, &mut world);

    let st = state.lock().expect("traffic state lock");
    assert!(st.background_flows > 0, "no background flows generated");
    assert_eq!(st.incasts, 0);
    assert!(world.net.stats.delivered_pkts > 0);
    assert_eq!(sim.now(), duration);
}

#[test]
fn same_seed_same_schedule() {
    let run = |seed: u64| {
        let mut sim = Simulator::default();
        let mut world = NetWorld::default();
        let topo = tiny_topo(&mut world);
        let duration = SimTime::from_millis(110);
        let state = Arc::new(Mutex::new(TrafficState::new(
            TrafficOpts {
                background_load: 0.2,
                incast_load: 0.0,
                server_link_gbps: 1,
                duration,
                seed,
                ..TrafficOpts::default()
            },
            FlowSizeCdf::hadoop(),
            topo.servers.clone(),
        )));
        start_traffic(&mut sim, Arc::clone(&state));
        sim.run_until(duration, &mut world);
        let st = state.lock().expect("traffic state lock");
        (st.background_flows, world.net.stats.delivered_bytes)
    };

    assert_eq!(run(5), run(5));
}
