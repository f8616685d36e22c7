use clap::Parser;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use wsim_rs::net::{NetWorld, Stats};
use wsim_rs::sim::{SimTime, Simulator};
use wsim_rs::topo::fat_tree::{build_fat_tree, FatTreeOpts};
use wsim_rs::traffic::{start_traffic, FlowSizeCdf, TrafficOpts, TrafficState};

#[derive(Debug, Parser)]
#[command(
    name = "fat-tree-sim",
    about = "Three-tier fat-tree datacenter simulation: Hadoop background traffic plus incast"
)]
struct Args {
    /// Number of racks (one ToR each)
    #[arg(long, default_value_t = 20)]
    racks: usize,

    /// Servers per rack
    #[arg(long, default_value_t = 16)]
    servers_per_rack: usize,

    /// Aggregation switches
    #[arg(long, default_value_t = 20)]
    agg: usize,

    /// Core switches
    #[arg(long, default_value_t = 16)]
    core: usize,

    /// Server-ToR link rate (Gbps)
    #[arg(long, default_value_t = 100)]
    server_gbps: u64,

    /// Switch-switch link rate (Gbps)
    #[arg(long, default_value_t = 400)]
    switch_gbps: u64,

    /// Per-link latency (us)
    #[arg(long, default_value_t = 1)]
    link_latency_us: u64,

    /// Switch egress buffer (MB)
    #[arg(long, default_value_t = 32)]
    buffer_mb: u64,

    /// Background (Hadoop) traffic load on server links
    #[arg(long, default_value_t = 0.5)]
    background_load: f64,

    /// Incast traffic load on server links
    #[arg(long, default_value_t = 0.2)]
    incast_load: f64,

    /// Senders per incast
    #[arg(long, default_value_t = 64)]
    incast_senders: usize,

    /// Bytes each incast sender transmits
    #[arg(long, default_value_t = 20480)]
    incast_bytes: u64,

    /// Simulated duration (ms)
    #[arg(long, default_value_t = 5000)]
    duration_ms: u64,

    /// RNG seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Write a JSON run summary to this path
    #[arg(long)]
    stats_json: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    racks: usize,
    servers: usize,
    background_flows: u64,
    incasts: u64,
    final_time_ns: u64,
    stats: Stats,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut sim = Simulator::default();
    let mut world = NetWorld::default();

    let topo_opts = FatTreeOpts {
        racks: args.racks,
        servers_per_rack: args.servers_per_rack,
        agg_switches: args.agg,
        core_switches: args.core,
        server_link_gbps: args.server_gbps,
        switch_link_gbps: args.switch_gbps,
        link_latency: SimTime::from_micros(args.link_latency_us),
        buffer_bytes: args.buffer_mb.saturating_mul(1024 * 1024),
    };
    let topo = build_fat_tree(&mut world, &topo_opts);

    println!(
        "fat-tree: {} servers in {} racks, {} agg, {} core ({}G edge / {}G fabric, {} MB buffers)",
        topo.servers.len(),
        args.racks,
        args.agg,
        args.core,
        args.server_gbps,
        args.switch_gbps,
        args.buffer_mb
    );

    let traffic_opts = TrafficOpts {
        background_load: args.background_load,
        incast_load: args.incast_load,
        incast_senders: args.incast_senders,
        incast_bytes_per_sender: args.incast_bytes,
        pkt_bytes: 1024,
        server_link_gbps: args.server_gbps,
        duration: SimTime::from_millis(args.duration_ms),
        seed: args.seed,
    };
    let state = Arc::new(Mutex::new(TrafficState::new(
        traffic_opts,
        FlowSizeCdf::hadoop(),
        topo.servers.clone(),
    )));
    start_traffic(&mut sim, Arc::clone(&state));

    sim.run_until(SimTime::from_millis(args.duration_ms), &mut world);

    let (background_flows, incasts) = {
        let st = state.lock().expect("traffic state lock");
        (st.background_flows, st.incasts)
    };

    println!(
        "done @ {:?}, flows={}, incasts={}, delivered_pkts={}, delivered_bytes={}, dropped_pkts={}, dropped_bytes={}",
        sim.now(),
        background_flows,
        incasts,
        world.net.stats.delivered_pkts,
        world.net.stats.delivered_bytes,
        world.net.stats.dropped_pkts,
        world.net.stats.dropped_bytes
    );

    if let Some(path) = args.stats_json {
        let summary = RunSummary {
            racks: args.racks,
            servers: topo.servers.len(),
            background_flows,
            incasts,
            final_time_ns: sim.now().as_nanos(),
            stats: world.net.stats.clone(),
        };
        let json = serde_json::to_string_pretty(&summary).expect("serialize run summary");
        fs::write(&path, json).expect("write stats json");
        eprintln!("wrote run summary to {}", path.display());
    }
}
