//! 三层 fat-tree 拓扑构建
//!
//! 机架式三层结构：每个机架一台 ToR，ToR 与所有汇聚交换机全互联，
//! 汇聚交换机与所有核心交换机全互联。默认参数为 320 台服务器 /
//! 20 机架 / 20 汇聚 / 16 核心，服务器接入 100G，交换机互联 400G。

use crate::net::{NetWorld, NodeId};
use crate::sim::SimTime;

#[derive(Debug, Clone)]
pub struct FatTreeOpts {
    pub racks: usize,
    pub servers_per_rack: usize,
    pub agg_switches: usize,
    pub core_switches: usize,
    pub server_link_gbps: u64,
    pub switch_link_gbps: u64,
    pub link_latency: SimTime,
    /// 交换机出口缓冲（每条链路）
    pub buffer_bytes: u64,
}

impl Default for FatTreeOpts {
    fn default() -> Self {
        Self {
            racks: 20,
            servers_per_rack: 16,
            agg_switches: 20,
            core_switches: 16,
            server_link_gbps: 100,
            switch_link_gbps: 400,
            link_latency: SimTime::from_micros(1),
            buffer_bytes: 32 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FatTreeTopology {
    pub racks: usize,
    pub servers_per_rack: usize,
    pub servers: Vec<NodeId>,
    pub tor_switches: Vec<NodeId>,
    pub agg_switches: Vec<NodeId>,
    pub core_switches: Vec<NodeId>,
}

impl FatTreeTopology {
    /// 按 (机架, 机架内位置) 取服务器
    pub fn server(&self, rack: usize, position: usize) -> NodeId {
        assert!(rack < self.racks, "rack out of range");
        assert!(position < self.servers_per_rack, "position out of range");
        self.servers[rack * self.servers_per_rack + position]
    }

    pub fn tor(&self, rack: usize) -> NodeId {
        self.tor_switches[rack]
    }
}

pub fn build_fat_tree(world: &mut NetWorld, opts: &FatTreeOpts) -> FatTreeTopology {
    assert!(opts.racks >= 1, "fat-tree needs at least one rack");
    assert!(opts.servers_per_rack >= 1, "rack cannot be empty");
    assert!(opts.agg_switches >= 1, "fat-tree needs an aggregation tier");

    let server_bps = opts.server_link_gbps.saturating_mul(1_000_000_000);
    let switch_bps = opts.switch_link_gbps.saturating_mul(1_000_000_000);
    let latency = opts.link_latency;
    let buf = opts.buffer_bytes;

    let mut tor_switches = Vec::with_capacity(opts.racks);
    for rack in 0..opts.racks {
        tor_switches.push(world.net.add_switch(format!("tor{}", rack)));
    }

    let mut agg_switches = Vec::with_capacity(opts.agg_switches);
    for agg in 0..opts.agg_switches {
        agg_switches.push(world.net.add_switch(format!("agg{}", agg)));
    }

    let mut core_switches = Vec::with_capacity(opts.core_switches);
    for core in 0..opts.core_switches {
        core_switches.push(world.net.add_switch(format!("core{}", core)));
    }

    // 服务器挂到各自机架的 ToR
    let mut servers = Vec::with_capacity(opts.racks * opts.servers_per_rack);
    for rack in 0..opts.racks {
        let tor = tor_switches[rack];
        for pos in 0..opts.servers_per_rack {
            let server = world.net.add_server(format!("srv{}_{}", rack, pos));
            world.net.connect(server, tor, latency, server_bps, buf);
            world.net.connect(tor, server, latency, server_bps, buf);
            servers.push(server);
        }
    }

    // ToR <-> 汇聚层全互联
    for &tor in &tor_switches {
        for &agg in &agg_switches {
            world.net.connect(tor, agg, latency, switch_bps, buf);
            world.net.connect(agg, tor, latency, switch_bps, buf);
        }
    }

    // 汇聚层 <-> 核心层全互联
    for &agg in &agg_switches {
        for &core in &core_switches {
            world.net.connect(agg, core, latency, switch_bps, buf);
            world.net.connect(core, agg, latency, switch_bps, buf);
        }
    }

    FatTreeTopology {
        racks: opts.racks,
        servers_per_rack: opts.servers_per_rack,
        servers,
        tor_switches,
        agg_switches,
        core_switches,
    }
}
