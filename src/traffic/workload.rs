//! Background and incast traffic generators.
//!
//! Both generators are self-rescheduling events sharing one seeded RNG, so
//! a run is reproducible given the same seed and topology.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use tracing::{debug, info};

use crate::net::{NetWorld, NodeId};
use crate::sim::{Event, SimTime, Simulator, World};

use super::cdf::FlowSizeCdf;

/// Pacing cap for a single background flow.
const MAX_FLOW_RATE_BPS: f64 = 10e9;
/// Nominal duration a background flow is stretched over.
const NOMINAL_FLOW_SECS: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct TrafficOpts {
    pub background_load: f64,
    pub incast_load: f64,
    pub incast_senders: usize,
    pub incast_bytes_per_sender: u64,
    pub pkt_bytes: u32,
    pub server_link_gbps: u64,
    pub duration: SimTime,
    pub seed: u64,
}

impl Default for TrafficOpts {
    fn default() -> Self {
        Self {
            background_load: 0.5,
            incast_load: 0.2,
            incast_senders: 64,
            incast_bytes_per_sender: 20 * 1024,
            pkt_bytes: 1024,
            server_link_gbps: 100,
            duration: SimTime::from_secs(5),
            seed: 1,
        }
    }
}

/// Shared generator state: RNG, the size CDF, and counters.
pub struct TrafficState {
    opts: TrafficOpts,
    cdf: FlowSizeCdf,
    servers: Vec<NodeId>,
    rng: StdRng,
    next_flow_id: u64,
    pub background_flows: u64,
    pub incasts: u64,
}

impl TrafficState {
    pub fn new(opts: TrafficOpts, cdf: FlowSizeCdf, servers: Vec<NodeId>) -> Self {
        assert!(servers.len() >= 2, "traffic needs at least two servers");
        let rng = StdRng::seed_from_u64(opts.seed);
        Self {
            opts,
            cdf,
            servers,
            rng,
            next_flow_id: 1,
            background_flows: 0,
            incasts: 0,
        }
    }

    fn alloc_flow_id(&mut self) -> u64 {
        let id = self.next_flow_id;
        self.next_flow_id += 1;
        id
    }

    fn random_pair(&mut self) -> (NodeId, NodeId) {
        let n = self.servers.len();
        let src = self.rng.gen_range(0..n);
        let mut dst = src;
        while dst == src {
            dst = self.rng.gen_range(0..n);
        }
        (self.servers[src], self.servers[dst])
    }

    /// Background flow arrival rate (flows per second):
    /// load * link_bps * n_servers / (8 * mean_flow_size).
    fn background_lambda(&self) -> f64 {
        let link_bps = self.opts.server_link_gbps as f64 * 1e9;
        let mean = self.cdf.mean_bytes().max(1.0);
        self.opts.background_load * link_bps * self.servers.len() as f64 / (mean * 8.0)
    }

    /// Incast arrival rate (incasts per second):
    /// load * link_bps * n_servers / (8 * senders * bytes_per_sender).
    fn incast_lambda(&self) -> f64 {
        let link_bps = self.opts.server_link_gbps as f64 * 1e9;
        let incast_bytes = (self.opts.incast_senders as u64 * self.opts.incast_bytes_per_sender)
            .max(1) as f64;
        self.opts.incast_load * link_bps * self.servers.len() as f64 / (incast_bytes * 8.0)
    }

    fn next_arrival(&mut self, lambda: f64) -> SimTime {
        let exp = Exp::new(lambda.max(f64::MIN_POSITIVE)).expect("positive rate");
        let secs: f64 = exp.sample(&mut self.rng);
        SimTime((secs * 1e9) as u64)
    }
}

/// Kick off both generators, staggered so the fabric warms up with
/// background flows before the first incast: background at 100 ms, the
/// first incast at 200 ms.
pub fn start_traffic(sim: &mut Simulator, state: Arc<Mutex<TrafficState>>) {
    sim.schedule(
        SimTime::from_millis(100),
        NextBackgroundFlow {
            state: Arc::clone(&state),
        },
    );
    sim.schedule(SimTime::from_millis(200), NextIncast { state });
}

/// Event: inject one flow as a paced train of fixed-size packets.
#[derive(Debug)]
pub struct InjectFlow {
    pub flow_id: u64,
    pub src: NodeId,
    pub dst: NodeId,
    pub pkt_bytes: u32,
    pub remaining_bytes: u64,
    pub gap: SimTime,
}

impl Event for InjectFlow {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let mut me = *self;
        let w = world
            .as_any_mut()
            .downcast_mut::<NetWorld>()
            .expect("world must be NetWorld");

        if me.remaining_bytes == 0 {
            return;
        }

        let chunk = (me.pkt_bytes as u64).min(me.remaining_bytes) as u32;
        let pkt = w.net.make_packet(me.flow_id, chunk, me.src, me.dst);
        w.net.forward_from(me.src, pkt, sim);

        me.remaining_bytes -= chunk as u64;
        if me.remaining_bytes > 0 {
            let gap = me.gap;
            sim.schedule_in(gap, me);
        }
    }
}

/// Event: start one background flow, then reschedule.
struct NextBackgroundFlow {
    state: Arc<Mutex<TrafficState>>,
}

impl Event for NextBackgroundFlow {
    fn execute(self: Box<Self>, sim: &mut Simulator, _world: &mut dyn World) {
        let NextBackgroundFlow { state } = *self;

        let (flow_id, src, dst, size, pkt_bytes, gap, next_in, duration) = {
            let mut st = state.lock().expect("traffic state lock");
            let (src, dst) = st.random_pair();
            let size = {
                // split borrows: cdf sample needs the rng
                let TrafficState { cdf, rng, .. } = &mut *st;
                cdf.sample(rng).max(1)
            };
            let flow_id = st.alloc_flow_id();
            st.background_flows += 1;

            // Pace the train so the flow stretches over ~100 ms, capped at 10 Gbps.
            let rate_bps = (size as f64 * 8.0 / NOMINAL_FLOW_SECS).min(MAX_FLOW_RATE_BPS);
            let gap_ns = (st.opts.pkt_bytes as f64 * 8.0 / rate_bps * 1e9) as u64;

            let lambda = st.background_lambda();
            let next_in = st.next_arrival(lambda);
            (
                flow_id,
                src,
                dst,
                size,
                st.opts.pkt_bytes,
                SimTime(gap_ns),
                next_in,
                st.opts.duration,
            )
        };

        debug!(flow_id, ?src, ?dst, size, "background flow");
        sim.schedule(
            sim.now(),
            InjectFlow {
                flow_id,
                src,
                dst,
                pkt_bytes,
                remaining_bytes: size,
                gap,
            },
        );

        if sim.now().saturating_add(next_in) < duration {
            sim.schedule_in(next_in, NextBackgroundFlow { state });
        }
    }
}

/// Event: start one incast (many senders, one receiver), then reschedule.
struct NextIncast {
    state: Arc<Mutex<TrafficState>>,
}

impl Event for NextIncast {
    fn execute(self: Box<Self>, sim: &mut Simulator, _world: &mut dyn World) {
        let NextIncast { state } = *self;

        let (receiver, senders, flows, bytes, pkt_bytes, next_in, duration) = {
            let mut st = state.lock().expect("traffic state lock");
            let n = st.servers.len();
            let recv_idx = st.rng.gen_range(0..n);
            let receiver = st.servers[recv_idx];

            let mut candidates: Vec<NodeId> = st
                .servers
                .iter()
                .copied()
                .filter(|s| *s != receiver)
                .collect();
            {
                let TrafficState { rng, .. } = &mut *st;
                candidates.shuffle(rng);
            }
            candidates.truncate(st.opts.incast_senders.min(candidates.len()));

            let flows: Vec<u64> = candidates.iter().map(|_| st.alloc_flow_id()).collect();
            st.incasts += 1;

            let lambda = st.incast_lambda();
            let next_in = st.next_arrival(lambda);
            (
                receiver,
                candidates,
                flows,
                st.opts.incast_bytes_per_sender,
                st.opts.pkt_bytes,
                next_in,
                st.opts.duration,
            )
        };

        info!(?receiver, senders = senders.len(), bytes, "incast");
        for (sender, flow_id) in senders.into_iter().zip(flows) {
            sim.schedule(
                sim.now(),
                InjectFlow {
                    flow_id,
                    src: sender,
                    dst: receiver,
                    pkt_bytes,
                    remaining_bytes: bytes,
                    // bulk transfer: back-to-back, the egress queue paces it
                    gap: SimTime::ZERO,
                },
            );
        }

        if sim.now().saturating_add(next_in) < duration {
            sim.schedule_in(next_in, NextIncast { state });
        }
    }
}
