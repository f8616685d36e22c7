//! 网络拓扑管理
//!
//! 定义网络拓扑结构，包含节点、链路、数据包转发（store-and-forward +
//! ECMP）和统计信息。

use std::collections::HashMap;

use super::deliver_packet::DeliverPacket;
use super::id::{LinkId, NodeId};
use super::link::Link;
use super::link_ready::LinkReady;
use super::node::{Node, Server, Switch};
use super::packet::Packet;
use super::routing::RoutingTable;
use super::stats::Stats;
use crate::sim::{SimTime, Simulator};
use tracing::{debug, trace, warn};

/// 网络拓扑
pub struct Network {
    nodes: Vec<Option<Box<dyn Node>>>,
    links: Vec<Link>,
    edges: HashMap<(NodeId, NodeId), LinkId>,
    adj: Vec<Vec<NodeId>>,
    rev_adj: Vec<Vec<NodeId>>,
    routing: RoutingTable,
    next_pkt_id: u64,
    pub stats: Stats,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            edges: HashMap::new(),
            adj: Vec::new(),
            rev_adj: Vec::new(),
            routing: RoutingTable::new(0x5ca1ab1e),
            next_pkt_id: 0,
            stats: Stats::default(),
        }
    }
}

impl Network {
    /// 添加服务器节点
    pub fn add_server(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Box::new(Server::new(id, name))));
        self.adj.push(Vec::new());
        self.rev_adj.push(Vec::new());
        self.routing.mark_dirty();
        id
    }

    /// 添加交换机节点
    pub fn add_switch(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Box::new(Switch::new(id, name))));
        self.adj.push(Vec::new());
        self.rev_adj.push(Vec::new());
        self.routing.mark_dirty();
        id
    }

    /// 连接两个节点（创建单向链路，出口队列容量为 `queue_bytes`）
    pub fn connect(
        &mut self,
        from: NodeId,
        to: NodeId,
        latency: SimTime,
        bandwidth_bps: u64,
        queue_bytes: u64,
    ) -> LinkId {
        let id = LinkId(self.links.len());
        self.links
            .push(Link::new(from, to, latency, bandwidth_bps, queue_bytes));
        self.edges.insert((from, to), id);
        self.adj[from.0].push(to);
        self.rev_adj[to.0].push(from);
        self.routing.mark_dirty();
        id
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0)?.as_ref().map(|n| n.name())
    }

    /// 创建数据包
    pub fn make_packet(&mut self, flow_id: u64, size_bytes: u32, src: NodeId, dst: NodeId) -> Packet {
        let id = self.next_pkt_id;
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        Packet::new(id, flow_id, size_bytes, src, dst)
    }

    /// 查询 (from, dst) 的 ECMP 下一跳候选（供测试与调试）。
    pub fn ecmp_candidates(&mut self, from: NodeId, dst: NodeId) -> Option<&[NodeId]> {
        self.routing.ensure_built(&self.adj, &self.rev_adj);
        self.routing.next_hops(from, dst)
    }

    /// 将数据包交付给节点处理
    pub fn deliver(&mut self, to: NodeId, pkt: Packet, sim: &mut Simulator) {
        // 暂时把节点取出来，避免 &mut self 与 &mut node 的重叠借用。
        let mut node = self.nodes[to.0].take().expect("node exists");
        node.on_packet(pkt, sim, self);
        self.nodes[to.0] = Some(node);
    }

    /// 从指定节点按 ECMP 转发数据包
    pub fn forward_from(&mut self, from: NodeId, mut pkt: Packet, sim: &mut Simulator) {
        self.routing.ensure_built(&self.adj, &self.rev_adj);

        let Some(cands) = self.routing.next_hops(from, pkt.dst) else {
            panic!(
                "no route from {:?} to {:?} (flow {})",
                from, pkt.dst, pkt.flow_id
            );
        };
        let next = self.routing.pick_ecmp(from, pkt.dst, pkt.flow_id, cands);
        trace!(from = ?from, next = ?next, pkt_id = pkt.id, "ECMP 选择下一跳");

        let link_id = *self
            .edges
            .get(&(from, next))
            .unwrap_or_else(|| panic!("no link from {:?} to {:?}", from, next));

        pkt.hops_taken = pkt.hops_taken.saturating_add(1);

        let link = &mut self.links[link_id.0];
        match link.queue.enqueue(pkt) {
            Ok(()) => {
                debug!(
                    link_id = ?link_id,
                    q_bytes = link.queue.bytes(),
                    "packet 入队"
                );
            }
            Err(dropped) => {
                warn!(
                    link_id = ?link_id,
                    pkt_id = dropped.id,
                    flow_id = dropped.flow_id,
                    q_bytes = link.queue.bytes(),
                    q_cap_bytes = link.queue.capacity_bytes(),
                    "缓冲已满，丢弃 packet"
                );
                self.stats.dropped_pkts += 1;
                self.stats.dropped_bytes += dropped.size_bytes as u64;
                return;
            }
        }

        if !self.links[link_id.0].busy {
            self.start_tx(link_id, sim);
        }
    }

    /// 链路空闲时从队列取下一个 packet 开始序列化发送。
    pub(crate) fn start_tx(&mut self, link_id: LinkId, sim: &mut Simulator) {
        let link = &mut self.links[link_id.0];
        let Some(pkt) = link.queue.dequeue() else {
            link.busy = false;
            return;
        };

        link.busy = true;
        let tx_time = link.tx_time(pkt.size_bytes);
        let depart = sim.now().saturating_add(tx_time);
        let arrive = depart.saturating_add(link.latency);
        let to = link.to;

        trace!(
            link_id = ?link_id,
            pkt_id = pkt.id,
            depart = ?depart,
            arrive = ?arrive,
            "开始发送"
        );

        sim.schedule(depart, LinkReady { link_id });
        sim.schedule(arrive, DeliverPacket { to, pkt });
    }

    /// 链路完成一次发送后的回调：继续发队列中的下一个。
    pub(crate) fn on_link_ready(&mut self, link_id: LinkId, sim: &mut Simulator) {
        self.links[link_id.0].busy = false;
        self.start_tx(link_id, sim);
    }

    /// 数据包送达目的地时的处理
    pub(crate) fn on_delivered(&mut self, pkt: Packet) {
        self.stats.delivered_pkts += 1;
        self.stats.delivered_bytes += pkt.size_bytes as u64;
        debug!(
            pkt_id = pkt.id,
            flow_id = pkt.flow_id,
            hops = pkt.hops_taken,
            delivered_pkts = self.stats.delivered_pkts,
            "数据包送达目的地"
        );
    }
}
