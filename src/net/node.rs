//! 节点类型
//!
//! 定义网络节点，包括节点 trait 和具体实现（服务器、交换机）。

use super::id::NodeId;
use super::network::Network;
use super::packet::Packet;
use crate::sim::Simulator;
use tracing::{debug, trace};

/// 节点接口
pub trait Node: Send {
    /// 获取节点标识符
    fn id(&self) -> NodeId;

    /// 获取节点名称
    fn name(&self) -> &str;

    /// 处理到达的数据包
    fn on_packet(&mut self, pkt: Packet, sim: &mut Simulator, net: &mut Network);
}

/// 服务器节点
#[derive(Debug)]
pub struct Server {
    id: NodeId,
    name: String,
}

impl Server {
    /// 创建新服务器
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Node for Server {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn on_packet(&mut self, pkt: Packet, sim: &mut Simulator, net: &mut Network) {
        trace!(node = %self.name, pkt_id = pkt.id, "🖥️  Server 处理数据包");
        if self.id != pkt.dst {
            debug!(node = %self.name, "未到达目的地，继续转发");
            net.forward_from(self.id, pkt, sim);
        } else {
            net.on_delivered(pkt);
        }
    }
}

/// 交换机节点
#[derive(Debug)]
pub struct Switch {
    id: NodeId,
    name: String,
}

impl Switch {
    /// 创建新交换机
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Node for Switch {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn on_packet(&mut self, pkt: Packet, sim: &mut Simulator, net: &mut Network) {
        trace!(node = %self.name, pkt_id = pkt.id, "🔀 Switch 处理数据包");
        if self.id != pkt.dst {
            net.forward_from(self.id, pkt, sim);
        } else {
            // 交换机不是流量终点；到这里说明拓扑或路由配置有误。
            net.on_delivered(pkt);
        }
    }
}
