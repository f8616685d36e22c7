//! 网络模拟模块
//!
//! 此模块包含 fat-tree 仿真的核心组件：节点、链路、数据包、转发与路由。

// 子模块声明
mod deliver_packet;
mod id;
mod link;
mod link_ready;
mod net_world;
mod network;
mod node;
mod packet;
mod routing;
mod stats;

// 重新导出公共接口
pub use deliver_packet::DeliverPacket;
pub use id::{LinkId, NodeId};
pub use link::Link;
pub use link_ready::LinkReady;
pub use net_world::NetWorld;
pub use network::Network;
pub use node::{Node, Server, Switch};
pub use packet::Packet;
pub use routing::RoutingTable;
pub use stats::Stats;
