//! 标识符类型
//!
//! 节点（服务器 / ToR / 汇聚 / 核心交换机）与单向链路的索引型标识符。

/// 节点标识符（拓扑内的稠密索引）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// 链路标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub usize);
