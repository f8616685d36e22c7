//! 事件 trait
//!
//! 仿真中发生的一切（数据包到达、链路就绪、上行授权）都建模为事件。

use super::simulator::Simulator;
use super::world::World;

/// 事件：在指定仿真时刻被执行一次。
/// 使用 `self: Box<Self>` 把所有权交给执行体，便于事件自我重调度。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);
}
