//! 拓扑构建模块

pub mod fat_tree;
