//! 流网络模块
//!
//! 定义节点、弧、容量网络及其构建器

mod assignment;
mod builder;
mod edge;
mod graph;
mod node;

pub use assignment::PartialAssignment;
pub use builder::NetworkBuilder;
pub use edge::{Edge, EdgeId};
pub use graph::Network;
pub use node::{Layout, Node, NodeId};
