//! 边定义
//!
//! 每条声明的弧在构建时与其反向弧成对分配：
//! 偶数 ID 为正向弧，`id ^ 1` 为反向弧（原始容量为 0）。

use super::node::NodeId;
use crate::types::Capacity;
use serde::{Deserialize, Serialize};

/// 边 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

impl EdgeId {
    pub fn index(&self) -> usize {
        self.0
    }

    /// 成对的另一条弧
    pub fn twin(&self) -> EdgeId {
        EdgeId(self.0 ^ 1)
    }

    /// 是否为声明的正向弧
    pub fn is_forward(&self) -> bool {
        self.0 & 1 == 0
    }

    /// 正向弧序号（流量记录下标）
    pub(crate) fn pair_index(&self) -> usize {
        self.0 >> 1
    }
}

/// 有向弧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    from: NodeId,
    to: NodeId,
    /// 原始容量（反向弧为 0，除非同一节点对被反向声明过）
    capacity: Capacity,
}

impl Edge {
    pub fn new(from: NodeId, to: NodeId, capacity: Capacity) -> Self {
        Self { from, to, capacity }
    }

    pub fn from(&self) -> NodeId {
        self.from
    }

    pub fn to(&self) -> NodeId {
        self.to
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    pub(crate) fn add_capacity(&mut self, extra: Capacity) {
        self.capacity += extra;
    }
}
