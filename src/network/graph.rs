//! 流网络数据结构
//!
//! 构建完成后只读；求解器在自己的残量副本上修改容量。

use super::edge::{Edge, EdgeId};
use super::node::{Layout, Node, NodeId};
use crate::types::{Capacity, HubIndex, ProviderIndex};
use smallvec::SmallVec;
use std::collections::HashMap;

/// 每个节点的出弧列表（含反向弧）
pub(crate) type OutEdges = SmallVec<[EdgeId; 4]>;

/// 四层容量网络
#[derive(Debug, Clone)]
pub struct Network {
    /// 节点编号方案
    layout: Layout,
    /// 弧表，正向/反向成对存放
    edges: Vec<Edge>,
    /// 节点 → 出弧
    adjacency: Vec<OutEdges>,
    /// (起点, 终点) → 弧
    index: HashMap<(NodeId, NodeId), EdgeId>,
}

impl Network {
    pub(crate) fn with_layout(layout: Layout) -> Self {
        Self {
            layout,
            edges: Vec::new(),
            adjacency: vec![OutEdges::new(); layout.node_count()],
            index: HashMap::new(),
        }
    }

    /// 添加一条弧及其反向弧；同一节点对再次声明时合并容量
    pub(crate) fn add_arc(&mut self, from: NodeId, to: NodeId, capacity: Capacity) -> EdgeId {
        if let Some(&existing) = self.index.get(&(from, to)) {
            self.edges[existing.index()].add_capacity(capacity);
            return existing;
        }

        let forward = EdgeId(self.edges.len());
        let backward = forward.twin();
        self.edges.push(Edge::new(from, to, capacity));
        self.edges.push(Edge::new(to, from, 0));
        self.adjacency[from.index()].push(forward);
        self.adjacency[to.index()].push(backward);
        self.index.insert((from, to), forward);
        self.index.insert((to, from), backward);
        forward
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn num_hubs(&self) -> usize {
        self.layout.num_hubs()
    }

    pub fn num_providers(&self) -> usize {
        self.layout.num_providers()
    }

    pub fn node_count(&self) -> usize {
        self.layout.node_count()
    }

    /// 声明的正向弧数量
    pub fn arc_count(&self) -> usize {
        self.edges.len() / 2
    }

    /// 弧表总长度（含反向弧）
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    pub fn out_edges(&self, node: NodeId) -> &[EdgeId] {
        &self.adjacency[node.index()]
    }

    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.index.get(&(from, to)).copied()
    }

    /// 按节点身份查找弧
    pub fn find_arc(&self, from: Node, to: Node) -> Option<EdgeId> {
        let from = self.layout.id_of(from)?;
        let to = self.layout.id_of(to)?;
        self.find_edge(from, to)
    }

    pub fn node(&self, id: NodeId) -> Node {
        // 编号只由 Layout 产生，必然在范围内
        self.layout.node_at(id).unwrap_or(Node::Sink)
    }

    /// 原始容量；弧不存在时为 0
    pub fn capacity(&self, from: Node, to: Node) -> Capacity {
        self.find_arc(from, to)
            .map(|e| self.edge(e).capacity())
            .unwrap_or(0)
    }

    /// 服务商到汇点的原始容量
    pub fn provider_capacity(&self, provider: ProviderIndex) -> Capacity {
        self.capacity(Node::Provider(provider), Node::Sink)
    }

    /// 枢纽可连接的服务商，按声明顺序
    pub fn hub_providers(&self, hub: HubIndex) -> Vec<ProviderIndex> {
        let Some(id) = self.layout.id_of(Node::Hub(hub)) else {
            return Vec::new();
        };
        self.out_edges(id)
            .iter()
            .filter(|e| e.is_forward())
            .filter_map(|&e| self.node(self.edge(e).to()).as_provider())
            .collect()
    }

    /// 枚举声明的弧 `(起点, 终点, 容量)`，供可视化使用
    pub fn arcs(&self) -> impl Iterator<Item = (Node, Node, Capacity)> + '_ {
        self.edges
            .iter()
            .step_by(2)
            .map(move |e| (self.node(e.from()), self.node(e.to()), e.capacity()))
    }

    /// 全部弧的原始容量，按弧 ID 排列
    pub(crate) fn capacities(&self) -> Vec<Capacity> {
        self.edges.iter().map(Edge::capacity).collect()
    }
}
