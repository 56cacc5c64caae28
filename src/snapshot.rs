//! 图快照
//!
//! 供外部可视化组件消费的分层图描述：节点（含层次）与带容量的弧。

use crate::algorithm::Residual;
use crate::network::{Network, Node};
use crate::types::{Capacity, Layer};
use serde::{Deserialize, Serialize};

/// 快照阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// 源点 → 枢纽 → 服务商
    Bipartite,
    /// 完整网络（含汇点）
    Network,
    /// 注入预分配后的残量网络
    Residual,
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bipartite" => Ok(Stage::Bipartite),
            "network" => Ok(Stage::Network),
            "residual" => Ok(Stage::Residual),
            other => Err(format!("未知阶段: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: usize,
    /// 源点/汇点为 `source`/`sink`，其余为合并编号
    pub label: String,
    pub layer: Layer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcView {
    pub from: usize,
    pub to: usize,
    pub capacity: Capacity,
}

/// 分层图快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub stage: Stage,
    /// 枢纽与服务商的编号分界
    pub num_hubs: usize,
    pub num_providers: usize,
    pub nodes: Vec<NodeView>,
    pub arcs: Vec<ArcView>,
}

impl GraphSnapshot {
    /// 声明网络的快照；`Bipartite` 阶段去掉汇点及其弧
    pub fn of_network(network: &Network, stage: Stage) -> Self {
        let with_sink = stage != Stage::Bipartite;
        let arcs = network
            .arcs()
            .filter(|&(_, to, _)| with_sink || to != Node::Sink)
            .map(|(from, to, capacity)| ArcView {
                from: node_id(network, from),
                to: node_id(network, to),
                capacity,
            })
            .collect();

        Self::assemble(network, stage, with_sink, arcs)
    }

    /// 残量网络快照，`include_zero` 为假时省略残量为 0 的弧
    pub fn of_residual(residual: &Residual<'_>, include_zero: bool) -> Self {
        let network = residual.network();
        let arcs = residual
            .arcs()
            .filter(|&(_, _, capacity)| include_zero || capacity > 0)
            .map(|(from, to, capacity)| ArcView {
                from: node_id(network, from),
                to: node_id(network, to),
                capacity,
            })
            .collect();

        Self::assemble(network, Stage::Residual, true, arcs)
    }

    fn assemble(network: &Network, stage: Stage, with_sink: bool, arcs: Vec<ArcView>) -> Self {
        let num_hubs = network.num_hubs();
        let nodes = network
            .layout()
            .nodes()
            .filter(|&n| with_sink || n != Node::Sink)
            .map(|node| NodeView {
                id: node_id(network, node),
                label: match node {
                    Node::Source => "source".to_string(),
                    Node::Hub(h) => h.to_string(),
                    Node::Provider(p) => (num_hubs + p).to_string(),
                    Node::Sink => "sink".to_string(),
                },
                layer: node.layer(),
            })
            .collect();

        Self {
            stage,
            num_hubs,
            num_providers: network.num_providers(),
            nodes,
            arcs,
        }
    }

    /// 枚举 `(起点标签, 终点标签, 容量)`
    pub fn triples(&self) -> impl Iterator<Item = (&str, &str, Capacity)> + '_ {
        self.arcs.iter().filter_map(move |arc| {
            let from = self.nodes.iter().find(|n| n.id == arc.from)?;
            let to = self.nodes.iter().find(|n| n.id == arc.to)?;
            Some((from.label.as_str(), to.label.as_str(), arc.capacity))
        })
    }
}

fn node_id(network: &Network, node: Node) -> usize {
    network
        .layout()
        .id_of(node)
        .map(|id| id.index())
        .unwrap_or_default()
}
