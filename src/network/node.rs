//! 节点定义
//!
//! 四层流网络的节点：源点、数据枢纽、服务商、汇点。
//! 所有节点统一映射到稠密整数编号，避免异构键类型。

use crate::error::{Error, Result};
use crate::types::{HubIndex, Layer, ProviderIndex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 节点 ID（稠密编号，可直接作为数组下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// 节点身份
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Node {
    Source,
    Hub(HubIndex),
    Provider(ProviderIndex),
    Sink,
}

impl Node {
    pub fn layer(&self) -> Layer {
        match self {
            Node::Source => Layer::Source,
            Node::Hub(_) => Layer::Hub,
            Node::Provider(_) => Layer::Provider,
            Node::Sink => Layer::Sink,
        }
    }

    pub fn as_hub(&self) -> Option<HubIndex> {
        match *self {
            Node::Hub(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_provider(&self) -> Option<ProviderIndex> {
        match *self {
            Node::Provider(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Source => write!(f, "source"),
            Node::Hub(h) => write!(f, "hub#{}", h),
            Node::Provider(p) => write!(f, "provider#{}", p),
            Node::Sink => write!(f, "sink"),
        }
    }
}

/// 节点编号方案
///
/// `0` 为源点，`1..=H` 为枢纽，`H+1..=H+P` 为服务商，`H+P+1` 为汇点。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    num_hubs: usize,
    num_providers: usize,
}

impl Layout {
    pub fn new(num_hubs: usize, num_providers: usize) -> Self {
        Self {
            num_hubs,
            num_providers,
        }
    }

    /// 节点总数（含源点与汇点）超出 `usize` 时返回 `InvalidInput`
    pub fn try_new(num_hubs: usize, num_providers: usize) -> Result<Self> {
        num_hubs
            .checked_add(num_providers)
            .and_then(|n| n.checked_add(2))
            .map(|_| Self::new(num_hubs, num_providers))
            .ok_or_else(|| {
                Error::invalid(format!(
                    "节点数量溢出: {} 个枢纽, {} 个服务商",
                    num_hubs, num_providers
                ))
            })
    }

    pub fn num_hubs(&self) -> usize {
        self.num_hubs
    }

    pub fn num_providers(&self) -> usize {
        self.num_providers
    }

    /// 节点总数（含源点与汇点）
    pub fn node_count(&self) -> usize {
        self.num_hubs + self.num_providers + 2
    }

    pub fn source(&self) -> NodeId {
        NodeId(0)
    }

    pub fn sink(&self) -> NodeId {
        NodeId(self.num_hubs + self.num_providers + 1)
    }

    pub fn contains_hub(&self, hub: HubIndex) -> bool {
        hub < self.num_hubs
    }

    pub fn contains_provider(&self, provider: ProviderIndex) -> bool {
        provider < self.num_providers
    }

    /// 节点 → 编号；枢纽或服务商越界时返回 None
    pub fn id_of(&self, node: Node) -> Option<NodeId> {
        match node {
            Node::Source => Some(self.source()),
            Node::Hub(h) if self.contains_hub(h) => Some(NodeId(1 + h)),
            Node::Provider(p) if self.contains_provider(p) => {
                Some(NodeId(1 + self.num_hubs + p))
            }
            Node::Sink => Some(self.sink()),
            _ => None,
        }
    }

    /// 编号 → 节点
    pub fn node_at(&self, id: NodeId) -> Option<Node> {
        let i = id.index();
        let providers_start = 1 + self.num_hubs;
        let sink = self.sink().index();
        if i == 0 {
            Some(Node::Source)
        } else if i < providers_start {
            Some(Node::Hub(i - 1))
        } else if i < sink {
            Some(Node::Provider(i - providers_start))
        } else if i == sink {
            Some(Node::Sink)
        } else {
            None
        }
    }

    /// 按编号顺序遍历全部节点
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        (0..self.node_count()).filter_map(move |i| self.node_at(NodeId(i)))
    }
}
