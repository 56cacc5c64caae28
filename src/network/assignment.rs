//! 预分配
//!
//! 已经确定的 枢纽 → 服务商 对应关系，求解前注入残量网络。

use super::graph::Network;
use super::node::Node;
use crate::error::{Error, Result};
use crate::types::{HubIndex, ProviderIndex};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 部分分配（通常覆盖除最后一个枢纽外的全部枢纽）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartialAssignment {
    entries: IndexMap<HubIndex, ProviderIndex>,
}

impl PartialAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一条分配，返回该枢纽之前的服务商
    pub fn assign(&mut self, hub: HubIndex, provider: ProviderIndex) -> Option<ProviderIndex> {
        self.entries.insert(hub, provider)
    }

    pub fn with(mut self, hub: HubIndex, provider: ProviderIndex) -> Self {
        self.assign(hub, provider);
        self
    }

    pub fn provider_of(&self, hub: HubIndex) -> Option<ProviderIndex> {
        self.entries.get(&hub).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HubIndex, ProviderIndex)> + '_ {
        self.entries.iter().map(|(&h, &p)| (h, p))
    }

    /// 校验每条分配都指向网络中存在的枢纽、服务商和邻接弧。
    ///
    /// 不在邻接关系中的 枢纽 → 服务商 对整体拒绝为 `InvalidInput`，
    /// 而不是在注入时逐弧跳过。
    pub fn validate(&self, network: &Network) -> Result<()> {
        let layout = network.layout();
        for (hub, provider) in self.iter() {
            if !layout.contains_hub(hub) {
                return Err(Error::invalid(format!(
                    "预分配引用了未知枢纽 {}",
                    hub
                )));
            }
            if !layout.contains_provider(provider) {
                return Err(Error::invalid(format!(
                    "预分配中枢纽 {} 引用了未知服务商 {}",
                    hub, provider
                )));
            }
            if network
                .find_arc(Node::Hub(hub), Node::Provider(provider))
                .is_none()
            {
                return Err(Error::invalid(format!(
                    "预分配 {} → {} 不在邻接关系中",
                    hub, provider
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<(HubIndex, ProviderIndex)> for PartialAssignment {
    fn from_iter<I: IntoIterator<Item = (HubIndex, ProviderIndex)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
