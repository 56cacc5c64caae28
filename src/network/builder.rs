//! 网络构建器
//!
//! 由枢纽数、服务商数、邻接关系和服务商容量组装四层网络：
//! 源点 → 枢纽（容量 1）→ 服务商（容量 1）→ 汇点（服务商容量）。

use super::graph::Network;
use super::node::{Layout, Node};
use crate::error::{Error, Result};
use crate::types::{Capacity, HubIndex, ProviderIndex};
use indexmap::IndexSet;
use tracing::debug;

/// 网络构建器
///
/// 输入在 [`NetworkBuilder::build`] 时统一校验。
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    num_hubs: usize,
    num_providers: usize,
    connections: Vec<(HubIndex, ProviderIndex)>,
    capacities: Vec<(ProviderIndex, i64)>,
}

impl NetworkBuilder {
    pub fn new(num_hubs: usize, num_providers: usize) -> Self {
        Self {
            num_hubs,
            num_providers,
            ..Default::default()
        }
    }

    /// 声明枢纽可连接的服务商
    pub fn connect(mut self, hub: HubIndex, provider: ProviderIndex) -> Self {
        self.connections.push((hub, provider));
        self
    }

    pub fn connect_all<I>(mut self, hub: HubIndex, providers: I) -> Self
    where
        I: IntoIterator<Item = ProviderIndex>,
    {
        self.connections
            .extend(providers.into_iter().map(|provider| (hub, provider)));
        self
    }

    /// 设置单个服务商容量，重复设置以最后一次为准
    pub fn provider_capacity(mut self, provider: ProviderIndex, capacity: i64) -> Self {
        self.capacities.push((provider, capacity));
        self
    }

    /// 按服务商编号顺序设置容量
    pub fn provider_capacities<I>(mut self, capacities: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        self.capacities.extend(capacities.into_iter().enumerate());
        self
    }

    /// 校验输入并构建网络
    pub fn build(self) -> Result<Network> {
        let layout = Layout::try_new(self.num_hubs, self.num_providers)?;

        let mut adjacency: Vec<IndexSet<ProviderIndex>> = vec![IndexSet::new(); self.num_hubs];
        for &(hub, provider) in &self.connections {
            if !layout.contains_hub(hub) {
                return Err(Error::invalid(format!(
                    "枢纽索引 {} 超出范围 [0, {})",
                    hub, self.num_hubs
                )));
            }
            if !layout.contains_provider(provider) {
                return Err(Error::invalid(format!(
                    "枢纽 {} 引用的服务商索引 {} 超出范围 [0, {})",
                    hub, provider, self.num_providers
                )));
            }
            adjacency[hub].insert(provider);
        }

        let mut capacities: Vec<Capacity> = vec![0; self.num_providers];
        for &(provider, capacity) in &self.capacities {
            if !layout.contains_provider(provider) {
                return Err(Error::invalid(format!(
                    "容量表引用的服务商索引 {} 超出范围 [0, {})",
                    provider, self.num_providers
                )));
            }
            if capacity < 0 {
                return Err(Error::invalid(format!(
                    "服务商 {} 的容量为负: {}",
                    provider, capacity
                )));
            }
            capacities[provider] = capacity as Capacity;
        }

        let mut network = Network::with_layout(layout);
        let source = layout.source();
        let sink = layout.sink();

        for hub in 0..self.num_hubs {
            if let Some(id) = layout.id_of(Node::Hub(hub)) {
                network.add_arc(source, id, 1);
            }
        }

        for (hub, providers) in adjacency.iter().enumerate() {
            let Some(hub_id) = layout.id_of(Node::Hub(hub)) else {
                continue;
            };
            for &provider in providers {
                if let Some(provider_id) = layout.id_of(Node::Provider(provider)) {
                    network.add_arc(hub_id, provider_id, 1);
                }
            }
        }

        // 零容量的服务商不连接汇点
        for (provider, &capacity) in capacities.iter().enumerate() {
            if capacity == 0 {
                continue;
            }
            if let Some(id) = layout.id_of(Node::Provider(provider)) {
                network.add_arc(id, sink, capacity);
            }
        }

        debug!(
            hubs = self.num_hubs,
            providers = self.num_providers,
            arcs = network.arc_count(),
            "流网络构建完成"
        );

        Ok(network)
    }
}
