//! 分配规划模块
//!
//! 串联 构建 → 求解 → 结果提取：
//! 总流量覆盖全部枢纽时给出 枢纽 → 服务商 分配，
//! 否则根据最小割指出需要扩容的服务商。

mod positional;

pub use positional::{plan_city, plan_city_feasible, positional, CityPlan};

use crate::algorithm::{EdmondsKarp, FlowRecord, MaxFlow, SeedPolicy, SkippedArc};
use crate::error::{Error, Result};
use crate::network::{Network, NetworkBuilder, Node, PartialAssignment};
use crate::types::{Capacity, HubIndex, ProviderIndex};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{info, warn};

/// 规划请求
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub num_hubs: usize,
    pub num_providers: usize,
    /// 枢纽 → 可连接的服务商
    #[serde(default)]
    pub adjacency: IndexMap<HubIndex, Vec<ProviderIndex>>,
    /// 按服务商编号排列的容量，缺省为 0
    #[serde(default)]
    pub capacities: Vec<i64>,
    #[serde(default)]
    pub partial: PartialAssignment,
}

impl PlanRequest {
    pub fn new(num_hubs: usize, num_providers: usize) -> Self {
        Self {
            num_hubs,
            num_providers,
            ..Default::default()
        }
    }

    pub fn connect<I>(mut self, hub: HubIndex, providers: I) -> Self
    where
        I: IntoIterator<Item = ProviderIndex>,
    {
        self.adjacency.entry(hub).or_default().extend(providers);
        self
    }

    pub fn capacities<I>(mut self, capacities: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        self.capacities = capacities.into_iter().collect();
        self
    }

    pub fn preassign(mut self, hub: HubIndex, provider: ProviderIndex) -> Self {
        self.partial.assign(hub, provider);
        self
    }

    /// 构建流网络
    pub fn build_network(&self) -> Result<Network> {
        if self.capacities.len() > self.num_providers {
            return Err(Error::invalid(format!(
                "容量表长度 {} 超过服务商数量 {}",
                self.capacities.len(),
                self.num_providers
            )));
        }

        self.adjacency
            .iter()
            .fold(
                NetworkBuilder::new(self.num_hubs, self.num_providers)
                    .provider_capacities(self.capacities.iter().copied()),
                |builder, (&hub, providers)| builder.connect_all(hub, providers.iter().copied()),
            )
            .build()
    }
}

/// 完整分配：下标为枢纽，值为服务商
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment {
    providers: Vec<ProviderIndex>,
}

impl Assignment {
    pub fn provider_of(&self, hub: HubIndex) -> Option<ProviderIndex> {
        self.providers.get(hub).copied()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HubIndex, ProviderIndex)> + '_ {
        self.providers.iter().copied().enumerate()
    }

    /// 分配到某服务商的枢纽数
    pub fn load(&self, provider: ProviderIndex) -> usize {
        self.providers.iter().filter(|&&p| p == provider).count()
    }

    pub fn as_slice(&self) -> &[ProviderIndex] {
        &self.providers
    }
}

/// 规划结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum PlanOutcome {
    /// 可行：每个枢纽的服务商
    Assigned(Assignment),
    /// 不可行：位于最小割上且已饱和的服务商
    NeedsCapacity(BTreeSet<ProviderIndex>),
}

impl PlanOutcome {
    pub fn is_feasible(&self) -> bool {
        matches!(self, PlanOutcome::Assigned(_))
    }
}

/// 预分配被增广调整到其他服务商的枢纽
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReroutedHub {
    pub hub: HubIndex,
    pub preassigned: ProviderIndex,
    pub assigned: ProviderIndex,
}

/// 规划报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub outcome: PlanOutcome,
    pub num_hubs: usize,
    pub num_providers: usize,
    /// 总流量（预分配 + 增广）
    pub total_flow: Capacity,
    pub seeded: Capacity,
    pub augmentations: usize,
    /// 预分配时被跳过的弧
    pub skipped_seeds: Vec<SkippedArc>,
    /// 最终服务商与预分配不同的枢纽
    #[serde(default)]
    pub rerouted: Vec<ReroutedHub>,
    pub duration_us: u64,
}

/// 规划器配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub seed_policy: SeedPolicy,
}

/// 分配规划器
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// 在给定网络上注入预分配并求最大流
    pub fn solve<'a>(&self, network: &'a Network, request: &PlanRequest) -> Result<MaxFlow<'a>> {
        let partial = (!request.partial.is_empty()).then_some(&request.partial);
        EdmondsKarp::new(network).max_flow(partial, self.config.seed_policy)
    }

    /// 判断是否存在覆盖全部枢纽的分配
    pub fn is_feasible(&self, request: &PlanRequest) -> Result<bool> {
        let network = request.build_network()?;
        let result = self.solve(&network, request)?;
        Ok(extract_outcome(&result)?.is_feasible())
    }

    /// 求分配，或诊断瓶颈服务商
    pub fn plan(&self, request: &PlanRequest) -> Result<PlanReport> {
        let start = Instant::now();
        let network = request.build_network()?;
        let result = self.solve(&network, request)?;
        let outcome = extract_outcome(&result)?;
        let rerouted = rerouted_hubs(&request.partial, &outcome);
        for moved in &rerouted {
            warn!(
                hub = moved.hub,
                preassigned = moved.preassigned,
                assigned = moved.assigned,
                "预分配的枢纽被调整到其他服务商"
            );
        }

        let report = PlanReport {
            num_hubs: network.num_hubs(),
            num_providers: network.num_providers(),
            total_flow: result.value,
            seeded: result.seeded,
            augmentations: result.augmentations,
            skipped_seeds: result.seed_report.skipped,
            rerouted,
            duration_us: start.elapsed().as_micros() as u64,
            outcome,
        };

        info!(
            hubs = report.num_hubs,
            providers = report.num_providers,
            total_flow = report.total_flow,
            feasible = report.outcome.is_feasible(),
            "规划完成"
        );
        Ok(report)
    }

    /// 并行求解相互独立的请求，结果与输入顺序一致
    pub fn plan_batch(&self, requests: &[PlanRequest]) -> Vec<Result<PlanReport>> {
        requests.par_iter().map(|request| self.plan(request)).collect()
    }
}

/// 解读求解结果
pub fn extract_outcome(result: &MaxFlow<'_>) -> Result<PlanOutcome> {
    let network = result.residual.network();
    if result.value >= network.num_hubs() as Capacity {
        extract_assignment(&result.flow, network).map(PlanOutcome::Assigned)
    } else {
        Ok(PlanOutcome::NeedsCapacity(diagnose_bottlenecks(result)))
    }
}

/// 每个枢纽恰有一个流量为 1 的服务商，且服务商负载不超过容量
fn extract_assignment(flow: &FlowRecord<'_>, network: &Network) -> Result<Assignment> {
    let mut providers = Vec::with_capacity(network.num_hubs());
    for hub in 0..network.num_hubs() {
        let flows = flow.hub_flows(hub);
        match flows.as_slice() {
            [(provider, 1)] => providers.push(*provider),
            _ => {
                return Err(Error::inconsistent(format!(
                    "枢纽 {} 的流量分布异常: {:?}",
                    hub, flows
                )))
            }
        }
    }

    for provider in 0..network.num_providers() {
        let load = flow.provider_load(provider);
        let capacity = network.provider_capacity(provider);
        if load > capacity {
            return Err(Error::inconsistent(format!(
                "服务商 {} 负载 {} 超过容量 {}",
                provider, load, capacity
            )));
        }
    }

    Ok(Assignment { providers })
}

/// 对比预分配与最终分配
fn rerouted_hubs(partial: &PartialAssignment, outcome: &PlanOutcome) -> Vec<ReroutedHub> {
    let PlanOutcome::Assigned(assignment) = outcome else {
        return Vec::new();
    };
    partial
        .iter()
        .filter_map(|(hub, preassigned)| {
            let assigned = assignment.provider_of(hub)?;
            (assigned != preassigned).then_some(ReroutedHub {
                hub,
                preassigned,
                assigned,
            })
        })
        .collect()
}

/// 可达、曾连接汇点且汇点弧已饱和的服务商
pub fn diagnose_bottlenecks(result: &MaxFlow<'_>) -> BTreeSet<ProviderIndex> {
    let network = result.residual.network();
    let cut = result.min_cut();
    if !cut.separates() {
        return BTreeSet::new();
    }

    (0..network.num_providers())
        .filter(|&p| {
            cut.contains(Node::Provider(p))
                && network.provider_capacity(p) > 0
                && result.residual.capacity(Node::Provider(p), Node::Sink) == 0
        })
        .collect()
}
