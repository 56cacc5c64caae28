//! 最大流算法
//!
//! 实现 Edmonds-Karp 算法（基于 BFS 的 Ford-Fulkerson），
//! 支持在求解前注入预分配流量。

use super::min_cut::MinCut;
use crate::error::{Error, Result};
use crate::network::{EdgeId, Network, Node, NodeId, PartialAssignment};
use crate::types::{Capacity, HubIndex, ProviderIndex};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// 预分配注入策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// 弧已饱和时跳过该弧并记录告警
    #[default]
    Lenient,
    /// 弧已饱和时报 `InconsistentFlowState`，状态保持不变
    Strict,
}

/// 求解阶段：Built → Seeded → Augmenting → Drained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Built,
    Seeded,
    Augmenting,
    Drained,
}

/// 注入时被跳过的弧
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedArc {
    pub hub: HubIndex,
    pub from: Node,
    pub to: Node,
}

/// 预分配注入结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedReport {
    /// 实际注入的单位流量（以源点弧计）
    pub seeded: Capacity,
    pub skipped: Vec<SkippedArc>,
}

/// 残量网络，拓扑借用自 [`Network`]，容量自有
#[derive(Debug, Clone)]
pub struct Residual<'a> {
    network: &'a Network,
    residual: Vec<Capacity>,
}

impl<'a> Residual<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self {
            network,
            residual: network.capacities(),
        }
    }

    pub fn network(&self) -> &'a Network {
        self.network
    }

    pub fn residual(&self, edge: EdgeId) -> Capacity {
        self.residual[edge.index()]
    }

    /// 节点间的残量；弧不存在时为 0
    pub fn capacity(&self, from: Node, to: Node) -> Capacity {
        self.network
            .find_arc(from, to)
            .map(|e| self.residual(e))
            .unwrap_or(0)
    }

    /// 枚举全部弧（含反向弧）的残量
    pub fn arcs(&self) -> impl Iterator<Item = (Node, Node, Capacity)> + '_ {
        self.residual.iter().enumerate().map(move |(i, &cap)| {
            let edge = self.network.edge(EdgeId(i));
            (
                self.network.node(edge.from()),
                self.network.node(edge.to()),
                cap,
            )
        })
    }

    /// 沿弧推送流量，调用方保证 `amount` 不超过当前残量
    fn push(&mut self, edge: EdgeId, amount: Capacity) {
        self.residual[edge.index()] -= amount;
        self.residual[edge.twin().index()] += amount;
    }

    /// BFS 找弧数最少的增广路径，按 源点 → 汇点 顺序返回
    pub fn find_augmenting_path(&self) -> Option<Vec<EdgeId>> {
        let layout = self.network.layout();
        let source = layout.source();
        let sink = layout.sink();
        let node_count = layout.node_count();

        let mut visited = vec![false; node_count];
        let mut parent: Vec<Option<EdgeId>> = vec![None; node_count];
        let mut queue = VecDeque::new();

        visited[source.index()] = true;
        queue.push_back(source);

        while let Some(u) = queue.pop_front() {
            if u == sink {
                break;
            }

            for &edge in self.network.out_edges(u) {
                let v = self.network.edge(edge).to();
                if !visited[v.index()] && self.residual(edge) > 0 {
                    visited[v.index()] = true;
                    parent[v.index()] = Some(edge);
                    queue.push_back(v);
                }
            }
        }

        if !visited[sink.index()] {
            return None;
        }

        // 重构路径
        let mut path = Vec::new();
        let mut current: NodeId = sink;
        while current != source {
            let edge = parent[current.index()]?;
            path.push(edge);
            current = self.network.edge(edge).from();
        }
        path.reverse();
        Some(path)
    }
}

/// 流量记录：每条声明弧上的净流量
#[derive(Debug, Clone)]
pub struct FlowRecord<'a> {
    network: &'a Network,
    flows: Vec<Capacity>,
}

impl<'a> FlowRecord<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self {
            network,
            flows: vec![0; network.arc_count()],
        }
    }

    /// 沿反向弧推送即抵消对应正向弧上的流量
    fn record(&mut self, edge: EdgeId, amount: Capacity) {
        let slot = &mut self.flows[edge.pair_index()];
        if edge.is_forward() {
            *slot += amount;
        } else {
            debug_assert!(
                *slot >= amount,
                "反向弧 {:?} 抵消的流量 {} 超过正向弧上的 {}",
                edge,
                amount,
                *slot
            );
            *slot = slot.saturating_sub(amount);
        }
    }

    /// 弧上的流量；反向弧恒为 0
    pub fn flow_on(&self, edge: EdgeId) -> Capacity {
        if edge.is_forward() {
            self.flows[edge.pair_index()]
        } else {
            0
        }
    }

    pub fn flow(&self, from: Node, to: Node) -> Capacity {
        self.network
            .find_arc(from, to)
            .map(|e| self.flow_on(e))
            .unwrap_or(0)
    }

    /// 枚举流量为正的弧 `(起点, 终点, 流量)`
    pub fn iter(&self) -> impl Iterator<Item = (Node, Node, Capacity)> + '_ {
        self.flows
            .iter()
            .enumerate()
            .filter(|(_, f)| **f > 0)
            .map(move |(i, &f)| {
                let edge = self.network.edge(EdgeId(i << 1));
                (
                    self.network.node(edge.from()),
                    self.network.node(edge.to()),
                    f,
                )
            })
    }

    /// 枢纽流向的服务商及流量
    pub fn hub_flows(&self, hub: HubIndex) -> Vec<(ProviderIndex, Capacity)> {
        let Some(id) = self.network.layout().id_of(Node::Hub(hub)) else {
            return Vec::new();
        };
        self.network
            .out_edges(id)
            .iter()
            .filter_map(|&e| {
                let f = self.flow_on(e);
                let provider = self.network.node(self.network.edge(e).to()).as_provider()?;
                (f > 0).then_some((provider, f))
            })
            .collect()
    }

    /// 服务商从各枢纽接收的流量之和
    pub fn provider_load(&self, provider: ProviderIndex) -> Capacity {
        let Some(id) = self.network.layout().id_of(Node::Provider(provider)) else {
            return 0;
        };
        self.network
            .out_edges(id)
            .iter()
            .filter(|e| !e.is_forward())
            .map(|e| self.flow_on(e.twin()))
            .sum()
    }

    /// 节点净流出量（流出 - 流入）
    pub fn net_outflow(&self, node: Node) -> i64 {
        let Some(id) = self.network.layout().id_of(node) else {
            return 0;
        };
        self.network
            .out_edges(id)
            .iter()
            .map(|&e| {
                let f = self.flows[e.pair_index()] as i64;
                if e.is_forward() {
                    f
                } else {
                    -f
                }
            })
            .sum()
    }

    /// 从源点流出的总流量
    pub fn value(&self) -> Capacity {
        self.net_outflow(Node::Source).max(0) as Capacity
    }
}

/// 最大流结果
#[derive(Debug, Clone)]
pub struct MaxFlow<'a> {
    /// 总流量（预分配 + 增广）
    pub value: Capacity,
    /// 预分配注入的流量
    pub seeded: Capacity,
    /// 增广得到的流量
    pub augmented: Capacity,
    /// 增广次数
    pub augmentations: usize,
    pub seed_report: SeedReport,
    /// 终态残量网络
    pub residual: Residual<'a>,
    /// 流量分配
    pub flow: FlowRecord<'a>,
}

impl MaxFlow<'_> {
    /// 最小割（源点在终态残量网络中的可达集）
    pub fn min_cut(&self) -> MinCut {
        MinCut::from_residual(&self.residual)
    }

    /// 流量等于容量的声明弧
    pub fn saturated_arcs(&self) -> Vec<(Node, Node, Capacity)> {
        let network = self.residual.network();
        network
            .arcs()
            .zip(self.flow.flows.iter())
            .filter(|((_, _, cap), f)| *cap > 0 && **f == *cap)
            .map(|(arc, _)| arc)
            .collect()
    }
}

/// Edmonds-Karp 最大流算法
pub struct EdmondsKarp<'a> {
    network: &'a Network,
    residual: Residual<'a>,
    flow: FlowRecord<'a>,
    phase: Phase,
    seed_report: SeedReport,
    augmented: Capacity,
    augmentations: usize,
}

impl<'a> EdmondsKarp<'a> {
    /// 创建算法实例，残量初始化为原始容量
    pub fn new(network: &'a Network) -> Self {
        Self {
            network,
            residual: Residual::new(network),
            flow: FlowRecord::new(network),
            phase: Phase::Built,
            seed_report: SeedReport::default(),
            augmented: 0,
            augmentations: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn residual(&self) -> &Residual<'a> {
        &self.residual
    }

    pub fn flow(&self) -> &FlowRecord<'a> {
        &self.flow
    }

    /// 当前总流量
    pub fn value(&self) -> Capacity {
        self.seed_report.seeded + self.augmented
    }

    /// 注入预分配：每条分配沿 源点→枢纽→服务商→汇点 各推送一个单位，
    /// 三条弧独立处理，残量为 0 的弧按策略跳过或报错。
    pub fn seed(&mut self, partial: &PartialAssignment, policy: SeedPolicy) -> Result<SeedReport> {
        if matches!(self.phase, Phase::Augmenting | Phase::Drained) {
            return Err(Error::inconsistent("增广开始后不能再注入预分配"));
        }
        partial.validate(self.network)?;

        let mut residual = self.residual.clone();
        let mut flow = self.flow.clone();
        let mut report = SeedReport::default();

        for (hub, provider) in partial.iter() {
            let path = [
                (Node::Source, Node::Hub(hub)),
                (Node::Hub(hub), Node::Provider(provider)),
                (Node::Provider(provider), Node::Sink),
            ];

            for (from, to) in path {
                match self.network.find_arc(from, to) {
                    Some(edge) if residual.residual(edge) > 0 => {
                        residual.push(edge, 1);
                        flow.record(edge, 1);
                        if from == Node::Source {
                            report.seeded += 1;
                        }
                    }
                    _ if policy == SeedPolicy::Strict => {
                        return Err(Error::inconsistent(format!(
                            "预分配 {} → {} 的弧 {} → {} 无剩余容量",
                            hub, provider, from, to
                        )));
                    }
                    _ => {
                        warn!(hub, provider, %from, %to, "预分配弧无剩余容量，已跳过");
                        report.skipped.push(SkippedArc { hub, from, to });
                    }
                }
            }
        }

        self.residual = residual;
        self.flow = flow;
        self.seed_report.seeded += report.seeded;
        self.seed_report
            .skipped
            .extend(report.skipped.iter().copied());
        self.phase = Phase::Seeded;

        debug!(
            seeded = report.seeded,
            skipped = report.skipped.len(),
            "预分配注入完成"
        );
        Ok(report)
    }

    /// 执行一次增广，返回瓶颈容量；无增广路径时进入 Drained
    pub fn augment(&mut self) -> Option<Capacity> {
        if self.phase == Phase::Drained {
            return None;
        }
        self.phase = Phase::Augmenting;

        let path = self.residual.find_augmenting_path();
        let Some((path, bottleneck)) = path.and_then(|path| {
            let bottleneck = path.iter().map(|&e| self.residual.residual(e)).min()?;
            Some((path, bottleneck))
        }) else {
            self.phase = Phase::Drained;
            return None;
        };

        for &edge in &path {
            self.residual.push(edge, bottleneck);
            self.flow.record(edge, bottleneck);
        }
        self.augmented += bottleneck;
        self.augmentations += 1;

        debug!(
            bottleneck,
            hops = path.len(),
            total = self.value(),
            "沿增广路径推送流量"
        );
        Some(bottleneck)
    }

    /// 反复增广直到不存在增广路径，返回本轮增广的总流量
    pub fn run(&mut self) -> Capacity {
        while self.augment().is_some() {}
        self.augmented
    }

    /// 注入预分配（可选）并计算最大流
    pub fn max_flow(
        mut self,
        partial: Option<&PartialAssignment>,
        policy: SeedPolicy,
    ) -> Result<MaxFlow<'a>> {
        if let Some(partial) = partial {
            self.seed(partial, policy)?;
        }
        Ok(self.into_result())
    }

    /// 结束求解，产出结果
    pub fn into_result(mut self) -> MaxFlow<'a> {
        self.run();
        MaxFlow {
            value: self.value(),
            seeded: self.seed_report.seeded,
            augmented: self.augmented,
            augmentations: self.augmentations,
            seed_report: self.seed_report,
            residual: self.residual,
            flow: self.flow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkBuilder;
    use crate::test_utils::RandomInstance;

    fn assignment_network() -> Network {
        // 枢纽 0 → {0, 1}，枢纽 1 → {0}，两个服务商容量均为 1
        NetworkBuilder::new(2, 2)
            .connect_all(0, [0, 1])
            .connect(1, 0)
            .provider_capacities([1, 1])
            .build()
            .unwrap()
    }

    #[test]
    fn test_max_flow_basic() {
        let network = assignment_network();
        let result = EdmondsKarp::new(&network)
            .max_flow(None, SeedPolicy::Lenient)
            .unwrap();

        assert_eq!(result.value, 2);
        assert_eq!(result.seeded, 0);
        assert_eq!(result.augmented, 2);
        assert_eq!(result.flow.value(), 2);
        assert!(result.residual.find_augmenting_path().is_none());
    }

    #[test]
    fn test_single_bottleneck() {
        let network = NetworkBuilder::new(3, 1)
            .connect(0, 0)
            .connect(1, 0)
            .connect(2, 0)
            .provider_capacity(0, 2)
            .build()
            .unwrap();
        let result = EdmondsKarp::new(&network)
            .max_flow(None, SeedPolicy::Lenient)
            .unwrap();

        // 瓶颈在 服务商 → 汇点，最大流是 2
        assert_eq!(result.value, 2);
        assert_eq!(result.residual.capacity(Node::Provider(0), Node::Sink), 0);
        assert_eq!(result.flow.provider_load(0), 2);
    }

    #[test]
    fn test_provider_capacity_beyond_one() {
        let network = NetworkBuilder::new(2, 1)
            .connect(0, 0)
            .connect(1, 0)
            .provider_capacity(0, 5)
            .build()
            .unwrap();
        let result = EdmondsKarp::new(&network)
            .max_flow(None, SeedPolicy::Lenient)
            .unwrap();

        assert_eq!(result.value, 2);
        assert_eq!(result.flow.flow(Node::Provider(0), Node::Sink), 2);
        assert_eq!(result.residual.capacity(Node::Provider(0), Node::Sink), 3);
        assert_eq!(result.residual.capacity(Node::Sink, Node::Provider(0)), 2);
    }

    #[test]
    fn test_augmentation_reroutes_seeded_hub() {
        let network = assignment_network();
        // 枢纽 0 先占用了枢纽 1 唯一可用的服务商 0
        let partial = PartialAssignment::new().with(0, 0);
        let result = EdmondsKarp::new(&network)
            .max_flow(Some(&partial), SeedPolicy::Lenient)
            .unwrap();

        assert_eq!(result.seeded, 1);
        assert_eq!(result.augmented, 1);
        assert_eq!(result.value, 2);

        // 沿反向弧增广后，枢纽 0 改走服务商 1
        assert_eq!(result.flow.hub_flows(0), vec![(1, 1)]);
        assert_eq!(result.flow.hub_flows(1), vec![(0, 1)]);
        assert_eq!(result.flow.flow(Node::Hub(0), Node::Provider(0)), 0);
    }

    #[test]
    fn test_seed_updates_residual_and_flow() {
        let network = assignment_network();
        let mut solver = EdmondsKarp::new(&network);
        let report = solver
            .seed(&PartialAssignment::new().with(1, 0), SeedPolicy::Lenient)
            .unwrap();

        assert_eq!(report.seeded, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(solver.phase(), Phase::Seeded);

        let residual = solver.residual();
        assert_eq!(residual.capacity(Node::Source, Node::Hub(1)), 0);
        assert_eq!(residual.capacity(Node::Hub(1), Node::Source), 1);
        assert_eq!(residual.capacity(Node::Hub(1), Node::Provider(0)), 0);
        assert_eq!(residual.capacity(Node::Provider(0), Node::Hub(1)), 1);
        assert_eq!(residual.capacity(Node::Provider(0), Node::Sink), 0);
        assert_eq!(residual.capacity(Node::Sink, Node::Provider(0)), 1);

        assert_eq!(solver.flow().flow(Node::Hub(1), Node::Provider(0)), 1);
        assert_eq!(solver.value(), 1);
    }

    #[test]
    fn test_seeding_twice_never_goes_negative() {
        let network = assignment_network();
        let partial = PartialAssignment::new().with(0, 0);
        let mut solver = EdmondsKarp::new(&network);

        solver.seed(&partial, SeedPolicy::Lenient).unwrap();
        let second = solver.seed(&partial, SeedPolicy::Lenient).unwrap();

        // 三条弧都已饱和，全部跳过
        assert_eq!(second.seeded, 0);
        assert_eq!(second.skipped.len(), 3);
        assert_eq!(solver.value(), 1);
        assert!(solver.residual().arcs().all(|(_, _, cap)| cap <= 1));
        assert_eq!(solver.residual().capacity(Node::Hub(0), Node::Source), 1);
    }

    #[test]
    fn test_strict_seeding_leaves_state_untouched() {
        let network = NetworkBuilder::new(2, 1)
            .connect(0, 0)
            .connect(1, 0)
            .provider_capacity(0, 1)
            .build()
            .unwrap();
        let partial = PartialAssignment::new().with(0, 0).with(1, 0);
        let mut solver = EdmondsKarp::new(&network);

        let err = solver.seed(&partial, SeedPolicy::Strict).unwrap_err();
        assert!(matches!(err, Error::InconsistentFlowState(_)));
        assert_eq!(solver.phase(), Phase::Built);
        assert_eq!(solver.value(), 0);
        assert_eq!(solver.residual().capacity(Node::Provider(0), Node::Sink), 1);

        // 宽松模式只跳过汇点弧
        let report = solver.seed(&partial, SeedPolicy::Lenient).unwrap();
        assert_eq!(report.seeded, 2);
        assert_eq!(
            report.skipped,
            vec![SkippedArc {
                hub: 1,
                from: Node::Provider(0),
                to: Node::Sink,
            }]
        );
    }

    #[test]
    fn test_seed_rejects_unknown_pair() {
        let network = assignment_network();
        let mut solver = EdmondsKarp::new(&network);
        let err = solver
            .seed(&PartialAssignment::new().with(1, 1), SeedPolicy::Lenient)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(solver.phase(), Phase::Built);
    }

    #[test]
    fn test_phase_transitions() {
        let network = assignment_network();
        let mut solver = EdmondsKarp::new(&network);
        assert_eq!(solver.phase(), Phase::Built);

        assert_eq!(solver.augment(), Some(1));
        assert_eq!(solver.phase(), Phase::Augmenting);

        let err = solver
            .seed(&PartialAssignment::new(), SeedPolicy::Lenient)
            .unwrap_err();
        assert!(matches!(err, Error::InconsistentFlowState(_)));

        assert_eq!(solver.run(), 2);
        assert_eq!(solver.phase(), Phase::Drained);
        assert_eq!(solver.augment(), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn test_cancelling_more_than_recorded_flow_panics() {
        let network = assignment_network();
        let mut flow = FlowRecord::new(&network);
        flow.record(EdgeId(0), 1);
        flow.record(EdgeId(1), 2);
    }

    #[test]
    fn test_cancel_along_twin() {
        let network = assignment_network();
        let mut flow = FlowRecord::new(&network);
        flow.record(EdgeId(0), 1);
        flow.record(EdgeId(1), 1);
        assert_eq!(flow.flow_on(EdgeId(0)), 0);
        assert_eq!(flow.flow_on(EdgeId(1)), 0);
    }

    #[test]
    fn test_empty_network() {
        let network = NetworkBuilder::new(0, 0).build().unwrap();
        let result = EdmondsKarp::new(&network)
            .max_flow(None, SeedPolicy::Lenient)
            .unwrap();
        assert_eq!(result.value, 0);
        assert_eq!(result.augmentations, 0);
    }

    #[test]
    fn test_saturated_arcs() {
        let network = NetworkBuilder::new(2, 1)
            .connect(0, 0)
            .connect(1, 0)
            .provider_capacity(0, 1)
            .build()
            .unwrap();
        let result = EdmondsKarp::new(&network)
            .max_flow(None, SeedPolicy::Lenient)
            .unwrap();

        let saturated = result.saturated_arcs();
        assert!(saturated.contains(&(Node::Provider(0), Node::Sink, 1)));
        assert_eq!(
            saturated
                .iter()
                .filter(|(from, _, _)| *from == Node::Source)
                .count(),
            1
        );
    }

    #[test]
    fn test_conservation_and_capacity_on_random_networks() {
        for seed in 0..200 {
            let instance = RandomInstance::generate(seed);
            let network = instance.network();
            let result = EdmondsKarp::new(&network)
                .max_flow(None, SeedPolicy::Lenient)
                .unwrap();

            for node in network.layout().nodes() {
                if matches!(node, Node::Hub(_) | Node::Provider(_)) {
                    assert_eq!(result.flow.net_outflow(node), 0, "seed {seed}: {node}");
                }
            }
            for (from, to, cap) in network.arcs() {
                assert!(result.flow.flow(from, to) <= cap, "seed {seed}");
            }
            assert_eq!(result.flow.value(), result.value, "seed {seed}");
            assert!(result.value <= instance.num_hubs as Capacity);
            assert_eq!(result.value, instance.brute_force_max_flow(), "seed {seed}");
        }
    }

    #[test]
    fn test_lenient_seeding_on_random_networks() {
        for seed in 0..300 {
            let instance = RandomInstance::generate(seed);
            let network = instance.network();
            let partial = instance.random_partial(seed);
            let result = EdmondsKarp::new(&network)
                .max_flow(Some(&partial), SeedPolicy::Lenient)
                .unwrap();

            // 正向弧与反向弧的残量之和始终等于原始容量
            for pair in 0..network.arc_count() {
                let forward = EdgeId(pair << 1);
                let capacity = network.edge(forward).capacity();
                let residual = result.residual.residual(forward);
                assert!(residual <= capacity, "seed {seed}");
                assert_eq!(
                    residual + result.residual.residual(forward.twin()),
                    capacity,
                    "seed {seed}"
                );
                assert_eq!(result.flow.flow_on(forward), capacity - residual, "seed {seed}");
            }

            assert_eq!(result.flow.value(), result.value, "seed {seed}");
            assert!(result.value <= instance.num_hubs as Capacity, "seed {seed}");
            let source_skips = result
                .seed_report
                .skipped
                .iter()
                .filter(|arc| arc.from == Node::Source)
                .count();
            assert_eq!(
                result.seeded,
                (partial.len() - source_skips) as Capacity,
                "seed {seed}"
            );
            assert!(result.residual.find_augmenting_path().is_none(), "seed {seed}");
        }
    }

    #[test]
    fn test_seeded_solve_matches_unseeded_value() {
        for seed in 0..200 {
            let instance = RandomInstance::generate(seed);
            let network = instance.network();
            let plain = EdmondsKarp::new(&network)
                .max_flow(None, SeedPolicy::Lenient)
                .unwrap();

            // 用一次完整求解的部分结果作为预分配
            let partial: PartialAssignment = (0..instance.num_hubs)
                .filter_map(|h| plain.flow.hub_flows(h).first().map(|&(p, _)| (h, p)))
                .skip(1)
                .collect();
            let seeded = EdmondsKarp::new(&network)
                .max_flow(Some(&partial), SeedPolicy::Strict)
                .unwrap();

            assert_eq!(seeded.seeded, partial.len() as Capacity);
            assert_eq!(seeded.value, plain.value, "seed {seed}");
        }
    }
}
