//! 最小割
//!
//! 终态残量网络中从源点出发的可达集即最小割的源侧。

use super::max_flow::Residual;
use crate::network::{EdgeId, Layout, Node, NodeId};
use crate::types::Capacity;
use std::collections::VecDeque;

/// 最小割
#[derive(Debug, Clone)]
pub struct MinCut {
    layout: Layout,
    /// 按节点编号标记是否在源侧
    source_side: Vec<bool>,
    /// 从源侧指向汇侧的声明弧
    crossing: Vec<(Node, Node, Capacity)>,
}

impl MinCut {
    /// BFS 扫描残量为正的弧，求源点可达集
    pub fn from_residual(residual: &Residual<'_>) -> Self {
        let network = residual.network();
        let layout = network.layout();
        let mut source_side = vec![false; layout.node_count()];
        let mut queue = VecDeque::new();

        source_side[layout.source().index()] = true;
        queue.push_back(layout.source());

        while let Some(u) = queue.pop_front() {
            for &edge in network.out_edges(u) {
                let v = network.edge(edge).to();
                if !source_side[v.index()] && residual.residual(edge) > 0 {
                    source_side[v.index()] = true;
                    queue.push_back(v);
                }
            }
        }

        let crossing = (0..network.edge_count())
            .step_by(2)
            .map(EdgeId)
            .map(|id| network.edge(id))
            .filter(|e| source_side[e.from().index()] && !source_side[e.to().index()])
            .map(|e| (network.node(e.from()), network.node(e.to()), e.capacity()))
            .collect();

        Self {
            layout,
            source_side,
            crossing,
        }
    }

    /// 节点是否在源侧
    pub fn contains(&self, node: Node) -> bool {
        self.layout
            .id_of(node)
            .map(|id: NodeId| self.source_side[id.index()])
            .unwrap_or(false)
    }

    /// 源侧节点
    pub fn source_side(&self) -> impl Iterator<Item = Node> + '_ {
        self.layout.nodes().filter(move |&n| self.contains(n))
    }

    /// 汇点不可达时，割确实分隔了源点与汇点
    pub fn separates(&self) -> bool {
        !self.source_side[self.layout.sink().index()]
    }

    pub fn crossing_arcs(&self) -> &[(Node, Node, Capacity)] {
        &self.crossing
    }

    /// 割容量：跨越割的声明弧原始容量之和
    pub fn capacity(&self) -> Capacity {
        self.crossing.iter().map(|&(_, _, cap)| cap).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::{EdmondsKarp, SeedPolicy};
    use crate::network::{NetworkBuilder, PartialAssignment};
    use crate::test_utils::RandomInstance;

    #[test]
    fn test_cut_around_saturated_provider() {
        let network = NetworkBuilder::new(2, 1)
            .connect(0, 0)
            .connect(1, 0)
            .provider_capacity(0, 1)
            .build()
            .unwrap();
        let result = EdmondsKarp::new(&network)
            .max_flow(None, SeedPolicy::Lenient)
            .unwrap();
        let cut = result.min_cut();

        assert!(cut.separates());
        assert!(cut.contains(Node::Source));
        assert!(cut.contains(Node::Hub(0)));
        assert!(cut.contains(Node::Hub(1)));
        assert!(cut.contains(Node::Provider(0)));
        assert!(!cut.contains(Node::Sink));
        assert_eq!(cut.crossing_arcs(), &[(Node::Provider(0), Node::Sink, 1)]);
        assert_eq!(cut.capacity(), result.value);
    }

    #[test]
    fn test_unreachable_sink_when_no_providers() {
        let network = NetworkBuilder::new(1, 0).build().unwrap();
        let result = EdmondsKarp::new(&network)
            .max_flow(None, SeedPolicy::Lenient)
            .unwrap();
        let cut = result.min_cut();

        assert_eq!(result.value, 0);
        assert!(cut.separates());
        assert_eq!(cut.capacity(), 0);
        let side: Vec<_> = cut.source_side().collect();
        assert_eq!(side, vec![Node::Source, Node::Hub(0)]);
    }

    #[test]
    fn test_duality_on_random_networks() {
        for seed in 0..200 {
            let instance = RandomInstance::generate(seed);
            let network = instance.network();
            let result = EdmondsKarp::new(&network)
                .max_flow(None, SeedPolicy::Lenient)
                .unwrap();
            let cut = result.min_cut();

            assert!(cut.separates(), "seed {seed}");
            assert_eq!(cut.capacity(), result.value, "seed {seed}");
            assert!(result.residual.find_augmenting_path().is_none());
            // 跨越割的正向弧全部饱和
            for &(from, to, cap) in cut.crossing_arcs() {
                assert_eq!(result.flow.flow(from, to), cap, "seed {seed}");
            }
        }
    }

    #[test]
    fn test_duality_with_seeded_flow() {
        let network = NetworkBuilder::new(3, 2)
            .connect_all(0, [0, 1])
            .connect(1, 0)
            .connect(2, 0)
            .provider_capacities([1, 1])
            .build()
            .unwrap();
        let partial = PartialAssignment::new().with(0, 0).with(1, 0);
        let result = EdmondsKarp::new(&network)
            .max_flow(Some(&partial), SeedPolicy::Lenient)
            .unwrap();

        // 第二条预分配被汇点弧拦下
        assert_eq!(result.seed_report.skipped.len(), 1);
        let cut = result.min_cut();
        assert!(cut.separates());
    }
}
