//! 测试辅助：随机实例与穷举参考解

use crate::network::{Network, NetworkBuilder, PartialAssignment};
use crate::types::Capacity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 随机生成的小规模分配实例
#[derive(Debug, Clone)]
pub(crate) struct RandomInstance {
    pub num_hubs: usize,
    pub num_providers: usize,
    pub adjacency: Vec<Vec<usize>>,
    pub capacities: Vec<i64>,
}

impl RandomInstance {
    pub fn generate(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let num_hubs = rng.gen_range(0..7);
        let num_providers = rng.gen_range(1..5);

        let adjacency = (0..num_hubs)
            .map(|_| {
                (0..num_providers)
                    .filter(|_| rng.gen_bool(0.45))
                    .collect()
            })
            .collect();
        let capacities = (0..num_providers).map(|_| rng.gen_range(0..3)).collect();

        Self {
            num_hubs,
            num_providers,
            adjacency,
            capacities,
        }
    }

    pub fn builder(&self) -> NetworkBuilder {
        self.adjacency.iter().enumerate().fold(
            NetworkBuilder::new(self.num_hubs, self.num_providers)
                .provider_capacities(self.capacities.iter().copied()),
            |builder, (hub, providers)| builder.connect_all(hub, providers.iter().copied()),
        )
    }

    pub fn network(&self) -> Network {
        self.builder().build().expect("随机实例应当合法")
    }

    /// 随机预分配：枢纽从自己的邻接服务商中任选，可能超出服务商容量
    pub fn random_partial(&self, seed: u64) -> PartialAssignment {
        let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
        self.adjacency
            .iter()
            .enumerate()
            .filter(|(_, providers)| !providers.is_empty())
            .filter_map(|(hub, providers)| {
                if rng.gen_bool(0.6) {
                    Some((hub, providers[rng.gen_range(0..providers.len())]))
                } else {
                    None
                }
            })
            .collect()
    }

    /// 穷举每个枢纽的选择（或不分配），求最大可分配枢纽数
    pub fn brute_force_max_flow(&self) -> Capacity {
        let mut remaining: Vec<i64> = self.capacities.clone();
        self.search(0, &mut remaining)
    }

    fn search(&self, hub: usize, remaining: &mut Vec<i64>) -> Capacity {
        if hub == self.num_hubs {
            return 0;
        }
        let mut best = self.search(hub + 1, remaining);
        for &provider in &self.adjacency[hub] {
            if remaining[provider] > 0 {
                remaining[provider] -= 1;
                best = best.max(1 + self.search(hub + 1, remaining));
                remaining[provider] += 1;
            }
        }
        best
    }
}
