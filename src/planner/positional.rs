//! 位置式接口
//!
//! 枢纽与服务商共用一个编号空间：`[0, H)` 为枢纽，`[H, H+P)` 为服务商；
//! 容量表长度为 `H + P`，前 `H` 项为占位。

use super::{PlanOutcome, PlanRequest, Planner};
use crate::error::{Error, Result};
use crate::types::ProviderIndex;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 城市规划实例
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityPlan {
    pub num_data_hubs: usize,
    pub num_service_providers: usize,
    /// 枢纽 → 服务商（合并编号）
    #[serde(default)]
    pub connections: IndexMap<usize, Vec<usize>>,
    pub provider_capacities: Vec<i64>,
    /// 枢纽 → 服务商（合并编号），通常缺最后一个枢纽
    #[serde(default)]
    pub preliminary_assignment: IndexMap<usize, usize>,
}

impl CityPlan {
    /// 合并编号 → 服务商编号
    fn provider_index(&self, raw: usize) -> Result<ProviderIndex> {
        raw.checked_sub(self.num_data_hubs)
            .filter(|&p| p < self.num_service_providers)
            .ok_or_else(|| {
                Error::invalid(format!(
                    "服务商编号 {} 不在合并编号的服务商区间内（起点 {}，共 {} 个）",
                    raw, self.num_data_hubs, self.num_service_providers
                ))
            })
    }

    /// 转为按层编号的规划请求
    pub fn to_request(&self) -> Result<PlanRequest> {
        let expected = self
            .num_data_hubs
            .checked_add(self.num_service_providers)
            .ok_or_else(|| {
                Error::invalid(format!(
                    "枢纽数 {} 与服务商数 {} 之和溢出",
                    self.num_data_hubs, self.num_service_providers
                ))
            })?;
        if self.provider_capacities.len() != expected {
            return Err(Error::invalid(format!(
                "容量表长度应为 {}, 实际为 {}",
                expected,
                self.provider_capacities.len()
            )));
        }

        let mut request = PlanRequest::new(self.num_data_hubs, self.num_service_providers)
            .capacities(self.provider_capacities[self.num_data_hubs..].iter().copied());

        for (&hub, providers) in &self.connections {
            let providers = providers
                .iter()
                .map(|&raw| self.provider_index(raw))
                .collect::<Result<Vec<_>>>()?;
            request = request.connect(hub, providers);
        }

        for (&hub, &raw) in &self.preliminary_assignment {
            request = request.preassign(hub, self.provider_index(raw)?);
        }

        Ok(request)
    }
}

/// 可行性查询：是否存在覆盖全部枢纽的分配
pub fn plan_city_feasible(plan: &CityPlan) -> Result<bool> {
    Planner::default().is_feasible(&plan.to_request()?)
}

/// 分配 / 诊断查询，返回位置式序列
pub fn plan_city(plan: &CityPlan) -> Result<Vec<usize>> {
    let report = Planner::default().plan(&plan.to_request()?)?;
    Ok(positional(
        &report.outcome,
        plan.num_data_hubs,
        plan.num_service_providers,
    ))
}

/// 可行时为长度 `H` 的服务商编号（合并编号）；
/// 不可行时为 `H` 个 0 加上 `P` 个 0/1 扩容标记。
pub fn positional(outcome: &PlanOutcome, num_hubs: usize, num_providers: usize) -> Vec<usize> {
    match outcome {
        PlanOutcome::Assigned(assignment) => assignment
            .as_slice()
            .iter()
            .map(|&p| p + num_hubs)
            .collect(),
        PlanOutcome::NeedsCapacity(providers) => std::iter::repeat(0)
            .take(num_hubs)
            .chain((0..num_providers).map(|p| usize::from(providers.contains(&p))))
            .collect(),
    }
}
