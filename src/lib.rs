//! HubFlow - 数据枢纽与服务商分配引擎
//!
//! 把城市数据枢纽到服务商的分配建模为单位容量的分层流网络：
//! - 源点 → 枢纽 → 服务商 → 汇点 的网络构建
//! - Edmonds-Karp 最大流，支持注入已有的预分配
//! - 最小割诊断：不可行时指出需要扩容的服务商
//! - 位置式接口与图快照输出

pub mod algorithm;
pub mod cli;
pub mod error;
pub mod import;
pub mod network;
pub mod planner;
pub mod snapshot;
pub mod types;

#[cfg(test)]
mod test_utils;

// 重导出常用类型
pub use algorithm::{EdmondsKarp, MaxFlow, MinCut, SeedPolicy};
pub use error::{Error, Result};
pub use network::{Network, NetworkBuilder, Node, PartialAssignment};
pub use planner::{
    plan_city, plan_city_feasible, Assignment, CityPlan, PlanOutcome, PlanReport, PlanRequest,
    Planner, PlannerConfig, ReroutedHub,
};
pub use snapshot::{GraphSnapshot, Stage};
pub use types::{Capacity, HubIndex, Layer, ProviderIndex};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
