//! 图算法模块
//!
//! 包含最大流与最小割算法

mod max_flow;
mod min_cut;

pub use max_flow::{
    EdmondsKarp, FlowRecord, MaxFlow, Phase, Residual, SeedPolicy, SeedReport, SkippedArc,
};
pub use min_cut::MinCut;
