//! 通用类型定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 数据枢纽编号 `[0, num_hubs)`
pub type HubIndex = usize;

/// 服务商编号 `[0, num_providers)`
pub type ProviderIndex = usize;

/// 整数容量 / 流量
pub type Capacity = u64;

/// 节点所在层（源点 → 枢纽 → 服务商 → 汇点）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Source,
    Hub,
    Provider,
    Sink,
}

impl Layer {
    /// 分层布局中的列序号
    pub fn ordinal(&self) -> usize {
        match self {
            Layer::Source => 0,
            Layer::Hub => 1,
            Layer::Provider => 2,
            Layer::Sink => 3,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layer::Source => "source",
            Layer::Hub => "hub",
            Layer::Provider => "provider",
            Layer::Sink => "sink",
        };
        f.write_str(name)
    }
}
