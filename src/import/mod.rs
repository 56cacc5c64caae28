//! 实例导入模块
//!
//! 支持从 JSON 文件读取单个规划实例，或从 JSON Lines 批量读取

use crate::error::{Error, Result};
use crate::planner::CityPlan;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// 导入统计
#[derive(Debug, Default, Clone)]
pub struct ImportStats {
    pub plans_imported: usize,
    pub errors: usize,
    pub duration_ms: u64,
}

/// 从 JSON 文件读取单个实例
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<CityPlan> {
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| Error::SerializationError(format!("JSON 解析错误: {}", e)))
}

/// 从 JSON Lines 读取多个实例，无法解析的行计入错误数
pub fn load_plans_jsonl<P: AsRef<Path>>(path: P) -> Result<(Vec<CityPlan>, ImportStats)> {
    let start = std::time::Instant::now();
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut stats = ImportStats::default();
    let mut plans = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<CityPlan>(&line) {
            Ok(plan) => {
                plans.push(plan);
                stats.plans_imported += 1;
            }
            Err(e) => {
                warn!(line = line_no + 1, error = %e, "跳过无法解析的实例");
                stats.errors += 1;
            }
        }
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    Ok((plans, stats))
}
