//! 结果打印器
//!
//! 提供表格和垂直格式的规划结果输出

use crate::planner::{PlanOutcome, PlanReport};
use prettytable::{format, row, Cell, Row, Table};

/// 打印模式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrintMode {
    /// 表格模式
    Table,
    /// 垂直模式
    Vertical,
}

/// 结果打印器
pub struct Printer {
    mode: PrintMode,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new(PrintMode::Table)
    }
}

impl Printer {
    pub fn new(mode: PrintMode) -> Self {
        Self { mode }
    }

    /// 打印规划结果：分配表或扩容建议，编号使用合并编号空间
    pub fn print_report(&self, report: &PlanReport) -> String {
        let offset = report.num_hubs;
        let (columns, rows): (Vec<String>, Vec<Vec<String>>) = match &report.outcome {
            PlanOutcome::Assigned(assignment) => (
                vec!["Hub".to_string(), "Provider".to_string()],
                assignment
                    .iter()
                    .map(|(hub, provider)| vec![hub.to_string(), (provider + offset).to_string()])
                    .collect(),
            ),
            PlanOutcome::NeedsCapacity(providers) => (
                vec!["Provider".to_string(), "Action".to_string()],
                providers
                    .iter()
                    .map(|p| vec![(p + offset).to_string(), "increase capacity".to_string()])
                    .collect(),
            ),
        };

        if rows.is_empty() {
            return format!("Empty set ({} us)\n", report.duration_us);
        }

        let output = match self.mode {
            PrintMode::Table => self.format_table(&columns, &rows),
            PrintMode::Vertical => self.format_vertical(&columns, &rows),
        };

        let mut text = format!(
            "{}\n{} row(s) in set ({} us)\n",
            output,
            rows.len(),
            report.duration_us
        );

        if !report.rerouted.is_empty() {
            let columns = vec![
                "Rerouted Hub".to_string(),
                "Preassigned".to_string(),
                "Assigned".to_string(),
            ];
            let rows: Vec<Vec<String>> = report
                .rerouted
                .iter()
                .map(|r| {
                    vec![
                        r.hub.to_string(),
                        (r.preassigned + offset).to_string(),
                        (r.assigned + offset).to_string(),
                    ]
                })
                .collect();
            text.push_str(&match self.mode {
                PrintMode::Table => self.format_table(&columns, &rows),
                PrintMode::Vertical => self.format_vertical(&columns, &rows),
            });
        }

        text
    }

    /// 表格格式
    fn format_table(&self, columns: &[String], rows: &[Vec<String>]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);

        let header: Vec<Cell> = columns.iter().map(|c| Cell::new(c)).collect();
        table.set_titles(Row::new(header));

        for row_data in rows {
            let cells: Vec<Cell> = row_data.iter().map(|v| Cell::new(v)).collect();
            table.add_row(Row::new(cells));
        }

        table.to_string()
    }

    /// 垂直格式
    fn format_vertical(&self, columns: &[String], rows: &[Vec<String>]) -> String {
        let max_col_width = columns.iter().map(|c| c.len()).max().unwrap_or(0);
        let mut output = String::new();

        for (i, row_data) in rows.iter().enumerate() {
            output.push_str(&format!(
                "*************************** {}. row ***************************\n",
                i + 1
            ));

            for (j, col) in columns.iter().enumerate() {
                let value = row_data.get(j).map(|s| s.as_str()).unwrap_or("");
                output.push_str(&format!("{:>width$}: {}\n", col, value, width = max_col_width));
            }
        }

        output
    }

    /// 打印求解统计
    pub fn print_stats(&self, report: &PlanReport) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(row!["Property", "Value"]);
        table.add_row(row!["Hubs", report.num_hubs.to_string()]);
        table.add_row(row!["Providers", report.num_providers.to_string()]);
        table.add_row(row!["Total Flow", report.total_flow.to_string()]);
        table.add_row(row!["Seeded", report.seeded.to_string()]);
        table.add_row(row!["Augmentations", report.augmentations.to_string()]);
        table.add_row(row!["Skipped Seed Arcs", report.skipped_seeds.len().to_string()]);
        table.add_row(row!["Rerouted Hubs", report.rerouted.len().to_string()]);
        table.to_string()
    }
}
