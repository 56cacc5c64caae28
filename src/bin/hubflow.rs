//! HubFlow 命令行工具
//!
//! 读取城市规划实例，输出分配或扩容建议

use anyhow::{bail, Context};
use clap::Parser;
use colored::Colorize;
use hubflow::algorithm::EdmondsKarp;
use hubflow::cli::{PrintMode, Printer};
use hubflow::import::{load_plan, load_plans_jsonl};
use hubflow::planner::{positional, CityPlan, PlanReport, Planner, PlannerConfig};
use hubflow::{GraphSnapshot, SeedPolicy, Stage};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "hubflow")]
#[command(about = "数据枢纽-服务商分配工具")]
struct Args {
    /// 输入文件路径（JSON；批量模式下为 JSON Lines）
    #[arg(short, long)]
    input: PathBuf,

    /// 批量模式：每行一个实例
    #[arg(short, long)]
    batch: bool,

    /// 输出格式: table, vertical, json
    #[arg(short, long, default_value = "table")]
    format: String,

    /// 只判断可行性
    #[arg(long)]
    feasibility: bool,

    /// 预分配不一致时直接报错
    #[arg(long)]
    strict_seeding: bool,

    /// 输出图快照: bipartite, network, residual
    #[arg(long)]
    dump_graph: Option<Stage>,

    /// 日志级别
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&args.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = PlannerConfig {
        seed_policy: if args.strict_seeding {
            SeedPolicy::Strict
        } else {
            SeedPolicy::Lenient
        },
    };
    let planner = Planner::new(config);

    if args.batch {
        run_batch(&args, &planner)
    } else {
        run_single(&args, &planner)
    }
}

fn run_single(args: &Args, planner: &Planner) -> anyhow::Result<()> {
    let plan = load_plan(&args.input)
        .with_context(|| format!("读取实例失败: {}", args.input.display()))?;
    let request = plan.to_request().context("实例无效")?;
    debug!(hubs = plan.num_data_hubs, providers = plan.num_service_providers, "实例已加载");

    if let Some(stage) = args.dump_graph {
        return dump_graph(&plan, stage, planner.config().seed_policy);
    }

    if args.feasibility {
        let feasible = planner.is_feasible(&request)?;
        if args.format == "json" {
            println!("{}", serde_json::json!({ "feasible": feasible }));
        } else {
            println!("{}", status_line(feasible));
        }
        return Ok(());
    }

    let report = planner.plan(&request)?;
    print_report(args, &plan, &report)
}

fn run_batch(args: &Args, planner: &Planner) -> anyhow::Result<()> {
    let (plans, stats) = load_plans_jsonl(&args.input)
        .with_context(|| format!("读取实例失败: {}", args.input.display()))?;
    if plans.is_empty() {
        bail!("没有可用的实例（{} 行解析失败）", stats.errors);
    }

    let mut requests = Vec::with_capacity(plans.len());
    for (i, plan) in plans.iter().enumerate() {
        requests.push(
            plan.to_request()
                .with_context(|| format!("第 {} 个实例无效", i + 1))?,
        );
    }

    let reports = planner.plan_batch(&requests);
    let mut feasible = 0;
    let mut failed = 0;

    for (i, (plan, report)) in plans.iter().zip(reports).enumerate() {
        match report {
            Ok(report) => {
                if report.outcome.is_feasible() {
                    feasible += 1;
                }
                println!("实例 #{}", i + 1);
                print_report(args, plan, &report)?;
            }
            Err(e) => {
                failed += 1;
                eprintln!("{} 实例 #{}: {}", "错误".red(), i + 1, e);
            }
        }
    }

    println!("\n批量完成!");
    println!("  实例数: {}", plans.len());
    println!("  可行: {}", feasible);
    println!("  不可行: {}", plans.len() - feasible - failed);
    println!("  失败: {}", failed);
    println!("  解析错误: {}", stats.errors);
    Ok(())
}

fn print_report(args: &Args, plan: &CityPlan, report: &PlanReport) -> anyhow::Result<()> {
    let sequence = positional(
        &report.outcome,
        plan.num_data_hubs,
        plan.num_service_providers,
    );

    match args.format.as_str() {
        "json" => {
            let value = serde_json::json!({
                "report": report,
                "positional": sequence,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        "table" | "vertical" => {
            let mode = if args.format == "table" {
                PrintMode::Table
            } else {
                PrintMode::Vertical
            };
            let printer = Printer::new(mode);
            println!("{}", status_line(report.outcome.is_feasible()));
            print!("{}", printer.print_report(report));
            println!("{}", printer.print_stats(report));
            println!("{:?}", sequence);
        }
        other => bail!("不支持的格式: {}", other),
    }
    Ok(())
}

fn dump_graph(plan: &CityPlan, stage: Stage, policy: SeedPolicy) -> anyhow::Result<()> {
    let request = plan.to_request()?;
    let network = request.build_network()?;

    let snapshot = match stage {
        Stage::Bipartite | Stage::Network => GraphSnapshot::of_network(&network, stage),
        Stage::Residual => {
            let mut solver = EdmondsKarp::new(&network);
            let seed_report = solver.seed(&request.partial, policy)?;
            debug!(seeded = seed_report.seeded, "快照前已注入预分配");
            GraphSnapshot::of_residual(solver.residual(), false)
        }
    };

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn status_line(feasible: bool) -> String {
    if feasible {
        format!("{} 所有枢纽均可分配", "可行".green().bold())
    } else {
        format!("{} 需要扩容", "不可行".red().bold())
    }
}
