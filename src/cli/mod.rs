//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `status`: 作业状态分类
//! - `summary`: 输出文件汇总表
//! - `followup`: 生成后续计算作业
//! - `resub`: 重提交出错作业
//! - `history`: 查看/标记重提交历史（嵌套子命令）
//! - `submit`: 批量提交作业脚本
//! - `geometry`: 优化结构提取与收集（嵌套子命令）
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: status, summary, followup, resub, history, submit, geometry

pub mod followup;
pub mod geometry;
pub mod history;
pub mod resub;
pub mod status;
pub mod submit;
pub mod summary;

use crate::config::Scheduler;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// qmjobs - 量子化学批处理作业管理工具
#[derive(Parser)]
#[command(name = "qmjobs")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Batch job manager for TeraChem/ORCA calculations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// 所有子命令共享的参数
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// TOML configuration file
    #[arg(long, global = true, env = "QMJOBS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Silence diagnostic logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub quiet: bool,

    /// Also write diagnostic logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Number of parallel jobs (0 = all CPUs)
    #[arg(short, long, global = true, default_value_t = 0)]
    pub jobs: usize,

    /// Override the queue scheduler from the config file
    #[arg(long, global = true, value_enum)]
    pub scheduler: Option<Scheduler>,

    /// Override the resubmission budget from the config file
    #[arg(long, global = true)]
    pub max_resub: Option<u32>,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Classify every job output under a directory
    Status(status::StatusArgs),

    /// Tabulate parsed values of every job output under a directory
    Summary(summary::SummaryArgs),

    /// Generate vertical IP/EA, solvent single-point or thermo jobs
    Followup(followup::FollowupArgs),

    /// Resubmit failed and flagged jobs
    Resub(resub::ResubArgs),

    /// Inspect or flag the resubmission history of a job
    History(history::HistoryArgs),

    /// Submit job scripts to the queue
    Submit(submit::SubmitArgs),

    /// Extract or collect optimized geometries
    Geometry(geometry::GeometryArgs),
}
