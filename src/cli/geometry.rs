//! # geometry 子命令 CLI 定义
//!
//! - `extract`: 从单个轨迹中截取最后一帧
//! - `collect`: 收集目录树下所有已完成作业的优化结构
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/geometry.rs`

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// geometry 主命令参数
#[derive(Args, Debug)]
pub struct GeometryArgs {
    #[command(subcommand)]
    pub command: GeometryCommands,
}

/// geometry 子命令
#[derive(Subcommand, Debug)]
pub enum GeometryCommands {
    /// Write the last frame of an optimization trajectory to optimized.xyz
    Extract {
        /// Trajectory file (e.g. scr/optim.xyz)
        trajectory: PathBuf,
    },

    /// Collect optimized geometries of all finished jobs
    Collect {
        /// Root directory containing job folders
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Collection directory (must not exist)
        #[arg(long, default_value = "optimized_geos")]
        output: PathBuf,
    },
}
