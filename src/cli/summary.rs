//! # summary 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/summary.rs`

use clap::Args;
use std::path::PathBuf;

/// summary 子命令参数
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Root directory containing job folders
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Also write the table to a CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Only list finished jobs
    #[arg(long, default_value_t = false)]
    pub finished_only: bool,
}
