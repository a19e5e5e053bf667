//! # status 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/status.rs`

use clap::Args;
use std::path::PathBuf;

/// status 子命令参数
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Root directory containing job folders
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Print the category mapping as JSON instead of tables
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Only print the counts table
    #[arg(long, default_value_t = false)]
    pub counts_only: bool,
}
