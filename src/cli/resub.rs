//! # resub 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/resub.rs`

use clap::Args;
use std::path::PathBuf;

/// resub 子命令参数
#[derive(Args, Debug)]
pub struct ResubArgs {
    /// Root directory containing job folders
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Show what would be resubmitted without submitting
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
