//! # submit 子命令 CLI 定义
//!
//! 批量提交作业脚本到队列
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/submit.rs`

use clap::Args;
use std::path::PathBuf;

/// submit 子命令参数
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Job scripts to submit
    #[arg(required = true)]
    pub scripts: Vec<PathBuf>,

    /// Seconds to wait between submissions (default from config)
    #[arg(long)]
    pub delay: Option<f64>,

    /// List the scripts without submitting
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
