//! # history 子命令 CLI 定义
//!
//! - `show`: 打印作业的重提交历史
//! - `flag`: 标记作业需要重提交
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/history.rs`

use clap::{Args, Subcommand};
use std::path::PathBuf;

/// history 主命令参数
#[derive(Args, Debug)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommands,
}

/// history 子命令
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// Print the resubmission history of a job
    Show {
        /// Job output file
        outfile: PathBuf,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Mark a job as needing resubmission
    Flag {
        /// Job output file
        outfile: PathBuf,

        /// Reason recorded in the history log
        #[arg(long, default_value = "Flagged for resubmission")]
        note: String,
    },
}
