//! # history 命令实现
//!
//! 查看作业的重提交历史，或人工标记作业需要重提交。
//!
//! ## 依赖关系
//! - 使用 `cli/history.rs` 定义的参数
//! - 使用 `jobs/history.rs`, `jobs/resub.rs`, `utils/output.rs`

use crate::cli::history::{HistoryArgs, HistoryCommands};
use crate::error::{QmJobsError, Result};
use crate::jobs::{history, resub};
use crate::utils::output;

use std::path::Path;

/// 执行 history 命令
pub fn execute(args: HistoryArgs) -> Result<()> {
    match args.command {
        HistoryCommands::Show { outfile, json } => show(&outfile, json),
        HistoryCommands::Flag { outfile, note } => {
            require_output(&outfile)?;
            resub::flag(&outfile, &note)?;
            output::print_success(&format!("Flagged {} for resubmission", outfile.display()));
            Ok(())
        }
    }
}

fn require_output(outfile: &Path) -> Result<()> {
    if outfile.is_file() {
        Ok(())
    } else {
        Err(QmJobsError::FileNotFound {
            path: outfile.display().to_string(),
        })
    }
}

fn show(outfile: &Path, json: bool) -> Result<()> {
    require_output(outfile)?;
    let record = history::load(outfile)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    output::print_header(&format!("History of {}", outfile.display()));
    output::print_info(&format!("Resubmissions: {}", record.resub_number()));
    output::print_info(&format!("Needs resubmission: {}", record.needs_resub()));
    if record.notes().is_empty() {
        output::print_skip("No history entries");
    }
    for note in record.notes() {
        println!("  {}  {}", note.at.format("%Y-%m-%d %H:%M:%S"), note.message);
    }
    Ok(())
}
