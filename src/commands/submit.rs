//! # submit 命令实现
//!
//! 依次提交作业脚本，两次提交之间等待固定时间。
//!
//! ## 依赖关系
//! - 使用 `cli/submit.rs` 定义的参数
//! - 使用 `jobs/queue.rs`, `utils/output.rs`
//! - `submit_and_report` 也被 `commands/followup.rs` 使用

use super::Context;
use crate::cli::submit::SubmitArgs;
use crate::error::{QmJobsError, Result};
use crate::jobs::queue::{self, QueueClient};
use crate::utils::output;

use std::path::PathBuf;
use std::time::Duration;

/// 执行 submit 命令
pub fn execute(args: SubmitArgs, ctx: &Context) -> Result<()> {
    output::print_header("Job Submission");

    for script in &args.scripts {
        if !script.is_file() {
            return Err(QmJobsError::FileNotFound {
                path: script.display().to_string(),
            });
        }
    }

    if args.dry_run {
        for script in &args.scripts {
            output::print_info(&format!("Would submit {}", script.display()));
        }
        output::print_done(&format!("{} script(s) ready (dry run)", args.scripts.len()));
        return Ok(());
    }

    let delay = match args.delay {
        Some(secs) if secs >= 0.0 && secs.is_finite() => Duration::from_secs_f64(secs),
        Some(secs) => {
            return Err(QmJobsError::InvalidArgument(format!(
                "Invalid submission delay: {}",
                secs
            )))
        }
        None => ctx.submit_delay(),
    };

    submit_and_report(&ctx.queue(), &args.scripts, delay)
}

/// 提交并逐个报告结果；任一失败时整体返回错误
pub fn submit_and_report(
    client: &dyn QueueClient,
    scripts: &[PathBuf],
    delay: Duration,
) -> Result<()> {
    let mut failed = 0;
    for (script, result) in queue::submit_all(client, scripts, delay) {
        match result {
            Ok(receipt) => {
                let id = receipt.job_id.as_deref().unwrap_or("?");
                output::print_success(&format!("Submitted {} (job {})", script.display(), id));
            }
            Err(e) => {
                failed += 1;
                output::print_error(&format!("Failed to submit {}: {}", script.display(), e));
            }
        }
    }

    if failed > 0 {
        return Err(QmJobsError::Other(format!(
            "{} of {} submissions failed",
            failed,
            scripts.len()
        )));
    }
    output::print_done(&format!("Submitted {} job(s)", scripts.len()));
    Ok(())
}
