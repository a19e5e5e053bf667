//! # resub 命令实现
//!
//! 分类目录树下的作业，重提交 `Error` 与 `Resub` 作业，报告 `ChronicError` 作业。
//!
//! ## 依赖关系
//! - 使用 `cli/resub.rs` 定义的参数
//! - 使用 `jobs/resolver.rs`, `jobs/resub.rs`, `utils/output.rs`

use super::Context;
use crate::cli::resub::ResubArgs;
use crate::error::Result;
use crate::jobs::{self, resub, ResubAction};
use crate::utils::output;

/// 执行 resub 命令
pub fn execute(args: ResubArgs, ctx: &Context) -> Result<()> {
    output::print_header(if args.dry_run {
        "Resubmission (dry run)"
    } else {
        "Resubmission"
    });

    let queue = ctx.queue();
    let runner = ctx.runner()?;
    let report = jobs::check_completeness(&args.dir, &queue, &ctx.config.classify, &runner)?;

    if !report.snapshot.was_queried() {
        // 没有快照时无法区分运行中与出错的作业
        output::print_warning("Active jobs could not be queried; refusing to resubmit.");
        return Ok(());
    }

    let actions = resub::resubmit(&report, &queue, ctx.submit_delay(), args.dry_run);

    let mut resubmitted = 0;
    for action in &actions {
        match action {
            ResubAction::Resubmitted {
                outfile,
                receipt,
                resub_number,
                ..
            } => {
                resubmitted += 1;
                let msg = match receipt {
                    Some(r) => format!(
                        "Resubmitted {} (attempt {}, job {})",
                        outfile.display(),
                        resub_number,
                        r.job_id.as_deref().unwrap_or("?")
                    ),
                    None => format!(
                        "Would resubmit {} (attempt {})",
                        outfile.display(),
                        resub_number
                    ),
                };
                output::print_success(&msg);
            }
            ResubAction::Chronic(outfile) => output::print_status(
                "Chronic_error",
                &format!("{} (not resubmitted)", outfile.display()),
            ),
            ResubAction::MissingJobscript { jobscript, .. } => {
                output::print_warning(&format!("No job script: {}", jobscript.display()))
            }
            ResubAction::Failed { outfile, reason } => {
                output::print_error(&format!("{}: {}", outfile.display(), reason))
            }
        }
    }

    output::print_done(&format!("{} job(s) resubmitted", resubmitted));
    Ok(())
}
