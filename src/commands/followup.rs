//! # followup 命令实现
//!
//! 为已完成的作业生成后续计算。
//!
//! ## 功能
//! - 单个母体：`followup <outfile>`
//! - 目录树：`followup --finished-in <dir>`，先分类，再对所有 `Finished` 作业并行生成
//! - 可选立即提交生成的作业脚本
//!
//! ## 依赖关系
//! - 使用 `cli/followup.rs` 定义的参数
//! - 使用 `jobs/followup.rs`, `jobs/queue.rs`, `utils/output.rs`

use super::Context;
use crate::batch::{BatchResult, ProcessResult};
use crate::cli::followup::FollowupArgs;
use crate::config::Config;
use crate::error::{QmJobsError, Result};
use crate::jobs::{self, FollowUpGenerator, FollowUpOutcome};
use crate::models::{FollowUpKind, JobStatus};
use crate::utils::output;

use std::path::{Path, PathBuf};

/// 为一个母体生成选定类型的全部后续作业
///
/// 某一类型失败时给出警告并继续其余类型；所有类型都失败时返回第一个错误。
fn generate_for(
    outfile: &Path,
    kinds: &[FollowUpKind],
    solvent: bool,
    config: &Config,
) -> Result<Vec<FollowUpOutcome>> {
    let generator = FollowUpGenerator::prepare(outfile, config)?;
    let mut outcomes = Vec::new();
    let mut first_error = None;
    for kind in kinds {
        match generator.generate(*kind, solvent) {
            Ok(generated) => outcomes.extend(generated),
            Err(e) => {
                output::print_warning(&format!("{} for {}: {}", kind, outfile.display(), e));
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }
    match first_error {
        Some(e) if outcomes.is_empty() => Err(e),
        _ => Ok(outcomes),
    }
}

fn report(outcomes: &[FollowUpOutcome]) {
    for outcome in outcomes {
        match outcome {
            FollowUpOutcome::Created { job, .. } => {
                output::print_success(&format!("Created {} ({})", job.name, job.kind))
            }
            FollowUpOutcome::Skipped(msg) => output::print_skip(msg),
        }
    }
}

/// 执行 followup 命令
pub fn execute(args: FollowupArgs, ctx: &Context) -> Result<()> {
    output::print_header("Follow-up Job Generation");
    let kinds = args.kind.kinds();

    let outcomes = match (&args.outfile, &args.finished_in) {
        (Some(outfile), None) => {
            let outcomes = generate_for(outfile, &kinds, args.solvent, &ctx.config)?;
            report(&outcomes);
            outcomes
        }
        (None, Some(dir)) => generate_for_finished(dir, &kinds, args.solvent, ctx)?,
        _ => {
            return Err(QmJobsError::InvalidArgument(
                "Give either an output file or --finished-in <dir>".to_string(),
            ))
        }
    };

    let scripts: Vec<PathBuf> = outcomes
        .iter()
        .filter_map(|o| o.jobscript().map(Path::to_path_buf))
        .collect();
    output::print_info(&format!(
        "{} job(s) created, {} skipped",
        scripts.len(),
        outcomes.len() - scripts.len()
    ));

    if args.submit && !scripts.is_empty() {
        super::submit::submit_and_report(&ctx.queue(), &scripts, ctx.submit_delay())?;
    }

    output::print_done("Follow-up generation complete");
    Ok(())
}

/// 对目录树下所有 `Finished` 作业生成后续计算
fn generate_for_finished(
    dir: &Path,
    kinds: &[FollowUpKind],
    solvent: bool,
    ctx: &Context,
) -> Result<Vec<FollowUpOutcome>> {
    let runner = ctx.runner()?;
    let completeness = jobs::check_completeness(dir, &ctx.queue(), &ctx.config.classify, &runner)?;
    let finished = completeness.classification.get(JobStatus::Finished).to_vec();
    output::print_info(&format!("{} finished jobs found", finished.len()));

    let results = runner.map(&finished, "Generating follow-ups", |outfile| {
        generate_for(outfile, kinds, solvent, &ctx.config)
    });

    let mut summary = BatchResult::default();
    let mut outcomes = Vec::new();
    for (outfile, result) in finished.iter().zip(results) {
        let parent = outfile.display().to_string();
        match result {
            Ok(generated) => {
                let created = generated.iter().any(|o| o.jobscript().is_some());
                report(&generated);
                summary.merge(if created {
                    ProcessResult::Success(parent)
                } else {
                    ProcessResult::Skipped(parent)
                });
                outcomes.extend(generated);
            }
            Err(e) => {
                output::print_warning(&format!("{}: {}", parent, e));
                summary.merge(ProcessResult::Failed(parent, e.to_string()));
            }
        }
    }

    output::print_separator();
    output::print_info(&format!(
        "Parents: {} total, {} with new jobs, {} unchanged, {} failed",
        summary.total(),
        summary.success,
        summary.skipped,
        summary.failed
    ));
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::queue::{self, testing::FakeQueue};
    use std::fs;
    use std::time::Duration;

    #[test]
    fn test_generate_all_kinds_for_closed_shell_parent() {
        let dir = tempfile::tempdir().unwrap();
        let job_dir = dir.path().join("mol");
        fs::create_dir_all(job_dir.join("scr")).unwrap();
        fs::write(job_dir.join("scr/optim.xyz"), "1\nframe 0\nHe 0 0 0\n").unwrap();
        fs::write(job_dir.join("scr/c0"), "guess").unwrap();
        let out = job_dir.join("mol.out");
        fs::write(
            &out,
            "TeraChem\nTotal charge: 0\nSPIN S-SQUARED: 0.0000 (exact: 0.0000)\n\
             Job finished: Mon Jan 1 2018\n",
        )
        .unwrap();

        let config = Config::default();
        let outcomes = generate_for(&out, &FollowUpKind::ALL, false, &config).unwrap();
        let scripts: Vec<_> = outcomes.iter().filter_map(|o| o.jobscript()).collect();
        assert_eq!(scripts.len(), 4);
        for name in ["mol_vertIP_2", "mol_vertEA_2", "mol_solventSP", "mol_thermo"] {
            assert!(job_dir.join(name).is_dir(), "{} missing", name);
        }

        let fake = FakeQueue::with_active(&[]);
        let paths: Vec<PathBuf> = scripts.iter().map(|p| p.to_path_buf()).collect();
        queue::submit_all(&fake, &paths, Duration::ZERO);
        assert_eq!(fake.submitted().len(), 4);
    }

    #[test]
    fn test_failed_kind_does_not_stop_later_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let job_dir = dir.path().join("mol");
        fs::create_dir_all(job_dir.join("scr")).unwrap();
        fs::write(job_dir.join("scr/optim.xyz"), "1\nframe 0\nHe 0 0 0\n").unwrap();
        let out = job_dir.join("mol.out");
        fs::write(
            &out,
            "TeraChem\nTotal charge: 0\nSPIN S-SQUARED: 0.0000 (exact: 0.0000)\n\
             Job finished: Mon Jan 1 2018\n",
        )
        .unwrap();

        // 没有 scr/c0：溶剂单点失败，垂直 IP 仍然生成
        let config = Config::default();
        let kinds = [FollowUpKind::SolventSp, FollowUpKind::VerticalIp];
        let outcomes = generate_for(&out, &kinds, false, &config).unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(job_dir.join("mol_vertIP_2").is_dir());
        assert!(!job_dir.join("mol_solventSP").exists());

        let err = generate_for(&out, &[FollowUpKind::Thermo], false, &config);
        assert!(matches!(err, Err(QmJobsError::FileNotFound { .. })));
    }
}
