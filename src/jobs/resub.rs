//! # 重提交
//!
//! 根据分类结果重新提交出错或被标记的作业，并更新重提交历史。
//!
//! - `Error` 与 `Resub` 类别的作业会被重提交（作业脚本为 `<name>_jobscript`）
//! - `ChronicError` 作业只报告，不再提交
//! - 提交成功后才记录历史；dry-run 不修改任何文件
//!
//! ## 依赖关系
//! - 被 `commands/resub.rs`, `commands/history.rs` 使用
//! - 使用 `jobs/history.rs`, `jobs/queue.rs`, `jobs/resolver.rs`

use super::history;
use super::queue::{QueueClient, SubmitReceipt};
use super::resolver::{job_name, CompletenessReport};
use crate::error::Result;
use crate::models::JobStatus;
use crate::utils::scripts;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// 单个作业的重提交结果
#[derive(Debug, Clone, PartialEq)]
pub enum ResubAction {
    /// 已提交（dry-run 时 `receipt` 为 `None`）
    Resubmitted {
        outfile: PathBuf,
        jobscript: PathBuf,
        receipt: Option<SubmitReceipt>,
        resub_number: u32,
    },
    /// 超出重提交预算
    Chronic(PathBuf),
    /// 找不到作业脚本
    MissingJobscript { outfile: PathBuf, jobscript: PathBuf },
    /// 提交命令失败
    Failed { outfile: PathBuf, reason: String },
}

/// 输出文件对应的作业脚本
pub fn jobscript_for(outfile: &Path) -> PathBuf {
    let name = scripts::jobscript_name(&job_name(outfile));
    match outfile.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// 人工标记作业需要重提交
pub fn flag(outfile: &Path, note: &str) -> Result<()> {
    history::update(outfile, |h| h.flag_for_resub(note))?;
    tracing::info!(job = %outfile.display(), "flagged for resubmission");
    Ok(())
}

/// 写入历史的说明文字
fn resub_note(report: &CompletenessReport, outfile: &Path, status: JobStatus) -> String {
    let scf_error = report.job(outfile).and_then(|j| j.result.scf_error);
    match (status, scf_error) {
        (_, Some(iterations)) => format!(
            "Resubmitted after SCF divergence ({} iterations)",
            iterations
        ),
        (JobStatus::Resub, None) => "Resubmitted as flagged".to_string(),
        _ => "Resubmitted after job stopped without finishing".to_string(),
    }
}

/// 重提交 `Error` 与 `Resub` 作业
pub fn resubmit(
    report: &CompletenessReport,
    queue: &dyn QueueClient,
    delay: Duration,
    dry_run: bool,
) -> Vec<ResubAction> {
    let classification = &report.classification;
    let mut actions: Vec<ResubAction> = classification
        .get(JobStatus::ChronicError)
        .iter()
        .map(|p| ResubAction::Chronic(p.clone()))
        .collect();

    let candidates = [JobStatus::Error, JobStatus::Resub]
        .into_iter()
        .flat_map(|s| classification.get(s).iter().map(move |p| (s, p)));

    let mut submitted_any = false;
    for (status, outfile) in candidates {
        let jobscript = jobscript_for(outfile);
        if !jobscript.exists() {
            actions.push(ResubAction::MissingJobscript {
                outfile: outfile.clone(),
                jobscript,
            });
            continue;
        }

        let current = report
            .job(outfile)
            .map(|j| j.history.resub_number())
            .unwrap_or(0);
        if dry_run {
            actions.push(ResubAction::Resubmitted {
                outfile: outfile.clone(),
                jobscript,
                receipt: None,
                resub_number: current + 1,
            });
            continue;
        }

        if submitted_any && !delay.is_zero() {
            thread::sleep(delay);
        }
        submitted_any = true;

        let action = match queue.submit(&jobscript) {
            Ok(receipt) => {
                let note = resub_note(report, outfile, status);
                match history::update(outfile, |h| {
                    h.record_resubmission(note);
                    h.resub_number()
                }) {
                    Ok(resub_number) => {
                        tracing::info!(job = %outfile.display(), resub_number, "resubmitted");
                        ResubAction::Resubmitted {
                            outfile: outfile.clone(),
                            jobscript,
                            receipt: Some(receipt),
                            resub_number,
                        }
                    }
                    Err(e) => ResubAction::Failed {
                        outfile: outfile.clone(),
                        reason: format!("submitted but history not updated: {}", e),
                    },
                }
            }
            Err(e) => ResubAction::Failed {
                outfile: outfile.clone(),
                reason: e.to_string(),
            },
        };
        actions.push(action);
    }
    actions
}
