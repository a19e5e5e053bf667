//! # 批处理队列客户端
//!
//! 调用外部队列命令查询活动作业名与提交作业脚本。
//!
//! ## 功能
//! - `QueueClient` trait：查询与提交的接缝，便于测试时替换
//! - `CommandQueue`：基于外部命令 (qstat/qsub 或 squeue/sbatch) 的实现
//! - `QueueSnapshot`：一次分类过程中不变的活动作业快照
//!
//! ## 依赖关系
//! - 被 `jobs/resolver.rs`, `jobs/resub.rs`, `commands/` 使用
//! - 使用 `parsers/textgrab.rs` 按关键字抽取作业名

use crate::config::QueueConfig;
use crate::error::{QmJobsError, Result};
use crate::parsers::TextFile;
use crate::utils::output;

use regex::Regex;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;

/// 提交结果
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
    pub job_id: Option<String>,
    pub stdout: String,
}

/// 队列查询与提交接口
pub trait QueueClient: Sync {
    /// 当前用户的活动作业名
    fn active_jobs(&self) -> Result<Vec<String>>;

    /// 提交作业脚本
    fn submit(&self, jobscript: &Path) -> Result<SubmitReceipt>;
}

/// 通过外部命令访问队列
pub struct CommandQueue {
    config: QueueConfig,
}

impl CommandQueue {
    pub fn new(config: QueueConfig) -> Self {
        CommandQueue { config }
    }
}

impl QueueClient for CommandQueue {
    fn active_jobs(&self) -> Result<Vec<String>> {
        let argv = self.config.status_command();
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| QmJobsError::InvalidArgument("Empty queue status command".to_string()))?;
        let stdout = run_command(program, args, None)?;
        Ok(extract_job_names(
            &stdout,
            self.config.name_keyword(),
            self.config.name_index(),
        ))
    }

    fn submit(&self, jobscript: &Path) -> Result<SubmitReceipt> {
        let workdir = jobscript.parent().filter(|p| !p.as_os_str().is_empty());
        let script_name = jobscript
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                QmJobsError::InvalidArgument(format!("Not a jobscript: {}", jobscript.display()))
            })?;

        let stdout = run_command(
            self.config.submit_command(),
            &[script_name],
            workdir,
        )?;
        Ok(SubmitReceipt {
            job_id: extract_job_id(&stdout),
            stdout: stdout.trim().to_string(),
        })
    }
}

/// 运行外部命令并返回 stdout
fn run_command(program: &str, args: &[String], workdir: Option<&Path>) -> Result<String> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = workdir {
        cmd.current_dir(dir);
    }
    tracing::debug!(program, ?args, "running queue command");

    let out = cmd.output().map_err(|e| match e.kind() {
        ErrorKind::NotFound => QmJobsError::CommandNotFound {
            command: program.to_string(),
        },
        _ => QmJobsError::CommandFailed {
            command: program.to_string(),
            stderr: e.to_string(),
        },
    })?;

    if !out.status.success() {
        return Err(QmJobsError::CommandFailed {
            command: format!("{} {}", program, args.join(" ")),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
}

/// 关键字定位抽取作业名
pub fn extract_job_names(stdout: &str, keyword: &str, index: usize) -> Vec<String> {
    TextFile::new(stdout)
        .grab_all(keyword, index)
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

/// 从提交命令输出中提取作业号
///
/// - SGE: `Your job 12345 ("name") has been submitted`
/// - Slurm: `Submitted batch job 12345`
pub fn extract_job_id(stdout: &str) -> Option<String> {
    let re = Regex::new(r"(?:Your job|Submitted batch job)\s+(\d+)").ok()?;
    re.captures(stdout)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// 一次分类过程中的活动作业快照
#[derive(Debug, Clone, Default)]
pub struct QueueSnapshot {
    names: HashSet<String>,
    queried: bool,
}

impl QueueSnapshot {
    /// 查询队列；失败时退化为空集合并给出警告
    pub fn take(client: &dyn QueueClient) -> Self {
        match client.active_jobs() {
            Ok(names) => {
                tracing::info!(active = names.len(), "queue snapshot taken");
                QueueSnapshot {
                    names: names.into_iter().collect(),
                    queried: true,
                }
            }
            Err(e) => {
                output::print_warning(&format!("Active jobs list not queried! ({})", e));
                QueueSnapshot::default()
            }
        }
    }

    #[cfg(test)]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueueSnapshot {
            names: names.into_iter().map(Into::into).collect(),
            queried: true,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// 查询是否成功
    pub fn was_queried(&self) -> bool {
        self.queried
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// 依次提交作业脚本，两次提交之间等待 `delay`
pub fn submit_all(
    client: &dyn QueueClient,
    scripts: &[PathBuf],
    delay: Duration,
) -> Vec<(PathBuf, Result<SubmitReceipt>)> {
    let mut results = Vec::with_capacity(scripts.len());
    for (i, script) in scripts.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            thread::sleep(delay);
        }
        results.push((script.clone(), client.submit(script)));
    }
    results
}


#[cfg(test)]
mod tests {
    use super::testing::FakeQueue;
    use super::*;

    const QSTAT_R: &str = "\
job-ID  prior   name       user         state submit/start at     queue
-----------------------------------------------------------------------------
 101 0.50000 fe_oct_2   harperd      r     01/01/2018 00:00:00 gpus@node1
       Full jobname:     fe_oct_2
       Hard Resources:   gpus=1 (0.000000)
 102 0.50000 co_tet_1   harperd      qw    01/01/2018 00:00:00
       Full jobname:     co_tet_1
";

    #[test]
    fn test_extract_job_names_from_qstat() {
        assert_eq!(
            extract_job_names(QSTAT_R, "jobname:", 2),
            vec!["fe_oct_2", "co_tet_1"]
        );
    }

    #[test]
    fn test_extract_job_id() {
        assert_eq!(
            extract_job_id("Your job 4242 (\"mol_thermo\") has been submitted"),
            Some("4242".to_string())
        );
        assert_eq!(extract_job_id("Submitted batch job 77\n"), Some("77".to_string()));
        assert_eq!(extract_job_id("error"), None);
    }

    #[test]
    fn test_snapshot_degrades_to_empty() {
        let snapshot = QueueSnapshot::take(&FakeQueue::unreachable());
        assert!(!snapshot.was_queried());
        assert_eq!(snapshot.len(), 0);

        let snapshot = QueueSnapshot::take(&FakeQueue::with_active(&["a", "b"]));
        assert!(snapshot.was_queried());
        assert!(snapshot.contains("a"));
        assert!(!snapshot.contains("c"));
    }

    #[test]
    fn test_missing_status_command_is_reported() {
        let queue = CommandQueue::new(QueueConfig {
            status_command: Some(vec!["qmjobs-no-such-command".to_string()]),
            ..QueueConfig::default()
        });
        assert!(matches!(
            queue.active_jobs(),
            Err(QmJobsError::CommandNotFound { .. })
        ));
    }

    #[test]
    fn test_submit_all_in_order() {
        let queue = FakeQueue::with_active(&[]);
        let scripts = vec![PathBuf::from("/a/x_jobscript"), PathBuf::from("/b/y_jobscript")];
        let results = submit_all(&queue, &scripts, Duration::ZERO);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
        assert_eq!(queue.submitted(), scripts);
    }
}
