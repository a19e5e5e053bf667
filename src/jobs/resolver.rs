//! # 作业状态判定
//!
//! 将队列快照、解析结果与重提交历史合并为每个作业唯一的 `JobStatus`。
//!
//! ## 覆盖顺序
//! Active > ChronicError > Error > Resub > SpinContaminated > Finished
//!
//! 五个谓词各自独立计算，`Error` 由 "既不活动也未完成" 推导，
//! 最后由 `JobPredicates::resolve` 按上述顺序取第一个成立的状态。
//!
//! ## 依赖关系
//! - 被 `commands/status.rs`, `commands/resub.rs`, `commands/followup.rs` 使用
//! - 使用 `batch/`, `parsers/calc_out.rs`, `jobs/history.rs`, `jobs/queue.rs`

use super::history;
use super::queue::{QueueClient, QueueSnapshot};
use crate::batch::{BatchRunner, FileCollector};
use crate::config::ClassifyConfig;
use crate::error::{QmJobsError, Result};
use crate::models::{CalculationResult, JobStatus, ResubHistory};
use crate::parsers;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// 单个作业的原始谓词
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobPredicates {
    pub active: bool,
    pub finished: bool,
    pub needs_resub: bool,
    pub spin_contaminated: bool,
    pub chronic_error: bool,
}

impl JobPredicates {
    /// 既不在队列中也未完成
    pub fn is_error(&self) -> bool {
        !self.active && !self.finished
    }

    /// 按覆盖顺序确定唯一状态
    pub fn resolve(&self) -> JobStatus {
        if self.active {
            JobStatus::Active
        } else if self.chronic_error {
            JobStatus::ChronicError
        } else if self.is_error() {
            JobStatus::Error
        } else if self.needs_resub {
            JobStatus::Resub
        } else if self.spin_contaminated {
            JobStatus::SpinContaminated
        } else {
            JobStatus::Finished
        }
    }
}

/// 一个作业的输入：路径、解析结果、历史
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub path: PathBuf,
    pub result: CalculationResult,
    pub history: ResubHistory,
}

impl JobRecord {
    /// 读取并解析一个作业
    pub fn load(path: &Path, config: &ClassifyConfig) -> Result<Self> {
        Ok(JobRecord {
            path: path.to_path_buf(),
            result: parsers::parse_output_file(path, config.scf_iteration_limit)?,
            history: history::load(path)?,
        })
    }

    pub fn predicates(&self, snapshot: &QueueSnapshot, config: &ClassifyConfig) -> JobPredicates {
        JobPredicates {
            active: snapshot.contains(&job_name(&self.path)),
            finished: self.result.is_finished(),
            needs_resub: self.history.needs_resub(),
            spin_contaminated: self.result.is_spin_contaminated(config.spin_tolerance),
            chronic_error: self.history.is_chronic(config.max_resub),
        }
    }
}

/// 队列中的作业名：输出文件名去掉扩展名
pub fn job_name(outfile: &Path) -> String {
    outfile
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 分类结果：状态 → 作业路径列表
#[derive(Debug, Clone, Default)]
pub struct Classification {
    buckets: BTreeMap<JobStatus, Vec<PathBuf>>,
}

impl Classification {
    fn insert(&mut self, status: JobStatus, path: PathBuf) {
        self.buckets.entry(status).or_default().push(path);
    }

    pub fn get(&self, status: JobStatus) -> &[PathBuf] {
        self.buckets.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, status: JobStatus) -> usize {
        self.get(status).len()
    }

    /// 作业总数
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 以类别名为键的映射（六个类别都在，可能为空）
    pub fn by_label(&self) -> BTreeMap<&'static str, Vec<String>> {
        JobStatus::ALL
            .iter()
            .map(|s| {
                let paths = self.get(*s).iter().map(|p| p.display().to_string()).collect();
                (s.label(), paths)
            })
            .collect()
    }
}

/// 对已加载的作业分类
pub fn classify(jobs: &[JobRecord], snapshot: &QueueSnapshot, config: &ClassifyConfig) -> Classification {
    let mut classification = Classification::default();
    for job in jobs {
        let status = job.predicates(snapshot, config).resolve();
        tracing::trace!(path = %job.path.display(), %status, "classified");
        classification.insert(status, job.path.clone());
    }
    classification
}

/// 查找目录树下的所有输出文件（排除队列日志）
pub fn find_outputs(dir: &Path, config: &ClassifyConfig) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Err(QmJobsError::DirectoryNotFound {
            path: dir.display().to_string(),
        });
    }
    Ok(FileCollector::new(dir.to_path_buf())
        .with_pattern(&config.output_pattern)?
        .excluding(&config.excluded_logs)
        .collect())
}

/// 一次完整的分类过程的产物
#[derive(Debug)]
pub struct CompletenessReport {
    pub jobs: Vec<JobRecord>,
    pub snapshot: QueueSnapshot,
    pub classification: Classification,
}

impl CompletenessReport {
    pub fn job(&self, path: &Path) -> Option<&JobRecord> {
        self.jobs.iter().find(|j| j.path == path)
    }
}

/// 扫描目录、并行解析、查询一次队列并分类
///
/// 任何输出文件无法识别程序类型时整个过程失败。
pub fn check_completeness(
    dir: &Path,
    queue: &dyn QueueClient,
    config: &ClassifyConfig,
    runner: &BatchRunner,
) -> Result<CompletenessReport> {
    let outputs = find_outputs(dir, config)?;
    tracing::info!(dir = %dir.display(), outputs = outputs.len(), "scanning job outputs");

    // 先取快照再解析：解析期间离开队列的作业读到的是最终输出
    let snapshot = QueueSnapshot::take(queue);
    let jobs = runner
        .map(&outputs, "Parsing outputs", |path| JobRecord::load(path, config))
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    let classification = classify(&jobs, &snapshot, config);

    Ok(CompletenessReport {
        jobs,
        snapshot,
        classification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::queue::testing::FakeQueue;
    use crate::models::{ProgramKind, Value};
    use std::collections::HashSet;
    use std::fs;

    fn record(name: &str, finished: bool, s2: f64, ideal: f64, history: ResubHistory) -> JobRecord {
        let mut result = CalculationResult::new(ProgramKind::TeraChem);
        if finished {
            result.finished = Some("Mon Jan 1 00:00:00 2018".to_string());
        }
        result.s_squared = Some(Value::Number(s2));
        result.s_squared_ideal = Some(Value::Number(ideal));
        JobRecord {
            path: PathBuf::from(format!("/jobs/{}/{}.out", name, name)),
            result,
            history,
        }
    }

    fn resubbed(times: u32) -> ResubHistory {
        let mut h = ResubHistory::default();
        for _ in 0..times {
            h.record_resubmission("retry");
        }
        h
    }

    fn flagged() -> ResubHistory {
        let mut h = ResubHistory::default();
        h.flag_for_resub("manual");
        h
    }

    #[test]
    fn test_override_order_on_predicates() {
        let all = JobPredicates {
            active: true,
            finished: true,
            needs_resub: true,
            spin_contaminated: true,
            chronic_error: true,
        };
        assert_eq!(all.resolve(), JobStatus::Active);

        let p = JobPredicates { active: false, ..all };
        assert_eq!(p.resolve(), JobStatus::ChronicError);

        let p = JobPredicates {
            chronic_error: false,
            finished: false,
            ..p
        };
        assert_eq!(p.resolve(), JobStatus::Error);

        let p = JobPredicates { finished: true, ..p };
        assert_eq!(p.resolve(), JobStatus::Resub);

        let p = JobPredicates {
            needs_resub: false,
            ..p
        };
        assert_eq!(p.resolve(), JobStatus::SpinContaminated);

        let p = JobPredicates {
            spin_contaminated: false,
            ..p
        };
        assert_eq!(p.resolve(), JobStatus::Finished);
    }

    #[test]
    fn test_active_overrides_everything() {
        let config = ClassifyConfig::default();
        let job = record("busy", true, 2.5, 0.75, resubbed(9));
        let snapshot = QueueSnapshot::from_names(["busy"]);
        assert_eq!(job.predicates(&snapshot, &config).resolve(), JobStatus::Active);
    }

    #[test]
    fn test_five_resubmissions_is_chronic() {
        let config = ClassifyConfig::default();
        let snapshot = QueueSnapshot::default();

        let job = record("tired", false, 0.0, 0.0, resubbed(5));
        assert_eq!(job.predicates(&snapshot, &config).resolve(), JobStatus::ChronicError);

        let mut flagged_chronic = resubbed(5);
        flagged_chronic.flag_for_resub("again");
        let job = record("tired", true, 0.0, 0.0, flagged_chronic);
        assert_eq!(job.predicates(&snapshot, &config).resolve(), JobStatus::ChronicError);

        let job = record("trying", false, 0.0, 0.0, resubbed(4));
        assert_eq!(job.predicates(&snapshot, &config).resolve(), JobStatus::Error);
    }

    #[test]
    fn test_spin_contaminated_finished_job() {
        let config = ClassifyConfig::default();
        let job = record("radical", true, 2.5, 0.75, ResubHistory::default());
        assert_eq!(
            job.predicates(&QueueSnapshot::default(), &config).resolve(),
            JobStatus::SpinContaminated
        );
    }

    #[test]
    fn test_partition_invariant() {
        let config = ClassifyConfig::default();
        let jobs = vec![
            record("a", true, 0.75, 0.75, ResubHistory::default()),
            record("b", true, 2.5, 0.75, ResubHistory::default()),
            record("c", false, 0.0, 0.0, ResubHistory::default()),
            record("d", true, 0.0, 0.0, flagged()),
            record("e", false, 0.0, 0.0, resubbed(6)),
            record("f", false, 0.0, 0.0, resubbed(2)),
            record("g", true, 3.0, 0.0, flagged()),
            record("h", false, 0.0, 0.0, flagged()),
        ];
        let snapshot = QueueSnapshot::from_names(["f", "unrelated"]);
        let classification = classify(&jobs, &snapshot, &config);

        let mut seen = HashSet::new();
        for status in JobStatus::ALL {
            for path in classification.get(status) {
                assert!(seen.insert(path.clone()), "{} in two categories", path.display());
            }
        }
        let input: HashSet<PathBuf> = jobs.iter().map(|j| j.path.clone()).collect();
        assert_eq!(seen, input);
        assert_eq!(classification.len(), jobs.len());

        let status = |name: &str| {
            let path = PathBuf::from(format!("/jobs/{}/{}.out", name, name));
            JobStatus::ALL
                .into_iter()
                .find(|s| classification.get(*s).contains(&path))
                .unwrap()
        };
        assert_eq!(status("a"), JobStatus::Finished);
        assert_eq!(status("b"), JobStatus::SpinContaminated);
        assert_eq!(status("c"), JobStatus::Error);
        assert_eq!(status("d"), JobStatus::Resub);
        assert_eq!(status("e"), JobStatus::ChronicError);
        assert_eq!(status("f"), JobStatus::Active);
        assert_eq!(status("g"), JobStatus::Resub);
        assert_eq!(status("h"), JobStatus::Error);
    }

    #[test]
    fn test_by_label_has_all_categories() {
        let labels = Classification::default().by_label();
        assert_eq!(labels.len(), 6);
        assert!(labels.contains_key("Spin_contaminated"));
        assert!(labels.values().all(Vec::is_empty));
    }

    #[test]
    fn test_check_completeness_on_directory() {
        let dir = tempfile::tempdir().unwrap();
        let write_job = |name: &str, content: &str| {
            let job_dir = dir.path().join(name);
            fs::create_dir_all(&job_dir).unwrap();
            let out = job_dir.join(format!("{}.out", name));
            fs::write(&out, content).unwrap();
            out
        };
        let done = write_job(
            "done",
            "TeraChem\nSPIN S-SQUARED: 0.000 (exact: 0.000)\nJob finished: Mon Jan 1 2018\n",
        );
        let crashed = write_job("crashed", "TeraChem\nFINAL ENERGY: -1.0 a.u.\n");
        let running = write_job("running", "TeraChem\n");
        fs::write(dir.path().join("nohup.out"), "not a calculation").unwrap();

        let queue = FakeQueue::with_active(&["running"]);
        let runner = BatchRunner::new(2).unwrap().quiet();
        let report =
            check_completeness(dir.path(), &queue, &ClassifyConfig::default(), &runner).unwrap();

        assert_eq!(report.classification.len(), 3);
        assert_eq!(report.classification.get(JobStatus::Finished), &[done]);
        assert_eq!(report.classification.get(JobStatus::Error), &[crashed]);
        assert_eq!(report.classification.get(JobStatus::Active), &[running]);
    }

    /// 查询队列时作业恰好结束并写完输出
    struct FinishesOnQuery {
        outfile: PathBuf,
    }

    impl QueueClient for FinishesOnQuery {
        fn active_jobs(&self) -> Result<Vec<String>> {
            fs::write(
                &self.outfile,
                "TeraChem\nSPIN S-SQUARED: 0.000 (exact: 0.000)\nJob finished: Mon Jan 1 2018\n",
            )
            .unwrap();
            Ok(vec![])
        }

        fn submit(&self, _jobscript: &Path) -> Result<crate::jobs::queue::SubmitReceipt> {
            unreachable!("classification never submits")
        }
    }

    #[test]
    fn test_job_leaving_queue_during_pass_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("late.out");
        fs::write(&out, "TeraChem\nFINAL ENERGY: -1.0 a.u.\n").unwrap();

        let queue = FinishesOnQuery { outfile: out.clone() };
        let runner = BatchRunner::new(1).unwrap().quiet();
        let report =
            check_completeness(dir.path(), &queue, &ClassifyConfig::default(), &runner).unwrap();
        assert_eq!(report.classification.get(JobStatus::Finished), &[out]);
        assert!(report.classification.get(JobStatus::Error).is_empty());
    }

    #[test]
    fn test_queue_failure_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("running.out");
        fs::write(&out, "TeraChem\n").unwrap();

        let runner = BatchRunner::new(1).unwrap().quiet();
        let report = check_completeness(
            dir.path(),
            &FakeQueue::unreachable(),
            &ClassifyConfig::default(),
            &runner,
        )
        .unwrap();
        assert!(!report.snapshot.was_queried());
        assert_eq!(report.classification.get(JobStatus::Error), &[out]);
    }

    #[test]
    fn test_unrecognized_output_fails_the_pass() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("odd.out"), "Gaussian\n").unwrap();
        let runner = BatchRunner::new(1).unwrap().quiet();
        let err = check_completeness(
            dir.path(),
            &FakeQueue::with_active(&[]),
            &ClassifyConfig::default(),
            &runner,
        )
        .unwrap_err();
        assert!(matches!(err, QmJobsError::UnrecognizedOutput { .. }));
    }
}
