//! # 批量执行器
//!
//! 并行执行批量处理任务。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代（保持输入顺序）
//! - 进度条显示
//! - 错误收集与汇总报告
//!
//! ## 依赖关系
//! - 被 `jobs/resolver.rs`, `commands/followup.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::error::{QmJobsError, Result};
use crate::utils::progress;

use rayon::prelude::*;
use std::path::PathBuf;

/// 单个作业处理结果
#[derive(Debug, Clone)]
pub enum ProcessResult {
    /// 处理成功
    Success(String),
    /// 跳过（如目录已存在）
    Skipped(String),
    /// 处理失败
    Failed(String, String), // (作业路径, 错误信息)
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchResult {
    /// 成功数量
    pub success: usize,
    /// 跳过数量
    pub skipped: usize,
    /// 失败数量
    pub failed: usize,
    /// 失败详情
    pub failures: Vec<(String, String)>,
}

impl BatchResult {
    /// 合并处理结果
    pub fn merge(&mut self, result: ProcessResult) {
        match result {
            ProcessResult::Success(_) => self.success += 1,
            ProcessResult::Skipped(_) => self.skipped += 1,
            ProcessResult::Failed(path, err) => {
                self.failed += 1;
                self.failures.push((path, err));
            }
        }
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success + self.skipped + self.failed
    }
}

/// 批量执行器
pub struct BatchRunner {
    pool: rayon::ThreadPool,
    show_progress: bool,
}

impl BatchRunner {
    /// 创建新的批量执行器，`jobs == 0` 时使用全部 CPU
    pub fn new(jobs: usize) -> Result<Self> {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| QmJobsError::Other(format!("Failed to build thread pool: {}", e)))?;
        Ok(Self {
            pool,
            show_progress: true,
        })
    }

    /// 关闭进度条
    pub fn quiet(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// 并行映射，结果顺序与输入一致
    pub fn map<T, F>(&self, items: &[PathBuf], message: &str, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&PathBuf) -> T + Sync + Send,
    {
        let pb = if self.show_progress {
            progress::create_progress_bar(items.len() as u64, message)
        } else {
            indicatif::ProgressBar::hidden()
        };

        let results: Vec<T> = self.pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    let result = f(item);
                    pb.inc(1);
                    result
                })
                .collect()
        });

        pb.finish_and_clear();
        results
    }

    /// 并行处理作业列表并汇总
    pub fn run<F>(&self, items: &[PathBuf], processor: F) -> BatchResult
    where
        F: Fn(&PathBuf) -> ProcessResult + Sync + Send,
    {
        let mut batch_result = BatchResult::default();
        for result in self.map(items, "Processing", processor) {
            batch_result.merge(result);
        }
        batch_result
    }
}
