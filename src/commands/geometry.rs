//! # geometry 命令实现
//!
//! ## 功能
//! - `extract`: 截取单个轨迹的最后一帧到同目录 `optimized.xyz`
//! - `collect`: 对目录树下所有 `Finished` 作业截取优化结构，
//!   以 `<初始结构名>_optimized.xyz` 复制到收集目录
//!
//! 收集目录已存在时拒绝执行，避免覆盖之前的收集结果。
//! 两个作业的初始结构名相同时，后写入的文件名加序号，互不覆盖。
//!
//! ## 依赖关系
//! - 使用 `cli/geometry.rs` 定义的参数
//! - 使用 `parsers/trajectory.rs`, `jobs/resolver.rs`, `batch/`

use super::Context;
use crate::batch::{FileCollector, ProcessResult};
use crate::cli::geometry::{GeometryArgs, GeometryCommands};
use crate::error::{QmJobsError, Result};
use crate::jobs::{self, followup};
use crate::models::JobStatus;
use crate::parsers::trajectory;
use crate::utils::output;

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// 执行 geometry 命令
pub fn execute(args: GeometryArgs, ctx: &Context) -> Result<()> {
    match args.command {
        GeometryCommands::Extract { trajectory } => {
            if !trajectory.is_file() {
                return Err(QmJobsError::FileNotFound {
                    path: trajectory.display().to_string(),
                });
            }
            let target = trajectory::extract_optimized_geometry(&trajectory)?;
            output::print_success(&format!("Wrote {}", target.display()));
            Ok(())
        }
        GeometryCommands::Collect { dir, output } => collect(&dir, &output, ctx),
    }
}

/// 作业的初始结构名：作业目录中唯一的 `.xyz` 文件名主干，否则为目录名
pub fn initial_geometry_name(job_dir: &Path) -> Result<String> {
    let candidates = FileCollector::new(job_dir.to_path_buf())
        .with_pattern("*.xyz")?
        .recursive(false)
        .collect();

    let stem = match candidates.as_slice() {
        [only] => only.file_stem(),
        _ => job_dir.file_name(),
    };
    stem.map(|s| s.to_string_lossy().to_string())
        .ok_or_else(|| QmJobsError::InvalidArgument(format!("Cannot name {}", job_dir.display())))
}

/// 截取一个作业的优化结构并复制到收集目录
fn collect_one(outfile: &Path, target_dir: &Path) -> Result<PathBuf> {
    let job_dir = outfile
        .parent()
        .ok_or_else(|| QmJobsError::InvalidArgument(format!("No job directory: {}", outfile.display())))?;
    let trajectory = job_dir
        .join(followup::SCRATCH_DIR)
        .join(followup::TRAJECTORY_NAME);
    if !trajectory.is_file() {
        return Err(QmJobsError::FileNotFound {
            path: trajectory.display().to_string(),
        });
    }

    let optimized = trajectory::extract_optimized_geometry(&trajectory)?;
    let (target, mut file) = claim_target(target_dir, &initial_geometry_name(job_dir)?)?;
    let mut source = fs::File::open(&optimized).map_err(|e| QmJobsError::read(&optimized, e))?;
    io::copy(&mut source, &mut file).map_err(|e| QmJobsError::write(&target, e))?;
    Ok(target)
}

/// 独占创建 `<name>_optimized.xyz`；重名时依次尝试 `<name>_2_optimized.xyz` 等
fn claim_target(target_dir: &Path, name: &str) -> Result<(PathBuf, fs::File)> {
    let mut n = 1;
    loop {
        let file_name = if n == 1 {
            format!("{}_optimized.xyz", name)
        } else {
            format!("{}_{}_optimized.xyz", name, n)
        };
        let target = target_dir.join(file_name);
        match OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(file) => {
                if n > 1 {
                    tracing::warn!(name, target = %target.display(), "geometry name already collected, renamed");
                }
                return Ok((target, file));
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(QmJobsError::write(&target, e)),
        }
    }
}

fn collect(dir: &Path, output_dir: &Path, ctx: &Context) -> Result<()> {
    output::print_header("Collecting Optimized Geometries");

    // 相对路径相对于作业根目录
    let target_dir = if output_dir.is_absolute() {
        output_dir.to_path_buf()
    } else {
        dir.join(output_dir)
    };
    if target_dir.exists() {
        return Err(QmJobsError::InvalidArgument(format!(
            "Collection directory already exists: {}",
            target_dir.display()
        )));
    }

    let runner = ctx.runner()?;
    let report = jobs::check_completeness(dir, &ctx.queue(), &ctx.config.classify, &runner)?;
    let finished = report.classification.get(JobStatus::Finished).to_vec();
    if finished.is_empty() {
        output::print_warning("No finished jobs to collect.");
        return Ok(());
    }

    fs::create_dir(&target_dir).map_err(|e| QmJobsError::write(&target_dir, e))?;
    output::print_info(&format!("Collecting {} finished jobs", finished.len()));

    let result = runner.run(&finished, |outfile| {
        let name = outfile.display().to_string();
        match collect_one(outfile, &target_dir) {
            Ok(target) => ProcessResult::Success(target.display().to_string()),
            Err(QmJobsError::FileNotFound { path }) => {
                ProcessResult::Skipped(format!("{} (no {})", name, path))
            }
            Err(e) => ProcessResult::Failed(name, e.to_string()),
        }
    });

    for (path, err) in &result.failures {
        output::print_error(&format!("{}: {}", path, err));
    }
    output::print_done(&format!(
        "Collected {} of {} geometries into '{}' ({} skipped, {} failed)",
        result.success,
        result.total(),
        target_dir.display(),
        result.skipped,
        result.failed
    ));
    Ok(())
}
