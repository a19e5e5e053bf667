//! # 后续计算作业生成
//!
//! 从已完成的作业派生垂直 IP/EA、溶剂单点与热化学计算。
//!
//! ## 流程
//! 1. 重新解析母体输出，确认已完成（否则报错）
//! 2. 由理想 S(S+1) 推导自旋多重度
//! 3. 从 `scr/optim.xyz` 截取最后一帧（每个母体只做一次）
//! 4. 对每个候选作业：创建目录、复制结构与猜测轨道、写入输入与提交脚本
//!
//! 目标目录已存在时跳过该候选并返回说明文字，重复调用不会产生重复作业。
//! 所有文件操作都使用绝对路径，不改变进程工作目录。
//!
//! ## 依赖关系
//! - 被 `commands/followup.rs` 使用
//! - 使用 `parsers/`, `utils/scripts.rs`, `config.rs`

use crate::config::Config;
use crate::error::{QmJobsError, Result};
use crate::models::{FollowUpJob, FollowUpKind, RunType};
use crate::parsers::{self, infile, trajectory};
use crate::utils::scripts;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// 母体作业的 scratch 子目录
pub const SCRATCH_DIR: &str = "scr";

/// 优化轨迹文件名
pub const TRAJECTORY_NAME: &str = "optim.xyz";

/// 单个候选作业的生成结果
#[derive(Debug, Clone, PartialEq)]
pub enum FollowUpOutcome {
    /// 新作业已生成
    Created {
        job: FollowUpJob,
        jobscript: PathBuf,
    },
    /// 目标目录已存在
    Skipped(String),
}

impl FollowUpOutcome {
    pub fn jobscript(&self) -> Option<&Path> {
        match self {
            FollowUpOutcome::Created { jobscript, .. } => Some(jobscript),
            FollowUpOutcome::Skipped(_) => None,
        }
    }
}

impl std::fmt::Display for FollowUpOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FollowUpOutcome::Created { jobscript, .. } => write!(f, "{}", jobscript.display()),
            FollowUpOutcome::Skipped(msg) => write!(f, "{}", msg),
        }
    }
}

/// 垂直电离/亲和能计算的候选自旋多重度
pub fn candidate_multiplicities(multiplicity: u32) -> Vec<u32> {
    if multiplicity <= 1 {
        vec![2]
    } else {
        vec![multiplicity - 1, multiplicity + 1]
    }
}

/// 初始猜测轨道文件：闭壳层 `c0`，开壳层 `ca0` + `cb0`
pub fn guess_files(scratch: &Path, multiplicity: u32) -> Vec<PathBuf> {
    let names: &[&str] = if multiplicity == 1 {
        &["c0"]
    } else {
        &["ca0", "cb0"]
    };
    names.iter().map(|n| scratch.join(n)).collect()
}

/// 已完成的母体作业
#[derive(Debug, Clone)]
pub struct ParentJob {
    pub outfile: PathBuf,
    pub dir: PathBuf,
    pub name: String,
    pub charge: i32,
    pub spin_multiplicity: u32,
    /// 截取出的最后一帧
    pub optimized: PathBuf,
}

impl ParentJob {
    pub fn scratch(&self) -> PathBuf {
        self.dir.join(SCRATCH_DIR)
    }
}

/// 后续作业生成器
pub struct FollowUpGenerator<'a> {
    parent: ParentJob,
    config: &'a Config,
}

impl<'a> FollowUpGenerator<'a> {
    /// 校验母体已完成并截取优化结构
    pub fn prepare(outfile: &Path, config: &'a Config) -> Result<Self> {
        let outfile = fs::canonicalize(outfile).map_err(|_| QmJobsError::FileNotFound {
            path: outfile.display().to_string(),
        })?;
        let result = parsers::parse_output_file(&outfile, config.classify.scf_iteration_limit)?;
        if !result.is_finished() {
            return Err(QmJobsError::NotFinished {
                path: outfile.display().to_string(),
            });
        }

        let dir = outfile
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| QmJobsError::InvalidArgument(format!("No parent directory: {}", outfile.display())))?;

        let name = match result.name.clone() {
            Some(name) => name,
            None => super::resolver::job_name(&outfile),
        };

        let charge = match result.integer_charge() {
            Some(c) => c,
            None => infile::read_input_for(&outfile)
                .ok()
                .and_then(|p| p.charge)
                .ok_or_else(|| QmJobsError::MissingField {
                    field: "charge".to_string(),
                    path: outfile.display().to_string(),
                })?,
        };

        let optimized =
            trajectory::extract_optimized_geometry(&dir.join(SCRATCH_DIR).join(TRAJECTORY_NAME))?;

        let parent = ParentJob {
            spin_multiplicity: result.spin_multiplicity(),
            outfile,
            dir,
            name,
            charge,
            optimized,
        };
        tracing::info!(
            parent = %parent.name,
            outfile = %parent.outfile.display(),
            charge = parent.charge,
            multiplicity = parent.spin_multiplicity,
            "prepared follow-up parent"
        );
        Ok(FollowUpGenerator { parent, config })
    }

    /// 列出某类后续计算的作业描述（不触碰文件系统）
    ///
    /// `solvent` 只影响垂直 IP/EA；溶剂单点与热化学始终开启溶剂。
    pub fn plan(&self, kind: FollowUpKind, solvent: bool) -> Vec<FollowUpJob> {
        let parent = &self.parent;
        let charge = parent.charge + kind.charge_shift();
        match kind {
            FollowUpKind::VerticalIp | FollowUpKind::VerticalEa => {
                candidate_multiplicities(parent.spin_multiplicity)
                    .into_iter()
                    .map(|m| FollowUpJob {
                        kind,
                        name: format!("{}_{}_{}", parent.name, kind.suffix(), m),
                        charge,
                        spin_multiplicity: m,
                        run_type: RunType::Energy,
                        solvent,
                        guess_files: vec![],
                    })
                    .collect()
            }
            FollowUpKind::SolventSp | FollowUpKind::Thermo => {
                let run_type = if kind == FollowUpKind::Thermo {
                    RunType::Frequencies
                } else {
                    RunType::Energy
                };
                vec![FollowUpJob {
                    kind,
                    name: format!("{}_{}", parent.name, kind.suffix()),
                    charge,
                    spin_multiplicity: parent.spin_multiplicity,
                    run_type,
                    solvent: true,
                    guess_files: guess_files(&parent.scratch(), parent.spin_multiplicity),
                }]
            }
        }
    }

    /// 生成某类后续计算
    pub fn generate(&self, kind: FollowUpKind, solvent: bool) -> Result<Vec<FollowUpOutcome>> {
        self.plan(kind, solvent)
            .into_iter()
            .map(|job| self.materialize(job))
            .collect()
    }

    /// 创建作业目录并写入全部文件
    ///
    /// 源文件缺失时不创建目录；目录创建后任何一步失败都会删除该目录，
    /// 下次运行可以重新生成。
    fn materialize(&self, job: FollowUpJob) -> Result<FollowUpOutcome> {
        let job_dir = self.parent.dir.join(&job.name);

        // 已生成过的作业直接跳过，不要求源文件仍然存在
        if !job_dir.exists() {
            for source in std::iter::once(&self.parent.optimized).chain(&job.guess_files) {
                if !source.is_file() {
                    return Err(QmJobsError::FileNotFound {
                        path: source.display().to_string(),
                    });
                }
            }
        }

        // create_dir 在目录已存在时原子地失败，作为幂等保护
        match fs::create_dir(&job_dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let msg = match job.kind {
                    FollowUpKind::VerticalIp | FollowUpKind::VerticalEa => format!(
                        "Directory for {} spin {} already exists: {}",
                        job.kind,
                        job.spin_multiplicity,
                        job_dir.display()
                    ),
                    _ => format!(
                        "Directory for {} already exists: {}",
                        job.kind,
                        job_dir.display()
                    ),
                };
                tracing::debug!("{}", msg);
                return Ok(FollowUpOutcome::Skipped(msg));
            }
            Err(e) => return Err(QmJobsError::write(&job_dir, e)),
        }

        match self.populate(&job, &job_dir) {
            Ok(jobscript) => {
                tracing::info!(job = %job.name, dir = %job_dir.display(), "follow-up job created");
                Ok(FollowUpOutcome::Created { job, jobscript })
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&job_dir) {
                    tracing::warn!(dir = %job_dir.display(), error = %cleanup, "could not remove incomplete job directory");
                }
                Err(e)
            }
        }
    }

    /// 向新建的作业目录写入结构、猜测轨道、输入与提交脚本
    fn populate(&self, job: &FollowUpJob, job_dir: &Path) -> Result<PathBuf> {
        copy_file(&self.parent.optimized, &job_dir.join(format!("{}.xyz", job.name)))?;
        for guess in &job.guess_files {
            if let Some(file_name) = guess.file_name() {
                copy_file(guess, &job_dir.join(file_name))?;
            }
        }

        let input_path = job_dir.join(format!("{}.in", job.name));
        let input = scripts::generate_input_file(job, &self.config.input);
        fs::write(&input_path, input).map_err(|e| QmJobsError::write(&input_path, e))?;

        let jobscript = job_dir.join(scripts::jobscript_name(&job.name));
        let script = scripts::generate_jobscript(self.config.queue.scheduler, job, &self.config.jobscript);
        fs::write(&jobscript, script).map_err(|e| QmJobsError::write(&jobscript, e))?;
        Ok(jobscript)
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(QmJobsError::FileNotFound {
            path: from.display().to_string(),
        });
    }
    fs::copy(from, to).map_err(|e| QmJobsError::write(to, e))?;
    Ok(())
}
