//! # 配置模块
//!
//! 从 TOML 文件读取队列、分类、输入文件与作业脚本的默认参数。
//! 所有字段都有默认值，未提供配置文件时使用内置默认值。
//!
//! ## 依赖关系
//! - 被 `commands/` 与 `jobs/` 使用
//! - 使用 `serde`, `toml`

use crate::error::{QmJobsError, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// 队列调度器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scheduler {
    /// Sun Grid Engine (qstat / qsub)
    #[default]
    Sge,
    /// Slurm (squeue / sbatch)
    Slurm,
}

impl Scheduler {
    fn default_status_command(&self) -> Vec<String> {
        let parts: &[&str] = match self {
            Scheduler::Sge => &["qstat", "-r"],
            Scheduler::Slurm => &["squeue", "-h", "--me", "-o", "jobname: %j"],
        };
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn default_name_index(&self) -> usize {
        match self {
            // "       Full jobname:     my_job"
            Scheduler::Sge => 2,
            // "jobname: my_job"
            Scheduler::Slurm => 1,
        }
    }

    fn default_submit_command(&self) -> &'static str {
        match self {
            Scheduler::Sge => "qsub",
            Scheduler::Slurm => "sbatch",
        }
    }
}

impl std::fmt::Display for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scheduler::Sge => write!(f, "sge"),
            Scheduler::Slurm => write!(f, "slurm"),
        }
    }
}

/// 顶层配置
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub queue: QueueConfig,
    pub classify: ClassifyConfig,
    pub input: InputConfig,
    pub jobscript: JobscriptConfig,
}

/// `[queue]` 外部队列命令
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    pub scheduler: Scheduler,
    pub status_command: Option<Vec<String>>,
    pub name_keyword: Option<String>,
    pub name_index: Option<usize>,
    pub submit_command: Option<String>,
    pub submit_delay_ms: Option<u64>,
}

impl QueueConfig {
    pub fn status_command(&self) -> Vec<String> {
        self.status_command
            .clone()
            .unwrap_or_else(|| self.scheduler.default_status_command())
    }

    pub fn name_keyword(&self) -> &str {
        self.name_keyword.as_deref().unwrap_or("jobname:")
    }

    pub fn name_index(&self) -> usize {
        self.name_index
            .unwrap_or_else(|| self.scheduler.default_name_index())
    }

    pub fn submit_command(&self) -> &str {
        self.submit_command
            .as_deref()
            .unwrap_or_else(|| self.scheduler.default_submit_command())
    }

    pub fn submit_delay_ms(&self) -> u64 {
        self.submit_delay_ms.unwrap_or(1000)
    }
}

/// `[classify]` 分类阈值
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifyConfig {
    pub max_resub: u32,
    pub spin_tolerance: f64,
    pub scf_iteration_limit: u64,
    pub output_pattern: String,
    pub excluded_logs: Vec<String>,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        ClassifyConfig {
            max_resub: 5,
            spin_tolerance: 1.0,
            scf_iteration_limit: crate::parsers::SCF_ITERATION_LIMIT,
            output_pattern: "*.out".to_string(),
            excluded_logs: vec!["nohup.out".to_string()],
        }
    }
}

/// `[input]` TeraChem 输入文件参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub method: String,
    pub basis: String,
    pub levelshift_a: f64,
    pub levelshift_b: f64,
    pub maxit: u32,
    pub gpus: u32,
    pub scrdir: String,
    pub nbo: bool,
    pub pcm_model: String,
    pub epsilon: f64,
    pub pcm_radii_file: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            method: "b3lyp".to_string(),
            basis: "lacvps_ecp".to_string(),
            levelshift_a: 0.25,
            levelshift_b: 0.25,
            maxit: 500,
            gpus: 1,
            scrdir: "./scr".to_string(),
            nbo: true,
            pcm_model: "cosmo".to_string(),
            epsilon: 80.0,
            pcm_radii_file: None,
        }
    }
}

/// `[jobscript]` 作业脚本资源请求
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobscriptConfig {
    pub time_limit: String,
    pub memory: String,
    pub queue: String,
    pub gpus: u32,
    pub smp: u32,
    pub program: String,
    pub modules: Vec<String>,
    pub partition: Option<String>,
    pub sleep_after: bool,
}

impl Default for JobscriptConfig {
    fn default() -> Self {
        JobscriptConfig {
            time_limit: "96:00:00".to_string(),
            memory: "8G".to_string(),
            queue: "gpus|gpusnew|gpusnewer".to_string(),
            gpus: 1,
            smp: 1,
            program: "terachem".to_string(),
            modules: vec![],
            partition: None,
            sleep_after: false,
        }
    }
}

impl Config {
    /// 读取配置文件；未指定路径时返回默认配置
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = match path {
            Some(p) => p,
            None => return Ok(Config::default()),
        };
        if !path.exists() {
            return Err(QmJobsError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| QmJobsError::read(path, e))?;
        let config = Self::from_toml(&content).map_err(|e| QmJobsError::ConfigError {
            path: path.display().to_string(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Config, toml::de::Error> {
        toml::from_str(content)
    }
}
