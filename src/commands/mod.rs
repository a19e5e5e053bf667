//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `config.rs`, `jobs/`, `parsers/`, `utils/`
//! - 子模块: status, summary, followup, resub, history, submit, geometry

pub mod followup;
pub mod geometry;
pub mod history;
pub mod resub;
pub mod status;
pub mod submit;
pub mod summary;

use crate::batch::BatchRunner;
use crate::cli::{Commands, GlobalArgs};
use crate::config::Config;
use crate::error::Result;
use crate::jobs::CommandQueue;

use std::time::Duration;

/// 命令执行上下文：合并后的配置与并行度
pub struct Context {
    pub config: Config,
    pub jobs: usize,
}

impl Context {
    /// 读取配置文件并应用命令行覆盖
    pub fn from_args(global: &GlobalArgs) -> Result<Self> {
        let mut config = Config::load(global.config.as_deref())?;
        if let Some(scheduler) = global.scheduler {
            config.queue.scheduler = scheduler;
        }
        if let Some(max_resub) = global.max_resub {
            config.classify.max_resub = max_resub;
        }
        Ok(Context {
            config,
            jobs: global.jobs,
        })
    }

    pub fn queue(&self) -> CommandQueue {
        CommandQueue::new(self.config.queue.clone())
    }

    pub fn runner(&self) -> Result<BatchRunner> {
        BatchRunner::new(self.jobs)
    }

    /// 两次提交之间的等待时间
    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.config.queue.submit_delay_ms())
    }
}

/// 执行命令
pub fn run(cmd: Commands, ctx: &Context) -> Result<()> {
    match cmd {
        Commands::Status(args) => status::execute(args, ctx),
        Commands::Summary(args) => summary::execute(args, ctx),
        Commands::Followup(args) => followup::execute(args, ctx),
        Commands::Resub(args) => resub::execute(args, ctx),
        Commands::History(args) => history::execute(args),
        Commands::Submit(args) => submit::execute(args, ctx),
        Commands::Geometry(args) => geometry::execute(args, ctx),
    }
}
