//! # qmjobs - 量子化学批处理作业管理工具
//!
//! 管理 TeraChem/ORCA 作业的整个生命周期：解析输出、判定状态、
//! 记录重提交历史、重提交出错作业、生成后续计算。
//!
//! ## 子命令
//! - `status`   - 作业状态分类
//! - `summary`  - 输出文件汇总表
//! - `followup` - 生成垂直 IP/EA、溶剂单点、热化学作业
//! - `resub`    - 重提交出错与被标记的作业
//! - `history`  - 查看/标记重提交历史
//! - `submit`   - 批量提交作业脚本
//! - `geometry` - 优化结构提取与收集
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── jobs/      (队列、历史、状态判定、后续作业)
//!   │     ├── parsers/   (输出/输入/轨迹解析)
//!   │     ├── batch/     (文件收集与并行处理)
//!   │     └── models/    (数据模型)
//!   ├── config.rs   (TOML 配置)
//!   ├── logging.rs  (诊断日志)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod config;
mod error;
mod jobs;
mod logging;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    let global = &cli.global;
    let result = logging::setup_logging(global.verbose, global.quiet, global.log_file.as_deref())
        .and_then(|()| commands::Context::from_args(global))
        .and_then(|ctx| commands::run(cli.command, &ctx));

    if let Err(e) = result {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
