//! # 诊断日志
//!
//! 基于 `tracing-subscriber` 的日志初始化。终端上的状态提示仍由
//! `utils/output.rs` 负责，这里只输出诊断信息（队列查询、历史文件锁等）。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用

use crate::error::{QmJobsError, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

/// 由 `-v` 次数与 `-q` 推导日志级别
pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::OFF;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// 初始化全局日志；可选追加不带颜色的文件输出
pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(level_for(verbosity, quiet))
        .with(stderr_layer);

    if let Some(path) = log_file {
        let file = File::create(path).map_err(|e| QmJobsError::write(path, e))?;
        let file_layer = fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_thread_ids(true)
            .with_target(true);
        subscriber.with(file_layer).init();
    } else {
        subscriber.init();
    }

    Ok(())
}
