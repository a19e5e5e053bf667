//! # 批量处理模块
//!
//! 提供作业目录树的文件收集与并行处理能力。
//!
//! ## 功能
//! - 递归收集输出文件
//! - 并行处理（解析、生成后续作业）
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `jobs/` 与 `commands/` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchResult, BatchRunner, ProcessResult};
