//! # 工具函数模块
//!
//! 提供美化输出、进度条、输入文件与作业脚本生成等工具。
//!
//! ## 依赖关系
//! - 被 `commands/` 与 `jobs/` 模块使用
//! - 子模块: output, progress, scripts

pub mod output;
pub mod progress;
pub mod scripts;
