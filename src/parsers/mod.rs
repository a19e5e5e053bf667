//! # 解析器模块
//!
//! 提供计算输出、输入文件与优化轨迹的解析器。
//!
//! ## 依赖关系
//! - 被 `jobs/` 与 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: textgrab, calc_out, infile, trajectory

pub mod calc_out;
pub mod infile;
pub mod textgrab;
pub mod trajectory;

pub use calc_out::{parse_output_file, SCF_ITERATION_LIMIT};
pub use textgrab::TextFile;
