//! # 数据模型模块
//!
//! 定义计算结果、重提交历史、作业状态与后续作业的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `jobs/` 和 `commands/` 使用
//! - 子模块: calculation, history, status, followup

pub mod calculation;
pub mod followup;
pub mod history;
pub mod status;

pub use calculation::{CalculationResult, ProgramKind, Value};
pub use followup::{FollowUpJob, FollowUpKind, RunType};
pub use history::ResubHistory;
pub use status::JobStatus;
