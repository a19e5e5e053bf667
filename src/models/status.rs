//! # 作业状态
//!
//! 六种互斥状态，每次分类时重新推导，不持久化。
//!
//! ## 依赖关系
//! - 被 `jobs/resolver.rs`, `commands/status.rs` 使用

use serde::Serialize;

/// 作业状态，按覆盖优先级从高到低排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum JobStatus {
    Active,
    ChronicError,
    Error,
    Resub,
    SpinContaminated,
    Finished,
}

impl JobStatus {
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Active,
        JobStatus::ChronicError,
        JobStatus::Error,
        JobStatus::Resub,
        JobStatus::SpinContaminated,
        JobStatus::Finished,
    ];

    /// 类别名
    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Active => "Active",
            JobStatus::ChronicError => "Chronic_error",
            JobStatus::Error => "Error",
            JobStatus::Resub => "Resub",
            JobStatus::SpinContaminated => "Spin_contaminated",
            JobStatus::Finished => "Finished",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
