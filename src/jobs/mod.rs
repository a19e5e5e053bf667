//! # 作业管理
//!
//! 队列查询、重提交历史、状态判定、重提交与后续作业生成。
//!
//! ## 子模块
//! - `queue`: 队列客户端与活动作业快照
//! - `history`: sidecar 历史文件的读写
//! - `resolver`: 作业状态判定
//! - `resub`: 重提交
//! - `followup`: 垂直 IP/EA、溶剂单点、热化学作业生成
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `parsers/`, `models/`, `batch/`, `config.rs`

pub mod followup;
pub mod history;
pub mod queue;
pub mod resolver;
pub mod resub;

pub use followup::{FollowUpGenerator, FollowUpOutcome};
pub use queue::CommandQueue;
pub use resolver::{check_completeness, Classification};
pub use resub::ResubAction;
