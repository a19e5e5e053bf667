//! # 重提交历史数据模型
//!
//! 每个作业一个 `ResubHistory`，以 sidecar 文件形式持久化。
//!
//! ## 依赖关系
//! - 被 `jobs/history.rs`, `jobs/resolver.rs`, `jobs/resub.rs` 使用

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 历史日志条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryNote {
    pub at: DateTime<Utc>,
    pub message: String,
}

/// 作业重提交历史
///
/// `resub_number` 只增不减，`notes` 只追加。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResubHistory {
    resub_number: u32,
    needs_resub: bool,
    notes: Vec<HistoryNote>,
}

impl ResubHistory {
    pub fn resub_number(&self) -> u32 {
        self.resub_number
    }

    pub fn needs_resub(&self) -> bool {
        self.needs_resub
    }

    pub fn notes(&self) -> &[HistoryNote] {
        &self.notes
    }

    /// 已用尽重提交预算
    pub fn is_chronic(&self, max_resub: u32) -> bool {
        self.resub_number as i64 > max_resub as i64 - 1
    }

    /// 记录一次重提交：计数加一，清除待重提交标记
    pub fn record_resubmission(&mut self, message: impl Into<String>) {
        self.resub_number += 1;
        self.needs_resub = false;
        self.push_note(message);
    }

    /// 标记为需要重提交
    pub fn flag_for_resub(&mut self, message: impl Into<String>) {
        self.needs_resub = true;
        self.push_note(message);
    }

    pub fn push_note(&mut self, message: impl Into<String>) {
        self.notes.push(HistoryNote {
            at: Utc::now(),
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_history() {
        let h = ResubHistory::default();
        assert_eq!(h.resub_number(), 0);
        assert!(!h.needs_resub());
        assert!(h.notes().is_empty());
    }

    #[test]
    fn test_chronic_threshold() {
        let mut h = ResubHistory::default();
        for _ in 0..4 {
            h.record_resubmission("retry");
        }
        assert!(!h.is_chronic(5));
        h.record_resubmission("retry");
        assert_eq!(h.resub_number(), 5);
        assert!(h.is_chronic(5));
        assert!(ResubHistory::default().is_chronic(0));
    }

    #[test]
    fn test_resubmission_clears_flag_and_logs() {
        let mut h = ResubHistory::default();
        h.flag_for_resub("spin contaminated");
        assert!(h.needs_resub());
        h.record_resubmission("resubmitted");
        assert!(!h.needs_resub());
        assert_eq!(h.resub_number(), 1);
        let messages: Vec<_> = h.notes().iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["spin contaminated", "resubmitted"]);
    }
}
