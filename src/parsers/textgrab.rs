//! # 关键字定位取词工具
//!
//! 输出文件的统一抽取协议：找到包含关键字的行，按空白切分，
//! 取固定下标的 token；可限定第一行/最后一行，或取所有匹配中的最小值。
//!
//! ## 依赖关系
//! - 被 `parsers/calc_out.rs`, `parsers/infile.rs`, `jobs/queue.rs` 使用

use crate::error::{QmJobsError, Result};
use std::fs;
use std::path::Path;

/// 选择哪一条匹配行
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    First,
    Last,
}

/// 按行存放的文本文件
#[derive(Debug, Clone, Default)]
pub struct TextFile {
    lines: Vec<String>,
}

impl TextFile {
    pub fn new(content: &str) -> Self {
        TextFile {
            lines: content.lines().map(|l| l.to_string()).collect(),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| QmJobsError::read(path, e))?;
        Ok(Self::new(&content))
    }

    /// 包含关键字（子串匹配）的所有行
    pub fn lines_with(&self, keyword: &str) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|l| l.contains(keyword))
            .map(|l| l.as_str())
            .collect()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.lines.iter().any(|l| l.contains(keyword))
    }

    /// 取第一条/最后一条匹配行的第 `index` 个 token
    pub fn grab(&self, keyword: &str, index: usize, pick: Pick) -> Option<&str> {
        self.grab_line(keyword, pick)
            .and_then(|tokens| tokens.get(index).copied())
    }

    /// 取第一条/最后一条匹配行的全部 token
    pub fn grab_line(&self, keyword: &str, pick: Pick) -> Option<Vec<&str>> {
        let line = match pick {
            Pick::First => self.lines_with(keyword).first().copied(),
            Pick::Last => self.lines_with(keyword).last().copied(),
        }?;
        Some(line.split_whitespace().collect())
    }

    /// 所有匹配行的第 `index` 个 token
    pub fn grab_all(&self, keyword: &str, index: usize) -> Vec<&str> {
        self.lines_with(keyword)
            .into_iter()
            .filter_map(|l| l.split_whitespace().nth(index))
            .collect()
    }

    /// 所有匹配行中可解析为数值的最小值
    pub fn grab_min(&self, keyword: &str, index: usize) -> Option<f64> {
        self.grab_all(keyword, index)
            .into_iter()
            .filter_map(|t| t.parse::<f64>().ok())
            .fold(None, |acc: Option<f64>, v| match acc {
                Some(m) if m <= v => Some(m),
                _ => Some(v),
            })
    }
}
