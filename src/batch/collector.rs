//! # 输出文件收集器
//!
//! 在作业目录树中查找计算输出文件。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - glob 模式匹配（逗号分隔多模式）
//! - 递归目录搜索
//! - 排除队列侧日志（如 `nohup.out`）
//!
//! ## 依赖关系
//! - 被 `jobs/resolver.rs`, `commands/` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{QmJobsError, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
    /// 匹配模式列表
    patterns: Vec<Pattern>,
    /// 排除的文件名
    excluded: Vec<String>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: vec![],
            excluded: vec![],
            recursive: true,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                Pattern::new(s).map_err(|e| {
                    QmJobsError::InvalidArgument(format!("Invalid pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self)
    }

    /// 设置排除的文件名
    pub fn excluding(mut self, names: &[String]) -> Self {
        self.excluded = names.to_vec();
        self
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件（按路径排序）
    pub fn collect(&self) -> Vec<PathBuf> {
        if self.input.is_file() {
            return vec![self.input.clone()];
        }

        if !self.input.is_dir() {
            return vec![];
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.accepts(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    }

    /// 检查文件是否匹配任一模式且不在排除列表中
    fn accepts(&self, path: &Path) -> bool {
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };

        if self.excluded.iter().any(|ex| filename.contains(ex.as_str())) {
            return false;
        }

        self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_collect_outputs_excluding_nohup() {
        let dir = tempfile::tempdir().unwrap();
        let job = dir.path().join("job_a");
        fs::create_dir_all(job.join("scr")).unwrap();
        fs::write(job.join("job_a.out"), "").unwrap();
        fs::write(job.join("job_a.in"), "").unwrap();
        fs::write(job.join("nohup.out"), "").unwrap();
        fs::write(dir.path().join("top.out"), "").unwrap();

        let files = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.out")
            .unwrap()
            .excluding(&["nohup.out".to_string()])
            .collect();

        assert_eq!(files, vec![job.join("job_a.out"), dir.path().join("top.out")]);
    }

    #[test]
    fn test_non_recursive() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("deep.out"), "").unwrap();
        fs::write(dir.path().join("top.out"), "").unwrap();

        let files = FileCollector::new(dir.path().to_path_buf())
            .with_pattern("*.out")
            .unwrap()
            .recursive(false)
            .collect();
        assert_eq!(files, vec![dir.path().join("top.out")]);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(FileCollector::new(PathBuf::from(".")).with_pattern("[").is_err());
    }
}
