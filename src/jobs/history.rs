//! # 重提交历史存储
//!
//! 每个作业的 `ResubHistory` 存放在输出文件旁的 sidecar 文件
//! (`<name>.history`，JSON) 中。
//!
//! ## 并发
//! - 写入先落到同目录临时文件，再原子重命名覆盖，读者不会看到半写的记录
//! - 读-改-写由 `<name>.history.lock` 锁文件保护（create-new 语义，释放时删除）
//!
//! ## 依赖关系
//! - 被 `jobs/resolver.rs`, `jobs/resub.rs`, `commands/history.rs` 使用
//! - 使用 `serde_json`, `tempfile`

use crate::error::{QmJobsError, Result};
use crate::models::ResubHistory;

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tempfile::NamedTempFile;

/// sidecar 文件扩展名
pub const HISTORY_EXTENSION: &str = "history";

const LOCK_ATTEMPTS: u32 = 50;
const LOCK_RETRY: Duration = Duration::from_millis(100);

/// 输出文件对应的历史文件路径
pub fn history_path(outfile: &Path) -> PathBuf {
    outfile.with_extension(HISTORY_EXTENSION)
}

fn lock_path(outfile: &Path) -> PathBuf {
    outfile.with_extension(format!("{}.lock", HISTORY_EXTENSION))
}

/// 读取历史；文件不存在时返回默认值（零次重提交）
pub fn load(outfile: &Path) -> Result<ResubHistory> {
    let path = history_path(outfile);
    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ResubHistory::default()),
        Err(e) => return Err(QmJobsError::read(&path, e)),
    };
    serde_json::from_str(&content).map_err(|e| QmJobsError::HistoryCorrupt {
        path: path.display().to_string(),
        source: e,
    })
}

/// 原子写入历史
pub fn save(outfile: &Path, history: &ResubHistory) -> Result<()> {
    let path = history_path(outfile);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let content = serde_json::to_string_pretty(history)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| QmJobsError::write(&path, e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| QmJobsError::write(&path, e))?;
    tmp.persist(&path)
        .map_err(|e| QmJobsError::write(&path, e.error))?;

    tracing::debug!(
        path = %path.display(),
        resub_number = history.resub_number(),
        needs_resub = history.needs_resub(),
        "history saved"
    );
    Ok(())
}

/// 在锁保护下读-改-写历史，返回闭包的结果
pub fn update<T, F>(outfile: &Path, f: F) -> Result<T>
where
    F: FnOnce(&mut ResubHistory) -> T,
{
    let _lock = HistoryLock::acquire(outfile)?;
    let mut history = load(outfile)?;
    let value = f(&mut history);
    save(outfile, &history)?;
    Ok(value)
}

/// 历史文件锁，drop 时释放
struct HistoryLock {
    path: PathBuf,
}

impl HistoryLock {
    fn acquire(outfile: &Path) -> Result<Self> {
        let path = lock_path(outfile);
        for attempt in 0..LOCK_ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(HistoryLock { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::trace!(path = %path.display(), attempt, "history lock busy");
                    thread::sleep(LOCK_RETRY);
                }
                Err(e) => return Err(QmJobsError::write(&path, e)),
            }
        }
        Err(QmJobsError::HistoryLocked {
            path: outfile.display().to_string(),
        })
    }
}

impl Drop for HistoryLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), "failed to release history lock: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_absent_history_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let history = load(&dir.path().join("job.out")).unwrap();
        assert_eq!(history, ResubHistory::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let outfile = dir.path().join("job.out");

        let mut history = ResubHistory::default();
        history.record_resubmission("first retry");
        history.flag_for_resub("spin contaminated");
        save(&outfile, &history).unwrap();

        assert!(dir.path().join("job.history").exists());
        assert_eq!(load(&outfile).unwrap(), history);
    }

    #[test]
    fn test_update_releases_lock() {
        let dir = tempfile::tempdir().unwrap();
        let outfile = dir.path().join("job.out");

        let n = update(&outfile, |h| {
            h.record_resubmission("retry");
            h.resub_number()
        })
        .unwrap();
        assert_eq!(n, 1);
        assert!(!lock_path(&outfile).exists());
        assert_eq!(load(&outfile).unwrap().resub_number(), 1);
    }

    #[test]
    fn test_concurrent_updates_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let outfile = Arc::new(dir.path().join("job.out"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let outfile = Arc::clone(&outfile);
                thread::spawn(move || {
                    update(&outfile, |h| h.record_resubmission("retry")).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let history = load(&outfile).unwrap();
        assert_eq!(history.resub_number(), 8);
        assert_eq!(history.notes().len(), 8);
    }

    #[test]
    fn test_corrupt_history_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let outfile = dir.path().join("job.out");
        fs::write(history_path(&outfile), "not json").unwrap();
        assert!(matches!(
            load(&outfile),
            Err(QmJobsError::HistoryCorrupt { .. })
        ));
    }
}
