//! # 优化轨迹 (optim.xyz) 处理
//!
//! 从多帧 xyz 轨迹中截取最后一帧作为优化后的结构。
//!
//! ## 依赖关系
//! - 被 `jobs/followup.rs`, `commands/geometry.rs` 使用
//! - 使用 `utils/output.rs` 输出警告

use crate::error::{QmJobsError, Result};
use crate::utils::output;
use std::fs;
use std::path::{Path, PathBuf};

/// 帧分隔行中的标记 token
pub const FRAME_MARKER: &str = "frame";

/// 截取出的单帧文件名
pub const OPTIMIZED_NAME: &str = "optimized.xyz";

/// 返回最后一帧（原子数行 + 注释行 + 坐标行），保留原始换行
///
/// 从文件末尾向前查找第一个包含标记 token 的行；找不到时返回整个文件。
pub fn last_frame(content: &str) -> Vec<&str> {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    if lines.is_empty() {
        return lines;
    }

    let marker = lines
        .iter()
        .rposition(|l| l.split_whitespace().any(|t| t == FRAME_MARKER))
        .unwrap_or(0);
    let start = marker.saturating_sub(1);
    lines[start..].to_vec()
}

/// 提取最后一帧并写入同目录下的 `optimized.xyz`
///
/// 空轨迹会写出空文件并给出警告。
pub fn extract_optimized_geometry(trajectory: &Path) -> Result<PathBuf> {
    let content = fs::read_to_string(trajectory).map_err(|e| QmJobsError::read(trajectory, e))?;

    let frame = last_frame(&content);
    if frame.is_empty() {
        output::print_warning(&format!("optim.xyz is empty for: {}", trajectory.display()));
    }

    let target = trajectory
        .parent()
        .map(|p| p.join(OPTIMIZED_NAME))
        .unwrap_or_else(|| PathBuf::from(OPTIMIZED_NAME));
    fs::write(&target, frame.concat()).map_err(|e| QmJobsError::write(&target, e))?;

    tracing::debug!(
        source = %trajectory.display(),
        lines = frame.len(),
        "extracted optimized geometry"
    );
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_FRAMES: &str = "\
2
frame 0 energy -1.0
H 0.0 0.0 0.0
H 0.0 0.0 0.9
2
frame 1 energy -1.1
H 0.0 0.0 0.0
H 0.0 0.0 0.8
2
frame 2 energy -1.2
H 0.0 0.0 0.0
H 0.0 0.0 0.74
";

    #[test]
    fn test_last_frame_of_three() {
        let frame = last_frame(THREE_FRAMES).concat();
        assert_eq!(
            frame,
            "2\nframe 2 energy -1.2\nH 0.0 0.0 0.0\nH 0.0 0.0 0.74\n"
        );
        assert!(THREE_FRAMES.ends_with(&frame));
    }

    #[test]
    fn test_marker_must_be_a_whole_token() {
        let content = "1\nframes are not markers\nX 0 0 0\n";
        assert_eq!(last_frame(content).concat(), content);
    }

    #[test]
    fn test_extract_writes_sibling_file() {
        let dir = tempfile::tempdir().unwrap();
        let optim = dir.path().join("optim.xyz");
        fs::write(&optim, THREE_FRAMES).unwrap();

        let target = extract_optimized_geometry(&optim).unwrap();
        assert_eq!(target, dir.path().join(OPTIMIZED_NAME));
        let written = fs::read_to_string(&target).unwrap();
        assert_eq!(written.lines().count(), 4);
        assert!(written.starts_with("2\nframe 2"));
    }

    #[test]
    fn test_empty_trajectory_gives_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let optim = dir.path().join("optim.xyz");
        fs::write(&optim, "").unwrap();

        let target = extract_optimized_geometry(&optim).unwrap();
        assert_eq!(fs::read_to_string(target).unwrap(), "");
    }
}
