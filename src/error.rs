//! # 统一错误处理模块
//!
//! 定义 qmjobs 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// qmjobs 统一错误类型
#[derive(Error, Debug)]
pub enum QmJobsError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Output file type not recognized (neither TeraChem nor ORCA): {path}")]
    UnrecognizedOutput { path: String },

    #[error("Missing field '{field}' in {path}")]
    MissingField { field: String, path: String },

    // ─────────────────────────────────────────────────────────────
    // 作业状态错误
    // ─────────────────────────────────────────────────────────────
    #[error("Calculation does not appear to be complete: {path}")]
    NotFinished { path: String },

    #[error("History for {path} is locked by another pass")]
    HistoryLocked { path: String },

    #[error("History file is corrupt: {path}\nReason: {source}")]
    HistoryCorrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command '{command}' not found in PATH")]
    CommandNotFound { command: String },

    #[error("External command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    // ─────────────────────────────────────────────────────────────
    // 参数与配置错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid config file: {path}\nReason: {source}")]
    ConfigError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 序列化错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, QmJobsError>;

impl QmJobsError {
    /// 构造读取错误
    pub fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        QmJobsError::FileReadError {
            path: path.display().to_string(),
            source,
        }
    }

    /// 构造写入错误
    pub fn write(path: &std::path::Path, source: std::io::Error) -> Self {
        QmJobsError::FileWriteError {
            path: path.display().to_string(),
            source,
        }
    }
}
