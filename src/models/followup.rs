//! # 后续计算作业模型
//!
//! 由已完成作业派生出的新作业描述。
//!
//! ## 依赖关系
//! - 被 `jobs/followup.rs`, `utils/scripts.rs` 使用

use std::path::PathBuf;

/// 后续计算类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowUpKind {
    VerticalIp,
    VerticalEa,
    SolventSp,
    Thermo,
}

impl FollowUpKind {
    pub const ALL: [FollowUpKind; 4] = [
        FollowUpKind::VerticalIp,
        FollowUpKind::VerticalEa,
        FollowUpKind::SolventSp,
        FollowUpKind::Thermo,
    ];

    /// 新目录名后缀
    pub fn suffix(&self) -> &'static str {
        match self {
            FollowUpKind::VerticalIp => "vertIP",
            FollowUpKind::VerticalEa => "vertEA",
            FollowUpKind::SolventSp => "solventSP",
            FollowUpKind::Thermo => "thermo",
        }
    }

    /// 相对母体的电荷变化
    pub fn charge_shift(&self) -> i32 {
        match self {
            FollowUpKind::VerticalIp => 1,
            FollowUpKind::VerticalEa => -1,
            FollowUpKind::SolventSp | FollowUpKind::Thermo => 0,
        }
    }
}

impl std::fmt::Display for FollowUpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FollowUpKind::VerticalIp => write!(f, "vertical IP"),
            FollowUpKind::VerticalEa => write!(f, "vertical EA"),
            FollowUpKind::SolventSp => write!(f, "solvent single point"),
            FollowUpKind::Thermo => write!(f, "thermochemistry"),
        }
    }
}

/// 计算类型（TeraChem `run` 关键字）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunType {
    Energy,
    Frequencies,
    Minimize,
    Ts,
    Other(String),
}

impl RunType {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "energy" => RunType::Energy,
            "frequencies" => RunType::Frequencies,
            "minimize" => RunType::Minimize,
            "ts" => RunType::Ts,
            other => RunType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunType::Energy => "energy",
            RunType::Frequencies => "frequencies",
            RunType::Minimize => "minimize",
            RunType::Ts => "ts",
            RunType::Other(s) => s,
        }
    }
}

/// 待生成的后续作业
#[derive(Debug, Clone, PartialEq)]
pub struct FollowUpJob {
    pub kind: FollowUpKind,
    pub name: String,
    pub charge: i32,
    pub spin_multiplicity: u32,
    pub run_type: RunType,
    pub solvent: bool,
    /// 从母体 scr/ 复制的初始猜测轨道文件
    pub guess_files: Vec<PathBuf>,
}

impl FollowUpJob {
    /// 猜测文件名（写入输入文件的 `guess` 行）
    pub fn guess_names(&self) -> Vec<String> {
        self.guess_files
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
            .map(|s| s.to_string())
            .collect()
    }
}
