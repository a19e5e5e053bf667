//! # followup 子命令 CLI 定义
//!
//! 为已完成的作业生成垂直 IP/EA、溶剂单点与热化学计算。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/followup.rs`

use crate::models::FollowUpKind;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 后续计算类型选择
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum KindArg {
    /// Vertical ionization potential
    Ip,
    /// Vertical electron affinity
    Ea,
    /// Single point in implicit solvent
    Solvent,
    /// Frequencies for thermochemistry
    Thermo,
    /// All of the above
    All,
}

impl KindArg {
    pub fn kinds(&self) -> Vec<FollowUpKind> {
        match self {
            KindArg::Ip => vec![FollowUpKind::VerticalIp],
            KindArg::Ea => vec![FollowUpKind::VerticalEa],
            KindArg::Solvent => vec![FollowUpKind::SolventSp],
            KindArg::Thermo => vec![FollowUpKind::Thermo],
            KindArg::All => FollowUpKind::ALL.to_vec(),
        }
    }
}

/// followup 子命令参数
#[derive(Args, Debug)]
#[command(group(
    clap::ArgGroup::new("source")
        .required(true)
        .args(["outfile", "finished_in"]),
))]
pub struct FollowupArgs {
    /// Output file of a finished parent job
    pub outfile: Option<PathBuf>,

    /// Generate for every finished job under this directory
    #[arg(long)]
    pub finished_in: Option<PathBuf>,

    /// Kind of follow-up calculation
    #[arg(long, value_enum, default_value = "all")]
    pub kind: KindArg,

    /// Run vertical IP/EA jobs in implicit solvent
    #[arg(long, default_value_t = false)]
    pub solvent: bool,

    /// Submit the generated job scripts
    #[arg(long, default_value_t = false)]
    pub submit: bool,
}
