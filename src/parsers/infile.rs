//! # TeraChem 输入文件读取
//!
//! 从 `<name>.in` 中读取电荷、自旋多重度、溶剂开关与计算类型。
//!
//! ## 依赖关系
//! - 被 `jobs/followup.rs`, `commands/summary.rs` 使用
//! - 使用 `parsers/textgrab.rs`

use super::textgrab::{Pick, TextFile};
use crate::error::Result;
use crate::models::RunType;
use std::path::{Path, PathBuf};

/// 输入文件中的关键参数
#[derive(Debug, Clone, PartialEq)]
pub struct InputParams {
    pub charge: Option<i32>,
    pub spin_multiplicity: Option<u32>,
    pub solvent: bool,
    pub run_type: Option<RunType>,
}

/// 输出文件对应的输入文件路径
pub fn input_path_for(outfile: &Path) -> PathBuf {
    outfile.with_extension("in")
}

/// 读取输出文件旁的输入文件
pub fn read_input_for(outfile: &Path) -> Result<InputParams> {
    let text = TextFile::from_path(&input_path_for(outfile))?;
    Ok(parse_input(&text))
}

pub fn parse_input(text: &TextFile) -> InputParams {
    // 关键字带尾随空格，避免 "charge" 匹配到其他关键字
    InputParams {
        charge: text
            .grab("charge ", 1, Pick::Last)
            .and_then(|t| t.parse().ok()),
        spin_multiplicity: text
            .grab("spinmult ", 1, Pick::Last)
            .and_then(|t| t.parse().ok()),
        solvent: text.grab("pcm ", 0, Pick::Last).is_some(),
        run_type: text.grab("run ", 1, Pick::Last).map(RunType::parse),
    }
}
