//! # 计算结果数据模型
//!
//! 存储 TeraChem/ORCA 输出文件中提取的信息。
//!
//! ## 依赖关系
//! - 被 `parsers/calc_out.rs` 使用
//! - 被 `jobs/`, `commands/summary.rs` 使用

use serde::{Deserialize, Serialize};

/// 量子化学程序类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgramKind {
    TeraChem,
    Orca,
}

impl ProgramKind {
    /// 输出文件中用于识别程序的标记
    pub fn sentinel(&self) -> &'static str {
        match self {
            ProgramKind::TeraChem => "TeraChem",
            ProgramKind::Orca => "ORCA",
        }
    }
}

impl std::fmt::Display for ProgramKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramKind::TeraChem => write!(f, "TeraChem"),
            ProgramKind::Orca => write!(f, "ORCA"),
        }
    }
}

/// 宽松解析的数值字段
///
/// 无法转换为浮点数的 token 保留原文，而不是报错。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    /// 尝试按浮点数解析，失败则保留原文
    pub fn parse(token: &str) -> Self {
        match token.trim().parse::<f64>() {
            Ok(v) => Value::Number(v),
            Err(_) => Value::Text(token.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Text(_) => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// 单个计算输出的解析结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResult {
    /// 产生输出的程序
    pub program: ProgramKind,

    /// 作业名（Startfile 的文件名主干）
    pub name: Option<String>,

    /// 总电荷
    pub charge: Option<Value>,

    /// 最终能量 (Hartree)，取最后一次出现
    pub final_energy: Option<Value>,

    /// 出现过的最低能量
    pub min_energy: Option<f64>,

    /// <S^2> 期望值
    pub s_squared: Option<Value>,

    /// 当前自旋多重度对应的理想 S(S+1)
    pub s_squared_ideal: Option<Value>,

    /// 墙钟时间 (秒)
    pub time: Option<Value>,

    /// 完成标记（"Job finished:" 之后的文本）
    pub finished: Option<String>,

    /// SCF 不收敛时的迭代次数
    pub scf_error: Option<u64>,
}

impl CalculationResult {
    pub fn new(program: ProgramKind) -> Self {
        CalculationResult {
            program,
            name: None,
            charge: None,
            final_energy: None,
            min_energy: None,
            s_squared: None,
            s_squared_ideal: None,
            time: None,
            finished: None,
            scf_error: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    /// 自旋污染判定
    ///
    /// 只有在 `s_squared_ideal` 为数值时才检查；解析失败的理想值永远不会被标记。
    pub fn is_spin_contaminated(&self, tolerance: f64) -> bool {
        if !self.is_finished() {
            return false;
        }
        let ideal = match self.s_squared_ideal.as_ref().and_then(Value::as_f64) {
            Some(v) => v,
            None => return false,
        };
        match self.s_squared.as_ref().and_then(Value::as_f64) {
            Some(s2) => (s2 - ideal).abs() > tolerance,
            None => false,
        }
    }

    /// 由理想 S(S+1) 反推总自旋 S
    pub fn total_spin(&self) -> f64 {
        match self.s_squared_ideal.as_ref().and_then(Value::as_f64) {
            Some(ideal) => ((1.0 + 4.0 * ideal).sqrt() - 1.0) / 2.0,
            None => 0.0,
        }
    }

    /// 自旋多重度 2S+1（至少为 1）
    pub fn spin_multiplicity(&self) -> u32 {
        (2.0 * self.total_spin() + 1.0).round().max(1.0) as u32
    }

    /// 整数电荷（若可解析）
    pub fn integer_charge(&self) -> Option<i32> {
        self.charge
            .as_ref()
            .and_then(Value::as_f64)
            .map(|c| c.round() as i32)
    }
}
