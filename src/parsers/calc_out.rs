//! # TeraChem / ORCA 输出解析器
//!
//! 解析量子化学计算输出文件 (.out)，提取能量、自旋、耗时与完成状态。
//!
//! ## 依赖关系
//! - 被 `jobs/resolver.rs`, `jobs/followup.rs`, `commands/summary.rs` 使用
//! - 使用 `parsers/textgrab.rs`, `models/calculation.rs`

use super::textgrab::{Pick, TextFile};
use crate::error::{QmJobsError, Result};
use crate::models::{CalculationResult, ProgramKind, Value};
use std::path::Path;

/// 默认 SCF 迭代上限，超过即判为发散
pub const SCF_ITERATION_LIMIT: u64 = 5000;

/// 解析输出文件
pub fn parse_output_file(path: &Path, scf_limit: u64) -> Result<CalculationResult> {
    let text = TextFile::from_path(path)?;
    parse_output(&text, scf_limit).ok_or_else(|| QmJobsError::UnrecognizedOutput {
        path: path.display().to_string(),
    })
}

/// 解析已读入的输出；无法识别程序类型时返回 `None`
pub fn parse_output(text: &TextFile, scf_limit: u64) -> Option<CalculationResult> {
    let result = match detect_program(text)? {
        ProgramKind::TeraChem => parse_terachem(text, scf_limit),
        ProgramKind::Orca => parse_orca(text),
    };
    tracing::trace!(program = %result.program, finished = result.is_finished(), "parsed output");
    Some(result)
}

/// 根据标记识别程序，TeraChem 优先
pub fn detect_program(text: &TextFile) -> Option<ProgramKind> {
    [ProgramKind::TeraChem, ProgramKind::Orca]
        .into_iter()
        .find(|p| text.contains(p.sentinel()))
}

fn parse_terachem(text: &TextFile, scf_limit: u64) -> CalculationResult {
    let mut result = CalculationResult::new(ProgramKind::TeraChem);

    // "Startfile from command line: molecule.in"
    result.name = text
        .grab("Startfile", 4, Pick::First)
        .and_then(|t| Path::new(t).file_stem())
        .map(|s| s.to_string_lossy().to_string());

    // "Total charge:    0"
    result.charge = text.grab("charge:", 2, Pick::First).map(Value::parse);

    // "FINAL ENERGY: -1234.5678901234 a.u."
    result.final_energy = text.grab("FINAL", 2, Pick::Last).map(Value::parse);
    result.min_energy = text.grab_min("FINAL", 2);

    // "SPIN S-SQUARED: 0.7532 (exact: 0.7500)"
    result.s_squared = text.grab("S-SQUARED:", 2, Pick::Last).map(Value::parse);
    result.s_squared_ideal = text
        .grab("S-SQUARED:", 4, Pick::Last)
        .map(|t| Value::parse(t.trim_end_matches(')')));

    // "Total processing time: 123.45 sec"
    result.time = text.grab("processing", 3, Pick::Last).map(Value::parse);

    // "Job finished: Mon Jan  1 00:00:00 2018"
    if let Some(tokens) = text.grab_line("finished:", Pick::Last) {
        if tokens.len() > 2 && tokens[0] == "Job" && tokens[1] == "finished:" {
            result.finished = Some(tokens[2..].join(" "));
        }
    }

    result.scf_error = scf_divergence(text, scf_limit);
    result
}

/// 检测 ADIIS 不收敛行，迭代次数超过上限时返回该次数
fn scf_divergence(text: &TextFile, scf_limit: u64) -> Option<u64> {
    let mut diverged = None;
    for line in text.lines_with("ADIIS") {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let is_failure = ["failed", "converge", "iterations,", "ADIIS"]
            .iter()
            .all(|word| tokens.contains(word));
        if !is_failure {
            continue;
        }
        let count = tokens
            .get(5)
            .and_then(|t| t.split('+').next())
            .and_then(|t| t.parse::<u64>().ok());
        if let Some(count) = count {
            if count > scf_limit {
                diverged = Some(count);
            }
        }
    }
    diverged
}

fn parse_orca(text: &TextFile) -> CalculationResult {
    let mut result = CalculationResult::new(ProgramKind::Orca);

    // "Total Charge           Charge          ....    0"
    result.charge = text.grab("Total Charge", 4, Pick::First).map(Value::parse);

    // "FINAL SINGLE POINT ENERGY      -76.026760737428"
    result.final_energy = text
        .grab("FINAL SINGLE POINT ENERGY", 4, Pick::Last)
        .map(Value::parse);
    result.min_energy = text.grab_min("FINAL SINGLE POINT ENERGY", 4);

    // "Expectation value of <S**2>     :     0.753664"
    result.s_squared = text.grab("<S**2>", 5, Pick::Last).map(Value::parse);
    // "Ideal value S*(S+1) for S=0.5   :     0.750000"
    result.s_squared_ideal = text.grab("S*(S+1)", 6, Pick::Last).map(Value::parse);

    // "TOTAL RUN TIME: 0 days 0 hours 1 minutes 23 seconds 456 msec"
    if let Some(tokens) = text.grab_line("TOTAL RUN TIME:", Pick::Last) {
        result.time = Some(orca_run_time(&tokens));
    }

    if let Some(line) = text.lines_with("ORCA TERMINATED NORMALLY").into_iter().last() {
        result.finished = Some(line.trim().trim_matches('*').to_string());
    }

    result
}

fn orca_run_time(tokens: &[&str]) -> Value {
    const FACTORS: [(usize, f64); 5] = [
        (3, 24.0 * 60.0 * 60.0),
        (5, 60.0 * 60.0),
        (7, 60.0),
        (9, 1.0),
        (11, 0.001),
    ];
    let mut seconds = 0.0;
    for (index, factor) in FACTORS {
        match tokens.get(index).and_then(|t| t.parse::<f64>().ok()) {
            Some(v) => seconds += v * factor,
            None => return Value::Text(tokens.join(" ")),
        }
    }
    Value::Number(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERACHEM_FINISHED: &str = "\
       ***********************************************************
       *                    TeraChem v1.9                        *
       ***********************************************************
Startfile from command line: fe_oct_2.in
Total charge:    2
FINAL ENERGY: -1500.1000000000 a.u.
SPIN S-SQUARED: 2.5000 (exact: 0.7500)
FINAL ENERGY: -1500.3000000000 a.u.
FINAL ENERGY: -1500.2000000000 a.u.
SPIN S-SQUARED: 2.5100 (exact: 0.7500)
Total processing time: 3600.25 sec
Job finished: Mon Jan  1 00:00:00 2018
";

    fn parse(content: &str) -> Option<CalculationResult> {
        parse_output(&TextFile::new(content), SCF_ITERATION_LIMIT)
    }

    #[test]
    fn test_parse_terachem_finished() {
        let r = parse(TERACHEM_FINISHED).unwrap();
        assert_eq!(r.program, ProgramKind::TeraChem);
        assert_eq!(r.name.as_deref(), Some("fe_oct_2"));
        assert_eq!(r.charge, Some(Value::Number(2.0)));
        assert_eq!(r.final_energy, Some(Value::Number(-1500.2)));
        assert_eq!(r.min_energy, Some(-1500.3));
        assert_eq!(r.s_squared, Some(Value::Number(2.51)));
        assert_eq!(r.s_squared_ideal, Some(Value::Number(0.75)));
        assert_eq!(r.time, Some(Value::Number(3600.25)));
        assert_eq!(r.finished.as_deref(), Some("Mon Jan 1 00:00:00 2018"));
        assert_eq!(r.scf_error, None);
    }

    #[test]
    fn test_parse_terachem_running_job() {
        let content = "TeraChem v1.9\nStartfile from command line: mol.in\nTotal charge:    0\n";
        let r = parse(content).unwrap();
        assert!(!r.is_finished());
        assert_eq!(r.final_energy, None);
        assert_eq!(r.s_squared_ideal, None);
    }

    #[test]
    fn test_unparsable_numbers_are_kept_raw() {
        let content = "TeraChem\nFINAL ENERGY: ******** a.u.\n";
        let r = parse(content).unwrap();
        assert_eq!(r.final_energy, Some(Value::Text("********".to_string())));
        assert_eq!(r.min_energy, None);
    }

    #[test]
    fn test_scf_divergence() {
        let diverged = "TeraChem\nSCF failed to converge in 5500+ iterations, ADIIS\n";
        assert_eq!(parse(diverged).unwrap().scf_error, Some(5500));

        let under_limit = "TeraChem\nSCF failed to converge in 5000+ iterations, ADIIS\n";
        assert_eq!(parse(under_limit).unwrap().scf_error, None);

        let other_minimizer = "TeraChem\nSCF failed to converge in 9000+ iterations, DIIS+ADIIS\n";
        assert_eq!(parse(other_minimizer).unwrap().scf_error, None);
    }

    #[test]
    fn test_parse_orca() {
        let content = "\
                                 O   R   C   A   (ORCA 5.0)
Total Charge           Charge          ....   -1
FINAL SINGLE POINT ENERGY       -76.026760737428
FINAL SINGLE POINT ENERGY       -76.100000000000
Expectation value of <S**2>     :     0.753664
Ideal value S*(S+1) for S=0.5   :     0.750000
                             ****ORCA TERMINATED NORMALLY****
TOTAL RUN TIME: 0 days 1 hours 2 minutes 3 seconds 500 msec
";
        let r = parse(content).unwrap();
        assert_eq!(r.program, ProgramKind::Orca);
        assert_eq!(r.charge, Some(Value::Number(-1.0)));
        assert_eq!(r.final_energy, Some(Value::Number(-76.1)));
        assert_eq!(r.s_squared_ideal, Some(Value::Number(0.75)));
        let seconds = r.time.as_ref().and_then(Value::as_f64).unwrap();
        assert!((seconds - 3723.5).abs() < 1e-9);
        assert!(r.is_finished());
    }

    #[test]
    fn test_unrecognized_output_is_fatal() {
        assert!(parse("Gaussian 16\nSCF Done\n").is_none());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mystery.out");
        std::fs::write(&path, "nothing to see\n").unwrap();
        let err = parse_output_file(&path, SCF_ITERATION_LIMIT).unwrap_err();
        assert!(matches!(err, QmJobsError::UnrecognizedOutput { .. }));
    }
}
