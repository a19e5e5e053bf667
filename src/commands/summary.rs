//! # summary 命令实现
//!
//! 汇总目录树下所有输出文件的解析结果。
//!
//! ## 功能
//! - 并行解析输出文件（无法识别的文件给出警告并跳过）
//! - 读取同名 `.in` 文件的计算类型、自旋多重度与溶剂开关
//! - 终端表格显示
//! - 可选保存为 CSV
//!
//! ## 依赖关系
//! - 使用 `cli/summary.rs` 定义的参数
//! - 使用 `jobs/resolver.rs`, `parsers/calc_out.rs`, `parsers/infile.rs`, `utils/output.rs`

use super::Context;
use crate::cli::summary::SummaryArgs;
use crate::error::{QmJobsError, Result};
use crate::jobs::resolver;
use crate::models::{CalculationResult, Value};
use crate::parsers::infile::{self, InputParams};
use crate::parsers;
use crate::utils::output;

use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 汇总表行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "Job")]
    job: String,
    #[tabled(rename = "Program")]
    program: String,
    #[tabled(rename = "Run")]
    run_type: String,
    #[tabled(rename = "Mult")]
    multiplicity: String,
    #[tabled(rename = "PCM")]
    solvent: String,
    #[tabled(rename = "Charge")]
    charge: String,
    #[tabled(rename = "Final E (Eh)")]
    final_energy: String,
    #[tabled(rename = "Min E (Eh)")]
    min_energy: String,
    #[tabled(rename = "<S^2>")]
    s_squared: String,
    #[tabled(rename = "S(S+1)")]
    s_squared_ideal: String,
    #[tabled(rename = "Time (s)")]
    time: String,
    #[tabled(rename = "Finished")]
    finished: String,
    #[tabled(rename = "SCF")]
    scf_error: String,
}

impl SummaryRow {
    fn new(path: &Path, r: &CalculationResult, input: Option<&InputParams>) -> Self {
        let show = |v: &Option<Value>| v.as_ref().map(|v| v.to_string()).unwrap_or_default();
        SummaryRow {
            job: r.name.clone().unwrap_or_else(|| resolver::job_name(path)),
            program: r.program.to_string(),
            run_type: input
                .and_then(|p| p.run_type.as_ref())
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            multiplicity: input
                .and_then(|p| p.spin_multiplicity)
                .map(|m| m.to_string())
                .unwrap_or_default(),
            solvent: match input {
                Some(p) if p.solvent => "yes".to_string(),
                Some(_) => "no".to_string(),
                None => String::new(),
            },
            charge: show(&r.charge),
            final_energy: show(&r.final_energy),
            min_energy: r.min_energy.map(|e| e.to_string()).unwrap_or_default(),
            s_squared: show(&r.s_squared),
            s_squared_ideal: show(&r.s_squared_ideal),
            time: show(&r.time),
            finished: if r.is_finished() { "yes" } else { "no" }.to_string(),
            scf_error: r.scf_error.map(|n| n.to_string()).unwrap_or_default(),
        }
    }
}

/// 执行 summary 命令
pub fn execute(args: SummaryArgs, ctx: &Context) -> Result<()> {
    output::print_header("Calculation Summary");

    let classify = &ctx.config.classify;
    let outputs = resolver::find_outputs(&args.dir, classify)?;
    output::print_info(&format!("Found {} output files", outputs.len()));

    let runner = ctx.runner()?;
    // 输入文件可能不存在（例如 ORCA 作业），此时相关列留空
    let parsed = runner.map(&outputs, "Parsing outputs", |path| {
        let result = parsers::parse_output_file(path, classify.scf_iteration_limit);
        (result, infile::read_input_for(path).ok())
    });

    let mut rows = Vec::new();
    let mut paths: Vec<&PathBuf> = Vec::new();
    for (path, (result, input)) in outputs.iter().zip(parsed) {
        match result {
            Ok(r) => {
                if args.finished_only && !r.is_finished() {
                    continue;
                }
                rows.push(SummaryRow::new(path, &r, input.as_ref()));
                paths.push(path);
            }
            Err(e) => output::print_warning(&format!("Skipping {}", e)),
        }
    }

    if rows.is_empty() {
        output::print_warning("No calculation outputs to summarize.");
        return Ok(());
    }

    println!("{}", Table::new(&rows));

    if let Some(ref csv_path) = args.csv {
        save_summary_csv(&rows, &paths, csv_path)?;
        output::print_success(&format!("Summary saved to '{}'", csv_path.display()));
    }

    output::print_done(&format!("Summarized {} jobs", rows.len()));
    Ok(())
}

/// 保存汇总到 CSV
fn save_summary_csv(rows: &[SummaryRow], paths: &[&PathBuf], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "job",
        "path",
        "program",
        "run_type",
        "multiplicity",
        "solvent",
        "charge",
        "final_energy",
        "min_energy",
        "s_squared",
        "s_squared_ideal",
        "time",
        "finished",
        "scf_error",
    ])?;

    for (row, path) in rows.iter().zip(paths) {
        let path = path.display().to_string();
        let record: [&str; 14] = [
            &row.job,
            &path,
            &row.program,
            &row.run_type,
            &row.multiplicity,
            &row.solvent,
            &row.charge,
            &row.final_energy,
            &row.min_energy,
            &row.s_squared,
            &row.s_squared_ideal,
            &row.time,
            &row.finished,
            &row.scf_error,
        ];
        wtr.write_record(record)?;
    }

    wtr.flush().map_err(|e| QmJobsError::write(output_path, e))?;
    Ok(())
}
