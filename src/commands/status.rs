//! # status 命令实现
//!
//! 对目录树下的所有作业进行状态分类。
//!
//! ## 功能
//! - 并行解析输出文件，查询一次队列
//! - 打印各类别计数表与作业列表
//! - `--json` 输出类别到路径的映射
//!
//! ## 依赖关系
//! - 使用 `cli/status.rs` 定义的参数
//! - 使用 `jobs/resolver.rs`, `utils/output.rs`

use super::Context;
use crate::cli::status::StatusArgs;
use crate::error::Result;
use crate::jobs::{self, Classification};
use crate::models::JobStatus;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 计数表行
#[derive(Debug, Clone, Tabled)]
struct CountRow {
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Jobs")]
    count: usize,
}

fn count_rows(classification: &Classification) -> Vec<CountRow> {
    JobStatus::ALL
        .iter()
        .map(|s| CountRow {
            status: s.label(),
            count: classification.count(*s),
        })
        .collect()
}

/// 执行 status 命令
pub fn execute(args: StatusArgs, ctx: &Context) -> Result<()> {
    let queue = ctx.queue();
    let runner = if args.json {
        ctx.runner()?.quiet()
    } else {
        output::print_header("Job Status");
        ctx.runner()?
    };

    let report = jobs::check_completeness(&args.dir, &queue, &ctx.config.classify, &runner)?;
    let classification = &report.classification;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&classification.by_label())?);
        return Ok(());
    }

    if classification.is_empty() {
        output::print_warning("No job outputs found.");
        return Ok(());
    }
    if report.snapshot.was_queried() {
        output::print_info(&format!("{} active jobs in queue", report.snapshot.len()));
    } else {
        output::print_warning("Active jobs could not be queried; no job is reported as Active.");
    }

    if !args.counts_only {
        for status in JobStatus::ALL {
            for path in classification.get(status) {
                output::print_status(status.label(), &path.display().to_string());
            }
        }
        output::print_separator();
    }

    println!("{}", Table::new(count_rows(classification)));
    output::print_done(&format!(
        "Classified {} jobs under '{}'",
        classification.len(),
        args.dir.display()
    ));
    Ok(())
}
