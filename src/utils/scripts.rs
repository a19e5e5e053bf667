//! # 输入文件与作业脚本生成工具
//!
//! 生成 TeraChem 输入文件 (.in) 与 SGE / Slurm 提交脚本。
//!
//! ## 依赖关系
//! - 被 `jobs/followup.rs` 使用
//! - 使用 `config.rs` 中的 `InputConfig`, `JobscriptConfig`

use crate::config::{InputConfig, JobscriptConfig, Scheduler};
use crate::models::{FollowUpJob, RunType};

/// 作业脚本文件名
pub fn jobscript_name(job_name: &str) -> String {
    format!("{}_jobscript", job_name)
}

/// 生成 TeraChem 输入文件内容
pub fn generate_input_file(job: &FollowUpJob, config: &InputConfig) -> String {
    let method = if job.spin_multiplicity != 1 {
        format!("u{}", config.method)
    } else {
        config.method.clone()
    };

    let mut lines = vec![
        format!("levelshiftvalb {}", config.levelshift_b),
        format!("levelshiftvala {}", config.levelshift_a),
    ];
    if config.nbo {
        lines.push("nbo yes".to_string());
    }
    lines.extend([
        format!("run {}", job.run_type.as_str()),
        "scf diis+a".to_string(),
        format!("coordinates {}.xyz", job.name),
        "levelshift yes".to_string(),
        format!("gpus {}", config.gpus),
        format!("spinmult {}", job.spin_multiplicity),
        format!("scrdir {}", config.scrdir),
        format!("basis {}", config.basis),
        "timings yes".to_string(),
        format!("charge {}", job.charge),
        format!("method {}", method),
        "new_minimizer yes".to_string(),
    ]);

    let guess = job.guess_names();
    if !guess.is_empty() {
        lines.push(format!("guess {}", guess.join(" ")));
    }
    if job.run_type != RunType::Ts {
        lines.push(format!("maxit {}", config.maxit));
    }
    if job.solvent {
        lines.push(String::new());
        lines.push(format!("pcm {}", config.pcm_model));
        lines.push(format!("epsilon {}", config.epsilon));
        if let Some(ref radii) = config.pcm_radii_file {
            lines.push("pcm_radii read".to_string());
            lines.push(format!("pcm_radii_file {}", radii));
        }
    }
    lines.push("end".to_string());

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// 生成提交脚本内容
pub fn generate_jobscript(
    scheduler: Scheduler,
    job: &FollowUpJob,
    config: &JobscriptConfig,
) -> String {
    match scheduler {
        Scheduler::Sge => generate_sge_script(job, config),
        Scheduler::Slurm => generate_sbatch_script(job, config),
    }
}

/// 文件传递注释：输入、坐标、猜测轨道与 scr 目录
fn staging_lines(job: &FollowUpJob) -> String {
    let mut lines = vec![
        format!("# -fin {}.in", job.name),
        format!("# -fin {}.xyz", job.name),
        "# -fout scr/".to_string(),
    ];
    lines.extend(job.guess_names().into_iter().map(|g| format!("# -fin {}", g)));
    lines.join("\n")
}

fn module_loads(config: &JobscriptConfig) -> String {
    config
        .modules
        .iter()
        .map(|m| format!("module load {}\n", m))
        .collect()
}

fn sleep_line(config: &JobscriptConfig) -> &'static str {
    if config.sleep_after {
        "sleep 300\n"
    } else {
        ""
    }
}

fn generate_sge_script(job: &FollowUpJob, config: &JobscriptConfig) -> String {
    format!(
        r#"#$ -S /bin/bash
#$ -N {name}
#$ -cwd
#$ -R y
#$ -l h_rt={time}
#$ -l h_rss={mem}
#$ -q {queue}
#$ -l gpus={gpus}
#$ -pe smp {smp}
{staging}
{modules}export OMP_NUM_THREADS=1
{program} {name}.in > $SGE_O_WORKDIR/{name}.out
{sleep}"#,
        name = job.name,
        time = config.time_limit,
        mem = config.memory,
        queue = config.queue,
        gpus = config.gpus,
        smp = config.smp,
        staging = staging_lines(job),
        modules = module_loads(config),
        program = config.program,
        sleep = sleep_line(config),
    )
}

fn generate_sbatch_script(job: &FollowUpJob, config: &JobscriptConfig) -> String {
    let partition = config
        .partition
        .as_ref()
        .map(|p| format!("#SBATCH --partition {}\n", p))
        .unwrap_or_default();

    format!(
        r#"#!/bin/bash
#SBATCH -J {name}
{partition}#SBATCH --time {time}
#SBATCH --mem {mem}
#SBATCH --gres=gpu:{gpus}
#SBATCH -c {smp}
#SBATCH -o {name}.slurm.log
{staging}

set -euo pipefail
{modules}
cd "$SLURM_SUBMIT_DIR"
export OMP_NUM_THREADS=1
{program} {name}.in > $SLURM_SUBMIT_DIR/{name}.out
{sleep}"#,
        name = job.name,
        partition = partition,
        time = config.time_limit,
        mem = config.memory,
        gpus = config.gpus,
        smp = config.smp,
        staging = staging_lines(job),
        modules = module_loads(config),
        program = config.program,
        sleep = sleep_line(config),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FollowUpKind;
    use std::path::PathBuf;

    fn job(spin: u32, run_type: RunType, solvent: bool, guess: &[&str]) -> FollowUpJob {
        FollowUpJob {
            kind: FollowUpKind::SolventSp,
            name: "mol_solventSP".to_string(),
            charge: 0,
            spin_multiplicity: spin,
            run_type,
            solvent,
            guess_files: guess.iter().map(|g| PathBuf::from("/scr").join(g)).collect(),
        }
    }

    #[test]
    fn test_closed_shell_gas_phase_input() {
        let text = generate_input_file(&job(1, RunType::Energy, false, &[]), &InputConfig::default());
        assert!(text.contains("run energy\n"));
        assert!(text.contains("method b3lyp\n"));
        assert!(text.contains("spinmult 1\n"));
        assert!(text.contains("coordinates mol_solventSP.xyz\n"));
        assert!(text.contains("maxit 500\n"));
        assert!(!text.contains("guess"));
        assert!(!text.contains("pcm"));
        assert!(text.ends_with("end\n"));
    }

    #[test]
    fn test_open_shell_solvent_input_with_guess() {
        let text = generate_input_file(
            &job(3, RunType::Frequencies, true, &["ca0", "cb0"]),
            &InputConfig::default(),
        );
        assert!(text.contains("method ub3lyp\n"));
        assert!(text.contains("run frequencies\n"));
        assert!(text.contains("guess ca0 cb0\n"));
        assert!(text.contains("pcm cosmo\n"));
        assert!(text.contains("epsilon 80\n"));
    }

    #[test]
    fn test_transition_state_has_no_maxit() {
        let text = generate_input_file(&job(1, RunType::Ts, false, &[]), &InputConfig::default());
        assert!(!text.contains("maxit"));
    }

    #[test]
    fn test_sge_jobscript() {
        let script = generate_jobscript(
            Scheduler::Sge,
            &job(1, RunType::Energy, true, &["c0"]),
            &JobscriptConfig::default(),
        );
        assert!(script.starts_with("#$ -S /bin/bash\n#$ -N mol_solventSP\n"));
        assert!(script.contains("#$ -l h_rt=96:00:00\n"));
        assert!(script.contains("# -fin c0\n"));
        assert!(script.contains("terachem mol_solventSP.in > $SGE_O_WORKDIR/mol_solventSP.out\n"));
        assert!(!script.contains("sleep"));
    }

    #[test]
    fn test_slurm_jobscript() {
        let config = JobscriptConfig {
            partition: Some("gpu".to_string()),
            modules: vec!["terachem/1.9".to_string()],
            ..JobscriptConfig::default()
        };
        let script = generate_jobscript(Scheduler::Slurm, &job(2, RunType::Energy, false, &[]), &config);
        assert!(script.contains("#SBATCH -J mol_solventSP\n"));
        assert!(script.contains("#SBATCH --partition gpu\n"));
        assert!(script.contains("module load terachem/1.9\n"));
        assert!(script.contains("> $SLURM_SUBMIT_DIR/mol_solventSP.out"));
    }
}
