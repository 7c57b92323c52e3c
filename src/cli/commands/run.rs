//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command of the CLI, which loads the
//! project configuration, executes the self-check specs and reports.
//!
//! 此模块实现 CLI 的 `run` 命令：加载项目配置、执行自检 spec 并输出报告。

use anyhow::Result;
use colored::*;
use std::path::Path;

use crate::{
    cli::RunArgs,
    core::{ProjectConfig, ProjectFile},
    engine::Engine,
    infra::{fs::load_project_file, logging},
    reporting::{print_failure_details, print_summary, write_report},
    selfcheck,
};

/// Executes the run command with the provided arguments.
///
/// # Returns
/// `Ok(true)` when every spec passed, `Ok(false)` when something failed, and
/// `Err` when the run could not take place at all.
pub fn execute(args: RunArgs) -> Result<bool> {
    logging::init(&args.log);

    let mut file = load_config(args.config.as_deref())?;
    if let Some(jobs) = args.jobs {
        file.engine.jobs = jobs.max(1);
    }
    if file.engine.jobs > 1 {
        let cores = num_cpus::get();
        if file.engine.jobs > cores {
            println!(
                "{}",
                format!("Running {} specs at a time on {} cores.", file.engine.jobs, cores).yellow()
            );
        }
    }

    let check = selfcheck::build(ProjectConfig::from_file(file));
    println!(
        "{}",
        format!("Running {} self-check specs...", check.specs.len()).bold()
    );

    let engine = Engine::new(check.project)?;
    let report = engine.run(check.specs);

    print_summary(&report);

    if let Some(path) = &args.json {
        println!("\nWriting JSON report to: {}", path.display());
        if let Err(e) = write_report(&report, path) {
            eprintln!("{} {:#}", "Failed to write JSON report:".red(), e);
        }
    }

    if report.is_success() {
        println!("\n{}", "ALL SPECS PASSED".green().bold());
        Ok(true)
    } else {
        print_failure_details(&report);
        println!("\n{}", "SPEC RUN FAILED".red().bold());
        Ok(false)
    }
}

fn load_config(path: Option<&Path>) -> Result<ProjectFile> {
    match path {
        Some(path) => {
            let (file, resolved) = load_project_file(path)?;
            println!("Loaded project config: {}", resolved.display());
            Ok(file)
        }
        None => Ok(ProjectFile::default()),
    }
}
