//! # Console Reporting Module / 控制台报告模块
//!
//! Prints a colored summary table of a run and the details of every test that
//! did not pass.
//!
//! 打印运行的彩色摘要表，以及每个未通过测试的详细信息。

use colored::*;

use crate::core::{RunReport, TestResult, TestStatus};

/// Prints a formatted summary of every test result to the console.
///
/// 在控制台打印所有测试结果的格式化摘要。
///
/// # Output Format / 输出格式
/// ```text
/// --- Test Summary ---
///   - Status     | Test                                              |   Duration
///   - Passed     | ConfigTest TestCase config support invocations    |    1.23ms
///   - Skipped    | ConfigTest TestCase config support ignored        |        N/A
/// ```
pub fn print_summary(report: &RunReport) {
    println!("\n{}", "--- Test Summary ---".bold());

    for result in report.results() {
        let duration_str = match result.status {
            TestStatus::Skipped => "N/A".to_string(),
            _ => format!("{:.2?}", result.duration),
        };

        println!(
            "  - {:<10} | {:<50} | {:>10}",
            colored_status(result.status),
            result.description.full_name(),
            duration_str
        );
    }

    for spec in &report.specs {
        if let Some(failure) = &spec.failure {
            println!(
                "  {} '{}': {}",
                "Spec failure in".red(),
                spec.description.full_name().cyan(),
                failure
            );
        }
    }
    if let Some(failure) = &report.failure {
        println!("  {} {}", "Project hook failure:".red(), failure);
    }

    println!(
        "\n{} passed, {} failed, {} timed out, {} skipped in {:.2?}",
        report.count(TestStatus::Passed).to_string().green(),
        report.count(TestStatus::Failed).to_string().red(),
        report.count(TestStatus::TimedOut).to_string().red(),
        report.count(TestStatus::Skipped).to_string().dimmed(),
        report.duration
    );
}

/// Prints details of every failed or timed-out test, including the
/// configuration that produced it.
///
/// 打印每个失败或超时测试的详细信息，包括产生该结果的配置。
pub fn print_failure_details(report: &RunReport) {
    let failures: Vec<&TestResult> = report.results().filter(|r| r.is_failure()).collect();
    if failures.is_empty() {
        return;
    }

    println!("\n{}", "!!! FAILURES !!!".red().bold());
    println!("{}", "-".repeat(80));

    for (i, result) in failures.iter().enumerate() {
        println!(
            "[{}/{}] {} '{}'",
            i + 1,
            failures.len(),
            colored_status(result.status),
            result.description.full_name().cyan()
        );
        println!("  config: {}", result.config);
        if let Some(detail) = &result.failure {
            if let Some(invocation) = detail.invocation {
                println!("  invocation: #{invocation}");
            }
            println!("  reason: {:?}", detail.reason);
            println!("\n{}", detail.message);
        }
        println!("{}", "-".repeat(80));
    }
}

fn colored_status(status: TestStatus) -> ColoredString {
    let label = status.to_string();
    match status {
        TestStatus::Passed => label.green(),
        TestStatus::Failed => label.red(),
        TestStatus::TimedOut => label.yellow(),
        TestStatus::Skipped => label.dimmed(),
    }
}
