//! # Reporting Module / 报告模块
//!
//! This module prints colored run summaries to the console and serializes run
//! reports to JSON.
//!
//! 此模块在控制台打印彩色运行摘要，并将运行报告序列化为 JSON。

pub mod console;
pub mod json;

// Re-export common reporting functions
pub use console::{print_failure_details, print_summary};
pub use json::{to_json, write_report};
