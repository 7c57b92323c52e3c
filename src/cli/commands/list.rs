//! # List Command Module / 列表命令模块
//!
//! Prints the id of every self-check test case, one per line.

use crate::core::ProjectConfig;
use crate::selfcheck;

pub fn execute() {
    let check = selfcheck::build(ProjectConfig::new());
    for spec in &check.specs {
        for test in spec.tests() {
            println!("{}", test.description.id());
        }
    }
}
