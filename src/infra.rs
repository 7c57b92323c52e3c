//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for the engine:
//! logging setup and loading project configuration files.
//!
//! 此模块为引擎提供基础设施服务：日志初始化和加载项目配置文件。

pub mod fs;
pub mod logging;
