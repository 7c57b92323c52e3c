//! # Config Module Unit Tests / Config 模块单元测试
//!
//! Merge laws of `TestCaseConfig` / `PartialTestCaseConfig` and the
//! resolution chain built-in -> project -> spec -> test case.
//!
//! `TestCaseConfig` / `PartialTestCaseConfig` 的合并规律，以及 内置 -> 项目 -> spec -> 测试用例 的解析链。

mod common;

use specrun::core::{
    PartialTestCaseConfig, ProjectConfig, Spec, Tag, TestCaseConfig, TestCaseExtension,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

fn tags(names: &[&str]) -> BTreeSet<Tag> {
    names.iter().map(|n| Tag::new(*n)).collect()
}

fn defaults() -> Vec<TestCaseConfig> {
    let log = common::log();
    vec![
        TestCaseConfig::default(),
        TestCaseConfig {
            invocations: 3,
            threads: 1,
            timeout: None,
            tags: tags(&["A"]),
            enabled: true,
            extensions: vec![common::recording("E", &log)],
        },
        TestCaseConfig {
            invocations: 10,
            threads: 8,
            timeout: Some(Duration::from_millis(750)),
            tags: tags(&["slow", "db"]),
            enabled: false,
            extensions: vec![common::recording("E", &log), common::recording("F", &log)],
        },
    ]
}

#[cfg(test)]
mod merge_law_tests {
    use super::*;

    #[test]
    fn test_empty_override_is_identity() {
        for default in defaults() {
            assert_eq!(default.merge(&PartialTestCaseConfig::new()), default);
        }
    }

    #[test]
    fn test_each_field_override_wins_and_others_inherit() {
        let ext: Arc<TestCaseExtension> = common::recording("X", &common::log());

        for default in defaults() {
            let merged = default.merge(&PartialTestCaseConfig::new().invocations(42));
            assert_eq!(merged, TestCaseConfig { invocations: 42, ..default.clone() });

            let merged = default.merge(&PartialTestCaseConfig::new().threads(7));
            assert_eq!(merged, TestCaseConfig { threads: 7, ..default.clone() });

            let merged = default.merge(&PartialTestCaseConfig::new().timeout(Duration::from_secs(9)));
            assert_eq!(
                merged,
                TestCaseConfig { timeout: Some(Duration::from_secs(9)), ..default.clone() }
            );

            let merged = default.merge(&PartialTestCaseConfig::new().tags(["fresh"]));
            assert_eq!(merged, TestCaseConfig { tags: tags(&["fresh"]), ..default.clone() });

            let merged = default.merge(&PartialTestCaseConfig::new().enabled(!default.enabled));
            assert_eq!(merged, TestCaseConfig { enabled: !default.enabled, ..default.clone() });

            let merged = default.merge(&PartialTestCaseConfig::new().extensions(vec![ext.clone()]));
            assert_eq!(
                merged,
                TestCaseConfig { extensions: vec![ext.clone()], ..default.clone() }
            );
        }
    }

    #[test]
    fn test_explicit_default_value_still_overrides() {
        // Setting a field to the built-in default must not be mistaken for "unset".
        let default = &defaults()[2];
        let merged = default.merge(&PartialTestCaseConfig::new().invocations(1).enabled(true));
        assert_eq!(merged.invocations, 1);
        assert!(merged.enabled);
        assert_eq!(merged.threads, 8);
    }

    #[test]
    fn test_empty_extension_list_replaces_inherited_list() {
        let default = &defaults()[2];
        let merged = default.merge(&PartialTestCaseConfig::new().extensions(Vec::new()));
        assert!(merged.extensions.is_empty());
    }

    #[test]
    fn test_extensions_compare_by_identity() {
        let log = common::log();
        let a = TestCaseConfig {
            extensions: vec![common::recording("E", &log)],
            ..TestCaseConfig::default()
        };
        let b = TestCaseConfig {
            extensions: vec![common::recording("E", &log)],
            ..TestCaseConfig::default()
        };
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}

#[cfg(test)]
mod resolution_tests {
    use super::*;

    #[test]
    fn test_built_in_defaults() {
        let config = TestCaseConfig::default();
        assert_eq!(config.invocations, 1);
        assert_eq!(config.threads, 1);
        assert_eq!(config.timeout, None);
        assert!(config.tags.is_empty());
        assert!(config.enabled);
        assert!(config.extensions.is_empty());
    }

    #[test]
    fn test_project_spec_and_test_layers_stack() {
        let project = ProjectConfig::new().with_defaults(
            PartialTestCaseConfig::new()
                .threads(2)
                .timeout(Duration::from_secs(30)),
        );
        let engine = specrun::Engine::new(project).unwrap();

        let mut builder = Spec::builder("Layers");
        builder.default_config(PartialTestCaseConfig::new().invocations(3).tags(["A"]));
        builder
            .test("override", || Ok(()))
            .config(PartialTestCaseConfig::new().invocations(2).threads(4));
        builder.test("inherit", || Ok(()));
        let spec = builder.build();

        let default = engine.spec_runner().spec_default(&spec);
        let overridden = spec.tests()[0].resolve(&default).config;
        let inherited = spec.tests()[1].resolve(&default).config;

        assert_eq!(overridden.invocations, 2);
        assert_eq!(overridden.threads, 4);
        assert_eq!(overridden.tags, tags(&["A"]));
        assert_eq!(overridden.timeout, Some(Duration::from_secs(30)));

        assert_eq!(inherited.invocations, 3);
        assert_eq!(inherited.threads, 2);
        assert_eq!(inherited.tags, tags(&["A"]));
    }

    #[test]
    fn test_test_override_can_clear_spec_timeout() {
        let default = TestCaseConfig::default()
            .merge(&PartialTestCaseConfig::new().timeout(Duration::from_millis(10)));
        let merged = default.merge(&PartialTestCaseConfig::new().no_timeout());
        assert_eq!(merged.timeout, None);
    }
}
