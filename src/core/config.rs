//! # Configuration Module / 配置模块
//!
//! `TestCaseConfig` is the runtime configuration of a test case. A
//! `PartialTestCaseConfig` carries only the fields an author actually wrote;
//! merging it onto a default keeps every field it leaves unset.
//!
//! `TestCaseConfig` 是测试用例的运行时配置。`PartialTestCaseConfig` 只携带作者实际写出的字段；
//! 将其合并到默认配置上时，未设置的字段保持继承。

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::core::extension::TestCaseExtension;
use crate::core::models::Failure;

/// An opaque label attached to a test case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Tag(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Tag::new(name)
    }
}

/// The effective configuration of a test case.
/// 测试用例的有效配置。
#[derive(Clone)]
pub struct TestCaseConfig {
    /// How many times the body runs.
    pub invocations: usize,
    /// Size of the worker pool the invocations share.
    pub threads: usize,
    /// Wall-clock budget for the whole invocation batch. `None` is unbounded.
    pub timeout: Option<Duration>,
    pub tags: BTreeSet<Tag>,
    pub enabled: bool,
    pub extensions: Vec<Arc<TestCaseExtension>>,
}

impl Default for TestCaseConfig {
    fn default() -> Self {
        Self {
            invocations: 1,
            threads: 1,
            timeout: None,
            tags: BTreeSet::new(),
            enabled: true,
            extensions: Vec::new(),
        }
    }
}

impl TestCaseConfig {
    /// Field by field: the override's value if it set one, otherwise ours.
    ///
    /// 逐字段合并：若覆盖项设置了该字段则取覆盖值，否则保留当前值。
    pub fn merge(&self, overrides: &PartialTestCaseConfig) -> TestCaseConfig {
        TestCaseConfig {
            invocations: overrides.invocations.unwrap_or(self.invocations),
            threads: overrides.threads.unwrap_or(self.threads),
            timeout: overrides.timeout.unwrap_or(self.timeout),
            tags: overrides.tags.clone().unwrap_or_else(|| self.tags.clone()),
            enabled: overrides.enabled.unwrap_or(self.enabled),
            extensions: overrides
                .extensions
                .clone()
                .unwrap_or_else(|| self.extensions.clone()),
        }
    }

    /// Rejects configurations that cannot be executed.
    pub fn validate(&self) -> Result<(), Failure> {
        if self.invocations == 0 {
            return Err(Failure::Configuration(
                "invocations must be at least 1".to_string(),
            ));
        }
        if self.threads == 0 {
            return Err(Failure::Configuration(
                "threads must be at least 1".to_string(),
            ));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(Failure::Configuration(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// Extensions compare by identity.
impl PartialEq for TestCaseConfig {
    fn eq(&self, other: &Self) -> bool {
        self.invocations == other.invocations
            && self.threads == other.threads
            && self.timeout == other.timeout
            && self.tags == other.tags
            && self.enabled == other.enabled
            && same_extensions(&self.extensions, &other.extensions)
    }
}

impl fmt::Debug for TestCaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCaseConfig")
            .field("invocations", &self.invocations)
            .field("threads", &self.threads)
            .field("timeout", &self.timeout)
            .field("tags", &self.tags)
            .field("enabled", &self.enabled)
            .field("extensions", &self.extensions.len())
            .finish()
    }
}

fn same_extensions(a: &[Arc<TestCaseExtension>], b: &[Arc<TestCaseExtension>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
}

/// Only the fields an author explicitly set. Unset fields inherit from
/// whatever default the partial is merged onto.
///
/// Can be read from TOML (`timeout_ms` for the timeout); extensions can only
/// be set in code.
///
/// 只包含作者显式设置的字段。未设置的字段从合并目标的默认值继承。
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialTestCaseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invocations: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
    /// `Some(None)` explicitly removes an inherited timeout.
    #[serde(
        default,
        rename = "timeout_ms",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_timeout",
        deserialize_with = "deserialize_timeout"
    )]
    pub timeout: Option<Option<Duration>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<Tag>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip)]
    pub extensions: Option<Vec<Arc<TestCaseExtension>>>,
}

impl PartialTestCaseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invocations(mut self, invocations: usize) -> Self {
        self.invocations = Some(invocations);
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(Some(timeout));
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.timeout = Some(None);
        self
    }

    pub fn tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Tag>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Replaces, never appends to, the inherited extension list.
    pub fn extensions(mut self, extensions: Vec<Arc<TestCaseExtension>>) -> Self {
        self.extensions = Some(extensions);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.invocations.is_none()
            && self.threads.is_none()
            && self.timeout.is_none()
            && self.tags.is_none()
            && self.enabled.is_none()
            && self.extensions.is_none()
    }
}

impl fmt::Debug for PartialTestCaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialTestCaseConfig")
            .field("invocations", &self.invocations)
            .field("threads", &self.threads)
            .field("timeout", &self.timeout)
            .field("tags", &self.tags)
            .field("enabled", &self.enabled)
            .field("extensions", &self.extensions.as_ref().map(Vec::len))
            .finish()
    }
}

fn serialize_timeout<S: Serializer>(
    timeout: &Option<Option<Duration>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match timeout {
        Some(Some(duration)) => serializer.serialize_u64(duration.as_millis() as u64),
        // 0 means "no timeout" on the way back in.
        _ => serializer.serialize_u64(0),
    }
}

fn deserialize_timeout<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Option<Duration>>, D::Error> {
    let millis = u64::deserialize(deserializer)?;
    Ok(Some((millis > 0).then(|| Duration::from_millis(millis))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_default() -> TestCaseConfig {
        TestCaseConfig {
            invocations: 3,
            threads: 2,
            timeout: Some(Duration::from_secs(5)),
            tags: [Tag::new("a")].into_iter().collect(),
            enabled: true,
            extensions: Vec::new(),
        }
    }

    #[test]
    fn empty_override_is_identity() {
        let default = sample_default();
        assert_eq!(default.merge(&PartialTestCaseConfig::new()), default);
    }

    #[test]
    fn override_only_actually_set_values() {
        let merged = sample_default().merge(&PartialTestCaseConfig::new().invocations(2).threads(4));
        assert_eq!(merged.invocations, 2);
        assert_eq!(merged.threads, 4);
        assert_eq!(merged.tags, [Tag::new("a")].into_iter().collect());
        assert_eq!(merged.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn no_timeout_clears_inherited_timeout() {
        let merged = sample_default().merge(&PartialTestCaseConfig::new().no_timeout());
        assert_eq!(merged.timeout, None);
    }

    #[test]
    fn validate_rejects_zero_invocations_and_threads() {
        let zero_invocations = TestCaseConfig::default().merge(&PartialTestCaseConfig::new().invocations(0));
        assert!(matches!(zero_invocations.validate(), Err(Failure::Configuration(_))));

        let zero_threads = TestCaseConfig::default().merge(&PartialTestCaseConfig::new().threads(0));
        assert!(matches!(zero_threads.validate(), Err(Failure::Configuration(_))));

        assert!(TestCaseConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_deserializes_from_toml() {
        let partial: PartialTestCaseConfig = toml::from_str(
            r#"
            invocations = 4
            timeout_ms = 250
            tags = ["slow"]
            "#,
        )
        .unwrap();

        assert_eq!(partial.invocations, Some(4));
        assert_eq!(partial.threads, None);
        assert_eq!(partial.timeout, Some(Some(Duration::from_millis(250))));
        assert_eq!(partial.tags, Some([Tag::new("slow")].into_iter().collect()));
        assert!(partial.extensions.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let parsed = toml::from_str::<PartialTestCaseConfig>("retries = 3");
        assert!(parsed.is_err());
    }
}
