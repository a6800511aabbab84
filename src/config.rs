use std::env;

use crate::constants::{AWS_PROFILE_ENV, AWS_REGION_ENV, PARTITION_ENV, REGION_ENV};

/// Settings shared by every handler invocation of this process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerConfig {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub partition: Option<String>,
}

impl HandlerConfig {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            profile: non_empty(AWS_PROFILE_ENV),
            region: non_empty(REGION_ENV).or_else(|| non_empty(AWS_REGION_ENV)),
            partition: non_empty(PARTITION_ENV),
        }
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(mut self, profile: Option<String>, region: Option<String>) -> Self {
        if profile.is_some() {
            self.profile = profile;
        }
        if region.is_some() {
            self.region = region;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_from_lookup() {
        let config = HandlerConfig::from_lookup(lookup(&[
            (AWS_PROFILE_ENV, "deploy"),
            (REGION_ENV, "eu-central-1"),
            (AWS_REGION_ENV, "us-west-2"),
            (PARTITION_ENV, "aws-cn"),
        ]));

        assert_eq!(config.profile.as_deref(), Some("deploy"));
        assert_eq!(config.region.as_deref(), Some("eu-central-1"));
        assert_eq!(config.partition.as_deref(), Some("aws-cn"));
    }

    #[test]
    fn test_config_falls_back_to_aws_region() {
        let config = HandlerConfig::from_lookup(lookup(&[(AWS_REGION_ENV, "us-west-2")]));
        assert_eq!(config.region.as_deref(), Some("us-west-2"));
    }

    #[test]
    fn test_config_ignores_blank_values() {
        let config = HandlerConfig::from_lookup(lookup(&[
            (AWS_PROFILE_ENV, ""),
            (REGION_ENV, "  "),
            (PARTITION_ENV, ""),
        ]));
        assert_eq!(config, HandlerConfig::default());
    }

    #[test]
    fn test_overrides_win_over_environment() {
        let config = HandlerConfig {
            profile: Some("env-profile".to_string()),
            region: Some("us-east-1".to_string()),
            partition: None,
        }
        .with_overrides(Some("cli-profile".to_string()), None);

        assert_eq!(config.profile.as_deref(), Some("cli-profile"));
        assert_eq!(config.region.as_deref(), Some("us-east-1"));
    }

    #[test]
    #[serial]
    fn test_config_from_env() {
        let original = env::var(PARTITION_ENV).ok();

        unsafe {
            env::set_var(PARTITION_ENV, "aws-us-gov");
        }
        let config = HandlerConfig::from_env();
        assert_eq!(config.partition.as_deref(), Some("aws-us-gov"));

        unsafe {
            match original {
                Some(val) => env::set_var(PARTITION_ENV, val),
                None => env::remove_var(PARTITION_ENV),
            }
        }
    }
}
