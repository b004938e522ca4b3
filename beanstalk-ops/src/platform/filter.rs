use serde::{Deserialize, Serialize};

/// "PlatformFilter" types for "ListPlatformVersions".
/// ref. https://docs.aws.amazon.com/elasticbeanstalk/latest/api/API_PlatformFilter.html
pub const PLATFORM_NAME: &str = "PlatformName";
pub const PLATFORM_OWNER: &str = "PlatformOwner";
pub const PLATFORM_VERSION: &str = "PlatformVersion";
pub const PLATFORM_STATUS: &str = "PlatformStatus";
pub const PLATFORM_BRANCH_NAME: &str = "PlatformBranchName";
pub const PLATFORM_LIFECYCLE_STATE: &str = "PlatformLifecycleState";

/// "SearchFilter" attributes for "ListPlatformBranches".
/// ref. https://docs.aws.amazon.com/elasticbeanstalk/latest/api/API_SearchFilter.html
pub const BRANCH_NAME: &str = "BranchName";
pub const LIFECYCLE_STATE: &str = "LifecycleState";

/// A listing filter.
/// Maps to "PlatformFilter" (key as "Type") for platform versions and
/// "SearchFilter" (key as "Attribute") for platform branches.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone)]
#[serde(rename_all = "snake_case")]
pub struct Filter {
    pub key: String,
    pub operator: String,
    pub values: Vec<String>,
}

impl Filter {
    pub fn new(key: &str, operator: &str, values: &[&str]) -> Self {
        Self {
            key: String::from(key),
            operator: String::from(operator),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn equals(key: &str, value: &str) -> Self {
        Self::new(key, "=", &[value])
    }

    pub fn not_equals(key: &str, value: &str) -> Self {
        Self::new(key, "!=", &[value])
    }

    /// Evaluates the filter against a field value the same way the
    /// service does for the string operators.
    /// A missing field only passes "!=".
    pub fn matches(&self, value: Option<&str>) -> bool {
        let value = match value {
            Some(v) => v,
            None => return self.operator == "!=",
        };
        match self.operator.as_str() {
            "=" => self.values.iter().any(|v| v == value),
            "!=" => self.values.iter().all(|v| v != value),
            "contains" => self.values.iter().any(|v| value.contains(v.as_str())),
            "begins_with" => self.values.iter().any(|v| value.starts_with(v.as_str())),
            "ends_with" => self.values.iter().any(|v| value.ends_with(v.as_str())),
            _ => false,
        }
    }
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- platform::filter::test_filter --exact --show-output
#[test]
fn test_filter() {
    let f = Filter::equals(PLATFORM_OWNER, "self");
    assert!(f.matches(Some("self")));
    assert!(!f.matches(Some("AWSElasticBeanstalk")));
    assert!(!f.matches(None));

    let f = Filter::not_equals(LIFECYCLE_STATE, "Retired");
    assert!(f.matches(Some("Supported")));
    assert!(!f.matches(Some("Retired")));
    assert!(f.matches(None));

    let f = Filter::new(BRANCH_NAME, "begins_with", &["Python"]);
    assert!(f.matches(Some("Python 3.11 running on 64bit Amazon Linux 2023")));
    assert!(!f.matches(Some("Node.js 18 running on 64bit Amazon Linux 2023")));
}
