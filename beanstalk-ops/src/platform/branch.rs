use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

/// Lifecycle state of a platform branch.
/// ref. https://docs.aws.amazon.com/elasticbeanstalk/latest/api/API_PlatformBranchSummary.html
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Hash)]
pub enum LifecycleState {
    Supported,
    Beta,
    Deprecated,
    Retired,
    Other(String),
}

impl Default for LifecycleState {
    fn default() -> Self {
        LifecycleState::Other(String::new())
    }
}

impl From<&str> for LifecycleState {
    fn from(s: &str) -> Self {
        match s {
            "Supported" => LifecycleState::Supported,
            "Beta" => LifecycleState::Beta,
            "Deprecated" => LifecycleState::Deprecated,
            "Retired" => LifecycleState::Retired,
            other => LifecycleState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Supported => write!(f, "Supported"),
            LifecycleState::Beta => write!(f, "Beta"),
            LifecycleState::Deprecated => write!(f, "Deprecated"),
            LifecycleState::Retired => write!(f, "Retired"),
            LifecycleState::Other(s) => write!(f, "{}", s),
        }
    }
}

impl LifecycleState {
    /// Lower is preferred.
    pub fn sort_value(&self) -> u8 {
        match self {
            LifecycleState::Supported => 0,
            LifecycleState::Beta => 1,
            LifecycleState::Deprecated => 2,
            LifecycleState::Retired => 3,
            LifecycleState::Other(_) => 4,
        }
    }

    /// Higher is shown first in the platform branch prompt.
    fn prompt_value(&self) -> u8 {
        match self {
            LifecycleState::Supported => 3,
            LifecycleState::Beta => 2,
            LifecycleState::Deprecated => 1,
            _ => 0,
        }
    }
}

/// Represents an entry of "ListPlatformBranches".
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct PlatformBranch {
    pub branch_name: String,
    /// Platform family, e.g., "Python".
    pub platform_name: String,
    pub lifecycle_state: LifecycleState,
    #[serde(default)]
    pub branch_order: Option<i32>,
    #[serde(default)]
    pub supported_tier_list: Vec<String>,
}

impl PlatformBranch {
    pub fn new(branch_name: &str, platform_name: &str, lifecycle_state: &str) -> Self {
        Self {
            branch_name: String::from(branch_name),
            platform_name: String::from(platform_name),
            lifecycle_state: LifecycleState::from(lifecycle_state),
            branch_order: None,
            supported_tier_list: Vec::new(),
        }
    }

    pub fn with_branch_order(mut self, order: i32) -> Self {
        self.branch_order = Some(order);
        self
    }

    pub fn is_supported(&self) -> bool {
        self.lifecycle_state == LifecycleState::Supported
    }

    pub fn is_beta(&self) -> bool {
        self.lifecycle_state == LifecycleState::Beta
    }

    pub fn is_deprecated(&self) -> bool {
        self.lifecycle_state == LifecycleState::Deprecated
    }

    pub fn is_retired(&self) -> bool {
        self.lifecycle_state == LifecycleState::Retired
    }
}

impl Ord for PlatformBranch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.platform_name
            .cmp(&other.platform_name)
            .then_with(|| {
                self.lifecycle_state
                    .sort_value()
                    .cmp(&other.lifecycle_state.sort_value())
            })
            .then_with(|| self.branch_name.cmp(&other.branch_name))
    }
}

impl PartialOrd for PlatformBranch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Picks the branch with the most preferred lifecycle state among
/// branches that share a name.
pub fn resolve_conflicting_platform_branches(branches: &[PlatformBranch]) -> Option<PlatformBranch> {
    branches
        .iter()
        .min_by_key(|b| b.lifecycle_state.sort_value())
        .cloned()
}

/// Sorted unique platform family names.
pub fn collect_families_from_branches(branches: &[PlatformBranch]) -> Vec<String> {
    let mut families: Vec<String> = branches.iter().map(|b| b.platform_name.clone()).collect();
    families.sort();
    families.dedup();
    families
}

/// Supported branches first, then beta, then deprecated.
/// Within a state, lower "branch_order" first and branches without one last.
pub fn sort_platform_branches_for_prompt(branches: &mut [PlatformBranch]) {
    branches.sort_by(|a, b| {
        b.lifecycle_state
            .prompt_value()
            .cmp(&a.lifecycle_state.prompt_value())
            .then_with(|| match (a.branch_order, b.branch_order) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    });
}

/// e.g., "Python 2.7 running on 64bit Amazon Linux (Deprecated)"
pub fn platform_branch_prompt_text(branch: &PlatformBranch) -> String {
    if branch.is_supported() {
        return branch.branch_name.clone();
    }
    format!("{} ({})", branch.branch_name, branch.lifecycle_state)
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- platform::branch::test_branch_ordering --exact --show-output
#[test]
fn test_branch_ordering() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut branches = vec![
        PlatformBranch::new("Python 2.7 running on 64bit Amazon Linux", "Python", "Retired"),
        PlatformBranch::new("Python 3.11 running on 64bit Amazon Linux 2023", "Python", "Supported"),
        PlatformBranch::new("Node.js 18 running on 64bit Amazon Linux 2023", "Node.js", "Supported"),
        PlatformBranch::new("Python 3.8 running on 64bit Amazon Linux 2", "Python", "Deprecated"),
    ];
    branches.sort();
    let names: Vec<&str> = branches.iter().map(|b| b.branch_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Node.js 18 running on 64bit Amazon Linux 2023",
            "Python 3.11 running on 64bit Amazon Linux 2023",
            "Python 3.8 running on 64bit Amazon Linux 2",
            "Python 2.7 running on 64bit Amazon Linux",
        ]
    );

    assert_eq!(
        collect_families_from_branches(&branches),
        vec![String::from("Node.js"), String::from("Python")]
    );

    assert!(branches[0].is_supported());
    assert!(branches[2].is_deprecated());
    assert!(branches[3].is_retired());
    assert_eq!(
        platform_branch_prompt_text(&branches[2]),
        "Python 3.8 running on 64bit Amazon Linux 2 (Deprecated)"
    );
    assert_eq!(
        platform_branch_prompt_text(&branches[1]),
        "Python 3.11 running on 64bit Amazon Linux 2023"
    );
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- platform::branch::test_prompt_sort --exact --show-output
#[test]
fn test_prompt_sort() {
    let mut branches = vec![
        PlatformBranch::new("a", "Python", "Deprecated").with_branch_order(1),
        PlatformBranch::new("b", "Python", "Supported"),
        PlatformBranch::new("c", "Python", "Beta").with_branch_order(1),
        PlatformBranch::new("d", "Python", "Supported").with_branch_order(2),
        PlatformBranch::new("e", "Python", "Supported").with_branch_order(1),
    ];
    sort_platform_branches_for_prompt(&mut branches);
    let names: Vec<&str> = branches.iter().map(|b| b.branch_name.as_str()).collect();
    assert_eq!(names, vec!["e", "d", "b", "c", "a"]);
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- platform::branch::test_resolve_conflicting --exact --show-output
#[test]
fn test_resolve_conflicting() {
    let branches = vec![
        PlatformBranch::new("Docker running on 64bit Amazon Linux 2", "Docker", "Retired"),
        PlatformBranch::new("Docker running on 64bit Amazon Linux 2", "Docker", "Beta"),
        PlatformBranch::new("Docker running on 64bit Amazon Linux 2", "Docker", "Deprecated"),
    ];
    let picked = resolve_conflicting_platform_branches(&branches).unwrap();
    assert!(picked.is_beta());
    assert!(resolve_conflicting_platform_branches(&[]).is_none());

    assert_eq!(LifecycleState::from("Unknown").sort_value(), 4);
    assert_eq!(LifecycleState::from("Unknown").to_string(), "Unknown");
}
