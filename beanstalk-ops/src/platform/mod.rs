pub mod branch;
pub mod filter;

use std::{collections::BTreeMap, fmt};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{Error::InvalidPlatformVersion, Result},
    version::Version,
};

pub use branch::{
    collect_families_from_branches, platform_branch_prompt_text,
    resolve_conflicting_platform_branches, sort_platform_branches_for_prompt, LifecycleState,
    PlatformBranch,
};
pub use filter::Filter;

/// Owner value used by the API for platforms owned by the caller.
pub const OWNED_BY_SELF: &str = "self";
/// Owner value used by the API for platforms managed by Elastic Beanstalk.
pub const OWNED_BY_EB: &str = "AWSElasticBeanstalk";

pub const PLATFORM_STATUS_READY: &str = "Ready";
pub const LIFECYCLE_RECOMMENDED: &str = "Recommended";

lazy_static! {
    static ref ARN_PATTERN: Regex = Regex::new(
        r"^arn:[^:]+:elasticbeanstalk:[^:]+:([^:]*):platform/([^/]+)/(\d+\.\d+\.\d+)$"
    )
    .unwrap();
    pub static ref VALID_PLATFORM_VERSION_FORMAT: Regex = Regex::new(r"^\d+\.\d+\.\d+$").unwrap();
    pub static ref VALID_PLATFORM_NAME_FORMAT: Regex = Regex::new(r"^([^:/]+)$").unwrap();
    pub static ref VALID_PLATFORM_SHORT_FORMAT: Regex =
        Regex::new(r"^([^:/]+)/(\d+\.\d+\.\d+)$").unwrap();
}

/// Parses a platform ARN into "(account id, platform name, platform version)".
/// The account id is empty for Elastic Beanstalk managed platforms.
/// e.g., "arn:aws:elasticbeanstalk:us-west-2::platform/PHP 7.1 running on 64bit Amazon Linux/2.6.5"
pub fn arn_to_platform(arn: &str) -> Result<(String, String, String)> {
    let caps = ARN_PATTERN.captures(arn).ok_or_else(|| InvalidPlatformVersion {
        message: format!("unable to parse arn '{}'", arn),
    })?;
    Ok((
        caps[1].to_string(),
        caps[2].to_string(),
        caps[3].to_string(),
    ))
}

pub fn is_valid_arn(arn: &str) -> bool {
    ARN_PATTERN.is_match(arn)
}

pub fn is_custom_platform_arn(arn: &str) -> bool {
    match arn_to_platform(arn) {
        Ok((account_id, _, _)) => !account_id.is_empty(),
        Err(_) => false,
    }
}

pub fn is_eb_managed_platform_arn(arn: &str) -> bool {
    match arn_to_platform(arn) {
        Ok((account_id, _, _)) => account_id.is_empty(),
        Err(_) => false,
    }
}

/// Only Elastic Beanstalk managed ARNs carry a meaningful region.
pub fn get_region_from_platform_arn(arn: &str) -> Option<String> {
    if !is_eb_managed_platform_arn(arn) {
        return None;
    }
    arn.split(':').nth(3).map(String::from)
}

pub fn get_platform_name(arn: &str) -> Result<String> {
    arn_to_platform(arn).map(|(_, name, _)| name)
}

pub fn get_platform_version(arn: &str) -> Result<String> {
    arn_to_platform(arn).map(|(_, _, version)| version)
}

/// Detailed platform information as returned by "DescribePlatformVersion".
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct PlatformDescription {
    pub platform_arn: String,
    #[serde(default)]
    pub platform_name: Option<String>,
    #[serde(default)]
    pub platform_version: Option<String>,
    #[serde(default)]
    pub platform_owner: Option<String>,
    #[serde(default)]
    pub platform_status: Option<String>,
    #[serde(default)]
    pub platform_category: Option<String>,
    #[serde(default)]
    pub platform_lifecycle_state: Option<String>,
    #[serde(default)]
    pub platform_branch_name: Option<String>,
    #[serde(default)]
    pub platform_branch_lifecycle_state: Option<String>,
    #[serde(default)]
    pub solution_stack_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub maintainer: Option<String>,
    #[serde(default)]
    pub operating_system_name: Option<String>,
    #[serde(default)]
    pub operating_system_version: Option<String>,
    #[serde(default)]
    pub programming_languages: Vec<(String, String)>,
    #[serde(default)]
    pub frameworks: Vec<(String, String)>,
    #[serde(default)]
    pub supported_tier_list: Vec<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_updated: Option<String>,
}

/// Summary entry of "ListPlatformVersions".
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct PlatformSummary {
    pub platform_arn: String,
    #[serde(default)]
    pub platform_owner: Option<String>,
    #[serde(default)]
    pub platform_status: Option<String>,
    #[serde(default)]
    pub platform_category: Option<String>,
    #[serde(default)]
    pub platform_lifecycle_state: Option<String>,
    #[serde(default)]
    pub platform_version: Option<String>,
    #[serde(default)]
    pub platform_branch_name: Option<String>,
    #[serde(default)]
    pub platform_branch_lifecycle_state: Option<String>,
    #[serde(default)]
    pub operating_system_name: Option<String>,
    #[serde(default)]
    pub operating_system_version: Option<String>,
    #[serde(default)]
    pub supported_tier_list: Vec<String>,
}

impl PlatformSummary {
    pub fn new(platform_arn: &str, platform_status: &str) -> Self {
        Self {
            platform_arn: String::from(platform_arn),
            platform_status: Some(String::from(platform_status)),
            ..Default::default()
        }
    }
}

/// Represents a platform version identified by its ARN.
/// Fields other than the ARN are filled from listing summaries or
/// from "DescribePlatformVersion" via "hydrate".
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct PlatformVersion {
    pub platform_arn: String,
    pub account_id: String,
    /// Name embedded in the ARN, e.g., "PHP 7.1 running on 64bit Amazon Linux".
    pub platform_shorthand: String,
    pub platform_version: String,

    #[serde(default)]
    pub platform_name: Option<String>,
    #[serde(default)]
    pub platform_owner: Option<String>,
    #[serde(default)]
    pub platform_status: Option<String>,
    #[serde(default)]
    pub platform_category: Option<String>,
    #[serde(default)]
    pub platform_lifecycle_state: Option<String>,
    #[serde(default)]
    pub platform_branch_name: Option<String>,
    #[serde(default)]
    pub platform_branch_lifecycle_state: Option<String>,
    #[serde(default)]
    pub solution_stack_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub maintainer: Option<String>,
    #[serde(default)]
    pub operating_system_name: Option<String>,
    #[serde(default)]
    pub operating_system_version: Option<String>,
    #[serde(default)]
    pub supported_tier_list: Vec<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_updated: Option<String>,

    #[serde(skip)]
    hydrated: bool,
}

impl PartialEq for PlatformVersion {
    fn eq(&self, other: &Self) -> bool {
        self.platform_arn == other.platform_arn
    }
}

impl Eq for PlatformVersion {}

impl fmt::Display for PlatformVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.platform_arn)
    }
}

impl PlatformVersion {
    pub fn new(platform_arn: &str) -> Result<Self> {
        let (account_id, platform_shorthand, platform_version) = arn_to_platform(platform_arn)?;
        Ok(Self {
            platform_arn: String::from(platform_arn),
            account_id,
            platform_shorthand,
            platform_version,
            platform_name: None,
            platform_owner: None,
            platform_status: None,
            platform_category: None,
            platform_lifecycle_state: None,
            platform_branch_name: None,
            platform_branch_lifecycle_state: None,
            solution_stack_name: None,
            description: None,
            maintainer: None,
            operating_system_name: None,
            operating_system_version: None,
            supported_tier_list: Vec::new(),
            date_created: None,
            date_updated: None,
            hydrated: false,
        })
    }

    pub fn from_summary(summary: &PlatformSummary) -> Result<Self> {
        let mut pv = Self::new(&summary.platform_arn)?;
        if let Some(v) = &summary.platform_version {
            pv.platform_version = v.clone();
        }
        pv.platform_owner = summary.platform_owner.clone();
        pv.platform_status = summary.platform_status.clone();
        pv.platform_category = summary.platform_category.clone();
        pv.platform_lifecycle_state = summary.platform_lifecycle_state.clone();
        pv.platform_branch_name = summary.platform_branch_name.clone();
        pv.platform_branch_lifecycle_state = summary.platform_branch_lifecycle_state.clone();
        pv.operating_system_name = summary.operating_system_name.clone();
        pv.operating_system_version = summary.operating_system_version.clone();
        pv.supported_tier_list = summary.supported_tier_list.clone();
        Ok(pv)
    }

    /// Copies the description fields onto this platform version.
    /// Runs only once per instance.
    pub fn hydrate(&mut self, description: &PlatformDescription) {
        if self.hydrated {
            return;
        }
        if let Some(v) = &description.platform_version {
            self.platform_version = v.clone();
        }
        self.platform_name = description.platform_name.clone();
        self.platform_owner = description.platform_owner.clone();
        self.platform_status = description.platform_status.clone();
        self.platform_category = description.platform_category.clone();
        self.platform_lifecycle_state = description.platform_lifecycle_state.clone();
        self.platform_branch_name = description.platform_branch_name.clone();
        self.platform_branch_lifecycle_state = description.platform_branch_lifecycle_state.clone();
        self.solution_stack_name = description.solution_stack_name.clone();
        self.description = description.description.clone();
        self.maintainer = description.maintainer.clone();
        self.operating_system_name = description.operating_system_name.clone();
        self.operating_system_version = description.operating_system_version.clone();
        self.supported_tier_list = description.supported_tier_list.clone();
        self.date_created = description.date_created.clone();
        self.date_updated = description.date_updated.clone();
        self.hydrated = true;
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub fn is_custom(&self) -> bool {
        !self.account_id.is_empty()
    }

    pub fn is_recommended(&self) -> bool {
        self.platform_lifecycle_state.as_deref() == Some(LIFECYCLE_RECOMMENDED)
    }

    pub fn sortable_version(&self) -> Version {
        Version::parse(&self.platform_version)
    }

    pub fn has_healthd_support(&self) -> bool {
        self.sortable_version() >= Version::parse("2.0.0")
    }

    pub fn has_healthd_group_version_2_support(&self) -> bool {
        if self.is_custom() {
            return false;
        }
        self.sortable_version() >= Version::parse("2.0.10")
    }
}

/// Returns the platform whose ARN equals the input.
pub fn match_with_complete_arn(platform_arns: &[String], input: &str) -> Option<PlatformVersion> {
    platform_arns
        .iter()
        .find(|arn| arn.as_str() == input)
        .and_then(|arn| PlatformVersion::new(arn).ok())
}

/// Returns the first platform whose ARN embeds the input as its name.
pub fn match_with_platform_name(platform_arns: &[String], input: &str) -> Option<PlatformVersion> {
    platform_arns
        .iter()
        .find(|arn| matches!(get_platform_name(arn), Ok(name) if name == input))
        .and_then(|arn| PlatformVersion::new(arn).ok())
}

/// Sorts platform summaries by "(platform name, version)", newest first.
/// Entries with unparseable ARNs go last.
pub fn sort_platform_summaries(summaries: &mut [PlatformSummary]) {
    summaries.sort_by(|a, b| {
        let ka = arn_to_platform(&a.platform_arn)
            .ok()
            .map(|(_, n, v)| (n, Version::parse(&v)));
        let kb = arn_to_platform(&b.platform_arn)
            .ok()
            .map(|(_, n, v)| (n, Version::parse(&v)));
        kb.cmp(&ka)
    });
}

/// e.g., "arn:...:platform/custom/1.0.0  Status: Ready"
pub fn format_platform_descriptions(summaries: &[PlatformSummary], show_status: bool) -> Vec<String> {
    summaries
        .iter()
        .map(|s| {
            if show_status {
                format!(
                    "{}  Status: {}",
                    s.platform_arn,
                    s.platform_status.as_deref().unwrap_or("Unknown")
                )
            } else {
                s.platform_arn.clone()
            }
        })
        .collect()
}

/// Maps each version of the named platform to its ARN.
pub fn generate_version_to_arn_mappings(
    platform_arns: &[String],
    platform_name: &str,
) -> BTreeMap<String, String> {
    let mut mappings = BTreeMap::new();
    for arn in platform_arns.iter() {
        if let Ok((_, name, version)) = arn_to_platform(arn) {
            if name == platform_name {
                mappings.insert(version, arn.clone());
            }
        }
    }
    mappings
}

/// Sorted, unique platform names embedded in the ARNs.
pub fn group_custom_platforms_by_platform_name(platform_arns: &[String]) -> Vec<String> {
    let mut names: Vec<String> = platform_arns
        .iter()
        .filter_map(|arn| get_platform_name(arn).ok())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Computes the next custom platform version.
/// Without a previous version this is "1.0.0"; otherwise the major/minor
/// flags bump and reset the lower parts, and patch is bumped when asked
/// or when nothing else was.
pub fn resolve_version_number(
    latest: Option<&str>,
    major_increment: bool,
    minor_increment: bool,
    patch_increment: bool,
) -> Result<String> {
    let latest = match latest {
        Some(v) => v,
        None => return Ok(String::from("1.0.0")),
    };
    if !VALID_PLATFORM_VERSION_FORMAT.is_match(latest) {
        return Err(InvalidPlatformVersion {
            message: format!("'{}' is not in the format 'X.Y.Z'", latest),
        });
    }

    let parts: Vec<u64> = latest
        .split('.')
        .map(|p| p.parse::<u64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| InvalidPlatformVersion {
            message: format!("failed to parse '{}' ({})", latest, e),
        })?;
    let (mut major, mut minor, mut patch) = (parts[0], parts[1], parts[2]);

    if major_increment {
        major += 1;
        minor = 0;
        patch = 0;
    }
    if minor_increment {
        minor += 1;
        patch = 0;
    }
    if patch_increment || !(major_increment || minor_increment) {
        patch += 1;
    }
    Ok(format!("{}.{}.{}", major, minor, patch))
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- platform::test_arn --exact --show-output
#[test]
fn test_arn() {
    let _ = env_logger::builder().is_test(true).try_init();

    let managed = "arn:aws:elasticbeanstalk:us-west-2::platform/PHP 7.1 running on 64bit Amazon Linux/2.6.5";
    let custom = "arn:aws:elasticbeanstalk:us-west-2:123412341234:platform/custom-platform/1.0.0";

    let (account, name, version) = arn_to_platform(managed).unwrap();
    assert_eq!(account, "");
    assert_eq!(name, "PHP 7.1 running on 64bit Amazon Linux");
    assert_eq!(version, "2.6.5");

    assert!(is_valid_arn(managed));
    assert!(is_eb_managed_platform_arn(managed));
    assert!(!is_custom_platform_arn(managed));
    assert!(is_custom_platform_arn(custom));
    assert!(!is_eb_managed_platform_arn(custom));

    assert_eq!(
        get_region_from_platform_arn(managed),
        Some(String::from("us-west-2"))
    );
    assert_eq!(get_region_from_platform_arn(custom), None);

    assert!(!is_valid_arn("PHP 7.1"));
    assert!(!is_valid_arn(
        "arn:aws:elasticbeanstalk:us-west-2::platform/custom-platform/1.0"
    ));
    assert!(arn_to_platform("PHP 7.1").is_err());

    let pv = PlatformVersion::new(custom).unwrap();
    assert!(pv.is_custom());
    assert_eq!(pv.platform_shorthand, "custom-platform");
    assert!(!pv.has_healthd_group_version_2_support());

    let pv = PlatformVersion::new(managed).unwrap();
    assert!(pv.has_healthd_support());
    assert!(pv.has_healthd_group_version_2_support());
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- platform::test_hydrate --exact --show-output
#[test]
fn test_hydrate() {
    let arn = "arn:aws:elasticbeanstalk:us-west-2::platform/Node.js 18 running on 64bit Amazon Linux 2023/6.0.1";
    let mut pv = PlatformVersion::new(arn).unwrap();
    assert!(!pv.is_hydrated());
    assert!(!pv.is_recommended());

    let desc = PlatformDescription {
        platform_arn: arn.to_string(),
        platform_lifecycle_state: Some(String::from(LIFECYCLE_RECOMMENDED)),
        solution_stack_name: Some(String::from(
            "64bit Amazon Linux 2023 v6.0.1 running Node.js 18",
        )),
        platform_branch_name: Some(String::from("Node.js 18 running on 64bit Amazon Linux 2023")),
        ..Default::default()
    };
    pv.hydrate(&desc);
    assert!(pv.is_hydrated());
    assert!(pv.is_recommended());
    assert_eq!(
        pv.solution_stack_name.as_deref(),
        Some("64bit Amazon Linux 2023 v6.0.1 running Node.js 18")
    );

    // second hydrate is a no-op
    pv.hydrate(&PlatformDescription::default());
    assert!(pv.is_recommended());
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- platform::test_custom_platform_helpers --exact --show-output
#[test]
fn test_custom_platform_helpers() {
    let arns = vec![
        String::from("arn:aws:elasticbeanstalk:us-west-2:123412341234:platform/beta/1.0.0"),
        String::from("arn:aws:elasticbeanstalk:us-west-2:123412341234:platform/alpha/1.0.10"),
        String::from("arn:aws:elasticbeanstalk:us-west-2:123412341234:platform/alpha/1.0.2"),
    ];

    assert_eq!(
        group_custom_platforms_by_platform_name(&arns),
        vec![String::from("alpha"), String::from("beta")]
    );

    let mappings = generate_version_to_arn_mappings(&arns, "alpha");
    assert_eq!(mappings.len(), 2);
    assert_eq!(mappings.get("1.0.2"), Some(&arns[2]));

    assert_eq!(
        match_with_platform_name(&arns, "alpha").unwrap().platform_arn,
        arns[1]
    );
    assert_eq!(
        match_with_complete_arn(&arns, &arns[0]).unwrap().platform_version,
        "1.0.0"
    );
    assert!(match_with_platform_name(&arns, "gamma").is_none());

    let mut summaries: Vec<PlatformSummary> = arns
        .iter()
        .map(|arn| PlatformSummary::new(arn, PLATFORM_STATUS_READY))
        .collect();
    sort_platform_summaries(&mut summaries);
    assert_eq!(
        format_platform_descriptions(&summaries, false),
        vec![arns[0].clone(), arns[1].clone(), arns[2].clone()]
    );
    assert_eq!(
        format_platform_descriptions(&summaries[..1], true),
        vec![format!("{}  Status: Ready", arns[0])]
    );
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- platform::test_resolve_version_number --exact --show-output
#[test]
fn test_resolve_version_number() {
    assert_eq!(resolve_version_number(None, false, false, false).unwrap(), "1.0.0");
    assert_eq!(
        resolve_version_number(Some("1.2.3"), false, false, false).unwrap(),
        "1.2.4"
    );
    assert_eq!(
        resolve_version_number(Some("1.2.3"), true, false, false).unwrap(),
        "2.0.0"
    );
    assert_eq!(
        resolve_version_number(Some("1.2.3"), false, true, false).unwrap(),
        "1.3.0"
    );
    assert_eq!(
        resolve_version_number(Some("1.2.3"), false, true, true).unwrap(),
        "1.3.1"
    );
    assert!(resolve_version_number(Some("1.2"), false, false, false).is_err());

    assert!(VALID_PLATFORM_VERSION_FORMAT.is_match("1.0.0"));
    assert!(VALID_PLATFORM_NAME_FORMAT.is_match("custom-platform"));
    assert!(!VALID_PLATFORM_NAME_FORMAT.is_match("custom-platform/1.0.0"));
    let caps = VALID_PLATFORM_SHORT_FORMAT
        .captures("custom-platform/1.0.0")
        .unwrap();
    assert_eq!(&caps[1], "custom-platform");
    assert_eq!(&caps[2], "1.0.0");
}
