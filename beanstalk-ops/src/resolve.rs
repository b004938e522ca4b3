//! Resolves user-supplied platform strings into solution stacks or
//! platform versions.
//!
//! Accepted inputs, in the order they are tried:
//! - Elastic Beanstalk managed platform ARN
//! - custom platform ARN
//! - complete solution stack name
//!   (e.g., "64bit Amazon Linux 2017.09 v2.6.0 running PHP 7.1")
//! - solution stack shorthand (e.g., "PHP 7.1")
//! - language name (e.g., "php")
//! - pythonified shorthand (e.g., "php-7.1")
//! - Windows Server product name (e.g., "Windows Server 2016")
//! - custom platform name
use std::{collections::BTreeMap, fmt};

use async_trait::async_trait;

use crate::{
    errors::{
        Error::{InvalidPlatformVersion, NotFound},
        Result,
    },
    platform::{
        self,
        filter::{self, Filter},
        PlatformBranch, PlatformDescription, PlatformSummary, PlatformVersion, OWNED_BY_EB,
        OWNED_BY_SELF, PLATFORM_STATUS_READY, VALID_PLATFORM_NAME_FORMAT,
        VALID_PLATFORM_SHORT_FORMAT, VALID_PLATFORM_VERSION_FORMAT,
    },
    solution_stack::{self, SolutionStack},
};

/// Platform states that never count as an available platform version.
pub const IGNORED_PLATFORM_STATES: &[&str] = &["Deleting", "Failed"];

/// Read-only view of the platform listings of one region.
#[async_trait]
pub trait PlatformCatalog {
    async fn list_available_solution_stacks(&self) -> Result<Vec<SolutionStack>>;
    async fn list_platform_versions(&self, filters: &[Filter]) -> Result<Vec<PlatformSummary>>;
    async fn describe_platform_version(&self, platform_arn: &str) -> Result<PlatformDescription>;
    async fn list_platform_branches(&self, filters: &[Filter]) -> Result<Vec<PlatformBranch>>;
}

/// Result of a platform resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    SolutionStack(SolutionStack),
    PlatformVersion(PlatformVersion),
}

/// What "CreateEnvironment" is given to pick the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateTarget {
    SolutionStackName(String),
    PlatformArn(String),
}

impl Platform {
    pub fn display_name(&self) -> String {
        match self {
            Platform::SolutionStack(ss) => ss.name.clone(),
            Platform::PlatformVersion(pv) => pv.platform_arn.clone(),
        }
    }

    pub fn to_create_target(&self) -> CreateTarget {
        match self {
            Platform::SolutionStack(ss) => CreateTarget::SolutionStackName(ss.name.clone()),
            Platform::PlatformVersion(pv) => CreateTarget::PlatformArn(pv.platform_arn.clone()),
        }
    }

    pub fn has_healthd_group_version_2_support(&self) -> bool {
        match self {
            Platform::SolutionStack(ss) => ss.has_healthd_group_version_2_support(),
            Platform::PlatformVersion(pv) => pv.has_healthd_group_version_2_support(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Resolves the platform string against every accepted format.
/// With "find_newer", an exact match is replaced by the latest platform
/// of the same kind.
pub async fn find_solution_stack_from_string<C>(
    catalog: &C,
    solution_string: &str,
    find_newer: bool,
) -> Result<Platform>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    log::debug!(
        "resolving platform '{}' (find newer {})",
        solution_string,
        find_newer
    );

    if platform::is_eb_managed_platform_arn(solution_string) {
        let matched = if find_newer {
            get_latest_eb_managed_platform(catalog, solution_string)
                .await?
                .map(Platform::PlatformVersion)
        } else {
            platform_arn_to_solution_stack(catalog, solution_string)
                .await?
                .map(Platform::SolutionStack)
        };
        if let Some(m) = matched {
            return Ok(m);
        }
    } else if platform::is_custom_platform_arn(solution_string) {
        let matched = if find_newer {
            get_latest_custom_platform_version(catalog, solution_string).await?
        } else {
            find_custom_platform_version_from_string(catalog, solution_string).await?
        };
        if let Some(m) = matched {
            return Ok(Platform::PlatformVersion(m));
        }
    }

    let available = catalog.list_available_solution_stacks().await?;

    if let Some(m) = solution_stack::match_with_complete_solution_string(&available, solution_string)
    {
        if !find_newer {
            return Ok(Platform::SolutionStack(m));
        }
        let language_name = SolutionStack::new(solution_string).language_name();
        if let Some(newer) =
            solution_stack::match_with_solution_string_language_name(&available, &language_name)
        {
            log::info!("found newer platform '{}' for '{}'", newer.name, m.name);
            return Ok(Platform::SolutionStack(newer));
        }
        return Ok(Platform::SolutionStack(m));
    }

    let matchers: [fn(&[SolutionStack], &str) -> Option<SolutionStack>; 4] = [
        solution_stack::match_with_solution_string_shorthand,
        solution_stack::match_with_solution_string_language_name,
        solution_stack::match_with_pythonified_solution_string,
        solution_stack::match_with_windows_server_version_string,
    ];
    for matcher in matchers.iter() {
        if let Some(m) = matcher(&available, solution_string) {
            return Ok(Platform::SolutionStack(m));
        }
    }

    if let Some(m) = find_custom_platform_version_from_string(catalog, solution_string).await? {
        return Ok(Platform::PlatformVersion(m));
    }

    Err(NotFound {
        message: format!("platform '{}' does not appear to be valid", solution_string),
    })
}

/// Looks up the solution stack behind an Elastic Beanstalk managed platform ARN.
/// Returns "None" for custom platform ARNs.
pub async fn platform_arn_to_solution_stack<C>(
    catalog: &C,
    platform_arn: &str,
) -> Result<Option<SolutionStack>>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    if !platform::is_eb_managed_platform_arn(platform_arn) {
        return Ok(None);
    }
    let desc = catalog.describe_platform_version(platform_arn).await?;
    Ok(desc.solution_stack_name.map(|name| SolutionStack::new(&name)))
}

pub async fn get_platform_branch_by_name<C>(
    catalog: &C,
    branch_name: &str,
) -> Result<Option<PlatformBranch>>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    let filters = vec![Filter::equals(filter::BRANCH_NAME, branch_name)];
    let branches = catalog.list_platform_branches(&filters).await?;
    match branches.len() {
        0 => Ok(None),
        1 => Ok(branches.into_iter().next()),
        _ => Ok(platform::resolve_conflicting_platform_branches(&branches)),
    }
}

pub async fn is_platform_branch_name<C>(catalog: &C, s: &str) -> Result<bool>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    Ok(get_platform_branch_by_name(catalog, s).await?.is_some())
}

pub async fn list_nonretired_platform_branches<C>(catalog: &C) -> Result<Vec<PlatformBranch>>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    let filters = vec![Filter::not_equals(filter::LIFECYCLE_STATE, "Retired")];
    catalog.list_platform_branches(&filters).await
}

/// Lists the platform versions of the branch, oldest first.
pub async fn get_platform_versions_for_branch<C>(
    catalog: &C,
    branch_name: &str,
    recommended_only: bool,
) -> Result<Vec<PlatformVersion>>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    let mut filters = vec![Filter::equals(filter::PLATFORM_BRANCH_NAME, branch_name)];
    if recommended_only {
        filters.push(Filter::equals(
            filter::PLATFORM_LIFECYCLE_STATE,
            platform::LIFECYCLE_RECOMMENDED,
        ));
    }

    let summaries = catalog.list_platform_versions(&filters).await?;
    let mut versions = Vec::with_capacity(summaries.len());
    for s in summaries.iter() {
        versions.push(PlatformVersion::from_summary(s)?);
    }
    versions.sort_by(|a, b| a.sortable_version().cmp(&b.sortable_version()));
    Ok(versions)
}

/// Latest recommended version of the branch, or the latest version
/// when none is recommended.
pub async fn get_preferred_platform_version_for_branch<C>(
    catalog: &C,
    branch_name: &str,
) -> Result<PlatformVersion>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    let recommended = get_platform_versions_for_branch(catalog, branch_name, true).await?;
    if let Some(pv) = recommended.into_iter().last() {
        return Ok(pv);
    }
    let all = get_platform_versions_for_branch(catalog, branch_name, false).await?;
    all.into_iter().last().ok_or_else(|| NotFound {
        message: format!("no platform versions found for branch '{}'", branch_name),
    })
}

/// Resolves ARNs and platform branch names to hydrated platform versions,
/// and everything else through "find_solution_stack_from_string".
pub async fn get_platform_for_platform_string<C>(catalog: &C, s: &str) -> Result<Platform>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    if platform::is_valid_arn(s) {
        let mut pv = PlatformVersion::new(s)?;
        let desc = catalog.describe_platform_version(s).await?;
        pv.hydrate(&desc);
        return Ok(Platform::PlatformVersion(pv));
    }

    if is_platform_branch_name(catalog, s).await? {
        let mut pv = get_preferred_platform_version_for_branch(catalog, s).await?;
        let desc = catalog.describe_platform_version(&pv.platform_arn).await?;
        pv.hydrate(&desc);
        return Ok(Platform::PlatformVersion(pv));
    }

    find_solution_stack_from_string(catalog, s, false).await
}

async fn list_platform_versions_by_owner<C>(
    catalog: &C,
    owner: &str,
    platform_name: Option<&str>,
    platform_version: Option<&str>,
    status: Option<&str>,
) -> Result<Vec<PlatformSummary>>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    let mut filters = vec![Filter::equals(filter::PLATFORM_OWNER, owner)];
    if let Some(name) = platform_name {
        filters.push(Filter::equals(filter::PLATFORM_NAME, name));
    }
    if let Some(version) = platform_version {
        filters.push(Filter::equals(filter::PLATFORM_VERSION, version));
    }

    let mut summaries = catalog.list_platform_versions(&filters).await?;
    if let Some(status) = status {
        let status = status.to_lowercase();
        summaries.retain(|s| {
            s.platform_status
                .as_deref()
                .map(|v| v.to_lowercase() == status)
                .unwrap_or(false)
        });
    }
    platform::sort_platform_summaries(&mut summaries);
    Ok(summaries)
}

/// Lists the caller's custom platform versions, newest first.
pub async fn list_custom_platform_versions<C>(
    catalog: &C,
    platform_name: Option<&str>,
    platform_version: Option<&str>,
    status: Option<&str>,
) -> Result<Vec<PlatformSummary>>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    list_platform_versions_by_owner(catalog, OWNED_BY_SELF, platform_name, platform_version, status)
        .await
}

/// Lists Elastic Beanstalk managed platform versions, newest first.
pub async fn list_eb_managed_platform_versions<C>(
    catalog: &C,
    platform_name: Option<&str>,
    platform_version: Option<&str>,
    status: Option<&str>,
) -> Result<Vec<PlatformSummary>>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    list_platform_versions_by_owner(catalog, OWNED_BY_EB, platform_name, platform_version, status)
        .await
}

/// Matches the string against the caller's custom platforms,
/// first by complete ARN and then by platform name.
/// A name resolves to its newest version not in an ignored state.
pub async fn find_custom_platform_version_from_string<C>(
    catalog: &C,
    s: &str,
) -> Result<Option<PlatformVersion>>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    let summaries = list_custom_platform_versions(catalog, None, None, None).await?;

    let arns: Vec<String> = summaries.iter().map(|s| s.platform_arn.clone()).collect();
    if let Some(pv) = platform::match_with_complete_arn(&arns, s) {
        return Ok(Some(pv));
    }

    let usable: Vec<String> = summaries
        .into_iter()
        .filter(|s| match &s.platform_status {
            Some(status) => !IGNORED_PLATFORM_STATES.contains(&status.as_str()),
            None => true,
        })
        .map(|s| s.platform_arn)
        .collect();
    Ok(platform::match_with_platform_name(&usable, s))
}

/// Latest "Ready" custom platform version with the same name and owner
/// account as the ARN. Returns "None" for managed platform ARNs.
pub async fn get_latest_custom_platform_version<C>(
    catalog: &C,
    platform_arn: &str,
) -> Result<Option<PlatformVersion>>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    let (account_id, platform_name, _) = platform::arn_to_platform(platform_arn)?;
    if account_id.is_empty() {
        return Ok(None);
    }
    let summaries = list_custom_platform_versions(
        catalog,
        Some(&platform_name),
        None,
        Some(PLATFORM_STATUS_READY),
    )
    .await?;
    let latest = summaries.iter().find(|s| {
        platform::arn_to_platform(&s.platform_arn)
            .map(|(owner, _, _)| owner == account_id)
            .unwrap_or(false)
    });
    match latest {
        Some(s) => Ok(Some(PlatformVersion::from_summary(s)?)),
        None => Ok(None),
    }
}

/// Latest "Ready" managed platform version with the same name as the ARN.
/// Returns "None" for custom platform ARNs.
pub async fn get_latest_eb_managed_platform<C>(
    catalog: &C,
    platform_arn: &str,
) -> Result<Option<PlatformVersion>>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    let (account_id, platform_name, _) = platform::arn_to_platform(platform_arn)?;
    if !account_id.is_empty() {
        return Ok(None);
    }
    let summaries = list_eb_managed_platform_versions(
        catalog,
        Some(&platform_name),
        None,
        Some(PLATFORM_STATUS_READY),
    )
    .await?;
    match summaries.first() {
        Some(s) => Ok(Some(PlatformVersion::from_summary(s)?)),
        None => Ok(None),
    }
}

/// Maps each custom platform name to its latest version,
/// skipping versions in any of the ignored states.
pub async fn get_platforms<C>(
    catalog: &C,
    platform_name: Option<&str>,
    ignored_states: &[&str],
) -> Result<BTreeMap<String, String>>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    let summaries = list_custom_platform_versions(catalog, platform_name, None, None).await?;

    let mut platforms = BTreeMap::new();
    for s in summaries.iter() {
        if let Some(status) = &s.platform_status {
            if ignored_states.contains(&status.as_str()) {
                continue;
            }
        }
        let (_, name, version) = match platform::arn_to_platform(&s.platform_arn) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("skipping '{}' ({})", s.platform_arn, e);
                continue;
            }
        };
        // summaries are newest first
        platforms.entry(name).or_insert(version);
    }
    Ok(platforms)
}

pub async fn get_latest_platform_version<C>(
    catalog: &C,
    platform_name: &str,
) -> Result<Option<String>>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    let platforms = get_platforms(catalog, Some(platform_name), IGNORED_PLATFORM_STATES).await?;
    Ok(platforms.get(platform_name).cloned())
}

pub async fn get_platform_arn<C>(
    catalog: &C,
    platform_name: &str,
    platform_version: &str,
) -> Result<Option<String>>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    let summaries =
        list_custom_platform_versions(catalog, Some(platform_name), Some(platform_version), None)
            .await?;
    Ok(summaries.into_iter().next().map(|s| s.platform_arn))
}

/// Resolves a custom platform version from a version number of the
/// workspace platform, a full ARN, or "name/version".
pub async fn version_to_arn<C>(
    catalog: &C,
    workspace_platform_name: Option<&str>,
    s: &str,
) -> Result<String>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    let arn = if VALID_PLATFORM_VERSION_FORMAT.is_match(s) {
        match workspace_platform_name {
            Some(name) => get_platform_arn(catalog, name, s).await?,
            None => None,
        }
    } else if platform::is_valid_arn(s) {
        Some(String::from(s))
    } else if let Some(caps) = VALID_PLATFORM_SHORT_FORMAT.captures(s) {
        get_platform_arn(catalog, &caps[1], &caps[2]).await?
    } else {
        None
    };

    arn.ok_or_else(|| InvalidPlatformVersion {
        message: format!("no such version exists for '{}'", s),
    })
}

/// Resolves a custom platform version from a full ARN, "name/version",
/// or a bare name meaning its latest version.
pub async fn name_to_arn<C>(catalog: &C, s: &str) -> Result<String>
where
    C: PlatformCatalog + Sync + ?Sized,
{
    let arn = if platform::is_valid_arn(s) {
        Some(String::from(s))
    } else if let Some(caps) = VALID_PLATFORM_SHORT_FORMAT.captures(s) {
        get_platform_arn(catalog, &caps[1], &caps[2]).await?
    } else if VALID_PLATFORM_NAME_FORMAT.is_match(s) {
        match get_latest_platform_version(catalog, s).await? {
            Some(version) => get_platform_arn(catalog, s, &version).await?,
            None => None,
        }
    } else {
        None
    };

    arn.ok_or_else(|| InvalidPlatformVersion {
        message: format!("no such platform exists for '{}'", s),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::platform::LIFECYCLE_RECOMMENDED;

    const PHP_71_ARN: &str =
        "arn:aws:elasticbeanstalk:us-west-2::platform/PHP 7.1 running on 64bit Amazon Linux/2.6.5";
    const PHP_71_OLD_ARN: &str =
        "arn:aws:elasticbeanstalk:us-west-2::platform/PHP 7.1 running on 64bit Amazon Linux/2.6.0";
    const PY_BRANCH: &str = "Python 3.11 running on 64bit Amazon Linux 2023";
    const PY_ARN_1: &str = "arn:aws:elasticbeanstalk:us-west-2::platform/Python 3.11 running on 64bit Amazon Linux 2023/4.0.1";
    const PY_ARN_2: &str = "arn:aws:elasticbeanstalk:us-west-2::platform/Python 3.11 running on 64bit Amazon Linux 2023/4.0.2";
    const PY_ARN_3: &str = "arn:aws:elasticbeanstalk:us-west-2::platform/Python 3.11 running on 64bit Amazon Linux 2023/4.0.3";
    const CUSTOM_1: &str =
        "arn:aws:elasticbeanstalk:us-west-2:123412341234:platform/custom-platform/1.0.0";
    const CUSTOM_2: &str =
        "arn:aws:elasticbeanstalk:us-west-2:123412341234:platform/custom-platform/1.0.10";
    const CUSTOM_FAILED: &str =
        "arn:aws:elasticbeanstalk:us-west-2:123412341234:platform/custom-platform/1.1.0";

    /// In-memory catalog that evaluates filters the way the service does.
    struct FakeCatalog {
        stacks: Vec<SolutionStack>,
        versions: Vec<PlatformSummary>,
        descriptions: Vec<PlatformDescription>,
        branches: Vec<PlatformBranch>,
    }

    fn summary_field<'a>(s: &'a PlatformSummary, key: &str) -> Option<&'a str> {
        match key {
            filter::PLATFORM_OWNER => s.platform_owner.as_deref(),
            filter::PLATFORM_STATUS => s.platform_status.as_deref(),
            filter::PLATFORM_VERSION => s.platform_version.as_deref(),
            filter::PLATFORM_BRANCH_NAME => s.platform_branch_name.as_deref(),
            filter::PLATFORM_LIFECYCLE_STATE => s.platform_lifecycle_state.as_deref(),
            _ => None,
        }
    }

    #[async_trait]
    impl PlatformCatalog for FakeCatalog {
        async fn list_available_solution_stacks(&self) -> Result<Vec<SolutionStack>> {
            Ok(self.stacks.clone())
        }

        async fn list_platform_versions(&self, filters: &[Filter]) -> Result<Vec<PlatformSummary>> {
            Ok(self
                .versions
                .iter()
                .filter(|s| {
                    filters.iter().all(|f| {
                        if f.key == filter::PLATFORM_NAME {
                            let name = platform::get_platform_name(&s.platform_arn).ok();
                            return f.matches(name.as_deref());
                        }
                        f.matches(summary_field(s, &f.key))
                    })
                })
                .cloned()
                .collect())
        }

        async fn describe_platform_version(
            &self,
            platform_arn: &str,
        ) -> Result<PlatformDescription> {
            self.descriptions
                .iter()
                .find(|d| d.platform_arn == platform_arn)
                .cloned()
                .ok_or_else(|| NotFound {
                    message: platform_arn.to_string(),
                })
        }

        async fn list_platform_branches(&self, filters: &[Filter]) -> Result<Vec<PlatformBranch>> {
            Ok(self
                .branches
                .iter()
                .filter(|b| {
                    let state = b.lifecycle_state.to_string();
                    filters.iter().all(|f| match f.key.as_str() {
                        filter::BRANCH_NAME => f.matches(Some(b.branch_name.as_str())),
                        filter::LIFECYCLE_STATE => f.matches(Some(state.as_str())),
                        _ => false,
                    })
                })
                .cloned()
                .collect())
        }
    }

    fn managed(arn: &str, branch: &str, lifecycle: Option<&str>) -> PlatformSummary {
        PlatformSummary {
            platform_arn: arn.to_string(),
            platform_owner: Some(OWNED_BY_EB.to_string()),
            platform_status: Some(PLATFORM_STATUS_READY.to_string()),
            platform_version: platform::get_platform_version(arn).ok(),
            platform_branch_name: Some(branch.to_string()),
            platform_lifecycle_state: lifecycle.map(String::from),
            ..Default::default()
        }
    }

    fn custom(arn: &str, status: &str) -> PlatformSummary {
        PlatformSummary {
            platform_arn: arn.to_string(),
            platform_owner: Some(OWNED_BY_SELF.to_string()),
            platform_status: Some(status.to_string()),
            platform_version: platform::get_platform_version(arn).ok(),
            ..Default::default()
        }
    }

    fn fake() -> FakeCatalog {
        FakeCatalog {
            stacks: SolutionStack::from_names(&[
                "64bit Amazon Linux 2017.03 v2.5.0 running PHP 7.1",
                "64bit Amazon Linux 2017.09 v2.6.0 running PHP 7.1",
                "64bit Amazon Linux 2017.09 v2.6.0 running PHP 5.4",
                "64bit Amazon Linux 2017.09 v2.6.0 running Python 3.4",
                "64bit Windows Server Core 2016 v1.2.0 running IIS 10.0",
                "64bit Windows Server 2016 v1.2.0 running IIS 10.0",
            ]),
            versions: vec![
                managed(PHP_71_OLD_ARN, "PHP 7.1 running on 64bit Amazon Linux", None),
                managed(PHP_71_ARN, "PHP 7.1 running on 64bit Amazon Linux", None),
                managed(PY_ARN_1, PY_BRANCH, Some(LIFECYCLE_RECOMMENDED)),
                managed(PY_ARN_2, PY_BRANCH, Some(LIFECYCLE_RECOMMENDED)),
                managed(PY_ARN_3, PY_BRANCH, None),
                custom(CUSTOM_1, PLATFORM_STATUS_READY),
                custom(CUSTOM_2, PLATFORM_STATUS_READY),
                custom(CUSTOM_FAILED, "Failed"),
            ],
            descriptions: vec![
                PlatformDescription {
                    platform_arn: PHP_71_OLD_ARN.to_string(),
                    solution_stack_name: Some(
                        "64bit Amazon Linux 2017.03 v2.5.0 running PHP 7.1".to_string(),
                    ),
                    ..Default::default()
                },
                PlatformDescription {
                    platform_arn: PY_ARN_2.to_string(),
                    platform_lifecycle_state: Some(LIFECYCLE_RECOMMENDED.to_string()),
                    solution_stack_name: Some(
                        "64bit Amazon Linux 2023 v4.0.2 running Python 3.11".to_string(),
                    ),
                    ..Default::default()
                },
            ],
            branches: vec![
                PlatformBranch::new(PY_BRANCH, "Python", "Supported"),
                PlatformBranch::new(
                    "Python 2.7 running on 64bit Amazon Linux",
                    "Python",
                    "Retired",
                ),
            ],
        }
    }

    /// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- resolve::tests::test_find_solution_stack_from_string --exact --show-output
    #[tokio::test]
    async fn test_find_solution_stack_from_string() {
        let _ = env_logger::builder().is_test(true).try_init();
        let catalog = fake();

        let cases = vec![
            (
                "64bit Amazon Linux 2017.03 v2.5.0 running PHP 7.1",
                "64bit Amazon Linux 2017.03 v2.5.0 running PHP 7.1",
            ),
            ("PHP 7.1", "64bit Amazon Linux 2017.03 v2.5.0 running PHP 7.1"),
            ("php", "64bit Amazon Linux 2017.09 v2.6.0 running PHP 7.1"),
            ("python-3.4", "64bit Amazon Linux 2017.09 v2.6.0 running Python 3.4"),
            (
                "Microsoft Windows Server 2016 Datacenter",
                "64bit Windows Server 2016 v1.2.0 running IIS 10.0",
            ),
            (
                PHP_71_OLD_ARN,
                "64bit Amazon Linux 2017.03 v2.5.0 running PHP 7.1",
            ),
        ];
        for (input, expected) in cases {
            let p = find_solution_stack_from_string(&catalog, input, false)
                .await
                .unwrap();
            assert_eq!(
                p,
                Platform::SolutionStack(SolutionStack::new(expected)),
                "input {}",
                input
            );
        }

        // custom platforms by name and by ARN
        let p = find_solution_stack_from_string(&catalog, "custom-platform", false)
            .await
            .unwrap();
        assert_eq!(p.display_name(), CUSTOM_2);
        let p = find_solution_stack_from_string(&catalog, CUSTOM_1, false)
            .await
            .unwrap();
        assert_eq!(p.to_create_target(), CreateTarget::PlatformArn(CUSTOM_1.to_string()));

        let err = find_solution_stack_from_string(&catalog, "cobol", false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    /// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- resolve::tests::test_find_newer --exact --show-output
    #[tokio::test]
    async fn test_find_newer() {
        let catalog = fake();

        let p = find_solution_stack_from_string(
            &catalog,
            "64bit Amazon Linux 2017.03 v2.5.0 running PHP 7.1",
            true,
        )
        .await
        .unwrap();
        assert_eq!(
            p.display_name(),
            "64bit Amazon Linux 2017.09 v2.6.0 running PHP 7.1"
        );

        let p = find_solution_stack_from_string(&catalog, PHP_71_OLD_ARN, true)
            .await
            .unwrap();
        assert_eq!(p.display_name(), PHP_71_ARN);

        // the failed 1.1.0 is never picked
        let p = find_solution_stack_from_string(&catalog, CUSTOM_1, true)
            .await
            .unwrap();
        assert_eq!(p.display_name(), CUSTOM_2);
    }

    /// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- resolve::tests::test_find_newer_without_ready_version --exact --show-output
    #[tokio::test]
    async fn test_find_newer_without_ready_version() {
        let _ = env_logger::builder().is_test(true).try_init();

        let ruby_arn =
            "arn:aws:elasticbeanstalk:us-west-2::platform/Ruby 2.6 running on 64bit Amazon Linux/2.11.0";
        let mut catalog = fake();
        let mut failed = managed(ruby_arn, "Ruby 2.6 running on 64bit Amazon Linux", None);
        failed.platform_status = Some(String::from("Failed"));
        catalog.versions.push(failed);

        assert!(get_latest_eb_managed_platform(&catalog, ruby_arn)
            .await
            .unwrap()
            .is_none());

        // no newer managed version, so the solution stacks are searched and nothing matches
        let err = find_solution_stack_from_string(&catalog, ruby_arn, true)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(err.message().contains("does not appear to be valid"));

        // without find-newer the ARN maps to its own solution stack
        catalog.descriptions.push(PlatformDescription {
            platform_arn: ruby_arn.to_string(),
            solution_stack_name: Some(
                "64bit Amazon Linux 2018.03 v2.11.0 running Ruby 2.6 (Puma)".to_string(),
            ),
            ..Default::default()
        });
        let p = find_solution_stack_from_string(&catalog, ruby_arn, false)
            .await
            .unwrap();
        assert_eq!(
            p.display_name(),
            "64bit Amazon Linux 2018.03 v2.11.0 running Ruby 2.6 (Puma)"
        );
    }

    /// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- resolve::tests::test_latest_custom_platform_owner --exact --show-output
    #[tokio::test]
    async fn test_latest_custom_platform_owner() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut catalog = fake();
        let other_account =
            "arn:aws:elasticbeanstalk:us-west-2:999999999999:platform/custom-platform/2.0.0";
        catalog
            .versions
            .push(custom(other_account, PLATFORM_STATUS_READY));

        // 2.0.0 is newer but belongs to another account
        let latest = get_latest_custom_platform_version(&catalog, CUSTOM_1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.platform_arn, CUSTOM_2);

        let latest = get_latest_custom_platform_version(&catalog, other_account)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.platform_arn, other_account);

        let unknown_account =
            "arn:aws:elasticbeanstalk:us-west-2:111111111111:platform/custom-platform/1.0.0";
        assert!(get_latest_custom_platform_version(&catalog, unknown_account)
            .await
            .unwrap()
            .is_none());

        // managed ARNs have no owner account
        assert!(get_latest_custom_platform_version(&catalog, PHP_71_ARN)
            .await
            .unwrap()
            .is_none());
    }

    /// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- resolve::tests::test_platform_branches --exact --show-output
    #[tokio::test]
    async fn test_platform_branches() {
        let catalog = fake();

        assert!(is_platform_branch_name(&catalog, PY_BRANCH).await.unwrap());
        assert!(!is_platform_branch_name(&catalog, "PHP 7.1").await.unwrap());

        let branches = list_nonretired_platform_branches(&catalog).await.unwrap();
        assert_eq!(branches.len(), 1);

        let versions = get_platform_versions_for_branch(&catalog, PY_BRANCH, false)
            .await
            .unwrap();
        assert_eq!(versions.len(), 3);
        assert_eq!(versions[2].platform_arn, PY_ARN_3);

        let preferred = get_preferred_platform_version_for_branch(&catalog, PY_BRANCH)
            .await
            .unwrap();
        assert_eq!(preferred.platform_arn, PY_ARN_2);

        let err = get_preferred_platform_version_for_branch(&catalog, "no such branch")
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        match get_platform_for_platform_string(&catalog, PY_BRANCH)
            .await
            .unwrap()
        {
            Platform::PlatformVersion(pv) => {
                assert_eq!(pv.platform_arn, PY_ARN_2);
                assert!(pv.is_hydrated());
                assert!(pv.is_recommended());
            }
            other => panic!("unexpected {:?}", other),
        }

        let p = get_platform_for_platform_string(&catalog, "PHP 5.4")
            .await
            .unwrap();
        assert_eq!(
            p.display_name(),
            "64bit Amazon Linux 2017.09 v2.6.0 running PHP 5.4"
        );
    }

    /// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- resolve::tests::test_custom_platform_lookup --exact --show-output
    #[tokio::test]
    async fn test_custom_platform_lookup() {
        let catalog = fake();

        let all = list_custom_platform_versions(&catalog, None, None, None)
            .await
            .unwrap();
        let arns: Vec<&str> = all.iter().map(|s| s.platform_arn.as_str()).collect();
        assert_eq!(arns, vec![CUSTOM_FAILED, CUSTOM_2, CUSTOM_1]);

        let ready = list_custom_platform_versions(&catalog, None, None, Some("ready"))
            .await
            .unwrap();
        assert_eq!(ready.len(), 2);

        let managed = list_eb_managed_platform_versions(
            &catalog,
            Some("PHP 7.1 running on 64bit Amazon Linux"),
            None,
            None,
        )
        .await
        .unwrap();
        assert_eq!(managed[0].platform_arn, PHP_71_ARN);

        let platforms = get_platforms(&catalog, None, IGNORED_PLATFORM_STATES)
            .await
            .unwrap();
        assert_eq!(platforms.get("custom-platform"), Some(&"1.0.10".to_string()));
        assert_eq!(
            get_latest_platform_version(&catalog, "custom-platform")
                .await
                .unwrap(),
            Some("1.0.10".to_string())
        );

        assert_eq!(
            version_to_arn(&catalog, Some("custom-platform"), "1.0.0")
                .await
                .unwrap(),
            CUSTOM_1
        );
        assert_eq!(
            version_to_arn(&catalog, None, "custom-platform/1.0.10")
                .await
                .unwrap(),
            CUSTOM_2
        );
        assert_eq!(
            version_to_arn(&catalog, None, CUSTOM_1).await.unwrap(),
            CUSTOM_1
        );
        let err = version_to_arn(&catalog, Some("custom-platform"), "9.9.9")
            .await
            .unwrap_err();
        assert!(matches!(err, crate::errors::Error::InvalidPlatformVersion { .. }));

        assert_eq!(name_to_arn(&catalog, "custom-platform").await.unwrap(), CUSTOM_2);
        assert!(name_to_arn(&catalog, "unknown").await.is_err());
    }
}
