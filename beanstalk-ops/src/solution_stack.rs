use std::{cmp::Ordering, fmt};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{errors::Result, version::Version};

lazy_static! {
    static ref LANGUAGE_VERSION_REGEX: Regex = Regex::new(r"\d+[.\d]*").unwrap();
    static ref OS_BITNESS_REGEX: Regex = Regex::new(r"^\d+").unwrap();
    static ref OS_VERSION_REGEX: Regex = Regex::new(r"\d{4}\.\d{2}").unwrap();
    static ref PLATFORM_VERSION_REGEX: Regex = Regex::new(r"v\d+\.\d+\.\d+").unwrap();
    static ref PLATFORM_CLASS_REGEX: Regex = Regex::new(r"running (\w.*)").unwrap();
    static ref SERVER_REGEX: Regex = Regex::new(r"(.*)\srunning.*").unwrap();
    static ref YEAR_REGEX: Regex = Regex::new(r"\b(\d{4})\b").unwrap();
}

/// Display order of the well-known languages, lower first.
const SOLUTION_STACK_ORDER_INDEX: &[&str] = &[
    "Node.js",
    "PHP",
    "Python",
    "Ruby",
    "Tomcat",
    "IIS",
    "Docker",
    "Multi-container Docker",
    "GlassFish",
    "Go",
    "Java",
    "Corretto (BETA)",
    "Packer",
];

const DEFAULT_LANGUAGE_VERSION: &str = "0.0.1";
const DEFAULT_PLATFORM_VERSION: &str = "v0.0.1";
const DEFAULT_OS_VERSION: &str = "0000.01";

/// Represents a solution stack name as returned by
/// "ListAvailableSolutionStacks".
/// e.g., "64bit Amazon Linux 2017.03 v2.7.2 running Docker 17.03.1-ce"
///
/// Sorting a list of solution stacks puts the preferred one first:
/// language order, then newest language version, then newest platform,
/// then newest OS release.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Hash)]
pub struct SolutionStack {
    pub name: String,
}

/// One entry of a solution stack listing deduplicated by shorthand.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ShorthandGroup {
    pub platform_shorthand: String,
    pub language_name: String,
    pub solution_stack: String,
}

/// One entry of a solution stack listing deduplicated by language name.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct LanguageGroup {
    pub language_name: String,
    pub solution_stack: String,
}

impl SolutionStack {
    pub fn new(name: &str) -> Self {
        Self {
            name: String::from(name),
        }
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Vec<Self> {
        names.iter().map(|n| Self::new(n.as_ref())).collect()
    }

    /// Everything after the word "running", plus a trailing "(BETA)"
    /// when the stack is in beta.
    /// e.g., "Docker 17.03.1-ce" for
    /// "64bit Amazon Linux 2017.03 v2.7.2 running Docker 17.03.1-ce"
    pub fn platform_shorthand(&self) -> String {
        let mut shorthand = match PLATFORM_CLASS_REGEX.captures(&self.name) {
            Some(caps) => caps
                .get(1)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| self.name.clone()),
            None => self.name.clone(),
        };
        if !shorthand.contains("(BETA)") && self.name.contains("(BETA)") {
            shorthand.push_str(" (BETA)");
        }
        shorthand
    }

    /// e.g., "GlassFish" for "GlassFish 4.1 Java 8 (Preconfigured - Docker)"
    pub fn language_name(&self) -> String {
        if self.name.contains("Multi-container Docker") {
            return String::from("Multi-container Docker");
        }
        if self.name.contains("64bit Amazon Linux 2 ") && self.name.contains("running Docker") {
            return String::from("Docker running on 64bit Amazon Linux 2");
        }

        let shorthand = self.platform_shorthand();
        let mut language = shorthand.split(' ').next().unwrap_or_default().to_string();
        if self.name.contains("(BETA)") {
            language.push_str(" (BETA)");
        }
        language
    }

    /// e.g., "17.3.1" for "Docker 17.03.1-ce"
    pub fn language_version(&self) -> Version {
        Version::parse(&self.nth_language_version(0))
    }

    /// e.g., "8" for "GlassFish 4.1 Java 8 (Preconfigured - Docker)"
    pub fn secondary_language_version(&self) -> Version {
        Version::parse(&self.nth_language_version(1))
    }

    /// e.g., "2.7.2" for "64bit Amazon Linux 2017.03 v2.7.2 running ..."
    pub fn platform_version(&self) -> Version {
        let s = PLATFORM_VERSION_REGEX
            .find(&self.name)
            .map(|m| m.as_str())
            .unwrap_or(DEFAULT_PLATFORM_VERSION);
        Version::parse(s)
    }

    /// e.g., "2017.3" for "64bit Amazon Linux 2017.03 v2.7.2 running ..."
    pub fn operating_system_version(&self) -> Version {
        let s = OS_VERSION_REGEX
            .find(&self.name)
            .map(|m| m.as_str())
            .unwrap_or(DEFAULT_OS_VERSION);
        Version::parse(s)
    }

    pub fn os_bitness(&self) -> Option<u32> {
        OS_BITNESS_REGEX
            .find(&self.name)
            .and_then(|m| m.as_str().parse::<u32>().ok())
    }

    /// e.g., "64bit Amazon Linux 2017.03 v2.7.2"
    pub fn server_name(&self) -> Option<String> {
        SERVER_REGEX
            .captures(&self.name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Down-cased, hyphen-separated shorthand.
    /// e.g., "Tomcat 8 Java 8" becomes "tomcat-8-java-8"
    pub fn pythonify(&self) -> String {
        self.platform_shorthand()
            .to_lowercase()
            .replace(' ', "-")
            .replace("---", "-")
    }

    pub fn has_healthd_support(&self) -> bool {
        self.platform_version() >= Version::parse("v2.0.0")
    }

    pub fn has_healthd_group_version_2_support(&self) -> bool {
        self.platform_version() >= Version::parse("v2.0.10")
    }

    pub fn is_preconfigured(&self) -> bool {
        self.name.contains("Preconfigured")
    }

    fn nth_language_version(&self, match_number: usize) -> String {
        let shorthand = self.platform_shorthand();
        let mut seen = 0;
        for word in shorthand.trim().split(' ') {
            if !LANGUAGE_VERSION_REGEX.is_match(word) {
                continue;
            }
            if seen == match_number {
                return word.strip_suffix("-ce").unwrap_or(word).to_string();
            }
            seen += 1;
        }
        String::from(DEFAULT_LANGUAGE_VERSION)
    }

    fn language_rank(&self) -> (usize, String) {
        let language = self.language_name();
        match SOLUTION_STACK_ORDER_INDEX
            .iter()
            .position(|l| *l == language.as_str())
        {
            Some(idx) => (idx, String::new()),
            None => (SOLUTION_STACK_ORDER_INDEX.len(), language),
        }
    }

    fn os_family_rank(&self) -> u8 {
        if self.name.contains("Amazon") {
            0
        } else if self.name.contains("Debian") || self.name.contains("Debain") {
            2
        } else {
            1
        }
    }

    fn variant_rank(&self) -> u8 {
        match self.language_name().as_str() {
            "Ruby" => u8::from(!self.name.contains("Passenger")),
            "IIS" => u8::from(self.name.contains("Windows Server Core")),
            _ => 0,
        }
    }
}

impl fmt::Display for SolutionStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Ord for SolutionStack {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, b) = (self, other);
        a.language_rank()
            .cmp(&b.language_rank())
            .then_with(|| b.language_version().cmp(&a.language_version()))
            .then_with(|| a.is_preconfigured().cmp(&b.is_preconfigured()))
            .then_with(|| match a.language_name().as_str() {
                "Tomcat" | "GlassFish" => b
                    .secondary_language_version()
                    .cmp(&a.secondary_language_version()),
                _ => Ordering::Equal,
            })
            .then_with(|| b.platform_version().cmp(&a.platform_version()))
            .then_with(|| a.os_family_rank().cmp(&b.os_family_rank()))
            .then_with(|| {
                b.operating_system_version()
                    .cmp(&a.operating_system_version())
            })
            .then_with(|| b.os_bitness().cmp(&a.os_bitness()))
            .then_with(|| a.variant_rank().cmp(&b.variant_rank()))
            .then_with(|| a.name.cmp(&b.name))
    }
}

impl PartialOrd for SolutionStack {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Keeps the first solution stack for each shorthand, in encounter order.
/// Set "language_name" to only group the stacks of that language.
pub fn group_by_platform_shorthand(
    solution_stacks: &[SolutionStack],
    language_name: Option<&str>,
) -> Vec<ShorthandGroup> {
    let mut groups: Vec<ShorthandGroup> = Vec::new();
    for ss in solution_stacks.iter() {
        let language = ss.language_name();
        if let Some(l) = language_name {
            if language != l {
                continue;
            }
        }
        let shorthand = ss.platform_shorthand();
        if groups.iter().any(|g| g.platform_shorthand == shorthand) {
            continue;
        }
        groups.push(ShorthandGroup {
            platform_shorthand: shorthand,
            language_name: language,
            solution_stack: ss.name.clone(),
        });
    }
    groups
}

/// Keeps the first solution stack for each language name, in encounter order.
pub fn group_by_language_name(solution_stacks: &[SolutionStack]) -> Vec<LanguageGroup> {
    let mut groups: Vec<LanguageGroup> = Vec::new();
    for ss in solution_stacks.iter() {
        let language = ss.language_name();
        if groups.iter().any(|g| g.language_name == language) {
            continue;
        }
        groups.push(LanguageGroup {
            language_name: language,
            solution_stack: ss.name.clone(),
        });
    }
    groups
}

pub fn match_with_complete_solution_string(
    solution_stacks: &[SolutionStack],
    complete_name: &str,
) -> Option<SolutionStack> {
    let needle = complete_name.to_lowercase();
    solution_stacks
        .iter()
        .find(|ss| ss.name.to_lowercase() == needle)
        .cloned()
}

/// e.g., "PHP 7.0", "Python 3.4"
pub fn match_with_solution_string_shorthand(
    solution_stacks: &[SolutionStack],
    platform_shorthand: &str,
) -> Option<SolutionStack> {
    let needle = platform_shorthand.to_lowercase();
    solution_stacks
        .iter()
        .find(|ss| ss.platform_shorthand().to_lowercase() == needle)
        .cloned()
}

/// Returns the preferred (latest) stack of the language.
/// e.g., "Ruby", "Node.js"
pub fn match_with_solution_string_language_name(
    solution_stacks: &[SolutionStack],
    language_name: &str,
) -> Option<SolutionStack> {
    let needle = language_name.to_lowercase();
    let mut sorted = solution_stacks.to_vec();
    sorted.sort();
    sorted
        .into_iter()
        .find(|ss| ss.language_name().to_lowercase() == needle)
}

/// e.g., "ruby-2.0-(passenger-standalone)"
pub fn match_with_pythonified_solution_string(
    solution_stacks: &[SolutionStack],
    pythonified: &str,
) -> Option<SolutionStack> {
    let needle = pythonified.to_lowercase();
    solution_stacks
        .iter()
        .find(|ss| ss.pythonify() == needle)
        .cloned()
}

/// Matches a Windows product name against the IIS stacks.
/// e.g., "Microsoft Windows Server 2016 Datacenter"
/// Full Windows Server stacks win over "Windows Server Core" ones.
pub fn match_with_windows_server_version_string(
    solution_stacks: &[SolutionStack],
    windows_version: &str,
) -> Option<SolutionStack> {
    if !windows_version.contains("Windows Server") {
        return None;
    }
    let year = YEAR_REGEX
        .captures(windows_version)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());
    let wants_r2 = windows_version.contains(" R2");

    let mut candidates: Vec<SolutionStack> = solution_stacks
        .iter()
        .filter(|ss| ss.name.contains("Windows Server"))
        .filter(|ss| match &year {
            Some(y) => ss.name.contains(y.as_str()) && ss.name.contains(" R2") == wants_r2,
            None => true,
        })
        .cloned()
        .collect();
    candidates.sort_by(|a, b| {
        a.name
            .contains("Windows Server Core")
            .cmp(&b.name.contains("Windows Server Core"))
            .then_with(|| a.cmp(b))
    });
    candidates.into_iter().next()
}

/// Picks a solution stack for the chosen language.
/// The chooser is only consulted when the language has more than one
/// shorthand, and returns an index into the shorthands it is given.
pub fn resolve_language_version<F>(
    language_name: &str,
    solution_stacks: &[SolutionStack],
    chooser: F,
) -> Result<Option<String>>
where
    F: FnOnce(&[String]) -> Result<usize>,
{
    let groups = group_by_platform_shorthand(solution_stacks, Some(language_name));
    if groups.is_empty() {
        return Ok(None);
    }
    if groups.len() == 1 {
        return Ok(Some(groups[0].solution_stack.clone()));
    }

    let shorthands: Vec<String> = groups.iter().map(|g| g.platform_shorthand.clone()).collect();
    let idx = chooser(&shorthands)?;
    Ok(groups.get(idx).map(|g| g.solution_stack.clone()))
}

#[cfg(test)]
fn stacks(names: &[&str]) -> Vec<SolutionStack> {
    SolutionStack::from_names(names)
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- solution_stack::test_parsing --exact --show-output
#[test]
fn test_parsing() {
    let _ = env_logger::builder().is_test(true).try_init();

    // (name, shorthand, language name, language version, platform version, os version)
    let cases = [
        (
            "64bit Amazon Linux 2017.09 v4.4.0 running Node.js",
            "Node.js",
            "Node.js",
            "0.0.1",
            "4.4.0",
            "2017.9",
        ),
        (
            "64bit Amazon Linux running PHP 5.3",
            "PHP 5.3",
            "PHP",
            "5.3",
            "0.0.1",
            "0.1",
        ),
        (
            "64bit Amazon Linux 2014.03 v1.1.0 running Ruby 2.0 (Passenger Standalone)",
            "Ruby 2.0 (Passenger Standalone)",
            "Ruby",
            "2.0",
            "1.1.0",
            "2014.3",
        ),
        (
            "64bit Windows Server Core 2016 v1.2.0 running IIS 10.0",
            "IIS 10.0",
            "IIS",
            "10.0",
            "1.2.0",
            "0.1",
        ),
        (
            "64bit Amazon Linux 2017.09 v2.8.0 running Docker 17.06.2-ce",
            "Docker 17.06.2-ce",
            "Docker",
            "17.6.2",
            "2.8.0",
            "2017.9",
        ),
        (
            "64bit Amazon Linux 2017.03 v2.7.5 running Multi-container Docker 17.03.2-ce (Generic)",
            "Multi-container Docker 17.03.2-ce (Generic)",
            "Multi-container Docker",
            "17.3.2",
            "2.7.5",
            "2017.3",
        ),
        (
            "64bit Debian jessie v2.8.0 running GlassFish 4.1 Java 8 (Preconfigured - Docker)",
            "GlassFish 4.1 Java 8 (Preconfigured - Docker)",
            "GlassFish",
            "4.1",
            "2.8.0",
            "0.1",
        ),
        (
            "64bit Amazon Linux 2 v0.0.7 running Corretto 8 (BETA)",
            "Corretto 8 (BETA)",
            "Corretto (BETA)",
            "8",
            "0.0.7",
            "0.1",
        ),
    ];
    for (name, shorthand, language, language_version, platform_version, os_version) in cases {
        let ss = SolutionStack::new(name);
        assert_eq!(ss.platform_shorthand(), shorthand, "{name}");
        assert_eq!(ss.language_name(), language, "{name}");
        assert_eq!(ss.language_version().to_string(), language_version, "{name}");
        assert_eq!(ss.platform_version().to_string(), platform_version, "{name}");
        assert_eq!(ss.operating_system_version().to_string(), os_version, "{name}");
    }

    let ss = SolutionStack::new(
        "64bit Debian jessie v2.8.0 running GlassFish 4.1 Java 8 (Preconfigured - Docker)",
    );
    assert_eq!(ss.secondary_language_version().to_string(), "8");
    assert!(ss.is_preconfigured());

    let ss = SolutionStack::new("32bit Amazon Linux 2014.03 v1.1.0 running Python 2.7");
    assert_eq!(ss.os_bitness(), Some(32));
    assert_eq!(
        ss.server_name().unwrap(),
        "32bit Amazon Linux 2014.03 v1.1.0"
    );

    let ss = SolutionStack::new("64bit Amazon Linux 2017.09 v2.7.0 running Tomcat 8 Java 8");
    assert_eq!(ss.pythonify(), "tomcat-8-java-8");
    let ss = SolutionStack::new(
        "64bit Amazon Linux 2014.03 v1.1.0 running Ruby 2.0 (Passenger Standalone)",
    );
    assert_eq!(ss.pythonify(), "ruby-2.0-(passenger-standalone)");
    let ss = SolutionStack::new(
        "64bit Debian jessie v2.8.0 running Go 1.4 (Preconfigured - Docker)",
    );
    assert_eq!(ss.pythonify(), "go-1.4-(preconfigured-docker)");

    let ss = SolutionStack::new("64bit Amazon Linux 2 v3.4.1 running Docker");
    assert_eq!(ss.language_name(), "Docker running on 64bit Amazon Linux 2");
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- solution_stack::test_healthd_support --exact --show-output
#[test]
fn test_healthd_support() {
    let cases = [
        ("64bit Amazon Linux 2017.09 v4.4.0 running Node.js", true, true),
        ("64bit Amazon Linux running PHP 5.3", false, false),
        ("32bit Amazon Linux 2014.03 v1.1.0 running Python 2.7", false, false),
        ("64bit Windows Server Core 2016 v1.2.0 running IIS 10.0", false, false),
        ("64bit Amazon Linux 2015.09 v2.0.6 running Docker 1.7.1", true, false),
    ];
    for (name, v1, v2) in cases {
        let ss = SolutionStack::new(name);
        assert_eq!(ss.has_healthd_support(), v1, "{name}");
        assert_eq!(ss.has_healthd_group_version_2_support(), v2, "{name}");
    }
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- solution_stack::test_sorting --exact --show-output
#[test]
fn test_sorting() {
    let mut list = stacks(&[
        "64bit Amazon Linux 2014.03 v1.1.0 running PHP 5.4",
        "32bit Amazon Linux 2014.09 v1.2.1 running Node.js",
        "64bit Amazon Linux 2017.03 v2.4.4 running PHP 7.0",
        "64bit Amazon Linux 2014.09 v1.2.1 running Node.js",
        "64bit Amazon Linux 2017.09 v4.4.0 running Node.js",
        "64bit Amazon Linux 2017.09 v2.6.0 running PHP 7.0",
        "64bit Debian jessie v2.8.0 running Python 3.4 (Preconfigured - Docker)",
        "64bit Amazon Linux 2017.09 v2.6.0 running Python 3.4",
        "64bit Amazon Linux 2017.09 v2.6.1 running Ruby 2.4 (Puma)",
        "64bit Amazon Linux 2017.09 v2.6.1 running Ruby 2.4 (Passenger Standalone)",
        "64bit Amazon Linux 2017.09 v2.7.0 running Tomcat 8 Java 7",
        "64bit Amazon Linux 2017.09 v2.7.0 running Tomcat 8 Java 8",
        "64bit Windows Server Core 2016 v1.2.0 running IIS 10.0",
        "64bit Windows Server 2016 v1.2.0 running IIS 10.0",
        "64bit Amazon Linux 2 v0.1.0 running Brainfuck 1.0",
    ]);
    list.sort();

    let sorted: Vec<&str> = list.iter().map(|ss| ss.name.as_str()).collect();
    assert_eq!(
        sorted,
        vec![
            "64bit Amazon Linux 2017.09 v4.4.0 running Node.js",
            "64bit Amazon Linux 2014.09 v1.2.1 running Node.js",
            "32bit Amazon Linux 2014.09 v1.2.1 running Node.js",
            "64bit Amazon Linux 2017.09 v2.6.0 running PHP 7.0",
            "64bit Amazon Linux 2017.03 v2.4.4 running PHP 7.0",
            "64bit Amazon Linux 2014.03 v1.1.0 running PHP 5.4",
            "64bit Amazon Linux 2017.09 v2.6.0 running Python 3.4",
            "64bit Debian jessie v2.8.0 running Python 3.4 (Preconfigured - Docker)",
            "64bit Amazon Linux 2017.09 v2.6.1 running Ruby 2.4 (Passenger Standalone)",
            "64bit Amazon Linux 2017.09 v2.6.1 running Ruby 2.4 (Puma)",
            "64bit Amazon Linux 2017.09 v2.7.0 running Tomcat 8 Java 8",
            "64bit Amazon Linux 2017.09 v2.7.0 running Tomcat 8 Java 7",
            "64bit Windows Server 2016 v1.2.0 running IIS 10.0",
            "64bit Windows Server Core 2016 v1.2.0 running IIS 10.0",
            "64bit Amazon Linux 2 v0.1.0 running Brainfuck 1.0",
        ]
    );
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- solution_stack::test_grouping --exact --show-output
#[test]
fn test_grouping() {
    let list = stacks(&[
        "64bit Amazon Linux 2017.09 v4.4.0 running Node.js",
        "64bit Amazon Linux 2017.09 v2.6.0 running PHP 5.4",
        "64bit Amazon Linux 2017.09 v2.6.0 running PHP 7.1",
        "64bit Amazon Linux 2017.03 v2.5.0 running PHP 7.1",
        "64bit Amazon Linux 2017.03 v2.4.4 running PHP 5.4",
        "64bit Windows Server Core 2016 v1.2.0 running IIS 10.0",
        "64bit Windows Server 2016 v1.2.0 running IIS 10.0",
        "64bit Amazon Linux 2 v0.0.7 running Corretto 8 (BETA)",
    ]);

    let by_shorthand = group_by_platform_shorthand(&list, None);
    let shorthands: Vec<&str> = by_shorthand
        .iter()
        .map(|g| g.platform_shorthand.as_str())
        .collect();
    assert_eq!(
        shorthands,
        vec!["Node.js", "PHP 5.4", "PHP 7.1", "IIS 10.0", "Corretto 8 (BETA)"]
    );
    assert_eq!(
        by_shorthand[2].solution_stack,
        "64bit Amazon Linux 2017.09 v2.6.0 running PHP 7.1"
    );

    let php_only = group_by_platform_shorthand(&list, Some("PHP"));
    assert_eq!(php_only.len(), 2);

    let by_language = group_by_language_name(&list);
    let languages: Vec<&str> = by_language.iter().map(|g| g.language_name.as_str()).collect();
    assert_eq!(languages, vec!["Node.js", "PHP", "IIS", "Corretto (BETA)"]);
    assert_eq!(
        by_language[2].solution_stack,
        "64bit Windows Server Core 2016 v1.2.0 running IIS 10.0"
    );

    let picked = resolve_language_version("PHP", &list, |choices| {
        assert_eq!(choices, &["PHP 5.4".to_string(), "PHP 7.1".to_string()]);
        Ok(1)
    })
    .unwrap();
    assert_eq!(
        picked.unwrap(),
        "64bit Amazon Linux 2017.09 v2.6.0 running PHP 7.1"
    );

    let picked = resolve_language_version("Node.js", &list, |_| {
        panic!("single shorthand must not prompt")
    })
    .unwrap();
    assert_eq!(
        picked.unwrap(),
        "64bit Amazon Linux 2017.09 v4.4.0 running Node.js"
    );
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- solution_stack::test_matchers --exact --show-output
#[test]
fn test_matchers() {
    let list = stacks(&[
        "64bit Amazon Linux 2017.03 v2.5.0 running PHP 7.1",
        "64bit Amazon Linux 2017.09 v2.6.0 running PHP 7.1",
        "64bit Amazon Linux 2017.09 v2.6.1 running Ruby 2.4 (Passenger Standalone)",
        "64bit Amazon Linux 2017.03 v2.7.5 running Multi-container Docker 17.03.2-ce (Generic)",
    ]);

    assert_eq!(
        match_with_complete_solution_string(
            &list,
            "64BIT amazon linux 2017.03 v2.5.0 running php 7.1"
        )
        .unwrap()
        .name,
        "64bit Amazon Linux 2017.03 v2.5.0 running PHP 7.1"
    );
    assert!(match_with_complete_solution_string(&list, "PHP 7.1").is_none());

    // first listed match, not the newest
    assert_eq!(
        match_with_solution_string_shorthand(&list, "php 7.1")
            .unwrap()
            .name,
        "64bit Amazon Linux 2017.03 v2.5.0 running PHP 7.1"
    );

    // newest of the language
    assert_eq!(
        match_with_solution_string_language_name(&list, "php")
            .unwrap()
            .name,
        "64bit Amazon Linux 2017.09 v2.6.0 running PHP 7.1"
    );
    assert_eq!(
        match_with_solution_string_language_name(&list, "Multi-container Docker")
            .unwrap()
            .name,
        "64bit Amazon Linux 2017.03 v2.7.5 running Multi-container Docker 17.03.2-ce (Generic)"
    );

    assert_eq!(
        match_with_pythonified_solution_string(&list, "ruby-2.4-(passenger-standalone)")
            .unwrap()
            .name,
        "64bit Amazon Linux 2017.09 v2.6.1 running Ruby 2.4 (Passenger Standalone)"
    );
    assert_eq!(
        match_with_pythonified_solution_string(
            &list,
            "multi-container-docker-17.03.2-ce-(generic)"
        )
        .unwrap()
        .name,
        "64bit Amazon Linux 2017.03 v2.7.5 running Multi-container Docker 17.03.2-ce (Generic)"
    );
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- solution_stack::test_sorting_debian_spellings --exact --show-output
#[test]
fn test_sorting_debian_spellings() {
    let mut list = stacks(&[
        "64bit Debian jessie v2.8.0 running Python 3.4 (Preconfigured - Docker)",
        "64bit Debain jessie v2.8.0 running Python 3.4 (Preconfigured - Docker)",
        "64bit Ubuntu xenial v2.8.0 running Python 3.4 (Preconfigured - Docker)",
        "64bit Amazon Linux 2017.09 v2.8.0 running Python 3.4 (Preconfigured - Docker)",
    ]);
    list.sort();

    let sorted: Vec<&str> = list.iter().map(|ss| ss.name.as_str()).collect();
    assert_eq!(
        sorted,
        vec![
            "64bit Amazon Linux 2017.09 v2.8.0 running Python 3.4 (Preconfigured - Docker)",
            "64bit Ubuntu xenial v2.8.0 running Python 3.4 (Preconfigured - Docker)",
            "64bit Debain jessie v2.8.0 running Python 3.4 (Preconfigured - Docker)",
            "64bit Debian jessie v2.8.0 running Python 3.4 (Preconfigured - Docker)",
        ]
    );
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- solution_stack::test_windows_server_matcher --exact --show-output
#[test]
fn test_windows_server_matcher() {
    let list = stacks(&[
        "64bit Windows Server 2025 v2.18.0 running IIS 10.0",
        "64bit Windows Server Core 2022 v2.18.0 running IIS 10.0",
        "64bit Windows Server 2016 v2.18.0 running IIS 10.0",
        "64bit Windows Server Core 2016 v2.18.0 running IIS 10.0",
        "64bit Windows Server 2019 v2.18.0 running IIS 10.0",
        "64bit Amazon Linux 2017.09 v4.4.0 running Node.js",
    ]);

    assert_eq!(
        match_with_windows_server_version_string(
            &list,
            "Microsoft Windows Server 2016 Datacenter"
        )
        .unwrap()
        .name,
        "64bit Windows Server 2016 v2.18.0 running IIS 10.0"
    );
    assert_eq!(
        match_with_windows_server_version_string(&list, "Windows Server 2022")
            .unwrap()
            .name,
        "64bit Windows Server Core 2022 v2.18.0 running IIS 10.0"
    );
    assert!(match_with_windows_server_version_string(&list, "Windows Server")
        .unwrap()
        .name
        .contains("Windows Server"));
    assert!(match_with_windows_server_version_string(&list, "Amazon Linux").is_none());

    let list = stacks(&[
        "64bit Windows Server 2012 R2 v2.18.0 running IIS 8.5",
        "64bit Windows Server Core 2012 R2 v2.18.0 running IIS 8.5",
        "64bit Windows Server 2012 v2.18.0 running IIS 8",
    ]);
    assert_eq!(
        match_with_windows_server_version_string(
            &list,
            "Microsoft Windows Server 2012 R2 Datacenter"
        )
        .unwrap()
        .name,
        "64bit Windows Server 2012 R2 v2.18.0 running IIS 8.5"
    );
    assert_eq!(
        match_with_windows_server_version_string(&list, "Microsoft Windows Server 2012 Datacenter")
            .unwrap()
            .name,
        "64bit Windows Server 2012 v2.18.0 running IIS 8"
    );
    assert!(match_with_windows_server_version_string(
        &list[..1],
        "Microsoft Windows Server 2012 Datacenter"
    )
    .is_none());
    assert!(match_with_windows_server_version_string(
        &[],
        "Microsoft Windows Server 2016 Datacenter"
    )
    .is_none());
}
