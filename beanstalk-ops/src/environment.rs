use std::{
    collections::BTreeMap,
    fmt,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{
    Error::{Other, Validation},
    Result,
};

pub const NAMESPACE_ASG: &str = "aws:autoscaling:asg";
pub const NAMESPACE_ENVIRONMENT: &str = "aws:elasticbeanstalk:environment";
pub const NAMESPACE_APPLICATION_ENVIRONMENT: &str = "aws:elasticbeanstalk:application:environment";
pub const NAMESPACE_ROLLING_UPDATES: &str = "aws:autoscaling:updatepolicy:rollingupdate";

lazy_static! {
    static ref ENV_VAR_REGEX: Regex = Regex::new(r#"^[\w\\_.:/+@-][^="]*=.*$"#).unwrap();
}

/// Environment status.
/// ref. https://docs.aws.amazon.com/elasticbeanstalk/latest/api/API_EnvironmentDescription.html
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Hash)]
pub enum Status {
    Launching,
    Updating,
    Ready,
    Terminating,
    Terminated,
    Other(String),
}

impl Default for Status {
    fn default() -> Self {
        Status::Other(String::new())
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        match s {
            "Launching" => Status::Launching,
            "Updating" => Status::Updating,
            "Ready" => Status::Ready,
            "Terminating" => Status::Terminating,
            "Terminated" => Status::Terminated,
            other => Status::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Launching => write!(f, "Launching"),
            Status::Updating => write!(f, "Updating"),
            Status::Ready => write!(f, "Ready"),
            Status::Terminating => write!(f, "Terminating"),
            Status::Terminated => write!(f, "Terminated"),
            Status::Other(s) => write!(f, "{}", s),
        }
    }
}

impl Status {
    /// True once the environment stopped changing.
    pub fn is_settled(&self) -> bool {
        matches!(self, Status::Ready | Status::Terminated)
    }
}

/// Tracks the statuses seen while polling an environment.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct StatusWatch {
    environment_name: String,
    desired: Status,
    initial: Option<Status>,
    left_initial: bool,
}

impl StatusWatch {
    pub fn new(environment_name: &str, desired: Status) -> Self {
        Self {
            environment_name: String::from(environment_name),
            desired,
            initial: None,
            left_initial: false,
        }
    }

    /// Returns true once the desired status is reached.
    /// "Terminated" fails the watch when another status was desired, unless the
    /// environment has been terminated since polling began and not changed yet
    /// (e.g., right after a rebuild was requested).
    pub fn observe(&mut self, current: &Status) -> Result<bool> {
        match &self.initial {
            None => self.initial = Some(current.clone()),
            Some(initial) => {
                if initial != current {
                    self.left_initial = true;
                }
            }
        }

        if current == &self.desired {
            return Ok(true);
        }
        if current == &Status::Terminated {
            let still_initial =
                !self.left_initial && self.initial.as_ref() == Some(&Status::Terminated);
            if !still_initial {
                return Err(Other {
                    message: format!("environment '{}' terminated", self.environment_name),
                    is_retryable: false,
                });
            }
        }
        Ok(false)
    }
}

/// Environment tier.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Copy)]
pub enum Tier {
    WebServer,
    Worker,
}

impl Default for Tier {
    fn default() -> Self {
        Tier::WebServer
    }
}

impl Tier {
    /// Returns "(name, type)" for the "EnvironmentTier" parameter.
    pub fn name_and_type(&self) -> (&'static str, &'static str) {
        match self {
            Tier::WebServer => ("WebServer", "Standard"),
            Tier::Worker => ("Worker", "SQS/HTTP"),
        }
    }
}

impl FromStr for Tier {
    type Err = crate::errors::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "webserver" | "web" => Ok(Tier::WebServer),
            "worker" => Ok(Tier::Worker),
            _ => Err(Validation {
                message: format!("unknown tier '{}' (expected 'webserver' or 'worker')", s),
            }),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name_and_type().0)
    }
}

#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct Environment {
    pub environment_name: String,
    pub environment_id: String,
    pub application_name: String,
    pub status: Status,
    #[serde(default)]
    pub health: Option<String>,
    #[serde(default)]
    pub health_status: Option<String>,
    #[serde(default)]
    pub version_label: Option<String>,
    #[serde(default)]
    pub solution_stack_name: Option<String>,
    #[serde(default)]
    pub platform_arn: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub cname: Option<String>,
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub date_updated: Option<String>,
    /// "date_updated" in milliseconds since the epoch, for ordering.
    #[serde(default)]
    pub date_updated_millis: i64,
}

/// Names of the live environments other than "exclude", sorted.
pub fn other_live_environments(envs: &[Environment], exclude: &str) -> Vec<String> {
    let mut names: Vec<String> = envs
        .iter()
        .filter(|e| e.environment_name != exclude)
        .filter(|e| !matches!(e.status, Status::Terminated | Status::Terminating))
        .map(|e| e.environment_name.clone())
        .collect();
    names.sort();
    names.dedup();
    names
}

/// Names of the live environments running the version.
pub fn environments_using_version(envs: &[Environment], version_label: &str) -> Vec<String> {
    envs.iter()
        .filter(|e| e.status != Status::Terminated)
        .filter(|e| e.version_label.as_deref() == Some(version_label))
        .map(|e| e.environment_name.clone())
        .collect()
}

/// Environment event.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct Event {
    /// RFC 3339 timestamp, for display only.
    pub event_date: String,
    /// Milliseconds since the epoch, for ordering.
    #[serde(default)]
    pub event_millis: i64,
    pub severity: String,
    pub message: String,
    #[serde(default)]
    pub environment_name: Option<String>,
    #[serde(default)]
    pub platform_arn: Option<String>,
}

/// e.g., "2023-09-01T10:00:00Z INFO    createEnvironment is starting."
pub fn format_event(event: &Event) -> String {
    format!("{} {:<7} {}", event.event_date, event.severity, event.message)
}

/// Remembers the newest event handed out so that overlapping
/// "DescribeEvents" pages print each event once.
#[derive(Debug, Eq, PartialEq, Clone, Default)]
pub struct EventCursor {
    last_millis: Option<i64>,
}

impl EventCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes events newest first (as described) and returns the unseen ones, oldest first.
    /// Events sharing a timestamp within one page are all kept.
    pub fn advance<'a>(&mut self, newest_first: &'a [Event]) -> Vec<&'a Event> {
        let threshold = self.last_millis;
        let unseen: Vec<&Event> = newest_first
            .iter()
            .rev()
            .filter(|ev| match threshold {
                Some(last) => ev.event_millis > last,
                None => true,
            })
            .collect();
        if let Some(newest) = unseen.iter().map(|ev| ev.event_millis).max() {
            self.last_millis = Some(newest);
        }
        unseen
    }
}

#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct InstancesHealth {
    pub no_data: i32,
    pub unknown: i32,
    pub pending: i32,
    pub ok: i32,
    pub info: i32,
    pub warning: i32,
    pub degraded: i32,
    pub severe: i32,
}

#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct EnvironmentHealth {
    pub environment_name: String,
    #[serde(default)]
    pub health_status: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// "Green", "Yellow", "Red", or "Grey".
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub causes: Vec<String>,
    #[serde(default)]
    pub instances_health: Option<InstancesHealth>,
}

/// Terminal color for an environment health color.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum HealthColor {
    Green,
    Yellow,
    Red,
    Grey,
}

pub fn health_color(health: &str) -> HealthColor {
    match health {
        "Green" => HealthColor::Green,
        "Yellow" => HealthColor::Yellow,
        "Red" => HealthColor::Red,
        _ => HealthColor::Grey,
    }
}

/// "namespace:OptionName=value" setting.
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct OptionSetting {
    pub namespace: String,
    pub option_name: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl OptionSetting {
    pub fn new(namespace: &str, option_name: &str, value: &str) -> Self {
        Self {
            namespace: String::from(namespace),
            option_name: String::from(option_name),
            value: Some(String::from(value)),
        }
    }
}

impl fmt::Display for OptionSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}={}",
            self.namespace,
            self.option_name,
            self.value.as_deref().unwrap_or("")
        )
    }
}

/// Parses "namespace:OptionName=value".
/// The namespace itself may contain ":" (e.g., "aws:autoscaling:asg"),
/// so the option name starts after the last ":" before "=".
pub fn parse_option_setting(s: &str) -> Result<OptionSetting> {
    let (key, value) = s.split_once('=').ok_or_else(|| Validation {
        message: format!("'{}' is not in the format 'namespace:OptionName=value'", s),
    })?;
    let (namespace, option_name) = key.rsplit_once(':').ok_or_else(|| Validation {
        message: format!("'{}' is missing the namespace", s),
    })?;
    if namespace.trim().is_empty() || option_name.trim().is_empty() {
        return Err(Validation {
            message: format!("'{}' has an empty namespace or option name", s),
        });
    }
    Ok(OptionSetting::new(
        namespace.trim(),
        option_name.trim(),
        value.trim(),
    ))
}

/// Pins the auto scaling group to exactly "n" instances.
pub fn scale_option_settings(n: u32) -> Vec<OptionSetting> {
    vec![
        OptionSetting::new(NAMESPACE_ASG, "MinSize", &n.to_string()),
        OptionSetting::new(NAMESPACE_ASG, "MaxSize", &n.to_string()),
    ]
}

pub fn get_option_setting<'a>(
    settings: &'a [OptionSetting],
    namespace: &str,
    option_name: &str,
) -> Option<&'a str> {
    settings
        .iter()
        .find(|s| s.namespace == namespace && s.option_name == option_name)
        .and_then(|s| s.value.as_deref())
}

/// Parses "KEY=value" environment variables into settings to apply and
/// settings to remove. Each input may hold several comma-separated pairs.
/// Surrounding double quotes are stripped, and an empty value removes the variable.
pub fn parse_environment_variables(inputs: &[String]) -> Result<(Vec<OptionSetting>, Vec<OptionSetting>)> {
    let mut to_set: BTreeMap<String, String> = BTreeMap::new();
    let mut to_remove: BTreeMap<String, ()> = BTreeMap::new();
    for input in inputs.iter() {
        for pair in input.split(',') {
            let (key, value) = pair.split_once('=').ok_or_else(|| Validation {
                message: format!("'{}' is not in the format 'KEY=value'", pair),
            })?;
            let key = key.trim().trim_matches('"');
            let value = value.trim();
            let value = value.strip_prefix('"').unwrap_or(value);
            let value = value.strip_suffix('"').unwrap_or(value);
            if key.is_empty() || !ENV_VAR_REGEX.is_match(&format!("{}={}", key, value)) {
                return Err(Validation {
                    message: format!("'{}' is not in the format 'KEY=value'", pair),
                });
            }

            if value.is_empty() {
                to_set.remove(key);
                to_remove.insert(key.to_string(), ());
            } else {
                to_remove.remove(key);
                to_set.insert(key.to_string(), value.to_string());
            }
        }
    }

    let set = to_set
        .iter()
        .map(|(k, v)| OptionSetting::new(NAMESPACE_APPLICATION_ENVIRONMENT, k, v))
        .collect();
    let remove = to_remove
        .keys()
        .map(|k| OptionSetting {
            namespace: String::from(NAMESPACE_APPLICATION_ENVIRONMENT),
            option_name: k.clone(),
            value: None,
        })
        .collect();
    Ok((set, remove))
}

/// Environment variables among the settings, sorted by name.
pub fn environment_variables(settings: &[OptionSetting]) -> BTreeMap<String, String> {
    settings
        .iter()
        .filter(|s| s.namespace == NAMESPACE_APPLICATION_ENVIRONMENT)
        .map(|s| (s.option_name.clone(), s.value.clone().unwrap_or_default()))
        .collect()
}

/// Settings that turn on rolling updates before a platform upgrade.
/// Nothing is added for single instance environments, when rolling updates
/// are already on, or when "no_roll" is set. Web servers roll by health,
/// workers by time.
pub fn upgrade_option_settings(
    current: &[OptionSetting],
    webserver: bool,
    no_roll: bool,
) -> Vec<OptionSetting> {
    let rolling_enabled =
        get_option_setting(current, NAMESPACE_ROLLING_UPDATES, "RollingUpdateEnabled") == Some("true");
    if no_roll || is_single_instance(current) || rolling_enabled {
        return Vec::new();
    }
    let roll_type = if webserver { "Health" } else { "Time" };
    vec![
        OptionSetting::new(NAMESPACE_ROLLING_UPDATES, "RollingUpdateEnabled", "true"),
        OptionSetting::new(NAMESPACE_ROLLING_UPDATES, "RollingUpdateType", roll_type),
    ]
}

/// Single instance environments cannot be scaled.
pub fn is_single_instance(settings: &[OptionSetting]) -> bool {
    settings.iter().any(|s| {
        s.namespace == NAMESPACE_ENVIRONMENT
            && s.option_name == "EnvironmentType"
            && s.value.as_deref() == Some("SingleInstance")
    })
}

#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct ApplicationVersion {
    pub application_name: String,
    pub version_label: String,
    #[serde(default)]
    pub s3_bucket: Option<String>,
    #[serde(default)]
    pub s3_key: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_created_millis: i64,
}

/// One entry of "RetrieveEnvironmentInfo".
#[derive(Debug, Serialize, Deserialize, Eq, PartialEq, Clone, Default)]
#[serde(rename_all = "snake_case")]
pub struct InstanceLogInfo {
    pub ec2_instance_id: String,
    /// Pre-signed S3 URL of the log.
    pub message: String,
    pub sample_timestamp: String,
    #[serde(default)]
    pub sample_millis: i64,
}

/// Milliseconds since the epoch (negative before it).
pub fn unix_millis(t: SystemTime) -> i64 {
    match t.duration_since(UNIX_EPOCH) {
        Ok(d) => d.as_millis() as i64,
        Err(e) => -(e.duration().as_millis() as i64),
    }
}

/// Keeps the newest entry per instance, sampled at or after the request time.
pub fn latest_log_info_per_instance(
    infos: &[InstanceLogInfo],
    since: SystemTime,
) -> Vec<InstanceLogInfo> {
    let since_millis = unix_millis(since);
    let mut latest: BTreeMap<String, InstanceLogInfo> = BTreeMap::new();
    for info in infos.iter() {
        if info.sample_millis < since_millis {
            continue;
        }
        match latest.get(&info.ec2_instance_id) {
            Some(existing) if existing.sample_millis >= info.sample_millis => {}
            _ => {
                latest.insert(info.ec2_instance_id.clone(), info.clone());
            }
        }
    }
    latest.into_values().collect()
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- environment::test_option_settings --exact --show-output
#[test]
fn test_option_settings() {
    let _ = env_logger::builder().is_test(true).try_init();

    let s = parse_option_setting("aws:autoscaling:asg:MinSize=2").unwrap();
    assert_eq!(s.namespace, "aws:autoscaling:asg");
    assert_eq!(s.option_name, "MinSize");
    assert_eq!(s.value.as_deref(), Some("2"));
    assert_eq!(s.to_string(), "aws:autoscaling:asg:MinSize=2");

    let s = parse_option_setting("aws:elasticbeanstalk:application:environment:DB_URL=a=b").unwrap();
    assert_eq!(s.namespace, "aws:elasticbeanstalk:application:environment");
    assert_eq!(s.option_name, "DB_URL");
    assert_eq!(s.value.as_deref(), Some("a=b"));

    assert!(parse_option_setting("MinSize=2").is_err());
    assert!(parse_option_setting("aws:autoscaling:asg:MinSize").is_err());
    assert!(parse_option_setting(":MinSize=2").is_err());

    let settings = scale_option_settings(3);
    assert_eq!(settings.len(), 2);
    assert_eq!(settings[0].option_name, "MinSize");
    assert_eq!(settings[1].option_name, "MaxSize");
    assert!(settings.iter().all(|s| s.value.as_deref() == Some("3")));

    assert!(!is_single_instance(&settings));
    assert!(is_single_instance(&[OptionSetting::new(
        NAMESPACE_ENVIRONMENT,
        "EnvironmentType",
        "SingleInstance"
    )]));
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- environment::test_status_and_tier --exact --show-output
#[test]
fn test_status_and_tier() {
    assert_eq!(Status::from("Ready"), Status::Ready);
    assert!(Status::from("Terminated").is_settled());
    assert!(!Status::from("Launching").is_settled());
    assert_eq!(Status::from("Aborting").to_string(), "Aborting");

    assert_eq!(Tier::from_str("web").unwrap(), Tier::WebServer);
    assert_eq!(Tier::from_str("WebServer").unwrap(), Tier::WebServer);
    assert_eq!(Tier::from_str("worker").unwrap().name_and_type(), ("Worker", "SQS/HTTP"));
    assert!(Tier::from_str("batch").is_err());

    assert_eq!(health_color("Green"), HealthColor::Green);
    assert_eq!(health_color("Red"), HealthColor::Red);
    assert_eq!(health_color(""), HealthColor::Grey);

    let e = Event {
        event_date: String::from("2023-09-01T10:00:00Z"),
        severity: String::from("INFO"),
        message: String::from("createEnvironment is starting."),
        ..Default::default()
    };
    assert_eq!(
        format_event(&e),
        "2023-09-01T10:00:00Z INFO    createEnvironment is starting."
    );
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- environment::test_status_watch --exact --show-output
#[test]
fn test_status_watch() {
    let _ = env_logger::builder().is_test(true).try_init();

    // rebuilding a terminated environment
    let mut watch = StatusWatch::new("web-prod", Status::Ready);
    assert!(!watch.observe(&Status::Terminated).unwrap());
    assert!(!watch.observe(&Status::Terminated).unwrap());
    assert!(!watch.observe(&Status::Launching).unwrap());
    assert!(watch.observe(&Status::Ready).unwrap());

    // terminated again after the rebuild started
    let mut watch = StatusWatch::new("web-prod", Status::Ready);
    assert!(!watch.observe(&Status::Terminated).unwrap());
    assert!(!watch.observe(&Status::Launching).unwrap());
    assert!(watch.observe(&Status::Terminated).is_err());

    // launch that fails
    let mut watch = StatusWatch::new("web-prod", Status::Ready);
    assert!(!watch.observe(&Status::Launching).unwrap());
    assert!(watch.observe(&Status::Terminated).is_err());

    let mut watch = StatusWatch::new("web-prod", Status::Terminated);
    assert!(!watch.observe(&Status::Terminating).unwrap());
    assert!(watch.observe(&Status::Terminated).unwrap());
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- environment::test_latest_log_info --exact --show-output
#[test]
fn test_latest_log_info() {
    use std::time::Duration;

    let requested_at = UNIX_EPOCH + Duration::from_millis(1_693_562_400_000);
    let info = |id: &str, offset_ms: i64| InstanceLogInfo {
        ec2_instance_id: id.to_string(),
        message: format!("https://example.com/{}/{}", id, offset_ms),
        sample_timestamp: String::new(),
        sample_millis: unix_millis(requested_at) + offset_ms,
    };
    let infos = vec![
        info("i-1", -3_600_000),
        info("i-1", 60_000),
        info("i-1", 120_000),
        info("i-2", 90_000),
        info("i-3", -7_200_000),
    ];
    let latest = latest_log_info_per_instance(&infos, requested_at);
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].sample_millis, unix_millis(requested_at) + 120_000);
    assert_eq!(latest[1].ec2_instance_id, "i-2");

    // samples within the same second as the request still count,
    // and half a second later beats the whole second
    let infos = vec![info("i-1", 0), info("i-1", 500), info("i-2", -500)];
    let latest = latest_log_info_per_instance(&infos, requested_at);
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].sample_millis, unix_millis(requested_at) + 500);
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- environment::test_unix_millis --exact --show-output
#[test]
fn test_unix_millis() {
    use std::time::Duration;

    let t = UNIX_EPOCH + Duration::from_millis(1_693_562_400_000);
    assert_eq!(unix_millis(t), 1_693_562_400_000);
    assert!(unix_millis(t + Duration::from_millis(500)) > unix_millis(t));
    assert_eq!(unix_millis(UNIX_EPOCH - Duration::from_millis(5)), -5);
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- environment::test_event_cursor --exact --show-output
#[test]
fn test_event_cursor() {
    let _ = env_logger::builder().is_test(true).try_init();

    let base: i64 = 1_693_562_400_000;
    let ev = |offset_ms: i64, msg: &str| Event {
        event_date: String::new(),
        event_millis: base + offset_ms,
        severity: String::from("INFO"),
        message: msg.to_string(),
        ..Default::default()
    };

    let mut cursor = EventCursor::new();

    // "10:00:00.5Z" sorts before "10:00:00Z" as a string but is later in time
    let page = vec![ev(500, "b"), ev(0, "a")];
    let got: Vec<&str> = cursor.advance(&page).iter().map(|e| e.message.as_str()).collect();
    assert_eq!(got, vec!["a", "b"]);

    let page = vec![ev(900, "d"), ev(900, "c"), ev(500, "b"), ev(0, "a")];
    let got: Vec<&str> = cursor.advance(&page).iter().map(|e| e.message.as_str()).collect();
    assert_eq!(got, vec!["c", "d"]);

    assert!(cursor.advance(&page).is_empty());
    assert!(cursor.advance(&[]).is_empty());
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- environment::test_environment_variables --exact --show-output
#[test]
fn test_environment_variables() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (set, remove) = parse_environment_variables(&[
        String::from("DB_HOST=db.internal, DB_PORT=\"5432\""),
        String::from("TOKEN=a=b"),
        String::from("OLD_FLAG="),
    ])
    .unwrap();
    let set: Vec<String> = set.iter().map(|s| s.to_string()).collect();
    assert_eq!(
        set,
        vec![
            "aws:elasticbeanstalk:application:environment:DB_HOST=db.internal",
            "aws:elasticbeanstalk:application:environment:DB_PORT=5432",
            "aws:elasticbeanstalk:application:environment:TOKEN=a=b",
        ]
    );
    assert_eq!(remove.len(), 1);
    assert_eq!(remove[0].option_name, "OLD_FLAG");
    assert!(remove[0].value.is_none());

    // the last assignment of a key wins
    let (set, remove) =
        parse_environment_variables(&[String::from("A=1"), String::from("A=")]).unwrap();
    assert!(set.is_empty());
    assert_eq!(remove[0].option_name, "A");

    assert!(parse_environment_variables(&[String::from("NO_VALUE")]).is_err());
    assert!(parse_environment_variables(&[String::from("=1")]).is_err());
    assert!(parse_environment_variables(&[String::from("A\"B=1")]).is_err());

    let settings = vec![
        OptionSetting::new(NAMESPACE_APPLICATION_ENVIRONMENT, "B", "2"),
        OptionSetting::new(NAMESPACE_APPLICATION_ENVIRONMENT, "A", "1"),
        OptionSetting::new(NAMESPACE_ASG, "MinSize", "1"),
    ];
    let vars = environment_variables(&settings);
    assert_eq!(vars.len(), 2);
    assert_eq!(vars.keys().next().map(String::as_str), Some("A"));
    assert_eq!(
        get_option_setting(&settings, NAMESPACE_ASG, "MinSize"),
        Some("1")
    );
    assert_eq!(get_option_setting(&settings, NAMESPACE_ASG, "MaxSize"), None);
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- environment::test_upgrade_option_settings --exact --show-output
#[test]
fn test_upgrade_option_settings() {
    let load_balanced = vec![OptionSetting::new(
        NAMESPACE_ENVIRONMENT,
        "EnvironmentType",
        "LoadBalanced",
    )];
    let settings = upgrade_option_settings(&load_balanced, true, false);
    assert_eq!(settings.len(), 2);
    assert_eq!(settings[1].value.as_deref(), Some("Health"));
    let settings = upgrade_option_settings(&load_balanced, false, false);
    assert_eq!(settings[1].value.as_deref(), Some("Time"));

    assert!(upgrade_option_settings(&load_balanced, true, true).is_empty());

    let single = vec![OptionSetting::new(
        NAMESPACE_ENVIRONMENT,
        "EnvironmentType",
        "SingleInstance",
    )];
    assert!(upgrade_option_settings(&single, true, false).is_empty());

    let rolling = vec![OptionSetting::new(
        NAMESPACE_ROLLING_UPDATES,
        "RollingUpdateEnabled",
        "true",
    )];
    assert!(upgrade_option_settings(&rolling, true, false).is_empty());
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- environment::test_environment_selection --exact --show-output
#[test]
fn test_environment_selection() {
    let env = |name: &str, status: Status, label: Option<&str>| Environment {
        environment_name: name.to_string(),
        status,
        version_label: label.map(String::from),
        ..Default::default()
    };
    let envs = vec![
        env("web-prod", Status::Ready, Some("app-1")),
        env("web-blue", Status::Ready, Some("app-2")),
        env("web-old", Status::Terminated, Some("app-1")),
        env("web-green", Status::Updating, Some("app-1")),
    ];

    assert_eq!(
        other_live_environments(&envs, "web-prod"),
        vec!["web-blue".to_string(), "web-green".to_string()]
    );
    assert_eq!(
        environments_using_version(&envs, "app-1"),
        vec!["web-prod".to_string(), "web-green".to_string()]
    );
    assert!(environments_using_version(&envs, "app-3").is_empty());
}
