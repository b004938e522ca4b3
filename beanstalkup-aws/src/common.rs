use std::{
    env,
    io::{self, stdout, Error, ErrorKind},
    path::Path,
    time::Duration,
};

use aws_manager::sts;
use beanstalk_ops::{
    aws::{self as eb_aws, elasticbeanstalk, s3},
    bundle,
    environment::{self, Event, HealthColor, Status},
    project::Project,
};
use clap::{value_parser, Arg, ArgMatches};
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use dialoguer::{theme::ColorfulTheme, Select};

/// Default wait for environment operations.
pub const DEFAULT_TIMEOUT_IN_MINUTES: &str = "30";
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const APPLICATION_DESCRIPTION: &str = "Application created from the CLI";

pub fn log_level_arg() -> Arg {
    Arg::new("LOG_LEVEL")
        .long("log-level")
        .short('l')
        .help("Sets the log level")
        .required(false)
        .num_args(1)
        .value_parser(["debug", "info"])
        .default_value("info")
}

pub fn region_arg() -> Arg {
    Arg::new("REGION")
        .long("region")
        .short('r')
        .help("Sets the AWS region for API calls/endpoints (defaults to the project region)")
        .required(false)
        .num_args(1)
}

pub fn profile_arg() -> Arg {
    Arg::new("PROFILE")
        .long("profile")
        .help("Sets the AWS credentials profile (defaults to the project profile)")
        .required(false)
        .num_args(1)
}

pub fn application_name_arg() -> Arg {
    Arg::new("APPLICATION_NAME")
        .long("application-name")
        .short('a')
        .help("Sets the application name (defaults to the project application)")
        .required(false)
        .num_args(1)
}

pub fn environment_name_arg() -> Arg {
    Arg::new("ENVIRONMENT_NAME")
        .long("environment-name")
        .short('e')
        .help("Sets the environment name (defaults to the environment of the current branch)")
        .required(false)
        .num_args(1)
}

pub fn skip_prompt_arg() -> Arg {
    Arg::new("SKIP_PROMPT")
        .long("skip-prompt")
        .short('s')
        .help("Skips prompt mode")
        .required(false)
        .num_args(0)
}

pub fn no_wait_arg() -> Arg {
    Arg::new("NO_WAIT")
        .long("no-wait")
        .help("Returns without waiting for the operation to complete")
        .required(false)
        .num_args(0)
}

pub fn timeout_arg() -> Arg {
    Arg::new("TIMEOUT_IN_MINUTES")
        .long("timeout-in-minutes")
        .help("Sets how long to wait for the operation to complete")
        .required(false)
        .num_args(1)
        .value_parser(value_parser!(u64))
        .default_value(DEFAULT_TIMEOUT_IN_MINUTES)
}

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct GlobalFlags {
    pub log_level: String,
    pub region: Option<String>,
    pub profile: Option<String>,
}

impl GlobalFlags {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            log_level: m
                .get_one::<String>("LOG_LEVEL")
                .unwrap_or(&String::from("info"))
                .clone(),
            region: m.get_one::<String>("REGION").cloned(),
            profile: m.get_one::<String>("PROFILE").cloned(),
        }
    }
}

pub fn init_logger(log_level: &str) {
    // ref. https://github.com/env-logger-rs/env_logger/issues/47
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    );
}

/// Project, region, and AWS clients for one invocation.
pub struct Session {
    pub project: Option<Project>,
    pub region: String,
    pub shared_config: aws_types::SdkConfig,
    pub eb_manager: elasticbeanstalk::Manager,
}

impl Session {
    /// Loads the enclosing project (if any) and the AWS config.
    /// Flags win over the project settings.
    pub async fn load(flags: &GlobalFlags) -> io::Result<Self> {
        let cwd = env::current_dir()?;
        let project = match Project::find_root(&cwd) {
            Some(root) => Some(Project::load_from_root(&root)?),
            None => None,
        };

        let region = flags.region.clone().or_else(|| {
            project
                .as_ref()
                .and_then(|p| p.config.global.default_region.clone())
        });
        let profile = flags
            .profile
            .clone()
            .or_else(|| project.as_ref().and_then(|p| p.config.global.profile.clone()));

        let shared_config = eb_aws::load_config(region, profile).await;
        let region = shared_config
            .region()
            .map(|r| r.to_string())
            .unwrap_or_else(|| String::from(eb_aws::DEFAULT_REGION));

        let sts_manager = sts::Manager::new(&shared_config);
        let current_identity = sts_manager.get_identity().await.map_err(|e| {
            Error::new(
                ErrorKind::Other,
                format!("failed to load AWS identity ({})", e),
            )
        })?;
        log::info!("current AWS identity: {:?}", current_identity);

        let eb_manager = elasticbeanstalk::Manager::new(&shared_config);
        Ok(Self {
            project,
            region,
            shared_config,
            eb_manager,
        })
    }

    pub fn project(&self) -> io::Result<&Project> {
        self.project.as_ref().ok_or_else(|| {
            Error::new(
                ErrorKind::NotFound,
                "no project found in this directory or its parents (run 'init' first)",
            )
        })
    }

    pub fn application_name(&self, flag: Option<&String>) -> io::Result<String> {
        if let Some(v) = flag {
            return Ok(v.clone());
        }
        self.project()?.application_name().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                "no application name given and none set in the project",
            )
        })
    }

    pub fn environment_name(&self, flag: Option<&String>) -> io::Result<String> {
        if let Some(v) = flag {
            return Ok(v.clone());
        }
        self.project()?.environment_name().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                "no environment name given and none set for the current branch",
            )
        })
    }

    /// Polls the environment and prints its events until it reaches the
    /// desired status.
    pub async fn wait_for(
        &self,
        environment_name: &str,
        desired: Status,
        timeout_in_minutes: u64,
    ) -> io::Result<environment::Environment> {
        print_line(
            Color::Blue,
            &format!(
                "\nWaiting for '{}' to become {} (timeout {} minutes)\n",
                environment_name, desired, timeout_in_minutes
            ),
        )?;
        let env = self
            .eb_manager
            .poll_environment(
                environment_name,
                desired,
                Duration::from_secs(timeout_in_minutes * 60),
                POLL_INTERVAL,
                |ev| {
                    let _ = print_event(ev);
                },
            )
            .await?;
        print_line(
            Color::Green,
            &format!(
                "\n'{}' is {} (health {})\n",
                env.environment_name,
                env.status,
                env.health.as_deref().unwrap_or("Unknown")
            ),
        )?;
        Ok(env)
    }
}

/// Packs the project (committed "HEAD" of a git repository unless
/// ".ebignore" exists), uploads it to the Elastic Beanstalk storage bucket,
/// and registers it as an application version.
pub async fn upload_source_bundle(
    session: &Session,
    application_name: &str,
    version_label: &str,
    description: Option<&str>,
) -> io::Result<()> {
    let project = session.project()?;

    let tmp_zip = random_manager::tmp_path(15, Some(".zip"))?;
    log::info!(
        "packing '{}' with {:?}",
        project.root.display(),
        bundle::bundle_method(&project.root)
    );
    let files = bundle::pack_project(&project.root, &tmp_zip)?;

    let s3_bucket = session.eb_manager.create_storage_location().await?;
    let s3_key = format!("{}/{}.zip", application_name, version_label);
    print_line(
        Color::Blue,
        &format!(
            "\nUploading {} files as 's3://{}/{}'\n",
            files, s3_bucket, s3_key
        ),
    )?;

    let s3_manager = s3::Manager::new(&session.shared_config);
    if s3_manager.exists(&s3_bucket, &s3_key).await? {
        return Err(Error::new(
            ErrorKind::AlreadyExists,
            format!("version '{}' was already uploaded", version_label),
        ));
    }
    s3_manager.put_object(&tmp_zip, &s3_bucket, &s3_key).await?;
    if let Err(e) = std::fs::remove_file(Path::new(&tmp_zip)) {
        log::warn!("failed to remove '{}' ({})", tmp_zip, e);
    }

    session
        .eb_manager
        .create_application_version(
            application_name,
            version_label,
            &s3_bucket,
            &s3_key,
            description,
        )
        .await?;
    Ok(())
}

/// Asks "No"/"Yes" and returns "true" on "Yes".
/// Always "true" with "skip_prompt".
pub fn confirm(skip_prompt: bool, op: &str, what: &str) -> io::Result<bool> {
    if skip_prompt {
        return Ok(true);
    }
    let options = &[
        format!("No, I am not ready to {}", what),
        format!("Yes, let's {}", what),
    ];
    let selected = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Select your '{}' option", op))
        .items(&options[..])
        .default(0)
        .interact()?;
    Ok(selected == 1)
}

/// Prompts to pick one of the items.
pub fn select(prompt: &str, items: &[String]) -> io::Result<usize> {
    Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(items)
        .default(0)
        .interact()
}

pub fn print_line(color: Color, msg: &str) -> io::Result<()> {
    execute!(
        stdout(),
        SetForegroundColor(color),
        Print(msg),
        ResetColor
    )
}

pub fn severity_color(severity: &str) -> Color {
    match severity {
        "ERROR" | "FATAL" => Color::Red,
        "WARN" => Color::Yellow,
        "DEBUG" | "TRACE" => Color::DarkGrey,
        _ => Color::Reset,
    }
}

pub fn print_event(ev: &Event) -> io::Result<()> {
    print_line(
        severity_color(&ev.severity),
        &format!("{}\n", environment::format_event(ev)),
    )
}

pub fn health_to_color(health: &str) -> Color {
    match environment::health_color(health) {
        HealthColor::Green => Color::Green,
        HealthColor::Yellow => Color::Yellow,
        HealthColor::Red => Color::Red,
        HealthColor::Grey => Color::Grey,
    }
}

/// RUST_LOG=debug cargo test --package beanstalkup-aws --bin beanstalkup-aws -- common::test_colors --exact --show-output
#[test]
fn test_colors() {
    assert_eq!(health_to_color("Green"), Color::Green);
    assert_eq!(health_to_color("Red"), Color::Red);
    assert_eq!(health_to_color("Unknown"), Color::Grey);
    assert_eq!(severity_color("ERROR"), Color::Red);
    assert_eq!(severity_color("INFO"), Color::Reset);
}
