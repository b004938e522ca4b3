use std::io;

use beanstalk_ops::{bundle, environment::Status};
use clap::{Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "deploy";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Packs the project and deploys it to the environment")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(common::environment_name_arg())
        .arg(
            Arg::new("LABEL")
                .long("label")
                .help("Sets the version label (defaults to a timestamped label)")
                .required(false)
                .num_args(1),
        )
        .arg(
            Arg::new("MESSAGE")
                .long("message")
                .short('m')
                .help("Sets the version description")
                .required(false)
                .num_args(1),
        )
        .arg(
            Arg::new("VERSION")
                .long("version")
                .help("Deploys an existing version label instead of the project")
                .required(false)
                .num_args(1)
                .conflicts_with_all(["LABEL", "MESSAGE"]),
        )
        .arg(common::no_wait_arg())
        .arg(common::timeout_arg())
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub environment_name: Option<String>,
    pub label: Option<String>,
    pub message: Option<String>,
    pub version: Option<String>,
    pub no_wait: bool,
    pub timeout_in_minutes: u64,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let application_name = session.application_name(None)?;
    let environment_name = session.environment_name(opts.environment_name.as_ref())?;

    // fail before uploading anything
    let env = session.eb_manager.describe_environment(&environment_name).await?;
    log::info!("deploying to {:?}", env);

    let version_label = match &opts.version {
        Some(v) => v.clone(),
        None => {
            let label = opts
                .label
                .clone()
                .unwrap_or_else(|| bundle::version_label("app"));
            common::upload_source_bundle(
                &session,
                &application_name,
                &label,
                opts.message.as_deref(),
            )
            .await?;
            label
        }
    };

    common::print_line(
        Color::Blue,
        &format!("\nDeploying '{}' to '{}'\n", version_label, environment_name),
    )?;
    session
        .eb_manager
        .update_environment(&environment_name, Some(&version_label), &[])
        .await?;

    if opts.no_wait {
        return Ok(());
    }
    session
        .wait_for(&environment_name, Status::Ready, opts.timeout_in_minutes)
        .await?;
    Ok(())
}
