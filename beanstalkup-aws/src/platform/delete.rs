use std::io::{self, Error, ErrorKind};

use beanstalk_ops::{environment::Status, resolve};
use clap::{Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "delete";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Deletes a custom platform version")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(
            Arg::new("VERSION")
                .help("Sets the version, 'name/version', or ARN")
                .required_unless_present("CLEANUP")
                .num_args(1),
        )
        .arg(
            Arg::new("CLEANUP")
                .long("cleanup")
                .help("Deletes every failed version of the workspace platform instead")
                .required(false)
                .num_args(0)
                .conflicts_with("VERSION"),
        )
        .arg(common::skip_prompt_arg())
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub version: Option<String>,
    pub cleanup: bool,
    pub skip_prompt: bool,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;

    let arns = if opts.cleanup {
        let name = session
            .project
            .as_ref()
            .and_then(|p| p.config.global.platform_name.clone())
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidInput,
                    "no workspace platform set (run 'platform use' first)",
                )
            })?;
        let failed = resolve::list_custom_platform_versions(
            &session.eb_manager,
            Some(&name),
            None,
            Some("Failed"),
        )
        .await?;
        failed.into_iter().map(|s| s.platform_arn).collect()
    } else {
        vec![super::resolve_version_arn(&session, opts.version.as_deref()).await?]
    };
    if arns.is_empty() {
        println!("nothing to delete");
        return Ok(());
    }

    // refuse while any live environment runs on the versions
    let envs = session
        .eb_manager
        .describe_environments(None, None, false)
        .await?;
    for arn in arns.iter() {
        let in_use: Vec<&str> = envs
            .iter()
            .filter(|e| {
                e.status != Status::Terminated && e.platform_arn.as_deref() == Some(arn.as_str())
            })
            .map(|e| e.environment_name.as_str())
            .collect();
        if !in_use.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "'{}' is used by environments [{}]; terminate them first",
                    arn,
                    in_use.join(", ")
                ),
            ));
        }
    }

    for arn in arns.iter() {
        common::print_line(Color::Yellow, &format!("{}\n", arn))?;
    }
    let what = format!("delete {} platform version(s)", arns.len());
    if !common::confirm(opts.skip_prompt, NAME, &what)? {
        return Ok(());
    }

    for arn in arns.iter() {
        session.eb_manager.delete_platform_version(arn).await?;
        common::print_line(Color::Green, &format!("deleted '{}'\n", arn))?;
    }
    Ok(())
}
