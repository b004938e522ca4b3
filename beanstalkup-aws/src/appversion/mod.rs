use std::io::{self, Error, ErrorKind};

use beanstalk_ops::environment;
use clap::{Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "appversion";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Lists or deletes the application versions")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(
            Arg::new("DELETE")
                .long("delete")
                .short('d')
                .help("Deletes the version with the label")
                .required(false)
                .num_args(1),
        )
        .arg(common::skip_prompt_arg())
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub delete: Option<String>,
    pub skip_prompt: bool,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let application_name = session.application_name(None)?;

    let versions = session
        .eb_manager
        .describe_application_versions(&application_name)
        .await?;
    let envs = session
        .eb_manager
        .describe_environments(Some(&application_name), None, false)
        .await?;

    let label = match &opts.delete {
        Some(v) => v,
        None => {
            if versions.is_empty() {
                println!("no application versions");
                return Ok(());
            }
            for (i, v) in versions.iter().enumerate() {
                let deployed = environment::environments_using_version(&envs, &v.version_label);
                let line = format!(
                    "{:>4} {:<40} {:<22} {:<12} {}\n",
                    versions.len() - i,
                    v.version_label,
                    v.date_created.as_deref().unwrap_or("-"),
                    v.status.as_deref().unwrap_or("-"),
                    if deployed.is_empty() {
                        v.description.clone().unwrap_or_default()
                    } else {
                        format!("(deployed to {})", deployed.join(", "))
                    }
                );
                let color = if deployed.is_empty() {
                    Color::White
                } else {
                    Color::Green
                };
                common::print_line(color, &line)?;
            }
            return Ok(());
        }
    };

    if !versions.iter().any(|v| &v.version_label == label) {
        return Err(Error::new(
            ErrorKind::NotFound,
            format!("'{}' has no version '{}'", application_name, label),
        ));
    }
    let deployed = environment::environments_using_version(&envs, label);
    if !deployed.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!(
                "version '{}' is deployed to {} and cannot be deleted",
                label,
                deployed.join(", ")
            ),
        ));
    }

    let what = format!("delete version '{}'", label);
    if !common::confirm(opts.skip_prompt, NAME, &what)? {
        return Ok(());
    }
    session
        .eb_manager
        .delete_application_version(&application_name, label, false)
        .await?;
    common::print_line(
        Color::Green,
        &format!("\nDeleted version '{}'\n", label),
    )?;
    Ok(())
}
