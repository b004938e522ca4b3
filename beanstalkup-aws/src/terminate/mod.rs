use std::io;

use beanstalk_ops::environment::Status;
use clap::{Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "terminate";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Terminates the environment, or the whole application with '--all'")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(common::environment_name_arg())
        .arg(
            Arg::new("ALL")
                .long("all")
                .help("Deletes the application with all its environments and versions")
                .required(false)
                .num_args(0),
        )
        .arg(
            Arg::new("FORCE")
                .long("force")
                .help("Terminates even if some resources fail to delete")
                .required(false)
                .num_args(0),
        )
        .arg(common::skip_prompt_arg())
        .arg(common::no_wait_arg())
        .arg(common::timeout_arg())
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub environment_name: Option<String>,
    pub all: bool,
    pub force: bool,
    pub skip_prompt: bool,
    pub no_wait: bool,
    pub timeout_in_minutes: u64,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let mut session = Session::load(&opts.global).await?;
    let application_name = session.application_name(None)?;

    if opts.all {
        let what = format!(
            "delete the application '{}' and all its environments",
            application_name
        );
        if !common::confirm(opts.skip_prompt, NAME, &what)? {
            return Ok(());
        }
        session
            .eb_manager
            .delete_application(&application_name)
            .await?;
        if let Some(project) = session.project.as_mut() {
            project.config.branch_defaults.clear();
            project.save()?;
        }
        common::print_line(
            Color::Green,
            &format!("\nDeleted application '{}'\n", application_name),
        )?;
        return Ok(());
    }

    let environment_name = session.environment_name(opts.environment_name.as_ref())?;
    let what = format!("terminate '{}'", environment_name);
    if !common::confirm(opts.skip_prompt, NAME, &what)? {
        return Ok(());
    }

    // fails fast on unknown environments
    session.eb_manager.describe_environment(&environment_name).await?;
    session
        .eb_manager
        .terminate_environment(&environment_name, opts.force)
        .await?;

    if let Some(project) = session.project.as_mut() {
        project.config.clear_environment(&environment_name);
        project.save()?;
    }

    if opts.no_wait {
        return Ok(());
    }
    session
        .wait_for(&environment_name, Status::Terminated, opts.timeout_in_minutes)
        .await?;
    Ok(())
}
