use std::io::{self, Error, ErrorKind};

use clap::{Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "use";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Sets the default environment of the current branch")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(
            Arg::new("ENVIRONMENT_NAME")
                .help("Sets the environment to use")
                .required(true)
                .num_args(1),
        )
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub environment_name: String,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let mut session = Session::load(&opts.global).await?;

    // fails unless the environment is live
    let env = session
        .eb_manager
        .describe_environment(&opts.environment_name)
        .await?;

    let project = session.project.as_mut().ok_or_else(|| {
        Error::new(
            ErrorKind::NotFound,
            "no project found in this directory or its parents (run 'init' first)",
        )
    })?;
    let branch = project.current_branch();
    project
        .config
        .set_environment_for_branch(&branch, &env.environment_name);
    project.save()?;

    common::print_line(
        Color::Green,
        &format!(
            "\nBranch '{}' now uses '{}' ({})\n",
            branch, env.environment_name, env.application_name
        ),
    )?;
    Ok(())
}
