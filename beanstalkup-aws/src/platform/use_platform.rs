use std::io::{self, Error, ErrorKind};

use beanstalk_ops::{platform, project::WorkspaceType, resolve};
use clap::{Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "use";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Selects the custom platform the workspace works on")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(
            Arg::new("PLATFORM")
                .help("Sets the platform as a name, 'name/version', or ARN")
                .required(true)
                .num_args(1),
        )
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub platform: String,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let mut session = Session::load(&opts.global).await?;
    let arn = resolve::name_to_arn(&session.eb_manager, &opts.platform).await?;
    if !platform::is_custom_platform_arn(&arn) {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("'{}' is not a custom platform", arn),
        ));
    }
    let (_, name, version) = platform::arn_to_platform(&arn)?;

    let project = session.project.as_mut().ok_or_else(|| {
        Error::new(
            ErrorKind::NotFound,
            "no project found in this directory or its parents (run 'init' first)",
        )
    })?;
    project.config.update_platform_name(&name);
    // a bare name follows the latest version
    if opts.platform == name {
        project.config.update_platform_version(None);
    } else {
        project.config.update_platform_version(Some(&version));
    }
    project.config.global.workspace_type = WorkspaceType::Platform;
    project.save()?;

    common::print_line(
        Color::Green,
        &format!("\nWorkspace platform set to '{}' ({})\n", name, version),
    )?;
    Ok(())
}
