use std::io;

use clap::Command;
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "abort";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Cancels the in-progress update of the environment")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(common::environment_name_arg())
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub environment_name: Option<String>,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let environment_name = session.environment_name(opts.environment_name.as_ref())?;

    session
        .eb_manager
        .abort_environment_update(&environment_name)
        .await?;
    common::print_line(
        Color::Green,
        &format!("\nAborted the update of '{}'\n", environment_name),
    )?;
    Ok(())
}
