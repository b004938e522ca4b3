use std::io;

use beanstalk_ops::{
    aws::elasticbeanstalk::UpdateEnvironmentInput,
    environment::{self, Status},
};
use clap::{Arg, ArgAction, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "setenv";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Sets or removes environment variables of the environment")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(
            Arg::new("VARIABLES")
                .help("Sets 'KEY=value' pairs (comma-separated allowed; 'KEY=' removes it)")
                .required(true)
                .num_args(1..)
                .action(ArgAction::Append),
        )
        .arg(common::environment_name_arg())
        .arg(common::no_wait_arg())
        .arg(common::timeout_arg().default_value("4"))
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub variables: Vec<String>,
    pub environment_name: Option<String>,
    pub no_wait: bool,
    pub timeout_in_minutes: u64,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let (option_settings, options_to_remove) =
        environment::parse_environment_variables(&opts.variables)?;

    let session = Session::load(&opts.global).await?;
    let environment_name = session.environment_name(opts.environment_name.as_ref())?;

    common::print_line(
        Color::Blue,
        &format!(
            "\nUpdating environment variables of '{}' ({} set, {} removed)\n",
            environment_name,
            option_settings.len(),
            options_to_remove.len()
        ),
    )?;
    session
        .eb_manager
        .update_environment_with(&UpdateEnvironmentInput {
            environment_name: environment_name.clone(),
            option_settings,
            options_to_remove,
            ..Default::default()
        })
        .await?;

    if opts.no_wait {
        return Ok(());
    }
    session
        .wait_for(&environment_name, Status::Ready, opts.timeout_in_minutes)
        .await?;
    Ok(())
}
