use std::io;

use beanstalk_ops::environment::{self, Status};
use clap::{Arg, ArgAction, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "config";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Shows or updates the option settings of the environment")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(common::environment_name_arg())
        .arg(
            Arg::new("SET")
                .long("set")
                .help("Sets an option as 'namespace:OptionName=value' (repeatable)")
                .required(false)
                .num_args(1)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("NAMESPACE")
                .long("namespace")
                .short('n')
                .help("Only shows the options in the namespace")
                .required(false)
                .num_args(1)
                .conflicts_with("SET"),
        )
        .arg(common::no_wait_arg())
        .arg(common::timeout_arg())
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub environment_name: Option<String>,
    pub option_settings: Vec<String>,
    pub namespace: Option<String>,
    pub no_wait: bool,
    pub timeout_in_minutes: u64,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let application_name = session.application_name(None)?;
    let environment_name = session.environment_name(opts.environment_name.as_ref())?;

    if opts.option_settings.is_empty() {
        let mut settings = session
            .eb_manager
            .describe_configuration_settings(&application_name, &environment_name)
            .await?;
        settings.retain(|s| match &opts.namespace {
            Some(ns) => &s.namespace == ns,
            None => true,
        });
        settings.sort_by(|a, b| {
            (a.namespace.as_str(), a.option_name.as_str())
                .cmp(&(b.namespace.as_str(), b.option_name.as_str()))
        });
        for s in settings.iter() {
            println!("{}", s);
        }
        return Ok(());
    }

    let mut settings = Vec::new();
    for s in opts.option_settings.iter() {
        settings.push(environment::parse_option_setting(s)?);
    }
    common::print_line(
        Color::Blue,
        &format!(
            "\nUpdating {} option settings of '{}'\n",
            settings.len(),
            environment_name
        ),
    )?;
    session
        .eb_manager
        .update_environment(&environment_name, None, &settings)
        .await?;

    if opts.no_wait {
        return Ok(());
    }
    session
        .wait_for(&environment_name, Status::Ready, opts.timeout_in_minutes)
        .await?;
    Ok(())
}
