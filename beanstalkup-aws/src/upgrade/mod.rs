use std::io::{self, Error, ErrorKind};

use beanstalk_ops::{
    aws::elasticbeanstalk::UpdateEnvironmentInput,
    environment::{self, Status, Tier},
    resolve,
};
use clap::{Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "upgrade";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Moves the environment to the latest version of its platform")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(common::environment_name_arg())
        .arg(
            Arg::new("NO_ROLL")
                .long("no-roll")
                .help("Skips turning on rolling updates for the upgrade")
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
    pub no_roll: bool,
    pub skip_prompt: bool,
    pub no_wait: bool,
    pub timeout_in_minutes: u64,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let application_name = session.application_name(None)?;
    let environment_name = session.environment_name(opts.environment_name.as_ref())?;

    let env = session
        .eb_manager
        .describe_environment(&environment_name)
        .await?;
    let current = env
        .platform_arn
        .clone()
        .or_else(|| env.solution_stack_name.clone())
        .ok_or_else(|| {
            Error::new(
                ErrorKind::NotFound,
                format!("'{}' has no platform", environment_name),
            )
        })?;

    let latest =
        resolve::find_solution_stack_from_string(&session.eb_manager, &current, true).await?;
    if latest.display_name() == current {
        common::print_line(
            Color::Green,
            &format!("\n'{}' is already on the latest platform\n", environment_name),
        )?;
        return Ok(());
    }

    let settings = session
        .eb_manager
        .describe_configuration_settings(&application_name, &environment_name)
        .await?;
    let webserver = env.tier.as_deref().unwrap_or("WebServer") == Tier::WebServer.to_string();
    let option_settings = environment::upgrade_option_settings(&settings, webserver, opts.no_roll);

    println!("Current platform: {}", current);
    println!("Latest platform:  {}", latest.display_name());
    if environment::is_single_instance(&settings) {
        common::print_line(
            Color::Yellow,
            "\nThis is a single instance environment; it will be unavailable during the upgrade\n",
        )?;
    }
    for s in option_settings.iter() {
        log::info!("applying '{}' for the upgrade", s);
    }

    let what = format!("upgrade '{}'", environment_name);
    if !common::confirm(opts.skip_prompt, NAME, &what)? {
        return Ok(());
    }

    common::print_line(
        Color::Blue,
        &format!("\nUpgrading '{}'\n", environment_name),
    )?;
    session
        .eb_manager
        .update_environment_with(&UpdateEnvironmentInput {
            environment_name: environment_name.clone(),
            target: Some(latest.to_create_target()),
            option_settings,
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
