use std::io::{self, Error, ErrorKind};

use beanstalk_ops::environment::{self, Status};
use clap::{value_parser, Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "scale";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Pins the environment to a number of instances")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(
            Arg::new("INSTANCES")
                .help("Sets the number of instances")
                .required(true)
                .num_args(1)
                .value_parser(value_parser!(u32).range(1..)),
        )
        .arg(common::environment_name_arg())
        .arg(common::skip_prompt_arg())
        .arg(common::no_wait_arg())
        .arg(common::timeout_arg())
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub instances: u32,
    pub environment_name: Option<String>,
    pub skip_prompt: bool,
    pub no_wait: bool,
    pub timeout_in_minutes: u64,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let application_name = session.application_name(None)?;
    let environment_name = session.environment_name(opts.environment_name.as_ref())?;

    let current = session
        .eb_manager
        .describe_configuration_settings(&application_name, &environment_name)
        .await?;
    if environment::is_single_instance(&current) {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!(
                "'{}' is a single instance environment and cannot be scaled",
                environment_name
            ),
        ));
    }

    let what = format!("scale '{}' to {} instances", environment_name, opts.instances);
    if !common::confirm(opts.skip_prompt, NAME, &what)? {
        return Ok(());
    }

    common::print_line(
        Color::Blue,
        &format!(
            "\nScaling '{}' to {} instances\n",
            environment_name, opts.instances
        ),
    )?;
    session
        .eb_manager
        .update_environment(
            &environment_name,
            None,
            &environment::scale_option_settings(opts.instances),
        )
        .await?;

    if opts.no_wait {
        return Ok(());
    }
    session
        .wait_for(&environment_name, Status::Ready, opts.timeout_in_minutes)
        .await?;
    Ok(())
}
