use std::io::{self, Error, ErrorKind};

use beanstalk_ops::environment;
use clap::{Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "swap";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Swaps the CNAMEs of two environments")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(common::environment_name_arg())
        .arg(
            Arg::new("DESTINATION_NAME")
                .long("destination-name")
                .short('n')
                .help("Sets the environment to swap with (prompts if not given)")
                .required(false)
                .num_args(1),
        )
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub environment_name: Option<String>,
    pub destination_name: Option<String>,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let application_name = session.application_name(None)?;
    let source_name = session.environment_name(opts.environment_name.as_ref())?;

    let destination_name = match &opts.destination_name {
        Some(v) => v.clone(),
        None => {
            let envs = session
                .eb_manager
                .describe_environments(Some(&application_name), None, false)
                .await?;
            let candidates = environment::other_live_environments(&envs, &source_name);
            if candidates.is_empty() {
                return Err(Error::new(
                    ErrorKind::NotFound,
                    format!(
                        "'{}' has no other environment to swap '{}' with",
                        application_name, source_name
                    ),
                ));
            }
            if candidates.len() == 1 {
                candidates[0].clone()
            } else {
                let idx = common::select("Select an environment to swap with", &candidates)?;
                candidates[idx].clone()
            }
        }
    };
    if destination_name == source_name {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            "cannot swap an environment with itself",
        ));
    }

    session
        .eb_manager
        .swap_environment_cnames(&source_name, &destination_name)
        .await?;
    common::print_line(
        Color::Green,
        &format!(
            "\nSwapped the CNAMEs of '{}' and '{}'\n",
            source_name, destination_name
        ),
    )?;
    Ok(())
}
