use std::io::{self, Error, ErrorKind};

use beanstalk_ops::environment::Status;
use clap::{Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "restore";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Rebuilds a recently terminated environment")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(
            Arg::new("ENVIRONMENT_ID")
                .long("environment-id")
                .help("Sets the ID of the terminated environment (prompts if not given)")
                .required(false)
                .num_args(1),
        )
        .arg(common::skip_prompt_arg())
        .arg(common::no_wait_arg())
        .arg(common::timeout_arg())
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub environment_id: Option<String>,
    pub skip_prompt: bool,
    pub no_wait: bool,
    pub timeout_in_minutes: u64,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let application_name = session.application_name(None)?;

    let mut terminated: Vec<_> = session
        .eb_manager
        .describe_environments(Some(&application_name), None, true)
        .await?
        .into_iter()
        .filter(|e| e.status == Status::Terminated)
        .collect();
    // most recently terminated first
    terminated.sort_by(|a, b| b.date_updated_millis.cmp(&a.date_updated_millis));
    if terminated.is_empty() {
        return Err(Error::new(
            ErrorKind::NotFound,
            format!(
                "no terminated environments found for '{}'",
                application_name
            ),
        ));
    }

    let env = match &opts.environment_id {
        Some(id) => terminated
            .iter()
            .find(|e| &e.environment_id == id)
            .cloned()
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::NotFound,
                    format!("no terminated environment with ID '{}'", id),
                )
            })?,
        None => {
            let items: Vec<String> = terminated
                .iter()
                .map(|e| {
                    format!(
                        "{} ({}, terminated {})",
                        e.environment_name,
                        e.environment_id,
                        e.date_updated.as_deref().unwrap_or("unknown")
                    )
                })
                .collect();
            let idx = common::select("Select an environment to restore", &items)?;
            terminated[idx].clone()
        }
    };

    let what = format!(
        "restore '{}' ({})",
        env.environment_name, env.environment_id
    );
    if !common::confirm(opts.skip_prompt, NAME, &what)? {
        return Ok(());
    }

    common::print_line(
        Color::Blue,
        &format!("\nRestoring '{}'\n", env.environment_name),
    )?;
    session
        .eb_manager
        .rebuild_environment(&env.environment_id)
        .await?;

    if opts.no_wait {
        return Ok(());
    }
    session
        .wait_for(&env.environment_name, Status::Ready, opts.timeout_in_minutes)
        .await?;
    Ok(())
}
