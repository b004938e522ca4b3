use std::io;

use beanstalk_ops::environment::Status;
use clap::{Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "list";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Lists the environments of the application")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(common::application_name_arg())
        .arg(
            Arg::new("ALL")
                .long("all")
                .help("Lists the environments of every application")
                .required(false)
                .num_args(0)
                .conflicts_with("APPLICATION_NAME"),
        )
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub application_name: Option<String>,
    pub all: bool,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let application_name = if opts.all {
        None
    } else {
        Some(session.application_name(opts.application_name.as_ref())?)
    };
    let current = session
        .project
        .as_ref()
        .and_then(|p| p.environment_name());

    let mut envs = session
        .eb_manager
        .describe_environments(application_name.as_deref(), None, false)
        .await?;
    envs.retain(|e| e.status != Status::Terminated);
    envs.sort_by(|a, b| {
        (a.application_name.as_str(), a.environment_name.as_str())
            .cmp(&(b.application_name.as_str(), b.environment_name.as_str()))
    });

    if envs.is_empty() {
        println!("no environments");
        return Ok(());
    }
    for e in envs.iter() {
        let marker = if current.as_deref() == Some(e.environment_name.as_str()) {
            "*"
        } else {
            " "
        };
        let health = e.health.as_deref().unwrap_or("Grey");
        let line = format!(
            "{} {:<40} {:<12} {:<8} {}\n",
            marker,
            if opts.all {
                format!("{}/{}", e.application_name, e.environment_name)
            } else {
                e.environment_name.clone()
            },
            e.status.to_string(),
            health,
            e.cname.as_deref().unwrap_or("-")
        );
        let color = if marker == "*" {
            Color::Green
        } else {
            common::health_to_color(health)
        };
        common::print_line(color, &line)?;
    }
    Ok(())
}
