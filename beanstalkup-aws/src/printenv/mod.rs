use std::io;

use beanstalk_ops::environment;
use clap::Command;
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "printenv";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Shows the environment variables of the environment")
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
    let application_name = session.application_name(None)?;
    let environment_name = session.environment_name(opts.environment_name.as_ref())?;

    let settings = session
        .eb_manager
        .describe_configuration_settings(&application_name, &environment_name)
        .await?;
    let vars = environment::environment_variables(&settings);
    if vars.is_empty() {
        println!("no environment variables");
        return Ok(());
    }

    common::print_line(Color::Blue, " Environment Variables:\n")?;
    for (k, v) in vars.iter() {
        println!("     {} = {}", k, v);
    }
    Ok(())
}
