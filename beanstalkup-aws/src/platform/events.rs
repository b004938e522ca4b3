use std::io;

use clap::{value_parser, Arg, Command};

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "events";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Shows the events of a custom platform version")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(
            Arg::new("VERSION")
                .help("Sets the version, 'name/version', or ARN (defaults to the workspace platform)")
                .required(false)
                .num_args(1),
        )
        .arg(
            Arg::new("MAX_RECORDS")
                .long("max-records")
                .help("Sets the number of events to show")
                .required(false)
                .num_args(1)
                .value_parser(value_parser!(i32).range(1..=1000))
                .default_value("50"),
        )
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub version: Option<String>,
    pub max_records: i32,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let arn = super::resolve_version_arn(&session, opts.version.as_deref()).await?;

    let mut events = session
        .eb_manager
        .describe_events(None, None, Some(&arn), None, Some(opts.max_records))
        .await?;
    events.reverse();
    for ev in events.iter() {
        common::print_event(ev)?;
    }
    Ok(())
}
