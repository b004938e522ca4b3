use std::{
    io,
    time::{Duration, SystemTime},
};

use beanstalk_ops::environment::{Event, EventCursor};
use clap::{value_parser, Arg, Command};
use tokio::time::sleep;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "events";

const FOLLOW_INTERVAL: Duration = Duration::from_secs(5);

pub fn command() -> Command {
    Command::new(NAME)
        .about("Shows the recent events of the environment")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(common::environment_name_arg())
        .arg(
            Arg::new("MAX_RECORDS")
                .long("max-records")
                .help("Sets the number of past events to show")
                .required(false)
                .num_args(1)
                .value_parser(value_parser!(i32).range(1..=1000))
                .default_value("20"),
        )
        .arg(
            Arg::new("FOLLOW")
                .long("follow")
                .short('f')
                .help("Keeps printing new events until interrupted")
                .required(false)
                .num_args(0),
        )
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub environment_name: Option<String>,
    pub max_records: i32,
    pub follow: bool,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let environment_name = session.environment_name(opts.environment_name.as_ref())?;

    let events = session
        .eb_manager
        .describe_events(
            None,
            Some(&environment_name),
            None,
            None,
            Some(opts.max_records),
        )
        .await?;
    let mut cursor = EventCursor::new();
    print_new(&mut cursor, &events)?;

    if !opts.follow {
        return Ok(());
    }

    loop {
        let polled_at = SystemTime::now();
        tokio::select! {
            _ = sleep(FOLLOW_INTERVAL) => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("received ctrl-c; stopping");
                return Ok(());
            }
        }

        let events = session
            .eb_manager
            .describe_events(
                None,
                Some(&environment_name),
                None,
                Some(polled_at - FOLLOW_INTERVAL),
                None,
            )
            .await?;
        print_new(&mut cursor, &events)?;
    }
}

/// Prints the events (newest first, as described) not printed yet, oldest first.
fn print_new(cursor: &mut EventCursor, events: &[Event]) -> io::Result<()> {
    for ev in cursor.advance(events) {
        common::print_event(ev)?;
    }
    Ok(())
}
