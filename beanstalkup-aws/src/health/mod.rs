use std::{io, time::Duration};

use beanstalk_ops::environment::EnvironmentHealth;
use clap::{Arg, Command};
use crossterm::style::Color;
use tokio::time::sleep;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "health";

const REFRESH_INTERVAL: Duration = Duration::from_secs(10);

pub fn command() -> Command {
    Command::new(NAME)
        .about("Shows the enhanced health of the environment")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(common::environment_name_arg())
        .arg(
            Arg::new("REFRESH")
                .long("refresh")
                .help("Refreshes the health every 10 seconds until interrupted")
                .required(false)
                .num_args(0),
        )
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub environment_name: Option<String>,
    pub refresh: bool,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let environment_name = session.environment_name(opts.environment_name.as_ref())?;

    loop {
        let health = session
            .eb_manager
            .describe_environment_health(&environment_name)
            .await?;
        print_health(&health)?;

        if !opts.refresh {
            return Ok(());
        }
        tokio::select! {
            _ = sleep(REFRESH_INTERVAL) => {}
            _ = tokio::signal::ctrl_c() => {
                return Ok(());
            }
        }
    }
}

fn print_health(health: &EnvironmentHealth) -> io::Result<()> {
    let color = health.color.as_deref().unwrap_or("Grey");
    common::print_line(
        common::health_to_color(color),
        &format!(
            "\n{}  {}  {}\n",
            health.environment_name,
            health.status.as_deref().unwrap_or("Unknown"),
            health.health_status.as_deref().unwrap_or(color)
        ),
    )?;
    for cause in health.causes.iter() {
        common::print_line(Color::Yellow, &format!("  - {}\n", cause))?;
    }

    if let Some(h) = &health.instances_health {
        let rows = [
            ("Ok", h.ok, Color::Green),
            ("Info", h.info, Color::Green),
            ("Warning", h.warning, Color::Yellow),
            ("Degraded", h.degraded, Color::Red),
            ("Severe", h.severe, Color::Red),
            ("Pending", h.pending, Color::Grey),
            ("Unknown", h.unknown, Color::Grey),
            ("NoData", h.no_data, Color::Grey),
        ];
        let total: i32 = rows.iter().map(|(_, n, _)| n).sum();
        println!("  instances: {}", total);
        for (name, n, color) in rows.iter() {
            if *n > 0 {
                common::print_line(*color, &format!("    {:<9} {}\n", name, n))?;
            }
        }
    }
    Ok(())
}
