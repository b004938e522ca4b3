use std::io;

use beanstalk_ops::{resolve, solution_stack::SolutionStack};
use clap::{Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "status";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Shows the status of the environment and its platform")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(common::environment_name_arg())
        .arg(
            Arg::new("CHECK_PLATFORM")
                .long("check-platform")
                .help("Checks if a newer platform is available")
                .required(false)
                .num_args(0),
        )
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub environment_name: Option<String>,
    pub check_platform: bool,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let environment_name = session.environment_name(opts.environment_name.as_ref())?;
    let env = session
        .eb_manager
        .describe_environment(&environment_name)
        .await?;

    let health = env.health.as_deref().unwrap_or("Grey");
    println!("Environment details for: {}", env.environment_name);
    println!("  Application name: {}", env.application_name);
    println!("  Region: {}", session.region);
    println!(
        "  Deployed Version: {}",
        env.version_label.as_deref().unwrap_or("-")
    );
    println!("  Environment ID: {}", env.environment_id);
    if let Some(stack) = &env.solution_stack_name {
        println!("  Solution stack: {}", stack);
    }
    if let Some(arn) = &env.platform_arn {
        println!("  Platform: {}", arn);
    }
    println!("  Tier: {}", env.tier.as_deref().unwrap_or("-"));
    println!("  CNAME: {}", env.cname.as_deref().unwrap_or("-"));
    println!(
        "  Updated: {}",
        env.date_updated.as_deref().unwrap_or("-")
    );
    println!("  Status: {}", env.status);
    common::print_line(
        common::health_to_color(health),
        &format!("  Health: {}\n", health),
    )?;
    if let Some(hs) = &env.health_status {
        println!("  Health status: {}", hs);
    }

    if !opts.check_platform {
        return Ok(());
    }

    let current = match (&env.platform_arn, &env.solution_stack_name) {
        (Some(arn), _) => arn.clone(),
        (None, Some(stack)) => stack.clone(),
        (None, None) => return Ok(()),
    };
    let newer = resolve::find_solution_stack_from_string(&session.eb_manager, &current, true).await?;
    let same = match (&env.solution_stack_name, &newer) {
        (Some(stack), resolve::Platform::SolutionStack(ss)) => SolutionStack::new(stack) == *ss,
        _ => newer.display_name() == current,
    };
    if same {
        common::print_line(Color::Green, "  Platform is up to date\n")?;
    } else {
        common::print_line(
            Color::Yellow,
            &format!("  Newer platform available: {}\n", newer),
        )?;
    }
    Ok(())
}
