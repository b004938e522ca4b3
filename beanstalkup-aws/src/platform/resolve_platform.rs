use std::io;

use beanstalk_ops::resolve::{self, Platform};
use clap::{Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "resolve";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Resolves a platform string to a solution stack or platform version")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(
            Arg::new("PLATFORM")
                .help("Sets the platform string (e.g., 'php-7.1', 'node.js', an ARN, or a branch name)")
                .required(true)
                .num_args(1),
        )
        .arg(
            Arg::new("FIND_NEWER")
                .long("find-newer")
                .help("Resolves to the latest platform of the same kind")
                .required(false)
                .num_args(0),
        )
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub platform: String,
    pub find_newer: bool,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let resolved = if opts.find_newer {
        resolve::find_solution_stack_from_string(&session.eb_manager, &opts.platform, true).await?
    } else {
        resolve::get_platform_for_platform_string(&session.eb_manager, &opts.platform).await?
    };

    common::print_line(
        Color::Green,
        &format!("'{}' resolved to\n  {}\n", opts.platform, resolved),
    )?;
    match &resolved {
        Platform::SolutionStack(ss) => {
            println!("  Kind: solution stack");
            println!("  Language: {}", ss.language_name());
            println!("  Shorthand: {}", ss.platform_shorthand());
            println!("  Pythonified: {}", ss.pythonify());
        }
        Platform::PlatformVersion(pv) => {
            println!(
                "  Kind: {}",
                if pv.is_custom() {
                    "custom platform version"
                } else {
                    "managed platform version"
                }
            );
            println!("  Name: {}", pv.platform_shorthand);
            println!("  Version: {}", pv.platform_version);
            if let Some(branch) = &pv.platform_branch_name {
                println!("  Branch: {}", branch);
            }
            if let Some(state) = &pv.platform_lifecycle_state {
                println!("  Lifecycle: {}", state);
            }
        }
    }
    println!(
        "  Enhanced health (group v2): {}",
        resolved.has_healthd_group_version_2_support()
    );
    Ok(())
}
