use std::io;

use beanstalk_ops::{
    platform,
    resolve::{self, PlatformCatalog},
    solution_stack,
};
use clap::{Arg, Command};

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "list";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Lists the available platforms")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(
            Arg::new("CUSTOM")
                .long("custom")
                .help("Lists the custom platforms of the account")
                .required(false)
                .num_args(0),
        )
        .arg(
            Arg::new("STATUS")
                .long("status")
                .help("Only lists custom platform versions in the status (e.g., Ready, Failed)")
                .required(false)
                .num_args(1)
                .requires("CUSTOM"),
        )
        .arg(
            Arg::new("VERBOSE")
                .long("verbose")
                .short('v')
                .help("Lists every solution stack or custom platform version")
                .required(false)
                .num_args(0),
        )
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub custom: bool,
    pub status: Option<String>,
    pub verbose: bool,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;

    if opts.custom {
        let summaries = resolve::list_custom_platform_versions(
            &session.eb_manager,
            None,
            None,
            opts.status.as_deref(),
        )
        .await?;
        let lines = if opts.verbose || opts.status.is_some() {
            platform::format_platform_descriptions(&summaries, true)
        } else {
            let arns: Vec<String> = summaries.into_iter().map(|s| s.platform_arn).collect();
            platform::group_custom_platforms_by_platform_name(&arns)
        };
        for l in lines.iter() {
            println!("{}", l);
        }
        return Ok(());
    }

    let mut stacks = session.eb_manager.list_available_solution_stacks().await?;
    stacks.sort();
    if opts.verbose {
        for ss in stacks.iter() {
            println!("{}", ss.name);
        }
        return Ok(());
    }
    for g in solution_stack::group_by_platform_shorthand(&stacks, None).iter() {
        println!("{}", g.platform_shorthand);
    }
    Ok(())
}
