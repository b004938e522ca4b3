use std::io;

use beanstalk_ops::{
    platform::{self, PlatformVersion},
    resolve::{self, PlatformCatalog},
};
use clap::{Arg, Command};

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "status";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Describes a custom platform version")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(
            Arg::new("VERSION")
                .help("Sets the version, 'name/version', or ARN (defaults to the workspace platform)")
                .required(false)
                .num_args(1),
        )
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub version: Option<String>,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let arn = super::resolve_version_arn(&session, opts.version.as_deref()).await?;

    let desc = session.eb_manager.describe_platform_version(&arn).await?;
    let mut pv = PlatformVersion::new(&arn)?;
    pv.hydrate(&desc);

    println!("Platform: {}", pv.platform_arn);
    println!("  Name: {}", pv.platform_shorthand);
    println!("  Version: {}", pv.platform_version);
    println!(
        "  Status: {}",
        pv.platform_status.as_deref().unwrap_or("Unknown")
    );
    println!(
        "  Maintainer: {}",
        pv.maintainer.as_deref().unwrap_or("-")
    );
    println!(
        "  Description: {}",
        pv.description.as_deref().unwrap_or("-")
    );
    if let Some(stack) = &pv.solution_stack_name {
        println!("  Solution stack: {}", stack);
    }
    if let Some(os) = &pv.operating_system_name {
        println!(
            "  Operating system: {} {}",
            os,
            pv.operating_system_version.as_deref().unwrap_or("")
        );
    }
    for (name, version) in desc.programming_languages.iter() {
        println!("  Language: {} {}", name, version);
    }
    for (name, version) in desc.frameworks.iter() {
        println!("  Framework: {} {}", name, version);
    }
    if !pv.supported_tier_list.is_empty() {
        println!("  Tiers: {}", pv.supported_tier_list.join(", "));
    }
    println!(
        "  Created: {}",
        pv.date_created.as_deref().unwrap_or("-")
    );
    println!(
        "  Updated: {}",
        pv.date_updated.as_deref().unwrap_or("-")
    );

    // other versions of the same platform
    let summaries = resolve::list_custom_platform_versions(
        &session.eb_manager,
        Some(&pv.platform_shorthand),
        None,
        None,
    )
    .await?;
    let arns: Vec<String> = summaries.into_iter().map(|s| s.platform_arn).collect();
    let mappings = platform::generate_version_to_arn_mappings(&arns, &pv.platform_shorthand);
    if mappings.len() > 1 {
        let versions: Vec<&str> = mappings.keys().map(String::as_str).collect();
        println!("  All versions: {}", versions.join(", "));
    }
    let latest =
        resolve::get_latest_platform_version(&session.eb_manager, &pv.platform_shorthand).await?;
    let next = platform::resolve_version_number(latest.as_deref(), false, false, true)?;
    println!("  Next patch version: {}", next);
    Ok(())
}
