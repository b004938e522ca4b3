use std::io::{self, Error, ErrorKind};

use beanstalk_ops::{aws::elasticbeanstalk, resolve};
use clap::Command;

use crate::common::Session;

pub mod delete;
pub mod events;
pub mod list;
pub mod resolve_platform;
pub mod status;
pub mod use_platform;

pub const NAME: &str = "platform";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Lists, resolves, and manages platforms")
        .subcommand_required(true)
        .subcommands(vec![
            list::command(),
            use_platform::command(),
            status::command(),
            delete::command(),
            resolve_platform::command(),
            events::command(),
        ])
}

/// Resolves a custom platform version ARN from a version of the workspace
/// platform, "name/version", or an ARN. Without input, the workspace
/// platform version (or its latest) is used.
pub(crate) async fn resolve_version_arn(
    session: &Session,
    version: Option<&str>,
) -> io::Result<String> {
    let eb: &elasticbeanstalk::Manager = &session.eb_manager;
    let global = session.project.as_ref().map(|p| &p.config.global);
    let workspace_name = global.and_then(|g| g.platform_name.clone());

    if let Some(v) = version {
        let arn = resolve::version_to_arn(eb, workspace_name.as_deref(), v).await?;
        return Ok(arn);
    }

    let name = workspace_name.ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidInput,
            "no platform version given and no workspace platform set (run 'platform use' first)",
        )
    })?;
    let version = match global.and_then(|g| g.platform_version.clone()) {
        Some(v) => v,
        None => resolve::get_latest_platform_version(eb, &name)
            .await?
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::NotFound,
                    format!("no versions of platform '{}' found", name),
                )
            })?,
    };
    let arn = resolve::version_to_arn(eb, Some(&name), &version).await?;
    Ok(arn)
}
