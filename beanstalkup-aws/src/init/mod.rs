use std::{
    env,
    io::{self, Error, ErrorKind},
};

use beanstalk_ops::{
    aws::elasticbeanstalk,
    platform,
    project::{Config, Project, WorkspaceType},
    resolve::{self, PlatformCatalog},
    solution_stack,
};
use clap::{Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "init";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Initializes the current directory as an Elastic Beanstalk project")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(
            Arg::new("APPLICATION_NAME")
                .help("Sets the application name (defaults to the directory name)")
                .required(false)
                .num_args(1),
        )
        .arg(
            Arg::new("PLATFORM")
                .long("platform")
                .short('p')
                .help("Sets the default platform (prompts for one if not given)")
                .required(false)
                .num_args(1),
        )
        .arg(
            Arg::new("KEYNAME")
                .long("keyname")
                .short('k')
                .help("Sets the default EC2 key pair name for SSH")
                .required(false)
                .num_args(1),
        )
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub application_name: Option<String>,
    pub platform: Option<String>,
    pub keyname: Option<String>,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let cwd = env::current_dir()?;

    let application_name = match &opts.application_name {
        Some(v) => v.clone(),
        None => match &session.project {
            Some(p) => p.application_name().unwrap_or_default(),
            None => String::new(),
        },
    };
    let application_name = if application_name.is_empty() {
        cwd.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidInput,
                    "cannot derive the application name from the directory",
                )
            })?
    } else {
        application_name
    };

    let platform_string = match &opts.platform {
        Some(p) => p.clone(),
        None => prompt_for_platform(&session).await?,
    };
    let resolved =
        resolve::get_platform_for_platform_string(&session.eb_manager, &platform_string).await?;
    log::info!("resolved platform '{}' to '{}'", platform_string, resolved);

    elasticbeanstalk::ensure_application(
        &session.eb_manager,
        &application_name,
        common::APPLICATION_DESCRIPTION,
    )
    .await?;

    let mut project = match session.project.clone() {
        Some(p) => p,
        None => Project {
            root: cwd.clone(),
            config: Config::new(&application_name, &session.region),
        },
    };
    project.config.global.application_name = Some(application_name.clone());
    project.config.global.default_region = Some(session.region.clone());
    project.config.global.default_platform = Some(platform_string.clone());
    project.config.global.workspace_type = WorkspaceType::Application;
    if let Some(p) = &opts.global.profile {
        project.config.global.profile = Some(p.clone());
    }
    if let Some(k) = &opts.keyname {
        project.config.global.default_ec2_keyname = Some(k.clone());
    }
    project.save()?;

    common::print_line(
        Color::Green,
        &format!(
            "\nInitialized '{}' in '{}' with platform '{}'\n",
            application_name,
            project.root.display(),
            resolved
        ),
    )?;
    Ok(())
}

/// Asks for the platform family, then for one of its branches.
async fn prompt_for_platform(session: &Session) -> io::Result<String> {
    let branches = resolve::list_nonretired_platform_branches(&session.eb_manager).await?;
    if branches.is_empty() {
        log::info!("no platform branches; prompting by language");
        return prompt_for_solution_stack(session).await;
    }

    let families = platform::collect_families_from_branches(&branches);
    let family = if families.len() == 1 {
        families[0].clone()
    } else {
        let idx = common::select("Select a platform", &families)?;
        families[idx].clone()
    };

    let mut family_branches: Vec<_> = branches
        .into_iter()
        .filter(|b| b.platform_name == family)
        .collect();
    platform::sort_platform_branches_for_prompt(&mut family_branches);
    if family_branches.len() == 1 {
        return Ok(family_branches[0].branch_name.clone());
    }

    let items: Vec<String> = family_branches
        .iter()
        .map(platform::platform_branch_prompt_text)
        .collect();
    let idx = common::select("Select a platform branch", &items)?;
    Ok(family_branches[idx].branch_name.clone())
}

/// Asks for the language, then for one of its versions.
async fn prompt_for_solution_stack(session: &Session) -> io::Result<String> {
    let mut stacks = session.eb_manager.list_available_solution_stacks().await?;
    stacks.sort();

    let languages: Vec<String> = solution_stack::group_by_language_name(&stacks)
        .into_iter()
        .map(|g| g.language_name)
        .collect();
    if languages.is_empty() {
        return Err(Error::new(
            ErrorKind::NotFound,
            "no platforms available in this region",
        ));
    }
    let idx = common::select("Select a platform", &languages)?;

    let picked = solution_stack::resolve_language_version(&languages[idx], &stacks, |choices| {
        Ok(common::select("Select a platform version", choices)?)
    })?;
    picked.ok_or_else(|| {
        Error::new(
            ErrorKind::NotFound,
            format!("no platform versions found for '{}'", languages[idx]),
        )
    })
}
