use std::io::{self, Error, ErrorKind};

use beanstalk_ops::{
    aws::elasticbeanstalk::{self, CreateEnvironmentInput},
    bundle,
    environment::{self, Status, Tier},
    resolve,
};
use clap::{value_parser, Arg, Command};
use crossterm::style::Color;

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "create";

pub fn command() -> Command {
    Command::new(NAME)
        .about("Creates a new environment and deploys the project to it")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(
            Arg::new("ENVIRONMENT_NAME")
                .help("Sets the environment name (defaults to '{application}-dev')")
                .required(false)
                .num_args(1),
        )
        .arg(
            Arg::new("PLATFORM")
                .long("platform")
                .short('p')
                .help("Sets the platform (defaults to the project platform)")
                .required(false)
                .num_args(1),
        )
        .arg(
            Arg::new("CNAME")
                .long("cname")
                .short('c')
                .help("Sets the CNAME prefix")
                .required(false)
                .num_args(1),
        )
        .arg(
            Arg::new("TIER")
                .long("tier")
                .short('t')
                .help("Sets the environment tier")
                .required(false)
                .num_args(1)
                .value_parser(["webserver", "worker"])
                .default_value("webserver"),
        )
        .arg(
            Arg::new("INSTANCES")
                .long("instances")
                .help("Sets the number of instances (load balanced when more than one)")
                .required(false)
                .num_args(1)
                .value_parser(value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new("SAMPLE")
                .long("sample")
                .help("Deploys the sample application instead of the project")
                .required(false)
                .num_args(0),
        )
        .arg(
            Arg::new("SET")
                .long("set")
                .help("Sets an option as 'namespace:OptionName=value' (repeatable)")
                .required(false)
                .num_args(1)
                .action(clap::ArgAction::Append),
        )
        .arg(common::no_wait_arg())
        .arg(common::timeout_arg())
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub environment_name: Option<String>,
    pub platform: Option<String>,
    pub cname: Option<String>,
    pub tier: String,
    pub instances: Option<u32>,
    pub sample: bool,
    pub option_settings: Vec<String>,
    pub no_wait: bool,
    pub timeout_in_minutes: u64,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let mut session = Session::load(&opts.global).await?;
    let application_name = session.application_name(None)?;
    let environment_name = opts
        .environment_name
        .clone()
        .unwrap_or_else(|| format!("{}-dev", application_name));

    let platform_string = match &opts.platform {
        Some(p) => p.clone(),
        None => session
            .project()?
            .config
            .global
            .default_platform
            .clone()
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidInput,
                    "no platform given and the project has no default platform",
                )
            })?,
    };
    let resolved =
        resolve::get_platform_for_platform_string(&session.eb_manager, &platform_string).await?;

    let tier: Tier = opts.tier.parse()?;

    let mut option_settings = Vec::new();
    for s in opts.option_settings.iter() {
        option_settings.push(environment::parse_option_setting(s)?);
    }
    match opts.instances {
        Some(1) => option_settings.push(environment::OptionSetting::new(
            environment::NAMESPACE_ENVIRONMENT,
            "EnvironmentType",
            "SingleInstance",
        )),
        Some(n) => {
            option_settings.push(environment::OptionSetting::new(
                environment::NAMESPACE_ENVIRONMENT,
                "EnvironmentType",
                "LoadBalanced",
            ));
            option_settings.extend(environment::scale_option_settings(n));
        }
        None => {}
    }
    if let Some(profile) = &session.project()?.config.global.instance_profile {
        option_settings.push(environment::OptionSetting::new(
            "aws:autoscaling:launchconfiguration",
            "IamInstanceProfile",
            profile,
        ));
    }
    if let Some(keyname) = &session.project()?.config.global.default_ec2_keyname {
        option_settings.push(environment::OptionSetting::new(
            "aws:autoscaling:launchconfiguration",
            "EC2KeyName",
            keyname,
        ));
    }

    if elasticbeanstalk::ensure_application(
        &session.eb_manager,
        &application_name,
        common::APPLICATION_DESCRIPTION,
    )
    .await?
    {
        common::print_line(
            Color::Green,
            &format!("Created application '{}'\n", application_name),
        )?;
    }

    let version_label = if opts.sample {
        None
    } else {
        let label = bundle::version_label("app");
        common::upload_source_bundle(&session, &application_name, &label, None).await?;
        Some(label)
    };

    common::print_line(
        Color::Blue,
        &format!(
            "\nCreating '{}' for '{}' on '{}'\n",
            environment_name, application_name, resolved
        ),
    )?;
    let input = CreateEnvironmentInput {
        application_name: application_name.clone(),
        environment_name: environment_name.clone(),
        target: resolved.to_create_target(),
        tier,
        cname_prefix: opts.cname.clone(),
        version_label,
        option_settings,
    };
    let env = session.eb_manager.create_environment(&input).await?;
    log::info!("created environment {:?}", env);

    if let Some(project) = session.project.as_mut() {
        let branch = project.current_branch();
        project.config.set_environment_for_branch(&branch, &environment_name);
        project.save()?;
    }

    if opts.no_wait {
        return Ok(());
    }
    session
        .wait_for(&environment_name, Status::Ready, opts.timeout_in_minutes)
        .await?;
    Ok(())
}
