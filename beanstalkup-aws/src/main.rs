mod abort;
mod appversion;
mod common;
mod config;
mod create;
mod deploy;
mod events;
mod health;
mod init;
mod list;
mod logs;
mod platform;
mod printenv;
mod restore;
mod scale;
mod setenv;
mod status;
mod swap;
mod terminate;
mod upgrade;
mod use_environment;

use std::io;

use clap::{crate_version, ArgMatches, Command};

use crate::common::GlobalFlags;

const APP_NAME: &str = "beanstalkup-aws";

fn app() -> Command {
    Command::new(APP_NAME)
        .version(crate_version!())
        .about("Elastic Beanstalk application and environment tools")
        .subcommand_required(true)
        .subcommands(vec![
            init::command(),
            create::command(),
            deploy::command(),
            config::command(),
            scale::command(),
            terminate::command(),
            restore::command(),
            logs::command(),
            events::command(),
            health::command(),
            status::command(),
            list::command(),
            use_environment::command(),
            upgrade::command(),
            setenv::command(),
            printenv::command(),
            abort::command(),
            swap::command(),
            appversion::command(),
            platform::command(),
        ])
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let matches = app().get_matches();

    match matches.subcommand() {
        Some((init::NAME, sub_matches)) => {
            init::execute(init::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                application_name: sub_matches.get_one::<String>("APPLICATION_NAME").cloned(),
                platform: sub_matches.get_one::<String>("PLATFORM").cloned(),
                keyname: sub_matches.get_one::<String>("KEYNAME").cloned(),
            })
            .await?;
        }

        Some((create::NAME, sub_matches)) => {
            create::execute(create::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                environment_name: sub_matches.get_one::<String>("ENVIRONMENT_NAME").cloned(),
                platform: sub_matches.get_one::<String>("PLATFORM").cloned(),
                cname: sub_matches.get_one::<String>("CNAME").cloned(),
                tier: sub_matches
                    .get_one::<String>("TIER")
                    .unwrap_or(&String::from("webserver"))
                    .clone(),
                instances: sub_matches.get_one::<u32>("INSTANCES").copied(),
                sample: sub_matches.get_flag("SAMPLE"),
                option_settings: get_many(sub_matches, "SET"),
                no_wait: sub_matches.get_flag("NO_WAIT"),
                timeout_in_minutes: get_timeout(sub_matches),
            })
            .await?;
        }

        Some((deploy::NAME, sub_matches)) => {
            deploy::execute(deploy::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                environment_name: sub_matches.get_one::<String>("ENVIRONMENT_NAME").cloned(),
                label: sub_matches.get_one::<String>("LABEL").cloned(),
                message: sub_matches.get_one::<String>("MESSAGE").cloned(),
                version: sub_matches.get_one::<String>("VERSION").cloned(),
                no_wait: sub_matches.get_flag("NO_WAIT"),
                timeout_in_minutes: get_timeout(sub_matches),
            })
            .await?;
        }

        Some((config::NAME, sub_matches)) => {
            config::execute(config::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                environment_name: sub_matches.get_one::<String>("ENVIRONMENT_NAME").cloned(),
                option_settings: get_many(sub_matches, "SET"),
                namespace: sub_matches.get_one::<String>("NAMESPACE").cloned(),
                no_wait: sub_matches.get_flag("NO_WAIT"),
                timeout_in_minutes: get_timeout(sub_matches),
            })
            .await?;
        }

        Some((scale::NAME, sub_matches)) => {
            scale::execute(scale::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                instances: *sub_matches.get_one::<u32>("INSTANCES").unwrap_or(&1),
                environment_name: sub_matches.get_one::<String>("ENVIRONMENT_NAME").cloned(),
                skip_prompt: sub_matches.get_flag("SKIP_PROMPT"),
                no_wait: sub_matches.get_flag("NO_WAIT"),
                timeout_in_minutes: get_timeout(sub_matches),
            })
            .await?;
        }

        Some((terminate::NAME, sub_matches)) => {
            terminate::execute(terminate::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                environment_name: sub_matches.get_one::<String>("ENVIRONMENT_NAME").cloned(),
                all: sub_matches.get_flag("ALL"),
                force: sub_matches.get_flag("FORCE"),
                skip_prompt: sub_matches.get_flag("SKIP_PROMPT"),
                no_wait: sub_matches.get_flag("NO_WAIT"),
                timeout_in_minutes: get_timeout(sub_matches),
            })
            .await?;
        }

        Some((restore::NAME, sub_matches)) => {
            restore::execute(restore::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                environment_id: sub_matches.get_one::<String>("ENVIRONMENT_ID").cloned(),
                skip_prompt: sub_matches.get_flag("SKIP_PROMPT"),
                no_wait: sub_matches.get_flag("NO_WAIT"),
                timeout_in_minutes: get_timeout(sub_matches),
            })
            .await?;
        }

        Some((logs::NAME, sub_matches)) => {
            logs::execute(logs::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                environment_name: sub_matches.get_one::<String>("ENVIRONMENT_NAME").cloned(),
                all: sub_matches.get_flag("ALL"),
                instance: sub_matches.get_one::<String>("INSTANCE").cloned(),
                stream: sub_matches.get_flag("STREAM"),
            })
            .await?;
        }

        Some((events::NAME, sub_matches)) => {
            events::execute(events::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                environment_name: sub_matches.get_one::<String>("ENVIRONMENT_NAME").cloned(),
                max_records: *sub_matches.get_one::<i32>("MAX_RECORDS").unwrap_or(&20),
                follow: sub_matches.get_flag("FOLLOW"),
            })
            .await?;
        }

        Some((health::NAME, sub_matches)) => {
            health::execute(health::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                environment_name: sub_matches.get_one::<String>("ENVIRONMENT_NAME").cloned(),
                refresh: sub_matches.get_flag("REFRESH"),
            })
            .await?;
        }

        Some((status::NAME, sub_matches)) => {
            status::execute(status::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                environment_name: sub_matches.get_one::<String>("ENVIRONMENT_NAME").cloned(),
                check_platform: sub_matches.get_flag("CHECK_PLATFORM"),
            })
            .await?;
        }

        Some((list::NAME, sub_matches)) => {
            list::execute(list::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                application_name: sub_matches.get_one::<String>("APPLICATION_NAME").cloned(),
                all: sub_matches.get_flag("ALL"),
            })
            .await?;
        }

        Some((use_environment::NAME, sub_matches)) => {
            use_environment::execute(use_environment::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                environment_name: sub_matches
                    .get_one::<String>("ENVIRONMENT_NAME")
                    .unwrap_or(&String::new())
                    .clone(),
            })
            .await?;
        }

        Some((upgrade::NAME, sub_matches)) => {
            upgrade::execute(upgrade::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                environment_name: sub_matches.get_one::<String>("ENVIRONMENT_NAME").cloned(),
                no_roll: sub_matches.get_flag("NO_ROLL"),
                skip_prompt: sub_matches.get_flag("SKIP_PROMPT"),
                no_wait: sub_matches.get_flag("NO_WAIT"),
                timeout_in_minutes: get_timeout(sub_matches),
            })
            .await?;
        }

        Some((setenv::NAME, sub_matches)) => {
            setenv::execute(setenv::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                variables: get_many(sub_matches, "VARIABLES"),
                environment_name: sub_matches.get_one::<String>("ENVIRONMENT_NAME").cloned(),
                no_wait: sub_matches.get_flag("NO_WAIT"),
                timeout_in_minutes: get_timeout(sub_matches),
            })
            .await?;
        }

        Some((printenv::NAME, sub_matches)) => {
            printenv::execute(printenv::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                environment_name: sub_matches.get_one::<String>("ENVIRONMENT_NAME").cloned(),
            })
            .await?;
        }

        Some((abort::NAME, sub_matches)) => {
            abort::execute(abort::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                environment_name: sub_matches.get_one::<String>("ENVIRONMENT_NAME").cloned(),
            })
            .await?;
        }

        Some((swap::NAME, sub_matches)) => {
            swap::execute(swap::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                environment_name: sub_matches.get_one::<String>("ENVIRONMENT_NAME").cloned(),
                destination_name: sub_matches.get_one::<String>("DESTINATION_NAME").cloned(),
            })
            .await?;
        }

        Some((appversion::NAME, sub_matches)) => {
            appversion::execute(appversion::Flags {
                global: GlobalFlags::from_matches(sub_matches),
                delete: sub_matches.get_one::<String>("DELETE").cloned(),
                skip_prompt: sub_matches.get_flag("SKIP_PROMPT"),
            })
            .await?;
        }

        Some((platform::NAME, sub_matches)) => match sub_matches.subcommand() {
            Some((platform::list::NAME, sub_sub_matches)) => {
                platform::list::execute(platform::list::Flags {
                    global: GlobalFlags::from_matches(sub_sub_matches),
                    custom: sub_sub_matches.get_flag("CUSTOM"),
                    status: sub_sub_matches.get_one::<String>("STATUS").cloned(),
                    verbose: sub_sub_matches.get_flag("VERBOSE"),
                })
                .await?;
            }
            Some((platform::use_platform::NAME, sub_sub_matches)) => {
                platform::use_platform::execute(platform::use_platform::Flags {
                    global: GlobalFlags::from_matches(sub_sub_matches),
                    platform: sub_sub_matches
                        .get_one::<String>("PLATFORM")
                        .unwrap_or(&String::new())
                        .clone(),
                })
                .await?;
            }
            Some((platform::status::NAME, sub_sub_matches)) => {
                platform::status::execute(platform::status::Flags {
                    global: GlobalFlags::from_matches(sub_sub_matches),
                    version: sub_sub_matches.get_one::<String>("VERSION").cloned(),
                })
                .await?;
            }
            Some((platform::delete::NAME, sub_sub_matches)) => {
                platform::delete::execute(platform::delete::Flags {
                    global: GlobalFlags::from_matches(sub_sub_matches),
                    version: sub_sub_matches.get_one::<String>("VERSION").cloned(),
                    cleanup: sub_sub_matches.get_flag("CLEANUP"),
                    skip_prompt: sub_sub_matches.get_flag("SKIP_PROMPT"),
                })
                .await?;
            }
            Some((platform::resolve_platform::NAME, sub_sub_matches)) => {
                platform::resolve_platform::execute(platform::resolve_platform::Flags {
                    global: GlobalFlags::from_matches(sub_sub_matches),
                    platform: sub_sub_matches
                        .get_one::<String>("PLATFORM")
                        .unwrap_or(&String::new())
                        .clone(),
                    find_newer: sub_sub_matches.get_flag("FIND_NEWER"),
                })
                .await?;
            }
            Some((platform::events::NAME, sub_sub_matches)) => {
                platform::events::execute(platform::events::Flags {
                    global: GlobalFlags::from_matches(sub_sub_matches),
                    version: sub_sub_matches.get_one::<String>("VERSION").cloned(),
                    max_records: *sub_sub_matches.get_one::<i32>("MAX_RECORDS").unwrap_or(&50),
                })
                .await?;
            }
            _ => unreachable!("unknown sub-subcommand"),
        },

        _ => unreachable!("unknown subcommand"),
    }

    Ok(())
}

fn get_many(m: &ArgMatches, id: &str) -> Vec<String> {
    m.get_many::<String>(id)
        .map(|vs| vs.cloned().collect())
        .unwrap_or_default()
}

fn get_timeout(m: &ArgMatches) -> u64 {
    *m.get_one::<u64>("TIMEOUT_IN_MINUTES").unwrap_or(&30)
}

/// RUST_LOG=debug cargo test --package beanstalkup-aws --bin beanstalkup-aws -- test_cli --exact --show-output
#[test]
fn test_cli() {
    app().debug_assert();

    let m = app()
        .try_get_matches_from([
            APP_NAME,
            "config",
            "-e",
            "my-env",
            "--set",
            "aws:autoscaling:asg:MinSize=2",
            "--set",
            "aws:autoscaling:asg:MaxSize=4",
        ])
        .unwrap();
    let (name, sub) = m.subcommand().unwrap();
    assert_eq!(name, config::NAME);
    assert_eq!(
        get_many(sub, "SET"),
        vec![
            "aws:autoscaling:asg:MinSize=2".to_string(),
            "aws:autoscaling:asg:MaxSize=4".to_string()
        ]
    );
    assert_eq!(get_timeout(sub), 30);
    let global = GlobalFlags::from_matches(sub);
    assert_eq!(global.log_level, "info");
    assert!(global.region.is_none());

    let m = app()
        .try_get_matches_from([APP_NAME, "scale", "3", "--skip-prompt", "-r", "us-east-1"])
        .unwrap();
    let (_, sub) = m.subcommand().unwrap();
    assert_eq!(sub.get_one::<u32>("INSTANCES"), Some(&3));
    assert!(sub.get_flag("SKIP_PROMPT"));
    assert_eq!(
        GlobalFlags::from_matches(sub).region.as_deref(),
        Some("us-east-1")
    );

    // zero instances is rejected
    assert!(app().try_get_matches_from([APP_NAME, "scale", "0"]).is_err());
    assert!(app()
        .try_get_matches_from([APP_NAME, "create", "--instances", "0"])
        .is_err());
    let m = app()
        .try_get_matches_from([APP_NAME, "create", "web-dev", "--instances", "2"])
        .unwrap();
    let (_, sub) = m.subcommand().unwrap();
    assert_eq!(sub.get_one::<u32>("INSTANCES"), Some(&2));

    let m = app()
        .try_get_matches_from([APP_NAME, "platform", "resolve", "php-7.1", "--find-newer"])
        .unwrap();
    let (_, sub) = m.subcommand().unwrap();
    let (name, sub_sub) = sub.subcommand().unwrap();
    assert_eq!(name, platform::resolve_platform::NAME);
    assert_eq!(
        sub_sub.get_one::<String>("PLATFORM").map(String::as_str),
        Some("php-7.1")
    );
    assert!(sub_sub.get_flag("FIND_NEWER"));

    // "--status" only makes sense for custom platforms
    assert!(app()
        .try_get_matches_from([APP_NAME, "platform", "list", "--status", "Ready"])
        .is_err());

    // one of a version or "--cleanup"
    assert!(app()
        .try_get_matches_from([APP_NAME, "platform", "delete"])
        .is_err());
    assert!(app()
        .try_get_matches_from([APP_NAME, "platform", "delete", "--cleanup"])
        .is_ok());
}

/// RUST_LOG=debug cargo test --package beanstalkup-aws --bin beanstalkup-aws -- test_environment_commands --exact --show-output
#[test]
fn test_environment_commands() {
    let m = app()
        .try_get_matches_from([APP_NAME, "use", "web-prod"])
        .unwrap();
    let (name, sub) = m.subcommand().unwrap();
    assert_eq!(name, use_environment::NAME);
    assert_eq!(
        sub.get_one::<String>("ENVIRONMENT_NAME").map(String::as_str),
        Some("web-prod")
    );
    assert!(app().try_get_matches_from([APP_NAME, "use"]).is_err());

    let m = app()
        .try_get_matches_from([
            APP_NAME,
            "setenv",
            "DB_HOST=db.internal,DB_PORT=5432",
            "OLD_FLAG=",
            "-e",
            "web-prod",
        ])
        .unwrap();
    let (name, sub) = m.subcommand().unwrap();
    assert_eq!(name, setenv::NAME);
    assert_eq!(
        get_many(sub, "VARIABLES"),
        vec![
            "DB_HOST=db.internal,DB_PORT=5432".to_string(),
            "OLD_FLAG=".to_string()
        ]
    );
    // environment variable updates wait less by default
    assert_eq!(get_timeout(sub), 4);
    assert!(app().try_get_matches_from([APP_NAME, "setenv"]).is_err());

    let m = app()
        .try_get_matches_from([APP_NAME, "upgrade", "--no-roll", "--skip-prompt"])
        .unwrap();
    let (_, sub) = m.subcommand().unwrap();
    assert!(sub.get_flag("NO_ROLL"));
    assert!(sub.get_flag("SKIP_PROMPT"));
    assert_eq!(get_timeout(sub), 30);

    let m = app()
        .try_get_matches_from([APP_NAME, "swap", "-e", "web-blue", "-n", "web-green"])
        .unwrap();
    let (_, sub) = m.subcommand().unwrap();
    assert_eq!(
        sub.get_one::<String>("DESTINATION_NAME").map(String::as_str),
        Some("web-green")
    );

    let m = app()
        .try_get_matches_from([APP_NAME, "appversion", "--delete", "app-230901"])
        .unwrap();
    let (_, sub) = m.subcommand().unwrap();
    assert_eq!(
        sub.get_one::<String>("DELETE").map(String::as_str),
        Some("app-230901")
    );

    for cmd in ["printenv", "abort", "appversion"] {
        assert!(app().try_get_matches_from([APP_NAME, cmd]).is_ok(), "{}", cmd);
    }
}
