use std::{
    fs,
    io::{self, Error, ErrorKind},
    path::PathBuf,
    time::{Duration, Instant, SystemTime},
};

use beanstalk_ops::{
    aws::{cloudwatch, elasticbeanstalk},
    environment::{self, InstanceLogInfo},
    project::PROJECT_DIR,
};
use clap::{Arg, Command};
use crossterm::style::Color;
use tokio::{
    sync::{mpsc, watch},
    time::sleep,
};

use crate::common::{self, GlobalFlags, Session};

pub const NAME: &str = "logs";

const RETRIEVE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const RETRIEVE_INTERVAL: Duration = Duration::from_secs(5);
const STREAM_INTERVAL: Duration = Duration::from_secs(3);

pub fn command() -> Command {
    Command::new(NAME)
        .about("Retrieves the instance logs of the environment")
        .arg(common::log_level_arg())
        .arg(common::region_arg())
        .arg(common::profile_arg())
        .arg(common::environment_name_arg())
        .arg(
            Arg::new("ALL")
                .long("all")
                .help("Downloads full log bundles into the project directory instead of the last lines")
                .required(false)
                .num_args(0)
                .conflicts_with("STREAM"),
        )
        .arg(
            Arg::new("INSTANCE")
                .long("instance")
                .short('i')
                .help("Only shows the logs of the instance")
                .required(false)
                .num_args(1),
        )
        .arg(
            Arg::new("STREAM")
                .long("stream")
                .help("Streams the CloudWatch Logs of the environment until interrupted")
                .required(false)
                .num_args(0),
        )
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Flags {
    pub global: GlobalFlags,
    pub environment_name: Option<String>,
    pub all: bool,
    pub instance: Option<String>,
    pub stream: bool,
}

pub async fn execute(opts: Flags) -> io::Result<()> {
    common::init_logger(&opts.global.log_level);

    let session = Session::load(&opts.global).await?;
    let environment_name = session.environment_name(opts.environment_name.as_ref())?;

    if opts.stream {
        return stream(&session, &environment_name).await;
    }

    let requested_at = SystemTime::now();
    session
        .eb_manager
        .request_environment_info(&environment_name, opts.all)
        .await?;
    common::print_line(
        Color::Blue,
        &format!("\nRequested logs from '{}'\n", environment_name),
    )?;

    let infos = wait_for_log_info(&session, &environment_name, opts.all, requested_at).await?;
    let infos: Vec<InstanceLogInfo> = infos
        .into_iter()
        .filter(|i| match &opts.instance {
            Some(id) => &i.ec2_instance_id == id,
            None => true,
        })
        .collect();
    if infos.is_empty() {
        return Err(Error::new(
            ErrorKind::NotFound,
            "no logs were published for the requested instances",
        ));
    }

    if opts.all {
        let dir = log_bundle_dir(&session, requested_at)?;
        for info in infos.iter() {
            let bytes = download(&info.message).await?.bytes().await.map_err(|e| {
                Error::new(ErrorKind::Other, format!("failed to read log bundle ({})", e))
            })?;
            let p = dir.join(format!("{}.zip", info.ec2_instance_id));
            fs::write(&p, &bytes)?;
            common::print_line(
                Color::Green,
                &format!("saved '{}' logs to '{}'\n", info.ec2_instance_id, p.display()),
            )?;
        }
        return Ok(());
    }

    for info in infos.iter() {
        let text = download(&info.message).await?.text().await.map_err(|e| {
            Error::new(ErrorKind::Other, format!("failed to read logs ({})", e))
        })?;
        common::print_line(
            Color::Green,
            &format!(
                "\n============= {} ({}) =============\n",
                info.ec2_instance_id, info.sample_timestamp
            ),
        )?;
        println!("{}", text);
    }
    Ok(())
}

/// Retrieves until every instance published logs sampled after the request.
async fn wait_for_log_info(
    session: &Session,
    environment_name: &str,
    bundle: bool,
    requested_at: SystemTime,
) -> io::Result<Vec<InstanceLogInfo>> {
    let start = Instant::now();
    loop {
        sleep(RETRIEVE_INTERVAL).await;

        let infos = session
            .eb_manager
            .retrieve_environment_info(environment_name, bundle)
            .await?;
        let latest = environment::latest_log_info_per_instance(&infos, requested_at);
        if !latest.is_empty() {
            return Ok(latest);
        }
        if start.elapsed() > RETRIEVE_TIMEOUT {
            return Err(Error::new(
                ErrorKind::TimedOut,
                format!("logs of '{}' were not published in time", environment_name),
            ));
        }
        log::info!("logs not published yet (elapsed {:?})", start.elapsed());
    }
}

fn log_bundle_dir(session: &Session, requested_at: SystemTime) -> io::Result<PathBuf> {
    let root = session.project()?.root.clone();
    let dir = root
        .join(PROJECT_DIR)
        .join("logs")
        .join(elasticbeanstalk::format_system_time(requested_at).replace(':', "-"));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

async fn download(url: &str) -> io::Result<reqwest::Response> {
    let resp = reqwest::get(url)
        .await
        .map_err(|e| Error::new(ErrorKind::Other, format!("failed to fetch logs ({})", e)))?;
    if !resp.status().is_success() {
        return Err(Error::new(
            ErrorKind::Other,
            format!("failed to fetch logs (status {})", resp.status()),
        ));
    }
    Ok(resp)
}

/// Tails every log group of the environment until ctrl-c.
async fn stream(session: &Session, environment_name: &str) -> io::Result<()> {
    let manager = cloudwatch::Manager::new(&session.shared_config);
    let prefix = cloudwatch::environment_log_group_prefix(environment_name);
    let groups = manager.describe_log_groups(&prefix).await?;
    if groups.is_empty() {
        return Err(Error::new(
            ErrorKind::NotFound,
            format!(
                "no log groups under '{}' (is log streaming enabled for '{}'?)",
                prefix, environment_name
            ),
        ));
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    let (lines_tx, mut lines_rx) = mpsc::unbounded_channel();
    let mut handles = Vec::new();
    for group in groups {
        common::print_line(Color::Blue, &format!("streaming '{}'\n", group))?;
        handles.push(cloudwatch::stream_log_group(
            manager.clone(),
            group,
            STREAM_INTERVAL,
            stop_rx.clone(),
            lines_tx.clone(),
        ));
    }
    drop(lines_tx);

    loop {
        tokio::select! {
            line = lines_rx.recv() => {
                match line {
                    Some(l) => println!("{}", l.format()),
                    None => break,
                }
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("received ctrl-c; stopping");
                break;
            }
        }
    }

    let _ = stop_tx.send(true);
    drop(lines_rx);
    for h in handles {
        match h.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("log streaming failed ({})", e),
            Err(e) => log::warn!("log streaming task failed ({})", e),
        }
    }
    Ok(())
}
