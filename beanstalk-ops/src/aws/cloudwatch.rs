use std::{
    collections::HashMap,
    time::{Duration, SystemTime},
};

use aws_sdk_cloudwatchlogs::{types::OrderBy, Client as LogsClient};
use aws_types::SdkConfig;
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::sleep,
};

use crate::{
    aws::is_error_retryable,
    environment::unix_millis,
    errors::{Error::API, Result},
};

/// Number of most recently written streams followed per log group.
const MAX_STREAMS: i32 = 10;

/// Implements AWS CloudWatch Logs manager.
#[derive(Debug, Clone)]
pub struct Manager {
    #[allow(dead_code)]
    shared_config: SdkConfig,
    logs_cli: LogsClient,
}

/// One log event read from a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub log_group: String,
    pub log_stream: String,
    /// Milliseconds since epoch.
    pub timestamp: i64,
    pub message: String,
}

impl LogLine {
    /// e.g., "[i-0abc] GET / 200"
    pub fn format(&self) -> String {
        format!("[{}] {}", self.log_stream, self.message.trim_end())
    }
}

/// Where the next read of a stream starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadFrom {
    /// First read of the stream: events at or after the time (milliseconds since epoch).
    Time(i64),
    /// Forward token returned by the previous read.
    Token(String),
}

/// Streams not read yet start at "started_at" so that only new events are tailed.
pub fn next_read(tokens: &HashMap<String, String>, log_stream: &str, started_at: i64) -> ReadFrom {
    match tokens.get(log_stream) {
        Some(token) => ReadFrom::Token(token.clone()),
        None => ReadFrom::Time(started_at),
    }
}

/// Log group prefix Elastic Beanstalk streams instance logs to.
/// e.g., "/aws/elasticbeanstalk/my-env/"
pub fn environment_log_group_prefix(environment_name: &str) -> String {
    format!("/aws/elasticbeanstalk/{}/", environment_name)
}

impl Manager {
    pub fn new(shared_config: &SdkConfig) -> Self {
        let cloned = shared_config.clone();
        let logs_cli = LogsClient::new(shared_config);
        Self {
            shared_config: cloned,
            logs_cli,
        }
    }

    pub async fn describe_log_groups(&self, prefix: &str) -> Result<Vec<String>> {
        let resp = self
            .logs_cli
            .describe_log_groups()
            .log_group_name_prefix(prefix)
            .send()
            .await
            .map_err(|e| API {
                message: format!("failed describe_log_groups {:?}", e),
                is_retryable: is_error_retryable(&e),
            })?;
        Ok(resp
            .log_groups()
            .unwrap_or_default()
            .iter()
            .filter_map(|g| g.log_group_name().map(String::from))
            .collect())
    }

    /// Lists the stream names of the group, most recently written first.
    pub async fn describe_log_streams(&self, log_group_name: &str) -> Result<Vec<String>> {
        let resp = self
            .logs_cli
            .describe_log_streams()
            .log_group_name(log_group_name)
            .order_by(OrderBy::LastEventTime)
            .descending(true)
            .limit(MAX_STREAMS)
            .send()
            .await
            .map_err(|e| API {
                message: format!("failed describe_log_streams {:?}", e),
                is_retryable: is_error_retryable(&e),
            })?;
        Ok(resp
            .log_streams()
            .unwrap_or_default()
            .iter()
            .filter_map(|s| s.log_stream_name().map(String::from))
            .collect())
    }

    /// Reads the next page of events, oldest first.
    /// Returns the events and the token to continue from.
    pub async fn get_log_events(
        &self,
        log_group_name: &str,
        log_stream_name: &str,
        from: &ReadFrom,
    ) -> Result<(Vec<LogLine>, Option<String>)> {
        let mut req = self
            .logs_cli
            .get_log_events()
            .log_group_name(log_group_name)
            .log_stream_name(log_stream_name)
            .start_from_head(true);
        req = match from {
            ReadFrom::Time(start_time) => req.start_time(*start_time),
            ReadFrom::Token(token) => req.next_token(token),
        };
        let resp = req
            .send()
            .await
            .map_err(|e| API {
                message: format!("failed get_log_events {:?}", e),
                is_retryable: is_error_retryable(&e),
            })?;

        let lines = resp
            .events()
            .unwrap_or_default()
            .iter()
            .map(|ev| {
                let ts: Option<i64> = ev.timestamp().into();
                LogLine {
                    log_group: log_group_name.to_string(),
                    log_stream: log_stream_name.to_string(),
                    timestamp: ts.unwrap_or_default(),
                    message: ev.message().unwrap_or_default().to_string(),
                }
            })
            .collect();
        Ok((lines, resp.next_forward_token().map(String::from)))
    }
}

/// Tails every stream of the log group in a background task.
/// New lines are sent to "lines" until "stop" flips to "true" or the
/// receiver is dropped.
pub fn stream_log_group(
    manager: Manager,
    log_group_name: String,
    interval: Duration,
    mut stop: watch::Receiver<bool>,
    lines: mpsc::UnboundedSender<LogLine>,
) -> JoinHandle<Result<()>> {
    tokio::spawn(async move {
        log::info!("start streaming log group '{}'", log_group_name);

        let started_at = unix_millis(SystemTime::now());
        // forward token per stream
        let mut tokens: HashMap<String, String> = HashMap::new();
        loop {
            if *stop.borrow() {
                break;
            }

            let streams = match manager.describe_log_streams(&log_group_name).await {
                Ok(v) => v,
                Err(e) if e.is_retryable() => {
                    log::warn!("retrying describe_log_streams ({})", e);
                    Vec::new()
                }
                Err(e) => return Err(e),
            };

            for stream in streams.iter() {
                let from = next_read(&tokens, stream, started_at);
                let (events, next) = match manager
                    .get_log_events(&log_group_name, stream, &from)
                    .await
                {
                    Ok(v) => v,
                    Err(e) if e.is_retryable() => {
                        log::warn!("retrying get_log_events ({})", e);
                        continue;
                    }
                    Err(e) => return Err(e),
                };
                for line in events {
                    if lines.send(line).is_err() {
                        log::info!("log receiver dropped; stop streaming '{}'", log_group_name);
                        return Ok(());
                    }
                }
                if let Some(next) = next {
                    tokens.insert(stream.clone(), next);
                }
            }

            tokio::select! {
                ret = stop.changed() => {
                    if ret.is_err() {
                        // stop sender dropped
                        break;
                    }
                }
                _ = sleep(interval) => {}
            }
        }

        log::info!("stopped streaming log group '{}'", log_group_name);
        Ok(())
    })
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- aws::cloudwatch::test_log_line --exact --show-output
#[test]
fn test_log_line() {
    assert_eq!(
        environment_log_group_prefix("my-env"),
        "/aws/elasticbeanstalk/my-env/"
    );

    let line = LogLine {
        log_group: String::from("/aws/elasticbeanstalk/my-env/var/log/web.stdout.log"),
        log_stream: String::from("i-0abc"),
        timestamp: 1_693_562_400_000,
        message: String::from("GET / 200\n"),
    };
    assert_eq!(line.format(), "[i-0abc] GET / 200");
}

/// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- aws::cloudwatch::test_next_read --exact --show-output
#[test]
fn test_next_read() {
    let started_at: i64 = 1_693_562_400_000;
    let mut tokens = HashMap::new();

    // a stream seen for the first time is tailed from when streaming started
    assert_eq!(next_read(&tokens, "i-0abc", started_at), ReadFrom::Time(started_at));

    tokens.insert(String::from("i-0abc"), String::from("f/3715"));
    assert_eq!(
        next_read(&tokens, "i-0abc", started_at),
        ReadFrom::Token(String::from("f/3715"))
    );
    assert_eq!(next_read(&tokens, "i-0def", started_at), ReadFrom::Time(started_at));
}
