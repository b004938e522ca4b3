use std::time::{Duration, Instant, SystemTime};

use async_trait::async_trait;
use aws_sdk_elasticbeanstalk::{
    error::SdkError,
    primitives::{DateTime, DateTimeFormat},
    types::{
        ApplicationVersionDescription, ConfigurationOptionSetting, EnvironmentDescription,
        EnvironmentHealthAttribute, EnvironmentInfoType, EnvironmentTier, EventDescription,
        OptionSpecification, PlatformFilter, S3Location, SearchFilter,
    },
    Client,
};
use aws_types::SdkConfig;
use tokio::time::sleep;

use crate::{
    aws::is_error_retryable,
    environment::{
        ApplicationVersion, Environment, EnvironmentHealth, Event, EventCursor, InstanceLogInfo,
        InstancesHealth, OptionSetting, Status, StatusWatch, Tier,
    },
    errors::{
        Error::{self, NotFound, Other, API},
        Result,
    },
    platform::{Filter, LifecycleState, PlatformBranch, PlatformDescription, PlatformSummary},
    resolve::{CreateTarget, PlatformCatalog},
    solution_stack::SolutionStack,
};

const PAGE_SIZE: i32 = 100;

/// Implements AWS Elastic Beanstalk manager.
#[derive(Debug, Clone)]
pub struct Manager {
    shared_config: SdkConfig,
    cli: Client,
}

/// Application lookups that creating an environment depends on.
#[async_trait]
pub trait ApplicationStore {
    async fn application_exists(&self, application_name: &str) -> Result<bool>;
    async fn create_application(&self, application_name: &str, description: &str) -> Result<()>;
}

/// Creates the application unless it exists.
/// Returns true if it was created.
pub async fn ensure_application<S>(store: &S, application_name: &str, description: &str) -> Result<bool>
where
    S: ApplicationStore + Sync + ?Sized,
{
    if store.application_exists(application_name).await? {
        log::info!("application '{}' already exists", application_name);
        return Ok(false);
    }
    store.create_application(application_name, description).await?;
    Ok(true)
}

/// Parameters of "CreateEnvironment".
#[derive(Debug, Clone)]
pub struct CreateEnvironmentInput {
    pub application_name: String,
    pub environment_name: String,
    pub target: CreateTarget,
    pub tier: Tier,
    pub cname_prefix: Option<String>,
    pub version_label: Option<String>,
    pub option_settings: Vec<OptionSetting>,
}

/// Parameters of "UpdateEnvironment".
#[derive(Debug, Clone, Default)]
pub struct UpdateEnvironmentInput {
    pub environment_name: String,
    pub version_label: Option<String>,
    /// Moves the environment to another solution stack or platform version.
    pub target: Option<CreateTarget>,
    pub option_settings: Vec<OptionSetting>,
    /// Only the namespace and option name are sent.
    pub options_to_remove: Vec<OptionSetting>,
}

impl Manager {
    pub fn new(shared_config: &SdkConfig) -> Self {
        let cloned = shared_config.clone();
        let cli = Client::new(shared_config);
        Self {
            shared_config: cloned,
            cli,
        }
    }

    pub fn region(&self) -> Option<String> {
        self.shared_config.region().map(|r| r.to_string())
    }

    /// Returns the names of the applications, or only the one given.
    pub async fn describe_applications(&self, application_name: Option<&str>) -> Result<Vec<String>> {
        let mut req = self.cli.describe_applications();
        if let Some(name) = application_name {
            req = req.application_names(name);
        }
        let resp = req.send().await.map_err(|e| api_error("describe_applications", e))?;

        Ok(resp
            .applications()
            .unwrap_or_default()
            .iter()
            .filter_map(|a| a.application_name().map(String::from))
            .collect())
    }

    pub async fn application_exists(&self, application_name: &str) -> Result<bool> {
        let names = self.describe_applications(Some(application_name)).await?;
        Ok(names.iter().any(|n| n == application_name))
    }

    pub async fn create_application(&self, application_name: &str, description: &str) -> Result<()> {
        log::info!("creating application '{}'", application_name);
        self.cli
            .create_application()
            .application_name(application_name)
            .description(description)
            .send()
            .await
            .map_err(|e| api_error("create_application", e))?;
        log::info!("created application '{}'", application_name);
        Ok(())
    }

    /// Deletes the application along with its environments.
    pub async fn delete_application(&self, application_name: &str) -> Result<()> {
        log::info!("deleting application '{}'", application_name);
        let ret = self
            .cli
            .delete_application()
            .application_name(application_name)
            .terminate_env_by_force(true)
            .send()
            .await;
        match ret {
            Ok(_) => {}
            Err(e) => {
                let msg = format!("{:?}", e);
                if msg.contains("does not exist") {
                    log::warn!("application '{}' already deleted", application_name);
                    return Ok(());
                }
                return Err(api_error("delete_application", e));
            }
        }
        log::info!("deleted application '{}'", application_name);
        Ok(())
    }

    /// Returns the S3 bucket Elastic Beanstalk keeps application versions in,
    /// creating it if needed.
    pub async fn create_storage_location(&self) -> Result<String> {
        let resp = self
            .cli
            .create_storage_location()
            .send()
            .await
            .map_err(|e| api_error("create_storage_location", e))?;
        resp.s3_bucket().map(String::from).ok_or_else(|| Other {
            message: String::from("create_storage_location returned no bucket"),
            is_retryable: false,
        })
    }

    pub async fn create_application_version(
        &self,
        application_name: &str,
        version_label: &str,
        s3_bucket: &str,
        s3_key: &str,
        description: Option<&str>,
    ) -> Result<ApplicationVersion> {
        log::info!(
            "creating application version '{}' for '{}' from 's3://{}/{}'",
            version_label,
            application_name,
            s3_bucket,
            s3_key
        );
        let resp = self
            .cli
            .create_application_version()
            .application_name(application_name)
            .version_label(version_label)
            .set_description(description.map(String::from))
            .source_bundle(
                S3Location::builder()
                    .s3_bucket(s3_bucket)
                    .s3_key(s3_key)
                    .build(),
            )
            .process(true)
            .send()
            .await
            .map_err(|e| api_error("create_application_version", e))?;

        let status = resp
            .application_version()
            .and_then(|v| v.status())
            .map(|s| s.as_str().to_string());
        Ok(ApplicationVersion {
            application_name: String::from(application_name),
            version_label: String::from(version_label),
            s3_bucket: Some(String::from(s3_bucket)),
            s3_key: Some(String::from(s3_key)),
            status,
            description: description.map(String::from),
            ..Default::default()
        })
    }

    /// Describes environments of the application.
    /// Terminated environments are included when "include_deleted" is set.
    pub async fn describe_environments(
        &self,
        application_name: Option<&str>,
        environment_names: Option<Vec<String>>,
        include_deleted: bool,
    ) -> Result<Vec<Environment>> {
        let resp = self
            .cli
            .describe_environments()
            .set_application_name(application_name.map(String::from))
            .set_environment_names(environment_names)
            .include_deleted(include_deleted)
            .send()
            .await
            .map_err(|e| api_error("describe_environments", e))?;

        Ok(resp
            .environments()
            .unwrap_or_default()
            .iter()
            .map(to_environment)
            .collect())
    }

    /// Describes the live environment with the name.
    pub async fn describe_environment(&self, environment_name: &str) -> Result<Environment> {
        let envs = self
            .describe_environments(None, Some(vec![environment_name.to_string()]), false)
            .await?;
        envs.into_iter()
            .find(|e| e.environment_name == environment_name && e.status != Status::Terminated)
            .ok_or_else(|| NotFound {
                message: format!("environment '{}' not found", environment_name),
            })
    }

    pub async fn create_environment(&self, input: &CreateEnvironmentInput) -> Result<Environment> {
        log::info!(
            "creating environment '{}' for application '{}'",
            input.environment_name,
            input.application_name
        );
        let (tier_name, tier_type) = input.tier.name_and_type();
        let mut req = self
            .cli
            .create_environment()
            .application_name(&input.application_name)
            .environment_name(&input.environment_name)
            .tier(
                EnvironmentTier::builder()
                    .name(tier_name)
                    .r#type(tier_type)
                    .build(),
            )
            .set_cname_prefix(input.cname_prefix.clone())
            .set_version_label(input.version_label.clone())
            .set_option_settings(to_option_settings(&input.option_settings));
        req = match &input.target {
            CreateTarget::SolutionStackName(name) => req.solution_stack_name(name),
            CreateTarget::PlatformArn(arn) => req.platform_arn(arn),
        };

        let resp = req
            .send()
            .await
            .map_err(|e| api_error("create_environment", e))?;
        let env_id = resp.environment_id().unwrap_or_default();
        log::info!("created environment '{}' ({})", input.environment_name, env_id);

        Ok(Environment {
            environment_name: input.environment_name.clone(),
            environment_id: env_id.to_string(),
            application_name: input.application_name.clone(),
            status: resp
                .status()
                .map(|s| Status::from(s.as_str()))
                .unwrap_or(Status::Launching),
            ..Default::default()
        })
    }

    /// Deploys a version and/or applies option settings.
    pub async fn update_environment(
        &self,
        environment_name: &str,
        version_label: Option<&str>,
        option_settings: &[OptionSetting],
    ) -> Result<()> {
        self.update_environment_with(&UpdateEnvironmentInput {
            environment_name: environment_name.to_string(),
            version_label: version_label.map(String::from),
            option_settings: option_settings.to_vec(),
            ..Default::default()
        })
        .await
    }

    pub async fn update_environment_with(&self, input: &UpdateEnvironmentInput) -> Result<()> {
        log::info!(
            "updating environment '{}' (version {:?}, target {:?}, {} option settings, {} removed)",
            input.environment_name,
            input.version_label,
            input.target,
            input.option_settings.len(),
            input.options_to_remove.len()
        );
        let mut req = self
            .cli
            .update_environment()
            .environment_name(&input.environment_name)
            .set_version_label(input.version_label.clone())
            .set_option_settings(to_option_settings(&input.option_settings))
            .set_options_to_remove(to_options_to_remove(&input.options_to_remove));
        req = match &input.target {
            Some(CreateTarget::SolutionStackName(name)) => req.solution_stack_name(name),
            Some(CreateTarget::PlatformArn(arn)) => req.platform_arn(arn),
            None => req,
        };
        req.send()
            .await
            .map_err(|e| api_error("update_environment", e))?;
        Ok(())
    }

    /// Cancels the in-progress update of the environment.
    pub async fn abort_environment_update(&self, environment_name: &str) -> Result<()> {
        log::info!("aborting update of environment '{}'", environment_name);
        self.cli
            .abort_environment_update()
            .environment_name(environment_name)
            .send()
            .await
            .map_err(|e| api_error("abort_environment_update", e))?;
        Ok(())
    }

    pub async fn swap_environment_cnames(
        &self,
        source_environment_name: &str,
        destination_environment_name: &str,
    ) -> Result<()> {
        log::info!(
            "swapping CNAMEs of '{}' and '{}'",
            source_environment_name,
            destination_environment_name
        );
        self.cli
            .swap_environment_cnam_es()
            .source_environment_name(source_environment_name)
            .destination_environment_name(destination_environment_name)
            .send()
            .await
            .map_err(|e| api_error("swap_environment_cnames", e))?;
        Ok(())
    }

    /// Describes the versions of the application, newest first.
    pub async fn describe_application_versions(
        &self,
        application_name: &str,
    ) -> Result<Vec<ApplicationVersion>> {
        let mut versions = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let resp = self
                .cli
                .describe_application_versions()
                .application_name(application_name)
                .max_records(PAGE_SIZE)
                .set_next_token(token.clone())
                .send()
                .await
                .map_err(|e| api_error("describe_application_versions", e))?;
            versions.extend(
                resp.application_versions()
                    .unwrap_or_default()
                    .iter()
                    .map(to_application_version),
            );

            token = resp.next_token().map(String::from);
            if token.is_none() {
                break;
            }
        }
        versions.sort_by(|a, b| b.date_created_millis.cmp(&a.date_created_millis));
        Ok(versions)
    }

    pub async fn delete_application_version(
        &self,
        application_name: &str,
        version_label: &str,
        delete_source_bundle: bool,
    ) -> Result<()> {
        log::info!(
            "deleting application version '{}' of '{}'",
            version_label,
            application_name
        );
        self.cli
            .delete_application_version()
            .application_name(application_name)
            .version_label(version_label)
            .delete_source_bundle(delete_source_bundle)
            .send()
            .await
            .map_err(|e| api_error("delete_application_version", e))?;
        Ok(())
    }

    pub async fn terminate_environment(&self, environment_name: &str, force: bool) -> Result<()> {
        log::info!("terminating environment '{}'", environment_name);
        self.cli
            .terminate_environment()
            .environment_name(environment_name)
            .force_terminate(force)
            .send()
            .await
            .map_err(|e| api_error("terminate_environment", e))?;
        Ok(())
    }

    /// Rebuilds the environment by its ID.
    /// Recently terminated environments are restored this way.
    pub async fn rebuild_environment(&self, environment_id: &str) -> Result<()> {
        log::info!("rebuilding environment '{}'", environment_id);
        self.cli
            .rebuild_environment()
            .environment_id(environment_id)
            .send()
            .await
            .map_err(|e| api_error("rebuild_environment", e))?;
        Ok(())
    }

    pub async fn describe_configuration_settings(
        &self,
        application_name: &str,
        environment_name: &str,
    ) -> Result<Vec<OptionSetting>> {
        let resp = self
            .cli
            .describe_configuration_settings()
            .application_name(application_name)
            .environment_name(environment_name)
            .send()
            .await
            .map_err(|e| api_error("describe_configuration_settings", e))?;

        let mut settings = Vec::new();
        for cfg in resp.configuration_settings().unwrap_or_default().iter() {
            for o in cfg.option_settings().unwrap_or_default().iter() {
                settings.push(OptionSetting {
                    namespace: o.namespace().unwrap_or_default().to_string(),
                    option_name: o.option_name().unwrap_or_default().to_string(),
                    value: o.value().map(String::from),
                });
            }
        }
        Ok(settings)
    }

    /// Describes events, newest first.
    pub async fn describe_events(
        &self,
        application_name: Option<&str>,
        environment_name: Option<&str>,
        platform_arn: Option<&str>,
        start_time: Option<SystemTime>,
        max_records: Option<i32>,
    ) -> Result<Vec<Event>> {
        let resp = self
            .cli
            .describe_events()
            .set_application_name(application_name.map(String::from))
            .set_environment_name(environment_name.map(String::from))
            .set_platform_arn(platform_arn.map(String::from))
            .set_start_time(start_time.map(DateTime::from))
            .set_max_records(max_records)
            .send()
            .await
            .map_err(|e| api_error("describe_events", e))?;

        Ok(resp
            .events()
            .unwrap_or_default()
            .iter()
            .map(to_event)
            .collect())
    }

    pub async fn describe_environment_health(&self, environment_name: &str) -> Result<EnvironmentHealth> {
        let resp = self
            .cli
            .describe_environment_health()
            .environment_name(environment_name)
            .attribute_names(EnvironmentHealthAttribute::All)
            .send()
            .await
            .map_err(|e| api_error("describe_environment_health", e))?;

        let instances_health = resp.instances_health().map(|h| {
            let no_data: Option<i32> = h.no_data().into();
            let unknown: Option<i32> = h.unknown().into();
            let pending: Option<i32> = h.pending().into();
            let ok: Option<i32> = h.ok().into();
            let info: Option<i32> = h.info().into();
            let warning: Option<i32> = h.warning().into();
            let degraded: Option<i32> = h.degraded().into();
            let severe: Option<i32> = h.severe().into();
            InstancesHealth {
                no_data: no_data.unwrap_or_default(),
                unknown: unknown.unwrap_or_default(),
                pending: pending.unwrap_or_default(),
                ok: ok.unwrap_or_default(),
                info: info.unwrap_or_default(),
                warning: warning.unwrap_or_default(),
                degraded: degraded.unwrap_or_default(),
                severe: severe.unwrap_or_default(),
            }
        });

        Ok(EnvironmentHealth {
            environment_name: resp
                .environment_name()
                .unwrap_or(environment_name)
                .to_string(),
            health_status: resp.health_status().map(String::from),
            status: resp.status().map(|s| s.as_str().to_string()),
            color: resp.color().map(String::from),
            causes: resp.causes().unwrap_or_default().to_vec(),
            instances_health,
        })
    }

    /// Asks the instances to upload their logs.
    /// "bundle" requests full log bundles instead of the last 100 lines.
    pub async fn request_environment_info(&self, environment_name: &str, bundle: bool) -> Result<()> {
        self.cli
            .request_environment_info()
            .environment_name(environment_name)
            .info_type(info_type(bundle))
            .send()
            .await
            .map_err(|e| api_error("request_environment_info", e))?;
        Ok(())
    }

    pub async fn retrieve_environment_info(
        &self,
        environment_name: &str,
        bundle: bool,
    ) -> Result<Vec<InstanceLogInfo>> {
        let resp = self
            .cli
            .retrieve_environment_info()
            .environment_name(environment_name)
            .info_type(info_type(bundle))
            .send()
            .await
            .map_err(|e| api_error("retrieve_environment_info", e))?;

        Ok(resp
            .environment_info()
            .unwrap_or_default()
            .iter()
            .map(|i| InstanceLogInfo {
                ec2_instance_id: i.ec2_instance_id().unwrap_or_default().to_string(),
                message: i.message().unwrap_or_default().to_string(),
                sample_timestamp: format_date(i.sample_timestamp()),
                sample_millis: date_millis(i.sample_timestamp()),
            })
            .collect())
    }

    pub async fn delete_platform_version(&self, platform_arn: &str) -> Result<()> {
        log::info!("deleting platform version '{}'", platform_arn);
        self.cli
            .delete_platform_version()
            .platform_arn(platform_arn)
            .send()
            .await
            .map_err(|e| api_error("delete_platform_version", e))?;
        Ok(())
    }

    /// Polls the environment status until it reaches the desired one.
    /// Events published while waiting are handed to "on_event", oldest first.
    pub async fn poll_environment<F>(
        &self,
        environment_name: &str,
        desired_status: Status,
        timeout: Duration,
        interval: Duration,
        mut on_event: F,
    ) -> Result<Environment>
    where
        F: FnMut(&Event),
    {
        log::info!(
            "polling environment '{}' with desired status {} for timeout {:?} and interval {:?}",
            environment_name,
            desired_status,
            timeout,
            interval,
        );

        let mut cursor = EventCursor::new();
        let mut watch = StatusWatch::new(environment_name, desired_status.clone());
        let mut since = SystemTime::now();

        let start = Instant::now();
        let mut cnt: u128 = 0;
        loop {
            let elapsed = start.elapsed();
            if elapsed.gt(&timeout) {
                break;
            }

            let itv = {
                if cnt == 0 {
                    // first poll with short wait
                    Duration::from_secs(1)
                } else {
                    interval
                }
            };
            sleep(itv).await;

            let polled_at = SystemTime::now();
            let events = self
                .describe_events(None, Some(environment_name), None, Some(since), None)
                .await?;
            for ev in cursor.advance(&events) {
                on_event(ev);
            }
            since = polled_at - Duration::from_secs(1);

            let envs = self
                .describe_environments(None, Some(vec![environment_name.to_string()]), true)
                .await?;
            let current = match envs
                .into_iter()
                .filter(|e| e.environment_name == environment_name)
                .max_by_key(|e| e.date_updated_millis)
            {
                Some(v) => v,
                None => {
                    return Err(NotFound {
                        message: format!("environment '{}' not found", environment_name),
                    })
                }
            };
            log::info!(
                "poll (current {}, health {:?}, elapsed {:?})",
                current.status,
                current.health,
                elapsed
            );

            if watch.observe(&current.status)? {
                return Ok(current);
            }

            cnt += 1;
        }

        Err(Other {
            message: format!("failed to poll environment {} in time", environment_name),
            is_retryable: true,
        })
    }
}

#[async_trait]
impl ApplicationStore for Manager {
    async fn application_exists(&self, application_name: &str) -> Result<bool> {
        Manager::application_exists(self, application_name).await
    }

    async fn create_application(&self, application_name: &str, description: &str) -> Result<()> {
        Manager::create_application(self, application_name, description).await
    }
}

#[async_trait]
impl PlatformCatalog for Manager {
    async fn list_available_solution_stacks(&self) -> Result<Vec<SolutionStack>> {
        let resp = self
            .cli
            .list_available_solution_stacks()
            .send()
            .await
            .map_err(|e| api_error("list_available_solution_stacks", e))?;
        let names = resp.solution_stacks().unwrap_or_default();
        log::debug!("listed {} solution stacks", names.len());
        Ok(SolutionStack::from_names(names))
    }

    async fn list_platform_versions(&self, filters: &[Filter]) -> Result<Vec<PlatformSummary>> {
        let platform_filters: Vec<PlatformFilter> = filters
            .iter()
            .map(|f| {
                PlatformFilter::builder()
                    .r#type(&f.key)
                    .operator(&f.operator)
                    .set_values(Some(f.values.clone()))
                    .build()
            })
            .collect();

        let mut summaries = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let resp = self
                .cli
                .list_platform_versions()
                .set_filters(Some(platform_filters.clone()))
                .max_records(PAGE_SIZE)
                .set_next_token(token.clone())
                .send()
                .await
                .map_err(|e| api_error("list_platform_versions", e))?;

            for s in resp.platform_summary_list().unwrap_or_default().iter() {
                let arn = match s.platform_arn() {
                    Some(v) => v,
                    None => continue,
                };
                summaries.push(PlatformSummary {
                    platform_arn: arn.to_string(),
                    platform_owner: s.platform_owner().map(String::from),
                    platform_status: s.platform_status().map(|v| v.as_str().to_string()),
                    platform_category: s.platform_category().map(String::from),
                    platform_lifecycle_state: s.platform_lifecycle_state().map(String::from),
                    platform_version: s.platform_version().map(String::from),
                    platform_branch_name: s.platform_branch_name().map(String::from),
                    platform_branch_lifecycle_state: s
                        .platform_branch_lifecycle_state()
                        .map(String::from),
                    operating_system_name: s.operating_system_name().map(String::from),
                    operating_system_version: s.operating_system_version().map(String::from),
                    supported_tier_list: s.supported_tier_list().unwrap_or_default().to_vec(),
                });
            }

            token = resp.next_token().map(String::from);
            if token.is_none() {
                break;
            }
        }
        log::debug!("listed {} platform versions", summaries.len());
        Ok(summaries)
    }

    async fn describe_platform_version(&self, platform_arn: &str) -> Result<PlatformDescription> {
        let resp = self
            .cli
            .describe_platform_version()
            .platform_arn(platform_arn)
            .send()
            .await
            .map_err(|e| api_error("describe_platform_version", e))?;

        let d = resp.platform_description().ok_or_else(|| NotFound {
            message: format!("platform '{}' not found", platform_arn),
        })?;
        Ok(PlatformDescription {
            platform_arn: d.platform_arn().unwrap_or(platform_arn).to_string(),
            platform_name: d.platform_name().map(String::from),
            platform_version: d.platform_version().map(String::from),
            platform_owner: d.platform_owner().map(String::from),
            platform_status: d.platform_status().map(|v| v.as_str().to_string()),
            platform_category: d.platform_category().map(String::from),
            platform_lifecycle_state: d.platform_lifecycle_state().map(String::from),
            platform_branch_name: d.platform_branch_name().map(String::from),
            platform_branch_lifecycle_state: d.platform_branch_lifecycle_state().map(String::from),
            solution_stack_name: d.solution_stack_name().map(String::from),
            description: d.description().map(String::from),
            maintainer: d.maintainer().map(String::from),
            operating_system_name: d.operating_system_name().map(String::from),
            operating_system_version: d.operating_system_version().map(String::from),
            programming_languages: d
                .programming_languages()
                .unwrap_or_default()
                .iter()
                .map(|l| {
                    (
                        l.name().unwrap_or_default().to_string(),
                        l.version().unwrap_or_default().to_string(),
                    )
                })
                .collect(),
            frameworks: d
                .frameworks()
                .unwrap_or_default()
                .iter()
                .map(|l| {
                    (
                        l.name().unwrap_or_default().to_string(),
                        l.version().unwrap_or_default().to_string(),
                    )
                })
                .collect(),
            supported_tier_list: d.supported_tier_list().unwrap_or_default().to_vec(),
            date_created: d.date_created().map(|v| format_date(Some(v))),
            date_updated: d.date_updated().map(|v| format_date(Some(v))),
        })
    }

    async fn list_platform_branches(&self, filters: &[Filter]) -> Result<Vec<PlatformBranch>> {
        let search_filters: Vec<SearchFilter> = filters
            .iter()
            .map(|f| {
                SearchFilter::builder()
                    .attribute(&f.key)
                    .operator(&f.operator)
                    .set_values(Some(f.values.clone()))
                    .build()
            })
            .collect();

        let mut branches = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let resp = self
                .cli
                .list_platform_branches()
                .set_filters(Some(search_filters.clone()))
                .max_records(PAGE_SIZE)
                .set_next_token(token.clone())
                .send()
                .await
                .map_err(|e| api_error("list_platform_branches", e))?;

            for b in resp.platform_branch_summary_list().unwrap_or_default().iter() {
                let branch_order: Option<i32> = b.branch_order().into();
                branches.push(PlatformBranch {
                    branch_name: b.branch_name().unwrap_or_default().to_string(),
                    platform_name: b.platform_name().unwrap_or_default().to_string(),
                    lifecycle_state: LifecycleState::from(b.lifecycle_state().unwrap_or_default()),
                    branch_order,
                    supported_tier_list: b.supported_tier_list().unwrap_or_default().to_vec(),
                });
            }

            token = resp.next_token().map(String::from);
            if token.is_none() {
                break;
            }
        }
        log::debug!("listed {} platform branches", branches.len());
        Ok(branches)
    }
}

fn api_error<E, R>(op: &str, e: SdkError<E, R>) -> Error
where
    E: std::fmt::Debug,
    R: std::fmt::Debug,
{
    API {
        message: format!("failed {} {:?}", op, e),
        is_retryable: is_error_retryable(&e),
    }
}

fn info_type(bundle: bool) -> EnvironmentInfoType {
    if bundle {
        EnvironmentInfoType::Bundle
    } else {
        EnvironmentInfoType::Tail
    }
}

fn to_option_settings(settings: &[OptionSetting]) -> Option<Vec<ConfigurationOptionSetting>> {
    if settings.is_empty() {
        return None;
    }
    Some(
        settings
            .iter()
            .map(|s| {
                ConfigurationOptionSetting::builder()
                    .namespace(&s.namespace)
                    .option_name(&s.option_name)
                    .set_value(s.value.clone())
                    .build()
            })
            .collect(),
    )
}

fn to_options_to_remove(settings: &[OptionSetting]) -> Option<Vec<OptionSpecification>> {
    if settings.is_empty() {
        return None;
    }
    Some(
        settings
            .iter()
            .map(|s| {
                OptionSpecification::builder()
                    .namespace(&s.namespace)
                    .option_name(&s.option_name)
                    .build()
            })
            .collect(),
    )
}

/// Formats the time as RFC 3339 for display.
pub fn format_system_time(t: SystemTime) -> String {
    format_date(Some(&DateTime::from(t)))
}

fn format_date(dt: Option<&DateTime>) -> String {
    match dt {
        Some(v) => v.fmt(DateTimeFormat::DateTime).unwrap_or_default(),
        None => String::new(),
    }
}

fn date_millis(dt: Option<&DateTime>) -> i64 {
    dt.and_then(|v| v.to_millis().ok()).unwrap_or_default()
}

fn to_environment(e: &EnvironmentDescription) -> Environment {
    Environment {
        environment_name: e.environment_name().unwrap_or_default().to_string(),
        environment_id: e.environment_id().unwrap_or_default().to_string(),
        application_name: e.application_name().unwrap_or_default().to_string(),
        status: e
            .status()
            .map(|s| Status::from(s.as_str()))
            .unwrap_or_default(),
        health: e.health().map(|h| h.as_str().to_string()),
        health_status: e.health_status().map(|h| h.as_str().to_string()),
        version_label: e.version_label().map(String::from),
        solution_stack_name: e.solution_stack_name().map(String::from),
        platform_arn: e.platform_arn().map(String::from),
        tier: e.tier().and_then(|t| t.name()).map(String::from),
        cname: e.cname().map(String::from),
        endpoint_url: e.endpoint_url().map(String::from),
        date_updated: e.date_updated().map(|v| format_date(Some(v))),
        date_updated_millis: date_millis(e.date_updated()),
    }
}

fn to_application_version(v: &ApplicationVersionDescription) -> ApplicationVersion {
    let bundle = v.source_bundle();
    ApplicationVersion {
        application_name: v.application_name().unwrap_or_default().to_string(),
        version_label: v.version_label().unwrap_or_default().to_string(),
        s3_bucket: bundle.and_then(|b| b.s3_bucket()).map(String::from),
        s3_key: bundle.and_then(|b| b.s3_key()).map(String::from),
        status: v.status().map(|s| s.as_str().to_string()),
        description: v.description().map(String::from),
        date_created: v.date_created().map(|d| format_date(Some(d))),
        date_created_millis: date_millis(v.date_created()),
    }
}

fn to_event(e: &EventDescription) -> Event {
    Event {
        event_date: format_date(e.event_date()),
        event_millis: date_millis(e.event_date()),
        severity: e
            .severity()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        message: e.message().unwrap_or_default().to_string(),
        environment_name: e.environment_name().map(String::from),
        platform_arn: e.platform_arn().map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct FakeApplications {
        names: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ApplicationStore for FakeApplications {
        async fn application_exists(&self, application_name: &str) -> Result<bool> {
            let names = self.names.lock().map_err(|e| Other {
                message: e.to_string(),
                is_retryable: false,
            })?;
            Ok(names.iter().any(|n| n == application_name))
        }

        async fn create_application(&self, application_name: &str, _description: &str) -> Result<()> {
            let mut names = self.names.lock().map_err(|e| Other {
                message: e.to_string(),
                is_retryable: false,
            })?;
            names.push(application_name.to_string());
            Ok(())
        }
    }

    /// RUST_LOG=debug cargo test --package beanstalk-ops --lib -- aws::elasticbeanstalk::tests::test_ensure_application --exact --show-output
    #[tokio::test]
    async fn test_ensure_application() {
        let _ = env_logger::builder().is_test(true).try_init();

        let store = FakeApplications {
            names: Mutex::new(vec![String::from("existing-app")]),
        };

        assert!(!ensure_application(&store, "existing-app", "test").await.unwrap());
        assert!(ensure_application(&store, "new-app", "test").await.unwrap());
        assert!(!ensure_application(&store, "new-app", "test").await.unwrap());
        assert_eq!(
            store.names.lock().unwrap().clone(),
            vec![String::from("existing-app"), String::from("new-app")]
        );
    }
}
