pub mod cloudwatch;
pub mod elasticbeanstalk;
pub mod s3;

use aws_config::meta::region::RegionProviderChain;
use aws_sdk_elasticbeanstalk::error::SdkError;
use aws_types::{region::Region, SdkConfig};

/// Region used when neither the flag, the project, nor the environment sets one.
pub const DEFAULT_REGION: &str = "us-west-2";

/// Loads an AWS config from default environments.
/// The region falls back to the default provider chain, then "us-west-2".
pub async fn load_config(reg: Option<String>, profile_name: Option<String>) -> SdkConfig {
    log::info!(
        "loading AWS configuration for region {:?} and profile {:?}",
        reg,
        profile_name
    );
    let regp = RegionProviderChain::first_try(reg.map(Region::new))
        .or_default_provider()
        .or_else(Region::new(DEFAULT_REGION));

    let mut loader = aws_config::from_env().region(regp);
    if let Some(p) = profile_name {
        loader = loader.profile_name(p);
    }
    loader.load().await
}

#[inline]
pub fn is_error_retryable<E, R>(e: &SdkError<E, R>) -> bool {
    match e {
        SdkError::TimeoutError(_) | SdkError::ResponseError { .. } => true,
        SdkError::DispatchFailure(e) => e.is_timeout() || e.is_io(),
        _ => false,
    }
}
