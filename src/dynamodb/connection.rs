use aws_config::{profile::ProfileFileCredentialsProvider, BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use tracing::{error, info};

use crate::dynamodb::{Error, Result};

/// Resolved SDK configuration for one profile and region.
///
/// Built once at startup and handed to [`DynamoDbConnector::new`](super::DynamoDbConnector::new);
/// several connections for different regions can coexist.
#[derive(Debug, Clone)]
pub struct Connection {
    sdk_config: SdkConfig,
    profile: String,
    region: String,
}

impl Connection {
    /// Loads the SDK configuration for `profile` and `region` and resolves
    /// credentials once, so a missing profile fails here rather than on the
    /// first request.
    ///
    /// Credentials come only from the named profile in the shared config and
    /// credentials files; `AWS_ACCESS_KEY_ID` and other environment
    /// credentials are not consulted.
    pub async fn connect(profile: &str, region: &str, endpoint_url: Option<&str>) -> Result<Self> {
        let credentials = ProfileFileCredentialsProvider::builder()
            .profile_name(profile)
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .profile_name(profile)
            .region(Region::new(region.to_string()))
            .credentials_provider(credentials);

        if let Some(endpoint) = endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;

        let provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| auth_error(profile, "no credentials provider configured"))?;

        provider.provide_credentials().await.map_err(|e| {
            error!("Authentication failed: {}", e);
            auth_error(profile, &e.to_string())
        })?;

        info!("Credentials resolved for profile '{profile}' in {region}");
        Ok(Self {
            sdk_config,
            profile: profile.to_string(),
            region: region.to_string(),
        })
    }

    pub fn sdk_config(&self) -> &SdkConfig {
        &self.sdk_config
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

fn auth_error(profile: &str, message: &str) -> Error {
    Error::Auth {
        profile: profile.to_string(),
        location: credentials_location(),
        message: message.to_string(),
    }
}

/// Where the SDK looks for the shared credentials file.
pub fn credentials_location() -> String {
    if let Ok(path) = std::env::var("AWS_SHARED_CREDENTIALS_FILE") {
        return path;
    }
    match std::env::var("HOME") {
        Ok(home) => format!("{home}/.aws/credentials"),
        Err(_) => "~/.aws/credentials".to_string(),
    }
}
