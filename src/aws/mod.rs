use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use thiserror::Error;
use tracing::info;

use crate::config::HandlerConfig;
use crate::constants::{CALLER_CREDENTIALS_PROVIDER, DEFAULT_AWS_REGION};
use crate::event::CallerCredentials;
use crate::thumbprint::{ThumbprintResolver, TlsThumbprintResolver};

pub mod arn;
pub mod iam;
pub mod sts;

pub use arn::{ProviderIdentity, ProviderKind};

/// Errors surfaced by the IAM and STS seams
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{operation}: entity already exists: {message}")]
    AlreadyExists {
        operation: &'static str,
        message: String,
    },
    #[error("{operation}: no such entity: {message}")]
    NotFound {
        operation: &'static str,
        message: String,
    },
    #[error("{operation} failed: {message}")]
    Service {
        operation: &'static str,
        message: String,
    },
    #[error("{operation} response is missing {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },
}

impl ApiError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, ApiError::AlreadyExists { .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Identity of the credentials a handler call runs with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
}

#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn caller_identity(&self) -> ApiResult<CallerIdentity>;
}

/// The IAM provider-management calls the handlers issue
#[async_trait]
pub trait IamApi: Send + Sync {
    async fn create_oidc_provider(
        &self,
        url: &str,
        client_ids: &[String],
        thumbprints: &[String],
    ) -> ApiResult<()>;

    async fn update_oidc_thumbprints(&self, arn: &str, thumbprints: &[String]) -> ApiResult<()>;

    async fn add_oidc_client_id(&self, arn: &str, client_id: &str) -> ApiResult<()>;

    async fn remove_oidc_client_id(&self, arn: &str, client_id: &str) -> ApiResult<()>;

    async fn delete_oidc_provider(&self, arn: &str) -> ApiResult<()>;

    async fn create_saml_provider(&self, name: &str, metadata_document: &str) -> ApiResult<()>;

    async fn update_saml_provider(&self, arn: &str, metadata_document: &str) -> ApiResult<()>;

    async fn delete_saml_provider(&self, arn: &str) -> ApiResult<()>;
}

/// Credentialed collaborators for one handler invocation
#[derive(Clone)]
pub struct Session {
    pub iam: Arc<dyn IamApi>,
    pub identity: Arc<dyn IdentityApi>,
    pub thumbprints: Arc<dyn ThumbprintResolver>,
    pub partition_override: Option<String>,
}

impl Session {
    pub fn from_sdk_config(sdk_config: &SdkConfig, partition_override: Option<String>) -> Self {
        Self {
            iam: Arc::new(iam::AwsIam::new(sdk_config)),
            identity: Arc::new(sts::AwsSts::new(sdk_config)),
            thumbprints: Arc::new(TlsThumbprintResolver),
            partition_override,
        }
    }

    /// Resolve the provider ARN from the current caller identity
    pub async fn provider_identity(
        &self,
        kind: ProviderKind,
        name: &str,
    ) -> ApiResult<ProviderIdentity> {
        arn::resolve(
            self.identity.as_ref(),
            self.partition_override.as_deref(),
            kind,
            name,
        )
        .await
    }
}

/// Load SDK config for a handler call
///
/// Priority for credentials: request credentials -> profile -> default chain.
/// Priority for region: request -> handler config -> SDK defaults -> DEFAULT_AWS_REGION
pub async fn load_sdk_config(
    config: &HandlerConfig,
    region: Option<&str>,
    credentials: Option<&CallerCredentials>,
) -> SdkConfig {
    let loader = || {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(creds) = credentials {
            loader = loader.credentials_provider(aws_sdk_sts::config::Credentials::new(
                creds.access_key_id.clone(),
                creds.secret_access_key.clone(),
                creds.session_token.clone(),
                None,
                CALLER_CREDENTIALS_PROVIDER,
            ));
        }
        loader
    };

    let explicit = region
        .map(str::to_string)
        .or_else(|| config.region.clone());
    if let Some(region) = explicit {
        info!("Using region: {}", region);
        return loader().region(Region::new(region)).load().await;
    }

    let loaded = loader().load().await;
    match loaded.region() {
        Some(region) => {
            info!("Using region: {}", region);
            loaded
        }
        None => {
            info!("No region configured, using default {}", DEFAULT_AWS_REGION);
            loader()
                .region(Region::new(DEFAULT_AWS_REGION))
                .load()
                .await
        }
    }
}
