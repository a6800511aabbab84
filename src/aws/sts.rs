use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sts::Client as StsClient;
use tracing::{debug, info};

use super::{ApiError, ApiResult, CallerIdentity, IdentityApi, iam::classify};

const GET_CALLER_IDENTITY: &str = "GetCallerIdentity";

/// STS-backed caller-identity lookup
#[derive(Debug, Clone)]
pub struct AwsSts {
    client: StsClient,
}

impl AwsSts {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: StsClient::new(sdk_config),
        }
    }
}

#[async_trait]
impl IdentityApi for AwsSts {
    async fn caller_identity(&self) -> ApiResult<CallerIdentity> {
        info!("Calling AWS STS GetCallerIdentity");

        let response = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| classify(GET_CALLER_IDENTITY, e))?;

        let account = response
            .account()
            .ok_or(ApiError::MissingField {
                operation: GET_CALLER_IDENTITY,
                field: "Account",
            })?
            .to_string();
        let arn = response.arn().unwrap_or_default().to_string();

        debug!("Caller account: {}", account);
        Ok(CallerIdentity { account, arn })
    }
}
