use std::error::Error as StdError;
use std::fmt::Debug;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_iam::Client as IamClient;
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use tracing::{debug, info};

use super::{ApiError, ApiResult, IamApi};

const ENTITY_ALREADY_EXISTS: &str = "EntityAlreadyExists";
const NO_SUCH_ENTITY: &str = "NoSuchEntity";

/// Map an SDK failure onto the handler-facing error kinds
pub(crate) fn classify<E, R>(operation: &'static str, err: SdkError<E, R>) -> ApiError
where
    E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
    R: Debug,
{
    let message = DisplayErrorContext(&err).to_string();
    match err.code() {
        Some(ENTITY_ALREADY_EXISTS) => ApiError::AlreadyExists { operation, message },
        Some(NO_SUCH_ENTITY) => ApiError::NotFound { operation, message },
        _ => ApiError::Service { operation, message },
    }
}

fn non_empty(list: &[String]) -> Option<Vec<String>> {
    (!list.is_empty()).then(|| list.to_vec())
}

/// IAM-backed provider management
#[derive(Debug, Clone)]
pub struct AwsIam {
    client: IamClient,
}

impl AwsIam {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: IamClient::new(sdk_config),
        }
    }
}

#[async_trait]
impl IamApi for AwsIam {
    async fn create_oidc_provider(
        &self,
        url: &str,
        client_ids: &[String],
        thumbprints: &[String],
    ) -> ApiResult<()> {
        info!("Calling AWS IAM CreateOpenIDConnectProvider");
        debug!("Issuer URL: {}", url);
        debug!("Client IDs: {:?}", client_ids);
        debug!("Thumbprints: {:?}", thumbprints);

        self.client
            .create_open_id_connect_provider()
            .url(url)
            .set_client_id_list(non_empty(client_ids))
            .set_thumbprint_list(non_empty(thumbprints))
            .send()
            .await
            .map_err(|e| classify("CreateOpenIDConnectProvider", e))?;
        Ok(())
    }

    async fn update_oidc_thumbprints(&self, arn: &str, thumbprints: &[String]) -> ApiResult<()> {
        info!("Calling AWS IAM UpdateOpenIDConnectProviderThumbprint");
        debug!("Provider ARN: {}", arn);

        self.client
            .update_open_id_connect_provider_thumbprint()
            .open_id_connect_provider_arn(arn)
            .set_thumbprint_list(Some(thumbprints.to_vec()))
            .send()
            .await
            .map_err(|e| classify("UpdateOpenIDConnectProviderThumbprint", e))?;
        Ok(())
    }

    async fn add_oidc_client_id(&self, arn: &str, client_id: &str) -> ApiResult<()> {
        info!("Calling AWS IAM AddClientIDToOpenIDConnectProvider");
        debug!("Provider ARN: {}, client ID: {}", arn, client_id);

        self.client
            .add_client_id_to_open_id_connect_provider()
            .open_id_connect_provider_arn(arn)
            .client_id(client_id)
            .send()
            .await
            .map_err(|e| classify("AddClientIDToOpenIDConnectProvider", e))?;
        Ok(())
    }

    async fn remove_oidc_client_id(&self, arn: &str, client_id: &str) -> ApiResult<()> {
        info!("Calling AWS IAM RemoveClientIDFromOpenIDConnectProvider");
        debug!("Provider ARN: {}, client ID: {}", arn, client_id);

        self.client
            .remove_client_id_from_open_id_connect_provider()
            .open_id_connect_provider_arn(arn)
            .client_id(client_id)
            .send()
            .await
            .map_err(|e| classify("RemoveClientIDFromOpenIDConnectProvider", e))?;
        Ok(())
    }

    async fn delete_oidc_provider(&self, arn: &str) -> ApiResult<()> {
        info!("Calling AWS IAM DeleteOpenIDConnectProvider");
        debug!("Provider ARN: {}", arn);

        self.client
            .delete_open_id_connect_provider()
            .open_id_connect_provider_arn(arn)
            .send()
            .await
            .map_err(|e| classify("DeleteOpenIDConnectProvider", e))?;
        Ok(())
    }

    async fn create_saml_provider(&self, name: &str, metadata_document: &str) -> ApiResult<()> {
        info!("Calling AWS IAM CreateSAMLProvider");
        debug!("Provider name: {}", name);

        self.client
            .create_saml_provider()
            .name(name)
            .saml_metadata_document(metadata_document)
            .send()
            .await
            .map_err(|e| classify("CreateSAMLProvider", e))?;
        Ok(())
    }

    async fn update_saml_provider(&self, arn: &str, metadata_document: &str) -> ApiResult<()> {
        info!("Calling AWS IAM UpdateSAMLProvider");
        debug!("Provider ARN: {}", arn);

        self.client
            .update_saml_provider()
            .saml_provider_arn(arn)
            .saml_metadata_document(metadata_document)
            .send()
            .await
            .map_err(|e| classify("UpdateSAMLProvider", e))?;
        Ok(())
    }

    async fn delete_saml_provider(&self, arn: &str) -> ApiResult<()> {
        info!("Calling AWS IAM DeleteSAMLProvider");
        debug!("Provider ARN: {}", arn);

        self.client
            .delete_saml_provider()
            .saml_provider_arn(arn)
            .send()
            .await
            .map_err(|e| classify("DeleteSAMLProvider", e))?;
        Ok(())
    }
}
