use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::aws::{self, Session};
use crate::config::HandlerConfig;
use crate::constants::{OIDC_PROVIDER_TYPE_NAME, SAML_PROVIDER_TYPE_NAME};
use crate::event::{Action, HandlerRequest, ProgressEvent};
use crate::model::{OidcProviderModel, SamlProviderModel};

pub mod oidc;
pub mod saml;

/// Resource types this binary can handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    OidcProvider,
    SamlProvider,
}

impl ResourceType {
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        match type_name {
            OIDC_PROVIDER_TYPE_NAME => Some(Self::OidcProvider),
            SAML_PROVIDER_TYPE_NAME => Some(Self::SamlProvider),
            _ => None,
        }
    }
}

/// Build a session from the request's credentials and run it
pub async fn invoke(config: &HandlerConfig, request: HandlerRequest) -> ProgressEvent<Value> {
    let sdk_config = aws::load_sdk_config(
        config,
        request.region.as_deref(),
        request.caller_credentials.as_ref(),
    )
    .await;
    let session = Session::from_sdk_config(&sdk_config, config.partition.clone());
    handle(&session, request).await
}

/// Route a request to the handler for its resource type
pub async fn handle(session: &Session, request: HandlerRequest) -> ProgressEvent<Value> {
    info!("Handling {} for {}", request.action, request.type_name);

    let Some(resource_type) = ResourceType::from_type_name(&request.type_name) else {
        let error = anyhow!("unsupported resource type {:?}", request.type_name);
        warn!("{}", error);
        return ProgressEvent::failed(request.action, request.desired_resource_state, &error);
    };

    match resource_type {
        ResourceType::OidcProvider => {
            let (previous, desired) = match decode::<OidcProviderModel>(&request) {
                Ok(models) => models,
                Err(e) => return decode_failure(request, e),
            };
            to_value(request.action, oidc::handle(session, request.action, previous, desired).await)
        }
        ResourceType::SamlProvider => {
            let (_, desired) = match decode::<SamlProviderModel>(&request) {
                Ok(models) => models,
                Err(e) => return decode_failure(request, e),
            };
            to_value(request.action, saml::handle(session, request.action, desired).await)
        }
    }
}

fn decode<M: DeserializeOwned>(request: &HandlerRequest) -> Result<(Option<M>, M)> {
    let previous = request
        .previous_resource_state
        .clone()
        .filter(|state| !state.is_null())
        .map(serde_json::from_value)
        .transpose()
        .context("invalid previousResourceState")?;
    let desired = serde_json::from_value(request.desired_resource_state.clone())
        .context("invalid desiredResourceState")?;
    Ok((previous, desired))
}

fn decode_failure(request: HandlerRequest, error: anyhow::Error) -> ProgressEvent<Value> {
    warn!("{:#}", error);
    ProgressEvent::failed(request.action, request.desired_resource_state, &error)
}

fn to_value<M: Serialize>(action: Action, event: ProgressEvent<M>) -> ProgressEvent<Value> {
    match serde_json::to_value(&event.resource_model) {
        Ok(model) => event.map_model(|_| model),
        Err(e) => {
            let error = anyhow::Error::new(e).context("could not encode resourceModel");
            warn!("{:#}", error);
            ProgressEvent::failed(action, Value::Null, &error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::testing::{Call, FakeAws};
    use crate::event::OperationStatus;
    use serde_json::json;

    fn request(type_name: &str, action: Action, previous: Option<Value>, desired: Value) -> HandlerRequest {
        HandlerRequest {
            type_name: type_name.to_string(),
            action,
            region: None,
            caller_credentials: None,
            previous_resource_state: previous,
            desired_resource_state: desired,
        }
    }

    #[test]
    fn test_resource_type_from_type_name() {
        assert_eq!(
            ResourceType::from_type_name(OIDC_PROVIDER_TYPE_NAME),
            Some(ResourceType::OidcProvider)
        );
        assert_eq!(
            ResourceType::from_type_name(SAML_PROVIDER_TYPE_NAME),
            Some(ResourceType::SamlProvider)
        );
        assert_eq!(ResourceType::from_type_name("AWS::IAM::Role"), None);
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("unsupported value"))
        }
    }

    #[test]
    fn test_unencodable_model_becomes_failed_event() {
        let event = to_value(
            Action::Read,
            ProgressEvent::success(Action::Read, Unencodable),
        );

        assert_eq!(event.status, OperationStatus::Failed);
        assert_eq!(event.message, "Read failed");
        assert_eq!(event.resource_model, Value::Null);
        assert_eq!(
            event.error_message.as_deref(),
            Some("could not encode resourceModel: unsupported value")
        );
    }

    #[tokio::test]
    async fn test_unknown_type_fails_without_calls() {
        let fake = FakeAws::new();
        let desired = json!({ "Name": "x" });

        let event = handle(
            &fake.session(),
            request("AWS::IAM::Role", Action::Create, None, desired.clone()),
        )
        .await;

        assert_eq!(event.status, OperationStatus::Failed);
        assert_eq!(event.resource_model, desired);
        assert!(event.error_message.unwrap().contains("unsupported resource type"));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_model_fails() {
        let fake = FakeAws::new();

        let event = handle(
            &fake.session(),
            request(
                OIDC_PROVIDER_TYPE_NAME,
                Action::Create,
                None,
                json!({ "ClientIDList": "not-a-list" }),
            ),
        )
        .await;

        assert_eq!(event.status, OperationStatus::Failed);
        assert!(
            event
                .error_message
                .unwrap()
                .starts_with("invalid desiredResourceState")
        );
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_oidc_update_routes_previous_state() {
        let fake = FakeAws::new();

        let event = handle(
            &fake.session(),
            request(
                OIDC_PROVIDER_TYPE_NAME,
                Action::Update,
                Some(json!({
                    "Name": "issuer.example.com",
                    "Url": "https://issuer.example.com",
                    "ClientIDList": ["a"],
                    "ThumbprintList": ["t1"]
                })),
                json!({
                    "Name": "issuer.example.com",
                    "Url": "https://issuer.example.com",
                    "ClientIDList": ["b"],
                    "ThumbprintList": ["t1"]
                }),
            ),
        )
        .await;

        assert!(event.is_success());
        assert_eq!(
            event.resource_model["Arn"],
            json!("arn:aws:iam::123456789012:oidc-provider/issuer.example.com")
        );
        let arn = "arn:aws:iam::123456789012:oidc-provider/issuer.example.com".to_string();
        assert_eq!(
            fake.iam_calls(),
            vec![
                Call::RemoveClientId {
                    arn: arn.clone(),
                    client_id: "a".to_string()
                },
                Call::AddClientId {
                    arn,
                    client_id: "b".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_null_previous_state_is_absent() {
        let fake = FakeAws::new();

        let event = handle(
            &fake.session(),
            request(
                SAML_PROVIDER_TYPE_NAME,
                Action::Read,
                Some(Value::Null),
                json!({ "Name": "corp-idp" }),
            ),
        )
        .await;

        assert!(event.is_success());
        assert_eq!(
            event.resource_model,
            json!({
                "Name": "corp-idp",
                "Arn": "arn:aws:iam::123456789012:saml-provider/corp-idp"
            })
        );
    }
}
