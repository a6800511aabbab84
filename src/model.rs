use serde::{Deserialize, Serialize};

/// Desired state of an IAM OpenID Connect provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OidcProviderModel {
    /// Primary identifier: the issuer URL without its `https://` prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Read-only, always derived from the caller identity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(
        rename = "ClientIDList",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub client_id_list: Option<Vec<String>>,
    /// `None` means the thumbprint is resolved from the issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbprint_list: Option<Vec<String>>,
}

impl OidcProviderModel {
    pub fn client_ids(&self) -> &[String] {
        self.client_id_list.as_deref().unwrap_or_default()
    }
}

/// Desired state of an IAM SAML provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SamlProviderModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(
        rename = "SAMLMetadataDocument",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub saml_metadata_document: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_oidc_model_uses_schema_field_names() {
        let model: OidcProviderModel = serde_json::from_value(json!({
            "Url": "https://token.actions.githubusercontent.com",
            "ClientIDList": ["sts.amazonaws.com"],
            "ThumbprintList": ["6938fd4d98bab03faadb97b34396831e3780aea1"]
        }))
        .unwrap();

        assert_eq!(
            model.url.as_deref(),
            Some("https://token.actions.githubusercontent.com")
        );
        assert_eq!(model.client_ids(), ["sts.amazonaws.com"]);
        assert_eq!(
            model.thumbprint_list,
            Some(vec!["6938fd4d98bab03faadb97b34396831e3780aea1".to_string()])
        );
        assert_eq!(model.name, None);
    }

    #[test]
    fn test_oidc_model_keeps_absent_and_empty_lists_apart() {
        let absent: OidcProviderModel =
            serde_json::from_value(json!({ "Url": "https://issuer" })).unwrap();
        let empty: OidcProviderModel =
            serde_json::from_value(json!({ "Url": "https://issuer", "ThumbprintList": [] }))
                .unwrap();

        assert_eq!(absent.thumbprint_list, None);
        assert_eq!(empty.thumbprint_list, Some(vec![]));
        assert!(absent.client_ids().is_empty());
    }

    #[test]
    fn test_oidc_model_omits_unset_fields() {
        let model = OidcProviderModel {
            name: Some("issuer.example.com".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value, json!({ "Name": "issuer.example.com" }));
    }

    #[test]
    fn test_saml_model_field_names() {
        let model: SamlProviderModel = serde_json::from_value(json!({
            "Name": "corp-idp",
            "SAMLMetadataDocument": "<EntityDescriptor/>"
        }))
        .unwrap();

        assert_eq!(model.name.as_deref(), Some("corp-idp"));
        assert_eq!(
            model.saml_metadata_document.as_deref(),
            Some("<EntityDescriptor/>")
        );
    }
}
