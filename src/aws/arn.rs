use std::fmt;

use tracing::debug;

use super::{ApiResult, IdentityApi};
use crate::constants::{DEFAULT_PARTITION, OIDC_PROVIDER_RESOURCE_TYPE, SAML_PROVIDER_RESOURCE_TYPE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Oidc,
    Saml,
}

impl ProviderKind {
    pub fn resource_type(self) -> &'static str {
        match self {
            ProviderKind::Oidc => OIDC_PROVIDER_RESOURCE_TYPE,
            ProviderKind::Saml => SAML_PROVIDER_RESOURCE_TYPE,
        }
    }
}

/// The parts an IAM identity provider ARN is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub partition: String,
    pub account: String,
    pub kind: ProviderKind,
    pub name: String,
}

impl ProviderIdentity {
    pub fn arn(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProviderIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arn:{}:iam::{}:{}/{}",
            self.partition,
            self.account,
            self.kind.resource_type(),
            self.name
        )
    }
}

/// Extract the partition from an ARN (`arn:aws-cn:sts::...` -> `aws-cn`)
pub fn partition_of(arn: &str) -> Option<&str> {
    let mut parts = arn.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("arn"), Some(partition), Some(_)) if !partition.is_empty() => Some(partition),
        _ => None,
    }
}

/// Build the provider identity from a fresh caller-identity lookup
pub async fn resolve(
    identity: &dyn IdentityApi,
    partition_override: Option<&str>,
    kind: ProviderKind,
    name: &str,
) -> ApiResult<ProviderIdentity> {
    let caller = identity.caller_identity().await?;

    let partition = partition_override
        .or_else(|| partition_of(&caller.arn))
        .unwrap_or(DEFAULT_PARTITION)
        .to_string();

    let provider = ProviderIdentity {
        partition,
        account: caller.account,
        kind,
        name: name.to_string(),
    };
    debug!("Resolved provider ARN: {}", provider);
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::testing::{ACCOUNT, Call, FakeAws};

    #[test]
    fn test_oidc_arn_format() {
        let provider = ProviderIdentity {
            partition: "aws".to_string(),
            account: ACCOUNT.to_string(),
            kind: ProviderKind::Oidc,
            name: "token.actions.githubusercontent.com".to_string(),
        };
        assert_eq!(
            provider.arn(),
            "arn:aws:iam::123456789012:oidc-provider/token.actions.githubusercontent.com"
        );
    }

    #[test]
    fn test_saml_arn_format() {
        let provider = ProviderIdentity {
            partition: "aws-cn".to_string(),
            account: ACCOUNT.to_string(),
            kind: ProviderKind::Saml,
            name: "corp-idp".to_string(),
        };
        assert_eq!(
            provider.arn(),
            "arn:aws-cn:iam::123456789012:saml-provider/corp-idp"
        );
    }

    #[test]
    fn test_partition_of() {
        assert_eq!(
            partition_of("arn:aws-us-gov:sts::123456789012:assumed-role/r/s"),
            Some("aws-us-gov")
        );
        assert_eq!(partition_of("arn:aws:iam::123456789012:root"), Some("aws"));
        assert_eq!(partition_of("arn::sts::1:x"), None);
        assert_eq!(partition_of("not-an-arn"), None);
        assert_eq!(partition_of(""), None);
    }

    #[tokio::test]
    async fn test_resolve_looks_up_caller_every_time() {
        let fake = FakeAws::new();

        let first = resolve(&*fake, None, ProviderKind::Oidc, "issuer")
            .await
            .unwrap();
        assert_eq!(first.account, ACCOUNT);

        fake.set_caller("210987654321", "arn:aws-cn:sts::210987654321:assumed-role/r/s");
        let second = resolve(&*fake, None, ProviderKind::Oidc, "issuer")
            .await
            .unwrap();

        assert_eq!(
            second.arn(),
            "arn:aws-cn:iam::210987654321:oidc-provider/issuer"
        );
        assert_eq!(
            fake.calls(),
            vec![Call::GetCallerIdentity, Call::GetCallerIdentity]
        );
    }

    #[tokio::test]
    async fn test_resolve_prefers_partition_override() {
        let fake = FakeAws::new();
        let provider = resolve(&*fake, Some("aws-iso"), ProviderKind::Saml, "idp")
            .await
            .unwrap();
        assert_eq!(provider.arn(), "arn:aws-iso:iam::123456789012:saml-provider/idp");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_default_partition() {
        let fake = FakeAws::new();
        fake.set_caller(ACCOUNT, "");
        let provider = resolve(&*fake, None, ProviderKind::Saml, "idp")
            .await
            .unwrap();
        assert_eq!(provider.partition, DEFAULT_PARTITION);
    }
}
