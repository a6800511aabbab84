/// CloudFormation type name handled by the OIDC provider handler
pub const OIDC_PROVIDER_TYPE_NAME: &str = "Community::IAM::OIDCProvider";

/// CloudFormation type name handled by the SAML provider handler
pub const SAML_PROVIDER_TYPE_NAME: &str = "Community::IAM::SAMLProvider";

/// IAM resource type segment of an OIDC provider ARN
pub const OIDC_PROVIDER_RESOURCE_TYPE: &str = "oidc-provider";

/// IAM resource type segment of a SAML provider ARN
pub const SAML_PROVIDER_RESOURCE_TYPE: &str = "saml-provider";

/// Partition used when the caller ARN does not carry a usable one
pub const DEFAULT_PARTITION: &str = "aws";

/// Default AWS region when none is configured
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Scheme an OIDC issuer URL must use
pub const HTTPS_SCHEME: &str = "https";

/// Port dialed when the issuer URL does not name one
pub const HTTPS_PORT: u16 = 443;

/// Environment variable overriding the AWS region for handler calls
pub const REGION_ENV: &str = "IDP_RESOURCES_REGION";

/// Environment variable overriding the ARN partition
pub const PARTITION_ENV: &str = "IDP_RESOURCES_PARTITION";

/// Standard AWS environment variables the handler falls back to
pub const AWS_PROFILE_ENV: &str = "AWS_PROFILE";
pub const AWS_REGION_ENV: &str = "AWS_REGION";

/// Set by the Lambda runtime; CloudWatch stamps every log line itself
pub const LAMBDA_FUNCTION_NAME_ENV: &str = "AWS_LAMBDA_FUNCTION_NAME";

/// Provider name recorded on credentials passed in with a request
pub const CALLER_CREDENTIALS_PROVIDER: &str = "caller-credentials";
