//! AWS-backed adapters for the credential ports

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cognitoidentityprovider::types::AuthFlowType;
use serde_json::Value;
use tracing::debug;

use super::{IdentityProvider, ParameterStore, SecretStore};
use crate::error::{GatewayError, GatewayResult};

/// Build the shared SDK config for the configured region
pub async fn build_sdk_config(region: &str) -> aws_config::SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()))
        .load()
        .await
}

/// SSM Parameter Store adapter
pub struct SsmParameterStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParameterStore {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_ssm::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    async fn get(&self, path: &str) -> GatewayResult<String> {
        let output = self
            .client
            .get_parameter()
            .name(path)
            .send()
            .await
            .map_err(|e| GatewayError::Internal(format!("ssm get_parameter: {e}")))?;

        output
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Internal(format!("parameter {path} has no value")))
    }
}

/// Secrets Manager adapter; secret strings are parsed as JSON
pub struct SecretsManagerStore {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerStore {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_secretsmanager::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn get(&self, path: &str) -> GatewayResult<Value> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(path)
            .send()
            .await
            .map_err(|e| GatewayError::Internal(format!("secretsmanager get_secret_value: {e}")))?;

        let secret_string = output
            .secret_string()
            .ok_or_else(|| GatewayError::Internal(format!("secret {path} has no string value")))?;

        serde_json::from_str(secret_string)
            .map_err(|e| GatewayError::Internal(format!("secret {path} is not valid JSON: {e}")))
    }
}

/// Cognito adapter performing the USER_PASSWORD_AUTH flow
pub struct CognitoIdentityProvider {
    client: aws_sdk_cognitoidentityprovider::Client,
}

impl CognitoIdentityProvider {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_cognitoidentityprovider::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn password_grant(
        &self,
        client_id: &str,
        username: &str,
        password: &str,
    ) -> GatewayResult<String> {
        debug!(client_id, username, "initiating password grant");

        let output = self
            .client
            .initiate_auth()
            .client_id(client_id)
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .auth_parameters("USERNAME", username)
            .auth_parameters("PASSWORD", password)
            .send()
            .await
            .map_err(|e| GatewayError::Internal(format!("cognito initiate_auth: {e}")))?;

        output
            .authentication_result()
            .and_then(|r| r.access_token())
            .map(str::to_string)
            .ok_or_else(|| {
                GatewayError::Internal("cognito response carried no access token".to_string())
            })
    }
}
