use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::common::ResourceId;
use super::null_as_default;
use super::userstore::DataType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    #[default]
    CompositeAnd,
    CompositeOr,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformType {
    #[default]
    PassThrough,
    TokenizeByReference,
    TokenizeByValue,
    Transform,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicyTemplate {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// JavaScript evaluated by the tenant.
    #[serde(default)]
    pub function: String,
    #[serde(default)]
    pub version: i64,
}

/// Either a nested policy or a template with its parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicyComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_parameters: Option<String>,
}

impl AccessPolicyComponent {
    #[must_use]
    pub fn policy(policy: impl Into<ResourceId>) -> Self {
        Self {
            policy: Some(policy.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn template(template: impl Into<ResourceId>, parameters: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
            template_parameters: Some(parameters.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub policy_type: PolicyType,
    #[serde(default)]
    pub version: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<AccessPolicyComponent>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformer {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub input_type: DataType,
    #[serde(default)]
    pub output_type: DataType,
    #[serde(default)]
    pub reuse_existing_token: bool,
    #[serde(default)]
    pub transform_type: TransformType,
    #[serde(default)]
    pub function: String,
    /// JSON-encoded parameters passed to `function`.
    #[serde(default)]
    pub parameters: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectTokenResponse {
    pub id: Uuid,
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated: OffsetDateTime,
    pub transformer: Transformer,
    pub access_policy: AccessPolicy,
}

/// One entry of a resolve call, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedToken {
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub token: String,
}
