use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::{Uuid, uuid};

use super::null_as_default;

/// Reference to a resource by id, by name, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceId {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ResourceId {
    #[must_use]
    pub const fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            name: None,
        }
    }

    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// A non-nil id, if one is set.
    #[must_use]
    pub fn resolved_id(&self) -> Option<Uuid> {
        self.id.filter(|id| !id.is_nil())
    }

    /// A non-blank name, if one is set.
    #[must_use]
    pub fn resolved_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.resolved_id().is_some() || self.resolved_name().is_some()
    }
}

impl From<Uuid> for ResourceId {
    fn from(id: Uuid) -> Self {
        Self::by_id(id)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.resolved_id(), self.resolved_name()) {
            (Some(id), _) => write!(f, "{id}"),
            (None, Some(name)) => f.write_str(name),
            (None, None) => f.write_str("<unset>"),
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<T>,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default)]
    pub has_prev: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn into_data(self) -> Vec<T> {
        self.data
    }
}

/// Paging parameters shared by every list operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Page size; the server default applies when unset or zero.
    pub limit: Option<u32>,
    /// Return items after this id.
    pub starting_after: Option<Uuid>,
}

impl ListOptions {
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn starting_after(mut self, id: Uuid) -> Self {
        self.starting_after = Some(id);
        self
    }
}

pub const ACCESS_POLICY_OPEN: Uuid = uuid!("3f380e42-0b21-4570-a312-91e1b80386fa");
pub const TRANSFORMER_UUID: Uuid = uuid!("e3743f5b-521e-4305-b232-ee82549e1477");
pub const TRANSFORMER_EMAIL: Uuid = uuid!("0cedf7a4-86ab-450a-9426-478ad0a60faa");
pub const TRANSFORMER_FULL_NAME: Uuid = uuid!("b9bf352f-b1ee-4fb2-a2eb-d0c346c6404b");
pub const TRANSFORMER_SSN: Uuid = uuid!("3f65ee22-2241-4694-bbe3-72cefbe59ff2");
pub const TRANSFORMER_CREDIT_CARD: Uuid = uuid!("618a4ae7-9979-4ee8-bac5-db87335fe4d9");
pub const TRANSFORMER_PASSTHROUGH: Uuid = uuid!("c0b5b2a1-0b1f-4b9f-8b1a-1b1f4b9f8b1a");
pub const VALIDATOR_OPEN: Uuid = uuid!("c0b5b2a1-0b1f-4b9f-8b1a-1b1f4b9f8b1a");
