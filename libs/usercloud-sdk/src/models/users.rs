use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use super::common::ResourceId;
use super::null_as_default;

/// Data residency region for a new user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "aws-us-east-1")]
    AwsUsEast1,
    #[serde(rename = "aws-us-west-2")]
    AwsUsWest2,
}

/// Optional placement of a user being created; unset fields are chosen by the
/// server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NewUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    /// Seconds since the epoch on the wire.
    #[serde(with = "time::serde::timestamp")]
    pub updated_at: OffsetDateTime,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profile: Map<String, Value>,
    #[serde(default)]
    pub organization_id: Uuid,
}

/// Purposes a user consented to for one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConsentedPurposes {
    pub column: ResourceId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub consented_purposes: Vec<ResourceId>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn user_response_reads_unix_updated_at() {
        let id = Uuid::new_v4();
        let user: UserResponse = serde_json::from_value(json!({
            "id": id,
            "updated_at": 1_767_225_600,
            "profile": {"email": "elaine@benes.example"},
            "organization_id": "00000000-0000-0000-0000-000000000000",
            "deleted": false,
        }))
        .unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.updated_at, datetime!(2026-01-01 00:00:00 UTC));
        assert_eq!(user.profile["email"], "elaine@benes.example");
        assert!(user.organization_id.is_nil());
    }

    #[test]
    fn new_user_skips_unset_fields() {
        assert_eq!(serde_json::to_value(NewUser::default()).unwrap(), json!({}));
        let user = NewUser {
            region: Some(Region::AwsUsEast1),
            ..NewUser::default()
        };
        assert_eq!(
            serde_json::to_value(user).unwrap(),
            json!({"region": "aws-us-east-1"})
        );
    }

    #[test]
    fn region_wire_names() {
        assert_eq!(
            serde_json::to_value(Region::AwsUsWest2).unwrap(),
            json!("aws-us-west-2")
        );
    }
}
