use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::ResourceId;
use super::null_as_default;

/// Row value placeholder: let the column take its default.
pub const MUTATOR_COLUMN_DEFAULT_VALUE: &str = "UCDEF-7f55f479-3822-4976-a8a9-b789d5c6f152";
/// Row value placeholder: keep the column's current value.
pub const MUTATOR_COLUMN_CURRENT_VALUE: &str = "UCCUR-7f55f479-3822-4976-a8a9-b789d5c6f152";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Address,
    Birthdate,
    Boolean,
    Composite,
    Date,
    Email,
    Integer,
    #[serde(rename = "phonenumber")]
    PhoneNumber,
    #[serde(rename = "e164_phonenumber")]
    E164PhoneNumber,
    Ssn,
    #[default]
    String,
    Timestamp,
    Uuid,
    /// A type added on the server after this SDK was released.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnIndexType {
    #[default]
    #[serde(rename = "none")]
    Unindexed,
    Indexed,
    Unique,
    #[serde(other)]
    Unknown,
}

/// Lifecycle state a retention duration applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationType {
    Live,
    #[default]
    SoftDeleted,
    PostDelete,
    PreDelete,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    #[default]
    Indefinite,
    Year,
    Month,
    Week,
    Day,
    Hour,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: DataType,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub default_value: String,
    #[serde(default)]
    pub index_type: ColumnIndexType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purpose {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSelectorConfig {
    #[serde(default)]
    pub where_clause: String,
}

impl UserSelectorConfig {
    #[must_use]
    pub fn new(where_clause: impl Into<String>) -> Self {
        Self {
            where_clause: where_clause.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOutputConfig {
    pub column: ResourceId,
    #[serde(default)]
    pub transformer: ResourceId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accessor {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub columns: Vec<ColumnOutputConfig>,
    #[serde(default)]
    pub access_policy: ResourceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_access_policy: Option<ResourceId>,
    #[serde(default)]
    pub selector_config: UserSelectorConfig,
    #[serde(default, deserialize_with = "null_as_default")]
    pub purposes: Vec<ResourceId>,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInputConfig {
    pub column: ResourceId,
    #[serde(default)]
    pub validator: ResourceId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutator {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub columns: Vec<ColumnInputConfig>,
    #[serde(default)]
    pub access_policy: ResourceId,
    #[serde(default)]
    pub selector_config: UserSelectorConfig,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionDuration {
    pub unit: DurationUnit,
    #[serde(default)]
    pub duration: i64,
}

impl RetentionDuration {
    #[must_use]
    pub const fn new(unit: DurationUnit, duration: i64) -> Self {
        Self { unit, duration }
    }
}

/// Retention setting at tenant, purpose or column scope.
///
/// Nil `column_id`/`purpose_id` mean the setting is not bound to that scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRetentionDuration {
    #[serde(default)]
    pub duration_type: DurationType,
    #[serde(default)]
    pub id: Uuid,
    #[serde(default)]
    pub column_id: Uuid,
    #[serde(default)]
    pub purpose_id: Uuid,
    pub duration: RetentionDuration,
    #[serde(default)]
    pub use_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_duration: Option<RetentionDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose_name: Option<String>,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRetentionDurationResponse {
    #[serde(default)]
    pub max_duration: RetentionDuration,
    pub retention_duration: ColumnRetentionDuration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRetentionDurationsResponse {
    #[serde(default)]
    pub max_duration: RetentionDuration,
    #[serde(default, deserialize_with = "null_as_default")]
    pub retention_durations: Vec<ColumnRetentionDuration>,
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::models::Page;
    use serde_json::json;

    #[test]
    fn column_wire_shape() {
        let column = Column {
            name: "phone".into(),
            data_type: DataType::E164PhoneNumber,
            index_type: ColumnIndexType::Unindexed,
            ..Column::default()
        };
        assert_eq!(
            serde_json::to_value(&column).unwrap(),
            json!({
                "id": Uuid::nil(),
                "name": "phone",
                "type": "e164_phonenumber",
                "is_array": false,
                "default_value": "",
                "index_type": "none",
            })
        );
    }

    #[test]
    fn unknown_data_type_is_tolerated() {
        let column: Column = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "name": "geo",
            "type": "geopoint",
            "constraints": {"unique_required": false},
        }))
        .unwrap();
        assert_eq!(column.data_type, DataType::Unknown);
        assert_eq!(column.index_type, ColumnIndexType::Unindexed);
    }

    #[test]
    fn newer_enum_values_decode_as_unknown() {
        let page: Page<Column> = serde_json::from_value(json!({
            "data": [
                {"id": Uuid::nil(), "name": "email", "type": "email", "index_type": "unique"},
                {"id": Uuid::nil(), "name": "geo", "type": "string", "index_type": "spatial"},
            ],
            "has_next": false,
        }))
        .unwrap();
        assert_eq!(page.data[0].index_type, ColumnIndexType::Unique);
        assert_eq!(page.data[1].index_type, ColumnIndexType::Unknown);

        let duration: RetentionDuration =
            serde_json::from_value(json!({"unit": "fortnight", "duration": 1})).unwrap();
        assert_eq!(duration.unit, DurationUnit::Unknown);
        let kind: DurationType = serde_json::from_value(json!("archived")).unwrap();
        assert_eq!(kind, DurationType::Unknown);
    }

    #[test]
    fn retention_enums_use_lowercase_names() {
        let duration = ColumnRetentionDuration {
            duration_type: DurationType::SoftDeleted,
            duration: RetentionDuration::new(DurationUnit::Week, 2),
            ..ColumnRetentionDuration::default()
        };
        let value = serde_json::to_value(&duration).unwrap();
        assert_eq!(value["duration_type"], "softdeleted");
        assert_eq!(value["duration"], json!({"unit": "week", "duration": 2}));
        assert!(value.get("default_duration").is_none());
    }

    #[test]
    fn accessor_tolerates_null_lists() {
        let accessor: Accessor = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "name": "by_email",
            "columns": null,
            "purposes": null,
            "selector_config": {"where_clause": "{email} = ?"},
            "is_system": false,
        }))
        .unwrap();
        assert!(accessor.columns.is_empty());
        assert_eq!(accessor.selector_config.where_clause, "{email} = ?");
        assert_eq!(accessor.token_access_policy, None);
    }
}
