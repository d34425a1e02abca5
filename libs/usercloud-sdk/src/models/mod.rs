//! Wire models for the tenant APIs.
//!
//! Every model ignores fields it does not know and fills absent optional
//! fields with their defaults, so newer servers stay readable.

mod authz;
mod common;
mod tokenizer;
mod users;
mod userstore;

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

pub use authz::{Attribute, Edge, EdgeType, Object, ObjectType, Organization};
pub use common::{
    ACCESS_POLICY_OPEN, ListOptions, Page, ResourceId, TRANSFORMER_CREDIT_CARD,
    TRANSFORMER_EMAIL, TRANSFORMER_FULL_NAME, TRANSFORMER_PASSTHROUGH, TRANSFORMER_SSN,
    TRANSFORMER_UUID, VALIDATOR_OPEN,
};
pub use tokenizer::{
    AccessPolicy, AccessPolicyComponent, AccessPolicyTemplate, InspectTokenResponse,
    PolicyType, ResolvedToken, TransformType, Transformer,
};
pub use users::{ColumnConsentedPurposes, NewUser, Region, UserResponse};
pub use userstore::{
    Accessor, Column, ColumnIndexType, ColumnInputConfig, ColumnOutputConfig,
    ColumnRetentionDuration, ColumnRetentionDurationResponse, ColumnRetentionDurationsResponse,
    DataType, DurationType, DurationUnit, MUTATOR_COLUMN_CURRENT_VALUE,
    MUTATOR_COLUMN_DEFAULT_VALUE, Mutator, Purpose, RetentionDuration, UserSelectorConfig,
};

/// Models that carry a server-assigned id.
///
/// Used by the `if_not_exists` creates to hand back the caller's object with
/// the id of the identical resource that already exists.
pub trait Identified {
    fn id(&self) -> Uuid;
    fn set_id(&mut self, id: Uuid);
}

macro_rules! impl_identified {
    ($($model:ty),+ $(,)?) => {
        $(
            impl Identified for $model {
                fn id(&self) -> Uuid {
                    self.id
                }

                fn set_id(&mut self, id: Uuid) {
                    self.id = id;
                }
            }
        )+
    };
}

impl_identified!(
    Column,
    Purpose,
    Accessor,
    Mutator,
    AccessPolicyTemplate,
    AccessPolicy,
    Transformer,
    Object,
    ObjectType,
    Edge,
    EdgeType,
    Organization,
);

/// Some endpoints send `null` instead of an empty list.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn identified_sets_id() {
        let mut purpose = Purpose {
            name: "analytics".into(),
            ..Purpose::default()
        };
        assert!(purpose.id().is_nil());
        let id = Uuid::new_v4();
        purpose.set_id(id);
        assert_eq!(purpose.id, id);
    }
}
