//! Operations: a validated request plus the decoder for its response.
//!
//! Operations know nothing about tokens or transports, so both facades run the
//! same ones. [`client_operations!`] lists every operation once; each facade
//! expands it into its own methods.

pub mod authz;
pub mod retention;
pub mod tokenizer;
pub mod users;
pub mod userstore;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use usercloud_http::{RawResponse, RequestDescriptor};
use uuid::Uuid;

use crate::error::Error;
use crate::models::{Identified, ListOptions, Page, ResourceId};
use crate::response::{decode_delete, decode_json, identical_conflict_id};

/// Query value sent with every list call.
pub const LIST_VERSION: &str = "3";

type Decoder<T> = Box<dyn FnOnce(&RawResponse) -> Result<T, Error> + Send>;

pub struct Operation<T> {
    pub request: RequestDescriptor,
    decode: Decoder<T>,
}

impl<T: 'static> Operation<T> {
    #[must_use]
    pub fn new(
        request: RequestDescriptor,
        decode: impl FnOnce(&RawResponse) -> Result<T, Error> + Send + 'static,
    ) -> Self {
        Self {
            request,
            decode: Box::new(decode),
        }
    }

    #[must_use]
    pub fn map<U: 'static>(self, f: impl FnOnce(T) -> U + Send + 'static) -> Operation<U> {
        let decode = self.decode;
        Operation::new(self.request, move |response| decode(response).map(f))
    }

    #[must_use]
    pub fn into_parts(self) -> (RequestDescriptor, Decoder<T>) {
        (self.request, self.decode)
    }
}

impl<T: DeserializeOwned + 'static> Operation<T> {
    #[must_use]
    pub fn json(request: RequestDescriptor) -> Self {
        Self::new(request, decode_json::<T>)
    }
}

/// Lets operation functions without validation return a bare [`Operation`].
pub trait IntoOperation<T> {
    fn into_operation(self) -> Result<Operation<T>, Error>;
}

impl<T> IntoOperation<T> for Operation<T> {
    fn into_operation(self) -> Result<Operation<T>, Error> {
        Ok(self)
    }
}

impl<T> IntoOperation<T> for Result<Operation<T>, Error> {
    fn into_operation(self) -> Result<Operation<T>, Error> {
        self
    }
}

impl<T> fmt::Debug for Operation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

#[must_use]
pub fn get<T: DeserializeOwned + 'static>(path: String) -> Operation<T> {
    Operation::json(RequestDescriptor::get(path))
}

#[must_use]
pub fn delete(request: RequestDescriptor) -> Operation<bool> {
    Operation::new(request, decode_delete)
}

#[must_use]
pub fn list<T: DeserializeOwned + 'static>(path: &str, options: ListOptions) -> Operation<Page<T>> {
    Operation::json(with_paging(RequestDescriptor::get(path), options))
}

#[must_use]
pub fn with_paging(request: RequestDescriptor, options: ListOptions) -> RequestDescriptor {
    request
        .query_opt(
            "limit",
            options.limit.filter(|&n| n > 0).as_ref().map(ToString::to_string),
        )
        .query_opt(
            "starting_after",
            options.starting_after.map(|id| format!("id:{id}")),
        )
        .query("version", LIST_VERSION)
}

/// `POST` `{"<key>": model}`. With `if_not_exists`, a conflict with an
/// identical resource returns `model` carrying the existing id.
pub fn create<M>(path: &str, key: &str, model: M, if_not_exists: bool) -> Result<Operation<M>, Error>
where
    M: Identified + Serialize + DeserializeOwned + Send + 'static,
{
    let request = RequestDescriptor::post(path).json_body(&BTreeMap::from([(key, &model)]))?;
    Ok(reuse_identical(request, model, if_not_exists))
}

fn reuse_identical<M>(request: RequestDescriptor, model: M, if_not_exists: bool) -> Operation<M>
where
    M: Identified + DeserializeOwned + Send + 'static,
{
    Operation::new(request, move |response| match decode_json::<M>(response) {
        Err(err) if if_not_exists => {
            let id = identical_conflict_id(&err).ok_or(err)?;
            tracing::debug!(%id, "resource already exists, reusing it");
            let mut existing = model;
            existing.set_id(id);
            Ok(existing)
        }
        result => result,
    })
}

/// `PUT` `{"<key>": model}` to `path`.
pub fn update<M, T>(path: String, key: &str, model: &M) -> Result<Operation<T>, Error>
where
    M: Serialize,
    T: DeserializeOwned + 'static,
{
    let request = RequestDescriptor::put(path).json_body(&BTreeMap::from([(key, model)]))?;
    Ok(Operation::json(request))
}

pub fn require_id(what: &str, id: Uuid) -> Result<(), Error> {
    if id.is_nil() {
        return Err(Error::validation(format!("{what} must not be nil")));
    }
    Ok(())
}

pub fn require_text(what: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{what} must not be empty")));
    }
    Ok(())
}

pub fn require_resource(what: &str, rid: &ResourceId) -> Result<(), Error> {
    if !rid.is_valid() {
        return Err(Error::validation(format!("{what} needs an id or a name")));
    }
    Ok(())
}

pub fn require_resources(what: &str, rids: &[ResourceId]) -> Result<(), Error> {
    rids.iter().try_for_each(|rid| require_resource(what, rid))
}

pub fn require_non_empty<T>(what: &str, items: &[T]) -> Result<(), Error> {
    if items.is_empty() {
        return Err(Error::validation(format!("{what} must not be empty")));
    }
    Ok(())
}

/// Every facade method, in one list.
///
/// Invokes `$callback!` with entries of the form
/// `fn name(arg: Type, ...) -> Output = module::function;`.
/// Argument types, output types and operation paths resolve where the
/// callback expands. Operation functions return either an [`Operation`] or a
/// `Result` of one, see [`IntoOperation`].
macro_rules! client_operations {
    ($callback:ident) => {
        $callback! {
            // users

            /// Create a user and return its id.
            fn create_user(user: models::NewUser) -> Uuid = users::create_user;

            /// Create a user that signs in with a username and password.
            fn create_user_with_password(
                username: &str,
                password: &str,
                user: models::NewUser,
            ) -> Uuid = users::create_user_with_password;

            /// List users, optionally only those with the given email.
            fn list_users(
                options: models::ListOptions,
                email: Option<&str>,
            ) -> models::Page<models::UserResponse> = users::list_users;

            fn get_user(id: Uuid) -> models::UserResponse = users::get_user;

            /// Replace the user's profile.
            fn update_user(
                id: Uuid,
                profile: &serde_json::Map<String, serde_json::Value>,
            ) -> models::UserResponse = users::update_user;

            /// Delete a user. `Ok(false)` when no such user exists.
            fn delete_user(id: Uuid) -> bool = users::delete_user;

            /// Purposes the user consented to, per column. An empty `columns`
            /// asks about every column.
            fn get_consented_purposes_for_user(
                id: Uuid,
                columns: &[models::ResourceId],
            ) -> Vec<models::ColumnConsentedPurposes> = users::get_consented_purposes_for_user;

            /// Create a user and write its first row through a mutator.
            fn create_user_with_mutator(
                mutator_id: Uuid,
                context: &serde_json::Value,
                row_data: &serde_json::Map<String, serde_json::Value>,
                user: models::NewUser,
            ) -> Uuid = users::create_user_with_mutator;

            // columns

            fn create_column(column: models::Column, if_not_exists: bool) -> models::Column =
                userstore::create_column;
            fn get_column(id: Uuid) -> models::Column = userstore::get_column;
            fn list_columns(options: models::ListOptions) -> models::Page<models::Column> =
                userstore::list_columns;
            fn update_column(column: &models::Column) -> models::Column = userstore::update_column;
            fn delete_column(id: Uuid) -> bool = userstore::delete_column;

            // purposes

            fn create_purpose(purpose: models::Purpose, if_not_exists: bool) -> models::Purpose =
                userstore::create_purpose;
            fn get_purpose(id: Uuid) -> models::Purpose = userstore::get_purpose;
            fn list_purposes(options: models::ListOptions) -> models::Page<models::Purpose> =
                userstore::list_purposes;
            fn update_purpose(purpose: &models::Purpose) -> models::Purpose =
                userstore::update_purpose;
            fn delete_purpose(id: Uuid) -> bool = userstore::delete_purpose;

            // accessors

            fn create_accessor(accessor: models::Accessor, if_not_exists: bool) -> models::Accessor =
                userstore::create_accessor;
            fn get_accessor(id: Uuid) -> models::Accessor = userstore::get_accessor;
            fn list_accessors(options: models::ListOptions) -> models::Page<models::Accessor> =
                userstore::list_accessors;
            fn update_accessor(accessor: &models::Accessor) -> models::Accessor =
                userstore::update_accessor;
            fn delete_accessor(id: Uuid) -> bool = userstore::delete_accessor;

            /// Run an accessor; the result is passed through as returned.
            fn execute_accessor(
                accessor_id: Uuid,
                context: &serde_json::Value,
                selector_values: &[serde_json::Value],
            ) -> serde_json::Value = userstore::execute_accessor;

            // mutators

            fn create_mutator(mutator: models::Mutator, if_not_exists: bool) -> models::Mutator =
                userstore::create_mutator;
            fn get_mutator(id: Uuid) -> models::Mutator = userstore::get_mutator;
            fn list_mutators(options: models::ListOptions) -> models::Page<models::Mutator> =
                userstore::list_mutators;
            fn update_mutator(mutator: &models::Mutator) -> models::Mutator =
                userstore::update_mutator;
            fn delete_mutator(id: Uuid) -> bool = userstore::delete_mutator;

            /// Run a mutator; the result is passed through as returned.
            fn execute_mutator(
                mutator_id: Uuid,
                context: &serde_json::Value,
                selector_values: &[serde_json::Value],
                row_data: &serde_json::Map<String, serde_json::Value>,
            ) -> serde_json::Value = userstore::execute_mutator;

            /// Fetch the generated userstore SDK source.
            fn download_userstore_sdk(include_example: bool) -> String =
                userstore::download_userstore_sdk;

            // soft-deleted retention: tenant

            fn create_soft_deleted_retention_duration_on_tenant(
                duration: &models::ColumnRetentionDuration,
            ) -> models::ColumnRetentionDurationResponse = retention::create_on_tenant;
            fn get_soft_deleted_retention_duration_on_tenant(
                duration_id: Uuid,
            ) -> models::ColumnRetentionDurationResponse = retention::get_on_tenant;
            /// The tenant setting, or the system default when none is set.
            fn get_default_soft_deleted_retention_duration_on_tenant(
            ) -> models::ColumnRetentionDurationResponse = retention::get_default_on_tenant;
            fn update_soft_deleted_retention_duration_on_tenant(
                duration_id: Uuid,
                duration: &models::ColumnRetentionDuration,
            ) -> models::ColumnRetentionDurationResponse = retention::update_on_tenant;
            fn delete_soft_deleted_retention_duration_on_tenant(duration_id: Uuid) -> bool =
                retention::delete_on_tenant;

            // soft-deleted retention: purpose

            fn create_soft_deleted_retention_duration_on_purpose(
                purpose_id: Uuid,
                duration: &models::ColumnRetentionDuration,
            ) -> models::ColumnRetentionDurationResponse = retention::create_on_purpose;
            fn get_soft_deleted_retention_duration_on_purpose(
                purpose_id: Uuid,
                duration_id: Uuid,
            ) -> models::ColumnRetentionDurationResponse = retention::get_on_purpose;
            /// The purpose setting, or the inherited default when none is set.
            fn get_default_soft_deleted_retention_duration_on_purpose(
                purpose_id: Uuid,
            ) -> models::ColumnRetentionDurationResponse = retention::get_default_on_purpose;
            fn update_soft_deleted_retention_duration_on_purpose(
                purpose_id: Uuid,
                duration_id: Uuid,
                duration: &models::ColumnRetentionDuration,
            ) -> models::ColumnRetentionDurationResponse = retention::update_on_purpose;
            fn delete_soft_deleted_retention_duration_on_purpose(
                purpose_id: Uuid,
                duration_id: Uuid,
            ) -> bool = retention::delete_on_purpose;

            // soft-deleted retention: column

            fn get_soft_deleted_retention_duration_on_column(
                column_id: Uuid,
                duration_id: Uuid,
            ) -> models::ColumnRetentionDurationResponse = retention::get_on_column;
            /// The effective duration for every purpose of the column.
            fn get_soft_deleted_retention_durations_on_column(
                column_id: Uuid,
            ) -> models::ColumnRetentionDurationsResponse = retention::list_on_column;
            fn update_soft_deleted_retention_duration_on_column(
                column_id: Uuid,
                duration_id: Uuid,
                duration: &models::ColumnRetentionDuration,
            ) -> models::ColumnRetentionDurationResponse = retention::update_on_column;
            /// Add, change or remove the per-purpose durations of a column in
            /// one call.
            fn update_soft_deleted_retention_durations_on_column(
                column_id: Uuid,
                durations: &[models::ColumnRetentionDuration],
            ) -> models::ColumnRetentionDurationsResponse = retention::update_all_on_column;
            fn delete_soft_deleted_retention_duration_on_column(
                column_id: Uuid,
                duration_id: Uuid,
            ) -> bool = retention::delete_on_column;

            // access policy templates

            fn create_access_policy_template(
                template: models::AccessPolicyTemplate,
                if_not_exists: bool,
            ) -> models::AccessPolicyTemplate = tokenizer::create_access_policy_template;
            fn list_access_policy_templates(
                options: models::ListOptions,
            ) -> models::Page<models::AccessPolicyTemplate> = tokenizer::list_access_policy_templates;
            /// Look a template up by id, or by name when no id is set.
            fn get_access_policy_template(
                template: &models::ResourceId,
            ) -> models::AccessPolicyTemplate = tokenizer::get_access_policy_template;
            fn update_access_policy_template(
                template: &models::AccessPolicyTemplate,
            ) -> models::AccessPolicyTemplate = tokenizer::update_access_policy_template;
            fn delete_access_policy_template(id: Uuid, version: i64) -> bool =
                tokenizer::delete_access_policy_template;

            // access policies

            fn create_access_policy(
                policy: models::AccessPolicy,
                if_not_exists: bool,
            ) -> models::AccessPolicy = tokenizer::create_access_policy;
            fn list_access_policies(
                options: models::ListOptions,
            ) -> models::Page<models::AccessPolicy> = tokenizer::list_access_policies;
            /// Look a policy up by id, or by name when no id is set.
            fn get_access_policy(policy: &models::ResourceId) -> models::AccessPolicy =
                tokenizer::get_access_policy;
            fn update_access_policy(policy: &models::AccessPolicy) -> models::AccessPolicy =
                tokenizer::update_access_policy;
            fn delete_access_policy(id: Uuid, version: i64) -> bool =
                tokenizer::delete_access_policy;

            // transformers

            fn create_transformer(
                transformer: models::Transformer,
                if_not_exists: bool,
            ) -> models::Transformer = tokenizer::create_transformer;
            fn list_transformers(
                options: models::ListOptions,
            ) -> models::Page<models::Transformer> = tokenizer::list_transformers;
            fn delete_transformer(id: Uuid) -> bool = tokenizer::delete_transformer;

            // tokens

            /// Tokenize `data` and return the token.
            fn create_token(
                data: &str,
                transformer: &models::ResourceId,
                access_policy: &models::ResourceId,
            ) -> String = tokenizer::create_token;
            /// One token per input, reusing existing tokens where they exist.
            /// The three slices are matched by position.
            fn lookup_or_create_tokens(
                data: &[String],
                transformers: &[models::ResourceId],
                access_policies: &[models::ResourceId],
            ) -> Vec<String> = tokenizer::lookup_or_create_tokens;
            fn resolve_tokens(
                tokens: &[String],
                context: &serde_json::Value,
                purposes: &[models::ResourceId],
            ) -> Vec<models::ResolvedToken> = tokenizer::resolve_tokens;
            /// Delete a token. `Ok(false)` when it does not exist.
            fn delete_token(token: &str) -> bool = tokenizer::delete_token;
            fn inspect_token(token: &str) -> models::InspectTokenResponse =
                tokenizer::inspect_token;
            /// Existing tokens for `data`, without creating any.
            fn lookup_tokens(
                data: &str,
                transformer: &models::ResourceId,
                access_policy: &models::ResourceId,
            ) -> Vec<String> = tokenizer::lookup_tokens;

            // authz objects

            fn create_object(object: models::Object, if_not_exists: bool) -> models::Object =
                authz::create_object;
            fn get_object(id: Uuid) -> models::Object = authz::get_object;
            fn list_objects(options: models::ListOptions) -> models::Page<models::Object> =
                authz::list_objects;
            fn delete_object(id: Uuid) -> bool = authz::delete_object;

            // authz object types

            fn create_object_type(
                object_type: models::ObjectType,
                if_not_exists: bool,
            ) -> models::ObjectType = authz::create_object_type;
            fn get_object_type(id: Uuid) -> models::ObjectType = authz::get_object_type;
            fn list_object_types(
                options: models::ListOptions,
            ) -> models::Page<models::ObjectType> = authz::list_object_types;
            fn delete_object_type(id: Uuid) -> bool = authz::delete_object_type;

            // authz edges

            fn create_edge(edge: models::Edge, if_not_exists: bool) -> models::Edge =
                authz::create_edge;
            fn get_edge(id: Uuid) -> models::Edge = authz::get_edge;
            fn list_edges(options: models::ListOptions) -> models::Page<models::Edge> =
                authz::list_edges;
            fn delete_edge(id: Uuid) -> bool = authz::delete_edge;

            // authz edge types

            fn create_edge_type(
                edge_type: models::EdgeType,
                if_not_exists: bool,
            ) -> models::EdgeType = authz::create_edge_type;
            fn get_edge_type(id: Uuid) -> models::EdgeType = authz::get_edge_type;
            fn list_edge_types(
                options: models::ListOptions,
            ) -> models::Page<models::EdgeType> = authz::list_edge_types;
            fn delete_edge_type(id: Uuid) -> bool = authz::delete_edge_type;

            // authz organizations

            fn create_organization(
                organization: models::Organization,
                if_not_exists: bool,
            ) -> models::Organization = authz::create_organization;
            fn get_organization(id: Uuid) -> models::Organization = authz::get_organization;
            fn list_organizations(
                options: models::ListOptions,
            ) -> models::Page<models::Organization> = authz::list_organizations;
            fn delete_organization(id: Uuid) -> bool = authz::delete_organization;

            /// Whether `source` holds `attribute` on `target`.
            fn check_attribute(
                source_object_id: Uuid,
                target_object_id: Uuid,
                attribute: &str,
            ) -> bool = authz::check_attribute;
        }
    };
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::models::Purpose;
    use serde_json::json;

    fn query(request: &RequestDescriptor) -> Vec<(&str, &str)> {
        request
            .query
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    #[test]
    fn paging_parameters() {
        let id = Uuid::new_v4();
        let op = list::<Purpose>(
            "/userstore/config/purposes",
            ListOptions::default().with_limit(50).starting_after(id),
        );
        let starting_after = format!("id:{id}");
        assert_eq!(
            query(&op.request),
            vec![
                ("limit", "50"),
                ("starting_after", starting_after.as_str()),
                ("version", "3")
            ]
        );

        let op = list::<Purpose>(
            "/userstore/config/purposes",
            ListOptions::default().with_limit(0),
        );
        assert_eq!(query(&op.request), vec![("version", "3")]);
    }

    #[test]
    fn create_wraps_body_under_key() {
        let purpose = Purpose {
            name: "marketing".into(),
            ..Purpose::default()
        };
        let op = create("/userstore/config/purposes", "purpose", purpose, false).unwrap();
        let body: serde_json::Value =
            serde_json::from_slice(op.request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["purpose"]["name"], "marketing");
        assert_eq!(op.request.header_value("content-type"), Some("application/json"));
    }

    #[test]
    fn create_if_not_exists_recovers_identical_conflict() {
        let existing = Uuid::new_v4();
        let conflict = RawResponse::new(409).with_json(&json!({
            "error": "purpose already exists",
            "id": existing,
            "identical": true,
        }));
        let purpose = Purpose {
            name: "marketing".into(),
            ..Purpose::default()
        };

        let op = create("/p", "purpose", purpose.clone(), true).unwrap();
        let (_, decode) = op.into_parts();
        let recovered = decode(&conflict).unwrap();
        assert_eq!(recovered.id, existing);
        assert_eq!(recovered.name, "marketing");

        let op = create("/p", "purpose", purpose, false).unwrap();
        let (_, decode) = op.into_parts();
        assert_eq!(decode(&conflict).unwrap_err().status(), Some(409));
    }

    #[test]
    fn create_if_not_exists_keeps_other_errors() {
        let op = create("/p", "purpose", Purpose::default(), true).unwrap();
        let (_, decode) = op.into_parts();
        let err = decode(&RawResponse::new(409).with_json(&json!({
            "error": "different purpose with that name",
            "id": Uuid::new_v4(),
            "identical": false,
        })))
        .unwrap_err();
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn map_transforms_decoded_value() {
        let op = Operation::<serde_json::Value>::json(RequestDescriptor::get("/x"))
            .map(|v| v["n"].as_i64());
        let (_, decode) = op.into_parts();
        let out = decode(&RawResponse::new(200).with_json(&json!({"n": 7}))).unwrap();
        assert_eq!(out, Some(7));
    }

    #[test]
    fn validators() {
        assert!(require_id("id", Uuid::nil()).is_err());
        assert!(require_id("id", Uuid::new_v4()).is_ok());
        assert!(require_text("token", " ").is_err());
        assert!(require_resource("purpose", &ResourceId::default()).is_err());
        assert!(require_resources("purpose", &[ResourceId::by_name("a")]).is_ok());
        assert!(require_non_empty::<u8>("data", &[]).is_err());
    }
}
