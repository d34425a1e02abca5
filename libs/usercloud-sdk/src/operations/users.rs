use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use usercloud_http::RequestDescriptor;
use uuid::Uuid;

use super::{Operation, list, require_id, require_resources, require_text};
use crate::error::Error;
use crate::models::{ColumnConsentedPurposes, ListOptions, NewUser, Page, ResourceId, UserResponse};

const USERS_PATH: &str = "/authn/users";

#[derive(Deserialize)]
struct CreatedUser {
    id: Uuid,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Serialize)]
struct PasswordUser<'a> {
    username: &'a str,
    password: &'a str,
    authn_type: &'static str,
    #[serde(flatten)]
    user: NewUser,
}

#[derive(Serialize)]
struct ConsentedPurposesQuery<'a> {
    user_id: Uuid,
    #[serde(skip_serializing_if = "<[ResourceId]>::is_empty")]
    columns: &'a [ResourceId],
}

#[derive(Serialize)]
struct MutatorUser<'a> {
    mutator_id: Uuid,
    context: &'a Value,
    row_data: &'a Map<String, Value>,
    #[serde(flatten)]
    user: NewUser,
}

fn user_path(id: Uuid) -> String {
    format!("{USERS_PATH}/{id}")
}

fn created_id(request: RequestDescriptor) -> Operation<Uuid> {
    Operation::<CreatedUser>::json(request).map(|created| created.id)
}

pub fn create_user(user: NewUser) -> Result<Operation<Uuid>, Error> {
    Ok(created_id(RequestDescriptor::post(USERS_PATH).json_body(&user)?))
}

pub fn create_user_with_password(
    username: &str,
    password: &str,
    user: NewUser,
) -> Result<Operation<Uuid>, Error> {
    require_text("username", username)?;
    require_text("password", password)?;
    let body = PasswordUser {
        username,
        password,
        authn_type: "password",
        user,
    };
    Ok(created_id(RequestDescriptor::post(USERS_PATH).json_body(&body)?))
}

#[must_use]
pub fn list_users(options: ListOptions, email: Option<&str>) -> Operation<Page<UserResponse>> {
    let mut operation = list(USERS_PATH, options);
    if let Some(email) = email {
        operation.request = operation.request.query("email", email);
    }
    operation
}

pub fn get_user(id: Uuid) -> Result<Operation<UserResponse>, Error> {
    require_id("user id", id)?;
    Ok(super::get(user_path(id)))
}

pub fn update_user(id: Uuid, profile: &Map<String, Value>) -> Result<Operation<UserResponse>, Error> {
    require_id("user id", id)?;
    super::update(user_path(id), "profile", profile)
}

pub fn delete_user(id: Uuid) -> Result<Operation<bool>, Error> {
    require_id("user id", id)?;
    Ok(super::delete(RequestDescriptor::delete(user_path(id))))
}

pub fn get_consented_purposes_for_user(
    id: Uuid,
    columns: &[ResourceId],
) -> Result<Operation<Vec<ColumnConsentedPurposes>>, Error> {
    require_id("user id", id)?;
    require_resources("column", columns)?;
    let request = RequestDescriptor::post("/userstore/api/consentedpurposes")
        .json_body(&ConsentedPurposesQuery { user_id: id, columns })?;
    Ok(Operation::<DataEnvelope<ColumnConsentedPurposes>>::json(request).map(|page| page.data))
}

pub fn create_user_with_mutator(
    mutator_id: Uuid,
    context: &Value,
    row_data: &Map<String, Value>,
    user: NewUser,
) -> Result<Operation<Uuid>, Error> {
    require_id("mutator id", mutator_id)?;
    let body = MutatorUser {
        mutator_id,
        context,
        row_data,
        user,
    };
    Ok(Operation::json(
        RequestDescriptor::post("/userstore/api/users").json_body(&body)?,
    ))
}
