use serde::Serialize;
use serde_json::{Map, Value};
use usercloud_http::RequestDescriptor;
use uuid::Uuid;

use super::{Operation, create, delete, get, list, require_id, require_text, update};
use crate::error::Error;
use crate::models::{Accessor, Column, ListOptions, Mutator, Page, Purpose};
use crate::response::decode_text;

const COLUMNS_PATH: &str = "/userstore/config/columns";
const PURPOSES_PATH: &str = "/userstore/config/purposes";
const ACCESSORS_PATH: &str = "/userstore/config/accessors";
const MUTATORS_PATH: &str = "/userstore/config/mutators";

#[derive(Serialize)]
struct ExecuteAccessor<'a> {
    accessor_id: Uuid,
    context: &'a Value,
    selector_values: &'a [Value],
}

#[derive(Serialize)]
struct ExecuteMutator<'a> {
    mutator_id: Uuid,
    context: &'a Value,
    selector_values: &'a [Value],
    row_data: &'a Map<String, Value>,
}

fn item_path(base: &str, id: Uuid) -> String {
    format!("{base}/{id}")
}

// columns

pub fn create_column(column: Column, if_not_exists: bool) -> Result<Operation<Column>, Error> {
    require_text("column name", &column.name)?;
    create(COLUMNS_PATH, "column", column, if_not_exists)
}

pub fn get_column(id: Uuid) -> Result<Operation<Column>, Error> {
    require_id("column id", id)?;
    Ok(get(item_path(COLUMNS_PATH, id)))
}

#[must_use]
pub fn list_columns(options: ListOptions) -> Operation<Page<Column>> {
    list(COLUMNS_PATH, options)
}

pub fn update_column(column: &Column) -> Result<Operation<Column>, Error> {
    require_id("column id", column.id)?;
    update(item_path(COLUMNS_PATH, column.id), "column", column)
}

pub fn delete_column(id: Uuid) -> Result<Operation<bool>, Error> {
    require_id("column id", id)?;
    Ok(delete(RequestDescriptor::delete(item_path(COLUMNS_PATH, id))))
}

// purposes

pub fn create_purpose(purpose: Purpose, if_not_exists: bool) -> Result<Operation<Purpose>, Error> {
    require_text("purpose name", &purpose.name)?;
    create(PURPOSES_PATH, "purpose", purpose, if_not_exists)
}

pub fn get_purpose(id: Uuid) -> Result<Operation<Purpose>, Error> {
    require_id("purpose id", id)?;
    Ok(get(item_path(PURPOSES_PATH, id)))
}

#[must_use]
pub fn list_purposes(options: ListOptions) -> Operation<Page<Purpose>> {
    list(PURPOSES_PATH, options)
}

pub fn update_purpose(purpose: &Purpose) -> Result<Operation<Purpose>, Error> {
    require_id("purpose id", purpose.id)?;
    update(item_path(PURPOSES_PATH, purpose.id), "purpose", purpose)
}

pub fn delete_purpose(id: Uuid) -> Result<Operation<bool>, Error> {
    require_id("purpose id", id)?;
    Ok(delete(RequestDescriptor::delete(item_path(PURPOSES_PATH, id))))
}

// accessors

pub fn create_accessor(accessor: Accessor, if_not_exists: bool) -> Result<Operation<Accessor>, Error> {
    require_text("accessor name", &accessor.name)?;
    create(ACCESSORS_PATH, "accessor", accessor, if_not_exists)
}

pub fn get_accessor(id: Uuid) -> Result<Operation<Accessor>, Error> {
    require_id("accessor id", id)?;
    Ok(get(item_path(ACCESSORS_PATH, id)))
}

#[must_use]
pub fn list_accessors(options: ListOptions) -> Operation<Page<Accessor>> {
    list(ACCESSORS_PATH, options)
}

pub fn update_accessor(accessor: &Accessor) -> Result<Operation<Accessor>, Error> {
    require_id("accessor id", accessor.id)?;
    update(item_path(ACCESSORS_PATH, accessor.id), "accessor", accessor)
}

pub fn delete_accessor(id: Uuid) -> Result<Operation<bool>, Error> {
    require_id("accessor id", id)?;
    Ok(delete(RequestDescriptor::delete(item_path(ACCESSORS_PATH, id))))
}

pub fn execute_accessor(
    accessor_id: Uuid,
    context: &Value,
    selector_values: &[Value],
) -> Result<Operation<Value>, Error> {
    require_id("accessor id", accessor_id)?;
    let body = ExecuteAccessor {
        accessor_id,
        context,
        selector_values,
    };
    Ok(Operation::json(
        RequestDescriptor::post("/userstore/api/accessors").json_body(&body)?,
    ))
}

// mutators

pub fn create_mutator(mutator: Mutator, if_not_exists: bool) -> Result<Operation<Mutator>, Error> {
    require_text("mutator name", &mutator.name)?;
    create(MUTATORS_PATH, "mutator", mutator, if_not_exists)
}

pub fn get_mutator(id: Uuid) -> Result<Operation<Mutator>, Error> {
    require_id("mutator id", id)?;
    Ok(get(item_path(MUTATORS_PATH, id)))
}

#[must_use]
pub fn list_mutators(options: ListOptions) -> Operation<Page<Mutator>> {
    list(MUTATORS_PATH, options)
}

pub fn update_mutator(mutator: &Mutator) -> Result<Operation<Mutator>, Error> {
    require_id("mutator id", mutator.id)?;
    update(item_path(MUTATORS_PATH, mutator.id), "mutator", mutator)
}

pub fn delete_mutator(id: Uuid) -> Result<Operation<bool>, Error> {
    require_id("mutator id", id)?;
    Ok(delete(RequestDescriptor::delete(item_path(MUTATORS_PATH, id))))
}

pub fn execute_mutator(
    mutator_id: Uuid,
    context: &Value,
    selector_values: &[Value],
    row_data: &Map<String, Value>,
) -> Result<Operation<Value>, Error> {
    require_id("mutator id", mutator_id)?;
    let body = ExecuteMutator {
        mutator_id,
        context,
        selector_values,
        row_data,
    };
    Ok(Operation::json(
        RequestDescriptor::post("/userstore/api/mutators").json_body(&body)?,
    ))
}

#[must_use]
pub fn download_userstore_sdk(include_example: bool) -> Operation<String> {
    let request = RequestDescriptor::get("/userstore/download/codegensdk.py")
        .query("include_example", include_example.to_string());
    Operation::new(request, decode_text)
}
