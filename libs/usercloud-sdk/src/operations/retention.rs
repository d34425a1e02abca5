//! Soft-deleted retention durations at tenant, purpose and column scope.

use serde::Serialize;
use usercloud_http::RequestDescriptor;
use uuid::Uuid;

use super::{Operation, delete, get, require_id};
use crate::error::Error;
use crate::models::{
    ColumnRetentionDuration, ColumnRetentionDurationResponse, ColumnRetentionDurationsResponse,
    DurationType,
};

const DURATIONS: &str = "softdeletedretentiondurations";

#[derive(Serialize)]
struct DurationBody<'a> {
    retention_duration: &'a ColumnRetentionDuration,
}

#[derive(Serialize)]
struct DurationsBody<'a> {
    retention_durations: &'a [ColumnRetentionDuration],
}

fn tenant_path() -> String {
    format!("/userstore/config/{DURATIONS}")
}

fn purpose_path(purpose_id: Uuid) -> String {
    format!("/userstore/config/purposes/{purpose_id}/{DURATIONS}")
}

fn column_path(column_id: Uuid) -> String {
    format!("/userstore/config/columns/{column_id}/{DURATIONS}")
}

fn require_soft_deleted(duration: &ColumnRetentionDuration) -> Result<(), Error> {
    if duration.duration_type != DurationType::SoftDeleted {
        return Err(Error::validation("retention duration must be of type softdeleted"));
    }
    Ok(())
}

fn write(
    request: RequestDescriptor,
    duration: &ColumnRetentionDuration,
) -> Result<Operation<ColumnRetentionDurationResponse>, Error> {
    require_soft_deleted(duration)?;
    let request = request.json_body(&DurationBody {
        retention_duration: duration,
    })?;
    Ok(Operation::json(request))
}

// tenant

pub fn create_on_tenant(
    duration: &ColumnRetentionDuration,
) -> Result<Operation<ColumnRetentionDurationResponse>, Error> {
    write(RequestDescriptor::post(tenant_path()), duration)
}

pub fn get_on_tenant(duration_id: Uuid) -> Result<Operation<ColumnRetentionDurationResponse>, Error> {
    require_id("duration id", duration_id)?;
    Ok(get(format!("{}/{duration_id}", tenant_path())))
}

#[must_use]
pub fn get_default_on_tenant() -> Operation<ColumnRetentionDurationResponse> {
    get(tenant_path())
}

pub fn update_on_tenant(
    duration_id: Uuid,
    duration: &ColumnRetentionDuration,
) -> Result<Operation<ColumnRetentionDurationResponse>, Error> {
    require_id("duration id", duration_id)?;
    write(
        RequestDescriptor::put(format!("{}/{duration_id}", tenant_path())),
        duration,
    )
}

pub fn delete_on_tenant(duration_id: Uuid) -> Result<Operation<bool>, Error> {
    require_id("duration id", duration_id)?;
    Ok(delete(RequestDescriptor::delete(format!(
        "{}/{duration_id}",
        tenant_path()
    ))))
}

// purpose

pub fn create_on_purpose(
    purpose_id: Uuid,
    duration: &ColumnRetentionDuration,
) -> Result<Operation<ColumnRetentionDurationResponse>, Error> {
    require_id("purpose id", purpose_id)?;
    write(RequestDescriptor::post(purpose_path(purpose_id)), duration)
}

pub fn get_on_purpose(
    purpose_id: Uuid,
    duration_id: Uuid,
) -> Result<Operation<ColumnRetentionDurationResponse>, Error> {
    require_id("purpose id", purpose_id)?;
    require_id("duration id", duration_id)?;
    Ok(get(format!("{}/{duration_id}", purpose_path(purpose_id))))
}

pub fn get_default_on_purpose(
    purpose_id: Uuid,
) -> Result<Operation<ColumnRetentionDurationResponse>, Error> {
    require_id("purpose id", purpose_id)?;
    Ok(get(purpose_path(purpose_id)))
}

pub fn update_on_purpose(
    purpose_id: Uuid,
    duration_id: Uuid,
    duration: &ColumnRetentionDuration,
) -> Result<Operation<ColumnRetentionDurationResponse>, Error> {
    require_id("purpose id", purpose_id)?;
    require_id("duration id", duration_id)?;
    write(
        RequestDescriptor::put(format!("{}/{duration_id}", purpose_path(purpose_id))),
        duration,
    )
}

pub fn delete_on_purpose(purpose_id: Uuid, duration_id: Uuid) -> Result<Operation<bool>, Error> {
    require_id("purpose id", purpose_id)?;
    require_id("duration id", duration_id)?;
    Ok(delete(RequestDescriptor::delete(format!(
        "{}/{duration_id}",
        purpose_path(purpose_id)
    ))))
}

// column

pub fn get_on_column(
    column_id: Uuid,
    duration_id: Uuid,
) -> Result<Operation<ColumnRetentionDurationResponse>, Error> {
    require_id("column id", column_id)?;
    require_id("duration id", duration_id)?;
    Ok(get(format!("{}/{duration_id}", column_path(column_id))))
}

pub fn list_on_column(column_id: Uuid) -> Result<Operation<ColumnRetentionDurationsResponse>, Error> {
    require_id("column id", column_id)?;
    Ok(get(column_path(column_id)))
}

pub fn update_on_column(
    column_id: Uuid,
    duration_id: Uuid,
    duration: &ColumnRetentionDuration,
) -> Result<Operation<ColumnRetentionDurationResponse>, Error> {
    require_id("column id", column_id)?;
    require_id("duration id", duration_id)?;
    write(
        RequestDescriptor::put(format!("{}/{duration_id}", column_path(column_id))),
        duration,
    )
}

pub fn update_all_on_column(
    column_id: Uuid,
    durations: &[ColumnRetentionDuration],
) -> Result<Operation<ColumnRetentionDurationsResponse>, Error> {
    require_id("column id", column_id)?;
    durations.iter().try_for_each(require_soft_deleted)?;
    let request = RequestDescriptor::post(column_path(column_id)).json_body(&DurationsBody {
        retention_durations: durations,
    })?;
    Ok(Operation::json(request))
}

pub fn delete_on_column(column_id: Uuid, duration_id: Uuid) -> Result<Operation<bool>, Error> {
    require_id("column id", column_id)?;
    require_id("duration id", duration_id)?;
    Ok(delete(RequestDescriptor::delete(format!(
        "{}/{duration_id}",
        column_path(column_id)
    ))))
}
