use serde::Deserialize;
use serde::de::DeserializeOwned;
use usercloud_http::RequestDescriptor;
use uuid::Uuid;

use super::{Operation, create, delete, get, list, require_id, require_text};
use crate::error::Error;
use crate::models::{Edge, EdgeType, ListOptions, Object, ObjectType, Organization, Page};

const OBJECTS_PATH: &str = "/authz/objects";
const OBJECT_TYPES_PATH: &str = "/authz/objecttypes";
const EDGES_PATH: &str = "/authz/edges";
const EDGE_TYPES_PATH: &str = "/authz/edgetypes";
const ORGANIZATIONS_PATH: &str = "/authz/organizations";

#[derive(Deserialize)]
struct AttributeCheck {
    #[serde(default)]
    has_attribute: bool,
}

fn get_by_id<T: DeserializeOwned + 'static>(
    base: &str,
    what: &str,
    id: Uuid,
) -> Result<Operation<T>, Error> {
    require_id(what, id)?;
    Ok(get(format!("{base}/{id}")))
}

fn delete_by_id(base: &str, what: &str, id: Uuid) -> Result<Operation<bool>, Error> {
    require_id(what, id)?;
    Ok(delete(RequestDescriptor::delete(format!("{base}/{id}"))))
}

// objects

pub fn create_object(object: Object, if_not_exists: bool) -> Result<Operation<Object>, Error> {
    require_id("object type id", object.type_id)?;
    create(OBJECTS_PATH, "object", object, if_not_exists)
}

pub fn get_object(id: Uuid) -> Result<Operation<Object>, Error> {
    get_by_id(OBJECTS_PATH, "object id", id)
}

#[must_use]
pub fn list_objects(options: ListOptions) -> Operation<Page<Object>> {
    list(OBJECTS_PATH, options)
}

pub fn delete_object(id: Uuid) -> Result<Operation<bool>, Error> {
    delete_by_id(OBJECTS_PATH, "object id", id)
}

// object types

pub fn create_object_type(
    object_type: ObjectType,
    if_not_exists: bool,
) -> Result<Operation<ObjectType>, Error> {
    require_text("object type name", &object_type.type_name)?;
    create(OBJECT_TYPES_PATH, "object_type", object_type, if_not_exists)
}

pub fn get_object_type(id: Uuid) -> Result<Operation<ObjectType>, Error> {
    get_by_id(OBJECT_TYPES_PATH, "object type id", id)
}

#[must_use]
pub fn list_object_types(options: ListOptions) -> Operation<Page<ObjectType>> {
    list(OBJECT_TYPES_PATH, options)
}

pub fn delete_object_type(id: Uuid) -> Result<Operation<bool>, Error> {
    delete_by_id(OBJECT_TYPES_PATH, "object type id", id)
}

// edges

pub fn create_edge(edge: Edge, if_not_exists: bool) -> Result<Operation<Edge>, Error> {
    require_id("edge type id", edge.edge_type_id)?;
    require_id("source object id", edge.source_object_id)?;
    require_id("target object id", edge.target_object_id)?;
    create(EDGES_PATH, "edge", edge, if_not_exists)
}

pub fn get_edge(id: Uuid) -> Result<Operation<Edge>, Error> {
    get_by_id(EDGES_PATH, "edge id", id)
}

#[must_use]
pub fn list_edges(options: ListOptions) -> Operation<Page<Edge>> {
    list(EDGES_PATH, options)
}

pub fn delete_edge(id: Uuid) -> Result<Operation<bool>, Error> {
    delete_by_id(EDGES_PATH, "edge id", id)
}

// edge types

pub fn create_edge_type(
    edge_type: EdgeType,
    if_not_exists: bool,
) -> Result<Operation<EdgeType>, Error> {
    require_text("edge type name", &edge_type.type_name)?;
    require_id("source object type id", edge_type.source_object_type_id)?;
    require_id("target object type id", edge_type.target_object_type_id)?;
    create(EDGE_TYPES_PATH, "edge_type", edge_type, if_not_exists)
}

pub fn get_edge_type(id: Uuid) -> Result<Operation<EdgeType>, Error> {
    get_by_id(EDGE_TYPES_PATH, "edge type id", id)
}

#[must_use]
pub fn list_edge_types(options: ListOptions) -> Operation<Page<EdgeType>> {
    list(EDGE_TYPES_PATH, options)
}

pub fn delete_edge_type(id: Uuid) -> Result<Operation<bool>, Error> {
    delete_by_id(EDGE_TYPES_PATH, "edge type id", id)
}

// organizations

pub fn create_organization(
    organization: Organization,
    if_not_exists: bool,
) -> Result<Operation<Organization>, Error> {
    require_text("organization name", &organization.name)?;
    create(ORGANIZATIONS_PATH, "organization", organization, if_not_exists)
}

pub fn get_organization(id: Uuid) -> Result<Operation<Organization>, Error> {
    get_by_id(ORGANIZATIONS_PATH, "organization id", id)
}

#[must_use]
pub fn list_organizations(options: ListOptions) -> Operation<Page<Organization>> {
    list(ORGANIZATIONS_PATH, options)
}

pub fn delete_organization(id: Uuid) -> Result<Operation<bool>, Error> {
    delete_by_id(ORGANIZATIONS_PATH, "organization id", id)
}

pub fn check_attribute(
    source_object_id: Uuid,
    target_object_id: Uuid,
    attribute: &str,
) -> Result<Operation<bool>, Error> {
    require_id("source object id", source_object_id)?;
    require_id("target object id", target_object_id)?;
    require_text("attribute", attribute)?;
    let request = RequestDescriptor::get("/authz/checkattribute")
        .query("source_object_id", source_object_id.to_string())
        .query("target_object_id", target_object_id.to_string())
        .query("attribute", attribute);
    Ok(Operation::<AttributeCheck>::json(request).map(|check| check.has_attribute))
}
