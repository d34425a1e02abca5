use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use usercloud_http::RequestDescriptor;
use uuid::Uuid;

use super::{
    Operation, create, delete, list, require_id, require_non_empty, require_resource,
    require_resources, require_text, update,
};
use crate::error::Error;
use crate::models::{
    AccessPolicy, AccessPolicyTemplate, InspectTokenResponse, ListOptions, Page, ResolvedToken,
    ResourceId, Transformer,
};

const TEMPLATES_PATH: &str = "/tokenizer/policies/accesstemplate";
const POLICIES_PATH: &str = "/tokenizer/policies/access";
const TRANSFORMERS_PATH: &str = "/tokenizer/policies/transformation";
const TOKENS_PATH: &str = "/tokenizer/tokens";

#[derive(Serialize)]
struct TokenRequest<'a> {
    data: &'a str,
    transformer_rid: &'a ResourceId,
    access_policy_rid: &'a ResourceId,
}

#[derive(Serialize)]
struct BatchTokenRequest<'a> {
    data: &'a [String],
    transformer_rids: &'a [ResourceId],
    access_policy_rids: &'a [ResourceId],
}

#[derive(Serialize)]
struct ResolveRequest<'a> {
    tokens: &'a [String],
    context: &'a Value,
    purposes: &'a [ResourceId],
}

#[derive(Serialize)]
struct InspectRequest<'a> {
    token: &'a str,
}

#[derive(Deserialize)]
struct CreatedToken {
    data: String,
}

#[derive(Deserialize)]
struct Tokens {
    #[serde(default)]
    tokens: Vec<String>,
}

/// `GET base/{id}` when the id is set, else `GET base?name=`.
fn by_resource<T: DeserializeOwned + 'static>(
    base: &str,
    what: &str,
    rid: &ResourceId,
) -> Result<Operation<T>, Error> {
    require_resource(what, rid)?;
    let request = match (rid.resolved_id(), rid.resolved_name()) {
        (Some(id), _) => RequestDescriptor::get(format!("{base}/{id}")),
        (None, name) => RequestDescriptor::get(base).query_opt("name", name),
    };
    Ok(Operation::json(request))
}

fn versioned_delete(base: &str, id: Uuid, param: &str, version: i64) -> Operation<bool> {
    delete(RequestDescriptor::delete(format!("{base}/{id}")).query(param, version.to_string()))
}

// access policy templates

pub fn create_access_policy_template(
    template: AccessPolicyTemplate,
    if_not_exists: bool,
) -> Result<Operation<AccessPolicyTemplate>, Error> {
    require_text("access policy template name", &template.name)?;
    create(TEMPLATES_PATH, "access_policy_template", template, if_not_exists)
}

#[must_use]
pub fn list_access_policy_templates(options: ListOptions) -> Operation<Page<AccessPolicyTemplate>> {
    list(TEMPLATES_PATH, options)
}

pub fn get_access_policy_template(
    template: &ResourceId,
) -> Result<Operation<AccessPolicyTemplate>, Error> {
    by_resource(TEMPLATES_PATH, "access policy template", template)
}

pub fn update_access_policy_template(
    template: &AccessPolicyTemplate,
) -> Result<Operation<AccessPolicyTemplate>, Error> {
    require_id("access policy template id", template.id)?;
    update(
        format!("{TEMPLATES_PATH}/{}", template.id),
        "access_policy_template",
        template,
    )
}

pub fn delete_access_policy_template(id: Uuid, version: i64) -> Result<Operation<bool>, Error> {
    require_id("access policy template id", id)?;
    Ok(versioned_delete(TEMPLATES_PATH, id, "template_version", version))
}

// access policies

pub fn create_access_policy(
    policy: AccessPolicy,
    if_not_exists: bool,
) -> Result<Operation<AccessPolicy>, Error> {
    require_text("access policy name", &policy.name)?;
    for component in &policy.components {
        match (&component.policy, &component.template) {
            (Some(rid), None) | (None, Some(rid)) => require_resource("policy component", rid)?,
            _ => {
                return Err(Error::validation(
                    "policy component needs exactly one of policy or template",
                ));
            }
        }
    }
    create(POLICIES_PATH, "access_policy", policy, if_not_exists)
}

#[must_use]
pub fn list_access_policies(options: ListOptions) -> Operation<Page<AccessPolicy>> {
    list(POLICIES_PATH, options)
}

pub fn get_access_policy(policy: &ResourceId) -> Result<Operation<AccessPolicy>, Error> {
    by_resource(POLICIES_PATH, "access policy", policy)
}

pub fn update_access_policy(policy: &AccessPolicy) -> Result<Operation<AccessPolicy>, Error> {
    require_id("access policy id", policy.id)?;
    update(
        format!("{POLICIES_PATH}/{}", policy.id),
        "access_policy",
        policy,
    )
}

pub fn delete_access_policy(id: Uuid, version: i64) -> Result<Operation<bool>, Error> {
    require_id("access policy id", id)?;
    Ok(versioned_delete(POLICIES_PATH, id, "policy_version", version))
}

// transformers (immutable once created)

pub fn create_transformer(
    transformer: Transformer,
    if_not_exists: bool,
) -> Result<Operation<Transformer>, Error> {
    require_text("transformer name", &transformer.name)?;
    create(TRANSFORMERS_PATH, "transformer", transformer, if_not_exists)
}

#[must_use]
pub fn list_transformers(options: ListOptions) -> Operation<Page<Transformer>> {
    list(TRANSFORMERS_PATH, options)
}

pub fn delete_transformer(id: Uuid) -> Result<Operation<bool>, Error> {
    require_id("transformer id", id)?;
    Ok(delete(RequestDescriptor::delete(format!(
        "{TRANSFORMERS_PATH}/{id}"
    ))))
}

// tokens

pub fn create_token(
    data: &str,
    transformer: &ResourceId,
    access_policy: &ResourceId,
) -> Result<Operation<String>, Error> {
    require_resource("transformer", transformer)?;
    require_resource("access policy", access_policy)?;
    let request = RequestDescriptor::post(TOKENS_PATH).json_body(&TokenRequest {
        data,
        transformer_rid: transformer,
        access_policy_rid: access_policy,
    })?;
    Ok(Operation::<CreatedToken>::json(request).map(|created| created.data))
}

pub fn lookup_or_create_tokens(
    data: &[String],
    transformers: &[ResourceId],
    access_policies: &[ResourceId],
) -> Result<Operation<Vec<String>>, Error> {
    require_non_empty("data", data)?;
    if transformers.len() != data.len() || access_policies.len() != data.len() {
        return Err(Error::validation(format!(
            "data, transformers and access policies must have the same length ({}, {}, {})",
            data.len(),
            transformers.len(),
            access_policies.len()
        )));
    }
    require_resources("transformer", transformers)?;
    require_resources("access policy", access_policies)?;
    let request = RequestDescriptor::post(format!("{TOKENS_PATH}/actions/lookuporcreate"))
        .json_body(&BatchTokenRequest {
            data,
            transformer_rids: transformers,
            access_policy_rids: access_policies,
        })?;
    Ok(Operation::<Tokens>::json(request).map(|found| found.tokens))
}

pub fn resolve_tokens(
    tokens: &[String],
    context: &Value,
    purposes: &[ResourceId],
) -> Result<Operation<Vec<ResolvedToken>>, Error> {
    require_non_empty("tokens", tokens)?;
    for token in tokens {
        require_text("token", token)?;
    }
    require_resources("purpose", purposes)?;
    let request = RequestDescriptor::post(format!("{TOKENS_PATH}/actions/resolve")).json_body(
        &ResolveRequest {
            tokens,
            context,
            purposes,
        },
    )?;
    Ok(Operation::json(request))
}

pub fn delete_token(token: &str) -> Result<Operation<bool>, Error> {
    require_text("token", token)?;
    Ok(delete(RequestDescriptor::delete(TOKENS_PATH).query("token", token)))
}

pub fn inspect_token(token: &str) -> Result<Operation<InspectTokenResponse>, Error> {
    require_text("token", token)?;
    let request = RequestDescriptor::post(format!("{TOKENS_PATH}/actions/inspect"))
        .json_body(&InspectRequest { token })?;
    Ok(Operation::json(request))
}

pub fn lookup_tokens(
    data: &str,
    transformer: &ResourceId,
    access_policy: &ResourceId,
) -> Result<Operation<Vec<String>>, Error> {
    require_resource("transformer", transformer)?;
    require_resource("access policy", access_policy)?;
    let request = RequestDescriptor::post(format!("{TOKENS_PATH}/actions/lookup")).json_body(
        &TokenRequest {
            data,
            transformer_rid: transformer,
            access_policy_rid: access_policy,
        },
    )?;
    Ok(Operation::<Tokens>::json(request).map(|found| found.tokens))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::models::{ACCESS_POLICY_OPEN, AccessPolicyComponent, TRANSFORMER_UUID};
    use serde_json::json;
    use usercloud_http::{Method, RawResponse};

    fn body(op: &Operation<impl Sized>) -> Value {
        serde_json::from_slice(op.request.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn get_template_by_id_or_name() {
        let id = Uuid::new_v4();
        let op = get_access_policy_template(&ResourceId::by_id(id)).unwrap();
        assert_eq!(op.request.path, format!("/tokenizer/policies/accesstemplate/{id}"));
        assert!(op.request.query.is_empty());

        let op = get_access_policy(&ResourceId::by_name("open")).unwrap();
        assert_eq!(op.request.path, "/tokenizer/policies/access");
        assert_eq!(op.request.query, vec![("name".to_owned(), "open".to_owned())]);

        assert!(get_access_policy(&ResourceId::default()).is_err());
    }

    #[test]
    fn versioned_deletes() {
        let id = Uuid::new_v4();
        let op = delete_access_policy(id, 4).unwrap();
        assert_eq!(op.request.method, Method::Delete);
        assert_eq!(
            op.request.query,
            vec![("policy_version".to_owned(), "4".to_owned())]
        );
        let op = delete_access_policy_template(id, 0).unwrap();
        assert_eq!(
            op.request.query,
            vec![("template_version".to_owned(), "0".to_owned())]
        );
    }

    #[test]
    fn policy_components_need_one_reference() {
        let policy = AccessPolicy {
            name: "broken".into(),
            components: vec![AccessPolicyComponent::default()],
            ..AccessPolicy::default()
        };
        assert!(matches!(
            create_access_policy(policy, false),
            Err(Error::Validation { .. })
        ));

        let policy = AccessPolicy {
            name: "open-or-nothing".into(),
            components: vec![AccessPolicyComponent::policy(ACCESS_POLICY_OPEN)],
            ..AccessPolicy::default()
        };
        let op = create_access_policy(policy, false).unwrap();
        assert_eq!(body(&op)["access_policy"]["name"], "open-or-nothing");
    }

    #[test]
    fn create_token_returns_data_field() {
        let op = create_token(
            "4111111111111111",
            &ResourceId::by_id(TRANSFORMER_UUID),
            &ResourceId::by_id(ACCESS_POLICY_OPEN),
        )
        .unwrap();
        assert_eq!(op.request.path, "/tokenizer/tokens");
        assert_eq!(
            body(&op),
            json!({
                "data": "4111111111111111",
                "transformer_rid": {"id": TRANSFORMER_UUID},
                "access_policy_rid": {"id": ACCESS_POLICY_OPEN},
            })
        );
        let (_, decode) = op.into_parts();
        let token = decode(&RawResponse::new(200).with_json(&json!({"data": "tok-1"}))).unwrap();
        assert_eq!(token, "tok-1");
    }

    #[test]
    fn batch_lengths_must_match() {
        let data = vec!["a".to_owned(), "b".to_owned()];
        let rids = vec![ResourceId::by_id(TRANSFORMER_UUID)];
        let err = lookup_or_create_tokens(&data, &rids, &rids).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(lookup_or_create_tokens(&[], &[], &[]).is_err());
    }

    #[test]
    fn lookup_or_create_reads_tokens() {
        let data = vec!["a".to_owned()];
        let transformers = vec![ResourceId::by_id(TRANSFORMER_UUID)];
        let policies = vec![ResourceId::by_name("open")];
        let op = lookup_or_create_tokens(&data, &transformers, &policies).unwrap();
        assert_eq!(op.request.path, "/tokenizer/tokens/actions/lookuporcreate");
        assert_eq!(body(&op)["access_policy_rids"], json!([{"name": "open"}]));
        let (_, decode) = op.into_parts();
        let tokens = decode(&RawResponse::new(200).with_json(&json!({"tokens": ["t-a"]}))).unwrap();
        assert_eq!(tokens, vec!["t-a".to_owned()]);
    }

    #[test]
    fn resolve_keeps_request_order() {
        let tokens = vec!["t1".to_owned(), "t2".to_owned()];
        let op = resolve_tokens(&tokens, &json!({}), &[ResourceId::by_name("operational")]).unwrap();
        let (_, decode) = op.into_parts();
        let resolved = decode(&RawResponse::new(200).with_json(&json!([
            {"data": "alice", "token": "t1"},
            {"data": "bob", "token": "t2"},
        ])))
        .unwrap();
        assert_eq!(resolved[0].data, "alice");
        assert_eq!(resolved[1].token, "t2");
    }

    #[test]
    fn delete_token_uses_query() {
        let op = delete_token("tok").unwrap();
        assert_eq!(op.request.path, "/tokenizer/tokens");
        assert_eq!(op.request.query, vec![("token".to_owned(), "tok".to_owned())]);
        assert!(delete_token("  ").is_err());
        assert!(inspect_token("").is_err());
    }
}
