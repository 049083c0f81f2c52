//! OpenAPI document generation.
//!
//! The document is built entirely from the registry: every endpoint
//! (except the documentation routes themselves) becomes a path item with
//! one operation per method.  Request bodies are described from the
//! handler's signature, and responses from the endpoint's response code and
//! authentication requirement.

use crate::constants::{is_documentation_route, OPENAPI_VERSION};
use crate::signature::{JsonType, Param, Signature};
use crate::{Endpoint, Symmetric};
use serde_json::{json, Map, Value};

const SUCCESSFUL_OPERATION: &str = "#/components/responses/SuccessfulOperation";
const UNAUTHORIZED_ERROR: &str = "#/components/responses/UnauthorizedError";
const INTERNAL_ERROR: &str = "#/components/responses/InternalError";

/// Generates the OpenAPI document of the service.  Prefer
/// [`Symmetric::openapi`], which caches the result.
pub(crate) fn generate(app: &Symmetric) -> Value {
    let paths = app
        .registry()
        .iter()
        .filter(|endpoint| !is_documentation_route(endpoint.route()))
        .map(|endpoint| (endpoint.route().to_owned(), path_item(endpoint)))
        .collect::<Map<_, _>>();

    json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": app.title(),
            "version": app.version(),
        },
        "paths": paths,
        "components": {
            "securitySchemes": {
                "APIKeyAuth": {
                    "type": "apiKey",
                    "in": "header",
                    "name": app.client_token_name(),
                }
            },
            "responses": {
                "SuccessfulOperation": {
                    "description": "Successful operation."
                },
                "UnauthorizedError": {
                    "description": "Invalid or non-existent authentication credentials."
                },
                "InternalError": {
                    "description": "Unexpected internal error (the handler failed, \
                                    probably due to a misuse of the underlying function)."
                }
            }
        }
    })
}

fn path_item(endpoint: &Endpoint) -> Value {
    let schema = request_schema(endpoint.signature());
    let has_params = !endpoint.signature().params().is_empty();
    let has_body = has_params || endpoint.signature().accepts_extra_keys();
    let responses = responses(endpoint);

    let mut item = Map::new();
    for method in endpoint.methods() {
        let mut operation = Map::new();
        operation.insert("description".into(), endpoint.description().into());
        operation.insert("responses".into(), responses.clone());
        if endpoint.requires_auth() {
            operation.insert("security".into(), json!([{ "APIKeyAuth": [] }]));
        }
        if has_body {
            operation.insert(
                "requestBody".into(),
                json!({
                    "required": has_params,
                    "content": {
                        "application/json": { "schema": schema.clone() }
                    }
                }),
            );
        }
        item.insert(method.as_str().to_lowercase(), Value::Object(operation));
    }

    Value::Object(item)
}

/// The JSON schema of the request body a signature accepts.
pub(crate) fn request_schema(signature: &Signature) -> Value {
    let properties = signature
        .required_first()
        .map(|param| (param.name().to_owned(), property(param)))
        .collect::<Map<_, _>>();

    json!({
        "type": "object",
        "properties": properties,
        "additionalProperties": signature.accepts_extra_keys(),
    })
}

fn property(param: &Param) -> Value {
    let mut schema = Map::new();
    match param.declared_type() {
        Some(kind) => {
            schema.insert("type".into(), kind.as_str().into());
        }
        None => {
            let any = JsonType::ANY
                .iter()
                .map(|kind| json!({ "type": kind.as_str() }))
                .collect();
            schema.insert("oneOf".into(), Value::Array(any));
        }
    }
    if let Some(default) = param.default_value() {
        schema.insert("default".into(), default.clone());
    }
    Value::Object(schema)
}

fn responses(endpoint: &Endpoint) -> Value {
    let success = match endpoint.signature().returns() {
        Some(kind) => json!({
            "description": "Successful operation.",
            "content": {
                "application/json": {
                    "schema": { "type": kind.as_str() }
                }
            }
        }),
        None => json!({ "$ref": SUCCESSFUL_OPERATION }),
    };

    let mut responses = Map::new();
    responses.insert(endpoint.response_code().as_str().to_owned(), success);
    responses.insert("500".into(), json!({ "$ref": INTERNAL_ERROR }));
    if endpoint.requires_auth() {
        responses.insert("401".into(), json!({ "$ref": UNAUTHORIZED_ERROR }));
    }
    Value::Object(responses)
}
