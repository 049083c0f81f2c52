//! The per-request pipeline.
//!
//! A request moves through a fixed sequence of steps: it is received (its
//! endpoint is looked up, and its body parsed), authenticated, bound to the
//! handler's parameters, and finally handed to the handler.  Any step may
//! fail; every failure is mapped, in one place, onto a status code and an
//! empty JSON body.  The details of a failure are only ever logged.

use crate::binder::bind;
use crate::constants::{DOCUMENTATION_ROUTE, OPENAPI_ROUTE};
use crate::{Endpoint, Params, Symmetric, SymmetricError};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
/// The body of a [`Reply`].
pub enum ReplyBody {
    /// A JSON value.
    Json(Value),
    /// An HTML page.
    Html(String),
}

#[derive(Debug, Clone, PartialEq)]
#[must_use]
/// The transport-neutral result of dispatching a request.
pub struct Reply {
    status: http::StatusCode,
    body: ReplyBody,
}

impl Reply {
    /// Creates a reply with a JSON body.
    pub fn json(status: http::StatusCode, body: Value) -> Self {
        Reply {
            status,
            body: ReplyBody::Json(body),
        }
    }

    /// Creates a reply with an HTML body and a status of 200.
    pub fn html(body: String) -> Self {
        Reply {
            status: http::StatusCode::OK,
            body: ReplyBody::Html(body),
        }
    }

    /// Creates a reply with an empty JSON object as its body.
    pub fn empty(status: http::StatusCode) -> Self {
        Reply::json(status, Value::Object(Map::new()))
    }

    /// The status code of the reply.
    #[must_use]
    pub fn status(&self) -> http::StatusCode {
        self.status
    }

    /// The body of the reply.
    #[must_use]
    pub fn body(&self) -> &ReplyBody {
        &self.body
    }

    /// The JSON body of the reply, if it has one.
    #[must_use]
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            ReplyBody::Json(value) => Some(value),
            ReplyBody::Html(_) => None,
        }
    }

    /// The value of the `Content-Type` header for the reply.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self.body {
            ReplyBody::Json(_) => "application/json",
            ReplyBody::Html(_) => "text/html; charset=utf-8",
        }
    }
}

impl From<Reply> for http::Response<hyper::Body> {
    fn from(reply: Reply) -> Self {
        let content_type = http::HeaderValue::from_static(reply.content_type());
        let body = match reply.body {
            ReplyBody::Json(value) => value.to_string(),
            ReplyBody::Html(page) => page,
        };

        let mut response = http::Response::new(hyper::Body::from(body));
        *response.status_mut() = reply.status;
        response
            .headers_mut()
            .insert(http::header::CONTENT_TYPE, content_type);
        response
    }
}

#[derive(Debug)]
enum Failure {
    NotFound,
    MethodNotAllowed,
    Unauthenticated(SymmetricError),
    Internal(anyhow::Error),
}

impl Failure {
    fn status(&self) -> http::StatusCode {
        match self {
            Failure::NotFound => http::StatusCode::NOT_FOUND,
            Failure::MethodNotAllowed => http::StatusCode::METHOD_NOT_ALLOWED,
            Failure::Unauthenticated(_) => http::StatusCode::UNAUTHORIZED,
            Failure::Internal(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn log(&self, method: &http::Method, route: &str) {
        match self {
            Failure::NotFound | Failure::MethodNotAllowed => {
                log::trace!("{} {} --> {}", method, route, self.status());
            }
            Failure::Unauthenticated(error) => log::error!("exception caught: {}", error),
            Failure::Internal(error) => log::error!("exception caught: {:#}", error),
        }
    }
}

impl Symmetric {
    /// Dispatches one request, returning the reply to send.
    ///
    /// The body is expected to be a JSON object; anything else (including
    /// an empty body) is treated as `{}`.  A successful handler replies with
    /// the endpoint's response code and its serialized value; an
    /// authentication failure replies `401 {}`; any other failure replies
    /// `500 {}`.  Unknown routes reply `404 {}`, and methods the endpoint
    /// does not accept reply `405 {}`.
    ///
    /// # Examples
    /// ```rust
    /// # use symmetric::{Param, Params};
    /// # #[tokio::main] async fn main() -> Result<(), anyhow::Error> {
    /// async fn echo(params: Params) -> Result<String, anyhow::Error> {
    ///     Ok(params.get("text")?)
    /// }
    ///
    /// let mut app = symmetric::app();
    /// app.router("/echo").post().param(Param::typed::<String>("text")).try_handle(echo)?;
    /// let reply = app
    ///     .dispatch(&http::Method::POST, "/echo", &http::HeaderMap::new(), br#"{"text":"hi"}"#)
    ///     .await;
    /// assert_eq!(reply.status(), http::StatusCode::OK);
    /// assert_eq!(reply.json_body(), Some(&serde_json::json!("hi")));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn dispatch(
        &self,
        method: &http::Method,
        route: &str,
        headers: &http::HeaderMap,
        body: &[u8],
    ) -> Reply {
        match self.run(method, route, headers, body).await {
            Ok(reply) => reply,
            Err(failure) => {
                failure.log(method, route);
                Reply::empty(failure.status())
            }
        }
    }

    async fn run(
        &self,
        method: &http::Method,
        route: &str,
        headers: &http::HeaderMap,
        body: &[u8],
    ) -> Result<Reply, Failure> {
        let body = parse_body(body);
        let endpoint = self.registry().get(route);
        log_request(method, route, endpoint, &body);

        if self.serves_docs() {
            if let Some(reply) = self.documentation(method, route)? {
                return Ok(reply);
            }
        }

        let endpoint = endpoint.ok_or(Failure::NotFound)?;
        if !endpoint.allows(method) {
            return Err(Failure::MethodNotAllowed);
        }

        crate::auth::authenticate(
            headers,
            endpoint.requires_auth(),
            self.client_token_name(),
            self.server_token_name(),
            self.secret_store(),
        )
        .map_err(Failure::Unauthenticated)?;

        let bound = bind(
            body,
            endpoint.signature(),
            endpoint.requires_auth(),
            self.client_token_name(),
        );
        let params = Params::new(bound, endpoint.signature().clone());

        let value = endpoint
            .handler()
            .call(params)
            .await
            .map_err(Failure::Internal)?;
        Ok(Reply::json(endpoint.response_code(), value))
    }

    fn documentation(&self, method: &http::Method, route: &str) -> Result<Option<Reply>, Failure> {
        if !crate::constants::is_documentation_route(route) {
            return Ok(None);
        }

        if *method != http::Method::GET && *method != http::Method::HEAD {
            return Err(Failure::MethodNotAllowed);
        }

        let reply = match route {
            OPENAPI_ROUTE => Reply::json(http::StatusCode::OK, (*self.openapi()).clone()),
            DOCUMENTATION_ROUTE => Reply::html(crate::docs::redoc_html(&self.title())),
            _ => return Ok(None),
        };
        Ok(Some(reply))
    }
}

fn parse_body(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn request_line(method: &http::Method, route: &str, endpoint: Option<&Endpoint>) -> String {
    match endpoint {
        Some(endpoint) => format!(
            "{} request to '{}' endpoint ('{}' handler).",
            method,
            route,
            endpoint.handler_name()
        ),
        None => format!("{} request to '{}' endpoint (no handler).", method, route),
    }
}

fn log_request(
    method: &http::Method,
    route: &str,
    endpoint: Option<&Endpoint>,
    body: &Map<String, Value>,
) {
    log::info!("{}", request_line(method, route, endpoint));

    if !body.is_empty() && log::log_enabled!(log::Level::Info) {
        if let Ok(pretty) = serde_json::to_string_pretty(body) {
            log::info!("Request Body:\n{}", pretty);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{API_CLIENT_TOKEN_NAME, API_SERVER_TOKEN_NAME};
    use crate::Param;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[allow(clippy::unused_async)]
    async fn sum(params: Params) -> Result<i64, anyhow::Error> {
        Ok(params.get::<i64>("a")? + params.get::<i64>("b")?)
    }

    #[allow(clippy::unused_async)]
    async fn fail(_: Params) -> Result<(), anyhow::Error> {
        Err(anyhow::anyhow!("secret internals"))
    }

    fn app() -> Symmetric {
        let mut app = crate::app();
        app.secrets(HashMap::from([(
            API_SERVER_TOKEN_NAME.to_owned(),
            "test_token".to_owned(),
        )]));
        app.router("/sum")
            .post()
            .param(Param::typed::<i64>("a"))
            .param(Param::typed::<i64>("b").default(10))
            .try_handle(sum)
            .unwrap();
        app.router("/fail").get().try_handle(fail).unwrap();
        app
    }

    fn headers(token: Option<&'static str>) -> http::HeaderMap {
        let mut headers = http::HeaderMap::new();
        if let Some(token) = token {
            headers.insert(API_CLIENT_TOKEN_NAME, http::HeaderValue::from_static(token));
        }
        headers
    }

    async fn post(app: &Symmetric, route: &str, headers: &http::HeaderMap, body: &str) -> Reply {
        app.dispatch(&http::Method::POST, route, headers, body.as_bytes())
            .await
    }

    #[tokio::test]
    async fn success() {
        let app = app();
        let reply = post(&app, "/sum", &headers(None), r#"{"a": 1, "b": 2, "c": 3}"#).await;
        assert_eq!(reply.status(), http::StatusCode::OK);
        assert_eq!(reply.json_body(), Some(&json!(3)));
    }

    #[tokio::test]
    async fn uses_defaults_and_response_code() {
        let mut app = app();
        app.router("/created")
            .post()
            .response_code(http::StatusCode::CREATED)
            .param(Param::new("a"))
            .param(Param::new("b").default(10))
            .try_handle(sum)
            .unwrap();
        let reply = post(&app, "/created", &headers(None), r#"{"a": 1}"#).await;
        assert_eq!(reply.status(), http::StatusCode::CREATED);
        assert_eq!(reply.json_body(), Some(&json!(11)));
    }

    #[tokio::test]
    async fn handler_errors_are_hidden() {
        let app = app();
        let reply = app
            .dispatch(&http::Method::GET, "/fail", &headers(None), b"")
            .await;
        assert_eq!(reply.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.json_body(), Some(&json!({})));
    }

    #[tokio::test]
    async fn unserializable_values_are_internal_errors() {
        let mut app = app();
        app.router("/grid")
            .try_handle(|_: Params| async {
                Ok::<_, anyhow::Error>(HashMap::from([((0, 0), 1), ((1, 2), 3)]))
            })
            .unwrap();

        let reply = app
            .dispatch(&http::Method::GET, "/grid", &headers(None), b"")
            .await;
        assert_eq!(reply.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.json_body(), Some(&json!({})));
    }

    #[tokio::test]
    async fn missing_parameters_are_internal_errors() {
        let app = app();
        let reply = post(&app, "/sum", &headers(None), "not json").await;
        assert_eq!(reply.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.json_body(), Some(&json!({})));
    }

    #[tokio::test]
    async fn authentication_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut app = app();
        app.router("/secure")
            .post()
            .auth_token(true)
            .extra_keys(true)
            .try_handle(move |params: Params| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, anyhow::Error>(Value::Object(params.into_inner()))
                }
            })
            .unwrap();

        let reply = post(&app, "/secure", &headers(None), "{}").await;
        assert_eq!(reply.status(), http::StatusCode::UNAUTHORIZED);
        assert_eq!(reply.json_body(), Some(&json!({})));

        let reply = post(&app, "/secure", &headers(Some("wrong")), "{}").await;
        assert_eq!(reply.status(), http::StatusCode::UNAUTHORIZED);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let body = r#"{"symmetric_api_key": "test_token", "kept": true}"#;
        let reply = post(&app, "/secure", &headers(Some("test_token")), body).await;
        assert_eq!(reply.status(), http::StatusCode::OK);
        assert_eq!(reply.json_body(), Some(&json!({ "kept": true })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn routing_misses() {
        let app = app();
        let reply = post(&app, "/nowhere", &headers(None), "{}").await;
        assert_eq!(reply.status(), http::StatusCode::NOT_FOUND);
        let reply = post(&app, "/fail", &headers(None), "{}").await;
        assert_eq!(reply.status(), http::StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(reply.json_body(), Some(&json!({})));
    }

    #[tokio::test]
    async fn serves_documentation() {
        let app = app();
        let reply = app
            .dispatch(&http::Method::GET, OPENAPI_ROUTE, &headers(None), b"")
            .await;
        assert_eq!(reply.status(), http::StatusCode::OK);
        assert_eq!(reply.json_body(), Some(&*app.openapi()));

        let reply = app
            .dispatch(&http::Method::GET, DOCUMENTATION_ROUTE, &headers(None), b"")
            .await;
        assert_eq!(reply.content_type(), "text/html; charset=utf-8");
        assert!(matches!(reply.body(), ReplyBody::Html(page) if page.contains(OPENAPI_ROUTE)));

        let reply = post(&app, OPENAPI_ROUTE, &headers(None), "{}").await;
        assert_eq!(reply.status(), http::StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn documentation_can_be_disabled() {
        let mut app = app();
        app.serve_docs(false);
        let reply = app
            .dispatch(&http::Method::GET, OPENAPI_ROUTE, &headers(None), b"")
            .await;
        assert_eq!(reply.status(), http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn converts_into_http_responses() {
        let response: http::Response<hyper::Body> =
            Reply::empty(http::StatusCode::UNAUTHORIZED).into();
        assert_eq!(response.status(), http::StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn request_lines_name_the_handler() {
        let app = app();
        let line = request_line(&http::Method::POST, "/sum", app.registry().get("/sum"));
        assert!(line.starts_with("POST request to '/sum' endpoint ('"));
        assert!(line.ends_with("sum' handler)."));

        let line = request_line(&http::Method::GET, "/nowhere", app.registry().get("/nowhere"));
        assert_eq!(line, "GET request to '/nowhere' endpoint (no handler).");
    }

    #[test]
    fn parses_bodies() {
        assert_eq!(parse_body(b""), Map::new());
        assert_eq!(parse_body(b"[1, 2]"), Map::new());
        assert_eq!(parse_body(b"{\"a\": 1}").get("a"), Some(&json!(1)));
    }
}
