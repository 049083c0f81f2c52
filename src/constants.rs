//! Fixed names and routes shared across the crate.

/// The route serving the generated OpenAPI document.
pub const OPENAPI_ROUTE: &str = "/openapi.json";
/// The route serving the interactive documentation viewer.
pub const DOCUMENTATION_ROUTE: &str = "/docs";

/// The default name of the header carrying the client's token.
pub const API_CLIENT_TOKEN_NAME: &str = "symmetric_api_key";
/// The default name of the environment variable holding the server's token.
pub const API_SERVER_TOKEN_NAME: &str = "SYMMETRIC_API_KEY";
/// The token used when the server's token variable is not set.
pub const API_DEFAULT_TOKEN: &str = "symmetric_token";

/// The OpenAPI version the generated document conforms to.
pub const OPENAPI_VERSION: &str = "3.0.3";
/// The default `info.version` of the generated document.
pub const DEFAULT_API_VERSION: &str = "0.0.1";

/// The description used for handlers that were not given one.
pub const NO_DESCRIPTION: &str = "No description provided.";

/// The HTTP methods an endpoint may respond to.  Anything else is dropped
/// during registration.
pub const ALLOWED_METHODS: [http::Method; 8] = [
    http::Method::GET,
    http::Method::PUT,
    http::Method::POST,
    http::Method::DELETE,
    http::Method::OPTIONS,
    http::Method::HEAD,
    http::Method::PATCH,
    http::Method::TRACE,
];

/// Whether the route is one of the two documentation routes.
#[must_use]
pub fn is_documentation_route(route: &str) -> bool {
    route == OPENAPI_ROUTE || route == DOCUMENTATION_ROUTE
}
