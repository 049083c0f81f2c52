use crate::constants::{is_documentation_route, NO_DESCRIPTION};
use crate::handler::Handler;
use crate::signature::{JsonType, Param, Signature};
use crate::{Symmetric, SymmetricError};
use std::pin::Pin;
use std::sync::Arc;

/// A registered endpoint.
///
/// This is created once, when its [`EndpointBuilder`] is completed, and is
/// immutable afterwards.  It contains everything needed to serve the route
/// and to document it.
pub struct Endpoint {
    route: String,
    methods: Vec<http::Method>,
    response_code: http::StatusCode,
    handler: Pin<Box<dyn Handler>>,
    handler_name: String,
    signature: Arc<Signature>,
    requires_auth: bool,
    description: String,
}

impl Endpoint {
    pub(crate) fn new<H: Handler>(route: impl Into<String>, handler: H) -> Self {
        let handler: Pin<Box<dyn Handler>> = Box::pin(handler);
        let handler_name = format!("{:?}", &*handler);
        Endpoint {
            route: route.into(),
            methods: vec![http::Method::GET],
            response_code: http::StatusCode::OK,
            handler,
            handler_name,
            signature: Arc::default(),
            requires_auth: false,
            description: NO_DESCRIPTION.to_owned(),
        }
    }

    /// The route of the endpoint.  This always starts with a `/`.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// The methods the endpoint responds to, in the order they were given.
    #[must_use]
    pub fn methods(&self) -> &[http::Method] {
        &self.methods[..]
    }

    /// Whether the endpoint responds to the given method.
    #[must_use]
    pub fn allows(&self, method: &http::Method) -> bool {
        self.methods.contains(method)
    }

    /// The status code of a successful response.
    #[must_use]
    pub fn response_code(&self) -> http::StatusCode {
        self.response_code
    }

    /// The signature of the endpoint's handler.
    #[must_use]
    pub fn signature(&self) -> &Arc<Signature> {
        &self.signature
    }

    /// Whether requests to the endpoint must carry the client token.
    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    /// The description of the endpoint.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The printable name of the handler.
    #[must_use]
    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    pub(crate) fn handler(&self) -> Pin<&dyn Handler> {
        self.handler.as_ref()
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("route", &self.route)
            .field("methods", &self.methods)
            .field("response_code", &self.response_code)
            .field("handler", &self.handler_name)
            .field("requires_auth", &self.requires_auth)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
#[must_use = "an endpoint is only registered once a handler is given"]
/// A description of an endpoint that is about to be registered.
///
/// This is generated when you call [`crate::Symmetric::router`], and it
/// contains the route passed to that function.  Here, you can specify the
/// methods, status code, authentication requirement, documentation and
/// signature of the endpoint, before completing it with a handler.
///
/// If no methods are given, the endpoint responds to `GET`.  Methods are
/// case-insensitive and stripped of whitespace; any method outside of
/// [`crate::constants::ALLOWED_METHODS`] is silently dropped.
///
/// # Examples
/// ```rust
/// # use symmetric::{Param, Params};
/// async fn add(params: Params) -> Result<i64, anyhow::Error> {
///     Ok(params.get::<i64>("a")? + params.get::<i64>("b")?)
/// }
///
/// let mut app = symmetric::app();
/// app.router("/add")
///     .methods(["get", "post"])
///     .response_code(http::StatusCode::OK)
///     .auth_token(true)
///     .description("Adds two numbers.")
///     .param(Param::typed::<i64>("a"))
///     .param(Param::typed::<i64>("b").default(1))
///     .returns::<i64>()
///     .try_handle(add)
///     .unwrap();
/// assert_eq!(app.registry().len(), 1);
/// ```
pub struct EndpointBuilder<'a> {
    app: &'a mut Symmetric,
    route: String,
    methods: Option<Vec<http::Method>>,
    response_code: http::StatusCode,
    requires_auth: bool,
    description: Option<String>,
    signature: Signature,
}

macro_rules! method {
    ($($(#[$m:meta])* $v:vis fn $n:ident = $meth:expr;)+) => {
        $(
            $(#[$m])* $v fn $n(&mut self) -> &mut Self {
                self.method($meth)
            }
        )+
    };
}

impl<'a> EndpointBuilder<'a> {
    pub(crate) fn new(app: &'a mut Symmetric, route: &str) -> Self {
        EndpointBuilder {
            app,
            route: crate::route::normalize(route),
            methods: None,
            response_code: http::StatusCode::OK,
            requires_auth: false,
            description: None,
            signature: Signature::new(),
        }
    }

    /// Adds the given methods to the endpoint.
    pub fn methods<I, S>(&mut self, methods: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let current = self.methods.get_or_insert_with(Vec::new);
        for method in crate::route::verbs(methods) {
            if !current.contains(&method) {
                current.push(method);
            }
        }
        self
    }

    /// Adds a single method to the endpoint.
    pub fn method(&mut self, method: &str) -> &mut Self {
        self.methods([method])
    }

    method![
        /// Adds `GET` to the endpoint's methods.
        pub fn get = "GET";
        /// Adds `POST` to the endpoint's methods.
        pub fn post = "POST";
        /// Adds `PUT` to the endpoint's methods.
        pub fn put = "PUT";
        /// Adds `DELETE` to the endpoint's methods.
        pub fn delete = "DELETE";
        /// Adds `PATCH` to the endpoint's methods.
        pub fn patch = "PATCH";
        /// Adds `HEAD` to the endpoint's methods.
        pub fn head = "HEAD";
        /// Adds `OPTIONS` to the endpoint's methods.
        pub fn options = "OPTIONS";
        /// Adds `TRACE` to the endpoint's methods.
        pub fn trace = "TRACE";
    ];

    /// Sets the status code of a successful response.  Defaults to `200`.
    pub fn response_code(&mut self, code: http::StatusCode) -> &mut Self {
        self.response_code = code;
        self
    }

    /// Sets whether requests must carry the client token.
    pub fn auth_token(&mut self, required: bool) -> &mut Self {
        self.requires_auth = required;
        self
    }

    /// Sets the description used in the documentation.
    pub fn description<D: Into<String>>(&mut self, description: D) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    /// Declares a parameter of the handler.
    pub fn param(&mut self, param: Param) -> &mut Self {
        self.signature.push(param);
        self
    }

    /// Declares several parameters of the handler, in order.
    pub fn params<I: IntoIterator<Item = Param>>(&mut self, params: I) -> &mut Self {
        for param in params {
            self.signature.push(param);
        }
        self
    }

    /// Declares that the handler accepts keys beyond its named parameters.
    /// The handler will then receive the entire body.
    pub fn extra_keys(&mut self, accepted: bool) -> &mut Self {
        self.signature.set_extra_keys(accepted);
        self
    }

    /// Declares the type of the handler's return value.
    pub fn returns<T: ?Sized>(&mut self) -> &mut Self {
        self.returns_kind(JsonType::of::<T>())
    }

    /// Declares the JSON type of the handler's return value.
    pub fn returns_kind(&mut self, kind: JsonType) -> &mut Self {
        self.signature.set_returns(Some(kind));
        self
    }

    /// Completes the endpoint with the given handler and registers it.
    ///
    /// # Errors
    /// Returns [`SymmetricError::IncorrectRouteFormat`] if the route is not
    /// valid, and [`SymmetricError::DuplicatedRoute`] if the route is
    /// already taken.  The documentation routes are exempt from the route
    /// grammar; they are taken whenever the documentation is served.
    pub fn try_handle<H: Handler>(&mut self, handler: H) -> Result<(), SymmetricError> {
        if !is_documentation_route(&self.route) {
            crate::route::validate(&self.route)?;
        }

        let mut endpoint = Endpoint::new(self.route.clone(), handler);
        endpoint.methods = self
            .methods
            .clone()
            .unwrap_or_else(|| vec![http::Method::GET]);
        endpoint.response_code = self.response_code;
        endpoint.requires_auth = self.requires_auth;
        endpoint.signature = Arc::new(std::mem::take(&mut self.signature));
        if let Some(description) = self.description.as_deref().map(str::trim) {
            if !description.is_empty() {
                endpoint.description = description.to_owned();
            }
        }

        if endpoint.methods.is_empty() {
            log::warn!("endpoint {} was registered without any allowed methods", endpoint.route);
        }

        self.app.register(endpoint)
    }

    /// Completes the endpoint with the given handler and registers it,
    /// exiting the process if that fails.
    ///
    /// A malformed or duplicated route is a broken deployment, so the error
    /// is logged and the process terminates with exit status `1`.  Use
    /// [`EndpointBuilder::try_handle`] to handle the error instead.
    pub fn handle<H: Handler>(&mut self, handler: H) {
        if let Err(error) = self.try_handle(handler) {
            log::error!("could not register endpoint: {}", error);
            std::process::exit(1);
        }
    }
}
