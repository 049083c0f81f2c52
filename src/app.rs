use crate::auth::{Environment, SecretStore};
use crate::constants::{
    is_documentation_route, API_CLIENT_TOKEN_NAME, API_SERVER_TOKEN_NAME, DEFAULT_API_VERSION,
};
use crate::endpoint::EndpointBuilder;
use crate::{Endpoint, Registry, SymmetricError};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

/// The service context.
///
/// This holds every registered endpoint, along with the configuration used
/// to authenticate requests and to document the API.  It is filled in
/// during set up (see [`Symmetric::router`]), and afterwards only read;
/// dispatching a request ([`Symmetric::dispatch`]) never modifies it, so it
/// may be shared freely between threads.
///
/// # Examples
/// ```rust,no_run
/// # use symmetric::Params;
/// async fn hello(_: Params) -> Result<&'static str, anyhow::Error> {
///     Ok("hello, world!")
/// }
///
/// # #[tokio::main] async fn main() -> Result<(), anyhow::Error> {
/// let mut app = symmetric::app();
/// app.set_name("hello_service");
/// app.router("/hello").get().handle(hello);
/// app.listen("0.0.0.0:5000").await?;
/// # Ok(())
/// # }
/// ```
pub struct Symmetric {
    name: String,
    title: Option<String>,
    version: String,
    client_token_name: String,
    server_token_name: String,
    serve_docs: bool,
    secrets: Box<dyn SecretStore>,
    registry: Registry,
    openapi: OnceCell<Arc<Value>>,
    pub(crate) terminate: Option<watch::Receiver<bool>>,
}

impl Default for Symmetric {
    fn default() -> Self {
        Symmetric {
            name: "symmetric".to_owned(),
            title: None,
            version: DEFAULT_API_VERSION.to_owned(),
            client_token_name: API_CLIENT_TOKEN_NAME.to_owned(),
            server_token_name: API_SERVER_TOKEN_NAME.to_owned(),
            serve_docs: true,
            secrets: Box::new(Environment),
            registry: Registry::default(),
            openapi: OnceCell::new(),
            terminate: None,
        }
    }
}

impl Symmetric {
    /// Starts describing an endpoint at the given route.  A missing leading
    /// `/` is added.  See [`EndpointBuilder`] for more.
    pub fn router(&mut self, route: &str) -> EndpointBuilder<'_> {
        EndpointBuilder::new(self, route)
    }

    pub(crate) fn register(&mut self, endpoint: Endpoint) -> Result<(), SymmetricError> {
        if self.serve_docs && is_documentation_route(endpoint.route()) {
            return Err(SymmetricError::DuplicatedRoute(endpoint.route().to_owned()));
        }

        let endpoint = self.registry.insert(endpoint)?;
        log::trace!(
            "registered {} ({:?}) -> {}",
            endpoint.route(),
            endpoint.methods(),
            endpoint.handler_name()
        );
        self.openapi.take();
        Ok(())
    }

    /// The registered endpoints.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Sets the name of the service.  This is used to title the
    /// documentation, unless an explicit title is given.
    pub fn set_name<N: Into<String>>(&mut self, name: N) -> &mut Self {
        self.name = name.into();
        self.openapi.take();
        self
    }

    /// Sets the title of the OpenAPI document.
    pub fn set_title<T: Into<String>>(&mut self, title: T) -> &mut Self {
        self.title = Some(title.into());
        self.openapi.take();
        self
    }

    /// Sets the version of the API, as reported in the OpenAPI document.
    pub fn set_version<V: Into<String>>(&mut self, version: V) -> &mut Self {
        self.version = version.into();
        self.openapi.take();
        self
    }

    /// Sets the name of the header clients must send their token in.
    ///
    /// # Errors
    /// Returns [`SymmetricError::InvalidTokenName`] if the name is empty, or
    /// if it is not a valid header name.
    ///
    /// # Examples
    /// ```rust
    /// let mut app = symmetric::app();
    /// assert!(app.set_client_token_name("x-api-key").is_ok());
    /// assert!(app.set_client_token_name("").is_err());
    /// assert!(app.set_client_token_name("not a header").is_err());
    /// assert_eq!(app.client_token_name(), "x-api-key");
    /// ```
    pub fn set_client_token_name<N: Into<String>>(
        &mut self,
        name: N,
    ) -> Result<&mut Self, SymmetricError> {
        let name = name.into();
        if name.is_empty() || http::header::HeaderName::from_bytes(name.as_bytes()).is_err() {
            return Err(SymmetricError::InvalidTokenName(name));
        }
        self.client_token_name = name;
        self.openapi.take();
        Ok(self)
    }

    /// Sets the name of the secret holding the server's token.
    ///
    /// # Errors
    /// Returns [`SymmetricError::InvalidTokenName`] if the name is empty.
    pub fn set_server_token_name<N: Into<String>>(
        &mut self,
        name: N,
    ) -> Result<&mut Self, SymmetricError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SymmetricError::InvalidTokenName(name));
        }
        self.server_token_name = name;
        Ok(self)
    }

    /// Sets whether the documentation routes are served.  This is on by
    /// default.
    pub fn serve_docs(&mut self, serve: bool) -> &mut Self {
        self.serve_docs = serve;
        self
    }

    /// Sets where the server's token is looked up.  This is the process
    /// environment by default.
    pub fn secrets<S: SecretStore>(&mut self, secrets: S) -> &mut Self {
        self.secrets = Box::new(secrets);
        self
    }

    /// The name of the service.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The title of the OpenAPI document.  Unless set explicitly, this is
    /// the humanized name of the service followed by `API`.
    #[must_use]
    pub fn title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("{} API", crate::markdown::humanize(&self.name)))
    }

    /// The version of the API.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The name of the header clients must send their token in.
    #[must_use]
    pub fn client_token_name(&self) -> &str {
        &self.client_token_name
    }

    /// The name of the secret holding the server's token.
    #[must_use]
    pub fn server_token_name(&self) -> &str {
        &self.server_token_name
    }

    /// Whether the documentation routes are served.
    #[must_use]
    pub fn serves_docs(&self) -> bool {
        self.serve_docs
    }

    pub(crate) fn secret_store(&self) -> &dyn SecretStore {
        &*self.secrets
    }

    /// The OpenAPI document of the service.
    ///
    /// This is generated the first time it is requested, and cached
    /// afterwards.  Concurrent first requests generate it once.
    #[must_use]
    pub fn openapi(&self) -> Arc<Value> {
        self.openapi
            .get_or_init(|| Arc::new(crate::openapi::generate(self)))
            .clone()
    }

    /// The Markdown documentation of the service.
    #[must_use]
    pub fn markdown(&self) -> String {
        crate::markdown::generate(self)
    }

    /// A channel to handle the termination signal.  By default, the service
    /// does not terminate, at least not gracefully, even in the face of
    /// SIGINT/SIGTERM.  This allows you to signal to the service when it
    /// should terminate, and it will gracefully shut down, letting all
    /// current requests finish before exiting.
    ///
    /// Note this only applies to the service when listening, and not when
    /// dispatching a single request.
    pub fn termination_signal(&mut self) -> watch::Sender<bool> {
        let (tx, rx) = watch::channel(false);
        self.terminate = Some(rx);
        tx
    }

    /// Writes the Markdown documentation to the given file.
    ///
    /// # Errors
    /// Returns [`SymmetricError::Export`] if the file cannot be written.
    pub async fn write_markdown<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), SymmetricError> {
        tokio::fs::write(path, self.markdown())
            .await
            .map_err(SymmetricError::Export)
    }

    /// Writes the OpenAPI document, as indented JSON, to the given file.
    ///
    /// # Errors
    /// Returns [`SymmetricError::Export`] if the file cannot be written.
    pub async fn write_openapi<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), SymmetricError> {
        let document =
            serde_json::to_string_pretty(&*self.openapi()).map_err(SymmetricError::Serialization)?;
        tokio::fs::write(path, document)
            .await
            .map_err(SymmetricError::Export)
    }
}

impl std::fmt::Debug for Symmetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Symmetric")
            .field("name", &self.name)
            .field("client_token_name", &self.client_token_name)
            .field("server_token_name", &self.server_token_name)
            .field("serve_docs", &self.serve_docs)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DOCUMENTATION_ROUTE, OPENAPI_ROUTE};
    use crate::Params;

    #[allow(clippy::unused_async)]
    async fn noop(_: Params) -> Result<(), anyhow::Error> {
        Ok(())
    }

    #[test]
    fn token_names() {
        let mut app = Symmetric::default();
        assert_eq!(app.client_token_name(), API_CLIENT_TOKEN_NAME);
        assert_eq!(app.server_token_name(), API_SERVER_TOKEN_NAME);
        assert!(matches!(
            app.set_server_token_name(""),
            Err(SymmetricError::InvalidTokenName(_))
        ));
        app.set_server_token_name("MY_KEY").unwrap();
        assert_eq!(app.server_token_name(), "MY_KEY");
    }

    #[test]
    fn titles() {
        let mut app = Symmetric::default();
        assert_eq!(app.title(), "Symmetric API");
        app.set_name("cool_app-name");
        assert_eq!(app.title(), "Cool App Name API");
        app.set_title("Custom");
        assert_eq!(app.title(), "Custom");
    }

    #[test]
    fn documentation_routes_are_reserved() {
        let mut app = Symmetric::default();
        for route in [OPENAPI_ROUTE, DOCUMENTATION_ROUTE] {
            let result = app.router(route).try_handle(noop);
            assert!(matches!(result, Err(SymmetricError::DuplicatedRoute(_))));
        }

        app.serve_docs(false);
        assert!(app.router(DOCUMENTATION_ROUTE).try_handle(noop).is_ok());
    }

    #[test]
    fn openapi_is_cached_until_registration() {
        let mut app = Symmetric::default();
        let first = app.openapi();
        assert!(Arc::ptr_eq(&first, &app.openapi()));

        app.router("/late").try_handle(noop).unwrap();
        let second = app.openapi();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second["paths"].get("/late").is_some());
    }

    #[tokio::test]
    async fn exports_documentation() {
        let mut app = Symmetric::default();
        app.router("/export").try_handle(noop).unwrap();
        let dir = std::env::temp_dir().join(format!("symmetric-export-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();

        app.write_markdown(dir.join("documentation.md")).await.unwrap();
        app.write_openapi(dir.join("openapi.json")).await.unwrap();

        let markdown = tokio::fs::read_to_string(dir.join("documentation.md")).await.unwrap();
        assert_eq!(markdown, app.markdown());
        let openapi = tokio::fs::read_to_string(dir.join("openapi.json")).await.unwrap();
        let openapi: Value = serde_json::from_str(&openapi).unwrap();
        assert_eq!(openapi, *app.openapi());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
