use crate::{Endpoint, SymmetricError};
use std::collections::btree_map::{BTreeMap, Entry};

#[derive(Debug, Default)]
/// The collection of registered endpoints.
///
/// Endpoints are keyed by their route, so that no two endpoints may share a
/// route regardless of their methods, and are always traversed in route
/// order.  The registry only grows while the service is being set up, and
/// is read-only once it starts dispatching requests.
pub struct Registry {
    endpoints: BTreeMap<String, Endpoint>,
}

impl Registry {
    /// Inserts the endpoint.
    ///
    /// # Errors
    /// Returns [`SymmetricError::DuplicatedRoute`] if an endpoint with the
    /// same route is already registered; the registry is left unchanged.
    pub fn insert(&mut self, endpoint: Endpoint) -> Result<&Endpoint, SymmetricError> {
        match self.endpoints.entry(endpoint.route().to_owned()) {
            Entry::Occupied(entry) => Err(SymmetricError::DuplicatedRoute(entry.key().clone())),
            Entry::Vacant(entry) => Ok(entry.insert(endpoint)),
        }
    }

    /// Looks up the endpoint registered at the route.
    #[must_use]
    pub fn get(&self, route: &str) -> Option<&Endpoint> {
        self.endpoints.get(route)
    }

    /// Iterates over every endpoint, ordered by route.
    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values()
    }

    /// The number of registered endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether no endpoint is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Params;

    #[allow(clippy::unused_async)]
    async fn noop(_: Params) -> Result<(), anyhow::Error> {
        Ok(())
    }

    #[test]
    fn rejects_duplicates() {
        let mut registry = Registry::default();
        registry.insert(Endpoint::new("/hello", noop)).unwrap();
        let result = registry.insert(Endpoint::new("/hello", noop));

        assert!(matches!(result, Err(SymmetricError::DuplicatedRoute(r)) if r == "/hello"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicates_ignore_methods() {
        let mut app = crate::app();
        app.router("/hello").get().try_handle(noop).unwrap();
        let result = app.router("/hello").post().response_code(http::StatusCode::CREATED).try_handle(noop);
        assert!(matches!(result, Err(SymmetricError::DuplicatedRoute(_))));
    }

    #[test]
    fn iterates_in_route_order() {
        let mut registry = Registry::default();
        for route in ["/zeta", "/alpha", "/", "/alpha/beta", "/Beta"] {
            registry.insert(Endpoint::new(route, noop)).unwrap();
        }

        let routes = registry.iter().map(Endpoint::route).collect::<Vec<_>>();
        assert_eq!(routes, ["/", "/Beta", "/alpha", "/alpha/beta", "/zeta"]);
        assert!(registry.get("/alpha").is_some());
        assert!(registry.get("/omega").is_none());
    }
}
