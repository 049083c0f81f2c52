use crate::dispatch::Reply;
use crate::{Symmetric, SymmetricError};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;

impl Symmetric {
    /// Creates a listen server on the specified address.
    ///
    /// Every request is read in full, and then handed to
    /// [`Symmetric::dispatch`].  The server runs until the termination signal
    /// (see [`Symmetric::termination_signal`]) is sent, if one was requested;
    /// otherwise, it runs forever.
    ///
    /// # Errors
    /// This can fail if the socket address is invalid, or if the socket is
    /// already in use.
    ///
    /// # Examples
    /// ```rust,no_run
    /// # use symmetric::Params;
    /// # #[tokio::main] async fn main() -> Result<(), anyhow::Error> {
    /// let mut app = symmetric::app();
    /// app.router("/").handle(|_: Params| async { Ok::<_, anyhow::Error>("hello, world!") });
    /// app.listen("0.0.0.0:5000").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn listen(mut self, address: &str) -> Result<(), SymmetricError> {
        let address: SocketAddr = address
            .parse()
            .map_err(|_| SymmetricError::InvalidAddress(address.to_owned()))?;

        log::info!("listen({})", address);

        if log::log_enabled!(log::Level::Trace) {
            for endpoint in self.registry().iter() {
                log::trace!(
                    "route: {} {:?} -> {}",
                    endpoint.route(),
                    endpoint.methods(),
                    endpoint.handler_name()
                );
            }
        }

        let termination = self.terminate.take();
        let termination = async {
            match termination {
                Some(mut rx) => loop {
                    if *rx.borrow() {
                        break;
                    }
                    match rx.changed().await {
                        Ok(_) => continue,
                        Err(_) => futures::future::pending().await,
                    }
                },
                None => futures::future::pending().await,
            }
        };

        let this = Arc::new(self);

        hyper::server::Server::bind(&address)
            .serve(hyper::service::make_service_fn(
                |v: &hyper::server::conn::AddrStream| {
                    let service = SymmetricService(this.clone(), v.remote_addr());
                    async move { Ok::<_, std::convert::Infallible>(service) }
                },
            ))
            .with_graceful_shutdown(termination)
            .await
            .map_err(SymmetricError::HyperServer)?;

        log::info!("shutdown({})", address);
        Ok(())
    }

    async fn serve(&self, request: hyper::Request<hyper::Body>, peer: SocketAddr) -> Reply {
        let (parts, body) = request.into_parts();
        let path = parts.uri.path();
        log::info!("--> {} {} ({})", parts.method, path, peer);
        let start = std::time::Instant::now();

        let reply = match hyper::body::to_bytes(body).await {
            Ok(body) => {
                self.dispatch(&parts.method, path, &parts.headers, &body)
                    .await
            }
            Err(error) => {
                log::error!("exception caught: {}", SymmetricError::ReadBody(error));
                Reply::empty(http::StatusCode::INTERNAL_SERVER_ERROR)
            }
        };

        log::info!(
            "<-- {} {}: {} (in {}ms)",
            parts.method,
            path,
            reply.status(),
            start.elapsed().as_millis()
        );

        reply
    }
}

#[derive(Clone)]
struct SymmetricService(Arc<Symmetric>, SocketAddr);

type ServiceFuture<R, E> = Pin<Box<dyn Future<Output = Result<R, E>> + Send + 'static>>;

impl tower::Service<hyper::Request<hyper::Body>> for SymmetricService {
    type Response = hyper::Response<hyper::Body>;
    type Error = anyhow::Error;
    type Future = ServiceFuture<Self::Response, Self::Error>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: hyper::Request<hyper::Body>) -> Self::Future {
        let this = self.0.clone();
        let peer = self.1;
        Box::pin(async move {
            let response: Self::Response = this.serve(request, peer).await.into();
            Ok::<_, anyhow::Error>(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Param, Params};
    use tower::Service;

    #[allow(clippy::unused_async)]
    async fn greet(params: Params) -> Result<String, anyhow::Error> {
        Ok(format!("hello, {}!", params.get::<String>("name")?))
    }

    fn service() -> SymmetricService {
        let mut app = crate::app();
        app.router("/greet")
            .post()
            .param(Param::typed::<String>("name").default("world"))
            .try_handle(greet)
            .unwrap();
        SymmetricService(Arc::new(app), ([127, 0, 0, 1], 0).into())
    }

    fn request(method: http::Method, path: &str, body: &'static str) -> hyper::Request<hyper::Body> {
        hyper::Request::builder()
            .method(method)
            .uri(path)
            .body(hyper::Body::from(body))
            .unwrap()
    }

    async fn read(response: hyper::Response<hyper::Body>) -> serde_json::Value {
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn serves_requests() {
        let mut service = service();
        let response = service
            .call(request(http::Method::POST, "/greet", r#"{"name": "you"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(
            response.headers().get(http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(read(response).await, serde_json::json!("hello, you!"));

        let response = service
            .call(request(http::Method::POST, "/greet", ""))
            .await
            .unwrap();
        assert_eq!(read(response).await, serde_json::json!("hello, world!"));
    }

    #[tokio::test]
    async fn serves_failures() {
        let mut service = service();
        let response = service
            .call(request(http::Method::GET, "/missing", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(read(response).await, serde_json::json!({}));
    }

    #[tokio::test]
    async fn rejects_invalid_addresses() {
        let result = crate::app().listen("not an address").await;
        assert!(matches!(result, Err(SymmetricError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn shuts_down_on_signal() {
        let mut app = crate::app();
        let signal = app.termination_signal();
        let server = tokio::spawn(app.listen("127.0.0.1:0"));
        signal.send(true).unwrap();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
