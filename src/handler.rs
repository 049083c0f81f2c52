use crate::Params;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

#[async_trait]
/// A request handler.
///
/// This is automatically implemented for
/// `Fn(Params) -> impl Future<Output = Result<impl Serialize, impl Into<anyhow::Error>>>`
/// types, but it may be useful to implement this yourself.  All this is
/// meant to do is be a fallible function from the bound [`Params`] into a
/// JSON value.  Any error it returns is logged and turned into an empty
/// `500` response; it is never shown to the client.
pub trait Handler: Send + Sync + 'static {
    #[must_use]
    /// Runs the handler with the bound parameters.
    async fn call(self: Pin<&Self>, params: Params) -> Result<Value, anyhow::Error>;

    #[doc(hidden)]
    fn describe(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", std::any::type_name::<Self>())
    }
}

impl std::fmt::Debug for dyn Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.describe(f)
    }
}

#[async_trait]
impl<F, Fut, T, E> Handler for F
where
    F: Fn(Params) -> Fut + Sync + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Serialize + Send + 'static,
    E: Into<anyhow::Error> + Send + 'static,
{
    async fn call(self: Pin<&Self>, params: Params) -> Result<Value, anyhow::Error> {
        let value = self(params).await.map_err(Into::into)?;
        Ok(serde_json::to_value(value)?)
    }
}

pub(crate) struct SyncHandler<F>(pub(crate) F);

#[async_trait]
impl<F, T, E> Handler for SyncHandler<F>
where
    F: Fn(Params) -> Result<T, E> + Send + Sync + 'static,
    T: Serialize + Send + 'static,
    E: Into<anyhow::Error> + Send + 'static,
{
    async fn call(self: Pin<&Self>, params: Params) -> Result<Value, anyhow::Error> {
        let f = &self.0;
        let value = f(params).map_err(Into::into)?;
        Ok(serde_json::to_value(value)?)
    }

    fn describe(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", std::any::type_name::<F>())
    }
}

/// Creates a handler that synchronously generates its value.
///
/// This does not spawn a blocking task; so any handler that uses this should
/// not block the task in its processing.  This is useful for handlers that
/// quickly compute a value, or otherwise do not use futures.
///
/// # Examples
///
/// ```rust
/// # use symmetric::{Param, Params};
/// let mut app = symmetric::app();
/// app.router("/double")
///     .post()
///     .param(Param::typed::<i64>("x"))
///     .try_handle(symmetric::sync(|params: Params| {
///         Ok::<_, symmetric::SymmetricError>(params.get::<i64>("x")? * 2)
///     }))
///     .unwrap();
/// ```
pub fn sync<F, T, E>(func: F) -> impl Handler
where
    F: Fn(Params) -> Result<T, E> + Send + Sync + 'static,
    T: Serialize + Send + 'static,
    E: Into<anyhow::Error> + Send + 'static,
{
    SyncHandler(func)
}
