//! Symmetric turns plain async functions into JSON HTTP endpoints.  Each
//! function is registered at a route, along with a description of the
//! parameters it takes; incoming JSON request bodies are then bound onto
//! those parameters, optionally guarded by a token, and the function's
//! return value is sent back as JSON.  The same descriptions are used to
//! generate an OpenAPI document (served at `/openapi.json`, with a viewer at
//! `/docs`) and Markdown documentation.  Symmetric is based on Tokio and
//! hyper.
//!
//! # Getting Started
//! To get started, just add symmetric and tokio to your `Cargo.toml`:
//!
//! ```toml
//! symmetric = "0.1.0"
//! tokio = { version = "1.12.0", features = ["full"] } # or whatever the latest version is
//! ```
//!
//! # Examples
//! ```rust,no_run
//! use symmetric::{Param, Params};
//!
//! /// Adds two numbers.
//! async fn add(params: Params) -> Result<i64, anyhow::Error> {
//!     Ok(params.get::<i64>("a")? + params.get::<i64>("b")?)
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), anyhow::Error> {
//!     let mut app = symmetric::app();
//!     app.set_name("calculator");
//!     app.router("/add")
//!         .post()
//!         .description("Adds two numbers.")
//!         .param(Param::typed::<i64>("a"))
//!         .param(Param::typed::<i64>("b").default(0))
//!         .returns::<i64>()
//!         .handle(add);
//!     app.listen("0.0.0.0:5000").await?;
//!     Ok(())
//! }
//! ```
#![deny(clippy::correctness)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
extern crate async_trait;

mod app;
pub mod auth;
pub mod binder;
pub mod constants;
mod dispatch;
mod docs;
mod endpoint;
mod error;
mod handler;
mod markdown;
mod openapi;
mod params;
mod registry;
pub mod route;
mod service;
mod signature;

pub use self::app::Symmetric;
pub use self::auth::{Environment, SecretStore};
pub use self::dispatch::{Reply, ReplyBody};
pub use self::endpoint::{Endpoint, EndpointBuilder};
pub use self::error::SymmetricError;
pub use self::handler::{sync, Handler};
pub use self::markdown::humanize;
pub use self::params::Params;
pub use self::registry::Registry;
pub use self::signature::{JsonType, Param, Signature};

#[must_use]
#[inline]
/// This creates a new service.  This is a shortcut for
/// [`Symmetric::default`].
pub fn app() -> Symmetric {
    Symmetric::default()
}
