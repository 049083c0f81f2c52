//! Token authentication.
//!
//! Clients send their token under the client token name (a request header);
//! the server compares it against a secret it looks up by the server token
//! name in a [`SecretStore`], usually the process environment.  If the
//! secret is not set, [`API_DEFAULT_TOKEN`] is expected instead.

use crate::constants::API_DEFAULT_TOKEN;
use crate::SymmetricError;
use std::collections::HashMap;

/// A source of server-side secrets.
pub trait SecretStore: Send + Sync + 'static {
    /// Looks up the secret stored under the given name.
    fn secret(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Default, Copy, Clone)]
/// Reads secrets from the process environment.
pub struct Environment;

impl SecretStore for Environment {
    fn secret(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl SecretStore for HashMap<String, String> {
    fn secret(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Anything a client token can be read out of.
pub trait TokenSource {
    /// Looks up the token stored under the given name.
    fn token(&self, name: &str) -> Option<&str>;
}

impl TokenSource for http::HeaderMap {
    fn token(&self, name: &str) -> Option<&str> {
        self.get(name)?.to_str().ok()
    }
}

impl TokenSource for HashMap<String, String> {
    fn token(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Checks that the source carries the server's token.
///
/// If `requires_auth` is false, this always succeeds.
///
/// # Errors
/// Returns [`SymmetricError::AuthenticationRequired`] if the source has no
/// value under `client_token_name`, or if that value is not the secret
/// stored under `server_token_name`.
///
/// # Examples
/// ```rust
/// # use std::collections::HashMap;
/// # use symmetric::auth::authenticate;
/// let secrets = HashMap::from([("SECRET".to_owned(), "hunter".to_owned())]);
/// let headers = HashMap::from([("token".to_owned(), "hunter".to_owned())]);
/// assert!(authenticate(&headers, true, "token", "SECRET", &secrets).is_ok());
/// assert!(authenticate(&HashMap::<String, String>::new(), true, "token", "SECRET", &secrets).is_err());
/// ```
pub fn authenticate<T, S>(
    source: &T,
    requires_auth: bool,
    client_token_name: &str,
    server_token_name: &str,
    secrets: &S,
) -> Result<(), SymmetricError>
where
    T: TokenSource + ?Sized,
    S: SecretStore + ?Sized,
{
    if !requires_auth {
        return Ok(());
    }

    let given = source
        .token(client_token_name)
        .ok_or(SymmetricError::AuthenticationRequired)?;
    let expected = secrets
        .secret(server_token_name)
        .unwrap_or_else(|| API_DEFAULT_TOKEN.to_owned());

    if given == expected {
        Ok(())
    } else {
        Err(SymmetricError::AuthenticationRequired)
    }
}
