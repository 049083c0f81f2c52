use crate::{Signature, SymmetricError};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
/// The parameters bound from a request body.
///
/// This holds the keys of the body that survived binding (see
/// [`crate::binder::bind`]), as well as the signature of the handler they
/// were bound for.  Defaults declared in the signature are applied when
/// reading a parameter, so the handler never needs to repeat them.
///
/// # Examples
/// ```rust
/// # use symmetric::Params;
/// # use serde_json::json;
/// let params = Params::from(json!({ "a": 1 }).as_object().cloned().unwrap());
/// assert_eq!(params.get::<u32>("a").unwrap(), 1);
/// assert!(params.get::<u32>("b").is_err());
/// ```
pub struct Params {
    values: Map<String, Value>,
    signature: Arc<Signature>,
}

impl Params {
    pub(crate) fn new(values: Map<String, Value>, signature: Arc<Signature>) -> Self {
        Params { values, signature }
    }

    /// Reads and deserializes the named parameter.  If the parameter is not
    /// in the body, the default declared in the signature is used instead.
    ///
    /// # Errors
    /// Returns [`SymmetricError::MissingParameter`] if the parameter is
    /// neither present nor defaulted, and
    /// [`SymmetricError::InvalidParameter`] if it cannot be deserialized
    /// into `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T, SymmetricError> {
        self.get_opt(name)?
            .ok_or_else(|| SymmetricError::MissingParameter(name.to_owned()))
    }

    /// Reads and deserializes the named parameter, like [`Params::get`],
    /// but returns `None` instead of failing if it is missing.
    ///
    /// # Errors
    /// Returns [`SymmetricError::InvalidParameter`] if the parameter cannot
    /// be deserialized into `T`.
    pub fn get_opt<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, SymmetricError> {
        let value = self
            .values
            .get(name)
            .or_else(|| self.signature.param(name)?.default_value());

        value
            .map(|v| {
                serde_json::from_value(v.clone()).map_err(|source| {
                    SymmetricError::InvalidParameter {
                        name: name.to_owned(),
                        source,
                    }
                })
            })
            .transpose()
    }

    /// Whether the body provided the named parameter.  Defaults are not
    /// considered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// The keys of the body that are not named in the signature.  These are
    /// only ever present for handlers that accept arbitrary extra keys.
    pub fn extra(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values
            .iter()
            .filter(move |(k, _)| self.signature.param(k).is_none())
    }

    /// The bound mapping.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Consumes the parameters, returning the bound mapping.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.values
    }
}

impl From<Map<String, Value>> for Params {
    fn from(values: Map<String, Value>) -> Self {
        Params::new(values, Arc::default())
    }
}
