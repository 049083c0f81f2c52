//! Mapping request bodies onto handler parameters.

use crate::Signature;
use serde_json::{Map, Value};

/// Binds a request body to the parameters of a signature.
///
/// If the endpoint requires a token, the `token_key` field is removed from
/// the body first (it does not matter if it was never there).  Then:
///
/// 1. a handler that accepts arbitrary extra keys receives the whole body,
///    regardless of its named parameters;
/// 2. otherwise, a handler without named parameters receives nothing;
/// 3. otherwise, the handler receives only the keys of the body that match
///    one of its parameters.  Missing parameters are left missing.
///
/// # Examples
/// ```rust
/// # use symmetric::{binder::bind, Param, Signature};
/// # use serde_json::{json, Value};
/// let mut signature = Signature::new();
/// signature.push(Param::new("x"));
/// let body = json!({ "x": 1, "y": 2 }).as_object().cloned().unwrap();
/// let bound = bind(body, &signature, false, "irrelevant");
/// assert_eq!(Value::Object(bound), json!({ "x": 1 }));
/// ```
#[must_use]
pub fn bind(
    mut body: Map<String, Value>,
    signature: &Signature,
    requires_auth: bool,
    token_key: &str,
) -> Map<String, Value> {
    if requires_auth {
        body.remove(token_key);
    }

    if signature.accepts_extra_keys() {
        body
    } else if signature.params().is_empty() {
        Map::new()
    } else {
        body.into_iter()
            .filter(|(key, _)| signature.param(key).is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Param;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn xyz(extra_keys: bool) -> Signature {
        let mut signature = Signature::new();
        signature
            .push(Param::new("x"))
            .push(Param::new("y"))
            .push(Param::new("z"))
            .set_extra_keys(extra_keys);
        signature
    }

    fn extra() -> Map<String, Value> {
        body(json!({ "a": 1, "b": 2, "c": 3, "d": 4, "x": 5, "y": 6, "z": 7 }))
    }

    #[test]
    fn drops_extra_keys() {
        let bound = bind(extra(), &xyz(false), false, "irrelevant");
        assert_eq!(bound, body(json!({ "x": 5, "y": 6, "z": 7 })));
    }

    #[test]
    fn keeps_exact_keys() {
        let bound = bind(body(json!({ "x": 1, "y": 2, "z": 3 })), &xyz(false), false, "irrelevant");
        assert_eq!(bound, body(json!({ "x": 1, "y": 2, "z": 3 })));
    }

    #[test]
    fn leaves_missing_keys_missing() {
        let bound = bind(body(json!({ "x": 1, "y": 2 })), &xyz(false), false, "irrelevant");
        assert_eq!(bound, body(json!({ "x": 1, "y": 2 })));
    }

    #[test]
    fn extra_keys_receive_everything() {
        assert_eq!(bind(extra(), &xyz(true), false, "irrelevant"), extra());
        let little = body(json!({ "x": 1, "y": 2 }));
        assert_eq!(bind(little.clone(), &xyz(true), false, "irrelevant"), little);
    }

    #[test]
    fn no_parameters_receive_nothing() {
        let bound = bind(extra(), &Signature::new(), false, "irrelevant");
        assert!(bound.is_empty());
    }

    #[test]
    fn extra_keys_win_over_no_parameters() {
        let mut signature = Signature::new();
        signature.set_extra_keys(true);
        assert_eq!(bind(extra(), &signature, false, "irrelevant"), extra());
    }

    #[test]
    fn missing_token_is_not_an_error() {
        let bound = bind(Map::new(), &Signature::new(), true, "does_not_exist");
        assert!(!bound.contains_key("does_not_exist"));
    }

    #[test]
    fn strips_token() {
        let bound = bind(extra(), &xyz(true), true, "a");
        assert!(!bound.contains_key("a"));
        assert_eq!(bound.len(), 6);
    }

    #[test]
    fn keeps_token_when_not_required() {
        let bound = bind(extra(), &xyz(true), false, "a");
        assert!(bound.contains_key("a"));
    }
}
