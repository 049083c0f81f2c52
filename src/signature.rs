//! Handler signature descriptors.
//!
//! A [`Signature`] describes, once and at registration time, what a handler
//! expects from the request body: an ordered list of named parameters (each
//! optionally typed and optionally defaulted), whether arbitrary extra keys
//! are accepted, and the type of the returned value.  Both the parameter
//! binder and the documentation generators read from it.

use serde_json::Value;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
/// A JSON schema primitive type.
pub enum JsonType {
    /// `string`.
    String,
    /// `number`.
    Number,
    /// `integer`.
    Integer,
    /// `boolean`.
    Boolean,
    /// `null`.
    Null,
    /// `array`.
    Array,
    /// `object`.
    Object,
}

impl JsonType {
    /// The six primitive types an untyped parameter may hold, in the order
    /// they are documented in.
    pub const ANY: [JsonType; 6] = [
        JsonType::String,
        JsonType::Number,
        JsonType::Integer,
        JsonType::Boolean,
        JsonType::Array,
        JsonType::Object,
    ];

    /// The name of the type in a JSON schema.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Integer => "integer",
            JsonType::Boolean => "boolean",
            JsonType::Null => "null",
            JsonType::Array => "array",
            JsonType::Object => "object",
        }
    }

    /// Maps a Rust type onto its JSON type.
    ///
    /// Strings map to `string`, floats to `number`, integers to `integer`,
    /// `bool` to `boolean`, `()` to `null`, vectors, deques, slices and arrays to
    /// `array`, and everything else to `object`.  References, `Box`, `Rc`,
    /// `Arc` and `Cow` map like the type they point to.
    ///
    /// # Examples
    /// ```rust
    /// # use symmetric::JsonType;
    /// assert_eq!(JsonType::of::<String>(), JsonType::String);
    /// assert_eq!(JsonType::of::<u8>(), JsonType::Integer);
    /// assert_eq!(JsonType::of::<Vec<f64>>(), JsonType::Array);
    /// assert_eq!(JsonType::of::<std::collections::HashMap<String, u8>>(), JsonType::Object);
    /// ```
    #[must_use]
    pub fn of<T: ?Sized>() -> Self {
        Self::from_type_name(std::any::type_name::<T>())
    }

    fn from_type_name(name: &str) -> Self {
        if let Some(inner) = name.strip_prefix("&mut ").or_else(|| name.strip_prefix('&')) {
            return Self::from_type_name(inner);
        }
        if let Some(inner) = WRAPPERS.iter().find_map(|wrapper| {
            name.strip_prefix(wrapper)
                .and_then(|rest| rest.strip_prefix('<'))
                .and_then(|rest| rest.strip_suffix('>'))
        }) {
            return Self::from_type_name(inner);
        }

        match name {
            "alloc::string::String" | "str" | "char" => JsonType::String,
            "f32" | "f64" => JsonType::Number,
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "u128" | "usize" => JsonType::Integer,
            "bool" => JsonType::Boolean,
            "()" => JsonType::Null,
            name if name.starts_with("alloc::vec::Vec<")
                || name.starts_with("alloc::collections::vec_deque::VecDeque<")
                || name.starts_with("alloc::collections::linked_list::LinkedList<")
                || name.starts_with('[') =>
            {
                JsonType::Array
            }
            _ => JsonType::Object,
        }
    }
}

/// Owning and shared pointers that serialize as the value they point to.
const WRAPPERS: [&str; 4] = [
    "alloc::boxed::Box",
    "alloc::rc::Rc",
    "alloc::sync::Arc",
    "alloc::borrow::Cow",
];

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A single named parameter of a handler.
pub struct Param {
    name: String,
    default: Option<Value>,
    kind: Option<JsonType>,
}

impl Param {
    /// Creates an untyped, required parameter.
    #[must_use]
    pub fn new<N: Into<String>>(name: N) -> Self {
        Param {
            name: name.into(),
            default: None,
            kind: None,
        }
    }

    /// Creates a required parameter whose type is derived from `T`.
    ///
    /// # Examples
    /// ```rust
    /// # use symmetric::{JsonType, Param};
    /// let param = Param::typed::<i64>("count");
    /// assert_eq!(param.declared_type(), Some(JsonType::Integer));
    /// ```
    #[must_use]
    pub fn typed<T: ?Sized>(name: impl Into<String>) -> Self {
        Param::new(name).kind(JsonType::of::<T>())
    }

    /// Sets the declared type of the parameter.
    #[must_use]
    pub fn kind(mut self, kind: JsonType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Gives the parameter a default value, making it optional.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The name of the parameter.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The default value, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the parameter has a default value.
    #[must_use]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// The declared type, if any.
    #[must_use]
    pub fn declared_type(&self) -> Option<JsonType> {
        self.kind
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// The descriptor of a handler's parameters and return type.
pub struct Signature {
    params: Vec<Param>,
    extra_keys: bool,
    returns: Option<JsonType>,
}

impl Signature {
    /// Creates an empty signature: no parameters, no extra keys, and no
    /// declared return type.
    #[must_use]
    pub fn new() -> Self {
        Signature::default()
    }

    /// Appends a parameter.
    pub fn push(&mut self, param: Param) -> &mut Self {
        self.params.push(param);
        self
    }

    /// Sets whether the handler accepts arbitrary extra keys.
    pub fn set_extra_keys(&mut self, extra_keys: bool) -> &mut Self {
        self.extra_keys = extra_keys;
        self
    }

    /// Sets the declared return type.
    pub fn set_returns(&mut self, returns: Option<JsonType>) -> &mut Self {
        self.returns = returns;
        self
    }

    /// The declared parameters, in declaration order.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params[..]
    }

    /// Looks up a parameter by its name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Whether the handler accepts arbitrary extra keys.
    #[must_use]
    pub fn accepts_extra_keys(&self) -> bool {
        self.extra_keys
    }

    /// The declared return type, if any.
    #[must_use]
    pub fn returns(&self) -> Option<JsonType> {
        self.returns
    }

    /// The parameters without a default, followed by those with one.  The
    /// order within each group is the declaration order.
    pub(crate) fn required_first(&self) -> impl Iterator<Item = &Param> {
        let required = self.params.iter().filter(|p| !p.has_default());
        let defaulted = self.params.iter().filter(|p| p.has_default());
        required.chain(defaulted)
    }
}
