#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
/// Errors generated specifically from this library, and not its interactions
/// with user code.
pub enum SymmetricError {
    #[error("the route {:?} does not have a valid format", .0)]
    /// Generated when registering an endpoint whose route does not follow
    /// the route grammar (see [`crate::route::validate`]).
    IncorrectRouteFormat(String),
    #[error("the route {:?} is already registered", .0)]
    /// Generated when registering an endpoint at a route that another
    /// endpoint (or a documentation route) already occupies.
    DuplicatedRoute(String),
    #[error("the token name {:?} is not valid", .0)]
    /// Generated when configuring a client or server token name that is
    /// empty, or (for the client) that cannot be used as a header name.
    InvalidTokenName(String),
    #[error("the request did not carry a valid authentication token")]
    /// Generated when an endpoint requires a token, and the request either
    /// did not provide one or provided the wrong one.
    AuthenticationRequired,
    #[error("the parameter {:?} was not provided and has no default", .0)]
    /// Generated by [`crate::Params::get`] when a parameter is neither in the
    /// request body nor declared with a default.
    MissingParameter(String),
    #[error("the parameter {:?} could not be deserialized", .name)]
    /// Generated by [`crate::Params::get`] when a parameter is present, but
    /// it cannot be deserialized into the requested type.
    InvalidParameter {
        /// The name of the offending parameter.
        name: String,
        /// The underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
    #[error("could not parse the given string ({:?}) as an address", .0)]
    /// Generated when attempting to parse an address (during
    /// [`crate::Symmetric::listen`]), but the address was invalid.
    InvalidAddress(String),
    #[error("could not serve server")]
    /// Generated when attempting to bind and listen using hyper, but it failed
    /// for some underlying reason.
    HyperServer(#[source] hyper::Error),
    #[error("could not read the body of a request")]
    /// Generated when the body of an incoming request cannot be read.
    ReadBody(#[source] hyper::Error),
    #[error("could not write the documentation file")]
    /// Generated when exporting documentation to a file fails.
    Export(#[source] std::io::Error),
    #[error("could not serialize a value into JSON")]
    /// Generated when a value cannot be serialized into JSON.
    Serialization(#[source] serde_json::Error),
}
