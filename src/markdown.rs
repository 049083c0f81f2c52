//! Markdown documentation generation.

use crate::{Endpoint, Symmetric};

/// Title-cases a name, splitting words on `_`, `-` and spaces.
///
/// # Examples
/// ```rust
/// # use symmetric::humanize;
/// assert_eq!(humanize("cool_app_name"), "Cool App Name");
/// assert_eq!(humanize("COOL-APP-NAME"), "Cool App Name");
/// assert_eq!(humanize("aPp"), "App");
/// ```
#[must_use]
pub fn humanize(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-' || c == ' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Generates the Markdown documentation of the service.  The output only
/// depends on the registry and the configuration, so generating it twice
/// yields the same document.
pub(crate) fn generate(app: &Symmetric) -> String {
    let mut docs = format!(
        "# {} API Documentation\n\n\
         Endpoints that require an authentication token should send it in a \
         header named `{}`.\n\n",
        humanize(app.name()),
        app.client_token_name()
    );

    let sections = app.registry().iter().map(endpoint).collect::<Vec<_>>();
    docs.push_str(&sections.join("\n"));
    docs
}

fn endpoint(endpoint: &Endpoint) -> String {
    let methods = endpoint
        .methods()
        .iter()
        .map(|method| format!("`{}`", method))
        .collect::<Vec<_>>()
        .join(", ");
    let auth = if endpoint.requires_auth() {
        "Requires an authentication token."
    } else {
        "Does not require an authentication token."
    };

    format!(
        "## `{route}`\n\n\
         ### Description\n\n{description}\n\n\
         ### Metadata\n\n`HTTP` methods accepted: {methods}\n\n{auth}\n\n\
         ### Parameters\n\n{params}\n",
        route = endpoint.route(),
        description = endpoint.description(),
        methods = methods,
        auth = auth,
        params = parameters(endpoint),
    )
}

fn parameters(endpoint: &Endpoint) -> String {
    let signature = endpoint.signature();
    if signature.params().is_empty() {
        return "No required parameters.".to_owned();
    }

    let lines = signature
        .required_first()
        .map(|param| match param.default_value() {
            Some(default) => format!("    {},  // defaults to {}\n", param.name(), default),
            None => format!("    {},\n", param.name()),
        })
        .collect::<String>();
    format!("```text\n{{\n{}}}\n```", lines)
}
