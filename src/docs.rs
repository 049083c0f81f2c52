//! The interactive documentation page.

use crate::constants::OPENAPI_ROUTE;

const REDOC_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/redoc/bundles/redoc.standalone.js";
const GOOGLE_FONTS: &str =
    "https://fonts.googleapis.com/css?family=Montserrat:300,400,700|Roboto:300,400,700";

/// A ReDoc page rendering the OpenAPI document served at [`OPENAPI_ROUTE`].
pub(crate) fn redoc_html(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
    <head>
        <title>{title}</title>
        <meta charset="utf-8"/>
        <meta name="viewport" content="width=device-width, initial-scale=1">
        <link href="{fonts}" rel="stylesheet">
        <style>
        body {{
            margin: 0;
            padding: 0;
        }}
        </style>
    </head>
    <body>
        <redoc spec-url="{spec}"></redoc>
        <script src="{script}"></script>
    </body>
</html>
"#,
        title = escape(title),
        fonts = GOOGLE_FONTS,
        spec = OPENAPI_ROUTE,
        script = REDOC_SCRIPT,
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            c => escaped.push(c),
        }
    }
    escaped
}
