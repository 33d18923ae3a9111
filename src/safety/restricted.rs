//! Responses served while the server runs in unsafe mode.

use serde::Serialize;

/// Multi-line operator warning returned for every gated request.
pub const UNSAFE_WARNING: [&str; 4] = [
    "Running in a potentially unsafe mode.",
    "Authentication is not configured and unsecured access has not been validated for the bound addresses.",
    "Enable authentication by setting security.authentication_enabled in the server configuration file.",
    "If the server should stay unsecured, validate that by setting security.unsecured_access_validated once listener.bind_address is restricted to trusted networks.",
];

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// True when any `Accept` value asks for HTML or any text type.
pub fn is_html_acceptable<S: AsRef<str>>(accept: &[S]) -> bool {
    accept.iter().any(|value| {
        let value = value.as_ref();
        value.contains("text/html") || value.contains("text/*")
    })
}

/// Warning page for browsers.
pub fn render_unsafe_page() -> String {
    let mut page = String::from(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Unsafe mode</title></head>\n<body>\n",
    );
    for line in UNSAFE_WARNING {
        page.push_str("<p>");
        page.push_str(&escape_html(line));
        page.push_str("</p>\n");
    }
    page.push_str("</body>\n</html>\n");
    page
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UnsafeWarningBody<'a> {
    message: String,
    message_as_array: &'a [&'a str],
}

/// Negotiated body of an unsafe-mode rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedResponse {
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl RestrictedResponse {
    pub fn negotiate<S: AsRef<str>>(accept: &[S]) -> Self {
        if is_html_acceptable(accept) {
            return Self {
                content_type: HTML_CONTENT_TYPE,
                body: render_unsafe_page().into_bytes(),
            };
        }

        let body = UnsafeWarningBody {
            message: UNSAFE_WARNING.join(" "),
            message_as_array: &UNSAFE_WARNING,
        };
        Self {
            content_type: JSON_CONTENT_TYPE,
            body: serde_json::to_vec(&body).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_negotiation() {
        assert!(is_html_acceptable(&["text/html,application/xhtml+xml"]));
        assert!(is_html_acceptable(&["application/json", "text/*;q=0.5"]));
        assert!(!is_html_acceptable(&["application/json"]));
        assert!(!is_html_acceptable::<&str>(&[]));
    }

    #[test]
    fn test_json_body() {
        let response = RestrictedResponse::negotiate(&["*/*"]);
        assert_eq!(response.content_type, JSON_CONTENT_TYPE);

        let json: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        let lines = json["MessageAsArray"].as_array().unwrap();
        assert_eq!(lines.len(), UNSAFE_WARNING.len());
        assert_eq!(lines[0], UNSAFE_WARNING[0]);
        assert_eq!(json["Message"], UNSAFE_WARNING.join(" "));
    }

    #[test]
    fn test_html_body() {
        let response = RestrictedResponse::negotiate(&["text/html"]);
        assert_eq!(response.content_type, HTML_CONTENT_TYPE);
        let page = String::from_utf8(response.body).unwrap();
        assert!(page.contains("<p>Running in a potentially unsafe mode.</p>"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_html("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}
