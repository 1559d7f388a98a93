//! Export of the current request as a shell command.

use crate::request::{API_KEY_HEADER, CONTENT_TYPE, JSON_CONTENT_TYPE, RequestState};
use crate::vault::KeyVault;

/// Placeholder used when no credential is set.
pub const KEY_PLACEHOLDER: &str = "YOUR_API_KEY";

const CONTINUATION: &str = " \\\n  ";

/// Build the curl command equivalent to what the executor would send.
pub fn to_curl(state: &RequestState, vault: &KeyVault) -> String {
    let key = vault.raw().unwrap_or(KEY_PLACEHOLDER);
    let mut parts = vec![format!(
        "curl -X {} {}",
        state.method,
        double_quote(&state.build_url())
    )];

    parts.push(header_flag(API_KEY_HEADER, key));

    for row in state.headers.active() {
        if row.value.is_empty()
            || row.key.eq_ignore_ascii_case(CONTENT_TYPE)
            || row.key.eq_ignore_ascii_case(API_KEY_HEADER)
        {
            continue;
        }
        parts.push(header_flag(&row.key, &row.value));
    }

    if state.is_multipart {
        parts.push(format!("-F {}", double_quote("file=@/path/to/photo.jpg")));
        parts.push(format!("-F {}", double_quote("caption=...")));
    } else if state.method.allows_body() && !state.body.is_empty() {
        parts.push(header_flag(CONTENT_TYPE, JSON_CONTENT_TYPE));
        parts.push(format!("-d {}", single_quote(&collapse_newlines(&state.body))));
    }

    parts.join(CONTINUATION)
}

fn header_flag(name: &str, value: &str) -> String {
    format!("-H {}", double_quote(&format!("{name}: {value}")))
}

/// Wrap in double quotes, escaping what the shell would otherwise expand.
fn double_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Wrap in single quotes; embedded quotes become `'\''`.
fn single_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

fn collapse_newlines(s: &str) -> String {
    s.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
