//! Presentational views of a `ResponseRecord`.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::model::ResponseRecord;

/// Coarse status bucket used for coloring and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Error,
    Informational,
    Success,
    Redirect,
    ClientError,
    ServerError,
}

impl StatusClass {
    pub fn of(status: Option<u16>) -> Self {
        match status {
            None | Some(0) => StatusClass::Error,
            Some(code) if code < 200 => StatusClass::Informational,
            Some(code) if code < 300 => StatusClass::Success,
            Some(code) if code < 400 => StatusClass::Redirect,
            Some(code) if code < 500 => StatusClass::ClientError,
            Some(_) => StatusClass::ServerError,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusClass::Error => "Error",
            StatusClass::Informational => "Informational",
            StatusClass::Success => "Success",
            StatusClass::Redirect => "Redirect",
            StatusClass::ClientError => "Client Error",
            StatusClass::ServerError => "Server Error",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            StatusClass::Error => Color::Red,
            StatusClass::Informational => Color::Blue,
            StatusClass::Success => Color::Green,
            StatusClass::Redirect => Color::Cyan,
            StatusClass::ClientError => Color::Yellow,
            StatusClass::ServerError => Color::Magenta,
        }
    }
}

/// A short explanation of what went wrong, if anything did.
pub fn guidance(record: &ResponseRecord) -> Option<String> {
    let Some(status) = record.status else {
        return record
            .body
            .get("hint")
            .and_then(|h| h.as_str())
            .map(str::to_string);
    };
    let text = match status {
        401 => "The API key is missing or invalid. Paste a valid key with <Space>k.",
        403 => "The API key is valid but not allowed to call this endpoint.",
        404 => "No resource at this path. Check the path and any ids in it.",
        429 => "Rate limited. Wait before sending more requests with this key.",
        500..=599 => "The API failed to handle the request. Try again later.",
        _ => return None,
    };
    Some(text.to_string())
}

/// `200 OK` / `Network Error` headline.
pub fn status_line(record: &ResponseRecord) -> String {
    match record.status {
        Some(code) if record.status_text.is_empty() => code.to_string(),
        Some(code) => format!("{} {}", code, record.status_text),
        None => record.status_text.clone(),
    }
}

pub fn pretty_body(record: &ResponseRecord) -> String {
    serde_json::to_string_pretty(&record.body).unwrap_or_else(|_| record.body.to_string())
}

/// Clipboard text for "copy body".
pub fn body_text(record: &ResponseRecord) -> String {
    pretty_body(record)
}

/// Clipboard text for "copy whole response".
pub fn record_text(record: &ResponseRecord) -> String {
    serde_json::to_string_pretty(record).unwrap_or_default()
}

pub fn header_lines(record: &ResponseRecord) -> Vec<Line<'static>> {
    record
        .headers
        .iter()
        .map(|(k, v)| {
            Line::from(vec![
                Span::styled(
                    format!("{}: ", k),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
                Span::raw(v.clone()),
            ])
        })
        .collect()
}

// ── JSON highlighting ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Key,
    String,
    Number,
    Literal,
    Punct,
    Plain,
}

fn token_style(token: Token) -> Style {
    match token {
        Token::Key => Style::default().fg(Color::Cyan),
        Token::String => Style::default().fg(Color::Green),
        Token::Number => Style::default().fg(Color::Yellow),
        Token::Literal => Style::default().fg(Color::Magenta),
        Token::Punct => Style::default().add_modifier(Modifier::DIM),
        Token::Plain => Style::default(),
    }
}

/// Color pretty-printed JSON, one `Line` per input line.
pub fn highlight_json(text: &str) -> Vec<Line<'static>> {
    text.lines()
        .map(|line| {
            let spans: Vec<Span<'static>> = tokenize_line(line)
                .into_iter()
                .map(|(token, s)| Span::styled(s.to_string(), token_style(token)))
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn tokenize_line(line: &str) -> Vec<(Token, &str)> {
    let bytes = line.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        let token = match bytes[i] {
            b'"' => {
                i += 1;
                while i < bytes.len() {
                    match bytes[i] {
                        b'\\' => i += 2,
                        b'"' => {
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
                i = i.min(bytes.len());
                let rest = line[i..].trim_start();
                if rest.starts_with(':') {
                    Token::Key
                } else {
                    Token::String
                }
            }
            b'-' | b'0'..=b'9' => {
                i += 1;
                while i < bytes.len() && matches!(bytes[i], b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-') {
                    i += 1;
                }
                Token::Number
            }
            b'a'..=b'z' => {
                while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
                    i += 1;
                }
                match &line[start..i] {
                    "true" | "false" | "null" => Token::Literal,
                    _ => Token::Plain,
                }
            }
            b'{' | b'}' | b'[' | b']' | b',' | b':' => {
                i += 1;
                Token::Punct
            }
            _ => {
                // Plain run up to the next interesting byte, on a char boundary.
                i += 1;
                while i < bytes.len()
                    && !matches!(
                        bytes[i],
                        b'"' | b'-' | b'0'..=b'9' | b'a'..=b'z' | b'{' | b'}' | b'[' | b']' | b',' | b':'
                    )
                {
                    i += 1;
                }
                while !line.is_char_boundary(i) {
                    i += 1;
                }
                Token::Plain
            }
        };
        out.push((token, &line[start..i]));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn record(status: Option<u16>, body: serde_json::Value) -> ResponseRecord {
        ResponseRecord {
            status,
            status_text: if status.is_some() { "OK".into() } else { "Network Error".into() },
            headers: BTreeMap::from([("content-type".to_string(), "application/json".to_string())]),
            body,
            duration_ms: 5,
            size_formatted: "2 B".into(),
        }
    }

    #[test]
    fn test_status_buckets() {
        assert_eq!(StatusClass::of(None), StatusClass::Error);
        assert_eq!(StatusClass::of(Some(0)), StatusClass::Error);
        assert_eq!(StatusClass::of(Some(101)), StatusClass::Informational);
        assert_eq!(StatusClass::of(Some(204)), StatusClass::Success);
        assert_eq!(StatusClass::of(Some(304)), StatusClass::Redirect);
        assert_eq!(StatusClass::of(Some(404)), StatusClass::ClientError);
        assert_eq!(StatusClass::of(Some(503)), StatusClass::ServerError);
    }

    #[test]
    fn test_guidance() {
        assert!(guidance(&record(Some(401), json!({}))).unwrap().contains("API key"));
        assert!(guidance(&record(Some(429), json!({}))).unwrap().contains("Rate limited"));
        assert!(guidance(&record(Some(200), json!({}))).is_none());
        let net = record(None, json!({"error": "x", "hint": "check CORS"}));
        assert_eq!(guidance(&net).as_deref(), Some("check CORS"));
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(&record(Some(200), json!(null))), "200 OK");
        assert_eq!(status_line(&record(None, json!(null))), "Network Error");
    }

    #[test]
    fn test_record_text_is_camel_case() {
        let text = record_text(&record(Some(200), json!({"a": 1})));
        assert!(text.contains("\"statusText\": \"OK\""));
        assert!(text.contains("\"sizeFormatted\""));
    }

    #[test]
    fn test_tokenize_key_value() {
        let tokens = tokenize_line("  \"name\": \"a:b\",");
        let kinds: Vec<Token> = tokens.iter().map(|(t, _)| *t).collect();
        assert_eq!(
            kinds,
            vec![Token::Plain, Token::Key, Token::Punct, Token::Plain, Token::String, Token::Punct]
        );
        assert_eq!(tokens[1].1, "\"name\"");
        assert_eq!(tokens[4].1, "\"a:b\"");
    }

    #[test]
    fn test_tokenize_numbers_and_literals() {
        let tokens = tokenize_line("[-1.5e3, true, null]");
        let kinds: Vec<Token> = tokens
            .iter()
            .filter(|(t, _)| *t != Token::Plain)
            .map(|(t, _)| *t)
            .collect();
        assert_eq!(
            kinds,
            vec![
                Token::Punct,
                Token::Number,
                Token::Punct,
                Token::Literal,
                Token::Punct,
                Token::Literal,
                Token::Punct
            ]
        );
    }

    #[test]
    fn test_tokenize_escaped_quote_and_unicode() {
        let tokens = tokenize_line("\"say \\\"hé\\\"\" é");
        assert_eq!(tokens[0], (Token::String, "\"say \\\"hé\\\"\""));
        let joined: String = tokens.iter().map(|(_, s)| *s).collect();
        assert_eq!(joined, "\"say \\\"hé\\\"\" é");
    }

    #[test]
    fn test_highlight_keeps_line_count() {
        let text = pretty_body(&record(Some(200), json!({"a": [1, 2], "b": "x"})));
        assert_eq!(highlight_json(&text).len(), text.lines().count());
    }
}
