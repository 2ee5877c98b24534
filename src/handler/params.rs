//! Request body parameter extraction
//!
//! A body is decoded in two stages: first as a JSON object, then as
//! `application/x-www-form-urlencoded` data. The first stage that succeeds
//! determines the encoding.

use hyper::HeaderMap;
use std::collections::HashMap;
use std::fmt;

/// Encoding a body was successfully decoded as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    Json,
    Form,
}

/// Body that matched neither encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyError {
    /// Not a JSON object and not valid UTF-8 form data
    NotUtf8,
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotUtf8 => write!(f, "body is neither a JSON object nor UTF-8 form data"),
        }
    }
}

impl std::error::Error for BodyError {}

/// Flat string parameters decoded from a request body
#[derive(Debug, Clone, Default)]
pub struct Params {
    encoding: Option<BodyEncoding>,
    fields: HashMap<String, String>,
}

impl Params {
    pub const fn encoding(&self) -> Option<BodyEncoding> {
        self.encoding
    }

    /// Value of `name`; an empty string counts as missing
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Values of all `names` in order, or `None` if any is missing
    pub fn require(&self, names: &[&str]) -> Option<Vec<&str>> {
        names.iter().map(|name| self.get(name)).collect()
    }
}

/// Declared `Content-Length`; absent or unparsable means zero
pub fn declared_length(headers: &HeaderMap) -> usize {
    headers
        .get(hyper::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0)
}

/// Decode `body` as a JSON object, falling back to form encoding
pub fn parse_body(body: &[u8]) -> Result<Params, BodyError> {
    if let Some(fields) = parse_json(body) {
        return Ok(Params {
            encoding: Some(BodyEncoding::Json),
            fields,
        });
    }
    parse_form(body).map(|fields| Params {
        encoding: Some(BodyEncoding::Form),
        fields,
    })
}

/// Top-level string members of a JSON object. Non-string values are skipped.
fn parse_json(body: &[u8]) -> Option<HashMap<String, String>> {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => Some(
            map.into_iter()
                .filter_map(|(k, v)| match v {
                    serde_json::Value::String(s) => Some((k, s)),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

/// `key=value&...` pairs; the first non-blank value of a repeated key wins
fn parse_form(body: &[u8]) -> Result<HashMap<String, String>, BodyError> {
    std::str::from_utf8(body).map_err(|_| BodyError::NotUtf8)?;

    let mut fields = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(body) {
        if value.is_empty() {
            continue;
        }
        fields
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_object() {
        let params = parse_body(br#"{"email":"a@b.com","code":"123456"}"#).unwrap();
        assert_eq!(params.encoding(), Some(BodyEncoding::Json));
        assert_eq!(params.get("email"), Some("a@b.com"));
        assert_eq!(params.get("code"), Some("123456"));
    }

    #[test]
    fn test_json_non_string_values_are_missing() {
        let params = parse_body(br#"{"email":"a@b.com","code":123456,"x":null}"#).unwrap();
        assert_eq!(params.get("code"), None);
        assert_eq!(params.get("x"), None);
        assert!(params.require(&["email", "code"]).is_none());
    }

    #[test]
    fn test_form_encoded() {
        let params = parse_body(b"name=John+Doe&email=john%40example.com&message=Hi%21").unwrap();
        assert_eq!(params.encoding(), Some(BodyEncoding::Form));
        assert_eq!(params.get("name"), Some("John Doe"));
        assert_eq!(params.get("email"), Some("john@example.com"));
        assert_eq!(params.get("message"), Some("Hi!"));
    }

    #[test]
    fn test_form_repeated_key_first_wins() {
        let params = parse_body(b"code=&code=111&code=222").unwrap();
        assert_eq!(params.get("code"), Some("111"));
    }

    #[test]
    fn test_json_array_falls_back_to_form() {
        let params = parse_body(b"[1,2,3]").unwrap();
        assert_eq!(params.encoding(), Some(BodyEncoding::Form));
        assert_eq!(params.get("email"), None);
    }

    #[test]
    fn test_malformed_json_falls_back_to_form() {
        let params = parse_body(br#"{"email": "a@b.com""#).unwrap();
        assert_eq!(params.encoding(), Some(BodyEncoding::Form));
        assert_eq!(params.get("email"), None);
    }

    #[test]
    fn test_invalid_utf8_is_error() {
        assert_eq!(parse_body(&[0xff, 0xfe, b'=', 0x80]).unwrap_err(), BodyError::NotUtf8);
    }

    #[test]
    fn test_empty_values_are_missing() {
        let params = parse_body(br#"{"email":"","code":"1"}"#).unwrap();
        assert_eq!(params.get("email"), None);
        assert_eq!(params.require(&["code"]), Some(vec!["1"]));
    }

    #[test]
    fn test_empty_body() {
        let params = parse_body(b"").unwrap();
        assert!(params.require(&["email"]).is_none());
    }

    #[test]
    fn test_no_trimming() {
        let params = parse_body(br#"{"name":"  Ann  "}"#).unwrap();
        assert_eq!(params.get("name"), Some("  Ann  "));
    }

    #[test]
    fn test_declared_length() {
        let mut headers = HeaderMap::new();
        assert_eq!(declared_length(&headers), 0);
        headers.insert(hyper::header::CONTENT_LENGTH, "42".parse().unwrap());
        assert_eq!(declared_length(&headers), 42);
        headers.insert(hyper::header::CONTENT_LENGTH, "abc".parse().unwrap());
        assert_eq!(declared_length(&headers), 0);
    }
}
