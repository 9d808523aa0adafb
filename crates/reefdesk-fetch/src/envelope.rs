//! Response envelopes the backend produces for list endpoints.
//!
//! - a bare JSON array
//! - `{ "data": [...] }` from API resources or `{ "success": true, "data": [...] }`
//! - paginator objects carrying `next_page_url` or `links.next`
//! - any of the above nested once more under `data`

use reefdesk_core::FetchError;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub rows: Vec<Value>,
    pub next: Option<String>,
}

pub fn decode_page(body: Value, endpoint: &str) -> Result<Page, FetchError> {
    match body {
        Value::Array(rows) => Ok(Page { rows, next: None }),
        Value::Object(mut map) => {
            let next = map
                .get("next_page_url")
                .and_then(Value::as_str)
                .or_else(|| map.get("links").and_then(|l| l.get("next")).and_then(Value::as_str))
                .map(str::to_string);
            match map.remove("data") {
                Some(Value::Array(rows)) => Ok(Page { rows, next }),
                Some(inner @ Value::Object(_)) => {
                    let page = decode_page(inner, endpoint)?;
                    Ok(Page { next: page.next.or(next), rows: page.rows })
                }
                Some(_) => Err(shape(endpoint, "`data` is not a list")),
                None => Err(shape(endpoint, "object without a `data` list")),
            }
        }
        _ => Err(shape(endpoint, "expected a list or an object")),
    }
}

fn shape(endpoint: &str, reason: &str) -> FetchError {
    FetchError::UnexpectedShape { endpoint: endpoint.to_string(), reason: reason.to_string() }
}
