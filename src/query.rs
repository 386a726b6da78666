//! URL query string construction

use serde_json::Value;

use crate::http::display_value;

/// Loose truthiness: `null`, `false`, `0` and `""` are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Append `key=value&` pairs to `base`.
///
/// Parameters are visited in iteration order and skipped when falsy, so a
/// legitimate `0` or `false` never reaches the backend. Arrays expand into one
/// pair per element. The trailing `&` is kept.
pub fn build_query<'a, I>(base: &str, parameters: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut query = base.to_string();
    for (key, value) in parameters {
        if !is_truthy(value) {
            continue;
        }
        match value {
            Value::Array(items) => {
                for item in items {
                    query.push_str(&format!("{}={}&", key, display_value(item)));
                }
                if items.is_empty() {
                    query.push_str(&format!("{}=&", key));
                }
            }
            other => query.push_str(&format!("{}={}&", key, display_value(other))),
        }
    }
    query
}

/// Listing URL: `base`, then `/path` when given, then `?query` when any
/// parameter survives filtering
pub fn listing_url<'a, I>(base: &str, path: &str, parameters: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut url = base.to_string();
    if !path.is_empty() {
        url.push('/');
        url.push_str(path);
    }

    let query = build_query("", parameters);
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query);
    }
    url
}
