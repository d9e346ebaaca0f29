//! Conversions between `http::HeaderMap` and the JSON header shape used by
//! adapter configs and log records (`{"name": ["value", ...]}`)

use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Header map as JSON, values grouped per name
///
/// Values that are not valid UTF-8 are rendered lossily.
#[must_use]
pub fn header_map_to_json(headers: &HeaderMap) -> Value {
    let mut out = Map::new();
    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .map(|value| Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned()))
            .collect();
        out.insert(name.as_str().to_owned(), Value::Array(values));
    }
    Value::Object(out)
}

/// Build a header map from a validated JSON header object
///
/// Each entry is either a string or an array of strings; array entries
/// become repeated headers.
///
/// # Errors
/// Returns [`ConfigError`] for entries with an invalid name, value or shape.
pub fn json_to_header_map(headers: &Map<String, Value>) -> Result<HeaderMap, ConfigError> {
    let mut out = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::InvalidHeaderName(name.clone()))?;
        // a later entry with the same case-insensitive name replaces earlier ones
        out.remove(&header_name);
        for raw in header_values(name, value)? {
            let header_value = HeaderValue::from_str(raw)
                .map_err(|_| ConfigError::InvalidHeaderValue(name.clone()))?;
            out.append(header_name.clone(), header_value);
        }
    }
    Ok(out)
}

/// Check the shape of a single header entry
///
/// # Errors
/// Returns [`ConfigError::InvalidHeaderEntry`] unless `value` is a string or
/// an array of strings.
pub fn header_values<'a>(name: &str, value: &'a Value) -> Result<Vec<&'a str>, ConfigError> {
    match value {
        Value::String(single) => Ok(vec![single.as_str()]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| ConfigError::InvalidHeaderEntry(name.to_owned()))
            })
            .collect(),
        _ => Err(ConfigError::InvalidHeaderEntry(name.to_owned())),
    }
}
