//! Structured data transforms: JSON, YAML, and CSV.
//!
//! Parse failures are conversion failures (the path was legal, the payload was
//! not), never unsupported-conversion errors.

use serde_json::Value;

use crate::error::{Error, Result};

/// Re-serialize JSON with stable 2-space indentation.
///
/// This is both the JSON→plain-text rendering and the JSON→JSON
/// canonicalization path.
pub fn json_pretty(data: &[u8]) -> Result<String> {
    let value: Value = serde_json::from_slice(data)
        .map_err(|e| Error::conversion_failed(format!("invalid JSON: {e}")))?;
    serde_json::to_string_pretty(&value)
        .map_err(|e| Error::conversion_failed(format!("failed to serialize JSON: {e}")))
}

/// Parse JSON and emit it in YAML block form.
pub fn json_to_yaml(data: &[u8]) -> Result<String> {
    let value: Value = serde_json::from_slice(data)
        .map_err(|e| Error::conversion_failed(format!("invalid JSON: {e}")))?;
    serde_yaml::to_string(&value)
        .map_err(|e| Error::conversion_failed(format!("failed to emit YAML: {e}")))
}

/// Parse YAML and re-emit it in block form.
pub fn yaml_canonical(data: &[u8]) -> Result<String> {
    let value: serde_yaml::Value = serde_yaml::from_slice(data)
        .map_err(|e| Error::conversion_failed(format!("invalid YAML: {e}")))?;
    serde_yaml::to_string(&value)
        .map_err(|e| Error::conversion_failed(format!("failed to emit YAML: {e}")))
}

/// Parse CSV into a pretty-printed JSON array of records.
///
/// The first row supplies the headers; each subsequent non-blank row becomes
/// an object mapping header → trimmed field value. Rows shorter than the
/// header row are padded with empty strings.
pub fn csv_to_json(data: &[u8]) -> Result<String> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| Error::conversion_failed(format!("invalid CSV: {e}")))?
        .clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| Error::conversion_failed(format!("invalid CSV: {e}")))?;
        let mut record = serde_json::Map::with_capacity(headers.len());
        for (i, header) in headers.iter().enumerate() {
            let field = row.get(i).unwrap_or("");
            record.insert(header.to_string(), Value::String(field.to_string()));
        }
        records.push(Value::Object(record));
    }

    serde_json::to_string_pretty(&Value::Array(records))
        .map_err(|e| Error::conversion_failed(format!("failed to serialize JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_json_pretty_two_space_indent() {
        let out = json_pretty(br#"{"name":"Alice","age":30}"#).unwrap();
        assert_eq!(out, "{\n  \"name\": \"Alice\",\n  \"age\": 30\n}");
    }

    #[test]
    fn test_json_pretty_preserves_key_order() {
        let out = json_pretty(br#"{"z":1,"a":2}"#).unwrap();
        assert!(out.find("\"z\"").unwrap() < out.find("\"a\"").unwrap());
    }

    #[test]
    fn test_json_pretty_rejects_invalid() {
        assert_matches!(json_pretty(b"{oops"), Err(Error::ConversionFailed(_)));
    }

    #[test]
    fn test_json_to_yaml_block_form() {
        let out = json_to_yaml(br#"{"name":"Alice","tags":["a","b"]}"#).unwrap();
        assert!(out.contains("name: Alice"));
        assert!(out.contains("- a"));
        assert!(out.contains("- b"));
    }

    #[test]
    fn test_yaml_canonical_round_trip() {
        let out = yaml_canonical(b"name: Alice\nage: 30\n").unwrap();
        assert!(out.contains("name: Alice"));
        assert!(out.contains("age: 30"));
    }

    #[test]
    fn test_yaml_canonical_rejects_invalid() {
        assert_matches!(
            yaml_canonical(b"key: [unclosed"),
            Err(Error::ConversionFailed(_))
        );
    }

    #[test]
    fn test_csv_to_json_basic() {
        let out = csv_to_json(b"name,age\nAlice,30\nBob,25").unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            parsed,
            serde_json::json!([
                {"name": "Alice", "age": "30"},
                {"name": "Bob", "age": "25"}
            ])
        );
    }

    #[test]
    fn test_csv_to_json_trims_fields() {
        let out = csv_to_json(b"name,age\n  Alice  , 30\n").unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["name"], "Alice");
        assert_eq!(parsed[0]["age"], "30");
    }

    #[test]
    fn test_csv_to_json_pads_short_rows() {
        let out = csv_to_json(b"name,age,city\nAlice,30\n").unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["city"], "");
    }

    #[test]
    fn test_csv_to_json_skips_blank_rows() {
        let out = csv_to_json(b"name,age\nAlice,30\n\nBob,25\n").unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_csv_to_json_headers_only() {
        let out = csv_to_json(b"name,age\n").unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, serde_json::json!([]));
    }

    #[test]
    fn test_csv_field_order_follows_headers() {
        let out = csv_to_json(b"name,age\nAlice,30\n").unwrap();
        assert!(out.find("\"name\"").unwrap() < out.find("\"age\"").unwrap());
    }
}
