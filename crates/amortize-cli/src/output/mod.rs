pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Stringify a JSON leaf for a text cell.
pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// First array-of-objects field of a result object, e.g. `periods`.
pub(crate) fn row_array(result: &Value) -> Option<(&str, &Vec<Value>)> {
    result.as_object()?.iter().find_map(|(key, val)| match val {
        Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
            Some((key.as_str(), items))
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_array_finds_periods() {
        let result = json!({
            "monthly_payment": "191.01",
            "periods": [{"month": 1}, {"month": 2}]
        });
        let (key, rows) = row_array(&result).unwrap();
        assert_eq!(key, "periods");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_row_array_ignores_scalars_and_empty_arrays() {
        assert!(row_array(&json!({"warnings": [], "x": 1})).is_none());
        assert!(row_array(&json!({"tags": ["a", "b"]})).is_none());
    }

    #[test]
    fn test_format_scalar() {
        assert_eq!(format_scalar(&json!("9854.82")), "9854.82");
        assert_eq!(format_scalar(&json!(60)), "60");
        assert_eq!(format_scalar(&Value::Null), "");
    }
}
