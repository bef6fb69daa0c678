use serde_json::{Map, Value};

/// Headline fields, in order of priority. `summary` is searched too, so a
/// forecast reduces to its expected total.
const PRIORITY_KEYS: [&str; 5] = [
    "total_expected",
    "total_outstanding",
    "conversion_rate",
    "expected",
    "overdue_amount",
];

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        let summary = map.get("summary").and_then(Value::as_object);
        let lookup = |m: &Map<String, Value>, key: &str| m.get(key).filter(|v| !v.is_null()).cloned();

        for key in PRIORITY_KEYS {
            let found = lookup(map, key).or_else(|| summary.and_then(|s| lookup(s, key)));
            if let Some(val) = found {
                return format_minimal(&val);
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result_obj)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_forecast_reduces_to_expected_total() {
        let out = json!({ "result": { "as_of": "2024-03-01", "summary": { "total_expected": "872.50" } } });
        assert_eq!(minimal_line(&out), "872.50");
    }

    #[test]
    fn test_priority_order() {
        let out = json!({ "result": { "overdue_amount": "5", "total_outstanding": "10" } });
        assert_eq!(minimal_line(&out), "10");
    }

    #[test]
    fn test_fallback_to_first_field() {
        let out = json!({ "result": { "offer_count": 2 } });
        assert_eq!(minimal_line(&out), "offer_count: 2");
    }
}
