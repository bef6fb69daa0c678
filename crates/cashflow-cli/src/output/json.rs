use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print JSON to stdout, newline terminated.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = write_json(&mut out, value) {
        eprintln!("JSON serialization error: {}", e);
    }
}

fn write_json<W: Write>(out: &mut W, value: &Value) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decimal_strings_survive() {
        let mut buf = Vec::new();
        write_json(&mut buf, &json!({ "result": { "total_expected": "872.50" } })).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"total_expected\": \"872.50\""));
        assert!(text.ends_with("}\n"));
    }
}
