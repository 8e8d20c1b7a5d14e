// License: MIT

use serde_json::json;

use crate::IvoryError;
use crate::document::Document;
use crate::value::Value;

/// Export a resolved document to pretty JSON.
///
/// Values flagged for redaction (`@env.secure`) come out as `"<redacted>"`;
/// everything else maps directly: strings, integers, floats, booleans,
/// null, arrays, and objects in insertion order.
///
/// # Examples
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let doc = ivory_cfg::parse("[server]\nport: 8080\n")?;
/// let json = ivory_cfg::export::document_to_json(&doc)?;
/// println!("{}", json);
/// # Ok(())
/// # }
/// ```
pub fn document_to_json(doc: &Document) -> Result<String, IvoryError> {
    let root = Value::Object(doc.redacted_root());
    serde_json::to_string_pretty(&value_to_json(&root)).map_err(|e| IvoryError::TypeError {
        message: format!("Failed to serialize document: {}", e),
        hint: None,
    })
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => json!(s),
        Value::Integer(n) => json!(n),
        Value::Float(n) => json!(n),
        Value::Bool(b) => json!(b),
        Value::Null => serde_json::Value::Null,
        Value::Array(items) => {
            json!(items.iter().map(value_to_json).collect::<Vec<_>>())
        }
        Value::Object(items) => {
            let map: serde_json::Map<String, serde_json::Value> = items
                .iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Engine;

    #[test]
    fn test_export_round_trips_through_serde() {
        let input = r#"
[server]
host: "localhost"
port: 8080
ratio: 0.75
tags: ["a", "b"]
debug: true
extra: null
"#;

        let doc = Engine::new().with_env(Vec::new()).parse(input).unwrap();
        let out = document_to_json(&doc).expect("Failed to export");
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(parsed["server"]["host"], "localhost");
        assert_eq!(parsed["server"]["port"], 8080);
        assert_eq!(parsed["server"]["ratio"], 0.75);
        assert_eq!(parsed["server"]["tags"][1], "b");
        assert_eq!(parsed["server"]["debug"], true);
        assert!(parsed["server"]["extra"].is_null());
    }

    #[test]
    fn test_export_redacts_secure_values() {
        let engine = Engine::new().with_env(vec![
            ("API_KEY".to_string(), "hunter2".to_string()),
        ]);

        let doc = engine
            .parse("[api]\nkey: @env.secure(\"API_KEY\")\nurl: \"http://x\"\n")
            .unwrap();

        let out = document_to_json(&doc).unwrap();
        assert!(!out.contains("hunter2"));

        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["api"]["key"], "<redacted>");
        assert_eq!(parsed["api"]["url"], "http://x");
    }

    #[test]
    fn test_debug_output_redacts_too() {
        let engine = Engine::new().with_env(vec![
            ("TOKEN".to_string(), "tok-123".to_string()),
        ]);

        let doc = engine.parse("token: @env.secure(\"TOKEN\")\n").unwrap();
        let debug = format!("{:?}", doc);
        assert!(!debug.contains("tok-123"));
        assert!(debug.contains("<redacted>"));
    }
}
