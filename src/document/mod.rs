// License: MIT

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;

use crate::IvoryError;
use crate::value::Value;

mod conversion;

/// The immutable, fully-resolved result of one parse.
///
/// Every reference and operator call has already been evaluated; what is
/// left is plain data, safe to share across threads by reference.
pub struct Document {
    root: IndexMap<String, Value>,
    globals: IndexMap<String, Value>,
    /// Dotted paths whose values came from a redacting operator.
    secrets: HashSet<String>,
}

impl Document {
    pub(crate) fn new(
        root: IndexMap<String, Value>,
        globals: IndexMap<String, Value>,
        secrets: HashSet<String>,
    ) -> Self {
        Document { root, globals, secrets }
    }

    /// Dotted-path lookup.
    ///
    /// # Examples
    /// ```no_run
    /// # use ivory_cfg::parse;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let doc = parse("[server]\nhost: \"localhost\"\n")?;
    /// let host = doc.get("server.host");
    /// # Ok(())
    /// # }
    /// ```
    pub fn get(&self, path: &str) -> Option<&Value> {
        if path.trim().is_empty() {
            return None;
        }

        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.get(segment)?;
        }
        Some(current)
    }

    /// Segment-wise lookup, for callers that already hold a split path.
    pub fn get_path(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.root.get(*first)?;
        for segment in rest {
            current = current.get(segment)?;
        }
        Some(current)
    }

    /// A resolved `$name` global.
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn globals(&self) -> &IndexMap<String, Value> {
        &self.globals
    }

    pub fn root(&self) -> &IndexMap<String, Value> {
        &self.root
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.root.keys()
    }

    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Whether the value at `path` is flagged for redaction
    /// (produced by `@env.secure`).
    pub fn is_secret(&self, path: &str) -> bool {
        self.secrets.contains(path)
    }

    /// Typed lookup through the `TryFrom<Value>` conversions.
    ///
    /// # Examples
    /// ```no_run
    /// # use ivory_cfg::parse;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let doc = parse("[server]\nport: 8080\n")?;
    /// let port: u16 = doc.get_as("server.port")?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// `UnresolvedReference` if the path does not exist, `TypeError` if the
    /// value cannot convert to `T`.
    pub fn get_as<T>(&self, path: &str) -> Result<T, IvoryError>
    where
        T: TryFrom<Value, Error = IvoryError>,
    {
        let value = self.get(path).cloned().ok_or_else(|| IvoryError::UnresolvedReference {
            path: path.split('.').map(String::from).collect(),
        })?;
        T::try_from(value)
    }

    /// Typed lookup with a fallback default.
    pub fn get_or<T>(&self, path: &str, default: T) -> T
    where
        T: TryFrom<Value, Error = IvoryError>,
    {
        self.get_as(path).unwrap_or(default)
    }

    /// The root object with secret paths replaced by `"<redacted>"`; used
    /// by `Debug` and the JSON exporter.
    pub(crate) fn redacted_root(&self) -> IndexMap<String, Value> {
        let mut out = IndexMap::new();
        for (key, value) in &self.root {
            out.insert(key.clone(), self.redact(value, key));
        }
        out
    }

    fn redacted_globals(&self) -> IndexMap<String, Value> {
        let mut out = IndexMap::new();
        for (name, value) in &self.globals {
            out.insert(name.clone(), self.redact(value, &format!("${}", name)));
        }
        out
    }

    fn redact(&self, value: &Value, path: &str) -> Value {
        if self.secrets.contains(path) {
            return Value::String("<redacted>".to_string());
        }
        match value {
            Value::Object(items) => {
                let mut out = IndexMap::new();
                for (key, child) in items {
                    out.insert(key.clone(), self.redact(child, &format!("{}.{}", path, key)));
                }
                Value::Object(out)
            }
            other => other.clone(),
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.redacted_root())
            .field("globals", &self.redacted_globals())
            .finish()
    }
}
