// License: MIT

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use once_cell::sync::OnceCell;

use crate::IvoryError;
use crate::document::Document;
use crate::error::OperatorError;
use crate::operators::{
    ContextInputs, CryptoProviders, EvalContext, OperatorRegistry,
};
use crate::parser::Parser;
use crate::resolver;
use crate::value::Value;

/// Parse with a stock engine: built-in operators, live environment, current
/// clock.
///
/// # Examples
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let doc = ivory_cfg::parse("[server]\nhost: \"localhost\"\n")?;
/// # Ok(())
/// # }
/// ```
pub fn parse(text: &str) -> Result<Document, IvoryError> {
    Engine::new().parse(text)
}

/// Holds everything configured before parsing: the operator registry,
/// crypto providers, and optional pinned snapshots. Construction-time only;
/// once parses start an engine is shared by immutable reference.
pub struct Engine {
    registry: OperatorRegistry,
    crypto: CryptoProviders,
    env_override: Option<HashMap<String, String>>,
    now_override: Option<DateTime<Local>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            registry: OperatorRegistry::with_builtins(),
            crypto: CryptoProviders::default(),
            env_override: None,
            now_override: None,
        }
    }

    /// Register a custom `@name(...)` handler. Reusing a built-in name
    /// overrides it for this engine.
    ///
    /// # Examples
    /// ```no_run
    /// use ivory_cfg::{Engine, Value};
    ///
    /// let mut engine = Engine::new();
    /// engine.register_operator("upper", 1, Some(1), |args, _ctx| {
    ///     Ok(Value::String(args[0].to_display_string().to_uppercase()))
    /// });
    /// ```
    pub fn register_operator<F>(
        &mut self,
        name: &str,
        min_args: usize,
        max_args: Option<usize>,
        handler: F,
    ) where
        F: Fn(&[Value], &EvalContext) -> Result<Value, OperatorError> + Send + Sync + 'static,
    {
        self.registry.register(name, min_args, max_args, Box::new(handler));
    }

    /// Register a predicate reachable as `@validate.<name>(value)`.
    pub fn register_validator<F>(&mut self, name: &str, predicate: F)
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.registry.register_validator(name, Box::new(predicate));
    }

    /// Supply a hash implementation for `@hash(value, "<name>")`.
    pub fn register_hash_provider<F>(&mut self, algorithm: &str, f: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.crypto.register_hash(algorithm, Box::new(f));
    }

    /// Supply an encryption implementation for `@encrypt(value, "<name>")`.
    pub fn register_encrypt_provider<F>(&mut self, algorithm: &str, f: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.crypto.register_encrypt(algorithm, Box::new(f));
    }

    /// Pin the environment snapshot instead of reading the process
    /// environment at parse time. Makes parses reproducible in tests.
    pub fn with_env<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.env_override = Some(vars.into_iter().collect());
        self
    }

    /// Pin the clock seen by the date operators.
    pub fn with_timestamp(mut self, now: DateTime<Local>) -> Self {
        self.now_override = Some(now);
        self
    }

    /// The sole entry point: tokenize, parse, resolve. Either every
    /// reference and operator call resolves, or no document is produced.
    pub fn parse(&self, text: &str) -> Result<Document, IvoryError> {
        let mut parser = Parser::new(text)?;
        let raw = parser.parse_document()?;

        let inputs = ContextInputs {
            env: self
                .env_override
                .clone()
                .unwrap_or_else(|| std::env::vars().collect()),
            now: self.now_override.unwrap_or_else(Local::now),
            sys: OnceCell::new(),
            crypto: &self.crypto,
        };

        resolver::resolve(&raw, &self.registry, inputs)
    }

    /// Read a file (with `~/` expansion) and parse it.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Document, IvoryError> {
        let path = expand_home(path.as_ref());
        let text = fs::read_to_string(&path).map_err(|e| IvoryError::FileError {
            message: format!("Failed to read file: {}", e),
            path: path.to_string_lossy().to_string(),
        })?;
        self.parse(&text)
    }
}

fn expand_home(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
