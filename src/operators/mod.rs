// License: MIT

use std::collections::HashMap;

use chrono::{DateTime, Local};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;

use crate::error::OperatorError;
use crate::value::Value;

mod crypto;
mod date;
mod env;
mod logic;
mod math;
mod sys;
mod validate;

pub use logic::truthy;

/// Handler signature for `@name(args)` calls. Arguments arrive fully
/// resolved, bottom-up; handlers never see raw AST.
pub type OperatorFn =
    Box<dyn Fn(&[Value], &EvalContext) -> Result<Value, OperatorError> + Send + Sync>;

/// Predicate signature for custom `validate.<name>` rules.
pub type ValidatorFn = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// Hash/encrypt algorithm implementation, registered by name.
pub type ProviderFn = Box<dyn Fn(&str) -> String + Send + Sync>;

pub struct OperatorDef {
    min_args: usize,
    max_args: Option<usize>,
    /// Marks values produced by this operator for redaction.
    secret: bool,
    handler: OperatorFn,
}

/// Name → handler table. Built once at engine construction, read-only while
/// parsing, so an engine can be shared across threads by reference.
pub struct OperatorRegistry {
    ops: IndexMap<String, OperatorDef>,
}

impl OperatorRegistry {
    pub fn with_builtins() -> Self {
        let mut registry = OperatorRegistry { ops: IndexMap::new() };
        env::register(&mut registry);
        date::register(&mut registry);
        math::register(&mut registry);
        logic::register(&mut registry);
        validate::register(&mut registry);
        crypto::register(&mut registry);
        sys::register(&mut registry);
        registry
    }

    /// Register a handler. A name that collides with a built-in overrides it
    /// for this registry.
    pub fn register(
        &mut self,
        name: &str,
        min_args: usize,
        max_args: Option<usize>,
        handler: OperatorFn,
    ) {
        self.insert(name, min_args, max_args, false, handler);
    }

    pub(crate) fn insert(
        &mut self,
        name: &str,
        min_args: usize,
        max_args: Option<usize>,
        secret: bool,
        handler: OperatorFn,
    ) {
        self.ops.insert(
            name.to_string(),
            OperatorDef { min_args, max_args, secret, handler },
        );
    }

    /// Wrap a predicate as `validate.<name>`: the value passes through
    /// unchanged on success.
    pub fn register_validator(&mut self, name: &str, predicate: ValidatorFn) {
        let rule = name.to_string();
        let handler: OperatorFn = Box::new(move |args, _ctx| {
            if predicate(&args[0]) {
                Ok(args[0].clone())
            } else {
                Err(OperatorError::ValidationFailed {
                    rule: rule.clone(),
                    value: args[0].to_display_string(),
                })
            }
        });
        self.insert(&format!("validate.{}", name), 1, Some(1), false, handler);
    }

    pub fn is_secret(&self, name: &str) -> bool {
        self.ops.get(name).is_some_and(|def| def.secret)
    }

    pub fn dispatch(
        &self,
        name: &str,
        args: &[Value],
        ctx: &EvalContext,
    ) -> Result<Value, OperatorError> {
        let def = self
            .ops
            .get(name)
            .ok_or_else(|| OperatorError::UnknownOperator { name: name.to_string() })?;

        check_arity(name, def, args.len())?;
        (def.handler)(args, ctx)
    }
}

fn check_arity(name: &str, def: &OperatorDef, got: usize) -> Result<(), OperatorError> {
    let ok = got >= def.min_args && def.max_args.is_none_or(|max| got <= max);
    if ok {
        return Ok(());
    }

    let expected = match (def.min_args, def.max_args) {
        (min, Some(max)) if min == max => format!("exactly {} argument(s)", min),
        (min, Some(max)) => format!("between {} and {} arguments", min, max),
        (min, None) => format!("at least {} argument(s)", min),
    };

    Err(OperatorError::ArgumentMismatch {
        operator: name.to_string(),
        expected,
        got: format!("{} argument(s)", got),
    })
}

/// Externally supplied hash/encrypt implementations; the engine only routes
/// to them by algorithm name.
#[derive(Default)]
pub struct CryptoProviders {
    hash: IndexMap<String, ProviderFn>,
    encrypt: IndexMap<String, ProviderFn>,
}

impl CryptoProviders {
    pub fn register_hash(&mut self, algorithm: &str, f: ProviderFn) {
        self.hash.insert(algorithm.to_string(), f);
    }

    pub fn register_encrypt(&mut self, algorithm: &str, f: ProviderFn) {
        self.encrypt.insert(algorithm.to_string(), f);
    }

    pub(crate) fn hash_provider(&self, algorithm: &str) -> Option<&ProviderFn> {
        self.hash.get(algorithm)
    }

    pub(crate) fn encrypt_provider(&self, algorithm: &str) -> Option<&ProviderFn> {
        self.encrypt.get(algorithm)
    }
}

/// Everything external an operator is allowed to see during one parse:
/// snapshots, never live process state, so a parse is reproducible.
pub(crate) struct ContextInputs<'a> {
    pub(crate) env: HashMap<String, String>,
    pub(crate) now: DateTime<Local>,
    pub(crate) sys: OnceCell<HashMap<String, String>>,
    pub(crate) crypto: &'a CryptoProviders,
}

/// Read-only view handed to operator handlers.
pub struct EvalContext<'a> {
    pub(crate) env: &'a HashMap<String, String>,
    pub(crate) now: DateTime<Local>,
    pub(crate) sys: &'a OnceCell<HashMap<String, String>>,
    pub(crate) crypto: &'a CryptoProviders,
    pub(crate) resolved: &'a IndexMap<String, Value>,
}

impl<'a> EvalContext<'a> {
    pub(crate) fn new(
        inputs: &'a ContextInputs<'a>,
        resolved: &'a IndexMap<String, Value>,
    ) -> Self {
        EvalContext {
            env: &inputs.env,
            now: inputs.now,
            sys: &inputs.sys,
            crypto: inputs.crypto,
            resolved,
        }
    }

    /// Environment lookup against the per-parse snapshot.
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.env.get(name).map(|s| s.as_str())
    }

    /// The timestamp pinned when the parse started.
    pub fn now(&self) -> DateTime<Local> {
        self.now
    }

    /// Host introspection, snapshotted lazily once per parse.
    pub fn sys_value(&self, key: &str) -> Option<String> {
        self.sys.get_or_init(sys::snapshot).get(key).cloned()
    }

    /// Already-resolved document paths (dotted form, globals as `$name`).
    /// Useful for custom operators that cross-reference the document.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        self.resolved.get(path)
    }
}

pub(crate) fn expect_string<'v>(
    op: &str,
    args: &'v [Value],
    idx: usize,
) -> Result<&'v str, OperatorError> {
    match args.get(idx) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(OperatorError::ArgumentMismatch {
            operator: op.to_string(),
            expected: format!("a string for argument {}", idx + 1),
            got: other.type_name().to_string(),
        }),
        None => Err(OperatorError::ArgumentMismatch {
            operator: op.to_string(),
            expected: format!("argument {}", idx + 1),
            got: "nothing".to_string(),
        }),
    }
}

pub(crate) fn expect_number(op: &str, args: &[Value], idx: usize) -> Result<f64, OperatorError> {
    match args.get(idx) {
        Some(v) if v.is_number() => Ok(v.as_float().unwrap()),
        Some(other) => Err(OperatorError::ArgumentMismatch {
            operator: op.to_string(),
            expected: format!("a number for argument {}", idx + 1),
            got: other.type_name().to_string(),
        }),
        None => Err(OperatorError::ArgumentMismatch {
            operator: op.to_string(),
            expected: format!("argument {}", idx + 1),
            got: "nothing".to_string(),
        }),
    }
}

#[cfg(test)]
pub(crate) struct TestContext {
    env: HashMap<String, String>,
    now: DateTime<Local>,
    sys: OnceCell<HashMap<String, String>>,
    crypto: CryptoProviders,
    resolved: IndexMap<String, Value>,
}

#[cfg(test)]
impl TestContext {
    pub(crate) fn new() -> Self {
        use chrono::TimeZone;
        TestContext {
            env: HashMap::new(),
            now: Local.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
            sys: OnceCell::new(),
            crypto: CryptoProviders::default(),
            resolved: IndexMap::new(),
        }
    }

    pub(crate) fn set_env(&mut self, name: &str, value: &str) {
        self.env.insert(name.to_string(), value.to_string());
    }

    pub(crate) fn crypto_mut(&mut self) -> &mut CryptoProviders {
        &mut self.crypto
    }

    pub(crate) fn ctx(&self) -> EvalContext<'_> {
        EvalContext {
            env: &self.env,
            now: self.now,
            sys: &self.sys,
            crypto: &self.crypto,
            resolved: &self.resolved,
        }
    }
}
