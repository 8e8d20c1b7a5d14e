use super::*;

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.insert("env", 1, Some(2), false, Box::new(eval_env));
    registry.insert("env.secure", 1, Some(1), true, Box::new(eval_env_secure));
}

/// `@env("NAME")` or `@env("NAME", default)`. A variable that is set to the
/// empty string counts as present.
fn eval_env(args: &[Value], ctx: &EvalContext) -> Result<Value, OperatorError> {
    let name = expect_string("env", args, 0)?;

    match ctx.env_var(name) {
        Some(value) => Ok(Value::String(value.to_string())),
        None => match args.get(1) {
            Some(default) => Ok(default.clone()),
            None => Err(OperatorError::MissingEnvironment { name: name.to_string() }),
        },
    }
}

/// Same lookup, no default. The resolver flags the produced document path
/// for redaction.
fn eval_env_secure(args: &[Value], ctx: &EvalContext) -> Result<Value, OperatorError> {
    let name = expect_string("env.secure", args, 0)?;

    match ctx.env_var(name) {
        Some(value) => Ok(Value::String(value.to_string())),
        None => Err(OperatorError::MissingEnvironment { name: name.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_present() {
        let mut tc = TestContext::new();
        tc.set_env("APP_MODE", "staging");

        let registry = OperatorRegistry::with_builtins();
        let result = registry.dispatch("env", &[Value::String("APP_MODE".into())], &tc.ctx());
        assert_eq!(result, Ok(Value::String("staging".into())));
    }

    #[test]
    fn test_env_missing_with_default() {
        let tc = TestContext::new();
        let registry = OperatorRegistry::with_builtins();

        let args = [
            Value::String("MISSING_VAR".into()),
            Value::String("default_value".into()),
        ];
        let result = registry.dispatch("env", &args, &tc.ctx());
        assert_eq!(result, Ok(Value::String("default_value".into())));
    }

    #[test]
    fn test_env_missing_without_default() {
        let tc = TestContext::new();
        let registry = OperatorRegistry::with_builtins();

        let result = registry.dispatch("env", &[Value::String("MISSING_VAR".into())], &tc.ctx());
        assert_eq!(
            result,
            Err(OperatorError::MissingEnvironment { name: "MISSING_VAR".into() })
        );
    }

    #[test]
    fn test_env_default_keeps_its_type() {
        let tc = TestContext::new();
        let registry = OperatorRegistry::with_builtins();

        let args = [Value::String("MISSING_VAR".into()), Value::Integer(8080)];
        let result = registry.dispatch("env", &args, &tc.ctx());
        assert_eq!(result, Ok(Value::Integer(8080)));
    }

    #[test]
    fn test_env_secure_has_no_default_slot() {
        let tc = TestContext::new();
        let registry = OperatorRegistry::with_builtins();

        let args = [Value::String("KEY".into()), Value::String("fallback".into())];
        let result = registry.dispatch("env.secure", &args, &tc.ctx());
        assert!(matches!(result, Err(OperatorError::ArgumentMismatch { .. })));
    }

    #[test]
    fn test_env_name_must_be_string() {
        let tc = TestContext::new();
        let registry = OperatorRegistry::with_builtins();

        let result = registry.dispatch("env", &[Value::Integer(1)], &tc.ctx());
        assert!(matches!(result, Err(OperatorError::ArgumentMismatch { .. })));
    }

    #[test]
    fn test_secret_flag() {
        let registry = OperatorRegistry::with_builtins();
        assert!(registry.is_secret("env.secure"));
        assert!(!registry.is_secret("env"));
    }
}
