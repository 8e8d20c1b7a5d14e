use std::net::IpAddr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::*;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").unwrap());

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.insert("validate.email", 1, Some(1), false, Box::new(eval_email));
    registry.insert("validate.url", 1, Some(1), false, Box::new(eval_url));
    registry.insert("validate.ip", 1, Some(1), false, Box::new(eval_ip));
    registry.insert("validate.range", 3, Some(3), false, Box::new(eval_range));
    registry.insert("validate.password", 1, Some(2), false, Box::new(eval_password));
}

fn failed(rule: &str, value: &Value) -> OperatorError {
    OperatorError::ValidationFailed {
        rule: rule.to_string(),
        value: value.to_display_string(),
    }
}

fn eval_email(args: &[Value], _ctx: &EvalContext) -> Result<Value, OperatorError> {
    let input = expect_string("validate.email", args, 0)?;
    if EMAIL_RE.is_match(input) {
        Ok(args[0].clone())
    } else {
        Err(failed("email", &args[0]))
    }
}

fn eval_url(args: &[Value], _ctx: &EvalContext) -> Result<Value, OperatorError> {
    let input = expect_string("validate.url", args, 0)?;
    if URL_RE.is_match(input) {
        Ok(args[0].clone())
    } else {
        Err(failed("url", &args[0]))
    }
}

/// Accepts both IPv4 and IPv6 textual forms.
fn eval_ip(args: &[Value], _ctx: &EvalContext) -> Result<Value, OperatorError> {
    let input = expect_string("validate.ip", args, 0)?;
    if input.parse::<IpAddr>().is_ok() {
        Ok(args[0].clone())
    } else {
        Err(failed("ip", &args[0]))
    }
}

/// `@validate.range(value, min, max)` checks `min <= value <= max`.
fn eval_range(args: &[Value], _ctx: &EvalContext) -> Result<Value, OperatorError> {
    let value = expect_number("validate.range", args, 0)?;
    let min = expect_number("validate.range", args, 1)?;
    let max = expect_number("validate.range", args, 2)?;

    if min <= value && value <= max {
        Ok(args[0].clone())
    } else {
        Err(failed("range", &args[0]))
    }
}

/// `@validate.password(value, [min_len])`: at least `min_len` characters
/// (default 8), one letter and one digit.
fn eval_password(args: &[Value], _ctx: &EvalContext) -> Result<Value, OperatorError> {
    let input = expect_string("validate.password", args, 0)?;

    let min_len = match args.get(1) {
        None => 8,
        Some(Value::Integer(n)) if *n >= 0 => *n as usize,
        Some(other) => {
            return Err(OperatorError::ArgumentMismatch {
                operator: "validate.password".to_string(),
                expected: "a non-negative integer minimum length".to_string(),
                got: other.to_display_string(),
            });
        }
    };

    let long_enough = input.chars().count() >= min_len;
    let has_letter = input.chars().any(|c| c.is_alphabetic());
    let has_digit = input.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_letter && has_digit {
        Ok(args[0].clone())
    } else {
        Err(failed("password", &args[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch(name: &str, args: &[Value]) -> Result<Value, OperatorError> {
        let tc = TestContext::new();
        let registry = OperatorRegistry::with_builtins();
        registry.dispatch(name, args, &tc.ctx())
    }

    #[test]
    fn test_email_passes_through() {
        let value = Value::String("ops@example.com".into());
        assert_eq!(dispatch("validate.email", &[value.clone()]), Ok(value));
    }

    #[test]
    fn test_email_rejects() {
        let result = dispatch("validate.email", &[Value::String("not-an-email".into())]);
        assert_eq!(
            result,
            Err(OperatorError::ValidationFailed {
                rule: "email".into(),
                value: "not-an-email".into()
            })
        );
    }

    #[test]
    fn test_url() {
        let good = Value::String("https://example.com/path?q=1".into());
        assert_eq!(dispatch("validate.url", &[good.clone()]), Ok(good));

        let result = dispatch("validate.url", &[Value::String("ftp://example.com".into())]);
        assert!(matches!(result, Err(OperatorError::ValidationFailed { .. })));
    }

    #[test]
    fn test_ip_v4_and_v6() {
        let v4 = Value::String("192.168.0.1".into());
        assert_eq!(dispatch("validate.ip", &[v4.clone()]), Ok(v4));

        let v6 = Value::String("::1".into());
        assert_eq!(dispatch("validate.ip", &[v6.clone()]), Ok(v6));

        let result = dispatch("validate.ip", &[Value::String("300.0.0.1".into())]);
        assert!(matches!(result, Err(OperatorError::ValidationFailed { .. })));
    }

    #[test]
    fn test_range() {
        let args = [Value::Integer(5), Value::Integer(1), Value::Integer(10)];
        assert_eq!(dispatch("validate.range", &args), Ok(Value::Integer(5)));

        let args = [Value::Integer(15), Value::Integer(1), Value::Integer(10)];
        assert!(matches!(
            dispatch("validate.range", &args),
            Err(OperatorError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let args = [Value::Integer(10), Value::Integer(1), Value::Integer(10)];
        assert_eq!(dispatch("validate.range", &args), Ok(Value::Integer(10)));
    }

    #[test]
    fn test_password_default_policy() {
        let good = Value::String("hunter42x".into());
        assert_eq!(dispatch("validate.password", &[good.clone()]), Ok(good));

        let result = dispatch("validate.password", &[Value::String("short1".into())]);
        assert!(matches!(result, Err(OperatorError::ValidationFailed { .. })));

        let result = dispatch("validate.password", &[Value::String("lettersonly".into())]);
        assert!(matches!(result, Err(OperatorError::ValidationFailed { .. })));
    }

    #[test]
    fn test_password_custom_min_length() {
        let args = [Value::String("ab1".into()), Value::Integer(3)];
        assert_eq!(dispatch("validate.password", &args), Ok(Value::String("ab1".into())));
    }
}
