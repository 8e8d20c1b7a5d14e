use super::*;

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.insert("math.add", 2, None, false, Box::new(eval_add));
    registry.insert("math.sub", 2, None, false, Box::new(eval_sub));
    registry.insert("math.mul", 2, None, false, Box::new(eval_mul));
    registry.insert("math.div", 2, None, false, Box::new(eval_div));
    registry.insert("math.mod", 2, None, false, Box::new(eval_mod));
    registry.insert("math.pow", 2, None, false, Box::new(eval_pow));
}

/// Working representation: integers stay integers until something forces a
/// float (a float operand, or an integer overflow).
#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(n) => n,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Num::Int(n) => Value::Integer(n),
            Num::Float(n) => Value::Float(n),
        }
    }

    fn is_zero(self) -> bool {
        match self {
            Num::Int(n) => n == 0,
            Num::Float(n) => n == 0.0,
        }
    }
}

fn numeric(op: &str, args: &[Value], idx: usize) -> Result<Num, OperatorError> {
    match args.get(idx) {
        Some(Value::Integer(n)) => Ok(Num::Int(*n)),
        Some(Value::Float(n)) => Ok(Num::Float(*n)),
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

fn fold(
    op: &str,
    args: &[Value],
    int_step: fn(i64, i64) -> Option<i64>,
    float_step: fn(f64, f64) -> f64,
) -> Result<Value, OperatorError> {
    let mut acc = numeric(op, args, 0)?;

    for idx in 1..args.len() {
        let rhs = numeric(op, args, idx)?;
        acc = match (acc, rhs) {
            (Num::Int(a), Num::Int(b)) => match int_step(a, b) {
                Some(v) => Num::Int(v),
                None => Num::Float(float_step(a as f64, b as f64)),
            },
            (a, b) => Num::Float(float_step(a.as_f64(), b.as_f64())),
        };
    }

    Ok(acc.into_value())
}

fn eval_add(args: &[Value], _ctx: &EvalContext) -> Result<Value, OperatorError> {
    fold("math.add", args, i64::checked_add, |a, b| a + b)
}

fn eval_sub(args: &[Value], _ctx: &EvalContext) -> Result<Value, OperatorError> {
    fold("math.sub", args, i64::checked_sub, |a, b| a - b)
}

fn eval_mul(args: &[Value], _ctx: &EvalContext) -> Result<Value, OperatorError> {
    fold("math.mul", args, i64::checked_mul, |a, b| a * b)
}

/// Division stays an Integer only when both sides are Integers and divide
/// evenly; `@math.div(20, 4)` is `5`, `@math.div(7, 2)` is `3.5`.
fn eval_div(args: &[Value], _ctx: &EvalContext) -> Result<Value, OperatorError> {
    let mut acc = numeric("math.div", args, 0)?;

    for idx in 1..args.len() {
        let rhs = numeric("math.div", args, idx)?;
        if rhs.is_zero() {
            return Err(OperatorError::DivisionByZero { operator: "math.div".to_string() });
        }
        acc = match (acc, rhs) {
            (Num::Int(a), Num::Int(b)) if a % b == 0 => Num::Int(a / b),
            (a, b) => Num::Float(a.as_f64() / b.as_f64()),
        };
    }

    Ok(acc.into_value())
}

fn eval_mod(args: &[Value], _ctx: &EvalContext) -> Result<Value, OperatorError> {
    let mut acc = numeric("math.mod", args, 0)?;

    for idx in 1..args.len() {
        let rhs = numeric("math.mod", args, idx)?;
        if rhs.is_zero() {
            return Err(OperatorError::DivisionByZero { operator: "math.mod".to_string() });
        }
        acc = match (acc, rhs) {
            (Num::Int(a), Num::Int(b)) => Num::Int(a % b),
            (a, b) => Num::Float(a.as_f64() % b.as_f64()),
        };
    }

    Ok(acc.into_value())
}

fn eval_pow(args: &[Value], _ctx: &EvalContext) -> Result<Value, OperatorError> {
    let mut acc = numeric("math.pow", args, 0)?;

    for idx in 1..args.len() {
        let rhs = numeric("math.pow", args, idx)?;
        acc = match (acc, rhs) {
            (Num::Int(a), Num::Int(b)) if (0..=u32::MAX as i64).contains(&b) => {
                match a.checked_pow(b as u32) {
                    Some(v) => Num::Int(v),
                    None => Num::Float((a as f64).powf(b as f64)),
                }
            }
            (a, b) => Num::Float(a.as_f64().powf(b.as_f64())),
        };
    }

    Ok(acc.into_value())
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
    fn test_add_integers() {
        let result = dispatch("math.add", &[Value::Integer(2), Value::Integer(3)]);
        assert_eq!(result, Ok(Value::Integer(5)));
    }

    #[test]
    fn test_add_mixed_promotes_to_float() {
        let result = dispatch("math.add", &[Value::Integer(2), Value::Float(0.5)]);
        assert_eq!(result, Ok(Value::Float(2.5)));
    }

    #[test]
    fn test_add_variadic() {
        let args = [Value::Integer(1), Value::Integer(2), Value::Integer(3), Value::Integer(4)];
        assert_eq!(dispatch("math.add", &args), Ok(Value::Integer(10)));
    }

    #[test]
    fn test_sub_and_mul() {
        assert_eq!(
            dispatch("math.sub", &[Value::Integer(10), Value::Integer(4)]),
            Ok(Value::Integer(6))
        );
        assert_eq!(
            dispatch("math.mul", &[Value::Integer(6), Value::Integer(7)]),
            Ok(Value::Integer(42))
        );
    }

    #[test]
    fn test_div_even_stays_integer() {
        assert_eq!(
            dispatch("math.div", &[Value::Integer(20), Value::Integer(4)]),
            Ok(Value::Integer(5))
        );
    }

    #[test]
    fn test_div_uneven_promotes() {
        assert_eq!(
            dispatch("math.div", &[Value::Integer(7), Value::Integer(2)]),
            Ok(Value::Float(3.5))
        );
    }

    #[test]
    fn test_div_by_zero() {
        assert_eq!(
            dispatch("math.div", &[Value::Integer(1), Value::Integer(0)]),
            Err(OperatorError::DivisionByZero { operator: "math.div".into() })
        );
    }

    #[test]
    fn test_mod_by_zero() {
        assert_eq!(
            dispatch("math.mod", &[Value::Integer(5), Value::Integer(0)]),
            Err(OperatorError::DivisionByZero { operator: "math.mod".into() })
        );
    }

    #[test]
    fn test_mod() {
        assert_eq!(
            dispatch("math.mod", &[Value::Integer(7), Value::Integer(3)]),
            Ok(Value::Integer(1))
        );
    }

    #[test]
    fn test_pow() {
        assert_eq!(
            dispatch("math.pow", &[Value::Integer(2), Value::Integer(10)]),
            Ok(Value::Integer(1024))
        );
    }

    #[test]
    fn test_pow_negative_exponent_promotes() {
        assert_eq!(
            dispatch("math.pow", &[Value::Integer(2), Value::Integer(-1)]),
            Ok(Value::Float(0.5))
        );
    }

    #[test]
    fn test_overflow_promotes_to_float() {
        let result = dispatch("math.mul", &[Value::Integer(i64::MAX), Value::Integer(2)]);
        assert!(matches!(result, Ok(Value::Float(_))));
    }

    #[test]
    fn test_requires_two_arguments() {
        let result = dispatch("math.add", &[Value::Integer(1)]);
        assert!(matches!(result, Err(OperatorError::ArgumentMismatch { .. })));
    }

    #[test]
    fn test_rejects_non_numeric() {
        let result = dispatch("math.add", &[Value::Integer(1), Value::String("x".into())]);
        assert!(matches!(result, Err(OperatorError::ArgumentMismatch { .. })));
    }
}
