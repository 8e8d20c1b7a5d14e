use super::*;

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.insert("if", 3, Some(3), false, Box::new(eval_if));
}

/// Truthiness table applied to `@if` conditions: `false`, `0`, `0.0`, `""`,
/// `null`, and empty arrays/objects are false; everything else is true.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Integer(n) => *n != 0,
        Value::Float(n) => *n != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(items) => !items.is_empty(),
    }
}

/// `@if(condition, then, else)`. Argument resolution is bottom-up, so both
/// branches are already resolved when this runs; there is no short-circuit.
fn eval_if(args: &[Value], _ctx: &EvalContext) -> Result<Value, OperatorError> {
    if truthy(&args[0]) {
        Ok(args[1].clone())
    } else {
        Ok(args[2].clone())
    }
}
