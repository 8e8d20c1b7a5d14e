use super::*;

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.insert("hash", 2, Some(2), false, Box::new(eval_hash));
    registry.insert("encrypt", 2, Some(2), false, Box::new(eval_encrypt));
}

/// `@hash(value, algorithm)`. The engine implements no digests itself; it
/// routes to whatever provider was registered under the algorithm name.
fn eval_hash(args: &[Value], ctx: &EvalContext) -> Result<Value, OperatorError> {
    let input = expect_string("hash", args, 0)?;
    let algorithm = expect_string("hash", args, 1)?;

    let provider = ctx.crypto.hash_provider(algorithm).ok_or_else(|| {
        OperatorError::UnknownAlgorithm { algorithm: algorithm.to_string() }
    })?;

    Ok(Value::String(provider(input)))
}

fn eval_encrypt(args: &[Value], ctx: &EvalContext) -> Result<Value, OperatorError> {
    let input = expect_string("encrypt", args, 0)?;
    let algorithm = expect_string("encrypt", args, 1)?;

    let provider = ctx.crypto.encrypt_provider(algorithm).ok_or_else(|| {
        OperatorError::UnknownAlgorithm { algorithm: algorithm.to_string() }
    })?;

    Ok(Value::String(provider(input)))
}
