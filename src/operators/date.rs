use chrono::Duration;
use chrono::format::{Item, StrftimeItems};
use once_cell::sync::Lazy;
use regex::Regex;

use super::*;

/// Rendering used by `@date.now()` and `@date.add(...)`.
const DEFAULT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static DELTA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*([+-]?\d+)\s*(second|seconds|minute|minutes|hour|hours|day|days|week|weeks|month|months|year|years)\s*$",
    )
    .unwrap()
});

pub(super) fn register(registry: &mut OperatorRegistry) {
    registry.insert("date", 1, Some(1), false, Box::new(eval_date));
    registry.insert("date.now", 0, Some(0), false, Box::new(eval_date_now));
    registry.insert("date.add", 1, Some(1), false, Box::new(eval_date_add));
}

fn eval_date(args: &[Value], ctx: &EvalContext) -> Result<Value, OperatorError> {
    let format = expect_string("date", args, 0)?;
    render(ctx.now(), format).map(Value::String)
}

fn eval_date_now(_args: &[Value], ctx: &EvalContext) -> Result<Value, OperatorError> {
    render(ctx.now(), DEFAULT_FORMAT).map(Value::String)
}

/// `@date.add("+2 hours")`, `@date.add("-1 day")`. Weeks and smaller are
/// exact; months count as 30 days and years as 365.
fn eval_date_add(args: &[Value], ctx: &EvalContext) -> Result<Value, OperatorError> {
    let delta = expect_string("date.add", args, 0)?;

    let captures = DELTA_RE.captures(delta).ok_or_else(|| OperatorError::ArgumentMismatch {
        operator: "date.add".to_string(),
        expected: "a delta like '+2 hours' or '-1 day'".to_string(),
        got: format!("'{}'", delta),
    })?;

    let amount: i64 = captures[1].parse().map_err(|_| OperatorError::ArgumentMismatch {
        operator: "date.add".to_string(),
        expected: "a delta amount within i64 range".to_string(),
        got: format!("'{}'", &captures[1]),
    })?;

    let duration = match &captures[2] {
        "second" | "seconds" => Duration::seconds(amount),
        "minute" | "minutes" => Duration::minutes(amount),
        "hour" | "hours" => Duration::hours(amount),
        "day" | "days" => Duration::days(amount),
        "week" | "weeks" => Duration::weeks(amount),
        "month" | "months" => Duration::days(amount * 30),
        "year" | "years" => Duration::days(amount * 365),
        _ => unreachable!(),
    };

    render(ctx.now() + duration, DEFAULT_FORMAT).map(Value::String)
}

/// strftime rendering with an upfront specifier check, so a bad format is a
/// reported error instead of a panic inside `Display`.
fn render(at: DateTime<Local>, format: &str) -> Result<String, OperatorError> {
    let items: Vec<Item> = StrftimeItems::new(format).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(OperatorError::ArgumentMismatch {
            operator: "date".to_string(),
            expected: "a strftime format string".to_string(),
            got: format!("'{}'", format),
        });
    }

    Ok(at.format_with_items(items.into_iter()).to_string())
}
