use super::*;
use crate::ast::{Fragment, RawNode};
use crate::value::Value;

/// Split a quoted string into literal text and `${path}` fragments.
///
/// The lexer leaves `\$` escaped so it can be told apart from a real
/// interpolation marker here; it collapses to a plain `$` in the output.
/// A `$` not followed by `{` is literal text.
pub(super) fn parse_string_node(parser: &Parser, s: &str) -> Result<RawNode, IvoryError> {
    if !s.contains('$') {
        return Ok(RawNode::Literal(Value::String(s.to_string())));
    }

    let mut fragments: Vec<Fragment> = Vec::new();
    let mut text = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'$') => {
                chars.next();
                text.push('$');
            }
            '$' if chars.peek() == Some(&'{') => {
                chars.next(); // consume {
                let mut inner = String::new();
                let mut closed = false;
                for ch in chars.by_ref() {
                    if ch == '}' {
                        closed = true;
                        break;
                    }
                    inner.push(ch);
                }
                if !closed {
                    return Err(IvoryError::SyntaxError {
                        message: "Unterminated '${' in string".into(),
                        line: parser.line(),
                        column: parser.column(),
                        hint: Some("Close the interpolation with '}'".into()),
                    });
                }

                let path = parse_interp_path(parser, inner.trim())?;
                if !text.is_empty() {
                    fragments.push(Fragment::Text(std::mem::take(&mut text)));
                }
                fragments.push(Fragment::Ref(path));
            }
            _ => text.push(c),
        }
    }

    if fragments.is_empty() {
        return Ok(RawNode::Literal(Value::String(text)));
    }
    if !text.is_empty() {
        fragments.push(Fragment::Text(text));
    }

    Ok(RawNode::Interp(fragments))
}

fn parse_interp_path(parser: &Parser, raw: &str) -> Result<Vec<String>, IvoryError> {
    let segments: Vec<&str> = raw.split('.').collect();

    let valid = !raw.is_empty()
        && segments.iter().all(|seg| {
            !seg.is_empty()
                && seg
                    .chars()
                    .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        });

    if !valid {
        return Err(IvoryError::SyntaxError {
            message: format!("Invalid reference path '${{{}}}' in string", raw),
            line: parser.line(),
            column: parser.column(),
            hint: Some("Use '${name}' or '${section.key}'".into()),
        });
    }

    Ok(segments.into_iter().map(String::from).collect())
}
