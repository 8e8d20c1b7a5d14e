use indexmap::IndexMap;

use super::*;
use super::interp::parse_string_node;
use crate::ast::RawNode;
use crate::value::Value;

pub(super) fn parse_value(parser: &mut Parser) -> Result<RawNode, IvoryError> {
    match parser.peek() {
        Some(Token::Str(_)) => parse_string_value(parser),
        Some(Token::MultilineStr(_)) => parse_multiline_value(parser),
        Some(Token::Integer(_)) | Some(Token::Float(_)) => parse_number_value(parser),
        Some(Token::Bool(_)) => parse_bool_value(parser),
        Some(Token::Null) => parse_null_value(parser),
        Some(Token::Dollar) => parse_global_ref(parser),
        Some(Token::Ident(_)) => parse_path_ref(parser),
        Some(Token::At) => parse_operator_call(parser),
        Some(Token::LBracket) => parse_array(parser),
        Some(Token::LBrace) => parse_inline_object(parser),
        _ => {
            let token = parser.bump()?;
            Err(IvoryError::InvalidToken {
                token: format!("{:?}", token),
                line: parser.line(),
                column: parser.column(),
                hint: Some("Unexpected token in value position".into()),
            })
        }
    }
}

fn parse_string_value(parser: &mut Parser) -> Result<RawNode, IvoryError> {
    if let Token::Str(s) = parser.bump()? {
        parse_string_node(parser, &s)
    } else {
        unreachable!()
    }
}

fn parse_multiline_value(parser: &mut Parser) -> Result<RawNode, IvoryError> {
    if let Token::MultilineStr(s) = parser.bump()? {
        // verbatim: `${` and `\$` mean nothing here
        Ok(RawNode::Literal(Value::String(s)))
    } else {
        unreachable!()
    }
}

fn parse_number_value(parser: &mut Parser) -> Result<RawNode, IvoryError> {
    match parser.bump()? {
        Token::Integer(n) => Ok(RawNode::Literal(Value::Integer(n))),
        Token::Float(n) => Ok(RawNode::Literal(Value::Float(n))),
        _ => unreachable!(),
    }
}

fn parse_bool_value(parser: &mut Parser) -> Result<RawNode, IvoryError> {
    if let Token::Bool(b) = parser.bump()? {
        Ok(RawNode::Literal(Value::Bool(b)))
    } else {
        unreachable!()
    }
}

fn parse_null_value(parser: &mut Parser) -> Result<RawNode, IvoryError> {
    parser.bump()?; // consume null
    Ok(RawNode::Literal(Value::Null))
}

/// `$name` and `$name.deeper.path` always refer to a global.
fn parse_global_ref(parser: &mut Parser) -> Result<RawNode, IvoryError> {
    parser.bump()?; // consume $
    let path = parse_dotted_path(parser, "identifier after '$'")?;
    Ok(RawNode::VarRef { path, global: true })
}

/// A bare identifier path: `app_name` or `database.host`.
fn parse_path_ref(parser: &mut Parser) -> Result<RawNode, IvoryError> {
    let path = parse_dotted_path(parser, "identifier")?;
    Ok(RawNode::VarRef { path, global: false })
}

fn parse_dotted_path(parser: &mut Parser, what: &str) -> Result<Vec<String>, IvoryError> {
    let mut path = vec![parser.expect_ident(what)?];

    while let Some(Token::Dot) = parser.peek() {
        parser.bump()?; // consume dot
        path.push(parser.expect_ident("identifier after '.'")?);
    }

    Ok(path)
}

/// `@name(args...)` with dot-qualified names and arbitrarily nested
/// argument expressions.
fn parse_operator_call(parser: &mut Parser) -> Result<RawNode, IvoryError> {
    parser.bump()?; // consume @
    let name = parse_dotted_path(parser, "operator name after '@'")?.join(".");
    parser.expect(Token::LParen)?;

    let mut args = Vec::new();
    loop {
        match parser.peek() {
            Some(Token::RParen) => {
                parser.bump()?;
                break;
            }
            Some(Token::Newline) => {
                parser.bump()?;
            }
            None | Some(Token::Eof) => {
                return Err(IvoryError::UnexpectedEof {
                    message: format!("Unterminated argument list for '@{}'", name),
                    line: parser.line(),
                    column: parser.column(),
                });
            }
            _ => {
                args.push(parse_value(parser)?);
            }
        }
    }

    Ok(RawNode::OperatorCall { name, args })
}

fn parse_array(parser: &mut Parser) -> Result<RawNode, IvoryError> {
    parser.bump()?; // consume [
    let mut items = Vec::new();

    loop {
        match parser.peek() {
            Some(Token::RBracket) => {
                parser.bump()?;
                break;
            }
            Some(Token::Newline) => {
                parser.bump()?;
            }
            None | Some(Token::Eof) => {
                return Err(IvoryError::UnexpectedEof {
                    message: "Array not closed, expected ']'".into(),
                    line: parser.line(),
                    column: parser.column(),
                });
            }
            _ => {
                items.push(parse_value(parser)?);
                // commas are already skipped by the lexer
            }
        }
    }

    Ok(RawNode::Array(items))
}

/// Inline object value: `{key: value, ...}`. Entries need an explicit
/// separator; block syntax is not valid inside the braces.
fn parse_inline_object(parser: &mut Parser) -> Result<RawNode, IvoryError> {
    parser.bump()?; // consume {
    let mut items: IndexMap<String, RawNode> = IndexMap::new();

    loop {
        match parser.peek() {
            Some(Token::RBrace) => {
                parser.bump()?;
                break;
            }
            Some(Token::Newline) => {
                parser.bump()?;
            }
            Some(Token::Ident(_)) | Some(Token::Str(_)) => {
                let key = match parser.bump()? {
                    Token::Ident(k) | Token::Str(k) => k,
                    _ => unreachable!(),
                };
                match parser.peek() {
                    Some(Token::Colon) | Some(Token::Equals) => {
                        parser.bump()?;
                    }
                    tok => {
                        return Err(IvoryError::SyntaxError {
                            message: format!("Expected ':' after key '{}', got {:?}", key, tok),
                            line: parser.line(),
                            column: parser.column(),
                            hint: None,
                        });
                    }
                }
                let node = parse_value(parser)?;
                super::document::merge_insert(&mut items, key, node);
            }
            None | Some(Token::Eof) => {
                return Err(IvoryError::UnexpectedEof {
                    message: "Object not closed, expected '}'".into(),
                    line: parser.line(),
                    column: parser.column(),
                });
            }
            Some(tok) => {
                return Err(IvoryError::InvalidToken {
                    token: format!("{:?}", tok),
                    line: parser.line(),
                    column: parser.column(),
                    hint: Some("Expected a key or '}'".into()),
                });
            }
        }
    }

    Ok(RawNode::Object(items))
}
