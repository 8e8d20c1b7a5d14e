use indexmap::IndexMap;

use super::*;
use crate::ast::RawNode;
use super::value::parse_value;

/// Top-level grammar. The three dialects meet here: `[section]` headers open
/// an implicit object that runs until the next header, while `name { ... }`
/// and `name > ... <` blocks are explicitly delimited and freely nestable.
pub(super) fn parse_document(parser: &mut Parser) -> Result<RawDocument, IvoryError> {
    let mut doc = RawDocument::default();
    let mut section: Option<String> = None;

    loop {
        match parser.peek() {
            None | Some(Token::Eof) => break,
            Some(Token::Newline) => {
                parser.bump()?;
            }
            Some(Token::Dollar) => {
                if section.is_some() {
                    return Err(IvoryError::SyntaxError {
                        message: "Global declarations must appear before the first section header"
                            .into(),
                        line: parser.line(),
                        column: parser.column(),
                        hint: Some("Move the $name declaration to the top of the document".into()),
                    });
                }
                parser.bump()?; // consume $
                let name = parser.expect_ident("identifier after '$'")?;
                expect_separator(parser)?;
                let node = parse_value(parser)?;
                doc.globals.insert(name, node);
            }
            Some(Token::LBracket) => {
                parser.bump()?; // consume [
                let name = parser.expect_ident("section name")?;
                parser.expect(Token::RBracket)?;

                // reopening a section merges into the existing object
                if !matches!(doc.root.get(&name), Some(RawNode::Object(_))) {
                    doc.root.insert(name.clone(), RawNode::Object(IndexMap::new()));
                }
                section = Some(name);
            }
            Some(Token::Ident(_)) | Some(Token::Str(_)) => {
                let (key, node) = parse_entry(parser)?;
                match &section {
                    Some(name) => {
                        if let Some(RawNode::Object(items)) = doc.root.get_mut(name) {
                            merge_insert(items, key, node);
                        }
                    }
                    None => merge_insert(&mut doc.root, key, node),
                }
            }
            Some(tok) => {
                return Err(IvoryError::InvalidToken {
                    token: format!("{:?}", tok),
                    line: parser.line(),
                    column: parser.column(),
                    hint: Some("Unexpected token at top-level".into()),
                });
            }
        }
    }

    Ok(doc)
}

/// `key: value`, `key = value`, `key { ... }`, or `key > ... <`.
pub(super) fn parse_entry(parser: &mut Parser) -> Result<(String, RawNode), IvoryError> {
    let key = match parser.bump()? {
        Token::Ident(k) => k,
        Token::Str(k) => k,
        token => {
            return Err(IvoryError::SyntaxError {
                message: format!("Expected key, got {:?}", token),
                line: parser.line(),
                column: parser.column(),
                hint: None,
            });
        }
    };

    match parser.peek() {
        Some(Token::Colon) | Some(Token::Equals) => {
            parser.bump()?;
            let node = parse_value(parser)?;
            Ok((key, node))
        }
        Some(Token::LBrace) => {
            parser.bump()?;
            let node = parse_block(parser, Token::RBrace)?;
            Ok((key, node))
        }
        Some(Token::Greater) => {
            parser.bump()?;
            let node = parse_block(parser, Token::Less)?;
            Ok((key, node))
        }
        tok => Err(IvoryError::SyntaxError {
            message: format!("Expected ':', '=', '{{' or '>' after key '{}', got {:?}", key, tok),
            line: parser.line(),
            column: parser.column(),
            hint: None,
        }),
    }
}

/// Body of a delimited block. Styles mix freely at different depths, so the
/// closer is just whichever token matches the opener.
fn parse_block(parser: &mut Parser, closer: Token) -> Result<RawNode, IvoryError> {
    let mut items: IndexMap<String, RawNode> = IndexMap::new();

    loop {
        match parser.peek() {
            Some(tok) if *tok == closer => {
                parser.bump()?;
                break;
            }
            Some(Token::Newline) => {
                parser.bump()?;
            }
            Some(Token::Ident(_)) | Some(Token::Str(_)) => {
                let (key, node) = parse_entry(parser)?;
                merge_insert(&mut items, key, node);
            }
            Some(Token::Dollar) => {
                return Err(IvoryError::SyntaxError {
                    message: "Global declarations are only legal at the document's outermost scope"
                        .into(),
                    line: parser.line(),
                    column: parser.column(),
                    hint: Some("Declare $name at the top of the document and reference it here".into()),
                });
            }
            None | Some(Token::Eof) => {
                return Err(IvoryError::UnexpectedEof {
                    message: format!("Block not closed, expected {:?}", closer),
                    line: parser.line(),
                    column: parser.column(),
                });
            }
            Some(tok) => {
                return Err(IvoryError::InvalidToken {
                    token: format!("{:?}", tok),
                    line: parser.line(),
                    column: parser.column(),
                    hint: Some("Expected a key or the block closer".into()),
                });
            }
        }
    }

    Ok(RawNode::Object(items))
}

fn expect_separator(parser: &mut Parser) -> Result<(), IvoryError> {
    match parser.peek() {
        Some(Token::Colon) | Some(Token::Equals) => {
            parser.bump()?;
            Ok(())
        }
        tok => Err(IvoryError::SyntaxError {
            message: format!("Expected ':' or '=', got {:?}", tok),
            line: parser.line(),
            column: parser.column(),
            hint: None,
        }),
    }
}

/// Duplicate keys are last-write-wins; two objects under the same key merge
/// key-by-key so a reopened section behaves the same in every dialect.
pub(super) fn merge_insert(map: &mut IndexMap<String, RawNode>, key: String, node: RawNode) {
    match node {
        RawNode::Object(incoming) => {
            let mergeable = matches!(map.get(&key), Some(RawNode::Object(_)));
            if mergeable {
                if let Some(RawNode::Object(existing)) = map.get_mut(&key) {
                    for (k, v) in incoming {
                        merge_insert(existing, k, v);
                    }
                }
            } else {
                map.insert(key, RawNode::Object(incoming));
            }
        }
        other => {
            map.insert(key, other);
        }
    }
}
