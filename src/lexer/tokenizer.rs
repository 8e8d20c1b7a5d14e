use super::*;
use super::scanner::{bump, peek_next, peek_next2, skip_whitespace_and_comments};

pub(super) fn next_token(lexer: &mut Lexer) -> Result<Token, IvoryError> {
    skip_whitespace_and_comments(lexer);

    match lexer.peek {
        Some('\n') => tokenize_symbol(lexer, Token::Newline),
        Some(':') => tokenize_symbol(lexer, Token::Colon),
        Some('=') => tokenize_symbol(lexer, Token::Equals),
        Some('[') => tokenize_symbol(lexer, Token::LBracket),
        Some(']') => tokenize_symbol(lexer, Token::RBracket),
        Some('{') => tokenize_symbol(lexer, Token::LBrace),
        Some('}') => tokenize_symbol(lexer, Token::RBrace),
        Some('>') => tokenize_symbol(lexer, Token::Greater),
        Some('<') => tokenize_symbol(lexer, Token::Less),
        Some('(') => tokenize_symbol(lexer, Token::LParen),
        Some(')') => tokenize_symbol(lexer, Token::RParen),
        Some(',') => {
            bump(lexer);
            next_token(lexer) // commas separate like whitespace
        }
        Some('$') => tokenize_symbol(lexer, Token::Dollar),
        Some('.') => tokenize_symbol(lexer, Token::Dot),
        Some('@') => tokenize_symbol(lexer, Token::At),
        Some('"') if peek_next(lexer) == Some('"') && peek_next2(lexer) == Some('"') => {
            tokenize_multiline_string(lexer)
        }
        Some('"') | Some('\'') => tokenize_string(lexer),
        Some('-') if peek_next(lexer).is_some_and(|c| c.is_ascii_digit()) => {
            tokenize_number(lexer)
        }
        Some(c) if c.is_ascii_digit() => tokenize_number(lexer),
        Some(c) if c.is_alphabetic() || c == '_' => tokenize_identifier_or_keyword(lexer),
        Some(ch) => {
            bump(lexer);
            Err(IvoryError::UnexpectedCharacter {
                character: ch,
                line: lexer.line,
                column: lexer.column,
            })
        }
        None => Ok(Token::Eof),
    }
}

fn tokenize_symbol(lexer: &mut Lexer, token: Token) -> Result<Token, IvoryError> {
    bump(lexer);
    Ok(token)
}

fn tokenize_string(lexer: &mut Lexer) -> Result<Token, IvoryError> {
    let quote = bump(lexer).unwrap();
    let mut content = String::new();
    let mut closed = false;

    while let Some(ch) = lexer.peek {
        if ch == quote {
            bump(lexer); // consume the closing quote
            closed = true;
            break;
        }

        if ch == '\n' {
            // single-line strings must close on their own line
            break;
        }

        if ch == '\\' {
            bump(lexer); // consume '\'
            match bump(lexer) {
                Some('n') => content.push('\n'),
                Some('t') => content.push('\t'),
                Some('r') => content.push('\r'),
                Some('\\') => content.push('\\'),
                Some('"') => content.push('"'),
                Some('\'') => content.push('\''),
                Some('{') => content.push('{'),
                Some('}') => content.push('}'),
                // `\$` stays escaped in the token so the interpolation
                // splitter can tell it apart from a real `${` marker
                Some('$') => content.push_str("\\$"),
                Some(other) => content.push(other),
                None => {
                    return Err(IvoryError::UnclosedString {
                        quote,
                        line: lexer.line,
                        column: lexer.column,
                    });
                }
            }
        } else {
            content.push(ch);
            bump(lexer);
        }
    }

    if !closed {
        return Err(IvoryError::UnclosedString {
            quote,
            line: lexer.line,
            column: lexer.column,
        });
    }

    Ok(Token::Str(content))
}

/// `"""..."""` blocks are verbatim: no escapes, no interpolation. A single
/// leading and trailing newline are trimmed so the opening quotes can sit
/// on their own line.
fn tokenize_multiline_string(lexer: &mut Lexer) -> Result<Token, IvoryError> {
    bump(lexer);
    bump(lexer);
    bump(lexer); // consume `"""`

    let mut content = String::new();
    loop {
        match lexer.peek {
            Some('"') if peek_next(lexer) == Some('"') && peek_next2(lexer) == Some('"') => {
                bump(lexer);
                bump(lexer);
                bump(lexer);
                break;
            }
            Some(ch) => {
                content.push(ch);
                bump(lexer);
            }
            None => {
                return Err(IvoryError::UnclosedString {
                    quote: '"',
                    line: lexer.line,
                    column: lexer.column,
                });
            }
        }
    }

    let mut trimmed = content.as_str();
    if let Some(rest) = trimmed.strip_prefix('\n') {
        trimmed = rest;
    }
    if let Some(rest) = trimmed.strip_suffix('\n') {
        trimmed = rest;
    }

    Ok(Token::MultilineStr(trimmed.to_string()))
}

fn tokenize_number(lexer: &mut Lexer) -> Result<Token, IvoryError> {
    let mut num = String::new();
    let mut is_float = false;

    if lexer.peek == Some('-') {
        num.push('-');
        bump(lexer);
    }

    while let Some(ch) = lexer.peek {
        if ch.is_ascii_digit() {
            num.push(ch);
            bump(lexer);
        } else {
            break;
        }
    }

    // fractional part only when the dot is followed by a digit, so dotted
    // paths stay untouched
    if lexer.peek == Some('.') && peek_next(lexer).is_some_and(|c| c.is_ascii_digit()) {
        is_float = true;
        num.push('.');
        bump(lexer);
        while let Some(ch) = lexer.peek {
            if ch.is_ascii_digit() {
                num.push(ch);
                bump(lexer);
            } else {
                break;
            }
        }
    }

    if matches!(lexer.peek, Some('e') | Some('E')) {
        let after_e = peek_next(lexer);
        let has_exponent = match after_e {
            Some(c) if c.is_ascii_digit() => true,
            Some('+') | Some('-') => peek_next2(lexer).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        };
        if has_exponent {
            is_float = true;
            num.push(bump(lexer).unwrap()); // e/E
            if matches!(lexer.peek, Some('+') | Some('-')) {
                num.push(bump(lexer).unwrap());
            }
            while let Some(ch) = lexer.peek {
                if ch.is_ascii_digit() {
                    num.push(ch);
                    bump(lexer);
                } else {
                    break;
                }
            }
        }
    }

    if !is_float {
        // out-of-range integers fall back to float
        if let Ok(n) = num.parse::<i64>() {
            return Ok(Token::Integer(n));
        }
    }

    num.parse::<f64>()
        .map(Token::Float)
        .map_err(|_| IvoryError::SyntaxError {
            message: format!("Invalid number '{}'", num),
            line: lexer.line,
            column: lexer.column,
            hint: None,
        })
}

fn tokenize_identifier_or_keyword(lexer: &mut Lexer) -> Result<Token, IvoryError> {
    let mut ident = String::new();

    while let Some(ch) = lexer.peek {
        if ch.is_alphanumeric() || ch == '_' || ch == '-' {
            ident.push(ch);
            bump(lexer);
        } else {
            break;
        }
    }

    let token = match ident.as_str() {
        "true" => Token::Bool(true),
        "false" => Token::Bool(false),
        "null" => Token::Null,
        _ => Token::Ident(ident),
    };

    Ok(token)
}
