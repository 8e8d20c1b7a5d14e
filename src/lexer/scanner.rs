use super::*;

/// Advance the character iterator and update line/column tracking
pub(super) fn bump(lexer: &mut Lexer) -> Option<char> {
    let curr = lexer.peek;
    if let Some(c) = curr {
        if c == '\n' {
            lexer.line += 1;
            lexer.column = 0;
        } else {
            lexer.column += 1;
        }
    }
    lexer.peek = lexer.input.next();
    curr
}

/// Look at the character after the current peek without consuming anything
pub(super) fn peek_next(lexer: &Lexer) -> Option<char> {
    lexer.input.clone().next()
}

/// Look two characters past the current peek
pub(super) fn peek_next2(lexer: &Lexer) -> Option<char> {
    let mut it = lexer.input.clone();
    it.next();
    it.next()
}

/// Skip spaces, tabs, and `#` comments. Newlines stay put.
pub(super) fn skip_whitespace_and_comments(lexer: &mut Lexer) {
    while let Some(c) = lexer.peek {
        match c {
            ' ' | '\t' | '\r' => {
                bump(lexer);
            }
            '#' => {
                // Skip comment until end of line, leave the newline itself
                while let Some(ch) = lexer.peek {
                    if ch == '\n' {
                        break;
                    }
                    bump(lexer);
                }
            }
            _ => break,
        }
    }
}
