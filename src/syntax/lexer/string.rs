//! This module implements lexing for plain string literals (`'...'` and
//! `"..."`).

use super::{Cursor, Error, Special, TokenKind, Tokenizer};
use crate::profiler::QuollProfiler;

/// Plain string lexing.
///
/// Expects the cursor to sit on the opening quote. Only the quote character
/// and the backslash can be escaped; a backslash before a line break
/// continues the string onto the next line, and a raw line break is
/// tolerated (it is invalid source, but there is nothing better to do with
/// it). An unterminated string consumes to end-of-buffer.
#[derive(Debug, Clone, Copy)]
pub(super) struct StringLiteral;

impl Tokenizer for StringLiteral {
    fn lex(&mut self, cursor: &mut Cursor<'_>) -> Result<(TokenKind, Special), Error> {
        let _timer = QuollProfiler::global().start_event("StringLiteral", "Lexing");

        let quote = cursor.get(0);
        cursor.bump(1);

        loop {
            match cursor.get(0) {
                0 if cursor.is_eof() => break,
                b'\n' => {
                    cursor.bump(1);
                    cursor.bump_line();
                }
                b'\\' => {
                    let escaped = cursor.get(1);
                    if escaped == quote || escaped == b'\\' {
                        cursor.bump(2);
                    } else {
                        cursor.bump(1);
                    }
                }
                b if b == quote => {
                    cursor.bump(1);
                    break;
                }
                _ => cursor.bump(1),
            }
        }

        Ok((TokenKind::String, Special::None))
    }
}
