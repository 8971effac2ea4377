//! This module implements lexing for template strings.
//!
//! A template produces a STRING token per flat piece: from the opening
//! backtick (or a `}` resuming after an interpolation) up to and including
//! either the closing backtick or a `${`. The session keeps a `Template`
//! frame on the structural stack while an interpolation is open, which is
//! how a later `}` is recognized as a resume point rather than a closer.

use super::{Cursor, Error, Special, TokenKind, Tokenizer};
use crate::profiler::QuollProfiler;

/// Template string lexing.
///
/// Expects the cursor to sit on the `` ` `` or the resuming `}`. Whether the
/// produced piece left an interpolation open is visible in its final bytes
/// (`${`).
#[derive(Debug, Clone, Copy)]
pub(super) struct TemplateLiteral;

impl Tokenizer for TemplateLiteral {
    fn lex(&mut self, cursor: &mut Cursor<'_>) -> Result<(TokenKind, Special), Error> {
        let _timer = QuollProfiler::global().start_event("TemplateLiteral", "Lexing");

        cursor.bump(1); // ` or }

        loop {
            match cursor.get(0) {
                0 if cursor.is_eof() => break,
                b'\n' => {
                    cursor.bump(1);
                    cursor.bump_line();
                }
                b'\\' => match cursor.get(1) {
                    b'$' | b'`' | b'\\' => cursor.bump(2),
                    _ => cursor.bump(1),
                },
                b'$' if cursor.get(1) == b'{' => {
                    cursor.bump(2);
                    break;
                }
                b'`' => {
                    cursor.bump(1);
                    break;
                }
                _ => cursor.bump(1),
            }
        }

        Ok((TokenKind::String, Special::None))
    }
}
