//! This module implements lexing for regexp literals.

use super::{Cursor, Error, Special, TokenKind, Tokenizer};
use crate::profiler::QuollProfiler;

/// Regexp literal lexing.
///
/// Expects the cursor to sit on the opening `/` and that slash
/// disambiguation already decided in favor of a regexp. The body honors
/// `[...]` character classes (an unescaped `/` inside one does not
/// terminate) and backslash escapes; trailing flag letters are absorbed.
/// Invalid bodies are still returned as regexps, stopping best-effort at a
/// line break or end-of-buffer.
#[derive(Debug, Clone, Copy)]
pub(super) struct RegexLiteral;

impl Tokenizer for RegexLiteral {
    fn lex(&mut self, cursor: &mut Cursor<'_>) -> Result<(TokenKind, Special), Error> {
        let _timer = QuollProfiler::global().start_event("RegexLiteral", "Lexing");

        cursor.bump(1); // leading /
        let mut in_class = false;

        loop {
            match cursor.get(0) {
                0 if cursor.is_eof() => break,
                b'/' if !in_class => {
                    cursor.bump(1);
                    // eat trailing flags
                    cursor.take_while(|b| b.is_ascii_alphanumeric());
                    break;
                }
                // not valid here, bail without consuming it
                b'\n' => break,
                b'[' => {
                    in_class = true;
                    cursor.bump(1);
                }
                b']' => {
                    in_class = false;
                    cursor.bump(1);
                }
                b'\\' => match cursor.get(1) {
                    b'/' | b'[' | b'\\' => cursor.bump(2),
                    _ => cursor.bump(1),
                },
                _ => cursor.bump(1),
            }
        }

        Ok((TokenKind::Regexp, Special::None))
    }
}
