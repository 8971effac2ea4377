//! This module implements lexing for identifiers and keyword recognition.

use super::{Cursor, Error, Special, SymbolFlags, TokenKind, Tokenizer};
use crate::{profiler::QuollProfiler, syntax::keyword::Keyword};

/// Checks for an identifier-continue byte.
///
/// Anything at or above 0x80 counts: multi-byte UTF-8 sequences are carried
/// through byte-wise without further classification.
#[inline]
pub(super) fn is_symbol_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'$' || byte == b'_' || byte >= 0x80
}

/// Identifier and keyword lexing.
///
/// Expects the cursor to sit on an identifier-start byte (letter, `$`, `_`,
/// `#` for private names, `\` beginning an escape, or any byte >= 0x80).
/// `\uXXXX` and `\u{...}` escapes are tolerated anywhere in the word; an
/// escaped word never matches a keyword. When the word follows `.` or `?.`
/// it is tagged PROPERTY and no keyword lookup happens at all.
#[derive(Debug, Clone, Copy)]
pub(super) struct Identifier {
    pub(super) property: bool,
}

impl Tokenizer for Identifier {
    fn lex(&mut self, cursor: &mut Cursor<'_>) -> Result<(TokenKind, Special), Error> {
        let _timer = QuollProfiler::global().start_event("Identifier", "Lexing");

        let start = cursor.pos();
        let mut escaped = false;

        if cursor.get(0) == b'#' {
            // private name prefix, only valid leading
            cursor.bump(1);
        }

        loop {
            let byte = cursor.get(0);
            if byte == b'\\' {
                if cursor.get(1) != b'u' {
                    break;
                }
                escaped = true;
                cursor.bump(2);
                if cursor.get(0) == b'{' {
                    cursor.bump(1);
                    loop {
                        let inner = cursor.get(0);
                        if inner == b'}' {
                            cursor.bump(1);
                            break;
                        } else if !inner.is_ascii_alphanumeric() {
                            return Err(Error::Unexpected {
                                byte: inner,
                                line: cursor.line(),
                            });
                        }
                        cursor.bump(1);
                    }
                }
                // bare \uXXXX hex digits are plain symbol bytes, the loop
                // below eats them
                continue;
            }
            if !is_symbol_byte(byte) {
                break;
            }
            cursor.bump(1);
        }

        if cursor.pos() == start {
            return Err(Error::Unexpected {
                byte: cursor.get(0),
                line: cursor.line(),
            });
        }

        let special = if self.property {
            Special::Flags(SymbolFlags::PROPERTY)
        } else if escaped {
            Special::None
        } else {
            match Keyword::lookup(cursor.slice_from(start)) {
                Some(kw) => Special::Word(kw),
                None => Special::None,
            }
        };

        Ok((TokenKind::Lit, special))
    }
}
