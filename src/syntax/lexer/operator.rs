//! This module implements lexing for punctuation operators.

use super::{Cursor, Error, MiscOp, Special, TokenKind, Tokenizer};
use crate::profiler::QuollProfiler;

/// Operator lexing with longest-match.
///
/// Expects the cursor to sit on the operator's first byte. Repetition of
/// the leading byte is bounded per family (1 for `= & | ^ ~ ! % + -`, 2 for
/// `* <`, 3 for `>`), then an `=` suffix is absorbed where legal, covering
/// everything from `+` up to `>>>=`, `===` and `!==`. Operators the parser
/// steers on get a [`MiscOp`] identity.
#[derive(Debug, Clone, Copy)]
pub(super) struct Operator;

impl Tokenizer for Operator {
    fn lex(&mut self, cursor: &mut Cursor<'_>) -> Result<(TokenKind, Special), Error> {
        let _timer = QuollProfiler::global().start_event("Operator", "Lexing");

        let initial = cursor.get(0);
        let allowed: usize = match initial {
            b'*' | b'<' => 2,
            b'>' => 3,
            b'=' | b'&' | b'|' | b'^' | b'~' | b'!' | b'%' | b'+' | b'-' => 1,
            _ => return Err(Error::internal("operator lexer got a non-operator byte")),
        };

        let mut len = 1;
        let mut next = cursor.get(1);
        while len < allowed && next == initial {
            len += 1;
            next = cursor.get(len);
        }

        let mut special = Special::None;
        if len == 1 {
            match initial {
                b'*' if next != b'=' => special = Special::Op(MiscOp::Star),
                b'~' => special = Special::Op(MiscOp::BitNot),
                b'!' if next != b'=' => special = Special::Op(MiscOp::Not),
                _ => {
                    if initial == b'=' && next == b'>' {
                        len = 2;
                        special = Special::Op(MiscOp::Arrow);
                    } else if next == initial && (next == b'+' || next == b'-') {
                        // pre or postfix is the parser's problem
                        len = 2;
                        special = Special::Op(MiscOp::IncDec);
                    } else if next == initial && (next == b'|' || next == b'&') {
                        // || or && plus the logical-assignment suffix
                        len = 2;
                        if cursor.get(2) == b'=' {
                            len = 3;
                        }
                    } else if next == b'=' {
                        // consume a suffix '=' (or whole ===, !==)
                        len = 2;
                        if cursor.get(2) == b'=' && (initial == b'=' || initial == b'!') {
                            len = 3;
                        }
                    } else if initial == b'=' {
                        special = Special::Op(MiscOp::Equals);
                    }
                }
            }
        } else if next == b'=' {
            // for the 2 and 3-repeat families, allow = as suffix
            len += 1;
        }

        cursor.bump(len);
        Ok((TokenKind::Op, special))
    }
}
