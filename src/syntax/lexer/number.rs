//! This module implements lexing for numeric literals.

use super::{Cursor, Error, Special, TokenKind, Tokenizer};
use crate::profiler::QuollProfiler;

/// Numeric literal lexing.
///
/// Expects the cursor to sit on a digit, or on a `.` directly followed by a
/// digit. Decimal, hex, octal, binary, exponents, BigInt suffixes and `_`
/// separators all fall out of consuming `[A-Za-z0-9._]` greedily; misuse is
/// invalid source anyway and downstream tools see the full misused span.
#[derive(Debug, Clone, Copy)]
pub(super) struct NumberLiteral;

impl Tokenizer for NumberLiteral {
    fn lex(&mut self, cursor: &mut Cursor<'_>) -> Result<(TokenKind, Special), Error> {
        let _timer = QuollProfiler::global().start_event("NumberLiteral", "Lexing");

        cursor.bump(1);
        cursor.take_while(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_');

        Ok((TokenKind::Number, Special::None))
    }
}
