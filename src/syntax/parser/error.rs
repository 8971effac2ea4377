//! Error and result implementation for the parser.

use crate::syntax::lexer::{token::TokenKind, Error as LexError};
use std::fmt;

/// An error raised while consuming the token stream.
///
/// No error is recoverable inside a session: partial output already handed
/// to the sink remains valid up to the erroring token, and the caller's only
/// remedy is to abandon the session.
#[derive(Debug, Clone, Copy)]
pub enum ParseError {
    /// The token stream cannot be reconciled with any known production.
    Unexpected { found: TokenKind, line: u32 },
    /// A lexing error.
    Lex { err: LexError },
    /// A state the implementation considers unreachable.
    Internal { message: &'static str },
    /// A production this implementation does not cover.
    Unimplemented { message: &'static str, line: u32 },
}

impl ParseError {
    /// Creates an `Unexpected` parsing error.
    pub(super) fn unexpected(found: TokenKind, line: u32) -> Self {
        Self::Unexpected { found, line }
    }

    /// Creates an internal parsing error.
    pub(super) fn internal(message: &'static str) -> Self {
        Self::Internal { message }
    }

    /// Creates a new `Unimplemented` parsing error.
    #[allow(dead_code)]
    pub(super) fn unimplemented(message: &'static str, line: u32) -> Self {
        Self::Unimplemented { message, line }
    }

    /// Checks whether this is a plain unexpected-input error, the kind
    /// speculative lookahead treats as "not this production".
    pub(super) fn is_unexpected(&self) -> bool {
        matches!(
            self,
            Self::Unexpected { .. }
                | Self::Lex {
                    err: LexError::Unexpected { .. }
                }
        )
    }

    /// Gets the stable numeric code of the error.
    ///
    /// Unexpected input is −1, stack exhaustion −2, internal invariant
    /// violations −3 and unimplemented productions −4.
    pub fn code(&self) -> i32 {
        match self {
            Self::Unexpected { .. } => -1,
            Self::Lex { err } => match err {
                LexError::Unexpected { .. } => -1,
                LexError::Stack { .. } => -2,
                LexError::Internal { .. } => -3,
            },
            Self::Internal { .. } => -3,
            Self::Unimplemented { .. } => -4,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self::Lex { err }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unexpected { found, line } => {
                write!(f, "unexpected {} at line {}", found, line)
            }
            Self::Lex { err } => fmt::Display::fmt(err, f),
            Self::Internal { message } => write!(f, "internal error: {}", message),
            Self::Unimplemented { message, line } => {
                write!(f, "{} not implemented at line {}", message, line)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lex { err } => Some(err),
            _ => None,
        }
    }
}
