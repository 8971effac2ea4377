//! Cursor implementation for the parser.
//!
//! The cursor layers emission on top of the lexer: advancing emits the
//! current token to the sink (unless a skipped scope or a speculative parse
//! suppresses it), scope guards bracket productions with open/close events,
//! and statement terminators synthesize zero-length semicolons where ASI
//! applies.

use super::{error::ParseError, ScopeKind, Sink};
use crate::syntax::lexer::{
    token::{MiscOp, Special, SymbolFlags, Token, TokenKind},
    Lexer,
};

/// Token cursor.
///
/// This internal structure gives basic testable operations to the parser.
#[derive(Debug)]
pub(super) struct Cursor<'s, S> {
    lexer: Lexer<'s>,
    source: &'s [u8],
    sink: S,
    /// Non-zero while inside a skipped scope or a speculative parse;
    /// emission is suppressed.
    skip: u32,
    /// Line of the most recently consumed token, for ASI positioning.
    last_line: u32,
}

impl<'s, S: Sink> Cursor<'s, S> {
    /// Creates a new cursor over the given source.
    pub(super) fn new(source: &'s str, sink: S) -> Self {
        Self {
            lexer: Lexer::new(source),
            source: source.as_bytes(),
            sink,
            skip: 0,
            last_line: 1,
        }
    }

    /// Produces the first token of the session.
    pub(super) fn prime(&mut self) -> Result<(), ParseError> {
        self.lexer.next()?;
        Ok(())
    }

    /// Gets the current token.
    #[inline]
    pub(super) fn current(&self) -> &Token {
        self.lexer.current()
    }

    /// Gets mutable access to the current token for classification updates.
    #[inline]
    pub(super) fn current_mut(&mut self) -> &mut Token {
        self.lexer.current_mut()
    }

    /// Emits the current token and advances to the next one.
    pub(super) fn next(&mut self) -> Result<(), ParseError> {
        if self.skip == 0 {
            self.sink.token(self.lexer.current());
        }
        self.last_line = self.lexer.current().line();
        self.lexer.next()?;
        Ok(())
    }

    /// Peeks the token after the current one; idempotent.
    pub(super) fn peek(&mut self) -> Result<Token, ParseError> {
        Ok(*self.lexer.peek()?)
    }

    /// Asks the lexer to reinterpret the current slash token.
    pub(super) fn update(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        self.lexer.update(kind)?;
        Ok(())
    }

    /// Checks whether emission is currently suppressed.
    #[inline]
    pub(super) fn is_skipping(&self) -> bool {
        self.skip > 0
    }

    /// First significant byte of the current token.
    #[inline]
    pub(super) fn first_byte(&self) -> u8 {
        self.lexer.current().first_byte(self.source)
    }

    /// Last significant byte of the current token.
    #[inline]
    pub(super) fn last_byte(&self) -> u8 {
        self.lexer.current().last_byte(self.source)
    }

    /// The source byte immediately before the current token's trivia, i.e.
    /// the last byte of whatever was consumed before it.
    #[inline]
    pub(super) fn byte_before_trivia(&self) -> u8 {
        let at = self.lexer.current().trivia_start();
        if at == 0 {
            0
        } else {
            self.source[at - 1]
        }
    }

    /// Checks whether a token is `=` or a compound assignment.
    ///
    /// Pure comparisons (`<=`, `>=`, `==`, `===`, `!=`, `!==`) do not
    /// count.
    pub(super) fn is_assign_like(&self, token: &Token) -> bool {
        if token.special().is_op(MiscOp::Equals) {
            return true;
        }
        if token.kind() != TokenKind::Op {
            return false;
        }
        let span = token.span();
        if span.len() < 2 {
            return false;
        }
        let bytes = &self.source[span];
        if bytes[bytes.len() - 1] != b'=' || bytes[bytes.len() - 2] == b'=' {
            return false;
        }
        // <= >= != are comparisons, not assignments
        !(bytes.len() == 2 && matches!(bytes[0], b'<' | b'>' | b'!'))
    }

    /// Creates an unexpected-token error at the current position.
    pub(super) fn unexpected(&self) -> ParseError {
        ParseError::unexpected(self.current().kind(), self.current().line())
    }

    /// Brackets a production with scope open/close events.
    ///
    /// When the sink answers the open event with `true`, or an enclosing
    /// scope is already skipped, the whole production runs with emission
    /// suppressed and no close event is delivered for it.
    pub(super) fn scope<T, F>(&mut self, kind: ScopeKind, f: F) -> Result<T, ParseError>
    where
        F: FnOnce(&mut Self) -> Result<T, ParseError>,
    {
        let suppressed = if self.skip > 0 {
            self.skip += 1;
            true
        } else if self.sink.scope_open(kind) {
            self.skip = 1;
            true
        } else {
            false
        };

        let out = f(self)?;

        if suppressed {
            self.skip -= 1;
        } else {
            self.sink.scope_close(kind);
        }
        Ok(out)
    }

    /// Runs a speculative parse and rolls the session back afterwards.
    ///
    /// Emission is suppressed while the closure runs. Returns `None` when
    /// speculation is unavailable because emission is already suppressed;
    /// the caller then falls back to its non-speculative interpretation.
    pub(super) fn speculate<T, F>(&mut self, f: F) -> Result<Option<T>, ParseError>
    where
        F: FnOnce(&mut Self) -> Result<T, ParseError>,
    {
        if self.skip > 0 {
            return Ok(None);
        }
        self.lexer.set_restore()?;
        self.skip += 1;
        let out = f(self);
        self.skip -= 1;
        self.lexer.restore();
        out.map(Some)
    }

    /// Terminates a statement: consumes a same-line real `;`, or emits a
    /// zero-length ASI semicolon.
    pub(super) fn end_semicolon(&mut self) -> Result<(), ParseError> {
        if self.real_semicolon_here() {
            self.next()
        } else {
            self.insert_asi();
            Ok(())
        }
    }

    /// Consumes a same-line real `;` if one is present, without ASI.
    ///
    /// Used after declarations that need no terminator, like an exported
    /// function, where a stray semicolon still belongs to the statement.
    pub(super) fn maybe_semicolon(&mut self) -> Result<(), ParseError> {
        if self.real_semicolon_here() {
            self.next()?;
        }
        Ok(())
    }

    fn real_semicolon_here(&self) -> bool {
        let curr = self.current();
        curr.kind() == TokenKind::Semicolon
            && !curr.span().is_empty()
            && !curr.special().flags().contains(SymbolFlags::NEWLINE)
    }

    /// Emits a zero-length semicolon at the previous token's end.
    fn insert_asi(&mut self) {
        if self.skip > 0 {
            return;
        }
        let curr = self.current();
        let newline = curr.line() > self.last_line;
        let token = Token {
            trivia_start: curr.trivia_start(),
            start: curr.trivia_start(),
            len: 0,
            line: self.last_line,
            kind: TokenKind::Semicolon,
            special: if newline {
                Special::Flags(SymbolFlags::NEWLINE)
            } else {
                Special::None
            },
        };
        self.sink.token(&token);
    }

    /// Emits a token the parser synthesized itself.
    pub(super) fn emit_synthetic(&mut self, token: &Token) {
        if self.skip == 0 {
            self.sink.token(token);
        }
    }

    /// Consumes a plain string key, rejecting templated strings.
    ///
    /// A bare backtick string without interpolation is permitted.
    pub(super) fn consume_string_key(&mut self, special: Special) -> Result<(), ParseError> {
        let curr = self.current();
        if curr.kind() != TokenKind::String {
            return Err(self.unexpected());
        }
        let span = curr.span();
        let bytes = &self.source[span];
        if bytes.first() == Some(&b'`') && bytes.len() > 1 && bytes[bytes.len() - 1] != b'`' {
            // a template with interpolation cannot be a key here
            return Err(self.unexpected());
        }
        self.current_mut().special = special;
        self.next()
    }

    /// Gets the sink.
    pub(super) fn sink(&self) -> &S {
        &self.sink
    }

    /// Gets the sink mutably.
    pub(super) fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the cursor, returning the sink.
    pub(super) fn into_sink(self) -> S {
        self.sink
    }
}
