//! The streaming parser.
//!
//! The parser consumes one top-level statement per [`Parser::run`] call,
//! pulling tokens through the lexer, promoting every identifier-shaped
//! token to its final classification, and emitting the stream to a caller
//! supplied [`Sink`] together with nested scope open/close events. It never
//! builds a syntax tree; the scope events mirror the structural grammar so
//! downstream tools can reconstruct as much of it as they need.

mod cursor;
mod error;
mod expression;
mod function;
mod module;
mod statement;

#[cfg(test)]
mod tests;

pub use error::ParseError;

use self::{
    cursor::Cursor,
    statement::{Statement, StatementMode},
};
use crate::{
    profiler::QuollProfiler,
    syntax::lexer::token::{Token, TokenKind},
};

/// The kind of a syntactic region bracketed by scope events.
///
/// The discriminants are the stable wire values reported to consumers.
#[cfg_attr(feature = "deser", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum ScopeKind {
    /// An expression, including each clause of a `for` header.
    Expr = 1,
    /// A `var`/`let`/`const` declaration list.
    Declare = 2,
    /// A control statement including its header and body.
    Control = 3,
    /// A `{}` statement block.
    Block = 4,
    /// A function of any flavor, arrow functions included.
    Function = 5,
    /// A class of any flavor.
    Class = 6,
    /// `continue`, `break`, `return`, `throw`, `debugger` or an empty
    /// statement.
    Misc = 7,
    /// A label statement, or a `case`/`default` clause.
    Label = 8,
    /// An `export` of local declarations.
    Export = 9,
    /// An `import` or re-export that names another module.
    Module = 10,
    /// The inside of a function or class, which defines a top-level scope.
    Inner = 11,
}

impl ScopeKind {
    /// Gets the stable wire value of the scope kind.
    #[inline]
    pub fn wire(self) -> u8 {
        self as u8
    }
}

/// The consumer of the emitted stream.
///
/// Callbacks must not re-enter the parser. Tokens are short-lived views
/// into the source; copy out anything worth keeping.
pub trait Sink {
    /// Called once per emitted token, zero-length ASI semicolons included.
    fn token(&mut self, token: &Token);

    /// Called immediately before the first token of a scope.
    ///
    /// Returning `true` runs the whole scope in skip mode: its tokens and
    /// inner scope events are suppressed, which makes fast traversal of
    /// unneeded subtrees cheap.
    fn scope_open(&mut self, scope: ScopeKind) -> bool {
        let _ = scope;
        false
    }

    /// Called immediately after the last token of a scope.
    fn scope_close(&mut self, scope: ScopeKind);
}

/// Trait implemented by parsers of one production each.
trait TokenParser<S: Sink>: Sized {
    /// The resulting value of the production.
    type Output;

    /// Parses the production, consuming tokens through the cursor.
    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<Self::Output, ParseError>;
}

/// A lexer-parser session over one source buffer.
///
/// The session owns all scratch state (structural stack, lookahead buffer,
/// skip counter); dropping it releases everything. Sessions are
/// independent: any number may run in parallel as long as each owns its own
/// state.
pub struct Parser<'s, S: Sink> {
    cursor: Cursor<'s, S>,
    primed: bool,
}

impl<S: Sink> std::fmt::Debug for Parser<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("cursor", &self.cursor.current())
            .finish()
    }
}

impl<'s, S: Sink> Parser<'s, S> {
    /// Creates a session over the given source.
    ///
    /// A `#!` shebang on line 1 is recognized and attached to the first
    /// token as trivia.
    pub fn new(source: &'s str, sink: S) -> Self {
        Self {
            cursor: Cursor::new(source, sink),
            primed: false,
        }
    }

    /// Consumes one top-level statement.
    ///
    /// Returns the number of source bytes consumed (non-zero on progress),
    /// `Ok(0)` at end of input, or the first error encountered. After an
    /// error the session must be abandoned.
    pub fn run(&mut self) -> Result<usize, ParseError> {
        let _timer = QuollProfiler::global().start_event("Parser::run()", "Parsing");

        if !self.primed {
            self.cursor.prime()?;
            self.primed = true;
        }

        if self.cursor.current().kind() == TokenKind::Eof {
            return Ok(0);
        }
        let head = self.cursor.current().span().start;

        Statement::new(StatementMode::Top).parse(&mut self.cursor)?;

        let len = self.cursor.current().span().start - head;
        if len == 0 && self.cursor.current().kind() != TokenKind::Eof {
            return Err(self.cursor.unexpected());
        }
        Ok(len)
    }

    /// Consumes statements until end of input.
    pub fn run_to_end(&mut self) -> Result<(), ParseError> {
        while self.run()? > 0 {}
        Ok(())
    }

    /// Gets the current token.
    ///
    /// After an error this points at the token where the error was
    /// detected.
    pub fn cursor(&self) -> &Token {
        self.cursor.current()
    }

    /// Gets the sink.
    pub fn sink(&self) -> &S {
        self.cursor.sink()
    }

    /// Gets the sink mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        self.cursor.sink_mut()
    }

    /// Consumes the session, returning the sink.
    pub fn into_sink(self) -> S {
        self.cursor.into_sink()
    }
}
