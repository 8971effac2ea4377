//! A lexical analyzer for ECMAScript source code.
//!
//! The lexer produces exactly one token per call, resolving the locally
//! ambiguous constructs (`/` as division or regexp, `{` as block or object,
//! `}` as closer or template-string resume) from two pieces of context: the
//! previously produced token and the structural stack of open delimiters.
//! The parser can override a slash guess after the fact through
//! [`Lexer::update`], and can run bounded speculative lookahead through the
//! save/restore frame.
//!
//! Trivia (whitespace and comments) is never emitted; each token records the
//! offset where its leading trivia starts.

mod comment;
mod cursor;
mod error;
mod identifier;
mod number;
mod operator;
mod regex;
mod string;
mod template;
pub mod token;


pub use error::Error;

use self::{
    cursor::Cursor, identifier::Identifier, number::NumberLiteral, operator::Operator,
    regex::RegexLiteral, string::StringLiteral, template::TemplateLiteral,
};
use crate::{
    profiler::QuollProfiler,
    syntax::keyword::KeywordRoles,
    syntax::lexer::token::{BracketKind, MiscOp, Special, SymbolFlags, Token, TokenKind},
};

/// Maximum depth of the structural stack.
const STACK_LIMIT: usize = 256;

/// Maximum number of tokens that may be lexed while a save point is active.
const LOOKAHEAD_LIMIT: usize = 16;

/// Trait implemented by the per-family token consumers.
///
/// A tokenizer is invoked with the cursor on the token's first significant
/// byte and consumes the whole token.
pub(super) trait Tokenizer {
    fn lex(&mut self, cursor: &mut Cursor<'_>) -> Result<(TokenKind, Special), Error>;
}

/// Snapshot taken by [`Lexer::set_restore`].
#[derive(Debug)]
struct SaveFrame {
    at: usize,
    line: u32,
    curr: Token,
    peek: Option<Token>,
    stack: Vec<BracketKind>,
    lexed: usize,
}

/// A lexical analyzer session over one source buffer.
///
/// Holds the current token, an optional peeked token, and the structural
/// stack. The buffer is borrowed and never mutated.
#[derive(Debug)]
pub struct Lexer<'s> {
    source: &'s [u8],
    cursor: Cursor<'s>,
    curr: Token,
    peek: Option<Token>,
    stack: Vec<BracketKind>,
    save: Option<SaveFrame>,
}

impl<'s> Lexer<'s> {
    /// Creates a lexer over the given source.
    ///
    /// The session starts on a placeholder EOF token; call [`Lexer::next`]
    /// to produce the first real one.
    pub fn new(source: &'s str) -> Self {
        let mut stack = Vec::with_capacity(STACK_LIMIT);
        stack.push(BracketKind::Block);
        Self {
            source: source.as_bytes(),
            cursor: Cursor::new(source.as_bytes()),
            curr: Token::empty(),
            peek: None,
            stack,
            save: None,
        }
    }

    /// Gets the current token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.curr
    }

    /// Gets mutable access to the current token, for parser-side promotion.
    #[inline]
    pub(crate) fn current_mut(&mut self) -> &mut Token {
        &mut self.curr
    }

    /// Advances to the next token, consuming a peeked token first if one is
    /// pending.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<TokenKind, Error> {
        self.curr = match self.peek.take() {
            Some(token) => token,
            None => self.lex_from_head()?,
        };
        Ok(self.curr.kind)
    }

    /// Peeks the token after the current one without advancing.
    ///
    /// Peeking is idempotent: two successive peeks return the same token.
    pub fn peek(&mut self) -> Result<&Token, Error> {
        if self.peek.is_none() {
            let token = self.lex_from_head()?;
            self.peek = Some(token);
        }
        Ok(self.peek.as_ref().expect("peek slot was just filled"))
    }

    /// Reinterprets the current slash token as the other kind.
    ///
    /// The slash guess is usually right, but the parser's value tracking
    /// sometimes knows better; this rewinds to the token start and
    /// re-consumes with the forced interpretation.
    pub(crate) fn update(&mut self, kind: TokenKind) -> Result<(), Error> {
        if self.peek.is_some() {
            return Err(Error::internal("reinterpreting under a pending peek"));
        }
        if self.curr.first_byte(self.source) != b'/' {
            return Err(Error::internal("reinterpreting a non-slash token"));
        }

        self.cursor.set(self.curr.start, self.curr.line);
        let special = match kind {
            TokenKind::Regexp => {
                let (kind, special) = RegexLiteral.lex(&mut self.cursor)?;
                self.curr.kind = kind;
                special
            }
            TokenKind::Op => {
                let len = if self.cursor.get(1) == b'=' { 2 } else { 1 };
                self.cursor.bump(len);
                self.curr.kind = TokenKind::Op;
                Special::None
            }
            _ => return Err(Error::internal("slash can only be op or regexp")),
        };
        self.curr.special = if self.curr.special.flags().contains(SymbolFlags::NEWLINE) {
            Special::Flags(SymbolFlags::NEWLINE)
        } else {
            special
        };
        self.curr.len = self.cursor.pos() - self.curr.start;
        Ok(())
    }

    /// Takes the save point for a speculative parse.
    ///
    /// Only one save may be active at a time: speculation never needs to
    /// nest, so nesting is treated as an internal error.
    pub(crate) fn set_restore(&mut self) -> Result<(), Error> {
        if self.save.is_some() {
            return Err(Error::internal("nested save points are not supported"));
        }
        self.save = Some(SaveFrame {
            at: self.cursor.pos(),
            line: self.cursor.line(),
            curr: self.curr,
            peek: self.peek,
            stack: self.stack.clone(),
            lexed: 0,
        });
        Ok(())
    }

    /// Rolls back to the active save point and discards it.
    pub(crate) fn restore(&mut self) {
        if let Some(frame) = self.save.take() {
            self.cursor.set(frame.at, frame.line);
            self.curr = frame.curr;
            self.peek = frame.peek;
            self.stack = frame.stack;
        }
    }

    /// Lexes one token from the consumption head.
    fn lex_from_head(&mut self) -> Result<Token, Error> {
        let _timer = QuollProfiler::global().start_event("Lexer::next()", "Lexing");

        if let Some(frame) = &mut self.save {
            frame.lexed += 1;
            if frame.lexed > LOOKAHEAD_LIMIT {
                return Err(Error::Stack {
                    line: self.cursor.line(),
                });
            }
        }

        let trivia_start = self.cursor.pos();
        let line_before = self.cursor.line();
        comment::skip_trivia(&mut self.cursor);

        let start = self.cursor.pos();
        let line = self.cursor.line();

        let (kind, mut special) = self.dispatch()?;
        if special == Special::None && line > line_before {
            special = Special::Flags(SymbolFlags::NEWLINE);
        }

        Ok(Token {
            trivia_start,
            start,
            len: self.cursor.pos() - start,
            line,
            kind,
            special,
        })
    }

    /// Routes on the first significant byte.
    fn dispatch(&mut self) -> Result<(TokenKind, Special), Error> {
        let byte = self.cursor.get(0);
        match byte {
            0 if self.cursor.is_eof() => Ok((TokenKind::Eof, Special::None)),

            b'(' => {
                self.push(BracketKind::Paren)?;
                self.cursor.bump(1);
                Ok((TokenKind::Paren, Special::None))
            }
            b'[' => {
                self.push(BracketKind::Array)?;
                self.cursor.bump(1);
                Ok((TokenKind::Array, Special::None))
            }
            b'{' => {
                let kind = self.classify_brace();
                self.push(kind)?;
                self.cursor.bump(1);
                let token_kind = if kind == BracketKind::Block {
                    TokenKind::Block
                } else {
                    TokenKind::Brace
                };
                Ok((token_kind, Special::None))
            }
            b')' | b']' | b'}' => self.lex_close(byte),

            b';' => {
                self.cursor.bump(1);
                Ok((TokenKind::Semicolon, Special::None))
            }
            b',' => {
                self.cursor.bump(1);
                Ok((TokenKind::Op, Special::Op(MiscOp::Comma)))
            }
            b':' => {
                self.cursor.bump(1);
                if self.stack.last() == Some(&BracketKind::Ternary) {
                    self.stack.pop();
                    Ok((TokenKind::Close, Special::Closed(BracketKind::Ternary)))
                } else {
                    Ok((TokenKind::Colon, Special::None))
                }
            }
            b'?' => match self.cursor.get(1) {
                b'.' => {
                    self.cursor.bump(2);
                    Ok((TokenKind::Op, Special::Op(MiscOp::Chain)))
                }
                b'?' => {
                    let len = if self.cursor.get(2) == b'=' { 3 } else { 2 };
                    self.cursor.bump(len);
                    Ok((TokenKind::Op, Special::None))
                }
                _ => {
                    self.push(BracketKind::Ternary)?;
                    self.cursor.bump(1);
                    Ok((TokenKind::Ternary, Special::None))
                }
            },
            b'.' => {
                if self.cursor.get(1).is_ascii_digit() {
                    NumberLiteral.lex(&mut self.cursor)
                } else if self.cursor.get(1) == b'.' && self.cursor.get(2) == b'.' {
                    self.cursor.bump(3);
                    Ok((TokenKind::Op, Special::Op(MiscOp::Spread)))
                } else {
                    self.cursor.bump(1);
                    Ok((TokenKind::Op, Special::Op(MiscOp::Dot)))
                }
            }
            b'/' => {
                // comments were already consumed as trivia, so this is a
                // division operator or a regexp literal
                if self.slash_is_regexp() {
                    RegexLiteral.lex(&mut self.cursor)
                } else {
                    let len = if self.cursor.get(1) == b'=' { 2 } else { 1 };
                    self.cursor.bump(len);
                    Ok((TokenKind::Op, Special::None))
                }
            }

            b'\'' | b'"' => StringLiteral.lex(&mut self.cursor),
            b'`' => {
                let out = TemplateLiteral.lex(&mut self.cursor)?;
                if self.template_left_open() {
                    self.push(BracketKind::Template)?;
                }
                Ok(out)
            }

            b'0'..=b'9' => NumberLiteral.lex(&mut self.cursor),

            b'=' | b'<' | b'>' | b'&' | b'|' | b'^' | b'~' | b'!' | b'%' | b'+' | b'-' | b'*' => {
                Operator.lex(&mut self.cursor)
            }

            b'$' | b'_' | b'#' | b'\\' => self.lex_word(),
            b if b.is_ascii_alphabetic() || b >= 0x80 => self.lex_word(),

            _ => Err(Error::Unexpected {
                byte,
                line: self.cursor.line(),
            }),
        }
    }

    /// Lexes an identifier-shaped token, with PROPERTY tagging after `.`
    /// and `?.`.
    fn lex_word(&mut self) -> Result<(TokenKind, Special), Error> {
        let property = matches!(
            self.prev().special,
            Special::Op(MiscOp::Dot) | Special::Op(MiscOp::Chain)
        );
        Identifier { property }.lex(&mut self.cursor)
    }

    /// The token immediately before the consumption head.
    #[inline]
    fn prev(&self) -> &Token {
        // `lex_from_head` only runs with an empty peek slot, so the current
        // token is always the head's predecessor
        &self.curr
    }

    /// Decides whether a `{` opens a statement block or an object literal.
    fn classify_brace(&self) -> BracketKind {
        let prev = self.prev();
        if prev.special.is_op(MiscOp::Arrow) {
            // `=> {}` is always a block
            BracketKind::Block
        } else if prev.kind == TokenKind::Colon && self.stack.last() == Some(&BracketKind::Block) {
            // `foo: {}` inside a block is a label starting a block
            BracketKind::Block
        } else if prev.kind == TokenKind::Close
            && prev.first_byte(self.source) == b')'
            && prev.line == self.cursor.line()
        {
            // `() {}` on the same line is always a body
            BracketKind::Block
        } else {
            BracketKind::Brace
        }
    }

    /// Lexes a closing delimiter, or resumes a template string.
    fn lex_close(&mut self, byte: u8) -> Result<(TokenKind, Special), Error> {
        if self.stack.len() <= 1 {
            return Err(Error::Stack {
                line: self.cursor.line(),
            });
        }

        let top = *self.stack.last().expect("stack is never empty");
        if top == BracketKind::Template && byte == b'}' {
            // this } re-enters the surrounding template string
            let out = TemplateLiteral.lex(&mut self.cursor)?;
            if !self.template_left_open() {
                self.stack.pop();
            }
            return Ok(out);
        }

        self.stack.pop();
        self.cursor.bump(1);
        Ok((TokenKind::Close, Special::Closed(top)))
    }

    /// Checks whether the template piece just consumed stopped at a `${`.
    #[inline]
    fn template_left_open(&self) -> bool {
        let end = self.cursor.pos();
        end > 0 && self.source[end - 1] == b'{'
    }

    /// Guesses slash disambiguation from the previous token.
    ///
    /// A `/` is a regexp unless the prior token can be the left operand of a
    /// division: a value word, a string (outside a template interpolation
    /// boundary), a symbol/number/regexp, or a closer that produced a value.
    /// The parser re-decides through [`Lexer::update`] when its value
    /// tracking disagrees.
    fn slash_is_regexp(&self) -> bool {
        let prev = self.prev();
        match prev.kind {
            TokenKind::Lit | TokenKind::Keyword => prev.special.word().map_or(false, |kw| {
                kw.has_role(
                    KeywordRoles::KEYWORD | KeywordRoles::REL_OP | KeywordRoles::UNARY_OP,
                )
            }),
            // a string ending in `${` opens an interpolation expression
            TokenKind::String => prev.last_byte(self.source) == b'{',
            // a closed ternary or statement block can't be divided; every
            // other closer produced a value
            TokenKind::Close => matches!(
                prev.special,
                Special::Closed(BracketKind::Ternary) | Special::Closed(BracketKind::Block)
            ),
            TokenKind::Symbol | TokenKind::Regexp | TokenKind::Number => false,
            _ => true,
        }
    }

    /// Pushes an open delimiter, enforcing the depth limit.
    fn push(&mut self, kind: BracketKind) -> Result<(), Error> {
        if self.stack.len() == STACK_LIMIT {
            return Err(Error::Stack {
                line: self.cursor.line(),
            });
        }
        self.stack.push(kind);
        Ok(())
    }
}
