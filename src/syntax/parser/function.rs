//! Function, class, parameter-list and destructuring parsing.

use super::{
    cursor::Cursor,
    error::ParseError,
    expression::{Dict, ExprGroup, Expression},
    statement::{Statement, StatementMode},
    ScopeKind, Sink, TokenParser,
};
use crate::{
    profiler::QuollProfiler,
    syntax::keyword::Keyword,
    syntax::lexer::token::{MiscOp, Special, SymbolFlags, Token, TokenKind},
};

/// Consumes the name of a function or class.
///
/// Sometimes it's just a name, not a declaration; and when a declaration
/// has no name at all (`export default function() {}`), a zero-length
/// symbol is synthesized so consumers still see the binding site.
fn defn_name<S: Sink>(cursor: &mut Cursor<'_, S>, special: SymbolFlags) -> Result<(), ParseError> {
    if cursor.current().special().is_word(Keyword::Extends)
        || cursor.current().kind() != TokenKind::Lit
    {
        if !special.is_empty() {
            let curr = *cursor.current();
            let synthetic = Token {
                trivia_start: curr.trivia_start(),
                start: curr.span().start,
                len: 0,
                line: curr.line(),
                kind: TokenKind::Symbol,
                special: Special::Flags(special),
            };
            cursor.emit_synthetic(&synthetic);
            // the leading trivia now belongs to the synthetic name
            cursor.current_mut().trivia_start = curr.span().start;
        }
        return Ok(());
    }

    if !special.is_empty() {
        // this is a decl so the name is important
        let curr = cursor.current_mut();
        curr.kind = TokenKind::Symbol;
        curr.special = Special::Flags(special);
    } else {
        // otherwise, it's actually just a lit
        cursor.current_mut().special = Special::None;
    }
    cursor.next()
}

/// Consumes a single optional binding: a name or a destructuring pattern.
///
/// Used for parameters, catch bindings and declaration heads. Consuming
/// nothing is fine unless a spread prefix was seen.
pub(super) fn optional_definition<S: Sink>(
    cursor: &mut Cursor<'_, S>,
    special: SymbolFlags,
) -> Result<(), ParseError> {
    let is_spread = cursor.current().special().is_op(MiscOp::Spread);
    if is_spread {
        cursor.next()?;
    }

    match cursor.current().kind() {
        TokenKind::Symbol | TokenKind::Lit => {
            // nb. might be a reserved word ("this"), which is just invalid
            let mut flags = SymbolFlags::DECLARE | special;

            // look for assignment, incredibly likely, but check anyway
            let peek = cursor.peek()?;
            if peek.special().is_word(Keyword::In)
                || peek.special().is_word(Keyword::Of)
                || peek.special().is_op(MiscOp::Equals)
            {
                flags |= SymbolFlags::CHANGE;
            }

            let curr = cursor.current_mut();
            curr.kind = TokenKind::Symbol;
            curr.special = Special::Flags(flags);
            cursor.next()?;
        }
        TokenKind::Brace | TokenKind::Array => {
            Destructuring::new(special | SymbolFlags::DECLARE).parse(cursor)?;
        }
        _ => {
            if is_spread {
                return Err(cursor.unexpected());
            }
            // can't consume this, fine
        }
    }
    Ok(())
}

/// Consumes an optional `= <expr>` default, wrapped in an EXPR scope.
pub(super) fn optional_assign_suffix<S: Sink>(
    cursor: &mut Cursor<'_, S>,
    is_statement: bool,
) -> Result<(), ParseError> {
    if cursor.current().special().is_op(MiscOp::Equals) {
        cursor.next()?;
        cursor.scope(ScopeKind::Expr, |cursor| {
            Expression::new(is_statement).parse(cursor)
        })?;
    }
    Ok(())
}

/// Reads comma-separated definitions with optional defaults.
///
/// Does not create a scope of its own.
#[derive(Debug, Clone, Copy)]
pub(super) struct DefinitionList {
    special: SymbolFlags,
    is_statement: bool,
}

impl DefinitionList {
    /// Creates a new `DefinitionList` parser.
    pub(super) fn new(special: SymbolFlags, is_statement: bool) -> Self {
        Self {
            special,
            is_statement,
        }
    }
}

impl<S> TokenParser<S> for DefinitionList
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        loop {
            optional_definition(cursor, self.special)?;
            optional_assign_suffix(cursor, self.is_statement)?;
            if !cursor.current().special().is_op(MiscOp::Comma) {
                return Ok(());
            }
            cursor.next()?;
        }
    }
}

/// Reads a parenthesized parameter list, as found on functions of every
/// flavor.
#[derive(Debug, Clone, Copy)]
pub(super) struct DefinitionGroup;

impl<S> TokenParser<S> for DefinitionGroup
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        if cursor.current().kind() != TokenKind::Paren {
            return Err(cursor.unexpected());
        }
        cursor.next()?;

        if cursor.current().kind() != TokenKind::Close {
            DefinitionList::new(SymbolFlags::TOP, false).parse(cursor)?;

            if cursor.current().kind() != TokenKind::Close {
                return Err(cursor.unexpected());
            }
        }
        cursor.next()
    }
}

/// Recursively reads a `{...}`/`[...]` binding pattern.
///
/// Not always DECLARE: destructuring also appears in plain assignment
/// position. Keys stay properties; bound names become symbols carrying
/// CHANGE plus whatever the context supplies.
#[derive(Debug, Clone, Copy)]
pub(super) struct Destructuring {
    special: SymbolFlags,
}

impl Destructuring {
    /// Creates a new `Destructuring` parser.
    pub(super) fn new(special: SymbolFlags) -> Self {
        Self { special }
    }
}

impl<S> TokenParser<S> for Destructuring
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        let _timer = QuollProfiler::global().start_event("Destructuring", "Parsing");

        let in_object = cursor.current().kind() == TokenKind::Brace;
        cursor.current_mut().special = Special::Flags(SymbolFlags::DESTRUCTURING);
        cursor.next()?;

        loop {
            match cursor.current().kind() {
                TokenKind::Close => {
                    return cursor.next();
                }

                TokenKind::Symbol | TokenKind::Lit => {
                    if cursor.peek()?.kind() == TokenKind::Colon {
                        // variable name comes after the colon
                        cursor.current_mut().special = Special::Flags(SymbolFlags::PROPERTY);
                    } else {
                        // e.g. "const {x} = ...": x is symbol, decl and
                        // property all at once
                        let mut flags = SymbolFlags::CHANGE | self.special;
                        if in_object {
                            flags |= SymbolFlags::PROPERTY;
                        }
                        let curr = cursor.current_mut();
                        curr.kind = TokenKind::Symbol;
                        curr.special = Special::Flags(flags);
                    }
                    cursor.next()?;
                }

                TokenKind::String => {
                    cursor.consume_string_key(Special::None)?;
                    if cursor.current().kind() != TokenKind::Colon {
                        return Err(cursor.unexpected());
                    }
                }

                TokenKind::Array => {
                    if in_object {
                        // this is a computed property name
                        ExprGroup.parse(cursor)?;
                    } else {
                        Destructuring::new(self.special).parse(cursor)?;
                    }
                }

                TokenKind::Brace => {
                    // nb. doesn't make sense in object context, but harmless
                    Destructuring::new(self.special).parse(cursor)?;
                }

                TokenKind::Op => {
                    if cursor.current().special().is_op(MiscOp::Comma) {
                        // nb. solo comma
                        cursor.next()?;
                        continue;
                    }
                    if cursor.current().special().is_op(MiscOp::Spread) {
                        // effects the next name or nested pattern
                        cursor.next()?;
                        continue;
                    }
                    return Err(cursor.unexpected());
                }

                _ => return Err(cursor.unexpected()),
            }

            // check for ": target"
            if cursor.current().kind() == TokenKind::Colon {
                cursor.next()?;

                match cursor.current().kind() {
                    TokenKind::Array | TokenKind::Brace => {
                        Destructuring::new(self.special).parse(cursor)?;
                    }
                    TokenKind::Symbol | TokenKind::Lit => {
                        let curr = cursor.current_mut();
                        curr.kind = TokenKind::Symbol;
                        curr.special = Special::Flags(SymbolFlags::CHANGE | self.special);
                        cursor.next()?;
                    }
                    _ => {}
                }
            }

            // consume a default
            if cursor.current().special().is_op(MiscOp::Equals) {
                cursor.next()?;
                Expression::new(false).parse(cursor)?;
            }
        }
    }
}

/// Consumes a destructuring assignment if one begins here, else nothing.
///
/// Looks for `[a] = ...` or `{a} = ...`: a pattern followed by `=`. The
/// check runs speculatively and the pattern is re-consumed for real on a
/// hit; anything else is left for the expression machine to read as a
/// literal.
pub(super) fn maybe_destructuring_assignment<S: Sink>(
    cursor: &mut Cursor<'_, S>,
) -> Result<(), ParseError> {
    match cursor.current().kind() {
        TokenKind::Array | TokenKind::Brace => {}
        _ => return Ok(()),
    }

    // thankfully destructuring isn't allowed inside parens (`({x}) = {x}`
    // is invalid), so just check for the trailing equals
    let found = cursor.speculate(|cursor| {
        match Destructuring::new(SymbolFlags::empty()).parse(cursor) {
            Ok(()) => Ok(cursor.current().special().is_op(MiscOp::Equals)),
            Err(err) if err.is_unexpected() => Ok(false),
            Err(err) => Err(err),
        }
    })?;

    if found == Some(true) {
        Destructuring::new(SymbolFlags::empty()).parse(cursor)?;
    }
    Ok(())
}

/// Reads `[async] function [*] [name] (...) {...}`, emitting FUNCTION and
/// INNER scopes.
#[derive(Debug, Clone, Copy)]
pub(super) struct FunctionExpr {
    special: SymbolFlags,
}

impl FunctionExpr {
    /// Creates a new `FunctionExpr` parser.
    pub(super) fn new(special: SymbolFlags) -> Self {
        Self { special }
    }
}

impl<S> TokenParser<S> for FunctionExpr
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        let _timer = QuollProfiler::global().start_event("FunctionExpr", "Parsing");

        cursor.current_mut().kind = TokenKind::Keyword;

        // nb. either a top-level declaration or within an expr
        cursor.scope(ScopeKind::Function, |cursor| {
            if cursor.current().special().is_word(Keyword::Async) {
                cursor.next()?;
                cursor.current_mut().kind = TokenKind::Keyword;
            }

            if !cursor.current().special().is_word(Keyword::Function) {
                return Err(cursor.unexpected());
            }
            cursor.next()?;

            if cursor.current().special().is_op(MiscOp::Star) {
                cursor.next()?;
            }

            defn_name(cursor, self.special)?;

            cursor.scope(ScopeKind::Inner, |cursor| {
                DefinitionGroup.parse(cursor)?;
                Statement::new(StatementMode::Expression).parse(cursor)
            })
        })
    }
}

/// Reads `class [name] [extends expr] { body }`, emitting a CLASS scope.
#[derive(Debug, Clone, Copy)]
pub(super) struct ClassExpr {
    special: SymbolFlags,
}

impl ClassExpr {
    /// Creates a new `ClassExpr` parser.
    pub(super) fn new(special: SymbolFlags) -> Self {
        Self { special }
    }
}

impl<S> TokenParser<S> for ClassExpr
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        let _timer = QuollProfiler::global().start_event("ClassExpr", "Parsing");

        if !cursor.current().special().is_word(Keyword::Class) {
            return Err(cursor.unexpected());
        }
        cursor.current_mut().kind = TokenKind::Keyword;

        cursor.scope(ScopeKind::Class, |cursor| {
            cursor.next()?;

            defn_name(cursor, self.special)?;

            if cursor.current().special().is_word(Keyword::Extends) {
                cursor.current_mut().kind = TokenKind::Keyword;
                cursor.next()?;

                // something must be here, as we expect a '{' following; any
                // expr is allowed although technically it's one token
                cursor.scope(ScopeKind::Expr, |cursor| {
                    Expression::new(true).parse(cursor)
                })?;
            }

            Dict::new(true).parse(cursor)
        })
    }
}
