//! Expression parsing.
//!
//! One routine does the heavy lifting: a value-tracking loop over the token
//! stream that resolves slash and brace ambiguities, spots arrow functions
//! and destructuring assignments through bounded lookahead, and abandons
//! gracefully at statement boundaries so the enclosing statement can pick
//! up the remainder.

use super::{
    cursor::Cursor,
    error::ParseError,
    function::{maybe_destructuring_assignment, ClassExpr, DefinitionGroup, DefinitionList,
               FunctionExpr},
    statement::{Statement, StatementMode},
    ScopeKind, Sink, TokenParser,
};
use crate::{
    profiler::QuollProfiler,
    syntax::keyword::{Keyword, KeywordRoles},
    syntax::lexer::token::{MiscOp, Special, SymbolFlags, TokenKind},
};

/// Reads exactly one expression, comma not included.
///
/// With `is_statement` set, the expression may be abandoned at syntactic
/// boundaries (an unexpected keyword, a statement-terminating line break)
/// instead of failing; consuming nothing at all is still an error.
#[derive(Debug, Clone, Copy)]
pub(super) struct Expression {
    is_statement: bool,
}

impl Expression {
    /// Creates a new `Expression` parser.
    pub(super) fn new(is_statement: bool) -> Self {
        Self { is_statement }
    }
}

impl<S> TokenParser<S> for Expression
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        let start = cursor.current().span().start;
        expr_internal(cursor, self.is_statement)?;
        if cursor.current().span().start == start {
            return Err(cursor.unexpected());
        }
        Ok(())
    }
}

/// Reads zero or more comma-separated expressions; may consume nothing.
#[derive(Debug, Clone, Copy)]
pub(super) struct ExpressionList {
    is_statement: bool,
}

impl ExpressionList {
    /// Creates a new `ExpressionList` parser.
    pub(super) fn new(is_statement: bool) -> Self {
        Self { is_statement }
    }
}

impl<S> TokenParser<S> for ExpressionList
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        loop {
            expr_internal(cursor, self.is_statement)?;
            if !cursor.current().special().is_op(MiscOp::Comma) {
                return Ok(());
            }
            cursor.next()?;
        }
    }
}

/// Reads a bracketed expression group (paren, array or ternary) with its
/// matched close.
#[derive(Debug, Clone, Copy)]
pub(super) struct ExprGroup;

impl<S> TokenParser<S> for ExprGroup
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        cursor.next()?; // consume the opener
        ExpressionList::new(false).parse(cursor)?;

        if cursor.current().kind() != TokenKind::Close {
            return Err(cursor.unexpected());
        }
        cursor.next()?; // consume the close
        Ok(())
    }
}

/// Reads a whole template string, interleaving its flat pieces with full
/// expression parses of every interpolation.
#[derive(Debug, Clone, Copy)]
pub(super) struct TemplateExpression;

impl<S> TokenParser<S> for TemplateExpression
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        loop {
            let end = cursor.last_byte();
            cursor.next()?;

            if end == b'`' {
                return Ok(());
            } else if end != b'{' {
                // the piece neither closed the template nor opened `${`,
                // which only happens on a truncated buffer
                return Err(cursor.unexpected());
            }

            ExpressionList::new(false).parse(cursor)?;

            if !(cursor.current().kind() == TokenKind::String && cursor.first_byte() == b'}') {
                return Err(cursor.unexpected());
            }
        }
    }
}

/// Reads an object literal or a class body.
///
/// Members are spread entries, computed keys, string/number keys,
/// identifier keys (shorthand becomes both property and symbol), and
/// method shorthands with `async`/`*`/`get`/`set` prefixes; class bodies
/// additionally honor `static` and wrap field initializers in INNER
/// scopes.
#[derive(Debug, Clone, Copy)]
pub(super) struct Dict {
    is_class: bool,
}

impl Dict {
    /// Creates a new `Dict` parser.
    pub(super) fn new(is_class: bool) -> Self {
        Self { is_class }
    }
}

impl<S> TokenParser<S> for Dict
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        let _timer = QuollProfiler::global().start_event("Dict", "Parsing");

        cursor.next()?; // consume the opening brace

        loop {
            if cursor.current().special().is_op(MiscOp::Spread) {
                cursor.next()?;
                Expression::new(false).parse(cursor)?;
                continue;
            }

            // static prefix
            let is_static = self.is_class
                && cursor.current().special().is_word(Keyword::Static)
                && cursor.peek()?.kind() != TokenKind::Paren;
            if is_static {
                cursor.current_mut().kind = TokenKind::Keyword;
                cursor.next()?;
            }

            // "async" prefix
            if cursor.current().special().is_word(Keyword::Async) {
                let peek = cursor.peek()?;
                let prefix = match peek.kind() {
                    // only a generator star or a name is valid after async
                    TokenKind::Op => peek.special().is_op(MiscOp::Star),
                    TokenKind::Keyword | TokenKind::Lit => true,
                    _ => false,
                };
                if prefix {
                    cursor.current_mut().kind = TokenKind::Keyword;
                    cursor.next()?;
                }
            }

            // generator
            if cursor.current().special().is_op(MiscOp::Star) {
                cursor.next()?;
            }

            // get/set without bracket
            if matches!(
                cursor.current().special().word(),
                Some(Keyword::Get) | Some(Keyword::Set)
            ) && cursor.peek()?.kind() != TokenKind::Paren
            {
                cursor.current_mut().kind = TokenKind::Keyword;
                cursor.next()?;
            }

            // name or bracketed name
            match cursor.current().kind() {
                TokenKind::Symbol | TokenKind::Lit => {
                    {
                        let curr = cursor.current_mut();
                        curr.kind = TokenKind::Lit;
                        curr.special = Special::Flags(SymbolFlags::PROPERTY);
                    }

                    // look for dict cases like `{foo}`, where foo is both a
                    // property and a symbol
                    if !self.is_class {
                        let peek = cursor.peek()?;
                        let stays_property = match peek.kind() {
                            TokenKind::Colon | TokenKind::Paren => true,
                            TokenKind::Op => peek.special().is_op(MiscOp::Equals),
                            _ => false,
                        };
                        if !stays_property {
                            cursor.current_mut().kind = TokenKind::Symbol;
                        }
                    }
                    cursor.next()?;
                }
                TokenKind::Number => cursor.next()?,
                TokenKind::String => cursor.consume_string_key(Special::None)?,
                TokenKind::Array => ExprGroup.parse(cursor)?,
                _ => {
                    // ignore a missing name, whatever
                }
            }

            // terminal case decides what kind of entry this is
            let is_initializer = match cursor.current().kind() {
                TokenKind::Colon => true,
                TokenKind::Op => cursor.current().special().is_op(MiscOp::Equals),
                _ => false,
            };
            if cursor.current().kind() == TokenKind::Paren {
                // method
                cursor.scope(ScopeKind::Function, |cursor| {
                    cursor.scope(ScopeKind::Inner, |cursor| {
                        DefinitionGroup.parse(cursor)?;
                        Statement::new(StatementMode::Expression).parse(cursor)
                    })
                })?;
            } else if is_initializer {
                // nb. this allows "async * foo:" which is nonsensical
                cursor.next()?;
                if self.is_class && !is_static {
                    // only run when the outer class is instantiated, unlike
                    // statics which run immediately
                    cursor.scope(ScopeKind::Inner, |cursor| {
                        Expression::new(true).parse(cursor)
                    })?;
                } else {
                    Expression::new(true).parse(cursor)?;
                }
            }

            // tail cases
            match cursor.current().kind() {
                TokenKind::Close => {
                    cursor.next()?;
                    return Ok(());
                }
                TokenKind::Op => {
                    if cursor.current().special().is_op(MiscOp::Comma) {
                        cursor.next()?;
                        continue;
                    } else if cursor.current().special().is_op(MiscOp::Star) {
                        // a generator member is next
                        continue;
                    }
                    return Err(cursor.unexpected());
                }
                TokenKind::Semicolon => {
                    cursor.next()?;
                    continue;
                }
                TokenKind::Symbol
                | TokenKind::Lit
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::Array => continue,
                _ => return Err(cursor.unexpected()),
            }
        }
    }
}

/// Consumes an arrow function from and including its `=>`.
pub(super) fn arrow_body<S: Sink>(
    cursor: &mut Cursor<'_, S>,
    is_statement: bool,
) -> Result<(), ParseError> {
    if !cursor.current().special().is_op(MiscOp::Arrow) {
        return Err(cursor.unexpected());
    }
    cursor.next()?; // consume =>

    if cursor.current().kind() == TokenKind::Block {
        return Statement::new(StatementMode::Expression).parse(cursor);
    }
    Expression::new(is_statement).parse(cursor)
}

/// Consumes an arrow function; the caller already knows one is here.
fn arrowfunc<S: Sink>(cursor: &mut Cursor<'_, S>, is_statement: bool) -> Result<(), ParseError> {
    // "async" prefix without an immediate =>
    let is_async = cursor.current().special().is_word(Keyword::Async) && {
        let peek = cursor.peek()?;
        !peek.special().is_op(MiscOp::Arrow)
    };
    if is_async {
        cursor.current_mut().kind = TokenKind::Keyword;
    }

    cursor.scope(ScopeKind::Function, |cursor| {
        if is_async {
            cursor.next()?;
        }

        cursor.scope(ScopeKind::Inner, |cursor| {
            match cursor.current().kind() {
                TokenKind::Lit => {
                    let curr = cursor.current_mut();
                    curr.kind = TokenKind::Symbol;
                    curr.special = Special::Flags(SymbolFlags::DECLARE);
                    cursor.next()?;
                }
                TokenKind::Paren => DefinitionGroup.parse(cursor)?,
                _ => return Err(cursor.unexpected()),
            }

            arrow_body(cursor, is_statement)
        })
    })
}

/// Speculative check for `() =>` / `async () =>` at the current paren.
fn lookahead_is_paren_arrowfunc<S: Sink>(
    cursor: &mut Cursor<'_, S>,
) -> Result<bool, ParseError> {
    if cursor.current().special().is_word(Keyword::Async) {
        cursor.next()?;
    }
    if cursor.current().kind() != TokenKind::Paren {
        return Err(ParseError::internal("arrowfunc lookahead off a paren"));
    }
    cursor.next()?;

    match DefinitionList::new(SymbolFlags::empty(), false).parse(cursor) {
        Ok(()) => {}
        Err(err) if err.is_unexpected() => return Ok(false),
        Err(err) => return Err(err),
    }

    if cursor.current().kind() == TokenKind::Close {
        cursor.next()?;
        if cursor.current().special().is_op(MiscOp::Arrow) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Consumes an arrow function if one begins here, else consumes nothing.
fn maybe_arrowfunc<S: Sink>(
    cursor: &mut Cursor<'_, S>,
    is_statement: bool,
) -> Result<(), ParseError> {
    // short-circuits that don't need the save point
    if cursor.current().kind() == TokenKind::Lit {
        let peek = cursor.peek()?;
        if peek.special().is_op(MiscOp::Arrow) {
            // "blah =>" or even "async =>"
            return arrowfunc(cursor, is_statement);
        } else if !cursor.current().special().is_word(Keyword::Async) {
            return Ok(());
        } else if peek.kind() == TokenKind::Lit {
            // "async function" is not an arrowfunc: anything else is
            if peek.special().is_word(Keyword::Function) {
                return Ok(());
            }
            return arrowfunc(cursor, is_statement);
        } else if peek.kind() != TokenKind::Paren {
            // "async ???" is neither group nor arrowfunc
            return Ok(());
        }
    } else if cursor.current().kind() != TokenKind::Paren {
        return Ok(());
    }

    let found = cursor.speculate(lookahead_is_paren_arrowfunc)?;
    if found == Some(true) {
        return arrowfunc(cursor, is_statement);
    }
    // in skip mode or on a miss this is just a group
    Ok(())
}

/// The expression machine.
///
/// `value_line` holds the line of the most recent value-producing token;
/// zero means "no value yet". A token that needs a value on its left
/// consults it, a token that cannot follow a value abandons the expression
/// in statement position. This single mechanism resolves the slash, brace
/// and statement-boundary ambiguities without backtracking.
pub(super) fn expr_internal<S: Sink>(
    cursor: &mut Cursor<'_, S>,
    is_statement: bool,
) -> Result<(), ParseError> {
    let _timer = QuollProfiler::global().start_event("Expression", "Parsing");

    let mut paren_count: usize = 0;

    'restart: loop {
        let mut value_line: u32 = 0;
        let start = cursor.current().span().start;

        // abandoning is only legal for an unparenthesized statement expr
        macro_rules! maybe_abandon {
            () => {
                if is_statement && paren_count == 0 {
                    return Ok(());
                }
            };
        }
        macro_rules! transition_to_value {
            () => {
                if value_line != 0 {
                    maybe_abandon!();
                }
                value_line = cursor.current().line();
            };
        }

        // lookahead #1: arrow function at this position
        maybe_arrowfunc(cursor, is_statement)?;
        if cursor.current().span().start != start {
            if paren_count == 0 {
                // the arrowfunc is an expr on its own
                return Ok(());
            }
            if cursor.current().kind() != TokenKind::Close
                && !cursor.current().special().is_op(MiscOp::Comma)
            {
                return Err(cursor.unexpected());
            }
        } else {
            // lookahead #2: destructuring assignment at this position
            maybe_destructuring_assignment(cursor)?;
            if cursor.current().span().start != start {
                value_line = cursor.current().line();
            }
        }

        loop {
            // 1st step: replace tokens with their intended types
            match cursor.current().kind() {
                TokenKind::Op => {
                    if value_line == 0 && cursor.first_byte() == b'/' {
                        // the lexer guessed division, it was wrong
                        cursor.update(TokenKind::Regexp)?;
                    }
                }
                TokenKind::Regexp => {
                    if value_line != 0 {
                        cursor.update(TokenKind::Op)?;
                    }
                }
                TokenKind::Lit => {
                    // this is a symbol _unless_...
                    cursor.current_mut().kind = TokenKind::Symbol;

                    match cursor.current().special().word() {
                        Some(Keyword::Async) => {
                            // arrowfuncs were checked at head, so this is a
                            // symbol or "async function"
                            if cursor.peek()?.special().is_word(Keyword::Function) {
                                cursor.current_mut().kind = TokenKind::Keyword;
                            }
                        }
                        Some(Keyword::Class) | Some(Keyword::Function) => {
                            cursor.current_mut().kind = TokenKind::Keyword;
                        }
                        Some(Keyword::Of) => {
                            if value_line != 0 && !is_statement {
                                cursor.current_mut().kind = TokenKind::Op;
                            }
                        }
                        Some(Keyword::New) => {
                            // "new.target" keeps the symbol shape
                            if !cursor.peek()?.special().is_op(MiscOp::Dot) {
                                cursor.current_mut().kind = TokenKind::Op;
                            }
                        }
                        Some(kw) => {
                            if kw.has_role(KeywordRoles::UNARY_OP | KeywordRoles::REL_OP) {
                                cursor.current_mut().kind = TokenKind::Op;
                            } else if kw.has_role(KeywordRoles::KEYWORD) {
                                maybe_abandon!();
                                cursor.current_mut().kind = TokenKind::Keyword;
                            }
                        }
                        None => {}
                    }
                }
                _ => {}
            }

            // 2nd step: process normal tokens
            match cursor.current().kind() {
                TokenKind::Keyword => {
                    transition_to_value!();

                    match cursor.current().special().word() {
                        Some(Keyword::Async) | Some(Keyword::Function) => {
                            FunctionExpr::new(SymbolFlags::empty()).parse(cursor)?;
                            continue;
                        }
                        Some(Keyword::Class) => {
                            ClassExpr::new(SymbolFlags::empty()).parse(cursor)?;
                            continue;
                        }
                        _ => {}
                    }

                    cursor.next()?; // invalid but allow anyway
                    continue;
                }

                TokenKind::Array => {
                    // nb. don't transition, this might be an index
                    value_line = cursor.current().line();
                    ExprGroup.parse(cursor)?;
                    continue;
                }

                TokenKind::Brace => {
                    transition_to_value!();
                    Dict::new(false).parse(cursor)?;
                    continue;
                }

                TokenKind::Ternary => {
                    // nb. needs a value on the left, but nonsensical otherwise
                    ExprGroup.parse(cursor)?;
                    value_line = 0;
                    continue;
                }

                TokenKind::Paren => {
                    if value_line != 0 {
                        // this is a function call
                        ExprGroup.parse(cursor)?;
                        value_line = cursor.current().line();
                        continue;
                    }
                    paren_count += 1;
                    cursor.next()?;

                    // a lone lit in parens may be a wrapped lvalue; this is
                    // incredibly uncommon, e.g. `(x)++`
                    let plain_lit = cursor.current().kind() == TokenKind::Lit
                        && !cursor
                            .current()
                            .special()
                            .word()
                            .map_or(false, |kw| kw.has_role(KeywordRoles::KEYWORD));
                    if !plain_lit || cursor.peek()?.kind() != TokenKind::Close {
                        continue 'restart;
                    }

                    let lvalue = cursor
                        .speculate(|cursor| {
                            let mut remain = paren_count;
                            loop {
                                cursor.next()?;
                                let peek = cursor.peek()?;
                                remain -= 1;
                                if peek.kind() != TokenKind::Close || remain == 0 {
                                    break;
                                }
                            }
                            let peek = cursor.peek()?;
                            Ok(cursor.is_assign_like(&peek)
                                || peek.special().is_op(MiscOp::IncDec))
                        })?
                        .unwrap_or(false);

                    {
                        let curr = cursor.current_mut();
                        curr.kind = TokenKind::Symbol;
                        curr.special = if lvalue {
                            Special::Flags(SymbolFlags::CHANGE)
                        } else {
                            Special::None
                        };
                    }
                    cursor.next()?;
                    // the closing parens are caught next loop
                    continue;
                }

                TokenKind::Close => {
                    if paren_count == 0 {
                        return Ok(());
                    }
                    paren_count -= 1;
                    cursor.next()?;

                    // in skip mode `()` was consumed as a group, so look
                    // for the arrowfunc here
                    if cursor.is_skipping() && cursor.current().special().is_op(MiscOp::Arrow) {
                        arrow_body(cursor, is_statement)?;
                    }

                    value_line = cursor.current().line();
                    continue;
                }

                TokenKind::String => {
                    if cursor.first_byte() == b'}' {
                        // the tokenizer says our `${}` is finished
                        return Ok(());
                    } else if cursor.first_byte() == b'`' {
                        TemplateExpression.parse(cursor)?;
                        value_line = cursor.current().line();
                    } else {
                        transition_to_value!();
                        cursor.next()?;
                    }
                    continue;
                }

                TokenKind::Symbol => {
                    transition_to_value!();

                    // nothing is special about a symbol, except a write
                    let peek = cursor.peek()?;
                    let change =
                        cursor.is_assign_like(&peek) || peek.special().is_op(MiscOp::IncDec);
                    cursor.current_mut().special = if change {
                        Special::Flags(SymbolFlags::CHANGE)
                    } else {
                        Special::None
                    };
                    cursor.next()?;
                    continue;
                }

                TokenKind::Number | TokenKind::Regexp => {
                    transition_to_value!();
                    cursor.next()?;
                    continue;
                }

                TokenKind::Op => {
                    // handled below
                }

                _ => return Ok(()),
            }

            // 3rd step: operators
            let special = cursor.current().special();

            let unary = special
                .word()
                .map_or(false, |kw| kw.has_role(KeywordRoles::UNARY_OP));
            if unary {
                if cursor.current().span().start != start && value_line != 0 {
                    // e.g. "var x = 123 new foo" is invalid
                    maybe_abandon!();
                }

                if special.is_word(Keyword::Yield) {
                    let line = cursor.current().line();
                    cursor.next()?;
                    if cursor.current().line() != line {
                        // "yield \n 123" generates an ASI
                        maybe_abandon!();
                    }
                } else {
                    cursor.next()?;
                }
                value_line = 0;
                continue;
            }

            let curr = *cursor.current();
            if cursor.is_assign_like(&curr) {
                // nb. special-case for = as we allow an arrowfunc after it
                cursor.next()?;
                continue 'restart;
            }

            match special {
                Special::Op(MiscOp::Arrow) => {
                    // a badly attached arrow, or one found in skip mode
                    cursor.next()?;
                    if cursor.current().kind() == TokenKind::Block {
                        Statement::new(StatementMode::Expression).parse(cursor)?;
                    }
                    continue 'restart;
                }

                Special::Op(MiscOp::Comma) => {
                    if paren_count > 0 {
                        cursor.next()?;
                        continue 'restart;
                    }
                    return Ok(());
                }

                Special::Op(MiscOp::Chain) | Special::Op(MiscOp::Dot) => {
                    if value_line == 0 {
                        maybe_abandon!();
                    }
                    cursor.next()?;

                    // technically chain only allows ?.foo, ?.['foo'] or
                    // ?.(arg), but broadly means "continue if non-null"
                    match cursor.current().kind() {
                        TokenKind::Paren | TokenKind::Array => {
                            value_line = cursor.current().line();
                            continue;
                        }
                        TokenKind::Lit => {
                            cursor.current_mut().special =
                                Special::Flags(SymbolFlags::PROPERTY);
                            cursor.next()?;
                            continue;
                        }
                        _ => return Err(cursor.unexpected()),
                    }
                }

                Special::Op(MiscOp::IncDec) => {
                    if value_line != 0 {
                        if cursor.current().line() != value_line {
                            // not attached to the previous value
                            maybe_abandon!();
                        }
                        cursor.next()?;
                        continue;
                    }

                    // prefix: look for the upcoming lvalue
                    let mut parens_here = 0;
                    cursor.next()?;
                    while cursor.current().kind() == TokenKind::Paren {
                        parens_here += 1;
                        cursor.next()?;
                    }
                    paren_count += parens_here;
                    if cursor.current().kind() != TokenKind::Lit {
                        // e.g. `++((1`, ignore
                        continue;
                    }

                    let peek = cursor.peek()?;
                    if peek.kind() == TokenKind::Close {
                        // easy, e.g. `++(((x)` or `++x)`
                    } else if parens_here > 0 {
                        // either invalid or long, e.g. `++(x + 1)`
                        continue;
                    } else if peek.special().is_op(MiscOp::Dot)
                        || peek.special().is_op(MiscOp::Chain)
                        || peek.kind() == TokenKind::Paren
                        || peek.kind() == TokenKind::Array
                    {
                        // run-on to something else, e.g. ++foo().bar
                        continue;
                    }

                    {
                        let curr = cursor.current_mut();
                        curr.kind = TokenKind::Symbol;
                        curr.special = Special::Flags(SymbolFlags::CHANGE);
                    }
                    value_line = cursor.current().line();
                    cursor.next()?;
                    continue;
                }

                _ => {
                    // all other ops are fine
                    value_line = 0;
                    cursor.next()?;
                    continue;
                }
            }
        }
    }
}
