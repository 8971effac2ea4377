//! Statement and declaration parsing.

use super::{
    cursor::Cursor,
    error::ParseError,
    expression::{ExprGroup, Expression, ExpressionList},
    function::{optional_assign_suffix, optional_definition, ClassExpr, DefinitionList,
               FunctionExpr},
    module::{export_statement, ImportDecl},
    ScopeKind, Sink, TokenParser,
};
use crate::{
    profiler::QuollProfiler,
    syntax::keyword::{Keyword, KeywordRoles},
    syntax::lexer::token::{BracketKind, MiscOp, Special, SymbolFlags, TokenKind},
};

/// Where a statement appears, which changes what is legal there.
///
/// At `Top`, `import`/`export` are statements. At `Block`, function and
/// class declarations hoist. In `Expression` position (control bodies,
/// arrow bodies), they are expressions instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StatementMode {
    Top,
    Block,
    Expression,
}

/// Reads exactly one statement.
#[derive(Debug, Clone, Copy)]
pub(super) struct Statement {
    mode: StatementMode,
}

impl Statement {
    /// Creates a new `Statement` parser.
    pub(super) fn new(mode: StatementMode) -> Self {
        Self { mode }
    }
}

impl<S> TokenParser<S> for Statement
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        let _timer = QuollProfiler::global().start_event("Statement", "Parsing");

        match cursor.current().kind() {
            TokenKind::Eof | TokenKind::Colon => return Err(cursor.unexpected()),

            // the enclosing consumer owns this close
            TokenKind::Close => return Ok(()),

            // naked block statement (or a function body)
            TokenKind::Brace | TokenKind::Block => {
                cursor.current_mut().kind = TokenKind::Block;
                return cursor.scope(ScopeKind::Block, |cursor| {
                    cursor.next()?;

                    loop {
                        Statement::new(StatementMode::Block).parse(cursor)?;
                        if cursor.current().kind() == TokenKind::Close {
                            break;
                        }
                    }

                    cursor.current_mut().special = Special::Closed(BracketKind::Block);
                    cursor.next()
                });
            }

            // empty statement
            TokenKind::Semicolon => {
                return cursor.scope(ScopeKind::Misc, |cursor| cursor.next());
            }

            TokenKind::Label => {
                return cursor.scope(ScopeKind::Label, |cursor| {
                    cursor.next()?;

                    if cursor.current().kind() != TokenKind::Colon {
                        return Err(cursor.unexpected());
                    }
                    cursor.next()?;
                    Statement::new(StatementMode::Expression).parse(cursor)
                });
            }

            TokenKind::Keyword | TokenKind::Symbol | TokenKind::Lit => {}

            _ => return ExpressionStatement.parse(cursor),
        }

        // word-shaped statement starters
        match cursor.current().special().word() {
            Some(Keyword::Default) => {
                return cursor.scope(ScopeKind::Label, |cursor| {
                    cursor.current_mut().kind = TokenKind::Keyword;
                    cursor.next()?;

                    if cursor.current().kind() != TokenKind::Colon {
                        return Err(cursor.unexpected());
                    }
                    // nb. this doesn't parent a statement
                    cursor.next()
                });
            }

            Some(Keyword::Case) => {
                return cursor.scope(ScopeKind::Label, |cursor| {
                    cursor.current_mut().kind = TokenKind::Keyword;
                    cursor.next()?;

                    cursor.scope(ScopeKind::Expr, |cursor| {
                        Expression::new(false).parse(cursor)
                    })?;

                    if cursor.current().kind() != TokenKind::Colon {
                        return Err(cursor.unexpected());
                    }
                    // nb. this doesn't parent a statement
                    cursor.next()
                });
            }

            Some(Keyword::Return) | Some(Keyword::Throw) => {
                return cursor.scope(ScopeKind::Misc, |cursor| {
                    let line = cursor.current().line();
                    cursor.current_mut().kind = TokenKind::Keyword;
                    cursor.next()?;

                    // restricted production: a line break forces ASI
                    if line == cursor.current().line()
                        && cursor.current().kind() != TokenKind::Semicolon
                    {
                        cursor.scope(ScopeKind::Expr, |cursor| {
                            ExpressionList::new(true).parse(cursor)
                        })?;
                    }

                    cursor.end_semicolon()
                });
            }

            Some(Keyword::Debugger) => {
                return cursor.scope(ScopeKind::Misc, |cursor| {
                    cursor.current_mut().kind = TokenKind::Keyword;
                    cursor.next()?;
                    cursor.end_semicolon()
                });
            }

            Some(Keyword::Continue) | Some(Keyword::Break) => {
                return cursor.scope(ScopeKind::Misc, |cursor| {
                    let line = cursor.current().line();
                    cursor.current_mut().kind = TokenKind::Keyword;
                    cursor.next()?;

                    // an attached label must sit on the same line
                    if line == cursor.current().line()
                        && cursor.current().kind() == TokenKind::Lit
                    {
                        let curr = cursor.current_mut();
                        curr.kind = TokenKind::Label;
                        curr.special = Special::None;
                        cursor.next()?;
                    }

                    cursor.end_semicolon()
                });
            }

            Some(Keyword::Async) => {
                if cursor.peek()?.special().is_word(Keyword::Function) {
                    return function_statement(cursor, self.mode);
                }
                // anything else falls through to the generic handling
            }

            Some(Keyword::Function) => return function_statement(cursor, self.mode),

            Some(Keyword::Class) => {
                if self.mode == StatementMode::Expression {
                    return ExpressionStatement.parse(cursor);
                }
                return ClassExpr::new(SymbolFlags::DECLARE | SymbolFlags::CHANGE).parse(cursor);
            }

            Some(Keyword::Import) => {
                // "import(" and "import." are expressions
                let peek = cursor.peek()?;
                if peek.kind() == TokenKind::Paren || peek.special().is_op(MiscOp::Dot) {
                    return ExpressionStatement.parse(cursor);
                }
                if self.mode == StatementMode::Top {
                    return cursor.scope(ScopeKind::Module, |cursor| {
                        ImportDecl.parse(cursor)?;
                        cursor.end_semicolon()
                    });
                }
            }

            Some(Keyword::Export) => {
                if self.mode == StatementMode::Top {
                    return export_statement(cursor);
                }
            }

            _ => {}
        }

        let roles = cursor
            .current()
            .special()
            .word()
            .map_or_else(KeywordRoles::empty, Keyword::roles);

        if !roles.contains(KeywordRoles::MASQUERADE)
            && cursor.peek()?.kind() == TokenKind::Colon
        {
            // nb. "await:" is invalid in async functions, but nonsensical
            // anyway; restart this statement as a label
            let curr = cursor.current_mut();
            curr.kind = TokenKind::Label;
            curr.special = Special::None;
            return Statement::new(StatementMode::Expression).parse(cursor);
        }

        if roles.intersects(KeywordRoles::CONTROL) {
            return Control.parse(cursor);
        } else if roles.intersects(KeywordRoles::DECL) {
            return LexicalDeclaration::new(SymbolFlags::empty()).parse(cursor);
        } else if roles.intersects(KeywordRoles::UNARY_OP)
            || cursor.current().special().word().is_none()
        {
            return ExpressionStatement.parse(cursor);
        }

        // catches things like "enum" or "protected": keywords but largely
        // unhandled
        if roles.intersects(KeywordRoles::KEYWORD) {
            return cursor.scope(ScopeKind::Misc, |cursor| {
                cursor.current_mut().kind = TokenKind::Keyword;
                cursor.next()?;
                cursor.end_semicolon()
            });
        }

        ExpressionStatement.parse(cursor)
    }
}

/// A function or class declaration is a hoist-statement at top or block
/// position, and an expression everywhere else.
fn function_statement<S: Sink>(
    cursor: &mut Cursor<'_, S>,
    mode: StatementMode,
) -> Result<(), ParseError> {
    if mode == StatementMode::Expression {
        return ExpressionStatement.parse(cursor);
    }
    FunctionExpr::new(SymbolFlags::DECLARE | SymbolFlags::CHANGE).parse(cursor)
}

/// Reads one expression statement including its terminator.
#[derive(Debug, Clone, Copy)]
pub(super) struct ExpressionStatement;

impl<S> TokenParser<S> for ExpressionStatement
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        cursor.scope(ScopeKind::Expr, |cursor| {
            let start = cursor.current().span().start;
            ExpressionList::new(true).parse(cursor)?;
            if cursor.current().span().start == start {
                return Err(cursor.unexpected());
            }

            cursor.end_semicolon()
        })
    }
}

/// Reads a `var`/`let`/`const` declaration statement.
#[derive(Debug, Clone, Copy)]
pub(super) struct LexicalDeclaration {
    special: SymbolFlags,
}

impl LexicalDeclaration {
    /// Creates a new `LexicalDeclaration` parser.
    pub(super) fn new(special: SymbolFlags) -> Self {
        Self { special }
    }
}

impl<S> TokenParser<S> for LexicalDeclaration
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        cursor.scope(ScopeKind::Declare, |cursor| {
            let mut special = self.special;
            if cursor.current().special().is_word(Keyword::Var) {
                // only var-like bindings hoist to the top-level scope
                special |= SymbolFlags::TOP;
            }
            cursor.current_mut().kind = TokenKind::Keyword;
            cursor.next()?;

            DefinitionList::new(special, true).parse(cursor)?;
            cursor.end_semicolon()
        })
    }
}

/// Reads a control statement: `if`/`while`/`for`/`switch`/`try` and
/// siblings, including `for await`, the three `for` flavors, `catch` with
/// an optional binding and `do ... while` with its optional trailing
/// semicolon.
#[derive(Debug, Clone, Copy)]
pub(super) struct Control;

impl<S> TokenParser<S> for Control
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        let _timer = QuollProfiler::global().start_event("Control", "Parsing");

        let mut hash = match cursor.current().special().word() {
            Some(kw) if kw.has_role(KeywordRoles::CONTROL) => kw,
            _ => return Err(ParseError::internal("control statement off a control word")),
        };
        let consume_paren = hash.has_role(KeywordRoles::CONTROL_PAREN);

        cursor.scope(ScopeKind::Control, |cursor| {
            cursor.current_mut().kind = TokenKind::Keyword;
            cursor.next()?;

            // match "for await"
            if hash == Keyword::For && cursor.current().special().is_word(Keyword::Await) {
                hash = Keyword::Await;
                cursor.current_mut().kind = TokenKind::Keyword;
                cursor.next()?;
            }

            // match the inner parens of the control
            if consume_paren && cursor.current().kind() == TokenKind::Paren {
                cursor.next()?;
                control_group_inner(cursor, hash)?;
                if cursor.current().kind() != TokenKind::Close {
                    return Err(cursor.unexpected());
                }
                cursor.next()?;
            }

            if hash == Keyword::Do {
                Statement::new(StatementMode::Expression).parse(cursor)?;

                // peer back to see if we _just_ consumed a semicolon; this
                // allows `do 1 \n ; while (0)`, which is totally valid
                if cursor.byte_before_trivia() != b';'
                    && cursor.current().kind() == TokenKind::Semicolon
                {
                    cursor.next()?;
                }

                if !cursor.current().special().is_word(Keyword::While) {
                    return Err(cursor.unexpected());
                }
                cursor.current_mut().kind = TokenKind::Keyword;
                cursor.next()?;

                if cursor.current().kind() != TokenKind::Paren {
                    return Err(cursor.unexpected());
                }
                // can't define vars here, just a plain expr group
                ExprGroup.parse(cursor)?;

                // the trailing semicolon is optional
                if cursor.current().kind() == TokenKind::Semicolon {
                    cursor.next()?;
                }
                Ok(())
            } else {
                Statement::new(StatementMode::Expression).parse(cursor)
            }
        })
    }
}

/// Consumes the inside of a control's `(...)` header.
fn control_group_inner<S: Sink>(
    cursor: &mut Cursor<'_, S>,
    hash: Keyword,
) -> Result<(), ParseError> {
    match hash {
        // special-case catch, which creates a local scoped var
        Keyword::Catch => return optional_definition(cursor, SymbolFlags::empty()),

        Keyword::Await | Keyword::For => {}

        _ => {
            if cursor.current().kind() != TokenKind::Close {
                cursor.scope(ScopeKind::Expr, |cursor| {
                    ExpressionList::new(false).parse(cursor)
                })?;
            }
            return Ok(());
        }
    }

    if cursor.current().kind() == TokenKind::Semicolon {
        // fine, empty left block
    } else if cursor
        .current()
        .special()
        .word()
        .map_or(false, |kw| kw.has_role(KeywordRoles::DECL))
    {
        let allow_clauses = cursor.scope(ScopeKind::Declare, |cursor| {
            let special = if cursor.current().special().is_word(Keyword::Var) {
                SymbolFlags::TOP
            } else {
                SymbolFlags::empty()
            };
            cursor.current_mut().kind = TokenKind::Keyword;
            cursor.next()?;

            let start = cursor.current().span().start;
            optional_definition(cursor, special)?;
            if cursor.current().span().start == start {
                return Err(cursor.unexpected());
            }

            // `for (var x of y)` or `for (var {x,y} of z)`
            if cursor.current().special().is_word(Keyword::Of)
                || cursor.current().special().is_word(Keyword::In)
            {
                cursor.current_mut().kind = TokenKind::Op;
                cursor.next()?;
                cursor.scope(ScopeKind::Expr, |cursor| {
                    Expression::new(false).parse(cursor)
                })?;
                Ok(false)
            } else {
                // a ;; loop with a normal decl: step past "= 1" and ","
                // then continue more definitions
                optional_assign_suffix(cursor, false)?;
                if cursor.current().special().is_op(MiscOp::Comma) {
                    cursor.next()?;
                    DefinitionList::new(special, false).parse(cursor)?;
                }
                Ok(hash == Keyword::For)
            }
        })?;
        if !allow_clauses {
            return Ok(());
        }
    } else {
        // otherwise this is an expr, which maps "in" and "of" to operators
        ExpressionList::new(false).parse(cursor)?;
    }

    // `for await` only takes the of-form
    if hash == Keyword::Await {
        return Ok(());
    }

    // after the left block, check for a semicolon
    if cursor.current().kind() != TokenKind::Semicolon {
        // not always valid, but just allow it anyway
        return Ok(());
    }
    cursor.next()?;

    // middle block (skip if semicolon)
    if cursor.current().kind() != TokenKind::Semicolon {
        cursor.scope(ScopeKind::Expr, |cursor| {
            ExpressionList::new(false).parse(cursor)
        })?;
    }
    if cursor.current().kind() != TokenKind::Semicolon {
        return Err(cursor.unexpected());
    }
    cursor.next()?;

    // right block (skip if close)
    if cursor.current().kind() == TokenKind::Close {
        return Ok(());
    }
    cursor.scope(ScopeKind::Expr, |cursor| {
        ExpressionList::new(false).parse(cursor)
    })
}
