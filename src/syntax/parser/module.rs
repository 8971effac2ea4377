//! Import and export parsing.
//!
//! Module productions are only legal at top-level statement position;
//! `import(` and `import.meta` fall back to expression statements before
//! this module is ever reached. Names crossing the module boundary are
//! flagged EXTERNAL, locally created bindings DECLARE|TOP, and `export
//! default` bindings DEFAULT.

use super::{
    cursor::Cursor,
    error::ParseError,
    function::{ClassExpr, FunctionExpr},
    statement::{ExpressionStatement, LexicalDeclaration},
    ScopeKind, Sink, TokenParser,
};
use crate::{
    profiler::QuollProfiler,
    syntax::keyword::{Keyword, KeywordRoles},
    syntax::lexer::token::{MiscOp, Special, SymbolFlags, TokenKind},
};

/// What a brace-wrapped module list means, which decides how its names are
/// classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ModuleListMode {
    /// `import {a as b} from 'x'`: left side external, right side declared.
    Import,
    /// `export {a as b}`: left side a local symbol, right side external.
    Export,
    /// `export {a as b} from 'x'`: both sides external.
    Reexport,
}

/// Reads a `{a, b as c, ...}` module list, excluding the braces' context.
#[derive(Debug, Clone, Copy)]
pub(super) struct ModuleList {
    mode: ModuleListMode,
}

impl ModuleList {
    /// Creates a new `ModuleList` parser.
    pub(super) fn new(mode: ModuleListMode) -> Self {
        Self { mode }
    }
}

impl<S> TokenParser<S> for ModuleList
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        let _timer = QuollProfiler::global().start_event("ModuleList", "Parsing");

        if cursor.current().kind() != TokenKind::Brace {
            return Err(cursor.unexpected());
        }
        cursor.next()?;

        loop {
            match cursor.current().kind() {
                TokenKind::Close => {
                    return cursor.next();
                }
                TokenKind::Symbol | TokenKind::Lit => {}
                TokenKind::Op if cursor.current().special().is_op(MiscOp::Comma) => {
                    cursor.next()?;
                    continue;
                }
                _ => return Err(cursor.unexpected()),
            }

            if cursor.peek()?.special().is_word(Keyword::As) {
                // "foo as bar": not a definition, but a property of the
                // thing being imported or exported
                {
                    let curr = cursor.current_mut();
                    if self.mode == ModuleListMode::Export {
                        // foo is the local symbol
                        curr.kind = TokenKind::Symbol;
                        curr.special = Special::None;
                    } else {
                        // foo names the other module's binding
                        curr.kind = TokenKind::Lit;
                        curr.special = Special::Flags(SymbolFlags::EXTERNAL);
                    }
                }
                cursor.next()?;

                // consume "as"
                cursor.current_mut().kind = TokenKind::Keyword;
                cursor.next()?;

                if !matches!(
                    cursor.current().kind(),
                    TokenKind::Lit | TokenKind::Symbol
                ) {
                    return Err(cursor.unexpected());
                }
                {
                    let curr = cursor.current_mut();
                    if self.mode == ModuleListMode::Import {
                        // bar becomes a local binding
                        curr.kind = TokenKind::Symbol;
                        curr.special =
                            Special::Flags(SymbolFlags::DECLARE | SymbolFlags::TOP);
                    } else {
                        // export or reexport: bar is external
                        curr.kind = TokenKind::Lit;
                        curr.special = Special::Flags(SymbolFlags::EXTERNAL);
                    }
                }
                cursor.next()?;
            } else {
                // "foo" on its own
                {
                    let curr = cursor.current_mut();
                    match self.mode {
                        ModuleListMode::Export => {
                            // a symbol (not a decl) being exported
                            curr.kind = TokenKind::Symbol;
                            curr.special = Special::Flags(SymbolFlags::EXTERNAL);
                        }
                        ModuleListMode::Reexport => {
                            // not a symbol here at all
                            curr.kind = TokenKind::Lit;
                            curr.special = Special::Flags(SymbolFlags::EXTERNAL);
                        }
                        ModuleListMode::Import => {
                            // declares a new value imported from elsewhere
                            curr.kind = TokenKind::Symbol;
                            curr.special = Special::Flags(
                                SymbolFlags::EXTERNAL
                                    | SymbolFlags::DECLARE
                                    | SymbolFlags::TOP,
                            );
                        }
                    }
                }
                cursor.next()?;
            }

            if cursor.current().special().is_op(MiscOp::Comma) {
                cursor.next()?;
            }
        }
    }
}

/// Consumes the comma-separated clauses after the `import` keyword: a
/// default name, `{...}` lists and `* as ns`.
fn import_module_list<S: Sink>(cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
    loop {
        if cursor.current().kind() == TokenKind::Brace {
            ModuleList::new(ModuleListMode::Import).parse(cursor)?;
            if !cursor.current().special().is_op(MiscOp::Comma) {
                return Ok(());
            }
            cursor.next()?;
            continue;
        }

        match cursor.current().kind() {
            TokenKind::Op => {
                if cursor.current().special().is_op(MiscOp::Comma) {
                    cursor.next()?;
                    continue;
                }
                if !cursor.current().special().is_op(MiscOp::Star) {
                    return Ok(());
                }
                cursor.next()?;

                if !cursor.current().special().is_word(Keyword::As) {
                    return Err(cursor.unexpected());
                }
                cursor.current_mut().kind = TokenKind::Keyword;
                cursor.next()?;

                if !matches!(
                    cursor.current().kind(),
                    TokenKind::Lit | TokenKind::Symbol
                ) {
                    return Err(cursor.unexpected());
                }
                let curr = cursor.current_mut();
                curr.kind = TokenKind::Symbol;
                curr.special = Special::Flags(SymbolFlags::DECLARE | SymbolFlags::TOP);
                cursor.next()?;
            }

            TokenKind::Symbol | TokenKind::Lit => {
                // imports another file's default export as a single name
                let curr = cursor.current_mut();
                curr.kind = TokenKind::Symbol;
                curr.special = Special::Flags(SymbolFlags::DECLARE | SymbolFlags::TOP);
                cursor.next()?;
            }

            _ => return Ok(()),
        }

        if !cursor.current().special().is_op(MiscOp::Comma) {
            return Ok(());
        }
        cursor.next()?;
    }
}

/// Reads an `import` statement after the statement dispatch has ruled out
/// the expression forms.
#[derive(Debug, Clone, Copy)]
pub(super) struct ImportDecl;

impl<S> TokenParser<S> for ImportDecl
where
    S: Sink,
{
    type Output = ();

    fn parse(self, cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
        let _timer = QuollProfiler::global().start_event("ImportDecl", "Parsing");

        cursor.current_mut().kind = TokenKind::Keyword;
        cursor.next()?;

        if cursor.current().kind() != TokenKind::String {
            import_module_list(cursor)?;

            if !cursor.current().special().is_word(Keyword::From) {
                return Err(cursor.unexpected());
            }
            cursor.current_mut().kind = TokenKind::Keyword;
            cursor.next()?;
        }

        // match the target string (but not a `${}` template)
        cursor.consume_string_key(Special::Flags(SymbolFlags::EXTERNAL))
    }
}

/// Consumes a re-export: `export {..} from`, `export * from` and
/// `export * as ns from`. Must sit on the `export` keyword.
fn export_reexport<S: Sink>(cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
    cursor.next()?; // move to the star or brace

    match cursor.current().kind() {
        TokenKind::Brace => {
            ModuleList::new(ModuleListMode::Reexport).parse(cursor)?;
        }
        TokenKind::Op if cursor.current().special().is_op(MiscOp::Star) => {
            cursor.next()?;

            if cursor.current().special().is_word(Keyword::As) {
                cursor.current_mut().kind = TokenKind::Keyword;
                cursor.next()?;

                if !matches!(
                    cursor.current().kind(),
                    TokenKind::Lit | TokenKind::Symbol
                ) {
                    return Err(cursor.unexpected());
                }
                let curr = cursor.current_mut();
                curr.kind = TokenKind::Lit;
                curr.special = Special::Flags(SymbolFlags::EXTERNAL);
                cursor.next()?;
            }
        }
        _ => return Err(cursor.unexpected()),
    }

    if !cursor.current().special().is_word(Keyword::From) {
        // the lookahead promised a re-export
        return Err(ParseError::internal("re-export lost its from clause"));
    }
    cursor.current_mut().kind = TokenKind::Keyword;
    cursor.next()?;
    cursor.consume_string_key(Special::Flags(SymbolFlags::EXTERNAL))
}

/// Consumes an export of local declarations. Must sit on the `export`
/// keyword. Returns whether the declaration terminated itself.
fn export_declare<S: Sink>(cursor: &mut Cursor<'_, S>) -> Result<bool, ParseError> {
    cursor.next()?; // move over export

    let is_default = cursor.current().special().is_word(Keyword::Default);
    let special_hoist = if is_default {
        cursor.current_mut().kind = TokenKind::Keyword;
        cursor.next()?; // move over "default"
        SymbolFlags::DECLARE | SymbolFlags::CHANGE | SymbolFlags::DEFAULT
    } else {
        SymbolFlags::DECLARE | SymbolFlags::CHANGE | SymbolFlags::EXTERNAL
    };

    match cursor.current().special().word() {
        Some(Keyword::Class) => {
            ClassExpr::new(special_hoist).parse(cursor)?;
            return Ok(false);
        }
        Some(Keyword::Async) => {
            if cursor.peek()?.special().is_word(Keyword::Function) {
                FunctionExpr::new(special_hoist).parse(cursor)?;
                return Ok(false);
            }
            // otherwise this will be an expr
        }
        Some(Keyword::Function) => {
            FunctionExpr::new(special_hoist).parse(cursor)?;
            return Ok(false);
        }
        _ => {}
    }

    if is_default {
        // MUST be an expr, which terminates itself
        ExpressionStatement.parse(cursor)?;
        return Ok(true);
    }
    if cursor
        .current()
        .special()
        .word()
        .map_or(false, |kw| kw.has_role(KeywordRoles::DECL))
    {
        LexicalDeclaration::new(SymbolFlags::EXTERNAL).parse(cursor)?;
        return Ok(true);
    }

    // should be default, var/let/const, function or class
    Err(cursor.unexpected())
}

/// Reads an `export` statement: a re-export, an exported list of local
/// symbols, or exported declarations, choosing by bounded lookahead over
/// the brace list.
pub(super) fn export_statement<S: Sink>(cursor: &mut Cursor<'_, S>) -> Result<(), ParseError> {
    let _timer = QuollProfiler::global().start_event("ExportDecl", "Parsing");

    // set first so the scope opens on a keyword
    cursor.current_mut().kind = TokenKind::Keyword;

    let peek = cursor.peek()?;
    let mut is_reexport = false;
    if peek.special().is_op(MiscOp::Star) {
        // must be `export * from 'foo'`
        is_reexport = true;
    } else if peek.kind() == TokenKind::Brace {
        let found = cursor.speculate(|cursor| {
            cursor.next()?; // move to the brace
            match ModuleList::new(ModuleListMode::Export).parse(cursor) {
                Ok(()) => Ok(cursor.current().special().is_word(Keyword::From)),
                Err(err) if err.is_unexpected() => Ok(false),
                Err(err) => Err(err),
            }
        })?;
        is_reexport = found.unwrap_or(false);

        if !is_reexport {
            return cursor.scope(ScopeKind::Module, |cursor| {
                cursor.next()?;
                ModuleList::new(ModuleListMode::Export).parse(cursor)?;
                cursor.end_semicolon()
            });
        }
    }

    if is_reexport {
        cursor.scope(ScopeKind::Module, |cursor| {
            export_reexport(cursor)?;
            cursor.end_semicolon()
        })
    } else {
        cursor.scope(ScopeKind::Export, |cursor| {
            let terminated = export_declare(cursor)?;
            if terminated {
                Ok(())
            } else {
                cursor.maybe_semicolon()
            }
        })
    }
}
