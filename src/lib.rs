//! Quoll is a streaming, single-pass lexer and parser for ECMAScript 2020
//! source code.
//!
//! Unlike a conventional parser it does not build an abstract syntax tree.
//! Instead it resolves ECMAScript's context-sensitive ambiguities (slash as
//! division vs. regexp, brace as block vs. object literal, contextual
//! keywords, automatic semicolon insertion, arrow-function parameter lists,
//! destructuring assignment targets) in a single left-to-right pass and
//! emits a flat stream of classified [`Token`]s interleaved with nested
//! [`ScopeKind`] open/close events. The stream is sufficient to drive
//! bundlers, minifiers and import rewriters without a second parse.
//!
//! # Example
//!
//! ```
//! use quoll::{Parser, ScopeKind, Sink, Token, TokenKind};
//!
//! #[derive(Default)]
//! struct Kinds(Vec<TokenKind>);
//!
//! impl Sink for Kinds {
//!     fn token(&mut self, token: &Token) {
//!         self.0.push(token.kind());
//!     }
//!     fn scope_close(&mut self, _scope: ScopeKind) {}
//! }
//!
//! let mut parser = Parser::new("let x = 1;", Kinds::default());
//! parser.run_to_end().expect("failed to parse");
//! assert_eq!(
//!     parser.sink().0,
//!     vec![
//!         TokenKind::Keyword,
//!         TokenKind::Symbol,
//!         TokenKind::Op,
//!         TokenKind::Number,
//!         TokenKind::Semicolon,
//!     ]
//! );
//! ```

#![deny(
    unused_qualifications,
    clippy::all,
    unused_import_braces,
    unused_lifetimes,
    unreachable_pub,
    trivial_numeric_casts,
    missing_debug_implementations,
    missing_copy_implementations,
    deprecated_in_future,
    meta_variable_misuse,
    non_ascii_idents,
    rust_2018_compatibility,
    rust_2018_idioms,
    future_incompatible,
    nonstandard_style
)]
#![warn(clippy::perf, clippy::single_match_else, clippy::dbg_macro)]
#![allow(
    clippy::missing_inline_in_public_items,
    clippy::cognitive_complexity,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::as_conversions
)]

pub mod profiler;
pub mod syntax;

pub use crate::{
    profiler::QuollProfiler,
    syntax::{
        keyword::{Keyword, KeywordRoles},
        lexer::token::{BracketKind, MiscOp, Special, SymbolFlags, Token, TokenKind},
        parser::{ParseError, Parser, ScopeKind, Sink},
    },
};
