//! Tests for the parser.
#![allow(clippy::indexing_slicing)]

use super::{ParseError, Parser, ScopeKind, Sink};
use crate::syntax::lexer::token::{Special, SymbolFlags, Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Token(TokenKind, String, Special),
    Open(ScopeKind),
    Close(ScopeKind),
}

/// Collects the full emitted stream, optionally skipping chosen scopes.
#[derive(Debug)]
struct Collector {
    source: String,
    events: Vec<Event>,
    skip: Option<ScopeKind>,
}

impl Collector {
    fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            events: Vec::new(),
            skip: None,
        }
    }

    fn skipping(source: &str, skip: ScopeKind) -> Self {
        Self {
            skip: Some(skip),
            ..Self::new(source)
        }
    }
}

impl Sink for Collector {
    fn token(&mut self, token: &Token) {
        self.events.push(Event::Token(
            token.kind(),
            self.source[token.span()].to_string(),
            token.special(),
        ));
    }

    fn scope_open(&mut self, scope: ScopeKind) -> bool {
        if self.skip == Some(scope) {
            return true;
        }
        self.events.push(Event::Open(scope));
        false
    }

    fn scope_close(&mut self, scope: ScopeKind) {
        self.events.push(Event::Close(scope));
    }
}

fn parse(src: &str) -> Vec<Event> {
    let mut parser = Parser::new(src, Collector::new(src));
    parser.run_to_end().expect("failed to parse");
    parser.into_sink().events
}

fn tokens(src: &str) -> Vec<(TokenKind, String)> {
    parse(src)
        .into_iter()
        .filter_map(|ev| match ev {
            Event::Token(kind, text, _) => Some((kind, text)),
            _ => None,
        })
        .collect()
}

fn token_stream(events: &[Event]) -> Vec<(TokenKind, String)> {
    events
        .iter()
        .filter_map(|ev| match ev {
            Event::Token(kind, text, _) => Some((*kind, text.clone())),
            _ => None,
        })
        .collect()
}

fn flags_of(events: &[Event], text: &str) -> SymbolFlags {
    events
        .iter()
        .find_map(|ev| match ev {
            Event::Token(_, t, special) if t == text => Some(special.flags()),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no token {:?} in stream", text))
}

fn all_flags_of(events: &[Event], text: &str) -> Vec<SymbolFlags> {
    events
        .iter()
        .filter_map(|ev| match ev {
            Event::Token(_, t, special) if t == text => Some(special.flags()),
            _ => None,
        })
        .collect()
}

fn kt(kind: TokenKind, text: &str) -> (TokenKind, String) {
    (kind, text.to_string())
}

// ---- concrete scenarios ----

#[test]
fn regexp_after_if_paren() {
    assert_eq!(
        tokens("if (x) /foo/"),
        vec![
            kt(TokenKind::Keyword, "if"),
            kt(TokenKind::Paren, "("),
            kt(TokenKind::Symbol, "x"),
            kt(TokenKind::Close, ")"),
            kt(TokenKind::Regexp, "/foo/"),
            kt(TokenKind::Semicolon, ""),
        ]
    );
}

#[test]
fn division_after_function_expression_call() {
    assert_eq!(
        tokens("(function(){}()) / 2"),
        vec![
            kt(TokenKind::Paren, "("),
            kt(TokenKind::Keyword, "function"),
            kt(TokenKind::Paren, "("),
            kt(TokenKind::Close, ")"),
            kt(TokenKind::Block, "{"),
            kt(TokenKind::Close, "}"),
            kt(TokenKind::Paren, "("),
            kt(TokenKind::Close, ")"),
            kt(TokenKind::Close, ")"),
            kt(TokenKind::Op, "/"),
            kt(TokenKind::Number, "2"),
            kt(TokenKind::Semicolon, ""),
        ]
    );
}

#[test]
fn arrow_function_vs_grouping() {
    let events = parse("(a, b) => a + b");
    assert_eq!(
        token_stream(&events),
        vec![
            kt(TokenKind::Paren, "("),
            kt(TokenKind::Symbol, "a"),
            kt(TokenKind::Op, ","),
            kt(TokenKind::Symbol, "b"),
            kt(TokenKind::Close, ")"),
            kt(TokenKind::Op, "=>"),
            kt(TokenKind::Symbol, "a"),
            kt(TokenKind::Op, "+"),
            kt(TokenKind::Symbol, "b"),
            kt(TokenKind::Semicolon, ""),
        ]
    );
    // the parameters declare bindings, the body uses plain symbols
    let a_flags = all_flags_of(&events, "a");
    assert!(a_flags[0].contains(SymbolFlags::DECLARE));
    assert!(!a_flags[1].contains(SymbolFlags::DECLARE));
    assert!(flags_of(&events, "b").contains(SymbolFlags::DECLARE));

    // a grouping expression on its own declares nothing
    let events = parse("(a, b)");
    assert_eq!(
        token_stream(&events),
        vec![
            kt(TokenKind::Paren, "("),
            kt(TokenKind::Symbol, "a"),
            kt(TokenKind::Op, ","),
            kt(TokenKind::Symbol, "b"),
            kt(TokenKind::Close, ")"),
            kt(TokenKind::Semicolon, ""),
        ]
    );
    assert!(!flags_of(&events, "a").contains(SymbolFlags::DECLARE));
}

#[test]
fn template_with_nested_interpolation() {
    assert_eq!(
        tokens("`a${`b${1}c`}d`"),
        vec![
            kt(TokenKind::String, "`a${"),
            kt(TokenKind::String, "`b${"),
            kt(TokenKind::Number, "1"),
            kt(TokenKind::String, "}c`"),
            kt(TokenKind::String, "}d`"),
            kt(TokenKind::Semicolon, ""),
        ]
    );
}

#[test]
fn asi_after_restricted_production() {
    assert_eq!(
        tokens("return\n42"),
        vec![
            kt(TokenKind::Keyword, "return"),
            kt(TokenKind::Semicolon, ""),
            kt(TokenKind::Number, "42"),
            kt(TokenKind::Semicolon, ""),
        ]
    );
}

#[test]
fn destructuring_assignment() {
    let events = parse("({a, b: [c]} = x)");
    assert_eq!(
        token_stream(&events),
        vec![
            kt(TokenKind::Paren, "("),
            kt(TokenKind::Brace, "{"),
            kt(TokenKind::Symbol, "a"),
            kt(TokenKind::Op, ","),
            kt(TokenKind::Lit, "b"),
            kt(TokenKind::Colon, ":"),
            kt(TokenKind::Array, "["),
            kt(TokenKind::Symbol, "c"),
            kt(TokenKind::Close, "]"),
            kt(TokenKind::Close, "}"),
            kt(TokenKind::Op, "="),
            kt(TokenKind::Symbol, "x"),
            kt(TokenKind::Close, ")"),
            kt(TokenKind::Semicolon, ""),
        ]
    );
    assert_eq!(
        flags_of(&events, "a"),
        SymbolFlags::PROPERTY | SymbolFlags::CHANGE
    );
    assert_eq!(flags_of(&events, "b"), SymbolFlags::PROPERTY);
    assert_eq!(flags_of(&events, "c"), SymbolFlags::CHANGE);
    assert_eq!(flags_of(&events, "{"), SymbolFlags::DESTRUCTURING);
    assert_eq!(flags_of(&events, "["), SymbolFlags::DESTRUCTURING);
}

// ---- statements and declarations ----

#[test]
fn let_declaration() {
    let events = parse("let x = 1;");
    assert_eq!(
        token_stream(&events),
        vec![
            kt(TokenKind::Keyword, "let"),
            kt(TokenKind::Symbol, "x"),
            kt(TokenKind::Op, "="),
            kt(TokenKind::Number, "1"),
            kt(TokenKind::Semicolon, ";"),
        ]
    );
    assert!(flags_of(&events, "x").contains(SymbolFlags::DECLARE | SymbolFlags::CHANGE));
    assert!(!flags_of(&events, "x").contains(SymbolFlags::TOP));
    assert_eq!(events[0], Event::Open(ScopeKind::Declare));
}

#[test]
fn var_declares_top_level() {
    let events = parse("var x;");
    assert!(flags_of(&events, "x").contains(SymbolFlags::DECLARE | SymbolFlags::TOP));
    assert!(!flags_of(&events, "x").contains(SymbolFlags::CHANGE));
}

#[test]
fn label_statement() {
    let events = parse("loop: x();");
    assert_eq!(
        token_stream(&events),
        vec![
            kt(TokenKind::Label, "loop"),
            kt(TokenKind::Colon, ":"),
            kt(TokenKind::Symbol, "x"),
            kt(TokenKind::Paren, "("),
            kt(TokenKind::Close, ")"),
            kt(TokenKind::Semicolon, ";"),
        ]
    );
    assert_eq!(events[0], Event::Open(ScopeKind::Label));
}

#[test]
fn break_with_label() {
    let events = parse("out: while (1) break out;");
    let stream = token_stream(&events);
    assert_eq!(stream[0], kt(TokenKind::Label, "out"));
    assert!(stream.contains(&kt(TokenKind::Label, "out")));
    assert_eq!(
        stream[stream.len() - 2..],
        [kt(TokenKind::Label, "out"), kt(TokenKind::Semicolon, ";")]
    );
}

#[test]
fn symbol_change_flag() {
    let events = parse("x = 1; y += 2; z++; a <= b;");
    assert!(flags_of(&events, "x").contains(SymbolFlags::CHANGE));
    assert!(flags_of(&events, "y").contains(SymbolFlags::CHANGE));
    assert!(flags_of(&events, "z").contains(SymbolFlags::CHANGE));
    // a comparison is not an assignment
    assert!(!flags_of(&events, "a").contains(SymbolFlags::CHANGE));
}

#[test]
fn for_of_declaration() {
    let events = parse("for (const x of list) {}");
    assert!(flags_of(&events, "x")
        .contains(SymbolFlags::DECLARE | SymbolFlags::CHANGE));
    let stream = token_stream(&events);
    // `of` is an operator here
    assert!(stream.contains(&kt(TokenKind::Op, "of")));
    assert_eq!(events[0], Event::Open(ScopeKind::Control));
}

#[test]
fn for_three_clause() {
    let events = parse("for (var i = 0; i < 10; i++) run(i);");
    let stream = token_stream(&events);
    assert_eq!(stream[0], kt(TokenKind::Keyword, "for"));
    assert!(flags_of(&events, "i").contains(SymbolFlags::TOP));
    // three expression scopes open inside the control: init value, test,
    // and update
    let opens = events
        .iter()
        .filter(|ev| matches!(ev, Event::Open(ScopeKind::Expr)))
        .count();
    assert!(opens >= 3);
}

#[test]
fn for_await_of() {
    let stream = tokens("for await (const x of gen()) {}");
    assert_eq!(stream[0], kt(TokenKind::Keyword, "for"));
    assert_eq!(stream[1], kt(TokenKind::Keyword, "await"));
}

#[test]
fn do_while_with_optional_semicolon() {
    let stream = tokens("do x(); while (0)\ndone();");
    assert_eq!(stream[0], kt(TokenKind::Keyword, "do"));
    assert!(stream.contains(&kt(TokenKind::Keyword, "while")));
    assert!(stream.contains(&kt(TokenKind::Symbol, "done")));
}

#[test]
fn try_catch_finally() {
    let stream = tokens("try { x(); } catch (e) { } finally { done(); }");
    assert!(stream.contains(&kt(TokenKind::Keyword, "try")));
    assert!(stream.contains(&kt(TokenKind::Keyword, "catch")));
    assert!(stream.contains(&kt(TokenKind::Keyword, "finally")));
    let events = parse("try { x(); } catch (e) { }");
    assert!(flags_of(&events, "e").contains(SymbolFlags::DECLARE));
}

#[test]
fn switch_with_cases() {
    let events = parse("switch (x) { case 1: break; default: run(); }");
    let stream = token_stream(&events);
    assert!(stream.contains(&kt(TokenKind::Keyword, "case")));
    assert!(stream.contains(&kt(TokenKind::Keyword, "default")));
    // case and default clauses produce label scopes
    let labels = events
        .iter()
        .filter(|ev| matches!(ev, Event::Open(ScopeKind::Label)))
        .count();
    assert_eq!(labels, 2);
}

#[test]
fn keyword_only_statement() {
    // largely unhandled reserved words consume as one-keyword statements
    assert_eq!(
        tokens("debugger;"),
        vec![kt(TokenKind::Keyword, "debugger"), kt(TokenKind::Semicolon, ";")]
    );
}

// ---- functions and classes ----

#[test]
fn function_declaration_scopes() {
    let events = parse("function add(a, b) { return a + b; }");
    assert_eq!(events[0], Event::Open(ScopeKind::Function));
    assert!(events.contains(&Event::Open(ScopeKind::Inner)));
    assert!(flags_of(&events, "add")
        .contains(SymbolFlags::DECLARE | SymbolFlags::CHANGE));
    assert!(flags_of(&events, "a").contains(SymbolFlags::DECLARE | SymbolFlags::TOP));
}

#[test]
fn function_expression_name_is_not_a_declaration() {
    let events = parse("x = function inner() {};");
    let inner = events
        .iter()
        .find_map(|ev| match ev {
            Event::Token(kind, text, _) if text == "inner" => Some(*kind),
            _ => None,
        })
        .expect("no inner token");
    assert_eq!(inner, TokenKind::Lit);
}

#[test]
fn async_generator_function() {
    let stream = tokens("async function* gen() {}");
    assert_eq!(stream[0], kt(TokenKind::Keyword, "async"));
    assert_eq!(stream[1], kt(TokenKind::Keyword, "function"));
    assert_eq!(stream[2], kt(TokenKind::Op, "*"));
    assert_eq!(stream[3], kt(TokenKind::Symbol, "gen"));
}

#[test]
fn single_param_arrow() {
    let events = parse("a => a * 2");
    assert!(all_flags_of(&events, "a")[0].contains(SymbolFlags::DECLARE));
    assert_eq!(events[0], Event::Open(ScopeKind::Function));
}

#[test]
fn async_arrow() {
    let stream = tokens("async (a) => a");
    assert_eq!(stream[0], kt(TokenKind::Keyword, "async"));
    assert_eq!(stream[1], kt(TokenKind::Paren, "("));
}

#[test]
fn arrow_with_default_parameter() {
    let stream = tokens("(a = f(1), b) => b");
    assert!(stream.contains(&kt(TokenKind::Op, "=>")));
    assert_eq!(stream[0], kt(TokenKind::Paren, "("));
}

#[test]
fn class_with_members() {
    let events = parse("class A extends B { constructor() {} static x = 1; get y() { return 1; } }");
    assert!(events.contains(&Event::Open(ScopeKind::Class)));
    let stream = token_stream(&events);
    assert!(stream.contains(&kt(TokenKind::Keyword, "class")));
    assert!(stream.contains(&kt(TokenKind::Keyword, "extends")));
    assert!(stream.contains(&kt(TokenKind::Keyword, "static")));
    assert!(stream.contains(&kt(TokenKind::Keyword, "get")));
    assert!(flags_of(&events, "A").contains(SymbolFlags::DECLARE));
}

#[test]
fn object_literal_members() {
    let events = parse("x = {a, b: 1, [c]: 2, async d() {}, *e() {}, get f() {}};");
    // shorthand `a` is both property and symbol
    assert_eq!(
        flags_of(&events, "a"),
        SymbolFlags::PROPERTY
    );
    let a_kind = events
        .iter()
        .find_map(|ev| match ev {
            Event::Token(kind, text, _) if text == "a" => Some(*kind),
            _ => None,
        })
        .expect("no a");
    assert_eq!(a_kind, TokenKind::Symbol);
    // keyed `b` stays a property lit
    let b_kind = events
        .iter()
        .find_map(|ev| match ev {
            Event::Token(kind, text, _) if text == "b" => Some(*kind),
            _ => None,
        })
        .expect("no b");
    assert_eq!(b_kind, TokenKind::Lit);
}

#[test]
fn getter_named_get_is_a_property() {
    // `get` directly followed by parens is a method name, not a prefix
    let stream = tokens("x = {get() {}};");
    assert!(stream.contains(&kt(TokenKind::Symbol, "get"))
        || stream.contains(&kt(TokenKind::Lit, "get")));
    assert!(!stream.contains(&kt(TokenKind::Keyword, "get")));
}

// ---- modules ----

#[test]
fn import_classifications() {
    let events = parse("import a, {b as c, d} from 'mod';");
    assert!(flags_of(&events, "a")
        .contains(SymbolFlags::DECLARE | SymbolFlags::TOP));
    assert_eq!(flags_of(&events, "b"), SymbolFlags::EXTERNAL);
    assert!(flags_of(&events, "c")
        .contains(SymbolFlags::DECLARE | SymbolFlags::TOP));
    assert!(flags_of(&events, "d")
        .contains(SymbolFlags::EXTERNAL | SymbolFlags::DECLARE | SymbolFlags::TOP));
    assert_eq!(flags_of(&events, "'mod'"), SymbolFlags::EXTERNAL);
    assert_eq!(events[0], Event::Open(ScopeKind::Module));
}

#[test]
fn import_star_as() {
    let events = parse("import * as ns from 'mod';");
    assert!(flags_of(&events, "ns")
        .contains(SymbolFlags::DECLARE | SymbolFlags::TOP));
}

#[test]
fn import_call_is_an_expression() {
    let events = parse("import('mod');");
    assert_eq!(events[0], Event::Open(ScopeKind::Expr));
    let stream = token_stream(&events);
    assert_eq!(stream[0].0, TokenKind::Symbol);
}

#[test]
fn import_meta_is_an_expression() {
    let events = parse("import.meta.url;");
    assert_eq!(events[0], Event::Open(ScopeKind::Expr));
    assert_eq!(flags_of(&events, "meta"), SymbolFlags::PROPERTY);
}

#[test]
fn export_list() {
    let events = parse("export {a, b as c};");
    assert_eq!(events[0], Event::Open(ScopeKind::Module));
    assert_eq!(flags_of(&events, "a"), SymbolFlags::EXTERNAL);
    assert_eq!(flags_of(&events, "b"), SymbolFlags::empty());
    assert_eq!(flags_of(&events, "c"), SymbolFlags::EXTERNAL);
}

#[test]
fn export_reexport() {
    let events = parse("export {a} from 'mod';");
    assert_eq!(events[0], Event::Open(ScopeKind::Module));
    assert_eq!(flags_of(&events, "a"), SymbolFlags::EXTERNAL);

    let events = parse("export * as ns from 'mod';");
    assert_eq!(events[0], Event::Open(ScopeKind::Module));
    assert_eq!(flags_of(&events, "ns"), SymbolFlags::EXTERNAL);
}

#[test]
fn export_declaration() {
    let events = parse("export const x = 1;");
    assert_eq!(events[0], Event::Open(ScopeKind::Export));
    assert!(flags_of(&events, "x")
        .contains(SymbolFlags::DECLARE | SymbolFlags::EXTERNAL | SymbolFlags::CHANGE));
}

#[test]
fn export_default_anonymous_function_synthesizes_a_name() {
    let events = parse("export default function() {}");
    let synthetic = events
        .iter()
        .find_map(|ev| match ev {
            Event::Token(TokenKind::Symbol, text, special) if text.is_empty() => {
                Some(special.flags())
            }
            _ => None,
        })
        .expect("no synthetic symbol");
    assert!(synthetic.contains(SymbolFlags::DECLARE | SymbolFlags::DEFAULT));
}

// ---- ambiguity torture ----

#[test]
fn division_chain() {
    let stream = tokens("x = a / b / c;");
    let slashes = stream
        .iter()
        .filter(|(kind, text)| *kind == TokenKind::Op && text == "/")
        .count();
    assert_eq!(slashes, 2);
}

#[test]
fn regexp_statement_after_block() {
    let stream = tokens("{} /foo/");
    assert!(stream.contains(&kt(TokenKind::Regexp, "/foo/")));
}

#[test]
fn division_after_this() {
    let stream = tokens("x = this / 2;");
    assert!(stream.contains(&kt(TokenKind::Op, "/")));
}

#[test]
fn typeof_regexp() {
    let stream = tokens("typeof /re/;");
    assert!(stream.contains(&kt(TokenKind::Regexp, "/re/")));
    assert_eq!(stream[0].0, TokenKind::Op);
}

#[test]
fn new_target_keeps_symbol_shape() {
    let events = parse("x = new.target;");
    let stream = token_stream(&events);
    assert!(stream.contains(&kt(TokenKind::Symbol, "new")));
    assert_eq!(flags_of(&events, "target"), SymbolFlags::PROPERTY);
}

#[test]
fn new_is_an_operator() {
    let stream = tokens("x = new Foo();");
    assert!(stream.contains(&kt(TokenKind::Op, "new")));
}

#[test]
fn yield_inside_expression() {
    let stream = tokens("function* g() { yield 1; }");
    assert!(stream.contains(&kt(TokenKind::Op, "yield")));
}

#[test]
fn parenthesized_lvalue() {
    let events = parse("(x)++;");
    assert!(flags_of(&events, "x").contains(SymbolFlags::CHANGE));
}

#[test]
fn postfix_on_next_line_breaks_the_statement() {
    // a line break before ++ detaches it from the value
    assert_eq!(
        tokens("a\n++b"),
        vec![
            kt(TokenKind::Symbol, "a"),
            kt(TokenKind::Semicolon, ""),
            kt(TokenKind::Op, "++"),
            kt(TokenKind::Symbol, "b"),
            kt(TokenKind::Semicolon, ""),
        ]
    );
}

// ---- universal properties ----

const CORPUS: &[&str] = &[
    "let x = 1;\nconst {a, b: [c]} = x;",
    "if (x) /foo/; else y();",
    "`a${`b${1}c`}d`",
    "async function f(a = 1, ...rest) { await g(); }",
    "class A extends mix(B) { #priv = 1; static async *m() {} }",
    "import a, {b as c} from 'mod'; export default () => 1;",
    "for (var i = 0; i < 10; i++) { run(i); }",
    "x = cond ? {a: 1} : [2, 3];",
    "do x(); while (0)\nlabel: { break label; }",
    "switch (v) { case 1: break; default: }",
];

#[test]
fn brackets_and_scopes_balance() {
    for src in CORPUS {
        let events = parse(src);
        let mut brackets = 0i64;
        let mut scopes = Vec::new();
        for ev in &events {
            match ev {
                Event::Token(kind, _, _) => match kind {
                    TokenKind::Paren
                    | TokenKind::Array
                    | TokenKind::Brace
                    | TokenKind::Block
                    | TokenKind::Ternary => brackets += 1,
                    TokenKind::Close => brackets -= 1,
                    _ => {}
                },
                Event::Open(kind) => scopes.push(*kind),
                Event::Close(kind) => {
                    assert_eq!(scopes.pop(), Some(*kind), "scope mismatch in {:?}", src);
                }
            }
        }
        assert_eq!(brackets, 0, "unbalanced brackets in {:?}", src);
        assert!(scopes.is_empty(), "unclosed scopes in {:?}", src);
    }
}

#[test]
fn lines_are_monotone() {
    for src in CORPUS {
        let mut last = 0;
        let mut parser = Parser::new(src, Lines(Vec::new()));
        parser.run_to_end().expect("failed to parse");
        for line in parser.into_sink().0 {
            assert!(line >= last, "line went backwards in {:?}", src);
            last = line;
        }
    }

    struct Lines(Vec<u32>);
    impl Sink for Lines {
        fn token(&mut self, token: &Token) {
            self.0.push(token.line());
        }
        fn scope_close(&mut self, _scope: ScopeKind) {}
    }
}

#[test]
fn trivia_concatenation_reproduces_the_source() {
    for src in CORPUS {
        let mut parser = Parser::new(src, Spans(Vec::new()));
        parser.run_to_end().expect("failed to parse");
        let spans = parser.into_sink().0;

        let mut covered = String::new();
        for (trivia, span) in spans {
            covered.push_str(&src[trivia..span.end]);
        }
        assert!(
            src.starts_with(&covered),
            "stream does not reproduce {:?}: {:?}",
            src,
            covered
        );
    }

    struct Spans(Vec<(usize, std::ops::Range<usize>)>);
    impl Sink for Spans {
        fn token(&mut self, token: &Token) {
            self.0.push((token.trivia_start(), token.span()));
        }
        fn scope_close(&mut self, _scope: ScopeKind) {}
    }
}

#[test]
fn every_lit_reaching_the_sink_is_a_property_key() {
    for src in CORPUS {
        for ev in parse(src) {
            if let Event::Token(TokenKind::Lit, text, special) = ev {
                assert!(
                    special.flags().contains(SymbolFlags::PROPERTY)
                        || special == Special::Flags(SymbolFlags::EXTERNAL),
                    "unpromoted lit {:?} in {:?}",
                    text,
                    src
                );
            }
        }
    }
}

#[test]
fn asi_fidelity() {
    for src in CORPUS {
        let mut parser = Parser::new(src, AsiSpans::default());
        parser.run_to_end().expect("failed to parse");
        let positions = parser.into_sink().asi;

        // materialize every inserted semicolon and parse again
        let mut patched = src.to_string();
        for at in positions.iter().rev() {
            patched.insert(*at, ';');
        }

        let first: Vec<_> = tokens(src)
            .into_iter()
            .filter(|(kind, _)| *kind != TokenKind::Semicolon)
            .collect();
        let second: Vec<_> = tokens(&patched)
            .into_iter()
            .filter(|(kind, _)| *kind != TokenKind::Semicolon)
            .collect();
        assert_eq!(first, second, "ASI patching changed {:?}", src);
    }

    #[derive(Default)]
    struct AsiSpans {
        asi: Vec<usize>,
    }
    impl Sink for AsiSpans {
        fn token(&mut self, token: &Token) {
            if token.is_asi() {
                self.asi.push(token.span().start);
            }
        }
        fn scope_close(&mut self, _scope: ScopeKind) {}
    }
}

#[test]
fn run_reports_consumed_bytes() {
    let src = "let x = 1; let y = 2;";
    let mut parser = Parser::new(src, Count(0));
    let first = parser.run().expect("failed to parse");
    assert!(first > 0);
    let second = parser.run().expect("failed to parse");
    assert!(second > 0);
    assert_eq!(parser.run().expect("failed to parse"), 0);

    struct Count(u32);
    impl Sink for Count {
        fn token(&mut self, _token: &Token) {
            self.0 += 1;
        }
        fn scope_close(&mut self, _scope: ScopeKind) {}
    }
}

// ---- skip mode ----

#[test]
fn skipped_function_scopes_are_suppressed() {
    let src = "function f() { var hidden = 1; } var seen = 2;";
    let mut parser = Parser::new(src, Collector::skipping(src, ScopeKind::Function));
    parser.run_to_end().expect("failed to parse");
    let events = parser.into_sink().events;

    let stream = token_stream(&events);
    assert!(!stream.iter().any(|(_, text)| text == "hidden"));
    assert!(!stream.iter().any(|(_, text)| text == "function"));
    assert!(stream.iter().any(|(_, text)| text == "seen"));
    // no events at all leak out of the skipped scope
    assert!(!events.contains(&Event::Open(ScopeKind::Inner)));
    assert!(!events.contains(&Event::Close(ScopeKind::Function)));
}

// ---- failure semantics ----

#[test]
fn error_codes() {
    fn error_of(src: &str) -> ParseError {
        let mut parser = Parser::new(src, Ignore);
        loop {
            match parser.run() {
                Ok(0) => panic!("expected an error in {:?}", src),
                Ok(_) => {}
                Err(err) => return err,
            }
        }
    }

    struct Ignore;
    impl Sink for Ignore {
        fn token(&mut self, _token: &Token) {}
        fn scope_close(&mut self, _scope: ScopeKind) {}
    }

    assert_eq!(error_of(")").code(), -2);
    assert_eq!(error_of("@").code(), -1);
    assert_eq!(error_of(&"(".repeat(300)).code(), -2);
    assert_eq!(error_of("a.;").code(), -1);
}
