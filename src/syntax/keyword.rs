//! Keyword recognition and role classification.
//!
//! The tokenizer only decides that a token is identifier-shaped; whether a
//! given word acts as a reserved word, an operator, a declaration starter or
//! a plain symbol depends on where it appears. Each recognized word
//! therefore carries a [`KeywordRoles`] bitmask describing every role it can
//! play, and the parser picks the applicable one from context.
//!
//! More information:
//!  - [ECMAScript reference][spec]
//!
//! [spec]: https://tc39.es/ecma262/#sec-keywords-and-reserved-words

use bitflags::bitflags;
use std::{fmt, str::FromStr};

bitflags! {
    /// The set of syntactic roles a recognized word can take.
    ///
    /// These values are part of the classification contract between the
    /// lexer and the parser and must stay in sync with the parser's
    /// dispatch logic.
    #[cfg_attr(feature = "deser", derive(serde::Serialize, serde::Deserialize))]
    pub struct KeywordRoles: u16 {
        /// Always-reserved word (`if`, `return`, `function`, ...).
        const KEYWORD = 0b0000_0000_0001;
        /// Participates as a relational operator (`in`, `instanceof`).
        const REL_OP = 0b0000_0000_0010;
        /// Prefix operator (`new`, `delete`, `typeof`, `void`, `await`, `yield`).
        const UNARY_OP = 0b0000_0000_0100;
        /// May appear as a plain identifier depending on context.
        const MASQUERADE = 0b0000_0000_1000;
        /// Produces a value on its own (`this`, `true`, `null`, ...).
        const VALUE = 0b0000_0001_0000;
        /// Starts a variable declaration (`var`, `let`, `const`).
        const DECL = 0b0000_0010_0000;
        /// Begins a control statement (`if`, `for`, `try`, ...).
        const CONTROL = 0b0000_0100_0000;
        /// The subset of CONTROL that requires a `(...)` header.
        const CONTROL_PAREN = 0b0000_1000_0000;
        /// Reserved only in strict mode (`implements`, `private`, ...).
        const STRICT = 0b0001_0000_0000;
    }
}

macro_rules! keywords {
    ($( $variant:ident => $str:literal, [$($role:ident)|*]; )*) => {
        /// List of words recognized by the keyword table.
        ///
        /// See the [module-level documentation][self] for more details.
        #[cfg_attr(feature = "deser", derive(serde::Serialize, serde::Deserialize))]
        #[derive(Clone, Copy, PartialEq, Eq, Debug)]
        pub enum Keyword {
            $(
                #[doc = concat!("The `", $str, "` keyword.")]
                $variant,
            )*
        }

        impl Keyword {
            /// Gets the keyword as a string.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $str, )*
                }
            }

            /// Gets the role bitmask of the keyword.
            pub fn roles(self) -> KeywordRoles {
                match self {
                    $( Self::$variant => KeywordRoles::empty() $( .union(KeywordRoles::$role) )*, )*
                }
            }

            /// Looks a word up in the keyword table.
            ///
            /// Words containing escape sequences must not be passed here:
            /// an escaped keyword never acts as one.
            pub fn lookup(word: &[u8]) -> Option<Self> {
                let word = std::str::from_utf8(word).ok()?;
                match word {
                    $( $str => Some(Self::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

// nb. letters h, j, k, m, q, x and z never start a keyword.
keywords! {
    As => "as", [];
    Assert => "assert", [];
    Async => "async", [];
    Await => "await", [KEYWORD | UNARY_OP];
    Break => "break", [KEYWORD];
    Case => "case", [KEYWORD | MASQUERADE];
    Catch => "catch", [KEYWORD | CONTROL | CONTROL_PAREN];
    Class => "class", [KEYWORD];
    Const => "const", [KEYWORD | DECL];
    Continue => "continue", [KEYWORD];
    Debugger => "debugger", [KEYWORD];
    Default => "default", [KEYWORD | MASQUERADE];
    Delete => "delete", [KEYWORD | UNARY_OP];
    Do => "do", [KEYWORD | CONTROL];
    Else => "else", [KEYWORD | CONTROL];
    Enum => "enum", [KEYWORD];
    Export => "export", [KEYWORD];
    Extends => "extends", [KEYWORD];
    False => "false", [MASQUERADE | VALUE];
    Finally => "finally", [KEYWORD | CONTROL];
    For => "for", [KEYWORD | CONTROL | CONTROL_PAREN];
    From => "from", [];
    Function => "function", [KEYWORD];
    Get => "get", [];
    If => "if", [KEYWORD | CONTROL | CONTROL_PAREN];
    Implements => "implements", [KEYWORD | STRICT];
    Import => "import", [MASQUERADE | VALUE];
    In => "in", [KEYWORD | REL_OP];
    Instanceof => "instanceof", [KEYWORD | REL_OP];
    Interface => "interface", [KEYWORD | STRICT];
    Let => "let", [KEYWORD | DECL];
    New => "new", [KEYWORD | UNARY_OP];
    Null => "null", [MASQUERADE | VALUE];
    Of => "of", [];
    Package => "package", [KEYWORD | STRICT];
    Private => "private", [KEYWORD | STRICT];
    Protected => "protected", [KEYWORD | STRICT];
    Public => "public", [KEYWORD | STRICT];
    Return => "return", [KEYWORD];
    Set => "set", [];
    Static => "static", [KEYWORD];
    Super => "super", [MASQUERADE | VALUE];
    Switch => "switch", [KEYWORD | CONTROL | CONTROL_PAREN];
    This => "this", [MASQUERADE | VALUE];
    Throw => "throw", [KEYWORD];
    True => "true", [MASQUERADE | VALUE];
    Try => "try", [KEYWORD | CONTROL];
    Typeof => "typeof", [KEYWORD | UNARY_OP];
    Undefined => "undefined", [VALUE];
    Var => "var", [KEYWORD | DECL];
    Void => "void", [KEYWORD | UNARY_OP];
    While => "while", [KEYWORD | CONTROL | CONTROL_PAREN];
    With => "with", [KEYWORD | CONTROL | CONTROL_PAREN];
    Yield => "yield", [KEYWORD | UNARY_OP];
}

impl Keyword {
    /// Checks whether the keyword plays any of the given roles.
    #[inline]
    pub fn has_role(self, roles: KeywordRoles) -> bool {
        self.roles().intersects(roles)
    }
}

/// The error type which is returned from parsing an invalid keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordError;

impl fmt::Display for KeywordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid token")
    }
}

impl std::error::Error for KeywordError {}

impl FromStr for Keyword {
    type Err = KeywordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s.as_bytes()).ok_or(KeywordError)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_round_trips_every_keyword() {
        for word in &[
            "as", "async", "await", "break", "case", "catch", "class", "const", "continue",
            "debugger", "default", "delete", "do", "else", "enum", "export", "extends", "false",
            "finally", "for", "from", "function", "get", "if", "implements", "import", "in",
            "instanceof", "interface", "let", "new", "null", "of", "package", "private",
            "protected", "public", "return", "set", "static", "super", "switch", "this", "throw",
            "true", "try", "typeof", "undefined", "var", "void", "while", "with", "yield",
        ] {
            let kw = word.parse::<Keyword>().expect("known keyword");
            assert_eq!(kw.as_str(), *word);
        }
        assert!("foobar".parse::<Keyword>().is_err());
        assert!("awai".parse::<Keyword>().is_err());
        assert!("awaits".parse::<Keyword>().is_err());
    }

    #[test]
    fn roles_match_the_generated_table() {
        assert_eq!(
            Keyword::Await.roles(),
            KeywordRoles::KEYWORD | KeywordRoles::UNARY_OP
        );
        assert_eq!(
            Keyword::In.roles(),
            KeywordRoles::KEYWORD | KeywordRoles::REL_OP
        );
        assert_eq!(
            Keyword::This.roles(),
            KeywordRoles::MASQUERADE | KeywordRoles::VALUE
        );
        assert_eq!(Keyword::Async.roles(), KeywordRoles::empty());
        assert_eq!(
            Keyword::Let.roles(),
            KeywordRoles::KEYWORD | KeywordRoles::DECL
        );
        assert!(Keyword::For.has_role(KeywordRoles::CONTROL_PAREN));
        assert!(Keyword::Try.has_role(KeywordRoles::CONTROL));
        assert!(!Keyword::Try.has_role(KeywordRoles::CONTROL_PAREN));
        assert!(Keyword::Private.has_role(KeywordRoles::STRICT));
    }
}
