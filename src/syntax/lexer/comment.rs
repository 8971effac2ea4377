//! Trivia consumption: whitespace, comments and the shebang line.
//!
//! Trivia is never emitted as tokens. Each token instead records where its
//! leading trivia begins, so the concatenation of `[trivia_start, end)`
//! spans over the emitted stream reproduces the input.

use super::cursor::Cursor;
use crate::profiler::QuollProfiler;

/// Skips whitespace and comments, counting line breaks.
///
/// A `#!` shebang at offset 0 is treated as a line comment; unterminated
/// block comments consume to end-of-buffer without failing.
pub(super) fn skip_trivia(cursor: &mut Cursor<'_>) {
    let _timer = QuollProfiler::global().start_event("Trivia", "Lexing");

    if cursor.pos() == 0 && cursor.get(0) == b'#' && cursor.get(1) == b'!' {
        cursor.take_while(|b| b != b'\n');
    }

    loop {
        match cursor.get(0) {
            b' ' | b'\t' | b'\x0b' | b'\x0c' | b'\r' => cursor.bump(1),
            b'\n' => {
                cursor.bump(1);
                cursor.bump_line();
            }
            b'/' => match cursor.get(1) {
                b'/' => {
                    // leave the terminating newline for the loop above
                    cursor.take_while(|b| b != b'\n');
                }
                b'*' => {
                    cursor.bump(2);
                    loop {
                        if cursor.is_eof() {
                            return;
                        }
                        match cursor.get(0) {
                            b'*' if cursor.get(1) == b'/' => {
                                cursor.bump(2);
                                break;
                            }
                            b'\n' => {
                                cursor.bump(1);
                                cursor.bump_line();
                            }
                            _ => cursor.bump(1),
                        }
                    }
                }
                _ => return,
            },
            _ => return,
        }
    }
}
