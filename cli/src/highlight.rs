//! Terminal syntax highlighting for Turtle documents.
//!
//! A small single-pass scanner, not a full tokenizer: it only needs to tell
//! IRIs, string literals, directives and comments apart, which is enough for
//! readable output. The input is expected to be well-formed Turtle since it
//! comes straight from the serializer.

use colored::Colorize;

/// Colorizes a Turtle document for terminal display.
pub fn highlight_turtle(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            '<' => {
                let end = scan_until(input, start, &mut chars, |c| c == '>');
                out.push_str(&input[start..end].cyan().to_string());
            }
            '"' => {
                let end = scan_string(input, start, &mut chars);
                out.push_str(&input[start..end].green().to_string());
            }
            '#' => {
                let end = scan_until(input, start, &mut chars, |c| c == '\n');
                // Keep the newline itself uncolored.
                let end = if input[start..end].ends_with('\n') {
                    end - 1
                } else {
                    end
                };
                out.push_str(&input[start..end].bright_black().to_string());
                if end < input.len() {
                    out.push('\n');
                }
            }
            '@' => {
                let mut end = start + 1;
                while let Some((i, c)) = chars.peek().copied() {
                    if c.is_ascii_alphabetic() || c == '-' {
                        end = i + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                out.push_str(&input[start..end].magenta().to_string());
            }
            _ => out.push(c),
        }
    }
    out
}

/// Consumes characters up to and including the first one matching `stop`,
/// returning the byte offset just past it.
fn scan_until(
    input: &str,
    start: usize,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    stop: impl Fn(char) -> bool,
) -> usize {
    let mut end = start + 1;
    for (i, c) in chars.by_ref() {
        end = i + c.len_utf8();
        if stop(c) {
            break;
        }
    }
    end
}

/// Consumes a string literal opened by the quote at `start`, handling both
/// short strings with escapes and long `"""` strings.
fn scan_string(
    input: &str,
    start: usize,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> usize {
    let long = input[start..].starts_with("\"\"\"");
    if long {
        chars.next();
        chars.next();
        let mut end = start + 3;
        let mut quotes = 0;
        for (i, c) in chars.by_ref() {
            end = i + c.len_utf8();
            if c == '"' {
                quotes += 1;
                if quotes == 3 {
                    break;
                }
            } else {
                quotes = 0;
            }
        }
        return end;
    }
    let mut end = start + 1;
    let mut escaped = false;
    for (i, c) in chars.by_ref() {
        end = i + c.len_utf8();
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '"' {
            break;
        }
    }
    end
}
