//! LaTeX-to-plain-text normalization for paper titles and abstracts.
//!
//! Both entry points run a fixed chain of substitutions over an owned string.
//! The order of the chain matters: a later step only sees what earlier steps
//! left behind, which is how nested markup gets resolved from the inside out
//! as far as the patterns allow.
//!
//! Macro arguments are only captured when they consist of a restricted set of
//! characters that excludes braces and backslashes. Nested or unknown markup is
//! therefore never partially consumed; it stays in the output as literal text.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Characters allowed inside a macro argument.
const ARGUMENT_CHARS: &str = r"['`/:\-()?\w\s\d.,]+";

/// Literal LaTeX sequences and the Unicode text that replaces them, applied in order.
///
/// Greek macros map to the Greek letters (U+03B1, U+03B2, U+03B3), not to the
/// Latin lookalikes `ɑ` and `ɣ` that older program exports used.
pub const SYMBOL_REPLACEMENTS: &[(&str, &str)] = &[
    (r"\%", "%"),
    (r"\&", "&"),
    (r"$\sim$", "~"),
    (r"\alpha", "α"),
    (r"\beta", "β"),
    (r"\gamma", "γ"),
    (r"\propto", "∝"),
    (r"\Rightarrow", "⇒"),
    (r"\Leftrightarrow", "⇔"),
    (r"\Leftarrow", "⇐"),
];

/// Superscript glyphs indexed by digit value.
const SUPERSCRIPT_DIGITS: [char; 10] = ['⁰', '¹', '²', '³', '⁴', '⁵', '⁶', '⁷', '⁸', '⁹'];

/// Subscript glyphs indexed by digit value.
const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];

/// Build a regex matching `prefix`, a captured macro argument, then `suffix`.
fn argument_regex(prefix: &str, suffix: &str) -> Regex {
    Regex::new(&format!("{prefix}({ARGUMENT_CHARS}){suffix}")).unwrap()
}

/// One level of braces around letters, digits and spaces (titles only).
static CURLY_BRACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9 ]+)\}").unwrap());

/// Line breaks together with the spaces padding them.
static NEWLINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[ ]*\r?\n[ ]*)+").unwrap());

static SUPERSCRIPT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\textsuperscript\{(\d+)\}").unwrap());

static SUBSCRIPT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\textsubscript\{(\d+)\}").unwrap());

static TEXTSC_REGEX: LazyLock<Regex> = LazyLock::new(|| argument_regex(r"\\textsc\{", r"\}"));

static INLINE_SC_REGEX: LazyLock<Regex> = LazyLock::new(|| argument_regex(r"\{\\sc ", r"\}"));

static TEXTRM_REGEX: LazyLock<Regex> = LazyLock::new(|| argument_regex(r"\\textrm\{", r"\}"));

static TEXTBF_REGEX: LazyLock<Regex> = LazyLock::new(|| argument_regex(r"\\textbf\{", r"\}"));

static INLINE_BF_REGEX: LazyLock<Regex> = LazyLock::new(|| argument_regex(r"\{\\bf ", r"\}"));

/// `\cite`, `\citep` and `\citet`, with an optional leading tie.
static CITE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| argument_regex(r"~?\\cite[pt]?\{", r"\}"));

static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| argument_regex(r"\\url\{", r"\}"));

static FOOTNOTE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| argument_regex(r"\\footnote\{", r"\}"));

/// Inline math, shortest match on a single line.
static MATH_MODE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(.*?)\$").unwrap());

static INLINE_ITALICS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| argument_regex(r"\{\\(?:em|it) ", r"\}"));

static ITALICS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| argument_regex(r"\\(?:emph|textit)\{", r"\}"));

static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Normalize a paper title.
///
/// - Replaces escaped characters and symbol macros with Unicode
/// - Strips braces around plain words (`{BERT}` becomes `BERT`)
/// - Replaces quote characters with spaces
/// - Collapses whitespace runs to single spaces
///
/// Leading and trailing whitespace is collapsed, not trimmed.
pub fn normalize_title(raw: &str) -> String {
    let text = replace_symbols(raw);
    let text = replace_all(&CURLY_BRACE_REGEX, &text, "${1}");
    let text = remove_quotes(&text);
    collapse_whitespace(&text)
}

/// Normalize a paper abstract.
///
/// Fails with [`Error::UnsupportedCharacter`] if a superscript or subscript
/// macro wraps a digit that has no glyph (any digit outside ASCII 0-9).
pub fn normalize_abstract(raw: &str) -> Result<String> {
    // 1. symbols
    let text = replace_symbols(raw);
    // 2. soft line breaks
    let text = replace_all(&NEWLINE_REGEX, &text, " ");
    // 3-4. digit scripts
    let text = convert_digits(&SUPERSCRIPT_REGEX, &text, &SUPERSCRIPT_DIGITS, "textsuperscript")?;
    let text = convert_digits(&SUBSCRIPT_REGEX, &text, &SUBSCRIPT_DIGITS, "textsubscript")?;
    // 5. small caps
    let text = replace_all(&TEXTSC_REGEX, &text, "${1}");
    let text = replace_all(&INLINE_SC_REGEX, &text, "${1}");
    // 6. roman
    let text = replace_all(&TEXTRM_REGEX, &text, "${1}");
    // 7. bold
    let text = replace_all(&TEXTBF_REGEX, &text, "${1}");
    let text = replace_all(&INLINE_BF_REGEX, &text, "${1}");
    // 8. citations are dropped along with their keys
    let text = replace_all(&CITE_REGEX, &text, " ");
    // 9. urls
    let text = replace_all(&URL_REGEX, &text, "${1}");
    // 10. footnotes
    let text = replace_all(&FOOTNOTE_REGEX, &text, " (${1})");
    // 11. inline math
    let text = replace_all(&MATH_MODE_REGEX, &text, "${1}");
    // 12. italics
    let text = replace_all(&INLINE_ITALICS_REGEX, &text, "${1}");
    let text = replace_all(&ITALICS_REGEX, &text, "${1}");
    // 13. quotes and whitespace
    let text = remove_quotes(&text);
    Ok(collapse_whitespace(&text))
}

/// Apply the symbol replacement table.
pub fn replace_symbols(text: &str) -> String {
    SYMBOL_REPLACEMENTS
        .iter()
        .fold(text.to_string(), |acc, (source, dest)| acc.replace(source, dest))
}

fn replace_all(regex: &Regex, text: &str, replacement: &str) -> String {
    regex.replace_all(text, replacement).into_owned()
}

fn remove_quotes(text: &str) -> String {
    text.replace(['"', '\''], " ")
}

fn collapse_whitespace(text: &str) -> String {
    replace_all(&WHITESPACE_COLLAPSE_REGEX, text, " ")
}

/// Replace every match of `regex` with its first capture converted digit by digit.
fn convert_digits(
    regex: &Regex,
    text: &str,
    glyphs: &[char; 10],
    command: &'static str,
) -> Result<String> {
    let mut output = String::with_capacity(text.len());
    let mut last_end = 0;

    for caps in regex.captures_iter(text) {
        let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        output.push_str(&text[last_end..whole.start()]);
        for character in digits.as_str().chars() {
            let glyph = character
                .to_digit(10)
                .map(|d| glyphs[d as usize])
                .ok_or(Error::UnsupportedCharacter { character, command })?;
            output.push(glyph);
        }
        last_end = whole.end();
    }

    output.push_str(&text[last_end..]);
    Ok(output)
}
