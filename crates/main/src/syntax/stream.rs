////////////////////////////////////////////////////////////////////////////////
// This file is part of "Ad Astra", an embeddable scripting programming       //
// language platform.                                                         //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/ad-astra/blob/master/EULA.md               //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use std::{
    fmt::{Debug, Display, Formatter},
    sync::Arc,
};

use compact_str::CompactString;
use lady_deirdre::lexis::{Site, SiteSpan};

use crate::runtime::{Primitive, Value};

/// A result of a [TokenStream] read: either the token, or an interruption.
pub type TokenResult<T> = Result<T, TokenError>;

/// An interruption of a [TokenStream] read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenError {
    /// The caret lies within the token being read. The caller is expected
    /// to stop parsing and produce completion candidates for the token.
    Completion(CompletionInfo),

    /// The text at the cursor does not form the requested token.
    Syntax {
        /// The character index where the malformed token starts.
        position: Site,

        /// A human-readable description of the problem.
        message: String,
    },
}

impl Display for TokenError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completion(info) => {
                formatter.write_fmt(format_args!("completion requested at {}", info.caret))
            }
            Self::Syntax { position, message } => {
                formatter.write_fmt(format_args!("{message} at {position}"))
            }
        }
    }
}

/// Describes the token under the caret when a [TokenStream] read is
/// interrupted for code completion.
///
/// `token_start` is the stream cursor before the read skipped leading
/// whitespace; `text_start..text_end` is the token text proper. If the
/// caret lies in the leading whitespace, the text bounds collapse to the
/// caret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionInfo {
    pub token_start: Site,
    pub token_end: Site,
    pub text_start: Site,
    pub text_end: Site,
    pub caret: Site,

    /// The token text between `text_start` and `text_end`.
    pub text: String,

    /// The token text between `text_start` and the caret.
    pub text_to_caret: String,

    /// Fixed suggestions known to the tokenizer (the expected characters or
    /// keyword), if the read was a closed-set read.
    pub suggestions: Vec<CompactString>,
}

struct Source {
    chars: Vec<char>,
    caret: Option<Site>,
}

/// A positional scanner over an expression text.
///
/// The stream shares the text and the caret between its clones, and each
/// clone owns only its cursor, so cloning is cheap. Alternative parsers try
/// the same position on separate clones, and the caller keeps the clone of
/// the attempt it accepts.
///
/// Every read skips leading whitespace. The reads that take part in code
/// completion ([read_identifier](Self::read_identifier),
/// [read_one_of](Self::read_one_of), [read_keyword](Self::read_keyword))
/// return [TokenError::Completion] instead of the token when the caret lies
/// within the token.
#[derive(Clone)]
pub struct TokenStream {
    source: Arc<Source>,
    cursor: Site,
}

impl Debug for TokenStream {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let before = self.source.chars[..self.cursor].iter().collect::<String>();
        let after = self.source.chars[self.cursor..].iter().collect::<String>();

        formatter.write_fmt(format_args!("TokenStream({before:?} | {after:?})"))
    }
}

impl TokenStream {
    /// Creates a stream at the beginning of the `text`.
    ///
    /// The `caret` is a character index in `0..=text.chars().count()`, or
    /// None if the stream is not used for code completion.
    pub fn new(text: &str, caret: Option<Site>) -> Self {
        Self {
            source: Arc::new(Source {
                chars: text.chars().collect(),
                caret,
            }),
            cursor: 0,
        }
    }

    #[inline(always)]
    pub fn position(&self) -> Site {
        self.cursor
    }

    /// Moves the cursor. The position is clamped to the text length.
    #[inline(always)]
    pub fn set_position(&mut self, position: Site) {
        self.cursor = position.min(self.source.chars.len());
    }

    #[inline(always)]
    pub fn caret(&self) -> Option<Site> {
        self.source.caret
    }

    /// The length of the text in characters.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.source.chars.len()
    }

    /// Returns true if the text is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.source.chars.is_empty()
    }

    /// Returns a fragment of the text.
    pub fn slice(&self, span: SiteSpan) -> String {
        let end = span.end.min(self.source.chars.len());
        let start = span.start.min(end);

        self.source.chars[start..end].iter().collect()
    }

    /// Returns true if only whitespace remains after the cursor.
    #[inline(always)]
    pub fn is_at_end(&self) -> bool {
        self.next_text_start() == self.source.chars.len()
    }

    /// The position of the next token: the cursor with the whitespace
    /// skipped.
    #[inline(always)]
    pub fn next_token_start(&self) -> Site {
        self.next_text_start()
    }

    /// Returns true if the caret lies between the cursor and the start of
    /// the next token, both ends inclusive.
    pub fn caret_at_next_token(&self) -> bool {
        match self.source.caret {
            Some(caret) => self.cursor <= caret && caret <= self.next_text_start(),
            None => false,
        }
    }

    /// Returns true if the caret lies before the next token start, so
    /// nothing after the cursor can affect the completion.
    pub fn caret_before_next_token(&self) -> bool {
        match self.source.caret {
            Some(caret) => caret <= self.next_text_start(),
            None => false,
        }
    }

    /// Returns the next non-whitespace character without consuming it.
    #[inline(always)]
    pub fn peek_char(&self) -> Option<char> {
        self.source.chars.get(self.next_text_start()).copied()
    }

    /// Returns true if the text after the leading whitespace starts with
    /// the `symbol`.
    pub fn peek_str(&self, symbol: &str) -> bool {
        let start = self.next_text_start();
        let mut chars = self.source.chars[start..].iter();

        symbol.chars().all(|expected| chars.next() == Some(&expected))
    }

    /// Returns true if the next token is the identifier `keyword`.
    pub fn peek_keyword(&self, keyword: &str) -> bool {
        let start = self.next_text_start();
        let end = self.identifier_end(start);

        self.matches(start..end, keyword)
    }

    /// Returns the next identifier-shaped token without consuming it.
    pub fn peek_identifier(&self) -> Option<String> {
        let start = self.next_text_start();
        let end = self.identifier_end(start);

        match start < end {
            true => Some(self.slice(start..end)),
            false => None,
        }
    }

    /// Consumes the `symbol` (after the leading whitespace). Returns false
    /// and leaves the cursor intact if the text does not start with it.
    pub fn skip_str(&mut self, symbol: &str) -> bool {
        if !self.peek_str(symbol) {
            return false;
        }

        self.cursor = self.next_text_start() + symbol.chars().count();

        true
    }

    /// Consumes the `symbol`, or fails with a syntax error.
    pub fn read_str(&mut self, symbol: &str) -> TokenResult<()> {
        match self.skip_str(symbol) {
            true => Ok(()),
            false => Err(self.expected(format!("'{symbol}'"))),
        }
    }

    /// Reads an identifier: a letter, `_` or `$`, followed by letters,
    /// digits, `_` or `$`.
    ///
    /// Completion is requested if the caret lies anywhere from the cursor to
    /// the end of the identifier, including the case where the text at the
    /// caret is not an identifier at all (the caret completes an empty
    /// prefix then).
    pub fn read_identifier(&mut self) -> TokenResult<String> {
        let token_start = self.cursor;
        let text_start = self.next_text_start();
        let text_end = self.identifier_end(text_start);

        if let Some(info) = self.completion(token_start, text_start, text_end, Vec::new()) {
            return Err(TokenError::Completion(info));
        }

        if text_start == text_end {
            return Err(self.expected("identifier"));
        }

        self.cursor = text_end;

        Ok(self.slice(text_start..text_end))
    }

    /// Reads a single character out of the `expected` set.
    ///
    /// Completion is requested if the caret lies in the leading whitespace
    /// or right at the character; the expected characters become the
    /// suggestions.
    pub fn read_one_of(&mut self, expected: &[char]) -> TokenResult<char> {
        let token_start = self.cursor;
        let text_start = self.next_text_start();
        let next = self.source.chars.get(text_start).copied();

        let text_end = match next {
            Some(ch) if expected.contains(&ch) => text_start + 1,
            _ => text_start,
        };

        if let Some(caret) = self.source.caret {
            if token_start <= caret && caret <= text_start {
                let suggestions = expected
                    .iter()
                    .map(|ch| CompactString::from(ch.to_string()))
                    .collect();

                if let Some(info) = self.completion(token_start, text_start, text_end, suggestions)
                {
                    return Err(TokenError::Completion(info));
                }
            }
        }

        match next {
            Some(ch) if expected.contains(&ch) => {
                self.cursor = text_end;
                Ok(ch)
            }

            _ => {
                let expected = expected
                    .iter()
                    .map(|ch| format!("'{ch}'"))
                    .collect::<Vec<_>>()
                    .join(", ");

                Err(self.expected(format!("one of {expected}")))
            }
        }
    }

    /// Reads the identifier `keyword`.
    ///
    /// Completion is requested, with the keyword as the only suggestion, if
    /// the caret lies within the next identifier and the text up to the
    /// caret is a prefix of the keyword. A caret within an unrelated
    /// identifier is a syntax error for this read.
    pub fn read_keyword(&mut self, keyword: &str) -> TokenResult<()> {
        let token_start = self.cursor;
        let text_start = self.next_text_start();
        let text_end = self.identifier_end(text_start);

        let suggestions = vec![CompactString::from(keyword)];

        if let Some(info) = self.completion(token_start, text_start, text_end, suggestions) {
            if keyword.starts_with(&info.text_to_caret) {
                return Err(TokenError::Completion(info));
            }

            return Err(self.expected(format!("'{keyword}'")));
        }

        if !self.matches(text_start..text_end, keyword) {
            return Err(self.expected(format!("'{keyword}'")));
        }

        self.cursor = text_end;

        Ok(())
    }

    /// Reads a numeric literal: decimal digits with an optional fraction and
    /// exponent, or a `0x` hexadecimal integer, followed by an optional type
    /// suffix (`L`, `F` or `D`, in any case).
    ///
    /// Integer literals without a suffix are `int` values, literals with a
    /// fraction or an exponent are `double` values. A literal that does not
    /// fit its type is a syntax error.
    pub fn read_number(&mut self) -> TokenResult<Value> {
        self.read_numeral(false)
    }

    /// Reads a numeric literal that follows a unary minus and returns its
    /// negated value.
    ///
    /// Decimal integers are range-checked after the negation, so
    /// `2147483648` and `9223372036854775808L` are valid here.
    pub fn read_negated_number(&mut self) -> TokenResult<Value> {
        self.read_numeral(true)
    }

    fn read_numeral(&mut self, negated: bool) -> TokenResult<Value> {
        let start = self.next_text_start();
        let chars = &self.source.chars;
        let mut end = start;

        let digits = |mut end: Site, radix: u32| {
            while chars.get(end).map_or(false, |ch| ch.is_digit(radix)) {
                end += 1;
            }

            end
        };

        let hex = chars.get(start) == Some(&'0')
            && matches!(chars.get(start + 1), Some('x') | Some('X'));

        let mut floating = false;

        if hex {
            end = digits(start + 2, 16);

            if end == start + 2 {
                return Err(self.syntax(start, "malformed hexadecimal literal"));
            }
        } else {
            end = digits(end, 10);

            if end == start {
                return Err(self.expected("number"));
            }

            if chars.get(end) == Some(&'.') && chars.get(end + 1).map_or(false, char::is_ascii_digit)
            {
                floating = true;
                end = digits(end + 1, 10);
            }

            if matches!(chars.get(end), Some('e') | Some('E')) {
                let mut exponent = end + 1;

                if matches!(chars.get(exponent), Some('+') | Some('-')) {
                    exponent += 1;
                }

                let exponent_end = digits(exponent, 10);

                if exponent_end > exponent {
                    floating = true;
                    end = exponent_end;
                }
            }
        }

        let body = self.slice(start..end);

        let suffix = match chars.get(end) {
            Some('l') | Some('L') => Some(Primitive::Long),
            Some('f') | Some('F') if !hex => Some(Primitive::Float),
            Some('d') | Some('D') if !hex => Some(Primitive::Double),
            _ => None,
        };

        if suffix.is_some() {
            end += 1;
        }

        if self.identifier_end(end) > end || chars.get(end).map_or(false, char::is_ascii_digit) {
            return Err(self.syntax(start, "malformed numeric literal"));
        }

        let primitive = match (suffix, floating) {
            (Some(primitive), _) => primitive,
            (None, true) => Primitive::Double,
            (None, false) => Primitive::Int,
        };

        let value = match primitive {
            Primitive::Float | Primitive::Double => {
                let parsed = body
                    .parse::<f64>()
                    .map_err(|_| self.syntax(start, "malformed numeric literal"))?;

                if !parsed.is_finite() {
                    return Err(self.syntax(start, "floating-point number too large"));
                }

                let parsed = match negated {
                    true => -parsed,
                    false => parsed,
                };

                match primitive {
                    Primitive::Float => Value::Float(
                        cast::f32(parsed)
                            .map_err(|_| self.syntax(start, "floating-point number too large"))?,
                    ),
                    _ => Value::Double(parsed),
                }
            }

            _ => {
                let parsed = match (hex, negated) {
                    (true, _) => u64::from_str_radix(&body[2..], 16).map(|value| value as i64),
                    (false, true) => format!("-{body}").parse::<i64>(),
                    (false, false) => body.parse::<i64>(),
                }
                .map_err(|_| self.syntax(start, "integer number too large"))?;

                match primitive {
                    Primitive::Long if hex && negated => Value::Long(parsed.wrapping_neg()),
                    Primitive::Long => Value::Long(parsed),
                    _ if hex => {
                        let bits = cast::u32(parsed)
                            .map(|value| value as i32)
                            .map_err(|_| self.syntax(start, "integer number too large"))?;

                        match negated {
                            true => Value::Int(bits.wrapping_neg()),
                            false => Value::Int(bits),
                        }
                    }
                    _ => Value::Int(
                        cast::i32(parsed)
                            .map_err(|_| self.syntax(start, "integer number too large"))?,
                    ),
                }
            }
        };

        self.cursor = end;

        Ok(value)
    }

    /// Reads a double-quoted string literal with backslash escapes.
    pub fn read_string_literal(&mut self) -> TokenResult<String> {
        let start = self.next_text_start();

        if self.source.chars.get(start) != Some(&'"') {
            return Err(self.expected("string literal"));
        }

        let (content, end) = self.read_quoted(start, '"')?;

        self.cursor = end;

        Ok(content)
    }

    /// Reads a single-quoted character literal with backslash escapes.
    pub fn read_char_literal(&mut self) -> TokenResult<char> {
        let start = self.next_text_start();

        if self.source.chars.get(start) != Some(&'\'') {
            return Err(self.expected("character literal"));
        }

        let (content, end) = self.read_quoted(start, '\'')?;
        let mut chars = content.chars();

        let (Some(ch), None) = (chars.next(), chars.next()) else {
            return Err(self.syntax(start, "character literal must contain one character"));
        };

        self.cursor = end;

        Ok(ch)
    }

    /// Creates a syntax error for an unexpected token at the next token
    /// start.
    pub fn expected(&self, what: impl Display) -> TokenError {
        let position = self.next_text_start();

        let found = match self.source.chars.get(position) {
            Some(ch) => format!("'{ch}'"),
            None => String::from("end of expression"),
        };

        self.syntax(position, format!("expected {what}, found {found}"))
    }

    fn syntax(&self, position: Site, message: impl Into<String>) -> TokenError {
        TokenError::Syntax {
            position,
            message: message.into(),
        }
    }

    fn read_quoted(&self, start: Site, quote: char) -> TokenResult<(String, Site)> {
        let chars = &self.source.chars;
        let mut content = String::new();
        let mut index = start + 1;

        loop {
            let Some(ch) = chars.get(index).copied() else {
                return Err(self.syntax(start, "unterminated literal"));
            };

            index += 1;

            if ch == quote {
                return Ok((content, index));
            }

            if ch != '\\' {
                content.push(ch);
                continue;
            }

            let Some(escape) = chars.get(index).copied() else {
                return Err(self.syntax(start, "unterminated literal"));
            };

            index += 1;

            content.push(match escape {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                '0' => '\0',
                '\\' | '\'' | '"' => escape,
                'u' => {
                    let code = self.slice(index..index + 4);

                    let decoded = match code.chars().count() == 4 {
                        true => u32::from_str_radix(&code, 16).ok().and_then(char::from_u32),
                        false => None,
                    };

                    let Some(decoded) = decoded else {
                        return Err(self.syntax(index - 2, "malformed unicode escape"));
                    };

                    index += 4;

                    decoded
                }
                _ => return Err(self.syntax(index - 2, "unknown escape sequence")),
            });
        }
    }

    fn completion(
        &self,
        token_start: Site,
        text_start: Site,
        text_end: Site,
        suggestions: Vec<CompactString>,
    ) -> Option<CompletionInfo> {
        let caret = self.source.caret?;

        if caret < token_start || caret > text_end {
            return None;
        }

        let (text_start, text_end) = match caret < text_start {
            true => (caret, caret),
            false => (text_start, text_end),
        };

        let mut token_end = text_end;

        while self
            .source
            .chars
            .get(token_end)
            .map_or(false, |ch| is_whitespace(*ch))
        {
            token_end += 1;
        }

        Some(CompletionInfo {
            token_start,
            token_end,
            text_start,
            text_end,
            caret,
            text: self.slice(text_start..text_end),
            text_to_caret: self.slice(text_start..caret),
            suggestions,
        })
    }

    fn next_text_start(&self) -> Site {
        let mut site = self.cursor;

        while self
            .source
            .chars
            .get(site)
            .map_or(false, |ch| is_whitespace(*ch))
        {
            site += 1;
        }

        site
    }

    fn identifier_end(&self, start: Site) -> Site {
        let chars = &self.source.chars;

        match chars.get(start) {
            Some(ch) if is_identifier_start(*ch) => (),
            _ => return start,
        }

        let mut end = start + 1;

        while chars.get(end).map_or(false, |ch| is_identifier_part(*ch)) {
            end += 1;
        }

        end
    }

    fn matches(&self, span: SiteSpan, expected: &str) -> bool {
        let chars = &self.source.chars[span];

        chars.len() == expected.chars().count()
            && chars.iter().copied().eq(expected.chars())
    }
}

/// Returns true for the characters that separate tokens.
#[inline(always)]
pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

/// Returns true for the characters that may start an identifier.
#[inline(always)]
pub fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$'
}

/// Returns true for the characters that may continue an identifier.
#[inline(always)]
pub fn is_identifier_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'
}

#[cfg(test)]
mod tests {
    use crate::{
        runtime::Value,
        syntax::{TokenError, TokenStream},
    };

    fn completion(text: &str, caret: usize) -> (usize, usize, String) {
        let mut stream = TokenStream::new(text, Some(caret));

        match stream.read_identifier() {
            Err(TokenError::Completion(info)) => (info.text_start, info.text_end, info.text_to_caret),
            other => panic!("Unexpected read result {other:?}."),
        }
    }

    #[test]
    fn test_identifiers() {
        let mut stream = TokenStream::new("  foo_1 $bar", None);

        assert_eq!(stream.read_identifier(), Ok(String::from("foo_1")));
        assert_eq!(stream.position(), 7);
        assert_eq!(stream.read_identifier(), Ok(String::from("$bar")));
        assert!(stream.is_at_end());
        assert!(matches!(stream.read_identifier(), Err(TokenError::Syntax { position: 12, .. })));
    }

    #[test]
    fn test_identifier_completion() {
        assert_eq!(completion("value", 3), (0, 5, String::from("val")));
        assert_eq!(completion("value", 5), (0, 5, String::from("value")));
        assert_eq!(completion("value", 0), (0, 5, String::new()));
        assert_eq!(completion("   value", 1), (1, 1, String::new()));
        assert_eq!(completion("", 0), (0, 0, String::new()));
        assert_eq!(completion("12", 0), (0, 0, String::new()));

        let mut stream = TokenStream::new("value ", Some(6));

        assert_eq!(stream.read_identifier(), Ok(String::from("value")));
    }

    #[test]
    fn test_one_of() {
        let mut stream = TokenStream::new(" .x", None);

        assert_eq!(stream.read_one_of(&['.', '[']), Ok('.'));
        assert!(matches!(stream.read_one_of(&['.']), Err(TokenError::Syntax { .. })));

        let mut stream = TokenStream::new("a .x", Some(2));

        stream.set_position(1);

        match stream.read_one_of(&['.', '[']) {
            Err(TokenError::Completion(info)) => {
                assert_eq!(info.text_start, 2);
                assert_eq!(info.text_end, 3);
                assert_eq!(info.suggestions, ["." , "["]);
            }
            other => panic!("Unexpected read result {other:?}."),
        }

        let mut stream = TokenStream::new("a.x", Some(3));

        stream.set_position(1);

        assert_eq!(stream.read_one_of(&['.']), Ok('.'));
    }

    #[test]
    fn test_keywords() {
        let mut stream = TokenStream::new("new Foo", None);

        assert!(stream.peek_keyword("new"));
        assert!(!stream.peek_keyword("ne"));
        assert_eq!(stream.read_keyword("new"), Ok(()));
        assert!(stream.read_keyword("new").is_err());

        let mut stream = TokenStream::new("ne", Some(2));

        assert!(matches!(stream.read_keyword("new"), Err(TokenError::Completion(_))));

        let mut stream = TokenStream::new("xy", Some(2));

        assert!(matches!(stream.read_keyword("new"), Err(TokenError::Syntax { .. })));
    }

    #[test]
    fn test_numbers() {
        fn read(text: &str) -> Option<Value> {
            TokenStream::new(text, None).read_number().ok()
        }

        assert!(matches!(read("42"), Some(Value::Int(42))));
        assert!(matches!(read("42L"), Some(Value::Long(42))));
        assert!(matches!(read("0xFF"), Some(Value::Int(255))));
        assert!(matches!(read("0xFFFFFFFF"), Some(Value::Int(-1))));
        assert!(matches!(read("2.5"), Some(Value::Double(value)) if value == 2.5));
        assert!(matches!(read("1e3"), Some(Value::Double(value)) if value == 1000.0));
        assert!(matches!(read("1.5f"), Some(Value::Float(value)) if value == 1.5));
        assert!(matches!(read("3d"), Some(Value::Double(value)) if value == 3.0));
        assert!(read("2147483648").is_none());
        assert!(matches!(read("2147483648L"), Some(Value::Long(2147483648))));
        assert!(read("1e999f").is_none());
        assert!(read("12abc").is_none());

        let mut stream = TokenStream::new("1.toString", None);

        assert!(matches!(stream.read_number(), Ok(Value::Int(1))));
        assert_eq!(stream.position(), 1);
    }

    #[test]
    fn test_negated_numbers() {
        fn read(text: &str) -> Option<Value> {
            TokenStream::new(text, None).read_negated_number().ok()
        }

        assert!(matches!(read("2147483648"), Some(Value::Int(i32::MIN))));
        assert!(matches!(read("9223372036854775808L"), Some(Value::Long(i64::MIN))));
        assert!(matches!(read("42"), Some(Value::Int(-42))));
        assert!(matches!(read("0x10"), Some(Value::Int(-16))));
        assert!(matches!(read("0x80000000"), Some(Value::Int(i32::MIN))));
        assert!(matches!(read("2.5"), Some(Value::Double(value)) if value == -2.5));
        assert!(matches!(read("0"), Some(Value::Int(0))));
        assert!(read("2147483649").is_none());
        assert!(read("9223372036854775809L").is_none());
    }

    #[test]
    fn test_literals() {
        let mut stream = TokenStream::new(r#" "a\"bA\n" 'x' '\'' "#, None);

        assert_eq!(stream.read_string_literal(), Ok(String::from("a\"bA\n")));
        assert_eq!(stream.read_char_literal(), Ok('x'));
        assert_eq!(stream.read_char_literal(), Ok('\''));

        let mut stream = TokenStream::new(r#""open"#, None);

        assert!(matches!(
            stream.read_string_literal(),
            Err(TokenError::Syntax { position: 0, .. }),
        ));
    }
}
