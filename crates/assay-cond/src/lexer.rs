//! Lexer for edit-condition strings.
//!
//! Token consumers run in priority order: operator symbols and parentheses,
//! numbers, the `nullptr`/`INDEX_NONE`/`true`/`false` keywords, and finally
//! free-form property names (bare, quoted or `EnumType::Value`).

use crate::error::ParseError;
use crate::token::{Operator, Token, TokenKind};

/// Characters that end an unquoted property name.
const BREAKING_CHARS: [char; 14] = [
    '|', '=', '&', '>', '<', '!', '+', '-', '*', '/', ' ', '\t', '(', ')',
];

pub struct Lexer<'a> {
    source: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    /// Tokenize the entire source
    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();
            if self.rest().is_empty() {
                break;
            }
            let start = self.position;
            let kind = self.next_kind()?;
            tokens.push(Token::new(kind, start));
        }

        Ok(tokens)
    }

    fn next_kind(&mut self) -> Result<TokenKind, ParseError> {
        if let Some(op) = Operator::ALL
            .into_iter()
            .find(|op| self.rest().starts_with(op.symbol()))
        {
            self.position += op.symbol().len();
            return Ok(TokenKind::Operator(op));
        }
        if self.match_str("(") {
            return Ok(TokenKind::OpenParen);
        }
        if self.match_str(")") {
            return Ok(TokenKind::CloseParen);
        }
        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return self.number();
        }
        if self.match_keyword("nullptr", false) {
            return Ok(TokenKind::NullPtr);
        }
        if self.match_keyword("INDEX_NONE", false) {
            return Ok(TokenKind::IndexNone);
        }
        if self.match_keyword("true", true) {
            return Ok(TokenKind::Bool(true));
        }
        if self.match_keyword("false", true) {
            return Ok(TokenKind::Bool(false));
        }
        self.property_name()
    }

    fn rest(&self) -> &'a str {
        &self.source[self.position..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.position += rest.len() - rest.trim_start().len();
    }

    fn match_str(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.position += expected.len();
            true
        } else {
            false
        }
    }

    /// Match a keyword that is not merely the prefix of a longer property name.
    fn match_keyword(&mut self, keyword: &str, ignore_case: bool) -> bool {
        let rest = self.rest();
        let Some(head) = rest.get(..keyword.len()) else {
            return false;
        };
        let matches = if ignore_case {
            head.eq_ignore_ascii_case(keyword)
        } else {
            head == keyword
        };
        let at_boundary = rest[keyword.len()..]
            .chars()
            .next()
            .map_or(true, |c| BREAKING_CHARS.contains(&c) || c.is_whitespace());
        if matches && at_boundary {
            self.position += keyword.len();
            true
        } else {
            false
        }
    }

    fn number(&mut self) -> Result<TokenKind, ParseError> {
        let rest = self.rest();
        let mut end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());

        // Fractional part only when a digit follows the dot
        if rest[end..].starts_with('.')
            && rest[end + 1..].chars().next().is_some_and(|c| c.is_ascii_digit())
        {
            let fraction = &rest[end + 1..];
            end += 1 + fraction
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(fraction.len());
        }

        let text = &rest[..end];
        let value: f64 = text
            .parse()
            .map_err(|_| ParseError::InvalidNumber(text.to_string()))?;
        self.position += end;
        Ok(TokenKind::Number(value))
    }

    fn property_name(&mut self) -> Result<TokenKind, ParseError> {
        let start = self.position;
        let rest = self.rest();
        let mut chars = rest.char_indices();

        let name = match chars.next() {
            Some((_, quote @ ('"' | '\''))) => {
                let mut slashes = 0;
                let mut end = None;
                for (i, c) in chars {
                    if c == quote && slashes % 2 == 0 {
                        end = Some(i);
                        break;
                    }
                    slashes = if c == '\\' { slashes + 1 } else { 0 };
                }
                let end = end.ok_or(ParseError::UnterminatedQuote { position: start })?;
                self.position += end + quote.len_utf8();
                unescape(&rest[quote.len_utf8()..end])
            }
            Some((_, first)) => {
                let end = rest.find(BREAKING_CHARS).unwrap_or(rest.len());
                if end == 0 {
                    return Err(ParseError::UnexpectedCharacter {
                        found: first,
                        position: start,
                    });
                }
                self.position += end;
                rest[..end].to_string()
            }
            None => return Err(ParseError::Empty),
        };

        if !name.contains(':') {
            return Ok(TokenKind::Property(name));
        }

        let Some(colons) = name.find("::") else {
            return Err(ParseError::SingleColon(name));
        };
        if colons == 0 {
            return Err(ParseError::MissingEnumType(name));
        }
        let value = &name[colons + 2..];
        if value.is_empty() {
            return Err(ParseError::MissingEnumValue(name));
        }
        Ok(TokenKind::Enum {
            enum_type: name[..colons].to_string(),
            value: value.to_string(),
        })
    }
}

/// Replace backslash escapes inside a quoted property name.
fn unescape(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some(other) => value.push(other),
            None => value.push('\\'),
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    fn property(name: &str) -> TokenKind {
        TokenKind::Property(name.to_string())
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("== != <= < >= > ! && || + - * / &"),
            Operator::ALL.into_iter().map(TokenKind::Operator).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_comparison_without_spaces() {
        assert_eq!(
            kinds("Int>=20"),
            vec![
                property("Int"),
                TokenKind::Operator(Operator::GreaterEqual),
                TokenKind::Number(20.0),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("42 3.5"), vec![TokenKind::Number(42.0), TokenKind::Number(3.5)]);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("nullptr INDEX_NONE TRUE false"),
            vec![
                TokenKind::NullPtr,
                TokenKind::IndexNone,
                TokenKind::Bool(true),
                TokenKind::Bool(false),
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_a_property() {
        assert_eq!(kinds("trueCount"), vec![property("trueCount")]);
        assert_eq!(kinds("nullptrish"), vec![property("nullptrish")]);
    }

    #[test]
    fn test_enum_literal() {
        assert_eq!(
            kinds("Enum == ESimpleEnum::Two"),
            vec![
                property("Enum"),
                TokenKind::Operator(Operator::Equal),
                TokenKind::Enum {
                    enum_type: "ESimpleEnum".to_string(),
                    value: "Two".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_quoted_property_name() {
        assert_eq!(kinds(r#""My Property""#), vec![property("My Property")]);
        assert_eq!(kinds(r#"'It\'s'"#), vec![property("It's")]);
    }

    #[test]
    fn test_groups() {
        assert_eq!(
            kinds("!(A)"),
            vec![
                TokenKind::Operator(Operator::Not),
                TokenKind::OpenParen,
                property("A"),
                TokenKind::CloseParen,
            ]
        );
    }

    #[test]
    fn test_enum_errors() {
        assert_eq!(
            Lexer::new("Enum == ESimpleEnum:Two").tokenize().unwrap_err(),
            ParseError::SingleColon("ESimpleEnum:Two".to_string())
        );
        assert_eq!(
            Lexer::new("::Two").tokenize().unwrap_err(),
            ParseError::MissingEnumType("::Two".to_string())
        );
        assert_eq!(
            Lexer::new("ESimpleEnum::").tokenize().unwrap_err(),
            ParseError::MissingEnumValue("ESimpleEnum::".to_string())
        );
    }

    #[test]
    fn test_lone_pipe_is_rejected() {
        assert_eq!(
            Lexer::new("A | B").tokenize().unwrap_err(),
            ParseError::UnexpectedCharacter {
                found: '|',
                position: 2
            }
        );
    }

    #[test]
    fn test_unterminated_quote() {
        assert_eq!(
            Lexer::new("\"Open").tokenize().unwrap_err(),
            ParseError::UnterminatedQuote { position: 0 }
        );
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::new("A && B").tokenize().unwrap();
        let positions: Vec<_> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 2, 5]);
    }
}
