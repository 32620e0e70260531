//! Tokenization of `.hdm` manifest text using `nom`.
//!
//! Produces a stream of [`Token`]s from raw input for the parser to consume.
//! Whitespace and `//` line comments are discarded between tokens.

use hdlplan_common::error::{HdlplanError, Result};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace1, not_line_ending},
    combinator::value,
    multi::many0,
    sequence::preceded,
};

/// A token in the manifest language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `MODULE` keyword.
    Module,
    /// `BUILD` keyword.
    Build,
    /// `DEVICE` keyword.
    Device,
    /// `PREFIX` keyword.
    Prefix,
    /// `EXACT` keyword.
    Exact,
    /// `ACTION` keyword.
    Action,
    /// `BACKEND` keyword.
    Backend,
    /// `VARIANTS` keyword.
    Variants,
    /// An identifier (module name, property name, platform).
    Identifier(String),
    /// A double-quoted string literal.
    StringLiteral(String),
    /// `{` opening brace.
    BraceOpen,
    /// `}` closing brace.
    BraceClose,
    /// `[` opening bracket.
    BracketOpen,
    /// `]` closing bracket.
    BracketClose,
    /// `=` assignment.
    Equals,
    /// `,` comma separator.
    Comma,
}

/// Skippable items: whitespace or line comments.
fn skip_trivia(input: &str) -> IResult<&str, ()> {
    let comment = value((), preceded(tag("//"), not_line_ending));
    let ws = value((), multispace1);
    let (input, _) = many0(alt((ws, comment))).parse(input)?;
    Ok((input, ()))
}

/// Parses a double-quoted string literal with basic escape support.
fn string_literal(input: &str) -> IResult<&str, Token> {
    let (input, _) = char('"')(input)?;
    let mut result = String::new();
    let mut chars = input.char_indices();
    loop {
        match chars.next() {
            Some((idx, '"')) => {
                let remaining = &input[idx + 1..];
                return Ok((remaining, Token::StringLiteral(result)));
            }
            Some((_, '\\')) => match chars.next() {
                Some((_, 'n')) => result.push('\n'),
                Some((_, 't')) => result.push('\t'),
                Some((_, '\\')) => result.push('\\'),
                Some((_, '"')) => result.push('"'),
                Some((_, c)) => {
                    result.push('\\');
                    result.push(c);
                }
                None => {
                    return Err(nom::Err::Failure(nom::error::Error::new(
                        input,
                        nom::error::ErrorKind::Char,
                    )));
                }
            },
            Some((_, '\n')) | None => {
                return Err(nom::Err::Failure(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::Char,
                )));
            }
            Some((_, c)) => result.push(c),
        }
    }
}

const fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

const fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Parses an identifier or keyword.
fn identifier_or_keyword(input: &str) -> IResult<&str, Token> {
    let (input, first) = take_while1(is_ident_start)(input)?;
    let (input, rest) = take_while(is_ident_continue)(input)?;
    let word = format!("{first}{rest}");
    let token = match word.as_str() {
        "MODULE" => Token::Module,
        "BUILD" => Token::Build,
        "DEVICE" => Token::Device,
        "PREFIX" => Token::Prefix,
        "EXACT" => Token::Exact,
        "ACTION" => Token::Action,
        "BACKEND" => Token::Backend,
        "VARIANTS" => Token::Variants,
        _ => Token::Identifier(word),
    };
    Ok((input, token))
}

/// Parses a symbol token.
fn symbol(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::BraceOpen, char('{')),
        value(Token::BraceClose, char('}')),
        value(Token::BracketOpen, char('[')),
        value(Token::BracketClose, char(']')),
        value(Token::Equals, char('=')),
        value(Token::Comma, char(',')),
    ))
    .parse(input)
}

/// Parses a single token (after trivia has been skipped).
fn single_token(input: &str) -> IResult<&str, Token> {
    alt((string_literal, symbol, identifier_or_keyword)).parse(input)
}

/// Tokenizes manifest source text into a vector of tokens.
///
/// Whitespace and `//` line comments are discarded.
///
/// # Errors
///
/// Returns an error if the input contains characters that cannot be
/// tokenized or an unterminated string literal.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, ()) = skip_trivia(remaining).map_err(|e| {
            HdlplanError::manifest(format!("lexer error skipping whitespace: {e}"))
        })?;
        remaining = rest;

        if remaining.is_empty() {
            break;
        }

        let (rest, token) = single_token(remaining).map_err(|e| {
            let snippet: String = remaining.chars().take(20).collect();
            HdlplanError::manifest(format!("unexpected character at: \"{snippet}\" ({e})"))
        })?;
        tokens.push(token);
        remaining = rest;
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_keywords() {
        let tokens = tokenize("MODULE BUILD DEVICE PREFIX EXACT ACTION BACKEND VARIANTS")
            .expect("should tokenize");
        assert_eq!(
            tokens,
            vec![
                Token::Module,
                Token::Build,
                Token::Device,
                Token::Prefix,
                Token::Exact,
                Token::Action,
                Token::Backend,
                Token::Variants,
            ]
        );
    }

    #[test]
    fn keywords_are_case_sensitive() {
        let tokens = tokenize("module").expect("should tokenize");
        assert_eq!(tokens, vec![Token::Identifier("module".into())]);
    }

    #[test]
    fn tokenize_symbols() {
        let tokens = tokenize("{ } [ ] = ,").expect("should tokenize");
        assert_eq!(
            tokens,
            vec![
                Token::BraceOpen,
                Token::BraceClose,
                Token::BracketOpen,
                Token::BracketClose,
                Token::Equals,
                Token::Comma,
            ]
        );
    }

    #[test]
    fn tokenize_string_with_escapes() {
        let tokens = tokenize(r#""rtl\\vhdl\"x\".vhd""#).expect("should tokenize");
        assert_eq!(
            tokens,
            vec![Token::StringLiteral("rtl\\vhdl\"x\".vhd".into())]
        );
    }

    #[test]
    fn tokenize_identifier_with_dash() {
        let tokens = tokenize("fofb_cc_rx_fifo general-cores").expect("should tokenize");
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("fofb_cc_rx_fifo".into()),
                Token::Identifier("general-cores".into()),
            ]
        );
    }

    #[test]
    fn tokenize_skips_comments() {
        let input = "MODULE pkg // package only\n{ }";
        let tokens = tokenize(input).expect("should tokenize");
        assert_eq!(
            tokens,
            vec![
                Token::Module,
                Token::Identifier("pkg".into()),
                Token::BraceOpen,
                Token::BraceClose,
            ]
        );
    }

    #[test]
    fn tokenize_device_rule() {
        let input = r#"DEVICE xilinx PREFIX "XC6V" { files = ["a.vhd"] }"#;
        let tokens = tokenize(input).expect("should tokenize");
        assert_eq!(
            tokens,
            vec![
                Token::Device,
                Token::Identifier("xilinx".into()),
                Token::Prefix,
                Token::StringLiteral("XC6V".into()),
                Token::BraceOpen,
                Token::Identifier("files".into()),
                Token::Equals,
                Token::BracketOpen,
                Token::StringLiteral("a.vhd".into()),
                Token::BracketClose,
                Token::BraceClose,
            ]
        );
    }

    #[test]
    fn tokenize_empty_and_comment_only_input() {
        assert!(tokenize("").expect("should tokenize").is_empty());
        assert!(
            tokenize("// header\n// another")
                .expect("should tokenize")
                .is_empty()
        );
    }

    #[test]
    fn tokenize_error_on_invalid_char() {
        let err = tokenize("MODULE @pkg").unwrap_err();
        assert!(err.to_string().contains("@pkg"), "got: {err}");
    }

    #[test]
    fn tokenize_error_on_unterminated_string() {
        assert!(tokenize("files = [\"a.vhd\n]").is_err());
    }
}
