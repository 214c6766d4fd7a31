use serde::Serialize;
use std::fmt;
use std::mem;

/// The kinds of tokens recognised by the scanner.
///
/// `STRING` and `NUMBER` carry their literal payloads; every other variant is
/// a punctuator, operator, keyword, `IDENTIFIER`, or the `EOF` marker.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Serialize)]
pub enum TokenType {
    // Single-character punctuation.
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACE,
    RIGHT_BRACE,
    COMMA,
    DOT,
    MINUS,
    PLUS,
    SEMICOLON,
    SLASH,
    STAR,

    // One or two character operators.
    BANG,
    BANG_EQUAL,
    EQUAL,
    EQUAL_EQUAL,
    GREATER,
    GREATER_EQUAL,
    LESS,
    LESS_EQUAL,

    // Literals.
    IDENTIFIER,

    /// String literal contents without the surrounding quotes.
    #[serde(rename = "STRING")]
    STRING(String),

    #[serde(rename = "NUMBER")]
    NUMBER(f64),

    // Keywords.
    AND,
    CLASS,
    ELSE,
    FALSE,
    FUN,
    FOR,
    IF,
    NIL,
    OR,
    PRINT,
    RETURN,
    SUPER,
    THIS,
    TRUE,
    VAR,
    WHILE,

    EOF,
}

impl TokenType {
    /// Upper-case variant name without any payload, e.g. `"BANG_EQUAL"`.
    pub fn name(&self) -> &'static str {
        match self {
            TokenType::LEFT_PAREN => "LEFT_PAREN",
            TokenType::RIGHT_PAREN => "RIGHT_PAREN",
            TokenType::LEFT_BRACE => "LEFT_BRACE",
            TokenType::RIGHT_BRACE => "RIGHT_BRACE",
            TokenType::COMMA => "COMMA",
            TokenType::DOT => "DOT",
            TokenType::MINUS => "MINUS",
            TokenType::PLUS => "PLUS",
            TokenType::SEMICOLON => "SEMICOLON",
            TokenType::SLASH => "SLASH",
            TokenType::STAR => "STAR",
            TokenType::BANG => "BANG",
            TokenType::BANG_EQUAL => "BANG_EQUAL",
            TokenType::EQUAL => "EQUAL",
            TokenType::EQUAL_EQUAL => "EQUAL_EQUAL",
            TokenType::GREATER => "GREATER",
            TokenType::GREATER_EQUAL => "GREATER_EQUAL",
            TokenType::LESS => "LESS",
            TokenType::LESS_EQUAL => "LESS_EQUAL",
            TokenType::IDENTIFIER => "IDENTIFIER",
            TokenType::STRING(_) => "STRING",
            TokenType::NUMBER(_) => "NUMBER",
            TokenType::AND => "AND",
            TokenType::CLASS => "CLASS",
            TokenType::ELSE => "ELSE",
            TokenType::FALSE => "FALSE",
            TokenType::FUN => "FUN",
            TokenType::FOR => "FOR",
            TokenType::IF => "IF",
            TokenType::NIL => "NIL",
            TokenType::OR => "OR",
            TokenType::PRINT => "PRINT",
            TokenType::RETURN => "RETURN",
            TokenType::SUPER => "SUPER",
            TokenType::THIS => "THIS",
            TokenType::TRUE => "TRUE",
            TokenType::VAR => "VAR",
            TokenType::WHILE => "WHILE",
            TokenType::EOF => "EOF",
        }
    }
}

impl PartialEq for TokenType {
    /// Two token types are equal if they share the same variant, ignoring any
    /// literal payload. The parser relies on this to match `NUMBER(_)`.
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

/// A scanned token: its type, the exact source lexeme, and the 1‑based line
/// it was found on.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new<S: Into<String>>(token_type: TokenType, lexeme: S, line: usize) -> Self {
        Self {
            token_type,
            lexeme: lexeme.into(),
            line,
        }
    }
}

/// Renders a number literal the way `tokenize` prints it: integral values
/// keep one decimal (`3` → `3.0`), everything else uses the shortest form.
pub(crate) fn literal_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        format!("{}.0", buf.format(n as i64))
    } else {
        n.to_string()
    }
}

impl fmt::Display for Token {
    /// `TYPE lexeme literal`, with `null` when the token carries no literal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = self.token_type.name();

        match &self.token_type {
            TokenType::STRING(s) => write!(f, "{} {} {}", variant, self.lexeme, s),
            TokenType::NUMBER(n) => {
                write!(f, "{} {} {}", variant, self.lexeme, literal_number(*n))
            }
            _ => write!(f, "{} {} null", variant, self.lexeme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_literals_keep_one_decimal_when_integral() {
        assert_eq!(literal_number(3.0), "3.0");
        assert_eq!(literal_number(3.25), "3.25");
    }

    #[test]
    fn display_matches_tokenize_format() {
        let tok = Token::new(TokenType::STRING("hi".into()), "\"hi\"", 1);
        assert_eq!(tok.to_string(), "STRING \"hi\" hi");

        let tok = Token::new(TokenType::SEMICOLON, ";", 1);
        assert_eq!(tok.to_string(), "SEMICOLON ; null");
    }

    #[test]
    fn token_types_compare_by_variant() {
        assert_eq!(TokenType::NUMBER(1.0), TokenType::NUMBER(2.0));
        assert_ne!(TokenType::NUMBER(1.0), TokenType::STRING("1".into()));
    }
}
