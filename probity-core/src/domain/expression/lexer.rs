// probity-core/src/domain/expression/lexer.rs

use super::ExprError;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Column(String),
    Ident(String),
    True,
    False,
    And,
    Or,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '[' => {
                chars.next();
                tokens.push(read_column(&mut chars)?);
            }
            '"' | '\'' => {
                chars.next();
                tokens.push(read_string(&mut chars, c)?);
            }
            c if c.is_ascii_digit() => {
                tokens.push(read_number(&mut chars)?);
            }
            c if c.is_alphabetic() || c == '_' => {
                tokens.push(read_word(&mut chars));
            }
            '=' => {
                chars.next();
                if chars.next_if_eq(&'=').is_none() {
                    return Err(ExprError::UnexpectedChar('='));
                }
                tokens.push(Token::Eq);
            }
            '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_none() {
                    return Err(ExprError::UnexpectedChar('!'));
                }
                tokens.push(Token::Ne);
            }
            '<' => {
                chars.next();
                tokens.push(if chars.next_if_eq(&'=').is_some() {
                    Token::Le
                } else {
                    Token::Lt
                });
            }
            '>' => {
                chars.next();
                tokens.push(if chars.next_if_eq(&'=').is_some() {
                    Token::Ge
                } else {
                    Token::Gt
                });
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            other => return Err(ExprError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

fn read_column(chars: &mut Peekable<Chars<'_>>) -> Result<Token, ExprError> {
    let mut name = String::new();
    for c in chars.by_ref() {
        if c == ']' {
            return Ok(Token::Column(name.trim().to_string()));
        }
        name.push(c);
    }
    Err(ExprError::UnterminatedColumn)
}

fn read_string(chars: &mut Peekable<Chars<'_>>, quote: char) -> Result<Token, ExprError> {
    let mut value = String::new();
    for c in chars.by_ref() {
        if c == quote {
            return Ok(Token::Str(value));
        }
        value.push(c);
    }
    Err(ExprError::UnterminatedString)
}

fn read_number(chars: &mut Peekable<Chars<'_>>) -> Result<Token, ExprError> {
    let mut text = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }
    text.parse::<f64>()
        .map(Token::Number)
        .map_err(|_| ExprError::MalformedNumber(text))
}

fn read_word(chars: &mut Peekable<Chars<'_>>) -> Token {
    let mut word = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '_' {
            word.push(c);
            chars.next();
        } else {
            break;
        }
    }
    match word.to_ascii_lowercase().as_str() {
        "and" => Token::And,
        "or" => Token::Or,
        "not" => Token::Not,
        "true" => Token::True,
        "false" => Token::False,
        lowered => Token::Ident(lowered.to_string()),
    }
}
