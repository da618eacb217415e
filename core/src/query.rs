//! Query expressions over the content field.
//!
//! Grammar (operators are uppercase, juxtaposition means AND):
//! - `rust programming` -> AND of two terms
//! - `rust OR go` -> either term
//! - `rust NOT java` -> rust without java
//! - `"exact phrase"` -> consecutive terms
//! - `(rust OR go) AND memory` -> grouping

use crate::error::{Error, Result};

/// Deepest allowed nesting of `NOT` and parentheses.
pub const MAX_DEPTH: usize = 256;

/// Parsed query tree. Literals are raw text; normalization happens at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Term(String),
    Phrase(String),
    And(Vec<Query>),
    Or(Vec<Query>),
    Not(Box<Query>),
}

impl Query {
    /// Raw text of every literal that can contribute to a match (literals under NOT excluded).
    pub fn positive_text(&self) -> String {
        let mut parts = Vec::new();
        self.collect_positive(&mut parts);
        parts.join(" ")
    }

    fn collect_positive<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Query::Term(t) | Query::Phrase(t) => out.push(t),
            Query::And(children) | Query::Or(children) => {
                for child in children {
                    child.collect_positive(out);
                }
            }
            Query::Not(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    LParen,
    RParen,
    And,
    Or,
    Not,
}

fn lex(input: &str) -> Result<Vec<(Token, usize)>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '(' {
            chars.next();
            tokens.push((Token::LParen, pos));
        } else if c == ')' {
            chars.next();
            tokens.push((Token::RParen, pos));
        } else if c == '"' {
            chars.next();
            let mut phrase = String::new();
            let mut closed = false;
            for (_, c) in chars.by_ref() {
                if c == '"' {
                    closed = true;
                    break;
                }
                phrase.push(c);
            }
            if !closed {
                return Err(Error::syntax(pos, "unterminated quote"));
            }
            tokens.push((Token::Quoted(phrase), pos));
        } else {
            let mut word = String::new();
            while let Some(&(_, c)) = chars.peek() {
                if c.is_whitespace() || c == '(' || c == ')' || c == '"' {
                    break;
                }
                word.push(c);
                chars.next();
            }
            let token = match word.as_str() {
                "AND" => Token::And,
                "OR" => Token::Or,
                "NOT" => Token::Not,
                _ => Token::Word(word),
            };
            tokens.push((token, pos));
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.pos).map(|(_, p)| *p).unwrap_or(self.end)
    }

    fn descend(&mut self, offset: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::syntax(offset, "query nested too deeply"));
        }
        Ok(())
    }

    fn starts_operand(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Word(_) | Token::Quoted(_) | Token::LParen | Token::Not)
        )
    }

    fn parse_or(&mut self) -> Result<Query> {
        let mut children = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            if !self.starts_operand() {
                return Err(Error::syntax(self.offset(), "OR is missing its right operand"));
            }
            children.push(self.parse_and()?);
        }
        Ok(collapse(children, Query::Or))
    }

    fn parse_and(&mut self) -> Result<Query> {
        let mut children = vec![self.parse_unary()?];
        loop {
            if self.peek() == Some(&Token::And) {
                self.pos += 1;
                if !self.starts_operand() {
                    return Err(Error::syntax(self.offset(), "AND is missing its right operand"));
                }
            } else if !self.starts_operand() {
                break;
            }
            children.push(self.parse_unary()?);
        }
        Ok(collapse(children, Query::And))
    }

    fn parse_unary(&mut self) -> Result<Query> {
        if self.peek() == Some(&Token::Not) {
            self.descend(self.offset())?;
            self.pos += 1;
            if !self.starts_operand() {
                return Err(Error::syntax(self.offset(), "NOT is missing its operand"));
            }
            let inner = self.parse_unary()?;
            self.depth -= 1;
            return Ok(Query::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Query> {
        let offset = self.offset();
        let Some((token, _)) = self.tokens.get(self.pos).cloned() else {
            return Err(Error::syntax(offset, "unexpected end of query"));
        };
        self.pos += 1;
        match token {
            Token::Word(w) => Ok(Query::Term(w)),
            Token::Quoted(p) => Ok(Query::Phrase(p)),
            Token::LParen => {
                if self.peek() == Some(&Token::RParen) {
                    return Err(Error::syntax(offset, "empty group"));
                }
                self.descend(offset)?;
                let inner = self.parse_or()?;
                if self.peek() != Some(&Token::RParen) {
                    return Err(Error::syntax(offset, "unbalanced '('"));
                }
                self.pos += 1;
                self.depth -= 1;
                Ok(inner)
            }
            Token::RParen => Err(Error::syntax(offset, "unbalanced ')'")),
            Token::And | Token::Or | Token::Not => {
                Err(Error::syntax(offset, "operator is missing its left operand"))
            }
        }
    }
}

fn collapse(mut children: Vec<Query>, wrap: fn(Vec<Query>) -> Query) -> Query {
    if children.len() == 1 {
        children.remove(0)
    } else {
        wrap(children)
    }
}

/// Parse a query expression. Blank input parses to `None`.
pub fn parse(input: &str) -> Result<Option<Query>> {
    let tokens = lex(input)?;
    if tokens.is_empty() {
        return Ok(None);
    }
    let mut parser = Parser { tokens, pos: 0, end: input.len(), depth: 0 };
    let query = parser.parse_or()?;
    if parser.pos < parser.tokens.len() {
        return Err(Error::syntax(parser.offset(), "unexpected token"));
    }
    Ok(Some(query))
}
