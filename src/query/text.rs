//! Compiles query text in the store's `SELECT * FROM alias WHERE ...` dialect into a
//! [`Predicate`].
//!
//! The dialect is deliberately small: `*` projections only, one collection alias, and a WHERE
//! clause built from comparisons (`=`, `!=`, `<>`, `<`, `<=`, `>`, `>=`) over alias-rooted
//! property paths, combined with `AND`, `OR`, `NOT` and parentheses. Literals are
//! single-quoted strings (`''` escapes a quote), integers, floats, `true`, `false` and
//! `null`. Keywords are case-insensitive.

use serde_json::{Number, Value};

use crate::{
    error::{Error, Result},
    query::{Comparison, Predicate},
};

/// Parses `text` into the predicate it denotes.
pub(crate) fn parse_query(text: &str) -> Result<Predicate> {
    let tokens = tokenize(text)?;
    Parser { tokens, pos: 0 }.parse()
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Number(Number),
    Star,
    Dot,
    LParen,
    RParen,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Token {
    /// The keyword this identifier spells, if any. Keywords match case-insensitively.
    fn keyword(&self) -> Option<&'static str> {
        let ident = match self {
            Token::Ident(s) => s,
            _ => return None,
        };
        for kw in ["select", "from", "where", "and", "or", "not", "true", "false", "null"] {
            if ident.eq_ignore_ascii_case(kw) {
                return Some(kw);
            }
        }
        None
    }

    fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("identifier {:?}", s),
            Token::Str(s) => format!("string {:?}", s),
            Token::Number(n) => format!("number {}", n),
            Token::Star => "'*'".to_string(),
            Token::Dot => "'.'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Eq => "'='".to_string(),
            Token::Ne => "'!='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Le => "'<='".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::Ge => "'>='".to_string(),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Eq);
            }
            '!' => {
                chars.next();
                match chars.next() {
                    Some('=') => tokens.push(Token::Ne),
                    _ => return Err(Error::query("expected '=' after '!'")),
                }
            }
            '<' => {
                chars.next();
                match chars.peek() {
                    Some('=') => {
                        chars.next();
                        tokens.push(Token::Le);
                    }
                    Some('>') => {
                        chars.next();
                        tokens.push(Token::Ne);
                    }
                    _ => tokens.push(Token::Lt),
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            '\'' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('\'') => {
                            // A doubled quote is an escaped quote; anything else ends the
                            // literal.
                            if chars.peek() == Some(&'\'') {
                                chars.next();
                                value.push('\'');
                            } else {
                                break;
                            }
                        }
                        Some(c) => value.push(c),
                        None => return Err(Error::query("unterminated string literal")),
                    }
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_ascii_digit() || c == '-' => {
                let mut text = String::new();
                if c == '-' {
                    text.push(c);
                    chars.next();
                }
                let mut is_float = false;
                loop {
                    while let Some(&c) = chars.peek() {
                        if c.is_ascii_digit() {
                            text.push(c);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    // A '.' continues the number only when a digit follows; otherwise it is
                    // a path separator (as in `f.Children.0.Grade`).
                    if !is_float && chars.peek() == Some(&'.') {
                        let mut ahead = chars.clone();
                        ahead.next();
                        if ahead.next().is_some_and(|c| c.is_ascii_digit()) {
                            is_float = true;
                            text.push('.');
                            chars.next();
                            continue;
                        }
                    }
                    break;
                }
                let number = if is_float {
                    text.parse::<f64>().ok().and_then(Number::from_f64)
                } else {
                    text.parse::<i64>().ok().map(Number::from)
                };
                match number {
                    Some(n) => tokens.push(Token::Number(n)),
                    None => {
                        return Err(Error::query(format!("invalid numeric literal {:?}", text)))
                    }
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(Error::query(format!(
                    "unexpected character {:?} in query text",
                    other
                )))
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn parse(mut self) -> Result<Predicate> {
        self.expect_keyword("select")?;
        match self.next() {
            Some(Token::Star) => {}
            other => {
                return Err(unexpected(
                    "only '*' projections are supported",
                    other.as_ref(),
                ))
            }
        }
        self.expect_keyword("from")?;
        let alias = match self.next() {
            Some(Token::Ident(name)) => name,
            other => return Err(unexpected("expected a collection alias", other.as_ref())),
        };

        let predicate = if self.peek().is_some() {
            self.expect_keyword("where")?;
            self.parse_or(&alias)?
        } else {
            Predicate::All
        };

        match self.next() {
            None => Ok(predicate),
            Some(token) => Err(unexpected("expected end of query", Some(&token))),
        }
    }

    fn parse_or(&mut self, alias: &str) -> Result<Predicate> {
        let mut lhs = self.parse_and(alias)?;
        while self.eat_keyword("or") {
            lhs = lhs.or(self.parse_and(alias)?);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self, alias: &str) -> Result<Predicate> {
        let mut lhs = self.parse_unary(alias)?;
        while self.eat_keyword("and") {
            lhs = lhs.and(self.parse_unary(alias)?);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self, alias: &str) -> Result<Predicate> {
        if self.eat_keyword("not") {
            return Ok(self.parse_unary(alias)?.not());
        }
        if self.eat(&Token::LParen) {
            let inner = self.parse_or(alias)?;
            if !self.eat(&Token::RParen) {
                return Err(Error::query("expected ')'"));
            }
            return Ok(inner);
        }
        self.parse_comparison(alias)
    }

    fn parse_comparison(&mut self, alias: &str) -> Result<Predicate> {
        let path = self.parse_path(alias)?;
        let op = match self.next() {
            Some(Token::Eq) => Comparison::Eq,
            Some(Token::Ne) => Comparison::Ne,
            Some(Token::Lt) => Comparison::Lt,
            Some(Token::Le) => Comparison::Le,
            Some(Token::Gt) => Comparison::Gt,
            Some(Token::Ge) => Comparison::Ge,
            other => return Err(unexpected("expected a comparison operator", other.as_ref())),
        };
        let value = self.parse_literal()?;
        Ok(Predicate::Compare { path, op, value })
    }

    /// Parses an alias-rooted property path and strips the alias, yielding the
    /// `.`-separated path used by [`Predicate`].
    fn parse_path(&mut self, alias: &str) -> Result<String> {
        let root = match self.next() {
            Some(Token::Ident(name)) => name,
            other => return Err(unexpected("expected a property path", other.as_ref())),
        };
        if root != alias {
            return Err(Error::query(format!(
                "property paths must be rooted at the collection alias {:?}, found {:?}",
                alias, root
            )));
        }

        let mut segments = Vec::new();
        while self.eat(&Token::Dot) {
            match self.next() {
                Some(Token::Ident(segment)) => segments.push(segment),
                Some(Token::Number(n)) if n.is_u64() => segments.push(n.to_string()),
                other => {
                    return Err(unexpected("expected a path segment after '.'", other.as_ref()))
                }
            }
        }
        if segments.is_empty() {
            return Err(Error::query(format!(
                "the collection alias {:?} cannot be compared directly; select a property",
                alias
            )));
        }
        Ok(segments.join("."))
    }

    fn parse_literal(&mut self) -> Result<Value> {
        match self.next() {
            Some(Token::Str(s)) => Ok(Value::String(s)),
            Some(Token::Number(n)) => Ok(Value::Number(n)),
            Some(token) => match token.keyword() {
                Some("true") => Ok(Value::Bool(true)),
                Some("false") => Ok(Value::Bool(false)),
                Some("null") => Ok(Value::Null),
                _ => Err(unexpected("expected a literal", Some(&token))),
            },
            None => Err(unexpected("expected a literal", None)),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek().and_then(Token::keyword) == Some(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            let found = self.next();
            Err(unexpected(
                &format!("expected {}", keyword.to_ascii_uppercase()),
                found.as_ref(),
            ))
        }
    }
}

fn unexpected(expectation: &str, found: Option<&Token>) -> Error {
    match found {
        Some(token) => Error::query(format!("{}, found {}", expectation, token.describe())),
        None => Error::query(format!("{}, found end of query", expectation)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_query;
    use crate::query::Predicate;

    #[test]
    fn the_sample_query_compiles_to_an_equality() {
        let predicate =
            parse_query("SELECT * FROM Family WHERE Family.LastName = 'Andersen'").unwrap();
        assert_eq!(predicate, Predicate::eq("LastName", "Andersen"));
    }

    #[test]
    fn a_missing_where_clause_matches_everything() {
        assert_eq!(parse_query("SELECT * FROM Family").unwrap(), Predicate::All);
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let predicate = parse_query("select * from f where f.Grade >= 5").unwrap();
        assert_eq!(predicate, Predicate::ge("Grade", 5));
    }

    #[test]
    fn nested_paths_and_numeric_segments() {
        let predicate = parse_query("SELECT * FROM f WHERE f.Children.0.Grade = 5").unwrap();
        assert_eq!(predicate, Predicate::eq("Children.0.Grade", 5));

        let predicate = parse_query("SELECT * FROM f WHERE f.Address.City = 'NY'").unwrap();
        assert_eq!(predicate, Predicate::eq("Address.City", "NY"));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let predicate = parse_query(
            "SELECT * FROM f WHERE f.a = 1 OR f.b = 2 AND f.c = 3",
        )
        .unwrap();
        assert_eq!(
            predicate,
            Predicate::eq("a", 1).or(Predicate::eq("b", 2).and(Predicate::eq("c", 3)))
        );
    }

    #[test]
    fn parentheses_and_not() {
        let predicate =
            parse_query("SELECT * FROM f WHERE NOT (f.a = 1 OR f.b = 2)").unwrap();
        assert_eq!(
            predicate,
            Predicate::eq("a", 1).or(Predicate::eq("b", 2)).not()
        );
    }

    #[test]
    fn literal_forms() {
        let predicate = parse_query(
            "SELECT * FROM f WHERE f.s = 'O''Brien' AND f.n = -2.5 AND f.b = true AND f.z = null",
        )
        .unwrap();
        assert_eq!(
            predicate,
            Predicate::eq("s", "O'Brien")
                .and(Predicate::eq("n", -2.5))
                .and(Predicate::eq("b", true))
                .and(Predicate::eq("z", json!(null)))
        );
    }

    #[test]
    fn alternate_inequality_spelling() {
        let predicate = parse_query("SELECT * FROM f WHERE f.a <> 1").unwrap();
        assert_eq!(predicate, Predicate::ne("a", 1));
    }

    #[test]
    fn rejects_malformed_queries() {
        for text in [
            "",
            "SELECT",
            "SELECT * FROM",
            "SELECT id FROM Family",
            "SELECT * FROM Family WHERE",
            "SELECT * FROM Family WHERE Family = 1",
            "SELECT * FROM Family WHERE Other.LastName = 'x'",
            "SELECT * FROM Family WHERE Family.LastName",
            "SELECT * FROM Family WHERE Family.LastName = ",
            "SELECT * FROM Family WHERE Family.LastName = 'x' extra",
            "SELECT * FROM Family WHERE Family.LastName = 'unterminated",
            "SELECT * FROM Family WHERE (Family.a = 1",
        ] {
            assert!(parse_query(text).is_err(), "accepted {:?}", text);
        }
    }
}
