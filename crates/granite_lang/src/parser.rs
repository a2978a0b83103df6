//! Manifest parser.
//!
//! nom leaf parsers for expressions and identifiers, driven by a cursor
//! that tracks consumed input so every diagnostic carries a line-accurate
//! source location. Parsing never panics; malformed input produces a
//! `CompileError::Parse`.

use crate::ast::{Expr, NodeBlock, ResourceDecl, Statement};
use granite_core::{CompileError, CompileResult, SourceLocation};
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::{anychar, char as ch, digit1, multispace1, none_of, satisfy};
use nom::combinator::{map, map_res, opt, recognize};
use nom::multi::{fold_many0, many0_count, separated_list0};
use nom::sequence::{delimited, pair, preceded, tuple};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a manifest into its statement sequence
///
/// # Errors
///
/// Returns `CompileError::Parse` with the location of the first syntax
/// error.
pub fn parse_manifest(input: &str, file: Option<&str>) -> CompileResult<Vec<Statement>> {
    let mut cursor = Cursor::new(input, file);
    let mut statements = Vec::new();

    cursor.skip_ws();
    while !cursor.rest.is_empty() {
        if cursor.at_keyword("node") {
            statements.push(Statement::Node(node_block(&mut cursor)?));
        } else {
            statements.push(Statement::Resource(resource_decl(&mut cursor)?));
        }
        cursor.skip_ws();
    }
    Ok(statements)
}

fn node_block(cursor: &mut Cursor<'_>) -> CompileResult<NodeBlock> {
    cursor.eat_keyword("node");
    cursor.skip_ws();

    let mut names = Vec::new();
    let default = cursor.eat_keyword("default");
    if !default {
        loop {
            names.push(cursor.apply("expected a quoted node name", quoted_string)?);
            cursor.skip_ws();
            if cursor.eat(",") {
                cursor.skip_ws();
            } else {
                break;
            }
        }
    }

    cursor.skip_ws();
    cursor.expect("{", "expected '{' after the node name")?;
    cursor.skip_ws();

    let mut body = Vec::new();
    while !cursor.peek("}") {
        body.push(resource_decl(cursor)?);
        cursor.skip_ws();
    }
    cursor.expect("}", "expected '}' closing the node block")?;

    Ok(NodeBlock {
        names,
        default,
        body,
    })
}

fn resource_decl(cursor: &mut Cursor<'_>) -> CompileResult<ResourceDecl> {
    let location = cursor.location();
    let exported = cursor.eat("@@");

    let type_name = cursor
        .apply("expected a resource type name", type_ident)?
        .to_lowercase();
    cursor.skip_ws();
    cursor.expect("{", "expected '{' after the resource type")?;
    cursor.skip_ws();

    let title = cursor.apply("expected a resource title", expr)?;
    cursor.skip_ws();
    cursor.expect(":", "expected ':' after the resource title")?;
    cursor.skip_ws();

    let mut attributes = Vec::new();
    while !cursor.peek("}") {
        let name = cursor
            .apply("expected an attribute name", ident)?
            .to_string();
        cursor.skip_ws();
        cursor.expect("=>", "expected '=>' after the attribute name")?;
        cursor.skip_ws();
        let value = cursor.apply("expected an attribute value", expr)?;
        attributes.push((name, value));
        cursor.skip_ws();
        if cursor.eat(",") {
            cursor.skip_ws();
        } else {
            break;
        }
    }
    cursor.expect("}", "expected '}' closing the resource body")?;

    Ok(ResourceDecl {
        type_name,
        title,
        attributes,
        exported,
        location,
    })
}

/// Consumed-input tracker over one manifest
struct Cursor<'a> {
    src: &'a str,
    file: Option<&'a str>,
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, file: Option<&'a str>) -> Self {
        Self {
            src,
            file,
            rest: src,
        }
    }

    fn location(&self) -> SourceLocation {
        let consumed = &self.src[..self.src.len() - self.rest.len()];
        let line = consumed.matches('\n').count() + 1;
        // Column counts characters, not bytes
        let line_tail = match consumed.rfind('\n') {
            Some(i) => &consumed[i + 1..],
            None => consumed,
        };
        let column = line_tail.chars().count() + 1;
        SourceLocation::new(self.file.map(str::to_string), line, column)
    }

    fn fail(&self, message: &str) -> CompileError {
        CompileError::Parse {
            message: message.to_string(),
            location: Some(self.location()),
        }
    }

    fn apply<T>(
        &mut self,
        message: &str,
        mut parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
    ) -> CompileResult<T> {
        match parser(self.rest) {
            Ok((rest, value)) => {
                self.rest = rest;
                Ok(value)
            }
            Err(_) => Err(self.fail(message)),
        }
    }

    fn skip_ws(&mut self) {
        if let Ok((rest, ())) = ws(self.rest) {
            self.rest = rest;
        }
    }

    fn peek(&self, token: &str) -> bool {
        self.rest.starts_with(token)
    }

    fn eat(&mut self, token: &str) -> bool {
        match self.rest.strip_prefix(token) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn expect(&mut self, token: &str, message: &str) -> CompileResult<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.fail(message))
        }
    }

    fn at_keyword(&self, word: &str) -> bool {
        self.rest.strip_prefix(word).is_some_and(|rest| {
            !rest
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        })
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if self.at_keyword(word) {
            self.rest = &self.rest[word.len()..];
            true
        } else {
            false
        }
    }
}

/// Whitespace and `#` line comments
fn ws(input: &str) -> IResult<&str, ()> {
    map(
        many0_count(alt((
            multispace1,
            recognize(pair(ch('#'), take_while(|c| c != '\n'))),
        ))),
        |_| (),
    )(input)
}

fn ident(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

/// Identifier with optional `::` segments, as in `nginx::vhost`
fn type_ident(input: &str) -> IResult<&str, &str> {
    recognize(pair(ident, many0_count(pair(tag("::"), ident))))(input)
}

fn quoted_string(input: &str) -> IResult<&str, String> {
    delimited(
        ch('"'),
        fold_many0(
            alt((
                preceded(
                    ch('\\'),
                    map(anychar, |c| match c {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    }),
                ),
                none_of("\"\\"),
            )),
            String::new,
            |mut acc, c| {
                acc.push(c);
                acc
            },
        ),
        ch('"'),
    )(input)
}

fn number(input: &str) -> IResult<&str, Expr> {
    map_res(
        recognize(tuple((opt(ch('-')), digit1, opt(pair(ch('.'), digit1))))),
        |text: &str| Decimal::from_str(text).map(Expr::Number),
    )(input)
}

fn array(input: &str) -> IResult<&str, Expr> {
    map(
        delimited(
            pair(ch('['), ws),
            separated_list0(tuple((ws, ch(','), ws)), expr),
            tuple((ws, opt(pair(ch(','), ws)), ch(']'))),
        ),
        Expr::Array,
    )(input)
}

fn template(input: &str) -> IResult<&str, Expr> {
    map(
        preceded(
            tag("template"),
            delimited(
                tuple((ws, ch('('), ws)),
                quoted_string,
                tuple((ws, ch(')'))),
            ),
        ),
        Expr::Template,
    )(input)
}

/// `Type["title"]` reference; type names start uppercase in references
fn reference(input: &str) -> IResult<&str, Expr> {
    map(
        pair(
            recognize(pair(
                satisfy(|c| c.is_ascii_uppercase()),
                take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == ':'),
            )),
            delimited(
                tuple((ws, ch('['), ws)),
                quoted_string,
                tuple((ws, ch(']'))),
            ),
        ),
        |(type_name, title)| Expr::Ref {
            type_name: type_name.to_lowercase(),
            title,
        },
    )(input)
}

fn bareword(input: &str) -> IResult<&str, Expr> {
    map(take_while1(is_bareword_char), |word: &str| match word {
        "true" => Expr::Bool(true),
        "false" => Expr::Bool(false),
        other => Expr::Str(other.to_string()),
    })(input)
}

fn is_bareword_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn expr(input: &str) -> IResult<&str, Expr> {
    alt((
        map(quoted_string, Expr::Str),
        number,
        array,
        map(preceded(ch('$'), ident), |name| Expr::Var(name.to_string())),
        template,
        reference,
        bareword,
    ))(input)
}
