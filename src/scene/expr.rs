//! Anchor expressions and their chumsky grammar
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := '-' unary | atom
//! atom    := NUMBER | subject '.' property | '(' expr ')'
//! subject := 'super' | 'self' | IDENT
//! ```

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;
use super::lexer::{format_token, lex, Span, Token};
use crate::layout::{Baseline, Frame};

/// Whose geometry a property reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// The container, in its own coordinate space
    Container,
    /// The view being positioned
    Target,
    /// A sibling named in the scene
    View(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Edge(Baseline),
    Width,
    Height,
}

impl Property {
    pub const NAMES: [&'static str; 8] = [
        "left", "right", "top", "bottom", "center_x", "center_y", "width", "height",
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "width" => Some(Property::Width),
            "height" => Some(Property::Height),
            other => Baseline::from_name(other).map(Property::Edge),
        }
    }

    pub fn read(self, geometry: Frame) -> f64 {
        match self {
            Property::Edge(baseline) => geometry.baseline(baseline),
            Property::Width => geometry.width,
            Property::Height => geometry.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Property {
        subject: Subject,
        property: Property,
        span: Span,
    },
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Evaluate with every property read from `geometry`
    pub fn eval(&self, geometry: Frame) -> f64 {
        match self {
            Expr::Number(n) => *n,
            Expr::Property { property, .. } => property.read(geometry),
            Expr::Neg(inner) => -inner.eval(geometry),
            Expr::Binary { op, lhs, rhs } => {
                let (l, r) = (lhs.eval(geometry), rhs.eval(geometry));
                match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                }
            }
        }
    }

    /// Property references in source order, with their spans
    pub fn references(&self) -> Vec<(&Subject, &Span)> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'e>(&'e self, out: &mut Vec<(&'e Subject, &'e Span)>) {
        match self {
            Expr::Number(_) => {}
            Expr::Property { subject, span, .. } => out.push((subject, span)),
            Expr::Neg(inner) => inner.collect_references(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_references(out);
                rhs.collect_references(out);
            }
        }
    }

    /// Value of an expression with no property references
    pub fn constant(&self) -> Option<f64> {
        self.references()
            .is_empty()
            .then(|| self.eval(Frame::default()))
    }
}

/// Syntax error in an expression, spans relative to the expression text
#[derive(Debug, Clone, PartialEq)]
pub struct ExprError {
    pub span: Span,
    pub message: String,
    pub expected: Vec<String>,
}

impl<'a> From<Rich<'a, Token>> for ExprError {
    fn from(err: Rich<'a, Token>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of input".to_string()),
                RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                RichPattern::Any => Some("any token".to_string()),
                RichPattern::SomethingElse => None,
            })
            .collect();

        ExprError {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

fn lex_stream(input: &str) -> Result<Vec<(Token, SimpleSpan)>, Vec<ExprError>> {
    match lex(input) {
        Ok(tokens) => Ok(tokens
            .into_iter()
            .map(|(tok, span)| (tok, span.into()))
            .collect()),
        Err(span) => Err(vec![ExprError {
            message: format!("Unexpected character '{}'", &input[span.clone()]),
            span,
            expected: Vec::new(),
        }]),
    }
}

/// Parse a scalar expression
pub fn parse_expr(input: &str) -> Result<Expr, Vec<ExprError>> {
    let len = input.len();
    let tokens = lex_stream(input)?;
    let token_stream = Stream::from_iter(tokens.into_iter())
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    expr_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(ExprError::from).collect())
}

/// Parse a point as two comma-separated expressions, `x, y`
pub fn parse_point(input: &str) -> Result<(Expr, Expr), Vec<ExprError>> {
    let len = input.len();
    let tokens = lex_stream(input)?;
    let token_stream = Stream::from_iter(tokens.into_iter())
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    expr_parser()
        .then_ignore(just(Token::Comma))
        .then(expr_parser())
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(ExprError::from).collect())
}

fn expr_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let number = select! { Token::Number(n) => Expr::Number(n) };

        let subject = select! {
            Token::Super => Subject::Container,
            Token::SelfKw => Subject::Target,
            Token::Ident(name) => Subject::View(name),
        }
        .labelled("view name");

        let property = select! { Token::Ident(name) => name }
            .labelled("property")
            .try_map(|name, span| {
                Property::from_name(&name).ok_or_else(|| {
                    Rich::custom(
                        span,
                        format!(
                            "'{}' is not a property. Expected one of: {}",
                            name,
                            Property::NAMES.join(", ")
                        ),
                    )
                })
            });

        let property_ref = subject
            .then_ignore(just(Token::Dot))
            .then(property)
            .map_with(|(subject, property), e| {
                let span: SimpleSpan = e.span();
                Expr::Property {
                    subject,
                    property,
                    span: span.into_range(),
                }
            });

        let atom = choice((
            number,
            property_ref,
            expr.delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        ));

        let unary = just(Token::Minus)
            .repeated()
            .foldr(atom, |_, rhs| Expr::Neg(Box::new(rhs)));

        let product = unary.clone().foldl(
            choice((
                just(Token::Star).to(BinOp::Mul),
                just(Token::Slash).to(BinOp::Div),
            ))
            .then(unary)
            .repeated(),
            |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
        );

        product.clone().foldl(
            choice((
                just(Token::Plus).to(BinOp::Add),
                just(Token::Minus).to(BinOp::Sub),
            ))
            .then(product)
            .repeated(),
            |lhs, (op, rhs)| Expr::binary(op, lhs, rhs),
        )
    })
}
