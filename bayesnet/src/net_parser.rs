use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use chumsky::error::SimpleReason;
use chumsky::prelude::*;
use itertools::Itertools;

#[derive(Debug, Clone, PartialEq)]
pub(super) struct VarDecl {
    pub(super) name: String,
    pub(super) domain: Vec<String>,
    pub(super) parents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct CptRow {
    pub(super) var: String,
    pub(super) parents: Vec<String>,
    pub(super) probas: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum Statement {
    Invalid,
    Empty,
    VarDecl(VarDecl),
    CptRow(CptRow),
}

fn parser() -> impl Parser<char, Vec<Statement>, Error = Simple<char>> {
    let pad = just(' ').or(just('\t')).repeated();
    let space = pad.at_least(1);
    let op = |c| just(c).delimited_by(pad, pad);
    let ident = pad.ignore_then(text::ident()).then_ignore(pad);
    let kw = |s| text::keyword::<_, _, Simple<char>>(s).delimited_by(pad, space);
    // Value labels are identifiers or integers.
    let label = pad
        .ignore_then(text::ident().or(text::int(10)))
        .then_ignore(pad);
    // Decimal literals, with optional leading dot and exponent: 1, 0.25, .5, 1e-7, 2.5E+1.
    let proba = pad
        .ignore_then(
            filter(|c: &char| c.is_ascii_digit() || matches!(*c, '.' | 'e' | 'E' | '+' | '-'))
                .repeated()
                .at_least(1)
                .collect::<String>()
                .try_map(|s, span| {
                    s.parse::<f64>().map_err(|e| {
                        Simple::custom(span, format!("Invalid probability {}: {}", s, e))
                    })
                }),
        )
        .then_ignore(pad);
    let domain = label
        .separated_by(op(','))
        .allow_trailing()
        .delimited_by(op('{'), op('}'));
    let parents = op('|')
        .ignore_then(ident.separated_by(op(',')).at_least(1))
        .or_not()
        .map(Option::unwrap_or_default);
    let var_decl = kw("VAR")
        .ignore_then(ident)
        .then_ignore(op('='))
        .then(domain)
        .then(parents)
        .map(|((name, domain), parents)| {
            Statement::VarDecl(VarDecl {
                name,
                domain,
                parents,
            })
        });
    let row_parents = label
        .separated_by(op(','))
        .delimited_by(op('['), op(']'))
        .or_not()
        .map(Option::unwrap_or_default);
    let row_probas = proba
        .separated_by(op(','))
        .allow_trailing()
        .delimited_by(op('['), op(']'));
    let cpt_row = kw("CPT")
        .ignore_then(ident)
        .then(row_parents)
        .then_ignore(op('='))
        .then(row_probas)
        .map(|((var, parents), probas)| {
            Statement::CptRow(CptRow {
                var,
                parents,
                probas,
            })
        });
    let comment = op('#').then_ignore(filter(|c| *c != '\n' && *c != '\r').repeated());
    var_decl
        .or(cpt_row)
        .or(pad.at_least(0).to(Statement::Empty))
        .then_ignore(comment.or_not())
        .recover_with(skip_until(['\n', '\r'], |_| Statement::Invalid))
        .separated_by(text::newline())
        .allow_leading()
        .allow_trailing()
        .then_ignore(end())
}

fn describe_expected(e: &Simple<char>) -> String {
    if e.expected().len() == 0 {
        return "something else".to_owned();
    }
    e.expected()
        .map(|expected| match expected {
            Some(c) => format!("'{}'", c),
            None => "end of input".to_owned(),
        })
        .sorted()
        .join(", ")
}

/// Render one parse error as an ariadne report appended to `out`.
fn render_error(src: &str, e: &Simple<char>, out: &mut Vec<u8>) {
    let (msg, label) = match e.reason() {
        SimpleReason::Custom(msg) => (msg.clone(), msg.clone()),
        _ => (
            format!("Unexpected token, expected {}", describe_expected(e)),
            match e.found() {
                Some(c) => format!("Unexpected token {}", c.fg(Color::Red)),
                None => "Unexpected end of input".to_owned(),
            },
        ),
    };
    let res = Report::build(ReportKind::Error, (), e.span().start)
        .with_message(msg)
        .with_label(Label::new(e.span()).with_message(label).with_color(Color::Red))
        .finish()
        .write(Source::from(src), &mut *out);
    if let Err(err) = res {
        out.extend_from_slice(format!("{} (at {:?})\n", err, e.span()).as_bytes());
    }
}

/// Parse a network description.
///
/// On failure, returns every syntax error found, rendered as a report over `src`.
pub(super) fn parse(src: &str) -> Result<Vec<Statement>, Vec<u8>> {
    let (stmts, errs) = parser().parse_recovery_verbose(src);
    match stmts {
        Some(stmts) if errs.is_empty() => Ok(stmts),
        _ => {
            let mut rendered = Vec::new();
            for e in errs.iter() {
                render_error(src, e, &mut rendered);
            }
            if rendered.is_empty() {
                rendered.extend_from_slice(b"Invalid network description.");
            }
            Err(rendered)
        }
    }
}
