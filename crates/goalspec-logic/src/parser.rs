use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::clause::{Clause, CmpOp, Literal};
use crate::term::{Atom, Term};
use crate::{LogicError, Result};

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct ClauseParser;

fn parse_error(input: &str, err: pest::error::Error<Rule>) -> LogicError {
    LogicError::Parse {
        input: input.to_string(),
        message: err.variant.message().to_string(),
    }
}

/// Parse a single clause, e.g. `goal :- at(X,Y), red(X,Y)`.
pub fn parse_clause(input: &str) -> Result<Clause> {
    let mut pairs =
        ClauseParser::parse(Rule::clause_input, input.trim()).map_err(|e| parse_error(input, e))?;
    let clause = pairs
        .next()
        .and_then(|p| p.into_inner().next())
        .ok_or_else(|| LogicError::Parse {
            input: input.to_string(),
            message: "missing clause".to_string(),
        })?;
    build_clause(input, clause)
}

/// Parse clauses separated by `;`. Empty pieces are skipped.
pub fn parse_clauses(input: &str) -> Result<Vec<Clause>> {
    input
        .split(';')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(parse_clause)
        .collect()
}

/// Parse an atom that may contain variables.
pub fn parse_atom(input: &str) -> Result<Atom> {
    let mut pairs =
        ClauseParser::parse(Rule::atom_input, input.trim()).map_err(|e| parse_error(input, e))?;
    let atom = pairs
        .next()
        .and_then(|p| p.into_inner().next())
        .ok_or_else(|| LogicError::Parse {
            input: input.to_string(),
            message: "missing atom".to_string(),
        })?;
    build_atom(input, atom)
}

/// Parse a ground fact such as `red(2,1).`
pub fn parse_fact(input: &str) -> Result<Atom> {
    let atom = parse_atom(input)?;
    if !atom.is_ground() {
        return Err(LogicError::NotGround(atom.to_string()));
    }
    Ok(atom)
}

fn build_clause(input: &str, pair: Pair<'_, Rule>) -> Result<Clause> {
    let mut inner = pair.into_inner();
    let head = match inner.next() {
        Some(p) => build_atom(input, p)?,
        None => {
            return Err(LogicError::Parse {
                input: input.to_string(),
                message: "missing clause head".to_string(),
            })
        }
    };

    let mut body = Vec::new();
    if let Some(body_pair) = inner.next() {
        for literal in body_pair.into_inner() {
            body.push(build_literal(input, literal)?);
        }
    }
    Ok(Clause::new(head, body))
}

fn build_literal(input: &str, pair: Pair<'_, Rule>) -> Result<Literal> {
    let inner = pair.into_inner().next().ok_or_else(|| LogicError::Parse {
        input: input.to_string(),
        message: "empty literal".to_string(),
    })?;

    match inner.as_rule() {
        Rule::atom => Ok(Literal::Pos(build_atom(input, inner)?)),
        Rule::negated => {
            let atom = inner
                .into_inner()
                .find(|p| p.as_rule() == Rule::atom)
                .ok_or_else(|| LogicError::Parse {
                    input: input.to_string(),
                    message: "negation without atom".to_string(),
                })?;
            Ok(Literal::Neg(build_atom(input, atom)?))
        }
        Rule::comparison => {
            let mut parts = inner.into_inner();
            let (Some(lhs), Some(op), Some(rhs)) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(LogicError::Parse {
                    input: input.to_string(),
                    message: "incomplete comparison".to_string(),
                });
            };
            let op = match op.as_str() {
                "=" => CmpOp::Eq,
                "!=" => CmpOp::Ne,
                "<" => CmpOp::Lt,
                "<=" => CmpOp::Le,
                ">" => CmpOp::Gt,
                _ => CmpOp::Ge,
            };
            Ok(Literal::cmp(op, build_term(input, lhs)?, build_term(input, rhs)?))
        }
        other => Err(LogicError::Parse {
            input: input.to_string(),
            message: format!("unexpected rule {:?}", other),
        }),
    }
}

fn build_atom(input: &str, pair: Pair<'_, Rule>) -> Result<Atom> {
    let mut inner = pair.into_inner();
    let predicate = inner
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| LogicError::Parse {
            input: input.to_string(),
            message: "missing predicate".to_string(),
        })?;

    let mut args = Vec::new();
    if let Some(arguments) = inner.next() {
        for term in arguments.into_inner() {
            args.push(build_term(input, term)?);
        }
    }
    Ok(Atom::new(predicate, args))
}

fn build_term(input: &str, pair: Pair<'_, Rule>) -> Result<Term> {
    let inner = pair.into_inner().next().ok_or_else(|| LogicError::Parse {
        input: input.to_string(),
        message: "empty term".to_string(),
    })?;

    match inner.as_rule() {
        Rule::integer => inner
            .as_str()
            .parse::<i64>()
            .map(Term::Int)
            .map_err(|e| LogicError::Parse {
                input: input.to_string(),
                message: format!("integer '{}': {}", inner.as_str(), e),
            }),
        Rule::variable => Ok(Term::Var(inner.as_str().to_string())),
        _ => Ok(Term::Sym(inner.as_str().to_string())),
    }
}
