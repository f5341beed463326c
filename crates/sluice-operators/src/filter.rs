//! Filter step with simple predicate evaluation.
//!
//! Supports expressions of the form: "col OP literal" where
//! OP ∈ {==, !=, <, <=, >, >=}. The column may be written `col('name')`
//! and the literal may be quoted. The literal is parsed as the column's kind.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use sluice_core::batch::Batch;
use sluice_core::value::{Value, ValueKind};
use sluice_io::csv::parse::{parse_date, parse_float64, parse_int64, parse_timestamp};

use crate::traits::{write_json_line, OpError, SideChannels, Step};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterArgs {
    pub expr: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    const TOKENS: [(&'static str, CmpOp); 6] = [
        ("==", CmpOp::Eq),
        ("!=", CmpOp::Ne),
        ("<=", CmpOp::Le),
        (">=", CmpOp::Ge),
        ("<", CmpOp::Lt),
        (">", CmpOp::Gt),
    ];

    fn holds(self, ord: Ordering) -> bool {
        match self {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
        }
    }
}

/// Parsed "col op literal".
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: CmpOp,
    pub literal: String,
    pub literal_quoted: bool,
}

fn unquote(s: &str) -> Option<&str> {
    let b = s.as_bytes();
    if b.len() >= 2 && (b[0] == b'\'' || b[0] == b'"') && b[b.len() - 1] == b[0] {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

/// Parse a simple predicate like "age > 18", "name == 'Alice'" or
/// "col('first name') != Bob".
pub fn parse_predicate(expr: &str) -> Result<Predicate, OpError> {
    let mut quote: Option<char> = None;
    for (pos, ch) in expr.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '\'' || ch == '"' => quote = Some(ch),
            None => {
                let rest = &expr[pos..];
                let Some((token, op)) = CmpOp::TOKENS.iter().find(|(t, _)| rest.starts_with(t))
                else {
                    continue;
                };
                let lhs = expr[..pos].trim();
                let column = lhs
                    .strip_prefix("col(")
                    .and_then(|s| s.strip_suffix(')'))
                    .map(str::trim)
                    .map(|inner| unquote(inner).unwrap_or(inner))
                    .unwrap_or_else(|| unquote(lhs).unwrap_or(lhs));
                let rhs = expr[pos + token.len()..].trim();
                if column.is_empty() || rhs.is_empty() {
                    break;
                }
                let (literal, literal_quoted) = match unquote(rhs) {
                    Some(inner) => (inner, true),
                    None => (rhs, false),
                };
                return Ok(Predicate {
                    column: column.to_string(),
                    op: *op,
                    literal: literal.to_string(),
                    literal_quoted,
                });
            }
        }
    }
    Err(OpError::Plan(format!("unparseable predicate: {}", expr)))
}

/// Literal coerced to the kind of the filtered column.
enum Operand {
    Text(String),
    Value(Value),
    /// Never matches (null-only column).
    Nothing,
}

fn coerce(pred: &Predicate, kind: ValueKind) -> Result<Operand, OpError> {
    let lit = pred.literal.as_bytes();
    let value = match kind {
        ValueKind::Null => return Ok(Operand::Nothing),
        ValueKind::String => return Ok(Operand::Text(pred.literal.clone())),
        ValueKind::Bool => match pred.literal.as_str() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        ValueKind::Int64 => parse_int64(lit)
            .map(Value::Int)
            .or_else(|| parse_float64(lit).map(Value::Float)),
        ValueKind::Float64 => parse_float64(lit).map(Value::Float),
        ValueKind::Date => parse_date(lit).map(Value::Date),
        ValueKind::Timestamp => parse_timestamp(lit)
            .or_else(|| parse_date(lit).map(sluice_core::temporal::date_to_timestamp))
            .map(Value::Timestamp),
    };
    value.map(Operand::Value).ok_or_else(|| {
        OpError::Exec(format!(
            "cannot compare {} column '{}' with '{}'",
            kind, pred.column, pred.literal
        ))
    })
}

pub struct Filter {
    predicate: Predicate,
}

impl Filter {
    pub fn new(args: &FilterArgs) -> Result<Self, OpError> {
        Ok(Self {
            predicate: parse_predicate(&args.expr)?,
        })
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    fn matching_rows(&self, batch: &Batch) -> Result<Vec<usize>, OpError> {
        let col = batch.col_index(&self.predicate.column).ok_or_else(|| {
            OpError::Exec(format!("column '{}' not found", self.predicate.column))
        })?;
        let operand = coerce(&self.predicate, batch.col_kind(col))?;
        let op = self.predicate.op;

        let mut keep = Vec::with_capacity(batch.n_rows());
        for row in 0..batch.n_rows() {
            // Null comparisons are false
            if batch.is_null(row, col) {
                continue;
            }
            let hit = match &operand {
                Operand::Nothing => false,
                Operand::Text(lit) => batch
                    .get_str(row, col)
                    .is_some_and(|s| op.holds(s.cmp(lit.as_str()))),
                Operand::Value(lit) => op.holds(batch.value(row, col).cmp_non_null(lit)),
            };
            if hit {
                keep.push(row);
            }
        }
        Ok(keep)
    }
}

#[derive(Serialize)]
struct FilterReport {
    op: &'static str,
    rows_in: usize,
    rows_out: usize,
}

impl Step for Filter {
    fn name(&self) -> &'static str {
        "filter"
    }

    fn process(
        &mut self,
        batch: Batch,
        side: &mut SideChannels,
    ) -> Result<Option<Batch>, OpError> {
        let keep = self.matching_rows(&batch)?;
        write_json_line(
            &mut side.stats,
            &FilterReport {
                op: "filter",
                rows_in: batch.n_rows(),
                rows_out: keep.len(),
            },
        )?;

        if keep.is_empty() {
            return Ok(None);
        }
        if keep.len() == batch.n_rows() {
            return Ok(Some(batch));
        }
        Ok(Some(batch.take_rows(&keep)?))
    }
}
