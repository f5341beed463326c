//! Column projection.

use serde::{Deserialize, Serialize};
use sluice_core::batch::Batch;
use sluice_core::schema::{Field, Schema};
use sluice_core::value::ValueKind;

use crate::traits::{write_json_line, OpError, SideChannels, Step};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectArgs {
    pub columns: Vec<String>,
}

pub struct Select {
    columns: Vec<String>,
}

#[derive(Serialize)]
struct MissingColumn {
    op: &'static str,
    error: String,
}

impl Select {
    pub fn new(args: &SelectArgs) -> Result<Self, OpError> {
        if args.columns.is_empty() {
            return Err(OpError::Plan("select needs at least one column".into()));
        }
        for (i, c) in args.columns.iter().enumerate() {
            if args.columns[..i].contains(c) {
                return Err(OpError::Plan(format!("column '{}' selected twice", c)));
            }
        }
        Ok(Self {
            columns: args.columns.clone(),
        })
    }
}

impl Step for Select {
    fn name(&self) -> &'static str {
        "select"
    }

    /// Missing columns come out all-null and are reported on the errors
    /// channel.
    fn process(
        &mut self,
        batch: Batch,
        side: &mut SideChannels,
    ) -> Result<Option<Batch>, OpError> {
        let mut sources = Vec::with_capacity(self.columns.len());
        let mut fields = Vec::with_capacity(self.columns.len());
        for name in &self.columns {
            let src = batch.col_index(name);
            if src.is_none() {
                write_json_line(
                    &mut side.errors,
                    &MissingColumn {
                        op: "select",
                        error: format!("column '{}' not found", name),
                    },
                )?;
            }
            let kind = src.map_or(ValueKind::Null, |c| batch.col_kind(c));
            fields.push(Field::new(name.clone(), kind));
            sources.push(src);
        }

        let n_rows = batch.n_rows();
        let mut out = Batch::new(Schema::new(fields)?, n_rows);
        for (dst, src) in sources.iter().enumerate() {
            let Some(src) = *src else { continue };
            for row in 0..n_rows {
                out.set_value(row, dst, &batch.value(row, src))?;
            }
        }
        out.set_n_rows(n_rows)?;
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::value::Value;

    fn batch() -> Batch {
        let mut b = Batch::with_fields(
            vec![
                Field::new("a", ValueKind::Int64),
                Field::new("b", ValueKind::String),
            ],
            2,
        )
        .unwrap();
        b.push_values(&[Value::Int(1), Value::Str("x".into())]).unwrap();
        b.push_values(&[Value::Null, Value::Str("y".into())]).unwrap();
        b
    }

    #[test]
    fn reorders_columns() {
        let mut step = Select::new(&SelectArgs {
            columns: vec!["b".into(), "a".into()],
        })
        .unwrap();
        let out = step
            .process(batch(), &mut SideChannels::new())
            .unwrap()
            .unwrap();
        assert_eq!(out.col_name(0), "b");
        assert_eq!(out.get_str(1, 0), Some("y"));
        assert_eq!(out.get_int64(0, 1), Some(1));
        assert!(out.is_null(1, 1));
    }

    #[test]
    fn missing_column_reported_and_null() {
        let mut step = Select::new(&SelectArgs {
            columns: vec!["a".into(), "zz".into()],
        })
        .unwrap();
        let mut side = SideChannels::new();
        let out = step.process(batch(), &mut side).unwrap().unwrap();
        assert_eq!(out.col_kind(1), ValueKind::Null);
        assert!(out.is_null(0, 1));
        assert_eq!(
            side.errors.unread(),
            b"{\"op\":\"select\",\"error\":\"column 'zz' not found\"}\n"
        );
    }

    #[test]
    fn duplicate_selection_rejected() {
        assert!(Select::new(&SelectArgs {
            columns: vec!["a".into(), "a".into()],
        })
        .is_err());
    }
}
