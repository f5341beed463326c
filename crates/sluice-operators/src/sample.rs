//! Uniform row sample of the whole stream, emitted at flush.

use serde::{Deserialize, Serialize};
use sluice_core::batch::Batch;
use sluice_core::config::DEFAULT_SAMPLE_SEED;
use sluice_core::schema::Schema;
use sluice_core::value::Value;

use crate::stats::reservoir::Reservoir;
use crate::traits::{write_json_line, OpError, SideChannels, Step};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SampleArgs {
    pub n: usize,
}

pub struct Sample {
    reservoir: Reservoir<Vec<Value>>,
    schema: Option<Schema>,
}

#[derive(Serialize)]
struct SampleReport {
    op: &'static str,
    seen: u64,
    kept: usize,
}

impl Sample {
    pub fn new(args: &SampleArgs) -> Result<Self, OpError> {
        Self::with_seed(args, DEFAULT_SAMPLE_SEED)
    }

    pub fn with_seed(args: &SampleArgs, seed: u64) -> Result<Self, OpError> {
        if args.n == 0 {
            return Err(OpError::Plan("sample size must be positive".into()));
        }
        Ok(Self {
            reservoir: Reservoir::new(args.n, seed),
            schema: None,
        })
    }
}

impl Step for Sample {
    fn name(&self) -> &'static str {
        "sample"
    }

    fn process(
        &mut self,
        batch: Batch,
        _side: &mut SideChannels,
    ) -> Result<Option<Batch>, OpError> {
        match &self.schema {
            None => self.schema = Some(batch.schema().clone()),
            Some(s) if s != batch.schema() => {
                return Err(OpError::Schema(
                    "sample input changed schema mid-stream".into(),
                ))
            }
            Some(_) => {}
        }
        for row in 0..batch.n_rows() {
            self.reservoir.offer_with(|| {
                (0..batch.n_cols())
                    .map(|col| batch.value(row, col))
                    .collect()
            });
        }
        Ok(None)
    }

    fn flush(&mut self, side: &mut SideChannels) -> Result<Option<Batch>, OpError> {
        let Some(schema) = self.schema.take() else {
            return Ok(None);
        };
        let rows = self.reservoir.items();
        write_json_line(
            &mut side.samples,
            &SampleReport {
                op: "sample",
                seen: self.reservoir.seen(),
                kept: rows.len(),
            },
        )?;
        if rows.is_empty() {
            return Ok(None);
        }
        let mut out = Batch::new(schema, rows.len());
        for row in rows {
            out.push_values(row)?;
        }
        Ok(Some(out))
    }
}
