//! Online per-column statistics.
//!
//! The step consumes every batch (nothing flows downstream while input
//! lasts) and emits one summary row per column at flush.

pub mod accumulator;
pub mod histogram;
pub mod hll;
pub mod moments;
pub mod p2;
pub mod reservoir;

use serde::{Deserialize, Serialize};
use sluice_core::batch::Batch;
use sluice_core::config::DEFAULT_SAMPLE_SEED;
use sluice_core::schema::{Field, Schema};
use sluice_core::value::ValueKind;

use crate::traits::{OpError, SideChannels, Step};
use accumulator::ColumnAccumulator;

/// Statistic names, in output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Var,
    Stddev,
    Median,
    P25,
    P75,
    Skewness,
    Kurtosis,
    Distinct,
    Hist,
    Sample,
}

impl StatKind {
    pub const DEFAULTS: [StatKind; 8] = [
        StatKind::Count,
        StatKind::Sum,
        StatKind::Avg,
        StatKind::Min,
        StatKind::Max,
        StatKind::Var,
        StatKind::Stddev,
        StatKind::Median,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StatKind::Count => "count",
            StatKind::Sum => "sum",
            StatKind::Avg => "avg",
            StatKind::Min => "min",
            StatKind::Max => "max",
            StatKind::Var => "var",
            StatKind::Stddev => "stddev",
            StatKind::Median => "median",
            StatKind::P25 => "p25",
            StatKind::P75 => "p75",
            StatKind::Skewness => "skewness",
            StatKind::Kurtosis => "kurtosis",
            StatKind::Distinct => "distinct",
            StatKind::Hist => "hist",
            StatKind::Sample => "sample",
        }
    }

    pub fn output_kind(self) -> ValueKind {
        match self {
            StatKind::Count | StatKind::Distinct => ValueKind::Int64,
            StatKind::Hist | StatKind::Sample => ValueKind::String,
            _ => ValueKind::Float64,
        }
    }
}

/// Arguments of the `stats` step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatsArgs {
    /// Requested statistics; absent or empty means [`StatKind::DEFAULTS`].
    pub stats: Option<Vec<StatKind>>,
}

impl StatsArgs {
    /// Requested statistics, deduplicated, in canonical order.
    pub fn resolved(&self) -> Vec<StatKind> {
        let mut stats = match &self.stats {
            Some(list) if !list.is_empty() => list.clone(),
            _ => StatKind::DEFAULTS.to_vec(),
        };
        stats.sort();
        stats.dedup();
        stats
    }
}

pub struct StatsStep {
    stats: Vec<StatKind>,
    seed: u64,
    columns: Vec<ColumnAccumulator>,
    seen_input: bool,
}

impl StatsStep {
    pub fn new(args: &StatsArgs) -> Self {
        Self::with_seed(args, DEFAULT_SAMPLE_SEED)
    }

    pub fn with_seed(args: &StatsArgs, seed: u64) -> Self {
        Self {
            stats: args.resolved(),
            seed,
            columns: Vec::new(),
            seen_input: false,
        }
    }

    pub fn stats(&self) -> &[StatKind] {
        &self.stats
    }

    pub fn output_schema(&self) -> Result<Schema, OpError> {
        let mut fields = vec![Field::new("column", ValueKind::String)];
        fields.extend(
            self.stats
                .iter()
                .map(|k| Field::new(k.name(), k.output_kind())),
        );
        Ok(Schema::new(fields)?)
    }

    fn accumulator(&mut self, name: &str) -> &mut ColumnAccumulator {
        let idx = match self.columns.iter().position(|c| c.name() == name) {
            Some(i) => i,
            None => {
                self.columns
                    .push(ColumnAccumulator::new(name, &self.stats, self.seed));
                self.columns.len() - 1
            }
        };
        &mut self.columns[idx]
    }
}

impl Step for StatsStep {
    fn name(&self) -> &'static str {
        "stats"
    }

    fn process(
        &mut self,
        batch: Batch,
        _side: &mut SideChannels,
    ) -> Result<Option<Batch>, OpError> {
        self.seen_input = true;
        for col in 0..batch.n_cols() {
            self.accumulator(batch.col_name(col)).add_column(&batch, col);
        }
        Ok(None)
    }

    fn flush(&mut self, _side: &mut SideChannels) -> Result<Option<Batch>, OpError> {
        if !self.seen_input {
            return Ok(None);
        }
        let mut out = Batch::new(self.output_schema()?, self.columns.len());
        for (row, acc) in self.columns.iter().enumerate() {
            out.set_str(row, 0, acc.name())?;
            for (i, kind) in self.stats.iter().enumerate() {
                out.set_value(row, i + 1, &acc.stat(*kind))?;
            }
        }
        out.set_n_rows(self.columns.len())?;
        Ok(Some(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::value::Value;

    fn ages() -> Batch {
        let mut b = Batch::with_fields(
            vec![
                Field::new("name", ValueKind::String),
                Field::new("age", ValueKind::Int64),
            ],
            5,
        )
        .unwrap();
        for (n, a) in [("A", 18), ("B", 92), ("C", 45), ("D", 33), ("E", 61)] {
            b.push_values(&[Value::Str(n.into()), Value::Int(a)]).unwrap();
        }
        b
    }

    #[test]
    fn args_resolve_in_canonical_order() {
        let args: StatsArgs =
            serde_json::from_str(r#"{"stats":["max","count","min","count"]}"#).unwrap();
        assert_eq!(
            args.resolved(),
            vec![StatKind::Count, StatKind::Min, StatKind::Max]
        );
        assert_eq!(StatsArgs::default().resolved(), StatKind::DEFAULTS.to_vec());
    }

    #[test]
    fn unknown_stat_rejected() {
        assert!(serde_json::from_str::<StatsArgs>(r#"{"stats":["mode"]}"#).is_err());
    }

    #[test]
    fn process_consumes_and_flush_summarises() {
        let args = StatsArgs {
            stats: Some(vec![StatKind::Count, StatKind::Min, StatKind::Max]),
        };
        let mut step = StatsStep::new(&args);
        let mut side = SideChannels::new();
        assert!(step.process(ages(), &mut side).unwrap().is_none());

        let out = step.flush(&mut side).unwrap().expect("summary batch");
        let names: Vec<&str> = out.schema().names().collect();
        assert_eq!(names, ["column", "count", "min", "max"]);
        assert_eq!(out.n_rows(), 2);
        assert_eq!(out.get_str(1, 0), Some("age"));
        assert_eq!(out.get_int64(1, 1), Some(5));
        assert_eq!(out.get_float64(1, 2), Some(18.0));
        assert_eq!(out.get_float64(1, 3), Some(92.0));
        assert_eq!(out.get_int64(0, 1), Some(5));
        assert!(out.is_null(0, 2));
    }

    #[test]
    fn no_input_no_output() {
        let mut step = StatsStep::new(&StatsArgs::default());
        assert!(step.flush(&mut SideChannels::new()).unwrap().is_none());
    }
}
