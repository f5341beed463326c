//! Per-column accumulator behind the statistics step.

use sluice_core::batch::Batch;
use sluice_core::format::{format_general, format_roundtrip};
use sluice_core::value::{Value, ValueKind};

use super::histogram::AdaptiveHistogram;
use super::hll::HyperLogLog;
use super::moments::Moments;
use super::p2::P2Quantile;
use super::reservoir::Reservoir;
use super::StatKind;

/// Values kept for the `sample` statistic.
pub const SAMPLE_SIZE: usize = 10;

#[derive(Debug, Clone)]
pub struct ColumnAccumulator {
    name: String,
    /// Non-null cells of any kind.
    count: u64,
    has_numeric: bool,
    sum: f64,
    min: f64,
    max: f64,
    moments: Moments,
    median: P2Quantile,
    p25: P2Quantile,
    p75: P2Quantile,
    hll: Option<HyperLogLog>,
    hist: Option<AdaptiveHistogram>,
    sample: Option<Reservoir<f64>>,
}

impl ColumnAccumulator {
    /// Optional estimators are only allocated when `wanted` asks for them.
    pub fn new(name: impl Into<String>, wanted: &[StatKind], seed: u64) -> Self {
        let wants = |k| wanted.contains(&k);
        Self {
            name: name.into(),
            count: 0,
            has_numeric: false,
            sum: 0.0,
            min: f64::MAX,
            max: -f64::MAX,
            moments: Moments::new(),
            median: P2Quantile::new(0.5),
            p25: P2Quantile::new(0.25),
            p75: P2Quantile::new(0.75),
            hll: wants(StatKind::Distinct).then(HyperLogLog::new),
            hist: wants(StatKind::Hist).then(AdaptiveHistogram::new),
            sample: wants(StatKind::Sample).then(|| Reservoir::new(SAMPLE_SIZE, seed)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Fold every non-null cell of column `col`.
    pub fn add_column(&mut self, batch: &Batch, col: usize) {
        let kind = batch.col_kind(col);
        for row in 0..batch.n_rows() {
            if batch.is_null(row, col) {
                continue;
            }
            match kind {
                ValueKind::Null => continue,
                ValueKind::String => {
                    if let Some(s) = batch.get_str(row, col) {
                        self.add_distinct(s.as_bytes());
                    }
                }
                ValueKind::Bool => {
                    if let Some(b) = batch.get_bool(row, col) {
                        self.add_distinct(if b { b"true" } else { b"false" });
                    }
                }
                _ => {
                    let value = batch.value(row, col);
                    if let Some(v) = value.as_f64() {
                        self.add_numeric(v);
                    }
                    if self.hll.is_some() {
                        self.add_distinct(distinct_text(&value).as_bytes());
                    }
                }
            }
            self.count += 1;
        }
    }

    fn add_numeric(&mut self, v: f64) {
        self.has_numeric = true;
        self.sum += v;
        if v < self.min {
            self.min = v;
        }
        if v > self.max {
            self.max = v;
        }
        self.moments.add(v);
        self.median.add(v);
        self.p25.add(v);
        self.p75.add(v);
        if let Some(h) = &mut self.hist {
            h.add(v);
        }
        if let Some(r) = &mut self.sample {
            r.offer(v);
        }
    }

    fn add_distinct(&mut self, bytes: &[u8]) {
        if let Some(h) = &mut self.hll {
            h.add(bytes);
        }
    }

    /// Value of one statistic; `Value::Null` when it does not apply.
    pub fn stat(&self, kind: StatKind) -> Value {
        let numeric = self.has_numeric && self.count > 0;
        let float = |v: Option<f64>| v.map_or(Value::Null, Value::Float);
        match kind {
            StatKind::Count => Value::Int(self.count as i64),
            StatKind::Sum => float(self.has_numeric.then_some(self.sum)),
            StatKind::Avg => float(numeric.then(|| self.moments.mean()).flatten()),
            StatKind::Min => float(numeric.then_some(self.min)),
            StatKind::Max => float(numeric.then_some(self.max)),
            StatKind::Var => float(self.moments.variance()),
            StatKind::Stddev => float(self.moments.stddev()),
            StatKind::Median => float(numeric.then(|| self.median.value())),
            StatKind::P25 => float(numeric.then(|| self.p25.value())),
            StatKind::P75 => float(numeric.then(|| self.p75.value())),
            StatKind::Skewness => float(self.moments.skewness()),
            StatKind::Kurtosis => float(self.moments.kurtosis()),
            StatKind::Distinct => match &self.hll {
                Some(h) if self.count > 0 => Value::Int(h.estimate().round() as i64),
                _ => Value::Null,
            },
            StatKind::Hist => self
                .hist
                .as_ref()
                .and_then(AdaptiveHistogram::render)
                .map_or(Value::Null, Value::Str),
            StatKind::Sample => match &self.sample {
                Some(r) if r.seen() > 0 => Value::Str(
                    r.items()
                        .iter()
                        .map(|v| format_general(*v, 6))
                        .collect::<Vec<_>>()
                        .join(","),
                ),
                _ => Value::Null,
            },
        }
    }
}

/// Text fed to the distinct counter: floats with 17 significant digits,
/// dates and timestamps as their integer offsets.
fn distinct_text(value: &Value) -> String {
    match value {
        Value::Float(v) => format_roundtrip(*v),
        Value::Int(v) => v.to_string(),
        Value::Date(v) => v.to_string(),
        Value::Timestamp(v) => v.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::schema::Field;

    fn ints(values: &[Option<i64>]) -> Batch {
        let mut b = Batch::with_fields(vec![Field::new("v", ValueKind::Int64)], values.len())
            .expect("batch");
        for v in values {
            b.push_values(&[v.map_or(Value::Null, Value::Int)])
                .expect("push");
        }
        b
    }

    #[test]
    fn nulls_are_skipped() {
        let mut acc = ColumnAccumulator::new("v", &StatKind::DEFAULTS, 1);
        acc.add_column(&ints(&[Some(1), None, Some(3)]), 0);
        assert_eq!(acc.stat(StatKind::Count), Value::Int(2));
        assert_eq!(acc.stat(StatKind::Sum), Value::Float(4.0));
        assert_eq!(acc.stat(StatKind::Avg), Value::Float(2.0));
    }

    #[test]
    fn string_column_counts_without_numeric_stats() {
        let mut b = Batch::with_fields(vec![Field::new("s", ValueKind::String)], 2).unwrap();
        b.push_values(&[Value::Str("a".into())]).unwrap();
        b.push_values(&[Value::Str("a".into())]).unwrap();
        let mut acc = ColumnAccumulator::new("s", &[StatKind::Count, StatKind::Distinct], 1);
        acc.add_column(&b, 0);
        assert_eq!(acc.stat(StatKind::Count), Value::Int(2));
        assert_eq!(acc.stat(StatKind::Sum), Value::Null);
        assert_eq!(acc.stat(StatKind::Min), Value::Null);
        assert_eq!(acc.stat(StatKind::Distinct), Value::Int(1));
    }

    #[test]
    fn single_value_has_no_variance() {
        let mut acc = ColumnAccumulator::new("v", &StatKind::DEFAULTS, 1);
        acc.add_column(&ints(&[Some(5)]), 0);
        assert_eq!(acc.stat(StatKind::Var), Value::Null);
        assert_eq!(acc.stat(StatKind::Median), Value::Float(5.0));
    }

    #[test]
    fn estimators_allocated_on_demand() {
        let acc = ColumnAccumulator::new("v", &StatKind::DEFAULTS, 1);
        assert!(acc.hll.is_none() && acc.hist.is_none() && acc.sample.is_none());
        assert_eq!(acc.stat(StatKind::Distinct), Value::Null);
    }

    #[test]
    fn sample_renders_kept_values() {
        let mut acc = ColumnAccumulator::new("v", &[StatKind::Sample], 1);
        acc.add_column(&ints(&[Some(1), Some(2)]), 0);
        assert_eq!(acc.stat(StatKind::Sample), Value::Str("1,2".into()));
    }
}
