//! Progressively-typed CSV decoder.
//!
//! Until the first batch is complete every cell is buffered as a string and
//! each column's kind widens with what it sees. When the detection window
//! fills (or input ends) null-only columns become String, the buffered rows
//! are re-parsed into typed columns and the kinds freeze. Later rows parse
//! straight into their frozen kind; a cell that does not parse is null.

use sluice_core::batch::Batch;
use sluice_core::config::EngineConfig;
use sluice_core::schema::{Field, Schema};
use sluice_core::temporal::date_to_timestamp;
use sluice_core::value::{widen, ValueKind};
use sluice_mem::{ByteBuffer, ScratchArena};

use super::field::split_fields;
use super::parse::{detect_kind, parse_date, parse_float64, parse_int64, parse_timestamp};
use super::scan::LineScanner;
use super::CsvDecodeOptions;
use crate::codec::Decoder;
use crate::error::{Error, Result};

const INITIAL_BATCH_ROWS: usize = 1024;

pub struct CsvDecoder {
    input: ByteBuffer,
    scanner: LineScanner,
    arena: ScratchArena,
    rows: RowBuilder,
}

impl CsvDecoder {
    pub fn new(opts: &CsvDecodeOptions, config: &EngineConfig) -> Result<Self> {
        let batch_size = opts.batch_size.unwrap_or(config.batch_size);
        if batch_size == 0 {
            return Err(Error::Options("batch_size must be positive".into()));
        }
        Ok(Self {
            input: ByteBuffer::new(),
            scanner: LineScanner::new(),
            arena: ScratchArena::with_limit(config.arena_block_size, config.arena_limit_bytes),
            rows: RowBuilder {
                delimiter: opts.delimiter_byte()?,
                header: opts.header,
                batch_size,
                names: None,
                kinds: Vec::new(),
                frozen: false,
                current: None,
                ready: Vec::new(),
            },
        })
    }

    /// Column names and current kinds, once the first record has been seen.
    pub fn schema(&self) -> Option<Schema> {
        let names = self.rows.names.as_ref()?;
        schema_of(names, &self.rows.kinds).ok()
    }

    pub fn is_frozen(&self) -> bool {
        self.rows.frozen
    }

    /// Bytes waiting for a terminator.
    pub fn buffered_bytes(&self) -> usize {
        self.input.readable()
    }

    pub fn scratch_peak_bytes(&self) -> usize {
        self.arena.peak_bytes()
    }
}

impl Decoder for CsvDecoder {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn decode(&mut self, input: &[u8]) -> Result<Vec<Batch>> {
        self.input.write(input);
        while let Some(span) = self.scanner.next_line(self.input.unread()) {
            if span.len > 0 {
                self.arena.reset();
                let line = &self.input.unread()[..span.len];
                self.rows.process_line(line, &self.arena)?;
            }
            self.input.consume(span.next);
        }
        self.input.compact();
        Ok(std::mem::take(&mut self.rows.ready))
    }

    fn flush(&mut self) -> Result<Vec<Batch>> {
        if !self.input.is_empty() {
            self.arena.reset();
            self.rows.process_line(self.input.unread(), &self.arena)?;
            self.input.clear();
        }
        self.scanner.reset();
        self.rows.emit()?;
        Ok(std::mem::take(&mut self.rows.ready))
    }
}

struct RowBuilder {
    delimiter: u8,
    header: bool,
    batch_size: usize,
    names: Option<Vec<String>>,
    kinds: Vec<ValueKind>,
    frozen: bool,
    current: Option<Batch>,
    ready: Vec<Batch>,
}

impl RowBuilder {
    fn process_line(&mut self, line: &[u8], arena: &ScratchArena) -> Result<()> {
        let fields = split_fields(line, self.delimiter, arena)?;

        if self.names.is_none() {
            let names = if self.header {
                unique_names(
                    fields
                        .iter()
                        .map(|f| String::from_utf8_lossy(f.bytes).into_owned()),
                )
            } else {
                (1..=fields.len()).map(|i| format!("col{}", i)).collect()
            };
            self.kinds = vec![ValueKind::Null; names.len()];
            self.names = Some(names);
            if self.header {
                return Ok(());
            }
        }

        if self.current.is_none() {
            self.current = Some(self.start_batch()?);
        }
        let Some(batch) = self.current.as_mut() else {
            return Ok(());
        };

        let row = batch.n_rows();
        batch.ensure_capacity(row + 1);
        for (col, kind) in self.kinds.iter_mut().enumerate() {
            let field = match fields.get(col) {
                Some(f) if !f.is_null() => f,
                _ => {
                    batch.set_null(row, col);
                    continue;
                }
            };
            if self.frozen {
                store_typed(batch, row, col, *kind, field.bytes)?;
            } else {
                *kind = widen(*kind, detect_kind(field.bytes));
                batch.set_str(row, col, &String::from_utf8_lossy(field.bytes))?;
            }
        }
        batch.set_n_rows(row + 1)?;

        if row + 1 >= self.batch_size {
            self.emit()?;
        }
        Ok(())
    }

    fn start_batch(&self) -> Result<Batch> {
        let names = self.names.as_deref().unwrap_or_default();
        let schema = if self.frozen {
            schema_of(names, &self.kinds)?
        } else {
            schema_of(names, &vec![ValueKind::String; names.len()])?
        };
        Ok(Batch::new(schema, self.batch_size.min(INITIAL_BATCH_ROWS)))
    }

    /// Hand the current batch over, typing it first if still detecting.
    fn emit(&mut self) -> Result<()> {
        let Some(batch) = self.current.take() else {
            return Ok(());
        };
        if batch.n_rows() == 0 {
            return Ok(());
        }
        let batch = if self.frozen {
            batch
        } else {
            self.freeze();
            let names = self.names.as_deref().unwrap_or_default();
            retype(&batch, schema_of(names, &self.kinds)?)?
        };

        #[cfg(feature = "tracing")]
        tracing::trace!(rows = batch.n_rows(), "csv batch ready");

        self.ready.push(batch);
        Ok(())
    }

    fn freeze(&mut self) {
        for kind in &mut self.kinds {
            if *kind == ValueKind::Null {
                *kind = ValueKind::String;
            }
        }
        self.frozen = true;

        #[cfg(feature = "tracing")]
        tracing::debug!(kinds = ?self.kinds, "csv column kinds frozen");
    }
}

fn schema_of(names: &[String], kinds: &[ValueKind]) -> Result<Schema> {
    let fields = names
        .iter()
        .zip(kinds)
        .map(|(n, k)| Field::new(n.clone(), *k))
        .collect();
    Ok(Schema::new(fields)?)
}

/// Header names with repeats suffixed `_2`, `_3`, ...
fn unique_names(raw: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for name in raw {
        let mut candidate = name.clone();
        let mut n = 2;
        while out.contains(&candidate) {
            candidate = format!("{}_{}", name, n);
            n += 1;
        }
        out.push(candidate);
    }
    out
}

/// Re-parse an all-String batch into `schema`'s kinds.
fn retype(strings: &Batch, schema: Schema) -> Result<Batch> {
    let n_rows = strings.n_rows();
    let mut typed = Batch::new(schema, n_rows);
    for col in 0..typed.n_cols() {
        let kind = typed.col_kind(col);
        for row in 0..n_rows {
            if let Some(text) = strings.get_str(row, col) {
                store_typed(&mut typed, row, col, kind, text.as_bytes())?;
            }
        }
    }
    typed.set_n_rows(n_rows)?;
    Ok(typed)
}

fn store_typed(
    batch: &mut Batch,
    row: usize,
    col: usize,
    kind: ValueKind,
    text: &[u8],
) -> Result<()> {
    match kind {
        ValueKind::Int64 => match parse_int64(text) {
            Some(v) => batch.set_int64(row, col, v)?,
            None => batch.set_null(row, col),
        },
        ValueKind::Float64 => match parse_float64(text) {
            Some(v) => batch.set_float64(row, col, v)?,
            None => batch.set_null(row, col),
        },
        ValueKind::Date => match parse_date(text) {
            Some(v) => batch.set_date(row, col, v)?,
            None => batch.set_null(row, col),
        },
        ValueKind::Timestamp => {
            match parse_timestamp(text).or_else(|| parse_date(text).map(date_to_timestamp)) {
                Some(v) => batch.set_timestamp(row, col, v)?,
                None => batch.set_null(row, col),
            }
        }
        ValueKind::String => batch.set_str(row, col, &String::from_utf8_lossy(text))?,
        ValueKind::Bool | ValueKind::Null => batch.set_null(row, col),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder(batch_size: usize) -> CsvDecoder {
        let opts = CsvDecodeOptions {
            batch_size: Some(batch_size),
            ..Default::default()
        };
        CsvDecoder::new(&opts, &EngineConfig::default()).expect("decoder")
    }

    #[test]
    fn window_detects_then_freezes() {
        let mut dec = decoder(2);
        let out = dec.decode(b"id,score\n1,2\n2,x\n3,4\n").unwrap();
        assert_eq!(out.len(), 1);
        assert!(dec.is_frozen());
        let first = &out[0];
        assert_eq!(first.col_kind(0), ValueKind::Int64);
        assert_eq!(first.col_kind(1), ValueKind::String);

        let rest = dec.flush().unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].col_kind(1), ValueKind::String);
        assert_eq!(rest[0].get_str(0, 1), Some("4"));
    }

    #[test]
    fn frozen_kind_nulls_unparseable_cells() {
        let mut dec = decoder(1);
        let mut out = dec.decode(b"n\n5\nfive\n").unwrap();
        out.extend(dec.flush().unwrap());
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].col_kind(0), ValueKind::Int64);
        assert!(out[1].is_null(0, 0));
    }

    #[test]
    fn null_only_column_becomes_string() {
        let mut dec = decoder(8);
        dec.decode(b"a,b\n1,\n2,\n").unwrap();
        let out = dec.flush().unwrap();
        assert_eq!(out[0].col_kind(1), ValueKind::String);
        assert!(out[0].is_null(0, 1));
    }

    #[test]
    fn short_rows_padded_extra_fields_dropped() {
        let mut dec = decoder(8);
        dec.decode(b"a,b\n1\n2,3,4\n").unwrap();
        let out = dec.flush().unwrap();
        let b = &out[0];
        assert_eq!(b.n_cols(), 2);
        assert!(b.is_null(0, 1));
        assert_eq!(b.get_int64(1, 1), Some(3));
    }

    #[test]
    fn quoted_empty_is_empty_string() {
        let mut dec = decoder(8);
        dec.decode(b"s\n\"\"\nx\n").unwrap();
        let out = dec.flush().unwrap();
        assert_eq!(out[0].get_str(0, 0), Some(""));
        assert!(!out[0].is_null(0, 0));
    }

    #[test]
    fn timestamp_column_accepts_dates() {
        let mut dec = decoder(1);
        let mut out = dec.decode(b"t\n2024-01-15T00:00:00Z\n2024-01-16\n").unwrap();
        out.extend(dec.flush().unwrap());
        assert_eq!(out[1].col_kind(0), ValueKind::Timestamp);
        assert_eq!(out[1].get_timestamp(0, 0), Some(date_to_timestamp(19_738)));
    }

    #[test]
    fn duplicate_header_names_suffixed() {
        let mut dec = decoder(8);
        dec.decode(b"a,a,b,a\n").unwrap();
        let names: Vec<String> = dec
            .schema()
            .unwrap()
            .names()
            .map(str::to_string)
            .collect();
        assert_eq!(names, ["a", "a_2", "b", "a_3"]);
    }

    #[test]
    fn headerless_columns_numbered() {
        let opts = CsvDecodeOptions {
            header: false,
            ..Default::default()
        };
        let mut dec = CsvDecoder::new(&opts, &EngineConfig::default()).unwrap();
        dec.decode(b"1,x\n2,y").unwrap();
        let out = dec.flush().unwrap();
        assert_eq!(out[0].n_rows(), 2);
        assert_eq!(out[0].col_name(0), "col1");
        assert_eq!(out[0].col_name(1), "col2");
    }

    #[test]
    fn zero_batch_size_rejected() {
        let opts = CsvDecodeOptions {
            batch_size: Some(0),
            ..Default::default()
        };
        assert!(CsvDecoder::new(&opts, &EngineConfig::default()).is_err());
    }
}
