//! CSV encoder on top of the `csv` crate writer.

use std::borrow::Cow;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use sluice_core::batch::Batch;
use sluice_core::temporal::{format_date, format_timestamp};
use sluice_core::value::ValueKind;
use sluice_mem::ByteBuffer;

use super::CsvEncodeOptions;
use crate::codec::Encoder;
use crate::error::{Error, Result};

pub struct CsvEncoder {
    delimiter: u8,
    header: bool,
    header_written: bool,
}

impl CsvEncoder {
    pub fn new(opts: &CsvEncodeOptions) -> Result<Self> {
        Ok(Self {
            delimiter: opts.delimiter_byte()?,
            header: opts.header,
            header_written: false,
        })
    }
}

fn render_cell(batch: &Batch, row: usize, col: usize) -> Cow<'_, str> {
    if batch.is_null(row, col) {
        return Cow::Borrowed("");
    }
    let rendered = match batch.col_kind(col) {
        ValueKind::Null => None,
        ValueKind::Bool => batch
            .get_bool(row, col)
            .map(|v| Cow::Borrowed(if v { "true" } else { "false" })),
        ValueKind::Int64 => batch.get_int64(row, col).map(|v| Cow::Owned(v.to_string())),
        ValueKind::Float64 => batch
            .get_float64(row, col)
            .map(|v| Cow::Owned(v.to_string())),
        ValueKind::String => batch.get_str(row, col).map(Cow::Borrowed),
        ValueKind::Date => batch
            .get_date(row, col)
            .map(|v| Cow::Owned(format_date(v))),
        ValueKind::Timestamp => batch
            .get_timestamp(row, col)
            .map(|v| Cow::Owned(format_timestamp(v))),
    };
    rendered.unwrap_or(Cow::Borrowed(""))
}

impl Encoder for CsvEncoder {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn encode(&mut self, batch: &Batch, out: &mut ByteBuffer) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(Terminator::Any(b'\n'))
            .quote_style(QuoteStyle::Necessary)
            .has_headers(false)
            .from_writer(out);

        if self.header && !self.header_written {
            writer.write_record(batch.schema().names())?;
            self.header_written = true;
        }

        let mut record: Vec<Cow<'_, str>> = Vec::with_capacity(batch.n_cols());
        for row in 0..batch.n_rows() {
            record.clear();
            record.extend((0..batch.n_cols()).map(|col| render_cell(batch, row, col)));
            writer.write_record(record.iter().map(|c| c.as_bytes()))?;
        }
        writer
            .flush()
            .map_err(|e| Error::Encode(format!("flushing csv writer: {}", e)))
    }

    fn flush(&mut self, _out: &mut ByteBuffer) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::schema::Field;
    use sluice_core::value::Value;

    fn encode(batch: &Batch) -> String {
        let mut enc = CsvEncoder::new(&CsvEncodeOptions::default()).unwrap();
        let mut out = ByteBuffer::new();
        enc.encode(batch, &mut out).unwrap();
        String::from_utf8(out.read_to_vec(usize::MAX)).unwrap()
    }

    #[test]
    fn minimal_quoting() {
        let mut b = Batch::with_fields(vec![Field::new("s", ValueKind::String)], 4).unwrap();
        for s in ["plain", "a,b", "say \"hi\"", "two\nlines"] {
            b.push_values(&[Value::Str(s.into())]).unwrap();
        }
        assert_eq!(
            encode(&b),
            "s\nplain\n\"a,b\"\n\"say \"\"hi\"\"\"\n\"two\nlines\"\n"
        );
    }

    #[test]
    fn kinds_render() {
        let mut b = Batch::with_fields(
            vec![
                Field::new("b", ValueKind::Bool),
                Field::new("i", ValueKind::Int64),
                Field::new("f", ValueKind::Float64),
                Field::new("d", ValueKind::Date),
                Field::new("t", ValueKind::Timestamp),
                Field::new("n", ValueKind::Int64),
            ],
            1,
        )
        .unwrap();
        b.push_values(&[
            Value::Bool(true),
            Value::Int(-3),
            Value::Float(2.5),
            Value::Date(19_737),
            Value::Timestamp(1_500_000),
            Value::Null,
        ])
        .unwrap();
        assert_eq!(
            encode(&b),
            "b,i,f,d,t,n\ntrue,-3,2.5,2024-01-15,1970-01-01T00:00:01.5Z,\n"
        );
    }

    #[test]
    fn header_written_once() {
        let mut b = Batch::with_fields(vec![Field::new("x", ValueKind::Int64)], 1).unwrap();
        b.push_values(&[Value::Int(1)]).unwrap();
        let mut enc = CsvEncoder::new(&CsvEncodeOptions::default()).unwrap();
        let mut out = ByteBuffer::new();
        enc.encode(&b, &mut out).unwrap();
        enc.encode(&b, &mut out).unwrap();
        enc.flush(&mut out).unwrap();
        assert_eq!(out.unread(), b"x\n1\n1\n");
    }

    #[test]
    fn header_can_be_disabled() {
        let mut b = Batch::with_fields(vec![Field::new("x", ValueKind::Int64)], 1).unwrap();
        b.push_values(&[Value::Int(7)]).unwrap();
        let opts = CsvEncodeOptions {
            header: false,
            ..Default::default()
        };
        let mut enc = CsvEncoder::new(&opts).unwrap();
        let mut out = ByteBuffer::new();
        enc.encode(&b, &mut out).unwrap();
        assert_eq!(out.unread(), b"7\n");
    }
}
