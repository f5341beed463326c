//! Typed columnar batch: the unit of data moved through a pipeline.
//!
//! Every column keeps one typed vector and one null-indicator vector, both
//! sized to `capacity`. String cells are packed into a per-column byte heap
//! owned by the batch, so filling a column does not allocate per value.
//! Cells start out null; `n_rows` is the only row count and is set by the
//! producer once rows are written.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::schema::{Field, Schema};
use crate::value::{Value, ValueKind};

const MIN_GROW_CAPACITY: usize = 16;

/// Packed string storage for one column.
///
/// Overwriting a cell appends the new text and leaves the old bytes behind
/// until the batch is dropped.
#[derive(Debug, Clone, Default)]
pub struct StrColumn {
    heap: String,
    spans: Vec<(usize, usize)>,
}

impl StrColumn {
    fn with_capacity(rows: usize) -> Self {
        Self {
            heap: String::new(),
            spans: vec![(0, 0); rows],
        }
    }

    fn set(&mut self, row: usize, s: &str) {
        let start = self.heap.len();
        self.heap.push_str(s);
        self.spans[row] = (start, s.len());
    }

    fn get(&self, row: usize) -> &str {
        let (start, len) = self.spans[row];
        &self.heap[start..start + len]
    }

    fn resize(&mut self, rows: usize) {
        self.spans.resize(rows, (0, 0));
    }

    /// Bytes held by the heap, including overwritten cells.
    pub fn heap_bytes(&self) -> usize {
        self.heap.len()
    }
}

#[derive(Debug, Clone)]
pub enum ColumnData {
    /// Column of kind `Null`: every cell is null and nothing is stored.
    Null,
    Bool(Vec<bool>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Utf8(StrColumn),
    Date(Vec<i32>),
    Timestamp(Vec<i64>),
}

impl ColumnData {
    fn new(kind: ValueKind, capacity: usize) -> Self {
        match kind {
            ValueKind::Null => ColumnData::Null,
            ValueKind::Bool => ColumnData::Bool(vec![false; capacity]),
            ValueKind::Int64 => ColumnData::Int64(vec![0; capacity]),
            ValueKind::Float64 => ColumnData::Float64(vec![0.0; capacity]),
            ValueKind::String => ColumnData::Utf8(StrColumn::with_capacity(capacity)),
            ValueKind::Date => ColumnData::Date(vec![0; capacity]),
            ValueKind::Timestamp => ColumnData::Timestamp(vec![0; capacity]),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            ColumnData::Null => ValueKind::Null,
            ColumnData::Bool(_) => ValueKind::Bool,
            ColumnData::Int64(_) => ValueKind::Int64,
            ColumnData::Float64(_) => ValueKind::Float64,
            ColumnData::Utf8(_) => ValueKind::String,
            ColumnData::Date(_) => ValueKind::Date,
            ColumnData::Timestamp(_) => ValueKind::Timestamp,
        }
    }

    fn resize(&mut self, capacity: usize) {
        match self {
            ColumnData::Null => {}
            ColumnData::Bool(v) => v.resize(capacity, false),
            ColumnData::Int64(v) => v.resize(capacity, 0),
            ColumnData::Float64(v) => v.resize(capacity, 0.0),
            ColumnData::Utf8(s) => s.resize(capacity),
            ColumnData::Date(v) => v.resize(capacity, 0),
            ColumnData::Timestamp(v) => v.resize(capacity, 0),
        }
    }
}

/// Sort key for [`Batch::sorted_indices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Batch {
    schema: Schema,
    columns: Vec<ColumnData>,
    nulls: Vec<Vec<bool>>,
    n_rows: usize,
    capacity: usize,
}

impl Batch {
    /// Create an empty batch with a fixed schema; all cells start null.
    pub fn new(schema: Schema, capacity: usize) -> Self {
        let columns = schema
            .fields
            .iter()
            .map(|f| ColumnData::new(f.kind, capacity))
            .collect();
        let nulls = vec![vec![true; capacity]; schema.len()];
        Self {
            schema,
            columns,
            nulls,
            n_rows: 0,
            capacity,
        }
    }

    /// Convenience constructor validating the field list.
    pub fn with_fields(fields: Vec<Field>, capacity: usize) -> Result<Self> {
        Ok(Self::new(Schema::new(fields)?, capacity))
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn col_name(&self, col: usize) -> &str {
        &self.schema.fields[col].name
    }

    pub fn col_kind(&self, col: usize) -> ValueKind {
        self.schema.fields[col].kind
    }

    pub fn col_index(&self, name: &str) -> Option<usize> {
        self.schema.index_of(name)
    }

    pub fn column(&self, col: usize) -> &ColumnData {
        &self.columns[col]
    }

    pub fn set_n_rows(&mut self, n: usize) -> Result<()> {
        if n > self.capacity {
            return Err(Error::Invariant(format!(
                "row count {} exceeds batch capacity {}",
                n, self.capacity
            )));
        }
        self.n_rows = n;
        Ok(())
    }

    /// Grow every column so that at least `rows` rows fit.
    ///
    /// Capacity doubles (starting from 16) until it is large enough.
    pub fn ensure_capacity(&mut self, rows: usize) {
        if rows <= self.capacity {
            return;
        }
        let mut cap = self.capacity.max(MIN_GROW_CAPACITY);
        while cap < rows {
            cap *= 2;
        }
        for col in &mut self.columns {
            col.resize(cap);
        }
        for nulls in &mut self.nulls {
            nulls.resize(cap, true);
        }
        self.capacity = cap;
    }

    /// Rename column `col`, keeping names unique.
    pub fn rename_column(&mut self, col: usize, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if let Some(existing) = self.schema.index_of(&name) {
            if existing != col {
                return Err(Error::Schema(format!("duplicate column name '{}'", name)));
            }
        }
        self.schema.fields[col].name = name;
        Ok(())
    }

    /// Replace every column name at once; the new names must be unique.
    pub fn set_column_names(&mut self, names: Vec<String>) -> Result<()> {
        if names.len() != self.n_cols() {
            return Err(Error::Schema(format!(
                "expected {} column names, got {}",
                self.n_cols(),
                names.len()
            )));
        }
        let fields = self
            .schema
            .fields
            .iter()
            .zip(names)
            .map(|(f, name)| Field::new(name, f.kind))
            .collect();
        self.schema = Schema::new(fields)?;
        Ok(())
    }

    // ---- cell access -------------------------------------------------------

    pub fn is_null(&self, row: usize, col: usize) -> bool {
        self.nulls[col][row]
    }

    pub fn set_null(&mut self, row: usize, col: usize) {
        self.nulls[col][row] = true;
    }

    fn mismatch(&self, col: usize, expected: ValueKind) -> Error {
        Error::Type {
            column: self.schema.fields[col].name.clone(),
            expected: expected.name(),
            actual: self.col_kind(col).name(),
        }
    }

    pub fn set_bool(&mut self, row: usize, col: usize, v: bool) -> Result<()> {
        match &mut self.columns[col] {
            ColumnData::Bool(values) => values[row] = v,
            _ => return Err(self.mismatch(col, ValueKind::Bool)),
        }
        self.nulls[col][row] = false;
        Ok(())
    }

    pub fn set_int64(&mut self, row: usize, col: usize, v: i64) -> Result<()> {
        match &mut self.columns[col] {
            ColumnData::Int64(values) => values[row] = v,
            _ => return Err(self.mismatch(col, ValueKind::Int64)),
        }
        self.nulls[col][row] = false;
        Ok(())
    }

    pub fn set_float64(&mut self, row: usize, col: usize, v: f64) -> Result<()> {
        match &mut self.columns[col] {
            ColumnData::Float64(values) => values[row] = v,
            _ => return Err(self.mismatch(col, ValueKind::Float64)),
        }
        self.nulls[col][row] = false;
        Ok(())
    }

    pub fn set_str(&mut self, row: usize, col: usize, v: &str) -> Result<()> {
        match &mut self.columns[col] {
            ColumnData::Utf8(strings) => strings.set(row, v),
            _ => return Err(self.mismatch(col, ValueKind::String)),
        }
        self.nulls[col][row] = false;
        Ok(())
    }

    pub fn set_date(&mut self, row: usize, col: usize, v: i32) -> Result<()> {
        match &mut self.columns[col] {
            ColumnData::Date(values) => values[row] = v,
            _ => return Err(self.mismatch(col, ValueKind::Date)),
        }
        self.nulls[col][row] = false;
        Ok(())
    }

    pub fn set_timestamp(&mut self, row: usize, col: usize, v: i64) -> Result<()> {
        match &mut self.columns[col] {
            ColumnData::Timestamp(values) => values[row] = v,
            _ => return Err(self.mismatch(col, ValueKind::Timestamp)),
        }
        self.nulls[col][row] = false;
        Ok(())
    }

    pub fn get_bool(&self, row: usize, col: usize) -> Option<bool> {
        match &self.columns[col] {
            ColumnData::Bool(v) if !self.nulls[col][row] => Some(v[row]),
            _ => None,
        }
    }

    pub fn get_int64(&self, row: usize, col: usize) -> Option<i64> {
        match &self.columns[col] {
            ColumnData::Int64(v) if !self.nulls[col][row] => Some(v[row]),
            _ => None,
        }
    }

    pub fn get_float64(&self, row: usize, col: usize) -> Option<f64> {
        match &self.columns[col] {
            ColumnData::Float64(v) if !self.nulls[col][row] => Some(v[row]),
            _ => None,
        }
    }

    pub fn get_str(&self, row: usize, col: usize) -> Option<&str> {
        match &self.columns[col] {
            ColumnData::Utf8(s) if !self.nulls[col][row] => Some(s.get(row)),
            _ => None,
        }
    }

    pub fn get_date(&self, row: usize, col: usize) -> Option<i32> {
        match &self.columns[col] {
            ColumnData::Date(v) if !self.nulls[col][row] => Some(v[row]),
            _ => None,
        }
    }

    pub fn get_timestamp(&self, row: usize, col: usize) -> Option<i64> {
        match &self.columns[col] {
            ColumnData::Timestamp(v) if !self.nulls[col][row] => Some(v[row]),
            _ => None,
        }
    }

    /// Owned copy of one cell.
    pub fn value(&self, row: usize, col: usize) -> Value {
        if self.nulls[col][row] {
            return Value::Null;
        }
        match &self.columns[col] {
            ColumnData::Null => Value::Null,
            ColumnData::Bool(v) => Value::Bool(v[row]),
            ColumnData::Int64(v) => Value::Int(v[row]),
            ColumnData::Float64(v) => Value::Float(v[row]),
            ColumnData::Utf8(s) => Value::Str(s.get(row).to_string()),
            ColumnData::Date(v) => Value::Date(v[row]),
            ColumnData::Timestamp(v) => Value::Timestamp(v[row]),
        }
    }

    /// Write one cell; `Value::Null` clears it. The value kind must match the
    /// column kind.
    pub fn set_value(&mut self, row: usize, col: usize, value: &Value) -> Result<()> {
        match value {
            Value::Null => {
                self.set_null(row, col);
                Ok(())
            }
            Value::Bool(v) => self.set_bool(row, col, *v),
            Value::Int(v) => self.set_int64(row, col, *v),
            Value::Float(v) => self.set_float64(row, col, *v),
            Value::Str(v) => self.set_str(row, col, v),
            Value::Date(v) => self.set_date(row, col, *v),
            Value::Timestamp(v) => self.set_timestamp(row, col, *v),
        }
    }

    /// Copy row `src_row` of `src` into row `dst_row` of `self`, growing as
    /// needed. Both batches must share column count and kinds.
    pub fn copy_row(&mut self, dst_row: usize, src: &Batch, src_row: usize) -> Result<()> {
        if src.n_cols() != self.n_cols() {
            return Err(Error::Schema(format!(
                "cannot copy row between batches with {} and {} columns",
                src.n_cols(),
                self.n_cols()
            )));
        }
        self.ensure_capacity(dst_row + 1);
        for col in 0..self.n_cols() {
            if self.col_kind(col) != src.col_kind(col) {
                return Err(self.mismatch(col, src.col_kind(col)));
            }
            if src.nulls[col][src_row] {
                self.nulls[col][dst_row] = true;
                continue;
            }
            match (&mut self.columns[col], &src.columns[col]) {
                (ColumnData::Bool(d), ColumnData::Bool(s)) => d[dst_row] = s[src_row],
                (ColumnData::Int64(d), ColumnData::Int64(s)) => d[dst_row] = s[src_row],
                (ColumnData::Float64(d), ColumnData::Float64(s)) => d[dst_row] = s[src_row],
                (ColumnData::Utf8(d), ColumnData::Utf8(s)) => d.set(dst_row, s.get(src_row)),
                (ColumnData::Date(d), ColumnData::Date(s)) => d[dst_row] = s[src_row],
                (ColumnData::Timestamp(d), ColumnData::Timestamp(s)) => d[dst_row] = s[src_row],
                // Null-kind columns hold nothing beyond the indicator.
                _ => continue,
            }
            self.nulls[col][dst_row] = false;
        }
        Ok(())
    }

    /// Append row `src_row` of `src` after the current last row.
    pub fn push_row_from(&mut self, src: &Batch, src_row: usize) -> Result<()> {
        let row = self.n_rows;
        self.copy_row(row, src, src_row)?;
        self.n_rows = row + 1;
        Ok(())
    }

    /// Append a row of owned values (shorter rows are null-padded).
    pub fn push_values(&mut self, values: &[Value]) -> Result<()> {
        let row = self.n_rows;
        self.ensure_capacity(row + 1);
        for col in 0..self.n_cols() {
            match values.get(col) {
                Some(v) => self.set_value(row, col, v)?,
                None => self.set_null(row, col),
            }
        }
        self.n_rows = row + 1;
        Ok(())
    }

    /// New batch with the same schema holding the given rows, in order.
    pub fn take_rows(&self, rows: &[usize]) -> Result<Batch> {
        let mut out = Batch::new(self.schema.clone(), rows.len());
        for (dst, &src) in rows.iter().enumerate() {
            out.copy_row(dst, self, src)?;
        }
        out.n_rows = rows.len();
        Ok(out)
    }

    /// Drop every row at or beyond `n`.
    pub fn truncate(&mut self, n: usize) {
        if n < self.n_rows {
            self.n_rows = n;
        }
    }

    /// Row order satisfying `keys`, stable, with nulls last for every key.
    pub fn sorted_indices(&self, keys: &[SortKey]) -> Result<Vec<usize>> {
        let key_cols = keys
            .iter()
            .map(|k| {
                self.col_index(&k.column)
                    .map(|c| (c, k.descending))
                    .ok_or_else(|| Error::Schema(format!("sort key column '{}' not found", k.column)))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut order: Vec<usize> = (0..self.n_rows).collect();
        order.sort_by(|&a, &b| {
            for &(col, descending) in &key_cols {
                let ord = match (self.is_null(a, col), self.is_null(b, col)) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => {
                        let ord = self.cmp_cells(a, b, col);
                        if descending {
                            ord.reverse()
                        } else {
                            ord
                        }
                    }
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
        Ok(order)
    }

    fn cmp_cells(&self, a: usize, b: usize, col: usize) -> Ordering {
        match &self.columns[col] {
            ColumnData::Null => Ordering::Equal,
            ColumnData::Bool(v) => v[a].cmp(&v[b]),
            ColumnData::Int64(v) => v[a].cmp(&v[b]),
            ColumnData::Float64(v) => v[a].total_cmp(&v[b]),
            ColumnData::Utf8(s) => s.get(a).cmp(s.get(b)),
            ColumnData::Date(v) => v[a].cmp(&v[b]),
            ColumnData::Timestamp(v) => v[a].cmp(&v[b]),
        }
    }
}
