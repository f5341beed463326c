//! Full sort: buffers the stream and emits one ordered batch at flush.

use serde::{Deserialize, Serialize};
use sluice_core::batch::{Batch, SortKey};

use crate::traits::{OpError, SideChannels, Step};

/// A sort column, either `"name"` / `"-name"` or `{"name": .., "desc": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortColumn {
    Name(String),
    Key {
        name: String,
        #[serde(default)]
        desc: bool,
    },
}

impl SortColumn {
    fn key(&self) -> SortKey {
        match self {
            SortColumn::Name(n) => match n.strip_prefix('-') {
                Some(rest) => SortKey::desc(rest),
                None => SortKey::asc(n.as_str()),
            },
            SortColumn::Key { name, desc: true } => SortKey::desc(name.as_str()),
            SortColumn::Key { name, desc: false } => SortKey::asc(name.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SortArgs {
    pub columns: Vec<SortColumn>,
}

pub struct Sort {
    keys: Vec<SortKey>,
    buffered: Option<Batch>,
}

impl Sort {
    pub fn new(args: &SortArgs) -> Result<Self, OpError> {
        if args.columns.is_empty() {
            return Err(OpError::Plan("sort needs at least one column".into()));
        }
        Ok(Self {
            keys: args.columns.iter().map(SortColumn::key).collect(),
            buffered: None,
        })
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }
}

impl Step for Sort {
    fn name(&self) -> &'static str {
        "sort"
    }

    fn process(
        &mut self,
        batch: Batch,
        _side: &mut SideChannels,
    ) -> Result<Option<Batch>, OpError> {
        if let Some(buf) = &mut self.buffered {
            for row in 0..batch.n_rows() {
                buf.push_row_from(&batch, row)?;
            }
            return Ok(None);
        }
        for key in &self.keys {
            if batch.col_index(&key.column).is_none() {
                return Err(OpError::Schema(format!(
                    "sort column '{}' not found",
                    key.column
                )));
            }
        }
        self.buffered = Some(batch);
        Ok(None)
    }

    fn flush(&mut self, _side: &mut SideChannels) -> Result<Option<Batch>, OpError> {
        let Some(buf) = self.buffered.take() else {
            return Ok(None);
        };
        let order = buf.sorted_indices(&self.keys)?;
        Ok(Some(buf.take_rows(&order)?))
    }
}
