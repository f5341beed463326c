//! Column renaming.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sluice_core::batch::Batch;

use crate::traits::{OpError, SideChannels, Step};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenameArgs {
    /// Column rename map: old_name -> new_name
    pub mapping: BTreeMap<String, String>,
}

#[derive(Default)]
pub struct Rename {
    renames: BTreeMap<String, String>,
}

impl Rename {
    pub fn new(args: &RenameArgs) -> Self {
        Self {
            renames: args.mapping.clone(),
        }
    }
}

impl Step for Rename {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn process(
        &mut self,
        mut batch: Batch,
        _side: &mut SideChannels,
    ) -> Result<Option<Batch>, OpError> {
        // If no renames, pass through
        if self.renames.is_empty() {
            return Ok(Some(batch));
        }
        let names = batch
            .schema()
            .names()
            .map(|n| self.renames.get(n).cloned().unwrap_or_else(|| n.to_string()))
            .collect();
        batch.set_column_names(names)?;
        Ok(Some(batch))
    }
}
