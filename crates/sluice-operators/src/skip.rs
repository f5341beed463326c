//! Drop the first `n` rows of the stream.

use serde::{Deserialize, Serialize};
use sluice_core::batch::Batch;

use crate::traits::{OpError, SideChannels, Step};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkipArgs {
    pub n: usize,
}

pub struct Skip {
    to_skip: usize,
}

impl Skip {
    pub fn new(args: &SkipArgs) -> Self {
        Self { to_skip: args.n }
    }
}

impl Step for Skip {
    fn name(&self) -> &'static str {
        "skip"
    }

    fn process(
        &mut self,
        batch: Batch,
        _side: &mut SideChannels,
    ) -> Result<Option<Batch>, OpError> {
        if self.to_skip == 0 {
            return Ok(Some(batch));
        }
        let n = batch.n_rows();
        if n <= self.to_skip {
            self.to_skip -= n;
            return Ok(None);
        }
        let keep: Vec<usize> = (self.to_skip..n).collect();
        self.to_skip = 0;
        Ok(Some(batch.take_rows(&keep)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::schema::Field;
    use sluice_core::value::{Value, ValueKind};

    fn rows(start: i64, n: i64) -> Batch {
        let mut b = Batch::with_fields(vec![Field::new("i", ValueKind::Int64)], 0).unwrap();
        for i in start..start + n {
            b.push_values(&[Value::Int(i)]).unwrap();
        }
        b
    }

    #[test]
    fn skips_across_batches() {
        let mut skip = Skip::new(&SkipArgs { n: 4 });
        let mut side = SideChannels::new();
        assert!(skip.process(rows(0, 3), &mut side).unwrap().is_none());
        let out = skip.process(rows(3, 3), &mut side).unwrap().unwrap();
        assert_eq!(out.n_rows(), 2);
        assert_eq!(out.get_int64(0, 0), Some(4));
        let out = skip.process(rows(6, 2), &mut side).unwrap().unwrap();
        assert_eq!(out.n_rows(), 2);
    }
}
