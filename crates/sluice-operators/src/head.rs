//! First `n` rows of the stream.

use serde::{Deserialize, Serialize};
use sluice_core::batch::Batch;

use crate::traits::{OpError, SideChannels, Step};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeadArgs {
    pub n: usize,
}

pub struct Head {
    remaining: usize,
}

impl Head {
    pub fn new(args: &HeadArgs) -> Self {
        Self { remaining: args.n }
    }
}

impl Step for Head {
    fn name(&self) -> &'static str {
        "head"
    }

    fn process(
        &mut self,
        mut batch: Batch,
        _side: &mut SideChannels,
    ) -> Result<Option<Batch>, OpError> {
        if self.remaining == 0 {
            return Ok(None);
        }
        if batch.n_rows() > self.remaining {
            batch.truncate(self.remaining);
        }
        self.remaining -= batch.n_rows();
        Ok(Some(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::schema::Field;
    use sluice_core::value::{Value, ValueKind};

    fn rows(n: i64) -> Batch {
        let mut b = Batch::with_fields(vec![Field::new("i", ValueKind::Int64)], 0).unwrap();
        for i in 0..n {
            b.push_values(&[Value::Int(i)]).unwrap();
        }
        b
    }

    #[test]
    fn stops_across_batches() {
        let mut head = Head::new(&HeadArgs { n: 5 });
        let mut side = SideChannels::new();
        assert_eq!(head.process(rows(3), &mut side).unwrap().unwrap().n_rows(), 3);
        assert_eq!(head.process(rows(3), &mut side).unwrap().unwrap().n_rows(), 2);
        assert!(head.process(rows(3), &mut side).unwrap().is_none());
    }
}
