use crate::domain::Record;
use crate::utils::error::{EtlError, Result};

/// Strips a record down to a relevant-key allowlist or a drop-key denylist,
/// between the transformation pipeline and batch generation.
#[derive(Debug, Clone)]
pub struct DataCleaner {
    relevant_keys: Option<Vec<String>>,
    drop_keys: Option<Vec<String>>,
}

impl DataCleaner {
    pub fn new(
        relevant_keys: Option<Vec<String>>,
        drop_keys: Option<Vec<String>>,
    ) -> Result<Self> {
        let no_relevant = relevant_keys.as_deref().is_none_or(|k| k.is_empty());
        let no_drop = drop_keys.as_deref().is_none_or(|k| k.is_empty());
        if no_relevant && no_drop {
            return Err(EtlError::Config {
                message: "relevant_keys or drop_keys must be defined".to_string(),
            });
        }
        Ok(Self {
            relevant_keys,
            drop_keys,
        })
    }

    pub fn with_relevant_keys(keys: impl IntoIterator<Item = impl Into<String>>) -> Result<Self> {
        Self::new(Some(keys.into_iter().map(Into::into).collect()), None)
    }

    pub fn with_drop_keys(keys: impl IntoIterator<Item = impl Into<String>>) -> Result<Self> {
        Self::new(None, Some(keys.into_iter().map(Into::into).collect()))
    }

    pub fn clean(&self, mut record: Record) -> Record {
        if let Some(keep) = &self.relevant_keys {
            record.data.retain(|key, _| keep.iter().any(|k| k == key));
        } else if let Some(drop) = &self.drop_keys {
            for key in drop {
                record.remove(key);
            }
        }
        record
    }
}
