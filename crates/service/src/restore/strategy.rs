use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use super::errors::RestoreError;
use super::importers::{KeepImporter, MergeImporter, ReplaceImporter};
use crate::record::ConfigRecord;
use crate::store::CoreStore;

/// Reconciliation policy applied to every record of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Overwrite existing entries with the incoming record
    #[default]
    Replace,
    /// Deep-merge the incoming record on top of existing entries
    Merge,
    /// Leave existing entries alone, only create missing ones
    Keep,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Replace, Strategy::Merge, Strategy::Keep];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Replace => "replace",
            Strategy::Merge => "merge",
            Strategy::Keep => "keep",
        }
    }
}

impl FromStr for Strategy {
    type Err = RestoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| RestoreError::UnsupportedStrategy(s.to_string()))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a single `import` did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Created,
    Updated,
    /// An entry already existed and was left as is
    Unchanged,
}

/// Reconciles one record at a time against the store.
#[async_trait]
pub trait Importer: Send + Sync {
    fn strategy(&self) -> Strategy;
    async fn import(&self, record: &ConfigRecord) -> Result<ImportOutcome, RestoreError>;
}

/// Map a strategy name to its importer. Unknown names fail with
/// `UnsupportedStrategy` without touching the store.
pub fn create_importer(strategy: &str, store: Arc<dyn CoreStore>) -> Result<Box<dyn Importer>, RestoreError> {
    let importer: Box<dyn Importer> = match strategy.parse::<Strategy>()? {
        Strategy::Replace => Box::new(ReplaceImporter::new(store)),
        Strategy::Merge => Box::new(MergeImporter::new(store)),
        Strategy::Keep => Box::new(KeepImporter::new(store)),
    };
    Ok(importer)
}
