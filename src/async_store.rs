// Async fact loading, for callers that load the bundled file off the UI path.

use crate::store::{parse_facts, FactStore, StoreError};
use crate::Fact;
use std::path::Path;

impl FactStore {
    /// Async variant of [`FactStore::load_from_path`].
    pub async fn load_from_path_async(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let result = try_load_facts_async(path).await;
        Self::from_load_result(path, result)
    }
}

/// Async variant of [`crate::store::try_load_facts`].
pub async fn try_load_facts_async(path: impl AsRef<Path>) -> Result<Vec<Fact>, StoreError> {
    let bytes = tokio::fs::read(path).await?;
    parse_facts(&bytes)
}
