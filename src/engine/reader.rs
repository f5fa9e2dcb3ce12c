//! Sharded JSON input.

use super::ExecutionContext;
use crate::error::{EtlError, Result};
use crate::storage::glob_keys;
use futures::stream::{self, StreamExt, TryStreamExt};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

/// Decodes every JSON value in a shard, in order. Shards may hold a single
/// object or newline-delimited objects.
fn decode_shard<T: DeserializeOwned>(location: &str, bytes: &[u8]) -> Result<Vec<T>> {
    serde_json::Deserializer::from_slice(bytes)
        .into_iter::<T>()
        .enumerate()
        .map(|(index, value)| {
            value.map_err(|source| EtlError::Decode {
                location: location.to_string(),
                index,
                source,
            })
        })
        .collect()
}

impl ExecutionContext {
    /// Reads every shard matching `pattern` under the input root.
    ///
    /// Records come back in shard-key order, then in position within the
    /// shard, so a record's index in the result is stable for a given input
    /// listing. A pattern matching nothing is an error.
    pub async fn read_json<T>(&self, pattern: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let storage = self.input();
        let keys = glob_keys(storage, pattern).await?;
        if keys.is_empty() {
            return Err(EtlError::NoInput {
                pattern: storage.uri_for(pattern.trim_start_matches('/')),
            });
        }

        let shards: Vec<(String, Vec<u8>)> = stream::iter(keys)
            .map(|key| async move {
                let bytes = storage.read(&key).await?;
                debug!("Fetched {} ({} bytes)", storage.uri_for(&key), bytes.len());
                Ok::<_, EtlError>((key, bytes))
            })
            .buffered(self.options().io_concurrency)
            .try_collect()
            .await?;

        let shard_count = shards.len();
        let decoded: Vec<Vec<T>> = self.compute(|| {
            shards
                .par_iter()
                .map(|(key, bytes)| decode_shard::<T>(&storage.uri_for(key), bytes))
                .collect::<Result<Vec<_>>>()
        })?;

        let records: Vec<T> = decoded.into_iter().flatten().collect();
        info!(
            "Read {} records from {} shards matching {}",
            records.len(),
            shard_count,
            storage.uri_for(pattern.trim_start_matches('/'))
        );
        Ok(records)
    }
}
