//! Asynchronous actor-script reader
//!
//! Reads `operation,account,amount,target` rows from a CSV source and turns
//! them into [`ActorRequest`]s. Invalid rows are logged and skipped.
//!
//! # Architecture
//!
//! ```text
//! CSV file → ScriptReader → batches of ActorRequests → ActorDriver
//!                 ↓
//!          csv_format module
//!          (ScriptRecord, convert_script_record)
//! ```

use crate::io::csv_format::{convert_script_record, ScriptRecord};
use crate::types::ActorRequest;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use std::path::Path;
use tokio_util::compat::TokioAsyncReadCompatExt;
use tracing::warn;

/// Asynchronous CSV reader for actor scripts
pub struct ScriptReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> ScriptReader<R> {
    /// Create a reader over any async byte source
    ///
    /// Fields are trimmed and rows may omit trailing columns.
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read up to `batch_size` valid requests
    ///
    /// Returns an empty vector at end of input.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<ActorRequest> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<ScriptRecord>();

        while batch.len() < batch_size {
            match records.next().await {
                Some(Ok(record)) => match convert_script_record(record) {
                    Ok(request) => batch.push(request),
                    Err(e) => warn!("Script record skipped: {}", e),
                },
                Some(Err(e)) => warn!("CSV parse error: {}", e),
                None => break,
            }
        }

        batch
    }

    /// Read every remaining valid request
    pub async fn read_all(&mut self) -> Vec<ActorRequest> {
        let mut requests = Vec::new();
        loop {
            let batch = self.read_batch(256).await;
            if batch.is_empty() {
                return requests;
            }
            requests.extend(batch);
        }
    }
}

/// Open a script file and read all of its requests
///
/// # Errors
///
/// Returns an error message if the file cannot be opened.
pub async fn read_script(path: &Path) -> Result<Vec<ActorRequest>, String> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

    let mut reader = ScriptReader::new(file.compat());
    Ok(reader.read_all().await)
}
