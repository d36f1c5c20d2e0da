use super::{validate_id, Collection, DocumentStore, StoreError};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One JSON file per document: `<root>/<collection>/<id>.json`
///
/// Writes go to a temporary file that is renamed over the target, so a
/// reader never sees a half-written document.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub async fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        for collection in [Collection::Users, Collection::Interviews, Collection::Feedback] {
            tokio::fs::create_dir_all(root.join(collection.as_str())).await?;
        }
        Ok(Self { root })
    }

    fn doc_path(&self, collection: Collection, id: &str) -> PathBuf {
        self.root
            .join(collection.as_str())
            .join(format!("{}.json", id))
    }
}

#[async_trait::async_trait]
impl DocumentStore for FileStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        if validate_id(id).is_err() {
            return Ok(None);
        }

        match tokio::fs::read(self.doc_path(collection, id)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, collection: Collection, id: &str, doc: Value) -> Result<(), StoreError> {
        validate_id(id)?;

        let path = self.doc_path(collection, id);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(&doc)?;

        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!("Wrote {}", path.display());
        Ok(())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Value>, StoreError> {
        let mut docs = Vec::new();
        let mut entries = tokio::fs::read_dir(self.root.join(collection.as_str())).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let bytes = tokio::fs::read(&path).await?;
            match serde_json::from_slice(&bytes) {
                Ok(doc) => docs.push(doc),
                Err(e) => warn!("Skipping unreadable document {}: {}", path.display(), e),
            }
        }

        Ok(docs)
    }
}
