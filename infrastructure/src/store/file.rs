//! JSON-file state store.
//!
//! Layout under the root directory:
//!
//! ```text
//! .lock
//! orders/<conversation>/<user>.json
//! dialogs/<conversation>.json
//! ```
//!
//! Every id is hex-encoded into its path segment, so distinct ids never share
//! a file. Writes go to a uniquely named temporary file that is then renamed
//! over the target, so a reader never sees a partial record.
//!
//! The store takes an exclusive advisory lock on `.lock` when opened and holds
//! it until dropped. A second process opening the same directory gets
//! [`StoreError::Unavailable`] instead of interleaving its turns with ours.

use async_trait::async_trait;
use orderbot_application::ports::state_store::{StateStore, StoreError};
use orderbot_domain::{ConversationRef, DialogStack, SlotState};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::{File, OpenOptions, TryLockError};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

const LOCK_FILE: &str = ".lock";

#[derive(Debug)]
pub struct FileStateStore {
    root: PathBuf,
    // Holds the advisory lock; released by the OS when dropped or on exit.
    _lock: File,
}

impl FileStateStore {
    /// Open (creating if needed) the store at `root` and lock it for this process.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| io_error(&root, e))?;

        let lock_path = root.join(LOCK_FILE);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| io_error(&lock_path, e))?;
        match lock.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                return Err(StoreError::Unavailable(format!(
                    "{} is in use by another orderbot process",
                    root.display()
                )));
            }
            Err(TryLockError::Error(e)) => return Err(io_error(&lock_path, e)),
        }

        Ok(Self { root, _lock: lock })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn order_path(&self, conversation: &ConversationRef) -> PathBuf {
        self.root
            .join("orders")
            .join(file_key(&conversation.conversation_id))
            .join(format!("{}.json", file_key(&conversation.user_id)))
    }

    fn dialog_path(&self, conversation_id: &str) -> PathBuf {
        self.root
            .join("dialogs")
            .join(format!("{}.json", file_key(conversation_id)))
    }
}

/// Hex-encode an id into a path segment. `_` is never produced by the
/// encoding, so it stands in for the empty id.
fn file_key(raw: &str) -> String {
    if raw.is_empty() {
        "_".to_string()
    } else {
        hex::encode(raw)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        key: path.display().to_string(),
        source,
    }
}

async fn read_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(path, e)),
    }
}

async fn write_record<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || replace_file(&path, &bytes))
        .await
        .map_err(|e| StoreError::Unavailable(format!("Store writer task failed: {e}")))?
}

/// Write `bytes` to a fresh temporary file next to `path`, then rename it over `path`.
fn replace_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let parent = path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| io_error(parent, e))?;
    tmp.write_all(bytes).map_err(|e| io_error(parent, e))?;
    tmp.persist(path).map_err(|e| io_error(path, e.error))?;
    Ok(())
}

async fn remove_record(path: &Path) -> Result<(), StoreError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error(path, e)),
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load_order(
        &self,
        conversation: &ConversationRef,
    ) -> Result<Option<SlotState>, StoreError> {
        read_record(&self.order_path(conversation)).await
    }

    async fn save_order(
        &self,
        conversation: &ConversationRef,
        order: Option<&SlotState>,
    ) -> Result<(), StoreError> {
        let path = self.order_path(conversation);
        debug!("Saving order for {} to {}", conversation, path.display());
        match order {
            Some(order) => write_record(&path, order).await,
            None => remove_record(&path).await,
        }
    }

    async fn load_dialog(&self, conversation_id: &str) -> Result<DialogStack, StoreError> {
        Ok(read_record(&self.dialog_path(conversation_id))
            .await?
            .unwrap_or_default())
    }

    async fn save_dialog(
        &self,
        conversation_id: &str,
        stack: &DialogStack,
    ) -> Result<(), StoreError> {
        let path = self.dialog_path(conversation_id);
        if stack.is_empty() {
            remove_record(&path).await
        } else {
            write_record(&path, stack).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderbot_domain::{DialogFrame, SequenceId};
    use std::sync::Arc;

    fn hawaii() -> SlotState {
        SlotState::with_values(Some("Hawaii".to_string()), Some(2))
    }

    #[test]
    fn test_file_key_is_reversible() {
        assert_eq!(file_key("c1"), "6331");
        assert_eq!(file_key("../etc"), "2e2e2f657463");
        assert_eq!(file_key(""), "_");
        assert_ne!(file_key("team/1"), file_key("team_1"));
    }

    #[tokio::test]
    async fn test_order_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::open(dir.path()).unwrap();
        let conversation = ConversationRef::new("conv/1", "user 1");
        let order = hawaii();

        assert!(store.load_order(&conversation).await.unwrap().is_none());
        store.save_order(&conversation, Some(&order)).await.unwrap();
        assert_eq!(store.load_order(&conversation).await.unwrap(), Some(order));
        assert!(
            dir.path()
                .join("orders")
                .join(file_key("conv/1"))
                .join(format!("{}.json", file_key("user 1")))
                .exists()
        );

        store.save_order(&conversation, None).await.unwrap();
        assert!(store.load_order(&conversation).await.unwrap().is_none());
        // Clearing twice is fine
        store.save_order(&conversation, None).await.unwrap();
    }

    #[tokio::test]
    async fn test_lookalike_ids_do_not_share_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::open(dir.path()).unwrap();

        for (saved, other) in [
            (
                ConversationRef::new("team/1", "alice"),
                ConversationRef::new("team_1", "alice"),
            ),
            (
                ConversationRef::new("x__y", "z"),
                ConversationRef::new("x", "y__z"),
            ),
            (
                ConversationRef::new("19:abc@thread;messageid=1", "bob"),
                ConversationRef::new("19_abc_thread_messageid_1", "bob"),
            ),
        ] {
            store.save_order(&saved, Some(&hawaii())).await.unwrap();
            assert_eq!(store.load_order(&saved).await.unwrap(), Some(hawaii()));
            assert!(store.load_order(&other).await.unwrap().is_none());
        }

        let mut stack = DialogStack::new();
        stack.push(DialogFrame::new(SequenceId::new("order"), None));
        store.save_dialog("team/1", &stack).await.unwrap();
        assert!(store.load_dialog("team_1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dialog_survives_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let mut stack = DialogStack::new();
        stack.push(DialogFrame::new(SequenceId::new("order"), None));

        {
            let store = FileStateStore::open(dir.path()).unwrap();
            store.save_dialog("c1", &stack).await.unwrap();
        }
        let loaded = FileStateStore::open(dir.path())
            .unwrap()
            .load_dialog("c1")
            .await
            .unwrap();
        assert_eq!(loaded, stack);

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("dialogs"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(
            leftovers,
            vec![std::ffi::OsString::from(format!("{}.json", file_key("c1")))]
        );
    }

    #[test]
    fn test_second_open_of_locked_directory_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileStateStore::open(dir.path()).unwrap();

        let err = FileStateStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        drop(first);
        assert!(FileStateStore::open(dir.path()).is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_to_one_key_use_separate_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStateStore::open(dir.path()).unwrap());
        let conversation = ConversationRef::new("c1", "u1");

        let writers: Vec<_> = (1..=4)
            .cycle()
            .take(16)
            .map(|quantity| {
                let store = store.clone();
                let conversation = conversation.clone();
                tokio::spawn(async move {
                    let order = SlotState::with_values(Some("Funghi".to_string()), Some(quantity));
                    store.save_order(&conversation, Some(&order)).await
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let order = store.load_order(&conversation).await.unwrap().unwrap();
        assert_eq!(order.item_name(), Some("Funghi"));
        let files = std::fs::read_dir(dir.path().join("orders").join(file_key("c1")))
            .unwrap()
            .count();
        assert_eq!(files, 1);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStateStore::open(dir.path()).unwrap();
        std::fs::create_dir_all(dir.path().join("dialogs")).unwrap();
        std::fs::write(
            dir.path()
                .join("dialogs")
                .join(format!("{}.json", file_key("c1"))),
            "{not json",
        )
        .unwrap();

        let err = store.load_dialog("c1").await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
