use crate::secret::credentials_match;
use async_trait::async_trait;
use burrow_core::error::{Result, StorageError};
use burrow_core::{Credential, LinkRecord, LinkStore, ReadLinkStore, Token};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, trace, warn};

const TARGETS_DIR: &str = "targets";
const CREDENTIALS_DIR: &str = "credentials";
const CLAIMS_DIR: &str = "claims";
const STAGING_DIR: &str = "staging";
const LOCK_FILE: &str = ".lock";

/// File-backed link store.
///
/// Layout under the root directory:
///
/// ```text
/// targets/<token>          target URL bytes
/// credentials/<token>      credential bytes
/// claims/<credential>      token bytes, reserves the credential
/// staging/                 files written here first, then hard-linked into place
/// .lock                    held exclusively by every writer and by recovery
/// ```
///
/// Every published file is fully written in `staging/` and then hard-linked
/// to its final name. `link(2)` refuses to replace an existing name, which
/// makes each publication a create-exclusive step with complete contents.
/// A record is published claim, credential, target and withdrawn in the
/// reverse order, so a reader that finds `targets/<token>` always finds a
/// complete record.
///
/// Mutations and the recovery sweep on [`open`](Self::open) hold an exclusive
/// lock on `.lock`, so handles in this or other processes never observe each
/// other's half-published records as crash debris. Reads take no lock.
///
/// Filesystem work runs on the blocking pool and is not interrupted when the
/// calling future is dropped, so abandoned requests do not leave half-written
/// records behind.
#[derive(Debug, Clone)]
pub struct FileLinkStore {
    layout: Arc<Layout>,
}

#[derive(Debug)]
struct Layout {
    root: PathBuf,
    // Serializes mutations made through this handle; `lock_file` extends
    // that to every other handle on the same root.
    write_lock: Mutex<()>,
    lock_file: File,
    staged: AtomicU64,
}

/// Exclusive hold on a root for the duration of one mutation.
struct WriteGuard<'a> {
    _local: MutexGuard<'a, ()>,
    file: &'a File,
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        // Closing the descriptor would release it too; the handle outlives us.
        let _ = self.file.unlock();
    }
}

impl FileLinkStore {
    /// Opens the store rooted at `root`, creating the directory layout if
    /// needed and sweeping leftovers of interrupted writes.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let layout = tokio::task::spawn_blocking(move || -> Result<Layout> {
            for dir in [TARGETS_DIR, CREDENTIALS_DIR, CLAIMS_DIR, STAGING_DIR] {
                fs::create_dir_all(root.join(dir))?;
            }
            let lock_file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(false)
                .open(root.join(LOCK_FILE))?;

            Ok(Layout {
                root,
                write_lock: Mutex::new(()),
                lock_file,
                staged: AtomicU64::new(0),
            })
        })
        .await
        .map_err(|e| StorageError::Io(format!("file store worker failed: {e}")))??;

        let store = Self {
            layout: Arc::new(layout),
        };
        store.blocking(Layout::recover).await?;

        debug!(root = %store.root().display(), "opened file link store");
        Ok(store)
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.layout.root
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Layout) -> Result<T> + Send + 'static,
    {
        let layout = Arc::clone(&self.layout);
        tokio::task::spawn_blocking(move || f(&layout))
            .await
            .map_err(|e| StorageError::Io(format!("file store worker failed: {e}")))?
    }
}

impl Layout {
    fn target_path(&self, token: &str) -> PathBuf {
        self.root.join(TARGETS_DIR).join(token)
    }

    fn credential_path(&self, token: &str) -> PathBuf {
        self.root.join(CREDENTIALS_DIR).join(token)
    }

    fn claim_path(&self, credential: &str) -> PathBuf {
        self.root.join(CLAIMS_DIR).join(credential)
    }

    fn lock(&self) -> Result<WriteGuard<'_>> {
        let local = self
            .write_lock
            .lock()
            .map_err(|_| StorageError::Unavailable("file store lock is poisoned".to_string()))?;
        self.lock_file.lock().map_err(|e| {
            StorageError::Unavailable(format!("cannot lock {LOCK_FILE}: {e}"))
        })?;
        Ok(WriteGuard {
            _local: local,
            file: &self.lock_file,
        })
    }

    /// A staging path no other handle, in this process or another, will pick.
    fn staging_name(&self) -> PathBuf {
        self.root.join(STAGING_DIR).join(format!(
            "{}.{}.{:016x}",
            std::process::id(),
            self.staged.fetch_add(1, Ordering::Relaxed),
            rand::random::<u64>()
        ))
    }

    /// Writes `contents` to a fresh staging file and hard-links it to `dest`.
    ///
    /// Returns `Ok(false)` if `dest` already exists.
    fn publish(&self, dest: &Path, contents: &[u8]) -> Result<bool> {
        let staged = self.staging_name();

        // Only a file this call created is ever removed from staging.
        let mut file = File::create_new(&staged)?;
        if let Err(err) = file.write_all(contents).and_then(|()| file.sync_all()) {
            drop(file);
            remove_if_present(&staged)?;
            return Err(err.into());
        }
        drop(file);

        let linked = fs::hard_link(&staged, dest);
        fs::remove_file(&staged)?;

        match linked {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&self, record: &LinkRecord) -> Result<()> {
        let _guard = self.lock()?;
        let token = record.token.as_str();
        let conflict = || StorageError::Conflict(record.token.to_string());

        let claim = self.claim_path(record.credential.as_str());
        if !self.publish(&claim, token.as_bytes())? {
            return Err(conflict());
        }

        let credential = self.credential_path(token);
        match self.publish(&credential, record.credential.as_bytes()) {
            Ok(true) => {}
            Ok(false) => {
                remove_if_present(&claim)?;
                return Err(conflict());
            }
            Err(err) => {
                remove_if_present(&claim)?;
                return Err(err);
            }
        }

        let target = self.target_path(token);
        match self.publish(&target, record.target.as_bytes()) {
            Ok(true) => Ok(()),
            Ok(false) => {
                remove_if_present(&credential)?;
                remove_if_present(&claim)?;
                Err(conflict())
            }
            Err(err) => {
                remove_if_present(&credential)?;
                remove_if_present(&claim)?;
                Err(err)
            }
        }
    }

    fn get(&self, token: &Token) -> Result<Option<LinkRecord>> {
        let Some(target) = read_if_present(&self.target_path(token.as_str()))? else {
            return Ok(None);
        };
        // The credential disappears right after the target during a delete.
        let Some(credential) = read_if_present(&self.credential_path(token.as_str()))? else {
            return Ok(None);
        };

        Ok(Some(LinkRecord {
            target,
            token: token.clone(),
            credential: Credential::new(credential),
        }))
    }

    fn delete(&self, token: &Token, presented: &Credential) -> Result<()> {
        let _guard = self.lock()?;
        let target = self.target_path(token.as_str());
        let credential = self.credential_path(token.as_str());

        if !target.exists() {
            return Err(StorageError::NotFound(token.to_string()));
        }
        let Some(stored) = read_if_present(&credential)? else {
            return Err(StorageError::NotFound(token.to_string()));
        };
        if !credentials_match(stored.as_bytes(), presented.as_bytes()) {
            return Err(StorageError::Unauthorized(token.to_string()));
        }

        match fs::remove_file(&target) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(token.to_string()));
            }
            Err(err) => return Err(err.into()),
        }
        remove_if_present(&credential)?;
        remove_if_present(&self.claim_path(&stored))?;
        Ok(())
    }

    /// Removes staging leftovers and credential/claim files whose record was
    /// never published, both artifacts of a crash mid-write.
    fn recover(&self) -> Result<()> {
        let _guard = self.lock()?;

        for entry in fs::read_dir(self.root.join(STAGING_DIR))? {
            remove_if_present(&entry?.path())?;
        }

        for entry in fs::read_dir(self.root.join(CREDENTIALS_DIR))? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(token) = name.to_str() else {
                continue;
            };
            if self.target_path(token).exists() {
                continue;
            }
            if let Some(credential) = read_if_present(&entry.path())? {
                remove_if_present(&self.claim_path(&credential))?;
            }
            remove_if_present(&entry.path())?;
            warn!(token = %token, "removed unpublished credential left by an interrupted write");
        }

        for entry in fs::read_dir(self.root.join(CLAIMS_DIR))? {
            let entry = entry?;
            let Some(token) = read_if_present(&entry.path())? else {
                continue;
            };
            if !self.credential_path(&token).exists() {
                remove_if_present(&entry.path())?;
                warn!(token = %token, "removed orphaned credential claim");
            }
        }

        Ok(())
    }
}

/// Tokens and credentials become file names; anything that is not a plain
/// token-shaped name is never looked up on disk.
fn is_safe_name(name: &str) -> bool {
    Token::new(name).is_ok()
}

fn read_if_present(path: &Path) -> Result<Option<String>> {
    match fs::read(path) {
        Ok(bytes) => String::from_utf8(bytes).map(Some).map_err(|_| {
            StorageError::InvalidData(format!("{} is not valid utf-8", path.display()))
        }),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl ReadLinkStore for FileLinkStore {
    async fn get(&self, token: &Token) -> Result<Option<LinkRecord>> {
        if !is_safe_name(token.as_str()) {
            return Ok(None);
        }
        let token = token.clone();
        self.blocking(move |layout| layout.get(&token)).await
    }
}

#[async_trait]
impl LinkStore for FileLinkStore {
    async fn put(&self, record: &LinkRecord) -> Result<()> {
        if !is_safe_name(record.token.as_str()) || !is_safe_name(record.credential.as_str()) {
            return Err(StorageError::InvalidData(format!(
                "token or credential of '{}' is not usable as a file name",
                record.token
            )));
        }
        let owned = record.clone();
        self.blocking(move |layout| layout.put(&owned)).await?;
        trace!(token = %record.token, "published link files");
        Ok(())
    }

    async fn delete(&self, token: &Token, credential: &Credential) -> Result<()> {
        if !is_safe_name(token.as_str()) {
            return Err(StorageError::NotFound(token.to_string()));
        }
        let (owned_token, credential) = (token.clone(), credential.clone());
        self.blocking(move |layout| layout.delete(&owned_token, &credential))
            .await?;
        trace!(token = %token, "withdrew link files");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(token: &str, target: &str, credential: &str) -> LinkRecord {
        LinkRecord {
            target: target.to_string(),
            token: Token::new_unchecked(token),
            credential: Credential::new(credential),
        }
    }

    #[tokio::test]
    async fn layout_matches_documented_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLinkStore::open(dir.path()).await.unwrap();
        store
            .put(&record("abc", "https://example.com", "cred-1"))
            .await
            .unwrap();

        let root = dir.path();
        assert_eq!(
            fs::read_to_string(root.join("targets/abc")).unwrap(),
            "https://example.com"
        );
        assert_eq!(
            fs::read_to_string(root.join("credentials/abc")).unwrap(),
            "cred-1"
        );
        assert_eq!(fs::read_to_string(root.join("claims/cred-1")).unwrap(), "abc");
        assert_eq!(fs::read_dir(root.join("staging")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn failed_put_rolls_back_claim() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLinkStore::open(dir.path()).await.unwrap();
        store
            .put(&record("abc", "https://example.com", "cred-1"))
            .await
            .unwrap();

        let err = store
            .put(&record("abc", "https://other.com", "cred-2"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
        assert!(!dir.path().join("claims/cred-2").exists());
    }

    #[tokio::test]
    async fn path_like_tokens_never_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLinkStore::open(dir.path().join("store")).await.unwrap();
        fs::write(dir.path().join("secret"), "outside").unwrap();

        let escaping = Token::new_unchecked("../../secret");
        assert!(store.get(&escaping).await.unwrap().is_none());

        let err = store
            .put(&record("../escape", "https://example.com", "cred-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidData(_)));
    }

    #[tokio::test]
    async fn delete_removes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileLinkStore::open(dir.path()).await.unwrap();
        let rec = record("abc", "https://example.com", "cred-1");
        store.put(&rec).await.unwrap();

        store.delete(&rec.token, &rec.credential).await.unwrap();

        let root = dir.path();
        assert!(!root.join("targets/abc").exists());
        assert!(!root.join("credentials/abc").exists());
        assert!(!root.join("claims/cred-1").exists());
    }

    #[tokio::test]
    async fn open_sweeps_unpublished_records() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for sub in ["targets", "credentials", "claims", "staging"] {
            fs::create_dir_all(root.join(sub)).unwrap();
        }
        fs::write(root.join("credentials/half"), "cred-half").unwrap();
        fs::write(root.join("claims/cred-half"), "half").unwrap();
        fs::write(root.join("claims/cred-lost"), "lost").unwrap();
        fs::write(root.join("staging/123.0"), "junk").unwrap();

        let store = FileLinkStore::open(root).await.unwrap();

        assert!(!root.join("credentials/half").exists());
        assert!(!root.join("claims/cred-half").exists());
        assert!(!root.join("claims/cred-lost").exists());
        assert_eq!(fs::read_dir(root.join("staging")).unwrap().count(), 0);

        // The token is free again.
        store
            .put(&record("half", "https://example.com", "cred-new"))
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn recovery_waits_for_a_writer_on_another_handle() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        FileLinkStore::open(&root).await.unwrap();

        // Stand in for a writer in another process that has published the
        // claim and the credential but not yet the target.
        let writer = File::options()
            .read(true)
            .write(true)
            .open(root.join(LOCK_FILE))
            .unwrap();
        writer.lock().unwrap();
        fs::write(root.join("claims/cred-live"), "live").unwrap();
        fs::write(root.join("credentials/live"), "cred-live").unwrap();

        let opening = tokio::spawn({
            let root = root.clone();
            async move { FileLinkStore::open(root).await }
        });
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert!(!opening.is_finished());

        fs::write(root.join("targets/live"), "https://example.com").unwrap();
        writer.unlock().unwrap();

        let store = opening.await.unwrap().unwrap();
        let rec = store
            .get(&Token::new_unchecked("live"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(rec.credential, Credential::new("cred-live"));
        store.delete(&rec.token, &rec.credential).await.unwrap();
    }

    #[tokio::test]
    async fn staging_names_do_not_repeat_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileLinkStore::open(dir.path()).await.unwrap();
        let second = FileLinkStore::open(dir.path()).await.unwrap();

        let a = first.layout.staging_name();
        let b = second.layout.staging_name();
        assert_ne!(a, b);
    }
}
