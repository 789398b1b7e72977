//! Media storage in a local directory tree.

use std::io;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::backend::{StorageBackend, StoredObject};
use super::error::StorageError;
use super::key::StorageKey;

/// Top-level directory holding one file per object with its content type.
const CONTENT_TYPE_DIR: &str = ".content-types";

/// Stores objects as files under a root directory.
///
/// Writes go to a temporary file in the destination directory and are renamed
/// into place, so readers never see a partially written object and concurrent
/// writers to one key resolve to the last rename.
///
/// Content types live under `<root>/.content-types/<key>`, written after the
/// object itself. Keys starting with that directory are rejected. Two racing
/// puts with different content types may leave the type of the earlier one.
#[derive(Debug, Clone)]
pub struct LocalFilesystemStore {
    root: PathBuf,
    base_url: String,
}

impl LocalFilesystemStore {
    /// Store rooted at `root`, serving files under `base_url`.
    ///
    /// The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            root: root.into(),
            base_url,
        }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps `key` to a path inside the root.
    ///
    /// Only plain path components are accepted, so the result can never
    /// leave the root.
    pub fn resolve(&self, key: &StorageKey) -> Result<PathBuf, StorageError> {
        if key.segments().next() == Some(CONTENT_TYPE_DIR) {
            return Err(StorageError::invalid_key(
                key.as_str(),
                "reserved for content type records",
            ));
        }
        join_key(&self.root, key)
    }

    fn content_type_path(&self, key: &StorageKey) -> Result<PathBuf, StorageError> {
        join_key(&self.root.join(CONTENT_TYPE_DIR), key)
    }

    async fn write_atomically(
        key: &StorageKey,
        path: &Path,
        data: &[u8],
    ) -> Result<(), StorageError> {
        let parent = path
            .parent()
            .ok_or_else(|| StorageError::invalid_key(key.as_str(), "has no parent directory"))?;
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::from_io(key, &e))?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4().simple()));

        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(data).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&temp_path, path).await
        }
        .await;

        if let Err(err) = written {
            // The temp file may not exist yet.
            let _ = fs::remove_file(&temp_path).await;
            if err.kind() == io::ErrorKind::IsADirectory {
                return Err(StorageError::operation(format!(
                    "a directory already exists at '{key}'"
                )));
            }
            return Err(StorageError::from_io(key, &err));
        }
        Ok(())
    }

    async fn record_content_type(
        &self,
        key: &StorageKey,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let path = self.content_type_path(key)?;
        if content_type.is_empty() {
            return remove_if_present(key, &path).await;
        }
        Self::write_atomically(key, &path, content_type.as_bytes()).await
    }

    async fn content_type(&self, key: &StorageKey) -> Result<Option<String>, StorageError> {
        let path = self.content_type_path(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) if value.is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(err) if is_missing(&err) => Ok(None),
            Err(err) => Err(StorageError::from_io(key, &err)),
        }
    }
}

impl StorageBackend for LocalFilesystemStore {
    async fn put(&self, key: &StorageKey, data: Bytes, content_type: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        Self::write_atomically(key, &path, &data).await?;
        self.record_content_type(key, content_type).await
    }

    async fn get(&self, key: &StorageKey) -> Result<Bytes, StorageError> {
        let path = self.resolve(key)?;
        fs::read(&path)
            .await
            .map(Bytes::from)
            .map_err(|e| read_error(key, &e))
    }

    async fn delete(&self, key: &StorageKey) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| read_error(key, &e))?;
        remove_if_present(key, &self.content_type_path(key)?).await
    }

    async fn stat(&self, key: &StorageKey) -> Result<StoredObject, StorageError> {
        let path = self.resolve(key)?;
        let metadata = fs::metadata(&path)
            .await
            .map_err(|e| read_error(key, &e))?;
        if !metadata.is_file() {
            return Err(StorageError::not_found(key));
        }
        Ok(StoredObject {
            key: key.clone(),
            size: metadata.len(),
            content_type: self.content_type(key).await?,
        })
    }

    fn public_url(&self, key: &StorageKey) -> String {
        format!("{}{}", self.base_url, key)
    }
}

fn join_key(base: &Path, key: &StorageKey) -> Result<PathBuf, StorageError> {
    let mut path = base.to_path_buf();
    let mut depth = 0usize;
    for component in Path::new(key.as_str()).components() {
        match component {
            Component::Normal(part) => {
                path.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StorageError::invalid_key(
                    key.as_str(),
                    "resolves outside the storage root",
                ));
            }
        }
    }
    if depth == 0 {
        return Err(StorageError::invalid_key(key.as_str(), "resolves to the storage root"));
    }
    Ok(path)
}

/// No object lives at the path: absent, or a directory sits on it or on a parent.
fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::IsADirectory | io::ErrorKind::NotADirectory
    )
}

fn read_error(key: &StorageKey, err: &io::Error) -> StorageError {
    if is_missing(err) {
        StorageError::not_found(key)
    } else {
        StorageError::from_io(key, err)
    }
}

async fn remove_if_present(key: &StorageKey, path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path).await {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(StorageError::from_io(key, &err)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> LocalFilesystemStore {
        LocalFilesystemStore::new(dir.path().join("media"), "/media/")
    }

    fn key(k: &str) -> StorageKey {
        StorageKey::new(k).expect("valid key")
    }

    #[test]
    fn test_resolve_stays_under_root() {
        let store = LocalFilesystemStore::new("/srv/media", "/media/");
        let path = store.resolve(&key("students/42/avatar.png")).expect("resolves");
        assert_eq!(path, PathBuf::from("/srv/media/students/42/avatar.png"));
        assert!(path.starts_with(store.root()));
    }

    #[test]
    fn test_public_url_is_prefix_plus_key() {
        let store = LocalFilesystemStore::new("/srv/media", "/media");
        let k = key("curricula/7/plan.pdf");
        assert_eq!(store.public_url(&k), "/media/curricula/7/plan.pdf");
        assert_eq!(store.public_url(&k), store.public_url(&k));
    }

    #[tokio::test]
    async fn test_put_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(&dir);
        let k = key("a/b/c/file.txt");

        store
            .put(&k, Bytes::from_static(b"hello"), "text/plain")
            .await
            .expect("put");

        let on_disk = std::fs::read(dir.path().join("media/a/b/c/file.txt")).expect("file exists");
        assert_eq!(on_disk, b"hello");
    }

    #[tokio::test]
    async fn test_put_overwrites_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(&dir);
        let k = key("notes.txt");

        store.put(&k, Bytes::from_static(b"first"), "text/plain").await.expect("put");
        store.put(&k, Bytes::from_static(b"second"), "text/plain").await.expect("put");

        assert_eq!(store.get(&k).await.expect("get"), Bytes::from_static(b"second"));
        let names = |path: PathBuf| {
            let mut names: Vec<String> = std::fs::read_dir(path)
                .expect("read dir")
                .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();
            names
        };
        let root = dir.path().join("media");
        assert_eq!(names(root.clone()), vec![CONTENT_TYPE_DIR, "notes.txt"]);
        assert_eq!(names(root.join(CONTENT_TYPE_DIR)), vec!["notes.txt"]);
    }

    #[tokio::test]
    async fn test_put_over_directory_fails_without_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(&dir);
        store
            .put(&key("folder/inner.txt"), Bytes::from_static(b"x"), "text/plain")
            .await
            .expect("put");

        let err = store
            .put(&key("folder"), Bytes::from_static(b"y"), "text/plain")
            .await
            .expect_err("a directory is in the way");

        assert!(matches!(err, StorageError::Operation(_)), "{err:?}");
        assert!(store.get(&key("folder")).await.expect_err("dir").is_not_found());
        assert_eq!(
            store.get(&key("folder/inner.txt")).await.expect("untouched"),
            Bytes::from_static(b"x")
        );
    }

    #[tokio::test]
    async fn test_put_under_a_file_fails_without_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(&dir);
        store.put(&key("plain"), Bytes::from_static(b"x"), "text/plain").await.expect("put");

        let err = store
            .put(&key("plain/child.txt"), Bytes::from_static(b"y"), "text/plain")
            .await
            .expect_err("parent is a file");

        assert!(!err.is_not_found(), "{err:?}");
        assert!(store.get(&key("plain/child.txt")).await.expect_err("missing").is_not_found());
    }

    #[tokio::test]
    async fn test_stat_reports_recorded_content_type() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(&dir);
        let k = key("avatars/7.png");

        store.put(&k, Bytes::from_static(b"\x89PNG"), "image/png").await.expect("put");
        assert_eq!(
            store.stat(&k).await.expect("stat").content_type.as_deref(),
            Some("image/png")
        );

        store.put(&k, Bytes::from_static(b"\x89PNG"), "").await.expect("put");
        assert_eq!(store.stat(&k).await.expect("stat").content_type, None);
    }

    #[tokio::test]
    async fn test_delete_removes_content_type() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(&dir);
        let k = key("docs/plan.pdf");

        store.put(&k, Bytes::from_static(b"%PDF"), "application/pdf").await.expect("put");
        store.delete(&k).await.expect("delete");
        store.put(&k, Bytes::from_static(b"%PDF"), "").await.expect("put again");

        assert_eq!(store.stat(&k).await.expect("stat").content_type, None);
        assert!(!dir.path().join("media").join(CONTENT_TYPE_DIR).join("docs/plan.pdf").exists());
    }

    #[test]
    fn test_content_type_directory_is_reserved() {
        let store = LocalFilesystemStore::new("/srv/media", "/media/");
        let err = store
            .resolve(&key(".content-types/notes.txt"))
            .expect_err("reserved");
        assert!(matches!(err, StorageError::InvalidKey { .. }));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = store(&dir).get(&key("missing.bin")).await.expect_err("missing");
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_twice_is_not_found() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(&dir);
        let k = key("once.txt");

        store.put(&k, Bytes::from_static(b"x"), "text/plain").await.expect("put");
        store.delete(&k).await.expect("first delete");

        let err = store.delete(&k).await.expect_err("second delete");
        assert!(err.is_not_found());
        assert!(store.get(&k).await.expect_err("gone").is_not_found());
    }

    #[tokio::test]
    async fn test_stat_reports_size() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(&dir);
        let k = key("sized.bin");

        store.put(&k, Bytes::from(vec![7u8; 1024]), "application/octet-stream").await.expect("put");

        let object = store.stat(&k).await.expect("stat");
        assert_eq!(object.size, 1024);
        assert_eq!(object.key, k);
        assert!(store.exists(&k).await.expect("exists"));
        assert!(!store.exists(&key("other.bin")).await.expect("exists"));
    }

    #[tokio::test]
    async fn test_directory_is_not_an_object() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store(&dir);
        store
            .put(&key("folder/inner.txt"), Bytes::from_static(b"x"), "text/plain")
            .await
            .expect("put");

        assert!(store.stat(&key("folder")).await.expect_err("dir").is_not_found());
    }
}
