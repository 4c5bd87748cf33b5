use crate::{Store, StoreResult, io_error, validate_key};
use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

const STORE_DIR: &str = ".psi";
const KV_DIR: &str = "kv";

/// Filesystem-backed store rooted at `<root>/.psi/kv`, one `<key>.json` file per key.
#[derive(Clone)]
pub struct FsStore {
    kv_dir: PathBuf,
}

impl fmt::Debug for FsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsStore")
            .field("kv_dir", &self.kv_dir)
            .finish()
    }
}

impl FsStore {
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let kv_dir = root.as_ref().join(STORE_DIR).join(KV_DIR);
        fs::create_dir_all(&kv_dir).map_err(|e| io_error(&kv_dir, e))?;
        Ok(Self { kv_dir })
    }

    /// Opens an existing store without creating directories.
    pub fn open_existing(root: impl AsRef<Path>) -> StoreResult<Self> {
        let kv_dir = root.as_ref().join(STORE_DIR).join(KV_DIR);
        if !kv_dir.is_dir() {
            return Err(io_error(
                &kv_dir,
                std::io::Error::new(ErrorKind::NotFound, "store directory not found"),
            ));
        }
        Ok(Self { kv_dir })
    }

    pub fn kv_dir(&self) -> &Path {
        &self.kv_dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.kv_dir.join(format!("{key}.json"))
    }

    /// Writes through a sibling temp file so a crash never leaves a half-written value.
    fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp)
                .map_err(|e| io_error(&tmp, e))?;
            file.write_all(bytes).map_err(|e| io_error(&tmp, e))?;
            file.sync_all().map_err(|e| io_error(&tmp, e))?;
        }
        fs::rename(&tmp, path).map_err(|e| io_error(path, e))?;
        if let Some(parent) = path.parent() {
            // Directory fsync is best-effort; not every platform supports it.
            if let Ok(dir) = File::open(parent) {
                let _ = dir.sync_all();
            }
        }
        Ok(())
    }
}

impl Store for FsStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        validate_key(key)?;
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(path, err)),
        }
    }

    fn put(&self, key: &str, value: &str) -> StoreResult<()> {
        validate_key(key)?;
        let path = self.key_path(key);
        Self::write_atomic(&path, value.as_bytes())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(path, err)),
        }
    }
}
