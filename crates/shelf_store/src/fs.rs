use super::*;
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use xxhash_rust::xxh3::xxh3_64;

/// Catalog kept as one JSON array on disk, with an xxh3 sidecar
/// (`<file>.xxh3`) checked on every read.
#[derive(Debug, Clone)]
pub struct FsCatalogStore {
    pub path: PathBuf,
}

impl FsCatalogStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().into(),
        }
    }

    fn sidecar(&self) -> PathBuf {
        with_suffix(&self.path, "xxh3")
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".");
    s.push(suffix);
    PathBuf::from(s)
}

#[async_trait]
impl CatalogStore for FsCatalogStore {
    async fn fetch_entries(&self) -> Result<Vec<CatalogEntry>> {
        let data = fs::read(&self.path)
            .await
            .with_context(|| format!("read catalog {}", self.path.display()))?;

        match fs::read_to_string(self.sidecar()).await {
            Ok(sum) => {
                let want = sum.trim();
                let got = format!("{:016x}", xxh3_64(&data));
                if want != got {
                    bail!(
                        "catalog checksum mismatch for {}: sidecar {want}, data {got}",
                        self.path.display()
                    );
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    path = %self.path.display(),
                    "no checksum sidecar; skipping verify"
                );
            }
            Err(e) => return Err(e).context("read checksum sidecar"),
        }

        let entries: Vec<CatalogEntry> =
            serde_json::from_slice(&data).context("parse catalog json")?;
        Ok(entries)
    }

    /// tmp -> fsync -> rename, then the sidecar.
    async fn replace_all(&self, entries: &[CatalogEntry]) -> Result<usize> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let data = serde_json::to_vec_pretty(entries)?;
        let path_tmp = with_suffix(&self.path, "tmp");

        let mut f = fs::File::create(&path_tmp).await?;
        f.write_all(&data).await?;
        f.flush().await?;
        f.sync_data().await?;
        // close before rename (Windows)
        drop(f);

        // a stale sidecar must never vouch for the new data
        match fs::remove_file(self.sidecar()).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).context("remove old checksum sidecar"),
        }
        fs::rename(&path_tmp, &self.path)
            .await
            .with_context(|| format!("rename into {}", self.path.display()))?;
        fs::write(self.sidecar(), format!("{:016x}\n", xxh3_64(&data))).await?;

        tracing::info!(path = %self.path.display(), books = entries.len(), "catalog replaced");
        Ok(entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries() -> Vec<CatalogEntry> {
        serde_json::from_value(json!([
            {"id": 1, "title": "A", "author": "x", "genre": "Fantasy",
             "synopsis": "s", "rating": 4.0},
            {"id": 2, "title": "B", "author": "y", "genre": null, "synopsis": null, "isbn": "123"}
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn replace_then_fetch() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsCatalogStore::new(tmp.path().join("nested/catalog.json"));

        assert_eq!(store.replace_all(&entries()).await.unwrap(), 2);
        assert!(store.sidecar().exists());
        assert!(!with_suffix(&store.path, "tmp").exists());

        let got = store.fetch_entries().await.unwrap();
        assert_eq!(got, entries());
        let books = store.fetch_all().await.unwrap();
        assert_eq!(books[1].genre, None);
    }

    #[tokio::test]
    async fn corrupted_data_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsCatalogStore::new(tmp.path().join("catalog.json"));
        store.replace_all(&entries()).await.unwrap();

        std::fs::write(&store.path, b"[]").unwrap();
        let err = store.fetch_entries().await.unwrap_err();
        assert!(err.to_string().contains("checksum mismatch"), "{err}");
    }

    #[tokio::test]
    async fn missing_sidecar_is_tolerated() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("catalog.json");
        std::fs::write(&path, br#"[{"id": 9, "title": "Hand written"}]"#).unwrap();

        let books = FsCatalogStore::new(&path).fetch_all().await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, 9);
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FsCatalogStore::new(tmp.path().join("absent.json"));
        assert!(store.fetch_all().await.is_err());
    }
}
