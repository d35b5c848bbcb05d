use anyhow::Context;
use async_trait::async_trait;
use shortlinks_manager::LengthListener;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Persists the short id length to a small text file.
///
/// The file holds the length as a decimal number. Writes go through a
/// temporary sibling file and a rename, and never lower the stored value.
#[derive(Debug)]
pub struct FileLengthListener {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileLengthListener {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored length. `None` if the file does not exist yet.
    pub async fn load(&self) -> anyhow::Result<Option<usize>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        };

        let length = contents.trim().parse::<usize>().with_context(|| {
            format!("{} does not contain a valid length", self.path.display())
        })?;
        debug!(path = %self.path.display(), length, "Loaded short id length");
        Ok(Some(length))
    }

    async fn store(&self, length: usize) -> anyhow::Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, format!("{length}\n"))
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl LengthListener for FileLengthListener {
    async fn on_length_changed(&self, new_length: usize) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(stored) = self.load().await? {
            if stored >= new_length {
                debug!(stored, new_length, "Stored short id length already up to date");
                return Ok(());
            }
        }

        self.store(new_length).await?;
        info!(path = %self.path.display(), new_length, "Persisted short id length");
        Ok(())
    }
}
