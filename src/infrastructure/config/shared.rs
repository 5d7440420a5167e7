use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::models::ResolvedConfig;
use crate::infrastructure::config::loader::{ConfigError, ConfigLoader};

/// Current configuration, swapped whole on reload
///
/// Readers take an `Arc` snapshot and keep it for the duration of a batch,
/// so a reload never changes the configuration seen by work in progress.
pub struct SharedConfig {
    current: RwLock<Arc<ResolvedConfig>>,
    source: Option<PathBuf>,
}

impl SharedConfig {
    pub fn new(resolved: ResolvedConfig, source: Option<PathBuf>) -> Self {
        Self {
            current: RwLock::new(Arc::new(resolved)),
            source,
        }
    }

    pub async fn snapshot(&self) -> Arc<ResolvedConfig> {
        Arc::clone(&*self.current.read().await)
    }

    /// Re-read the configuration source and swap it in
    ///
    /// On failure the previous configuration stays active.
    pub async fn reload(&self) -> Result<Arc<ResolvedConfig>, ConfigError> {
        let loaded = match &self.source {
            Some(path) => ConfigLoader::load_from_file(path),
            None => ConfigLoader::load(),
        };

        match loaded {
            Ok(resolved) => {
                let resolved = Arc::new(resolved);
                *self.current.write().await = Arc::clone(&resolved);
                info!(model = %resolved.generation.model, "configuration reloaded");
                Ok(resolved)
            }
            Err(err) => {
                warn!(error = %err, "configuration reload rejected, keeping previous");
                Err(err)
            }
        }
    }

    /// Swap in an already validated configuration
    pub async fn replace(&self, resolved: ResolvedConfig) {
        *self.current.write().await = Arc::new(resolved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Settings;

    fn resolved_with_model(model: &str) -> ResolvedConfig {
        let mut settings = Settings::default();
        settings.ollama.model = model.to_string();
        ConfigLoader::resolve(settings).unwrap()
    }

    #[tokio::test]
    async fn test_snapshot_survives_replace() {
        let shared = SharedConfig::new(resolved_with_model("first"), None);
        let before = shared.snapshot().await;

        shared.replace(resolved_with_model("second")).await;

        assert_eq!(before.generation.model, "first");
        assert_eq!(shared.snapshot().await.generation.model, "second");
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"ollama": {"endpoint": "not-a-url"}}"#).unwrap();

        let shared = SharedConfig::new(resolved_with_model("kept"), Some(path));
        let err = shared.reload().await.unwrap_err();

        assert_eq!(err.field(), Some("endpoint"));
        assert_eq!(shared.snapshot().await.generation.model, "kept");
    }

    #[tokio::test]
    async fn test_reload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "ollama:\n  model: llama3\n").unwrap();

        let shared = SharedConfig::new(resolved_with_model("old"), Some(path));
        let reloaded = shared.reload().await.unwrap();

        assert_eq!(reloaded.generation.model, "llama3");
        assert_eq!(shared.snapshot().await.generation.model, "llama3");
    }
}
