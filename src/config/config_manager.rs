use super::types::Config;
use notify::{
    recommended_watcher, Event, RecommendedWatcher, RecursiveMode, Result as NotifyResult, Watcher,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

pub struct ConfigManager {
    config: Arc<RwLock<Config>>,
    _watcher: Option<RecommendedWatcher>, // Keep watcher alive
}

impl ConfigManager {
    /// Loads the file and keeps watching it; edits are swapped in without a restart.
    pub async fn new(config_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Self::load_config(config_path)?;
        let config_arc = Arc::new(RwLock::new(config));

        let watcher = Self::setup_watcher(config_path, config_arc.clone()).await?;

        Ok(ConfigManager {
            config: config_arc,
            _watcher: Some(watcher),
        })
    }

    /// Fixed configuration with no file behind it.
    pub fn from_config(config: Config) -> Self {
        ConfigManager {
            config: Arc::new(RwLock::new(config)),
            _watcher: None,
        }
    }

    pub fn load_config(config_path: &str) -> Result<Config, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(config_path)?;
        // An empty file is a valid all-defaults config.
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Snapshot for one request. Reloads never affect a snapshot already taken.
    pub async fn get_config(&self) -> Config {
        self.config.read().await.clone()
    }

    async fn setup_watcher(
        config_path_str: &str,
        config: Arc<RwLock<Config>>,
    ) -> NotifyResult<RecommendedWatcher> {
        let config_path = config_path_str.to_string();

        // The notify callback runs on its own thread, outside the runtime
        let runtime_handle = tokio::runtime::Handle::current();

        let mut watcher = recommended_watcher(move |res: NotifyResult<Event>| match res {
            Ok(event) => {
                // Editors often save to a temp file and rename, so match loosely
                if event
                    .paths
                    .iter()
                    .any(|p| p.to_string_lossy().contains(&config_path))
                {
                    info!("Config file changed, reloading...");
                    std::thread::sleep(std::time::Duration::from_millis(100));

                    match Self::load_config(&config_path) {
                        Ok(new_config) => {
                            let config_clone = config.clone();
                            runtime_handle.spawn(async move {
                                *config_clone.write().await = new_config;
                                info!("Config reloaded successfully.");
                            });
                        }
                        Err(e) => {
                            error!("Failed to reload config, keeping the previous one: {}", e);
                        }
                    }
                }
            }
            Err(e) => error!("watch error: {:?}", e),
        })?;

        // Watch the parent directory to catch atomic saves (rename/move)
        let path_to_watch = Path::new(config_path_str)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        watcher.watch(path_to_watch, RecursiveMode::NonRecursive)?;

        info!(
            "Started watching config file directory: {:?}",
            path_to_watch
        );
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::TranslationModel;

    #[test]
    fn test_load_config_from_file() {
        let dir = std::env::temp_dir().join(format!("onewhat-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        fs::write(
            &path,
            "transcription:\n  model: openai/whisper-small\ntranslation:\n  primary: m2m100\n",
        )
        .unwrap();

        let config = ConfigManager::load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.transcription.model, "openai/whisper-small");
        assert_eq!(config.translation.primary, TranslationModel::M2m100);

        fs::write(&path, "").unwrap();
        let config = ConfigManager::load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(config.transcription.model, "openai/whisper-large-v3");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_missing_file() {
        assert!(ConfigManager::load_config("does/not/exist.yaml").is_err());
    }

    #[tokio::test]
    async fn test_from_config_snapshot() {
        let mut config = Config::default();
        config.upstream.base_url = "http://127.0.0.1:1".to_string();
        let manager = ConfigManager::from_config(config);
        assert_eq!(
            manager.get_config().await.upstream.base_url,
            "http://127.0.0.1:1"
        );
    }
}
