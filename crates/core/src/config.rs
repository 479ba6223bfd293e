use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root application configuration. Loaded from environment variables
/// with the prefix `RECS_EXPRESS__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub snapshots: SnapshotConfig,
    #[serde(default)]
    pub composer: ComposerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Upper bound on the per-user recent-activity history.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

/// Locations of the immutable snapshot tables loaded at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default = "default_similar_path")]
    pub similar_path: PathBuf,
    #[serde(default = "default_personal_path")]
    pub personal_path: PathBuf,
    #[serde(default = "default_popular_path")]
    pub popular_path: PathBuf,
}

/// Defaults applied when a request omits `k` / `num_events`, plus the
/// per-call deadline for upstream store calls.
#[derive(Debug, Clone, Deserialize)]
pub struct ComposerConfig {
    #[serde(default = "default_k_online")]
    pub default_k_online: usize,
    #[serde(default = "default_num_events")]
    pub default_num_events: usize,
    #[serde(default = "default_k_offline")]
    pub default_k_offline: usize,
    #[serde(default = "default_k_blended")]
    pub default_k_blended: usize,
    #[serde(default = "default_events_k")]
    pub default_events_k: usize,
    #[serde(default = "default_similar_k")]
    pub default_similar_k: usize,
    #[serde(default = "default_upstream_timeout_ms")]
    pub upstream_timeout_ms: u64,
}

impl ComposerConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }
}

// Default functions
fn default_node_id() -> String {
    "recs-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_max_history() -> usize {
    10
}
fn default_similar_path() -> PathBuf {
    PathBuf::from("data/similar.jsonl")
}
fn default_personal_path() -> PathBuf {
    PathBuf::from("data/recommendations.jsonl")
}
fn default_popular_path() -> PathBuf {
    PathBuf::from("data/top_popular.jsonl")
}
fn default_k_online() -> usize {
    5
}
fn default_num_events() -> usize {
    3
}
fn default_k_offline() -> usize {
    5
}
fn default_k_blended() -> usize {
    50
}
fn default_events_k() -> usize {
    5
}
fn default_similar_k() -> usize {
    10
}
fn default_upstream_timeout_ms() -> u64 {
    500
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            port: default_metrics_port(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
        }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            similar_path: default_similar_path(),
            personal_path: default_personal_path(),
            popular_path: default_popular_path(),
        }
    }
}

impl SnapshotConfig {
    /// Point all three tables at `dir`, keeping their file names.
    pub fn rebase(&mut self, dir: &Path) {
        for path in [
            &mut self.similar_path,
            &mut self.personal_path,
            &mut self.popular_path,
        ] {
            if let Some(name) = path.file_name() {
                *path = dir.join(name);
            }
        }
    }
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            default_k_online: default_k_online(),
            default_num_events: default_num_events(),
            default_k_offline: default_k_offline(),
            default_k_blended: default_k_blended(),
            default_events_k: default_events_k(),
            default_similar_k: default_similar_k(),
            upstream_timeout_ms: default_upstream_timeout_ms(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            events: EventsConfig::default(),
            snapshots: SnapshotConfig::default(),
            composer: ComposerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("RECS_EXPRESS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
