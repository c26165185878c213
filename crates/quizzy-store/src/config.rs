//! Configuration file loading and store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizzy_core::model::Paging;
use quizzy_core::traits::ResultSink;

use crate::http::HttpStore;
use crate::jsonl::JsonlStore;
use crate::memory::MemoryStore;

/// Environment variable that overrides the HTTP store's auth token.
pub const TOKEN_ENV_VAR: &str = "QUIZZY_STORE_TOKEN";

/// Where submitted attempts are recorded.
///
/// Note: Custom Debug impl masks the auth token to keep it out of logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Http {
        base_url: String,
        #[serde(default)]
        auth_token: Option<String>,
    },
    Jsonl {
        path: PathBuf,
    },
    Memory,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConfig::Http {
                base_url,
                auth_token,
            } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("auth_token", &auth_token.as_ref().map(|_| "***"))
                .finish(),
            StoreConfig::Jsonl { path } => f.debug_struct("Jsonl").field("path", path).finish(),
            StoreConfig::Memory => f.write_str("Memory"),
        }
    }
}

/// Top-level quizzy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizzyConfig {
    /// Directory holding `<topic>.csv` files.
    #[serde(default = "default_topics_dir")]
    pub topics_dir: PathBuf,
    /// Shuffle question order once at load time.
    #[serde(default)]
    pub shuffle_questions: bool,
    /// Shuffle each question's options once per attempt.
    #[serde(default)]
    pub shuffle_options: bool,
    #[serde(default)]
    pub paging: Paging,
    /// Output directory for attempt reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Result store used by `take --record`.
    #[serde(default)]
    pub store: Option<StoreConfig>,
}

fn default_topics_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizzy-results")
}

impl Default for QuizzyConfig {
    fn default() -> Self {
        Self {
            topics_dir: default_topics_dir(),
            shuffle_questions: false,
            shuffle_options: false,
            paging: Paging::default(),
            output_dir: default_output_dir(),
            store: None,
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut from = 0;
    while let Some(offset) = result[from..].find("${") {
        let start = from + offset;
        let Some(len) = result[start..].find('}') else {
            break;
        };
        let value = std::env::var(&result[start + 2..start + len]).unwrap_or_default();
        result.replace_range(start..start + len + 1, &value);
        from = start + value.len();
    }
    result
}

fn resolve_store_config(config: &StoreConfig) -> StoreConfig {
    match config {
        StoreConfig::Http {
            base_url,
            auth_token,
        } => StoreConfig::Http {
            base_url: resolve_env_vars(base_url),
            auth_token: auth_token
                .as_deref()
                .map(resolve_env_vars)
                .filter(|t| !t.is_empty()),
        },
        StoreConfig::Jsonl { path } => StoreConfig::Jsonl {
            path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
        },
        StoreConfig::Memory => StoreConfig::Memory,
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizzy.toml` in the current directory
/// 2. `~/.config/quizzy/config.toml`
///
/// `QUIZZY_STORE_TOKEN` overrides the HTTP store's auth token.
pub fn load_config() -> Result<QuizzyConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizzyConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizzy.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizzyConfig::default(),
    };

    if let Ok(token) = std::env::var(TOKEN_ENV_VAR) {
        if let Some(StoreConfig::Http { auth_token, .. }) = &mut config.store {
            *auth_token = Some(token).filter(|t| !t.is_empty());
        }
    }

    Ok(config)
}

/// Parse TOML config text and resolve `${VAR}` references.
pub fn parse_config(content: &str) -> Result<QuizzyConfig> {
    let mut config: QuizzyConfig = toml::from_str(content)?;
    config.store = config.store.as_ref().map(resolve_store_config);
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizzy"))
}

/// Create a result store from its configuration.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn ResultSink>> {
    tracing::debug!(?config, "creating result store");
    match config {
        StoreConfig::Http {
            base_url,
            auth_token,
        } => {
            if base_url.is_empty() {
                anyhow::bail!("http store requires a base_url");
            }
            Ok(Arc::new(HttpStore::new(base_url, auth_token.clone())?))
        }
        StoreConfig::Jsonl { path } => Ok(Arc::new(JsonlStore::new(path))),
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZZY_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZZY_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZZY_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${_QUIZZY_UNSET_VAR}x"), "x");
        assert_eq!(resolve_env_vars("no ${closing"), "no ${closing");
        std::env::remove_var("_QUIZZY_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = QuizzyConfig::default();
        assert_eq!(config.topics_dir, PathBuf::from("."));
        assert_eq!(config.paging, Paging::Sequential);
        assert!(!config.shuffle_options);
        assert!(config.store.is_none());
    }

    #[test]
    fn parse_full_config() {
        std::env::set_var("_QUIZZY_TEST_TOKEN", "tok");
        let config = parse_config(
            r#"
topics_dir = "topics"
shuffle_options = true
paging = "all"

[store]
type = "http"
base_url = "https://quiz.example.firebaseio.com"
auth_token = "${_QUIZZY_TEST_TOKEN}"
"#,
        )
        .unwrap();
        std::env::remove_var("_QUIZZY_TEST_TOKEN");

        assert_eq!(config.topics_dir, PathBuf::from("topics"));
        assert!(config.shuffle_options);
        assert!(!config.shuffle_questions);
        assert_eq!(config.paging, Paging::All);
        match config.store {
            Some(StoreConfig::Http { auth_token, .. }) => {
                assert_eq!(auth_token.as_deref(), Some("tok"))
            }
            other => panic!("unexpected store: {other:?}"),
        }
    }

    #[test]
    fn parse_jsonl_and_memory_stores() {
        let config = parse_config("[store]\ntype = \"jsonl\"\npath = \"out/results.jsonl\"\n").unwrap();
        assert!(matches!(config.store, Some(StoreConfig::Jsonl { .. })));
        let config = parse_config("[store]\ntype = \"memory\"\n").unwrap();
        assert!(matches!(config.store, Some(StoreConfig::Memory)));
    }

    #[test]
    fn debug_masks_token() {
        let config = StoreConfig::Http {
            base_url: "https://example.com".into(),
            auth_token: Some("super-secret".into()),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_from(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizzy.toml");
        std::fs::write(&path, "output_dir = \"reports\"\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("reports"));
    }

    #[test]
    fn create_each_store_kind() {
        let dir = tempfile::tempdir().unwrap();
        let stores = [
            StoreConfig::Http {
                base_url: "http://localhost:9000".into(),
                auth_token: None,
            },
            StoreConfig::Jsonl {
                path: dir.path().join("r.jsonl"),
            },
            StoreConfig::Memory,
        ];
        let names: Vec<String> = stores
            .iter()
            .map(|c| create_store(c).unwrap().name().to_string())
            .collect();
        assert_eq!(names, ["http", "jsonl", "memory"]);

        let empty = StoreConfig::Http {
            base_url: String::new(),
            auth_token: None,
        };
        assert!(create_store(&empty).is_err());
    }
}
