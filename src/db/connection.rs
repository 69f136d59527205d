//! Where game data lives: an embedded RocksDB store in the data directory,
//! or a SurrealDB server shared by several installs.

use std::path::Path;

use serde::{Deserialize, Serialize};
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;
use tracing::info;

use crate::utils::read_toml_file;
use crate::EnigmaError;

/// Handle shared by every repository, whichever backend is behind it.
pub type GameDb = Surreal<Any>;

const DEFAULT_NAMESPACE: &str = "enigma";
const DEFAULT_DATABASE: &str = "hunter";
const EMBEDDED_DIR: &str = "game.db";
const CONFIG_FILE: &str = "database.toml";

const ENV_URL: &str = "ENIGMA_DB_URL";
const ENV_USER: &str = "ENIGMA_DB_USER";
const ENV_PASS: &str = "ENIGMA_DB_PASS";

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

/// Contents of `database.toml`, tagged by `mode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DbConfig {
    Embedded {
        /// RocksDB directory, `{data_path}/game.db` when unset
        #[serde(default)]
        path: Option<String>,
    },
    Remote {
        /// e.g. `ws://127.0.0.1:8000`
        endpoint: String,
        #[serde(default)]
        username: Option<String>,
        #[serde(default)]
        password: Option<String>,
        #[serde(default = "default_namespace")]
        namespace: String,
        #[serde(default = "default_database")]
        database: String,
    },
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::Embedded { path: None }
    }
}

impl DbConfig {
    /// `database.toml`, then `ENIGMA_DB_URL`, then embedded.
    pub fn load(data_path: &Path) -> Self {
        read_toml_file(data_path, CONFIG_FILE)
            .or_else(Self::from_env)
            .unwrap_or_default()
    }

    fn from_env() -> Option<Self> {
        let endpoint = std::env::var(ENV_URL).ok()?;
        info!("Using remote database from {ENV_URL}");
        Some(Self::Remote {
            endpoint,
            username: None,
            password: None,
            namespace: default_namespace(),
            database: default_database(),
        })
    }
}

/// Configured value, else the env var, else `root`.
fn credential(configured: &Option<String>, env_var: &str) -> String {
    configured
        .clone()
        .or_else(|| std::env::var(env_var).ok())
        .unwrap_or_else(|| "root".to_string())
}

/// Connect and select the namespace and database.
pub async fn init_db(config: &DbConfig, data_path: &Path) -> Result<GameDb, EnigmaError> {
    match config {
        DbConfig::Embedded { path } => {
            let dir = match path {
                Some(path) => path.clone(),
                None => data_path.join(EMBEDDED_DIR).to_string_lossy().into_owned(),
            };
            let db = any::connect(format!("rocksdb:{dir}")).await?;
            db.use_ns(DEFAULT_NAMESPACE).use_db(DEFAULT_DATABASE).await?;
            info!("Opened embedded database at {dir}");
            Ok(db)
        }
        DbConfig::Remote {
            endpoint,
            username,
            password,
            namespace,
            database,
        } => {
            let db = any::connect(endpoint.as_str()).await?;
            let username = credential(username, ENV_USER);
            let password = credential(password, ENV_PASS);
            db.signin(Root {
                username: &username,
                password: &password,
            })
            .await?;
            db.use_ns(namespace.as_str()).use_db(database.as_str()).await?;
            info!("Connected to {endpoint} ({namespace}/{database})");
            Ok(db)
        }
    }
}
