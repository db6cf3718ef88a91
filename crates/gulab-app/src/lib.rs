//! # gulab-app: Action Layer for Gulab POS
//!
//! The orchestration layer between the presentation surface and the
//! lower crates.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Presentation surface                                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  gulab-app (THIS CRATE)                         │   │
//! │  │                                                                 │   │
//! │  │   actions/        one function per user-facing operation       │   │
//! │  │   notify          post-commit confirmation dispatcher          │   │
//! │  │   config          GULAB_* environment settings                 │   │
//! │  │   error           ActionError { code, message }                │   │
//! │  └───────┬──────────────────┬──────────────────┬──────────────────┘   │
//! │          ▼                  ▼                  ▼                       │
//! │     gulab-core         gulab-db           gulab-ai                     │
//! │     (cart, money)      (SQLite)           (text generation)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use gulab_app::{actions, AppState};
//!
//! let state = AppState::from_env("./gulab.db").await?;
//! let products = actions::product::list_products(&state).await?;
//! ```

pub mod actions;
pub mod config;
pub mod error;
pub mod notify;

pub use config::AppConfig;
pub use error::{ActionError, ErrorCode};
pub use notify::DispatchOutcome;

use gulab_ai::TextGenClient;
use gulab_db::{Database, DbConfig, DbError};

/// Shared application state handed to every action.
///
/// Cheap to clone: the database handle shares a pool and the client
/// shares its connection pool.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Database handle.
    pub db: Database,

    /// Text-generation client, when configured. `None` disables the
    /// description flow and leaves fresh sales' notifications pending.
    pub ai: Option<TextGenClient>,

    /// Deployment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Creates state from already-built parts.
    pub fn new(db: Database, ai: Option<TextGenClient>, config: AppConfig) -> Self {
        AppState { db, ai, config }
    }

    /// Builds state for a database path, reading everything else from the
    /// environment (`GULAB_*` settings, `GULAB__TEXTGEN__*` credentials).
    pub async fn from_env(db_path: &str) -> Result<Self, DbError> {
        let db = Database::new(DbConfig::new(db_path)).await?;
        let ai = TextGenClient::from_env();
        let config = AppConfig::from_env();

        if ai.is_none() {
            tracing::info!("Text generation unconfigured; generation features disabled");
        }

        Ok(AppState::new(db, ai, config))
    }
}
