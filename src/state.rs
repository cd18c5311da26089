//! Application state: quiz session store, prompts, OpenAI client, test store.
//!
//! This module owns:
//!   - active quiz sessions (by id, in memory only)
//!   - the prompts struct (from TOML or defaults)
//!   - optional OpenAI client (generation)
//!   - optional table-API client (persistence)

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::config::{load_testgen_config_from_env, Prompts};
use crate::error::ApiError;
use crate::openai::OpenAI;
use crate::quiz::QuizSession;
use crate::store::TestStore;

#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, QuizSession>>>,
    pub openai: Option<OpenAI>,
    pub store: Option<TestStore>,
    pub prompts: Prompts,
}

impl AppState {
    /// Build state from env: load config, init OpenAI and the table API client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let prompts = load_testgen_config_from_env()
            .map(|c| c.prompts)
            .unwrap_or_default();

        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "lektor_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
        } else {
            info!(target: "lektor_backend", "OpenAI disabled (no OPENAI_API_KEY). Generation will fail with a network error.");
        }

        let store = TestStore::from_env();
        if let Some(st) = &store {
            info!(target: "lektor_backend", base_url = %st.base_url, "Test persistence enabled.");
        } else {
            info!(target: "lektor_backend", "Test persistence disabled (missing SUPABASE_URL / SUPABASE_SERVICE_ROLE_KEY).");
        }

        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            openai,
            store,
            prompts,
        }
    }

    /// Register a fresh session. Old sessions for the same lecture are simply
    /// abandoned; regeneration always starts from a new id.
    #[instrument(level = "debug", skip(self, s), fields(id = %s.id))]
    pub async fn insert_session(&self, s: QuizSession) {
        self.sessions.write().await.insert(s.id.clone(), s);
    }

    /// Read-only snapshot of a session by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_session(&self, id: &str) -> Option<QuizSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Run a mutation against a session under the write lock.
    pub async fn with_session_mut<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut QuizSession) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| ApiError::Validation(format!("unknown quiz id: {id}")))?;
        f(session)
    }
}
