use crate::food::api::openfda::{EventQuery, EventSummary};
use crate::food::error::FetchError;
use crate::food::events::EventRow;
use crate::food::finder::RecipeSearch;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use chrono::{DateTime, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};
use tracing::{debug, warn};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "food_explorer_session";
const SESSION_ID_KEY: &str = "food_explorer.id";
const SESSION_IDLE_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

/// The last successful openFDA load, already projected to rows.
#[derive(Debug, Clone)]
pub struct EventView {
    pub query: EventQuery,
    pub rows: Vec<EventRow>,
    pub summary: EventSummary,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe_name: String,
    pub text: Result<String, FetchError>,
}

/// What one browser session has loaded. Each field is replaced by the next
/// action of its kind and never written anywhere else.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub events: Option<Result<EventView, FetchError>>,
    pub last_query: Option<EventQuery>,
    pub recipes: Option<Result<RecipeSearch, FetchError>>,
    pub ingredients_text: String,
    pub ollama_key: Option<String>,
    pub detail: Option<RecipeDetail>,
    pub report: Option<Result<String, FetchError>>,
}

/// In-memory session results, bounded by least-recent use.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Mutex<LruCache<SessionId, SessionData>>>,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// A snapshot of the session, empty for unknown ids.
    pub fn get(&self, id: SessionId) -> SessionData {
        self.inner.lock().get(&id).cloned().unwrap_or_default()
    }

    pub fn update<F>(&self, id: SessionId, f: F)
    where
        F: FnOnce(&mut SessionData),
    {
        let mut cache = self.inner.lock();
        if let Some(data) = cache.get_mut(&id) {
            f(data);
            return;
        }
        let mut data = SessionData::default();
        f(&mut data);
        cache.put(id, data);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Cookie-backed sessions; only an id lives in the cookie store, results
/// stay in [`SessionStore`].
pub fn session_layer() -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(SESSION_IDLE_MINUTES)))
}

impl SessionId {
    /// The id stored in this browser session, assigning one on first use.
    pub async fn load(session: &Session) -> Result<Self, tower_sessions::session::Error> {
        if let Some(id) = session.get::<Uuid>(SESSION_ID_KEY).await? {
            return Ok(SessionId(id));
        }
        let id = Uuid::new_v4();
        debug!(session = %id, "Starting session");
        session.insert(SESSION_ID_KEY, id).await?;
        Ok(SessionId(id))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        SessionId::load(&session).await.map_err(|e| {
            warn!(error = %e, "Session store unavailable");
            (StatusCode::INTERNAL_SERVER_ERROR, "Session unavailable")
        })
    }
}
