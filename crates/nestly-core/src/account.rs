// ── Account ──
//
// Top of the resource graph. Owns the session (through the client and
// the session store) and the status snapshot. The snapshot is fetched on
// first access and then only ever patched in place; `Structure` and
// `Nest` values are views that borrow from here.

use std::path::Path;
use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard};

use indexmap::IndexMap;
use nestly_api::{Forecast, NestClient, Session, SessionStore, TransportConfig};
use secrecy::SecretString;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::parse_composite_id;
use crate::nest::Nest;
use crate::status::{Category, StatusPatch, StatusSnapshot};
use crate::structure::Structure;

pub(crate) type StatusCell = RwLock<StatusSnapshot>;

/// Cached per-structure state: the id and its lazily derived device ids.
pub(crate) struct StructureRecord {
    pub(crate) id: String,
    pub(crate) device_ids: OnceLock<Vec<String>>,
}

impl StructureRecord {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            device_ids: OnceLock::new(),
        }
    }
}

/// An authenticated Nest account and its cached resource graph.
///
/// Lives for one invocation. Only the session outlives it (on disk).
pub struct Account {
    client: NestClient,
    sessions: SessionStore,
    status: OnceCell<StatusCell>,
    structures: OnceLock<IndexMap<String, StructureRecord>>,
}

impl Account {
    pub fn new(client: NestClient, sessions: SessionStore) -> Self {
        Self {
            client,
            sessions,
            status: OnceCell::new(),
            structures: OnceLock::new(),
        }
    }

    /// Build the HTTP client from `transport` and keep sessions under `cache_dir`.
    pub fn from_transport(
        transport: &TransportConfig,
        cache_dir: impl AsRef<Path>,
    ) -> Result<Self, CoreError> {
        let client = NestClient::new(transport)?;
        Ok(Self::new(client, SessionStore::new(cache_dir)))
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.sessions
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Load the persisted session. `true` only if one exists, parses, and
    /// has not expired.
    pub fn has_session(&mut self) -> bool {
        match self.sessions.load() {
            Some(session) => {
                self.install(session);
                true
            }
            None => false,
        }
    }

    /// Authenticate, persist the session, and keep it in memory.
    ///
    /// Every failure on the way to a session, rejected credentials or an
    /// unreachable service alike, is a `LoginFailure`.
    pub async fn login(&mut self, email: &str, password: &SecretString) -> Result<(), CoreError> {
        let session = self.client.login(email, password).await.map_err(|e| match e {
            nestly_api::Error::Authentication { message } => CoreError::LoginFailure { message },
            other => CoreError::LoginFailure {
                message: other.to_string(),
            },
        })?;

        self.sessions.save(&session)?;
        info!(user_id = %session.user_id, "logged in");
        self.install(session);
        Ok(())
    }

    /// Forget the session, on disk and in memory.
    pub fn logout(&mut self) -> Result<(), CoreError> {
        self.sessions.clear()?;
        self.client.clear_session();
        self.reset_cache();
        Ok(())
    }

    pub fn user_id(&self) -> Result<&str, CoreError> {
        Ok(self.client.active_session()?.user_id.as_str())
    }

    fn install(&mut self, session: Session) {
        let same_user = self
            .client
            .session()
            .is_some_and(|current| current.user_id == session.user_id);
        if !same_user {
            self.reset_cache();
        }
        self.client.set_session(session);
    }

    fn reset_cache(&mut self) {
        self.status = OnceCell::new();
        self.structures = OnceLock::new();
    }

    // ── Resource graph ───────────────────────────────────────────────

    /// A copy of the status snapshot. Fetched on first call, cached
    /// afterwards; later writes do not show up in the returned copy.
    pub async fn status(&self) -> Result<StatusSnapshot, CoreError> {
        let cell = self.status_cell().await?;
        Ok(read_status(cell).clone())
    }

    /// One `Structure` per entry of `user.<id>.structures`.
    pub async fn structures(&self) -> Result<Vec<Structure<'_>>, CoreError> {
        let cell = self.status_cell().await?;

        let records = if let Some(records) = self.structures.get() {
            records
        } else {
            let built = {
                let status = read_status(cell);
                derive_structures(&status, self.user_id()?)?
            };
            debug!(count = built.len(), "derived structures");
            self.structures.get_or_init(|| built)
        };

        Ok(records
            .values()
            .map(|record| Structure::new(self, cell, record))
            .collect())
    }

    pub async fn structure(&self, id: &str) -> Result<Structure<'_>, CoreError> {
        self.structures()
            .await?
            .into_iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| CoreError::NotFound {
                kind: "structure".into(),
                id: id.into(),
            })
    }

    /// Every thermostat across every structure.
    pub async fn nests(&self) -> Result<Vec<Nest<'_>>, CoreError> {
        let mut all = Vec::new();
        for structure in self.structures().await? {
            all.extend(structure.nests()?);
        }
        Ok(all)
    }

    pub async fn nest(&self, device_id: &str) -> Result<Nest<'_>, CoreError> {
        self.nests()
            .await?
            .into_iter()
            .find(|n| n.id() == device_id)
            .ok_or_else(|| CoreError::NotFound {
                kind: "thermostat".into(),
                id: device_id.into(),
            })
    }

    // ── Crate-internal plumbing ──────────────────────────────────────

    pub(crate) async fn status_cell(&self) -> Result<&StatusCell, CoreError> {
        self.status
            .get_or_try_init(|| async {
                let user_id = self.user_id()?;
                debug!(user_id, "fetching status snapshot");
                let root: Value = self.client.get_json(&format!("mobile/user.{user_id}")).await?;
                Ok::<_, CoreError>(RwLock::new(StatusSnapshot::new(root)))
            })
            .await
    }

    /// POST `body` to `path`; once the server accepts it, merge `patch`
    /// into the snapshot. A failed write leaves the snapshot untouched.
    pub(crate) async fn write_through(
        &self,
        path: &str,
        body: Value,
        patch: StatusPatch,
    ) -> Result<(), CoreError> {
        let cell = self.status_cell().await?;
        self.client.post(path, body).await?;

        cell.write()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(&patch);
        debug!(category = %patch.category, id = %patch.id, "applied confirmed patch");
        Ok(())
    }

    pub(crate) async fn weather(&self, postal_code: &str) -> Result<Forecast, CoreError> {
        Ok(self.client.weather(postal_code).await?)
    }
}

pub(crate) fn read_status(cell: &StatusCell) -> RwLockReadGuard<'_, StatusSnapshot> {
    cell.read().unwrap_or_else(PoisonError::into_inner)
}

fn derive_structures(
    status: &StatusSnapshot,
    user_id: &str,
) -> Result<IndexMap<String, StructureRecord>, CoreError> {
    status
        .str_list(Category::User, user_id, "structures")?
        .into_iter()
        .map(|composite| {
            let id = parse_composite_id(composite)?;
            Ok((id.to_owned(), StructureRecord::new(id)))
        })
        .collect()
}
