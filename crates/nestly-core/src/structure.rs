// ── Structure ──
//
// A physical location grouping thermostats. A borrowed view: the id lives
// in the account's cache, every attribute is read from the snapshot.

use chrono::Utc;
use serde_json::json;

use nestly_api::Forecast;

use crate::account::{Account, StatusCell, StructureRecord, read_status};
use crate::error::CoreError;
use crate::model::parse_composite_id;
use crate::nest::Nest;
use crate::status::{Category, StatusPatch};

#[derive(Clone, Copy)]
pub struct Structure<'a> {
    account: &'a Account,
    status: &'a StatusCell,
    record: &'a StructureRecord,
}

impl<'a> Structure<'a> {
    pub(crate) fn new(account: &'a Account, status: &'a StatusCell, record: &'a StructureRecord) -> Self {
        Self {
            account,
            status,
            record,
        }
    }

    pub fn id(&self) -> &'a str {
        &self.record.id
    }

    pub fn account(&self) -> &'a Account {
        self.account
    }

    pub fn name(&self) -> Result<String, CoreError> {
        self.str_field("name")
    }

    /// Postal code.
    pub fn location(&self) -> Result<String, CoreError> {
        self.str_field("postal_code")
    }

    pub fn away(&self) -> Result<bool, CoreError> {
        read_status(self.status).bool_field(Category::Structure, self.id(), "away")
    }

    /// Flip the occupancy flag. The cached value changes only after the
    /// server accepts the write.
    pub async fn set_away(&self, away: bool) -> Result<(), CoreError> {
        let body = json!({
            "away_timestamp": Utc::now().timestamp(),
            "away": away,
            "away_setter": 0,
        });
        let patch = StatusPatch::new(Category::Structure, self.id()).set("away", away);
        self.account
            .write_through(&format!("put/structure.{}", self.id()), body, patch)
            .await
    }

    /// Current conditions and forecast for this structure's postal code.
    /// Never cached.
    pub async fn weather(&self) -> Result<Forecast, CoreError> {
        let location = self.location()?;
        self.account.weather(&location).await
    }

    /// Thermostats registered to this structure.
    pub fn nests(&self) -> Result<Vec<Nest<'a>>, CoreError> {
        let ids = if let Some(ids) = self.record.device_ids.get() {
            ids
        } else {
            let derived = {
                let status = read_status(self.status);
                status
                    .str_list(Category::Structure, self.id(), "devices")?
                    .into_iter()
                    .map(|composite| parse_composite_id(composite).map(str::to_owned))
                    .collect::<Result<Vec<_>, _>>()?
            };
            self.record.device_ids.get_or_init(|| derived)
        };

        Ok(ids
            .iter()
            .map(|id| Nest::new(self.account, self.status, self.record, id))
            .collect())
    }

    fn str_field(&self, field: &str) -> Result<String, CoreError> {
        read_status(self.status)
            .str_field(Category::Structure, self.id(), field)
            .map(str::to_owned)
    }
}

impl std::fmt::Debug for Structure<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Structure").field("id", &self.record.id).finish()
    }
}
