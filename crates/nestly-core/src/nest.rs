// ── Nest (thermostat) ──
//
// A borrowed view over one device's entries in the snapshot: `device.<id>`
// for configuration, `shared.<id>` for temperatures, `metadata.<id>` for
// network details. Reads convert Celsius to the device's scale; writes
// convert back before sending and patch the snapshot once confirmed.

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::account::{Account, StatusCell, StructureRecord, read_status};
use crate::error::CoreError;
use crate::model::{FanMode, TargetTemperature, ThermostatMode};
use crate::status::{Category, StatusPatch};
use crate::structure::Structure;
use crate::units::Scale;

#[derive(Clone, Copy)]
pub struct Nest<'a> {
    account: &'a Account,
    status: &'a StatusCell,
    structure: &'a StructureRecord,
    id: &'a str,
}

impl<'a> Nest<'a> {
    pub(crate) fn new(
        account: &'a Account,
        status: &'a StatusCell,
        structure: &'a StructureRecord,
        id: &'a str,
    ) -> Self {
        Self {
            account,
            status,
            structure,
            id,
        }
    }

    pub fn id(&self) -> &'a str {
        self.id
    }

    pub fn account(&self) -> &'a Account {
        self.account
    }

    /// The structure this thermostat belongs to.
    pub fn structure(&self) -> Structure<'a> {
        Structure::new(self.account, self.status, self.structure)
    }

    // ── Read-only projections ────────────────────────────────────────

    /// Display name, falling back to the device id.
    pub fn name(&self) -> String {
        read_status(self.status)
            .str_field(Category::Shared, self.id, "name")
            .ok()
            .filter(|name| !name.is_empty())
            .map_or_else(|| self.id.to_owned(), str::to_owned)
    }

    pub fn scale(&self) -> Result<Scale, CoreError> {
        read_status(self.status)
            .str_field(Category::Device, self.id, "temperature_scale")?
            .parse()
    }

    /// Relative humidity in percent.
    pub fn humidity(&self) -> Result<f64, CoreError> {
        read_status(self.status).f64_field(Category::Device, self.id, "current_humidity")
    }

    pub fn leaf(&self) -> Result<bool, CoreError> {
        read_status(self.status).bool_field(Category::Device, self.id, "leaf")
    }

    pub fn ip(&self) -> Result<String, CoreError> {
        read_status(self.status)
            .str_field(Category::Metadata, self.id, "last_ip")
            .map(str::to_owned)
    }

    /// Measured temperature in the device's scale.
    pub fn current_temperature(&self) -> Result<f64, CoreError> {
        let celsius =
            read_status(self.status).f64_field(Category::Shared, self.id, "current_temperature")?;
        Ok(self.scale()?.to_display(celsius))
    }

    // ── Mode ─────────────────────────────────────────────────────────

    pub fn mode(&self) -> Result<ThermostatMode, CoreError> {
        read_status(self.status)
            .str_field(Category::Device, self.id, "current_schedule_mode")?
            .parse()
    }

    pub async fn set_mode(&self, mode: ThermostatMode) -> Result<(), CoreError> {
        let wire = mode.wire_value();
        let mut body = Map::new();
        body.insert(
            format!("device.{}", self.id),
            json!({ "current_schedule_mode": wire }),
        );
        let patch = StatusPatch::new(Category::Device, self.id).set("current_schedule_mode", wire);
        self.account
            .write_through("put", Value::Object(body), patch)
            .await
    }

    // ── Fan ──────────────────────────────────────────────────────────

    pub fn fan(&self) -> Result<FanMode, CoreError> {
        read_status(self.status)
            .str_field(Category::Device, self.id, "fan_mode")?
            .parse()
    }

    pub async fn set_fan(&self, fan: FanMode) -> Result<(), CoreError> {
        let body = json!({ "fan_mode": fan.as_str() });
        let patch = StatusPatch::new(Category::Device, self.id).set("fan_mode", fan.as_str());
        self.account
            .write_through(&format!("put/device.{}", self.id), body, patch)
            .await
    }

    // ── Target temperature ───────────────────────────────────────────

    /// A `(low, high)` range in `Range` mode, a single value otherwise, in
    /// the device's scale.
    pub fn target_temperature(&self) -> Result<TargetTemperature, CoreError> {
        let mode = self.mode()?;
        let scale = self.scale()?;
        let status = read_status(self.status);

        let wire = if mode == ThermostatMode::Range {
            TargetTemperature::Range {
                low: status.f64_field(Category::Shared, self.id, "target_temperature_low")?,
                high: status.f64_field(Category::Shared, self.id, "target_temperature_high")?,
            }
        } else {
            TargetTemperature::Single(status.f64_field(Category::Shared, self.id, "target_temperature")?)
        };

        Ok(wire.to_display(scale))
    }

    /// Set the target in the device's scale. Ranges narrower than
    /// [`MIN_RANGE_SPREAD`](crate::MIN_RANGE_SPREAD) are rejected before
    /// anything is sent.
    pub async fn set_target_temperature(&self, target: TargetTemperature) -> Result<(), CoreError> {
        target.validate()?;
        let scale = self.scale()?;

        let (body, patch) = match target.to_wire(scale) {
            TargetTemperature::Range { low, high } => (
                json!({
                    "target_temperature_low": low,
                    "target_temperature_high": high,
                }),
                StatusPatch::new(Category::Shared, self.id)
                    .set("target_temperature_low", low)
                    .set("target_temperature_high", high),
            ),
            TargetTemperature::Single(celsius) => (
                json!({
                    "target_change_pending": true,
                    "target_temperature": celsius,
                }),
                StatusPatch::new(Category::Shared, self.id)
                    .set("target_change_pending", true)
                    .set("target_temperature", celsius),
            ),
        };

        debug!(device = self.id, ?target, %scale, "setting target temperature");
        self.account
            .write_through(&format!("put/shared.{}", self.id), body, patch)
            .await
    }
}

impl std::fmt::Debug for Nest<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Nest")
            .field("id", &self.id)
            .field("structure", &self.structure.id)
            .finish()
    }
}
