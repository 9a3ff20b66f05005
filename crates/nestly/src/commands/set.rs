//! `nestly set <topic> <value>`: one write, one confirmation line.

use nestly_core::{Account, FanMode, TargetTemperature, ThermostatMode};

use super::{Context, ensure_logged_in, selected_nest};
use crate::cli::{OutputFormat, SetArgs, SetTopic};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: SetArgs, ctx: &Context) -> Result<(), CliError> {
    let value = args.value.join(" ");
    let launcher = ctx.format == OutputFormat::Alfred;

    let message = match apply(args.topic, value.trim(), ctx).await {
        Ok(message) => message,
        Err(CliError::LoginCancelled) if launcher => return Ok(()),
        Err(e) if launcher => e.launcher_message(),
        Err(e) => return Err(e),
    };

    output::print_output(&output::render_message(ctx.format, &message));
    Ok(())
}

async fn apply(topic: SetTopic, value: &str, ctx: &Context) -> Result<String, CliError> {
    // parse before touching the network
    let change = Change::parse(topic, value)?;

    let mut account = ctx.open_account()?;
    ensure_logged_in(&mut account, ctx).await?;

    match change {
        Change::Device(id) => select_device(&account, ctx, id).await,
        Change::Nest(change) => apply_to_nest(&account, ctx, change).await,
    }
}

async fn apply_to_nest(
    account: &Account,
    ctx: &Context,
    change: NestChange,
) -> Result<String, CliError> {
    let nest = selected_nest(account, ctx).await?;
    let unit = nest.scale()?;
    tracing::info!(device = nest.id(), ?change, "applying change");

    let message = match change {
        NestChange::Target(target) => {
            nest.set_target_temperature(target).await?;
            match target {
                TargetTemperature::Range { low, high } => {
                    format!("Target temperature range is now {low}°{unit} - {high}°{unit}")
                }
                TargetTemperature::Single(t) => format!("Target temperature set to {t}°{unit}"),
            }
        }
        NestChange::Fan(fan) => {
            nest.set_fan(fan).await?;
            match nest.fan()? {
                FanMode::Auto => "Fan is in auto mode".to_owned(),
                FanMode::On => "Fan is on".to_owned(),
            }
        }
        NestChange::Away(away) => {
            nest.structure().set_away(away).await?;
            if away {
                "Away mode is enabled".to_owned()
            } else {
                "Away mode is disabled".to_owned()
            }
        }
        NestChange::Mode(mode) => {
            nest.set_mode(mode).await?;
            format!("Temperature mode set to {}", mode.label().to_lowercase())
        }
    };
    Ok(message)
}

async fn select_device(account: &Account, ctx: &Context, id: &str) -> Result<String, CliError> {
    let nest = account.nest(id).await?;
    nestly_config::set_last_device(&ctx.config_path, nest.id())?;
    Ok(format!("Now controlling {}", nest.name()))
}

/// A validated change request.
#[derive(Debug, PartialEq)]
enum Change<'v> {
    Nest(NestChange),
    Device(&'v str),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NestChange {
    Target(TargetTemperature),
    Fan(FanMode),
    Away(bool),
    Mode(ThermostatMode),
}

impl<'v> Change<'v> {
    fn parse(topic: SetTopic, value: &'v str) -> Result<Self, CliError> {
        let change = match topic {
            SetTopic::Device => return Ok(Self::Device(value)),
            SetTopic::Target => {
                let target: TargetTemperature = value.parse()?;
                target.validate()?;
                NestChange::Target(target)
            }
            SetTopic::Fan => NestChange::Fan(value.parse()?),
            SetTopic::Away => NestChange::Away(parse_switch(value)?),
            SetTopic::Mode => NestChange::Mode(value.parse()?),
        };
        Ok(Self::Nest(change))
    }
}

fn parse_switch(value: &str) -> Result<bool, CliError> {
    match value.to_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        other => Err(CliError::Validation {
            field: "away".into(),
            reason: format!("expected on/off, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn away_words() {
        for word in ["on", "YES", "true", "1"] {
            assert!(parse_switch(word).unwrap());
        }
        for word in ["off", "No", "false", "0"] {
            assert!(!parse_switch(word).unwrap());
        }
        assert!(parse_switch("maybe").is_err());
    }

    #[test]
    fn changes_are_validated_up_front() {
        assert_eq!(
            Change::parse(SetTopic::Mode, "HEAT").unwrap(),
            Change::Nest(NestChange::Mode(ThermostatMode::Heat))
        );
        assert_eq!(
            Change::parse(SetTopic::Target, "65 75").unwrap(),
            Change::Nest(NestChange::Target(TargetTemperature::Range {
                low: 65.0,
                high: 75.0
            }))
        );
        assert!(matches!(
            Change::parse(SetTopic::Fan, "turbo"),
            Err(CliError::Validation { .. })
        ));
        assert!(Change::parse(SetTopic::Mode, "dry").is_err());
        assert_eq!(
            Change::parse(SetTopic::Device, "d1").unwrap(),
            Change::Device("d1")
        );
    }
}
