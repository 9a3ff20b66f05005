//! `nestly list <topic>`: read-only views rendered as launcher items.

use nestly_core::{Account, Nest, TargetTemperature, ThermostatMode};
use strum::IntoEnumIterator;

use super::{Context, degrees, ensure_logged_in, selected_nest};
use crate::cli::{ListArgs, ListTopic, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Item, fuzzy_match};

const WAITING: &str = "Waiting for valid input...";

pub async fn handle(args: ListArgs, ctx: &Context) -> Result<(), CliError> {
    let query = args.query.join(" ");
    let launcher = ctx.format == OutputFormat::Alfred;

    let items = match build(args.topic, &query, ctx).await {
        Ok(items) => items,
        Err(CliError::LoginCancelled) if launcher => return Ok(()),
        Err(e) if launcher => {
            tracing::debug!(error = %e, "reporting error as an item");
            vec![Item::new(e.launcher_message())]
        }
        Err(e) => return Err(e),
    };

    output::print_output(&output::render_items(ctx.format, &items));
    Ok(())
}

async fn build(topic: ListTopic, query: &str, ctx: &Context) -> Result<Vec<Item>, CliError> {
    let mut account = ctx.open_account()?;
    ensure_logged_in(&mut account, ctx).await?;
    let nest = selected_nest(&account, ctx).await?;

    match topic {
        ListTopic::Status => status(nest),
        ListTopic::Target => target(nest, query),
        ListTopic::Fan => fan(nest),
        ListTopic::Away => away(nest),
        ListTopic::Weather => weather(nest).await,
        ListTopic::Mode => mode(nest, query),
        ListTopic::Devices => devices(&account, nest).await,
    }
}

// ── Topics ───────────────────────────────────────────────────────────

fn status(nest: Nest<'_>) -> Result<Vec<Item>, CliError> {
    let unit = nest.scale()?;
    let target = match (nest.mode()?, nest.target_temperature()?) {
        (_, TargetTemperature::Range { low, high }) => {
            format!("Heat/cool to {} - {}", degrees(low, unit), degrees(high, unit))
        }
        (ThermostatMode::Cool, TargetTemperature::Single(t)) => {
            format!("Cooling to {}", degrees(t, unit))
        }
        (_, TargetTemperature::Single(t)) => format!("Heating to {}", degrees(t, unit)),
    };
    let away = if nest.structure().away()? { "yes" } else { "no" };

    let item = Item::new(format!(
        "Temperature: {}",
        degrees(nest.current_temperature()?, unit)
    ))
    .subtitle(format!(
        "{target}    Humidity: {:.1}%    Fan: {}    Away: {away}",
        nest.humidity()?,
        nest.fan()?,
    ));
    Ok(vec![item])
}

/// What a partially typed target query amounts to.
#[derive(Debug, PartialEq)]
enum TargetQuery {
    Empty,
    Incomplete,
    Ready,
}

fn classify_target_query(mode: ThermostatMode, query: &str) -> TargetQuery {
    if query.is_empty() {
        return TargetQuery::Empty;
    }
    match (mode, query.parse::<TargetTemperature>()) {
        (ThermostatMode::Range, Ok(t @ TargetTemperature::Range { .. })) if t.validate().is_ok() => {
            TargetQuery::Ready
        }
        (ThermostatMode::Heat | ThermostatMode::Cool, Ok(TargetTemperature::Single(_))) => {
            TargetQuery::Ready
        }
        _ => TargetQuery::Incomplete,
    }
}

fn target(nest: Nest<'_>, query: &str) -> Result<Vec<Item>, CliError> {
    let mode = nest.mode()?;
    let query = query.trim().trim_matches(|c| c == '"' || c == '\'');
    let state = classify_target_query(mode, query);
    if state == TargetQuery::Incomplete {
        return Ok(vec![Item::new(WAITING)]);
    }

    let unit = nest.scale()?;
    let (title, subtitle) = match nest.target_temperature()? {
        TargetTemperature::Range { low, high } => (
            format!(
                "Target temperature range is {} - {}",
                degrees(low, unit),
                degrees(high, unit)
            ),
            format!("Enter a temperature range in °{unit} to update; use format \"low high\""),
        ),
        TargetTemperature::Single(t) => (
            format!("Target temperature: {}", degrees(t, unit)),
            format!("Enter a temperature in °{unit} to update"),
        ),
    };

    let mut item = Item::new(title).subtitle(subtitle);
    if state == TargetQuery::Ready {
        item = item.action(query);
    }
    Ok(vec![item])
}

fn fan(nest: Nest<'_>) -> Result<Vec<Item>, CliError> {
    let current = nest.fan()?;
    let (title, switch) = match current {
        nestly_core::FanMode::Auto => ("Fan is in auto mode", "on"),
        nestly_core::FanMode::On => ("Fan is on", "to auto mode"),
    };
    Ok(vec![
        Item::new(title)
            .subtitle(format!("Press enter to switch {switch}"))
            .action(current.toggled().as_str()),
    ])
}

fn away(nest: Nest<'_>) -> Result<Vec<Item>, CliError> {
    let (title, arg) = if nest.structure().away()? {
        ("Nest thinks you're away", "off")
    } else {
        ("Nest thinks you're at home", "on")
    };
    Ok(vec![Item::new(title).subtitle("Press enter to toggle").action(arg)])
}

async fn weather(nest: Nest<'_>) -> Result<Vec<Item>, CliError> {
    let unit = nest.scale()?;
    let report = nest.structure().weather().await?;

    let mut items = vec![Item::new(format!("Now: {}", capitalize(&report.now.conditions))).subtitle(
        format!(
            "{},  {:.1}% humidity",
            degrees(unit.to_display(report.now.current_temperature), unit),
            report.now.current_humidity
        ),
    )];

    for (label, day) in ["Today", "Tomorrow"].into_iter().zip(&report.forecast.daily) {
        items.push(
            Item::new(format!("{label}: {}", capitalize(&day.conditions))).subtitle(format!(
                "High: {},  Low: {}",
                degrees(unit.to_display(day.high_temperature), unit),
                degrees(unit.to_display(day.low_temperature), unit)
            )),
        );
    }
    Ok(items)
}

fn mode(nest: Nest<'_>, query: &str) -> Result<Vec<Item>, CliError> {
    let active = nest.mode()?;
    let mut modes: Vec<ThermostatMode> = ThermostatMode::iter().collect();
    modes.sort_by_key(|m| m.as_str());

    let items: Vec<Item> = modes
        .into_iter()
        .map(|m| {
            let title = if m == active {
                format!("{} (active)", m.label())
            } else {
                m.label().to_owned()
            };
            Item::new(title).subtitle(m.description()).action(m.as_str())
        })
        .collect();

    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Ok(items);
    }
    Ok(fuzzy_match(&query, items, |i| i.title.to_lowercase()))
}

async fn devices(account: &Account, selected: Nest<'_>) -> Result<Vec<Item>, CliError> {
    let mut items = Vec::new();
    for nest in account.nests().await? {
        let title = if nest.id() == selected.id() {
            format!("{} (active)", nest.name())
        } else {
            nest.name()
        };
        let subtitle = format!(
            "{}    {}",
            nest.structure().name()?,
            degrees(nest.current_temperature()?, nest.scale()?)
        );
        items.push(
            Item::new(title)
                .subtitle(subtitle)
                .uid(nest.id())
                .action(nest.id()),
        );
    }
    Ok(items)
}

/// First letter upper, the rest lower.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
