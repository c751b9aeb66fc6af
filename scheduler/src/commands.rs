use crate::output::{print_json, print_table};
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use common::config::Settings;
use common::models::{DispatchStatus, OrderSummary, RunReport};
use common::schedule::{civil_today, day_offset, parse_civil_date};
use common::scheduler::{
    classify, plan_order, MessageTemplates, ReminderRunner, RunOptions, RunnerConfig,
};
use common::sms::{LogGateway, SmsGateway, SolapiGateway};
use common::storage::{OrderStore, RestOrderStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// `today` in the configured civil timezone, unless overridden
pub fn resolve_today(settings: &Settings, date_override: Option<NaiveDate>) -> Result<NaiveDate> {
    if let Some(date) = date_override {
        info!(today = %date, "Using override date");
        return Ok(date);
    }
    let timezone = settings.reminders.timezone()?;
    let today = civil_today(Utc::now(), timezone);
    info!(today = %today, timezone = %timezone, "Resolved civil date");
    Ok(today)
}

fn build_store(settings: &Settings) -> Result<Arc<dyn OrderStore>> {
    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    let store = RestOrderStore::new(&settings.store).context("Failed to create order store client")?;
    Ok(Arc::new(store))
}

fn build_gateway(settings: &Settings, dry_run: bool) -> Result<Arc<dyn SmsGateway>> {
    if dry_run {
        return Ok(Arc::new(LogGateway));
    }
    settings
        .validate_sms()
        .map_err(|e| anyhow::anyhow!("Invalid SMS configuration: {}", e))?;
    let gateway = SolapiGateway::new(&settings.sms).context("Failed to create SMS gateway")?;
    Ok(Arc::new(gateway))
}

/// The daily job: plan today's reminders and send them
pub async fn run(
    settings: &Settings,
    date_override: Option<NaiveDate>,
    dry_run: bool,
    recipient: Option<String>,
    json: bool,
) -> Result<()> {
    let options = RunOptions { dry_run, recipient };
    options
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid --phone: {}", e))?;

    let today = resolve_today(settings, date_override)?;
    let store = build_store(settings)?;
    let gateway = build_gateway(settings, dry_run)?;

    let runner = ReminderRunner::new(
        RunnerConfig {
            max_concurrent_sends: settings.reminders.max_concurrent_sends,
        },
        store,
        gateway,
        MessageTemplates::new(settings.reminders.site_url.clone()),
    );

    let report = runner.run(today, &options).await.map_err(|e| {
        error!(error = %e, "Reminder run aborted");
        e
    })?;

    if json {
        print_json(&report)
    } else {
        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &RunReport) {
    println!(
        "{} run for {}: {} candidates, {} scheduled, {} sent, {} failed, {} invalid",
        if report.dry_run { "Dry" } else { "Reminder" },
        report.today,
        report.candidates,
        report.scheduled,
        report.sent,
        report.failed,
        report.invalid,
    );
    if report.outcomes.is_empty() {
        return;
    }

    let rows: Vec<Vec<String>> = report
        .outcomes
        .iter()
        .map(|o| {
            vec![
                o.order_id.clone(),
                o.phone.clone(),
                format_offset(o.day_offset),
                o.phase.to_string(),
                match o.status {
                    DispatchStatus::Sent => "sent".to_string(),
                    DispatchStatus::DryRun => "dry-run".to_string(),
                    DispatchStatus::Failed => {
                        format!("failed: {}", o.error.as_deref().unwrap_or("unknown"))
                    }
                },
            ]
        })
        .collect();
    println!();
    print_table(&["ORDER", "PHONE", "D", "PHASE", "RESULT"], &rows);
}

/// `D-1`, `D-Day`, `D+3` style label for a day offset
pub fn format_offset(day_offset: i64) -> String {
    match day_offset {
        0 => "D-Day".to_string(),
        d if d > 0 => format!("D-{}", d),
        d => format!("D+{}", d.unsigned_abs()),
    }
}

#[derive(Debug, Serialize)]
struct PendingRow {
    order_id: String,
    applicant_name: String,
    phone: String,
    expected_date: Option<String>,
    day_offset: Option<i64>,
    phase: Option<String>,
    note: Option<String>,
}

fn pending_row(today: NaiveDate, order: &OrderSummary, templates: &MessageTemplates) -> PendingRow {
    let mut row = PendingRow {
        order_id: order.id.clone(),
        applicant_name: order.display_name().to_string(),
        phone: order.phone.clone(),
        expected_date: order.expected_date.clone(),
        day_offset: None,
        phase: None,
        note: None,
    };

    match plan_order(today, order, templates) {
        Ok(Some(message)) => {
            row.day_offset = Some(message.day_offset);
            row.phase = Some(message.phase.to_string());
        }
        Ok(None) => match order.expected_date.as_deref().map(parse_civil_date) {
            Some(Ok(expected)) => row.day_offset = Some(day_offset(today, expected)),
            _ => row.note = Some("no expected date".to_string()),
        },
        Err(e) => row.note = Some(e.to_string()),
    }

    row
}

/// List pending reservations and what today's run would do with each
pub async fn list(settings: &Settings, date_override: Option<NaiveDate>, json: bool) -> Result<()> {
    let today = resolve_today(settings, date_override)?;
    let store = build_store(settings)?;
    let templates = MessageTemplates::new(settings.reminders.site_url.clone());

    let orders = store
        .pending_reservations()
        .await
        .context("Failed to query pending reservations")?;

    let rows: Vec<PendingRow> = orders
        .iter()
        .map(|order| pending_row(today, order, &templates))
        .collect();

    if json {
        return print_json(&rows);
    }

    println!("Pending reservations as of {}: {}", today, rows.len());
    if rows.is_empty() {
        return Ok(());
    }
    println!();
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.order_id.clone(),
                r.applicant_name.clone(),
                r.phone.clone(),
                r.expected_date.clone().unwrap_or_else(|| "-".to_string()),
                r.day_offset.map(format_offset).unwrap_or_else(|| "-".to_string()),
                r.phase
                    .clone()
                    .or_else(|| r.note.clone())
                    .unwrap_or_else(|| "skip".to_string()),
            ]
        })
        .collect();
    print_table(&["ORDER", "NAME", "PHONE", "EXPECTED", "D", "ACTION"], &table);
    Ok(())
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SimulationRow {
    pub expected_date: NaiveDate,
    pub day_offset: i64,
    pub phase: Option<String>,
}

/// Widest offset range `simulate` will print, in days
pub const MAX_SIMULATION_SPAN_DAYS: i64 = 3650;

/// Classification of every expected date from `today + from` to `today + to`
pub fn simulation_rows(today: NaiveDate, from: i64, to: i64) -> Result<Vec<SimulationRow>> {
    if from > to {
        anyhow::bail!("--from ({}) must not be greater than --to ({})", from, to);
    }
    match to.checked_sub(from) {
        Some(span) if span <= MAX_SIMULATION_SPAN_DAYS => {}
        _ => anyhow::bail!(
            "Offset range {}..={} spans more than {} days",
            from,
            to,
            MAX_SIMULATION_SPAN_DAYS
        ),
    }

    (from..=to)
        .rev()
        .map(|offset| -> Result<SimulationRow> {
            let expected_date = Duration::try_days(offset)
                .and_then(|delta| today.checked_add_signed(delta))
                .with_context(|| format!("Day offset {} is outside the calendar range", offset))?;
            let day_offset = day_offset(today, expected_date);
            Ok(SimulationRow {
                expected_date,
                day_offset,
                phase: classify(day_offset).map(|p| p.to_string()),
            })
        })
        .collect()
}

/// Offline table of which day offsets get which message
pub fn simulate(
    settings: &Settings,
    date_override: Option<NaiveDate>,
    from: i64,
    to: i64,
    json: bool,
) -> Result<()> {
    let today = resolve_today(settings, date_override)?;
    let rows = simulation_rows(today, from, to)?;

    if json {
        return print_json(&rows);
    }

    println!("Simulated today: {}", today);
    println!();
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.expected_date.to_string(),
                format_offset(r.day_offset),
                r.phase.clone().map(|p| format!("SEND ({})", p)).unwrap_or_else(|| "SKIP".to_string()),
            ]
        })
        .collect();
    print_table(&["EXPECTED", "D", "ACTION"], &table);
    Ok(())
}
