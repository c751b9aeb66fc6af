// Reminder planning
//
// Pure classification of pending reserve orders into today's messages. No
// I/O and no clock access: `today` is always supplied by the caller.

use crate::errors::ScheduleError;
use crate::models::{OrderSummary, Phase, ScheduledMessage};
use crate::scheduler::templates::MessageTemplates;
use crate::schedule::{day_offset, parse_civil_date};
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Overdue days 1 through this value get a reminder every day
pub const DAILY_OVERDUE_WINDOW_DAYS: u64 = 7;

/// Cadence of the escalation messages once the daily window has passed
pub const WEEKLY_CADENCE_DAYS: u64 = 7;

/// Decide which phase, if any, applies to an order `day_offset` days before
/// (positive) or after (negative) its expected date.
///
/// Overdue orders are messaged daily for the first week and then on overdue
/// days 8, 15, 22, ... with no upper bound.
pub fn classify(day_offset: i64) -> Option<Phase> {
    match day_offset {
        1 => Some(Phase::PreDue),
        0 => Some(Phase::Due),
        offset if offset < 0 => {
            let overdue_days = offset.unsigned_abs();
            if overdue_days <= DAILY_OVERDUE_WINDOW_DAYS {
                Some(Phase::OverdueDaily)
            } else if (overdue_days - DAILY_OVERDUE_WINDOW_DAYS) % WEEKLY_CADENCE_DAYS == 1 {
                Some(Phase::OverdueWeekly)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Plan the message for a single order.
///
/// Returns `Ok(None)` when the order has no expected date or nothing is due
/// today, and an error when the expected date cannot be parsed.
pub fn plan_order(
    today: NaiveDate,
    order: &OrderSummary,
    templates: &MessageTemplates,
) -> Result<Option<ScheduledMessage>, ScheduleError> {
    let raw = match order.expected_date.as_deref() {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(None),
    };

    let expected = parse_civil_date(raw).map_err(|_| ScheduleError::InvalidExpectedDate {
        order_id: order.id.clone(),
        value: raw.to_string(),
        reason: "expected YYYY-MM-DD".to_string(),
    })?;

    let offset = day_offset(today, expected);
    let Some(phase) = classify(offset) else {
        return Ok(None);
    };

    let applicant_name = order.display_name();
    Ok(Some(ScheduledMessage {
        order_id: order.id.clone(),
        phone: order.phone.clone(),
        applicant_name: applicant_name.to_string(),
        day_offset: offset,
        phase,
        body: templates.render(phase, applicant_name),
    }))
}

/// Result of planning a whole batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderPlan {
    pub messages: Vec<ScheduledMessage>,
    /// Orders skipped because their expected date is malformed
    pub rejected: Vec<ScheduleError>,
}

/// Plan today's reminders for every candidate order.
///
/// Each order is classified independently; a malformed order is logged and
/// skipped without affecting the rest of the batch. Output order follows
/// input order.
pub fn plan_reminders(
    today: NaiveDate,
    orders: &[OrderSummary],
    templates: &MessageTemplates,
) -> ReminderPlan {
    let mut plan = ReminderPlan::default();

    for order in orders {
        match plan_order(today, order, templates) {
            Ok(Some(message)) => {
                debug!(
                    order_id = %message.order_id,
                    phase = %message.phase,
                    day_offset = message.day_offset,
                    "Reminder due"
                );
                plan.messages.push(message);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Skipping order with invalid expected date");
                plan.rejected.push(e);
            }
        }
    }

    plan
}
