use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Order Models
// ============================================================================

/// Status sentinel of reserve orders waiting for the voucher to be delivered
pub const PENDING_RESERVATION_STATUS: &str = "예약일정 대기중";

/// Name used in message text when the order carries no applicant name
pub const FALLBACK_APPLICANT_NAME: &str = "고객";

/// The part of a stored order the reminder job reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: String,
    #[serde(default)]
    pub status: String,
    /// Committed delivery date as `YYYY-MM-DD`, or absent when not yet scheduled
    #[serde(default)]
    pub expected_date: Option<String>,
    #[serde(default)]
    pub applicant_name: Option<String>,
    pub phone: String,
}

impl OrderSummary {
    /// Name to address the customer by in message text
    pub fn display_name(&self) -> &str {
        self.applicant_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_APPLICANT_NAME)
    }
}

// ============================================================================
// Reminder Models
// ============================================================================

/// Message category for a given day offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    PreDue,
    Due,
    OverdueDaily,
    OverdueWeekly,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::PreDue => "pre-due",
            Phase::Due => "due",
            Phase::OverdueDaily => "overdue-daily",
            Phase::OverdueWeekly => "overdue-weekly",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reminder that is due today for one order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledMessage {
    pub order_id: String,
    pub phone: String,
    pub applicant_name: String,
    /// `expected_date - today` in calendar days
    pub day_offset: i64,
    pub phase: Phase,
    pub body: String,
}

// ============================================================================
// Run Models
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchStatus {
    Sent,
    Failed,
    DryRun,
}

/// What happened to one scheduled message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub order_id: String,
    pub phone: String,
    pub phase: Phase,
    pub day_offset: i64,
    pub status: DispatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one reminder run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub today: NaiveDate,
    pub dry_run: bool,
    /// Orders returned by the store, after the recipient filter
    pub candidates: usize,
    /// Orders skipped because their expected date could not be parsed
    pub invalid: usize,
    pub scheduled: usize,
    pub sent: usize,
    pub failed: usize,
    pub outcomes: Vec<DispatchOutcome>,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}
