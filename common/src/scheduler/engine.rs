// Reminder run engine: fetch, plan, dispatch

use crate::errors::StoreError;
use crate::models::{DispatchOutcome, DispatchStatus, OrderSummary, RunReport, ScheduledMessage};
use crate::scheduler::planner::plan_reminders;
use crate::scheduler::templates::MessageTemplates;
use crate::sms::{LogGateway, SmsGateway};
use crate::storage::OrderStore;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Configuration for the runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// How many SMS requests may be in flight at once
    pub max_concurrent_sends: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_sends: 1,
        }
    }
}

/// Per-invocation switches; none of them change which messages are due
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Log messages instead of sending them
    pub dry_run: bool,
    /// Restrict the run to orders for this phone number
    pub recipient: Option<String>,
}

impl RunOptions {
    /// Reject a recipient filter that contains no digits at all
    pub fn validate(&self) -> Result<(), String> {
        match self.recipient.as_deref() {
            Some(recipient) if normalize_phone(recipient).is_empty() => Err(format!(
                "Recipient filter '{}' does not contain a phone number",
                recipient
            )),
            _ => Ok(()),
        }
    }
}

/// Strip everything but digits so `010-1234-5678` matches `01012345678`
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Keep only the orders addressed to `recipient`
///
/// A recipient without digits matches nothing.
pub fn filter_recipient(orders: Vec<OrderSummary>, recipient: Option<&str>) -> Vec<OrderSummary> {
    match recipient.map(normalize_phone) {
        Some(wanted) => orders
            .into_iter()
            .filter(|order| !wanted.is_empty() && normalize_phone(&order.phone) == wanted)
            .collect(),
        None => orders,
    }
}

/// Runs one reminder pass against an order store and an SMS gateway
pub struct ReminderRunner {
    config: RunnerConfig,
    store: Arc<dyn OrderStore>,
    gateway: Arc<dyn SmsGateway>,
    templates: MessageTemplates,
}

impl ReminderRunner {
    pub fn new(
        config: RunnerConfig,
        store: Arc<dyn OrderStore>,
        gateway: Arc<dyn SmsGateway>,
        templates: MessageTemplates,
    ) -> Self {
        Self {
            config,
            store,
            gateway,
            templates,
        }
    }

    /// Process every pending reservation for `today`.
    ///
    /// Only a failing order store query fails the run. Invalid orders and
    /// delivery failures are reported per order and never stop the others.
    pub async fn run(&self, today: NaiveDate, options: &RunOptions) -> Result<RunReport, StoreError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("reminder_run", run_id = %run_id, today = %today, dry_run = options.dry_run);
        self.run_inner(run_id, today, options).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        today: NaiveDate,
        options: &RunOptions,
    ) -> Result<RunReport, StoreError> {
        info!("Checking pending reservations");

        let orders = match self.store.pending_reservations().await {
            Ok(orders) => orders,
            Err(e) => {
                error!(error = %e, "Failed to query pending reservations");
                return Err(e);
            }
        };
        let total = orders.len();

        let orders = filter_recipient(orders, options.recipient.as_deref());
        if let Some(recipient) = &options.recipient {
            info!(recipient = %recipient, matched = orders.len(), total, "Recipient filter applied");
        }

        let plan = plan_reminders(today, &orders, &self.templates);
        info!(
            candidates = orders.len(),
            scheduled = plan.messages.len(),
            invalid = plan.rejected.len(),
            "Reminders planned"
        );

        let concurrency = self.config.max_concurrent_sends.max(1);
        let outcomes: Vec<DispatchOutcome> = stream::iter(plan.messages.iter())
            .map(|message| self.dispatch(message, options.dry_run))
            .buffered(concurrency)
            .collect()
            .await;

        let sent = count(&outcomes, DispatchStatus::Sent);
        let failed = count(&outcomes, DispatchStatus::Failed);

        let report = RunReport {
            run_id,
            today,
            dry_run: options.dry_run,
            candidates: orders.len(),
            invalid: plan.rejected.len(),
            scheduled: plan.messages.len(),
            sent,
            failed,
            outcomes,
        };

        if report.failed > 0 {
            warn!(sent, failed, "Reminder run finished with delivery failures");
        } else {
            info!(sent, scheduled = report.scheduled, "Reminder run finished");
        }

        Ok(report)
    }

    async fn dispatch(&self, message: &ScheduledMessage, dry_run: bool) -> DispatchOutcome {
        let gateway: &dyn SmsGateway = if dry_run {
            &LogGateway
        } else {
            self.gateway.as_ref()
        };

        info!(
            order_id = %message.order_id,
            applicant_name = %message.applicant_name,
            phone = %message.phone,
            phase = %message.phase,
            day_offset = message.day_offset,
            "Sending reminder"
        );

        let (status, error) = match gateway.send(&message.phone, &message.body).await {
            Ok(()) if dry_run => (DispatchStatus::DryRun, None),
            Ok(()) => {
                debug!(order_id = %message.order_id, "Reminder delivered");
                (DispatchStatus::Sent, None)
            }
            Err(e) => {
                error!(
                    order_id = %message.order_id,
                    phone = %message.phone,
                    error = %e,
                    "Failed to deliver reminder"
                );
                (DispatchStatus::Failed, Some(e.to_string()))
            }
        };

        DispatchOutcome {
            order_id: message.order_id.clone(),
            phone: message.phone.clone(),
            phase: message.phase,
            day_offset: message.day_offset,
            status,
            error,
        }
    }
}

fn count(outcomes: &[DispatchOutcome], status: DispatchStatus) -> usize {
    outcomes.iter().filter(|o| o.status == status).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SmsError;
    use crate::models::{Phase, PENDING_RESERVATION_STATUS};
    use crate::storage::StaticOrderStore;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Records every send; fails for numbers listed in `failing`
    #[derive(Default)]
    struct RecordingGateway {
        sent: Mutex<Vec<(String, String)>>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl SmsGateway for RecordingGateway {
        async fn send(&self, to: &str, text: &str) -> Result<(), SmsError> {
            if self.failing.iter().any(|f| f == to) {
                return Err(SmsError::Rejected {
                    status: 400,
                    body: "invalid recipient".to_string(),
                });
            }
            self.sent.lock().await.push((to.to_string(), text.to_string()));
            Ok(())
        }
    }

    struct FailingStore;

    #[async_trait]
    impl OrderStore for FailingStore {
        async fn pending_reservations(&self) -> Result<Vec<OrderSummary>, StoreError> {
            Err(StoreError::RequestFailed("connection refused".to_string()))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 29).unwrap()
    }

    fn order(id: &str, phone: &str, expected_date: Option<&str>) -> OrderSummary {
        OrderSummary {
            id: id.to_string(),
            status: PENDING_RESERVATION_STATUS.to_string(),
            expected_date: expected_date.map(str::to_string),
            applicant_name: Some(format!("고객{id}")),
            phone: phone.to_string(),
        }
    }

    fn runner(orders: Vec<OrderSummary>, gateway: Arc<RecordingGateway>) -> ReminderRunner {
        ReminderRunner::new(
            RunnerConfig::default(),
            Arc::new(StaticOrderStore::new(orders)),
            gateway,
            MessageTemplates::default(),
        )
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("010-1234-5678"), "01012345678");
        assert_eq!(normalize_phone(" 010 1234 5678 "), "01012345678");
    }

    #[test]
    fn test_filter_recipient() {
        let orders = vec![
            order("1", "010-1111-1111", None),
            order("2", "01022222222", None),
        ];
        assert_eq!(filter_recipient(orders.clone(), None).len(), 2);

        let filtered = filter_recipient(orders, Some("01011111111"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "1");
    }

    #[test]
    fn test_recipient_without_digits_matches_nothing() {
        let orders = vec![order("1", "", None), order("2", "unknown", None)];
        assert!(filter_recipient(orders.clone(), Some("abc")).is_empty());
        assert!(filter_recipient(orders, Some("")).is_empty());
    }

    #[test]
    fn test_run_options_validate_recipient() {
        assert!(RunOptions::default().validate().is_ok());

        let mut options = RunOptions {
            dry_run: false,
            recipient: Some("010-1234-5678".to_string()),
        };
        assert!(options.validate().is_ok());

        options.recipient = Some("abc".to_string());
        assert!(options.validate().is_err());
        options.recipient = Some(String::new());
        assert!(options.validate().is_err());
    }

    #[tokio::test]
    async fn test_run_sends_due_messages() {
        let gateway = Arc::new(RecordingGateway::default());
        let orders = vec![
            order("1", "01011111111", Some("2026-01-30")),
            order("2", "01022222222", Some("2026-02-10")),
            order("3", "01033333333", Some("2026-01-21")),
            order("4", "01044444444", None),
        ];

        let report = runner(orders, gateway.clone())
            .run(today(), &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(report.candidates, 4);
        assert_eq!(report.scheduled, 2);
        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, 0);
        assert!(report.success());

        let phases: Vec<Phase> = report.outcomes.iter().map(|o| o.phase).collect();
        assert_eq!(phases, vec![Phase::PreDue, Phase::OverdueWeekly]);

        let sent = gateway.sent.lock().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "01011111111");
        assert!(sent[0].1.contains("고객1님"));
    }

    #[tokio::test]
    async fn test_run_dry_run_never_calls_gateway() {
        let gateway = Arc::new(RecordingGateway::default());
        let orders = vec![order("1", "01011111111", Some("2026-01-29"))];
        let options = RunOptions {
            dry_run: true,
            recipient: None,
        };

        let report = runner(orders, gateway.clone()).run(today(), &options).await.unwrap();

        assert!(report.dry_run);
        assert_eq!(report.scheduled, 1);
        assert_eq!(report.sent, 0);
        assert_eq!(report.outcomes[0].status, DispatchStatus::DryRun);
        assert!(gateway.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_run_continues_after_delivery_failure() {
        let gateway = Arc::new(RecordingGateway {
            failing: vec!["01011111111".to_string()],
            ..Default::default()
        });
        let orders = vec![
            order("1", "01011111111", Some("2026-01-28")),
            order("2", "01022222222", Some("2026-01-27")),
        ];

        let report = runner(orders, gateway.clone())
            .run(today(), &RunOptions::default())
            .await
            .unwrap();

        assert_eq!(report.sent, 1);
        assert_eq!(report.failed, 1);
        assert!(!report.success());
        assert_eq!(report.outcomes[0].status, DispatchStatus::Failed);
        assert!(report.outcomes[0].error.as_deref().unwrap().contains("invalid recipient"));
        assert_eq!(gateway.sent.lock().await[0].0, "01022222222");
    }

    #[tokio::test]
    async fn test_run_counts_invalid_dates() {
        let gateway = Arc::new(RecordingGateway::default());
        let orders = vec![
            order("1", "01011111111", Some("29-01-2026")),
            order("2", "01022222222", Some("2026-01-29")),
        ];

        let report = runner(orders, gateway).run(today(), &RunOptions::default()).await.unwrap();

        assert_eq!(report.invalid, 1);
        assert_eq!(report.sent, 1);
    }

    #[tokio::test]
    async fn test_run_applies_recipient_filter() {
        let gateway = Arc::new(RecordingGateway::default());
        let orders = vec![
            order("1", "010-1111-1111", Some("2026-01-29")),
            order("2", "01022222222", Some("2026-01-29")),
        ];
        let options = RunOptions {
            dry_run: false,
            recipient: Some("01011111111".to_string()),
        };

        let report = runner(orders, gateway.clone()).run(today(), &options).await.unwrap();

        assert_eq!(report.candidates, 1);
        assert_eq!(report.sent, 1);
        assert_eq!(gateway.sent.lock().await[0].0, "010-1111-1111");
    }

    #[tokio::test]
    async fn test_run_with_concurrent_sends_keeps_order() {
        let gateway = Arc::new(RecordingGateway::default());
        let orders: Vec<_> = (1..=5)
            .map(|i| order(&i.to_string(), &format!("0100000000{i}"), Some("2026-01-29")))
            .collect();
        let runner = ReminderRunner::new(
            RunnerConfig {
                max_concurrent_sends: 3,
            },
            Arc::new(StaticOrderStore::new(orders)),
            gateway.clone(),
            MessageTemplates::default(),
        );

        let report = runner.run(today(), &RunOptions::default()).await.unwrap();

        let ids: Vec<_> = report.outcomes.iter().map(|o| o.order_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
        assert_eq!(gateway.sent.lock().await.len(), 5);
    }

    #[tokio::test]
    async fn test_run_fails_when_store_fails() {
        let runner = ReminderRunner::new(
            RunnerConfig::default(),
            Arc::new(FailingStore),
            Arc::new(RecordingGateway::default()),
            MessageTemplates::default(),
        );

        assert!(matches!(
            runner.run(today(), &RunOptions::default()).await,
            Err(StoreError::RequestFailed(_))
        ));
    }
}
