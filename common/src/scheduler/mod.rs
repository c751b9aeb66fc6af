// Reminder scheduling: pure planning plus the engine that dispatches a plan

pub mod engine;
pub mod planner;
pub mod templates;

pub use engine::{ReminderRunner, RunOptions, RunnerConfig};
pub use planner::{classify, plan_order, plan_reminders, ReminderPlan};
pub use templates::MessageTemplates;
