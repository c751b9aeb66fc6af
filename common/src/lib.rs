// Common library for the reminder job: planning, order store and SMS clients

pub mod config;
pub mod errors;
pub mod models;
pub mod schedule;
pub mod scheduler;
pub mod sms;
pub mod storage;
pub mod telemetry;
