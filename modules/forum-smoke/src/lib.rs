//! Manual smoke tests for a running forum server and its mail settings.

pub mod email;
pub mod http;

pub use email::{Mailer, SmtpMailer, TestMessage};
pub use http::{Check, CheckOutcome, CheckResult, SmokeClient, SmokeReport};
