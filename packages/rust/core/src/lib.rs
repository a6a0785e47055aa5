//! Daily pipeline orchestration for Daily Bread.
//!
//! Ties the schedule lookup, passage fetchers, and Discord delivery together
//! into one run per invocation (see [`pipeline::DailyPost`]).

pub mod pipeline;

pub use pipeline::{DailyPost, Delivery, RunOutcome};
