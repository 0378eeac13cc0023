//! Data-fixing procedures against an LMS REST API.
//!
//! Every procedure follows the same shape: load rows from an input file,
//! call a handful of remote endpoints per row through [`LmsApi`], and report
//! each outcome through an injected [`Reporter`]. Remote failures are
//! isolated to the row that caused them; configuration and input errors
//! abort before any remote call is made.

pub mod backup;
pub mod client;
pub mod config;
pub mod decision;
pub mod enroll;
pub mod error;
pub mod input;
pub mod io;
pub mod rename;
pub mod report;
pub mod restore;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{HttpClient, LmsApi, Records};
pub use config::Config;
pub use decision::{decide, Decision, Filter};
pub use error::{LmsError, Result};
pub use report::{MemoryReporter, Reporter, TracingReporter};
pub use restore::{RestoreOptions, Restorer};
