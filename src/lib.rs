//! Arogya: multi-modal patient intake normalization.
//!
//! Free text, spoken audio and photographed documents are merged into one
//! canonical text, from which named medical entities and a problem category
//! are derived and handed to an intake store.

#![forbid(unsafe_code)]

pub mod adapters;
pub mod app;
pub mod commands;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use app::{AppController, Capabilities, IntakeReceipt};
pub use commands::{process_intake, CommandError, ErrorStatus, IntakeRequest, IntakeResponse};
pub use domain::{AppConfig, DomainError, IntakeRecord, IntakeSubmission, MediaBlob};
