//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate extractors into the appointment use-case.
//! - Keep FFI/CLI layers decoupled from extractor details.

pub mod assembler;
