//! Domain model for the appointment pipeline.
//!
//! # Responsibility
//! - Define the request (`RawObservation`) and result (`ParsedAppointment`)
//!   shapes shared by extractors, assembler and encoder.
//!
//! # Invariants
//! - Both shapes are immutable once built.
//! - A schedule always spans exactly one hour.

pub mod appointment;
