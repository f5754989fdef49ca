//! Flutter-facing bindings for DocScan core.

pub mod api;
