//! Flutter-facing bridge for the Notecards core.

pub mod api;
