//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate note store calls into UI-facing transitions.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod editor;
