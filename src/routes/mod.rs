//! Router Module Index
//!
//! Splits the routes by access level. Authentication is applied to a whole
//! module through an Axum layer, so a route cannot be exposed by accident.

/// Routes accessible to anonymous callers (read-only).
pub mod public;

/// Routes protected by the `Principal` extractor middleware.
pub mod authenticated;
