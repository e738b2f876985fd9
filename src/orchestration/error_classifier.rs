//! # Requirement Failure Classification
//!
//! When a requirement's task rejects, the dependent's task rejects too, but
//! with a kind that says "one of my requirements" rather than repeating the
//! inner kind. Each boundary demotes exactly once and never escalates:
//!
//! ```text
//! inner kind       outer kind
//! ─────────────    ──────────────
//! NoRef          ─▶ NoRequirement
//! NoRequirement  ─▶ NoRequirement
//! BadResource    ─▶ BadRequirement
//! BadRequirement ─▶ BadRequirement
//! anything else  ─▶ Unknown
//! ```
//!
//! Failures of a descriptor's own resource lists are not requirement failures
//! and are not passed through here.

use crate::error::ErrorKind;

/// Map a requirement's rejection to the dependent's rejection
pub fn classify_requirement_failure(inner: ErrorKind) -> ErrorKind {
    match inner {
        ErrorKind::NoRef | ErrorKind::NoRequirement => ErrorKind::NoRequirement,
        ErrorKind::BadResource | ErrorKind::BadRequirement => ErrorKind::BadRequirement,
        ErrorKind::NoValue | ErrorKind::Unknown => ErrorKind::Unknown,
    }
}
