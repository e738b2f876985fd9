//! Proptest strategies for loader inputs.

#![allow(dead_code)]

use dload_core::ErrorKind;
use proptest::prelude::*;

/// Any rejection kind
pub fn error_kind_strategy() -> impl Strategy<Value = ErrorKind> {
    prop::sample::select(ErrorKind::ALL.to_vec())
}

/// Script URLs drawn from a small pool so that repeats are common
pub fn script_url_strategy() -> impl Strategy<Value = String> {
    (0u8..6).prop_map(|index| format!("/lib/module-{index}.js"))
}

/// A request list with likely duplicates
pub fn script_urls_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(script_url_strategy(), 0..12)
}

/// How far a kind has been demoted from a direct fetch outcome
pub fn demotion_rank(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::NoValue => 0,
        ErrorKind::NoRef | ErrorKind::BadResource => 1,
        ErrorKind::NoRequirement | ErrorKind::BadRequirement => 2,
        ErrorKind::Unknown => 3,
    }
}
