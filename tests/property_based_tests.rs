mod common;

use common::strategies::*;
use common::{counting_loader, CountingStrategy};
use dload_core::orchestration::classify_requirement_failure;
use dload_core::ErrorKind;
use proptest::prelude::*;
use std::collections::HashSet;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

proptest! {
    /// Property: crossing a requirement boundary never makes a failure look more direct
    #[test]
    fn classification_never_escalates(kind in error_kind_strategy()) {
        let outer = classify_requirement_failure(kind);
        prop_assert!(demotion_rank(outer) >= demotion_rank(kind));
        prop_assert!(matches!(
            outer,
            ErrorKind::NoRequirement | ErrorKind::BadRequirement | ErrorKind::Unknown
        ));
    }

    /// Property: a second boundary does not demote further
    #[test]
    fn classification_is_stable_across_boundaries(kind in error_kind_strategy()) {
        let once = classify_requirement_failure(kind);
        prop_assert_eq!(classify_requirement_failure(once), once);
    }

    /// Property: every distinct URL is fetched exactly once, however often it is requested
    #[test]
    fn each_url_is_fetched_at_most_once(urls in script_urls_strategy()) {
        let strategy = CountingStrategy::succeeding();
        let outcome = runtime().block_on(async {
            let loader = counting_loader(&strategy);
            let first = loader.using(urls.iter());
            let second = loader.using(urls.iter());
            (first.await, second.await)
        });

        prop_assert_eq!(outcome, (Ok(None), Ok(None)));

        let distinct: HashSet<&String> = urls.iter().collect();
        prop_assert_eq!(strategy.calls(), distinct.len());
        for url in distinct {
            prop_assert_eq!(strategy.calls_for(url), 1);
        }
    }
}
