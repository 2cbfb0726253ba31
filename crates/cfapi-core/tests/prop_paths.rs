//! Property-based tests for the path builder and registry listing
//!
//! These tests verify invariants that should hold for any endpoint table
//! and any combination of caller identifiers.

use cfapi_core::http::RequestBuilder;
use cfapi_core::{AuthMode, Error, EndpointRegistry, PathParts, Verb};
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashSet};

const BASE: &str = "https://api.example.test/client/v4";

// Strategy functions for property testing

fn segment_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,11}"
}

fn identifier_strategy() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[0-9a-f]{8,32}")
}

fn verb_strategy() -> impl Strategy<Value = Verb> {
    prop_oneof![
        Just(Verb::Get),
        Just(Verb::Post),
        Just(Verb::Put),
        Just(Verb::Delete),
        Just(Verb::Patch),
    ]
}

fn mode_strategy() -> impl Strategy<Value = AuthMode> {
    prop_oneof![
        Just(AuthMode::None),
        Just(AuthMode::Open),
        Just(AuthMode::Key),
        Just(AuthMode::Cert),
        Just(AuthMode::Bearer),
        Just(AuthMode::Void),
    ]
}

/// Two-level endpoint tables: top-level resources with sub-resources
fn table_strategy() -> impl Strategy<Value = BTreeMap<String, (AuthMode, BTreeMap<String, AuthMode>)>> {
    proptest::collection::btree_map(
        "[a-zA-Z0-9_]{1,6}",
        (
            mode_strategy(),
            proptest::collection::btree_map("[a-zA-Z0-9_]{1,6}", mode_strategy(), 0..4),
        ),
        1..6,
    )
}

proptest! {
    #[test]
    fn prop_sub_resource_requires_identifier1(
        p0 in segment_strategy(),
        p1 in segment_strategy(),
        p2 in proptest::option::of(segment_strategy()),
        id1 in identifier_strategy(),
        id2 in identifier_strategy(),
        id3 in identifier_strategy(),
        verb in verb_strategy(),
        has_payload in any::<bool>(),
    ) {
        let builder = RequestBuilder::new(BASE).unwrap();
        let parts = PathParts::new(&p0, Some(&p1), p2.as_deref());
        let ids = [id1.clone(), id2.clone(), id3.clone()];

        match builder.build_url(&parts, &ids, verb, has_payload) {
            Ok(url) => {
                let id1 = id1.expect("URL built without identifier1");
                let prefix = format!("{}/{}/{}/{}", BASE, p0, id1, p1);
                prop_assert!(url.starts_with(&prefix));
                if let Some(id2) = id2 {
                    let expected = format!("{}/{}", prefix, id2);
                    prop_assert!(url.starts_with(&expected));
                }
                if let Some(id3) = id3 {
                    let expected_suffix = format!("/{}", id3);
                    prop_assert!(url.ends_with(&expected_suffix));
                }
            }
            Err(err) => {
                prop_assert!(id1.is_none());
                let is_configuration = matches!(err, Error::Configuration { .. });
                prop_assert!(is_configuration);
            }
        }
    }

    #[test]
    fn prop_collection_urls_never_fail_without_body(
        p0 in segment_strategy(),
        id1 in identifier_strategy(),
        verb in verb_strategy(),
    ) {
        let builder = RequestBuilder::new(BASE).unwrap();
        let parts = PathParts::new(&p0, None, None);
        let url = builder.build_url(&parts, &[id1.clone(), None, None], verb, false).unwrap();

        let expected = match id1 {
            Some(id1) => format!("{}/{}/{}", BASE, p0, id1),
            None => format!("{}/{}", BASE, p0),
        };
        prop_assert_eq!(url, expected);
    }

    #[test]
    fn prop_hyphenated_names_are_rejected(
        name in "[a-z]{1,4}-[a-z]{1,4}",
    ) {
        let mut registry = EndpointRegistry::new();
        prop_assert!(registry.register(&name, &name, None, None, AuthMode::Key).is_err());
        prop_assert!(registry.is_empty());
    }

    #[test]
    fn prop_listing_is_ordered_unique_and_prefix_closed(table in table_strategy()) {
        let mut registry = EndpointRegistry::new();
        let mut callable = HashSet::new();

        for (top, (mode, children)) in &table {
            registry.add(*mode, top, None, None).unwrap();
            if mode.is_callable() {
                callable.insert(format!("/{}", top));
            }
            for (child, child_mode) in children {
                registry.add(*child_mode, top, Some(child), None).unwrap();
                if child_mode.is_callable() {
                    callable.insert(format!("/{}/{}", top, child));
                }
            }
        }

        let listed: Vec<String> = registry.list().collect();

        // exactly the callable nodes, once each
        let unique: BTreeSet<&String> = listed.iter().collect();
        prop_assert_eq!(unique.len(), listed.len());
        prop_assert_eq!(listed.iter().cloned().collect::<HashSet<_>>(), callable);

        // lexical order, parents before children
        let mut sorted = listed.clone();
        sorted.sort();
        prop_assert_eq!(&listed, &sorted);
        for (idx, path) in listed.iter().enumerate() {
            for earlier in &listed[idx + 1..] {
                let earlier_prefix = format!("{}/", earlier);
                prop_assert!(!path.starts_with(&earlier_prefix));
            }
        }

        // a second walk yields the same sequence
        prop_assert_eq!(registry.list().collect::<Vec<_>>(), listed);
    }
}
