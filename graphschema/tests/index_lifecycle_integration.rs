// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Graph index lifecycle driven through management transactions

#[path = "testutils/mod.rs"]
mod testutils;

use graphschema::index::{transition, Transition};
use graphschema::{ErrorKind, IndexStatus, JobState, SchemaAction};
use std::sync::Arc;
use testutils::maintainers::{FlakyMaintainer, GatedMaintainer};
use testutils::schema_fixture::{SchemaFixture, BACKFILL_TIMEOUT};

#[test]
fn test_every_state_action_pair() {
    for status in IndexStatus::ALL {
        for action in SchemaAction::ALL {
            let fixture = SchemaFixture::new().with_social_schema();
            fixture.index_in("by_name", status);
            let before = fixture.graph_index("by_name").unwrap();

            let result = fixture.apply("by_name", action);
            let after = fixture.graph_index("by_name");

            match transition(status, action) {
                None => {
                    let err = result.unwrap_err();
                    assert_eq!(err.kind(), ErrorKind::IndexState, "{} on {}", action, status);
                    assert_eq!(after.unwrap().status(), status);
                }
                Some(Transition::NoOp) => {
                    result.unwrap();
                    let after = after.unwrap();
                    assert_eq!(after.status(), status);
                    assert_eq!(after.generation(), before.generation());
                }
                Some(Transition::Apply(next)) => {
                    result.unwrap();
                    assert_eq!(after.unwrap().status(), next, "{} on {}", action, status);
                }
                Some(Transition::Remove) => {
                    result.unwrap();
                    assert!(after.is_none());
                }
            }
        }
    }
}

#[test]
fn test_register_is_idempotent() {
    let fixture = SchemaFixture::new().with_social_schema();
    fixture.index_in("by_name", IndexStatus::Registered);
    let generation = fixture.graph_index("by_name").unwrap().generation();

    fixture.apply("by_name", SchemaAction::RegisterIndex).unwrap();
    fixture.apply("by_name", SchemaAction::RegisterIndex).unwrap();

    let index = fixture.graph_index("by_name").unwrap();
    assert_eq!(index.status(), IndexStatus::Registered);
    assert_eq!(index.generation(), generation);
}

#[test]
fn test_enable_waits_for_backfill() {
    let gate = Arc::new(GatedMaintainer::default());
    let fixture = SchemaFixture::with_maintainer(gate.clone()).with_social_schema();
    fixture.install_mixed_index("by_name");
    fixture.apply("by_name", SchemaAction::RegisterIndex).unwrap();

    let err = fixture
        .apply("by_name", SchemaAction::EnableIndex)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IndexState);
    assert_eq!(fixture.status("by_name"), Some(IndexStatus::Registered));

    gate.open();
    let record = fixture
        .registry
        .await_backfill("by_name", BACKFILL_TIMEOUT)
        .unwrap();
    assert_eq!(record.state, JobState::Completed { elements: 42 });

    fixture.apply("by_name", SchemaAction::EnableIndex).unwrap();
    assert_eq!(fixture.status("by_name"), Some(IndexStatus::Enabled));
}

#[test]
fn test_register_and_enable_in_one_transaction_fails() {
    let fixture = SchemaFixture::new().with_social_schema();
    fixture.install_mixed_index("by_name");

    let mut tx = fixture.registry.open_management();
    let index = tx.get_graph_index("by_name").unwrap().unwrap();
    tx.update_index(&index, SchemaAction::RegisterIndex).unwrap();
    assert_eq!(
        tx.get_graph_index("by_name").unwrap().unwrap().status(),
        IndexStatus::Registered
    );
    let err = tx
        .update_index(&index, SchemaAction::EnableIndex)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IndexState);
}

#[test]
fn test_reindex_requires_new_backfill() {
    let gate = Arc::new(GatedMaintainer::default());
    let fixture = SchemaFixture::with_maintainer(gate.clone()).with_social_schema();
    fixture.install_mixed_index("by_name");
    gate.open();
    fixture.apply("by_name", SchemaAction::RegisterIndex).unwrap();
    fixture.await_backfill("by_name");
    fixture.apply("by_name", SchemaAction::EnableIndex).unwrap();
    let first = fixture.graph_index("by_name").unwrap().generation();

    fixture.apply("by_name", SchemaAction::Reindex).unwrap();
    let index = fixture.graph_index("by_name").unwrap();
    assert_eq!(index.status(), IndexStatus::Registered);
    assert_eq!(index.generation(), first + 1);

    fixture.await_backfill("by_name");
    fixture.apply("by_name", SchemaAction::EnableIndex).unwrap();
    assert_eq!(fixture.status("by_name"), Some(IndexStatus::Enabled));
}

#[test]
fn test_failed_backfill_is_redriven_by_register() {
    let maintainer = Arc::new(FlakyMaintainer::failing(1));
    let fixture = SchemaFixture::with_maintainer(maintainer.clone()).with_social_schema();
    fixture.install_mixed_index("by_name");
    fixture.apply("by_name", SchemaAction::RegisterIndex).unwrap();

    let record = fixture
        .registry
        .await_backfill("by_name", BACKFILL_TIMEOUT)
        .unwrap();
    assert!(matches!(record.state, JobState::Failed { .. }));
    assert!(fixture.apply("by_name", SchemaAction::EnableIndex).is_err());

    fixture.apply("by_name", SchemaAction::RegisterIndex).unwrap();
    fixture.await_backfill("by_name");
    assert_eq!(maintainer.attempts(), 2);
    fixture.apply("by_name", SchemaAction::EnableIndex).unwrap();
}

#[test]
fn test_remove_releases_name_and_storage() {
    let gate = Arc::new(GatedMaintainer::default());
    gate.open();
    let fixture = SchemaFixture::with_maintainer(gate.clone()).with_social_schema();
    fixture.install_mixed_index("by_name");
    fixture.apply("by_name", SchemaAction::DisableIndex).unwrap_err();
    fixture.apply("by_name", SchemaAction::RegisterIndex).unwrap();
    fixture.apply("by_name", SchemaAction::DisableIndex).unwrap();

    let mut tx = fixture.registry.open_management();
    let index = tx.get_graph_index("by_name").unwrap().unwrap();
    tx.update_index(&index, SchemaAction::RemoveIndex).unwrap();
    assert!(!tx.contains_graph_index("by_name").unwrap());
    tx.update_index(&index, SchemaAction::RemoveIndex).unwrap();
    tx.commit().unwrap();

    assert!(fixture.graph_index("by_name").is_none());
    fixture.install_mixed_index("by_name");

    let deadline = std::time::Instant::now() + BACKFILL_TIMEOUT;
    while gate.released() == 0 && std::time::Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert_eq!(gate.released(), 1);
}

#[test]
fn test_relation_index_actions() {
    let fixture = SchemaFixture::new().with_social_schema();
    let mut tx = fixture.registry.open_management();
    let knows = tx.get_edge_label("knows").unwrap().unwrap();
    let age = tx.get_property_key("age").unwrap().unwrap();
    let index = tx
        .create_edge_index(
            &knows,
            "knows_by_age",
            graphschema::Direction::Both,
            &[graphschema::RelationType::from(&age)],
        )
        .unwrap();
    tx.commit().unwrap();

    let mut tx = fixture.registry.open_management();
    assert_eq!(index.status(), IndexStatus::Enabled);
    tx.update_index(&index, SchemaAction::EnableIndex).unwrap();
    tx.update_index(&index, SchemaAction::Reindex).unwrap();
    for action in [
        SchemaAction::RegisterIndex,
        SchemaAction::DisableIndex,
        SchemaAction::RemoveIndex,
    ] {
        let err = tx.update_index(&index, action).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexState);
    }
    let summary = tx.commit().unwrap();
    assert_eq!(summary.jobs, 1);
}

#[test]
fn test_renamed_index_tracks_concurrent_status_change() {
    let fixture = SchemaFixture::new().with_social_schema();
    fixture.index_in("by_name", IndexStatus::Enabled);

    let mut first = fixture.registry.open_management();
    let index = first.get_graph_index("by_name").unwrap().unwrap();
    first.change_name(&index, "person_by_name").unwrap();
    let age = first.get_property_key("age").unwrap().unwrap();
    first.add_index_key(&index, &age, Vec::new()).unwrap();

    fixture.apply("by_name", SchemaAction::DisableIndex).unwrap();

    let seen = first.get_graph_index("person_by_name").unwrap().unwrap();
    assert_eq!(seen.status(), IndexStatus::Disabled);
    assert_eq!(seen.keys().len(), 2);
    let err = first
        .update_index(&index, SchemaAction::EnableIndex)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IndexState);

    first.commit().unwrap();
    let index = fixture.graph_index("person_by_name").unwrap();
    assert_eq!(index.status(), IndexStatus::Disabled);
    assert_eq!(index.keys().len(), 2);
}

#[test]
fn test_idempotent_action_fails_after_concurrent_transition() {
    let fixture = SchemaFixture::new().with_social_schema();
    fixture.index_in("by_name", IndexStatus::Enabled);

    let mut first = fixture.registry.open_management();
    let index = first.get_graph_index("by_name").unwrap().unwrap();
    first
        .update_index(&index, SchemaAction::EnableIndex)
        .unwrap();

    fixture.apply("by_name", SchemaAction::DisableIndex).unwrap();

    let err = first.commit().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConcurrentModification);
    assert_eq!(fixture.status("by_name"), Some(IndexStatus::Disabled));
}
