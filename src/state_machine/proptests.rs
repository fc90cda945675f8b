//! Property-based tests for the reducer
//!
//! These tests verify key invariants hold across arbitrary action sequences.

use super::*;
use crate::component::{self, ComponentKind};
use crate::wire::{
    ComponentEnd, ComponentField, ComponentStart, MessageEnd, MessageRole, MessageStart,
    StreamEvent, TextChunk,
};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

const IDS: [&str; 3] = ["m1", "m2", "m3"];

const FIELD_NAMES: [&str; 10] = [
    "name",
    "email",
    "company",
    "profilePicture",
    "title",
    "date",
    "time",
    "status",
    "location",
    "notes",
];

fn initial() -> Arc<ChatState> {
    Arc::new(ChatState::default())
}

fn fold(state: Arc<ChatState>, actions: Vec<ChatAction>) -> Arc<ChatState> {
    actions.into_iter().fold(state, |s, a| reduce(&s, a))
}

fn started(id: &str) -> Arc<ChatState> {
    reduce(
        &initial(),
        ChatAction::event_received(StreamEvent::MessageStart(MessageStart {
            message_id: id.to_string(),
            role: MessageRole::Agent,
        })),
    )
}

fn text_chunk(id: &str, index: u64, chunk: &str) -> ChatAction {
    ChatAction::event_received(StreamEvent::TextChunk(TextChunk {
        message_id: id.to_string(),
        chunk: chunk.to_string(),
        index,
    }))
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_id() -> impl Strategy<Value = String> {
    prop::sample::select(IDS.to_vec()).prop_map(String::from)
}

fn arb_role() -> impl Strategy<Value = MessageRole> {
    prop_oneof![Just(MessageRole::User), Just(MessageRole::Agent)]
}

fn arb_kind() -> impl Strategy<Value = ComponentKind> {
    prop_oneof![Just(ComponentKind::ContactBadge), Just(ComponentKind::CalendarEvent)]
}

fn arb_field_name() -> impl Strategy<Value = String> {
    prop::sample::select(FIELD_NAMES.to_vec()).prop_map(String::from)
}

fn arb_stream_event() -> impl Strategy<Value = StreamEvent> {
    prop_oneof![
        (arb_id(), arb_role()).prop_map(|(message_id, role)| {
            StreamEvent::MessageStart(MessageStart { message_id, role })
        }),
        (arb_id(), "[a-z ]{0,4}", 0u64..6).prop_map(|(message_id, chunk, index)| {
            StreamEvent::TextChunk(TextChunk {
                message_id,
                chunk,
                index,
            })
        }),
        arb_id().prop_map(|message_id| StreamEvent::MessageEnd(MessageEnd { message_id })),
        (arb_id(), arb_kind()).prop_map(|(message_id, component_type)| {
            StreamEvent::ComponentStart(ComponentStart {
                message_id,
                component_type,
            })
        }),
        (arb_id(), arb_field_name(), "[A-Za-z0-9]{0,8}").prop_map(|(message_id, field, value)| {
            StreamEvent::ComponentField(ComponentField {
                message_id,
                field,
                value,
            })
        }),
        arb_id().prop_map(|message_id| StreamEvent::ComponentEnd(ComponentEnd { message_id })),
    ]
}

fn arb_action() -> impl Strategy<Value = ChatAction> {
    prop_oneof![
        8 => arb_stream_event().prop_map(ChatAction::event_received),
        1 => any::<bool>().prop_map(ChatAction::connection_changed),
        1 => "[a-z ]{1,20}".prop_map(|message: String| ChatAction::error_occurred(message)),
        1 => Just(ChatAction::Reset),
    ]
}

fn arb_state() -> impl Strategy<Value = Arc<ChatState>> {
    proptest::collection::vec(arb_action(), 0..40)
        .prop_map(|actions| fold(initial(), actions))
}

/// Chunks plus a permutation of their indices
fn arb_shuffled_chunks() -> impl Strategy<Value = (Vec<String>, Vec<usize>)> {
    proptest::collection::vec("[a-z]{1,4}", 1..12).prop_flat_map(|chunks| {
        let order: Vec<usize> = (0..chunks.len()).collect();
        (Just(chunks), Just(order).prop_shuffle())
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Text is the ascending-index join no matter the arrival order
    #[test]
    fn prop_chunk_arrival_order_irrelevant((chunks, order) in arb_shuffled_chunks()) {
        let actions = order
            .iter()
            .map(|&i| text_chunk("m1", i as u64, &chunks[i]))
            .collect();
        let state = fold(started("m1"), actions);

        prop_assert_eq!(state.messages[0].text_content(), chunks.concat());
    }

    // Repeated indices keep the last value written
    #[test]
    fn prop_duplicate_index_last_write_wins(
        writes in proptest::collection::vec((0u64..5, "[a-z]{1,3}"), 1..20)
    ) {
        let mut expected = BTreeMap::new();
        for (index, chunk) in &writes {
            expected.insert(*index, chunk.clone());
        }
        let actions = writes.iter().map(|(i, c)| text_chunk("m1", *i, c)).collect();
        let state = fold(started("m1"), actions);

        let joined: String = expected.values().cloned().collect();
        prop_assert_eq!(state.messages[0].text_content(), joined);
    }

    // Completeness tracks the set of received names, never the order
    #[test]
    fn prop_completeness_tracks_field_set(
        kind in arb_kind(),
        names in proptest::collection::vec(arb_field_name(), 0..12)
    ) {
        let received: HashSet<&str> = names.iter().map(String::as_str).collect();
        let expected = kind.required_fields().iter().all(|f| received.contains(f));

        prop_assert_eq!(component::is_complete(Some(kind), &names), expected);

        let mut state = reduce(
            &started("m1"),
            ChatAction::event_received(StreamEvent::ComponentStart(ComponentStart {
                message_id: "m1".to_string(),
                component_type: kind,
            })),
        );
        for name in &names {
            state = reduce(
                &state,
                ChatAction::event_received(StreamEvent::ComponentField(ComponentField {
                    message_id: "m1".to_string(),
                    field: name.clone(),
                    value: "v".to_string(),
                })),
            );
        }
        let component = state.messages[0].component.as_ref().unwrap();
        prop_assert_eq!(component.is_complete(), expected);
        prop_assert_eq!(component.fields_received(), names.as_slice());
    }

    // Events for an id that was never started are no-ops
    #[test]
    fn prop_unknown_id_is_noop(state in arb_state(), event in arb_stream_event()) {
        let ghost = "ghost".to_string();
        let event = match event {
            StreamEvent::MessageStart(_) => return Ok(()),
            StreamEvent::TextChunk(e) => {
                StreamEvent::TextChunk(TextChunk { message_id: ghost, ..e })
            }
            StreamEvent::MessageEnd(_) => StreamEvent::MessageEnd(MessageEnd { message_id: ghost }),
            StreamEvent::ComponentStart(e) => {
                StreamEvent::ComponentStart(ComponentStart { message_id: ghost, ..e })
            }
            StreamEvent::ComponentField(e) => {
                StreamEvent::ComponentField(ComponentField { message_id: ghost, ..e })
            }
            StreamEvent::ComponentEnd(_) => {
                StreamEvent::ComponentEnd(ComponentEnd { message_id: ghost })
            }
        };
        let next = reduce(&state, ChatAction::event_received(event));

        prop_assert!(Arc::ptr_eq(&state, &next));
    }

    // Reset always lands on the initial state
    #[test]
    fn prop_reset_is_initial(state in arb_state()) {
        let reset = reduce(&state, ChatAction::Reset);
        prop_assert_eq!(&*reset, &ChatState::default());
    }

    // Connecting clears the error; disconnecting never touches it
    #[test]
    fn prop_connection_changes_and_error(state in arb_state()) {
        let up = reduce(&state, ChatAction::connection_changed(true));
        prop_assert!(up.is_connected);
        prop_assert_eq!(&up.error, &None);

        let down = reduce(&state, ChatAction::connection_changed(false));
        prop_assert!(!down.is_connected);
        prop_assert_eq!(&down.error, &state.error);
    }

    // Message ids stay unique and messages are never dropped outside Reset
    #[test]
    fn prop_ids_unique_and_append_only(actions in proptest::collection::vec(arb_action(), 0..60)) {
        let mut state = initial();
        for action in actions {
            let is_reset = action == ChatAction::Reset;
            let next = reduce(&state, action);

            let ids: HashSet<&str> = next.messages.iter().map(|m| m.id.as_str()).collect();
            prop_assert_eq!(ids.len(), next.messages.len());
            if !is_reset {
                prop_assert!(next.messages.len() >= state.messages.len());
                for (before, after) in state.messages.iter().zip(next.messages.iter()) {
                    prop_assert_eq!(&before.id, &after.id);
                }
            }
            state = next;
        }
    }

    // At most one message is reallocated per action
    #[test]
    fn prop_only_target_message_reallocated(state in arb_state(), event in arb_stream_event()) {
        let target = event.message_id().to_string();
        let next = reduce(&state, ChatAction::event_received(event));

        for (before, after) in state.messages.iter().zip(next.messages.iter()) {
            if before.id != target {
                prop_assert!(Arc::ptr_eq(before, after));
            }
        }
    }

    // Completeness is always consistent with the recorded field names
    #[test]
    fn prop_component_completeness_is_derived(state in arb_state()) {
        for message in &state.messages {
            if let Some(component) = &message.component {
                prop_assert_eq!(
                    component.is_complete(),
                    component::is_complete(Some(component.kind()), component.fields_received())
                );
            }
        }
    }
}
