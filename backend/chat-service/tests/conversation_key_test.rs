use chat_service::models::conversation::{
    direct_chat_id, group_chat_id, normalize_id, parse_chat_id, ChatTarget,
};
use uuid::Uuid;

#[test]
fn key_is_symmetric_for_every_pair() {
    let ids = [
        "alice@example.com",
        "bob@example.com",
        "carol@example.com",
        "Dave@Example.com",
        "z@z.z",
    ];
    for a in &ids {
        for b in &ids {
            assert_eq!(
                direct_chat_id(a, b),
                direct_chat_id(b, a),
                "key({a}, {b}) must equal key({b}, {a})"
            );
        }
    }
}

#[test]
fn canonical_direct_key_for_alice_and_bob() {
    assert_eq!(
        direct_chat_id("alice@example.com", "bob@example.com"),
        "DIRECT#alice@example.com#bob@example.com"
    );
    // Reversed arguments and mixed case resolve to the same stream
    assert_eq!(
        direct_chat_id("Bob@Example.com", "ALICE@example.com"),
        "DIRECT#alice@example.com#bob@example.com"
    );
}

#[test]
fn group_key_wraps_the_group_id() {
    let id = Uuid::new_v4();
    let key = group_chat_id(id);
    assert_eq!(key, format!("GROUP#{id}"));

    match parse_chat_id(&key).unwrap() {
        ChatTarget::Group(parsed) => assert_eq!(parsed, id),
        other => panic!("expected group target, got {other:?}"),
    }
}

#[test]
fn direct_key_round_trips_through_parse() {
    let key = direct_chat_id("alice@example.com", "bob@example.com");
    match parse_chat_id(&key).unwrap() {
        ChatTarget::Direct { a, b } => {
            assert_eq!(a, "alice@example.com");
            assert_eq!(b, "bob@example.com");
        }
        other => panic!("expected direct target, got {other:?}"),
    }
}

#[test]
fn ingestion_and_query_paths_share_one_derivation() {
    // The same function backs both paths, so a key derived from either
    // direction of a pair always selects the same history.
    let send_side = direct_chat_id("bob@example.com", "alice@example.com");
    let query_side = direct_chat_id("alice@example.com", "bob@example.com");
    assert_eq!(send_side, query_side);
}

#[test]
fn identifiers_normalize_at_the_boundary() {
    assert_eq!(normalize_id("  MiXeD@Case.Org "), "mixed@case.org");
}
