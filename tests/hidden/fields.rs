//! Per-field rules and the master switches.

use std::collections::BTreeMap;
use std::sync::Arc;

use less_hidden::{schema, t, Error, HiddenOptions, HideRule, Store};
use serde_json::json;

use super::*;

fn is_joe() -> HideRule {
    HideRule::when(|doc, _| doc.get_str("name") == Some("Joe"))
}

// ============================================================================
// Declared rules
// ============================================================================

#[test]
fn no_hidden_fields_returns_everything_declared() {
    let store = Store::new();
    let users = hidden_model(&store, user_schema(t::string()), HiddenOptions::default());
    let user = users.create(average_joe()).unwrap();

    let out = json_of(&user);
    assert_joe_basics(&out);
    assert_eq!(out["password"], json!(PASSWORD));
}

#[test]
fn hidden_field_is_not_returned() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide(true)),
        HiddenOptions::default(),
    );
    let user = users.create(average_joe()).unwrap();

    let out = json_of(&user);
    assert_joe_basics(&out);
    assert_absent(&out, "password");
    assert_absent(&object_of(&user), "password");
}

#[test]
fn default_hidden_metadata_is_not_returned_after_save() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide(true)),
        HiddenOptions::default(),
    );
    let user = saved(&users, average_joe());
    assert_eq!(user.version(), Some(0));

    let out = json_of(&user);
    assert_joe_basics(&out);
    assert_absent(&out, "password");
    assert_absent(&out, KEY_VERSION);
    assert_absent(&out, KEY_ID);
}

#[test]
fn hide_rule_false_has_no_effect() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide(false).hide_object(false).hide_json(false)),
        HiddenOptions::default(),
    );
    let user = saved(&users, average_joe());
    assert_eq!(json_of(&user)["password"], json!(PASSWORD));
    assert_eq!(object_of(&user)["password"], json!(PASSWORD));
}

#[test]
fn hide_json_field_only_hidden_from_json() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide_json(true)),
        HiddenOptions::default(),
    );
    let user = saved(&users, average_joe());

    let obj = object_of(&user);
    assert_joe_basics(&obj);
    assert_eq!(obj["password"], json!(PASSWORD));

    let out = json_of(&user);
    assert_joe_basics(&out);
    assert_absent(&out, "password");
}

#[test]
fn hide_object_field_only_hidden_from_object() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide_object(true)),
        HiddenOptions::default(),
    );
    let user = saved(&users, average_joe());

    let obj = object_of(&user);
    assert_joe_basics(&obj);
    assert_absent(&obj, "password");

    let out = json_of(&user);
    assert_joe_basics(&out);
    assert_eq!(out["password"], json!(PASSWORD));
}

#[test]
fn stored_document_is_untouched() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide(true)),
        HiddenOptions::default(),
    );
    let user = saved(&users, average_joe());
    let _ = json_of(&user);
    let _ = object_of(&user);

    assert_eq!(user.get_str("password"), Some(PASSWORD));
    let stored = users.find_by_id(user.id().unwrap()).unwrap();
    assert_eq!(stored.get_str("password"), Some(PASSWORD));
    assert_eq!(stored.version(), Some(0));
}

// ============================================================================
// Master switches
// ============================================================================

#[test]
fn hide_off_shows_everything() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide(true)),
        HiddenOptions::new().hide(false),
    );
    let user = saved(&users, average_joe());

    for out in [json_of(&user), object_of(&user)] {
        assert_joe_basics(&out);
        assert_eq!(out["password"], json!(PASSWORD));
        assert_present(&out, KEY_VERSION);
        assert_present(&out, KEY_ID);
    }
}

#[test]
fn hide_json_off_shows_everything_in_json_only() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide(true)),
        HiddenOptions::new().hide_json(false),
    );
    let user = saved(&users, average_joe());

    let out = json_of(&user);
    assert_joe_basics(&out);
    assert_eq!(out["password"], json!(PASSWORD));
    assert_present(&out, KEY_VERSION);
    assert_present(&out, KEY_ID);

    let obj = object_of(&user);
    assert_joe_basics(&obj);
    assert_absent(&obj, "password");
    assert_absent(&obj, KEY_VERSION);
    assert_absent(&obj, KEY_ID);
}

#[test]
fn hide_object_off_shows_everything_in_object_only() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide(true)),
        HiddenOptions::new().hide_object(false),
    );
    let user = saved(&users, average_joe());

    let obj = object_of(&user);
    assert_joe_basics(&obj);
    assert_eq!(obj["password"], json!(PASSWORD));
    assert_present(&obj, KEY_VERSION);
    assert_present(&obj, KEY_ID);

    let out = json_of(&user);
    assert_joe_basics(&out);
    assert_absent(&out, "password");
    assert_absent(&out, KEY_VERSION);
    assert_absent(&out, KEY_ID);
}

// ============================================================================
// Predicates
// ============================================================================

#[test]
fn predicate_hides_for_matching_documents_in_both_outputs() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide(is_joe())),
        HiddenOptions::default(),
    );

    let joe = users.create(average_joe()).unwrap();
    let out = json_of(&joe);
    assert_joe_basics(&out);
    assert_absent(&out, "password");
    assert_absent(&object_of(&joe), "password");

    let marie = users.create(average_marie()).unwrap();
    let out = json_of(&marie);
    assert_eq!(out["name"], json!("Marie"));
    assert_eq!(out["email"], json!("marie@example.com"));
    assert_eq!(out["password"], json!(PASSWORD));
    assert_eq!(object_of(&marie)["password"], json!(PASSWORD));
}

#[test]
fn predicate_on_json_path_only() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide_json(is_joe())),
        HiddenOptions::default(),
    );

    let joe = users.create(average_joe()).unwrap();
    assert_absent(&json_of(&joe), "password");
    assert_eq!(object_of(&joe)["password"], json!(PASSWORD));

    let marie = users.create(average_marie()).unwrap();
    assert_eq!(json_of(&marie)["password"], json!(PASSWORD));
    assert_eq!(object_of(&marie)["password"], json!(PASSWORD));
}

#[test]
fn predicate_on_object_path_only() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide_object(is_joe())),
        HiddenOptions::default(),
    );

    let joe = users.create(average_joe()).unwrap();
    assert_eq!(json_of(&joe)["password"], json!(PASSWORD));
    assert_absent(&object_of(&joe), "password");

    let marie = users.create(average_marie()).unwrap();
    assert_eq!(json_of(&marie)["password"], json!(PASSWORD));
    assert_eq!(object_of(&marie)["password"], json!(PASSWORD));
}

#[test]
fn predicate_sees_output_in_progress() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide(HideRule::when(|_, ret| ret.contains_key("email")))),
        HiddenOptions::default(),
    );
    let user = users.create(average_joe()).unwrap();
    assert_absent(&json_of(&user), "password");

    let user = users.create(json!({ "name": "Anon", "password": PASSWORD })).unwrap();
    assert_eq!(json_of(&user)["password"], json!(PASSWORD));
}

#[test]
fn failing_predicate_fails_the_call() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide_json(HideRule::try_when(|doc, _| {
            match doc.get_str("name") {
                Some("Joe") => Err("cannot decide for Joe".into()),
                _ => Ok(false),
            }
        }))),
        HiddenOptions::default(),
    );

    let joe = users.create(average_joe()).unwrap();
    match joe.to_json() {
        Err(Error::Predicate { path, .. }) => assert_eq!(path, "password"),
        other => panic!("expected predicate error, got {other:?}"),
    }
    // the object path has no predicate
    assert_eq!(object_of(&joe)["password"], json!(PASSWORD));

    let marie = users.create(average_marie()).unwrap();
    assert_eq!(json_of(&marie)["password"], json!(PASSWORD));
}

// ============================================================================
// Nested paths
// ============================================================================

#[test]
fn nested_field_hidden_inside_parent() {
    let mut address = BTreeMap::new();
    address.insert("street".to_string(), t::string().hide(true));
    address.insert("city".to_string(), t::string());

    let s = schema()
        .field("name", t::string())
        .field("address", t::object(address))
        .build()
        .unwrap();
    let store = Store::new();
    let users = hidden_model(&store, s, HiddenOptions::default());
    let user = users
        .create(json!({ "name": "Joe", "address": { "street": "Main St", "city": "Oslo" } }))
        .unwrap();

    let out = json_of(&user);
    assert_eq!(out["address"], json!({ "city": "Oslo" }));
    assert_eq!(user.get_str("address.street"), Some("Main St"));
}

#[test]
fn hidden_object_field_removes_whole_subtree() {
    let mut address = BTreeMap::new();
    address.insert("city".to_string(), t::string());

    let s = schema()
        .field("name", t::string())
        .field("address", t::object(address).hide_object(true))
        .build()
        .unwrap();
    let store = Store::new();
    let users = hidden_model(&store, s, HiddenOptions::default());
    let user = users
        .create(json!({ "name": "Joe", "address": { "city": "Oslo" } }))
        .unwrap();

    assert_absent(&object_of(&user), "address");
    assert_eq!(json_of(&user)["address"]["city"], json!("Oslo"));
}

// ============================================================================
// Sharing
// ============================================================================

#[test]
fn rules_are_shared_across_threads() {
    let store = Store::new();
    let users = hidden_model(
        &store,
        user_schema(t::string().hide(is_joe())),
        HiddenOptions::default(),
    );
    let joe = Arc::new(users.create(average_joe()).unwrap());
    let marie = Arc::new(users.create(average_marie()).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let doc = if i % 2 == 0 {
                Arc::clone(&joe)
            } else {
                Arc::clone(&marie)
            };
            std::thread::spawn(move || doc.to_json().unwrap().get("password").is_some())
        })
        .collect();
    let shown: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(shown, vec![false, true, false, true]);
}
