// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use serde_json::json;

fn recorder(listeners: &Listeners, tag: &'static str, log: &Arc<Mutex<Vec<String>>>) -> ListenerId {
    let log = Arc::clone(log);
    listeners.add(move |message| {
        log.lock().push(format!("{tag}:{}", message["type"]));
    })
}

#[test]
fn dispatch_runs_listeners_in_registration_order() {
    let listeners = Listeners::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    recorder(&listeners, "a", &log);
    recorder(&listeners, "b", &log);

    listeners.dispatch(&json!({ "type": "alert" }));

    assert_eq!(*log.lock(), vec![r#"a:"alert""#, r#"b:"alert""#]);
}

#[test]
fn panicking_listener_does_not_stop_the_rest() {
    let listeners = Listeners::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    listeners.add(|_| panic!("listener bug"));
    recorder(&listeners, "after", &log);

    let panicked = listeners.dispatch(&json!({ "type": "alert" }));

    assert_eq!(panicked, 1);
    assert_eq!(log.lock().len(), 1);
}

#[test]
fn removed_listener_is_not_called() {
    let listeners = Listeners::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let a = recorder(&listeners, "a", &log);
    recorder(&listeners, "b", &log);

    assert!(listeners.remove(a));
    assert!(!listeners.remove(a));
    listeners.dispatch(&json!({ "type": "x" }));

    assert_eq!(*log.lock(), vec![r#"b:"x""#]);
    assert_eq!(listeners.len(), 1);
}

#[test]
fn malformed_text_is_rejected_without_dispatch() {
    let listeners = Listeners::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    recorder(&listeners, "a", &log);

    assert!(listeners.dispatch_text("{not json").is_err());
    assert!(log.lock().is_empty());

    assert_eq!(listeners.dispatch_text(r#"{"type":"drill"}"#).unwrap(), 0);
    assert_eq!(log.lock().len(), 1);
}

#[test]
fn listener_may_remove_itself_during_dispatch() {
    let listeners = Arc::new(Listeners::new());
    let slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

    let own_set = Arc::clone(&listeners);
    let own_id = Arc::clone(&slot);
    let id = listeners.add(move |_| {
        if let Some(id) = *own_id.lock() {
            own_set.remove(id);
        }
    });
    *slot.lock() = Some(id);

    listeners.dispatch(&json!({}));
    assert!(listeners.is_empty());
}
