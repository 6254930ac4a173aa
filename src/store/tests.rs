use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::catalog::Track;
use crate::persist::{KeyValueStore, MemoryStore, QUEUE_STORAGE_KEY};

fn t(id: &str) -> Track {
    Track {
        id: id.into(),
        title: id.to_uppercase(),
        artist: "Artist".into(),
        album_name: String::new(),
        duration_seconds: 120,
        image_url: String::new(),
        audio_url: format!("https://cdn.example/{id}.mp4"),
    }
}

fn abc() -> Vec<Track> {
    vec![t("a"), t("b"), t("c")]
}

fn new_store() -> (PlayerStore, MemoryStore) {
    let kv = MemoryStore::default();
    let store = PlayerStore::new(QueuePersistence::new(Arc::new(kv.clone())));
    (store, kv)
}

fn ids(store: &PlayerStore) -> Vec<&str> {
    store.state().queue().iter().map(|t| t.id.as_str()).collect()
}

fn persisted(store: &PlayerStore, kv: &MemoryStore) -> serde_json::Value {
    store.flush_persistence();
    let raw = kv.get(QUEUE_STORAGE_KEY).unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn starts_empty() {
    let (store, _) = new_store();
    let s = store.state();
    assert!(s.queue().is_empty());
    assert_eq!(s.current_index(), None);
    assert!(s.current_track().is_none());
    assert!(!s.is_playing());
}

#[test]
fn set_queue_installs_tracks_and_plays() {
    for i in 0..3 {
        let (mut store, _) = new_store();
        store.set_queue(abc(), i);
        let s = store.state();
        assert_eq!(s.current_index(), Some(i));
        assert_eq!(s.current_track(), Some(&abc()[i]));
        assert!(s.is_playing());
    }
}

#[test]
fn set_queue_empty_clears_everything() {
    let (mut store, kv) = new_store();
    store.set_queue(abc(), 1);
    store.set_queue(Vec::new(), 2);

    let s = store.state();
    assert!(s.queue().is_empty());
    assert_eq!(s.current_index(), None);
    assert!(s.current_track().is_none());
    assert!(!s.is_playing());
    assert_eq!(persisted(&store, &kv)["currentIndex"], -1);
}

#[test]
fn set_queue_out_of_range_index_leaves_no_current_track() {
    let (mut store, _) = new_store();
    store.set_queue(abc(), 9);
    assert_eq!(store.state().current_index(), Some(9));
    assert!(store.state().current_track().is_none());
}

#[test]
fn set_queue_persists_snapshot() {
    let (mut store, kv) = new_store();
    store.set_queue(abc(), 2);
    let v = persisted(&store, &kv);
    assert_eq!(v["currentIndex"], 2);
    assert_eq!(v["queue"].as_array().unwrap().len(), 3);
}

#[test]
fn play_track_at_index_moves_and_ignores_out_of_range() {
    let (mut store, kv) = new_store();
    store.set_queue(abc(), 0);
    store.pause();

    store.play_track_at_index(2);
    assert_eq!(store.state().current_index(), Some(2));
    assert!(store.state().is_playing());
    assert_eq!(persisted(&store, &kv)["currentIndex"], 2);

    store.pause();
    store.play_track_at_index(3);
    assert_eq!(store.state().current_index(), Some(2));
    assert!(!store.state().is_playing());
}

#[test]
fn play_and_pause_only_flip_intent() {
    let (mut store, _) = new_store();
    store.play();
    assert!(store.state().is_playing());
    assert!(store.state().queue().is_empty());
    store.pause();
    assert!(!store.state().is_playing());
    store.toggle_play();
    assert!(store.state().is_playing());
}

#[test]
fn next_then_previous_returns_to_same_track_with_position_reset() {
    let (mut store, _) = new_store();
    store.set_queue(vec![t("a"), t("b"), t("c"), t("d")], 1);
    store.set_progress(Duration::from_secs(42), Duration::from_secs(120));

    store.next();
    assert_eq!(store.state().current_index(), Some(2));
    assert_eq!(store.state().position(), Duration::ZERO);

    store.set_progress(Duration::from_secs(7), Duration::from_secs(90));
    store.previous();
    assert_eq!(store.state().current_index(), Some(1));
    assert_eq!(store.state().current_track(), Some(&t("b")));
    assert_eq!(store.state().position(), Duration::ZERO);
}

#[test]
fn next_at_last_index_is_a_noop() {
    let (mut store, _) = new_store();
    store.set_queue(abc(), 2);
    store.pause();
    store.set_progress(Duration::from_secs(5), Duration::from_secs(120));

    store.next();
    let s = store.state();
    assert_eq!(s.current_index(), Some(2));
    assert!(!s.is_playing());
    assert_eq!(s.position(), Duration::from_secs(5));
}

#[test]
fn previous_at_first_index_is_a_noop() {
    let (mut store, _) = new_store();
    store.set_queue(abc(), 0);
    store.previous();
    assert_eq!(store.state().current_index(), Some(0));
}

#[test]
fn next_and_previous_on_empty_queue_do_nothing() {
    let (mut store, _) = new_store();
    store.next();
    store.previous();
    assert_eq!(store.state().current_index(), None);
    assert!(!store.state().is_playing());
}

#[test]
fn next_persists_new_index() {
    let (mut store, kv) = new_store();
    store.set_queue(abc(), 0);
    store.next();
    assert_eq!(persisted(&store, &kv)["currentIndex"], 1);
}

#[test]
fn add_to_queue_appends_without_touching_current() {
    let (mut store, kv) = new_store();
    store.set_queue(vec![t("a")], 0);
    store.pause();
    store.add_to_queue(t("b"));

    assert_eq!(ids(&store), vec!["a", "b"]);
    assert_eq!(store.state().current_index(), Some(0));
    assert!(!store.state().is_playing());
    assert_eq!(persisted(&store, &kv)["queue"].as_array().unwrap().len(), 2);
}

#[test]
fn remove_current_middle_clamps_to_next_entry() {
    let (mut store, _) = new_store();
    store.set_queue(abc(), 1);
    store.remove_from_queue(1);

    assert_eq!(ids(&store), vec!["a", "c"]);
    assert_eq!(store.state().current_index(), Some(1));
    assert_eq!(store.state().current_track(), Some(&t("c")));
}

#[test]
fn remove_current_last_clamps_to_new_last() {
    let (mut store, _) = new_store();
    store.set_queue(abc(), 2);
    store.remove_from_queue(2);
    assert_eq!(store.state().current_index(), Some(1));
    assert_eq!(store.state().current_track(), Some(&t("b")));
}

#[test]
fn remove_before_current_shifts_down() {
    let (mut store, _) = new_store();
    store.set_queue(abc(), 2);
    store.remove_from_queue(0);
    assert_eq!(store.state().current_index(), Some(1));
    assert_eq!(store.state().current_track(), Some(&t("c")));
}

#[test]
fn remove_after_current_keeps_index() {
    let (mut store, _) = new_store();
    store.set_queue(abc(), 0);
    store.remove_from_queue(2);
    assert_eq!(ids(&store), vec!["a", "b"]);
    assert_eq!(store.state().current_index(), Some(0));
}

#[test]
fn remove_last_remaining_entry_stops() {
    let (mut store, kv) = new_store();
    store.set_queue(vec![t("a")], 0);
    store.remove_from_queue(0);

    let s = store.state();
    assert!(s.queue().is_empty());
    assert_eq!(s.current_index(), None);
    assert!(s.current_track().is_none());
    assert!(!s.is_playing());
    assert_eq!(persisted(&store, &kv)["currentIndex"], -1);
}

#[test]
fn remove_out_of_range_is_a_noop() {
    let (mut store, _) = new_store();
    store.set_queue(abc(), 1);
    store.pause();
    store.remove_from_queue(3);
    assert_eq!(ids(&store), vec!["a", "b", "c"]);
    assert!(!store.state().is_playing());
}

#[test]
fn move_current_item_follows_it() {
    let (mut store, _) = new_store();
    store.set_queue(abc(), 0);
    store.move_queue_item(0, 2);

    assert_eq!(ids(&store), vec!["b", "c", "a"]);
    assert_eq!(store.state().current_index(), Some(2));
    assert_eq!(store.state().current_track(), Some(&t("a")));
}

#[test]
fn move_across_current_shifts_index() {
    let (mut store, _) = new_store();
    store.set_queue(abc(), 1);
    store.move_queue_item(0, 2);
    assert_eq!(ids(&store), vec!["b", "c", "a"]);
    assert_eq!(store.state().current_track(), Some(&t("b")));
    assert_eq!(store.state().current_index(), Some(0));

    store.move_queue_item(2, 0);
    assert_eq!(ids(&store), vec!["a", "b", "c"]);
    assert_eq!(store.state().current_index(), Some(1));
}

#[test]
fn move_not_spanning_current_keeps_index() {
    let (mut store, _) = new_store();
    store.set_queue(vec![t("a"), t("b"), t("c"), t("d")], 0);
    store.move_queue_item(3, 1);
    assert_eq!(ids(&store), vec!["a", "d", "b", "c"]);
    assert_eq!(store.state().current_index(), Some(0));
}

#[test]
fn move_out_of_range_is_a_noop() {
    let (mut store, _) = new_store();
    store.set_queue(abc(), 0);
    store.move_queue_item(0, 3);
    store.move_queue_item(5, 0);
    assert_eq!(ids(&store), vec!["a", "b", "c"]);
}

#[test]
fn set_progress_touches_only_progress() {
    let (mut store, _) = new_store();
    store.set_queue(abc(), 1);
    let before = store.state().clone();
    store.set_progress(Duration::from_millis(1500), Duration::from_secs(200));

    let s = store.state();
    assert_eq!(s.position(), Duration::from_millis(1500));
    assert_eq!(s.duration(), Duration::from_secs(200));
    assert_eq!(s.queue(), before.queue());
    assert_eq!(s.current_index(), before.current_index());
    assert_eq!(s.is_playing(), before.is_playing());
}

#[test]
fn restore_installs_snapshot_paused() {
    let (mut store, kv) = new_store();
    store.set_queue(abc(), 2);
    store.flush_persistence();

    let mut fresh = PlayerStore::new(QueuePersistence::new(Arc::new(kv)));
    assert!(fresh.restore_queue());

    let s = fresh.state();
    assert_eq!(s.queue(), abc().as_slice());
    assert_eq!(s.current_index(), Some(2));
    assert!(!s.is_playing());
}

#[test]
fn restore_clamps_out_of_range_index_to_zero() {
    let kv = MemoryStore::default();
    let blob = serde_json::json!({
        "queue": [serde_json::to_value(t("a")).unwrap(), serde_json::to_value(t("b")).unwrap()],
        "currentIndex": 7
    });
    kv.set(QUEUE_STORAGE_KEY, &blob.to_string()).unwrap();

    let mut store = PlayerStore::new(QueuePersistence::new(Arc::new(kv)));
    assert!(store.restore_queue());
    assert_eq!(store.state().current_index(), Some(0));
    assert!(!store.state().is_playing());
}

#[test]
fn restore_from_missing_or_corrupt_snapshot_keeps_queue() {
    let kv = MemoryStore::default();
    let mut store = PlayerStore::new(QueuePersistence::new(Arc::new(kv.clone())));
    store.set_queue(abc(), 1);
    store.flush_persistence();

    kv.set(QUEUE_STORAGE_KEY, "{\"queue\": 12").unwrap();
    assert!(!store.restore_queue());
    assert_eq!(ids(&store), vec!["a", "b", "c"]);
    assert_eq!(store.state().current_index(), Some(1));
    assert!(store.state().is_playing());

    kv.set(QUEUE_STORAGE_KEY, r#"{"queue": [], "currentIndex": 0}"#)
        .unwrap();
    assert!(!store.restore_queue());
    assert_eq!(ids(&store), vec!["a", "b", "c"]);
}

#[test]
fn restore_with_nothing_stored_is_silent() {
    let (mut store, _) = new_store();
    assert!(!store.restore_queue());
    assert!(store.state().queue().is_empty());
}

#[test]
fn selector_listener_fires_only_on_change() {
    let (mut store, _) = new_store();
    let seen: Rc<RefCell<Vec<Option<String>>>> = Rc::default();
    let sink = seen.clone();
    store.subscribe_with_selector(
        |s| s.current_track_id().map(str::to_owned),
        move |id, _| sink.borrow_mut().push(id.clone()),
    );

    store.set_queue(abc(), 0);
    store.set_progress(Duration::from_secs(1), Duration::from_secs(100));
    store.set_progress(Duration::from_secs(2), Duration::from_secs(100));
    store.pause();
    store.play();
    store.add_to_queue(t("d"));
    store.next();
    store.set_queue(Vec::new(), 0);

    assert_eq!(
        *seen.borrow(),
        vec![Some("a".to_string()), Some("b".to_string()), None]
    );
}

#[test]
fn listener_sees_fully_updated_state() {
    let (mut store, _) = new_store();
    let seen: Rc<RefCell<Vec<(Option<usize>, bool, usize)>>> = Rc::default();
    let sink = seen.clone();
    store.subscribe_with_selector(
        |s| s.current_track_id().map(str::to_owned),
        move |_, state| {
            sink.borrow_mut()
                .push((state.current_index(), state.is_playing(), state.queue().len()))
        },
    );

    store.set_queue(abc(), 1);
    store.remove_from_queue(1);

    assert_eq!(*seen.borrow(), vec![(Some(1), true, 3), (Some(1), true, 2)]);
}

#[test]
fn unsubscribe_stops_notifications() {
    let (mut store, _) = new_store();
    let count = Rc::new(RefCell::new(0));
    let sink = count.clone();
    let id = store.subscribe_with_selector(|s| s.is_playing(), move |_, _| {
        *sink.borrow_mut() += 1;
    });

    store.play();
    assert!(store.unsubscribe(id));
    store.pause();
    assert!(!store.unsubscribe(id));
    assert_eq!(*count.borrow(), 1);
}
