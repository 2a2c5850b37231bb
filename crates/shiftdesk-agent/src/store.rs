// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user conversation store.
//!
//! A process-wide map from `user_id` to that user's turns, sharded by
//! [`DashMap`] so racing lookups for the same id settle on a single entry.
//! In [`HistoryMode::Reset`] every lookup clears the entry; in
//! [`HistoryMode::Retain`] turns accumulate up to `max_turns`.
//!
//! Known users are served under their shard lock alone. Admitting a new user
//! takes a store-wide lock so eviction and insertion happen as one step and
//! the store never holds more than `max_users` entries.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use shiftdesk_config::model::ConversationConfig;
use shiftdesk_core::HistoryMode;
use tracing::debug;

/// Who said a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Worker,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Worker => write!(f, "Worker"),
            Speaker::Assistant => write!(f, "Assistant"),
        }
    }
}

/// One line of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.speaker, self.text)
    }
}

/// Snapshot of one user's conversation, taken at lookup time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationState {
    pub user_id: String,
    pub turns: Vec<Turn>,
}

impl ConversationState {
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Renders the turns as `Speaker: text` lines joined by newlines.
    pub fn render_history(&self) -> String {
        self.turns
            .iter()
            .map(Turn::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// History followed by the latest exchange, as fed to the SQL prompt.
    pub fn transcript_with(&self, worker_text: &str, assistant_text: &str) -> String {
        let latest = format!("Worker: {worker_text}\nAssistant: {assistant_text}");
        if self.turns.is_empty() {
            latest
        } else {
            format!("{}\n{latest}", self.render_history())
        }
    }
}

#[derive(Debug, Default)]
struct Entry {
    turns: VecDeque<Turn>,
    last_touched: u64,
}

/// Shared map of conversation state keyed by `user_id`.
#[derive(Debug)]
pub struct ConversationStore {
    entries: DashMap<String, Entry>,
    mode: HistoryMode,
    max_turns: usize,
    max_users: usize,
    clock: AtomicU64,
    admission: Mutex<()>,
}

impl ConversationStore {
    /// Creates a store. `max_users == 0` means unbounded.
    pub fn new(mode: HistoryMode, max_turns: usize, max_users: usize) -> Self {
        Self {
            entries: DashMap::new(),
            mode,
            max_turns,
            max_users,
            clock: AtomicU64::new(0),
            admission: Mutex::new(()),
        }
    }

    pub fn from_config(config: &ConversationConfig) -> Self {
        Self::new(config.history, config.max_turns, config.max_users)
    }

    /// Number of users currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.entries.contains_key(user_id)
    }

    /// Returns the user's state, creating an empty entry on first sight.
    ///
    /// In reset mode the entry is cleared, so the snapshot is always empty.
    pub fn get_or_create(&self, user_id: &str) -> ConversationState {
        let reset = self.mode == HistoryMode::Reset;
        let turns = self.with_entry(user_id, |entry| {
            if reset {
                entry.turns.clear();
            }
            entry.turns.iter().cloned().collect::<Vec<_>>()
        });

        ConversationState {
            user_id: user_id.to_string(),
            turns,
        }
    }

    /// Appends a worker turn and an assistant turn. No-op in reset mode.
    pub fn record_exchange(&self, user_id: &str, worker_text: &str, assistant_text: &str) {
        if self.mode == HistoryMode::Reset {
            return;
        }

        let max_turns = self.max_turns;
        self.with_entry(user_id, |entry| {
            entry.turns.push_back(Turn::new(Speaker::Worker, worker_text));
            entry.turns.push_back(Turn::new(Speaker::Assistant, assistant_text));
            while entry.turns.len() > max_turns {
                entry.turns.pop_front();
            }
        });
    }

    /// Runs `f` on the user's entry, admitting the user first if needed.
    fn with_entry<R>(&self, user_id: &str, f: impl FnOnce(&mut Entry) -> R) -> R {
        let tick = self.tick();

        if let Some(mut entry) = self.entries.get_mut(user_id) {
            entry.last_touched = tick;
            return f(&mut entry);
        }

        let _admission = self.admission.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.entries.contains_key(user_id) {
            self.make_room(user_id);
        }
        let mut entry = self.entries.entry(user_id.to_string()).or_default();
        entry.last_touched = tick;
        f(&mut entry)
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Evicts least-recently-touched users until a new one fits. Callers hold
    /// the admission lock. Each eviction scans every entry.
    fn make_room(&self, incoming: &str) {
        if self.max_users == 0 {
            return;
        }
        while self.entries.len() >= self.max_users {
            // The iterator holds shard read locks; collect the key before removing.
            let oldest = self
                .entries
                .iter()
                .filter(|e| e.key() != incoming)
                .min_by_key(|e| e.value().last_touched)
                .map(|e| e.key().clone());
            match oldest {
                Some(user_id) => {
                    self.entries.remove(&user_id);
                    debug!(user_id = user_id.as_str(), "evicted least recently seen conversation");
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};

    use super::*;

    fn retaining(max_turns: usize, max_users: usize) -> ConversationStore {
        ConversationStore::new(HistoryMode::Retain, max_turns, max_users)
    }

    #[test]
    fn first_lookup_creates_empty_entry() {
        let store = retaining(20, 0);
        let state = store.get_or_create("001");
        assert!(state.is_empty());
        assert_eq!(state.user_id, "001");
        assert!(store.contains("001"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn any_string_is_a_valid_key() {
        let store = retaining(20, 0);
        for id in ["", " ", "ユーザー", "a\nb", "🙂"] {
            assert!(store.get_or_create(id).is_empty());
        }
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn reset_mode_never_accumulates() {
        let store = ConversationStore::new(HistoryMode::Reset, 20, 0);
        store.get_or_create("001");
        store.record_exchange("001", "hi", "hello");
        let state = store.get_or_create("001");
        assert!(state.is_empty());
        assert_eq!(state.render_history(), "");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn retain_mode_renders_history_in_order() {
        let store = retaining(20, 0);
        store.record_exchange("001", "I can't come in today", "Which shift?");
        store.record_exchange("001", "The 9 to 5", "Cancelled.");

        let state = store.get_or_create("001");
        assert_eq!(
            state.render_history(),
            "Worker: I can't come in today\nAssistant: Which shift?\nWorker: The 9 to 5\nAssistant: Cancelled."
        );
    }

    #[test]
    fn retain_mode_caps_turns_dropping_oldest() {
        let store = retaining(3, 0);
        store.record_exchange("001", "one", "two");
        store.record_exchange("001", "three", "four");

        let state = store.get_or_create("001");
        let texts: Vec<_> = state.turns.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three", "four"]);
    }

    #[test]
    fn users_do_not_share_history() {
        let store = retaining(20, 0);
        store.record_exchange("001", "hi", "hello");
        assert!(store.get_or_create("002").is_empty());
        assert_eq!(store.get_or_create("001").turns.len(), 2);
    }

    #[test]
    fn capacity_evicts_least_recently_touched() {
        let store = retaining(20, 2);
        store.get_or_create("a");
        store.get_or_create("b");
        // Touch "a" so "b" becomes the oldest.
        store.get_or_create("a");
        store.get_or_create("c");

        assert_eq!(store.len(), 2);
        assert!(store.contains("a"));
        assert!(!store.contains("b"));
        assert!(store.contains("c"));
    }

    #[test]
    fn existing_user_lookup_does_not_evict() {
        let store = retaining(20, 2);
        store.get_or_create("a");
        store.get_or_create("b");
        store.get_or_create("b");
        assert!(store.contains("a"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn transcript_appends_latest_exchange() {
        let empty = ConversationState {
            user_id: "001".into(),
            turns: Vec::new(),
        };
        assert_eq!(
            empty.transcript_with("hi", "hello"),
            "Worker: hi\nAssistant: hello"
        );

        let with_history = ConversationState {
            user_id: "001".into(),
            turns: vec![
                Turn::new(Speaker::Worker, "a"),
                Turn::new(Speaker::Assistant, "b"),
            ],
        };
        assert_eq!(
            with_history.transcript_with("c", "d"),
            "Worker: a\nAssistant: b\nWorker: c\nAssistant: d"
        );
    }

    #[test]
    fn concurrent_first_contacts_stay_within_capacity() {
        const THREADS: usize = 8;
        let store = Arc::new(retaining(20, 2));

        for round in 0..200 {
            let barrier = Arc::new(Barrier::new(THREADS));
            let handles: Vec<_> = (0..THREADS)
                .map(|t| {
                    let store = Arc::clone(&store);
                    let barrier = Arc::clone(&barrier);
                    std::thread::spawn(move || {
                        barrier.wait();
                        store.get_or_create(&format!("user-{round}-{t}"));
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
            assert!(store.len() <= 2, "store held {} users after round {round}", store.len());
        }
    }

    #[test]
    fn concurrent_lookups_for_one_id_create_one_entry() {
        let store = Arc::new(retaining(20, 0));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.get_or_create("shared");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 1);
    }
}
