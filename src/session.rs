use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::controller::Controller;
use crate::db::KeyValueStore;

struct Entry<S> {
    controller: Controller<S>,
    last_used: u64,
}

struct Registry<S> {
    entries: HashMap<i64, Entry<S>>,
    clock: u64,
}

/// One controller per chat, created on the chat's first interaction.
///
/// At most `capacity` chats are kept; the least recently used one is dropped
/// to make room. Its favorites are rehydrated from the store if it comes back,
/// its view state starts over.
///
/// The lock is only held for the duration of `with`; callers must not await
/// inside the closure.
pub struct Sessions<S> {
    store: S,
    key_prefix: String,
    capacity: usize,
    registry: Mutex<Registry<S>>,
}

impl<S: KeyValueStore + Clone> Sessions<S> {
    pub fn new(store: S, key_prefix: impl Into<String>, capacity: usize) -> Self {
        Sessions {
            store,
            key_prefix: key_prefix.into(),
            capacity: capacity.max(1),
            registry: Mutex::new(Registry {
                entries: HashMap::new(),
                clock: 0,
            }),
        }
    }

    pub fn favorites_key(&self, chat_id: i64) -> String {
        format!("{}:{}", self.key_prefix, chat_id)
    }

    pub fn len(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn with<R>(&self, chat_id: i64, f: impl FnOnce(&mut Controller<S>) -> R) -> R {
        let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        registry.clock += 1;
        let now = registry.clock;

        if !registry.entries.contains_key(&chat_id) && registry.entries.len() >= self.capacity {
            let oldest = registry
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                log::debug!("Evicting idle session for chat {}", oldest);
                registry.entries.remove(&oldest);
            }
        }

        let entry = registry.entries.entry(chat_id).or_insert_with(|| {
            log::info!("Starting session for chat {}", chat_id);
            Entry {
                controller: Controller::hydrate(self.store.clone(), self.favorites_key(chat_id)),
                last_used: now,
            }
        });
        entry.last_used = now;
        f(&mut entry.controller)
    }
}
