//! Test fixtures: an in-memory cache store and a fake database that report
//! their operations the way real instrumented backends do.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use expect_io::{Backend, BackendId, CacheOp, EventBus, Instrument, Payload, Tagged, payload};

/// A key/value cache that emits one event per operation through a
/// [`Tagged`] instrument.
pub struct MemoryCache {
    notifications: Tagged<EventBus>,
    entries: Mutex<HashMap<String, i64>>,
}

impl MemoryCache {
    pub fn new(bus: &EventBus) -> Self {
        Self {
            notifications: Tagged::new(bus.clone()),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, i64>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, op: CacheOp, payload: Payload) {
        self.notifications.instrument(&op.event_name(), payload);
    }

    pub fn read(&self, key: &str) -> Option<i64> {
        let value = self.entries().get(key).copied();
        self.notify(CacheOp::Read, Payload::key(key).with("hit", value.is_some()));
        value
    }

    pub fn write(&self, key: &str, value: i64) {
        self.entries().insert(key.to_owned(), value);
        self.notify(CacheOp::Write, Payload::key(key));
    }

    pub fn delete(&self, key: &str) -> bool {
        let removed = self.entries().remove(key).is_some();
        self.notify(CacheOp::Delete, Payload::key(key));
        removed
    }

    pub fn exist(&self, key: &str) -> bool {
        let exists = self.entries().contains_key(key);
        // Hosts suffix predicate operations with '?' and their namespace.
        self.notifications
            .instrument("cache_exist?.memory_store", Payload::key(key));
        exists
    }

    pub fn increment(&self, key: &str, by: i64) -> i64 {
        let value = {
            let mut entries = self.entries();
            let slot = entries.entry(key.to_owned()).or_insert(0);
            *slot += by;
            *slot
        };
        self.notify(CacheOp::Increment, Payload::key(key).with("amount", by));
        value
    }

    pub fn decrement(&self, key: &str, by: i64) -> i64 {
        let value = {
            let mut entries = self.entries();
            let slot = entries.entry(key.to_owned()).or_insert(0);
            *slot -= by;
            *slot
        };
        self.notify(CacheOp::Decrement, Payload::key(key).with("amount", by));
        value
    }

    pub fn read_multi(&self, keys: &[&str]) -> Vec<Option<i64>> {
        let values = {
            let entries = self.entries();
            keys.iter().map(|k| entries.get(*k).copied()).collect()
        };
        self.notify(CacheOp::ReadMulti, Payload::keys(keys.iter().copied()));
        values
    }

    pub fn write_multi(&self, pairs: &[(&str, i64)]) {
        {
            let mut entries = self.entries();
            for (key, value) in pairs {
                entries.insert((*key).to_owned(), *value);
            }
        }
        // Spaced names are how some hosts spell batch operations.
        self.notifications.instrument(
            "cache write multi",
            Payload::keys(pairs.iter().map(|(k, _)| *k)),
        );
    }

    /// Read, and on a miss compute and write. Emits a read and, on a miss,
    /// a write.
    pub fn fetch(&self, key: &str, compute: impl FnOnce() -> i64) -> i64 {
        if let Some(value) = self.read(key) {
            return value;
        }
        let value = compute();
        self.write(key, value);
        value
    }
}

impl Backend for MemoryCache {
    fn ensure_tagged(&self) -> BackendId {
        self.notifications.ensure_tagged()
    }
}

/// A database stand-in that reports queries as `sql` events, including the
/// housekeeping statements a real adapter emits around writes.
pub struct FakeDatabase {
    bus: EventBus,
    next_id: Mutex<u64>,
    memo: Mutex<HashMap<String, u64>>,
}

impl FakeDatabase {
    pub fn new(bus: &EventBus) -> Self {
        Self {
            bus: bus.clone(),
            next_id: Mutex::new(1),
            memo: Mutex::new(HashMap::new()),
        }
    }

    fn query(&self, sql: &str) {
        self.bus.emit("sql", Payload::sql(sql).with(payload::OPERATION_NAME, "User Load"));
    }

    fn housekeeping(&self, sql: &str) {
        self.bus.emit("sql", Payload::sql(sql).with(payload::OPERATION_NAME, "TRANSACTION"));
    }

    /// Insert a user inside a transaction. One user-visible query.
    pub fn insert_user(&self, name: &str) -> u64 {
        self.housekeeping("BEGIN");
        self.query(&format!("INSERT INTO users (name) VALUES ('{name}')"));
        self.housekeeping("COMMIT");
        let mut next = self.next_id.lock().unwrap_or_else(PoisonError::into_inner);
        let id = *next;
        *next += 1;
        id
    }

    pub fn update_user(&self, id: u64, name: &str) {
        self.housekeeping("BEGIN");
        self.query(&format!("UPDATE users SET name = '{name}' WHERE id = {id}"));
        self.housekeeping("COMMIT");
    }

    /// Select a user. Repeating a select replays it from the query memo,
    /// which is reported with `cached: true`.
    pub fn find_user(&self, id: u64) {
        let sql = format!("SELECT * FROM users WHERE id = {id}");
        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
        let hits = memo.entry(sql.clone()).or_insert(0);
        *hits += 1;
        let cached = *hits > 1;
        drop(memo);
        self.bus.emit("sql", Payload::sql(sql).with(payload::CACHED, cached));
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }
}
