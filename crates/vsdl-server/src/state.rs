//! In-memory server state: the record store, policy catalog, and the
//! `token_id → issued state` map Issue populates and Dispense reads.
//!
//! Concurrent access is serialized by a single `tokio::sync::RwLock`, the
//! same discipline the teacher's `ghettobox-vault` uses around its
//! `AppState` (there guarding a `sled::Db`; here guarding a plain
//! `HashMap` since spec §6.4 calls for in-memory-only persistence).

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use vsdl_core::{FieldCommitment, Point, Policy, Record};

/// Everything Dispense needs that was fixed at Issue time. Never mutated
/// after insertion (spec §5: "entries are never mutated after insert").
pub struct IssuedState {
    pub policy: Policy,
    pub field_commitments: HashMap<String, FieldCommitment>,
    pub c_d: Point,
    pub created_at: u64,
    pub expiry: u64,
}

pub struct ServerState {
    /// HMAC secret generated once at startup (spec §6.2); key rotation is
    /// out of scope.
    pub secret: Vec<u8>,
    pub records: HashMap<String, Record>,
    pub policies: HashMap<String, Policy>,
    pub tokens: HashMap<String, IssuedState>,
}

impl ServerState {
    pub fn new(secret: Vec<u8>) -> Self {
        ServerState {
            secret,
            records: HashMap::new(),
            policies: HashMap::new(),
            tokens: HashMap::new(),
        }
    }

    /// Evict every token-map entry whose expiry has already passed
    /// (spec §5: an implementation SHOULD evict on expiry). Run
    /// opportunistically before each Issue rather than on a schedule, since
    /// nothing in the spec calls for background work.
    pub fn sweep_expired(&mut self, now: u64) {
        self.tokens.retain(|_, issued| issued.expiry > now);
    }
}

pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is after the unix epoch")
        .as_secs()
}
