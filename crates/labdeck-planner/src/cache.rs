//! Content-addressed binding cache.
//!
//! Keys are SHA-256 digests over the canonical JSON of the planning inputs
//! that affect the result: the spec's roles, optimization preferences, and
//! template, plus the runtime snapshot's slots and modules. Reads are
//! concurrent; writes are atomic per key with last-writer-wins semantics.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use labdeck_core::binding::BindingMap;
use labdeck_core::spec::{DeckSpec, RuntimeContext};

/// Maximum cached binding maps; the oldest insertion is evicted first.
pub const CACHE_CAPACITY: usize = 100;

#[derive(Serialize)]
struct SpecKey<'a> {
    roles: &'a std::collections::BTreeMap<String, labdeck_core::spec::RoleSpec>,
    optimization: &'a Option<labdeck_core::spec::OptimizationConfig>,
    template: &'a Option<labdeck_core::spec::ProtocolTemplate>,
}

#[derive(Serialize)]
struct ContextKey<'a> {
    available_slots: &'a [u32],
    installed_modules: &'a [labdeck_core::spec::InstalledModule],
    occupied_slots: &'a [u32],
}

fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Content hash over the inputs that determine a plan.
pub fn cache_key(spec: &DeckSpec, runtime: Option<&RuntimeContext>) -> String {
    let spec_json = serde_json::to_vec(&SpecKey {
        roles: &spec.roles,
        optimization: &spec.optimization,
        template: &spec.template,
    })
    .unwrap_or_default();

    let context_json = runtime
        .map(|context| {
            serde_json::to_vec(&ContextKey {
                available_slots: &context.available_slots,
                installed_modules: &context.installed_modules,
                occupied_slots: &context.occupied_slots,
            })
            .unwrap_or_default()
        })
        .unwrap_or_default();

    format!("{}_{}", digest(&spec_json), digest(&context_json))
}

struct CacheInner {
    entries: HashMap<String, Arc<BindingMap>>,
    insertion_order: VecDeque<String>,
}

/// Thread-safe key → binding-map store. A stale-but-valid entry from a
/// racing writer is acceptable; a torn entry is not, so each write replaces
/// the whole value under the lock.
pub struct BindingCache {
    inner: RwLock<CacheInner>,
}

impl Default for BindingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl BindingCache {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CacheInner {
                entries: HashMap::new(),
                insertion_order: VecDeque::new(),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<BindingMap>> {
        self.inner
            .read()
            .ok()
            .and_then(|inner| inner.entries.get(key).cloned())
    }

    pub fn insert(&self, key: String, map: BindingMap) {
        let Ok(mut inner) = self.inner.write() else { return };
        if !inner.entries.contains_key(&key) {
            inner.insertion_order.push_back(key.clone());
        }
        inner.entries.insert(key, Arc::new(map));

        while inner.entries.len() > CACHE_CAPACITY {
            let Some(oldest) = inner.insertion_order.pop_front() else { break };
            inner.entries.remove(&oldest);
            debug!(%oldest, "evicted oldest cache entry");
        }
    }

    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.entries.clear();
            inner.insertion_order.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
