//! The two process-wide, append-only iterator registries (§4.3.4).
//!
//! Grounded on the same `OnceLock<Mutex<HashMap<...>>>` shape used for the
//! type registry in `crate::value`, generalized from "type name → parser" to
//! "token → iterator factory". Two maps instead of one: an exact-match table
//! for static custom iterators, and a leading-character table for dynamic
//! ones, matching the two-tier lookup in §4.3.2's classification order.

use crate::tree::{NodeId, Tree};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

/// A resolved iterator: takes the identity node and the current input
/// sequence, returns the output sequence (as arena ids; the public API
/// converts back to [`crate::tree::Node`] handles).
pub type IterFn = Arc<dyn Fn(&Tree, NodeId, &[NodeId]) -> Vec<NodeId> + Send + Sync>;

/// A dynamic iterator factory: given the full raw token text (including its
/// leading character), returns the concrete iterator function.
pub type DynamicFactory = Arc<dyn Fn(&str) -> IterFn + Send + Sync>;

static STATIC_ITERATORS: OnceLock<RwLock<HashMap<String, IterFn>>> = OnceLock::new();
static DYNAMIC_ITERATORS: OnceLock<RwLock<HashMap<char, DynamicFactory>>> = OnceLock::new();

fn static_map() -> &'static RwLock<HashMap<String, IterFn>> {
    STATIC_ITERATORS.get_or_init(|| RwLock::new(HashMap::new()))
}

fn dynamic_map() -> &'static RwLock<HashMap<char, DynamicFactory>> {
    DYNAMIC_ITERATORS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register a static (exact-match) custom iterator. Replaces any existing
/// registration under the same token.
pub fn register_static(token: impl Into<String>, f: IterFn) {
    static_map().write().unwrap().insert(token.into(), f);
}

/// Register a dynamic (leading-character) custom iterator factory. If
/// `leading` collides with a built-in classification trigger, the built-in
/// always wins at classification time (§4.3.4) - registration itself is
/// never rejected.
pub fn register_dynamic(leading: char, factory: DynamicFactory) {
    dynamic_map().write().unwrap().insert(leading, factory);
}

pub(crate) fn is_static(token: &str) -> bool {
    static_map().read().unwrap().contains_key(token)
}

pub(crate) fn has_dynamic_prefix(c: char) -> bool {
    dynamic_map().read().unwrap().contains_key(&c)
}

pub(crate) fn lookup_static(token: &str) -> Option<IterFn> {
    static_map().read().unwrap().get(token).cloned()
}

pub(crate) fn lookup_dynamic(c: char) -> Option<DynamicFactory> {
    dynamic_map().read().unwrap().get(&c).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_registration_is_visible_to_lookup() {
        register_static("test-registry-marker", Arc::new(|_, _, input| input.to_vec()));
        assert!(is_static("test-registry-marker"));
        assert!(lookup_static("test-registry-marker").is_some());
    }

    #[test]
    fn dynamic_registration_is_visible_by_leading_char() {
        register_dynamic('~', Arc::new(|_token| Arc::new(|_, _, input| input.to_vec())));
        assert!(has_dynamic_prefix('~'));
        assert!(lookup_dynamic('~').is_some());
    }
}
