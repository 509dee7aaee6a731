//! Internal `$ref` resolution within a single contract document.

use std::borrow::Cow;
use std::collections::HashSet;

use serde_json::{Map, Value};

/// Maximum number of `$ref` hops followed before giving up.
pub const MAX_REF_DEPTH: usize = 32;

/// Resolves `#/...` pointers against the root of a contract document.
///
/// Resolution never fails: a pointer that cannot be followed yields an empty
/// object, which downstream validators treat as a schema with no declared
/// properties. Chained references are followed up to [`MAX_REF_DEPTH`] hops
/// and a reference cycle also yields an empty object.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    root: &'a Value,
}

impl<'a> RefResolver<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// Navigate a pointer (e.g. `#/components/schemas/Pet`) one hop.
    ///
    /// Returns `None` when any segment is missing. The target is returned
    /// as-is, even if it is itself a `$ref`.
    pub fn lookup(&self, pointer: &str) -> Option<&'a Value> {
        let path = pointer.trim_start_matches('#').trim_start_matches('/');
        if path.is_empty() {
            return Some(self.root);
        }

        let mut current = self.root;
        for part in path.split('/') {
            // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
            let key = part.replace("~1", "/").replace("~0", "~");
            current = match current {
                Value::Object(map) => map.get(&key)?,
                Value::Array(arr) => arr.get(key.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Resolve a pointer, following chained references.
    pub fn resolve(&self, pointer: &str) -> Cow<'a, Value> {
        let mut visited = HashSet::new();
        let mut current = pointer.to_string();

        for _ in 0..MAX_REF_DEPTH {
            if !visited.insert(current.clone()) {
                tracing::warn!(pointer = %pointer, at = %current, "circular $ref, treating as empty schema");
                return empty();
            }

            let Some(target) = self.lookup(&current) else {
                tracing::warn!(pointer = %pointer, "unresolved $ref, treating as empty schema");
                return empty();
            };

            match target.get("$ref").and_then(Value::as_str) {
                Some(next) => current = next.to_string(),
                None => return Cow::Borrowed(target),
            }
        }

        tracing::warn!(
            pointer = %pointer,
            max_depth = MAX_REF_DEPTH,
            "$ref chain too deep, treating as empty schema"
        );
        empty()
    }

    /// Replace a `{"$ref": ...}` node by its target, or return it unchanged.
    pub fn deref<'v>(&self, value: &'v Value) -> Cow<'v, Value>
    where
        'a: 'v,
    {
        match value.get("$ref").and_then(Value::as_str) {
            Some(pointer) => self.resolve(pointer),
            None => Cow::Borrowed(value),
        }
    }
}

fn empty<'a>() -> Cow<'a, Value> {
    Cow::Owned(Value::Object(Map::new()))
}
