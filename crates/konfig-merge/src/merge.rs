//! Recursive three-way merge over YAML value trees.
//!
//! The merge is a pure function of `(original, updated, local)`; absence is
//! first-class (a resource or field may be missing from any snapshot). Field
//! conflicts are collected with their full paths and escalated to a
//! resource-level conflict outcome.

use std::fmt;

use serde_yaml::{Mapping, Sequence, Value};

/// Maximum recursion depth; beyond it values are treated as atomic.
const MAX_MERGE_DEPTH: usize = 128;

/// Per-field merge keys for list reconciliation. Lists under these field
/// names match elements by the named key instead of position, so
/// reordering or independent insertion does not spuriously conflict.
const LIST_MERGE_KEYS: &[(&str, &str)] = &[
    ("containers", "name"),
    ("initContainers", "name"),
    ("volumes", "name"),
    ("env", "name"),
    ("imagePullSecrets", "name"),
    ("ports", "containerPort"),
    ("volumeMounts", "mountPath"),
];

/// Per-resource outcome of a three-way merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// New in `updated`, absent elsewhere.
    Added,
    /// Deleted upstream or locally; the resource is dropped.
    Deleted,
    /// Upstream did not change the resource; the local version survives.
    KeptLocal,
    /// Local did not change the resource; the upstream version applies.
    KeptUpstream,
    /// Fields from both sides combined without conflict.
    Merged,
    /// Irreconcilable edits; carries every conflicting field path.
    Conflict(Vec<String>),
}

impl MergeOutcome {
    /// Whether this outcome aborts the update.
    pub fn is_conflict(&self) -> bool {
        matches!(self, MergeOutcome::Conflict(_))
    }
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeOutcome::Added => write!(f, "added"),
            MergeOutcome::Deleted => write!(f, "deleted"),
            MergeOutcome::KeptLocal => write!(f, "kept-local"),
            MergeOutcome::KeptUpstream => write!(f, "kept-upstream"),
            MergeOutcome::Merged => write!(f, "merged"),
            MergeOutcome::Conflict(fields) => write!(f, "conflict ({})", fields.join(", ")),
        }
    }
}

/// Three-way merge of one resource across the three snapshots.
///
/// Any argument may be `None`: the resource does not exist in that
/// snapshot. Returns the merged value (`None` means the resource is
/// dropped from the package) and the outcome classification.
pub fn merge_resource(
    original: Option<&Value>,
    updated: Option<&Value>,
    local: Option<&Value>,
) -> (Option<Value>, MergeOutcome) {
    match (original, updated, local) {
        // Unreachable in practice: callers iterate keys present somewhere.
        (None, None, None) => (None, MergeOutcome::Deleted),

        // New upstream, untouched locally.
        (None, Some(u), None) => (Some(u.clone()), MergeOutcome::Added),

        // The user deleted it locally; deletion wins over upstream retention.
        (Some(_), Some(_), None) => (None, MergeOutcome::Deleted),

        // Added both upstream and locally.
        (None, Some(u), Some(l)) => {
            if u == l {
                (Some(u.clone()), MergeOutcome::KeptUpstream)
            } else {
                (
                    None,
                    MergeOutcome::Conflict(vec!["(added in both upstream and local)".to_string()]),
                )
            }
        }

        // Upstream deleted it.
        (Some(o), None, Some(l)) => {
            if o == l {
                // Local never touched it; propagate the deletion.
                (None, MergeOutcome::Deleted)
            } else {
                (
                    None,
                    MergeOutcome::Conflict(vec![
                        "(edited locally, deleted upstream)".to_string()
                    ]),
                )
            }
        }

        // Deleted both upstream and locally.
        (Some(_), None, None) => (None, MergeOutcome::Deleted),

        // Local-only leftover: kept as-is (upstream never knew about it).
        (None, None, Some(l)) => (Some(l.clone()), MergeOutcome::KeptLocal),

        // Present in all three: field-level reconciliation.
        (Some(o), Some(u), Some(l)) => {
            let mut conflicts = Vec::new();
            let merged = merge_value(Some(o), Some(u), Some(l), "", &mut conflicts, 0);
            if !conflicts.is_empty() {
                return (None, MergeOutcome::Conflict(conflicts));
            }
            let outcome = if u == o {
                MergeOutcome::KeptLocal
            } else if l == o {
                MergeOutcome::KeptUpstream
            } else {
                MergeOutcome::Merged
            };
            (merged, outcome)
        }
    }
}

/// Recursive field merge. `None` means the field is absent in that
/// snapshot; returning `None` means the field is absent from the result.
fn merge_value(
    original: Option<&Value>,
    updated: Option<&Value>,
    local: Option<&Value>,
    path: &str,
    conflicts: &mut Vec<String>,
    depth: usize,
) -> Option<Value> {
    // Upstream untouched: the local value (or local deletion/addition) wins.
    if updated == original {
        return local.cloned();
    }
    // Local untouched: the upstream change propagates.
    if local == original {
        return updated.cloned();
    }
    // Independent but identical changes agree. This also retains fields
    // absent from original but present identically in both sides.
    if updated == local {
        return updated.cloned();
    }

    if depth > MAX_MERGE_DEPTH {
        conflicts.push(display_path(path));
        return None;
    }

    match (updated, local) {
        (Some(Value::Mapping(u)), Some(Value::Mapping(l))) => {
            let empty = Mapping::new();
            let o = original.and_then(Value::as_mapping).unwrap_or(&empty);
            Some(Value::Mapping(merge_mappings(o, u, l, path, conflicts, depth)))
        }
        (Some(Value::Sequence(u)), Some(Value::Sequence(l))) => {
            let empty = Sequence::new();
            let o = original.and_then(Value::as_sequence).unwrap_or(&empty);
            Some(Value::Sequence(merge_sequences(
                o, u, l, path, conflicts, depth,
            )))
        }
        // Scalars (or mismatched shapes) edited divergently on both sides.
        _ => {
            conflicts.push(display_path(path));
            None
        }
    }
}

fn merge_mappings(
    original: &Mapping,
    updated: &Mapping,
    local: &Mapping,
    path: &str,
    conflicts: &mut Vec<String>,
    depth: usize,
) -> Mapping {
    let mut merged = Mapping::new();

    // Updated's key order wins; local-only keys follow in local order.
    // Original-only keys are deletions on both sides and simply vanish.
    let mut keys: Vec<&Value> = updated.iter().map(|(k, _)| k).collect();
    for (k, _) in local.iter() {
        if !updated.iter().any(|(uk, _)| uk == k) {
            keys.push(k);
        }
    }
    for (k, _) in original.iter() {
        if !keys.contains(&k) {
            keys.push(k);
        }
    }

    for key in keys {
        let child_path = child_of(path, key);
        let value = merge_value(
            lookup(original, key),
            lookup(updated, key),
            lookup(local, key),
            &child_path,
            conflicts,
            depth + 1,
        );
        if let Some(value) = value {
            merged.insert(key.clone(), value);
        }
    }
    merged
}

fn merge_sequences(
    original: &Sequence,
    updated: &Sequence,
    local: &Sequence,
    path: &str,
    conflicts: &mut Vec<String>,
    depth: usize,
) -> Sequence {
    let field = last_segment(path);
    if let Some(key_field) = element_key_for(field, &[original, updated, local]) {
        if let (Some(o_keys), Some(u_keys), Some(l_keys)) = (
            element_keys(original, key_field),
            element_keys(updated, key_field),
            element_keys(local, key_field),
        ) {
            return merge_keyed_sequences(
                original, &o_keys, updated, &u_keys, local, &l_keys, key_field, path, conflicts,
                depth,
            );
        }
        // Duplicate or missing keys: fall through to positional identity.
    }

    let mut merged = Sequence::new();
    let len = original.len().max(updated.len()).max(local.len());
    for i in 0..len {
        let child_path = format!("{}[{}]", path, i);
        let value = merge_value(
            original.get(i),
            updated.get(i),
            local.get(i),
            &child_path,
            conflicts,
            depth + 1,
        );
        if let Some(value) = value {
            merged.push(value);
        }
    }
    merged
}

#[allow(clippy::too_many_arguments)]
fn merge_keyed_sequences(
    original: &Sequence,
    original_keys: &[String],
    updated: &Sequence,
    updated_keys: &[String],
    local: &Sequence,
    local_keys: &[String],
    key_field: &str,
    path: &str,
    conflicts: &mut Vec<String>,
    depth: usize,
) -> Sequence {
    let find = |seq: &Sequence, keys: &[String], key: &str| -> Option<Value> {
        keys.iter()
            .position(|k| k == key)
            .and_then(|i| seq.get(i).cloned())
    };

    // Updated's element order wins; local-only elements are appended in
    // local order so local insertions are never dropped.
    let mut ordered: Vec<&String> = updated_keys.iter().collect();
    for key in local_keys {
        if !updated_keys.contains(key) {
            ordered.push(key);
        }
    }
    for key in original_keys {
        if !updated_keys.contains(key) && !local_keys.contains(key) {
            ordered.push(key);
        }
    }

    let mut merged = Sequence::new();
    for key in ordered {
        let child_path = format!("{}[{}={}]", path, key_field, key);
        let value = merge_value(
            find(original, original_keys, key).as_ref(),
            find(updated, updated_keys, key).as_ref(),
            find(local, local_keys, key).as_ref(),
            &child_path,
            conflicts,
            depth + 1,
        );
        if let Some(value) = value {
            merged.push(value);
        }
    }
    merged
}

/// The merge key field for a list under `field`, if keyed matching applies.
fn element_key_for(field: &str, sequences: &[&Sequence; 3]) -> Option<&'static str> {
    if let Some((_, key)) = LIST_MERGE_KEYS.iter().find(|(f, _)| *f == field) {
        return Some(key);
    }
    // Fallback: lists whose mapping elements all declare a name.
    let all_named = sequences.iter().all(|seq| {
        seq.iter()
            .all(|el| el.get("name").and_then(Value::as_str).is_some())
    });
    if all_named && sequences.iter().any(|seq| !seq.is_empty()) {
        Some("name")
    } else {
        None
    }
}

/// Scalar keys of each element, or `None` if any element lacks the key or
/// two elements collide (keyed matching is then abandoned for this list).
fn element_keys(sequence: &Sequence, key_field: &str) -> Option<Vec<String>> {
    let mut keys = Vec::with_capacity(sequence.len());
    for element in sequence {
        let key = element.get(key_field).map(scalar_string)??;
        if keys.contains(&key) {
            return None;
        }
        keys.push(key);
    }
    Some(keys)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lookup<'a>(mapping: &'a Mapping, key: &Value) -> Option<&'a Value> {
    mapping.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
}

fn child_of(path: &str, key: &Value) -> String {
    let key = scalar_string(key).unwrap_or_else(|| "?".to_string());
    if path.is_empty() {
        key
    } else {
        format!("{}.{}", path, key)
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

fn display_path(path: &str) -> String {
    if path.is_empty() {
        "(document root)".to_string()
    } else {
        path.to_string()
    }
}
