//! restore.rs - Puts whitelisted arrays back into the cleaned tree.
//!
//! The pass consumes the polluted tree and rebuilds it without the leaves
//! that were restored and without any object left empty by their removal.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use serde_json::{Map, Value};

use crate::report::loggable_key;
use crate::sanitizers::key_guard::is_safe_key;
use crate::sanitizers::tree::{join_path, set_at_path};

/// Moves every whitelisted leaf of `polluted` back into `cleaned`.
///
/// On return `polluted` holds only the leaves that were not whitelisted, and
/// no empty objects. When nothing remains it is an empty map.
///
/// # Arguments
///
/// * `cleaned` - The reduced tree; whitelisted arrays are written into it.
/// * `polluted` - The side tree produced by the reducer.
/// * `is_whitelisted` - Decides, per path, whether to restore.
/// * `max_key_length` - Key guard ceiling applied to re-split path segments.
pub fn restore<F>(cleaned: &mut Value, polluted: &mut Map<String, Value>, is_whitelisted: F, max_key_length: usize)
where
    F: Fn(&[String]) -> bool,
{
    let Value::Object(cleaned_map) = cleaned else {
        // Only object roots can carry recorded pollution.
        return;
    };

    let taken = std::mem::take(polluted);
    let mut path = Vec::new();
    *polluted = prune(cleaned_map, taken, &mut path, &is_whitelisted, max_key_length);
}

fn prune<F>(
    cleaned: &mut Map<String, Value>,
    polluted: Map<String, Value>,
    path: &mut Vec<String>,
    is_whitelisted: &F,
    max_key_length: usize,
) -> Map<String, Value>
where
    F: Fn(&[String]) -> bool,
{
    let mut kept = Map::new();

    for (key, value) in polluted {
        path.push(key.clone());
        match value {
            Value::Object(child) => {
                let child = prune(cleaned, child, path, is_whitelisted, max_key_length);
                if !child.is_empty() {
                    kept.insert(key, Value::Object(child));
                }
            }
            leaf => {
                if is_whitelisted(path.as_slice()) {
                    if let Err(leaf) = write_back(cleaned, path, leaf, max_key_length) {
                        kept.insert(key, leaf);
                    }
                } else {
                    kept.insert(key, leaf);
                }
            }
        }
        path.pop();
    }

    kept
}

/// Writes `value` into `cleaned` at `path`, re-splitting segments that still
/// carry literal dots. Hands the value back if a resulting segment fails the
/// key guard.
fn write_back(cleaned: &mut Map<String, Value>, path: &[String], value: Value, max_key_length: usize) -> Result<(), Value> {
    let mut segments = Vec::with_capacity(path.len());
    for segment in path {
        let parts: Vec<&str> = segment.split('.').filter(|part| !part.is_empty()).collect();
        if parts.is_empty() {
            segments.push(segment.clone());
        } else {
            segments.extend(parts.into_iter().map(str::to_string));
        }
    }

    if let Some(bad) = segments
        .iter()
        .find(|segment| is_safe_key(segment.as_str(), max_key_length).is_none())
    {
        debug!("Refusing to restore '{}': unsafe segment '{}'.", join_path(path), loggable_key(bad));
        return Err(value);
    }

    debug!("Restoring whitelisted array at '{}'.", join_path(&segments));
    set_at_path(cleaned, &segments, value);
    Ok(())
}
