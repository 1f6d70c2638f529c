//! The building blocks of the HPP sanitization pipeline.
//!
//! The pipeline runs in three passes over an already-parsed JSON tree:
//! `expander` turns dot/bracket keys into real nesting, `reducer` walks the
//! result under depth/key/array bounds and collapses arrays, and `restore`
//! puts whitelisted arrays back. `key_guard` is consulted by all three.
//!
//! This module works closely with `merge` (reduction strategies) and
//! `whitelist` (restoration decisions).

pub mod cache;
pub mod expander;
pub mod key_guard;
pub mod reducer;
pub mod restore;
pub mod tree;
