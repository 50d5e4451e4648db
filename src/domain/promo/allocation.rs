//! Unique-code allocation.
//!
//! A unique pool may legally contain the same literal code more than once;
//! every occurrence is its own slot. Allocation therefore compares multiset
//! membership: each entry of `used` cancels exactly one matching entry of
//! `codes`, scanning `codes` in declared order.

use std::collections::HashMap;

/// Returns the first slot of `codes` not yet consumed by `used`, counted with
/// multiplicity, or `None` when every slot is consumed.
pub fn next_unique_code<'a>(codes: &'a [String], used: &[String]) -> Option<&'a str> {
    let mut consumed: HashMap<&str, usize> = HashMap::with_capacity(used.len());
    for code in used {
        *consumed.entry(code.as_str()).or_insert(0) += 1;
    }

    for code in codes {
        match consumed.get_mut(code.as_str()) {
            Some(remaining) if *remaining > 0 => *remaining -= 1,
            _ => return Some(code.as_str()),
        }
    }

    None
}
