//! Record filtering by canonical CUSIP
//!
//! Two independent passes, applied in order:
//!
//! 1. [`drop_absent`] removes records whose identifier has no canonical form
//! 2. [`drop_duplicates`] keeps the first record for each canonical identifier
//!
//! [`normalize_all`] produces the input to the first pass. It is a plain map
//! with no shared state; only the duplicate pass depends on record order.

use std::collections::HashSet;

use crate::cusip::{self, Cusip};

/// A record paired with its (possibly absent) canonical identifier
#[derive(Debug, Clone, PartialEq)]
pub struct Keyed<T> {
    pub cusip: Option<Cusip>,
    pub record: T,
}

/// Attach a canonical identifier to every record, preserving order
pub fn normalize_all<T, F>(records: impl IntoIterator<Item = T>, raw_of: F) -> Vec<Keyed<T>>
where
    F: Fn(&T) -> Option<&str>,
{
    records
        .into_iter()
        .map(|record| Keyed {
            cusip: cusip::normalize(raw_of(&record)),
            record,
        })
        .collect()
}

/// Drop records whose identifier normalized to absent
pub fn drop_absent<T>(keyed: Vec<Keyed<T>>) -> Vec<(Cusip, T)> {
    keyed
        .into_iter()
        .filter_map(|k| k.cusip.map(|c| (c, k.record)))
        .collect()
}

/// Keep only the first record per canonical identifier, in input order
pub fn drop_duplicates<T>(records: Vec<(Cusip, T)>) -> Vec<(Cusip, T)> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|(c, _)| seen.insert(c.clone()))
        .collect()
}
