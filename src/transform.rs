use std::collections::HashSet;

use tracing::info;

use crate::parser::Zone;
use crate::record::Record;

/// Drop records whose canonical line duplicates an earlier record in the
/// same kind bucket. The first occurrence keeps its relative position.
/// Flags the zone modified only when something was actually dropped.
pub fn remove_duplicates(zone: &mut Zone) {
    for (kind, bucket) in zone.records.iter_mut() {
        let before = bucket.len();
        let mut seen = HashSet::new();
        bucket.retain(|record| seen.insert(record.canonical_line()));
        let dropped = before - bucket.len();
        if dropped > 0 {
            info!("{}: removed {dropped} duplicate {kind} record(s)", zone.file);
            zone.modified = true;
        }
    }
}

/// Stable-sort every kind bucket by its own comparison rule. Sorting an
/// already-sorted zone is a no-op and must not flip the modified flag.
pub fn sort(zone: &mut Zone) {
    let mut reordered = false;
    for bucket in zone.records.values_mut() {
        let before: Vec<String> = bucket.iter().map(Record::canonical_line).collect();
        bucket.sort_by(|a, b| a.cmp_within_kind(b));
        reordered |= bucket
            .iter()
            .zip(&before)
            .any(|(record, old)| record.canonical_line() != *old);
    }
    if reordered {
        info!("{}: records reordered into canonical order", zone.file);
        zone.modified = true;
    }
}
