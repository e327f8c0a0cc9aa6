use std::fmt::Write;

use crate::parser::Zone;
use crate::record::RecordKind;

/// Render the zone back to canonical zone file text: the `$TTL` directive
/// when one was declared, the SOA block, the NS records, then every other
/// kind in a fixed order (A, AAAA, CNAME, PTR), one line per record.
///
/// Pure function of the zone's current state, no I/O.
pub fn render(zone: &Zone) -> String {
    let mut output = String::new();

    if let Some(ttl) = zone.ttl {
        writeln!(output, "$TTL\t{ttl}").unwrap();
    }

    writeln!(output, "{}", zone.soa).unwrap();

    if let Some(ns) = zone.records.get(&RecordKind::Ns) {
        for record in ns {
            writeln!(output, "{record}").unwrap();
        }
    }

    for (kind, bucket) in &zone.records {
        if *kind == RecordKind::Ns {
            continue;
        }
        for record in bucket {
            writeln!(output, "{record}").unwrap();
        }
    }

    output
}
