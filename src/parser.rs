use std::collections::BTreeMap;

use tracing::warn;

use crate::error::ZoneError;
use crate::record::{DnsClass, Record, RecordKind, SoaRecord};

/// A parsed zone file: the default TTL directive (if any), the single SOA
/// record, and every other supported record bucketed by kind in file order.
#[derive(Debug)]
pub struct Zone {
    pub ttl: Option<u32>,
    pub soa: SoaRecord,
    pub records: BTreeMap<RecordKind, Vec<Record>>,
    /// Set once a content-changing transform ran; checked at save time.
    pub modified: bool,
    /// File name kept for error and log messages.
    pub file: String,
}

impl Zone {
    pub fn record_count(&self, kind: RecordKind) -> usize {
        self.records.get(&kind).map_or(0, Vec::len)
    }
}

/// Parse a `$TTL` style duration: either bare seconds or a compound of
/// unit-suffixed values such as `1h`, `2d`, `1w30m`.
pub fn parse_ttl_duration(token: &str) -> Option<u32> {
    if token.is_empty() {
        return None;
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        return token.parse().ok();
    }
    let mut total: u64 = 0;
    let mut digits = String::new();
    for c in token.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit: u64 = match c.to_ascii_lowercase() {
            's' => 1,
            'm' => 60,
            'h' => 3600,
            'd' => 86400,
            'w' => 604800,
            _ => return None,
        };
        if digits.is_empty() {
            return None;
        }
        let value: u64 = digits.parse().ok()?;
        total = total.checked_add(value.checked_mul(unit)?)?;
        digits.clear();
    }
    // A compound value must not end in a bare number ("1h30" is malformed).
    if !digits.is_empty() {
        return None;
    }
    u32::try_from(total).ok()
}

/// Strip the comment from one physical line and neutralize parentheses,
/// tracking the open-paren depth across lines. `;` starts a comment only
/// outside quoted rdata; parentheses inside quotes are literal too.
fn scrub_line(line: &str, depth: &mut usize) -> String {
    let mut out = String::new();
    let mut in_quotes = false;
    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                out.push(c);
            }
            ';' if !in_quotes => break,
            '(' if !in_quotes => {
                *depth += 1;
                out.push(' ');
            }
            ')' if !in_quotes => {
                *depth = depth.saturating_sub(1);
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Fold the raw text into logical record lines: comments stripped, spans
/// between `(` and `)` joined into a single line. Leading whitespace of the
/// first physical line survives, it carries the owner-elision signal.
fn logical_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for raw_line in content.lines() {
        let piece = scrub_line(raw_line, &mut depth);
        if current.is_empty() {
            current.push_str(&piece);
        } else {
            current.push(' ');
            current.push_str(piece.trim());
        }
        if depth == 0 {
            if !current.trim().is_empty() {
                lines.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    // Unbalanced parentheses: keep what accumulated rather than dropping it.
    if !current.trim().is_empty() {
        lines.push(current);
    }
    lines
}

struct RecordLine<'a> {
    owner: String,
    ttl: u32,
    class: DnsClass,
    kind_token: &'a str,
    rdata: Vec<&'a str>,
}

/// Running state for the owner/TTL/class elision rules of the master-file
/// grammar.
#[derive(Default)]
struct ElisionState {
    owner: Option<String>,
    ttl: Option<u32>,
    class: Option<DnsClass>,
}

fn split_record_line<'a>(
    line: &'a str,
    default_ttl: Option<u32>,
    state: &mut ElisionState,
) -> Option<RecordLine<'a>> {
    let elide_owner = line.starts_with([' ', '\t']);
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let mut idx = 0;
    let owner = if elide_owner {
        match &state.owner {
            Some(owner) => owner.clone(),
            None => {
                warn!("record line before any owner name, skipping: {}", line.trim());
                return None;
            }
        }
    } else {
        idx = 1;
        state.owner = Some(tokens[0].to_string());
        tokens[0].to_string()
    };

    // TTL and class are both optional and may appear in either order
    // before the type token.
    let mut ttl: Option<u32> = None;
    let mut class: Option<DnsClass> = None;
    let kind_token = loop {
        let tok = *tokens.get(idx)?;
        if ttl.is_none() && tok.chars().all(|c| c.is_ascii_digit()) {
            ttl = tok.parse().ok();
            idx += 1;
            continue;
        }
        if class.is_none() {
            if let Some(c) = DnsClass::parse(tok) {
                class = Some(c);
                idx += 1;
                continue;
            }
        }
        break tok;
    };
    idx += 1;

    if let Some(t) = ttl {
        state.ttl = Some(t);
    }
    if let Some(c) = class {
        state.class = Some(c);
    }

    Some(RecordLine {
        owner,
        ttl: ttl.or(default_ttl).or(state.ttl).unwrap_or(0),
        class: class.or(state.class).unwrap_or_default(),
        kind_token,
        rdata: tokens[idx..].to_vec(),
    })
}

fn parse_soa(line: &RecordLine<'_>) -> Option<SoaRecord> {
    if line.rdata.len() < 7 {
        return None;
    }
    Some(SoaRecord {
        owner: line.owner.to_string(),
        ttl: line.ttl,
        class: line.class,
        mname: line.rdata[0].to_string(),
        rname: line.rdata[1].to_string(),
        serial: line.rdata[2].parse().ok()?,
        refresh: line.rdata[3].parse().ok()?,
        retry: line.rdata[4].parse().ok()?,
        expire: line.rdata[5].parse().ok()?,
        minimum: line.rdata[6].parse().ok()?,
    })
}

/// Parse the full text of a zone master file.
///
/// Fatal conditions are a malformed `$TTL` value and the absence of an SOA
/// record. Unrecognized record types and malformed record lines are skipped
/// with a warning, matching the lenient behavior zone-cleaning tools need
/// when fed hand-maintained files.
pub fn parse_zone(raw: &str, file: &str) -> Result<Zone, ZoneError> {
    let mut default_ttl: Option<u32> = None;
    let mut soa: Option<SoaRecord> = None;
    let mut records: BTreeMap<RecordKind, Vec<Record>> = BTreeMap::new();
    let mut state = ElisionState::default();

    for line in logical_lines(raw) {
        let trimmed = line.trim_start();
        if let Some(directive) = trimmed.split_whitespace().next() {
            if directive.eq_ignore_ascii_case("$TTL") {
                let token = trimmed.split_whitespace().nth(1).unwrap_or("");
                let value =
                    parse_ttl_duration(token).ok_or_else(|| ZoneError::InvalidTtl {
                        file: file.to_string(),
                        token: token.to_string(),
                    })?;
                if default_ttl.is_none() {
                    default_ttl = Some(value);
                }
                continue;
            }
            if directive.starts_with('$') {
                warn!("{file}: unsupported directive {directive}, skipping");
                continue;
            }
        }

        let Some(record_line) = split_record_line(&line, default_ttl, &mut state) else {
            warn!("{file}: malformed record line, skipping: {}", line.trim());
            continue;
        };

        let Some(kind) = RecordKind::parse(record_line.kind_token) else {
            warn!(
                "{file}: unrecognized record type {}, skipping",
                record_line.kind_token
            );
            continue;
        };

        if kind == RecordKind::Soa {
            match parse_soa(&record_line) {
                Some(parsed) if soa.is_none() => soa = Some(parsed),
                Some(_) => warn!("{file}: extra SOA record ignored"),
                None => warn!("{file}: malformed SOA record, skipping"),
            }
            continue;
        }

        if record_line.rdata.is_empty() {
            warn!("{file}: record without rdata, skipping: {}", line.trim());
            continue;
        }

        records.entry(kind).or_default().push(Record {
            owner: record_line.owner.to_string(),
            ttl: record_line.ttl,
            class: record_line.class,
            kind,
            rdata: record_line.rdata.join(" "),
            comment: None,
        });
    }

    let soa = soa.ok_or_else(|| ZoneError::MissingSoa {
        file: file.to_string(),
    })?;

    Ok(Zone {
        ttl: default_ttl,
        soa,
        records,
        modified: false,
        file: file.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONE: &str = "\
$TTL 3600
example.com.\t3600\tIN\tSOA\tns1.example.com. admin.example.com. (
\t\t\t\t2023101001\t; serial
\t\t\t\t3600\t; refresh
\t\t\t\t900\t; retry
\t\t\t\t604800\t; expire
\t\t\t\t86400)\t; minimum
example.com.\t3600\tIN\tNS\tns1.example.com.
example.com.\t3600\tIN\tNS\tns2.example.com.
www.example.com.\t3600\tIN\tA\t192.168.1.10
mail.example.com.\t3600\tIN\tA\t192.168.1.20
ftp.example.com.\t3600\tIN\tCNAME\twww.example.com.
";

    #[test]
    fn test_parse_full_zone() {
        let zone = parse_zone(ZONE, "example.com.db").unwrap();
        assert_eq!(zone.ttl, Some(3600));
        assert_eq!(zone.soa.serial, 2023101001);
        assert_eq!(zone.soa.mname, "ns1.example.com.");
        assert_eq!(zone.soa.rname, "admin.example.com.");
        assert_eq!(zone.soa.minimum, 86400);
        assert_eq!(zone.record_count(RecordKind::A), 2);
        assert_eq!(zone.record_count(RecordKind::Ns), 2);
        assert_eq!(zone.record_count(RecordKind::Cname), 1);
        assert!(!zone.modified);
    }

    #[test]
    fn test_parse_records_keep_file_order() {
        let zone = parse_zone(ZONE, "example.com.db").unwrap();
        let a = &zone.records[&RecordKind::A];
        assert_eq!(a[0].owner, "www.example.com.");
        assert_eq!(a[1].owner, "mail.example.com.");
    }

    #[test]
    fn test_missing_soa_empty_file() {
        let err = parse_zone("", "empty.db").unwrap_err();
        assert!(matches!(err, ZoneError::MissingSoa { ref file } if file == "empty.db"));
    }

    #[test]
    fn test_missing_soa_with_other_records() {
        let text = "$TTL 3600\nwww.example.com.\t3600\tIN\tA\t192.168.1.10\n\
                    example.com.\t3600\tIN\tNS\tns1.example.com.\n";
        let err = parse_zone(text, "nosoa.db").unwrap_err();
        assert!(matches!(err, ZoneError::MissingSoa { .. }));
    }

    #[test]
    fn test_invalid_ttl_names_token() {
        let err = parse_zone("$TTL INVALID\n", "bad.db").unwrap_err();
        match err {
            ZoneError::InvalidTtl { file, token } => {
                assert_eq!(file, "bad.db");
                assert_eq!(token, "INVALID");
            }
            other => panic!("expected InvalidTtl, got {other:?}"),
        }
    }

    #[test]
    fn test_no_ttl_directive_is_not_an_error() {
        let text = "example.com.\t3600\tIN\tSOA\tns1. admin. 1 2 3 4 5\n";
        let zone = parse_zone(text, "nottl.db").unwrap();
        assert_eq!(zone.ttl, None);
    }

    #[test]
    fn test_ttl_duration_units() {
        assert_eq!(parse_ttl_duration("3600"), Some(3600));
        assert_eq!(parse_ttl_duration("1h"), Some(3600));
        assert_eq!(parse_ttl_duration("2d"), Some(172800));
        assert_eq!(parse_ttl_duration("1w"), Some(604800));
        assert_eq!(parse_ttl_duration("1h30m"), Some(5400));
        assert_eq!(parse_ttl_duration("1W2D"), Some(777600));
        assert_eq!(parse_ttl_duration(""), None);
        assert_eq!(parse_ttl_duration("h"), None);
        assert_eq!(parse_ttl_duration("1h30"), None);
        assert_eq!(parse_ttl_duration("1x"), None);
    }

    #[test]
    fn test_ttl_with_suffix_in_directive() {
        let text = "$TTL 1h\nexample.com.\tIN\tSOA\tns1. admin. 1 2 3 4 5\n";
        let zone = parse_zone(text, "suffix.db").unwrap();
        assert_eq!(zone.ttl, Some(3600));
    }

    #[test]
    fn test_owner_elision_reuses_previous_owner() {
        let text = "$TTL 3600\n\
                    example.com.\tIN\tSOA\tns1. admin. 1 2 3 4 5\n\
                    www.example.com.\tIN\tA\t192.168.1.10\n\
                    \tIN\tA\t192.168.1.11\n";
        let zone = parse_zone(text, "elide.db").unwrap();
        let a = &zone.records[&RecordKind::A];
        assert_eq!(a.len(), 2);
        assert_eq!(a[1].owner, "www.example.com.");
        assert_eq!(a[1].rdata, "192.168.1.11");
    }

    #[test]
    fn test_ttl_and_class_elision() {
        let text = "$TTL 900\n\
                    example.com.\tIN\tSOA\tns1. admin. 1 2 3 4 5\n\
                    www.example.com.\tA\t192.168.1.10\n\
                    mail.example.com.\t7200\tCH\tA\t192.168.1.20\n\
                    ftp.example.com.\tA\t192.168.1.30\n";
        let zone = parse_zone(text, "elide.db").unwrap();
        let a = &zone.records[&RecordKind::A];
        assert_eq!(a[0].ttl, 900);
        assert_eq!(a[0].class, DnsClass::In);
        assert_eq!(a[1].ttl, 7200);
        assert_eq!(a[1].class, DnsClass::Ch);
        // Zone default TTL still wins over the last explicit one,
        // the explicit class sticks.
        assert_eq!(a[2].ttl, 900);
        assert_eq!(a[2].class, DnsClass::Ch);
    }

    #[test]
    fn test_multiline_soa_with_comments() {
        let zone = parse_zone(ZONE, "example.com.db").unwrap();
        assert_eq!(zone.soa.refresh, 3600);
        assert_eq!(zone.soa.retry, 900);
        assert_eq!(zone.soa.expire, 604800);
    }

    #[test]
    fn test_unrecognized_types_are_skipped() {
        let text = "$TTL 3600\n\
                    example.com.\tIN\tSOA\tns1. admin. 1 2 3 4 5\n\
                    example.com.\tIN\tMX\t10 mail.example.com.\n\
                    example.com.\tIN\tTXT\t\"v=spf1 -all\"\n\
                    www.example.com.\tIN\tA\t192.168.1.10\n";
        let zone = parse_zone(text, "mixed.db").unwrap();
        assert_eq!(zone.record_count(RecordKind::A), 1);
        assert_eq!(zone.records.len(), 1);
    }

    #[test]
    fn test_aaaa_records_are_parsed() {
        let text = "$TTL 3600\n\
                    example.com.\tIN\tSOA\tns1. admin. 1 2 3 4 5\n\
                    www.example.com.\tIN\tAAAA\t2001:db8::1\n";
        let zone = parse_zone(text, "v6.db").unwrap();
        assert_eq!(zone.record_count(RecordKind::Aaaa), 1);
        assert_eq!(zone.records[&RecordKind::Aaaa][0].rdata, "2001:db8::1");
    }

    #[test]
    fn test_semicolon_inside_quotes_is_not_a_comment() {
        // TXT is skipped as unsupported, but the quoted ';' must not
        // swallow the rest of the file.
        let text = "$TTL 3600\n\
                    example.com.\tIN\tTXT\t\"no;comment\"\n\
                    example.com.\tIN\tSOA\tns1. admin. 1 2 3 4 5\n";
        let zone = parse_zone(text, "quoted.db").unwrap();
        assert_eq!(zone.soa.serial, 1);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let text = "$TTL 3600\n\
                    example.com.\tIN\tSOA\tns1. admin. 1 2 3 4 5\n\
                    justanowner\n\
                    www.example.com.\tIN\tA\t192.168.1.10\n";
        let zone = parse_zone(text, "broken.db").unwrap();
        assert_eq!(zone.record_count(RecordKind::A), 1);
    }

    #[test]
    fn test_extra_soa_is_ignored() {
        let text = "example.com.\tIN\tSOA\tns1. admin. 11 2 3 4 5\n\
                    example.com.\tIN\tSOA\tns2. admin. 99 2 3 4 5\n";
        let zone = parse_zone(text, "double.db").unwrap();
        assert_eq!(zone.soa.serial, 11);
    }

    #[test]
    fn test_ptr_zone() {
        let text = "$TTL 86400\n\
                    1.168.192.in-addr.arpa.\tIN\tSOA\tns1. admin. 7 2 3 4 5\n\
                    10.1.168.192.in-addr.arpa.\tIN\tPTR\twww.example.com.\n\
                    20.1.168.192.in-addr.arpa.\tIN\tPTR\tmail.example.com.\n";
        let zone = parse_zone(text, "192.168.1.db").unwrap();
        assert_eq!(zone.record_count(RecordKind::Ptr), 2);
    }
}
