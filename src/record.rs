use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    A,
    Aaaa,
    Ns,
    Cname,
    Ptr,
    Soa,
}

impl RecordKind {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "A" => Some(RecordKind::A),
            "AAAA" => Some(RecordKind::Aaaa),
            "NS" => Some(RecordKind::Ns),
            "CNAME" => Some(RecordKind::Cname),
            "PTR" => Some(RecordKind::Ptr),
            "SOA" => Some(RecordKind::Soa),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::A => "A",
            RecordKind::Aaaa => "AAAA",
            RecordKind::Ns => "NS",
            RecordKind::Cname => "CNAME",
            RecordKind::Ptr => "PTR",
            RecordKind::Soa => "SOA",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DnsClass {
    #[default]
    In,
    Ch,
}

impl DnsClass {
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "IN" => Some(DnsClass::In),
            "CH" => Some(DnsClass::Ch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DnsClass::In => "IN",
            DnsClass::Ch => "CH",
        }
    }
}

impl fmt::Display for DnsClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single resource record with its rdata kept as the already-rendered
/// right-hand side. Owner names are case-preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub owner: String,
    pub ttl: u32,
    pub class: DnsClass,
    pub kind: RecordKind,
    pub rdata: String,
    /// Reserved for a future preserve-comments mode, never set by the parser.
    pub comment: Option<String>,
}

impl Record {
    /// Canonical one-line zone file rendering. Two records are duplicates
    /// iff these lines are byte-identical.
    pub fn canonical_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.owner, self.ttl, self.class, self.kind, self.rdata
        )
    }

    /// Ordering within this record's kind bucket. Never meaningful across
    /// kinds; buckets are sorted independently.
    pub fn cmp_within_kind(&self, other: &Record) -> Ordering {
        match self.kind {
            RecordKind::Ptr => self.cmp_ptr(other),
            _ => self.cmp_default(other),
        }
    }

    fn cmp_default(&self, other: &Record) -> Ordering {
        let owner = self.owner.to_lowercase().cmp(&other.owner.to_lowercase());
        if owner != Ordering::Equal {
            return owner;
        }
        self.rdata.to_lowercase().cmp(&other.rdata.to_lowercase())
    }

    fn cmp_ptr(&self, other: &Record) -> Ordering {
        let key = ptr_sort_key(&self.owner).cmp(&ptr_sort_key(&other.owner));
        if key != Ordering::Equal {
            return key;
        }
        self.rdata.to_lowercase().cmp(&other.rdata.to_lowercase())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_line())
    }
}

/// Sort key for one owner-name label: numeric labels order before
/// alphabetic ones and compare by value, so `2` < `10` < `foo`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum LabelKey {
    Num(u64),
    Text(String),
}

fn ptr_sort_key(owner: &str) -> Vec<LabelKey> {
    owner
        .split('.')
        .map(|label| {
            let all_digits = !label.is_empty() && label.chars().all(|c| c.is_ascii_digit());
            match label.parse::<u64>() {
                Ok(n) if all_digits => LabelKey::Num(n),
                _ => LabelKey::Text(label.to_lowercase()),
            }
        })
        .collect()
}

/// The zone's single start-of-authority record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoaRecord {
    pub owner: String,
    pub ttl: u32,
    pub class: DnsClass,
    pub mname: String,
    pub rname: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

impl SoaRecord {
    /// Serial arithmetic wraps mod 2^32 (RFC 1982).
    pub fn increment_serial(&mut self) {
        self.serial = self.serial.wrapping_add(1);
    }
}

impl fmt::Display for SoaRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\tSOA\t{} {} (\n\
             \t\t\t\t{}\t; serial\n\
             \t\t\t\t{}\t; refresh\n\
             \t\t\t\t{}\t; retry\n\
             \t\t\t\t{}\t; expire\n\
             \t\t\t\t{})\t; minimum",
            self.owner,
            self.ttl,
            self.class,
            self.mname,
            self.rname,
            self.serial,
            self.refresh,
            self.retry,
            self.expire,
            self.minimum
        )
    }
}
