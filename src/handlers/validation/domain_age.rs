//! Deterministic stand-in for a WHOIS domain-age lookup.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainAge {
    New,
    Recent,
    Established,
    Mature,
    Old,
}

impl DomainAge {
    const BUCKETS: [DomainAge; 5] = [
        DomainAge::New,
        DomainAge::Recent,
        DomainAge::Established,
        DomainAge::Mature,
        DomainAge::Old,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DomainAge::New => "New (<30 days)",
            DomainAge::Recent => "Recent (1-6 months)",
            DomainAge::Established => "Established (6-12 months)",
            DomainAge::Mature => "Mature (1-5 years)",
            DomainAge::Old => "Old (5+ years)",
        }
    }

    /// Trust points removed for a domain of this age.
    pub fn penalty(&self) -> i32 {
        match self {
            DomainAge::New => 15,
            DomainAge::Recent => 5,
            _ => 0,
        }
    }

    pub fn labels() -> impl Iterator<Item = &'static str> {
        Self::BUCKETS.iter().map(DomainAge::label)
    }
}

/// 32-bit rolling hash over UTF-16 code units, `h = h * 31 + unit` with
/// signed wrap-around.
pub fn domain_hash(domain: &str) -> i32 {
    domain
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Maps a domain onto one of the five age buckets.
///
/// Pure: the same domain yields the same bucket on every call and in every
/// process.
pub fn estimate_age(domain: &str) -> DomainAge {
    let index = domain_hash(domain).unsigned_abs() % 5;
    DomainAge::BUCKETS[index as usize]
}
