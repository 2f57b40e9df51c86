//! Parses period information out of XBRL context identifier strings.
//!
//! Context identifiers encode the reporting period in several competing
//! conventions:
//!
//! - `Duration_1_1_2024_To_12_31_2024_<dimensional_hash>`
//! - `Instant_12_31_2024_<dimensional_hash>`
//! - `From2024-01-01To2024-12-31_<hash>`
//! - `AsOf2024-12-31_<hash>`
//!
//! Extraction tries an ordered cascade of matchers, each a pure function
//! returning an optional structured result; the first hit wins. Extraction
//! is total: an unrecognized identifier yields a [`PeriodKind::Unknown`]
//! result with only the raw string populated, never an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKind {
    /// Period of time (e.g. year ended Dec 31, 2024).
    Duration,
    /// Point in time (e.g. as of Dec 31, 2024).
    Instant,
    #[default]
    Unknown,
}

/// Period information extracted from a context identifier.
///
/// `period_key` is a normalized string usable as an equality key:
/// `d_2024-01-01_2024-12-31` for durations, `i_2024-12-31` for instants,
/// `y_2024` when only a year could be recovered, empty otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodInfo {
    pub kind: PeriodKind,
    /// Start date as `YYYY-MM-DD` (durations only).
    pub start: Option<String>,
    /// End date as `YYYY-MM-DD` (durations and instants).
    pub end: Option<String>,
    /// Year, when a full date could not be recovered.
    pub year: Option<String>,
    pub period_key: String,
    /// The identifier (or matched portion) this was derived from.
    pub raw: String,
}

impl PeriodInfo {
    pub fn is_duration(&self) -> bool {
        self.kind == PeriodKind::Duration
    }

    pub fn is_instant(&self) -> bool {
        self.kind == PeriodKind::Instant
    }

    pub fn has_full_dates(&self) -> bool {
        match self.kind {
            PeriodKind::Duration => self.start.is_some() && self.end.is_some(),
            PeriodKind::Instant => self.end.is_some(),
            PeriodKind::Unknown => false,
        }
    }
}

// Date component fragments: 1-2 digit month/day, 4 digit year, any of the
// separators different XBRL tools emit, and the duration range indicator.
const SEP: &str = r"[_\-.]";
const RANGE: &str = r"[_\-.]?(?:to|through|thru)[_\-.]?";

static DURATION_MDY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:duration|period|from){SEP}(\d{{1,2}}){SEP}(\d{{1,2}}){SEP}(\d{{4}}){RANGE}(\d{{1,2}}){SEP}(\d{{1,2}}){SEP}(\d{{4}})"
    ))
    .expect("duration m/d/y pattern")
});

// ISO forms allow the leading separator to be absent (From2024-01-01To...).
static DURATION_YMD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:duration|period|from){SEP}?(\d{{4}}){SEP}(\d{{2}}){SEP}(\d{{2}}){RANGE}(\d{{4}}){SEP}(\d{{2}}){SEP}(\d{{2}})"
    ))
    .expect("duration ISO pattern")
});

static INSTANT_MDY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:asof|instant|as_of|at){SEP}(\d{{1,2}}){SEP}(\d{{1,2}}){SEP}(\d{{4}})"
    ))
    .expect("instant m/d/y pattern")
});

static INSTANT_YMD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:asof|instant|as_of|at){SEP}?(\d{{4}}){SEP}(\d{{2}}){SEP}(\d{{2}})"
    ))
    .expect("instant ISO pattern")
});

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("year pattern"));

// Period portion (identifier minus the trailing dimensional hash).
static PORTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)^(Duration_\d+_\d+_\d{4}_To_\d+_\d+_\d{4})_[A-Za-z0-9]+$",
        r"(?i)^(Instant_\d+_\d+_\d{4})_[A-Za-z0-9]+$",
        r"(?i)^(From\d{4}-\d{2}-\d{2}To\d{4}-\d{2}-\d{2})_[A-Za-z0-9]+$",
        r"(?i)^(AsOf\d{4}-\d{2}-\d{2})_[A-Za-z0-9]+$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("period portion pattern"))
    .collect()
});

static SIMPLE_CONTEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]-\d+$").expect("simple context pattern"));

/// Extracts period information from a context identifier.
///
/// Deterministic and total: always returns a `PeriodInfo`, falling back to
/// the unknown variant when nothing matches.
pub fn extract(context_id: &str) -> PeriodInfo {
    if context_id.is_empty() {
        return PeriodInfo::default();
    }

    let lower = context_id.to_lowercase();
    let kind_hint = detect_kind(&lower);

    let matchers: [fn(&str) -> Option<PeriodInfo>; 4] = [
        match_duration_mdy,
        match_duration_ymd,
        match_instant_mdy,
        match_instant_ymd,
    ];
    for matcher in matchers {
        if let Some(info) = matcher(&lower) {
            return info;
        }
    }

    // Year-only fallback: any 4-digit run qualifies.
    if let Some(m) = YEAR.find(context_id) {
        let year = m.as_str().to_string();
        return PeriodInfo {
            kind: kind_hint,
            year: Some(year.clone()),
            period_key: format!("y_{year}"),
            raw: context_id.to_string(),
            ..PeriodInfo::default()
        };
    }

    PeriodInfo {
        raw: context_id.to_string(),
        ..PeriodInfo::default()
    }
}

/// Strips the dimensional hash suffix from a context identifier, returning
/// just the period portion. Identifiers without a recognized period prefix
/// return `None`; bare simple ids (`c-4`) are returned unchanged.
pub fn extract_period_portion(context_id: &str) -> Option<String> {
    if context_id.is_empty() {
        return None;
    }
    for pattern in PORTION_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(context_id) {
            return Some(caps[1].to_string());
        }
    }
    if SIMPLE_CONTEXT.is_match(context_id) {
        return Some(context_id.to_string());
    }
    None
}

// Indicator substrings checked in order, more specific ones first. The
// final flag restricts matching to a leading prefix: "at" is too short to
// trust anywhere else (it sits inside "Consolidated", "Statement", ...).
const KIND_INDICATORS: [(&str, PeriodKind, bool); 7] = [
    ("duration", PeriodKind::Duration, false),
    ("period", PeriodKind::Duration, false),
    ("from", PeriodKind::Duration, false),
    ("asof", PeriodKind::Instant, false),
    ("instant", PeriodKind::Instant, false),
    ("as_of", PeriodKind::Instant, false),
    ("at", PeriodKind::Instant, true),
];

fn detect_kind(lower: &str) -> PeriodKind {
    for (indicator, kind, prefix_only) in KIND_INDICATORS {
        let hit = if prefix_only {
            lower.starts_with(indicator)
        } else {
            lower.contains(indicator)
        };
        if hit {
            return kind;
        }
    }
    PeriodKind::Unknown
}

fn match_duration_mdy(lower: &str) -> Option<PeriodInfo> {
    let caps = DURATION_MDY.captures(lower)?;
    let start = format_date(&caps[3], &caps[1], &caps[2])?;
    let end = format_date(&caps[6], &caps[4], &caps[5])?;
    Some(duration_info(start, end, caps[6].to_string(), &caps[0]))
}

fn match_duration_ymd(lower: &str) -> Option<PeriodInfo> {
    let caps = DURATION_YMD.captures(lower)?;
    let start = format_date(&caps[1], &caps[2], &caps[3])?;
    let end = format_date(&caps[4], &caps[5], &caps[6])?;
    Some(duration_info(start, end, caps[4].to_string(), &caps[0]))
}

fn match_instant_mdy(lower: &str) -> Option<PeriodInfo> {
    let caps = INSTANT_MDY.captures(lower)?;
    let end = format_date(&caps[3], &caps[1], &caps[2])?;
    Some(instant_info(end, caps[3].to_string(), &caps[0]))
}

fn match_instant_ymd(lower: &str) -> Option<PeriodInfo> {
    let caps = INSTANT_YMD.captures(lower)?;
    let end = format_date(&caps[1], &caps[2], &caps[3])?;
    Some(instant_info(end, caps[1].to_string(), &caps[0]))
}

fn duration_info(start: String, end: String, year: String, raw: &str) -> PeriodInfo {
    PeriodInfo {
        kind: PeriodKind::Duration,
        period_key: format!("d_{start}_{end}"),
        start: Some(start),
        end: Some(end),
        year: Some(year),
        raw: raw.to_string(),
    }
}

fn instant_info(end: String, year: String, raw: &str) -> PeriodInfo {
    PeriodInfo {
        kind: PeriodKind::Instant,
        period_key: format!("i_{end}"),
        start: None,
        end: Some(end),
        year: Some(year),
        raw: raw.to_string(),
    }
}

/// Formats date components as `YYYY-MM-DD`, zero-padding month and day.
fn format_date(year: &str, month: &str, day: &str) -> Option<String> {
    let m: u32 = month.parse().ok()?;
    let d: u32 = day.parse().ok()?;
    Some(format!("{year}-{m:02}-{d:02}"))
}
