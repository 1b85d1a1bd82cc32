//! Data models for the resource tracker.
//!
//! This module contains the records consumed from the summary API
//! (deposits, members, alliances) and the derived records produced by
//! aggregation and rendered into reports.

pub mod lenient;

use crate::analysis::DepositFilter;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four tracked resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Food,
    Wood,
    Stone,
    Gold,
}

impl Resource {
    /// All resources in display order.
    pub const ALL: [Resource; 4] = [
        Resource::Food,
        Resource::Wood,
        Resource::Stone,
        Resource::Gold,
    ];

    /// Returns an emoji representation of the resource.
    pub fn emoji(&self) -> &'static str {
        match self {
            Resource::Food => "🌾",
            Resource::Wood => "🪵",
            Resource::Stone => "🪨",
            Resource::Gold => "🪙",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Food => write!(f, "Food"),
            Resource::Wood => write!(f, "Wood"),
            Resource::Stone => write!(f, "Stone"),
            Resource::Gold => write!(f, "Gold"),
        }
    }
}

/// Amounts of each resource.
///
/// Missing or malformed amounts deserialize as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default, deserialize_with = "lenient::amount")]
    pub food: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub wood: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub stone: f64,
    #[serde(default, deserialize_with = "lenient::amount")]
    pub gold: f64,
}

impl Resources {
    /// Sum of all four resources.
    pub fn total(&self) -> f64 {
        self.food + self.wood + self.stone + self.gold
    }

    /// Amount of a single resource.
    pub fn get(&self, resource: Resource) -> f64 {
        match resource {
            Resource::Food => self.food,
            Resource::Wood => self.wood,
            Resource::Stone => self.stone,
            Resource::Gold => self.gold,
        }
    }

    /// Accumulate another set of amounts into this one.
    pub fn add(&mut self, other: &Resources) {
        self.food += other.food;
        self.wood += other.wood;
        self.stone += other.stone;
        self.gold += other.gold;
    }
}

/// A single weekly contribution submitted by a member.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Deposit {
    /// Backend record id.
    #[serde(default, deserialize_with = "lenient::identifier")]
    pub id: Option<String>,
    /// Display name of the contributing member.
    #[serde(default, deserialize_with = "lenient::text")]
    pub member: String,
    /// Stable member identifier, when the backend provides one.
    #[serde(default, alias = "memberId", deserialize_with = "lenient::identifier")]
    pub member_id: Option<String>,
    /// Alliance label at the time of the deposit.
    #[serde(default, deserialize_with = "lenient::label")]
    pub alliance: Option<String>,
    /// Week number; `0` means the record carries no usable week.
    #[serde(default, deserialize_with = "lenient::count")]
    pub week: u32,
    /// Submission date as sent by the backend (ISO-ish).
    #[serde(default, deserialize_with = "lenient::label")]
    pub date: Option<String>,
    #[serde(flatten)]
    pub resources: Resources,
}

impl Deposit {
    /// Parse the submission date, accepting full timestamps or bare dates.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?.trim();

        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.date_naive());
        }

        raw.get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
    }
}

/// Denormalized member snapshot used for dashboard totals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Member {
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::label")]
    pub alliance: Option<String>,
    #[serde(default, alias = "weeksPaid", deserialize_with = "lenient::count")]
    pub weeks_paid: u32,
    #[serde(flatten)]
    pub resources: Resources,
}

/// A named group of members with an aggregate resource pool.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Alliance {
    #[serde(default, deserialize_with = "lenient::identifier")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub tag: String,
    #[serde(default, alias = "membersCount", deserialize_with = "lenient::count")]
    pub members_count: u32,
    #[serde(flatten)]
    pub resources: Resources,
}

/// Payload of `GET /api/v1/reports/summary`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub alliances: Vec<Alliance>,
    #[serde(default)]
    pub deposits: Vec<Deposit>,
}

/// Summed resources for one week across all deposits in scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    pub week: u32,
    #[serde(flatten)]
    pub resources: Resources,
    pub total: f64,
}

impl WeeklyBucket {
    pub fn new(week: u32, resources: Resources) -> Self {
        Self {
            week,
            total: resources.total(),
            resources,
        }
    }
}

/// The most recent weekly buckets selected for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyWindow {
    /// Displayed buckets, ascending by week.
    pub buckets: Vec<WeeklyBucket>,
    /// Number of distinct weeks before truncation.
    pub total_weeks: usize,
    /// Largest displayed total, never below `1` so it is safe as a divisor.
    pub max_total: f64,
}

impl WeeklyWindow {
    /// True when no week carried any deposit.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Share of the chart peak reached by a bucket, in percent.
    pub fn share_of_peak(&self, bucket: &WeeklyBucket) -> f64 {
        bucket.total / self.max_total * 100.0
    }
}

/// Lifetime contribution of one member across the deposits in scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberTotal {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alliance: Option<String>,
    #[serde(flatten)]
    pub resources: Resources,
    pub total: f64,
}

impl MemberTotal {
    pub fn new(name: String, alliance: Option<String>) -> Self {
        Self {
            name,
            alliance,
            resources: Resources::default(),
            total: 0.0,
        }
    }

    /// Add a deposit's resources, keeping `total` in step.
    pub fn add(&mut self, resources: &Resources) {
        self.resources.add(resources);
        self.total = self.resources.total();
    }
}

/// An alliance annotated with its pool total and per-capita average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllianceRanked {
    #[serde(flatten)]
    pub alliance: Alliance,
    pub total: f64,
    /// `total / members_count`, or `0` for an alliance without members.
    pub per_member: f64,
}

/// Statistics across every alliance.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AllianceStats {
    pub alliance_count: usize,
    pub combined_total: f64,
    pub average_members: f64,
    pub average_total: f64,
}

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Overview {
    pub member_count: usize,
    pub alliance_count: usize,
    pub deposit_count: usize,
    /// Resource totals from the member snapshots.
    pub member_resources: Resources,
    pub member_total: f64,
    pub average_weeks_paid: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_deposit: Option<NaiveDate>,
}

/// A member whose snapshot disagrees with the deposit ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftEntry {
    pub name: String,
    pub snapshot_total: f64,
    pub ledger_total: f64,
    /// `snapshot_total - ledger_total`.
    pub difference: f64,
}

/// Metadata about the generated report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Where the summary came from (URL or file path).
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Filter applied to the deposit ledger.
    pub filter: DepositFilter,
    /// Deposits that passed the filter.
    pub deposits_in_scope: usize,
    /// Time spent loading and aggregating, in seconds.
    pub duration_seconds: f64,
}

/// The complete resource report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub overview: Overview,
    pub weekly: WeeklyWindow,
    pub members: Vec<MemberTotal>,
    pub alliances: Vec<AllianceRanked>,
    pub alliance_stats: AllianceStats,
    pub drift: Vec<DriftEntry>,
}
