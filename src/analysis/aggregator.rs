//! Resource aggregation and rankings.
//!
//! Every function here is pure: it reads the slices it is given, never
//! mutates them, and returns the same output for the same input.

use crate::models::{
    Alliance, AllianceRanked, AllianceStats, Deposit, DriftEntry, Member, MemberTotal, Overview,
    Resources, Summary, WeeklyBucket, WeeklyWindow,
};
use std::collections::{BTreeMap, HashMap};

/// Name shown for deposits that carry no member name at all.
pub const UNKNOWN_MEMBER: &str = "Unknown member";

/// Snapshot and ledger totals closer than this are considered equal.
const DRIFT_TOLERANCE: f64 = 1e-6;

/// Sum deposits per week, ascending by week.
///
/// Deposits with week `0` are skipped.
pub fn weekly_totals(deposits: &[Deposit]) -> Vec<WeeklyBucket> {
    let mut grouped: BTreeMap<u32, Resources> = BTreeMap::new();

    for deposit in deposits.iter().filter(|d| d.week > 0) {
        grouped
            .entry(deposit.week)
            .or_default()
            .add(&deposit.resources);
    }

    grouped
        .into_iter()
        .map(|(week, resources)| WeeklyBucket::new(week, resources))
        .collect()
}

/// Keep the last `window` weeks of [`weekly_totals`] for display.
pub fn recent_weeks(deposits: &[Deposit], window: usize) -> WeeklyWindow {
    let mut buckets = weekly_totals(deposits);
    let total_weeks = buckets.len();

    if buckets.len() > window {
        buckets.drain(..buckets.len() - window);
    }

    let peak = buckets.iter().map(|b| b.total).fold(0.0, f64::max);

    WeeklyWindow {
        buckets,
        total_weeks,
        max_total: if peak > 0.0 { peak } else { 1.0 },
    }
}

/// Grouping key for member totals.
///
/// Variants never compare equal to each other, so an id that happens to
/// look like someone's name cannot merge the two.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MemberKey {
    Id(String),
    Name(String),
    Record(String),
    Position(usize),
}

impl MemberKey {
    fn for_deposit(deposit: &Deposit, position: usize) -> Self {
        if let Some(ref id) = deposit.member_id {
            return MemberKey::Id(id.clone());
        }

        let name = deposit.member.trim();
        if !name.is_empty() {
            return MemberKey::Name(name.to_string());
        }

        match deposit.id {
            Some(ref id) => MemberKey::Record(id.clone()),
            None => MemberKey::Position(position),
        }
    }
}

/// Per-member lifetime totals, highest first, truncated to `top`.
///
/// Ties keep the order in which members first appear. The alliance shown is
/// the first one seen for that member.
pub fn rank_members(deposits: &[Deposit], top: usize) -> Vec<MemberTotal> {
    let mut index: HashMap<MemberKey, usize> = HashMap::new();
    let mut totals: Vec<MemberTotal> = Vec::new();

    for (position, deposit) in deposits.iter().enumerate() {
        let key = MemberKey::for_deposit(deposit, position);
        let slot = *index.entry(key).or_insert_with(|| {
            let name = match deposit.member.trim() {
                "" => UNKNOWN_MEMBER.to_string(),
                name => name.to_string(),
            };
            totals.push(MemberTotal::new(name, deposit.alliance.clone()));
            totals.len() - 1
        });

        let member = &mut totals[slot];
        if member.alliance.is_none() {
            member.alliance = deposit.alliance.clone();
        }
        member.add(&deposit.resources);
    }

    totals.sort_by(|a, b| b.total.total_cmp(&a.total));
    totals.truncate(top);

    totals
}

/// Annotate alliances with totals and per-member averages, highest first.
pub fn rank_alliances(alliances: &[Alliance]) -> Vec<AllianceRanked> {
    let mut ranked: Vec<AllianceRanked> = alliances
        .iter()
        .map(|alliance| {
            let total = alliance.resources.total();
            let per_member = if alliance.members_count == 0 {
                0.0
            } else {
                total / f64::from(alliance.members_count)
            };

            AllianceRanked {
                alliance: alliance.clone(),
                total,
                per_member,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.total.total_cmp(&a.total));

    ranked
}

/// Combined and average figures across all alliances.
pub fn alliance_stats(alliances: &[Alliance]) -> AllianceStats {
    let count = alliances.len();
    let combined_total: f64 = alliances.iter().map(|a| a.resources.total()).sum();
    let members: f64 = alliances.iter().map(|a| f64::from(a.members_count)).sum();
    let denominator = count.max(1) as f64;

    AllianceStats {
        alliance_count: count,
        combined_total,
        average_members: members / denominator,
        average_total: combined_total / denominator,
    }
}

/// Headline dashboard numbers for a summary.
pub fn overview(summary: &Summary) -> Overview {
    let mut member_resources = Resources::default();
    for member in &summary.members {
        member_resources.add(&member.resources);
    }

    let weeks_paid: f64 = summary
        .members
        .iter()
        .map(|m| f64::from(m.weeks_paid))
        .sum();

    Overview {
        member_count: summary.members.len(),
        alliance_count: summary.alliances.len(),
        deposit_count: summary.deposits.len(),
        member_total: member_resources.total(),
        member_resources,
        average_weeks_paid: weeks_paid / summary.members.len().max(1) as f64,
        latest_deposit: summary.deposits.iter().filter_map(Deposit::parsed_date).max(),
    }
}

/// Members whose snapshot totals differ from their deposit ledger sums.
///
/// Deposits are matched to members by trimmed display name. Neither side is
/// treated as correct; the result lists every disagreement, largest first.
pub fn snapshot_drift(members: &[Member], deposits: &[Deposit]) -> Vec<DriftEntry> {
    let mut ledger: HashMap<&str, Resources> = HashMap::new();
    for deposit in deposits {
        ledger
            .entry(deposit.member.trim())
            .or_default()
            .add(&deposit.resources);
    }

    let mut drift: Vec<DriftEntry> = members
        .iter()
        .filter_map(|member| {
            let name = member.name.trim();
            let snapshot_total = member.resources.total();
            let ledger_total = ledger.get(name).map(Resources::total).unwrap_or(0.0);
            let difference = snapshot_total - ledger_total;

            (difference.abs() > DRIFT_TOLERANCE).then(|| DriftEntry {
                name: name.to_string(),
                snapshot_total,
                ledger_total,
                difference,
            })
        })
        .collect();

    drift.sort_by(|a, b| b.difference.abs().total_cmp(&a.difference.abs()));

    drift
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn create_test_deposit(member: &str, week: u32, food: f64, wood: f64) -> Deposit {
        Deposit {
            member: member.to_string(),
            week,
            resources: Resources {
                food,
                wood,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn create_test_alliance(name: &str, members_count: u32, gold: f64) -> Alliance {
        Alliance {
            name: name.to_string(),
            tag: name[..2].to_uppercase(),
            members_count,
            resources: Resources {
                gold,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn sample_ledger() -> Vec<Deposit> {
        vec![
            create_test_deposit("Aria", 3, 100.0, 20.0),
            create_test_deposit("Bo", 1, 10.0, 0.0),
            create_test_deposit("Aria", 1, 5.0, 5.0),
            create_test_deposit("Cyra", 0, 999.0, 0.0),
            create_test_deposit("Bo", 2, 0.0, 40.0),
            create_test_deposit("Dax", 3, 1.0, 1.0),
        ]
    }

    #[test]
    fn test_single_week_bucket() {
        let deposits = vec![
            create_test_deposit("A", 1, 10.0, 0.0),
            create_test_deposit("B", 1, 5.0, 5.0),
        ];

        let weeks = weekly_totals(&deposits);

        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].week, 1);
        assert_eq!(weeks[0].resources.food, 15.0);
        assert_eq!(weeks[0].resources.wood, 5.0);
        assert_eq!(weeks[0].resources.stone, 0.0);
        assert_eq!(weeks[0].resources.gold, 0.0);
        assert_eq!(weeks[0].total, 20.0);
    }

    #[test]
    fn test_weekly_totals_sorted_and_skip_week_zero() {
        let weeks = weekly_totals(&sample_ledger());

        let order: Vec<u32> = weeks.iter().map(|b| b.week).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert!(weeks.iter().all(|b| b.resources.food < 999.0));
    }

    #[test]
    fn test_weekly_totals_cover_all_dated_deposits() {
        let deposits = sample_ledger();
        let weeks = weekly_totals(&deposits);

        let bucket_sum: f64 = weeks.iter().map(|b| b.total).sum();
        let ledger_sum: f64 = deposits
            .iter()
            .filter(|d| d.week > 0)
            .map(|d| d.resources.total())
            .sum();

        assert_eq!(bucket_sum, ledger_sum);
        for bucket in &weeks {
            assert_eq!(bucket.total, bucket.resources.total());
        }
    }

    #[test]
    fn test_recent_weeks_keeps_latest() {
        let deposits: Vec<_> = (1..=40)
            .map(|w| create_test_deposit("A", w, f64::from(w), 0.0))
            .collect();

        let window = recent_weeks(&deposits, 30);

        assert_eq!(window.total_weeks, 40);
        assert_eq!(window.buckets.len(), 30);
        assert_eq!(window.buckets.first().map(|b| b.week), Some(11));
        assert_eq!(window.buckets.last().map(|b| b.week), Some(40));
        assert_eq!(window.max_total, 40.0);
    }

    #[test]
    fn test_recent_weeks_empty_input() {
        let window = recent_weeks(&[], 30);

        assert!(window.is_empty());
        assert_eq!(window.total_weeks, 0);
        assert_eq!(window.max_total, 1.0);
    }

    #[test]
    fn test_recent_weeks_zero_totals_keep_safe_scale() {
        let window = recent_weeks(&[create_test_deposit("A", 2, 0.0, 0.0)], 30);

        assert_eq!(window.buckets.len(), 1);
        assert_eq!(window.max_total, 1.0);
        assert_eq!(window.share_of_peak(&window.buckets[0]), 0.0);
    }

    #[test]
    fn test_rank_members_ties_keep_encounter_order() {
        let deposits = vec![
            create_test_deposit("A", 1, 10.0, 0.0),
            create_test_deposit("B", 1, 5.0, 5.0),
        ];

        let ranked = rank_members(&deposits, 15);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "A");
        assert_eq!(ranked[1].name, "B");
        assert_eq!(ranked[0].total, 10.0);
        assert_eq!(ranked[1].total, 10.0);

        let top = rank_members(&deposits, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "A");
    }

    #[test]
    fn test_rank_members_sorted_descending() {
        let ranked = rank_members(&sample_ledger(), 20);

        let names: Vec<&str> = ranked.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Cyra", "Aria", "Bo", "Dax"]);
        assert_eq!(ranked[1].total, 130.0);
        for pair in ranked.windows(2) {
            assert!(pair[0].total >= pair[1].total);
        }
    }

    #[test]
    fn test_rank_members_prefers_member_id() {
        let mut first = create_test_deposit("Sam", 1, 10.0, 0.0);
        first.member_id = Some("1".to_string());
        let mut second = create_test_deposit("Sam", 1, 3.0, 0.0);
        second.member_id = Some("2".to_string());
        let mut renamed = create_test_deposit("Samuel", 2, 4.0, 0.0);
        renamed.member_id = Some("1".to_string());

        let ranked = rank_members(&[first, second, renamed], 10);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "Sam");
        assert_eq!(ranked[0].total, 14.0);
        assert_eq!(ranked[1].total, 3.0);
    }

    #[test]
    fn test_rank_members_id_does_not_collide_with_name() {
        let mut by_id = create_test_deposit("Other", 1, 1.0, 0.0);
        by_id.member_id = Some("Ana".to_string());
        let by_name = create_test_deposit("Ana", 1, 2.0, 0.0);

        assert_eq!(rank_members(&[by_id, by_name], 10).len(), 2);
    }

    #[test]
    fn test_rank_members_unnamed_records_stay_separate() {
        let mut first = create_test_deposit("", 1, 1.0, 0.0);
        first.id = Some("10".to_string());
        let mut second = create_test_deposit("  ", 1, 2.0, 0.0);
        second.id = Some("11".to_string());
        let third = create_test_deposit("", 1, 3.0, 0.0);

        let ranked = rank_members(&[first, second, third], 10);

        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|m| m.name == UNKNOWN_MEMBER));
    }

    #[test]
    fn test_rank_members_first_seen_alliance() {
        let mut first = create_test_deposit("Aria", 1, 1.0, 0.0);
        first.alliance = None;
        let mut second = create_test_deposit("Aria", 2, 1.0, 0.0);
        second.alliance = Some("Iron Wolves".to_string());
        let mut third = create_test_deposit("Aria", 3, 1.0, 0.0);
        third.alliance = Some("Red Tide".to_string());

        let ranked = rank_members(&[first, second, third], 10);

        assert_eq!(ranked[0].alliance.as_deref(), Some("Iron Wolves"));
    }

    #[test]
    fn test_rank_members_empty() {
        assert!(rank_members(&[], 15).is_empty());
    }

    #[test]
    fn test_rank_alliances_per_member() {
        let alliances = vec![
            create_test_alliance("Red Tide", 4, 100.0),
            create_test_alliance("Iron Wolves", 0, 0.0),
            create_test_alliance("Gold Crown", 10, 500.0),
        ];

        let ranked = rank_alliances(&alliances);

        assert_eq!(ranked[0].alliance.name, "Gold Crown");
        assert_eq!(ranked[0].per_member, 50.0);
        assert_eq!(ranked[1].per_member, 25.0);
        assert_eq!(ranked[2].alliance.name, "Iron Wolves");
        assert_eq!(ranked[2].per_member, 0.0);
        assert!(ranked[2].per_member.is_finite());
    }

    #[test]
    fn test_empty_alliance_has_zero_per_member() {
        let ranked = rank_alliances(&[create_test_alliance("Ghosts", 0, 0.0)]);
        assert_eq!(ranked[0].per_member, 0.0);
        assert!(!ranked[0].per_member.is_nan());
    }

    #[test]
    fn test_alliance_stats() {
        let alliances = vec![
            create_test_alliance("Red Tide", 4, 100.0),
            create_test_alliance("Gold Crown", 10, 500.0),
        ];

        let stats = alliance_stats(&alliances);

        assert_eq!(stats.alliance_count, 2);
        assert_eq!(stats.combined_total, 600.0);
        assert_eq!(stats.average_members, 7.0);
        assert_eq!(stats.average_total, 300.0);
    }

    #[test]
    fn test_alliance_stats_empty() {
        let stats = alliance_stats(&[]);

        assert_eq!(stats, AllianceStats::default());
    }

    #[test]
    fn test_aggregation_is_idempotent_and_non_mutating() {
        let deposits = sample_ledger();
        let alliances = vec![
            create_test_alliance("Red Tide", 4, 100.0),
            create_test_alliance("Gold Crown", 10, 500.0),
        ];
        let deposits_before = deposits.clone();
        let alliances_before = alliances.clone();

        assert_eq!(recent_weeks(&deposits, 2), recent_weeks(&deposits, 2));
        assert_eq!(rank_members(&deposits, 3), rank_members(&deposits, 3));
        assert_eq!(rank_alliances(&alliances), rank_alliances(&alliances));
        assert_eq!(alliance_stats(&alliances), alliance_stats(&alliances));

        assert_eq!(deposits, deposits_before);
        assert_eq!(alliances, alliances_before);
    }

    #[test]
    fn test_overview() {
        let mut deposits = sample_ledger();
        deposits[0].date = Some("2024-05-01".to_string());
        deposits[1].date = Some("2024-05-09T12:00:00Z".to_string());
        deposits[2].date = Some("garbage".to_string());

        let summary = Summary {
            members: vec![
                Member {
                    name: "Aria".to_string(),
                    weeks_paid: 3,
                    resources: Resources {
                        food: 50.0,
                        ..Default::default()
                    },
                    ..Default::default()
                },
                Member {
                    name: "Bo".to_string(),
                    weeks_paid: 2,
                    ..Default::default()
                },
            ],
            alliances: vec![create_test_alliance("Red Tide", 4, 100.0)],
            deposits,
        };

        let overview = overview(&summary);

        assert_eq!(overview.member_count, 2);
        assert_eq!(overview.alliance_count, 1);
        assert_eq!(overview.deposit_count, 6);
        assert_eq!(overview.member_total, 50.0);
        assert_eq!(overview.average_weeks_paid, 2.5);
        assert_eq!(overview.latest_deposit, NaiveDate::from_ymd_opt(2024, 5, 9));
    }

    #[test]
    fn test_overview_empty_summary() {
        let overview = overview(&Summary::default());

        assert_eq!(overview.average_weeks_paid, 0.0);
        assert!(overview.latest_deposit.is_none());
    }

    #[test]
    fn test_snapshot_drift() {
        let members = vec![
            Member {
                name: "Aria".to_string(),
                resources: Resources {
                    food: 130.0,
                    ..Default::default()
                },
                ..Default::default()
            },
            Member {
                name: "Bo".to_string(),
                resources: Resources {
                    wood: 10.0,
                    ..Default::default()
                },
                ..Default::default()
            },
            Member {
                name: "Eve".to_string(),
                ..Default::default()
            },
            Member {
                name: "Fin".to_string(),
                resources: Resources {
                    gold: 5.0,
                    ..Default::default()
                },
                ..Default::default()
            },
        ];

        let drift = snapshot_drift(&members, &sample_ledger());

        assert_eq!(drift.len(), 2);
        assert_eq!(drift[0].name, "Bo");
        assert_eq!(drift[0].ledger_total, 50.0);
        assert_eq!(drift[0].difference, -40.0);
        assert_eq!(drift[1].name, "Fin");
        assert_eq!(drift[1].ledger_total, 0.0);
    }
}
