//! Markdown report generation.
//!
//! This module renders the aggregated [`Report`] as a Markdown document,
//! or as pretty-printed JSON.

use crate::config::ReportConfig;
use crate::models::{
    AllianceRanked, AllianceStats, DriftEntry, MemberTotal, Overview, Report, ReportMetadata,
    Resource, WeeklyWindow,
};
use anyhow::Result;

/// Shown wherever a section has no deposits to summarize.
const NO_CONTRIBUTIONS: &str = "No contribution data for the selected range.";

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, sections: &ReportConfig) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Tribute Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_table_of_contents(sections));
    output.push_str(&generate_overview_section(&report.overview));

    if sections.include_weekly {
        output.push_str(&generate_weekly_section(&report.weekly));
    }
    if sections.include_members {
        output.push_str(&generate_members_section(&report.members));
    }
    if sections.include_alliances {
        output.push_str(&generate_alliances_section(
            &report.alliances,
            &report.alliance_stats,
        ));
    }
    if sections.include_drift {
        output.push_str(&generate_drift_section(&report.drift));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Source:** {}\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Filter:** {}\n", metadata.filter));
    section.push_str(&format!(
        "- **Deposits in Scope:** {}\n",
        metadata.deposits_in_scope
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the table of contents.
fn generate_table_of_contents(sections: &ReportConfig) -> String {
    let mut toc = String::new();

    toc.push_str("## Table of Contents\n\n");
    toc.push_str("- [Metadata](#metadata)\n");
    toc.push_str("- [Overview](#overview)\n");

    if sections.include_weekly {
        toc.push_str("- [Weekly Totals](#weekly-totals)\n");
    }
    if sections.include_members {
        toc.push_str("- [Top Contributors](#top-contributors)\n");
    }
    if sections.include_alliances {
        toc.push_str("- [Alliances](#alliances)\n");
    }
    if sections.include_drift {
        toc.push_str("- [Snapshot Drift](#snapshot-drift)\n");
    }

    toc.push('\n');

    toc
}

/// Generate the overview section.
fn generate_overview_section(overview: &Overview) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    section.push_str(&format!(
        "- **Members:** {} | **Alliances:** {} | **Deposits:** {}\n",
        overview.member_count, overview.alliance_count, overview.deposit_count
    ));
    section.push_str(&format!(
        "- **Average Weeks Paid:** {:.1}\n",
        overview.average_weeks_paid
    ));
    if let Some(latest) = overview.latest_deposit {
        section.push_str(&format!("- **Latest Deposit:** {}\n", latest));
    }
    section.push('\n');

    section.push_str("### Member Holdings\n\n");
    section.push_str(&resource_header(&[], &["**Total**"]));
    section.push_str(&format!(
        "| {} | **{}** |\n\n",
        Resource::ALL
            .iter()
            .map(|r| format_amount(overview.member_resources.get(*r)))
            .collect::<Vec<_>>()
            .join(" | "),
        format_amount(overview.member_total)
    ));

    section
}

/// Generate the weekly totals section.
fn generate_weekly_section(weekly: &WeeklyWindow) -> String {
    let mut section = String::new();

    section.push_str("## Weekly Totals\n\n");

    if weekly.is_empty() {
        section.push_str(NO_CONTRIBUTIONS);
        section.push_str("\n\n");
        return section;
    }

    section.push_str(&format!(
        "*Showing {} of {} weeks*\n\n",
        weekly.buckets.len(),
        weekly.total_weeks
    ));
    section.push_str(&resource_header(&["Week"], &["Total", "% of Peak"]));

    for bucket in &weekly.buckets {
        section.push_str(&format!(
            "| {} | {} | {} | {:.0}% |\n",
            bucket.week,
            resource_cells(&bucket.resources),
            format_amount(bucket.total),
            weekly.share_of_peak(bucket)
        ));
    }
    section.push('\n');

    section
}

/// Generate the top contributors section.
fn generate_members_section(members: &[MemberTotal]) -> String {
    let mut section = String::new();

    section.push_str("## Top Contributors\n\n");

    if members.is_empty() {
        section.push_str(NO_CONTRIBUTIONS);
        section.push_str("\n\n");
        return section;
    }

    section.push_str(&resource_header(&["#", "Member", "Alliance"], &["Total"]));

    for (rank, member) in members.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {} | **{}** |\n",
            rank + 1,
            member.name,
            member.alliance.as_deref().unwrap_or("-"),
            resource_cells(&member.resources),
            format_amount(member.total)
        ));
    }
    section.push('\n');

    section
}

/// Generate the alliance ranking section.
fn generate_alliances_section(alliances: &[AllianceRanked], stats: &AllianceStats) -> String {
    let mut section = String::new();

    section.push_str("## Alliances\n\n");

    if alliances.is_empty() {
        section.push_str("No alliances on record.\n\n");
        return section;
    }

    section.push_str(&format!(
        "- **Combined Total:** {}\n",
        format_amount(stats.combined_total)
    ));
    section.push_str(&format!(
        "- **Average Members:** {:.1}\n",
        stats.average_members
    ));
    section.push_str(&format!(
        "- **Average Total:** {}\n\n",
        format_amount(stats.average_total)
    ));

    section.push_str("| # | Alliance | Tag | Members | Total | Per Member |\n");
    section.push_str("|:---:|:---|:---:|:---:|---:|---:|\n");

    for (rank, ranked) in alliances.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            rank + 1,
            ranked.alliance.name,
            ranked.alliance.tag,
            ranked.alliance.members_count,
            format_amount(ranked.total),
            format_amount(ranked.per_member)
        ));
    }
    section.push('\n');

    section
}

/// Generate the snapshot drift section.
fn generate_drift_section(drift: &[DriftEntry]) -> String {
    let mut section = String::new();

    section.push_str("## Snapshot Drift\n\n");

    if drift.is_empty() {
        section.push_str("Member snapshots agree with the deposit ledger.\n\n");
        return section;
    }

    section.push_str(
        "Members whose snapshot totals differ from the sum of their deposits:\n\n",
    );
    section.push_str("| Member | Snapshot | Ledger | Difference |\n");
    section.push_str("|:---|---:|---:|---:|\n");

    for entry in drift {
        let sign = if entry.difference > 0.0 { "+" } else { "" };
        section.push_str(&format!(
            "| {} | {} | {} | {}{} |\n",
            entry.name,
            format_amount(entry.snapshot_total),
            format_amount(entry.ledger_total),
            sign,
            format_amount(entry.difference)
        ));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by Tribute*\n".to_string()
}

/// Table header with the four resource columns between `leading` and `trailing`.
fn resource_header(leading: &[&str], trailing: &[&str]) -> String {
    let mut titles: Vec<String> = leading.iter().map(|s| s.to_string()).collect();
    titles.extend(Resource::ALL.iter().map(|r| format!("{} {}", r.emoji(), r)));
    titles.extend(trailing.iter().map(|s| s.to_string()));

    let mut aligns: Vec<&str> = leading.iter().map(|_| ":---").collect();
    aligns.extend(std::iter::repeat("---:").take(Resource::ALL.len() + trailing.len()));

    format!("| {} |\n|{}|\n", titles.join(" | "), aligns.join("|"))
}

fn resource_cells(resources: &crate::models::Resources) -> String {
    Resource::ALL
        .iter()
        .map(|r| format_amount(resources.get(*r)))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Format an amount with thousands separators and at most two decimals.
pub fn format_amount(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let magnitude = rounded.abs();
    let whole = magnitude.trunc() as u64;
    let cents = ((magnitude - magnitude.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if cents > 0 {
        grouped.push_str(&format!(".{:02}", cents));
    }

    grouped
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
