//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use raidledger_domain::{
    cumulative_clears, ClearOrderBucket, ClearRate, LeaderboardEntry, Member, MemberId,
    PointsEvent, Submission,
};
use raidledger_engine::Evaluation;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format clear rates keyed by encounter name.
    pub fn format_clear_rates(&self, rates: &BTreeMap<String, ClearRate>) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<Value> = rates
                    .iter()
                    .map(|(name, rate)| {
                        json!({
                            "encounter": name,
                            "clears": rate.clears,
                            "eligible_members": rate.eligible_members,
                            "percent": percent(rate),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Quiet => Ok(rates
                .iter()
                .map(|(name, rate)| format!("{} {}", name, rate))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if rates.is_empty() {
                    return Ok(self.colorize("No encounters registered.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Encounter", "Clears", "Rate"]);
                for (name, rate) in rates {
                    builder.push_record([
                        name.clone(),
                        rate.to_string(),
                        format!("{:.2}%", percent(rate)),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a clear-order timeline, optionally as running totals.
    pub fn format_clear_order(
        &self,
        encounter: &str,
        buckets: &[ClearOrderBucket],
        cumulative: bool,
    ) -> Result<String> {
        if cumulative {
            let totals = cumulative_clears(buckets);
            return match self.format {
                OutputFormat::Json => {
                    let rows: Vec<Value> = totals
                        .iter()
                        .map(|(date, total)| json!({ "date": date, "total": total }))
                        .collect();
                    Ok(serde_json::to_string_pretty(&rows)?)
                }
                OutputFormat::Quiet => Ok(totals
                    .iter()
                    .map(|(date, total)| format!("{} {}", date, total))
                    .collect::<Vec<_>>()
                    .join("\n")),
                OutputFormat::Table => {
                    if totals.is_empty() {
                        return Ok(self.no_clears(encounter));
                    }
                    let mut builder = Builder::default();
                    builder.push_record(["Date", "Cleared"]);
                    for (date, total) in &totals {
                        builder.push_record([date.to_string(), total.to_string()]);
                    }
                    Ok(self.render(builder))
                }
            };
        }

        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(buckets)?),
            OutputFormat::Quiet => Ok(buckets
                .iter()
                .map(|b| format!("{} {}", b.date, join_ids(b.members.iter())))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if buckets.is_empty() {
                    return Ok(self.no_clears(encounter));
                }
                let mut builder = Builder::default();
                builder.push_record(["Date", "New", "Members"]);
                for bucket in buckets {
                    builder.push_record([
                        bucket.date.to_string(),
                        bucket.members.len().to_string(),
                        join_ids(bucket.members.iter()),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a dry-run evaluation.
    pub fn format_evaluation(&self, evaluation: &Evaluation) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "fight": evaluation.fight.to_string(),
                    "tier": evaluation.tier.as_str(),
                    "encounter": evaluation.encounter.as_ref().map(|e| e.name.clone()),
                    "matched": evaluation.matched.iter().map(|m| m.name.clone()).collect::<Vec<_>>(),
                    "events": evaluation.events.iter().map(event_json).collect::<Vec<_>>(),
                    "notes": evaluation.note_lines(),
                    "fight_signature": evaluation.fight_signature.as_str(),
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Quiet => Ok(evaluation.fight_signature.to_string()),
            OutputFormat::Table => {
                let encounter = evaluation
                    .encounter
                    .as_ref()
                    .map(|e| e.name.as_str())
                    .unwrap_or("-");
                let mut out = vec![
                    self.info(&format!(
                        "{} in {} ({} roster members)",
                        evaluation.fight,
                        encounter,
                        evaluation.matched.len()
                    )),
                    self.events_table(&evaluation.events),
                ];
                out.extend(evaluation.note_lines().iter().map(|n| self.warning(n)));
                Ok(out.join("\n"))
            }
        }
    }

    /// Format one submission with its events and notes.
    pub fn format_submission(&self, submission: &Submission) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&submission_json(submission))?),
            OutputFormat::Quiet => Ok(submission.id.to_string()),
            OutputFormat::Table => {
                let state = if submission.is_open() { "open" } else { "closed" };
                let mut out = vec![
                    self.info(&format!(
                        "Submission {} ({}, tier {}, by {} via {})",
                        submission.id, state, submission.tier, submission.submitted_by, submission.channel
                    )),
                    self.events_table(&submission.events),
                ];
                if let Some(by) = &submission.last_update_by {
                    out.push(format!("Last reviewed by {}", by));
                }
                out.extend(submission.notes.iter().map(|n| self.warning(n)));
                Ok(out.join("\n"))
            }
        }
    }

    /// Format the review queue.
    pub fn format_submissions(&self, submissions: &[Submission]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<Value> = submissions.iter().map(submission_json).collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Quiet => Ok(submissions
                .iter()
                .map(|s| s.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if submissions.is_empty() {
                    return Ok(self.colorize("No pending submissions.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["ID", "Submitted", "By", "Fight", "Pending", "Points"]);
                for s in submissions {
                    let pending: Vec<&PointsEvent> = s.pending_events().collect();
                    let points: i64 = pending.iter().map(|e| e.points).sum();
                    builder.push_record([
                        s.id.to_string(),
                        s.ts.format("%Y-%m-%d %H:%M").to_string(),
                        s.submitted_by.clone(),
                        s.fight.as_ref().map(ToString::to_string).unwrap_or_else(|| "manual".into()),
                        pending.len().to_string(),
                        points.to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format the leaderboard, naming members from the roster.
    pub fn format_leaderboard(&self, entries: &[LeaderboardEntry], roster: &[Member]) -> Result<String> {
        let names: HashMap<MemberId, &str> = roster.iter().map(|m| (m.id, m.name.as_str())).collect();
        let name_of = |id: &MemberId| names.get(id).map(|n| n.to_string()).unwrap_or_else(|| id.to_string());

        match self.format {
            OutputFormat::Json => {
                let rows: Vec<Value> = entries
                    .iter()
                    .map(|e| {
                        json!({
                            "member_id": e.member_id,
                            "name": name_of(&e.member_id),
                            "tier": e.tier.as_str(),
                            "total_points": e.total_points,
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Quiet => Ok(entries
                .iter()
                .map(|e| format!("{} {}", e.member_id, e.total_points))
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if entries.is_empty() {
                    return Ok(self.colorize("No points recorded.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["#", "Member", "Points"]);
                for (rank, e) in entries.iter().enumerate() {
                    builder.push_record([
                        (rank + 1).to_string(),
                        name_of(&e.member_id),
                        e.total_points.to_string(),
                    ]);
                }
                Ok(self.render(builder))
            }
        }
    }

    /// Format a list of points events.
    pub fn format_events(&self, events: &[PointsEvent]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let rows: Vec<Value> = events.iter().map(event_json).collect();
                Ok(serde_json::to_string_pretty(&rows)?)
            }
            OutputFormat::Quiet => Ok(events
                .iter()
                .map(|e| e.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => Ok(self.events_table(events)),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn events_table(&self, events: &[PointsEvent]) -> String {
        if events.is_empty() {
            return self.colorize("No points events.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Member", "Category", "Points", "Status", "Description"]);
        for e in events {
            builder.push_record([
                e.id.to_string(),
                e.member_id.to_string(),
                e.category.to_string(),
                e.points.to_string(),
                e.status.to_string(),
                e.description.clone(),
            ]);
        }
        self.render(builder)
    }

    fn no_clears(&self, encounter: &str) -> String {
        self.colorize(&format!("No clears of {}.", encounter), "yellow")
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

/// Clear rate as a percentage rounded to two decimals.
pub fn percent(rate: &ClearRate) -> f64 {
    (rate.rate() * 10_000.0).round() / 100.0
}

fn join_ids<'a>(ids: impl Iterator<Item = &'a MemberId>) -> String {
    ids.map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn event_json(e: &PointsEvent) -> Value {
    json!({
        "id": e.id.to_string(),
        "member_id": e.member_id,
        "category": e.category.name(),
        "points": e.points,
        "status": e.status.name(),
        "description": e.description,
        "ts": e.ts,
    })
}

fn submission_json(s: &Submission) -> Value {
    json!({
        "id": s.id.to_string(),
        "ts": s.ts,
        "submitted_by": s.submitted_by,
        "channel": s.channel.name(),
        "fight": s.fight.as_ref().map(ToString::to_string),
        "tier": s.tier.as_str(),
        "open": s.is_open(),
        "events": s.events.iter().map(event_json).collect::<Vec<_>>(),
        "last_update_ts": s.last_update_ts,
        "last_update_by": s.last_update_by,
        "notes": s.notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use raidledger_domain::{PointsCategory, SubmissionChannel, TierId};
    use std::collections::BTreeSet;

    fn plain(format: OutputFormat) -> Formatter {
        Formatter::new(format, false)
    }

    fn sample_submission() -> Submission {
        let events = vec![
            PointsEvent::pending(MemberId(1), PointsCategory::FcSavage, "FC Savage: P9S").unwrap(),
            PointsEvent::pending(MemberId(2), PointsCategory::Savage1, "First clear: P9S").unwrap(),
        ];
        Submission::new(
            "officer",
            SubmissionChannel::FcBotFflogs,
            TierId::from_static("ANABASEIOS"),
            events,
        )
    }

    fn buckets() -> Vec<ClearOrderBucket> {
        vec![
            ClearOrderBucket {
                date: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
                members: BTreeSet::from([MemberId(1), MemberId(2)]),
            },
            ClearOrderBucket {
                date: NaiveDate::from_ymd_opt(2023, 6, 8).unwrap(),
                members: BTreeSet::from([MemberId(3)]),
            },
        ]
    }

    #[test]
    fn test_percent_rounds_to_two_decimals() {
        assert_eq!(percent(&ClearRate::new(7, 10)), 70.0);
        assert_eq!(percent(&ClearRate::new(1, 3)), 33.33);
        assert_eq!(percent(&ClearRate::new(2, 3)), 66.67);
        assert_eq!(percent(&ClearRate::new(0, 0)), 0.0);
    }

    #[test]
    fn test_clear_rates_table() {
        let rates = BTreeMap::from([("P9S".to_string(), ClearRate::new(7, 10))]);
        let output = plain(OutputFormat::Table).format_clear_rates(&rates).unwrap();
        assert!(output.contains("P9S"));
        assert!(output.contains("7 / 10"));
        assert!(output.contains("70.00%"));
    }

    #[test]
    fn test_clear_rates_json() {
        let rates = BTreeMap::from([("P9S".to_string(), ClearRate::new(1, 3))]);
        let output = plain(OutputFormat::Json).format_clear_rates(&rates).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["clears"], 1);
        assert_eq!(value[0]["eligible_members"], 3);
        assert_eq!(value[0]["percent"], 33.33);
    }

    #[test]
    fn test_clear_order_cumulative() {
        let output = plain(OutputFormat::Quiet)
            .format_clear_order("P9S", &buckets(), true)
            .unwrap();
        assert_eq!(output, "2023-06-01 2\n2023-06-08 3");
    }

    #[test]
    fn test_clear_order_buckets() {
        let output = plain(OutputFormat::Quiet)
            .format_clear_order("P9S", &buckets(), false)
            .unwrap();
        assert_eq!(output, "2023-06-01 1, 2\n2023-06-08 3");

        let empty = plain(OutputFormat::Table).format_clear_order("P9S", &[], false).unwrap();
        assert!(empty.contains("No clears of P9S"));
    }

    #[test]
    fn test_submission_formats() {
        let submission = sample_submission();

        let quiet = plain(OutputFormat::Quiet).format_submission(&submission).unwrap();
        assert_eq!(quiet, submission.id.to_string());

        let table = plain(OutputFormat::Table).format_submission(&submission).unwrap();
        assert!(table.contains("open"));
        assert!(table.contains("FC_SAVAGE"));
        assert!(table.contains("PENDING"));

        let json = plain(OutputFormat::Json).format_submission(&submission).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["events"].as_array().unwrap().len(), 2);
        assert_eq!(value["channel"], "FC_BOT_FFLOGS");
        assert_eq!(value["events"][1]["category"], "SAVAGE_1");
    }

    #[test]
    fn test_empty_queue() {
        let output = plain(OutputFormat::Table).format_submissions(&[]).unwrap();
        assert!(output.contains("No pending submissions"));
    }

    #[test]
    fn test_leaderboard_uses_roster_names() {
        let tier = TierId::from_static("ANABASEIOS");
        let entries = vec![
            LeaderboardEntry {
                member_id: MemberId(2),
                tier: tier.clone(),
                total_points: 40,
            },
            LeaderboardEntry {
                member_id: MemberId(9),
                tier,
                total_points: 10,
            },
        ];
        let roster = vec![Member::new(2, "Alice", 1)];

        let output = plain(OutputFormat::Table).format_leaderboard(&entries, &roster).unwrap();
        assert!(output.contains("Alice"));
        assert!(output.contains("40"));
        // former members fall back to the id
        assert!(output.contains('9'));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = plain(OutputFormat::Table);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.error("test"), "✗ test");
    }
}
