//! Claude Code usage statistics.
//!
//! Reads the stats cache and session indexes that Claude Code maintains
//! under ~/.claude. Everything here is read-only and forgiving: a missing or
//! malformed file yields zeroed stats rather than an error, since usage
//! reporting must never get in the way of the alerting path.

use chrono::{Datelike, Days, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Aggregated activity for the current ISO week.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklyStats {
    pub messages: u64,
    pub sessions: u64,
    pub tool_calls: u64,
    pub tokens_by_model: BTreeMap<String, u64>,
}

/// Stats for the most recently active session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStats {
    pub summary: String,
    pub messages: u64,
    pub duration: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_read: u64,
    pub cache_create: u64,
    pub session_id: Option<String>,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            summary: "No active session".to_string(),
            messages: 0,
            duration: "0s".to_string(),
            input_tokens: 0,
            output_tokens: 0,
            cache_read: 0,
            cache_create: 0,
            session_id: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StatsCache {
    daily_activity: Vec<DailyActivity>,
    daily_model_tokens: Vec<DailyModelTokens>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DailyActivity {
    date: String,
    message_count: u64,
    session_count: u64,
    tool_call_count: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct DailyModelTokens {
    date: String,
    tokens_by_model: BTreeMap<String, u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SessionsIndex {
    entries: Vec<SessionIndexEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct SessionIndexEntry {
    session_id: String,
    summary: String,
    first_prompt: String,
    full_path: String,
    file_mtime: f64,
    created: String,
    modified: String,
}

/// Monday and Sunday of the ISO week containing `today`, as date strings.
///
/// Stats cache dates are ISO formatted, so the range check is a plain
/// lexicographic comparison.
fn week_bounds(today: NaiveDate) -> (String, String) {
    let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
    let sunday = monday + Days::new(6);
    (
        monday.format("%Y-%m-%d").to_string(),
        sunday.format("%Y-%m-%d").to_string(),
    )
}

/// Format a token count for display (e.g. 1234567 -> "1.2M").
pub fn format_tokens(n: u64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Convert a model ID to a friendly display name.
pub fn friendly_model_name(model_id: &str) -> String {
    let mapping = [
        ("claude-opus-4-5-20251101", "Opus 4.5"),
        ("claude-sonnet-4-5-20250929", "Sonnet 4.5"),
        ("claude-haiku-4-5-20251001", "Haiku 4.5"),
    ];
    for (key, name) in mapping {
        if model_id.contains(key) {
            return name.to_string();
        }
    }
    model_id.to_string()
}

/// Weekly usage aggregated from `<claude_dir>/stats-cache.json`.
pub fn weekly_stats(claude_dir: &Path) -> WeeklyStats {
    weekly_stats_at(claude_dir, chrono::Local::now().date_naive())
}

fn weekly_stats_at(claude_dir: &Path, today: NaiveDate) -> WeeklyStats {
    let mut result = WeeklyStats::default();

    let path = claude_dir.join("stats-cache.json");
    let cache: StatsCache = match fs::read_to_string(&path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
    {
        Some(cache) => cache,
        None => {
            debug!("no readable stats cache at {:?}", path);
            return result;
        }
    };

    let (monday, sunday) = week_bounds(today);

    for day in &cache.daily_activity {
        if day.date.as_str() >= monday.as_str() && day.date.as_str() <= sunday.as_str() {
            result.messages += day.message_count;
            result.sessions += day.session_count;
            result.tool_calls += day.tool_call_count;
        }
    }

    for day in &cache.daily_model_tokens {
        if day.date.as_str() >= monday.as_str() && day.date.as_str() <= sunday.as_str() {
            for (model, count) in &day.tokens_by_model {
                *result
                    .tokens_by_model
                    .entry(friendly_model_name(model))
                    .or_insert(0) += count;
            }
        }
    }

    result
}

/// Most recently modified session across all project indexes.
fn find_latest_session(claude_dir: &Path) -> Option<SessionIndexEntry> {
    let pattern = claude_dir.join("projects/*/sessions-index.json");
    let paths = glob::glob(&pattern.to_string_lossy()).ok()?;

    let mut best: Option<SessionIndexEntry> = None;
    for index_path in paths.flatten() {
        let index: SessionsIndex = match fs::read_to_string(&index_path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
        {
            Some(index) => index,
            None => continue,
        };

        for entry in index.entries {
            if best.as_ref().is_some_and(|b| b.file_mtime >= entry.file_mtime) {
                continue;
            }
            if Path::new(&entry.full_path).is_file() {
                best = Some(entry);
            }
        }
    }
    best
}

/// Session duration between two RFC 3339 timestamps (e.g. "1h 2m 3s").
fn format_session_duration(created: &str, modified: &str) -> Option<String> {
    let t0 = chrono::DateTime::parse_from_rfc3339(created).ok()?;
    let t1 = chrono::DateTime::parse_from_rfc3339(modified).ok()?;
    let secs = (t1 - t0).num_seconds().max(0) as u64;
    Some(humantime::format_duration(Duration::from_secs(secs)).to_string())
}

/// Latest-session stats from the newest index entry and its transcript.
pub fn session_stats(claude_dir: &Path) -> SessionStats {
    let mut result = SessionStats::default();

    let Some(entry) = find_latest_session(claude_dir) else {
        return result;
    };

    result.summary = if entry.summary.is_empty() {
        entry.first_prompt.chars().take(50).collect()
    } else {
        entry.summary.clone()
    };
    result.session_id = Some(entry.session_id.clone());
    if let Some(duration) = format_session_duration(&entry.created, &entry.modified) {
        result.duration = duration;
    }

    tally_transcript(Path::new(&entry.full_path), &mut result);
    result
}

/// Accumulate message and token counts from a transcript JSONL file.
///
/// Assistant records are deduplicated by requestId because retried requests
/// repeat the same usage block.
fn tally_transcript(path: &Path, result: &mut SessionStats) {
    let Ok(file) = fs::File::open(path) else {
        return;
    };

    let mut seen_request_ids: HashSet<String> = HashSet::new();

    for line in BufReader::new(file).lines() {
        let Ok(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(obj) = serde_json::from_str::<Value>(line) else {
            continue;
        };

        match obj.get("type").and_then(Value::as_str) {
            Some("user") => {
                if obj.get("isMeta").and_then(Value::as_bool).unwrap_or(false) {
                    continue;
                }
                let message = obj.get("message");
                let role = message
                    .and_then(|m| m.get("role"))
                    .and_then(Value::as_str);
                let content = message
                    .and_then(|m| m.get("content"))
                    .and_then(Value::as_str);
                // Only count real user messages, not tool results.
                if role == Some("user") && content.is_some_and(|c| !c.is_empty()) {
                    result.messages += 1;
                }
            }
            Some("assistant") => {
                if let Some(req_id) = obj.get("requestId").and_then(Value::as_str)
                    && !req_id.is_empty()
                {
                    if seen_request_ids.contains(req_id) {
                        continue;
                    }
                    seen_request_ids.insert(req_id.to_string());
                }

                let usage = obj.get("message").and_then(|m| m.get("usage"));
                let count = |key: &str| -> u64 {
                    usage
                        .and_then(|u| u.get(key))
                        .and_then(Value::as_u64)
                        .unwrap_or(0)
                };
                result.input_tokens += count("input_tokens");
                result.output_tokens += count("output_tokens");
                result.cache_read += count("cache_read_input_tokens");
                result.cache_create += count("cache_creation_input_tokens");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn write_stats_cache(dir: &Path, value: &Value) {
        fs::write(
            dir.join("stats-cache.json"),
            serde_json::to_string_pretty(value).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn test_week_bounds_monday_through_sunday() {
        // 2026-08-04 is a Tuesday.
        let today = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        let (monday, sunday) = week_bounds(today);
        assert_eq!(monday, "2026-08-03");
        assert_eq!(sunday, "2026-08-09");
    }

    #[test]
    fn test_week_bounds_on_monday() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 3).unwrap();
        let (monday, sunday) = week_bounds(today);
        assert_eq!(monday, "2026-08-03");
        assert_eq!(sunday, "2026-08-09");
    }

    #[test]
    fn test_format_tokens() {
        assert_eq!(format_tokens(999), "999");
        assert_eq!(format_tokens(1_234), "1.2K");
        assert_eq!(format_tokens(1_234_567), "1.2M");
    }

    #[test]
    fn test_friendly_model_name() {
        assert_eq!(friendly_model_name("claude-opus-4-5-20251101"), "Opus 4.5");
        assert_eq!(
            friendly_model_name("us.claude-sonnet-4-5-20250929-v1"),
            "Sonnet 4.5"
        );
        assert_eq!(friendly_model_name("some-other-model"), "some-other-model");
    }

    #[test]
    fn test_weekly_stats_filters_to_current_week() {
        let tmp = TempDir::new().unwrap();
        write_stats_cache(
            tmp.path(),
            &json!({
                "dailyActivity": [
                    {"date": "2026-08-03", "messageCount": 10, "sessionCount": 2, "toolCallCount": 30},
                    {"date": "2026-08-04", "messageCount": 5, "sessionCount": 1, "toolCallCount": 7},
                    {"date": "2026-07-20", "messageCount": 100, "sessionCount": 9, "toolCallCount": 400}
                ],
                "dailyModelTokens": [
                    {"date": "2026-08-03", "tokensByModel": {"claude-opus-4-5-20251101": 1000}},
                    {"date": "2026-08-04", "tokensByModel": {"claude-opus-4-5-20251101": 500, "claude-haiku-4-5-20251001": 50}},
                    {"date": "2026-07-20", "tokensByModel": {"claude-opus-4-5-20251101": 99999}}
                ]
            }),
        );

        let today = NaiveDate::from_ymd_opt(2026, 8, 4).unwrap();
        let stats = weekly_stats_at(tmp.path(), today);

        assert_eq!(stats.messages, 15);
        assert_eq!(stats.sessions, 3);
        assert_eq!(stats.tool_calls, 37);
        assert_eq!(stats.tokens_by_model.get("Opus 4.5"), Some(&1500));
        assert_eq!(stats.tokens_by_model.get("Haiku 4.5"), Some(&50));
    }

    #[test]
    fn test_weekly_stats_missing_cache_is_zeroed() {
        let tmp = TempDir::new().unwrap();
        let stats = weekly_stats(tmp.path());
        assert_eq!(stats, WeeklyStats::default());
    }

    #[test]
    fn test_session_stats_without_indexes_is_default() {
        let tmp = TempDir::new().unwrap();
        let stats = session_stats(tmp.path());
        assert_eq!(stats.summary, "No active session");
        assert_eq!(stats.messages, 0);
    }

    #[test]
    fn test_session_stats_reads_latest_transcript() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("projects").join("demo");
        fs::create_dir_all(&project_dir).unwrap();

        let transcript = project_dir.join("s1.jsonl");
        let lines = [
            json!({"type": "user", "message": {"role": "user", "content": "hello"}}).to_string(),
            json!({"type": "user", "isMeta": true, "message": {"role": "user", "content": "meta"}})
                .to_string(),
            json!({"type": "user", "message": {"role": "user", "content": [{"tool_result": true}]}})
                .to_string(),
            json!({"type": "assistant", "requestId": "r1", "message": {"usage": {
                "input_tokens": 100, "output_tokens": 20,
                "cache_read_input_tokens": 5, "cache_creation_input_tokens": 3
            }}})
            .to_string(),
            // Duplicate requestId must not double-count.
            json!({"type": "assistant", "requestId": "r1", "message": {"usage": {
                "input_tokens": 100, "output_tokens": 20
            }}})
            .to_string(),
            json!({"type": "assistant", "requestId": "r2", "message": {"usage": {
                "input_tokens": 7, "output_tokens": 1
            }}})
            .to_string(),
        ];
        fs::write(&transcript, lines.join("\n")).unwrap();

        let index = json!({
            "entries": [{
                "sessionId": "s1",
                "summary": "Fixing the widget",
                "firstPrompt": "please fix the widget",
                "fullPath": transcript.to_string_lossy(),
                "fileMtime": 2000.0,
                "created": "2026-08-04T10:00:00Z",
                "modified": "2026-08-04T11:02:03Z"
            }]
        });
        fs::write(
            project_dir.join("sessions-index.json"),
            index.to_string(),
        )
        .unwrap();

        let stats = session_stats(tmp.path());
        assert_eq!(stats.summary, "Fixing the widget");
        assert_eq!(stats.session_id.as_deref(), Some("s1"));
        assert_eq!(stats.messages, 1, "meta and tool-result lines are skipped");
        assert_eq!(stats.input_tokens, 107);
        assert_eq!(stats.output_tokens, 21);
        assert_eq!(stats.cache_read, 5);
        assert_eq!(stats.cache_create, 3);
        assert_eq!(stats.duration, "1h 2m 3s");
    }

    #[test]
    fn test_session_stats_prefers_newest_entry_with_existing_file() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("projects").join("demo");
        fs::create_dir_all(&project_dir).unwrap();

        let old_transcript = project_dir.join("old.jsonl");
        fs::write(&old_transcript, "").unwrap();

        let index = json!({
            "entries": [
                {
                    "sessionId": "old",
                    "summary": "old session",
                    "fullPath": old_transcript.to_string_lossy(),
                    "fileMtime": 1000.0
                },
                {
                    "sessionId": "ghost",
                    "summary": "newer but deleted",
                    "fullPath": project_dir.join("missing.jsonl").to_string_lossy(),
                    "fileMtime": 9000.0
                }
            ]
        });
        fs::write(project_dir.join("sessions-index.json"), index.to_string()).unwrap();

        let stats = session_stats(tmp.path());
        assert_eq!(stats.session_id.as_deref(), Some("old"));
    }

    #[test]
    fn test_summary_falls_back_to_first_prompt() {
        let tmp = TempDir::new().unwrap();
        let project_dir = tmp.path().join("projects").join("demo");
        fs::create_dir_all(&project_dir).unwrap();

        let transcript = project_dir.join("s1.jsonl");
        fs::write(&transcript, "").unwrap();

        let long_prompt = "x".repeat(80);
        let index = json!({
            "entries": [{
                "sessionId": "s1",
                "summary": "",
                "firstPrompt": long_prompt,
                "fullPath": transcript.to_string_lossy(),
                "fileMtime": 1.0
            }]
        });
        fs::write(project_dir.join("sessions-index.json"), index.to_string()).unwrap();

        let stats = session_stats(tmp.path());
        assert_eq!(stats.summary.chars().count(), 50);
    }
}
