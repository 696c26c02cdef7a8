//! `cwatch usage` - weekly and current-session usage report.

use anyhow::Result;
use cwatch_common::usage::{format_tokens, session_stats, weekly_stats};
use std::path::PathBuf;

pub fn run(claude_dir: Option<PathBuf>) -> Result<()> {
    let claude_dir = super::resolve_claude_dir(claude_dir)?;

    let weekly = weekly_stats(&claude_dir);
    println!("Weekly usage");
    println!("  Messages:   {}", weekly.messages);
    println!("  Sessions:   {}", weekly.sessions);
    println!("  Tool calls: {}", weekly.tool_calls);
    println!("  Tokens by model:");
    if weekly.tokens_by_model.is_empty() {
        println!("    (none this week)");
    } else {
        let mut models: Vec<_> = weekly.tokens_by_model.iter().collect();
        models.sort_by(|a, b| b.1.cmp(a.1));
        for (model, count) in models {
            println!("    {model}: {}", format_tokens(*count));
        }
    }

    let session = session_stats(&claude_dir);
    println!();
    println!("Current session");
    println!("  Summary:      {}", session.summary);
    println!("  Messages:     {}", session.messages);
    println!("  Duration:     {}", session.duration);
    println!("  Input:        {}", format_tokens(session.input_tokens));
    println!("  Output:       {}", format_tokens(session.output_tokens));
    println!("  Cache read:   {}", format_tokens(session.cache_read));
    println!("  Cache create: {}", format_tokens(session.cache_create));

    Ok(())
}
