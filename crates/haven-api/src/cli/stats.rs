//! Chat activity dashboard command.

use anyhow::Result;
use console::style;

use haven_core::stats::collect_chat_stats;

use crate::state::AppState;

/// Print the same numbers the admin dashboard shows.
pub async fn stats(state: &AppState, json: bool) -> Result<()> {
    let stats = collect_chat_stats(
        state.chat_service.chat_repo(),
        state.counselor_service.repo(),
    )
    .await?;

    if json {
        let out = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "assistant_model": state.config.assistant.model,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Haven v{}",
        style("♥").magenta().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Chats ──").dim());
    println!("  Total chats:      {}", style(stats.total_chats).bold());
    println!("  Total messages:   {}", style(stats.total_messages).bold());
    println!("  Avg per chat:     {}", stats.average_messages_per_chat);
    println!("  AI chat users:    {}", style(stats.active_users).green());
    println!();

    println!("  {}", style("── Counselors ──").dim());
    println!("  Active:           {}", style(stats.active_counselors).green());
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!("  Database: {}", style("SQLite (WAL mode)").dim());
    println!("  Assistant model: {}", style(&state.config.assistant.model).dim());
    println!();

    Ok(())
}
