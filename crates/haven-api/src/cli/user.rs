//! User management CLI subcommands.
//!
//! The first admin has to be promoted here; the REST admin endpoints
//! require an existing admin.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use uuid::Uuid;

use haven_types::profile::UserRole;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum UserCommand {
    /// List all user profiles, newest first.
    List,

    /// Change a user's role (user, counselor, admin).
    Role {
        id: Uuid,

        #[arg(value_parser = parse_role)]
        role: UserRole,
    },
}

fn parse_role(s: &str) -> Result<UserRole, String> {
    s.parse()
}

pub async fn handle_user_command(cmd: UserCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        UserCommand::List => list_users(state, json).await,
        UserCommand::Role { id, role } => set_role(state, &id, role, json).await,
    }
}

async fn list_users(state: &AppState, json: bool) -> Result<()> {
    let users = state.profile_service.list_users().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&users)?);
        return Ok(());
    }

    if users.is_empty() {
        println!();
        println!(
            "  {} No users yet. Profiles are created on first sign-in.",
            style("i").blue().bold()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Email").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Joined").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for user in &users {
        let role_cell = match user.role {
            UserRole::Admin => Cell::new("admin").fg(Color::Magenta),
            UserRole::Counselor => Cell::new("counselor").fg(Color::Cyan),
            UserRole::User => Cell::new("user"),
        };
        table.add_row(vec![
            Cell::new(user.full_name.as_deref().unwrap_or("-")),
            Cell::new(&user.email),
            role_cell,
            Cell::new(user.created_at.format("%Y-%m-%d").to_string()),
            Cell::new(user.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!("{table}");
    Ok(())
}

async fn set_role(state: &AppState, id: &Uuid, role: UserRole, json: bool) -> Result<()> {
    state.profile_service.set_role(id, role).await?;

    if json {
        println!("{}", serde_json::json!({ "id": id, "role": role }));
    } else {
        println!(
            "  {} User {} is now {}.",
            style("✓").green().bold(),
            style(id.to_string()).dim(),
            style(role).cyan().bold()
        );
    }
    Ok(())
}
