//! Counselor directory CLI subcommands.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Input};
use uuid::Uuid;

use haven_types::counselor::{Counselor, CounselorDraft};
use haven_types::profile::UserRole;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum CounselorCommand {
    /// List counselors (active only unless --all).
    List {
        /// Include inactive counselors.
        #[arg(long)]
        all: bool,
    },

    /// Add a counselor. Prompts for missing fields unless --json.
    Add {
        /// Full name, e.g. "Dr. Priya Sharma".
        #[arg(long)]
        name: Option<String>,

        /// Specialization tag, e.g. "Academic Stress".
        #[arg(long)]
        specialization: Option<String>,

        #[arg(long)]
        bio: Option<String>,

        /// Years of experience.
        #[arg(long)]
        years: Option<u32>,

        /// Rating between 0 and 5.
        #[arg(long)]
        rating: Option<f32>,

        /// Link an existing user account; the user becomes a counselor.
        #[arg(long)]
        user_id: Option<Uuid>,
    },

    /// Remove a counselor together with their chats and queries.
    #[command(alias = "rm")]
    Remove {
        id: Uuid,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Make a counselor visible to students again.
    Activate { id: Uuid },

    /// Hide a counselor from students.
    Deactivate { id: Uuid },
}

pub async fn handle_counselor_command(
    cmd: CounselorCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        CounselorCommand::List { all } => list_counselors(state, all, json).await,
        CounselorCommand::Add {
            name,
            specialization,
            bio,
            years,
            rating,
            user_id,
        } => {
            let draft = CounselorDraft {
                full_name: prompt_if_missing(name, "Full name", json)?,
                specialization: prompt_if_missing(specialization, "Specialization", json)?,
                bio,
                profile_image_url: None,
                years_experience: years,
                rating,
                user_id,
            };
            add_counselor(state, draft, json).await
        }
        CounselorCommand::Remove { id, force } => remove_counselor(state, &id, force, json).await,
        CounselorCommand::Activate { id } => set_active(state, &id, true, json).await,
        CounselorCommand::Deactivate { id } => set_active(state, &id, false, json).await,
    }
}

fn prompt_if_missing(value: Option<String>, prompt: &str, json: bool) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None if json => anyhow::bail!("{prompt} is required"),
        None => Ok(Input::<String>::new().with_prompt(prompt).interact_text()?),
    }
}

async fn list_counselors(state: &AppState, all: bool, json: bool) -> Result<()> {
    let counselors = if all {
        state.counselor_service.list_all().await?
    } else {
        state.counselor_service.list_active().await?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&counselors)?);
        return Ok(());
    }

    if counselors.is_empty() {
        println!();
        println!(
            "  {} No counselors found. Add one with: {}",
            style("i").blue().bold(),
            style("haven counselor add").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Specialization").fg(Color::White),
        Cell::new("Experience").fg(Color::White),
        Cell::new("Rating").fg(Color::White),
        Cell::new("Status").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for c in &counselors {
        let status_cell = if c.is_active {
            Cell::new("● active").fg(Color::Green)
        } else {
            Cell::new("○ inactive").fg(Color::Yellow)
        };
        table.add_row(vec![
            Cell::new(&c.full_name),
            Cell::new(&c.specialization),
            Cell::new(
                c.years_experience
                    .map(|y| format!("{y} yrs"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(
                c.rating
                    .map(|r| format!("{r:.1}"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            status_cell,
            Cell::new(c.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!("{table}");
    Ok(())
}

async fn add_counselor(state: &AppState, draft: CounselorDraft, json: bool) -> Result<()> {
    let linked = draft.user_id;
    if let Some(user_id) = linked {
        state
            .profile_service
            .get(&user_id)
            .await
            .with_context(|| format!("User '{user_id}' not found"))?;
    }

    let counselor = state.counselor_service.create(draft).await?;
    if let Some(user_id) = linked {
        state
            .profile_service
            .set_role(&user_id, UserRole::Counselor)
            .await?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&counselor)?);
        return Ok(());
    }

    println!();
    println!("  {} Counselor added!", style("✓").green().bold());
    print_counselor(&counselor);
    Ok(())
}

fn print_counselor(c: &Counselor) {
    println!();
    println!("  {}  {}", style("Name:").bold(), style(&c.full_name).cyan());
    println!("  {}  {}", style("Specialization:").bold(), c.specialization);
    if let Some(bio) = &c.bio {
        println!("  {}  {}", style("Bio:").bold(), bio);
    }
    if let Some(user_id) = c.user_id {
        println!("  {}  {}", style("Linked user:").bold(), user_id);
    }
    println!("  {}  {}", style("ID:").bold(), style(c.id.to_string()).dim());
    println!();
}

async fn remove_counselor(state: &AppState, id: &Uuid, force: bool, json: bool) -> Result<()> {
    let counselor = state.counselor_service.get(id).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Remove '{}' along with their chats and queries?",
                style(&counselor.full_name).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.counselor_service.delete(id).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": true, "id": id }));
    } else {
        println!(
            "  {} Counselor '{}' removed.",
            style("✓").red().bold(),
            counselor.full_name
        );
    }
    Ok(())
}

async fn set_active(state: &AppState, id: &Uuid, active: bool, json: bool) -> Result<()> {
    let counselor = state.counselor_service.set_active(id, active).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&counselor)?);
    } else if active {
        println!(
            "  {} '{}' is visible to students.",
            style("●").green().bold(),
            counselor.full_name
        );
    } else {
        println!(
            "  {} '{}' is hidden from students.",
            style("○").yellow().bold(),
            counselor.full_name
        );
    }
    Ok(())
}
