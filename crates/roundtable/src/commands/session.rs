//! Session command handlers.

use std::sync::Arc;

use owo_colors::OwoColorize;
use tabled::Tabled;

use roundtable_core::{LobbyWatch, SessionEngine, SessionId};

use crate::cli::{GlobalOpts, SessionArgs, SessionCommand};
use crate::context::Context;
use crate::error::CliError;
use crate::output;

pub async fn handle(
    ctx: &Context,
    args: SessionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SessionCommand::Run { session } => run(ctx, &session, global).await,
        SessionCommand::Status { session } => status(ctx, &session, global).await,
        SessionCommand::Lobby { session, ready } => lobby(ctx, &session, ready, global).await,
    }
}

// ── status ──────────────────────────────────────────────────────────

#[derive(serde::Serialize)]
struct PhaseStatus {
    phase: String,
    remaining_seconds: Option<u64>,
}

async fn status(ctx: &Context, session: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let session_id = SessionId::new(session)?;
    let read = ctx.client.session_phase(session_id.as_str()).await?;

    let remaining = read
        .end_time
        .map(|end| {
            let secs = (end - chrono::Utc::now()).num_seconds().max(0);
            secs.unsigned_abs()
        })
        .or(read.remaining_seconds);

    let state = PhaseStatus {
        phase: read.phase,
        remaining_seconds: remaining,
    };

    let out = output::render_single(
        &global.output,
        &state,
        |s| {
            format!(
                "Phase:     {}\nRemaining: {}",
                s.phase,
                s.remaining_seconds
                    .map_or_else(|| "-".to_owned(), output::format_countdown),
            )
        },
        |s| s.phase.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── run ─────────────────────────────────────────────────────────────

async fn run(ctx: &Context, session: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let session_id = SessionId::new(session)?;
    let engine = SessionEngine::new(
        Arc::clone(&ctx.client),
        Arc::clone(&ctx.cache),
        session_id,
        ctx.user_id.clone(),
        ctx.timing.clone(),
    );

    let phase = engine.initialize().await?;
    if !global.quiet {
        eprintln!("Session started in {phase} (ctrl-c to leave; the timer keeps running server-side)");
    }

    let mut phases = engine.subscribe_phase();
    let mut countdown = engine.subscribe_remaining();
    let tasks = engine.spawn();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = phases.changed() => {
                let Some(phase) = changed else { break };
                if phase.is_terminal() {
                    if !global.quiet {
                        println!("{}", format!("Phase {phase} -- timed flow complete").green());
                    }
                    break;
                }
                if !global.quiet {
                    println!("{}", format!("-- {phase} --").bold());
                }
            }
            changed = countdown.changed() => {
                let Some(remaining) = changed else { break };
                if !global.quiet {
                    println!("{}  {}", engine.phase(), output::format_countdown(remaining));
                }
            }
        }
    }

    tasks.shutdown().await;
    Ok(())
}

// ── lobby ───────────────────────────────────────────────────────────

#[derive(Tabled)]
struct ParticipantRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Department")]
    department: String,
}

async fn lobby(
    ctx: &Context,
    session: &str,
    ready: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session_id = SessionId::new(session)?;
    let lobby = LobbyWatch::new(
        Arc::clone(&ctx.client),
        session_id,
        ctx.user_id.clone(),
        ctx.timing.clone(),
    );

    lobby.poll_participants_once().await;
    lobby.poll_ready_once().await;

    if ready {
        lobby.mark_ready().await?;
        if !global.quiet {
            eprintln!("Marked ready; waiting for the rest of the group");
        }
    }

    let roster = lobby.participants();
    let ready_states = lobby.ready_states();
    let rows: Vec<ParticipantRow> = roster
        .iter()
        .map(|p| {
            let is_ready = ready_states
                .iter()
                .any(|r| r.student_id == p.id && r.is_ready);
            ParticipantRow {
                id: p.id.to_string(),
                name: if is_ready {
                    format!("{} (ready)", p.name)
                } else {
                    p.name.clone()
                },
                department: p.department.clone().unwrap_or_default(),
            }
        })
        .collect();

    // Render the roster once, then wait for the start signal.
    if !global.quiet {
        let table = if rows.is_empty() {
            "(no other participants yet)".to_owned()
        } else {
            let mut table = tabled::Table::new(&rows);
            table.with(tabled::settings::Style::rounded());
            table.to_string()
        };
        println!("{table}");
    }

    let mut all_ready = lobby.subscribe_all_ready();
    let polling = lobby.spawn();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = all_ready.changed() => {
                match changed {
                    Some(true) => {
                        if !global.quiet {
                            println!("{}", "All participants ready -- session starting".green());
                        }
                        break;
                    }
                    Some(false) => {}
                    None => break,
                }
            }
        }
    }

    polling.shutdown().await;
    Ok(())
}
