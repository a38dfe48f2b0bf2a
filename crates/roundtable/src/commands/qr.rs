//! QR command handlers.

use owo_colors::OwoColorize;
use tabled::Tabled;

use roundtable_core::{QrCarousel, QrCode, VenueId, convert};

use crate::cli::{GlobalOpts, QrArgs, QrCommand};
use crate::context::Context;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct QrRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Usage")]
    usage: String,
    #[tabled(rename = "Remaining")]
    remaining: u32,
    #[tabled(rename = "Expires")]
    expires: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&QrCode> for QrRow {
    fn from(qr: &QrCode) -> Self {
        Self {
            id: qr.id.to_string(),
            usage: format!("{}/{}", qr.current_usage, qr.max_capacity),
            remaining: qr.remaining(),
            expires: qr.expires_at.format("%H:%M:%S").to_string(),
            state: qr_state(qr),
        }
    }
}

fn qr_state(qr: &QrCode) -> String {
    if qr.is_expired() {
        "expired".to_owned()
    } else if qr.is_full() {
        "full".to_owned()
    } else if qr.is_active {
        "active".to_owned()
    } else {
        "inactive".to_owned()
    }
}

fn qr_detail(qr: &QrCode) -> String {
    format!(
        "Venue:     {}\n\
         QR id:     {}\n\
         Payload:   {}\n\
         Usage:     {}/{} ({} remaining)\n\
         Expires:   {}\n\
         State:     {}",
        qr.venue_id,
        qr.id,
        qr.data,
        qr.current_usage,
        qr.max_capacity,
        qr.remaining(),
        qr.expires_at.to_rfc3339(),
        qr_state(qr),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: QrArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        QrCommand::Show { venue, force_new } => show(ctx, &venue, force_new, global).await,
        QrCommand::Watch { venue } => watch(ctx, &venue, global).await,
        QrCommand::History { venue } => history(ctx, &venue, global).await,
    }
}

async fn show(
    ctx: &Context,
    venue: &str,
    force_new: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let lifecycle = lifecycle_for(ctx, venue)?;
    let outcome = lifecycle.fetch_or_create(force_new).await?;

    if outcome.newly_created && !global.quiet {
        eprintln!("{}", "New QR code generated for this venue".green());
    }
    if outcome.from_cache && !global.quiet {
        eprintln!("(served from local snapshot)");
    }

    let out = output::render_single(&global.output, &outcome.qr, qr_detail, |qr| {
        qr.data.clone()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn watch(ctx: &Context, venue: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let lifecycle = lifecycle_for(ctx, venue)?;
    let outcome = lifecycle.fetch_or_create(false).await?;

    if !global.quiet {
        eprintln!(
            "Watching QR {} for venue {} (every {:?}, ctrl-c to stop)",
            outcome.qr.id,
            venue,
            lifecycle.poll_interval()
        );
    }

    let mut updates = lifecycle.subscribe();
    let polling = lifecycle.spawn_polling();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                let Some(Some(qr)) = changed else { break };
                if global.quiet {
                    continue;
                }
                let line = format!(
                    "{}  {}/{} used, {} remaining",
                    qr.id,
                    qr.current_usage,
                    qr.max_capacity,
                    qr.remaining()
                );
                if qr.is_full() {
                    println!("{}  {}", line, "FULL -- regenerating".red());
                } else {
                    println!("{line}");
                }
            }
        }
    }

    polling.shutdown().await;
    Ok(())
}

async fn history(ctx: &Context, venue: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let venue_id = VenueId::new(venue)?;
    let records = ctx.client.qr_history(venue_id.as_str()).await?;

    let codes: Vec<QrCode> = records
        .into_iter()
        .map(|r| convert::qr_from_history(r, venue_id.clone()))
        .collect::<Result<_, _>>()?;

    let carousel = QrCarousel::new(codes);
    if !global.quiet && !carousel.is_empty() {
        let (position, total) = carousel.position();
        eprintln!("{total} codes; current cursor at {position}");
    }

    let out = output::render_list(&global.output, carousel.codes(), |qr| QrRow::from(qr), |qr| {
        qr.id.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

fn lifecycle_for(
    ctx: &Context,
    venue: &str,
) -> Result<roundtable_core::QrLifecycle, CliError> {
    let venue_id = VenueId::new(venue)?;
    Ok(roundtable_core::QrLifecycle::new(
        std::sync::Arc::clone(&ctx.client),
        std::sync::Arc::clone(&ctx.cache),
        venue_id,
        ctx.user_id.clone(),
        ctx.timing.clone(),
    ))
}
