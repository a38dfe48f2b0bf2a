//! Survey command handlers.

use serde::Serialize;
use tabled::Tabled;

use roundtable_core::{SessionId, SurveyQuestion, shuffle};

use crate::cli::{GlobalOpts, SurveyArgs, SurveyCommand};
use crate::context::Context;
use crate::error::CliError;
use crate::output;

/// A question with its position in this user's order.
#[derive(Serialize, Tabled)]
struct OrderedQuestion {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Question")]
    text: String,
    #[tabled(rename = "Weight")]
    weight: f64,
}

pub async fn handle(
    ctx: &Context,
    args: SurveyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SurveyCommand::Order { session, level } => order(ctx, &session, level, global).await,
    }
}

/// Show this user's deterministic question order for the session --
/// the same order the survey flow walks through.
async fn order(
    ctx: &Context,
    session: &str,
    level: u32,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session_id = SessionId::new(session)?;

    let mut questions: Vec<SurveyQuestion> = ctx
        .client
        .survey_questions(level, Some(session_id.as_str()))
        .await?
        .into_iter()
        .map(SurveyQuestion::from)
        .collect();

    shuffle::shuffle_for(&mut questions, &ctx.user_id, &session_id);

    if !global.quiet {
        let seed = shuffle::derive_seed(&ctx.user_id, &session_id);
        eprintln!(
            "Order for user {} in session {} (seed {seed})",
            ctx.user_id, session_id
        );
    }

    let ordered: Vec<OrderedQuestion> = questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| OrderedQuestion {
            position: i + 1,
            id: q.id,
            text: q.text,
            weight: q.weight,
        })
        .collect();

    let out = output::render_list(
        &global.output,
        &ordered,
        |q| OrderedQuestion {
            position: q.position,
            id: q.id.clone(),
            text: q.text.clone(),
            weight: q.weight,
        },
        |q| q.id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
