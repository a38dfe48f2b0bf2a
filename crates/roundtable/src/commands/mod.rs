//! Command dispatch: bridges CLI args -> core operations -> output.

pub mod config_cmd;
pub mod qr;
pub mod session;
pub mod survey;

use crate::cli::{Command, GlobalOpts};
use crate::context::Context;
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Qr(args) => qr::handle(ctx, args, global).await,
        Command::Session(args) => session::handle(ctx, args, global).await,
        Command::Survey(args) => survey::handle(ctx, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
