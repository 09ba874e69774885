//! Publish actions

use clap::Args;
use homebook_engine::{publish_action, FailureOutcome};
use serde_json::json;

use super::{print_json, CliResult, Context, LogViewNotifier};

#[derive(Debug, Args)]
pub struct PublishArgs {
    pub book_id: String,

    /// publish | draft | restore_latest_published
    #[arg(long, default_value = "publish")]
    pub action: String,
}

pub fn execute(args: PublishArgs, ctx: &mut Context) -> CliResult {
    let caller = ctx.user().map(str::to_string);
    match publish_action(
        caller.as_deref(),
        &args.book_id,
        &args.action,
        &LogViewNotifier,
        &mut ctx.conn,
    ) {
        Ok(outcome) => print_json(&outcome),
        Err(e) => {
            let outcome = FailureOutcome::classify(&e);
            eprintln!(
                "{}",
                json!({
                    "outcome": outcome.as_str(),
                    "code": e.code(),
                    "request_id": e.request_id().map(|r| r.as_str()),
                })
            );
            Err(e.into())
        }
    }
}
