//! `resolve`: print the id a name resolves to.

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, name: &str, parent: Option<&str>) -> Result<(), CliError> {
    let object = ctx.orchestrator().resolver().resolve_object(name, parent).await?;
    println!("{}\t{}", object.id, object.name);
    Ok(())
}
