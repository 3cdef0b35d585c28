//! `ls`: list the direct children of a folder.

use driveloader_core::domain::{ObjectKind, RemoteObject};
use driveloader_core::utils::format_size;
use driveloader_download::FolderRef;

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, folder: &str) -> Result<(), CliError> {
    let (folder, children) = ctx
        .orchestrator()
        .expander()
        .expand(FolderRef::Name(folder.to_string()))
        .await?;

    println!("{} ({})", folder.name, folder.id);
    for child in &children {
        println!("{}", format_entry(child));
    }
    println!("{} item(s)", children.len());
    Ok(())
}

fn format_entry(object: &RemoteObject) -> String {
    let kind = match object.kind {
        ObjectKind::Folder => "dir",
        ObjectKind::Document => "doc",
        ObjectKind::File => "file",
    };
    let size = object.size.map_or_else(|| "-".to_string(), format_size);
    format!("  {kind:<4} {size:>10}  {}  [{}]", object.name, object.id)
}
