use anyhow::Result;
use stackplan::domain::entities::StackId;
use stackplan::domain::ports::ExportStore;
use stackplan::infrastructure::FileExportStore;

use super::Session;

pub fn cmd_exports(session: &Session, stack: Option<&str>) -> Result<()> {
    let store = FileExportStore::in_dir(&session.state_dir);
    let mut stacks = store.list().map_err(stackplan::StackplanError::from)?;

    if let Some(id) = stack {
        let id = StackId::from(id);
        stacks.retain(|published, _| *published == id);
        if stacks.is_empty() {
            anyhow::bail!("no exports published for stack '{}'", id);
        }
    }

    if session.json {
        let mut entries = Vec::new();
        for (id, exports) in &stacks {
            let published_at = store
                .published_at(id)
                .map_err(stackplan::StackplanError::from)?
                .map(|t| t.to_rfc3339());
            entries.push(serde_json::json!({
                "stack": id,
                "published_at": published_at,
                "exports": exports.values,
            }));
        }
        let output = serde_json::json!({
            "event": "exports",
            "path": store.path().display().to_string(),
            "stacks": entries,
        });
        println!("{}", output);
        return Ok(());
    }

    print!("{}", session.text_renderer().render_exports(&stacks));
    Ok(())
}
