use anyhow::Result;

use super::Session;

pub fn cmd_environments(session: &Session) -> Result<()> {
    let document = &session.config.document;

    if session.json {
        let environments: Vec<serde_json::Value> = document
            .environments
            .iter()
            .map(|(name, env)| {
                serde_json::json!({
                    "name": name,
                    "durability": env.durability,
                    "availability_zones": env.network.availability_zones,
                    "capacity": env.capacity,
                    "task": env.task,
                })
            })
            .collect();
        let output = serde_json::json!({
            "event": "environments",
            "project": document.project,
            "region": document.region,
            "source": session.config.source.display().to_string(),
            "environments": environments,
        });
        println!("{}", output);
        return Ok(());
    }

    print!("{}", session.text_renderer().render_environments(document));
    Ok(())
}
