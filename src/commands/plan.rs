use anyhow::Result;
use stackplan::application::DeployOptions;
use stackplan::domain::ports::NoopEventSink;
use stackplan::infrastructure::{diff_plans, render_plan, PlanStore};
use stackplan::presentation::{create_deploy_use_case, SummaryRenderer, TargetArgs};

use super::Session;

pub fn cmd_plan(session: &Session, target: &TargetArgs, diff: bool, save: bool) -> Result<()> {
    let options = DeployOptions::new(&target.environment)
        .with_context(target.context())
        .with_secrets_dir(target.secrets_dir(&session.project_root))
        .with_dry_run(true);

    let use_case = create_deploy_use_case(session.config.document.clone(), &session.state_dir);
    let planned = use_case.plan(&options)?;
    use_case.preflight(&planned.graph, &NoopEventSink)?;

    let rendered = render_plan(&planned.graph)?;
    let store = PlanStore::in_dir(&session.state_dir);
    let label = planned.environment.name.as_str();

    let plan_diff = if diff {
        store
            .load(label)?
            .map(|previous| diff_plans(label, &previous, &rendered))
    } else {
        None
    };
    let saved = if save {
        Some(store.save(label, &rendered)?)
    } else {
        None
    };

    let summary = planned.summary(false, None);

    if session.json {
        let output = serde_json::json!({
            "event": "plan",
            "summary": summary,
            "graph": planned.graph,
            "diff": plan_diff.as_ref().map(|d| serde_json::json!({
                "additions": d.additions,
                "deletions": d.deletions,
                "unified": d.unified,
            })),
            "saved": saved.as_ref().map(|p| p.display().to_string()),
        });
        println!("{}", output);
        return Ok(());
    }

    let renderer = session.text_renderer();
    print!("{}", renderer.render_graph(&planned.graph));
    println!();
    print!("{}", renderer.render(&summary));

    if diff {
        println!();
        match &plan_diff {
            None => println!("No saved plan for '{}'; run with --save first", label),
            Some(d) if !d.has_changes() => println!("No changes since the saved plan"),
            Some(d) => {
                println!("Changes since the saved plan ({}):", d.summary());
                print!("{}", d.unified);
            }
        }
    }
    if let Some(path) = saved {
        println!();
        println!("Plan saved to {}", path.display());
    }
    Ok(())
}
