use anyhow::Result;
use stackplan::application::DeployOptions;
use stackplan::presentation::{
    create_deploy_use_case, create_event_sink, create_renderer, OutputFormat, TargetArgs,
};

use super::Session;

pub fn cmd_deploy(session: &Session, target: &TargetArgs, dry_run: bool) -> Result<()> {
    let options = DeployOptions::new(&target.environment)
        .with_context(target.context())
        .with_secrets_dir(target.secrets_dir(&session.project_root))
        .with_dry_run(dry_run);

    let mut use_case =
        create_deploy_use_case(session.config.document.clone(), &session.state_dir);
    let sink = create_event_sink(session.json, session.verbose);
    let summary = use_case.execute_with_events(&options, sink)?;

    let format = if session.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let renderer = create_renderer(format, session.text_renderer().unicode, session.verbose);
    if !session.json {
        println!();
    }
    print!("{}", renderer.render(&summary));
    if session.json {
        println!();
    }
    Ok(())
}
