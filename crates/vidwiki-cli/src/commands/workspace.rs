use super::confirm;
use anyhow::{Context, Result, bail};
use std::path::PathBuf;
use vidwiki_application::{
    AppServices, GenerationOutcome, IntakeOutcome, SaveOutcome, WorkspaceUseCase,
};
use vidwiki_core::generation::GeneratedArtifact;
use vidwiki_core::sink::SinkTarget;
use vidwiki_core::VidwikiError;
use vidwiki_core::wizard::WizardStep;

pub struct GenerateOptions {
    pub url: Option<String>,
    pub content: Option<String>,
    pub style: Option<String>,
    pub save: Option<Vec<SinkTarget>>,
    pub assume_yes: bool,
}

pub async fn generate(services: &AppServices, id: &str, options: GenerateOptions) -> Result<()> {
    let workspace = services.open_workspace(id).await?;
    if let Some(content) = &options.content {
        workspace.set_content_intent(content).await;
    }
    if let Some(style) = &options.style {
        workspace.set_style_intent(style).await;
    }

    let ctx = workspace.snapshot().await;
    let outcome = if ctx.wizard.step() == WizardStep::Intake {
        let source = options
            .url
            .clone()
            .or_else(|| ctx.session.source_reference.clone())
            .context("The session has no source yet; pass --url")?;
        match workspace.submit_source(&source).await {
            Ok(IntakeOutcome::Generation(outcome)) => outcome,
            Ok(IntakeOutcome::AwaitingConfiguration) => run_generation(&workspace).await?,
            Err(e) if e.is_intake() => bail!("Invalid source '{source}': {e}"),
            Err(e) => return Err(explain_generation_error(e)),
        }
    } else {
        if options.url.is_some() {
            tracing::warn!("--url ignored: the session already has a saved article");
        }
        run_generation(&workspace).await?
    };

    let GenerationOutcome::Generated(artifact) = outcome else {
        bail!("Another request is still running for session {id}");
    };
    print_artifact(&artifact);

    match options.save {
        Some(targets) => save_workspace(services, &workspace, &targets, options.assume_yes).await,
        None => {
            println!();
            println!("Not saved. Re-run with --save library to keep this article.");
            Ok(())
        }
    }
}

async fn run_generation(workspace: &WorkspaceUseCase) -> Result<GenerationOutcome> {
    workspace.generate().await.map_err(explain_generation_error)
}

fn explain_generation_error(error: VidwikiError) -> anyhow::Error {
    if error.is_generation() && error.is_retryable() {
        anyhow::Error::new(error).context("Generation failed; the service may be busy, try again")
    } else {
        error.into()
    }
}

pub async fn edit(
    services: &AppServices,
    id: &str,
    body_file: Option<PathBuf>,
    tags: Option<String>,
) -> Result<()> {
    if body_file.is_none() && tags.is_none() {
        bail!("Nothing to edit; pass --body-file and/or --tags");
    }

    let workspace = services.open_workspace(id).await?;
    if let Some(path) = body_file {
        let body = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        workspace.edit_body(&body).await?;
    }
    if let Some(tags) = tags {
        workspace.edit_tags(&tags).await?;
    }

    save_workspace(services, &workspace, &[SinkTarget::Library], true).await
}

pub async fn save(
    services: &AppServices,
    id: &str,
    targets: &[SinkTarget],
    assume_yes: bool,
) -> Result<()> {
    let workspace = services.open_workspace(id).await?;
    if workspace.snapshot().await.artifact.is_none() {
        bail!("Session {id} has no article yet; run `vidwiki generate {id}` first");
    }
    save_workspace(services, &workspace, targets, assume_yes).await
}

async fn save_workspace(
    services: &AppServices,
    workspace: &WorkspaceUseCase,
    targets: &[SinkTarget],
    assume_yes: bool,
) -> Result<()> {
    let leaves_machine = targets.iter().any(|t| *t != SinkTarget::Library);
    let outcome = if leaves_machine {
        let token = workspace.request_save(targets).await;
        if !confirm(&token.prompt(), assume_yes)? {
            services.confirmations.cancel(&token);
            bail!("Save cancelled");
        }
        workspace.save_confirmed(&token).await?
    } else {
        workspace.save(targets).await?
    };

    let SaveOutcome::Saved(outcomes) = outcome else {
        bail!("Another request is still running for this session");
    };

    println!();
    let mut failed = 0;
    for outcome in &outcomes {
        if outcome.is_success() {
            println!("{:<8} ok      {}", outcome.sink, outcome.detail);
        } else {
            failed += 1;
            println!("{:<8} FAILED  {}", outcome.sink, outcome.detail);
        }
    }
    if failed > 0 {
        bail!("{failed} of {} target(s) failed", outcomes.len());
    }
    Ok(())
}

fn print_artifact(artifact: &GeneratedArtifact) {
    println!("{}", artifact.body);
    if !artifact.tags.is_empty() {
        println!();
        println!("{}", artifact.tags);
    }
    if let Some(provider) = &artifact.provider {
        tracing::info!("generated with {provider}");
    }
}
