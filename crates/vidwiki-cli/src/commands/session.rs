use super::confirm;
use anyhow::{Result, bail};
use vidwiki_application::AppServices;
use vidwiki_core::session::SourceKind;

pub async fn list(services: &AppServices) -> Result<()> {
    let sessions = services.list_sessions().await?;
    if sessions.is_empty() {
        println!("No sessions yet. Create one with `vidwiki new --url <link>`.");
        return Ok(());
    }

    for session in sessions {
        let status = if session.has_saved_document() {
            "saved"
        } else {
            "draft"
        };
        println!(
            "{}  {:<5}  {}  {}",
            session.id, status, session.updated_at, session.title
        );
    }
    Ok(())
}

pub async fn create(
    services: &AppServices,
    title: Option<&str>,
    url: Option<&str>,
    kind: SourceKind,
) -> Result<()> {
    let session = match url {
        Some(url) => services.create_session_from_source(url, kind).await?,
        None => services.create_session(title.unwrap_or_default()).await?,
    };
    println!("Created session {} '{}'", session.id, session.title);
    Ok(())
}

pub async fn show(services: &AppServices, id: &str) -> Result<()> {
    let session = match services.lifecycle.load(id).await {
        Ok(session) => session,
        Err(e) if e.is_not_found() => bail!("No session {id}; see `vidwiki list`"),
        Err(e) => return Err(e.into()),
    };

    println!("Title:   {}", session.title);
    println!("Source:  {}", session.source().unwrap_or("-"));
    println!("Kind:    {}", session.source_kind);
    println!("Created: {}", session.created_at);
    println!("Updated: {}", session.updated_at);
    if let Some(draft) = &session.draft_prompt {
        println!("Content: {}", draft.content_intent);
        if let Some(style) = &draft.style_intent {
            println!("Style:   {style}");
        }
    }
    println!("Prompts used: {}", session.prompt_history.len());

    if session.has_saved_document() {
        println!();
        println!("{}", session.canonical_document);
    }
    Ok(())
}

pub async fn delete(services: &AppServices, id: &str, assume_yes: bool) -> Result<()> {
    let workspace = services.open_workspace(id).await?;
    let token = workspace.request_delete().await;
    if !confirm(&token.prompt(), assume_yes)? {
        services.confirmations.cancel(&token);
        bail!("Deletion cancelled");
    }

    workspace.delete_confirmed(&token).await?;
    println!("Deleted session {id}");
    Ok(())
}
