use anyhow::{Result, bail};
use concepter_application::ConcepterContext;
use concepter_application::state::CONCEPTS_LOADING_KEY;

pub async fn list(context: &ConcepterContext) -> Result<()> {
    if !context.session.is_authenticated() {
        bail!("Not signed in. Run `concepter login` first.");
    }

    // Each run starts with a cold store, so this always fetches
    let state = &context.state;
    state.ensure_concepts_loaded();
    let snapshot = state
        .wait_until(|s| !s.is_loading(CONCEPTS_LOADING_KEY))
        .await;

    if !snapshot.concepts_loaded {
        let reason = snapshot.error.as_deref().unwrap_or("unknown error");
        bail!("Could not load concepts: {}", reason);
    }

    if snapshot.concepts.is_empty() {
        println!("No concepts yet");
        return Ok(());
    }

    println!("{:<38} {:<12} TITLE", "ID", "STATUS");
    for concept in &snapshot.concepts {
        println!(
            "{:<38} {:<12} {}",
            concept.id,
            concept.status.as_str(),
            concept.title
        );
    }
    Ok(())
}
