use anyhow::{Context, Result, bail};
use concepter_application::ConcepterContext;
use concepter_core::auth::{RegisterRequest, is_synthetic_token, token_expires_at};

pub async fn login(context: &ConcepterContext, email: &str, password: &str) -> Result<()> {
    let credential = context
        .session
        .login(email, password)
        .await
        .context("Login failed")?;

    println!("✅ Signed in as {}", credential.issued_user.display_name());
    Ok(())
}

pub async fn register(
    context: &ConcepterContext,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
) -> Result<()> {
    let request = RegisterRequest {
        email,
        password,
        first_name,
        last_name,
        preferences: None,
    };
    let credential = context
        .session
        .register(&request)
        .await
        .context("Registration failed")?;

    println!("✅ Registered and signed in as {}", credential.issued_user.email);
    Ok(())
}

pub async fn logout(context: &ConcepterContext) {
    context.session.logout().await;
    println!("👋 Signed out");
}

pub async fn refresh(context: &ConcepterContext) -> Result<()> {
    match context.session.refresh_token().await {
        Some(credential) => {
            println!("🔄 Session refreshed for {}", credential.issued_user.email);
            Ok(())
        }
        None => bail!("Session could not be refreshed; sign in again"),
    }
}

pub fn status(context: &ConcepterContext) {
    let session = &context.session;
    if !session.is_authenticated() {
        println!("Not signed in");
        return;
    }

    if let Some(user) = session.current_user() {
        println!("Signed in as {} <{}>", user.display_name(), user.email);
    }

    let Some(token) = session.token() else {
        return;
    };
    if is_synthetic_token(&token) {
        println!("Token: offline session, never expires");
    } else if let Some(expires_at) = token_expires_at(&token) {
        println!("Token expires at {}", expires_at.to_rfc3339());
    }
}

pub async fn whoami(context: &ConcepterContext) -> Result<()> {
    if !context.session.is_authenticated() {
        bail!("Not signed in. Run `concepter login` first.");
    }

    let user = context
        .profile
        .get_profile()
        .await
        .context("Failed to fetch profile")?;

    println!("{} <{}>", user.display_name(), user.email);
    println!("  industry: {}", user.preferences.industry);
    println!("  language: {}", user.preferences.language);
    println!("  timezone: {}", user.preferences.timezone);
    Ok(())
}
