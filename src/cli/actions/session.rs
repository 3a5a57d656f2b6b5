use super::print_json;
use crate::{
    cli::globals::GlobalArgs,
    features::auth::{AuthContext, Credentials, RefreshOutcome, Registration},
};
use anyhow::{anyhow, bail, Context, Result};
use secrecy::SecretString;
use serde_json::json;
use tracing::info;

#[derive(Debug)]
pub struct LoginArgs {
    pub globals: GlobalArgs,
    pub identifier: String,
    pub password: SecretString,
}

#[derive(Debug)]
pub struct RegisterArgs {
    pub globals: GlobalArgs,
    pub name: String,
    pub identifier: String,
    pub email: Option<String>,
    pub password: SecretString,
}

/// Prints the state; a failed sign-in surfaces the state's error message.
fn report(auth: &AuthContext, signed_in: bool) -> Result<()> {
    let state = auth.snapshot();
    print_json(&state)?;
    if signed_in {
        Ok(())
    } else {
        Err(anyhow!(state
            .error
            .unwrap_or_else(|| "sign-in failed".to_string())))
    }
}

/// # Errors
/// Returns an error if the context cannot be built or the sign-in fails.
pub async fn login(args: LoginArgs) -> Result<()> {
    let auth = args.globals.auth_context()?;
    let credentials = Credentials {
        identifier: args.identifier,
        password: args.password,
    };
    let signed_in = auth.login(&credentials).await;
    report(&auth, signed_in)
}

/// # Errors
/// Returns an error if the context cannot be built or the registration fails.
pub async fn register(args: RegisterArgs) -> Result<()> {
    let auth = args.globals.auth_context()?;
    let registration = Registration {
        name: args.name,
        identifier: args.identifier,
        email: args.email,
        password: args.password,
    };
    let signed_in = auth.register(&registration).await;
    report(&auth, signed_in)
}

/// # Errors
/// Returns an error if the context cannot be built.
pub async fn logout(globals: &GlobalArgs) -> Result<()> {
    let auth = globals.auth_context()?;
    auth.logout().await;
    info!("signed out");
    print_json(&auth.snapshot())
}

/// # Errors
/// Returns an error when there is no session or the server does not confirm it.
pub async fn whoami(globals: &GlobalArgs) -> Result<()> {
    let auth = globals.auth_context()?;
    match auth.refresh_auth().await {
        RefreshOutcome::Refreshed => print_json(&json!({ "user": auth.snapshot().user })),
        RefreshOutcome::SoftRejected(message) => bail!(message),
        RefreshOutcome::Unavailable => bail!("the identity service could not be reached"),
        RefreshOutcome::NoSession => bail!("no stored session"),
        RefreshOutcome::Superseded => bail!("the session changed while the request was in flight"),
    }
}

/// # Errors
/// Returns an error if the context cannot be built or the revalidation task panics.
pub async fn status(globals: &GlobalArgs) -> Result<()> {
    let auth = globals.auth_context()?;
    if let Some(revalidation) = auth.initialize() {
        revalidation
            .await
            .context("background revalidation did not complete")?;
    }
    print_json(&auth.snapshot())
}
