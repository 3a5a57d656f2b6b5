use super::print_json;
use crate::{
    cli::globals::GlobalArgs,
    features::auth::{
        leave_unauthorized, require_auth, DenyBehavior, GuardDecision, NavigationEnforcer,
        Redirect, Role, RoleGuard, RouteAccessPolicy, TracingNotifier,
    },
};
use anyhow::Result;
use serde::Serialize;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub path: String,
    pub roles: Vec<Role>,
    pub on_deny: DenyBehavior,
    pub reset: bool,
}

#[derive(Serialize)]
struct Report {
    path: String,
    role: Option<Role>,
    authenticated: bool,
    allowed_roles: Vec<Role>,
    require_auth: GuardDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    role_guard: Option<GuardDecision>,
    navigation: Option<Redirect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reset: Option<Redirect>,
}

/// Runs every guard against the restored session, without revalidating it.
///
/// # Errors
/// Returns an error if the context cannot be built or the output cannot be encoded.
pub async fn check(args: Args) -> Result<()> {
    let auth = args.globals.auth_context()?;
    if let Some(revalidation) = auth.initialize() {
        revalidation.abort();
    }

    let state = auth.snapshot();
    let policy = RouteAccessPolicy::learning_platform();
    let messages = auth.messages();
    let notifier = TracingNotifier;

    let role_guard = (!args.roles.is_empty()).then(|| {
        RoleGuard::new(args.roles.clone(), args.on_deny)
            .with_messages(messages)
            .evaluate(&state, &args.path, &notifier)
    });
    let navigation = NavigationEnforcer::new(policy.clone())
        .with_messages(messages)
        .check(&state, &args.path, &notifier);

    let reset = match role_guard {
        Some(GuardDecision::Unauthorized { .. }) if args.reset => Some(leave_unauthorized(&auth)),
        _ => None,
    };

    print_json(&Report {
        allowed_roles: policy.allowed_roles(&args.path),
        require_auth: require_auth(&state, &args.path),
        role: state.role(),
        authenticated: state.is_authenticated,
        path: args.path,
        role_guard,
        navigation,
        reset,
    })
}
