//! Route guards. Both are functions of the current `AuthState` snapshot plus
//! their own parameters; the only private state is the last evaluated
//! `{path, authenticated, authorized, role}` tuple, used so the "no permission"
//! warning fires once per change instead of once per render.
//!
//! UX-only: real access control must live on the API.

use super::{
    policy::{normalize_path, paths, Access, RouteAccessPolicy},
    state::{AuthContext, AuthState},
    types::{Role, UserRecord},
    validator::default_landing_path,
};
use crate::messages::Messages;
use serde::Serialize;
use std::{fmt, str::FromStr};
use tracing::warn;

/// Sink for client-visible notifications (toasts).
pub trait Notifier: Send + Sync {
    fn warn(&self, message: &str);
}

/// Emits notifications as `tracing` warnings.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn warn(&self, message: &str) {
        warn!(target: "lingodesk::notify", "{message}");
    }
}

/// Navigation target produced by a guard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: String,
    /// Path the user tried to reach, for returning there after login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl Redirect {
    fn to_login(from: &str) -> Self {
        Self {
            to: paths::LOGIN.to_string(),
            from: Some(normalize_path(from)),
        }
    }

    fn to_landing(role: Role) -> Self {
        Self {
            to: default_landing_path(Some(role)).to_string(),
            from: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Auth state is still settling; render a blocking indicator.
    Loading,
    Admit,
    Redirect(Redirect),
    /// Render the in-place "unauthorized" view.
    Unauthorized { role: Role },
}

/// Guard that only requires a session.
#[must_use]
pub fn require_auth(state: &AuthState, path: &str) -> GuardDecision {
    if state.is_loading {
        GuardDecision::Loading
    } else if !state.is_authenticated {
        GuardDecision::Redirect(Redirect::to_login(path))
    } else {
        GuardDecision::Admit
    }
}

/// What a role guard does with an authenticated but unauthorized session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DenyBehavior {
    #[default]
    ShowUnauthorized,
    RedirectToDefault,
}

impl FromStr for DenyBehavior {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "unauthorized" | "show-unauthorized" => Ok(Self::ShowUnauthorized),
            "redirect" | "redirect-to-default" => Ok(Self::RedirectToDefault),
            other => Err(format!("unknown deny behavior: {other}")),
        }
    }
}

impl fmt::Display for DenyBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShowUnauthorized => f.write_str("unauthorized"),
            Self::RedirectToDefault => f.write_str("redirect"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct WarningKey {
    path: String,
    authenticated: bool,
    authorized: bool,
    role: Option<Role>,
}

/// Fires the warning when `key` differs from the last one seen and access is denied.
fn warn_on_change(
    last_seen: &mut Option<WarningKey>,
    key: WarningKey,
    notifier: &dyn Notifier,
    message: &str,
) {
    if last_seen.as_ref() == Some(&key) {
        return;
    }
    if key.authenticated && !key.authorized {
        notifier.warn(message);
    }
    *last_seen = Some(key);
}

/// Guard requiring a session whose role is in `allowed` (or `ADMIN`).
#[derive(Debug)]
pub struct RoleGuard {
    allowed: Vec<Role>,
    on_deny: DenyBehavior,
    messages: Messages,
    last_seen: Option<WarningKey>,
}

impl RoleGuard {
    #[must_use]
    pub fn new(allowed: Vec<Role>, on_deny: DenyBehavior) -> Self {
        Self {
            allowed,
            on_deny,
            messages: Messages::default(),
            last_seen: None,
        }
    }

    #[must_use]
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    #[must_use]
    pub fn allowed(&self) -> &[Role] {
        &self.allowed
    }

    pub fn evaluate(
        &mut self,
        state: &AuthState,
        path: &str,
        notifier: &dyn Notifier,
    ) -> GuardDecision {
        if state.is_loading {
            return GuardDecision::Loading;
        }

        let normalized = normalize_path(path);
        let Some(user) = session_user(state) else {
            let key = WarningKey {
                path: normalized,
                authenticated: false,
                authorized: false,
                role: None,
            };
            warn_on_change(&mut self.last_seen, key, notifier, self.messages.no_permission());
            return GuardDecision::Redirect(Redirect::to_login(path));
        };

        let authorized = user.has_role(&self.allowed);
        let key = WarningKey {
            path: normalized,
            authenticated: true,
            authorized,
            role: Some(user.role),
        };
        warn_on_change(&mut self.last_seen, key, notifier, self.messages.no_permission());

        if authorized {
            GuardDecision::Admit
        } else {
            match self.on_deny {
                DenyBehavior::ShowUnauthorized => GuardDecision::Unauthorized { role: user.role },
                DenyBehavior::RedirectToDefault => {
                    GuardDecision::Redirect(Redirect::to_landing(user.role))
                }
            }
        }
    }
}

/// Stricter session check than `require_auth`: the flag alone is not enough,
/// the user must carry a non-empty id (the role is guaranteed by the type).
fn session_user(state: &AuthState) -> Option<&UserRecord> {
    state
        .user
        .as_ref()
        .filter(|user| state.is_authenticated && !user.id.trim().is_empty())
}

/// Layout-level check catching direct URL navigation that bypasses the
/// per-route guards. Uses the same warning and redirect as `RoleGuard`.
#[derive(Debug)]
pub struct NavigationEnforcer {
    policy: RouteAccessPolicy,
    messages: Messages,
    last_seen: Option<WarningKey>,
}

impl NavigationEnforcer {
    #[must_use]
    pub fn new(policy: RouteAccessPolicy) -> Self {
        Self {
            policy,
            messages: Messages::default(),
            last_seen: None,
        }
    }

    #[must_use]
    pub fn with_messages(mut self, messages: Messages) -> Self {
        self.messages = messages;
        self
    }

    /// Returns the redirect to apply, if any. Public routes and sessions that
    /// are loading or signed out are left to the route guards.
    pub fn check(
        &mut self,
        state: &AuthState,
        path: &str,
        notifier: &dyn Notifier,
    ) -> Option<Redirect> {
        if state.is_loading {
            return None;
        }
        let user = session_user(state)?;
        if self.policy.required_access(path) == Some(&Access::Public) {
            return None;
        }

        let allowed = self.policy.is_path_allowed(path, Some(user.role), true);
        let key = WarningKey {
            path: normalize_path(path),
            authenticated: true,
            authorized: allowed,
            role: Some(user.role),
        };
        warn_on_change(&mut self.last_seen, key, notifier, self.messages.no_permission());

        (!allowed).then(|| Redirect::to_landing(user.role))
    }
}

/// Destructive action of the unauthorized view: wipes everything persisted
/// (through the auth context, which owns the store) and routes to login.
pub fn leave_unauthorized(auth: &AuthContext) -> Redirect {
    auth.clear_session();
    Redirect {
        to: paths::LOGIN.to_string(),
        from: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn count(&self) -> usize {
            self.messages.lock().map(|messages| messages.len()).unwrap_or(0)
        }
    }

    impl Notifier for RecordingNotifier {
        fn warn(&self, message: &str) {
            if let Ok(mut messages) = self.messages.lock() {
                messages.push(message.to_string());
            }
        }
    }

    fn signed_in(id: &str, role: Role) -> AuthState {
        AuthState {
            user: Some(UserRecord::new(id, role)),
            is_authenticated: true,
            is_loading: false,
            error: None,
        }
    }

    #[test]
    fn require_auth_blocks_while_loading() {
        let state = AuthState {
            is_loading: true,
            ..AuthState::initial()
        };
        assert_eq!(require_auth(&state, "/chat"), GuardDecision::Loading);
    }

    #[test]
    fn require_auth_redirects_with_attempted_path() {
        assert_eq!(
            require_auth(&AuthState::initial(), "/stories/7?tab=exam"),
            GuardDecision::Redirect(Redirect {
                to: paths::LOGIN.to_string(),
                from: Some("/stories/7".to_string()),
            })
        );
        assert_eq!(
            require_auth(&signed_in("u1", Role::User), "/chat"),
            GuardDecision::Admit
        );
    }

    #[test]
    fn role_guard_redirects_to_landing_and_warns_once() {
        let notifier = RecordingNotifier::default();
        let mut guard = RoleGuard::new(vec![Role::Admin], DenyBehavior::RedirectToDefault);
        let state = signed_in("u2", Role::Trainer);

        let expected = GuardDecision::Redirect(Redirect {
            to: paths::TRAINER_DASHBOARD.to_string(),
            from: None,
        });
        assert_eq!(guard.evaluate(&state, "/admin/users", &notifier), expected);
        assert_eq!(guard.evaluate(&state, "/admin/users", &notifier), expected);
        assert_eq!(notifier.count(), 1);
    }

    #[test]
    fn role_guard_warns_again_when_path_changes() {
        let notifier = RecordingNotifier::default();
        let mut guard = RoleGuard::new(vec![Role::Trainer], DenyBehavior::ShowUnauthorized);
        let state = signed_in("u3", Role::User);

        assert_eq!(
            guard.evaluate(&state, "/trainer/classes", &notifier),
            GuardDecision::Unauthorized { role: Role::User }
        );
        guard.evaluate(&state, "/trainer/classes", &notifier);
        guard.evaluate(&state, "/trainer/reports", &notifier);
        assert_eq!(notifier.count(), 2);
    }

    #[test]
    fn role_guard_admits_admin_everywhere() {
        let notifier = RecordingNotifier::default();
        let mut guard = RoleGuard::new(vec![Role::Trainer], DenyBehavior::ShowUnauthorized);
        assert_eq!(
            guard.evaluate(&signed_in("a1", Role::Admin), "/trainer/classes", &notifier),
            GuardDecision::Admit
        );
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn role_guard_requires_user_id_not_just_flag() {
        let notifier = RecordingNotifier::default();
        let mut guard = RoleGuard::new(vec![Role::User], DenyBehavior::ShowUnauthorized);

        let blank_id = signed_in("  ", Role::User);
        assert!(matches!(
            guard.evaluate(&blank_id, "/dashboard", &notifier),
            GuardDecision::Redirect(Redirect { ref to, .. }) if to == paths::LOGIN
        ));

        let flag_only = AuthState {
            is_authenticated: true,
            ..AuthState::initial()
        };
        assert!(matches!(
            guard.evaluate(&flag_only, "/dashboard", &notifier),
            GuardDecision::Redirect(_)
        ));
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn role_guard_warns_again_after_signing_back_in() {
        let notifier = RecordingNotifier::default();
        let mut guard = RoleGuard::new(vec![Role::Admin], DenyBehavior::ShowUnauthorized);
        let state = signed_in("u1", Role::User);

        guard.evaluate(&state, "/admin", &notifier);
        guard.evaluate(&AuthState::initial(), "/admin", &notifier);
        guard.evaluate(&state, "/admin", &notifier);
        assert_eq!(notifier.count(), 2);
    }

    #[test]
    fn enforcer_uses_role_guard_message_and_landing() {
        let notifier = RecordingNotifier::default();
        let mut enforcer = NavigationEnforcer::new(RouteAccessPolicy::learning_platform());
        let state = signed_in("u1", Role::User);

        assert_eq!(
            enforcer.check(&state, "/admin/reports", &notifier),
            Some(Redirect {
                to: paths::USER_DASHBOARD.to_string(),
                from: None,
            })
        );
        enforcer.check(&state, "/admin/reports", &notifier);
        assert_eq!(notifier.count(), 1);
        assert_eq!(
            notifier.messages.lock().map(|m| m[0].clone()).unwrap_or_default(),
            Messages::default().no_permission()
        );

        assert_eq!(enforcer.check(&state, "/stories/9", &notifier), None);
        assert_eq!(enforcer.check(&state, paths::LOGIN, &notifier), None);
        assert_eq!(enforcer.check(&AuthState::initial(), "/admin", &notifier), None);
    }

    #[test]
    fn deny_behavior_parses_both_spellings() {
        assert_eq!("redirect".parse(), Ok(DenyBehavior::RedirectToDefault));
        assert_eq!(
            "show-unauthorized".parse(),
            Ok(DenyBehavior::ShowUnauthorized)
        );
        assert!("ignore".parse::<DenyBehavior>().is_err());
    }
}
