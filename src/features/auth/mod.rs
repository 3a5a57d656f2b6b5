//! Auth feature module covering the session state machine, persisted session
//! records, route access policy, and route guards. It keeps authentication
//! logic out of the views and must stay aligned with the API's response shapes.
//! This module touches security boundaries and must avoid logging token
//! material.
//!
//! Flow Overview: `AuthContext::initialize` restores a persisted session and
//! revalidates it in the background. `login`/`register` persist the returned
//! token and flat user record. Guards read state snapshots only; every write to
//! the persisted session goes through `AuthContext`.

pub mod client;
pub mod guards;
pub mod policy;
pub mod session;
pub mod state;
pub mod types;
pub mod validator;

pub use guards::{
    leave_unauthorized, require_auth, DenyBehavior, GuardDecision, NavigationEnforcer, Notifier,
    Redirect, RoleGuard, TracingNotifier,
};
pub use policy::{paths, Access, RouteAccessPolicy, RoutePattern};
pub use state::{reduce, AuthAction, AuthContext, AuthState, RefreshOutcome};
pub use types::{Credentials, Registration, Role, UserRecord};
pub use validator::{default_landing_path, has_role, is_structurally_valid_user};
