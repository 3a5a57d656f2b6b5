//! Route access policy: which paths a session may reach.
//!
//! Patterns are compiled once into segment matchers. Three forms exist:
//! exact (`/dashboard`), parameterized (`/stories/:id`), and prefix wildcard
//! (`/admin/*`). When several patterns match a path the exact one wins, then
//! the parameterized one, then the wildcard; ties go to the pattern with more
//! literal segments.

use super::types::Role;
use crate::errors::AppError;
use std::fmt;
use tracing::warn;

/// Application paths.
pub mod paths {
    pub const HOME: &str = "/";
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const USER_DASHBOARD: &str = "/dashboard";
    pub const DAILY_WORDS: &str = "/daily-words";
    pub const CHAT: &str = "/chat";
    pub const STORIES: &str = "/stories";
    pub const STORY_DETAIL: &str = "/stories/:id";
    pub const STORY_EXAM: &str = "/stories/:id/exam";
    pub const ACHIEVEMENTS: &str = "/achievements";
    pub const LEADERBOARD: &str = "/leaderboard";
    pub const PROFILE: &str = "/profile";
    pub const SETTINGS: &str = "/settings";
    pub const ADMIN_PREFIX: &str = "/admin";
    pub const ADMIN_ROUTES: &str = "/admin/*";
    pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";
    pub const TRAINER_PREFIX: &str = "/trainer";
    pub const TRAINER_ROUTES: &str = "/trainer/*";
    pub const TRAINER_DASHBOARD: &str = "/trainer/dashboard";
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled route pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoutePattern {
    Exact(String),
    Params(Vec<Segment>),
    Prefix(Vec<String>),
}

impl RoutePattern {
    /// Compiles a declared pattern.
    ///
    /// # Errors
    /// Returns `AppError::Config` for patterns that do not start with `/`, use
    /// `*` anywhere but as the final segment, or carry an unnamed parameter.
    pub fn parse(pattern: &str) -> Result<Self, AppError> {
        let trimmed = pattern.trim();
        if !trimmed.starts_with('/') {
            return Err(AppError::Config(format!(
                "route pattern must start with '/': {pattern}"
            )));
        }

        let mut raw: Vec<&str> = split_segments(trimmed).collect();
        let wildcard = raw.last() == Some(&"*");
        if wildcard {
            raw.pop();
        }
        if raw.iter().any(|segment| segment.contains('*')) {
            return Err(AppError::Config(format!(
                "wildcard is only allowed as the last segment: {pattern}"
            )));
        }

        if wildcard {
            if raw.iter().any(|segment| segment.starts_with(':')) {
                return Err(AppError::Config(format!(
                    "parameters are not supported in wildcard patterns: {pattern}"
                )));
            }
            return Ok(Self::Prefix(raw.into_iter().map(str::to_string).collect()));
        }

        if raw.iter().any(|segment| segment.starts_with(':')) {
            let mut segments = Vec::with_capacity(raw.len());
            for segment in raw {
                match segment.strip_prefix(':') {
                    Some("") => {
                        return Err(AppError::Config(format!(
                            "unnamed route parameter in: {pattern}"
                        )))
                    }
                    Some(name) => segments.push(Segment::Param(name.to_string())),
                    None => segments.push(Segment::Literal(segment.to_string())),
                }
            }
            return Ok(Self::Params(segments));
        }

        Ok(Self::Exact(join_segments(raw)))
    }

    /// Matches an already-normalized path.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == path,
            Self::Params(segments) => {
                let mut actual = split_segments(path);
                let matched = segments.iter().all(|segment| match (segment, actual.next()) {
                    (Segment::Literal(expected), Some(value)) => expected == value,
                    (Segment::Param(_), Some(value)) => !value.is_empty(),
                    (_, None) => false,
                });
                matched && actual.next().is_none()
            }
            Self::Prefix(prefix) => {
                let mut actual = split_segments(path);
                prefix
                    .iter()
                    .all(|expected| actual.next() == Some(expected.as_str()))
            }
        }
    }

    /// Precedence rank: exact > parameterized > wildcard, then literal count.
    #[must_use]
    pub fn specificity(&self) -> (u8, usize) {
        match self {
            Self::Exact(path) => (2, split_segments(path).count()),
            Self::Params(segments) => (
                1,
                segments
                    .iter()
                    .filter(|segment| matches!(segment, Segment::Literal(_)))
                    .count(),
            ),
            Self::Prefix(prefix) => (0, prefix.len()),
        }
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(path) => f.write_str(path),
            Self::Params(segments) => {
                let rendered: Vec<String> = segments
                    .iter()
                    .map(|segment| match segment {
                        Segment::Literal(value) => value.clone(),
                        Segment::Param(name) => format!(":{name}"),
                    })
                    .collect();
                write!(f, "/{}", rendered.join("/"))
            }
            Self::Prefix(prefix) if prefix.is_empty() => f.write_str("/*"),
            Self::Prefix(prefix) => write!(f, "/{}/*", prefix.join("/")),
        }
    }
}

/// Who may reach a route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Roles(Vec<Role>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    pub pattern: RoutePattern,
    pub access: Access,
}

/// Ordered, static route table.
#[derive(Clone, Debug)]
pub struct RouteAccessPolicy {
    entries: Vec<RouteEntry>,
}

impl RouteAccessPolicy {
    /// Compiles a table from `(pattern, access)` pairs.
    ///
    /// # Errors
    /// Returns `AppError::Config` if any pattern is malformed.
    pub fn new<'a>(table: impl IntoIterator<Item = (&'a str, Access)>) -> Result<Self, AppError> {
        let entries = table
            .into_iter()
            .map(|(pattern, access)| {
                RoutePattern::parse(pattern).map(|pattern| RouteEntry { pattern, access })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// Route table of the learning platform. A pattern that fails to compile
    /// is logged and left out.
    #[must_use]
    pub fn learning_platform() -> Self {
        let entries = learning_platform_table()
            .into_iter()
            .filter_map(|(pattern, access)| match RoutePattern::parse(pattern) {
                Ok(pattern) => Some(RouteEntry { pattern, access }),
                Err(err) => {
                    warn!("dropping route {pattern}: {err}");
                    None
                }
            })
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Most specific entry matching `path`, if any.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&RouteEntry> {
        let path = normalize_path(path);
        self.entries
            .iter()
            .filter(|entry| entry.pattern.matches(&path))
            .max_by_key(|entry| entry.pattern.specificity())
    }

    #[must_use]
    pub fn required_access(&self, path: &str) -> Option<&Access> {
        self.resolve(path).map(|entry| &entry.access)
    }

    /// Roles a role guard should admit for `path`. Unknown and public paths
    /// admit every role.
    #[must_use]
    pub fn allowed_roles(&self, path: &str) -> Vec<Role> {
        match self.required_access(path) {
            Some(Access::Roles(roles)) => roles.clone(),
            _ => vec![Role::Admin, Role::Trainer, Role::User],
        }
    }

    /// Direct-navigation check used by the layout.
    ///
    /// Admin and trainer subtrees require exactly that role. Every other path
    /// must match one of the authenticated general routes.
    #[must_use]
    pub fn is_path_allowed(&self, path: &str, role: Option<Role>, authenticated: bool) -> bool {
        let Some(role) = role.filter(|_| authenticated) else {
            return false;
        };

        let path = normalize_path(path);
        if has_prefix(&path, paths::ADMIN_PREFIX) {
            return role == Role::Admin;
        }
        if has_prefix(&path, paths::TRAINER_PREFIX) {
            return role == Role::Trainer;
        }

        self.entries
            .iter()
            .filter(|entry| entry.access == Access::Authenticated)
            .any(|entry| entry.pattern.matches(&path))
    }
}

/// Strips query and fragment, collapses empty segments, and drops the trailing slash.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    join_segments(split_segments(path))
}

fn has_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn join_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
    let joined = segments.into_iter().collect::<Vec<_>>().join("/");
    format!("/{joined}")
}

fn learning_platform_table() -> [(&'static str, Access); 15] {
    [
        (paths::HOME, Access::Public),
        (paths::LOGIN, Access::Public),
        (paths::REGISTER, Access::Public),
        (paths::USER_DASHBOARD, Access::Authenticated),
        (paths::DAILY_WORDS, Access::Authenticated),
        (paths::CHAT, Access::Authenticated),
        (paths::STORIES, Access::Authenticated),
        (paths::STORY_DETAIL, Access::Authenticated),
        (paths::STORY_EXAM, Access::Authenticated),
        (paths::ACHIEVEMENTS, Access::Authenticated),
        (paths::LEADERBOARD, Access::Authenticated),
        (paths::PROFILE, Access::Authenticated),
        (paths::SETTINGS, Access::Authenticated),
        (paths::ADMIN_ROUTES, Access::Roles(vec![Role::Admin])),
        (paths::TRAINER_ROUTES, Access::Roles(vec![Role::Trainer])),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn learning_platform_table_compiles_completely() {
        let table = learning_platform_table();
        let compiled = RouteAccessPolicy::new(table.clone()).unwrap();
        assert_eq!(compiled.entries().len(), table.len());
        assert_eq!(RouteAccessPolicy::learning_platform().entries(), compiled.entries());
    }

    #[test]
    fn parse_classifies_patterns() {
        assert_eq!(
            RoutePattern::parse("/dashboard/").unwrap(),
            RoutePattern::Exact("/dashboard".to_string())
        );
        assert!(matches!(
            RoutePattern::parse("/stories/:id").unwrap(),
            RoutePattern::Params(_)
        ));
        assert_eq!(
            RoutePattern::parse("/admin/*").unwrap(),
            RoutePattern::Prefix(vec!["admin".to_string()])
        );
    }

    #[test]
    fn parse_rejects_malformed_patterns() {
        assert!(RoutePattern::parse("dashboard").is_err());
        assert!(RoutePattern::parse("/admin/*/users").is_err());
        assert!(RoutePattern::parse("/stories/:").is_err());
        assert!(RoutePattern::parse("/stories/:id/*").is_err());
    }

    #[test]
    fn param_segment_matches_exactly_one_segment() {
        let pattern = RoutePattern::parse("/stories/:id").unwrap();
        assert!(pattern.matches("/stories/42"));
        assert!(!pattern.matches("/stories"));
        assert!(!pattern.matches("/stories/42/exam"));
        assert!(!pattern.matches("/story/42"));
    }

    #[test]
    fn prefix_wildcard_matches_subtree_only() {
        let pattern = RoutePattern::parse("/admin/*").unwrap();
        assert!(pattern.matches("/admin"));
        assert!(pattern.matches("/admin/users/7"));
        assert!(!pattern.matches("/administrator"));
    }

    #[test]
    fn display_round_trips_declared_form() {
        for declared in ["/dashboard", "/stories/:id/exam", "/admin/*", "/"] {
            assert_eq!(RoutePattern::parse(declared).unwrap().to_string(), declared);
        }
    }

    #[test]
    fn exact_beats_param_beats_wildcard() {
        let policy = RouteAccessPolicy::new([
            ("/stories/*", Access::Roles(vec![Role::Trainer])),
            ("/stories/:id", Access::Authenticated),
            ("/stories/new", Access::Roles(vec![Role::Admin])),
        ])
        .unwrap();

        assert_eq!(
            policy.required_access("/stories/new"),
            Some(&Access::Roles(vec![Role::Admin]))
        );
        assert_eq!(
            policy.required_access("/stories/12"),
            Some(&Access::Authenticated)
        );
        assert_eq!(
            policy.required_access("/stories/12/exam"),
            Some(&Access::Roles(vec![Role::Trainer]))
        );
        assert_eq!(policy.required_access("/chat"), None);
    }

    #[test]
    fn normalize_path_strips_query_fragment_and_slashes() {
        assert_eq!(normalize_path("/stories/4/?tab=exam#q1"), "/stories/4");
        assert_eq!(normalize_path("//chat//"), "/chat");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn is_path_allowed_requires_session_and_role() {
        let policy = RouteAccessPolicy::learning_platform();
        assert!(!policy.is_path_allowed("/dashboard", Some(Role::User), false));
        assert!(!policy.is_path_allowed("/dashboard", None, true));
        assert!(policy.is_path_allowed("/dashboard", Some(Role::User), true));
    }

    #[test]
    fn is_path_allowed_gates_subtrees_by_exact_role() {
        let policy = RouteAccessPolicy::learning_platform();
        assert!(policy.is_path_allowed("/admin/users", Some(Role::Admin), true));
        assert!(!policy.is_path_allowed("/admin/users", Some(Role::Trainer), true));
        assert!(policy.is_path_allowed("/trainer/dashboard", Some(Role::Trainer), true));
        assert!(!policy.is_path_allowed("/trainer/dashboard", Some(Role::User), true));
        assert!(!policy.is_path_allowed("/trainer/dashboard", Some(Role::Admin), true));
    }

    #[test]
    fn is_path_allowed_matches_general_patterns() {
        let policy = RouteAccessPolicy::learning_platform();
        assert!(policy.is_path_allowed("/stories/abc", Some(Role::User), true));
        assert!(policy.is_path_allowed("/stories/abc/exam?attempt=2", Some(Role::User), true));
        assert!(!policy.is_path_allowed("/stories/abc/edit", Some(Role::User), true));
        assert!(!policy.is_path_allowed("/unknown", Some(Role::Admin), true));
    }

    #[test]
    fn allowed_roles_follow_declared_access() {
        let policy = RouteAccessPolicy::learning_platform();
        assert_eq!(policy.allowed_roles("/admin/reports"), vec![Role::Admin]);
        assert_eq!(policy.allowed_roles("/chat").len(), 3);
    }
}
