// ── Navigation guard ──
//
// Decides whether a route transition may proceed given the store's
// authentication flag. Routes not marked `requires_auth` are always
// reachable, signed in or not.

use serde::Serialize;

use crate::model::SessionState;
use crate::stream::StateStream;

pub const HOME_ROUTE: &str = "home";
pub const LOGIN_ROUTE: &str = "login";

/// Static description of one route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteMeta {
    pub name: &'static str,
    /// Pattern with `:param` segments, e.g. `/stock/:code`.
    pub path: &'static str,
    pub requires_auth: bool,
}

/// The route a transition is heading to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTarget {
    pub name: String,
    /// Path including query string, used as the post-login redirect.
    pub full_path: String,
    pub requires_auth: bool,
}

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Navigation {
    Proceed,
    /// Send to login, coming back to `redirect` afterwards.
    RedirectToLogin { redirect: String },
    /// Already signed in; login makes no sense.
    RedirectToHome,
}

/// The client's route table.
pub const DEFAULT_ROUTES: &[RouteMeta] = &[
    RouteMeta {
        name: HOME_ROUTE,
        path: "/",
        requires_auth: false,
    },
    RouteMeta {
        name: LOGIN_ROUTE,
        path: "/login",
        requires_auth: false,
    },
    RouteMeta {
        name: "profile",
        path: "/profile",
        requires_auth: true,
    },
    RouteMeta {
        name: "search",
        path: "/search",
        requires_auth: false,
    },
    RouteMeta {
        name: "stockDetail",
        path: "/stock/:code",
        requires_auth: false,
    },
    RouteMeta {
        name: "favorites",
        path: "/favorites",
        requires_auth: true,
    },
    RouteMeta {
        name: "wechatMessage",
        path: "/wechat/:msgid",
        requires_auth: false,
    },
    RouteMeta {
        name: "updateLogs",
        path: "/update-logs",
        requires_auth: false,
    },
    RouteMeta {
        name: "tags",
        path: "/tags/:tagName",
        requires_auth: false,
    },
];

/// Pure decision given a target and the authentication flag.
pub fn decide(target: &RouteTarget, authenticated: bool) -> Navigation {
    if target.requires_auth && !authenticated {
        Navigation::RedirectToLogin {
            redirect: target.full_path.clone(),
        }
    } else if authenticated && target.name == LOGIN_ROUTE {
        Navigation::RedirectToHome
    } else {
        Navigation::Proceed
    }
}

/// Route guard bound to the store's session.
pub struct NavigationGuard {
    routes: Vec<RouteMeta>,
    session: StateStream<SessionState>,
}

impl NavigationGuard {
    pub fn new(session: StateStream<SessionState>) -> Self {
        Self::with_routes(DEFAULT_ROUTES.to_vec(), session)
    }

    pub fn with_routes(routes: Vec<RouteMeta>, session: StateStream<SessionState>) -> Self {
        Self { routes, session }
    }

    pub fn routes(&self) -> &[RouteMeta] {
        &self.routes
    }

    /// Match a concrete path (query and fragment allowed) to a route.
    pub fn resolve(&self, full_path: &str) -> Option<RouteTarget> {
        let path = full_path
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        self.routes
            .iter()
            .find(|r| path_matches(r.path, path))
            .map(|r| RouteTarget {
                name: r.name.to_owned(),
                full_path: full_path.to_owned(),
                requires_auth: r.requires_auth,
            })
    }

    /// Decide a transition against the latest session state.
    pub fn evaluate(&self, target: &RouteTarget) -> Navigation {
        decide(target, self.session.latest().is_authenticated())
    }
}

fn path_matches(pattern: &str, path: &str) -> bool {
    let segments = |p: &str| -> Vec<String> {
        p.trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    };
    let pattern = segments(pattern);
    let path = segments(path);
    pattern.len() == path.len()
        && pattern
            .iter()
            .zip(&path)
            .all(|(p, s)| p.starts_with(':') || p == s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(name: &str, full_path: &str, requires_auth: bool) -> RouteTarget {
        RouteTarget {
            name: name.into(),
            full_path: full_path.into(),
            requires_auth,
        }
    }

    #[test]
    fn protected_route_redirects_anonymous_user_with_full_path() {
        let nav = decide(&target("favorites", "/favorites?tab=2", true), false);
        assert_eq!(
            nav,
            Navigation::RedirectToLogin {
                redirect: "/favorites?tab=2".into()
            }
        );
    }

    #[test]
    fn public_routes_never_block() {
        assert_eq!(decide(&target("search", "/search", false), false), Navigation::Proceed);
        assert_eq!(decide(&target("search", "/search", false), true), Navigation::Proceed);
        assert_eq!(decide(&target("favorites", "/favorites", true), true), Navigation::Proceed);
    }

    #[test]
    fn signed_in_user_skips_login() {
        assert_eq!(decide(&target("login", "/login", false), true), Navigation::RedirectToHome);
        assert_eq!(decide(&target("login", "/login", false), false), Navigation::Proceed);
    }

    #[test]
    fn patterns_match_param_segments() {
        assert!(path_matches("/stock/:code", "/stock/600519"));
        assert!(path_matches("/", "/"));
        assert!(!path_matches("/stock/:code", "/stock"));
        assert!(!path_matches("/profile", "/favorites"));
    }
}
