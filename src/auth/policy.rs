//! Route Access Policy
//! Mission: Decide which routes are reachable without an identity

/// A path pattern in the public allow-list.
#[derive(Debug, Clone, Copy)]
pub enum RouteRule {
    /// Matches the path exactly.
    Exact(&'static str),
    /// Matches the path itself and everything below it (`/base/**`).
    Subtree(&'static str),
}

impl RouteRule {
    pub fn matches(&self, path: &str) -> bool {
        match *self {
            RouteRule::Exact(p) => path == p,
            RouteRule::Subtree(base) => match path.strip_prefix(base) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }
}

/// Registration, login, API documentation and the health probe.
pub const PUBLIC_ROUTES: &[RouteRule] = &[
    RouteRule::Exact("/api/users/register"),
    RouteRule::Exact("/api/users/login"),
    RouteRule::Subtree("/v3/api-docs"),
    RouteRule::Subtree("/swagger-ui"),
    RouteRule::Exact("/swagger-ui.html"),
    RouteRule::Exact("/health"),
];

pub fn is_public_route(path: &str) -> bool {
    PUBLIC_ROUTES.iter().any(|rule| rule.matches(path))
}
