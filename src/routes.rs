// Route rule table shared by the gateway middleware and the component guard.

use crate::types::Role;

const ADMIN: &[Role] = &[Role::Admin];
const OWNER: &[Role] = &[Role::Owner];
const SIGNED_IN: &[Role] = Role::ALL;
const PUBLIC: &[Role] = &[];

/// A path prefix and the roles allowed to enter it (empty = public)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRule {
    pub prefix: &'static str,
    pub required_roles: &'static [Role],
}

impl RouteRule {
    const fn new(prefix: &'static str, required_roles: &'static [Role]) -> Self {
        Self { prefix, required_roles }
    }

    pub fn is_public(&self) -> bool {
        self.required_roles.is_empty()
    }

    pub fn permits(&self, role: Role) -> bool {
        self.is_public() || self.required_roles.contains(&role)
    }

    /// `/owner` matches `/owner` and `/owner/...`, never `/ownership`
    pub fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix) {
            Some("") => true,
            Some(rest) => rest.starts_with('/') && self.prefix != "/",
            None => false,
        }
    }
}

pub static ROUTE_RULES: &[RouteRule] = &[
    // Admin only
    RouteRule::new("/admin", ADMIN),
    RouteRule::new("/admin/add-car", ADMIN),
    // Owner only
    RouteRule::new("/owner", OWNER),
    RouteRule::new("/owner/ride_action", OWNER),
    RouteRule::new("/owner/blocks", OWNER),
    // Any signed-in user
    RouteRule::new("/dashboard", SIGNED_IN),
    RouteRule::new("/booking", SIGNED_IN),
    RouteRule::new("/bookings", SIGNED_IN),
    RouteRule::new("/payment", SIGNED_IN),
    RouteRule::new("/pay_due", SIGNED_IN),
    RouteRule::new("/due_payment", SIGNED_IN),
    RouteRule::new("/profile", SIGNED_IN),
    RouteRule::new("/documents", SIGNED_IN),
    RouteRule::new("/notifications", SIGNED_IN),
    RouteRule::new("/user", SIGNED_IN),
    // Public
    RouteRule::new("/", PUBLIC),
    RouteRule::new("/home", PUBLIC),
    RouteRule::new("/auth", PUBLIC),
    RouteRule::new("/splash", PUBLIC),
    RouteRule::new("/about", PUBLIC),
    RouteRule::new("/help", PUBLIC),
    RouteRule::new("/car", PUBLIC),
];

/// Find the rule governing `path` in the shared table.
///
/// The longest matching prefix wins, so table order never decides between
/// overlapping entries such as `/owner` and `/owner/blocks`.
pub fn match_rule(path: &str) -> Option<&'static RouteRule> {
    match_rule_in(ROUTE_RULES, path)
}

pub fn match_rule_in<'a>(rules: &'a [RouteRule], path: &str) -> Option<&'a RouteRule> {
    rules
        .iter()
        .filter(|rule| rule.matches(path))
        .max_by_key(|rule| rule.prefix.len())
}

/// Roles required for `path`; unmatched paths are public
pub fn required_roles(path: &str) -> &'static [Role] {
    match_rule(path).map(|rule| rule.required_roles).unwrap_or(PUBLIC)
}

/// Whether `role` may enter `path` according to the shared table
pub fn role_permitted(path: &str, role: Role) -> bool {
    match_rule(path).map_or(true, |rule| rule.permits(role))
}

/// Asset, API and framework paths are never guarded
pub fn is_bypassed(path: &str) -> bool {
    path.starts_with("/_next")
        || path.starts_with("/assets")
        || path.starts_with("/static")
        || path.starts_with("/api")
        || path.starts_with("/favicon.ico")
        || path.contains('.')
}

/// `<login_path>?redirect=<original>` with the original path form-encoded
pub fn login_redirect(login_path: &str, original: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(original.as_bytes()).collect();
    format!("{}?redirect={}", login_path, encoded)
}
