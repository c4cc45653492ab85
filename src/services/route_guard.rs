use serde::Serialize;

use crate::models::{Role, User};

const CUSTOMER_PAGES: &[&str] = &[
    "",
    "services",
    "categories",
    "category/:id",
    "service/:id",
    "booking/schedule",
    "booking/address",
    "booking/summary",
    "booking/confirmation",
    "booking/:id",
    "bookings",
    "profile",
    "profile/edit",
    "addresses",
    "wallet",
    "reviews",
    "support",
];

const PARTNER_PAGES: &[&str] = &["", "jobs", "earnings", "profile"];

const ADMIN_PAGES: &[&str] = &["", "bookings", "users", "settings"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    /// A page inside a role's area.
    Area(Role),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum RouteDecision {
    Allow,
    RedirectToLogin,
    RedirectToHome { location: String },
    NotFound,
}

impl RouteDecision {
    /// Where the client should end up, if it has to move.
    pub fn location(&self) -> Option<&str> {
        match self {
            RouteDecision::Allow | RouteDecision::NotFound => None,
            RouteDecision::RedirectToLogin => Some("/"),
            RouteDecision::RedirectToHome { location } => Some(location),
        }
    }
}

pub fn normalize(path: &str) -> &str {
    let path = path.split(|c| c == '?' || c == '#').next().unwrap_or("");
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

pub fn parse(path: &str) -> Route {
    let path = normalize(path);
    if path == "/" {
        return Route::Landing;
    }

    let Some(rest) = path.strip_prefix('/') else {
        return Route::NotFound;
    };
    let (area, page) = rest.split_once('/').unwrap_or((rest, ""));
    let role = match area {
        "customer" => Role::Customer,
        "partner" => Role::Partner,
        "admin" => Role::Admin,
        _ => return Route::NotFound,
    };

    if pages_for(role).iter().any(|pattern| matches(pattern, page)) {
        Route::Area(role)
    } else {
        Route::NotFound
    }
}

fn pages_for(role: Role) -> &'static [&'static str] {
    match role {
        Role::Customer => CUSTOMER_PAGES,
        Role::Partner => PARTNER_PAGES,
        Role::Admin => ADMIN_PAGES,
    }
}

fn matches(pattern: &str, page: &str) -> bool {
    if pattern.is_empty() || page.is_empty() {
        return pattern.is_empty() && page.is_empty();
    }
    let expected: Vec<&str> = pattern.split('/').collect();
    let actual: Vec<&str> = page.split('/').collect();
    expected.len() == actual.len()
        && expected.iter().zip(&actual).all(|(e, a)| {
            if e.starts_with(':') {
                !a.is_empty()
            } else {
                e == a
            }
        })
}

/// Decides whether `user` may open `path`.
pub fn guard(user: Option<&User>, path: &str) -> RouteDecision {
    match (parse(path), user) {
        (Route::NotFound, _) => RouteDecision::NotFound,
        (Route::Landing, None) => RouteDecision::Allow,
        (Route::Landing, Some(user)) => RouteDecision::RedirectToHome {
            location: user.role.home_path().to_string(),
        },
        (Route::Area(_), None) => RouteDecision::RedirectToLogin,
        (Route::Area(required), Some(user)) if required == user.role => RouteDecision::Allow,
        (Route::Area(_), Some(user)) => RouteDecision::RedirectToHome {
            location: user.role.home_path().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user(role: Role) -> User {
        User {
            id: "u".to_string(),
            phone: Some("9876543210".to_string()),
            email: None,
            name: "Test".to_string(),
            role,
            is_verified: true,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_anonymous_redirected_to_login() {
        assert_eq!(guard(None, "/customer/bookings"), RouteDecision::RedirectToLogin);
        assert_eq!(guard(None, "/customer/bookings").location(), Some("/"));
    }

    #[test]
    fn test_wrong_role_redirected_home() {
        let partner = user(Role::Partner);
        assert_eq!(
            guard(Some(&partner), "/admin"),
            RouteDecision::RedirectToHome {
                location: "/partner".to_string()
            }
        );
        assert_eq!(guard(Some(&partner), "/partner/jobs"), RouteDecision::Allow);
    }

    #[test]
    fn test_landing_sends_signed_in_user_home() {
        assert_eq!(guard(None, "/"), RouteDecision::Allow);
        let admin = user(Role::Admin);
        assert_eq!(guard(Some(&admin), "/").location(), Some("/admin"));
    }

    #[test]
    fn test_unmatched_paths_not_found() {
        let customer = user(Role::Customer);
        assert_eq!(guard(Some(&customer), "/nowhere"), RouteDecision::NotFound);
        assert_eq!(guard(Some(&customer), "/customer/unknown"), RouteDecision::NotFound);
        assert_eq!(guard(None, "/partner/jobs/extra"), RouteDecision::NotFound);
        assert_eq!(guard(None, "/customerx"), RouteDecision::NotFound);
    }

    #[test]
    fn test_parameterised_pages() {
        assert_eq!(parse("/customer/service/svc-1"), Route::Area(Role::Customer));
        assert_eq!(parse("/customer/booking/BK1001/"), Route::Area(Role::Customer));
        assert_eq!(parse("/customer/service/"), Route::NotFound);
        assert_eq!(parse("/admin/users?page=2"), Route::Area(Role::Admin));
    }

    #[test]
    fn test_paths_without_leading_slash_not_found() {
        let customer = user(Role::Customer);
        assert_eq!(parse("é"), Route::NotFound);
        assert_eq!(parse("éé/customer"), Route::NotFound);
        assert_eq!(parse("customer"), Route::NotFound);
        assert_eq!(guard(Some(&customer), "é"), RouteDecision::NotFound);
        assert_eq!(guard(None, "customer/bookings"), RouteDecision::NotFound);
    }
}
