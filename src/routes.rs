//! Route table and authorization guard.
//!
//! Every navigation passes through `decide` before a view is rendered.
//! The decision is a pure function of the route's declared access policy
//! and the current session state; redirects are applied by the caller.

use crate::auth::{Session, SessionStatus};

/// Which session states may render a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Anyone.
    #[default]
    Public,
    /// Signed-in users only.
    RequiresAuth,
    /// Signed-out users only (login and register pages).
    AuthOnly,
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Render,
    RedirectLogin,
    RedirectHome,
}

/// Decide whether a route may render for the current session.
///
/// Navigation waits for the session to resolve, so `Bootstrapping` is
/// never expected here; if it leaks through anyway, gated routes redirect
/// to login rather than exposing protected content early.
pub fn decide(policy: AccessPolicy, session: &Session) -> Decision {
    let authenticated = session.status() == SessionStatus::Authenticated;
    match policy {
        AccessPolicy::Public => Decision::Render,
        AccessPolicy::RequiresAuth if authenticated => Decision::Render,
        AccessPolicy::RequiresAuth => Decision::RedirectLogin,
        AccessPolicy::AuthOnly if authenticated => Decision::RedirectHome,
        AccessPolicy::AuthOnly => Decision::Render,
    }
}

/// Application routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Game,
    Leaderboard,
    Profile,
}

impl Route {
    pub const ALL: [Route; 6] = [
        Route::Home,
        Route::Login,
        Route::Register,
        Route::Game,
        Route::Leaderboard,
        Route::Profile,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Game => "/game",
            Route::Leaderboard => "/leaderboard",
            Route::Profile => "/profile",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Login => "Login",
            Route::Register => "Register",
            Route::Game => "Play Game",
            Route::Leaderboard => "Leaderboard",
            Route::Profile => "Profile",
        }
    }

    /// Declared access policy. Routes with no declaration are public.
    pub fn policy(&self) -> AccessPolicy {
        match self {
            Route::Login | Route::Register => AccessPolicy::AuthOnly,
            Route::Profile => AccessPolicy::RequiresAuth,
            _ => AccessPolicy::default(),
        }
    }

    /// Parse a path or route name as typed on the command line.
    pub fn parse(input: &str) -> Option<Route> {
        match input.trim().trim_start_matches('/').to_lowercase().as_str() {
            "" | "home" => Some(Route::Home),
            "login" => Some(Route::Login),
            "register" => Some(Route::Register),
            "game" => Some(Route::Game),
            "leaderboard" => Some(Route::Leaderboard),
            "profile" => Some(Route::Profile),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;

    fn anonymous() -> Session {
        Session::Anonymous
    }

    fn authenticated() -> Session {
        Session::Authenticated {
            identity: Identity {
                user_id: Some(1),
                username: Some("ada".to_string()),
                email: None,
            },
            token: "tok".to_string(),
        }
    }

    #[test]
    fn test_public_always_renders() {
        assert_eq!(decide(AccessPolicy::Public, &anonymous()), Decision::Render);
        assert_eq!(
            decide(AccessPolicy::Public, &authenticated()),
            Decision::Render
        );
        assert_eq!(
            decide(AccessPolicy::Public, &Session::Bootstrapping),
            Decision::Render
        );
    }

    #[test]
    fn test_requires_auth() {
        assert_eq!(
            decide(AccessPolicy::RequiresAuth, &anonymous()),
            Decision::RedirectLogin
        );
        assert_eq!(
            decide(AccessPolicy::RequiresAuth, &authenticated()),
            Decision::Render
        );
    }

    #[test]
    fn test_auth_only() {
        assert_eq!(
            decide(AccessPolicy::AuthOnly, &authenticated()),
            Decision::RedirectHome
        );
        assert_eq!(decide(AccessPolicy::AuthOnly, &anonymous()), Decision::Render);
    }

    #[test]
    fn test_bootstrapping_never_exposes_gated_routes() {
        // Safe defaults if the guard is consulted before hydration resolves
        assert_eq!(
            decide(AccessPolicy::RequiresAuth, &Session::Bootstrapping),
            Decision::RedirectLogin
        );
        assert_eq!(
            decide(AccessPolicy::AuthOnly, &Session::Bootstrapping),
            Decision::Render
        );
    }

    #[test]
    fn test_route_policies() {
        assert_eq!(Route::Login.policy(), AccessPolicy::AuthOnly);
        assert_eq!(Route::Register.policy(), AccessPolicy::AuthOnly);
        assert_eq!(Route::Profile.policy(), AccessPolicy::RequiresAuth);
        // Undeclared routes fall back to public
        assert_eq!(Route::Home.policy(), AccessPolicy::Public);
        assert_eq!(Route::Game.policy(), AccessPolicy::Public);
        assert_eq!(Route::Leaderboard.policy(), AccessPolicy::Public);
    }

    #[test]
    fn test_parse_routes() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse("home"), Some(Route::Home));
        assert_eq!(Route::parse("/profile"), Some(Route::Profile));
        assert_eq!(Route::parse("Leaderboard"), Some(Route::Leaderboard));
        assert_eq!(Route::parse("/admin"), None);
    }
}
