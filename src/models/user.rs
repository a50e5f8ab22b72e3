use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A user account as returned by the server.
///
/// `total_points` and `games_played` are lifetime counters maintained by
/// the backend; the client only displays them.
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub total_points: i64,
    #[serde(default)]
    pub games_played: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Average score per game, rounded down. Zero when no games played.
    pub fn average_score(&self) -> i64 {
        if self.games_played > 0 {
            self.total_points / self.games_played
        } else {
            0
        }
    }
}

/// Response of the login and register endpoints: the account plus a fresh
/// bearer token for it.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub user: UserProfile,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_response() {
        let json = r#"{"user":{"id":7,"username":"ada","email":"ada@example.com","total_points":120,"games_played":4,"created_at":"2024-03-01T12:00:00Z"},"token":"eyJhbGciOi.test.token"}"#;

        let auth: AuthSession = serde_json::from_str(json).expect("Failed to parse auth response");
        assert_eq!(auth.user.id, 7);
        assert_eq!(auth.user.username, "ada");
        assert_eq!(auth.token, "eyJhbGciOi.test.token");
        assert_eq!(auth.user.average_score(), 30);
    }

    #[test]
    fn test_average_score_no_games() {
        let json = r#"{"id":1,"username":"new","email":null,"total_points":0,"games_played":0}"#;
        let user: UserProfile = serde_json::from_str(json).expect("Failed to parse user");
        assert_eq!(user.average_score(), 0);
    }
}
