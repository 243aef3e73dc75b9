use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Support,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Support => "support",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(UserRole::Student),
            "support" => Ok(UserRole::Support),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Stored profile, keyed by the identity-service uid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

/// The caller of an operation, with the role resolved at authentication time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub user_id: String,
    pub role: UserRole,
}

impl Requester {
    pub fn student(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: UserRole::Student,
        }
    }

    pub fn support(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: UserRole::Support,
        }
    }

    pub fn is_student(&self) -> bool {
        self.role == UserRole::Student
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "idToken", default)]
    pub id_token: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "idToken", default)]
    pub id_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub data: AuthResponseData,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponseData {
    pub user: UserProfile,
}

impl AuthResponse {
    pub fn for_user(user: UserProfile) -> Self {
        Self {
            success: true,
            data: AuthResponseData { user },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_is_case_insensitive() {
        assert_eq!("Student".parse::<UserRole>(), Ok(UserRole::Student));
        assert_eq!(" support ".parse::<UserRole>(), Ok(UserRole::Support));
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_register_request_reads_camel_case_token() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"idToken":"tok","role":"student","name":"Ana","email":"ana@example.com"}"#,
        )
        .unwrap();
        assert_eq!(req.id_token, "tok");
        assert_eq!(req.role, "student");
    }
}
