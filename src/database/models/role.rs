use serde::{Deserialize, Serialize};

/// Canonical capability set. Stored in the database as the display strings
/// `Admin`, `Owner` and `Normal User`.
///
/// All role vocabulary from the outside world (login role filters, the admin
/// user forms, query parameters) passes through [`Role::normalize`] - this is
/// the single place where external synonyms are mapped, so the mapping cannot
/// drift between endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Owner,
    #[serde(rename = "Normal User")]
    NormalUser,
}

impl Role {
    /// Database / display representation
    pub fn as_db_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Owner => "Owner",
            Role::NormalUser => "Normal User",
        }
    }

    /// Exact canonical names only. Registration payloads carry these; anything
    /// else falls back to `Normal User` at the call site.
    pub fn from_canonical(raw: &str) -> Option<Role> {
        match raw {
            "Admin" => Some(Role::Admin),
            "Owner" => Some(Role::Owner),
            "Normal User" => Some(Role::NormalUser),
            _ => None,
        }
    }

    /// Case-insensitive external vocabulary: `admin`, `owner`/`store_owner`,
    /// `user`/`normal user`/`customer`.
    pub fn normalize(raw: &str) -> Option<Role> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "owner" | "store_owner" => Some(Role::Owner),
            "user" | "normal user" | "customer" => Some(Role::NormalUser),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

// sqlx decodes the role column through this (see #[sqlx(try_from = "String")]
// on the model structs)
impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Role::from_canonical(&value).ok_or_else(|| format!("unknown role in database: {}", value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_external_synonyms() {
        assert_eq!(Role::normalize("admin"), Some(Role::Admin));
        assert_eq!(Role::normalize("Admin"), Some(Role::Admin));
        assert_eq!(Role::normalize("store_owner"), Some(Role::Owner));
        assert_eq!(Role::normalize("owner"), Some(Role::Owner));
        assert_eq!(Role::normalize("user"), Some(Role::NormalUser));
        assert_eq!(Role::normalize("Normal User"), Some(Role::NormalUser));
        assert_eq!(Role::normalize("customer"), Some(Role::NormalUser));
        assert_eq!(Role::normalize("superuser"), None);
        assert_eq!(Role::normalize(""), None);
    }

    #[test]
    fn canonical_names_are_exact() {
        assert_eq!(Role::from_canonical("Owner"), Some(Role::Owner));
        assert_eq!(Role::from_canonical("owner"), None);
        assert_eq!(Role::from_canonical("Normal User"), Some(Role::NormalUser));
        assert_eq!(Role::from_canonical("normal user"), None);
    }

    #[test]
    fn round_trips_through_db_string() {
        for role in [Role::Admin, Role::Owner, Role::NormalUser] {
            assert_eq!(Role::try_from(role.as_db_str().to_string()), Ok(role));
        }
    }

    #[test]
    fn serializes_as_display_string() {
        assert_eq!(serde_json::to_string(&Role::NormalUser).unwrap(), "\"Normal User\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"Admin\"");
    }
}
