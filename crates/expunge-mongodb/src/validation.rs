//! Input validation for connection targets
//!
//! Database and collection names come straight from the environment, so they
//! are checked locally before the driver ever sees them.
//!
//! # Rules
//! - Database names: not empty, at most 63 bytes, none of `/\. "$` or NUL
//! - Collection names: not empty, at most 120 bytes, no NUL, no `$`,
//!   no `system.` prefix
//! - Ports: decimal integer in `1..=65535`

use expunge_common::{ExpungeError, Result};
use tracing::warn;

const MAX_DATABASE_NAME_LENGTH: usize = 63;

/// Leaves room for the database prefix in the full namespace
const MAX_COLLECTION_NAME_LENGTH: usize = 120;

/// Prefix of server-managed collections
const SYSTEM_PREFIX: &str = "system.";

/// Characters MongoDB refuses in database names
const FORBIDDEN_DATABASE_CHARS: &[char] = &['/', '\\', '.', ' ', '"', '$', '\0'];

/// Validated database name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDatabaseName {
    name: String,
}

impl ValidatedDatabaseName {
    /// Creates a new validated database name
    ///
    /// # Errors
    /// Returns `ExpungeError::Config` if the name is empty, too long, or
    /// contains a character MongoDB forbids in database names.
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(ExpungeError::Config(
                "Database name cannot be empty".to_string(),
            ));
        }

        if name.len() > MAX_DATABASE_NAME_LENGTH {
            return Err(ExpungeError::Config(format!(
                "Database name exceeds maximum length of {} bytes: '{}'",
                MAX_DATABASE_NAME_LENGTH, name
            )));
        }

        if let Some(c) = name.chars().find(|c| FORBIDDEN_DATABASE_CHARS.contains(c)) {
            return Err(ExpungeError::Config(format!(
                "Database name cannot contain {:?}: '{}'",
                c,
                name.escape_default()
            )));
        }

        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Returns the validated database name as a string slice
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl AsRef<str> for ValidatedDatabaseName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ValidatedDatabaseName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Collection name that is safe to delete from
///
/// Refuses server-managed `system.*` collections and `$` names so a bad
/// `MONGO_COLLECTION` can never aim a delete at an internal namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCollectionName {
    name: String,
}

impl ValidatedCollectionName {
    pub fn new(name: &str) -> Result<Self> {
        let problem = if name.is_empty() {
            Some("must not be empty".to_string())
        } else if name.len() > MAX_COLLECTION_NAME_LENGTH {
            Some(format!("is longer than {} bytes", MAX_COLLECTION_NAME_LENGTH))
        } else if name.contains('\0') {
            Some("contains a NUL byte".to_string())
        } else if name.starts_with(SYSTEM_PREFIX) {
            Some("names a system collection".to_string())
        } else if name.contains('$') {
            Some("contains '$'".to_string())
        } else {
            None
        };

        if let Some(problem) = problem {
            return Err(ExpungeError::Config(format!(
                "collection '{}' {}",
                name.escape_default(),
                problem
            )));
        }

        if name.contains("..") || name.contains("//") {
            warn!(collection = name, "Collection name looks mistyped");
        }

        Ok(Self {
            name: name.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl AsRef<str> for ValidatedCollectionName {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for ValidatedCollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Parses a port string into a non-zero TCP port
pub fn validate_port(port: &str) -> Result<u16> {
    match port.parse::<u16>() {
        Ok(0) | Err(_) => Err(ExpungeError::Config(format!(
            "Port must be an integer between 1 and 65535: '{}'",
            port
        ))),
        Ok(p) => Ok(p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_database_names() {
        for name in ["db", "my_app", "inventory-2024", "A1"] {
            assert!(ValidatedDatabaseName::new(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_empty_database_name() {
        let err = ValidatedDatabaseName::new("").unwrap_err();
        assert!(matches!(err, ExpungeError::Config(_)));
    }

    #[test]
    fn test_database_name_too_long() {
        let name = "d".repeat(64);
        assert!(ValidatedDatabaseName::new(&name).is_err());
        assert!(ValidatedDatabaseName::new(&"d".repeat(63)).is_ok());
    }

    #[test]
    fn test_database_name_forbidden_chars() {
        for name in ["my.db", "my db", "a/b", "a\\b", "a$b", "a\"b", "a\0b"] {
            let err = ValidatedDatabaseName::new(name).unwrap_err();
            assert!(err.to_string().contains("Database name cannot contain"));
        }
    }

    #[test]
    fn test_valid_collection_names() {
        for name in ["coll", "users", "orders.archive", "events_2024"] {
            let validated = ValidatedCollectionName::new(name).unwrap();
            assert_eq!(validated.as_str(), name);
        }
    }

    #[test]
    fn test_empty_collection_name() {
        let err = ValidatedCollectionName::new("").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_collection_name_too_long() {
        let name = "a".repeat(121);
        assert!(ValidatedCollectionName::new(&name).is_err());
        assert!(ValidatedCollectionName::new(&"a".repeat(120)).is_ok());
    }

    #[test]
    fn test_collection_name_with_null_byte() {
        assert!(ValidatedCollectionName::new("co\0ll").is_err());
    }

    #[test]
    fn test_system_collection_blocked() {
        let err = ValidatedCollectionName::new("system.users").unwrap_err();
        assert_eq!(
            err,
            ExpungeError::Config("collection 'system.users' names a system collection".to_string())
        );
    }

    #[test]
    fn test_collection_name_with_dollar_sign() {
        assert!(ValidatedCollectionName::new("coll$cmd").is_err());
    }

    #[test]
    fn test_suspicious_collection_name_allowed() {
        assert!(ValidatedCollectionName::new("a..b").is_ok());
    }

    #[test]
    fn test_validated_names_display() {
        let db = ValidatedDatabaseName::new("db").unwrap();
        let coll = ValidatedCollectionName::new("coll").unwrap();
        assert_eq!(format!("{}.{}", db, coll), "db.coll");
    }

    #[test]
    fn test_validate_port() {
        assert_eq!(validate_port("27017").unwrap(), 27017);
        assert_eq!(validate_port("1").unwrap(), 1);
        assert!(validate_port("0").is_err());
        assert!(validate_port("65536").is_err());
        assert!(validate_port("mongo").is_err());
        assert!(validate_port("").is_err());
        assert!(validate_port(" 27017").is_err());
    }
}
