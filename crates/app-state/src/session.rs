//! Session identity
//!
//! A session holds at most one [`User`] at a time. Users are constructed
//! fresh on every sign-in; there is no merge with a previous record.

use serde::{Deserialize, Serialize};

/// Display name assigned to credential sign-ins until a profile exists
const DEFAULT_DISPLAY_NAME: &str = "User";

/// Fixed identity used for guest sessions
const GUEST_ID: &str = "guest";

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user id
    pub id: String,

    /// Name shown in the profile header
    pub display_name: String,

    /// Contact phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Contact email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Whether this is a guest session
    #[serde(default)]
    pub is_guest: bool,
}

impl User {
    /// Create a user record for a credential sign-in
    pub fn new(id: impl Into<String>, phone: Option<String>, email: Option<String>) -> Self {
        Self {
            id: id.into(),
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            phone,
            email,
            is_guest: false,
        }
    }

    /// Create the fixed guest identity
    ///
    /// Guest sessions never contact an external provider.
    pub fn guest() -> Self {
        Self {
            id: GUEST_ID.to_string(),
            display_name: "Guest".to_string(),
            phone: None,
            email: None,
            is_guest: true,
        }
    }
}
