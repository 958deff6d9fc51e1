//! Creator Model

use serde::{Deserialize, Serialize};

/// A content creator, read-only from the board's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creator {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub instagram: Option<String>,
}

impl Creator {
    /// Stand-in for a creator the applications reference but the creators
    /// collection does not contain.
    pub fn placeholder(id: i64) -> Self {
        Self {
            id,
            name: "Criador".to_string(),
            email: None,
            avatar: None,
            instagram: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_has_no_contact_fields() {
        let creator = Creator::placeholder(7);
        assert_eq!(creator.name, "Criador");
        assert!(creator.avatar.is_none());
        assert!(creator.instagram.is_none());
    }
}
