use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String, // Server-assigned, unrelated across servers
    pub name: String, // Matching key between servers (case-sensitive)
    #[serde(default)]
    pub has_password: bool,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            has_password: false,
        }
    }

    pub fn with_password(mut self, has_password: bool) -> Self {
        self.has_password = has_password;
        self
    }
}
