use super::Entity;
use crate::store::Collection;
use serde::{Deserialize, Serialize};

/// Admin account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    /// Matched exactly, case included
    pub email: String,
    /// Argon2 PHC string
    pub password: String,
    pub role: String,
    pub name: String,
}

impl Entity for User {
    const COLLECTION: Collection = Collection::Users;
    const NAME: &'static str = "User";
    const STAMPS_UPDATED_AT: bool = false;

    fn id(&self) -> &str {
        &self.id
    }
}

/// What the login response reveals about a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
        }
    }
}
