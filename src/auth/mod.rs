pub mod gate;
pub mod password;
pub mod token;

pub use gate::{Capability, Principal};
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenError, TokenSigner};

use crate::models::User;

/// Find the user with exactly this email and check the password.
///
/// An unknown email and a wrong password give the same `None`.
pub fn authenticate<'a>(users: &'a [User], email: &str, password: &str) -> Option<&'a User> {
    let user = users.iter().find(|user| user.email == email)?;
    verify_password(password, &user.password).then_some(user)
}
