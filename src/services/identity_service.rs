use uuid::Uuid;
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, SignupRequest};
use crate::error::{Error, Result};
use crate::models::user::{User, UserProfile};
use crate::storage::user_store::UserStore;

/// Signup and login. Passwords are compared as plain text; the system this
/// replaces did the same and flagged it as a placeholder, so no hashing
/// contract exists here.
#[derive(Clone)]
pub struct IdentityService {
    users: UserStore,
}

impl IdentityService {
    pub fn new(users: UserStore) -> Self {
        Self { users }
    }

    pub async fn signup(&self, payload: SignupRequest) -> Result<Uuid> {
        payload.validate()?;
        let user = User {
            id: Uuid::new_v4(),
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            department: payload.department,
        };
        let user = self.users.insert(user).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user.id)
    }

    pub async fn login(&self, payload: LoginRequest) -> Result<UserProfile> {
        let user = self
            .users
            .find_by_email(&payload.email)
            .await
            .ok_or_else(unauthorized)?;
        if user.password != payload.password {
            return Err(unauthorized());
        }
        Ok(user.into())
    }
}

// The same message for an unknown email and a wrong password, so the
// response does not reveal which one it was.
fn unauthorized() -> Error {
    Error::Unauthorized("Invalid email or password".to_string())
}
