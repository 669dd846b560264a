use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::models::user::User;
use crate::storage::write_json_atomic;

/// All users live in a single `<data>/users/users.json` array, rewritten
/// atomically on every signup. Email uniqueness is case-insensitive.
#[derive(Clone)]
pub struct UserStore {
    path: PathBuf,
    users: Arc<RwLock<Vec<User>>>,
}

impl UserStore {
    pub async fn open(data_dir: &std::path::Path) -> Result<Self> {
        let dir = data_dir.join("users");
        fs::create_dir_all(&dir).await?;
        let path = dir.join("users.json");

        let users = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                Error::BadRequest(format!("Malformed user file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            users: Arc::new(RwLock::new(users)),
        })
    }

    pub async fn insert(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(Error::Conflict(
                "User with this email already exists".to_string(),
            ));
        }
        let mut updated = users.clone();
        updated.push(user.clone());
        write_json_atomic(&self.path, &updated).await?;
        *users = updated;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }
}
