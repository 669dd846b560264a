use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::test_result::TestResult;
use crate::storage::write_json_atomic;

/// One file per result: `<data>/results/<id>.json`. Results are written
/// once at submission and only ever deleted afterwards, so the in-memory
/// copy is updated strictly after the file write succeeds.
#[derive(Clone)]
pub struct ResultStore {
    dir: PathBuf,
    index: Arc<RwLock<HashMap<Uuid, TestResult>>>,
}

impl ResultStore {
    pub async fn open(data_dir: &std::path::Path) -> Result<Self> {
        let dir = data_dir.join("results");
        fs::create_dir_all(&dir).await?;

        let mut index = HashMap::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).await?;
            let result: TestResult = serde_json::from_slice(&bytes).map_err(|e| {
                Error::BadRequest(format!("Malformed result file {}: {}", path.display(), e))
            })?;
            index.insert(result.id, result);
        }

        Ok(Self {
            dir,
            index: Arc::new(RwLock::new(index)),
        })
    }

    pub async fn save(&self, result: TestResult) -> Result<Uuid> {
        let path = self.dir.join(format!("{}.json", result.id));
        write_json_atomic(&path, &result).await?;
        let id = result.id;
        self.index.write().await.insert(id, result);
        Ok(id)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Vec<TestResult> {
        let mut results: Vec<TestResult> = self
            .index
            .read()
            .await
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        results.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        results
    }

    pub async fn list_all(&self) -> Vec<TestResult> {
        let mut results: Vec<TestResult> = self.index.read().await.values().cloned().collect();
        results.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        results
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let path = self.dir.join(format!("{}.json", id));
        match fs::remove_file(&path).await {
            Ok(()) => {
                self.index.write().await.remove(&id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound("Result not found".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample_result(user_id: Uuid, offset_minutes: i64) -> TestResult {
        TestResult {
            id: Uuid::new_v4(),
            user_id,
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            department: "General".to_string(),
            test_id: Uuid::new_v4(),
            test_title: "Quiz".to_string(),
            score: 10,
            total_points: 20,
            answers: vec![],
            auto_submit_reason: None,
            submitted_at: Utc::now() - Duration::minutes(offset_minutes),
        }
    }

    #[tokio::test]
    async fn save_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path()).await.unwrap();
        let user = Uuid::new_v4();

        let older = store.save(sample_result(user, 10)).await.unwrap();
        let newer = store.save(sample_result(user, 1)).await.unwrap();
        store.save(sample_result(Uuid::new_v4(), 0)).await.unwrap();

        let mine = store.list_by_user(user).await;
        assert_eq!(mine.len(), 2);
        // Most recent first.
        assert_eq!(mine[0].id, newer);
        assert_eq!(mine[1].id, older);
        assert_eq!(store.list_all().await.len(), 3);

        store.delete(older).await.unwrap();
        assert_eq!(store.list_by_user(user).await.len(), 1);
        assert!(matches!(
            store.delete(older).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn results_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let user = Uuid::new_v4();
        {
            let store = ResultStore::open(dir.path()).await.unwrap();
            store.save(sample_result(user, 0)).await.unwrap();
        }
        let reopened = ResultStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.list_by_user(user).await.len(), 1);
    }
}
