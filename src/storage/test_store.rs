use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::test::Test;
use crate::storage::write_json_atomic;

#[derive(Default)]
struct TestIndex {
    by_department: HashMap<String, Vec<Test>>,
    by_id: HashMap<Uuid, String>,
}

/// Department-scoped test files: `<data>/tests/<department>.json`, each
/// holding a JSON array of tests. The whole catalog is kept in memory and
/// written through on every mutation, so lookups never scan the disk.
#[derive(Clone)]
pub struct TestStore {
    dir: PathBuf,
    index: Arc<RwLock<TestIndex>>,
}

impl TestStore {
    pub async fn open(data_dir: &std::path::Path) -> Result<Self> {
        let dir = data_dir.join("tests");
        fs::create_dir_all(&dir).await?;

        let mut index = TestIndex::default();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(department) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let bytes = fs::read(&path).await?;
            let tests: Vec<Test> = serde_json::from_slice(&bytes).map_err(|e| {
                Error::BadRequest(format!("Malformed test file {}: {}", path.display(), e))
            })?;
            for test in &tests {
                index.by_id.insert(test.id, department.to_string());
            }
            index.by_department.insert(department.to_string(), tests);
        }

        Ok(Self {
            dir,
            index: Arc::new(RwLock::new(index)),
        })
    }

    fn department_path(&self, department: &str) -> PathBuf {
        self.dir.join(format!("{}.json", department))
    }

    pub async fn create(&self, test: Test) -> Result<Test> {
        check_department_name(&test.department)?;

        let mut index = self.index.write().await;
        let mut tests = index
            .by_department
            .get(&test.department)
            .cloned()
            .unwrap_or_default();
        tests.push(test.clone());
        write_json_atomic(&self.department_path(&test.department), &tests).await?;
        index.by_id.insert(test.id, test.department.clone());
        index.by_department.insert(test.department.clone(), tests);
        Ok(test)
    }

    pub async fn get(&self, id: Uuid) -> Result<Test> {
        let index = self.index.read().await;
        index
            .by_id
            .get(&id)
            .and_then(|dept| index.by_department.get(dept))
            .and_then(|tests| tests.iter().find(|t| t.id == id))
            .cloned()
            .ok_or_else(|| Error::NotFound("Test not found".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let mut index = self.index.write().await;
        let Some(department) = index.by_id.get(&id).cloned() else {
            return Err(Error::NotFound("Test not found".to_string()));
        };
        let remaining: Vec<Test> = index
            .by_department
            .get(&department)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|t| t.id != id)
            .collect();
        write_json_atomic(&self.department_path(&department), &remaining).await?;
        index.by_id.remove(&id);
        index.by_department.insert(department, remaining);
        Ok(())
    }

    /// Tests scoped to one department; unknown departments are empty, not
    /// an error, matching the catalog contract.
    pub async fn list_by_department(&self, department: &str) -> Vec<Test> {
        let index = self.index.read().await;
        index
            .by_department
            .get(department)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn list_all(&self) -> HashMap<String, Vec<Test>> {
        self.index.read().await.by_department.clone()
    }
}

fn check_department_name(department: &str) -> Result<()> {
    if department.is_empty()
        || department.contains("..")
        || department.contains('/')
        || department.contains('\\')
    {
        return Err(Error::BadRequest("Invalid department name".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Question;

    fn sample_test(department: &str) -> Test {
        Test {
            id: Uuid::new_v4(),
            title: "General Knowledge Quiz".to_string(),
            description: "A quiz".to_string(),
            questions: vec![Question {
                id: Uuid::new_v4(),
                question: "What is the capital of France?".to_string(),
                options: vec!["Berlin".into(), "Madrid".into(), "Paris".into(), "Rome".into()],
                correct_answer: "Paris".to_string(),
                points: 10,
            }],
            time_limit: 10,
            department: department.to_string(),
        }
    }

    #[tokio::test]
    async fn create_get_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::open(dir.path()).await.unwrap();

        let test = store.create(sample_test("General")).await.unwrap();
        let fetched = store.get(test.id).await.unwrap();
        assert_eq!(fetched.title, "General Knowledge Quiz");

        store.delete(test.id).await.unwrap();
        assert!(matches!(store.get(test.id).await, Err(Error::NotFound(_))));
        assert!(matches!(store.delete(test.id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn index_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let id = {
            let store = TestStore::open(dir.path()).await.unwrap();
            store.create(sample_test("Sales")).await.unwrap().id
        };

        let reopened = TestStore::open(dir.path()).await.unwrap();
        let fetched = reopened.get(id).await.unwrap();
        assert_eq!(fetched.department, "Sales");
        assert_eq!(reopened.list_by_department("Sales").await.len(), 1);
        assert!(reopened.list_by_department("Marketing").await.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let tests_dir = dir.path().join("tests");
        std::fs::create_dir_all(&tests_dir).unwrap();
        std::fs::write(tests_dir.join("General.json"), b"{not json").unwrap();

        assert!(matches!(
            TestStore::open(dir.path()).await,
            Err(Error::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn department_names_cannot_escape_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = TestStore::open(dir.path()).await.unwrap();
        let result = store.create(sample_test("../escape")).await;
        assert!(matches!(result, Err(Error::BadRequest(_))));
    }
}
