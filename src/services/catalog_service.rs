use std::collections::HashSet;

use uuid::Uuid;

use crate::error::Result;
use crate::models::test::{Test, GENERAL_DEPARTMENT};
use crate::storage::test_store::TestStore;

/// Read side of the test catalog: what a given department is allowed to see.
#[derive(Clone)]
pub struct CatalogService {
    tests: TestStore,
}

impl CatalogService {
    pub fn new(tests: TestStore) -> Self {
        Self { tests }
    }

    /// The General pool is visible to everyone; department-specific tests
    /// are appended for any other department. Ids are deduplicated so a
    /// test can never appear twice in the merged list.
    pub async fn list_for_department(&self, department: &str) -> Vec<Test> {
        let mut tests = self.tests.list_by_department(GENERAL_DEPARTMENT).await;
        if department != GENERAL_DEPARTMENT {
            let mut seen: HashSet<Uuid> = tests.iter().map(|t| t.id).collect();
            for test in self.tests.list_by_department(department).await {
                if seen.insert(test.id) {
                    tests.push(test);
                }
            }
        }
        tests
    }

    pub async fn get(&self, id: Uuid) -> Result<Test> {
        self.tests.get(id).await
    }
}
