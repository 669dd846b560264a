use std::collections::HashMap;

use uuid::Uuid;
use validator::Validate;

use crate::dto::admin_dto::{CreateQuestion, CreateTestPayload};
use crate::error::{Error, Result};
use crate::models::question::Question;
use crate::models::test::Test;
use crate::storage::test_store::TestStore;

/// Admin-side authoring: create and delete whole tests. Tests are never
/// edited in place.
#[derive(Clone)]
pub struct TestService {
    tests: TestStore,
    departments: Vec<String>,
}

impl TestService {
    pub fn new(tests: TestStore, departments: Vec<String>) -> Self {
        Self { tests, departments }
    }

    pub async fn create_test(&self, payload: CreateTestPayload) -> Result<Test> {
        payload.validate()?;

        if !self.departments.iter().any(|d| d == &payload.department) {
            return Err(Error::BadRequest(format!(
                "Unknown department: {}",
                payload.department
            )));
        }

        let questions = payload
            .questions
            .iter()
            .map(|q| build_question(q))
            .collect::<Result<Vec<Question>>>()?;

        let description = payload
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("A new test for {}.", payload.department));

        let test = Test {
            id: Uuid::new_v4(),
            title: payload.title,
            description,
            questions,
            time_limit: payload.time_limit,
            department: payload.department,
        };

        let test = self.tests.create(test).await?;
        tracing::info!(test_id = %test.id, department = %test.department, "test created");
        Ok(test)
    }

    pub async fn delete_test(&self, test_id: Uuid) -> Result<()> {
        self.tests.delete(test_id).await?;
        tracing::info!(test_id = %test_id, "test deleted");
        Ok(())
    }

    pub async fn list_grouped(&self) -> HashMap<String, Vec<Test>> {
        self.tests.list_all().await
    }
}

fn build_question(payload: &CreateQuestion) -> Result<Question> {
    payload.validate()?;
    if !payload.options.iter().any(|o| o == &payload.correct_answer) {
        return Err(Error::BadRequest(format!(
            "Correct answer {:?} is not one of the options",
            payload.correct_answer
        )));
    }
    Ok(Question {
        id: Uuid::new_v4(),
        question: payload.question.clone(),
        options: payload.options.clone(),
        correct_answer: payload.correct_answer.clone(),
        points: payload.points,
    })
}
