use crate::dto::admin_dto::CreateQuestion;
use crate::error::{Error, Result};

/// Bulk question import from an uploaded CSV. The expected columns are
/// `Question, Option A, Option B, Option C, Option D, Answer, Point`; any
/// invalid row aborts the whole import with a row-indexed error so nothing
/// is written for a partially valid file.
pub struct ImportService;

impl ImportService {
    pub fn parse_questions(data: &[u8]) -> Result<Vec<CreateQuestion>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(data);

        let mut questions = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            // 1-based row numbers, counting the header row.
            let row = idx + 2;
            let record = record.map_err(|e| row_error(row, &e.to_string()))?;

            let prompt = record.get(0).unwrap_or("");
            if prompt.is_empty() {
                return Err(row_error(row, "question text is required"));
            }

            let options: Vec<String> = (1..=4)
                .filter_map(|i| record.get(i))
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
            if options.len() < 2 {
                return Err(row_error(row, "at least two options are required"));
            }

            let answer = record.get(5).unwrap_or("");
            if answer.is_empty() {
                return Err(row_error(row, "the correct answer is required"));
            }
            if !options.iter().any(|o| o == answer) {
                return Err(row_error(
                    row,
                    &format!("answer {:?} is not one of the options", answer),
                ));
            }

            let points: u32 = record
                .get(6)
                .unwrap_or("")
                .parse()
                .ok()
                .filter(|p| *p > 0)
                .ok_or_else(|| row_error(row, "the point value must be a positive integer"))?;

            questions.push(CreateQuestion {
                question: prompt.to_string(),
                options,
                correct_answer: answer.to_string(),
                points,
            });
        }

        if questions.is_empty() {
            return Err(Error::BadRequest(
                "The uploaded file contains no question rows".to_string(),
            ));
        }
        Ok(questions)
    }
}

fn row_error(row: usize, message: &str) -> Error {
    Error::BadRequest(format!("Row {}: {}", row, message))
}
