use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::answer::{Answer, NOT_ANSWERED};
use crate::models::question::Question;
use crate::models::test::Test;
use crate::models::test_result::TestResult;
use crate::storage::result_store::ResultStore;

pub const REASON_TIME_UP: &str = "Time ran out";
pub const REASON_TAB_HIDDEN: &str = "Switched to another tab or window";
pub const REASON_FOCUS_LOST: &str = "Left the test window";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    NotStarted,
    InProgress,
    Submitting,
    Submitted,
}

/// Integrity events reported by the page hosting the attempt, mirroring its
/// `visibilitychange` and `blur`/`focus` listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnvironmentEvent {
    Hidden,
    FocusLost,
    FocusRegained,
}

/// Identity snapshot taken when the attempt is created, denormalized onto
/// the result so later profile edits never change a stored score.
#[derive(Debug, Clone)]
pub struct Examinee {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub department: String,
}

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub result_id: Uuid,
    pub score: u32,
    pub total_points: u32,
    pub auto_submit_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub session_id: Uuid,
    pub phase: SessionPhase,
    pub time_remaining: u32,
    pub current_question: usize,
    pub question_count: usize,
    pub questions_answered: usize,
    pub fullscreen_warning: bool,
    pub auto_submit_reason: Option<String>,
    pub outcome: Option<SubmitOutcome>,
}

/// One timed attempt at a test, from an unstarted state through submission.
///
/// The machine itself is synchronous; the surrounding [`SessionService`]
/// serializes access through a per-session mutex and performs the single
/// asynchronous step (persisting the result) between `begin_submit` and
/// `finish_submit`.
pub struct TestSession {
    id: Uuid,
    test: Test,
    examinee: Examinee,
    phase: SessionPhase,
    current_question: usize,
    answers: HashMap<Uuid, String>,
    time_left: u32,
    pending_blur: Option<Instant>,
    focus_debounce: Duration,
    auto_submit_reason: Option<String>,
    fullscreen_warning: bool,
    outcome: Option<SubmitOutcome>,
}

impl TestSession {
    pub fn new(test: Test, examinee: Examinee, focus_debounce: Duration) -> Self {
        let time_left = test.time_limit * 60;
        Self {
            id: Uuid::new_v4(),
            test,
            examinee,
            phase: SessionPhase::NotStarted,
            current_question: 0,
            answers: HashMap::new(),
            time_left,
            pending_blur: None,
            focus_debounce,
            auto_submit_reason: None,
            fullscreen_warning: false,
            outcome: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn test(&self) -> &Test {
        &self.test
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// A denied fullscreen request is non-fatal: the attempt starts anyway
    /// and the warning is carried on every status payload.
    pub fn start(&mut self, fullscreen_acquired: bool) -> Result<()> {
        if self.phase != SessionPhase::NotStarted {
            return Err(Error::BadRequest(
                "Test has already been started".to_string(),
            ));
        }
        self.fullscreen_warning = !fullscreen_acquired;
        if self.fullscreen_warning {
            tracing::warn!(session_id = %self.id, "fullscreen denied, starting attempt anyway");
        }
        self.phase = SessionPhase::InProgress;
        Ok(())
    }

    pub fn select_answer(&mut self, question_id: Uuid, option: String) -> Result<()> {
        if self.phase != SessionPhase::InProgress {
            return Err(Error::BadRequest(
                "Answers can only be recorded while the test is in progress".to_string(),
            ));
        }
        if self.test.questions.is_empty() {
            return Err(Error::BadRequest(
                "This test has no questions to answer".to_string(),
            ));
        }
        self.answers.insert(question_id, option);
        Ok(())
    }

    /// Moves the cursor by one in either direction, clamped to the question
    /// range. Clamped moves are no-ops, not errors.
    pub fn navigate(&mut self, direction: i32) -> Result<usize> {
        if self.phase == SessionPhase::Submitting {
            return Err(Error::BadRequest(
                "Navigation is disabled while the submission is in flight".to_string(),
            ));
        }
        if self.phase != SessionPhase::InProgress {
            return Err(Error::BadRequest(
                "Navigation is only available while the test is in progress".to_string(),
            ));
        }
        if direction != 1 && direction != -1 {
            return Err(Error::BadRequest(
                "Navigation direction must be 1 or -1".to_string(),
            ));
        }
        let last = self.test.questions.len().saturating_sub(1) as i64;
        let target = self.current_question as i64 + direction as i64;
        self.current_question = target.clamp(0, last) as usize;
        Ok(self.current_question)
    }

    /// Feeds one environment-integrity event into the machine. Returns the
    /// auto-submit reason when the event ends the attempt.
    pub fn environment_event(
        &mut self,
        event: EnvironmentEvent,
        now: Instant,
    ) -> Option<&'static str> {
        if self.phase != SessionPhase::InProgress {
            return None;
        }
        match event {
            EnvironmentEvent::Hidden => Some(REASON_TAB_HIDDEN),
            EnvironmentEvent::FocusLost => {
                // Debounced so transient focus flickers (native dialogs,
                // fullscreen prompts) don't end the attempt.
                self.pending_blur.get_or_insert(now);
                None
            }
            EnvironmentEvent::FocusRegained => match self.pending_blur.take() {
                Some(armed) if now.duration_since(armed) >= self.focus_debounce => {
                    Some(REASON_FOCUS_LOST)
                }
                _ => None,
            },
        }
    }

    /// One countdown step. Called once per second while the attempt is in
    /// progress; returns the auto-submit reason when the attempt must end.
    pub fn tick(&mut self, now: Instant) -> Option<&'static str> {
        if self.phase != SessionPhase::InProgress {
            return None;
        }
        if let Some(armed) = self.pending_blur {
            if now.duration_since(armed) >= self.focus_debounce {
                self.pending_blur = None;
                return Some(REASON_FOCUS_LOST);
            }
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            return Some(REASON_TIME_UP);
        }
        None
    }

    /// First half of `submit()`: scores the attempt and moves to
    /// `Submitting`. Returns `Ok(None)` when a submission is already in
    /// flight or done, which makes the operation idempotent.
    pub fn begin_submit(&mut self, reason: Option<String>) -> Result<Option<TestResult>> {
        match self.phase {
            SessionPhase::NotStarted => Err(Error::BadRequest(
                "Test has not been started".to_string(),
            )),
            SessionPhase::Submitting | SessionPhase::Submitted => Ok(None),
            SessionPhase::InProgress => {
                if reason.is_some() {
                    self.auto_submit_reason = reason;
                }
                self.phase = SessionPhase::Submitting;
                Ok(Some(self.build_result()))
            }
        }
    }

    /// Second half of `submit()`: a persisted outcome seals the attempt; a
    /// failed write reopens it so the user can retry.
    pub fn finish_submit(&mut self, outcome: Option<SubmitOutcome>) {
        match outcome {
            Some(outcome) => {
                self.outcome = Some(outcome);
                self.phase = SessionPhase::Submitted;
            }
            None => {
                self.phase = SessionPhase::InProgress;
            }
        }
    }

    pub fn outcome(&self) -> Option<&SubmitOutcome> {
        self.outcome.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id,
            phase: self.phase,
            time_remaining: self.time_left,
            current_question: self.current_question,
            question_count: self.test.questions.len(),
            questions_answered: self.answers.len(),
            fullscreen_warning: self.fullscreen_warning,
            auto_submit_reason: self.auto_submit_reason.clone(),
            outcome: self.outcome.clone(),
        }
    }

    fn build_result(&self) -> TestResult {
        let mut score = 0;
        let mut answers = Vec::with_capacity(self.test.questions.len());
        for question in &self.test.questions {
            match self.answers.get(&question.id) {
                Some(selected) => {
                    if *selected == question.correct_answer {
                        score += question.points;
                    }
                    answers.push(Answer {
                        question_id: question.id,
                        selected_option: selected.clone(),
                    });
                }
                None => answers.push(Answer {
                    question_id: question.id,
                    selected_option: NOT_ANSWERED.to_string(),
                }),
            }
        }

        TestResult {
            id: Uuid::new_v4(),
            user_id: self.examinee.user_id,
            first_name: self.examinee.first_name.clone(),
            last_name: self.examinee.last_name.clone(),
            department: self.examinee.department.clone(),
            test_id: self.test.id,
            test_title: self.test.title.clone(),
            score,
            total_points: self.test.total_points(),
            answers,
            auto_submit_reason: self.auto_submit_reason.clone(),
            submitted_at: Utc::now(),
        }
    }
}

/// Owns all live attempts. Each session sits behind its own mutex, so the
/// countdown ticker and the HTTP handlers race through a single serialized
/// transition and a double-fired submit collapses into a no-op.
#[derive(Clone)]
pub struct SessionService {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<TestSession>>>>>,
    results: ResultStore,
    focus_debounce: Duration,
}

impl SessionService {
    pub fn new(results: ResultStore, focus_debounce: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            results,
            focus_debounce,
        }
    }

    pub async fn create(&self, test: Test, examinee: Examinee) -> SessionStatus {
        let session = TestSession::new(test, examinee, self.focus_debounce);
        let status = session.status();
        self.sessions
            .write()
            .await
            .insert(session.id(), Arc::new(Mutex::new(session)));
        status
    }

    async fn session(&self, id: Uuid) -> Result<Arc<Mutex<TestSession>>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Session not found".to_string()))
    }

    pub async fn start(&self, id: Uuid, fullscreen: bool) -> Result<(SessionStatus, Vec<Question>)> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        guard.start(fullscreen)?;
        tracing::info!(session_id = %id, test_id = %guard.test().id, "attempt started");
        Ok((guard.status(), guard.test().questions.clone()))
    }

    pub async fn select_answer(
        &self,
        id: Uuid,
        question_id: Uuid,
        option: String,
    ) -> Result<SessionStatus> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        guard.select_answer(question_id, option)?;
        Ok(guard.status())
    }

    pub async fn navigate(&self, id: Uuid, direction: i32) -> Result<SessionStatus> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        guard.navigate(direction)?;
        Ok(guard.status())
    }

    /// Applies a reported environment event; when the event ends the
    /// attempt this drives the full submit, so the caller sees the final
    /// phase in the returned status.
    pub async fn environment_event(
        &self,
        id: Uuid,
        event: EnvironmentEvent,
    ) -> Result<SessionStatus> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        if let Some(reason) = guard.environment_event(event, Instant::now()) {
            tracing::warn!(session_id = %id, reason, "auto-submitting attempt");
            self.drive_submit(&mut guard, Some(reason.to_string())).await?;
        }
        Ok(guard.status())
    }

    pub async fn submit(&self, id: Uuid) -> Result<SessionStatus> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        self.drive_submit(&mut guard, None).await?;
        Ok(guard.status())
    }

    pub async fn status(&self, id: Uuid) -> Result<SessionStatus> {
        let session = self.session(id).await?;
        let guard = session.lock().await;
        Ok(guard.status())
    }

    /// One countdown step over every live attempt. Auto-submit failures are
    /// logged and left retryable; the loop itself never dies.
    pub async fn tick_all(&self) {
        let sessions: Vec<Arc<Mutex<TestSession>>> =
            self.sessions.read().await.values().cloned().collect();
        for session in sessions {
            let mut guard = session.lock().await;
            if let Some(reason) = guard.tick(Instant::now()) {
                let session_id = guard.id();
                tracing::warn!(session_id = %session_id, reason, "auto-submitting attempt");
                if let Err(e) = self.drive_submit(&mut guard, Some(reason.to_string())).await {
                    tracing::error!(session_id = %session_id, error = %e, "auto-submit failed, attempt stays open");
                }
            }
        }
    }

    async fn drive_submit(
        &self,
        session: &mut TestSession,
        reason: Option<String>,
    ) -> Result<Option<SubmitOutcome>> {
        let Some(result) = session.begin_submit(reason)? else {
            return Ok(session.outcome().cloned());
        };
        match self.results.save(result.clone()).await {
            Ok(result_id) => {
                let outcome = SubmitOutcome {
                    result_id,
                    score: result.score,
                    total_points: result.total_points,
                    auto_submit_reason: result.auto_submit_reason.clone(),
                };
                session.finish_submit(Some(outcome.clone()));
                tracing::info!(
                    session_id = %session.id(),
                    result_id = %result_id,
                    score = result.score,
                    total = result.total_points,
                    "attempt submitted"
                );
                Ok(Some(outcome))
            }
            Err(e) => {
                session.finish_submit(None);
                tracing::error!(session_id = %session.id(), error = %e, "failed to persist result");
                Err(e)
            }
        }
    }
}
