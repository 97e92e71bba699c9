//! In-memory store fakes for exercising services without a database.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::db::{
    AssignmentSubmission, ContentBlock, ContentBlockType, ContentProgress, ContentStore,
    CourseSession, DatabaseError, Enrollment, EnrollmentStatus, EnrollmentStore,
    NewAssignmentSubmission, NewEnrollment, NewQuizAttempt, ProgressStore, ProgressWrite, Question,
    QuizAttempt, StoreResult, Student, StudentStore, SubmissionGrade, SubmissionStatus,
};

pub fn question(question_type: &str, options: Option<Vec<&str>>, correct: Value) -> Question {
    Question {
        id: Uuid::new_v4(),
        question_text: "question".to_string(),
        question_type: question_type.to_string(),
        options: options.map(|o| o.into_iter().map(str::to_owned).collect()),
        correct_answer: Some(correct),
        points: 1,
        order_index: 0,
    }
}

pub fn content_block(block_type: ContentBlockType, quiz_data: Option<Value>) -> ContentBlock {
    content_block_in_session(Uuid::new_v4(), block_type, true, quiz_data)
}

pub fn content_block_in_session(
    session_id: Uuid,
    block_type: ContentBlockType,
    is_required: bool,
    quiz_data: Option<Value>,
) -> ContentBlock {
    let now = OffsetDateTime::now_utc();
    ContentBlock {
        id: Uuid::new_v4(),
        session_id,
        title: "block".to_string(),
        block_type,
        is_required,
        order_index: 0,
        quiz_data,
        created_at: now,
        updated_at: now,
    }
}

pub fn active_enrollment(student_id: Uuid, subject_reference_id: Uuid) -> Enrollment {
    let now = OffsetDateTime::now_utc();
    Enrollment {
        id: Uuid::new_v4(),
        student_id,
        subject_reference_id,
        semester_number: 1,
        academic_year_id: Uuid::new_v4(),
        status: EnrollmentStatus::Active,
        progress_percentage: 0,
        completed_at: None,
        grade: None,
        marks_obtained: None,
        total_marks: None,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Clone, Default)]
pub struct InMemoryContentStore {
    blocks: Arc<Mutex<Vec<ContentBlock>>>,
    sessions: Arc<Mutex<Vec<CourseSession>>>,
    subject_sessions: Arc<Mutex<HashMap<Uuid, Vec<Uuid>>>>,
    legacy_questions: Arc<Mutex<HashMap<Uuid, Vec<Question>>>>,
    fail_block_reads: Arc<Mutex<bool>>,
}

impl InMemoryContentStore {
    pub fn insert_block(&self, block: ContentBlock) {
        self.blocks.lock().unwrap().push(block);
    }

    pub fn insert_session(&self, session_id: Uuid) {
        self.sessions.lock().unwrap().push(CourseSession {
            id: session_id,
            lesson_plan_id: Uuid::new_v4(),
            title: "session".to_string(),
            order_index: 0,
        });
    }

    pub fn link_subject(&self, subject_id: Uuid, session_ids: Vec<Uuid>) {
        self.subject_sessions
            .lock()
            .unwrap()
            .insert(subject_id, session_ids);
    }

    pub fn insert_legacy_questions(&self, block_id: Uuid, questions: Vec<Question>) {
        self.legacy_questions
            .lock()
            .unwrap()
            .insert(block_id, questions);
    }

    pub fn fail_block_reads(&self, fail: bool) {
        *self.fail_block_reads.lock().unwrap() = fail;
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn get_content_block_by_id(&self, id: Uuid) -> StoreResult<Option<ContentBlock>> {
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn get_content_blocks_by_session_id(
        &self,
        session_id: Uuid,
    ) -> StoreResult<Vec<ContentBlock>> {
        if *self.fail_block_reads.lock().unwrap() {
            return Err(DatabaseError::Unknown("injected failure".to_string()));
        }
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn get_session_by_id(&self, id: Uuid) -> StoreResult<Option<CourseSession>> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn get_session_ids_by_subject_id(&self, subject_id: Uuid) -> StoreResult<Vec<Uuid>> {
        Ok(self
            .subject_sessions
            .lock()
            .unwrap()
            .get(&subject_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_quiz_questions_by_block_id(&self, block_id: Uuid) -> StoreResult<Vec<Question>> {
        Ok(self
            .legacy_questions
            .lock()
            .unwrap()
            .get(&block_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryProgressStore {
    rows: Arc<Mutex<Vec<ContentProgress>>>,
    attempts: Arc<Mutex<Vec<QuizAttempt>>>,
    submissions: Arc<Mutex<Vec<AssignmentSubmission>>>,
    fail_upserts: Arc<Mutex<bool>>,
}

impl InMemoryProgressStore {
    pub fn get_row(&self, user_id: Uuid, content_block_id: Uuid) -> Option<ContentProgress> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.user_id == user_id && r.content_block_id == content_block_id)
            .cloned()
    }

    pub fn attempt_count(&self, user_id: Uuid, content_block_id: Uuid) -> usize {
        self.attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id && a.content_block_id == content_block_id)
            .count()
    }

    pub fn fail_upserts(&self, fail: bool) {
        *self.fail_upserts.lock().unwrap() = fail;
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn get_progress_by_user_and_block(
        &self,
        user_id: Uuid,
        content_block_id: Uuid,
    ) -> StoreResult<Option<ContentProgress>> {
        Ok(self.get_row(user_id, content_block_id))
    }

    async fn get_user_progress_by_session(
        &self,
        user_id: Uuid,
        _session_id: Uuid,
    ) -> StoreResult<Vec<ContentProgress>> {
        // The fake does not know block->session membership; callers match
        // rows to blocks by id, so returning all of the user's rows is
        // equivalent.
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn upsert_progress(&self, write: &ProgressWrite) -> StoreResult<ContentProgress> {
        if *self.fail_upserts.lock().unwrap() {
            return Err(DatabaseError::Unknown("injected failure".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        let now = OffsetDateTime::now_utc();
        if let Some(row) = rows
            .iter_mut()
            .find(|r| r.user_id == write.user_id && r.content_block_id == write.content_block_id)
        {
            row.is_completed = write.is_completed;
            row.time_spent_seconds = write.time_spent_seconds;
            row.completion_data = write.completion_data.clone();
            row.completed_at = write.completed_at;
            row.updated_at = now;
            return Ok(row.clone());
        }
        let row = ContentProgress {
            id: Uuid::new_v4(),
            content_block_id: write.content_block_id,
            user_id: write.user_id,
            is_completed: write.is_completed,
            time_spent_seconds: write.time_spent_seconds,
            completion_data: write.completion_data.clone(),
            completed_at: write.completed_at,
            created_at: now,
            updated_at: now,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn get_quiz_attempts_by_user(
        &self,
        user_id: Uuid,
        content_block_id: Uuid,
    ) -> StoreResult<Vec<QuizAttempt>> {
        Ok(self
            .attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id && a.content_block_id == content_block_id)
            .cloned()
            .collect())
    }

    async fn create_quiz_attempt(&self, attempt: &NewQuizAttempt) -> StoreResult<QuizAttempt> {
        let row = QuizAttempt {
            id: Uuid::new_v4(),
            content_block_id: attempt.content_block_id,
            user_id: attempt.user_id,
            attempt_number: attempt.attempt_number,
            score: attempt.score,
            max_score: attempt.max_score,
            percentage: attempt.percentage,
            is_passed: attempt.is_passed,
            is_examination: attempt.is_examination,
            time_spent_seconds: attempt.time_spent_seconds,
            started_at: attempt.started_at,
            completed_at: attempt.completed_at,
            answers: attempt.answers.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.attempts.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn get_assignment_submission_by_user(
        &self,
        user_id: Uuid,
        content_block_id: Uuid,
    ) -> StoreResult<Option<AssignmentSubmission>> {
        Ok(self
            .submissions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.user_id == user_id && s.content_block_id == content_block_id)
            .cloned())
    }

    async fn create_assignment_submission(
        &self,
        submission: &NewAssignmentSubmission,
    ) -> StoreResult<AssignmentSubmission> {
        let now = OffsetDateTime::now_utc();
        let row = AssignmentSubmission {
            id: Uuid::new_v4(),
            content_block_id: submission.content_block_id,
            user_id: submission.user_id,
            submission_text: submission.submission_text.clone(),
            submission_files: submission.submission_files.clone(),
            status: SubmissionStatus::Submitted,
            score: None,
            max_score: None,
            percentage: None,
            is_passed: None,
            feedback: None,
            graded_by: None,
            graded_at: None,
            created_at: now,
            updated_at: now,
        };
        self.submissions.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn grade_assignment_submission(
        &self,
        submission_id: Uuid,
        grade: &SubmissionGrade,
    ) -> StoreResult<AssignmentSubmission> {
        let mut submissions = self.submissions.lock().unwrap();
        let row = submissions
            .iter_mut()
            .find(|s| s.id == submission_id)
            .ok_or(DatabaseError::NotFound)?;
        row.status = SubmissionStatus::Graded;
        row.score = Some(grade.score);
        row.max_score = Some(grade.max_score);
        row.percentage = Some(grade.percentage);
        row.is_passed = Some(grade.is_passed);
        row.feedback = grade.feedback.clone();
        row.graded_by = Some(grade.graded_by);
        row.graded_at = Some(grade.graded_at);
        row.updated_at = OffsetDateTime::now_utc();
        Ok(row.clone())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryEnrollmentStore {
    rows: Arc<Mutex<Vec<Enrollment>>>,
}

impl InMemoryEnrollmentStore {
    pub fn insert(&self, enrollment: Enrollment) {
        self.rows.lock().unwrap().push(enrollment);
    }

    pub fn get(&self, id: Uuid) -> Option<Enrollment> {
        self.rows.lock().unwrap().iter().find(|e| e.id == id).cloned()
    }
}

#[async_trait]
impl EnrollmentStore for InMemoryEnrollmentStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Enrollment>> {
        Ok(self.get(id))
    }

    async fn find_by_student_id(&self, student_id: Uuid) -> StoreResult<Vec<Enrollment>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn find_by_student_and_semester(
        &self,
        student_id: Uuid,
        semester_number: i16,
    ) -> StoreResult<Vec<Enrollment>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.student_id == student_id && e.semester_number == semester_number)
            .cloned()
            .collect())
    }

    async fn find_by_student_and_subject(
        &self,
        student_id: Uuid,
        subject_reference_id: Uuid,
    ) -> StoreResult<Option<Enrollment>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.student_id == student_id && e.subject_reference_id == subject_reference_id)
            .cloned())
    }

    async fn update(&self, enrollment: &Enrollment) -> StoreResult<Enrollment> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|e| e.id == enrollment.id)
            .ok_or(DatabaseError::NotFound)?;
        *row = enrollment.clone();
        Ok(row.clone())
    }

    async fn bulk_save(&self, enrollments: &[NewEnrollment]) -> StoreResult<Vec<Enrollment>> {
        let mut saved = Vec::new();
        let mut rows = self.rows.lock().unwrap();
        for new in enrollments {
            let duplicate = rows.iter().any(|e| {
                e.student_id == new.student_id
                    && e.subject_reference_id == new.subject_reference_id
                    && e.semester_number == new.semester_number
            });
            if duplicate {
                continue;
            }
            let now = OffsetDateTime::now_utc();
            let enrollment = Enrollment {
                id: Uuid::new_v4(),
                student_id: new.student_id,
                subject_reference_id: new.subject_reference_id,
                semester_number: new.semester_number,
                academic_year_id: new.academic_year_id,
                status: EnrollmentStatus::Active,
                progress_percentage: 0,
                completed_at: None,
                grade: None,
                marks_obtained: None,
                total_marks: None,
                created_at: now,
                updated_at: now,
            };
            rows.push(enrollment.clone());
            saved.push(enrollment);
        }
        Ok(saved)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStudentStore {
    rows: Arc<Mutex<Vec<Student>>>,
}

impl InMemoryStudentStore {
    pub fn insert(&self, student: Student) {
        self.rows.lock().unwrap().push(student);
    }
}

#[async_trait]
impl StudentStore for InMemoryStudentStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Student>> {
        Ok(self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }
}
