use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::db::{
    ContentBlock, ContentBlockType, ContentProgress, ContentStore, DatabaseError, EnrollmentStore,
    ProgressStore, ProgressWrite,
};
use crate::error::{AppError, AppResult};

/// Applies a progress write with the `completed_at` transition rule:
/// the timestamp is stamped exactly when `is_completed` flips to true and
/// is never cleared or rewritten by later updates.
///
/// This is the single write path for content completion; quiz and
/// assignment passes funnel through it as well.
pub async fn apply_progress_write<P: ProgressStore>(
    store: &P,
    content_block_id: Uuid,
    user_id: Uuid,
    is_completed: bool,
    time_spent_seconds: i32,
    completion_data: Option<Value>,
) -> Result<ContentProgress, DatabaseError> {
    let existing = store
        .get_progress_by_user_and_block(user_id, content_block_id)
        .await?;

    let completed_at = match &existing {
        Some(row) if row.is_completed => row.completed_at,
        Some(row) if !is_completed => row.completed_at,
        _ if is_completed => Some(OffsetDateTime::now_utc()),
        _ => None,
    };

    store
        .upsert_progress(&ProgressWrite {
            content_block_id,
            user_id,
            is_completed,
            time_spent_seconds,
            completion_data,
            completed_at,
        })
        .await
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockProgress {
    pub content_block_id: Uuid,
    pub title: String,
    pub block_type: ContentBlockType,
    pub is_required: bool,
    pub is_completed: bool,
    pub time_spent_seconds: i32,
    pub completed_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionProgress {
    pub session_id: Uuid,
    pub total_blocks: usize,
    pub required_blocks: usize,
    pub completed_required_blocks: usize,
    pub completion_percentage: i32,
    pub blocks: Vec<BlockProgress>,
}

impl SessionProgress {
    fn zeroed(session_id: Uuid) -> Self {
        Self {
            session_id,
            total_blocks: 0,
            required_blocks: 0,
            completed_required_blocks: 0,
            completion_percentage: 0,
            blocks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseProgress {
    pub subject_reference_id: Uuid,
    pub total_sessions: usize,
    pub total_blocks: usize,
    pub required_blocks: usize,
    pub completed_required_blocks: usize,
    pub completion_percentage: i32,
}

impl CourseProgress {
    fn zeroed(subject_reference_id: Uuid) -> Self {
        Self {
            subject_reference_id,
            total_sessions: 0,
            total_blocks: 0,
            required_blocks: 0,
            completed_required_blocks: 0,
            completion_percentage: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub content_block_id: Uuid,
    pub user_id: Uuid,
    pub is_completed: bool,
    pub time_spent_seconds: i32,
    pub completion_data: Option<Value>,
    pub enrollment_id: Option<Uuid>,
}

/// Only required blocks count toward the percentage; non-required blocks
/// are tracked but excluded from numerator and denominator alike.
fn required_percentage(blocks: &[(bool, bool)]) -> (usize, usize, i32) {
    let required = blocks.iter().filter(|(is_required, _)| *is_required).count();
    let completed = blocks
        .iter()
        .filter(|(is_required, is_completed)| *is_required && *is_completed)
        .count();
    let percentage = if required > 0 {
        ((completed as f64 / required as f64) * 100.0).round() as i32
    } else {
        0
    };
    (required, completed, percentage)
}

pub struct ProgressService<C, P, E> {
    content: C,
    progress: P,
    enrollments: E,
}

impl<C, P, E> ProgressService<C, P, E>
where
    C: ContentStore,
    P: ProgressStore,
    E: EnrollmentStore,
{
    pub fn new(content: C, progress: P, enrollments: E) -> Self {
        Self {
            content,
            progress,
            enrollments,
        }
    }

    /// Completion view of one session for one user. The session must
    /// exist; any failure past that check degrades to zeroed statistics
    /// rather than erroring the request.
    pub async fn get_session_progress(
        &self,
        session_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<SessionProgress> {
        self.content
            .get_session_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;

        match self.compute_session_progress(session_id, user_id).await {
            Ok(progress) => Ok(progress),
            Err(err) => {
                warn!(%session_id, %user_id, error = %err, "Session progress computation failed, returning zeroed statistics");
                Ok(SessionProgress::zeroed(session_id))
            }
        }
    }

    /// Cross-session completion for a whole subject: the union of content
    /// blocks across every reachable session, with the same
    /// required-blocks-only formula. Deliberately not an average of
    /// per-session percentages, so a session with many required blocks
    /// weighs proportionally more.
    pub async fn get_course_progress(
        &self,
        subject_reference_id: Uuid,
        student_id: Uuid,
    ) -> AppResult<CourseProgress> {
        self.enrollments
            .find_by_student_and_subject(student_id, subject_reference_id)
            .await?
            .ok_or_else(|| {
                AppError::Authorization("Student is not enrolled in this subject".to_string())
            })?;

        let session_ids = self
            .content
            .get_session_ids_by_subject_id(subject_reference_id)
            .await?;
        if session_ids.is_empty() {
            return Err(AppError::NotFound(
                "No sessions found for subject".to_string(),
            ));
        }

        match self
            .compute_course_progress(subject_reference_id, student_id, &session_ids)
            .await
        {
            Ok(progress) => Ok(progress),
            Err(err) => {
                warn!(%subject_reference_id, %student_id, error = %err, "Course progress computation failed, returning zeroed statistics");
                Ok(CourseProgress::zeroed(subject_reference_id))
            }
        }
    }

    /// Records a user's interaction with a content block and, when an
    /// enrollment id is supplied, re-syncs the course percentage into the
    /// enrollment. The sync is best-effort: the progress row is already
    /// durable, so a sync failure is logged instead of surfaced.
    pub async fn update_progress(&self, update: ProgressUpdate) -> AppResult<ContentProgress> {
        self.content
            .get_content_block_by_id(update.content_block_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Content block not found".to_string()))?;

        let record = apply_progress_write(
            &self.progress,
            update.content_block_id,
            update.user_id,
            update.is_completed,
            update.time_spent_seconds,
            update.completion_data,
        )
        .await?;

        if let Some(enrollment_id) = update.enrollment_id {
            if let Err(err) = self.sync_enrollment(enrollment_id).await {
                warn!(%enrollment_id, error = %err, "Enrollment progress sync failed after progress write");
            }
        }

        Ok(record)
    }

    /// Recomputes the course percentage for the enrollment's subject and
    /// pushes it through the enrollment state machine (which may
    /// auto-complete).
    async fn sync_enrollment(&self, enrollment_id: Uuid) -> AppResult<()> {
        let mut enrollment = self
            .enrollments
            .find_by_id(enrollment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

        let course = self
            .get_course_progress(enrollment.subject_reference_id, enrollment.student_id)
            .await?;

        enrollment.update_progress(course.completion_percentage);
        self.enrollments.update(&enrollment).await?;
        Ok(())
    }

    async fn compute_session_progress(
        &self,
        session_id: Uuid,
        user_id: Uuid,
    ) -> Result<SessionProgress, DatabaseError> {
        let blocks = self
            .content
            .get_content_blocks_by_session_id(session_id)
            .await?;
        let progress_rows = self
            .progress
            .get_user_progress_by_session(user_id, session_id)
            .await?;

        let block_views: Vec<BlockProgress> = blocks
            .iter()
            .map(|block| block_view(block, &progress_rows))
            .collect();

        let flags: Vec<(bool, bool)> = block_views
            .iter()
            .map(|view| (view.is_required, view.is_completed))
            .collect();
        let (required, completed, percentage) = required_percentage(&flags);

        Ok(SessionProgress {
            session_id,
            total_blocks: block_views.len(),
            required_blocks: required,
            completed_required_blocks: completed,
            completion_percentage: percentage,
            blocks: block_views,
        })
    }

    async fn compute_course_progress(
        &self,
        subject_reference_id: Uuid,
        user_id: Uuid,
        session_ids: &[Uuid],
    ) -> Result<CourseProgress, DatabaseError> {
        let mut flags: Vec<(bool, bool)> = Vec::new();
        let mut total_blocks = 0;

        for &session_id in session_ids {
            let blocks = self
                .content
                .get_content_blocks_by_session_id(session_id)
                .await?;
            let progress_rows = self
                .progress
                .get_user_progress_by_session(user_id, session_id)
                .await?;

            total_blocks += blocks.len();
            for block in &blocks {
                let view = block_view(block, &progress_rows);
                flags.push((view.is_required, view.is_completed));
            }
        }

        let (required, completed, percentage) = required_percentage(&flags);

        Ok(CourseProgress {
            subject_reference_id,
            total_sessions: session_ids.len(),
            total_blocks,
            required_blocks: required,
            completed_required_blocks: completed,
            completion_percentage: percentage,
        })
    }
}

/// A block with no progress row defaults to incomplete.
fn block_view(block: &ContentBlock, progress_rows: &[ContentProgress]) -> BlockProgress {
    let row = progress_rows
        .iter()
        .find(|row| row.content_block_id == block.id);
    BlockProgress {
        content_block_id: block.id,
        title: block.title.clone(),
        block_type: block.block_type,
        is_required: block.is_required,
        is_completed: row.map(|r| r.is_completed).unwrap_or(false),
        time_spent_seconds: row.map(|r| r.time_spent_seconds).unwrap_or(0),
        completed_at: row.and_then(|r| r.completed_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::EnrollmentStatus;
    use crate::test_support::{
        active_enrollment, content_block_in_session, InMemoryContentStore,
        InMemoryEnrollmentStore, InMemoryProgressStore,
    };
    use serde_json::json;

    fn service() -> (
        ProgressService<InMemoryContentStore, InMemoryProgressStore, InMemoryEnrollmentStore>,
        InMemoryContentStore,
        InMemoryProgressStore,
        InMemoryEnrollmentStore,
    ) {
        let content = InMemoryContentStore::default();
        let progress = InMemoryProgressStore::default();
        let enrollments = InMemoryEnrollmentStore::default();
        let service =
            ProgressService::new(content.clone(), progress.clone(), enrollments.clone());
        (service, content, progress, enrollments)
    }

    async fn complete_block(store: &InMemoryProgressStore, user_id: Uuid, block_id: Uuid) {
        apply_progress_write(store, block_id, user_id, true, 60, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn percentage_counts_required_blocks_only() {
        let (service, content, progress, _) = service();
        let session_id = Uuid::new_v4();
        content.insert_session(session_id);

        // 5 blocks, 3 required; 2 of the required are complete.
        let mut required_ids = Vec::new();
        for _ in 0..3 {
            let block =
                content_block_in_session(session_id, ContentBlockType::Video, true, None);
            required_ids.push(block.id);
            content.insert_block(block);
        }
        let mut optional_ids = Vec::new();
        for _ in 0..2 {
            let block =
                content_block_in_session(session_id, ContentBlockType::Text, false, None);
            optional_ids.push(block.id);
            content.insert_block(block);
        }

        let user_id = Uuid::new_v4();
        complete_block(&progress, user_id, required_ids[0]).await;
        complete_block(&progress, user_id, required_ids[1]).await;
        // Completing a non-required block must not move the percentage.
        complete_block(&progress, user_id, optional_ids[0]).await;

        let result = service
            .get_session_progress(session_id, user_id)
            .await
            .unwrap();
        assert_eq!(result.total_blocks, 5);
        assert_eq!(result.required_blocks, 3);
        assert_eq!(result.completed_required_blocks, 2);
        assert_eq!(result.completion_percentage, 67); // round(2/3 * 100)
    }

    #[tokio::test]
    async fn session_with_no_required_blocks_is_zero_percent() {
        let (service, content, _, _) = service();
        let session_id = Uuid::new_v4();
        content.insert_session(session_id);
        content.insert_block(content_block_in_session(
            session_id,
            ContentBlockType::Text,
            false,
            None,
        ));

        let result = service
            .get_session_progress(session_id, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(result.completion_percentage, 0);
        assert_eq!(result.total_blocks, 1);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (service, _, _, _) = service();
        let err = service
            .get_session_progress(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn statistics_errors_degrade_to_zeroed_stats() {
        let (service, content, _, _) = service();
        let session_id = Uuid::new_v4();
        content.insert_session(session_id);
        content.fail_block_reads(true);

        let result = service
            .get_session_progress(session_id, Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(result.completion_percentage, 0);
        assert!(result.blocks.is_empty());
    }

    #[tokio::test]
    async fn course_progress_unions_blocks_across_sessions() {
        let (service, content, progress, enrollments) = service();
        let subject_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        enrollments.insert(active_enrollment(student_id, subject_id));

        // Session A: 1 required block (complete). Session B: 3 required
        // blocks (none complete). A naive average of session percentages
        // would say 50%; the union says 25%.
        let session_a = Uuid::new_v4();
        let session_b = Uuid::new_v4();
        content.insert_session(session_a);
        content.insert_session(session_b);
        content.link_subject(subject_id, vec![session_a, session_b]);

        let block_a = content_block_in_session(session_a, ContentBlockType::Video, true, None);
        let block_a_id = block_a.id;
        content.insert_block(block_a);
        for _ in 0..3 {
            content.insert_block(content_block_in_session(
                session_b,
                ContentBlockType::Pdf,
                true,
                None,
            ));
        }

        complete_block(&progress, student_id, block_a_id).await;

        let result = service
            .get_course_progress(subject_id, student_id)
            .await
            .unwrap();
        assert_eq!(result.total_sessions, 2);
        assert_eq!(result.required_blocks, 4);
        assert_eq!(result.completed_required_blocks, 1);
        assert_eq!(result.completion_percentage, 25);
    }

    #[tokio::test]
    async fn course_progress_requires_enrollment() {
        let (service, content, _, _) = service();
        let subject_id = Uuid::new_v4();
        let session_id = Uuid::new_v4();
        content.insert_session(session_id);
        content.link_subject(subject_id, vec![session_id]);

        let err = service
            .get_course_progress(subject_id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn completed_at_is_stamped_once_and_never_cleared() {
        let (_, _, progress, _) = service();
        let user_id = Uuid::new_v4();
        let block_id = Uuid::new_v4();

        let first = apply_progress_write(&progress, block_id, user_id, true, 30, None)
            .await
            .unwrap();
        let completed_at = first.completed_at.expect("stamped on transition");

        // Updating other fields while still completed keeps the timestamp.
        let second = apply_progress_write(
            &progress,
            block_id,
            user_id,
            true,
            90,
            Some(json!({"source": "quiz"})),
        )
        .await
        .unwrap();
        assert_eq!(second.completed_at, Some(completed_at));
        assert_eq!(second.time_spent_seconds, 90);

        // Incomplete rows never get a timestamp.
        let other_block = Uuid::new_v4();
        let incomplete = apply_progress_write(&progress, other_block, user_id, false, 10, None)
            .await
            .unwrap();
        assert!(incomplete.completed_at.is_none());
    }

    #[tokio::test]
    async fn update_progress_syncs_enrollment_to_completion() {
        let (service, content, _, enrollments) = service();
        let subject_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let enrollment = active_enrollment(student_id, subject_id);
        let enrollment_id = enrollment.id;
        enrollments.insert(enrollment);

        let session_id = Uuid::new_v4();
        content.insert_session(session_id);
        content.link_subject(subject_id, vec![session_id]);
        let block = content_block_in_session(session_id, ContentBlockType::Video, true, None);
        let block_id = block.id;
        content.insert_block(block);

        let record = service
            .update_progress(ProgressUpdate {
                content_block_id: block_id,
                user_id: student_id,
                is_completed: true,
                time_spent_seconds: 300,
                completion_data: None,
                enrollment_id: Some(enrollment_id),
            })
            .await
            .unwrap();
        assert!(record.is_completed);

        let synced = enrollments.get(enrollment_id).unwrap();
        assert_eq!(synced.progress_percentage, 100);
        assert_eq!(synced.status, EnrollmentStatus::Completed);
        assert!(synced.completed_at.is_some());
    }

    #[tokio::test]
    async fn enrollment_sync_failure_does_not_fail_the_write() {
        let (service, content, progress, _) = service();
        let block = content_block_in_session(Uuid::new_v4(), ContentBlockType::Video, true, None);
        let block_id = block.id;
        content.insert_block(block);

        let user_id = Uuid::new_v4();
        // Enrollment id that does not exist: sync fails, write survives.
        let record = service
            .update_progress(ProgressUpdate {
                content_block_id: block_id,
                user_id,
                is_completed: true,
                time_spent_seconds: 10,
                completion_data: None,
                enrollment_id: Some(Uuid::new_v4()),
            })
            .await
            .unwrap();
        assert!(record.is_completed);
        assert!(progress.get_row(user_id, block_id).is_some());
    }

    #[tokio::test]
    async fn update_progress_requires_existing_block() {
        let (service, _, _, _) = service();
        let err = service
            .update_progress(ProgressUpdate {
                content_block_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                is_completed: false,
                time_spent_seconds: 0,
                completion_data: None,
                enrollment_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
