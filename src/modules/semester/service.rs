use serde::Serialize;
use time::{Date, Month, OffsetDateTime};
use uuid::Uuid;

use crate::db::{Student, StudentStore};
use crate::error::{AppError, AppResult};

/// Program length in semesters. Unrecognized program types fall back to
/// the undergraduate length.
pub fn max_semesters(program_type: Option<&str>) -> i32 {
    match program_type.map(|t| t.trim().to_lowercase()) {
        Some(t) if t.contains("diploma") => 6,
        Some(t) if t.contains("certificate") => 2,
        Some(t) if t == "pg" || t.contains("postgraduate") || t.contains("master") => 4,
        Some(t) if t == "ug" || t.contains("undergraduate") || t.contains("bachelor") => 8,
        _ => 8,
    }
}

/// Semester number for a cohort that started in `batch_year`, as of
/// `today`. The academic year splits into two terms: January–May and
/// June–December.
pub fn current_semester_for_batch(batch_year: i32, today: Date) -> i32 {
    let term = if u8::from(today.month()) >= 6 { 2 } else { 1 };
    (today.year() - batch_year) * 2 + term
}

/// Inverse of [`current_semester_for_batch`]: the calendar date range a
/// given semester of a cohort falls into. Odd semesters are the
/// January–May term, even semesters June–December.
pub fn semester_dates(batch_year: i32, semester_number: i32) -> (Date, Date) {
    let year_offset = (semester_number - 1) / 2;
    let year = batch_year + year_offset;
    if semester_number % 2 == 1 {
        (
            Date::from_calendar_date(year, Month::January, 1).expect("valid calendar date"),
            Date::from_calendar_date(year, Month::May, 31).expect("valid calendar date"),
        )
    } else {
        (
            Date::from_calendar_date(year, Month::June, 1).expect("valid calendar date"),
            Date::from_calendar_date(year, Month::December, 31).expect("valid calendar date"),
        )
    }
}

/// Pulls the first digit run out of strings like "3rd", "Semester 5" or
/// "2".
pub fn parse_ordinal(value: &str) -> Option<i32> {
    let digits: String = value
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[derive(Debug, Clone, Serialize)]
pub struct SemesterInfo {
    pub student_id: Uuid,
    pub semester_number: i32,
    pub max_semesters: i32,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

/// Resolves the semester number for a student record, applying source
/// precedence: an explicitly stored semester wins over a stored year of
/// study, which wins over batch-year derivation. With no usable source
/// the student is assumed to be in semester 1.
pub fn resolve_semester(student: &Student, today: Date) -> AppResult<SemesterInfo> {
    if student.program_id.is_none() || student.department_id.is_none() {
        return Err(AppError::Validation(
            "Student has no associated program or department".to_string(),
        ));
    }

    let derived = if let Some(n) = student
        .current_semester
        .as_deref()
        .and_then(parse_ordinal)
    {
        n
    } else if let Some(year) = student.year_of_study.as_deref().and_then(parse_ordinal) {
        (year - 1) * 2 + 1
    } else if let Some(batch_year) = student.batch_year {
        current_semester_for_batch(batch_year, today)
    } else {
        1
    };

    let max = max_semesters(student.program_type.as_deref());
    let semester_number = derived.clamp(1, max);

    let (start_date, end_date) = match student.batch_year {
        Some(batch_year) => {
            let (start, end) = semester_dates(batch_year, semester_number);
            (Some(start), Some(end))
        }
        None => (None, None),
    };

    Ok(SemesterInfo {
        student_id: student.id,
        semester_number,
        max_semesters: max,
        start_date,
        end_date,
    })
}

pub struct SemesterService<S> {
    students: S,
}

impl<S: StudentStore> SemesterService<S> {
    pub fn new(students: S) -> Self {
        Self { students }
    }

    pub async fn current_semester(&self, student_id: Uuid) -> AppResult<SemesterInfo> {
        let student = self
            .students
            .find_by_id(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;

        resolve_semester(&student, OffsetDateTime::now_utc().date())
    }
}
