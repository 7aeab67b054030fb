//! Student dashboard, coursework, reflections and calendar

use std::sync::Arc;

use chrono::NaiveDate;

use super::models::{
    Assignment, CalendarEvent, Course, Dashboard, NewReflection, Reflection, Submission,
    SubmissionReceipt,
};
use super::path_segment;
use crate::http::{ApiClient, ApiError};

/// Date format used in calendar query parameters
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone)]
pub struct StudentService {
    client: Arc<ApiClient>,
}

impl StudentService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Home screen summary
    pub async fn dashboard(&self) -> Result<Dashboard, ApiError> {
        self.client.get("/student/dashboard").await
    }

    /// Enrolled courses
    pub async fn courses(&self) -> Result<Vec<Course>, ApiError> {
        self.client.get("/student/courses").await
    }

    /// All assignments across courses
    pub async fn assignments(&self) -> Result<Vec<Assignment>, ApiError> {
        self.client.get("/student/assignments").await
    }

    /// One assignment by id
    pub async fn assignment(&self, id: &str) -> Result<Assignment, ApiError> {
        let path = format!("/student/assignments/{}", path_segment(id)?);
        self.client.get(&path).await
    }

    /// Hands in work for an assignment
    pub async fn submit_assignment(
        &self,
        id: &str,
        submission: &Submission,
    ) -> Result<SubmissionReceipt, ApiError> {
        let path = format!("/student/assignments/{}/submissions", path_segment(id)?);
        tracing::debug!(
            "Submitting assignment {} ({} attachments)",
            id,
            submission.attachment_urls.len()
        );
        self.client.post(&path, submission).await
    }

    /// The student's reflections, newest first as returned by the server
    pub async fn reflections(&self) -> Result<Vec<Reflection>, ApiError> {
        self.client.get("/student/reflections").await
    }

    pub async fn create_reflection(&self, reflection: &NewReflection) -> Result<Reflection, ApiError> {
        self.client.post("/student/reflections", reflection).await
    }

    /// Events between `from` and `to`, both inclusive
    pub async fn calendar(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarEvent>, ApiError> {
        let path = calendar_path(from, to)?;
        self.client.get(&path).await
    }
}

fn calendar_path(from: NaiveDate, to: NaiveDate) -> Result<String, ApiError> {
    if from > to {
        return Err(ApiError::InvalidUrl(format!(
            "Calendar range starts after it ends: {} > {}",
            from, to
        )));
    }
    Ok(format!(
        "/student/calendar?from={}&to={}",
        from.format(DATE_FORMAT),
        to.format(DATE_FORMAT)
    ))
}
