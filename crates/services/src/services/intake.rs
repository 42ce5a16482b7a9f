//! Job intake: one submitted form becomes a customer, a lead project, its intake form
//! document and, optionally, a pending site visit.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use db::models::{
    customer::{CreateCustomer, Customer},
    document::{CreateDocument, Document},
    project::{CreateProject, Project, ProjectPriority, ProjectStatus},
    schedule_event::{CreateScheduleEvent, EventStatus, EventType, ScheduleEvent},
};
use serde::{Deserialize, Serialize};
use sqlx::{Sqlite, SqlitePool, Transaction};
use thiserror::Error;
use tracing::{error, info, warn};
use ts_rs::TS;
use uuid::Uuid;

const DEFAULT_MEETING_TIME: (u32, u32) = (9, 0);
const MEETING_LENGTH_MINUTES: i64 = 60;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("failed to create {entity}: {source}")]
    Persistence {
        entity: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl IntakeError {
    fn persistence(entity: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Persistence { entity, source }
    }
}

/// Customer half of the intake form. Missing fields deserialize as empty and are reported
/// by validation rather than rejected by the JSON layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct IntakeCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub secondary_phone: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct IntakeProject {
    pub project_name: String,
    pub project_type: String,
    pub description: String,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub priority: Option<ProjectPriority>,
    pub lead_source: Option<String>,
    pub meeting_notes: Option<String>,
    pub internal_notes: Option<String>,
    /// `YYYY-MM-DD`
    pub meeting_date: Option<String>,
    /// `HH:MM`, defaults to 09:00
    pub meeting_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct IntakeRequest {
    #[serde(default)]
    pub customer: IntakeCustomer,
    #[serde(default)]
    pub project: IntakeProject,
    #[serde(default, rename = "scheduleMeeting")]
    #[ts(rename = "scheduleMeeting")]
    pub schedule_meeting: bool,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct IntakeResponse {
    pub success: bool,
    pub customer: Customer,
    pub project: Project,
    pub document: Document,
    #[serde(rename = "scheduleEvent")]
    #[ts(rename = "scheduleEvent")]
    pub schedule_event: Option<ScheduleEvent>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeetingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MeetingWindow {
    /// One hour starting at `date` + `time`, read as UTC. `None` when the end would fall
    /// outside the representable range.
    pub fn starting_at(date: NaiveDate, time: NaiveTime) -> Option<Self> {
        let start = date.and_time(time).and_utc();
        let end = start.checked_add_signed(Duration::minutes(MEETING_LENGTH_MINUTES))?;
        Some(Self { start, end })
    }
}

/// A request that passed validation, ready to insert.
#[derive(Debug, Clone)]
struct IntakePlan {
    customer: CreateCustomer,
    project: IntakeProject,
    meeting: Option<MeetingWindow>,
}

impl IntakePlan {
    fn project_for(&self, customer_id: Uuid) -> CreateProject {
        CreateProject {
            customer_id,
            project_name: self.project.project_name.clone(),
            project_type: self.project.project_type.clone(),
            description: self.project.description.clone(),
            budget_range: self.project.budget_range.clone(),
            timeline: self.project.timeline.clone(),
            priority: self.project.priority,
            lead_source: self.project.lead_source.clone(),
            status: Some(ProjectStatus::Lead),
            meeting_notes: self.project.meeting_notes.clone(),
            internal_notes: self.project.internal_notes.clone(),
        }
    }
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl IntakeRequest {
    /// Collects every problem at once so the form can highlight all of them.
    fn validate(self) -> Result<IntakePlan, IntakeError> {
        let mut problems = Vec::new();

        let c = &self.customer;
        for (field, value) in [
            ("customer.name", &c.name),
            ("customer.email", &c.email),
            ("customer.phone", &c.phone),
            ("customer.address", &c.address),
            ("customer.city", &c.city),
            ("customer.state", &c.state),
            ("customer.zip_code", &c.zip_code),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{field} is required"));
            }
        }

        let p = &self.project;
        for (field, value) in [
            ("project.project_name", &p.project_name),
            ("project.project_type", &p.project_type),
            ("project.description", &p.description),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{field} is required"));
            }
        }

        let mut meeting = None;
        if self.schedule_meeting {
            let date = match non_blank(&p.meeting_date) {
                None => {
                    problems.push(
                        "project.meeting_date is required when scheduleMeeting is set".to_string(),
                    );
                    None
                }
                Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                    Ok(date) => Some(date),
                    Err(_) => {
                        problems.push("project.meeting_date must be YYYY-MM-DD".to_string());
                        None
                    }
                },
            };
            let time = match non_blank(&p.meeting_time) {
                None => NaiveTime::from_hms_opt(DEFAULT_MEETING_TIME.0, DEFAULT_MEETING_TIME.1, 0),
                Some(raw) => {
                    let parsed = parse_time(raw);
                    if parsed.is_none() {
                        problems.push("project.meeting_time must be HH:MM".to_string());
                    }
                    parsed
                }
            };
            if let (Some(date), Some(time)) = (date, time) {
                meeting = MeetingWindow::starting_at(date, time);
                if meeting.is_none() {
                    problems.push("project.meeting_date is out of range".to_string());
                }
            }
        }

        if !problems.is_empty() {
            return Err(IntakeError::Validation(problems));
        }

        let IntakeRequest {
            customer, project, ..
        } = self;
        Ok(IntakePlan {
            customer: CreateCustomer {
                name: customer.name,
                email: customer.email,
                phone: customer.phone,
                secondary_phone: customer.secondary_phone,
                address: customer.address,
                city: customer.city,
                state: customer.state,
                zip_code: customer.zip_code,
            },
            project,
            meeting,
        })
    }
}

enum MeetingOutcome {
    NotRequested,
    Scheduled(ScheduleEvent),
    Failed(String),
}

impl MeetingOutcome {
    fn message(&self) -> String {
        match self {
            MeetingOutcome::NotRequested => {
                "Customer, project and intake form created. No meeting scheduled.".to_string()
            }
            MeetingOutcome::Scheduled(event) => format!(
                "Customer, project and intake form created. Site visit scheduled for {}.",
                event.start_time.format("%Y-%m-%d %H:%M UTC")
            ),
            MeetingOutcome::Failed(reason) => format!(
                "Customer, project and intake form created, but the meeting could not be scheduled: {reason}"
            ),
        }
    }

    fn into_event(self) -> Option<ScheduleEvent> {
        match self {
            MeetingOutcome::Scheduled(event) => Some(event),
            _ => None,
        }
    }
}

/// Runs the intake workflow.
///
/// Customer, project and document are written in one transaction, so a failure at any of
/// those steps leaves nothing behind. The site visit is written after commit and its failure
/// only downgrades the response message.
pub struct IntakePipeline {
    pool: SqlitePool,
}

impl IntakePipeline {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn submit(&self, request: IntakeRequest) -> Result<IntakeResponse, IntakeError> {
        let plan = request.validate()?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(IntakeError::persistence("customer"))?;

        let (customer, project, document) = match Self::insert_records(&mut tx, &plan).await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "Intake failed, rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    error!(error = %rollback_err, "Intake rollback failed");
                }
                return Err(e);
            }
        };

        tx.commit()
            .await
            .map_err(IntakeError::persistence("document"))?;

        info!(
            customer_id = %customer.id,
            project_id = %project.id,
            document_id = %document.id,
            "Intake records created"
        );

        let outcome = match plan.meeting {
            None => MeetingOutcome::NotRequested,
            Some(window) => self.schedule_site_visit(&customer, &project, window).await,
        };
        let message = outcome.message();

        Ok(IntakeResponse {
            success: true,
            customer,
            project,
            document,
            schedule_event: outcome.into_event(),
            message,
        })
    }

    async fn insert_records(
        tx: &mut Transaction<'_, Sqlite>,
        plan: &IntakePlan,
    ) -> Result<(Customer, Project, Document), IntakeError> {
        let customer = Customer::create(&mut **tx, &plan.customer, Uuid::new_v4())
            .await
            .map_err(IntakeError::persistence("customer"))?;

        let project = Project::create(&mut **tx, &plan.project_for(customer.id), Uuid::new_v4())
            .await
            .map_err(IntakeError::persistence("project"))?;

        let document = Document::create(
            &mut **tx,
            &CreateDocument::intake_form(project.id),
            Uuid::new_v4(),
        )
        .await
        .map_err(IntakeError::persistence("document"))?;

        Ok((customer, project, document))
    }

    async fn schedule_site_visit(
        &self,
        customer: &Customer,
        project: &Project,
        window: MeetingWindow,
    ) -> MeetingOutcome {
        let data = CreateScheduleEvent {
            project_id: project.id,
            title: format!("Site Visit - {}", project.project_name),
            event_type: EventType::SiteVisit,
            start_time: window.start,
            end_time: window.end,
            location: Some(customer.full_address()),
            attendees: vec![customer.name.clone()],
            notes: project.meeting_notes.clone(),
            status: Some(EventStatus::Pending),
        };

        match ScheduleEvent::create(&self.pool, &data, Uuid::new_v4()).await {
            Ok(event) => {
                info!(
                    project_id = %project.id,
                    event_id = %event.id,
                    start = %event.start_time,
                    "Intake site visit scheduled"
                );
                MeetingOutcome::Scheduled(event)
            }
            Err(e) => {
                warn!(project_id = %project.id, error = %e, "Intake site visit could not be scheduled");
                MeetingOutcome::Failed(e.to_string())
            }
        }
    }
}
