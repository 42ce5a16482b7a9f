//! Writes the TypeScript declarations the front end compiles against.
//!
//! Usage: `cargo run --bin generate-types [-- <output path>]` (default `shared/types.ts`).

use std::{env, fs, path::PathBuf};

use anyhow::Context;
use ts_rs::TS;

fn declarations() -> Vec<String> {
    vec![
        db::models::customer::Customer::decl(),
        db::models::customer::UpdateCustomer::decl(),
        db::models::project::ProjectStatus::decl(),
        db::models::project::ProjectPriority::decl(),
        db::models::project::Project::decl(),
        db::models::project::ProjectWithCustomer::decl(),
        db::models::project::UpdateProject::decl(),
        db::models::document::DocumentType::decl(),
        db::models::document::SignatureStatus::decl(),
        db::models::document::Document::decl(),
        db::models::document::UpdateDocument::decl(),
        db::models::schedule_event::EventType::decl(),
        db::models::schedule_event::EventStatus::decl(),
        db::models::schedule_event::ScheduleEvent::decl(),
        db::models::schedule_event::ScheduleEventWithProject::decl(),
        db::models::schedule_event::CreateScheduleEvent::decl(),
        db::models::schedule_event::UpdateScheduleEvent::decl(),
        db::models::schedule_event::ScheduleFilter::decl(),
        db::models::professional::Professional::decl(),
        db::models::professional::CreateProfessional::decl(),
        db::models::professional::UpdateProfessional::decl(),
        db::models::admin_user::AdminUser::decl(),
        utils::jwt::Role::decl(),
        services::services::intake::IntakeCustomer::decl(),
        services::services::intake::IntakeProject::decl(),
        services::services::intake::IntakeRequest::decl(),
        services::services::intake::IntakeResponse::decl(),
        services::services::auth::AdminLoginRequest::decl(),
        services::services::auth::CustomerLoginRequest::decl(),
        services::services::auth::AdminSession::decl(),
        services::services::auth::CustomerSession::decl(),
        services::services::auth::IssuedAccessCode::decl(),
        services::services::calendar::CalendarDay::<()>::decl(),
        services::services::database_validator::ValidationResult::decl(),
        server::routes::health::HealthResponse::decl(),
        server::routes::schedule::PatchScheduleEvent::decl(),
        server::routes::customers::CustomerWithProjects::decl(),
        server::routes::projects::ProjectDetail::decl(),
        server::routes::projects::UpdateProjectStatus::decl(),
        server::routes::documents::NewDocument::decl(),
    ]
}

fn main() -> anyhow::Result<()> {
    let output = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("shared/types.ts"));

    let mut contents = String::from(
        "// This file was generated by `generate-types`. Do not edit it by hand.\n\n",
    );
    for decl in declarations() {
        contents.push_str("export ");
        contents.push_str(&decl);
        contents.push_str("\n\n");
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&output, contents).with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}
