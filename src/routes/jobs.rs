use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{optional_text, required_text, Application, ApplicationStatus};
use crate::pages::{dashboard_nav, escape};

use super::records::RecordView;

pub struct ApplicationsView;

#[derive(Debug, Deserialize)]
pub struct ApplicationForm {
    pub company: String,
    pub position: String,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationStatusForm {
    pub status: ApplicationStatus,
}

impl RecordView for ApplicationsView {
    const COLLECTION: &'static str = "jobs";
    const BASE_PATH: &'static str = "/dashboard/jobs";
    const TITLE: &'static str = "Job Applications";

    type Record = Application;
    type CreateForm = ApplicationForm;
    type UpdateForm = ApplicationStatusForm;

    fn new_record(
        form: Self::CreateForm,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Value, String> {
        let company = required_text(&form.company, "company")?;
        let position = required_text(&form.position, "position")?;

        Ok(json!({
            "company": company,
            "position": position,
            "status": form.status,
            "notes": optional_text(form.notes),
            "date_applied": now,
            "created_at": now,
            "user_id": user_id,
        }))
    }

    fn update_patch(form: Self::UpdateForm) -> Value {
        json!({ "status": form.status })
    }

    fn render_page(records: &[Application]) -> String {
        let mut rows = String::new();
        for job in records {
            rows.push_str(&format!(
                "<tr><td>{company}</td><td>{position}</td><td>{date}</td>\
                 <td><form method=\"post\" action=\"/dashboard/jobs/{id}/status\">\
                 <select name=\"status\">{options}</select>\
                 <button type=\"submit\">Update</button></form></td>\
                 <td>{notes}</td></tr>\n",
                company = escape(&job.company),
                position = escape(&job.position),
                date = job.date_applied.format("%Y-%m-%d"),
                id = job.id,
                options = status_options(job.status),
                notes = escape(job.notes.as_deref().unwrap_or("")),
            ));
        }

        format!(
            "{nav}\n<h1>Job Applications</h1>\n\
             <form method=\"post\" action=\"/dashboard/jobs\">\n\
             <input name=\"company\" placeholder=\"Company\" required>\n\
             <input name=\"position\" placeholder=\"Position\" required>\n\
             <select name=\"status\">{options}</select>\n\
             <textarea name=\"notes\" placeholder=\"Notes\"></textarea>\n\
             <button type=\"submit\">Add Job</button>\n</form>\n\
             <table>\n<tr><th>Company</th><th>Position</th><th>Date Applied</th>\
             <th>Status</th><th>Notes</th></tr>\n{rows}</table>",
            nav = dashboard_nav(),
            options = status_options(ApplicationStatus::NotApplied),
            rows = rows,
        )
    }
}

fn status_options(current: ApplicationStatus) -> String {
    ApplicationStatus::ALL
        .iter()
        .map(|status| {
            format!(
                "<option value=\"{value}\"{selected}>{label}</option>",
                value = status.as_str(),
                selected = if *status == current { " selected" } else { "" },
                label = status.label(),
            )
        })
        .collect()
}
