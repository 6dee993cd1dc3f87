use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{
    optional_text, required_text, Contact, ReachOutStatus, PRIORITY_MAX, PRIORITY_MIN,
};
use crate::pages::{dashboard_nav, escape};

use super::records::RecordView;

pub struct ContactsView;

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub company: String,
    pub position: String,
    pub reach_out_status: ReachOutStatus,
    pub profile_link: Option<String>,
    pub priority: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactStatusForm {
    pub reach_out_status: ReachOutStatus,
}

impl RecordView for ContactsView {
    const COLLECTION: &'static str = "connections";
    const BASE_PATH: &'static str = "/dashboard/network";
    const TITLE: &'static str = "Network";

    type Record = Contact;
    type CreateForm = ContactForm;
    type UpdateForm = ContactStatusForm;

    fn new_record(
        form: Self::CreateForm,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Value, String> {
        let name = required_text(&form.name, "name")?;
        let company = required_text(&form.company, "company")?;
        let position = required_text(&form.position, "position")?;

        if !(PRIORITY_MIN..=PRIORITY_MAX).contains(&form.priority) {
            return Err(format!(
                "priority must be between {PRIORITY_MIN} and {PRIORITY_MAX}"
            ));
        }

        Ok(json!({
            "name": name,
            "company": company,
            "position": position,
            "reach_out_status": form.reach_out_status,
            "profile_link": optional_text(form.profile_link),
            "priority": form.priority,
            "notes": optional_text(form.notes),
            "created_at": now,
            "user_id": user_id,
        }))
    }

    fn update_patch(form: Self::UpdateForm) -> Value {
        json!({ "reach_out_status": form.reach_out_status })
    }

    fn render_page(records: &[Contact]) -> String {
        let mut rows = String::new();
        for contact in records {
            let profile = match contact.profile_link.as_deref() {
                Some(link) => format!("<a href=\"{0}\">{0}</a>", escape(link)),
                None => String::new(),
            };
            rows.push_str(&format!(
                "<tr><td>{name}</td><td>{company}</td><td>{position}</td>\
                 <td><form method=\"post\" action=\"/dashboard/network/{id}/status\">\
                 <select name=\"reach_out_status\">{options}</select>\
                 <button type=\"submit\">Update</button></form></td>\
                 <td>{priority}</td><td>{profile}</td><td>{notes}</td></tr>\n",
                name = escape(&contact.name),
                company = escape(&contact.company),
                position = escape(&contact.position),
                id = contact.id,
                options = status_options(contact.reach_out_status),
                priority = contact.priority,
                profile = profile,
                notes = escape(contact.notes.as_deref().unwrap_or("")),
            ));
        }

        format!(
            "{nav}\n<h1>Network</h1>\n\
             <form method=\"post\" action=\"/dashboard/network\">\n\
             <input name=\"name\" placeholder=\"Name\" required>\n\
             <input name=\"company\" placeholder=\"Company\" required>\n\
             <input name=\"position\" placeholder=\"Position\" required>\n\
             <select name=\"reach_out_status\">{options}</select>\n\
             <input name=\"profile_link\" placeholder=\"Profile link\">\n\
             <input name=\"priority\" type=\"number\" min=\"1\" max=\"5\" value=\"3\">\n\
             <textarea name=\"notes\" placeholder=\"Notes\"></textarea>\n\
             <button type=\"submit\">Add Connection</button>\n</form>\n\
             <table>\n<tr><th>Name</th><th>Company</th><th>Position</th><th>Status</th>\
             <th>Priority</th><th>Profile</th><th>Notes</th></tr>\n{rows}</table>",
            nav = dashboard_nav(),
            options = status_options(ReachOutStatus::NotContacted),
            rows = rows,
        )
    }
}

fn status_options(current: ReachOutStatus) -> String {
    ReachOutStatus::ALL
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
