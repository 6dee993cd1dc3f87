use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{required_text, Goal, GoalKind};
use crate::pages::{dashboard_nav, escape};

use super::records::RecordView;

pub struct GoalsView;

#[derive(Debug, Deserialize)]
pub struct GoalForm {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    pub target_count: i64,
}

/// The toggle submits the goal's current `completed` value; the patch sends
/// its negation. Two toggles in a row restore the original value.
#[derive(Debug, Deserialize)]
pub struct GoalToggleForm {
    pub completed: bool,
}

impl RecordView for GoalsView {
    const COLLECTION: &'static str = "daily_goals";
    const BASE_PATH: &'static str = "/dashboard";
    const TITLE: &'static str = "Daily Agenda";

    type Record = Goal;
    type CreateForm = GoalForm;
    type UpdateForm = GoalToggleForm;

    fn new_record(
        form: Self::CreateForm,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Value, String> {
        let title = required_text(&form.title, "title")?;

        if form.target_count < 1 {
            return Err("target_count must be at least 1".to_string());
        }

        Ok(json!({
            "title": title,
            "type": form.kind,
            "target_count": form.target_count,
            "current_count": 0,
            "date": now.date_naive(),
            "completed": false,
            "created_at": now,
            "user_id": user_id,
        }))
    }

    fn update_patch(form: Self::UpdateForm) -> Value {
        json!({ "completed": !form.completed })
    }

    fn render_page(records: &[Goal]) -> String {
        let mut items = String::new();
        for goal in records {
            items.push_str(&format!(
                "<li>{title} ({kind}) — progress {current}/{target}{done}\
                 <form method=\"post\" action=\"/dashboard/goals/{id}/toggle\">\
                 <input type=\"hidden\" name=\"completed\" value=\"{completed}\">\
                 <button type=\"submit\">{action}</button></form></li>\n",
                title = escape(&goal.title),
                kind = goal.kind.label(),
                current = goal.current_count,
                target = goal.target_count,
                done = if goal.completed { " ✓" } else { "" },
                id = goal.id,
                completed = goal.completed,
                action = if goal.completed {
                    "Mark incomplete"
                } else {
                    "Mark complete"
                },
            ));
        }

        let kind_options: String = GoalKind::ALL
            .iter()
            .map(|kind| {
                format!(
                    "<option value=\"{value}\">{label}</option>",
                    value = kind.as_str(),
                    label = kind.label(),
                )
            })
            .collect();

        format!(
            "{nav}\n<h1>Daily Agenda</h1>\n\
             <form method=\"post\" action=\"/dashboard/goals\">\n\
             <input name=\"title\" placeholder=\"Add a new goal\" required>\n\
             <select name=\"type\">{kind_options}</select>\n\
             <input name=\"target_count\" type=\"number\" min=\"1\" value=\"1\">\n\
             <button type=\"submit\">Add Goal</button>\n</form>\n\
             <ul>\n{items}</ul>",
            nav = dashboard_nav(),
            kind_options = kind_options,
            items = items,
        )
    }
}
