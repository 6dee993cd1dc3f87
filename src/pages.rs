//! Bare-bones HTML shell shared by every page. Layout and styling are
//! intentionally minimal; the views only need a table, a form and a nav.

pub fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} · Huntboard</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        title = escape(title),
        body = body,
    )
}

pub fn dashboard_nav() -> String {
    "<nav><a href=\"/dashboard\">Daily Agenda</a> | \
     <a href=\"/dashboard/jobs\">Job Applications</a> | \
     <a href=\"/dashboard/network\">Network</a> | \
     <form method=\"post\" action=\"/logout\" style=\"display:inline\">\
     <button type=\"submit\">Sign out</button></form></nav>"
        .to_string()
}

pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::escape;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape("<b>\"R&D\" dept's</b>"),
            "&lt;b&gt;&quot;R&amp;D&quot; dept&#39;s&lt;/b&gt;"
        );
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(escape("Acme Corp"), "Acme Corp");
    }
}
