use crate::models::Quote;

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_quote_text(q: &Quote) -> String {
    format!(
        "New Quote Request:\n\n\
         Name: {} {}\n\
         Email: {}\n\
         Phone: {}\n\
         Location: {}\n\
         Project: {}\n\
         Budget: {}\n\
         Timeline: {}\n\
         Has Plans?: {}\n\
         Newsletter: {}\n\n\
         Description:\n{}",
        q.first_name,
        q.last_name,
        q.email,
        q.phone,
        q.location,
        q.project_type,
        q.budget,
        q.timeline,
        yes_no(q.has_plans),
        yes_no(q.newsletter),
        q.description,
    )
}

pub fn render_quote_html(q: &Quote) -> String {
    let row = |label: &str, value: &str| {
        format!(
            r#"<tr><td style="padding: 4px 12px 4px 0; color: #666;">{label}</td><td style="padding: 4px 0;">{}</td></tr>"#,
            escape(value)
        )
    };

    let rows = [
        row("Name", &format!("{} {}", q.first_name, q.last_name)),
        row("Email", &q.email),
        row("Phone", &q.phone),
        row("Location", &q.location),
        row("Project", &q.project_type),
        row("Budget", &q.budget),
        row("Timeline", &q.timeline),
        row("Has plans", yes_no(q.has_plans)),
        row("Newsletter", yes_no(q.newsletter)),
    ]
    .join("\n        ");

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2>New Quote Request</h2>
    <table>
        {rows}
    </table>
    <h3>Description</h3>
    <p style="white-space: pre-wrap;">{}</p>
</body>
</html>"#,
        escape(&q.description)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuoteStatus;

    fn quote() -> Quote {
        Quote {
            id: uuid::Uuid::now_v7(),
            first_name: "Ada".to_string(),
            last_name: "<script>".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+15550001111".to_string(),
            location: "Lagos".to_string(),
            project_type: "Kitchen".to_string(),
            budget: "$10k-$20k".to_string(),
            timeline: "3 months".to_string(),
            description: "Open-plan kitchen & dining refit".to_string(),
            has_plans: true,
            newsletter: false,
            status: QuoteStatus::New,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn html_escapes_client_input() {
        let html = render_quote_html(&quote());
        assert!(html.contains("Ada &lt;script&gt;"));
        assert!(html.contains("kitchen &amp; dining"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn text_lists_every_answer() {
        let text = render_quote_text(&quote());
        assert!(text.contains("Email: ada@example.com"));
        assert!(text.contains("Has Plans?: Yes"));
        assert!(text.contains("Newsletter: No"));
    }
}
