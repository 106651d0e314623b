//! HTML page rendering.
//!
//! The page always renders: a failed fetch shows an empty table and a failed
//! compute call shows the `unavailable` sentinel instead of an error page.

use crate::pipeline::PageData;

/// Render the results page from the pipeline's output.
pub fn render_page(page: &PageData) -> String {
    let mut out = String::new();
    out.push_str("<html><body>");
    out.push_str("<h1>Database Results</h1>");
    out.push_str("<table border='1'>");
    out.push_str("<tr><th>ID</th><th>Name</th><th>Age</th></tr>");
    for person in &page.rows {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            person.id,
            escape(&person.name),
            person.age
        ));
    }
    out.push_str("</table>");
    out.push_str(&format!("<h2>Average Age: {}</h2>", page.average));
    out.push_str("</body></html>");
    out
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Aggregate;
    use crate::store::Person;

    #[test]
    fn test_renders_rows_and_average() {
        let page = PageData {
            rows: vec![
                Person { id: 1, name: "a".into(), age: 10 },
                Person { id: 2, name: "b".into(), age: 20 },
                Person { id: 3, name: "c".into(), age: 30 },
            ],
            average: Aggregate::Available(20.0),
        };
        let html = render_page(&page);

        assert_eq!(html.matches("<tr><td>").count(), 3);
        assert!(html.contains("<tr><td>2</td><td>b</td><td>20</td></tr>"));
        assert!(html.contains("Average Age: 20</h2>"));
    }

    #[test]
    fn test_renders_fractional_average() {
        let page = PageData {
            rows: Vec::new(),
            average: Aggregate::Available(21.3),
        };
        assert!(render_page(&page).contains("Average Age: 21.3"));
    }

    #[test]
    fn test_renders_sentinel_and_empty_table_on_failure() {
        let page = PageData {
            rows: Vec::new(),
            average: Aggregate::Unavailable,
        };
        let html = render_page(&page);

        assert!(!html.contains("<tr><td>"));
        assert!(html.contains("Average Age: unavailable"));
    }

    #[test]
    fn test_escapes_row_values() {
        let page = PageData {
            rows: vec![Person { id: 1, name: "<b>&\"x\"".into(), age: 1 }],
            average: Aggregate::Unavailable,
        };
        let html = render_page(&page);

        assert!(html.contains("&lt;b&gt;&amp;&quot;x&quot;"));
        assert!(!html.contains("<b>"));
    }
}
