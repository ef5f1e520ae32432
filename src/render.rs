// HTML preview of highlighted text and paragraph records.

use crate::clause::ParagraphRecord;
use crate::expander::spans::MarkedText;

/// Escape the HTML special characters of `text`
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escaped text with every span wrapped in `<mark class="{kind}">`
pub fn marked_to_html(marked: &MarkedText) -> String {
    let mut html = String::with_capacity(marked.text().len() + marked.spans().len() * 32);
    for (segment, kind) in marked.segments() {
        match kind {
            Some(kind) => {
                html.push_str("<mark class=\"");
                html.push_str(kind.as_str());
                html.push_str("\">");
                html.push_str(&html_escape(segment));
                html.push_str("</mark>");
            }
            None => html.push_str(&html_escape(segment)),
        }
    }
    html
}

/// Marked text as a standalone page, line breaks kept as `<br>`
pub fn marked_document_html(marked: &MarkedText, title: &str) -> String {
    let body = marked_to_html(marked).replace('\n', "<br>\n");
    page(title, &body)
}

/// One `<p>` per record; heading text in `<strong><u>`
pub fn paragraphs_to_html(records: &[ParagraphRecord], title: &str) -> String {
    let mut body = String::new();
    for record in records {
        let mut inner = marked_to_html(&record.marked());
        if record.underline {
            inner = format!("<u>{inner}</u>");
        }
        if record.bold {
            inner = format!("<strong>{inner}</strong>");
        }
        body.push_str("<p>");
        body.push_str(&inner);
        body.push_str("</p>\n");
    }
    page(title, &body)
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <style>\nmark.expansion {{ background: #fff3a0; }}\n\
         mark.slash_normalization {{ background: #cde8ff; }}\n\
         mark.clause_header {{ background: #d8f5d0; }}\n</style>\n</head>\n<body>\n{}</body>\n</html>\n",
        html_escape(title),
        body
    )
}
