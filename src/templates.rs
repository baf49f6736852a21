//! HTML rendering.
//!
//! Pages are small enough to build with `format!`. All user-supplied text
//! goes through [`escape`].

use std::fmt::Write;

use crate::models::{Todo, iso8601};

/// Escapes `&`, `<`, `>`, `"` and `'` for use in HTML text and attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n\
         <nav><a href=\"/\">To Do</a> | <a href=\"/about\">About</a></nav>\n\
         {body}\n\
         </body>\n\
         </html>\n",
        title = escape(title),
    )
}

pub fn todo_index(todos: &[Todo]) -> String {
    if todos.is_empty() {
        return layout("To Do", "<h1>To Do</h1>\n<p>There are no todos</p>");
    }

    let mut body = String::from("<h1>To Do</h1>\n<ul>\n");
    for todo in todos {
        let due = todo
            .should_be_completed_by_date
            .as_ref()
            .map(iso8601::format)
            .unwrap_or_else(|| "no due date".to_owned());
        let _ = writeln!(
            body,
            "<li class=\"{class}\">{task} <small>({due})</small></li>",
            class = if todo.is_completed { "done" } else { "open" },
            task = escape(&todo.task),
            due = escape(&due),
        );
    }
    body.push_str("</ul>");
    layout("To Do", &body)
}

pub fn about() -> String {
    layout(
        "About",
        "<h1>About</h1>\n\
         <p>A small to-do list. The same records are available as JSON under \
         <code>/api/v1/todos/</code>.</p>",
    )
}

pub fn counter(count: i64) -> String {
    layout("Counter", &format!("<p>Number of page loads: {count}</p>"))
}

pub fn slow() -> String {
    layout("Slow", "<p>Async views supported</p>")
}
