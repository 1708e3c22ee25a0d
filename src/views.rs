//! HTML pages for the list and detail views.
//!
//! Rendering only reads plain [`Todo`] values; nothing here touches the store.

use crate::models::Todo;

const STYLE: &str = r#"
    body { margin: 0; padding: 32px; background: #f4f5f7; font-family: system-ui, sans-serif; }
    main { max-width: 720px; margin: 0 auto; padding: 28px; background: #fff; border-radius: 16px; }
    h1 { margin: 0 0 16px; font-size: 28px; }
    a { color: inherit; }
    form { display: inline-flex; gap: 12px; }
    form.add { display: flex; margin-bottom: 24px; }
    input[type="text"] { flex: 1; padding: 10px 12px; border: 1px solid #e2e8f0; border-radius: 10px; }
    button { border: none; border-radius: 10px; padding: 8px 12px; background: #e2e8f0; cursor: pointer; }
    button.delete { background: #fee2e2; color: #991b1b; }
    .empty, .time { color: #64748b; }
    .time { font-size: 12px; }
    ul { list-style: none; padding: 0; display: grid; gap: 12px; }
    li { display: flex; justify-content: space-between; align-items: center; gap: 8px;
         padding: 12px 16px; background: #f8fafc; border: 1px solid #e2e8f0; border-radius: 12px; }
    .done .title { text-decoration: line-through; color: #64748b; }
"#;

pub fn render_list(todos: &[Todo]) -> String {
    let mut content = String::from(
        r#"<h1>Todos</h1>
<form class="add" method="post" action="/todos/add/">
  <input type="text" name="title" placeholder="New todo" required />
  <button type="submit">Add</button>
</form>
"#,
    );

    if todos.is_empty() {
        content.push_str("<p class=\"empty\">No todos yet.</p>\n");
    } else {
        content.push_str("<ul>\n");
        for todo in todos {
            content.push_str(&todo_item(todo));
        }
        content.push_str("</ul>\n");
    }

    page("Todos", &content)
}

pub fn render_detail(todo: &Todo) -> String {
    let content = format!(
        r#"<div class="{state}">
  <h1 class="title">{title}</h1>
  <p class="time">Created {created} &middot; {label}</p>
{actions}</div>
<p><a href="/todos/">Back to all todos</a></p>
"#,
        state = state(todo),
        title = html_escape(&todo.title),
        created = todo.created_at.format("%Y-%m-%d %H:%M"),
        label = if todo.completed { "done" } else { "open" },
        actions = action_forms(todo),
    );
    page(&todo.title, &content)
}

fn todo_item(todo: &Todo) -> String {
    format!(
        r#"<li class="{state}">
  <div>
    <a class="title" href="/todos/{id}/">{title}</a>
    <div class="time">Created {created}</div>
  </div>
  <div>
{actions}  </div>
</li>
"#,
        state = state(todo),
        id = todo.id,
        title = html_escape(&todo.title),
        created = todo.created_at.format("%Y-%m-%d %H:%M"),
        actions = action_forms(todo),
    )
}

fn action_forms(todo: &Todo) -> String {
    let toggle_label = if todo.completed { "Reopen" } else { "Done" };
    format!(
        r#"    <form method="post" action="/todos/{id}/toggle/"><button type="submit">{toggle_label}</button></form>
    <form method="post" action="/todos/{id}/delete/"><button class="delete" type="submit">Delete</button></form>
"#,
        id = todo.id,
    )
}

fn state(todo: &Todo) -> &'static str {
    if todo.completed {
        "done"
    } else {
        "open"
    }
}

fn page(title: &str, content: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>{title}</title>
  <style>{STYLE}</style>
</head>
<body>
<main>
{content}</main>
</body>
</html>"#,
        title = html_escape(title),
    )
}

fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn todo(id: i64, title: &str, completed: bool) -> Todo {
        Todo {
            id,
            title: title.into(),
            completed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_list_says_so() {
        assert!(render_list(&[]).contains("No todos yet"));
    }

    #[test]
    fn list_links_each_todo() {
        let html = render_list(&[todo(2, "Second", true), todo(1, "First", false)]);
        assert!(!html.contains("No todos yet"));
        assert!(html.contains(r#"href="/todos/2/""#));
        assert!(html.contains(r#"action="/todos/1/toggle/""#));
        assert!(html.contains(r#"action="/todos/1/delete/""#));
        assert!(html.find("Second").unwrap() < html.find("First").unwrap());
    }

    #[test]
    fn completed_todos_are_marked_done() {
        let html = render_list(&[todo(2, "Second", true), todo(1, "First", false)]);
        assert!(html.contains(r#"<li class="done">"#));
        assert!(html.contains(r#"<li class="open">"#));
        assert!(html.contains("Reopen"));
    }

    #[test]
    fn titles_are_escaped() {
        let html = render_detail(&todo(1, "<script>alert('x')</script>", false));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
