//! Plain-text rendering of the orchestrator's view state.

use client_core::{Modal, ViewState};
use shared::domain::{Comment, Post};

pub fn render(view: &ViewState) -> String {
    let mut lines = Vec::new();
    render_header(view, &mut lines);
    lines.push(String::new());
    render_posts_into(view, &mut lines);
    lines.push(String::new());
    render_comments(view, &mut lines);
    if let Some(modal) = render_modal(view) {
        lines.push(String::new());
        lines.push(modal);
    }
    lines.join("\n") + "\n"
}

pub fn render_posts(view: &ViewState) -> String {
    let mut lines = Vec::new();
    render_posts_into(view, &mut lines);
    lines.join("\n") + "\n"
}

fn render_header(view: &ViewState, lines: &mut Vec<String>) {
    lines.push("Blog Microservices".to_string());
    match &view.user {
        Some(user) => lines.push(format!(
            "Welcome, {}!  (new | logout)",
            user.username
        )),
        None => lines.push("Not logged in  (login | register)".to_string()),
    }
}

fn display_date(raw: &str, parsed: Option<impl std::fmt::Display>) -> String {
    parsed
        .map(|date| date.to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn post_date(post: &Post) -> String {
    display_date(&post.created_at, post.created_on())
}

fn comment_date(comment: &Comment) -> String {
    display_date(&comment.created_at, comment.created_on())
}

fn render_posts_into(view: &ViewState, lines: &mut Vec<String>) {
    lines.push("Latest Posts".to_string());
    if view.posts_loading {
        lines.push("  Loading posts...".to_string());
        return;
    }
    if let Some(banner) = view.posts_error {
        lines.push(format!("  ! {banner}"));
    }
    if view.posts.is_empty() {
        if view.posts_error.is_none() {
            lines.push("  No posts yet. Be the first to create one!".to_string());
        }
        return;
    }
    for entry in &view.posts {
        let marker = if entry.selected { ">" } else { " " };
        let delete = if entry.can_delete { "  [delete]" } else { "" };
        lines.push(format!(
            "{marker} #{} {}{delete}",
            entry.post.id, entry.post.title
        ));
        lines.push(format!("    {}", entry.post.content));
        lines.push(format!(
            "    Author ID: {} | {}",
            entry.post.author_id,
            post_date(&entry.post)
        ));
    }
}

fn render_comments(view: &ViewState, lines: &mut Vec<String>) {
    lines.push("Comments".to_string());
    let Some(post) = &view.selected_post else {
        lines.push("  Select a post to view comments".to_string());
        return;
    };
    lines.push(format!("  On: {}", post.title));
    if view.comments_stale {
        lines.push("  (comments below may belong to a previous post)".to_string());
    }
    if view.comments.is_empty() {
        lines.push("  No comments yet".to_string());
        return;
    }
    for comment in &view.comments {
        lines.push(format!("  - {}", comment.content));
        lines.push(format!(
            "    Author ID: {} • {}",
            comment.author_id,
            comment_date(comment)
        ));
    }
}

fn render_modal(view: &ViewState) -> Option<String> {
    match view.modal {
        Modal::None => None,
        Modal::Login => Some(format!(
            "[Login] email: {} (run `login` to retry, `close` to dismiss)",
            view.login_form.email
        )),
        Modal::Register => Some(format!(
            "[Register] username: {}, email: {} (run `register` to retry, `close` to dismiss)",
            view.register_form.username, view.register_form.email
        )),
        Modal::NewPost => Some(format!(
            "[Create New Post] title: {} (run `new` to retry, `close` to dismiss)",
            view.post_form.title
        )),
    }
}
