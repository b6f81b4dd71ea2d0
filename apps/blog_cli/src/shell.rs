//! Interactive command loop. Login, registration and new-post commands open
//! the matching modal and prompt for its fields before submitting.

use std::{
    io::{self, Write},
    sync::Arc,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{BlogOrchestrator, LoginForm, Modal, PostForm, RegisterForm, ViewState};
use shared::domain::PostId;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

use crate::render::render;

const HELP: &str = "\
Commands:
  show               redraw the page
  refresh            reload posts
  login              log in by email
  register           create an account
  new                create a post
  close              dismiss the open form
  logout             end the session
  select <id>        view a post's comments
  delete <id>        delete one of your posts
  comment <text...>  comment on the selected post
  quit               exit";

#[derive(Parser, Debug)]
#[command(
    no_binary_name = true,
    disable_help_flag = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Show,
    Refresh,
    Login,
    Register,
    New,
    Close,
    Logout,
    Select {
        post_id: i64,
    },
    Delete {
        post_id: i64,
    },
    Comment {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },
    #[command(alias = "exit")]
    Quit,
}

pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, clap::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    ShellLine::try_parse_from(line.split_whitespace()).map(|parsed| Some(parsed.command))
}

async fn prompt<R: AsyncBufRead + Unpin>(
    lines: &mut Lines<R>,
    label: &str,
) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

fn comment_hint(view: &ViewState) -> &'static str {
    if view.user.is_none() {
        "Log in to comment."
    } else if view.selected_post.is_none() {
        "Select a post first."
    } else {
        "Comment text is empty."
    }
}

async fn show(app: &BlogOrchestrator) {
    print!("{}", render(&app.view().await));
}

pub async fn run<R: AsyncBufRead + Unpin>(app: Arc<BlogOrchestrator>, input: R) -> Result<()> {
    let mut lines = input.lines();
    show(&app).await;

    while let Some(line) = prompt(&mut lines, "> ").await? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if !dispatch(&app, command, &mut lines).await? {
            break;
        }
    }
    Ok(())
}

/// Returns `false` when the loop should stop.
///
/// Action failures are logged by the orchestrator; the page is redrawn either way.
async fn dispatch<R: AsyncBufRead + Unpin>(
    app: &BlogOrchestrator,
    command: ShellCommand,
    lines: &mut Lines<R>,
) -> Result<bool> {
    match command {
        ShellCommand::Help => {
            println!("{HELP}");
            return Ok(true);
        }
        ShellCommand::Show => {}
        ShellCommand::Refresh => {
            let _ = app.load_posts().await;
        }
        ShellCommand::Login => {
            app.open_modal(Modal::Login).await;
            let Some(email) = prompt(lines, "Email: ").await? else {
                return Ok(false);
            };
            let Some(password) = prompt(lines, "Password: ").await? else {
                return Ok(false);
            };
            app.set_login_form(LoginForm { email, password }).await;
            let _ = app.submit_login().await;
        }
        ShellCommand::Register => {
            app.open_modal(Modal::Register).await;
            let mut fields = Vec::with_capacity(5);
            for label in [
                "Username: ",
                "Email: ",
                "Password: ",
                "Full name (optional): ",
                "Bio (optional): ",
            ] {
                let Some(value) = prompt(lines, label).await? else {
                    return Ok(false);
                };
                fields.push(value);
            }
            let mut fields = fields.into_iter();
            let mut next = || fields.next().unwrap_or_default();
            app.set_register_form(RegisterForm {
                username: next(),
                email: next(),
                password: next(),
                full_name: next(),
                bio: next(),
            })
            .await;
            let _ = app.submit_register().await;
        }
        ShellCommand::New => {
            if app.view().await.user.is_none() {
                println!("Log in to create posts.");
                return Ok(true);
            }
            app.open_modal(Modal::NewPost).await;
            let Some(title) = prompt(lines, "Title: ").await? else {
                return Ok(false);
            };
            let Some(content) = prompt(lines, "Content: ").await? else {
                return Ok(false);
            };
            app.set_post_form(PostForm { title, content }).await;
            let _ = app.submit_post().await;
        }
        ShellCommand::Close => app.close_modal().await,
        ShellCommand::Logout => app.logout().await,
        ShellCommand::Select { post_id } => {
            let _ = app.select_post(PostId(post_id)).await;
        }
        ShellCommand::Delete { post_id } => {
            let _ = app.delete_post(PostId(post_id)).await;
        }
        ShellCommand::Comment { text } => {
            app.set_comment_draft(text.join(" ")).await;
            let view = app.view().await;
            if !view.can_submit_comment() {
                println!("{}", comment_hint(&view));
                return Ok(true);
            }
            let _ = app.submit_comment().await;
        }
        ShellCommand::Quit => return Ok(false),
    }

    show(app).await;
    Ok(true)
}
