//! Composes the session, post collection and comment thread into a renderable
//! view and dispatches user actions to the backend services.

use std::{fmt, sync::Arc};

use shared::{
    domain::{Comment, Post, PostId, User},
    protocol::NewUser,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    api::{BlogApi, HttpBlogClient, ServiceEndpoints},
    error::ActionError,
    state::{CommentThread, PostCollection, Selection, SelectionTicket, Session},
};

pub const POSTS_UNAVAILABLE_BANNER: &str = "Could not load posts. Try refreshing.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modal {
    #[default]
    None,
    Login,
    Register,
    NewPost,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Defaults to the username when left blank.
    pub full_name: String,
    pub bio: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoadPosts,
    Login,
    Register,
    CreatePost,
    DeletePost,
    LoadComments,
    CreateComment,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::LoadPosts => "load_posts",
            Action::Login => "login",
            Action::Register => "register",
            Action::CreatePost => "create_post",
            Action::DeletePost => "delete_post",
            Action::LoadComments => "load_comments",
            Action::CreateComment => "create_comment",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    SessionChanged,
    PostsChanged,
    SelectionChanged,
    CommentsChanged,
    ActionFailed { action: Action, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub post: Post,
    pub selected: bool,
    pub can_delete: bool,
}

/// Snapshot of everything a renderer needs.
#[derive(Debug, Clone)]
pub struct ViewState {
    pub user: Option<User>,
    pub posts: Vec<PostView>,
    pub posts_loading: bool,
    pub posts_error: Option<&'static str>,
    pub selected_post: Option<Post>,
    pub comments: Vec<Comment>,
    /// The thread still holds comments of a previously selected post.
    pub comments_stale: bool,
    pub modal: Modal,
    pub login_form: LoginForm,
    pub register_form: RegisterForm,
    pub post_form: PostForm,
    pub comment_draft: String,
}

impl ViewState {
    pub fn can_submit_comment(&self) -> bool {
        self.user.is_some() && self.selected_post.is_some() && !self.comment_draft.trim().is_empty()
    }
}

#[derive(Default)]
struct OrchestratorState {
    session: Session,
    posts: PostCollection,
    selection: Selection,
    thread: CommentThread,
    modal: Modal,
    login_form: LoginForm,
    register_form: RegisterForm,
    post_form: PostForm,
    comment_draft: String,
}

impl OrchestratorState {
    fn close_modal_if(&mut self, modal: Modal) {
        if self.modal == modal {
            self.modal = Modal::None;
        }
    }
}

fn require_field(value: &str, name: &'static str) -> Result<(), ActionError> {
    if value.trim().is_empty() {
        return Err(ActionError::MissingField(name));
    }
    Ok(())
}

pub struct BlogOrchestrator {
    api: Arc<dyn BlogApi>,
    inner: Mutex<OrchestratorState>,
    events: broadcast::Sender<ViewEvent>,
}

impl BlogOrchestrator {
    pub fn new(endpoints: ServiceEndpoints) -> Arc<Self> {
        Self::with_api(Arc::new(HttpBlogClient::new(endpoints)))
    }

    pub fn with_api(api: Arc<dyn BlogApi>) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            api,
            inner: Mutex::new(OrchestratorState::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: ViewEvent) {
        let _ = self.events.send(event);
    }

    /// Precondition failures: nothing was sent.
    fn reject(&self, action: Action, err: ActionError) -> ActionError {
        debug!(%action, error = %err, "action rejected");
        err
    }

    fn fail(&self, action: Action, err: ActionError) -> ActionError {
        warn!(%action, error = %err, "action failed");
        self.emit(ViewEvent::ActionFailed {
            action,
            message: err.to_string(),
        });
        err
    }

    pub async fn view(&self) -> ViewState {
        let guard = self.inner.lock().await;
        let selected_id = guard.selection.post_id();
        let posts = guard
            .posts
            .posts()
            .iter()
            .map(|post| PostView {
                post: post.clone(),
                selected: selected_id == Some(post.id),
                can_delete: guard.session.may_delete(post),
            })
            .collect();

        ViewState {
            user: guard.session.user().cloned(),
            posts,
            posts_loading: guard.posts.is_loading(),
            posts_error: guard
                .posts
                .load_failed()
                .then_some(POSTS_UNAVAILABLE_BANNER),
            selected_post: guard.selection.post().cloned(),
            comments: guard.thread.comments().to_vec(),
            comments_stale: selected_id.is_some() && guard.thread.post_id() != selected_id,
            modal: guard.modal,
            login_form: guard.login_form.clone(),
            register_form: guard.register_form.clone(),
            post_form: guard.post_form.clone(),
            comment_draft: guard.comment_draft.clone(),
        }
    }

    pub async fn open_modal(&self, modal: Modal) {
        self.inner.lock().await.modal = modal;
    }

    pub async fn close_modal(&self) {
        self.inner.lock().await.modal = Modal::None;
    }

    pub async fn set_login_form(&self, form: LoginForm) {
        self.inner.lock().await.login_form = form;
    }

    pub async fn set_register_form(&self, form: RegisterForm) {
        self.inner.lock().await.register_form = form;
    }

    pub async fn set_post_form(&self, form: PostForm) {
        self.inner.lock().await.post_form = form;
    }

    pub async fn set_comment_draft(&self, draft: impl Into<String>) {
        self.inner.lock().await.comment_draft = draft.into();
    }

    /// Initial load on startup.
    pub async fn start(&self) -> Result<(), ActionError> {
        self.load_posts().await
    }

    /// Overlapping loads are allowed; only the most recently started one
    /// settles the collection and clears the loading flag.
    pub async fn load_posts(&self) -> Result<(), ActionError> {
        let ticket = self.inner.lock().await.posts.begin_load();
        self.emit(ViewEvent::PostsChanged);

        let result = self.api.list_posts().await;

        let mut guard = self.inner.lock().await;
        match result {
            Ok(posts) => {
                let count = posts.len();
                if !guard.posts.finish_load(ticket, posts) {
                    debug!("discarding posts from a superseded load");
                    return Ok(());
                }
                drop(guard);
                info!(count, "posts loaded");
                self.emit(ViewEvent::PostsChanged);
                Ok(())
            }
            Err(err) => {
                if !guard.posts.fail_load(ticket) {
                    debug!(error = %err, "ignoring failure of a superseded posts load");
                    return Ok(());
                }
                drop(guard);
                self.emit(ViewEvent::PostsChanged);
                Err(self.fail(Action::LoadPosts, err.into()))
            }
        }
    }

    pub async fn submit_login(&self) -> Result<User, ActionError> {
        let form = self.inner.lock().await.login_form.clone();
        require_field(&form.email, "email")
            .and_then(|_| require_field(&form.password, "password"))
            .map_err(|err| self.reject(Action::Login, err))?;

        let user = self
            .api
            .login(form.email.trim(), &form.password)
            .await
            .map_err(|err| self.fail(Action::Login, err.into()))?;

        let mut guard = self.inner.lock().await;
        guard.session.sign_in(user.clone());
        guard.close_modal_if(Modal::Login);
        guard.login_form = LoginForm::default();
        drop(guard);

        info!(user_id = user.id.0, username = %user.username, "logged in");
        self.emit(ViewEvent::SessionChanged);
        Ok(user)
    }

    pub async fn submit_register(&self) -> Result<User, ActionError> {
        let form = self.inner.lock().await.register_form.clone();
        require_field(&form.username, "username")
            .and_then(|_| require_field(&form.email, "email"))
            .and_then(|_| require_field(&form.password, "password"))
            .map_err(|err| self.reject(Action::Register, err))?;

        let username = form.username.trim().to_string();
        let full_name = match form.full_name.trim() {
            "" => username.clone(),
            name => name.to_string(),
        };
        let profile = NewUser {
            username,
            email: form.email.trim().to_string(),
            full_name,
            bio: form.bio.trim().to_string(),
        };

        let user = self
            .api
            .register_profile(profile)
            .await
            .map_err(|err| self.fail(Action::Register, err.into()))?;

        let mut guard = self.inner.lock().await;
        guard.session.sign_in(user.clone());
        guard.close_modal_if(Modal::Register);
        guard.register_form = RegisterForm::default();
        drop(guard);

        info!(user_id = user.id.0, username = %user.username, "registered");
        self.emit(ViewEvent::SessionChanged);
        Ok(user)
    }

    pub async fn logout(&self) {
        let previous = self.inner.lock().await.session.sign_out();
        if let Some(user) = previous {
            info!(user_id = user.id.0, "logged out");
        }
        self.emit(ViewEvent::SessionChanged);
    }

    pub async fn submit_post(&self) -> Result<Post, ActionError> {
        let (author_id, form) = {
            let guard = self.inner.lock().await;
            let Some(author_id) = guard.session.user_id() else {
                return Err(self.reject(Action::CreatePost, ActionError::NotLoggedIn));
            };
            (author_id, guard.post_form.clone())
        };
        require_field(&form.title, "title")
            .and_then(|_| require_field(&form.content, "content"))
            .map_err(|err| self.reject(Action::CreatePost, err))?;

        let post = self
            .api
            .create_post(&form.title, &form.content, author_id)
            .await
            .map_err(|err| self.fail(Action::CreatePost, err.into()))?;

        let mut guard = self.inner.lock().await;
        guard.posts.prepend(post.clone());
        guard.close_modal_if(Modal::NewPost);
        guard.post_form = PostForm::default();
        drop(guard);

        info!(post_id = post.id.0, "post created");
        self.emit(ViewEvent::PostsChanged);
        Ok(post)
    }

    pub async fn delete_post(&self, post_id: PostId) -> Result<(), ActionError> {
        {
            let guard = self.inner.lock().await;
            let Some(user_id) = guard.session.user_id() else {
                return Err(self.reject(Action::DeletePost, ActionError::NotLoggedIn));
            };
            let Some(post) = guard.posts.get(post_id) else {
                return Err(self.reject(Action::DeletePost, ActionError::UnknownPost(post_id)));
            };
            if post.author_id != user_id {
                return Err(self.reject(Action::DeletePost, ActionError::NotAuthor(post_id)));
            }
        }

        self.api
            .delete_post(post_id)
            .await
            .map_err(|err| self.fail(Action::DeletePost, err.into()))?;

        let mut guard = self.inner.lock().await;
        guard.posts.remove(post_id);
        let was_selected = guard.selection.post_id() == Some(post_id);
        if was_selected {
            guard.selection.clear();
            guard.thread.clear();
        }
        drop(guard);

        info!(post_id = post_id.0, "post deleted");
        self.emit(ViewEvent::PostsChanged);
        if was_selected {
            self.emit(ViewEvent::SelectionChanged);
            self.emit(ViewEvent::CommentsChanged);
        }
        Ok(())
    }

    /// Selects a post from the collection and loads its comments.
    pub async fn select_post(&self, post_id: PostId) -> Result<(), ActionError> {
        let ticket = {
            let mut guard = self.inner.lock().await;
            let Some(post) = guard.posts.get(post_id).cloned() else {
                return Err(self.reject(Action::LoadComments, ActionError::UnknownPost(post_id)));
            };
            guard.selection.select(post)
        };
        self.emit(ViewEvent::SelectionChanged);
        self.load_comments_for(ticket).await
    }

    /// Reloads the thread for the current selection.
    pub async fn load_comments(&self) -> Result<(), ActionError> {
        let ticket = self.inner.lock().await.selection.ticket();
        let Some(ticket) = ticket else {
            return Err(self.reject(Action::LoadComments, ActionError::NoSelection));
        };
        self.load_comments_for(ticket).await
    }

    async fn load_comments_for(&self, ticket: SelectionTicket) -> Result<(), ActionError> {
        let result = self.api.list_comments(ticket.post_id).await;

        let mut guard = self.inner.lock().await;
        if !guard.selection.is_current(ticket) {
            debug!(
                post_id = ticket.post_id.0,
                generation = ticket.generation,
                "discarding comments for a superseded selection"
            );
            return Ok(());
        }
        match result {
            Ok(comments) => {
                debug!(post_id = ticket.post_id.0, count = comments.len(), "comments loaded");
                guard.thread.replace(ticket.post_id, comments);
                drop(guard);
                self.emit(ViewEvent::CommentsChanged);
                Ok(())
            }
            // The previous thread stays in place.
            Err(err) => {
                drop(guard);
                Err(self.fail(Action::LoadComments, err.into()))
            }
        }
    }

    pub async fn submit_comment(&self) -> Result<Comment, ActionError> {
        let (post_id, author_id, content) = {
            let guard = self.inner.lock().await;
            let Some(author_id) = guard.session.user_id() else {
                return Err(self.reject(Action::CreateComment, ActionError::NotLoggedIn));
            };
            let Some(post_id) = guard.selection.post_id() else {
                return Err(self.reject(Action::CreateComment, ActionError::NoSelection));
            };
            if guard.comment_draft.trim().is_empty() {
                return Err(self.reject(Action::CreateComment, ActionError::EmptyComment));
            }
            (post_id, author_id, guard.comment_draft.clone())
        };

        let comment = self
            .api
            .create_comment(post_id, &content, author_id)
            .await
            .map_err(|err| self.fail(Action::CreateComment, err.into()))?;

        // The thread only takes the comment when it is both selected and
        // loaded for the same post; a thread left over from a failed load
        // belongs to another post.
        let mut guard = self.inner.lock().await;
        let appended =
            guard.selection.post_id() == Some(post_id) && guard.thread.append(comment.clone());
        if !appended {
            debug!(
                post_id = post_id.0,
                "comment created for a post whose thread is not shown"
            );
        }
        guard.comment_draft.clear();
        drop(guard);

        info!(comment_id = comment.id.0, post_id = post_id.0, "comment created");
        if appended {
            self.emit(ViewEvent::CommentsChanged);
        }
        Ok(comment)
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
