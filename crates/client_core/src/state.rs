//! State slices owned by the orchestrator. None of these perform I/O; the
//! orchestrator applies service results to them after each call resolves.

use shared::domain::{Comment, Post, PostId, User, UserId};

#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|user| user.id)
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn sign_in(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn sign_out(&mut self) -> Option<User> {
        self.user.take()
    }

    /// Only a post's author may delete it.
    pub fn may_delete(&self, post: &Post) -> bool {
        self.user_id() == Some(post.author_id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostCollection {
    posts: Vec<Post>,
    loading: bool,
    load_failed: bool,
    load_generation: u64,
}

/// Identifies a posts load; only the most recent one may settle the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl PostCollection {
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn get(&self, post_id: PostId) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == post_id)
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_generation += 1;
        self.loading = true;
        LoadTicket(self.load_generation)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.load_generation
    }

    /// Returns `false` and leaves the collection alone when a newer load
    /// has started since `ticket` was issued.
    pub fn finish_load(&mut self, ticket: LoadTicket, posts: Vec<Post>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.posts = posts;
        self.loading = false;
        self.load_failed = false;
        true
    }

    pub fn fail_load(&mut self, ticket: LoadTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.posts.clear();
        self.loading = false;
        self.load_failed = true;
        true
    }

    /// Newest first.
    pub fn prepend(&mut self, post: Post) {
        self.posts.insert(0, post);
    }

    pub fn remove(&mut self, post_id: PostId) -> Option<Post> {
        let index = self.posts.iter().position(|post| post.id == post_id)?;
        Some(self.posts.remove(index))
    }
}

/// Identifies the selection a comment request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionTicket {
    pub post_id: PostId,
    pub generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    post: Option<Post>,
    generation: u64,
}

impl Selection {
    pub fn post(&self) -> Option<&Post> {
        self.post.as_ref()
    }

    pub fn post_id(&self) -> Option<PostId> {
        self.post.as_ref().map(|post| post.id)
    }

    pub fn select(&mut self, post: Post) -> SelectionTicket {
        self.generation += 1;
        let ticket = SelectionTicket {
            post_id: post.id,
            generation: self.generation,
        };
        self.post = Some(post);
        ticket
    }

    pub fn clear(&mut self) {
        self.generation += 1;
        self.post = None;
    }

    pub fn ticket(&self) -> Option<SelectionTicket> {
        self.post_id().map(|post_id| SelectionTicket {
            post_id,
            generation: self.generation,
        })
    }

    pub fn is_current(&self, ticket: SelectionTicket) -> bool {
        self.ticket() == Some(ticket)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommentThread {
    post_id: Option<PostId>,
    comments: Vec<Comment>,
}

impl CommentThread {
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// The post whose comments were last loaded into the thread.
    pub fn post_id(&self) -> Option<PostId> {
        self.post_id
    }

    pub fn replace(&mut self, post_id: PostId, comments: Vec<Comment>) {
        self.post_id = Some(post_id);
        self.comments = comments;
    }

    /// Arrival order. A comment for any post other than the one the thread
    /// holds is refused.
    pub fn append(&mut self, comment: Comment) -> bool {
        if self.post_id != Some(comment.post_id) {
            return false;
        }
        self.comments.push(comment);
        true
    }

    pub fn clear(&mut self) {
        self.post_id = None;
        self.comments.clear();
    }
}
