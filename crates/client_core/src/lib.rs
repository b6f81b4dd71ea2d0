pub mod api;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use api::{BlogApi, HttpBlogClient, ServiceEndpoints};
pub use error::{ActionError, EndpointError, RequestFailure, ServiceError};
pub use orchestrator::{
    Action, BlogOrchestrator, LoginForm, Modal, PostForm, PostView, RegisterForm, ViewEvent,
    ViewState, POSTS_UNAVAILABLE_BANNER,
};
