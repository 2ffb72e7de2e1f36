//! Application services - orchestration of the domain over the ports.

mod forum;

pub use forum::{CommentAppend, ForumService};
