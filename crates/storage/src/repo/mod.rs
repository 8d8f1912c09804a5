mod comments;
mod likes;
mod posts;
mod threads;
mod users;

pub use comments::ThreadPage;
