pub mod ask;
pub mod chat;
pub mod conversations;
pub mod models;
pub mod shared;
