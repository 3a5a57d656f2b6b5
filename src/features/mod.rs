//! Feature slices. Only the auth slice lives in this crate; the learning views
//! (daily words, chat, stories, achievements) consume it from the UI layer.

pub mod auth;
