//! Terminal presentation: text charts, views and the chat loop.
pub mod charts;
pub mod chat;
pub mod format;
pub mod views;
