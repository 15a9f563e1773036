pub mod booking;
pub mod conversation;
