pub mod conversation;
pub mod group;
pub mod member;
pub mod message;
pub mod schedule;
