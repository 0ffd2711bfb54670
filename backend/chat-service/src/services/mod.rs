pub mod group_service;
pub mod member_service;
pub mod message_service;
pub mod presence_service;
pub mod read_state_service;
pub mod schedule_service;
pub mod storage;
pub mod typing_service;
