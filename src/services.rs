pub mod live_update_listener;
pub mod push_packet;
pub mod user_lookup_service;
