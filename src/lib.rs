pub mod api_football;
pub mod feed;
pub mod formation;
pub mod http_cache;
pub mod http_client;
pub mod normalizers;
pub mod pitch_layout;
pub mod pitch_view;
pub mod position_map;
pub mod state;
