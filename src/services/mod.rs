pub mod chart_service;
pub mod fetch_service;
pub mod session_service;
