pub mod calendar_service;
pub mod journal_service;
pub mod stats_service;
