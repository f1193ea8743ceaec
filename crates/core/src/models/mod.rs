pub mod calendar;
pub mod journal;
pub mod record;
pub mod settings;
pub mod share;
pub mod stats;
