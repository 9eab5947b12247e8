pub mod db_init;
pub mod polygon;
pub mod twelvedata;

pub mod alert_scheduler;
pub mod auth_service;
pub mod mailer;
pub mod threshold_service;
pub mod user_service;
