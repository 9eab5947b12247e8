pub mod auth_controller;
pub mod home_controller;
pub mod indices_controller;
pub mod thresholds_controller;
