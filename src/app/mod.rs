pub mod capture;
pub mod event;
pub mod input;
pub mod screen;
pub mod services;
