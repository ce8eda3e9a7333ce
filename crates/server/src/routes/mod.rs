pub mod health;
pub mod page;
pub mod position;
pub mod screen_ws;
