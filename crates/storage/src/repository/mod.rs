pub mod catch;
pub mod event;
pub mod participation;
pub mod rating;
pub mod results;
pub mod team;
pub mod user;
