pub mod participation;
pub mod rating;
pub mod results;
