pub mod database;
pub mod models;
pub mod repository;
pub mod seed;

pub use database::Database;
pub use models::{Category, NewsDraft, NewsItem, Viewpoint};
pub use repository::{new_id, Repository};
