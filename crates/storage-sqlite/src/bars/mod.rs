mod model;
mod repository;

pub use model::BarDB;
pub use repository::BarRepository;
