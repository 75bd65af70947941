//! Course Catalog Module
//! Mission: Courses, course materials and enrollments behind the auth layer

pub mod api;
pub mod models;
pub mod store;

pub use api::CatalogState;
pub use store::CatalogStore;
