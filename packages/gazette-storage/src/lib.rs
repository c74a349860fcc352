pub mod index;
pub mod models;
pub mod qdrant;
pub mod schema;
pub mod store;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;
