pub mod books;
pub mod catalog;
pub mod children;
pub mod health;
pub mod progress;
pub mod responses;

use crate::error::Error;

pub async fn not_found() -> Error {
    Error::NotFound("Not found".to_string())
}

pub async fn method_not_allowed() -> Error {
    Error::MethodNotAllowed
}
