pub mod attempt_service;
pub mod catalog_service;
pub mod child_service;
pub mod grading_service;
pub mod progress_service;
