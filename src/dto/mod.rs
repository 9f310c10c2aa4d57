pub mod catalog_dto;
pub mod child_dto;
pub mod progress_dto;
pub mod response_dto;
