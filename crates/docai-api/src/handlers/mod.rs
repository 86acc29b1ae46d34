pub mod download;
pub mod health;
pub mod index;
pub mod status;
pub mod upload;
