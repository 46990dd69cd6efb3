pub mod aws;
pub mod dynamodb;
pub mod error;
pub mod export;
pub mod navigation;
pub mod pagination;
