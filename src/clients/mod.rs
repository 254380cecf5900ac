pub mod estate;

pub use estate::{EstateApi, EstateError, HttpEstateClient, Progress};
