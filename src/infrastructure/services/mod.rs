//! Infrastructure services

mod response_service;

pub use response_service::{Answer, AnswerSource, ResponseService, ResponseServiceConfig};
