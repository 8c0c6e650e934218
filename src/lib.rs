pub mod aggregate;
pub mod app;
pub mod calories;
pub mod client;
pub mod config;
pub mod meal_log;
pub mod models;
pub mod nutrients;
pub mod store;

pub use app::DietApp;
pub use client::{GeminiLabelClient, LabelRecognizer, RecognitionError};
pub use meal_log::MealLogs;
pub use models::*;
