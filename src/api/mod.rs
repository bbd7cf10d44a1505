pub mod client;

pub use client::{ApiResponse, MeliClient, DEFAULT_BASE_URL};
