#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod backup;
pub mod cache;
pub mod cached_rest;
pub mod indexed_db;
pub mod local_storage;
pub mod rest;
pub mod seed;
