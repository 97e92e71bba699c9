pub mod grader;
pub mod handlers;
pub mod routes;
pub mod service;
