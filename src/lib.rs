pub mod config;
pub mod domain;
pub mod repository;
pub mod routes;
pub mod service;
pub mod startup;
pub mod telemetry;
pub mod trace;
