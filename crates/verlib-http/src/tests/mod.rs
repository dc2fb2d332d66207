//! Test modules for the verlib-http crate
