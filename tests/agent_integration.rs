//! End-to-end tests: HTTP mock server → client → pipeline → emissions.

mod integration;
