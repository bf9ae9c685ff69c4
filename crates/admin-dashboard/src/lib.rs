#![warn(unused_crate_dependencies)]

mod warning_suppress {
    // Only used in binary and triggers unused warning
    use tokio as _;

    // Only used in integration tests
    #[cfg(test)]
    use admin_test_helper as _;
    #[cfg(test)]
    use uuid as _;
}

pub mod cli;
pub mod commands;
pub mod render;
pub mod tracing;
