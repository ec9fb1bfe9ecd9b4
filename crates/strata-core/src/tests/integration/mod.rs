#![cfg(test)]

pub mod concurrency_tests;
pub mod cross_module_tests;
pub mod lifecycle_tests;
pub mod memo_repo_tests;
pub mod request_tests;
