//! Integration test harness; tests run against a live server.

mod api_tests;
