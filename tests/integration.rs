//! Test driver: cargo only compiles top-level files under tests/, so the
//! suites in tests/integration/ are pulled in here.

mod integration {
    mod api_tests;
}
