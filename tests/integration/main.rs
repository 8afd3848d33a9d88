//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the engine against the
//! recording mocks in `mock_hw`.  All tests run on the host with no real
//! hardware required.

mod engine_tests;
