mod support;

mod listing_tests;
mod trust_tests;
