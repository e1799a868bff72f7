//! different utility modules used throughout the project
/// tiny module to save solution into csv files
pub mod logger;
/// simplelog setup
pub mod log_setup;
/// tiny module to plot temperature profiles
pub mod plots;
/// parse document with structure like " title1 key1: value1, value2 key2: value2 title2 key3:value3, value4"
pub mod task_parser;
///
mod task_parser_tests;
