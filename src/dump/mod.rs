// src/dump/mod.rs

//! Parsing of `aapt dump badging` output
//!
//! The badging dump is a newline-delimited `key: value` report. Values carry
//! single-quoted tokens, either as a bare list (`sdkVersion:'21'`) or as
//! `name='value'` pairs (`package: name='com.example' versionCode='1'`).
//! This module turns that text into a key -> [`ParsedValue`] mapping.

pub mod parser;
pub mod value;

pub use parser::{DISALLOWED_DUPLICATE_TAGS, ParsedDump, parse};
pub use value::ParsedValue;
