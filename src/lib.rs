#![doc = include_str!("../README.md")]
#![warn(clippy::pedantic)]
#![allow(
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::fn_params_excessive_bools,
    clippy::manual_range_contains,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::struct_excessive_bools,
    clippy::too_many_arguments,
    clippy::too_many_lines,
    clippy::unnecessary_wraps,
    clippy::match_wildcard_for_single_variants
)]
#![deny(unsafe_code)]

extern crate alloc;

mod chars;
mod error;
mod readers;
mod resolve;
mod source;
mod state;
mod token;
mod yaml_reader;

pub use crate::error::*;
pub use crate::resolve::*;
pub use crate::source::*;
pub use crate::token::*;
pub use crate::yaml_reader::*;

/// The prefix the secondary handle `!!` expands to.
pub const YAML_TAG_PREFIX: &str = "tag:yaml.org,2002:";

/// The tag `!!null` with the only possible value: `null`.
pub const NULL_TAG: &str = "tag:yaml.org,2002:null";
/// The tag `!!bool` with the values: `true` and `false`.
pub const BOOL_TAG: &str = "tag:yaml.org,2002:bool";
/// The tag `!!str` for string values.
pub const STR_TAG: &str = "tag:yaml.org,2002:str";
/// The tag `!!int` for integer values.
pub const INT_TAG: &str = "tag:yaml.org,2002:int";
/// The tag `!!float` for float values.
pub const FLOAT_TAG: &str = "tag:yaml.org,2002:float";
/// The tag `!!timestamp` for date and time values.
pub const TIMESTAMP_TAG: &str = "tag:yaml.org,2002:timestamp";
/// The tag `!!binary` for base64 encoded data.
pub const BINARY_TAG: &str = "tag:yaml.org,2002:binary";
/// The tag `!!merge` of the `<<` key.
pub const MERGE_TAG: &str = "tag:yaml.org,2002:merge";

/// The tag `!!seq` is used to denote sequences.
pub const SEQ_TAG: &str = "tag:yaml.org,2002:seq";
/// The tag `!!map` is used to denote mapping.
pub const MAP_TAG: &str = "tag:yaml.org,2002:map";
/// The tag `!!set` for mappings with null values.
pub const SET_TAG: &str = "tag:yaml.org,2002:set";
/// The tag `!!omap` for ordered mappings.
pub const OMAP_TAG: &str = "tag:yaml.org,2002:omap";
/// The tag `!!pairs` for sequences of key/value pairs.
pub const PAIRS_TAG: &str = "tag:yaml.org,2002:pairs";

/// The pointer position.
#[derive(Copy, Clone, Default, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Mark {
    /// The position index, in characters.
    pub index: u64,
    /// The position line.
    pub line: u64,
    /// The position column.
    pub column: usize,
}

/// The version directive data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct VersionDirective {
    /// The major version number.
    pub major: u32,
    /// The minor version number.
    pub minor: u32,
}

/// Limits applied while tokenizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Maximum number of collections open at the same time.
    pub max_depth: usize,
    /// Maximum number of tokens replayed from aliases over the whole stream.
    pub max_alias_tokens: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        ReaderOptions {
            max_depth: 256,
            max_alias_tokens: 1_000_000,
        }
    }
}
