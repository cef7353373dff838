use alloc::string::String;

use crate::YAML_TAG_PREFIX;

/// The token structure.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    /// The start of a document, explicit (`---`) or implicit.
    StartDocument,
    /// The end of a document.
    EndDocument,
    /// The start of a mapping carrying an explicit tag.
    StartObject(TagType),
    /// The start of an untagged mapping.
    SimpleStartObject,
    /// The end of a mapping.
    EndObject,
    /// The start of a sequence carrying an explicit tag.
    StartArray(TagType),
    /// The start of an untagged sequence.
    SimpleStartArray,
    /// The end of a sequence.
    EndArray,
    /// A scalar mapping key. `None` for an empty key.
    FieldName(Option<String>),
    /// The merge key `<<`.
    MergeFieldName,
    /// The start of a key that is itself a collection.
    StartComplexFieldName,
    /// The end of a complex key.
    EndComplexFieldName,
    /// A scalar value.
    Value(ScalarValue, ValueType),
}

impl Token {
    /// Whether this token opens an object or an array.
    pub fn is_start(&self) -> bool {
        matches!(
            self,
            Token::StartObject(_)
                | Token::SimpleStartObject
                | Token::StartArray(_)
                | Token::SimpleStartArray
        )
    }

    /// Whether this token closes an object or an array.
    pub fn is_end(&self) -> bool {
        matches!(self, Token::EndObject | Token::EndArray)
    }

    pub(crate) fn start_object(tag: Option<TagType>) -> Token {
        tag.map_or(Token::SimpleStartObject, Token::StartObject)
    }

    pub(crate) fn start_array(tag: Option<TagType>) -> Token {
        tag.map_or(Token::SimpleStartArray, Token::StartArray)
    }

    pub(crate) fn null() -> Token {
        Token::Value(ScalarValue::Null, ValueType::Null)
    }
}

/// A typed scalar.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ScalarValue {
    /// Render the value back to text, as used when a value becomes a key.
    pub fn to_text(&self) -> Option<String> {
        match self {
            ScalarValue::Null => None,
            ScalarValue::Bool(value) => Some(value.to_string()),
            ScalarValue::Int(value) => Some(value.to_string()),
            ScalarValue::Float(value) => Some(value.to_string()),
            ScalarValue::String(value) => Some(value.clone()),
        }
    }
}

/// The kind of a [`Token::Value`].
#[derive(Clone, Debug, PartialEq)]
pub enum ValueType {
    Null,
    Bool,
    Int,
    Float,
    String,
    /// A value carrying a tag the tokenizer does not interpret. The value is
    /// passed through as a string.
    Tagged(TagType),
}

/// A resolved tag.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TagType {
    /// One of the `tag:yaml.org,2002:` types.
    Core(CoreTag),
    /// The non-specific tag `!`.
    NonSpecific,
    /// A semantic type returned by the [`TagResolver`].
    Resolved(String),
    /// A tag nobody claimed, kept as prefix and name.
    Generic { prefix: String, name: String },
}

impl TagType {
    pub(crate) fn from_parts(prefix: &str, name: &str, resolver: Option<&dyn TagResolver>) -> Self {
        if prefix == YAML_TAG_PREFIX {
            if let Some(core) = CoreTag::from_name(name) {
                return TagType::Core(core);
            }
        }
        if let Some(resolved) = resolver.and_then(|resolver| resolver.resolve_tag(prefix, name)) {
            return TagType::Resolved(resolved);
        }
        TagType::Generic {
            prefix: String::from(prefix),
            name: String::from(name),
        }
    }
}

/// The tags of the YAML core and type repository schemas.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CoreTag {
    Str,
    Int,
    Float,
    Bool,
    Null,
    Binary,
    Timestamp,
    Map,
    Seq,
    Set,
    Omap,
    Pairs,
    Merge,
}

impl CoreTag {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "str" => CoreTag::Str,
            "int" => CoreTag::Int,
            "float" => CoreTag::Float,
            "bool" => CoreTag::Bool,
            "null" => CoreTag::Null,
            "binary" => CoreTag::Binary,
            "timestamp" => CoreTag::Timestamp,
            "map" => CoreTag::Map,
            "seq" => CoreTag::Seq,
            "set" => CoreTag::Set,
            "omap" => CoreTag::Omap,
            "pairs" => CoreTag::Pairs,
            "merge" => CoreTag::Merge,
            _ => return None,
        })
    }

    /// The tag name below `tag:yaml.org,2002:`.
    pub fn name(self) -> &'static str {
        match self {
            CoreTag::Str => "str",
            CoreTag::Int => "int",
            CoreTag::Float => "float",
            CoreTag::Bool => "bool",
            CoreTag::Null => "null",
            CoreTag::Binary => "binary",
            CoreTag::Timestamp => "timestamp",
            CoreTag::Map => "map",
            CoreTag::Seq => "seq",
            CoreTag::Set => "set",
            CoreTag::Omap => "omap",
            CoreTag::Pairs => "pairs",
            CoreTag::Merge => "merge",
        }
    }
}

/// Maps a tag prefix and name to a semantic type of the embedding system.
///
/// `prefix` is the expanded handle, e.g. `tag:custom,2018:` for a handle
/// registered with `%TAG !c! tag:custom,2018:`, or `!` for local tags.
pub trait TagResolver {
    fn resolve_tag(&self, prefix: &str, name: &str) -> Option<String>;
}

impl<F> TagResolver for F
where
    F: Fn(&str, &str) -> Option<String>,
{
    fn resolve_tag(&self, prefix: &str, name: &str) -> Option<String> {
        self(prefix, name)
    }
}
