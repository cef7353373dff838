#![warn(clippy::pedantic)]
#![allow(clippy::let_underscore_untyped, clippy::missing_errors_doc)]

use std::env;
use std::error::Error;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::process::ExitCode;

use yaml_token_reader::{ScalarValue, TagType, Token, ValueType, YamlReader};

fn tag_text(tag: &TagType) -> String {
    match tag {
        TagType::Core(core) => format!("<tag:yaml.org,2002:{}>", core.name()),
        TagType::NonSpecific => String::from("<!>"),
        TagType::Resolved(name) => format!("<{name}>"),
        TagType::Generic { prefix, name } => format!("<{prefix}{name}>"),
    }
}

fn escaped(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            '\x08' => out.push_str("\\b"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

fn token_line(token: &Token) -> String {
    let mut line = String::new();
    match token {
        Token::StartDocument => line.push_str("+DOC"),
        Token::EndDocument => line.push_str("-DOC"),
        Token::StartObject(tag) => {
            let _ = write!(line, "+MAP {}", tag_text(tag));
        }
        Token::SimpleStartObject => line.push_str("+MAP"),
        Token::EndObject => line.push_str("-MAP"),
        Token::StartArray(tag) => {
            let _ = write!(line, "+SEQ {}", tag_text(tag));
        }
        Token::SimpleStartArray => line.push_str("+SEQ"),
        Token::EndArray => line.push_str("-SEQ"),
        Token::FieldName(Some(name)) => {
            let _ = write!(line, "=KEY :{}", escaped(name));
        }
        Token::FieldName(None) => line.push_str("=KEY ~"),
        Token::MergeFieldName => line.push_str("=MERGE"),
        Token::StartComplexFieldName => line.push_str("+KEY"),
        Token::EndComplexFieldName => line.push_str("-KEY"),
        Token::Value(value, value_type) => {
            line.push_str("=VAL ");
            if let ValueType::Tagged(tag) = value_type {
                line.push_str(&tag_text(tag));
                line.push(' ');
            }
            match value {
                ScalarValue::Null => line.push('~'),
                ScalarValue::Bool(value) => {
                    let _ = write!(line, "!bool {value}");
                }
                ScalarValue::Int(value) => {
                    let _ = write!(line, "!int {value}");
                }
                ScalarValue::Float(value) => {
                    let _ = write!(line, "!float {value}");
                }
                ScalarValue::String(value) => {
                    let _ = write!(line, ":{}", escaped(value));
                }
            }
        }
    }
    line
}

fn dump(input: impl BufRead, stdout: &mut dyn Write) -> Result<(), Box<dyn Error>> {
    for token in YamlReader::from_read(input) {
        writeln!(stdout, "{}", token_line(&token?))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<_> = env::args_os().skip(1).collect();
    let mut stdout = io::stdout().lock();
    let result = if args.is_empty() {
        dump(io::stdin().lock(), &mut stdout)
    } else {
        args.iter().try_for_each(|arg| {
            let file = File::open(arg)?;
            dump(BufReader::new(file), &mut stdout)
        })
    };
    if let Err(err) = result {
        let _ = writeln!(io::stderr(), "{err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
