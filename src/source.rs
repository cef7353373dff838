use std::io::BufRead;

use alloc::collections::VecDeque;

use crate::SourceError;

/// A pull source of characters.
///
/// `Ok(None)` signals the end of input. The tokenizer treats it as a normal
/// end condition and closes whatever construct is open.
pub trait CharSource {
    fn next_char(&mut self) -> Result<Option<char>, SourceError>;
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    fn next_char(&mut self) -> Result<Option<char>, SourceError> {
        (**self).next_char()
    }
}

impl<S: CharSource + ?Sized> CharSource for Box<S> {
    fn next_char(&mut self) -> Result<Option<char>, SourceError> {
        (**self).next_char()
    }
}

/// Characters of an in-memory string.
pub struct StrSource<'a> {
    chars: core::str::Chars<'a>,
}

impl<'a> StrSource<'a> {
    pub fn new(input: &'a str) -> Self {
        StrSource {
            chars: input.chars(),
        }
    }
}

impl CharSource for StrSource<'_> {
    fn next_char(&mut self) -> Result<Option<char>, SourceError> {
        Ok(self.chars.next())
    }
}

/// Adapts a caller-supplied pull function.
pub struct FnSource<F>(pub F);

impl<F> CharSource for FnSource<F>
where
    F: FnMut() -> Option<char>,
{
    fn next_char(&mut self) -> Result<Option<char>, SourceError> {
        Ok((self.0)())
    }
}

/// UTF-8 characters decoded from a buffered reader.
pub struct ReadSource<R> {
    reader: R,
    decoded: VecDeque<char>,
    offset: usize,
    eof: bool,
}

impl<R: BufRead> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        ReadSource {
            reader,
            decoded: VecDeque::new(),
            offset: 0,
            eof: false,
        }
    }
}

impl<R: BufRead> CharSource for ReadSource<R> {
    fn next_char(&mut self) -> Result<Option<char>, SourceError> {
        while self.decoded.is_empty() && !self.eof {
            if !read_utf8_buffered(&mut self.reader, &mut self.decoded, &mut self.offset)? {
                self.eof = true;
            }
        }
        Ok(self.decoded.pop_front())
    }
}

fn read_utf8_buffered(
    reader: &mut dyn BufRead,
    out: &mut VecDeque<char>,
    offset: &mut usize,
) -> Result<bool, SourceError> {
    let available = loop {
        match reader.fill_buf() {
            Ok([]) => return Ok(false),
            Ok(available) => break available,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    };

    match core::str::from_utf8(available) {
        Ok(valid) => {
            let used = valid.len();
            for ch in valid.chars() {
                push_char(out, ch, *offset)?;
                *offset += ch.len_utf8();
            }
            reader.consume(used);
            Ok(true)
        }
        Err(err) => {
            let valid_bytes = err.valid_up_to();
            let Ok(valid) = core::str::from_utf8(&available[..valid_bytes]) else {
                return Err(SourceError::InvalidUtf8 {
                    value: available[0],
                });
            };
            for ch in valid.chars() {
                push_char(out, ch, *offset)?;
                *offset += ch.len_utf8();
            }

            if err.error_len().is_some() {
                return Err(SourceError::InvalidUtf8 {
                    value: available[valid_bytes],
                });
            }
            if valid_bytes != 0 {
                // The tail is an incomplete sequence; leave it for the next
                // call.
                reader.consume(valid_bytes);
            } else {
                let initial = available[0];
                read_utf8_char_unbuffered(reader, out, initial, offset)?;
            }
            Ok(true)
        }
    }
}

fn read_utf8_char_unbuffered(
    reader: &mut dyn BufRead,
    out: &mut VecDeque<char>,
    initial: u8,
    offset: &mut usize,
) -> Result<(), SourceError> {
    let width = utf8_char_width(initial);
    if width == 0 {
        return Err(SourceError::InvalidUtf8 { value: initial });
    }
    let mut buffer = [0; 4];
    reader.read_exact(&mut buffer[..width])?;
    match core::str::from_utf8(&buffer[..width])
        .ok()
        .and_then(|valid| valid.chars().next())
    {
        Some(ch) => {
            push_char(out, ch, *offset)?;
            *offset += width;
            Ok(())
        }
        None => Err(SourceError::InvalidUtf8 { value: buffer[0] }),
    }
}

fn utf8_char_width(initial: u8) -> usize {
    if initial & 0x80 == 0 {
        1
    } else if initial & 0xE0 == 0xC0 {
        2
    } else if initial & 0xF0 == 0xE0 {
        3
    } else if initial & 0xF8 == 0xF0 {
        4
    } else {
        0
    }
}

fn push_char(out: &mut VecDeque<char>, ch: char, offset: usize) -> Result<(), SourceError> {
    if !(ch == '\x09'
        || ch == '\x0A'
        || ch == '\x0D'
        || ch >= '\x20' && ch <= '\x7E'
        || ch == '\u{0085}'
        || ch >= '\u{00A0}' && ch <= '\u{D7FF}'
        || ch >= '\u{E000}' && ch <= '\u{FFFD}'
        || ch >= '\u{10000}')
    {
        return Err(SourceError::ControlCharacter {
            offset,
            value: ch as u32,
        });
    }
    out.push_back(ch);
    Ok(())
}
