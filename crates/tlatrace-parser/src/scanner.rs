//! Depth-aware scanning over value literals.
//!
//! All positions are byte offsets. Every delimiter and separator is ASCII, so
//! any position returned here is a valid `str` boundary.

use crate::error::DecodeError;

/// Bracket pair that opens a composite value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// `{ ... }`
    Set,
    /// `<< ... >>`
    Seq,
    /// `[ ... ]`
    Record,
    /// `( ... )`
    Function,
}

impl Delimiter {
    pub const ALL: [Delimiter; 4] = [
        Delimiter::Set,
        Delimiter::Seq,
        Delimiter::Record,
        Delimiter::Function,
    ];

    pub fn open(self) -> &'static str {
        match self {
            Delimiter::Set => "{",
            Delimiter::Seq => "<<",
            Delimiter::Record => "[",
            Delimiter::Function => "(",
        }
    }

    pub fn close(self) -> &'static str {
        match self {
            Delimiter::Set => "}",
            Delimiter::Seq => ">>",
            Delimiter::Record => "]",
            Delimiter::Function => ")",
        }
    }

    /// Delimiter whose opening token starts `src`
    pub fn opens(src: &[u8]) -> Option<Delimiter> {
        Self::ALL
            .into_iter()
            .find(|d| src.starts_with(d.open().as_bytes()))
    }

    /// Delimiter whose closing token starts `src`
    pub fn closes(src: &[u8]) -> Option<Delimiter> {
        Self::ALL
            .into_iter()
            .find(|d| src.starts_with(d.close().as_bytes()))
    }
}

/// Skip a quoted string starting at `start`; returns the position after the closing quote.
pub(crate) fn skip_string(src: &[u8], start: usize) -> Result<usize, DecodeError> {
    let mut pos = start + 1;
    loop {
        match src.get(pos) {
            None => return Err(DecodeError::UnterminatedString { offset: start }),
            Some(b'\\') => pos += 2,
            Some(b'"') => return Ok(pos + 1),
            Some(_) => pos += 1,
        }
    }
}

/// Position just after the close matching the `open` delimiter at `start`.
pub(crate) fn find_close(src: &[u8], start: usize, open: Delimiter) -> Result<usize, DecodeError> {
    let mut stack = vec![(open, start)];
    let mut pos = start + open.open().len();

    while let Some(&(top, at)) = stack.last() {
        let Some(&byte) = src.get(pos) else {
            return Err(DecodeError::Unmatched {
                open: top.open(),
                offset: at,
            });
        };
        if byte == b'"' {
            pos = skip_string(src, pos)?;
            continue;
        }

        let rest = &src[pos..];
        if let Some(inner) = Delimiter::opens(rest) {
            stack.push((inner, pos));
            pos += inner.open().len();
        } else if let Some(close) = Delimiter::closes(rest) {
            if close != top {
                return Err(DecodeError::Mismatched {
                    expected: top.close(),
                    found: close.close(),
                    offset: pos,
                });
            }
            stack.pop();
            pos += close.close().len();
        } else {
            pos += 1;
        }
    }

    Ok(pos)
}

/// Advance past one depth-0 unit: a string, a whole nested group, or a single byte.
fn step(src: &[u8], pos: usize) -> Result<usize, DecodeError> {
    let rest = &src[pos..];
    if rest.first() == Some(&b'"') {
        return skip_string(src, pos);
    }
    if let Some(open) = Delimiter::opens(rest) {
        return find_close(src, pos, open);
    }
    if let Some(close) = Delimiter::closes(rest) {
        return Err(DecodeError::UnexpectedClose {
            close: close.close(),
            offset: pos,
        });
    }
    Ok(pos + 1)
}

/// First depth-0 occurrence of `pat` at or after `from`.
pub(crate) fn find_top_level(src: &str, from: usize, pat: &str) -> Result<Option<usize>, DecodeError> {
    let bytes = src.as_bytes();
    let mut pos = from;
    while pos < bytes.len() {
        if bytes[pos..].starts_with(pat.as_bytes()) {
            return Ok(Some(pos));
        }
        pos = step(bytes, pos)?;
    }
    Ok(None)
}

/// Split at every depth-0 `sep`. Each piece comes with its offset in `src`.
pub(crate) fn split_top_level<'s>(src: &'s str, sep: &str) -> Result<Vec<(usize, &'s str)>, DecodeError> {
    let mut pieces = Vec::new();
    let mut begin = 0;
    while let Some(at) = find_top_level(src, begin, sep)? {
        pieces.push((begin, &src[begin..at]));
        begin = at + sep.len();
    }
    pieces.push((begin, &src[begin..]));
    Ok(pieces)
}
