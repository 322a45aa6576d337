//! Degree sign for the active character encoding.
//!
//! The unit text starts out as Latin-1 `"\xB0C"` and is converted to the
//! target codeset. When no converter exists for the codeset, or the
//! conversion fails, the ASCII text `'C` is used instead.

use core::fmt;

/// Capacity of the degree text buffer, in bytes.
pub const CAPACITY: usize = 5;

/// Degree sign followed by `C`, in ISO-8859-1.
const LATIN1_TEXT: &[u8] = b"\xB0C";

/// Text used when the degree sign cannot be encoded.
pub const FALLBACK: &[u8] = b"'C";

/// A conversion from ISO-8859-1 to some target encoding failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranscodeError {
    /// The input holds a character the target encoding lacks.
    Unrepresentable,
    /// The output buffer is too small.
    NoSpace,
}

/// Converts ISO-8859-1 text into a target encoding.
pub trait Transcoder {
    /// Encodes `latin1` into `out`, returning the number of bytes written.
    ///
    /// On error the contents of `out` are unspecified.
    fn transcode(&self, latin1: &[u8], out: &mut [u8]) -> Result<usize, TranscodeError>;
}

/// Character encodings the tool knows how to write.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Codeset {
    /// UTF-8; the degree sign takes two bytes.
    Utf8,
    /// ISO-8859-1 and ISO-8859-15; the degree sign is `0xB0`.
    Latin1,
    /// 7-bit ASCII, which has no degree sign.
    Ascii,
}

impl Codeset {
    /// Looks up a codeset by the name a locale reports for it, such as
    /// `UTF-8`, `ISO-8859-1` or `ANSI_X3.4-1968`.
    pub fn from_name(name: &str) -> Option<Codeset> {
        let mut normalized = [0u8; 16];
        let mut len = 0;
        for b in name.bytes().filter(|b| b.is_ascii_alphanumeric()) {
            *normalized.get_mut(len)? = b.to_ascii_lowercase();
            len += 1;
        }

        match &normalized[..len] {
            b"utf8" => Some(Codeset::Utf8),
            b"iso88591" | b"iso885915" | b"latin1" => Some(Codeset::Latin1),
            b"ansix341968" | b"usascii" | b"ascii" => Some(Codeset::Ascii),
            _ => None,
        }
    }
}

fn push(out: &mut [u8], len: &mut usize, b: u8) -> Result<(), TranscodeError> {
    *out.get_mut(*len).ok_or(TranscodeError::NoSpace)? = b;
    *len += 1;
    Ok(())
}

impl Transcoder for Codeset {
    fn transcode(&self, latin1: &[u8], out: &mut [u8]) -> Result<usize, TranscodeError> {
        let mut len = 0;
        for &b in latin1 {
            match self {
                Codeset::Latin1 => push(out, &mut len, b)?,
                Codeset::Ascii if b.is_ascii() => push(out, &mut len, b)?,
                Codeset::Ascii => return Err(TranscodeError::Unrepresentable),
                Codeset::Utf8 => {
                    let mut utf8 = [0; 2];
                    for &u in char::from(b).encode_utf8(&mut utf8).as_bytes() {
                        push(out, &mut len, u)?;
                    }
                }
            }
        }
        Ok(len)
    }
}

/// The unit text printed after a temperature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DegreeSymbol {
    buf: [u8; CAPACITY],
    len: usize,
}

impl DegreeSymbol {
    /// The ASCII fallback text.
    pub fn fallback() -> Self {
        let mut buf = [0; CAPACITY];
        buf[..FALLBACK.len()].copy_from_slice(FALLBACK);
        DegreeSymbol {
            buf,
            len: FALLBACK.len(),
        }
    }

    /// Converts the degree text with `transcoder`, or falls back when there is
    /// no transcoder or the conversion fails.
    pub fn new<T: Transcoder + ?Sized>(transcoder: Option<&T>) -> Self {
        let Some(transcoder) = transcoder else {
            return Self::fallback();
        };

        let mut buf = [0; CAPACITY];
        match transcoder.transcode(LATIN1_TEXT, &mut buf) {
            Ok(len) if len <= CAPACITY => DegreeSymbol { buf, len },
            _ => Self::fallback(),
        }
    }

    /// Degree text for the codeset named `name`.
    pub fn for_codeset(name: &str) -> Self {
        Self::new(Codeset::from_name(name).as_ref())
    }

    /// The encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

impl Default for DegreeSymbol {
    fn default() -> Self {
        Self::fallback()
    }
}

impl fmt::Debug for DegreeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DegreeSymbol({:02x?})", self.as_bytes())
    }
}
