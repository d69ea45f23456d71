use core::fmt;
use std::borrow::Cow;
use std::io;

/// RLP result type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// RLP error type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Clean end of input at a top-level value boundary.
    ///
    /// Returned instead of [`Error::UnexpectedEof`] when the input runs out
    /// before the first header byte of a top-level value, so callers looping
    /// over a stream of values can detect normal termination.
    Eof,
    /// Overran input while decoding.
    UnexpectedEof,
    /// The underlying reader failed.
    Io(io::ErrorKind),
    /// End of the current list reached. Used as a sentinel by list decoders.
    EndOfList,
    /// Expected String or Byte kind, got a list instead.
    ExpectedString,
    /// Expected List kind, got a string instead.
    ExpectedList,
    /// Integer payload has leading zero bytes, or zero was not the empty string.
    NonCanonicalInteger,
    /// Length field does not use the shortest representation.
    NonCanonicalSize,
    /// A value's declared size exceeds the remaining bytes of its list.
    ElementTooLarge,
    /// A value's declared size exceeds the input limit.
    ValueTooLarge,
    /// `decode_from_bytes` input contained trailing data after one value.
    MoreThanOneValue,
    /// A payload of a specific size was expected, but the value's size
    /// differs.
    UnexpectedLength,
    /// Integer payload is wider than the target type.
    UintOverflow,
    /// Integer payload is wider than 32 bytes.
    Uint256Overflow,
    /// `end_list` called outside of any list.
    NotInList,
    /// `end_list` called with data remaining in the current list.
    ListNotAtEol,
    /// Custom error.
    Custom(&'static str),
    /// Structured decode error with target type and field breadcrumbs.
    Decode(DecodeError),
}

impl Error {
    /// Converts grammar errors into a structured [`DecodeError`] naming the
    /// decode target. Errors that are not grammar-level pass through, as do
    /// errors that already carry a target.
    pub fn for_type(self, typ: &'static str) -> Self {
        let msg: &'static str = match self {
            Self::NonCanonicalInteger => "non-canonical integer (leading zero bytes)",
            Self::NonCanonicalSize => "non-canonical size information",
            Self::ExpectedList => "expected input list",
            Self::ExpectedString => "expected input string or byte",
            Self::UintOverflow => "input string too long",
            Self::ListNotAtEol => "input list has too many elements",
            other => return other,
        };
        Self::Decode(DecodeError::new(msg, typ))
    }

    /// Appends a breadcrumb (a `.field` or `[index]` token) to a structured
    /// decode error. Non-structured errors pass through unchanged.
    pub fn context<C: Into<String>>(self, ctx: C) -> Self {
        match self {
            Self::Decode(mut e) => {
                e.ctx.push(ctx.into());
                Self::Decode(e)
            }
            other => other,
        }
    }
}

impl From<DecodeError> for Error {
    #[inline]
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::UnexpectedEof => Self::UnexpectedEof,
            kind => Self::Io(kind),
        }
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eof => f.write_str("end of input"),
            Self::UnexpectedEof => f.write_str("unexpected end of input"),
            Self::Io(kind) => write!(f, "io error: {kind}"),
            Self::EndOfList => f.write_str("end of list"),
            Self::ExpectedString => f.write_str("expected String or Byte"),
            Self::ExpectedList => f.write_str("expected List"),
            Self::NonCanonicalInteger => f.write_str("non-canonical integer format"),
            Self::NonCanonicalSize => f.write_str("non-canonical size information"),
            Self::ElementTooLarge => f.write_str("element is larger than containing list"),
            Self::ValueTooLarge => f.write_str("value size exceeds available input length"),
            Self::MoreThanOneValue => f.write_str("input contains more than one value"),
            Self::UnexpectedLength => f.write_str("unexpected length"),
            Self::UintOverflow => f.write_str("uint overflow"),
            Self::Uint256Overflow => f.write_str("value too large for uint256"),
            Self::NotInList => f.write_str("end_list called outside of any list"),
            Self::ListNotAtEol => f.write_str("end_list called before end of list"),
            Self::Custom(err) => f.write_str(err),
            Self::Decode(err) => err.fmt(f),
        }
    }
}

/// A decode failure annotated with the target type and the path of struct
/// fields and list indices leading to the offending value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeError {
    msg: Cow<'static, str>,
    typ: &'static str,
    ctx: Vec<String>,
}

impl DecodeError {
    /// Creates a decode error for the given target type.
    pub fn new(msg: impl Into<Cow<'static, str>>, typ: &'static str) -> Self {
        Self { msg: msg.into(), typ, ctx: Vec::new() }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Name of the type the failing value was being decoded into.
    pub fn target_type(&self) -> &'static str {
        self.typ
    }
}

impl std::error::Error for DecodeError {}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for {}", self.msg, self.typ)?;
        if !self.ctx.is_empty() {
            f.write_str(", decoding into ")?;
            // Breadcrumbs are pushed innermost-first while the error bubbles
            // up; print them outermost-first.
            for c in self.ctx.iter().rev() {
                f.write_str(c)?;
            }
        }
        Ok(())
    }
}
