use crate::buffer::EncodeBuffer;
use crate::{encode_list, Decodable, Encodable, Kind, Result, Stream};

/// A dynamically typed RLP value.
///
/// The wire carries no type information beyond string-vs-list, so this is
/// the most faithful view of arbitrary input: every value is either a byte
/// string or a list of further values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    /// A byte string. Single-byte values are byte strings of length one.
    Bytes(Vec<u8>),
    /// A list of values.
    List(Vec<Value>),
}

impl Default for Value {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Value {
    /// The byte string contents, if this is a string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            Self::List(_) => None,
        }
    }

    /// The list elements, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::Bytes(_) => None,
            Self::List(items) => Some(items),
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Bytes(b.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

impl Encodable for Value {
    fn encode(&self, out: &mut EncodeBuffer) {
        match self {
            Self::Bytes(b) => out.write_bytes(b),
            Self::List(items) => encode_list(items, out),
        }
    }
}

impl Decodable for Value {
    fn decode(s: &mut Stream<'_>) -> Result<Self> {
        let (kind, _) = s.kind()?;
        if kind == Kind::List {
            Vec::<Value>::decode(s).map(Self::List)
        } else {
            s.bytes().map(Self::Bytes)
        }
    }
}
