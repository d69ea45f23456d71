#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod error;
pub use error::{DecodeError, Error, Result};

mod header;
pub use header::{Kind, EMPTY_LIST_CODE, EMPTY_STRING_CODE};

mod raw;
pub use raw::{
    append_uint64, bytes_size, count_values, int_size, list_size, split, split_list, split_string,
    split_uint64, string_size, ListIterator, RawValue,
};

mod pool;

mod buffer;
pub use buffer::{EncodeBuffer, EncodeReader};

mod stream;
pub use stream::Stream;

mod encode;
pub use encode::{encode, encode_iter, encode_list, encode_to_bytes, encode_to_reader, Encodable};

mod decode;
pub use decode::{decode, decode_from_bytes, Decodable};

mod value;
pub use value::Value;

#[doc(no_inline)]
pub use bytes::{self, Buf, BufMut, Bytes, BytesMut};
#[doc(no_inline)]
pub use ethnum::{self, U256};
#[doc(no_inline)]
pub use num_bigint::{self, BigUint};

#[cfg(feature = "derive")]
#[doc(inline)]
pub use ethrlp_derive::{RlpDecodable, RlpDecodableWrapper, RlpEncodable, RlpEncodableWrapper};

// Not public API.
#[doc(hidden)]
pub mod private {
    pub use core::{
        default::Default,
        option::Option::{self, None, Some},
        result::Result::{self, Err, Ok},
    };
}
