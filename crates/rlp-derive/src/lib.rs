//! Derive macros for the `ethrlp` RLP codec.
//!
//! See the `ethrlp` crate documentation for the encoding rules and the
//! `#[rlp(...)]` field attributes.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod de;
mod en;
mod utils;

/// Derives `Encodable` for a struct, encoding it as the RLP list of its
/// fields in declaration order.
///
/// Field behavior is adjusted with `#[rlp(...)]` attributes: `skip`,
/// `optional`, `tail`, `nil`, `nil_string`, `nil_list`.
#[proc_macro_derive(RlpEncodable, attributes(rlp))]
pub fn rlp_encodable(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    en::impl_encodable(&ast).unwrap_or_else(|err| err.to_compile_error()).into()
}

/// Derives `Decodable` for a struct, decoding it from the RLP list of its
/// fields in declaration order.
///
/// Accepts the same `#[rlp(...)]` field attributes as [`RlpEncodable`].
#[proc_macro_derive(RlpDecodable, attributes(rlp))]
pub fn rlp_decodable(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    de::impl_decodable(&ast).unwrap_or_else(|err| err.to_compile_error()).into()
}

/// Derives `Encodable` for a single-field struct, forwarding to the field
/// without list framing.
#[proc_macro_derive(RlpEncodableWrapper)]
pub fn rlp_encodable_wrapper(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    en::impl_encodable_wrapper(&ast).unwrap_or_else(|err| err.to_compile_error()).into()
}

/// Derives `Decodable` for a single-field struct, forwarding to the field
/// without list framing.
#[proc_macro_derive(RlpDecodableWrapper)]
pub fn rlp_decodable_wrapper(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    de::impl_decodable_wrapper(&ast).unwrap_or_else(|err| err.to_compile_error()).into()
}
