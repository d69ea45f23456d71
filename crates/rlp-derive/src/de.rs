use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Fields, Result};

use crate::utils::{
    make_generics, nil_kind_expr, option_inner, parse_struct, process_fields, SchemaField,
};

pub(crate) fn impl_decodable(ast: &syn::DeriveInput) -> Result<TokenStream> {
    let body = parse_struct(ast, "RlpDecodable")?;
    let fields = process_fields(body)?;

    let name = &ast.ident;
    let name_str = name.to_string();

    let mut decode_stmts = Vec::with_capacity(fields.len());
    for f in &fields {
        decode_stmts.push(decode_stmt(f, &name_str)?);
    }

    let construct = match &body.fields {
        Fields::Named(_) => {
            let pairs = fields.iter().map(|f| {
                let field_name = &f.field.ident;
                let binding = f.binding();
                quote! { #field_name: #binding }
            });
            quote! { Self { #(#pairs),* } }
        }
        Fields::Unnamed(_) => {
            let bindings = fields.iter().map(SchemaField::binding);
            quote! { Self(#(#bindings),*) }
        }
        Fields::Unit => quote! { Self },
    };

    let generics = make_generics(&ast.generics, quote!(ethrlp::Decodable));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        const _: () = {
            extern crate ethrlp;

            impl #impl_generics ethrlp::Decodable for #name #ty_generics #where_clause {
                fn decode(s: &mut ethrlp::Stream<'_>) -> ethrlp::Result<Self> {
                    s.list().map_err(|__e| __e.for_type(#name_str))?;
                    #(#decode_stmts)*
                    // A decoded list is fully consumed before control
                    // returns, including when trailing optional fields were
                    // absent.
                    s.end_list().map_err(|__e| __e.for_type(#name_str))?;
                    ethrlp::private::Ok(#construct)
                }
            }
        };
    })
}

fn decode_stmt(f: &SchemaField<'_>, name_str: &str) -> Result<TokenStream> {
    let binding = f.binding();
    let ty = &f.field.ty;
    let crumb = f.breadcrumb();

    if f.tags.skip {
        return Ok(quote! {
            let #binding: #ty = ethrlp::private::Default::default();
        });
    }

    if f.tags.tail {
        return Ok(quote! {
            let mut #binding: #ty = ethrlp::private::Default::default();
            let mut __index = 0usize;
            while s.more_in_list() {
                match ethrlp::Decodable::decode(s) {
                    ethrlp::private::Ok(__item) => #binding.push(__item),
                    ethrlp::private::Err(__e) => {
                        return ethrlp::private::Err(
                            __e.context(format!("[{}]", __index)).context(#crumb),
                        )
                    }
                }
                __index += 1;
            }
        });
    }

    let decode_expr = match f.tags.nil {
        Some(nil_kind) => {
            let inner = option_inner(ty)
                .ok_or_else(|| Error::new_spanned(f.field, "nil tags require an `Option` field"))?;
            let kind = nil_kind_expr(nil_kind, inner, quote!(ethrlp::Decodable));
            quote! { s.decode_optional::<#inner>(#kind) }
        }
        None => quote! { <#ty as ethrlp::Decodable>::decode(s) },
    };

    if f.tags.optional {
        // Absent trailing fields keep their default value; the end_list
        // call below still verifies the frame.
        Ok(quote! {
            let #binding: #ty = if s.more_in_list() {
                match #decode_expr {
                    ethrlp::private::Ok(__value) => __value,
                    ethrlp::private::Err(__e) => return ethrlp::private::Err(__e.context(#crumb)),
                }
            } else {
                ethrlp::private::Default::default()
            };
        })
    } else {
        Ok(quote! {
            let #binding: #ty = match #decode_expr {
                ethrlp::private::Ok(__value) => __value,
                ethrlp::private::Err(ethrlp::Error::EndOfList) => {
                    return ethrlp::private::Err(ethrlp::Error::Decode(
                        ethrlp::DecodeError::new("too few elements", #name_str),
                    ))
                }
                ethrlp::private::Err(__e) => return ethrlp::private::Err(__e.context(#crumb)),
            };
        })
    }
}

pub(crate) fn impl_decodable_wrapper(ast: &syn::DeriveInput) -> Result<TokenStream> {
    let body = parse_struct(ast, "RlpDecodableWrapper")?;

    if body.fields.iter().count() != 1 {
        let msg = "`RlpDecodableWrapper` is only derivable for structs with one field";
        return Err(Error::new(ast.ident.span(), msg));
    }
    let field = body.fields.iter().next().unwrap();
    let field_ty = &field.ty;

    let construct = match &body.fields {
        Fields::Named(_) => {
            let field_name = &field.ident;
            quote! { Self { #field_name: __value } }
        }
        _ => quote! { Self(__value) },
    };

    let name = &ast.ident;
    let generics = make_generics(&ast.generics, quote!(ethrlp::Decodable));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        const _: () = {
            extern crate ethrlp;

            impl #impl_generics ethrlp::Decodable for #name #ty_generics #where_clause {
                #[inline]
                fn decode(s: &mut ethrlp::Stream<'_>) -> ethrlp::Result<Self> {
                    let __value = <#field_ty as ethrlp::Decodable>::decode(s)?;
                    ethrlp::private::Ok(#construct)
                }

                const NIL_KIND: ethrlp::Kind = <#field_ty as ethrlp::Decodable>::NIL_KIND;
            }
        };
    })
}
