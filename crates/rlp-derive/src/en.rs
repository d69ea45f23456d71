use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Error, Result};

use crate::utils::{
    field_ident, make_generics, nil_kind_expr, option_inner, parse_struct, process_fields,
    SchemaField,
};

pub(crate) fn impl_encodable(ast: &syn::DeriveInput) -> Result<TokenStream> {
    let body = parse_struct(ast, "RlpEncodable")?;
    let fields = process_fields(body)?;

    // Fields from the first optional (or tail) onward take part in
    // trailing-value suppression; everything before is written
    // unconditionally.
    let encoded: Vec<&SchemaField<'_>> = fields.iter().filter(|f| !f.tags.skip).collect();
    let first_suppressible =
        encoded.iter().position(|f| f.tags.optional || f.tags.tail).unwrap_or(encoded.len());

    let mut required_stmts = Vec::new();
    for &f in &encoded[..first_suppressible] {
        required_stmts.push(encode_stmt(f)?);
    }

    // A trailing run is written up to the last field whose value is not its
    // default. The inclusion flags chain backwards: a field is written when
    // it or any later field is non-default, so each flag folds in the flag
    // declared just before it.
    let suppressible = &encoded[first_suppressible..];
    let mut include_lets = Vec::with_capacity(suppressible.len());
    let mut prev_flag: Option<proc_macro2::Ident> = None;
    for &f in suppressible.iter().rev() {
        let flag = format_ident!("__include{}", f.index);
        let non_default = non_default_expr(f);
        let init = match &prev_flag {
            Some(later) => quote! { #later || #non_default },
            None => non_default,
        };
        include_lets.push(quote! { let #flag = #init; });
        prev_flag = Some(flag);
    }

    let mut guarded_stmts = Vec::with_capacity(suppressible.len());
    for &f in suppressible {
        let flag = format_ident!("__include{}", f.index);
        let stmt = encode_stmt(f)?;
        guarded_stmts.push(quote! { if #flag { #stmt } });
    }

    let name = &ast.ident;
    let generics = make_generics(&ast.generics, quote!(ethrlp::Encodable));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        const _: () = {
            extern crate ethrlp;

            impl #impl_generics ethrlp::Encodable for #name #ty_generics #where_clause {
                fn encode(&self, out: &mut ethrlp::EncodeBuffer) {
                    let __list = out.open_list();
                    #(#required_stmts)*
                    #(#include_lets)*
                    #(#guarded_stmts)*
                    out.close_list(__list);
                }
            }
        };
    })
}

fn encode_stmt(f: &SchemaField<'_>) -> Result<TokenStream> {
    let member = f.member();
    if f.tags.tail {
        return Ok(quote! {
            for __item in &self.#member {
                ethrlp::Encodable::encode(__item, out);
            }
        });
    }
    if let Some(nil_kind) = f.tags.nil {
        let inner = option_inner(&f.field.ty)
            .ok_or_else(|| Error::new_spanned(f.field, "nil tags require an `Option` field"))?;
        let kind = nil_kind_expr(nil_kind, inner, quote!(ethrlp::Encodable));
        return Ok(quote! {
            match &self.#member {
                ethrlp::private::Some(__value) => ethrlp::Encodable::encode(__value, out),
                ethrlp::private::None => out.write_empty(#kind),
            };
        });
    }
    Ok(quote! {
        ethrlp::Encodable::encode(&self.#member, out);
    })
}

/// The test deciding whether a suppressible field forces the trailing run
/// to be written.
fn non_default_expr(f: &SchemaField<'_>) -> TokenStream {
    let member = f.member();
    if f.tags.tail {
        quote! { !self.#member.is_empty() }
    } else if f.tags.nil.is_some() {
        quote! { self.#member.is_some() }
    } else {
        let ty = &f.field.ty;
        quote! { self.#member != <#ty as ethrlp::private::Default>::default() }
    }
}

pub(crate) fn impl_encodable_wrapper(ast: &syn::DeriveInput) -> Result<TokenStream> {
    let body = parse_struct(ast, "RlpEncodableWrapper")?;

    let ident = {
        let fields: Vec<_> = body.fields.iter().collect();
        if let [field] = fields[..] {
            field_ident(0, field)
        } else {
            let msg = "`RlpEncodableWrapper` is only derivable for structs with one field";
            return Err(Error::new(ast.ident.span(), msg));
        }
    };
    let field_ty = &body.fields.iter().next().unwrap().ty;

    let name = &ast.ident;
    let generics = make_generics(&ast.generics, quote!(ethrlp::Encodable));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        const _: () = {
            extern crate ethrlp;

            impl #impl_generics ethrlp::Encodable for #name #ty_generics #where_clause {
                #[inline]
                fn encode(&self, out: &mut ethrlp::EncodeBuffer) {
                    ethrlp::Encodable::encode(&self.#ident, out)
                }

                const NIL_KIND: ethrlp::Kind = <#field_ty as ethrlp::Encodable>::NIL_KIND;
            }
        };
    })
}
