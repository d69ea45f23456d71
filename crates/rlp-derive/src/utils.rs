use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DataStruct, DeriveInput, Error, Field, Result, Type};

/// The empty-value kind selected by a nil-family tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NilKind {
    /// `nil`: derived from the inner type's `NIL_KIND` constant.
    Auto,
    /// `nil_string`: the empty string stands for the absent value.
    String,
    /// `nil_list`: the empty list stands for the absent value.
    List,
}

/// Parsed `#[rlp(...)]` tags of one field.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct FieldTags {
    pub skip: bool,
    pub tail: bool,
    pub optional: bool,
    pub nil: Option<NilKind>,
}

/// A struct field together with its parsed tags.
pub(crate) struct SchemaField<'a> {
    pub index: usize,
    pub field: &'a Field,
    pub tags: FieldTags,
}

impl SchemaField<'_> {
    /// The expression naming this field on `self`.
    pub(crate) fn member(&self) -> TokenStream {
        field_ident(self.index, self.field)
    }

    /// The local variable a decoder binds this field to.
    pub(crate) fn binding(&self) -> proc_macro2::Ident {
        match &self.field.ident {
            Some(ident) => format_ident!("__{}", ident),
            None => format_ident!("__field{}", self.index),
        }
    }

    /// The breadcrumb token for error context, `.name` or `.3`.
    pub(crate) fn breadcrumb(&self) -> String {
        match &self.field.ident {
            Some(ident) => format!(".{ident}"),
            None => format!(".{}", self.index),
        }
    }

    /// The plain field name for diagnostics.
    pub(crate) fn name(&self) -> String {
        match &self.field.ident {
            Some(ident) => ident.to_string(),
            None => self.index.to_string(),
        }
    }
}

pub(crate) fn parse_struct<'a>(ast: &'a DeriveInput, derive_name: &str) -> Result<&'a DataStruct> {
    if let Some(attr) = ast.attrs.iter().find(|a| a.path().is_ident("rlp")) {
        return Err(Error::new_spanned(
            attr,
            "rlp attributes go on fields, not on the struct itself",
        ));
    }
    match &ast.data {
        Data::Struct(body) => Ok(body),
        _ => Err(Error::new_spanned(
            ast,
            format!("`{derive_name}` is only defined for structs"),
        )),
    }
}

pub(crate) fn field_ident(index: usize, field: &Field) -> TokenStream {
    match &field.ident {
        Some(ident) => quote! { #ident },
        None => {
            let index = syn::Index::from(index);
            quote! { #index }
        }
    }
}

/// Adds the codec trait bound to every type parameter.
pub(crate) fn make_generics(generics: &syn::Generics, trait_bound: TokenStream) -> syn::Generics {
    let mut generics = generics.clone();
    let bound: syn::TypeParamBound = syn::parse_quote!(#trait_bound);
    for param in generics.type_params_mut() {
        param.bounds.push(bound.clone());
    }
    generics
}

/// The inner type of an `Option<T>` field, if it is one syntactically.
pub(crate) fn option_inner(ty: &Type) -> Option<&Type> {
    generic_inner(ty, "Option")
}

/// The element type of a `Vec<T>` field, if it is one syntactically.
pub(crate) fn vec_inner(ty: &Type) -> Option<&Type> {
    generic_inner(ty, "Vec")
}

fn generic_inner<'a>(ty: &'a Type, name: &str) -> Option<&'a Type> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if segment.ident != name {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn parse_field_tags(field: &Field) -> Result<FieldTags> {
    let mut tags = FieldTags::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("rlp") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                tags.skip = true;
            } else if meta.path.is_ident("tail") {
                tags.tail = true;
            } else if meta.path.is_ident("optional") {
                tags.optional = true;
            } else if meta.path.is_ident("nil") {
                tags.nil = Some(NilKind::Auto);
            } else if meta.path.is_ident("nil_string") {
                tags.nil = Some(NilKind::String);
            } else if meta.path.is_ident("nil_list") {
                tags.nil = Some(NilKind::List);
            } else {
                return Err(meta.error(
                    "unknown rlp attribute; expected one of \
                     `skip`, `tail`, `optional`, `nil`, `nil_string`, `nil_list`",
                ));
            }
            Ok(())
        })?;
    }
    Ok(tags)
}

/// Parses and validates the tags of all fields.
///
/// Skipped fields are kept in the result (decoders default-fill them); the
/// tag-combination rules apply to the remaining fields:
///
/// - `tail` and `optional` never share a field;
/// - `tail` goes on the last field only, and that field must be a `Vec`;
/// - nil-family tags require an `Option` field;
/// - after the first `optional` field every later field is `optional`, or
///   the final field is `tail`.
pub(crate) fn process_fields(body: &DataStruct) -> Result<Vec<SchemaField<'_>>> {
    let mut fields = Vec::new();
    for (index, field) in body.fields.iter().enumerate() {
        let tags = parse_field_tags(field)?;
        fields.push(SchemaField { index, field, tags });
    }

    let last_encoded = fields.iter().rev().find(|f| !f.tags.skip).map(|f| f.index);

    let mut first_optional: Option<String> = None;
    for f in &fields {
        if f.tags.skip {
            continue;
        }
        let tags = &f.tags;
        if tags.tail && tags.optional {
            return Err(Error::new_spanned(
                f.field,
                "field has both \"tail\" and \"optional\" tags",
            ));
        }
        if tags.nil.is_some() && option_inner(&f.field.ty).is_none() {
            return Err(Error::new_spanned(
                f.field,
                "nil tags require the field to be an `Option`",
            ));
        }
        if tags.tail {
            if Some(f.index) != last_encoded {
                return Err(Error::new_spanned(
                    f.field,
                    "\"tail\" tag must be on the last field",
                ));
            }
            if vec_inner(&f.field.ty).is_none() {
                return Err(Error::new_spanned(
                    f.field,
                    "\"tail\" tag requires the field to be a `Vec`",
                ));
            }
        }
        if tags.optional || tags.tail {
            if first_optional.is_none() {
                first_optional = Some(f.name());
            }
        } else if let Some(first) = &first_optional {
            return Err(Error::new_spanned(
                f.field,
                format!("field must be \"optional\" because preceding field \"{first}\" is optional"),
            ));
        }
    }

    Ok(fields)
}

/// The expression for the empty-value kind of a nil-tagged field.
pub(crate) fn nil_kind_expr(kind: NilKind, inner: &Type, trait_path: TokenStream) -> TokenStream {
    match kind {
        NilKind::Auto => quote! { <#inner as #trait_path>::NIL_KIND },
        NilKind::String => quote! { ethrlp::Kind::String },
        NilKind::List => quote! { ethrlp::Kind::List },
    }
}
