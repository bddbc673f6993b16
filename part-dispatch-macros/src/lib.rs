//! Procedural macros for part-dispatch

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use std::collections::HashSet;
use syn::{parse_macro_input, DeriveInput};

/// Container-level input for #[derive(PartKey)].
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(part), supports(enum_unit))]
struct PartKeyOpts {
    ident: syn::Ident,
    data: darling::ast::Data<PartVariant, ()>,
}

/// Variant-level attributes.
#[derive(Debug, FromVariant)]
#[darling(attributes(part))]
struct PartVariant {
    ident: syn::Ident,

    /// Explicit part name override.
    #[darling(default)]
    rename: Option<String>,
}

/// Lower-case the first character of a PascalCase identifier.
fn to_camel_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derive macro for the PartKey trait.
///
/// Generates `name()`, `from_name()`, and `all()`. Part names are the variant
/// names in camelCase, which is what attribute values normalize to.
///
/// # Example
/// ```ignore
/// #[derive(PartKey, Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// enum AccordionPart {
///     Item,
///     Header,
///     ContentPanel,
///     #[part(rename = "closeAll")]
///     Reset,
/// }
///
/// // Generated names: "item", "header", "contentPanel", "closeAll"
/// assert_eq!(AccordionPart::ContentPanel.name(), "contentPanel");
/// assert_eq!(AccordionPart::from_name("closeAll"), Some(AccordionPart::Reset));
/// ```
#[proc_macro_derive(PartKey, attributes(part))]
pub fn derive_part_key(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match PartKeyOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "PartKey can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(variants.len());
    for variant in variants {
        let part_name = variant
            .rename
            .clone()
            .unwrap_or_else(|| to_camel_case(&variant.ident.to_string()));

        if part_name.is_empty() {
            return syn::Error::new_spanned(&variant.ident, "part name must not be empty")
                .to_compile_error()
                .into();
        }
        if !seen.insert(part_name.clone()) {
            return syn::Error::new_spanned(
                &variant.ident,
                format!("duplicate part name `{}`", part_name),
            )
            .to_compile_error()
            .into();
        }

        entries.push((&variant.ident, part_name));
    }

    let name_arms: Vec<TokenStream2> = entries
        .iter()
        .map(|(v, s)| quote! { #name::#v => #s })
        .collect();

    let from_name_arms: Vec<TokenStream2> = entries
        .iter()
        .map(|(v, s)| quote! { #s => ::core::option::Option::Some(#name::#v) })
        .collect();

    let all_variants: Vec<TokenStream2> = entries.iter().map(|(v, _)| quote! { #name::#v }).collect();

    let expanded = quote! {
        impl part_dispatch::PartKey for #name {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }

            fn from_name(name: &str) -> ::core::option::Option<Self> {
                match name {
                    #(#from_name_arms,)*
                    _ => ::core::option::Option::None,
                }
            }

            fn all() -> &'static [Self] {
                static ALL: &[#name] = &[#(#all_variants),*];
                ALL
            }
        }
    };

    TokenStream::from(expanded)
}
