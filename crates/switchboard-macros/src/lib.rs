// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! This crate provides the derive macros of Switchboard.
//!
//! They are re-exported by `switchboard-core` and expand to paths under
//! `::switchboard_core`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Data, DeriveInput, Field, LitStr, Token, Type};

/// One entry of a tag list: a type or a string literal.
enum TagItem {
    Named(LitStr),
    Type(Type),
}

impl Parse for TagItem {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            input.parse().map(TagItem::Named)
        } else {
            input.parse().map(TagItem::Type)
        }
    }
}

impl TagItem {
    fn tag_tokens(&self) -> TokenStream2 {
        match self {
            TagItem::Named(name) => quote! { ::switchboard_core::Tag::named(#name) },
            TagItem::Type(ty) => quote! { ::switchboard_core::Tag::of::<#ty>() },
        }
    }
}

fn parse_list<T: Parse>(meta: &syn::meta::ParseNestedMeta) -> syn::Result<Vec<T>> {
    let content;
    syn::parenthesized!(content in meta.input);
    let items = Punctuated::<T, Token![,]>::parse_terminated(&content)?;
    Ok(items.into_iter().collect())
}

fn tag_set(items: &[TagItem]) -> TokenStream2 {
    let tags = items.iter().map(TagItem::tag_tokens);
    quote! { ::switchboard_core::TagSet::from_tags([#(#tags),*]) }
}

/// A derive macro that implements the `switchboard_core::Message` trait.
///
/// The optional `#[message(first(..), last(..))]` attribute lists the tags
/// whose modules run first or last. Entries are types (`Renderer`) or string
/// literals (`"audio"`).
#[proc_macro_derive(Message, attributes(message))]
pub fn derive_message(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_message(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_message(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let mut first: Vec<TagItem> = Vec::new();
    let mut last: Vec<TagItem> = Vec::new();

    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("message")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("first") {
                first.extend(parse_list::<TagItem>(&meta)?);
                Ok(())
            } else if meta.path.is_ident("last") {
                last.extend(parse_list::<TagItem>(&meta)?);
                Ok(())
            } else {
                Err(meta.error("expected `first(..)` or `last(..)`"))
            }
        })?;
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let first_fn = (!first.is_empty()).then(|| {
        let set = tag_set(&first);
        quote! {
            fn first_tags() -> ::switchboard_core::TagSet { #set }
        }
    });
    let last_fn = (!last.is_empty()).then(|| {
        let set = tag_set(&last);
        quote! {
            fn last_tags() -> ::switchboard_core::TagSet { #set }
        }
    });

    Ok(quote! {
        impl #impl_generics ::switchboard_core::Message for #name #ty_generics #where_clause {
            #first_fn
            #last_fn
        }
    })
}

#[derive(Default)]
struct ModuleArgs {
    name: Option<LitStr>,
    handles: Vec<Type>,
    any: bool,
    tags: Vec<TagItem>,
    replace_tags: Option<Vec<TagItem>>,
    first: Option<Vec<TagItem>>,
    last: Option<Vec<TagItem>>,
}

impl ModuleArgs {
    fn parse(input: &DeriveInput) -> syn::Result<Self> {
        let mut args = ModuleArgs::default();
        for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("module")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    args.name = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("handles") {
                    args.handles.extend(parse_list::<Type>(&meta)?);
                } else if meta.path.is_ident("any") {
                    args.any = true;
                } else if meta.path.is_ident("tags") {
                    args.tags.extend(parse_list::<TagItem>(&meta)?);
                } else if meta.path.is_ident("replace_tags") {
                    args.replace_tags
                        .get_or_insert_with(Vec::new)
                        .extend(parse_list::<TagItem>(&meta)?);
                } else if meta.path.is_ident("first") {
                    args.first
                        .get_or_insert_with(Vec::new)
                        .extend(parse_list::<TagItem>(&meta)?);
                } else if meta.path.is_ident("last") {
                    args.last
                        .get_or_insert_with(Vec::new)
                        .extend(parse_list::<TagItem>(&meta)?);
                } else {
                    return Err(meta.error(
                        "expected one of `name`, `handles`, `any`, `tags`, `replace_tags`, `first`, `last`",
                    ));
                }
                Ok(())
            })?;
        }

        if !args.tags.is_empty() && args.replace_tags.is_some() {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "`tags(..)` extends the identity and `replace_tags(..)` replaces it; use one",
            ));
        }
        Ok(args)
    }
}

fn is_emitter(field: &Field) -> bool {
    field.attrs.iter().any(|attr| attr.path().is_ident("emitter"))
}

/// Returns the accessors of the fields marked `#[emitter]`.
fn emitter_fields(input: &DeriveInput) -> syn::Result<Vec<TokenStream2>> {
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(data) => {
            if data
                .variants
                .iter()
                .flat_map(|variant| variant.fields.iter())
                .any(is_emitter)
            {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "`#[emitter]` is only supported on struct fields",
                ));
            }
            return Ok(Vec::new());
        }
        Data::Union(_) => return Ok(Vec::new()),
    };

    let accessors = fields
        .iter()
        .enumerate()
        .filter(|(_, field)| is_emitter(field))
        .map(|(index, field)| match &field.ident {
            Some(ident) => quote! { #ident },
            None => {
                let index = syn::Index::from(index);
                quote! { #index }
            }
        })
        .collect();
    Ok(accessors)
}

/// A derive macro that implements the `switchboard_core::Module` trait.
///
/// ```rust,ignore
/// #[derive(Module)]
/// #[module(handles(i32, Note), tags(Audio), first("input"), last(Audit))]
/// struct Mixer {
///     #[emitter]
///     out: Emitter,
/// }
/// ```
///
/// - `handles(..)`: message types with a `Handler` impl,
/// - `any`: the module implements `AnyHandler`,
/// - `tags(..)`: extends the identity tags, `replace_tags(..)` replaces them,
/// - `first(..)`, `last(..)`: tags presented to those categories,
/// - `name = ".."`: diagnostic name,
/// - `#[emitter]` on a field: binds that `Emitter` or `CallbackEmitter` during
///   registration.
#[proc_macro_derive(Module, attributes(module, emitter))]
pub fn derive_module(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_module(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_module(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let args = ModuleArgs::parse(input)?;
    let emitters = emitter_fields(input)?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let name_fn = args.name.as_ref().map(|name| {
        quote! {
            fn name(&self) -> &'static str { #name }
        }
    });

    let handles = &args.handles;
    let any = args.any.then(|| quote! { .any::<Self>() });
    let capabilities_fn = quote! {
        fn capabilities(&self) -> ::switchboard_core::Capabilities {
            ::switchboard_core::Capabilities::new()
                #(.with::<#handles, Self>())*
                #any
        }
    };

    let tags_fn = match (&args.replace_tags, args.tags.is_empty()) {
        (Some(replaced), _) => {
            let set = tag_set(replaced);
            Some(quote! {
                fn tags(&self) -> ::switchboard_core::TagSet { #set }
            })
        }
        (None, false) => {
            let extra = args.tags.iter().map(TagItem::tag_tokens);
            Some(quote! {
                fn tags(&self) -> ::switchboard_core::TagSet {
                    ::switchboard_core::TagSet::from_tags([
                        ::switchboard_core::Tag::of::<Self>(),
                        #(#extra),*
                    ])
                }
            })
        }
        (None, true) => None,
    };

    let first_fn = args.first.as_ref().map(|items| {
        let set = tag_set(items);
        quote! {
            fn first_tags(&self) -> ::std::option::Option<::switchboard_core::TagSet> {
                ::std::option::Option::Some(#set)
            }
        }
    });
    let last_fn = args.last.as_ref().map(|items| {
        let set = tag_set(items);
        quote! {
            fn last_tags(&self) -> ::std::option::Option<::switchboard_core::TagSet> {
                ::std::option::Option::Some(#set)
            }
        }
    });

    let register_fn = (!emitters.is_empty()).then(|| {
        quote! {
            fn register(&self, handle: &::switchboard_core::ManagerHandle) {
                #(
                    ::switchboard_core::bind_or_warn(
                        &self.#emitters,
                        handle,
                        ::switchboard_core::Module::name(self),
                    );
                )*
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::switchboard_core::Module for #name #ty_generics #where_clause {
            #name_fn
            #capabilities_fn
            #tags_fn
            #first_fn
            #last_fn
            #register_fn

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    })
}
