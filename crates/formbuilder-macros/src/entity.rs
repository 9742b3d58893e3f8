//! `#[derive(Entity)]` implementation.
//!
//! Generates `formbuilder_meta::entity::EntityClass` (a lazily built static
//! descriptor listing every field with its annotations in declaration order)
//! and `formbuilder_meta::entity::Entity` (attribute access for column and
//! identifier fields, relation access for one-to-one fields).

use darling::{FromDeriveInput, FromField, FromMeta};
use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::ParseStream;
use syn::{Attribute, DeriveInput, LitStr, Token, Type};

use crate::constraint::parse_constraint;

/// Struct-level input.
#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named))]
pub struct EntityOpts {
    pub ident: syn::Ident,
    pub generics: syn::Generics,
    pub data: darling::ast::Data<(), FieldOpts>,
}

/// Per-field input. Annotation attributes are forwarded untouched so they
/// keep their declaration order.
#[derive(Debug, FromField)]
#[darling(forward_attrs(column, id, generated_value, one_to_one, form_ignore, password, constraint))]
pub struct FieldOpts {
    pub ident: Option<syn::Ident>,
    pub ty: syn::Type,
    pub attrs: Vec<Attribute>,
}

/// Arguments of `#[one_to_one(target_entity = "...")]`.
#[derive(Debug, FromMeta)]
struct OneToOneArgs {
    target_entity: String,
}

/// What the generated accessors need to know about one field.
struct FieldInfo<'a> {
    ident: &'a syn::Ident,
    ty: &'a Type,
    annotations: Vec<TokenStream>,
    is_column: bool,
    is_relation: bool,
}

/// Generates the `Entity` and `EntityClass` implementations.
pub fn derive_entity_impl(input: DeriveInput) -> TokenStream {
    let opts = match EntityOpts::from_derive_input(&input) {
        Ok(o) => o,
        Err(e) => return e.write_errors(),
    };

    let fields = match &opts.data {
        darling::ast::Data::Struct(fields) => &fields.fields,
        darling::ast::Data::Enum(_) => {
            return syn::Error::new_spanned(&opts.ident, "Entity can only be derived for structs")
                .to_compile_error();
        }
    };

    let mut infos = Vec::with_capacity(fields.len());
    for field in fields {
        match field_info(field) {
            Ok(info) => infos.push(info),
            Err(e) => return e.to_compile_error(),
        }
    }

    let struct_name = &opts.ident;
    let name_str = struct_name.to_string();
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let property_descriptors = infos.iter().map(|info| {
        let prop = info.ident.to_string();
        let annotations = &info.annotations;
        quote! {
            formbuilder_meta::entity::PropertyDescriptor::new(#prop, vec![#(#annotations),*])
        }
    });

    let get_body = get_body(&infos);
    let set_body = set_body(&infos, &name_str);
    let check_body = check_body(&infos, &name_str);
    let related_ref_body = related_body(&infos, false);
    let related_mut_body = related_body(&infos, true);
    let instantiate_body = instantiate_body(&infos);

    quote! {
        impl #impl_generics formbuilder_meta::entity::EntityClass for #struct_name #ty_generics #where_clause {
            fn class_descriptor() -> &'static formbuilder_meta::entity::EntityDescriptor {
                static DESCRIPTOR: ::std::sync::LazyLock<formbuilder_meta::entity::EntityDescriptor> =
                    ::std::sync::LazyLock::new(|| {
                        formbuilder_meta::entity::EntityDescriptor::new(
                            #name_str,
                            module_path!(),
                            vec![#(#property_descriptors),*],
                        )
                    });
                &DESCRIPTOR
            }
        }

        impl #impl_generics formbuilder_meta::entity::Entity for #struct_name #ty_generics #where_clause {
            fn descriptor(&self) -> &'static formbuilder_meta::entity::EntityDescriptor {
                <Self as formbuilder_meta::entity::EntityClass>::class_descriptor()
            }

            fn get(&self, property: &str) -> ::core::option::Option<formbuilder_meta::value::Value> {
                #get_body
            }

            fn set(
                &mut self,
                property: &str,
                value: formbuilder_meta::value::Value,
            ) -> formbuilder_meta::FormBuilderResult<()> {
                #set_body
            }

            fn check_value(
                &self,
                property: &str,
                value: &formbuilder_meta::value::Value,
            ) -> formbuilder_meta::FormBuilderResult<()> {
                #check_body
            }

            fn related(
                &self,
                property: &str,
            ) -> ::core::option::Option<&dyn formbuilder_meta::entity::Entity> {
                #related_ref_body
            }

            fn related_mut(
                &mut self,
                property: &str,
            ) -> ::core::option::Option<&mut dyn formbuilder_meta::entity::Entity> {
                #related_mut_body
            }

            fn instantiate_related(
                &mut self,
                property: &str,
            ) -> ::core::option::Option<&mut dyn formbuilder_meta::entity::Entity> {
                #instantiate_body
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }
    }
}

// ── Field analysis ──────────────────────────────────────────────────

fn field_info(field: &FieldOpts) -> syn::Result<FieldInfo<'_>> {
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(&field.ty, "Entity fields must be named"))?;

    let base = quote! { formbuilder_meta::annotations::Annotation };
    let mut annotations = Vec::with_capacity(field.attrs.len());
    let mut is_column = false;
    let mut is_relation = false;

    for attr in &field.attrs {
        let path = attr.path();
        if path.is_ident("column") {
            let column_type = parse_column_type(attr)?.value();
            annotations.push(quote! { #base::column(#column_type) });
            is_column = true;
        } else if path.is_ident("id") {
            annotations.push(quote! { #base::Id });
            is_column = true;
        } else if path.is_ident("generated_value") {
            annotations.push(quote! { #base::GeneratedValue });
        } else if path.is_ident("one_to_one") {
            let args = OneToOneArgs::from_meta(&attr.meta)
                .map_err(|e| syn::Error::new_spanned(attr, e.to_string()))?;
            let target = args.target_entity;
            annotations.push(quote! { #base::one_to_one(#target) });
            is_relation = true;
        } else if path.is_ident("form_ignore") {
            annotations.push(quote! { #base::Ignore });
        } else if path.is_ident("password") {
            annotations.push(quote! { #base::Password });
        } else if path.is_ident("constraint") {
            let ctor = parse_constraint(attr)?;
            annotations.push(quote! { #base::Constraint(#ctor) });
        }
    }

    if is_column && is_relation {
        return Err(syn::Error::new_spanned(
            ident,
            "a field cannot be both a column and a one_to_one relation",
        ));
    }

    Ok(FieldInfo {
        ident,
        ty: &field.ty,
        annotations,
        is_column,
        is_relation,
    })
}

/// Parses `#[column(type = "...")]`. `type` is a keyword, so the meta
/// parser cannot read it as a name.
fn parse_column_type(attr: &Attribute) -> syn::Result<LitStr> {
    attr.parse_args_with(|input: ParseStream<'_>| {
        input.parse::<Token![type]>()?;
        input.parse::<Token![=]>()?;
        let column_type: LitStr = input.parse()?;
        if !input.is_empty() {
            return Err(input.error("expected `type = \"...\"` only"));
        }
        Ok(column_type)
    })
}

// ── Accessor bodies ─────────────────────────────────────────────────

fn get_body(infos: &[FieldInfo<'_>]) -> TokenStream {
    let arms: Vec<_> = infos
        .iter()
        .filter(|i| i.is_column)
        .map(|i| {
            let ident = i.ident;
            let prop = ident.to_string();
            quote! {
                #prop => ::core::option::Option::Some(
                    formbuilder_meta::value::Value::from(::core::clone::Clone::clone(&self.#ident))
                ),
            }
        })
        .collect();
    if arms.is_empty() {
        return quote! {
            let _ = property;
            ::core::option::Option::None
        };
    }
    quote! {
        match property {
            #(#arms)*
            _ => ::core::option::Option::None,
        }
    }
}

fn set_body(infos: &[FieldInfo<'_>], entity_name: &str) -> TokenStream {
    let arms = infos.iter().filter(|i| i.is_column).map(|i| {
        let ident = i.ident;
        let ty = i.ty;
        let prop = ident.to_string();
        quote! {
            #prop => {
                self.#ident = <#ty as formbuilder_meta::value::FromValue>::from_value(&value)?;
                ::core::result::Result::Ok(())
            }
        }
    });
    writable_match(arms, entity_name)
}

fn check_body(infos: &[FieldInfo<'_>], entity_name: &str) -> TokenStream {
    let arms = infos.iter().filter(|i| i.is_column).map(|i| {
        let ty = i.ty;
        let prop = i.ident.to_string();
        quote! {
            #prop => <#ty as formbuilder_meta::value::FromValue>::from_value(value).map(|_| ()),
        }
    });
    writable_match(arms, entity_name)
}

fn writable_match(arms: impl Iterator<Item = TokenStream>, entity_name: &str) -> TokenStream {
    quote! {
        let _ = &value;
        match property {
            #(#arms)*
            other => ::core::result::Result::Err(
                formbuilder_meta::FormBuilderError::InvalidReference(
                    ::std::format!("{} has no writable property `{}`", #entity_name, other)
                )
            ),
        }
    }
}

fn related_body(infos: &[FieldInfo<'_>], mutable: bool) -> TokenStream {
    let arms: Vec<_> = infos
        .iter()
        .filter(|i| i.is_relation)
        .map(|i| {
            let ident = i.ident;
            let prop = ident.to_string();
            let access = match (is_option_type(i.ty), mutable) {
                (true, false) => quote! {
                    self.#ident.as_ref().map(|e| e as &dyn formbuilder_meta::entity::Entity)
                },
                (true, true) => quote! {
                    self.#ident.as_mut().map(|e| e as &mut dyn formbuilder_meta::entity::Entity)
                },
                (false, false) => quote! { ::core::option::Option::Some(&self.#ident) },
                (false, true) => quote! { ::core::option::Option::Some(&mut self.#ident) },
            };
            quote! { #prop => #access, }
        })
        .collect();
    relation_match(&arms)
}

fn instantiate_body(infos: &[FieldInfo<'_>]) -> TokenStream {
    let arms: Vec<_> = infos
        .iter()
        .filter(|i| i.is_relation)
        .map(|i| {
            let ident = i.ident;
            let prop = ident.to_string();
            let body = match unwrap_option_type(i.ty) {
                Some(inner) => quote! {
                    self.#ident = ::core::option::Option::Some(
                        <#inner as ::core::default::Default>::default()
                    );
                    self.#ident.as_mut().map(|e| e as &mut dyn formbuilder_meta::entity::Entity)
                },
                None => {
                    let ty = i.ty;
                    quote! {
                        self.#ident = <#ty as ::core::default::Default>::default();
                        ::core::option::Option::Some(&mut self.#ident)
                    }
                }
            };
            quote! { #prop => { #body } }
        })
        .collect();
    relation_match(&arms)
}

fn relation_match(arms: &[TokenStream]) -> TokenStream {
    if arms.is_empty() {
        return quote! {
            let _ = property;
            ::core::option::Option::None
        };
    }
    quote! {
        match property {
            #(#arms)*
            _ => ::core::option::Option::None,
        }
    }
}

// ── Type helpers ────────────────────────────────────────────────────

/// Returns `true` if the type is `Option<T>`.
pub(crate) fn is_option_type(ty: &Type) -> bool {
    unwrap_option_type(ty).is_some()
}

/// If the type is `Option<T>`, returns `Some(&T)`.
pub(crate) fn unwrap_option_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    match &segment.arguments {
        syn::PathArguments::AngleBracketed(args) => match args.args.first() {
            Some(syn::GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn type_to_string(ty: &Type) -> String {
    quote!(#ty).to_string()
}
