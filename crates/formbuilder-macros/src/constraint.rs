//! Parsing of `#[constraint(kind(...))]` attributes.
//!
//! Each attribute names exactly one constraint kind, optionally with
//! arguments:
//!
//! ```text
//! #[constraint(not_blank(message = "user.nameNotFilled"))]
//! #[constraint(min_length(value = 3))]
//! #[constraint(range(min = 1, max = 10))]
//! #[constraint(pattern(value = "[0-9]+"))]
//! #[constraint(email)]
//! ```

use proc_macro2::{Literal, TokenStream};
use quote::{quote, ToTokens as _};
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Expr, ExprLit, ExprUnary, Lit, LitStr, UnOp};

/// Arguments collected from one constraint attribute.
#[derive(Debug, Default)]
struct Args {
    message: Option<String>,
    value: Option<Expr>,
    min: Option<Expr>,
    max: Option<Expr>,
}

impl Args {
    fn parse(meta: &ParseNestedMeta<'_>) -> syn::Result<Self> {
        let mut args = Self::default();
        if meta.input.is_empty() || meta.input.peek(syn::Token![,]) {
            return Ok(args);
        }
        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("message") {
                args.message = Some(inner.value()?.parse::<LitStr>()?.value());
            } else if inner.path.is_ident("value") {
                args.value = Some(inner.value()?.parse()?);
            } else if inner.path.is_ident("min") {
                args.min = Some(inner.value()?.parse()?);
            } else if inner.path.is_ident("max") {
                args.max = Some(inner.value()?.parse()?);
            } else {
                return Err(inner.error("expected `message`, `value`, `min` or `max`"));
            }
            Ok(())
        })?;
        Ok(args)
    }
}

/// Parses one `#[constraint(...)]` attribute into tokens building a
/// `formbuilder_meta::constraints::Constraint`.
pub fn parse_constraint(attr: &Attribute) -> syn::Result<TokenStream> {
    let mut result = None;
    attr.parse_nested_meta(|meta| {
        if result.is_some() {
            return Err(meta.error("only one constraint per attribute"));
        }
        let kind = meta
            .path
            .get_ident()
            .map(ToString::to_string)
            .ok_or_else(|| meta.error("expected a constraint kind"))?;
        let args = Args::parse(&meta)?;
        result = Some(constructor(&meta, &kind, &args)?);
        Ok(())
    })?;

    result.ok_or_else(|| syn::Error::new_spanned(attr, "expected a constraint kind"))
}

fn constructor(meta: &ParseNestedMeta<'_>, kind: &str, args: &Args) -> syn::Result<TokenStream> {
    let base = quote! { formbuilder_meta::constraints::Constraint };
    let ctor = match kind {
        "not_blank" => quote! { #base::not_blank() },
        "filled" => quote! { #base::filled() },
        "email" => quote! { #base::email() },
        "url" => quote! { #base::url() },
        "integer" => quote! { #base::integer() },
        "float" => quote! { #base::float() },
        "length" => {
            let v = length(meta, args.value.as_ref(), "value")?;
            quote! { #base::length(#v) }
        }
        "min_length" => {
            let v = length(meta, args.value.as_ref(), "value")?;
            quote! { #base::min_length(#v) }
        }
        "max_length" => {
            let v = length(meta, args.value.as_ref(), "value")?;
            quote! { #base::max_length(#v) }
        }
        "length_range" => {
            let min = optional(args.min.as_ref(), |e| length(meta, Some(e), "min"))?;
            let max = optional(args.max.as_ref(), |e| length(meta, Some(e), "max"))?;
            quote! { #base::length_range(#min, #max) }
        }
        "range" => {
            let min = optional(args.min.as_ref(), |e| number(meta, Some(e), "min"))?;
            let max = optional(args.max.as_ref(), |e| number(meta, Some(e), "max"))?;
            quote! { #base::range(#min, #max) }
        }
        "min" => {
            let v = number(meta, args.value.as_ref(), "value")?;
            quote! { #base::min(#v) }
        }
        "max" => {
            let v = number(meta, args.value.as_ref(), "value")?;
            quote! { #base::max(#v) }
        }
        "pattern" => match &args.value {
            Some(Expr::Lit(ExprLit {
                lit: Lit::Str(s), ..
            })) => quote! { #base::pattern(#s) },
            _ => return Err(meta.error("`pattern` requires `value = \"...\"`")),
        },
        other => return Err(meta.error(format!("unknown constraint kind `{other}`"))),
    };

    Ok(match &args.message {
        Some(message) => quote! { #ctor.with_message(#message) },
        None => ctor,
    })
}

fn optional(
    expr: Option<&Expr>,
    f: impl FnOnce(&Expr) -> syn::Result<TokenStream>,
) -> syn::Result<TokenStream> {
    match expr {
        Some(e) => {
            let inner = f(e)?;
            Ok(quote! { ::core::option::Option::Some(#inner) })
        }
        None => Ok(quote! { ::core::option::Option::None }),
    }
}

fn length(meta: &ParseNestedMeta<'_>, expr: Option<&Expr>, name: &str) -> syn::Result<TokenStream> {
    match expr {
        Some(Expr::Lit(ExprLit {
            lit: Lit::Int(i), ..
        })) => {
            let n: usize = i.base10_parse()?;
            Ok(Literal::usize_suffixed(n).into_token_stream())
        }
        _ => Err(meta.error(format!("`{name}` must be a non-negative integer literal"))),
    }
}

fn number(meta: &ParseNestedMeta<'_>, expr: Option<&Expr>, name: &str) -> syn::Result<TokenStream> {
    let n = expr
        .and_then(literal_number)
        .ok_or_else(|| meta.error(format!("`{name}` must be a numeric literal")))?;
    let lit = Literal::f64_suffixed(n.abs());
    Ok(if n < 0.0 { quote! { -#lit } } else { lit.into_token_stream() })
}

/// Reads an integer or float literal, optionally negated.
fn literal_number(expr: &Expr) -> Option<f64> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(i), ..
        }) => i.base10_parse::<f64>().ok(),
        Expr::Lit(ExprLit {
            lit: Lit::Float(f), ..
        }) => f.base10_parse::<f64>().ok(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => literal_number(expr).map(|n| -n),
        _ => None,
    }
}
