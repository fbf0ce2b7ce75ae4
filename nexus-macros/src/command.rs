use crate::derives::merge_into;
use proc_macro2::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Expr, Item, LitStr, MetaNameValue, Token};

/// #[command] 宏实现
pub(crate) fn expand(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    let cfg = CommandAttrConfig::parse(attr)?;
    let input: Item = syn::parse2(item)?;

    let mut st = match input {
        Item::Struct(s) => s,
        other => {
            return Err(syn::Error::new(
                other.span(),
                "#[command] only supports structs with named fields",
            ));
        }
    };

    // 信封为平铺对象，形状须序列化为 JSON 对象
    if !matches!(st.fields, syn::Fields::Named(_)) {
        return Err(syn::Error::new(
            st.span(),
            "#[command] requires named fields, e.g., struct Ping { seq: u32 } or struct Ping {}",
        ));
    }

    merge_into(
        &mut st.attrs,
        vec![
            syn::parse_quote!(serde::Serialize),
            syn::parse_quote!(serde::Deserialize),
        ],
    )?;

    let name = cfg
        .name
        .unwrap_or_else(|| LitStr::new(&default_name(&st.ident), st.ident.span()));

    let ident = &st.ident;
    let (impl_generics, ty_generics, where_clause) = st.generics.split_for_impl();

    Ok(quote! {
        #st

        impl #impl_generics ::nexus::command::Command for #ident #ty_generics #where_clause {
            const NAME: &'static str = #name;
        }
    })
}

fn default_name(ident: &syn::Ident) -> String {
    ident.to_string().to_lowercase()
}

// -------- parsing --------

struct CommandAttrConfig {
    name: Option<LitStr>,
}

impl CommandAttrConfig {
    fn parse(attr: TokenStream) -> syn::Result<Self> {
        let mut name: Option<LitStr> = None;

        if attr.is_empty() {
            return Ok(Self { name });
        }

        let pairs = syn::parse::Parser::parse2(
            Punctuated::<MetaNameValue, Token![,]>::parse_terminated,
            attr,
        )?;

        for kv in pairs {
            if !kv.path.is_ident("name") {
                return Err(syn::Error::new(
                    kv.path.span(),
                    "unknown key in attribute; expected 'name'",
                ));
            }
            if name.is_some() {
                return Err(syn::Error::new(
                    kv.path.span(),
                    "duplicate key 'name' in attribute",
                ));
            }

            let lit = match kv.value {
                Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(lit),
                    ..
                }) => lit,
                other => {
                    return Err(syn::Error::new(
                        other.span(),
                        "expected string literal for 'name'",
                    ));
                }
            };
            if lit.value().is_empty() {
                return Err(syn::Error::new(lit.span(), "command name must not be empty"));
            }
            name = Some(lit);
        }

        Ok(Self { name })
    }
}
