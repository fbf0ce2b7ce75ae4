use quote::ToTokens;
use syn::{Attribute, Path, Token, punctuated::Punctuated};

// 将 required 与结构体上已有的 derive 合并为单个 #[derive(...)]，置于属性最前
pub(crate) fn merge_into(attrs: &mut Vec<Attribute>, required: Vec<Path>) -> syn::Result<()> {
    let mut existing: Vec<Path> = Vec::new();
    let mut others: Vec<Attribute> = Vec::new();

    for attr in attrs.drain(..) {
        if attr.path().is_ident("derive") {
            let list = attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)?;
            existing.extend(list);
        } else {
            others.push(attr);
        }
    }

    let mut merged: Vec<Path> = Vec::new();
    for path in required.into_iter().chain(existing) {
        let key = normalized(&path);
        if !merged.iter().any(|p| normalized(p) == key) {
            merged.push(path);
        }
    }

    attrs.push(syn::parse_quote!(#[derive(#(#merged),*)]));
    attrs.extend(others);
    Ok(())
}

// Serialize 与 serde::Serialize 视为同一派生
fn normalized(path: &Path) -> String {
    match path.segments.last() {
        Some(last) if last.ident == "Serialize" || last.ident == "Deserialize" => {
            format!("serde::{}", last.ident)
        }
        Some(last) => last.ident.to_string(),
        None => path.to_token_stream().to_string(),
    }
}
