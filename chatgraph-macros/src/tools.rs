use convert_case::{Case, Casing};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as Pm2TokenStream;
use quote::{quote, ToTokens};
use syn::{
    parse::Parse, parse::ParseStream, punctuated::Punctuated, token::Comma, Error, FnArg,
    ImplItem, ImplItemFn, Item, MetaNameValue, Result as SynResult, ReturnType, Type,
};

/// Comma-separated `method = "description"` pairs.
struct ToolsAttribute {
    name_values: Punctuated<MetaNameValue, Comma>,
}

impl Parse for ToolsAttribute {
    fn parse(input: ParseStream) -> SynResult<Self> {
        let name_values = Punctuated::<MetaNameValue, Comma>::parse_terminated(input)?;
        Ok(Self { name_values })
    }
}

/// Entry point for the `#[tools(...)]` attribute macro.
///
/// ```ignore
/// #[tools(add_item = "Add an item to the packlist", list_items = "List missing items")]
/// impl Packlist {
///     async fn add_item(&self, params: ItemParams) -> Result<String, ToolError> { ... }
///     async fn list_items(&self) -> Vec<String> { ... }
/// }
/// ```
///
/// Each listed method becomes a `<Type><Method>` tuple struct wrapping the
/// impl's type and implementing `ToolFunction`. Methods without a parameter
/// take `NoParams`.
pub fn tools_impl(attr: TokenStream, item: TokenStream) -> TokenStream {
    let tool_map = match parse_tools_map(attr.into()) {
        Ok(map) => map,
        Err(err) => return err.to_compile_error().into(),
    };

    let item_impl = match syn::parse_macro_input!(item as Item) {
        Item::Impl(ii) => ii,
        other => {
            return Error::new_spanned(other, "#[tools(...)] can only be applied to an impl block.")
                .to_compile_error()
                .into();
        }
    };

    let tool_type = &*item_impl.self_ty;
    let mut expansions = Vec::new();

    for (method_name, description) in tool_map {
        let Some(method_fn) = find_method_by_name(&item_impl.items, &method_name) else {
            let msg = format!("Method `{}` not found in impl block.", method_name);
            expansions.push(Error::new_spanned(&item_impl, msg).to_compile_error());
            continue;
        };

        let signature = match parse_signature(method_fn) {
            Ok(sig) => sig,
            Err(err) => {
                expansions.push(err.to_compile_error());
                continue;
            }
        };

        let struct_name = syn::Ident::new(
            &format!(
                "{}{}",
                type_to_ident_str(tool_type),
                method_name.to_case(Case::Pascal)
            ),
            method_fn.sig.ident.span(),
        );
        let method_ident = &method_fn.sig.ident;

        let (params_ty, call) = match &signature.params {
            Some(ty) => (
                ty.to_token_stream(),
                quote! { self.0.#method_ident(params).await },
            ),
            None => (
                quote! { ::chatgraph_core::tool::NoParams },
                quote! { { let _ = params; self.0.#method_ident().await } },
            ),
        };
        let call_stmt = if signature.is_result {
            quote! { Ok(#call?) }
        } else {
            quote! { Ok(#call) }
        };
        let success_ty = &signature.success;

        expansions.push(quote! {
            #[derive(Clone)]
            pub struct #struct_name(pub #tool_type);

            #[::chatgraph_core::async_trait]
            impl ::chatgraph_core::tool::ToolFunction for #struct_name {
                type Params = #params_ty;
                type Response = #success_ty;

                fn name() -> &'static str { #method_name }
                fn description() -> &'static str { #description }

                async fn execute(
                    &self,
                    params: Self::Params,
                ) -> ::std::result::Result<Self::Response, ::chatgraph_core::types::ToolError> {
                    #call_stmt
                }
            }
        });
    }

    let final_ts = quote! {
        #item_impl
        #(#expansions)*
    };
    final_ts.into()
}

struct MethodSignature {
    params: Option<Type>,
    success: Type,
    is_result: bool,
}

fn parse_tools_map(attr_ts: Pm2TokenStream) -> Result<Vec<(String, String)>, Error> {
    let parsed = syn::parse2::<ToolsAttribute>(attr_ts)?;

    let mut result = Vec::new();
    for nv in parsed.name_values {
        let ident = nv
            .path
            .get_ident()
            .ok_or_else(|| Error::new_spanned(&nv.path, "Expected an identifier on left side"))?
            .to_string();

        if let syn::Expr::Lit(expr_lit) = &nv.value {
            if let syn::Lit::Str(s) = &expr_lit.lit {
                result.push((ident, s.value()));
                continue;
            }
        }
        return Err(Error::new_spanned(
            &nv.value,
            "Expected a string literal on right side (e.g. `foo = \"desc\"`)",
        ));
    }
    Ok(result)
}

fn find_method_by_name<'a>(items: &'a [ImplItem], name: &str) -> Option<&'a ImplItemFn> {
    items.iter().find_map(|itm| match itm {
        ImplItem::Fn(m) if m.sig.ident == name => Some(m),
        _ => None,
    })
}

fn parse_signature(m: &ImplItemFn) -> Result<MethodSignature, Error> {
    if m.sig.asyncness.is_none() {
        return Err(Error::new_spanned(&m.sig, "Tool methods must be async"));
    }

    let mut typed = m.sig.inputs.iter().filter_map(|arg| match arg {
        FnArg::Typed(pat_type) => Some((*pat_type.ty).clone()),
        FnArg::Receiver(_) => None,
    });
    let params = typed.next();
    if typed.next().is_some() {
        return Err(Error::new_spanned(
            &m.sig,
            "Tool methods take at most one parameter besides &self",
        ));
    }

    let return_ty = match &m.sig.output {
        ReturnType::Default => {
            return Err(Error::new_spanned(
                m,
                "Method must return a type (like T or Result<T, E>)",
            ));
        }
        ReturnType::Type(_, box_ty) => *box_ty.clone(),
    };

    let (success, is_result) = parse_success_type(return_ty);
    Ok(MethodSignature {
        params,
        success,
        is_result,
    })
}

/// `Result<T, E>` yields `(T, true)`, any other type `(T, false)`.
fn parse_success_type(ty: Type) -> (Type, bool) {
    if let Type::Path(type_path) = &ty {
        if let Some(last_seg) = type_path.path.segments.last() {
            if last_seg.ident == "Result" {
                if let syn::PathArguments::AngleBracketed(ref generic_args) = last_seg.arguments {
                    let mut args_iter = generic_args.args.iter();
                    if let (Some(syn::GenericArgument::Type(success)), Some(_)) =
                        (args_iter.next(), args_iter.next())
                    {
                        return (success.clone(), true);
                    }
                }
            }
        }
    }
    (ty, false)
}

fn type_to_ident_str(ty: &Type) -> String {
    ty.to_token_stream()
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}
