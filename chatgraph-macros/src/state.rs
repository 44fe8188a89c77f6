use convert_case::{Case, Casing};
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Error, Fields};

pub fn derive_state_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let vis = &input.vis;
    let update_name = format_ident!("{}Update", name);

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => fields.named.clone(),
            _ => {
                return Error::new_spanned(&input, "State can only be derived for named fields")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return Error::new_spanned(&input, "State can only be derived for structs")
                .to_compile_error()
                .into()
        }
    };

    let mut update_variants = vec![];
    let mut update_match_arms = vec![];

    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            continue;
        };
        let field_type = &field.ty;

        let strategy = match field
            .attrs
            .iter()
            .find(|attr| attr.path().is_ident("update"))
            .map(|attr| attr.parse_args::<syn::Ident>())
        {
            Some(Ok(ident)) => ident.to_string(),
            Some(Err(err)) => return err.to_compile_error().into(),
            None => "replace".to_string(),
        };

        let variant_name = format_ident!("{}", field_name.to_string().to_case(Case::Pascal));
        update_variants.push(quote! {
            #variant_name(#field_type)
        });

        let update_impl = match strategy.as_str() {
            "append" => quote! { self.#field_name.extend(value) },
            "merge" => quote! { self.#field_name.extend(value.into_iter()) },
            "replace" => quote! { self.#field_name = value },
            "messages" => quote! {
                ::chatgraph_core::types::add_messages(&mut self.#field_name, value)
            },
            other => {
                let msg = format!(
                    "unknown update strategy `{}`; expected replace, append, merge or messages",
                    other
                );
                return Error::new_spanned(&field_name, msg).to_compile_error().into();
            }
        };

        update_match_arms.push(quote! {
            #update_name::#variant_name(value) => { #update_impl }
        });
    }

    let expanded = quote! {
        #[derive(Debug, Clone)]
        #vis enum #update_name {
            #(#update_variants),*
        }

        impl ::chatgraph_core::types::GraphState for #name {
            type Update = #update_name;

            fn apply(&mut self, update: Self::Update) {
                match update {
                    #(#update_match_arms),*
                }
            }
        }
    };

    TokenStream::from(expanded)
}
