use proc_macro::TokenStream;

mod state;
mod tools;

#[proc_macro_attribute]
pub fn tools(attr: TokenStream, item: TokenStream) -> TokenStream {
    tools::tools_impl(attr, item)
}

/// Derives `GraphState` for a struct with named fields.
///
/// Each field becomes a variant of a generated `<Name>Update` enum. The
/// `#[update(...)]` attribute picks how an update is folded into the field:
/// `replace` (default), `append`, `merge`, or `messages` for id-aware
/// message reduction.
#[proc_macro_derive(State, attributes(update))]
pub fn derive_state(input: TokenStream) -> TokenStream {
    state::derive_state_impl(input)
}
