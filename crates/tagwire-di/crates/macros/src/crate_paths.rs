//! Crate path resolution for generated code

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::TokenStream;
use quote::quote;

/// Resolves the path to the tagwire_di crate dynamically.
///
/// Prefers a direct `tagwire-di` dependency and falls back to the `tagwire`
/// facade, accounting for renamed dependencies.
pub(crate) fn get_tagwire_di_crate() -> syn::Result<TokenStream> {
	if let Ok(found) = crate_name("tagwire-di") {
		return Ok(path_for(found, "tagwire_di"));
	}

	match crate_name("tagwire") {
		Ok(found) => Ok(path_for(found, "tagwire")),
		Err(e) => Err(syn::Error::new(
			proc_macro2::Span::call_site(),
			format!(
				"failed to resolve `tagwire-di` crate: {}. Ensure `tagwire` or `tagwire-di` is listed in Cargo.toml dependencies.",
				e
			),
		)),
	}
}

/// Absolute path to a found crate. `Itself` still uses the extern name:
/// inside integration tests and doctests `crate` is the test crate.
fn path_for(found: FoundCrate, own_name: &str) -> TokenStream {
	let name = match found {
		FoundCrate::Itself => own_name.to_string(),
		FoundCrate::Name(name) => name,
	};
	let ident = syn::Ident::new(&name, proc_macro2::Span::call_site());
	quote!(::#ident)
}
