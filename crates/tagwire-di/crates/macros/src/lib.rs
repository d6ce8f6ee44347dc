//! Procedural macros for tagwire dependency injection
//!
//! This crate provides:
//! - `#[derive(Record)]` - Generate field metadata and assignment for `Registry::assign_fields`

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod crate_paths;
mod record;

/// Derive field binding for a struct with named fields
///
/// Every `pub` field becomes bindable under a tag equal to its name.
///
/// # Example
///
/// ```ignore
/// use tagwire_di::{Iface, Record};
///
/// #[derive(Record)]
/// struct Request {
///     pub user: String,
///     #[inject(tag = "Tm")]
///     pub started_at: u64,
///     #[inject(interface)]
///     pub clock: Iface<dyn Clock>,
///     #[inject(skip)]
///     pub attempts: u32,
///     internal: u8,
/// }
/// ```
///
/// # Attributes
///
/// - `#[inject(tag = "...")]` - Bind under a different tag
/// - `#[inject(skip)]` - Never bind this field
/// - `#[inject(interface)]` - Resolve an `Iface<dyn Trait>` field through the interface descriptor
#[proc_macro_derive(Record, attributes(inject))]
pub fn derive_record(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);

	record::record_impl(input)
		.unwrap_or_else(|e| e.to_compile_error())
		.into()
}
