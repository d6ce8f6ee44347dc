//! Implementation of `#[derive(Record)]`

use crate::crate_paths::get_tagwire_di_crate;
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::{DeriveInput, Fields, LitStr, Result, Visibility};

/// How a field is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
	/// Clone of the value stored under the field's own type
	Value,
	/// `Iface<dyn Trait>` through the interface descriptor
	Interface,
}

/// Parsed `#[inject(...)]` options of one field
#[derive(Default)]
struct FieldOptions {
	tag: Option<LitStr>,
	skip: bool,
	interface: bool,
	present: bool,
}

fn parse_field_options(field: &syn::Field) -> Result<FieldOptions> {
	let mut options = FieldOptions::default();

	for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("inject")) {
		options.present = true;
		attr.parse_nested_meta(|meta| {
			if meta.path.is_ident("skip") {
				options.skip = true;
				Ok(())
			} else if meta.path.is_ident("interface") {
				options.interface = true;
				Ok(())
			} else if meta.path.is_ident("tag") {
				options.tag = Some(meta.value()?.parse()?);
				Ok(())
			} else {
				Err(meta.error("unknown `inject` option; expected `tag`, `skip` or `interface`"))
			}
		})?;
	}

	if options.skip && (options.interface || options.tag.is_some()) {
		return Err(syn::Error::new_spanned(
			field,
			"`#[inject(skip)]` cannot be combined with other `inject` options",
		));
	}

	Ok(options)
}

/// Implementation of the `#[derive(Record)]` macro
///
/// Generates `Record` (field list and tag-based assignment) and
/// `AssignTarget` for structs with named fields. Only `pub` fields are bound.
pub fn record_impl(input: DeriveInput) -> Result<TokenStream> {
	let di_crate = get_tagwire_di_crate()?;
	let struct_name = &input.ident;
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

	let fields = match &input.data {
		syn::Data::Struct(data_struct) => match &data_struct.fields {
			Fields::Named(fields) => Some(&fields.named),
			Fields::Unit => None,
			Fields::Unnamed(_) => {
				return Err(syn::Error::new_spanned(
					struct_name,
					"#[derive(Record)] cannot be applied to tuple structs",
				));
			}
		},
		_ => {
			return Err(syn::Error::new_spanned(
				struct_name,
				"#[derive(Record)] can only be applied to structs",
			));
		}
	};

	let mut seen_tags = HashSet::new();
	let mut field_specs = Vec::new();
	let mut assign_arms = Vec::new();

	for field in fields.into_iter().flatten() {
		let options = parse_field_options(field)?;
		let is_public = matches!(field.vis, Visibility::Public(_));

		if !is_public {
			if options.present {
				return Err(syn::Error::new_spanned(
					field,
					"`#[inject]` can only be used on `pub` fields; private fields are never bound",
				));
			}
			continue;
		}
		if options.skip {
			continue;
		}

		let Some(name) = field.ident.as_ref() else {
			continue;
		};
		let ty = &field.ty;
		let tag = options
			.tag
			.unwrap_or_else(|| LitStr::new(&name.to_string(), name.span()));

		if !seen_tags.insert(tag.value()) {
			return Err(syn::Error::new_spanned(
				&tag,
				format!("duplicate tag `{}` in #[derive(Record)]", tag.value()),
			));
		}

		let resolution = if options.interface {
			Resolution::Interface
		} else {
			Resolution::Value
		};
		let conversion = match resolution {
			Resolution::Value => quote! { <#ty as #di_crate::FieldValue> },
			Resolution::Interface => quote! { <#ty as #di_crate::Dependency> },
		};

		field_specs.push(quote! {
			#di_crate::Field::new(#tag, #conversion::type_key())
		});
		assign_arms.push(quote! {
			#tag => match #conversion::from_value(__value) {
				::std::option::Option::Some(__assigned) => {
					self.#name = __assigned;
					true
				}
				::std::option::Option::None => false,
			},
		});
	}

	let expanded = quote! {
		impl #impl_generics #di_crate::Record for #struct_name #ty_generics #where_clause {
			fn fields(&self) -> ::std::vec::Vec<#di_crate::Field> {
				::std::vec![#(#field_specs),*]
			}

			#[allow(unused_variables)]
			fn assign_field(&mut self, __tag: &str, __value: &#di_crate::Value) -> bool {
				match __tag {
					#(#assign_arms)*
					_ => false,
				}
			}
		}

		impl #impl_generics #di_crate::AssignTarget for #struct_name #ty_generics #where_clause {
			fn as_record_mut(&mut self) -> ::std::option::Option<&mut dyn #di_crate::Record> {
				::std::option::Option::Some(self)
			}
		}
	};

	Ok(expanded)
}
