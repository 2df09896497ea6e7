use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

#[proc_macro_derive(FormModel)]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let model_ident = input.ident;
    let fields_struct_ident = format_ident!("{model_ident}Fields");

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new(
                    Span::call_site(),
                    "FormModel derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(
                Span::call_site(),
                "FormModel derive is only supported on structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let calmform = calmform_path();
    let mut field_names = Vec::new();
    let mut name_methods = Vec::new();
    let mut parse_fields = Vec::new();
    let mut write_fields = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let field_ty = field.ty;
        let field_name = field_ident.unraw().to_string();

        name_methods.push(quote! {
            pub const fn #field_ident(&self) -> &'static str {
                #field_name
            }
        });

        parse_fields.push(quote! {
            #field_ident: {
                let raw = values.value_or_empty(#field_name);
                <#field_ty as #calmform::form::FieldValue>::parse_field(raw).map_err(|reason| {
                    #calmform::form::FormError::InvalidFieldValue {
                        field: #field_name.to_owned(),
                        value: raw.to_owned(),
                        reason,
                    }
                })?
            }
        });

        write_fields.push(quote! {
            values.insert(
                #field_name,
                <#field_ty as #calmform::form::FieldValue>::to_field(&self.#field_ident),
            );
        });

        field_names.push(field_name);
    }

    quote! {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #fields_struct_ident;

        impl #fields_struct_ident {
            #(#name_methods)*
        }

        impl #calmform::form::FormModel for #model_ident {
            type Fields = #fields_struct_ident;

            const FIELD_NAMES: &'static [&'static str] = &[#(#field_names),*];

            fn fields() -> Self::Fields {
                #fields_struct_ident
            }

            fn from_values(
                values: &#calmform::form::FormValues,
            ) -> #calmform::form::FormResult<Self> {
                Ok(Self {
                    #(#parse_fields),*
                })
            }

            fn to_values(&self) -> #calmform::form::FormValues {
                let mut values = #calmform::form::FormValues::new();
                #(#write_fields)*
                values
            }
        }
    }
    .into()
}

fn calmform_path() -> TokenStream2 {
    match crate_name("calmform") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::calmform),
    }
}
