use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, parse_macro_input};

#[proc_macro_derive(Widget, attributes(widget))]
pub fn derive_widget(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            input.ident,
            "Widget derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let form_part = match struct_flags(&input.attrs) {
        Ok(flags) => flags,
        Err(error) => return error.to_compile_error().into(),
    };

    let widget_ident = input.ident;
    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new(
                    Span::call_site(),
                    "Widget derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(Span::call_site(), "Widget derive is only supported on structs")
                .to_compile_error()
                .into();
        }
    };

    let mut marked = None;
    let mut named_base = None;
    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        match is_base_field(&field.attrs) {
            Ok(true) => {
                if marked.is_some() {
                    return syn::Error::new_spanned(
                        field_ident,
                        "only one field may be marked #[widget(base)]",
                    )
                    .to_compile_error()
                    .into();
                }
                marked = Some(field_ident);
            }
            Ok(false) => {
                if field_ident == "base" {
                    named_base = Some(field_ident);
                }
            }
            Err(error) => return error.to_compile_error().into(),
        }
    }

    let Some(base_field) = marked.or(named_base) else {
        return syn::Error::new(
            Span::call_site(),
            "Widget derive needs a `base: WidgetBase` field or a field marked #[widget(base)]",
        )
        .to_compile_error()
        .into();
    };

    let calmform = calmform_path();
    let form_part_method = form_part.then(|| {
        quote! {
            fn as_form_part(&self) -> ::core::option::Option<&dyn #calmform::contracts::FormPart> {
                ::core::option::Option::Some(self)
            }
        }
    });

    quote! {
        impl #calmform::contracts::Widget for #widget_ident {
            fn base(&self) -> &#calmform::contracts::WidgetBase {
                &self.#base_field
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            #form_part_method
        }
    }
    .into()
}

fn struct_flags(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut form_part = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("widget")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("form_part") {
                form_part = true;
                Ok(())
            } else {
                Err(meta.error("unsupported widget attribute, expected `form_part`"))
            }
        })?;
    }
    Ok(form_part)
}

fn is_base_field(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut base = false;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("widget")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("base") {
                base = true;
                Ok(())
            } else {
                Err(meta.error("unsupported widget field attribute, expected `base`"))
            }
        })?;
    }
    Ok(base)
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
