use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Error, Field, Fields, LitStr, ext::IdentExt};

const TAG_ATTR: &str = "kvtable";

// derive_record
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let ident = &input.ident;
    let vis = &input.vis;
    let patch_ident = format_ident!("{}Patch", ident);

    if !input.generics.params.is_empty() {
        return Error::new_spanned(&input.generics, "Record cannot be derived for generic types")
            .to_compile_error();
    }

    let fields = if let Data::Struct(data) = &input.data {
        if let Fields::Named(named) = &data.fields {
            &named.named
        } else {
            let err = Error::new_spanned(
                &data.fields,
                "Record can only be derived for structs with named fields",
            );
            return err.to_compile_error();
        }
    } else {
        let err = Error::new_spanned(
            &input.ident,
            "Record can only be derived for structs with named fields",
        );
        return err.to_compile_error();
    };

    let mut models = Vec::new();
    let mut text_arms = Vec::new();
    let mut touch_arms = Vec::new();
    let mut merges = Vec::new();
    let mut patch_fields = Vec::new();
    let mut field_idents = Vec::new();

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            return Error::new_spanned(field, "expected a named field").to_compile_error();
        };
        let field_name = field_ident.unraw().to_string();
        let field_ty = &field.ty;
        let ty_text = quote!(#field_ty).to_string().replace(' ', "");

        let tag = match field_tag(field) {
            Ok(tag) => tag,
            Err(err) => return err.to_compile_error(),
        };

        models.push(quote! {
            ::kvtable::model::field::FieldModel::new(#field_name, #ty_text, #tag)
        });

        if tag.contains("index:") {
            text_arms.push(quote! {
                #field_name => ::kvtable::traits::IndexValue::to_index_text(&self.#field_ident),
            });
        }

        touch_arms.push(quote! {
            #field_name => patch.#field_ident.is_some(),
        });

        merges.push(quote! {
            if let Some(value) = #field_ident {
                self.#field_ident = value;
            }
        });

        patch_fields.push(quote! {
            #vis #field_ident: Option<#field_ty>,
        });
        field_idents.push(field_ident);
    }

    let patch_doc = format!("Partial update for [`{ident}`]; `None` fields are left unchanged.");

    quote! {
        #[doc = #patch_doc]
        #[derive(Clone, Default)]
        #vis struct #patch_ident {
            #(#patch_fields)*
        }

        impl ::kvtable::traits::Record for #ident {
            type Patch = #patch_ident;

            const FIELDS: &'static [::kvtable::model::field::FieldModel] = &[
                #(#models),*
            ];

            fn field_text(&self, field: &str) -> Option<String> {
                match field {
                    #(#text_arms)*
                    _ => None,
                }
            }

            fn merge(&mut self, patch: Self::Patch) {
                let #patch_ident { #(#field_idents),* } = patch;
                #(#merges)*
            }

            fn patch_touches(patch: &Self::Patch, field: &str) -> bool {
                match field {
                    #(#touch_arms)*
                    _ => false,
                }
            }
        }
    }
}

// field_tag
// Read the single `#[kvtable("...")]` tag on a field; untagged fields yield "".
fn field_tag(field: &Field) -> Result<String, Error> {
    let mut tag: Option<String> = None;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident(TAG_ATTR)) {
        if tag.is_some() {
            return Err(Error::new_spanned(attr, "duplicate #[kvtable] attribute"));
        }

        let lit: LitStr = attr.parse_args()?;
        tag = Some(lit.value());
    }

    Ok(tag.unwrap_or_default())
}
