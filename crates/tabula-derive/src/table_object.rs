use darling::{FromDeriveInput, FromField, ast, util::PathList};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Error, Generics, Ident, Member, Path};

///
/// TableObjectArgs
///

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(table_object), supports(struct_newtype, struct_named))]
struct TableObjectArgs {
    ident: Ident,
    generics: Generics,
    data: ast::Data<(), FieldArgs>,

    /// Columns that get a typed accessor method.
    #[darling(default)]
    columns: PathList,

    /// Overrides the class path; defaults to `module_path!()::Name`.
    #[darling(default)]
    path: Option<String>,

    /// The type writes its own `ObjectHooks` impl.
    #[darling(default)]
    hooks: bool,
}

///
/// FieldArgs
///

#[derive(Debug, FromField)]
#[darling(attributes(table_object))]
struct FieldArgs {
    ident: Option<Ident>,

    #[darling(default)]
    record: bool,
}

// derive_table_object
pub fn derive_table_object(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    let args = match TableObjectArgs::from_derive_input(&input) {
        Ok(args) => args,
        Err(err) => return err.write_errors(),
    };

    match expand(&args) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error(),
    }
}

fn expand(args: &TableObjectArgs) -> Result<TokenStream, Error> {
    let ident = &args.ident;
    let (impl_generics, ty_generics, where_clause) = args.generics.split_for_impl();

    let fields = args
        .data
        .as_ref()
        .take_struct()
        .ok_or_else(|| Error::new_spanned(ident, "TableObject can only be derived for structs"))?;

    let record_index = record_field(ident, &fields.fields)?;
    let record_member = member(fields.fields[record_index], record_index);

    // every other field starts from its Default
    let construct = if fields.style == ast::Style::Tuple {
        quote!(Self(record))
    } else {
        let inits = fields.fields.iter().enumerate().map(|(index, field)| {
            let name = &field.ident;
            if index == record_index {
                quote!(#name: record)
            } else {
                quote!(#name: ::core::default::Default::default())
            }
        });

        quote!(Self { #(#inits),* })
    };

    let path = args.path.as_ref().map_or_else(
        || {
            let name = ident.to_string();
            quote!(concat!(module_path!(), "::", #name))
        },
        |path| quote!(#path),
    );

    let columns = args
        .columns
        .iter()
        .map(column_ident)
        .collect::<Result<Vec<_>, _>>()?;
    let column_names: Vec<String> = columns
        .iter()
        .map(|ident| {
            let name = ident.to_string();
            name.strip_prefix("r#").unwrap_or(&name).to_string()
        })
        .collect();

    let accessors = columns.iter().zip(&column_names).map(|(method, name)| {
        quote! {
            #[doc = concat!("Live value of the `", #name, "` column.")]
            pub fn #method(&self) -> ::core::result::Result<::tabula::value::Value, ::tabula::error::Error> {
                ::tabula::traits::TableObject::record(self).get(#name)
            }
        }
    });

    let hooks = if args.hooks {
        quote!()
    } else {
        quote! {
            impl #impl_generics ::tabula::traits::ObjectHooks for #ident #ty_generics #where_clause {}
        }
    };

    Ok(quote! {
        impl #impl_generics ::tabula::traits::Path for #ident #ty_generics #where_clause {
            const PATH: &'static str = #path;
        }

        impl #impl_generics ::tabula::traits::TableObject for #ident #ty_generics #where_clause {
            const COLUMNS: &'static [&'static str] = &[#(#column_names),*];

            fn from_record(record: ::tabula::record::Record) -> Self {
                #construct
            }

            fn record(&self) -> &::tabula::record::Record {
                &self.#record_member
            }

            fn into_record(self) -> ::tabula::record::Record {
                self.#record_member
            }
        }

        #hooks

        impl #impl_generics #ident #ty_generics #where_clause {
            #(#accessors)*
        }
    })
}

// the field marked #[table_object(record)], else one named `record`, else
// the only field
fn record_field(ident: &Ident, fields: &[&FieldArgs]) -> Result<usize, Error> {
    let marked: Vec<usize> = fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.record)
        .map(|(index, _)| index)
        .collect();

    match marked.as_slice() {
        [index] => return Ok(*index),
        [] => {}
        _ => {
            return Err(Error::new_spanned(
                ident,
                "only one field can be marked #[table_object(record)]",
            ));
        }
    }

    if let Some(index) = fields
        .iter()
        .position(|field| field.ident.as_ref().is_some_and(|i| i == "record"))
    {
        return Ok(index);
    }

    if fields.len() == 1 {
        return Ok(0);
    }

    Err(Error::new_spanned(
        ident,
        "mark the Record field with #[table_object(record)]",
    ))
}

fn member(field: &FieldArgs, index: usize) -> Member {
    field
        .ident
        .clone()
        .map_or_else(|| Member::from(index), Member::Named)
}

fn column_ident(path: &Path) -> Result<&Ident, Error> {
    path.get_ident()
        .ok_or_else(|| Error::new_spanned(path, "column names must be plain identifiers"))
}
