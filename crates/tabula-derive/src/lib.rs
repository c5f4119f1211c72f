use proc_macro::TokenStream;

mod table_object;

/// Derive `Path`, `TableObject` and typed column accessors.
///
/// ```ignore
/// #[derive(TableObject)]
/// #[table_object(columns(id, name))]
/// pub struct Customer(Record);
/// ```
#[proc_macro_derive(TableObject, attributes(table_object))]
pub fn derive_table_object(input: TokenStream) -> TokenStream {
    table_object::derive_table_object(input.into()).into()
}
