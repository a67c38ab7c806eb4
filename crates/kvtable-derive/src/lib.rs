use proc_macro::TokenStream;

mod record;

/// Derive `kvtable::traits::Record` and a `<Name>Patch` partial-update struct.
///
/// Field tags use `#[kvtable("...")]`:
/// - `#[kvtable("primaryKey")]` excludes the field from indexing
/// - `#[kvtable("index:idx_name")]` indexes the field under `idx_name`
/// - `#[kvtable("index:idx_addr|r")]` declares a sharded index
#[proc_macro_derive(Record, attributes(kvtable))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input.into()).into()
}
