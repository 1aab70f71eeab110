mod table_record;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(TableRecord)] derive macro
// ============================================================================

/// Derive macro for the `TableRecord` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, TableRecord)]
/// #[table_record(table = "user_grail_searches")]
/// struct GrailSearch {
///     #[table_record(id)]
///     pub id: String,
///     pub series_title: String,
/// }
/// ```
///
/// - `#[table_record(table = "...")]` sets the backing table name.
///   If omitted, defaults to snake_case struct name + "s".
/// - `#[table_record(id)]` marks the field used as the unique identifier.
///   If omitted, defaults to a field named `id`.
#[proc_macro_derive(TableRecord, attributes(table_record))]
pub fn derive_table_record(input: TokenStream) -> TokenStream {
    table_record::derive_table_record(input)
}
