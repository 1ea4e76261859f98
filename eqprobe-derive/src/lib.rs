//! Procedural macros for eqprobe.
//!
//! `#[derive(Inspect)]` emits the descriptor table and the per-field lens
//! functions the verifier's instance synthesizer consumes, plus a
//! `Prefabricate` impl so the type can appear as a field of another type
//! under verification.

mod inspect;

use proc_macro::TokenStream;

/// Derive the `Inspect` and `Prefabricate` traits for a struct or enum.
///
/// Field attributes:
/// - `#[inspect(skip)]` - exclude the field from probing; it is filled
///   with `Default::default()` during synthesis.
/// - `#[inspect(prefab)]` - the field's type cannot be synthesized; a
///   value pair must be registered with `Verifier::with_prefab` before
///   verification.
///
/// `PhantomData` fields are skipped automatically. Enums are synthesized
/// as leaf values from two distinct variants and expose no probeable
/// fields of their own.
#[proc_macro_derive(Inspect, attributes(inspect))]
pub fn derive_inspect(input: TokenStream) -> TokenStream {
    inspect::derive_inspect_impl(input)
}
