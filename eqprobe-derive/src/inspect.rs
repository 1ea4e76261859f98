//! Implementation of the `Inspect` derive macro.
//!
//! For structs the macro emits the descriptor table, the synthesizer, and
//! one lens arm per field; for enums it emits leaf semantics: two distinct
//! variants form the prefab pair and there are no probeable fields.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Field, Fields, GenericParam, Member, Result, Type, Variant,
    parse_macro_input, parse_quote,
};

/// Main entry point for the Inspect derive macro.
pub fn derive_inspect_impl(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_inspect_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Per-field analysis: lens target, declared type, and classification.
struct FieldModel {
    member: Member,
    name: String,
    ty: Type,
    skip: bool,
    prefab: bool,
    optional: bool,
    float: bool,
    sequence: bool,
    interior_mutable: bool,
    shared_ref: bool,
}

impl FieldModel {
    fn probed(&self) -> bool {
        !self.skip
    }

    /// The expression producing this field's value for the given pole.
    fn pair_expr(&self, pole: TokenStream) -> TokenStream {
        let ty = &self.ty;
        if self.skip {
            quote! { ::std::default::Default::default() }
        } else if self.prefab {
            quote! { source.registered_pair::<#ty>()?.take(#pole) }
        } else {
            quote! { source.pair::<#ty>()?.take(#pole) }
        }
    }
}

fn generate_inspect_impl(input: &DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let mut bounded_generics = input.generics.clone();
    add_trait_bounds(&mut bounded_generics);
    let (impl_generics, ty_generics, where_clause) = bounded_generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => generate_struct_body(name, &data.fields)?,
        Data::Enum(data) => {
            generate_enum_body(name, &data.variants.iter().collect::<Vec<_>>())?
        }
        Data::Union(_) => {
            return Err(Error::new_spanned(
                input,
                "Inspect derive is not supported for unions",
            ));
        }
    };

    let InspectBody {
        shape_kind,
        field_table,
        synthesize,
        with_field,
        with_field_absent,
        with_field_float,
        field_pair_distinct,
        distinct_claim,
    } = body;

    Ok(quote! {
        impl #impl_generics ::eqprobe::Inspect for #name #ty_generics #where_clause {
            fn shape() -> ::eqprobe::TypeShape {
                static FIELDS: &[::eqprobe::FieldShape] = &[ #field_table ];
                ::eqprobe::TypeShape {
                    type_name: ::std::any::type_name::<Self>(),
                    kind: #shape_kind,
                    fields: FIELDS,
                }
            }

            #synthesize
            #with_field
            #with_field_absent
            #with_field_float
            #field_pair_distinct
        }

        impl #impl_generics ::eqprobe::Prefabricate for #name #ty_generics #where_clause {
            fn prefab_pair(
                source: &mut ::eqprobe::ValueSource,
            ) -> ::std::result::Result<::eqprobe::ValuePair<Self>, ::eqprobe::SynthesisError> {
                let red = <Self as ::eqprobe::Inspect>::synthesize(source, ::eqprobe::Pole::Red)?;
                let black =
                    <Self as ::eqprobe::Inspect>::synthesize(source, ::eqprobe::Pole::Black)?;
                ::std::result::Result::Ok(::eqprobe::ValuePair::from_members(
                    red,
                    black,
                    #distinct_claim,
                ))
            }
        }
    })
}

/// The generated pieces of one `Inspect` impl.
struct InspectBody {
    shape_kind: TokenStream,
    field_table: TokenStream,
    synthesize: TokenStream,
    with_field: TokenStream,
    with_field_absent: TokenStream,
    with_field_float: TokenStream,
    field_pair_distinct: TokenStream,
    distinct_claim: TokenStream,
}

/// Add the bounds the generated impls need to every type parameter.
fn add_trait_bounds(generics: &mut syn::Generics) {
    for param in &mut generics.params {
        if let GenericParam::Type(ref mut type_param) = *param {
            type_param.bounds.push(parse_quote!(::eqprobe::Prefabricate));
        }
    }
}

fn generate_struct_body(name: &syn::Ident, fields: &Fields) -> Result<InspectBody> {
    let models = analyze_fields(fields)?;

    let shape_kind = match fields {
        Fields::Named(_) => quote! { ::eqprobe::ShapeKind::Struct },
        Fields::Unnamed(_) => quote! { ::eqprobe::ShapeKind::TupleStruct },
        Fields::Unit => quote! { ::eqprobe::ShapeKind::UnitStruct },
    };

    let field_table = field_table(&models);

    let construction = {
        let exprs = models.iter().map(|m| {
            let expr = m.pair_expr(quote!(pole));
            match &m.member {
                Member::Named(ident) => quote! { #ident: #expr },
                Member::Unnamed(_) => quote! { #expr },
            }
        });
        match fields {
            Fields::Named(_) => quote! { #name { #(#exprs,)* } },
            Fields::Unnamed(_) => quote! { #name( #(#exprs),* ) },
            Fields::Unit => quote! { #name },
        }
    };
    let uses_source = models.iter().any(|m| m.probed());
    let (pole_param, source_param) = if uses_source {
        (quote!(pole), quote!(source))
    } else {
        (quote!(_pole), quote!(_source))
    };
    let synthesize = quote! {
        fn synthesize(
            #source_param: &mut ::eqprobe::ValueSource,
            #pole_param: ::eqprobe::Pole,
        ) -> ::std::result::Result<Self, ::eqprobe::SynthesisError> {
            ::std::result::Result::Ok(#construction)
        }
    };

    let replace_arms: Vec<TokenStream> = models
        .iter()
        .enumerate()
        .filter(|(_, m)| m.probed())
        .map(|(index, m)| {
            let member = &m.member;
            let expr = m.pair_expr(quote!(pole));
            quote! { #index => next.#member = #expr, }
        })
        .collect();
    let with_field = if replace_arms.is_empty() {
        quote! {
            fn with_field(
                &self,
                _field: usize,
                _pole: ::eqprobe::Pole,
                _source: &mut ::eqprobe::ValueSource,
            ) -> ::std::result::Result<Self, ::eqprobe::SynthesisError> {
                ::std::result::Result::Ok(::std::clone::Clone::clone(self))
            }
        }
    } else {
        quote! {
            fn with_field(
                &self,
                field: usize,
                pole: ::eqprobe::Pole,
                source: &mut ::eqprobe::ValueSource,
            ) -> ::std::result::Result<Self, ::eqprobe::SynthesisError> {
                let mut next = ::std::clone::Clone::clone(self);
                match field {
                    #(#replace_arms)*
                    _ => {}
                }
                ::std::result::Result::Ok(next)
            }
        }
    };

    let absent_arms: Vec<TokenStream> = models
        .iter()
        .enumerate()
        .filter(|(_, m)| m.probed() && m.optional)
        .map(|(index, m)| {
            let member = &m.member;
            quote! {
                #index => {
                    let mut next = ::std::clone::Clone::clone(self);
                    next.#member = ::std::option::Option::None;
                    ::std::option::Option::Some(next)
                }
            }
        })
        .collect();
    let with_field_absent = option_lens(quote!(with_field_absent), quote!(), &absent_arms);

    let float_arms: Vec<TokenStream> = models
        .iter()
        .enumerate()
        .filter(|(_, m)| m.probed() && m.float)
        .map(|(index, m)| {
            let member = &m.member;
            let ty = &m.ty;
            quote! {
                #index => {
                    let mut next = ::std::clone::Clone::clone(self);
                    next.#member = probe.value::<#ty>();
                    ::std::option::Option::Some(next)
                }
            }
        })
        .collect();
    let probe_param = if float_arms.is_empty() { quote!(_probe) } else { quote!(probe) };
    let with_field_float = option_lens(
        quote!(with_field_float),
        quote!(#probe_param: ::eqprobe::FloatProbe),
        &float_arms,
    );

    let distinct_arms: Vec<TokenStream> = models
        .iter()
        .enumerate()
        .filter(|(_, m)| m.probed())
        .map(|(index, m)| {
            let ty = &m.ty;
            if m.prefab {
                quote! {
                    #index => ::std::result::Result::Ok(
                        source.registered_pair::<#ty>()?.is_distinct(),
                    ),
                }
            } else {
                quote! {
                    #index => ::std::result::Result::Ok(source.pair::<#ty>()?.is_distinct()),
                }
            }
        })
        .collect();
    let field_pair_distinct = if distinct_arms.is_empty() {
        quote! {
            fn field_pair_distinct(
                _field: usize,
                _source: &mut ::eqprobe::ValueSource,
            ) -> ::std::result::Result<bool, ::eqprobe::SynthesisError> {
                ::std::result::Result::Ok(false)
            }
        }
    } else {
        quote! {
            fn field_pair_distinct(
                field: usize,
                source: &mut ::eqprobe::ValueSource,
            ) -> ::std::result::Result<bool, ::eqprobe::SynthesisError> {
                match field {
                    #(#distinct_arms)*
                    _ => ::std::result::Result::Ok(false),
                }
            }
        }
    };

    let any_probed = models.iter().any(|m| m.probed());
    let distinct_claim = quote! { #any_probed };

    Ok(InspectBody {
        shape_kind,
        field_table,
        synthesize,
        with_field,
        with_field_absent,
        with_field_float,
        field_pair_distinct,
        distinct_claim,
    })
}

fn generate_enum_body(name: &syn::Ident, variants: &[&Variant]) -> Result<InspectBody> {
    if variants.is_empty() {
        return Err(Error::new_spanned(
            name,
            "cannot derive Inspect for an enum with no variants",
        ));
    }

    let variant_count = variants.len();
    let shape_kind = quote! { ::eqprobe::ShapeKind::Enum { variants: #variant_count } };

    // Red is the first variant, black the last; a single-variant enum uses
    // its payload (if any) to stay distinct, and a single unit variant is
    // declared degenerate so the field is treated as insignificant.
    let red_variant = variants[0];
    let black_variant = variants[variant_count - 1];
    let red_construction =
        variant_construction(name, red_variant, quote!(::eqprobe::Pole::Red))?;
    let black_construction =
        variant_construction(name, black_variant, quote!(::eqprobe::Pole::Black))?;

    let uses_source = !red_variant.fields.is_empty() || !black_variant.fields.is_empty();
    let source_param = if uses_source { quote!(source) } else { quote!(_source) };
    let synthesize = quote! {
        fn synthesize(
            #source_param: &mut ::eqprobe::ValueSource,
            pole: ::eqprobe::Pole,
        ) -> ::std::result::Result<Self, ::eqprobe::SynthesisError> {
            ::std::result::Result::Ok(match pole {
                ::eqprobe::Pole::Red => #red_construction,
                ::eqprobe::Pole::Black => #black_construction,
            })
        }
    };

    let distinct = variant_count > 1 || !red_variant.fields.is_empty();
    let distinct_claim = quote! { #distinct };

    Ok(InspectBody {
        shape_kind,
        field_table: quote! {},
        synthesize,
        with_field: quote! {
            fn with_field(
                &self,
                _field: usize,
                _pole: ::eqprobe::Pole,
                _source: &mut ::eqprobe::ValueSource,
            ) -> ::std::result::Result<Self, ::eqprobe::SynthesisError> {
                ::std::result::Result::Ok(::std::clone::Clone::clone(self))
            }
        },
        with_field_absent: option_lens(quote!(with_field_absent), quote!(), &[]),
        with_field_float: option_lens(
            quote!(with_field_float),
            quote!(_probe: ::eqprobe::FloatProbe),
            &[],
        ),
        field_pair_distinct: quote! {
            fn field_pair_distinct(
                _field: usize,
                _source: &mut ::eqprobe::ValueSource,
            ) -> ::std::result::Result<bool, ::eqprobe::SynthesisError> {
                ::std::result::Result::Ok(false)
            }
        },
        distinct_claim,
    })
}

/// Construct one enum variant with every payload field on the given pole.
fn variant_construction(
    name: &syn::Ident,
    variant: &Variant,
    pole: TokenStream,
) -> Result<TokenStream> {
    let variant_name = &variant.ident;
    Ok(match &variant.fields {
        Fields::Named(fields) => {
            let inits = fields.named.iter().map(|field| {
                let ident = field.ident.as_ref().expect("named field has an ident");
                let ty = &field.ty;
                quote! { #ident: source.pair::<#ty>()?.take(#pole) }
            });
            quote! { #name::#variant_name { #(#inits,)* } }
        }
        Fields::Unnamed(fields) => {
            let inits = fields.unnamed.iter().map(|field| {
                let ty = &field.ty;
                quote! { source.pair::<#ty>()?.take(#pole) }
            });
            quote! { #name::#variant_name( #(#inits),* ) }
        }
        Fields::Unit => quote! { #name::#variant_name },
    })
}

/// Emit an `Option<Self>`-returning lens with the given match arms.
fn option_lens(
    method: TokenStream,
    extra_param: TokenStream,
    arms: &[TokenStream],
) -> TokenStream {
    let comma = if extra_param.is_empty() { quote!() } else { quote!(,) };
    if arms.is_empty() {
        quote! {
            fn #method(&self, _field: usize #comma #extra_param) -> ::std::option::Option<Self> {
                ::std::option::Option::None
            }
        }
    } else {
        quote! {
            fn #method(&self, field: usize #comma #extra_param) -> ::std::option::Option<Self> {
                match field {
                    #(#arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }
    }
}

fn analyze_fields(fields: &Fields) -> Result<Vec<FieldModel>> {
    let list: Vec<&Field> = match fields {
        Fields::Named(named) => named.named.iter().collect(),
        Fields::Unnamed(unnamed) => unnamed.unnamed.iter().collect(),
        Fields::Unit => Vec::new(),
    };

    list.iter()
        .enumerate()
        .map(|(index, field)| {
            let (skip_attr, prefab) = parse_inspect_attributes(field)?;
            let member = match &field.ident {
                Some(ident) => Member::Named(ident.clone()),
                None => Member::Unnamed(syn::Index::from(index)),
            };
            let name = match &field.ident {
                Some(ident) => ident.to_string(),
                None => index.to_string(),
            };
            let class = classify_type(&field.ty);
            Ok(FieldModel {
                member,
                name,
                ty: field.ty.clone(),
                skip: skip_attr || class.phantom,
                prefab,
                optional: class.optional,
                float: class.float,
                sequence: class.sequence,
                interior_mutable: class.interior_mutable,
                shared_ref: class.shared_ref,
            })
        })
        .collect()
}

/// Parse `#[inspect(..)]` attributes on one field.
fn parse_inspect_attributes(field: &Field) -> Result<(bool, bool)> {
    let mut skip = false;
    let mut prefab = false;
    for attr in &field.attrs {
        if attr.path().is_ident("inspect") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else if meta.path.is_ident("prefab") {
                    prefab = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `skip` or `prefab`"))
                }
            })?;
        }
    }
    Ok((skip, prefab))
}

#[derive(Default)]
struct TypeClass {
    phantom: bool,
    optional: bool,
    float: bool,
    sequence: bool,
    interior_mutable: bool,
    shared_ref: bool,
}

/// Syntactic classification of a field's declared type.
fn classify_type(ty: &Type) -> TypeClass {
    let mut class = TypeClass::default();
    match ty {
        Type::Array(_) => class.sequence = true,
        Type::Path(path) => {
            if let Some(segment) = path.path.segments.last() {
                let ident = segment.ident.to_string();
                match ident.as_str() {
                    "PhantomData" => class.phantom = true,
                    "Option" => class.optional = true,
                    "f32" | "f64" => class.float = true,
                    "Vec" | "VecDeque" | "LinkedList" => class.sequence = true,
                    "Cell" | "RefCell" | "Mutex" | "RwLock" => class.interior_mutable = true,
                    "Box" | "Rc" | "Arc" => class.shared_ref = true,
                    other if other.starts_with("Atomic") => class.interior_mutable = true,
                    _ => {}
                }
            }
        }
        _ => {}
    }
    class
}

fn field_table(models: &[FieldModel]) -> TokenStream {
    let entries = models.iter().enumerate().map(|(index, m)| {
        let name = &m.name;
        let type_name = type_to_string(&m.ty);
        let skipped = m.skip;
        let optional = m.optional;
        let float = m.float;
        let sequence = m.sequence;
        let interior_mutable = m.interior_mutable;
        let shared_ref = m.shared_ref;
        let external_prefab = m.prefab;
        quote! {
            ::eqprobe::FieldShape {
                name: #name,
                type_name: #type_name,
                index: #index,
                flags: ::eqprobe::FieldFlags {
                    skipped: #skipped,
                    optional: #optional,
                    float: #float,
                    sequence: #sequence,
                    interior_mutable: #interior_mutable,
                    shared_ref: #shared_ref,
                    external_prefab: #external_prefab,
                },
            },
        }
    });
    quote! { #(#entries)* }
}

/// Render a type the way it was written, without token spacing.
fn type_to_string(ty: &Type) -> String {
    quote!(#ty).to_string().replace(' ', "")
}
