use proc_macro::TokenStream;
use proc_macro2::Span;
use proc_macro_crate::{crate_name, FoundCrate};
use quote::{format_ident, quote, quote_spanned};
use syn::{
    parse::Parser, parse_macro_input, punctuated::Punctuated, spanned::Spanned, Attribute, Error,
    FnArg, Ident, Item, ItemFn, ItemMod, ReturnType, Token, Type,
};

/// Resolves the `utest` crate path (handles dependency renames).
fn utest_path() -> syn::Path {
    match crate_name("utest") {
        // `utest` declares `extern crate self as utest`.
        Ok(FoundCrate::Itself) => syn::parse_quote!(::utest),
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            syn::parse_quote!(::#ident)
        }
        Err(_) => syn::parse_quote!(::utest), // fallback
    }
}

#[derive(Default)]
struct CaseArgs {
    suite: Option<Ident>,
    skip: bool,
}

impl CaseArgs {
    fn parse(tokens: proc_macro2::TokenStream) -> syn::Result<Self> {
        let idents = Punctuated::<Ident, Token![,]>::parse_terminated.parse2(tokens)?;
        let mut args = CaseArgs::default();

        for ident in idents {
            if ident == "skip" {
                if args.skip {
                    return Err(Error::new_spanned(ident, "utest: duplicate `skip`"));
                }
                args.skip = true;
            } else if args.suite.is_none() {
                args.suite = Some(ident);
            } else {
                return Err(Error::new_spanned(
                    ident,
                    "utest: expected `#[utest(suite)]` or `#[utest(suite, skip)]`",
                ));
            }
        }

        Ok(args)
    }

    fn to_tokens(&self) -> proc_macro2::TokenStream {
        let suite = self.suite.iter();
        let skip = self.skip.then(|| quote!(skip)).into_iter();

        quote!(#(#suite,)* #(#skip)*)
    }
}

/// Declares a test case.
///
/// `#[utest(suite)]` on a `fn()` declares a plain test, on a `fn(&mut T)` a test with a
/// private data block of type `T: Fixture`. `#[utest(suite, skip)]` declares it skipped.
/// On a `mod`, the module name is the suite of every `#[utest]` function inside it.
#[proc_macro_attribute]
pub fn utest(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as Item);

    let expanded = match input {
        Item::Fn(func) => CaseArgs::parse(attr.into()).and_then(|args| expand_fn(args, func)),
        Item::Mod(module) => expand_mod(attr.into(), module),
        other => Err(Error::new_spanned(
            other,
            "#[utest] can only be applied to fn or mod",
        )),
    };

    expanded.unwrap_or_else(Error::into_compile_error).into()
}

fn fixture_type(arg: &FnArg) -> syn::Result<&Type> {
    let FnArg::Typed(typed) = arg else {
        return Err(Error::new_spanned(arg, "utest: methods cannot be tests"));
    };

    match &*typed.ty {
        Type::Reference(reference) if reference.mutability.is_some() => Ok(&reference.elem),
        other => Err(Error::new_spanned(
            other,
            "utest: the data block must be taken as `&mut T`",
        )),
    }
}

fn expand_fn(args: CaseArgs, func: ItemFn) -> syn::Result<proc_macro2::TokenStream> {
    let sig = &func.sig;

    let Some(suite) = &args.suite else {
        return Err(Error::new_spanned(
            &sig.ident,
            "utest: missing suite name, use `#[utest(suite)]` or place the test in a `#[utest] mod`",
        ));
    };

    if !sig.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &sig.generics,
            "utest: generic functions are not supported",
        ));
    }
    if sig.asyncness.is_some() {
        return Err(Error::new_spanned(
            sig.asyncness,
            "utest: async functions are not supported",
        ));
    }
    if let ReturnType::Type(..) = sig.output {
        return Err(Error::new_spanned(
            &sig.output,
            "utest: tests cannot return a value",
        ));
    }

    let ident = &sig.ident;
    let utest = utest_path();
    let skip = args.skip;

    let run = match sig.inputs.len() {
        0 => quote!(#utest::case::RunEntry::Nullary(#ident)),
        1 => {
            let data = fixture_type(&sig.inputs[0])?;

            quote! {{
                fn __utest_block() -> ::std::boxed::Box<dyn #utest::case::DataBlock> {
                    #utest::case::data_block::<#data>(#ident)
                }

                #utest::case::RunEntry::Unary(__utest_block)
            }}
        }
        _ => {
            return Err(Error::new_spanned(
                &sig.inputs,
                "utest: a test takes no arguments or a single `&mut T` data block",
            ))
        }
    };

    let span = ident.span();
    let site = quote_spanned! {span=>
        #utest::DeclarationSite::new(
            ::core::file!(),
            ::core::line!(),
            ::core::column!(),
        )
    };

    let case = format_ident!("__UTEST_CASE_{}", ident);

    Ok(quote! {
        #func

        #[doc(hidden)]
        const _: () = {
            #[allow(non_upper_case_globals)]
            static #case: #utest::TestCase = #utest::TestCase::new(
                ::core::stringify!(#suite),
                ::core::stringify!(#ident),
                #run,
                #skip,
                #site,
            );

            #[#utest::__private::ctor::ctor(crate_path = #utest::__private::ctor)]
            unsafe fn __utest_register() {
                #utest::registry::register(&#case);
            }
        };
    })
}

fn is_utest_attr(attr: &Attribute) -> bool {
    attr.path()
        .segments
        .last()
        .is_some_and(|segment| segment.ident == "utest")
}

/// Hands the module name down to every `#[utest]` function inside the module.
fn expand_mod(attr: proc_macro2::TokenStream, mut module: ItemMod) -> syn::Result<proc_macro2::TokenStream> {
    if !attr.is_empty() {
        return Err(Error::new(
            attr.span(),
            "utest: a suite module takes no arguments, its name is the suite",
        ));
    }

    let suite = module.ident.clone();

    let Some((_, items)) = module.content.as_mut() else {
        return Err(Error::new(
            suite.span(),
            "utest: suite modules must be inline",
        ));
    };

    let utest = utest_path();

    for item in items.iter_mut() {
        let Item::Fn(func) = item else {
            continue;
        };

        for attr in func.attrs.iter_mut().filter(|attr| is_utest_attr(attr)) {
            let mut args = match &attr.meta {
                syn::Meta::Path(_) => CaseArgs::default(),
                syn::Meta::List(list) => CaseArgs::parse(list.tokens.clone())?,
                syn::Meta::NameValue(meta) => {
                    return Err(Error::new_spanned(meta, "utest: unexpected `=`"));
                }
            };

            args.suite.get_or_insert_with(|| suite.clone());

            let tokens = args.to_tokens();
            *attr = syn::parse_quote!(#[#utest::utest(#tokens)]);
        }
    }

    Ok(quote!(#module))
}

/// Attribute macro `#[utest::main]`.
///
/// The annotated `fn main()` runs first, then every registered test. The process exits
/// with the number of failed tests.
#[proc_macro_attribute]
pub fn main(_attr: TokenStream, item: TokenStream) -> TokenStream {
    // parse the annotated item as a function
    let input_fn = parse_macro_input!(item as ItemFn);
    let sig = &input_fn.sig;

    // Basic checks: no generics, not async, not const
    if !sig.generics.params.is_empty() {
        return Error::new_spanned(
            sig.generics.clone(),
            "utest::main: generic functions are not supported",
        )
        .to_compile_error()
        .into();
    }
    if sig.asyncness.is_some() {
        return Error::new_spanned(
            sig.asyncness,
            "utest::main: async functions are not supported (wrap in a sync function)",
        )
        .to_compile_error()
        .into();
    }
    if sig.constness.is_some() {
        return Error::new_spanned(sig.constness, "utest::main: main function cannot be const")
            .to_compile_error()
            .into();
    }

    if sig.ident != "main" {
        return Error::new_spanned(
            sig.ident.clone(),
            "utest::main: function must be named 'main'",
        )
        .to_compile_error()
        .into();
    }

    if !sig.inputs.is_empty() {
        return Error::new_spanned(
            sig.inputs.clone(),
            "utest::main: function must have no parameters, use std::env::args",
        )
        .to_compile_error()
        .into();
    }

    if let ReturnType::Type(..) = sig.output {
        return Error::new_spanned(
            sig.output.clone(),
            "utest::main: the exit status is the number of failed tests, main cannot return a value",
        )
        .to_compile_error()
        .into();
    }

    let impl_ident = format_ident!("__utest_main_impl");

    let vis = &input_fn.vis;
    let attrs = &input_fn.attrs;
    let block = &input_fn.block;
    let utest = utest_path();

    let expanded = quote! {
        #(#attrs)*
        #vis fn #impl_ident() #block

        fn main() -> ::std::process::ExitCode {
            #impl_ident();
            #utest::run_main()
        }
    };

    TokenStream::from(expanded)
}
