use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one, inject fakes,
/// and run it on a single-threaded tokio runtime with test logging enabled.
///
/// The runtime's clock starts paused, so sleeps and ticks resolve instantly
/// and in order. Pass `realtime` (`#[page_test(realtime)]`) to run against
/// the real clock instead.
///
/// Injectable dependencies are `crate::api::FakeApi`,
/// `crate::surface::RecordingSurface` and `crate::clock::TokioClock`.
#[proc_macro_attribute]
pub fn page_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract the injected fakes and reject invalid function signatures.
    let (test_args, setup) = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Pause the clock unless asked not to.
    let paused = match parse_macro_input!(args as Option<Ident>) {
        Some(arg) if arg == "realtime" => false,
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected no argument or `realtime`")
                .into_compile_error()
                .into();
        }
        None => true,
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// The test itself.
            #item_fn

            log4rs_test_utils::test_logging::init_logging_once_for(
                ["vote_page"],
                None,
                None,
            );

            let runtime = tokio::runtime::Builder::new_current_thread()
                .thread_name("page-test")
                .enable_all()
                .start_paused(#paused)
                .build()
                .unwrap();

            runtime.block_on(async {
                #(#setup)*
                #new_name(#(#test_args),*).await
            });
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<(Vec<Ident>, Vec<TokenStream2>), syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut args = vec![];
    let mut setup = vec![];
    let mut seen = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let Pat::Ident(pat_ident) = &*pat_type.pat {
                if let Type::Path(type_path) = &*pat_type.ty {
                    // Valid as the last path segment for any type is itself
                    if let Some(segment) = type_path.path.segments.last() {
                        let ident = pat_ident.ident.clone();
                        let constructor = if segment.ident == "FakeApi" {
                            quote! { crate::api::FakeApi::default() }
                        } else if segment.ident == "RecordingSurface" {
                            quote! { crate::surface::RecordingSurface::default() }
                        } else if segment.ident == "TokioClock" {
                            quote! { crate::clock::TokioClock::new(crate::clock::test_epoch()) }
                        } else {
                            return Err(unexpected(input));
                        };

                        if seen.contains(&segment.ident) {
                            return Err(syn::Error::new(
                                input.span(),
                                format!("Test cannot accept more than one `{}`", segment.ident),
                            ));
                        }
                        seen.push(segment.ident.clone());

                        setup.push(quote! { let #ident = #constructor; });
                        args.push(ident);
                        continue;
                    }
                }
            }
        }

        return Err(unexpected(input));
    }

    Ok((args, setup))
}

fn unexpected(input: &FnArg) -> syn::Error {
    syn::Error::new(
        input.span(),
        "Expected one of `api: FakeApi`, `surface: RecordingSurface` or `clock: TokioClock`",
    )
}
