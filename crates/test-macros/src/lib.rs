//! Test attribute for integration tests that talk to the live Books service.
//!
//! `#[live_api_test]` turns an async test into a synchronous `#[test]` that:
//!
//! - skips unless `BOOKS_LIVE_TESTS` is set (and, for `writes` tests,
//!   `BOOKS_LIVE_WRITES` too),
//! - runs the body on the shared runtime from `crate::common::live`,
//! - fails the test if the body outlives its deadline.
//!
//! ```ignore
//! #[live_api_test]
//! async fn test_list() { /* read-only */ }
//!
//! #[live_api_test(writes, timeout_secs = 120)]
//! async fn test_create() { /* creates and deletes books */ }
//! ```
use proc_macro::TokenStream;
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, spanned::Spanned, Expr, ItemFn, Lit, Meta, ReturnType, Token};

const LIVE_TESTS_ENV: &str = "BOOKS_LIVE_TESTS";
const LIVE_WRITES_ENV: &str = "BOOKS_LIVE_WRITES";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, PartialEq, Eq)]
struct LiveArgs {
    writes: bool,
    timeout_secs: u64,
}

impl LiveArgs {
    fn gates(&self) -> Vec<&'static str> {
        if self.writes {
            vec![LIVE_TESTS_ENV, LIVE_WRITES_ENV]
        } else {
            vec![LIVE_TESTS_ENV]
        }
    }
}

fn parse_args(args: &Punctuated<Meta, Token![,]>) -> syn::Result<LiveArgs> {
    let mut parsed = LiveArgs {
        writes: false,
        timeout_secs: DEFAULT_TIMEOUT_SECS,
    };
    for arg in args {
        match arg {
            Meta::Path(path) if path.is_ident("writes") => parsed.writes = true,
            Meta::NameValue(nv) if nv.path.is_ident("timeout_secs") => {
                let Expr::Lit(expr) = &nv.value else {
                    return Err(syn::Error::new(nv.value.span(), "timeout_secs expects an integer"));
                };
                let Lit::Int(secs) = &expr.lit else {
                    return Err(syn::Error::new(expr.span(), "timeout_secs expects an integer"));
                };
                parsed.timeout_secs = secs.base10_parse()?;
                if parsed.timeout_secs == 0 {
                    return Err(syn::Error::new(secs.span(), "timeout_secs must be positive"));
                }
            }
            other => {
                return Err(syn::Error::new(
                    other.span(),
                    "expected `writes` or `timeout_secs = <seconds>`",
                ))
            }
        }
    }
    Ok(parsed)
}

/// Marks an async function as a test against the live Books service.
#[proc_macro_attribute]
pub fn live_api_test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let raw_args = parse_macro_input!(attr with Punctuated::<Meta, Token![,]>::parse_terminated);
    let args = match parse_args(&raw_args) {
        Ok(args) => args,
        Err(e) => return e.to_compile_error().into(),
    };

    let input_fn = parse_macro_input!(item as ItemFn);

    if input_fn.sig.asyncness.is_none() {
        return syn::Error::new(
            input_fn.sig.span(),
            "live_api_test can only be applied to async functions",
        )
        .to_compile_error()
        .into();
    }

    if !input_fn.sig.inputs.is_empty() {
        return syn::Error::new(
            input_fn.sig.inputs.span(),
            "live_api_test functions cannot accept arguments",
        )
        .to_compile_error()
        .into();
    }

    if let ReturnType::Type(_, ty) = &input_fn.sig.output {
        return syn::Error::new(ty.span(), "live_api_test functions must return ()")
            .to_compile_error()
            .into();
    }

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = input_fn;

    let name = sig.ident;
    let test_name = name.to_string();
    let gates = args.gates();
    let timeout_secs = args.timeout_secs;

    let filtered_attrs = attrs.into_iter().filter(
        |attr| !matches!(attr.meta, Meta::Path(ref path) if path.is_ident("live_api_test")),
    );

    TokenStream::from(quote! {
        #(#filtered_attrs)*
        #[test]
        #vis fn #name() {
            let missing = [#(#gates),*].into_iter().find(|var| {
                !::std::env::var_os(var).is_some_and(|v| !v.is_empty() && v != "0")
            });
            if let Some(var) = missing {
                eprintln!("skipping {}: set {}=1 to run against the live service", #test_name, var);
                return;
            }
            let deadline = ::std::time::Duration::from_secs(#timeout_secs);
            let finished = crate::common::live::block_on(async move {
                ::tokio::time::timeout(deadline, async #block).await.is_ok()
            });
            assert!(finished, "{} did not finish within {:?}", #test_name, deadline);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn parse(args: Punctuated<Meta, Token![,]>) -> syn::Result<LiveArgs> {
        parse_args(&args)
    }

    #[test]
    fn defaults_to_read_only_with_default_deadline() {
        let args = parse(Punctuated::new()).expect("empty args");
        assert_eq!(
            args,
            LiveArgs {
                writes: false,
                timeout_secs: DEFAULT_TIMEOUT_SECS
            }
        );
        assert_eq!(args.gates(), vec![LIVE_TESTS_ENV]);
    }

    #[test]
    fn writes_adds_second_gate() {
        let args = parse(parse_quote!(writes, timeout_secs = 120)).expect("args");
        assert_eq!(args.timeout_secs, 120);
        assert_eq!(args.gates(), vec![LIVE_TESTS_ENV, LIVE_WRITES_ENV]);
    }

    #[test]
    fn rejects_unknown_and_malformed_args() {
        assert!(parse(parse_quote!(retries = 3)).is_err());
        assert!(parse(parse_quote!(timeout_secs = "soon")).is_err());
        assert!(parse(parse_quote!(timeout_secs = 0)).is_err());
    }
}
