#![doc = include_str!("../README.md")]

use unsynn::*;

keyword! {
    KFn = "fn";
}

unsynn! {
    // attributes, visibility and qualifiers ahead of `fn`
    struct Prelude {
        items: Any<Cons<Except<KFn>, TokenTree>>,
    }

    // parameters and return type
    struct Signature {
        items: Any<Cons<Except<BraceGroup>, TokenTree>>,
    }

    struct TestFn {
        prelude: Prelude,
        _fn: KFn,
        name: Ident,
        signature: Signature,
        body: BraceGroup,
    }
}

/// Mark a function as a test that runs `vista_testhelpers::setup()` first.
///
/// ```ignore
/// use vista_testhelpers::test;
///
/// #[test]
/// fn decodes_nested_records() {
///     // tracing output and colored backtraces are enabled here
/// }
/// ```
#[proc_macro_attribute]
pub fn test(
    attr: proc_macro::TokenStream,
    item: proc_macro::TokenStream,
) -> proc_macro::TokenStream {
    let item = TokenStream::from(item);
    let attr = TokenStream::from(attr);

    let TestFn {
        prelude,
        _fn,
        name,
        signature,
        body,
    } = match item.to_token_iter().parse::<TestFn>() {
        Ok(test_fn) => test_fn,
        Err(_) => {
            return quote::quote! {
                ::core::compile_error!("#[test] expects a function");
            }
            .into();
        }
    };

    if !attr.is_empty() {
        return quote::quote! {
            ::core::compile_error!("#[test] takes no arguments");
        }
        .into();
    }

    let prelude = prelude.items.to_token_stream();
    let signature = signature.items.to_token_stream();
    let body = body.0.stream();

    quote::quote! {
        #[::core::prelude::rust_2024::test]
        #prelude fn #name #signature {
            ::vista_testhelpers::setup();

            #body
        }
    }
    .into()
}
