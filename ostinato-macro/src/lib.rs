use proc_macro::TokenStream;
use quote::quote;
use syn::{Expr, ExprLit, ItemFn, ItemImpl, Lit, Meta, MetaNameValue};

/// Attach a cron schedule to a function or a `Runnable` implementation
///
/// # Standalone functions (auto-registered)
///
/// ```rust,ignore
/// #[scheduled(cron = "0 */5 * * * *")]
/// async fn refresh_cache() {
///     println!("runs every 5 minutes");
/// }
/// ```
///
/// The function is re-emitted unchanged and a registration entry is added to
/// the global registry; `SchedulerBuilder::build()` picks it up.
///
/// # `impl Runnable` blocks (registered through the builder)
///
/// ```rust,ignore
/// use ostinato::{scheduled, Runnable};
/// use std::future::Future;
/// use std::pin::Pin;
///
/// struct Cleanup {
///     root: std::path::PathBuf,
/// }
///
/// #[scheduled(cron = "0 0 3 * * *")]
/// impl Runnable for Cleanup {
///     fn run(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
///         Box::pin(async move {
///             println!("sweeping {}", self.root.display());
///         })
///     }
/// }
///
/// // SchedulerBuilder::new().runnable(Cleanup { root: "/tmp".into() })
/// ```
///
/// # Parameters
///
/// - `cron`: the schedule pattern, or a `${key}`/`${key:default}` config
///   placeholder resolving to one
/// - `enabled`: `true`/`false` or a config placeholder (default `true`)
#[proc_macro_attribute]
pub fn scheduled(args: TokenStream, input: TokenStream) -> TokenStream {
    if let Ok(input_fn) = syn::parse::<ItemFn>(input.clone()) {
        return scheduled_function(args, input_fn);
    }

    if let Ok(input_impl) = syn::parse::<ItemImpl>(input.clone()) {
        return scheduled_impl(args, input_impl);
    }

    panic!(
        "scheduled macro can only be applied to:\n  1. Async functions (auto-registered jobs)\n  2. impl Runnable blocks (jobs registered via SchedulerBuilder::runnable)"
    );
}

fn scheduled_function(args: TokenStream, input_fn: ItemFn) -> TokenStream {
    let attr_args = syn::parse_macro_input!(args with syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated);
    let (pattern, enabled) = parse_schedule_args(&attr_args);

    let fn_name = &input_fn.sig.ident;
    let fn_vis = &input_fn.vis;
    let fn_sig = &input_fn.sig;
    let fn_block = &input_fn.block;

    let register_fn_name = syn::Ident::new(
        &format!("__register_scheduled_{}", fn_name),
        fn_name.span(),
    );

    let expanded = quote! {
        #fn_vis #fn_sig #fn_block

        // Auto-registration using linkme
        #[::ostinato::ostinato_runtime::linkme::distributed_slice(::ostinato::ostinato_runtime::SCHEDULED_JOBS)]
        #[linkme(crate = ::ostinato::ostinato_runtime::linkme)]
        fn #register_fn_name() -> ::ostinato::ostinato_runtime::ScheduledJob {
            ::ostinato::ostinato_runtime::ScheduledJob {
                name: stringify!(#fn_name),
                pattern: #pattern,
                enabled: #enabled,
                handler: || {
                    ::tokio::spawn(async {
                        #fn_name().await;
                    });
                },
            }
        }
    };

    TokenStream::from(expanded)
}

fn scheduled_impl(args: TokenStream, input_impl: ItemImpl) -> TokenStream {
    let attr_args = syn::parse_macro_input!(args with syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated);
    let (pattern, enabled) = parse_schedule_args(&attr_args);

    let impl_type = &input_impl.self_ty;

    let expanded = quote! {
        #input_impl

        impl ::ostinato::ostinato_runtime::ScheduledMetadata for #impl_type {
            fn pattern() -> &'static str {
                #pattern
            }

            fn enabled() -> &'static str {
                #enabled
            }
        }
    };

    TokenStream::from(expanded)
}

fn parse_schedule_args(
    attr_args: &syn::punctuated::Punctuated<Meta, syn::Token![,]>,
) -> (String, String) {
    let mut pattern = None;
    let mut enabled = None;

    for arg in attr_args {
        if let Meta::NameValue(MetaNameValue { path, value, .. }) = arg {
            let name = path.get_ident().map(|i| i.to_string()).unwrap_or_default();

            match name.as_str() {
                "cron" => {
                    if let Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) = value {
                        pattern = Some(s.value());
                    } else {
                        panic!("cron must be a string literal");
                    }
                }
                "enabled" => {
                    enabled = Some(match value {
                        Expr::Lit(ExprLit { lit: Lit::Bool(b), .. }) => b.value.to_string(),
                        Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => s.value(),
                        _ => panic!("enabled must be bool or string"),
                    });
                }
                other => panic!("unknown scheduled parameter: {}", other),
            }
        }
    }

    let pattern = pattern.expect("Must specify a cron pattern, e.g. #[scheduled(cron = \"0 */5 * * * *\")]");
    let enabled = enabled.unwrap_or_else(|| "true".to_string());

    (pattern, enabled)
}
