//! ---
//! otr_section: "03-logging"
//! otr_subsection: "module"
//! otr_type: "source"
//! otr_scope: "code"
//! otr_description: "Structured logging adapters for bundle lifecycle diagnostics."
//! otr_version: "v0.0.0-prealpha"
//! otr_owner: "tbd"
//! ---
/// Emit an informational log enriched with bundle context.
#[macro_export]
macro_rules! otr_info {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        $crate::tracing::event!(
            $crate::tracing::Level::INFO,
            bundle = ctx.bundle.unwrap_or(""),
            bundle_id = ctx.bundle_id.unwrap_or_default(),
            event = ctx.event.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        $crate::tracing::event!(
            $crate::tracing::Level::INFO,
            bundle = ctx.bundle.unwrap_or(""),
            bundle_id = ctx.bundle_id.unwrap_or_default(),
            event = ctx.event.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit a debug log enriched with bundle context.
#[macro_export]
macro_rules! otr_debug {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        $crate::tracing::event!(
            $crate::tracing::Level::DEBUG,
            bundle = ctx.bundle.unwrap_or(""),
            bundle_id = ctx.bundle_id.unwrap_or_default(),
            event = ctx.event.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        $crate::tracing::event!(
            $crate::tracing::Level::DEBUG,
            bundle = ctx.bundle.unwrap_or(""),
            bundle_id = ctx.bundle_id.unwrap_or_default(),
            event = ctx.event.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit a warning log enriched with bundle context.
#[macro_export]
macro_rules! otr_warn {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        $crate::tracing::event!(
            $crate::tracing::Level::WARN,
            bundle = ctx.bundle.unwrap_or(""),
            bundle_id = ctx.bundle_id.unwrap_or_default(),
            event = ctx.event.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        $crate::tracing::event!(
            $crate::tracing::Level::WARN,
            bundle = ctx.bundle.unwrap_or(""),
            bundle_id = ctx.bundle_id.unwrap_or_default(),
            event = ctx.event.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
}

/// Emit an error log enriched with bundle context.
#[macro_export]
macro_rules! otr_error {
    (context = $ctx:expr, $($arg:tt)+) => {{
        let ctx = &$ctx;
        $crate::tracing::event!(
            $crate::tracing::Level::ERROR,
            bundle = ctx.bundle.unwrap_or(""),
            bundle_id = ctx.bundle_id.unwrap_or_default(),
            event = ctx.event.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
    ($($arg:tt)+) => {{
        let ctx = &$crate::LogContext::default();
        $crate::tracing::event!(
            $crate::tracing::Level::ERROR,
            bundle = ctx.bundle.unwrap_or(""),
            bundle_id = ctx.bundle_id.unwrap_or_default(),
            event = ctx.event.unwrap_or(""),
            message = %format_args!($($arg)+)
        );
    }};
}
