use sentry_tracing::{EventFilter, SentryLayer};
use tracing::Level;

/// Starts the Sentry client when a DSN is configured. Keep the guard alive for the life of
/// the process so buffered events are flushed on exit.
pub fn init(dsn: Option<&str>) -> Option<::sentry::ClientInitGuard> {
    let dsn = dsn.filter(|d| !d.trim().is_empty())?;
    Some(::sentry::init((
        dsn.to_string(),
        ::sentry::ClientOptions {
            release: ::sentry::release_name!(),
            environment: Some(
                if cfg!(debug_assertions) {
                    "dev"
                } else {
                    "production"
                }
                .into(),
            ),
            ..Default::default()
        },
    )))
}

/// Forwards `error!` as Sentry events and `warn!`/`info!` as breadcrumbs.
pub fn sentry_layer<S>() -> SentryLayer<S>
where
    S: tracing::Subscriber,
    S: for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    SentryLayer::default()
        .span_filter(|meta| {
            matches!(
                *meta.level(),
                Level::DEBUG | Level::INFO | Level::WARN | Level::ERROR
            )
        })
        .event_filter(|meta| match *meta.level() {
            Level::ERROR => EventFilter::Event,
            Level::WARN | Level::INFO => EventFilter::Breadcrumb,
            Level::DEBUG | Level::TRACE => EventFilter::Ignore,
        })
}
