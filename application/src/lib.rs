//! Application provides API for interacting with the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;
pub mod logging;

use std::{sync::Arc, time};

use axum::{
    extract::{MatchedPath, WebSocketUpgrade},
    response::{IntoResponse, Response},
    routing::{get, on, MethodFilter},
    Extension, Json, Router,
};
use axum_client_ip::InsecureClientIp;
use derive_more::{Debug, Display, Error as StdError};
use juniper::{http::GraphQLBatchResponse, DefaultScalarValue, ScalarValue};
use juniper_axum::{extract::JuniperRequest, subscriptions};
use juniper_graphql_ws::ConnectionConfig;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use self::{
    args::Args,
    config::Config,
    context::{Context, Session},
    error::{AsError, Error},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service =
    service::Service<service::infra::Postgres, service::infra::Scraper>;

/// Builds the HTTP [`Router`] serving the GraphQL API of the provided
/// [`Service`].
///
/// # Errors
///
/// If any of the provided CORS `origins` is not a valid header value.
pub fn router(
    service: Service,
    origins: &[String],
) -> Result<Router, InvalidOrigin> {
    let schema = api::Schema::new(api::Query, api::Mutation, api::Subscription);

    Ok(Router::new()
        .route(
            "/graphql",
            on(MethodFilter::GET.or(MethodFilter::POST), graphql),
        )
        .route("/subscriptions", get(subscriptions))
        .layer(Extension(Arc::new(schema)))
        .layer(Extension(service))
        .layer(cors(origins)?)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|r: &http::Request<_>| {
                    tracing::info_span!(
                        "HTTP request",
                        http.client_ip = InsecureClientIp::from(
                            r.headers(),
                            r.extensions(),
                        )
                        .map(|ip| ip.0.to_string())
                        .ok(),
                        http.flavor = ?r.version(),
                        http.method = r.method().as_str(),
                        http.route = r
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str),
                        http.target = r
                            .uri()
                            .path_and_query()
                            .map(http::uri::PathAndQuery::as_str),
                        http.user_agent = r
                            .headers()
                            .get(http::header::USER_AGENT)
                            .and_then(|h| h.to_str().ok()),
                        http.status_code = tracing::field::Empty,
                    )
                })
                .on_response(
                    |r: &http::Response<_>,
                     dur: time::Duration,
                     span: &tracing::Span| {
                        let status = r.status();
                        _ = span.record(
                            "http.status_code",
                            tracing::field::display(status.as_u16()),
                        );

                        let duration = format!("{}ms", dur.as_millis());
                        if status.is_server_error() {
                            tracing::error!(duration = %duration);
                        } else if status.is_client_error() {
                            tracing::warn!(duration = %duration);
                        } else {
                            tracing::info!(duration = %duration);
                        }
                    },
                ),
        ))
}

/// Error of a CORS origin not being a valid header value.
#[derive(Debug, Display, StdError)]
#[display("`{origin}` is not a valid CORS origin: {source}")]
pub struct InvalidOrigin {
    /// The invalid origin.
    pub origin: String,

    /// Parsing error.
    pub source: http::header::InvalidHeaderValue,
}

/// Creates a [`CorsLayer`] allowing GraphQL requests from the provided
/// `origins`.
fn cors(origins: &[String]) -> Result<CorsLayer, InvalidOrigin> {
    origins.iter().try_fold(
        CorsLayer::new()
            .allow_methods([
                http::Method::GET,
                http::Method::OPTIONS,
                http::Method::POST,
            ])
            .allow_headers([
                http::header::AUTHORIZATION,
                http::header::CONTENT_TYPE,
            ]),
        |cors, origin| {
            origin
                .parse::<http::HeaderValue>()
                .map(|value| cors.allow_origin(value))
                .map_err(|source| InvalidOrigin {
                    origin: origin.clone(),
                    source,
                })
        },
    )
}

/// [`juniper`] GraphQL response.
#[derive(Debug)]
pub struct JuniperResponse<S = DefaultScalarValue>
where
    S: ScalarValue,
{
    /// Status code of the response.
    pub status_code: http::StatusCode,

    /// Underlying GraphQL response.
    #[debug(skip)]
    pub response: GraphQLBatchResponse<S>,
}

impl<S> IntoResponse for JuniperResponse<S>
where
    S: ScalarValue,
{
    fn into_response(self) -> Response {
        let Self {
            status_code,
            response,
        } = self;

        (status_code, Json(response)).into_response()
    }
}

/// GraphQL API handler.
pub async fn graphql(
    Extension(schema): Extension<Arc<api::Schema>>,
    context: Context,
    JuniperRequest(gql_request): JuniperRequest,
) -> JuniperResponse {
    let response = gql_request.execute(&*schema, &context).await;
    JuniperResponse {
        status_code: context.status_code(response.is_ok()),
        response,
    }
}

/// GraphQL subscriptions handler.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn subscriptions(
    Extension(schema): Extension<Arc<api::Schema>>,
    mut context: Context,
    ws: WebSocketUpgrade,
) -> Response {
    ws.protocols(["graphql-transport-ws", "graphql-ws"])
        .max_frame_size(1024)
        .max_message_size(1024)
        .write_buffer_size(512)
        .max_write_buffer_size(1024)
        .on_upgrade(move |socket| {
            subscriptions::serve_ws(socket, schema, move |vars| async move {
                context.apply_subscription_variables(&vars).map(|()| {
                    ConnectionConfig::new(context)
                        .with_max_in_flight_operations(10)
                })
            })
        })
}

#[cfg(test)]
mod spec {
    use super::cors;

    #[test]
    fn rejects_invalid_cors_origin() {
        assert!(cors(&[]).is_ok());
        assert!(cors(&["https://app.example.com".to_owned()]).is_ok());

        let err = cors(&["bad\norigin".to_owned()]).unwrap_err();
        assert_eq!(err.origin, "bad\norigin");
    }
}
