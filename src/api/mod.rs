//! HTTP surface: router, OpenAPI document, and server bootstrap.

use crate::{
    api::handlers::{
        account,
        account::{__path_change_password, __path_get_profile, __path_patch_profile},
        auth,
        auth::types,
        health,
        health::__path_health,
        me,
        me::__path_get_me,
    },
    cli::globals::GlobalArgs,
};
use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, patch, post},
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod handlers;
pub mod notify;

use handlers::auth::{
    __path_forgot_password, __path_resend_otp, __path_reset_password, __path_signin, __path_signup,
    __path_verify_email,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        signup,
        verify_email,
        resend_otp,
        signin,
        forgot_password,
        reset_password,
        get_me,
        get_profile,
        patch_profile,
        change_password
    ),
    components(schemas(
        health::Health,
        types::Role,
        types::UserSummary,
        types::SignupRequest,
        types::SignupResponse,
        types::VerifyEmailRequest,
        types::ResendOtpRequest,
        types::ResendOtpResponse,
        types::SigninRequest,
        types::SessionResponse,
        types::ForgotPasswordRequest,
        types::ForgotPasswordResponse,
        types::ResetPasswordRequest,
        types::MessageResponse,
        account::UpdateProfileRequest,
        account::ChangePasswordRequest,
        account::ProfileResponse
    )),
    tags(
        (name = "auth", description = "Account lifecycle: signup, verification, sessions, resets"),
        (name = "account", description = "Authenticated self-service"),
        (name = "health", description = "Probes")
    )
)]
struct ApiDoc;

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the application router around an existing pool and auth state.
/// Split out from [`new`] so tests can drive the full stack in-process.
#[must_use]
pub fn router(pool: PgPool, auth_state: Arc<auth::AuthState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/verify-email", post(auth::verify_email))
        .route("/auth/resend-otp", post(auth::resend_otp))
        .route("/auth/signin", post(auth::signin))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password/:token", post(auth::reset_password))
        .route("/auth/me", get(me::get_me))
        .route(
            "/account/profile",
            get(account::get_profile).patch(account::patch_profile),
        )
        .route("/account/change-password", patch(account::change_password))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(cors)
                .layer(Extension(auth_state))
                .layer(Extension(pool.clone())),
        )
        .route("/health", get(health::health).options(health::health))
        .layer(Extension(pool))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    dsn: String,
    globals: &GlobalArgs,
    config: auth::AuthConfig,
) -> Result<()> {
    use secrecy::ExposeSecret;

    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let frontend_origin = frontend_origin(config.frontend_base_url())?;
    let cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_origin(AllowOrigin::exact(frontend_origin));

    let auth_state =
        auth::AuthState::from_config(config, globals.token_secret.expose_secret().as_bytes());

    let app = router(pool, auth_state, cors);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn frontend_origin(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| {
        anyhow!("Frontend base URL must include a valid host: {frontend_base_url}")
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}

#[cfg(test)]
mod tests {
    use super::{frontend_origin, openapi};

    #[test]
    fn openapi_document_lists_lifecycle_paths() {
        let doc = openapi();
        let paths = doc.paths.paths;
        assert!(paths.contains_key("/auth/signup"));
        assert!(paths.contains_key("/auth/verify-email"));
        assert!(paths.contains_key("/auth/resend-otp"));
        assert!(paths.contains_key("/auth/signin"));
        assert!(paths.contains_key("/auth/forgot-password"));
        assert!(paths.contains_key("/auth/reset-password/{token}"));
        assert!(paths.contains_key("/auth/me"));
        assert!(paths.contains_key("/account/profile"));
        assert!(paths.contains_key("/account/change-password"));
        assert!(paths.contains_key("/health"));
    }

    #[test]
    fn frontend_origin_strips_path_and_keeps_port() -> anyhow::Result<()> {
        let origin = frontend_origin("http://localhost:5173/app/")?;
        assert_eq!(origin.to_str()?, "http://localhost:5173");

        let origin = frontend_origin("https://cafe.example.com")?;
        assert_eq!(origin.to_str()?, "https://cafe.example.com");
        Ok(())
    }

    #[test]
    fn frontend_origin_rejects_garbage() {
        assert!(frontend_origin("not a url").is_err());
    }
}
