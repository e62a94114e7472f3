//! Fixed-window submission rate limiting.
//!
//! Public message submission is the one unauthenticated write in the API,
//! so it gets a per-client throttle: at most `max_requests` within
//! `window`, keyed by peer address. State lives in process memory and is
//! forgotten on restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use actix_web::ResponseError;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};

use crate::domain::Error;

/// Limit for public message submission: 10 per 15 minutes.
pub const SUBMISSION_MAX: usize = 10;

/// Window for public message submission.
pub const SUBMISSION_WINDOW: Duration = Duration::from_secs(15 * 60);

type Ledger = Arc<Mutex<HashMap<String, Vec<Instant>>>>;

/// Rate-limiting middleware for one route scope.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use backend::middleware::rate_limit::RateLimit;
///
/// let app = App::new().wrap(RateLimit::submissions());
/// ```
#[derive(Clone)]
pub struct RateLimit {
    max_requests: usize,
    window: Duration,
    ledger: Ledger,
}

impl RateLimit {
    /// Create a limiter allowing `max_requests` per `window` per client.
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            ledger: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// The limiter applied to public message submission.
    #[must_use]
    pub fn submissions() -> Self {
        Self::new(SUBMISSION_MAX, SUBMISSION_WINDOW)
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            max_requests: self.max_requests,
            window: self.window,
            ledger: Arc::clone(&self.ledger),
        }))
    }
}

/// Service wrapper produced by [`RateLimit`]. Not used directly.
pub struct RateLimitMiddleware<S> {
    service: S,
    max_requests: usize,
    window: Duration,
    ledger: Ledger,
}

impl<S> RateLimitMiddleware<S> {
    /// Record the call and decide whether it is allowed. Prunes entries
    /// older than the window while holding the lock.
    fn admit(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut ledger = match self.ledger.lock() {
            Ok(guard) => guard,
            // A poisoned lock still holds usable counts.
            Err(poisoned) => poisoned.into_inner(),
        };
        let hits = ledger.entry(key.to_owned()).or_default();
        hits.retain(|hit| now.duration_since(*hit) < self.window);
        if hits.len() >= self.max_requests {
            return false;
        }
        hits.push(now);
        true
    }
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = req
            .peer_addr()
            .map_or_else(|| "unknown".to_owned(), |addr| addr.ip().to_string());
        if !self.admit(&key) {
            let refusal = Error::too_many_requests(
                "Too many submissions. Please try again in 15 minutes.",
            )
            .error_response();
            return Box::pin(ready(Ok(req.into_response(refusal).map_into_right_body())));
        }
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;

    use super::*;

    fn addr(last_octet: u8) -> SocketAddr {
        SocketAddr::from(([10, 0, 0, last_octet], 4000))
    }

    async fn call<S, B>(app: &S, client: SocketAddr) -> StatusCode
    where
        S: actix_web::dev::Service<
                actix_http::Request,
                Response = ServiceResponse<B>,
                Error = actix_web::Error,
            >,
    {
        let req = test::TestRequest::post()
            .uri("/")
            .peer_addr(client)
            .to_request();
        test::call_service(app, req).await.status()
    }

    #[rstest]
    #[actix_web::test]
    async fn requests_over_the_limit_are_rejected() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimit::new(2, Duration::from_secs(60)))
                .route("/", web::post().to(|| async { HttpResponse::Created().finish() })),
        )
        .await;

        assert_eq!(call(&app, addr(1)).await, StatusCode::CREATED);
        assert_eq!(call(&app, addr(1)).await, StatusCode::CREATED);
        assert_eq!(call(&app, addr(1)).await, StatusCode::TOO_MANY_REQUESTS);
    }

    #[rstest]
    #[actix_web::test]
    async fn clients_are_limited_independently() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimit::new(1, Duration::from_secs(60)))
                .route("/", web::post().to(|| async { HttpResponse::Created().finish() })),
        )
        .await;

        assert_eq!(call(&app, addr(1)).await, StatusCode::CREATED);
        assert_eq!(call(&app, addr(1)).await, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(call(&app, addr(2)).await, StatusCode::CREATED);
    }

    #[rstest]
    #[actix_web::test]
    async fn expired_hits_free_the_window() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimit::new(1, Duration::from_millis(20)))
                .route("/", web::post().to(|| async { HttpResponse::Created().finish() })),
        )
        .await;

        assert_eq!(call(&app, addr(1)).await, StatusCode::CREATED);
        assert_eq!(call(&app, addr(1)).await, StatusCode::TOO_MANY_REQUESTS);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(call(&app, addr(1)).await, StatusCode::CREATED);
    }
}
