use std::future::{ready, Ready};

use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{self, HeaderValue},
    Error,
};
use futures::future::LocalBoxFuture;

use crate::handlers::CORS_ALLOWED_HEADERS_VALUE;

const ANY_ORIGIN: &str = "*";
const ALLOWED_METHODS_VALUE: &str = "GET, POST, OPTIONS";
const MAX_AGE_SECS_VALUE: &str = "86400";

/// Answers preflight requests directly and adds CORS headers to every other response.
///
/// An allow-list containing `*` accepts any origin and responds with a wildcard. Otherwise the
/// request's `Origin` is echoed back only if it is in the list.
pub struct CorsMiddleware {
    allowed_origins: Vec<String>,
}

impl CorsMiddleware {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CorsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let allow_any_origin = self.allowed_origins.iter().any(|o| o == ANY_ORIGIN);

        let allowed_origin_headers: Vec<(String, HeaderValue)> = self
            .allowed_origins
            .iter()
            .filter(|origin| *origin != ANY_ORIGIN)
            .filter_map(|origin| {
                HeaderValue::from_str(origin)
                    .ok()
                    .map(|hv| (origin.clone(), hv))
            })
            .collect();

        ready(Ok(CorsMiddlewareService {
            service,
            allow_any_origin,
            allowed_origin_headers,
        }))
    }
}

pub struct CorsMiddlewareService<S> {
    service: S,
    allow_any_origin: bool,
    allowed_origin_headers: Vec<(String, HeaderValue)>,
}

impl<S> CorsMiddlewareService<S> {
    fn allowed_origin_header(&self, req: &ServiceRequest) -> Option<HeaderValue> {
        if self.allow_any_origin {
            return Some(HeaderValue::from_static(ANY_ORIGIN));
        }

        let origin = req
            .headers()
            .get(header::ORIGIN)
            .and_then(|h| h.to_str().ok())?;

        self.allowed_origin_headers
            .iter()
            .find(|(allowed, _)| allowed == origin)
            .map(|(_, hv)| hv.clone())
    }
}

impl<S, B> Service<ServiceRequest> for CorsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let allowed_origin_header = self.allowed_origin_header(&req);

        if req.method() == actix_web::http::Method::OPTIONS {
            let (req_parts, _) = req.into_parts();
            let mut res = actix_web::HttpResponse::Ok();

            if let Some(origin_header) = allowed_origin_header {
                res.insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, origin_header));
                res.insert_header((
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static(ALLOWED_METHODS_VALUE),
                ));
                res.insert_header((
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(CORS_ALLOWED_HEADERS_VALUE),
                ));
                res.insert_header((
                    header::ACCESS_CONTROL_MAX_AGE,
                    HeaderValue::from_static(MAX_AGE_SECS_VALUE),
                ));
            }

            let res = res.finish();
            let res = ServiceResponse::new(req_parts, res).map_into_boxed_body();
            return Box::pin(async move { Ok(res) });
        }

        let req_fut = self.service.call(req);

        Box::pin(async move {
            let mut res = req_fut.await?.map_into_boxed_body();

            if let Some(origin_header) = allowed_origin_header {
                res.headers_mut()
                    .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin_header);
                res.headers_mut().insert(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(CORS_ALLOWED_HEADERS_VALUE),
                );
            }

            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::CorsMiddleware;
    use actix_web::{
        http::{header, Method, StatusCode},
        test, web, App, HttpResponse,
    };

    fn with_origins(origins: &[&str]) -> CorsMiddleware {
        CorsMiddleware::new(origins.iter().map(|s| s.to_string()).collect())
    }

    #[actix_web::test]
    async fn wildcard_origin_on_actual_request() {
        let app = test::init_service(App::new().wrap(with_origins(&["*"])).route(
            "/",
            web::post().to(|| async { HttpResponse::Ok().body("ok") }),
        ))
        .await;

        let req = test::TestRequest::post()
            .uri("/")
            .append_header((header::ORIGIN, "https://hackathons.in"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
                .and_then(|v| v.to_str().ok()),
            Some(crate::handlers::CORS_ALLOWED_HEADERS_VALUE)
        );
    }

    #[actix_web::test]
    async fn wildcard_origin_without_origin_header() {
        let app = test::init_service(App::new().wrap(with_origins(&["*"])).route(
            "/",
            web::get().to(|| async { HttpResponse::Ok().body("ok") }),
        ))
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
    }

    #[actix_web::test]
    async fn preflight_returns_empty_ok_with_cors_headers() {
        let app = test::init_service(App::new().wrap(with_origins(&["*"])).route(
            "/signup-user",
            web::post().to(|| async { HttpResponse::Ok().body("ok") }),
        ))
        .await;

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/signup-user")
            .append_header((header::ORIGIN, "https://hackathons.in"))
            .append_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
                .and_then(|v| v.to_str().ok()),
            Some("authorization, x-client-info, apikey, content-type")
        );
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_METHODS)
                .and_then(|v| v.to_str().ok()),
            Some("GET, POST, OPTIONS")
        );
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_MAX_AGE)
                .and_then(|v| v.to_str().ok()),
            Some("86400")
        );

        let body = test::read_body(resp).await;
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn preflight_on_unrouted_path_is_ok() {
        let app = test::init_service(App::new().wrap(with_origins(&["*"]))).await;

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/anything")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn listed_origin_is_echoed() {
        let cors = with_origins(&["https://hackathons.in", "https://app.hackathons.in"]);
        let app = test::init_service(App::new().wrap(cors).route(
            "/",
            web::get().to(|| async { HttpResponse::Ok().body("ok") }),
        ))
        .await;

        for origin in ["https://hackathons.in", "https://app.hackathons.in"] {
            let req = test::TestRequest::get()
                .uri("/")
                .append_header((header::ORIGIN, origin))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(
                resp.headers()
                    .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                    .and_then(|v| v.to_str().ok()),
                Some(origin)
            );
        }
    }

    #[actix_web::test]
    async fn no_cors_headers_when_origin_not_listed() {
        let app = test::init_service(
            App::new()
                .wrap(with_origins(&["https://hackathons.in"]))
                .route("/", web::get().to(|| async { HttpResponse::Ok().body("ok") })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .append_header((header::ORIGIN, "https://evil.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none(),
            "Should not add CORS headers when origin is not in allowed list"
        );

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/")
            .append_header((header::ORIGIN, "https://evil.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[actix_web::test]
    async fn no_cors_headers_when_no_allowed_origins() {
        let app = test::init_service(App::new().wrap(with_origins(&[])).route(
            "/",
            web::get().to(|| async { HttpResponse::Ok().body("ok") }),
        ))
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .append_header((header::ORIGIN, "https://hackathons.in"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }
}
