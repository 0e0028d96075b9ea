pub mod health;
pub mod signup;

pub const CORS_ALLOWED_HEADERS_VALUE: &str = "authorization, x-client-info, apikey, content-type";

pub mod error {
    use hackathons_common::request_io::OutputError;

    use actix_web::http::StatusCode;
    use actix_web::{HttpResponse, HttpResponseBuilder};
    use std::fmt;

    pub const TOO_MANY_REQUESTS_MSG: &str = "Too many requests. Please try again later.";
    pub const INTERNAL_ERROR_MSG: &str = "Internal server error";

    #[derive(Debug)]
    pub enum HttpErrorResponse {
        // 400
        IncorrectlyFormed(String),
        CreationFailed(String),

        // 409
        ConflictWithExisting(String),

        // 429
        TooManyRequests(String),

        // 500
        InternalError(String),
    }

    impl HttpErrorResponse {
        pub fn message(&self) -> &str {
            match self {
                HttpErrorResponse::IncorrectlyFormed(msg)
                | HttpErrorResponse::CreationFailed(msg)
                | HttpErrorResponse::ConflictWithExisting(msg)
                | HttpErrorResponse::TooManyRequests(msg)
                | HttpErrorResponse::InternalError(msg) => msg,
            }
        }
    }

    impl std::error::Error for HttpErrorResponse {}

    impl fmt::Display for HttpErrorResponse {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.message())
        }
    }

    impl actix_web::error::ResponseError for HttpErrorResponse {
        fn error_response(&self) -> HttpResponse {
            HttpResponseBuilder::new(self.status_code()).json(OutputError {
                error: String::from(self.message()),
            })
        }

        fn status_code(&self) -> StatusCode {
            match *self {
                HttpErrorResponse::IncorrectlyFormed(_) | HttpErrorResponse::CreationFailed(_) => {
                    StatusCode::BAD_REQUEST
                }
                HttpErrorResponse::ConflictWithExisting(_) => StatusCode::CONFLICT,
                HttpErrorResponse::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
                HttpErrorResponse::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        use actix_web::body::to_bytes;
        use actix_web::error::ResponseError;

        #[actix_web::test]
        async fn test_error_response_body() {
            let err = HttpErrorResponse::TooManyRequests(String::from(TOO_MANY_REQUESTS_MSG));
            assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);

            let resp = err.error_response();
            let body = to_bytes(resp.into_body()).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

            assert_eq!(
                body,
                serde_json::json!({ "error": "Too many requests. Please try again later." })
            );
        }

        #[test]
        fn test_status_codes() {
            let cases = [
                (
                    HttpErrorResponse::IncorrectlyFormed(String::new()),
                    StatusCode::BAD_REQUEST,
                ),
                (
                    HttpErrorResponse::CreationFailed(String::new()),
                    StatusCode::BAD_REQUEST,
                ),
                (
                    HttpErrorResponse::ConflictWithExisting(String::new()),
                    StatusCode::CONFLICT,
                ),
                (
                    HttpErrorResponse::InternalError(String::from(INTERNAL_ERROR_MSG)),
                    StatusCode::INTERNAL_SERVER_ERROR,
                ),
            ];

            for (err, status) in cases {
                assert_eq!(err.status_code(), status);
            }
        }
    }
}
