use actix_web::dev::Payload;
use actix_web::http::header::{self, HeaderMap};
use actix_web::{FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use std::net::SocketAddr;

pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
pub const REAL_IP_HEADER: &str = "x-real-ip";

const UNKNOWN: &str = "unknown";

/// Who sent the request, as far as the proxy headers tell. The IP address doubles as the
/// rate-limit identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: String,
}

impl ClientInfo {
    fn from_parts(headers: &HeaderMap, peer_addr: Option<SocketAddr>) -> Self {
        let ip_address = header_str(headers, FORWARDED_FOR_HEADER)
            .and_then(|forwarded| forwarded.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .or_else(|| header_str(headers, REAL_IP_HEADER).map(str::trim))
            .filter(|ip| !ip.is_empty())
            .map(String::from)
            .or_else(|| peer_addr.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| String::from(UNKNOWN));

        let user_agent = header_str(headers, header::USER_AGENT.as_str())
            .filter(|ua| !ua.is_empty())
            .unwrap_or(UNKNOWN);

        ClientInfo {
            ip_address,
            user_agent: String::from(user_agent),
        }
    }
}

impl FromRequest for ClientInfo {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(ClientInfo::from_parts(req.headers(), req.peer_addr())))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, key: &str) -> Option<&'a str> {
    headers.get(key).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::test::TestRequest;

    fn client_info(req: TestRequest) -> ClientInfo {
        let req = req.to_http_request();
        ClientInfo::from_parts(req.headers(), req.peer_addr())
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let info = client_info(
            TestRequest::default()
                .insert_header((FORWARDED_FOR_HEADER, "203.0.113.7, 10.0.0.2, 10.0.0.1"))
                .insert_header((REAL_IP_HEADER, "10.0.0.9"))
                .insert_header((header::USER_AGENT, "Mozilla/5.0")),
        );

        assert_eq!(info.ip_address, "203.0.113.7");
        assert_eq!(info.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn test_falls_back_to_real_ip_then_peer() {
        let info = client_info(
            TestRequest::default().insert_header((REAL_IP_HEADER, " 198.51.100.4 ")),
        );
        assert_eq!(info.ip_address, "198.51.100.4");

        let info = client_info(
            TestRequest::default()
                .insert_header((FORWARDED_FOR_HEADER, ""))
                .peer_addr("192.0.2.10:53124".parse().unwrap()),
        );
        assert_eq!(info.ip_address, "192.0.2.10");
    }

    #[test]
    fn test_unknown_when_nothing_identifies_client() {
        let info = client_info(TestRequest::default());

        assert_eq!(info.ip_address, "unknown");
        assert_eq!(info.user_agent, "unknown");
    }
}
