//! Reading the anonymous client's identifying headers off a request.

use actix_web::HttpRequest;
use folio_core::fingerprint::ClientSignature;

fn header(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub fn client_signature(req: &HttpRequest) -> ClientSignature {
    ClientSignature {
        user_agent: header(req, "user-agent"),
        accept_language: header(req, "accept-language"),
        accept_encoding: header(req, "accept-encoding"),
        forwarded_for: header(req, "x-forwarded-for"),
        real_ip: header(req, "x-real-ip"),
        peer_addr: req.peer_addr().map(|addr| addr.ip().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_signature_reads_proxy_headers() {
        let req = TestRequest::default()
            .insert_header(("User-Agent", "Mozilla/5.0"))
            .insert_header(("X-Forwarded-For", "198.51.100.4, 10.0.0.1"))
            .to_http_request();

        let signature = client_signature(&req);

        assert_eq!(signature.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(signature.ip_address(), "198.51.100.4");
        assert!(signature.accept_language.is_none());
    }
}
