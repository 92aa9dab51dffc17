//! One-shot messages carried across a redirect in a cookie.
//!
//! The cookie holds message codes, not text. The next rendered page shows them
//! and the response clears the cookie.

use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse, HttpResponseBuilder};

pub const COOKIE: &str = "portal_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    RequestThanks,
    ShortlistComing,
    FormInvalid,
}

impl Flash {
    const ALL: [Flash; 3] = [Flash::RequestThanks, Flash::ShortlistComing, Flash::FormInvalid];

    fn code(self) -> &'static str {
        match self {
            Flash::RequestThanks => "thanks",
            Flash::ShortlistComing => "shortlist",
            Flash::FormInvalid => "invalid",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Flash::RequestThanks => {
                "Thank you! Our procurement strategists will respond within 24 hours."
            }
            Flash::ShortlistComing => "Request received! Expect a curated shortlist shortly.",
            Flash::FormInvalid => {
                "Please check the form and provide the required information to proceed."
            }
        }
    }

    /// `success` or `error`, used as a CSS modifier.
    pub fn level(&self) -> &'static str {
        match self {
            Flash::FormInvalid => "error",
            _ => "success",
        }
    }
}

/// Queues `flashes` for the next page the client loads.
pub fn set(builder: &mut HttpResponseBuilder, flashes: &[Flash]) {
    let value = flashes
        .iter()
        .map(|f| f.code())
        .collect::<Vec<_>>()
        .join(".");
    builder.cookie(
        Cookie::build(COOKIE, value)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .finish(),
    );
}

/// Messages waiting for this request. Unknown codes are ignored.
pub fn pending(req: &HttpRequest) -> Vec<Flash> {
    let Some(cookie) = req.cookie(COOKIE) else {
        return Vec::new();
    };
    cookie
        .value()
        .split('.')
        .filter_map(|code| Flash::ALL.into_iter().find(|f| f.code() == code))
        .collect()
}

/// Drops the cookie once its messages have been shown.
pub fn consume(req: &HttpRequest, response: &mut HttpResponse) {
    if req.cookie(COOKIE).is_some() {
        let mut removal = Cookie::build(COOKIE, "").path("/").finish();
        removal.make_removal();
        let _ = response.add_cookie(&removal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn codes_round_trip_through_the_cookie() {
        let mut builder = HttpResponse::Found();
        set(&mut builder, &[Flash::RequestThanks, Flash::ShortlistComing]);
        let response = builder.finish();
        let cookie = response.cookies().find(|c| c.name() == COOKIE).unwrap();

        let req = TestRequest::default()
            .cookie(Cookie::new(COOKIE, cookie.value().to_string()))
            .to_http_request();
        assert_eq!(
            pending(&req),
            [Flash::RequestThanks, Flash::ShortlistComing]
        );
    }

    #[test]
    fn garbage_is_ignored() {
        let req = TestRequest::default()
            .cookie(Cookie::new(COOKIE, "nonsense.invalid"))
            .to_http_request();
        assert_eq!(pending(&req), [Flash::FormInvalid]);
        assert_eq!(Flash::FormInvalid.level(), "error");
    }
}
