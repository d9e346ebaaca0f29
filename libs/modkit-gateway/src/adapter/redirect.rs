use http::{Request, Uri, header};
use tower_http::follow_redirect::policy::{Action, Attempt, Policy};

/// Headers that never follow a redirect to another origin
const SENSITIVE_HEADERS: &[header::HeaderName] = &[
    header::AUTHORIZATION,
    header::COOKIE,
    header::PROXY_AUTHORIZATION,
];

/// Redirect policy used when `allow_redirects` is on
///
/// Follows up to `max_redirects` hops to any origin. Once a hop leaves the
/// original origin, credentials are stripped from every following request.
#[derive(Debug, Clone)]
pub struct RedirectPolicy {
    max_redirects: usize,
    /// Hops followed so far; each request starts from a fresh clone
    redirect_count: usize,
    cross_origin_detected: bool,
}

impl RedirectPolicy {
    #[must_use]
    pub const fn new(max_redirects: usize) -> Self {
        Self {
            max_redirects,
            redirect_count: 0,
            cross_origin_detected: false,
        }
    }

    fn is_same_origin(original: &Uri, target: &Uri) -> bool {
        let orig_scheme = original.scheme_str().unwrap_or("https");
        let target_scheme = target.scheme_str().unwrap_or("https");
        let orig_port = original
            .port_u16()
            .unwrap_or_else(|| default_port(orig_scheme));
        let target_port = target
            .port_u16()
            .unwrap_or_else(|| default_port(target_scheme));

        orig_scheme == target_scheme
            && original.host().unwrap_or("") == target.host().unwrap_or("")
            && orig_port == target_port
    }
}

fn default_port(scheme: &str) -> u16 {
    match scheme {
        "http" => 80,
        "https" => 443,
        _ => 0,
    }
}

impl<B: Clone, E> Policy<B, E> for RedirectPolicy {
    fn redirect(&mut self, attempt: &Attempt<'_>) -> Result<Action, E> {
        self.redirect_count += 1;
        if self.redirect_count > self.max_redirects {
            tracing::debug!(
                count = self.redirect_count,
                max = self.max_redirects,
                "Redirect limit reached, returning redirect response"
            );
            return Ok(Action::Stop);
        }

        if !Self::is_same_origin(attempt.previous(), attempt.location()) {
            self.cross_origin_detected = true;
            tracing::debug!(
                original = %attempt.previous(),
                target = %attempt.location(),
                "Cross-origin redirect"
            );
        }

        Ok(Action::Follow)
    }

    fn on_request(&mut self, request: &mut Request<B>) {
        if self.cross_origin_detected {
            let headers = request.headers_mut();
            for name in SENSITIVE_HEADERS {
                headers.remove(name);
            }
        }
    }

    fn clone_body(&self, body: &B) -> Option<B> {
        // 307/308 resend the body
        Some(body.clone())
    }
}
