//! Per-request context carried across the handler future.
//!
//! The language negotiated from `Accept-Language` and whether debug strings
//! may be exposed are scoped around the inner service so response rendering
//! can read them without threading them through every handler.

use axum::{
    extract::{Request, State},
    http::header::ACCEPT_LANGUAGE,
    middleware::Next,
    response::Response,
};

use crate::{AppState, i18n::Lang};

/// Values resolved once per request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestContext {
    /// Response language.
    pub lang: Lang,
    /// Include raw error strings in error envelopes.
    pub expose_errors: bool,
}

tokio::task_local! {
    static CONTEXT: RequestContext;
}

impl RequestContext {
    /// Returns the context of the running request, or the default outside one.
    #[must_use]
    pub fn current() -> Self {
        CONTEXT.try_with(|ctx| *ctx).unwrap_or_default()
    }

    /// Runs `fut` with this context installed.
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        CONTEXT.scope(self, fut).await
    }
}

/// Resolves the request context and scopes it around the rest of the stack.
pub async fn context_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let lang = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|h| h.to_str().ok())
        .map(Lang::from_accept_language)
        .unwrap_or_default();

    let ctx = RequestContext {
        lang,
        expose_errors: !state.environment.is_production(),
    };
    ctx.scope(next.run(request)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_current_inside_and_outside_scope() {
        let outside = RequestContext::current();
        assert_eq!(outside.lang, Lang::En);
        assert!(!outside.expose_errors);

        let ctx = RequestContext {
            lang: Lang::Fa,
            expose_errors: true,
        };
        let seen = ctx.scope(async { RequestContext::current() }).await;
        assert_eq!(seen.lang, Lang::Fa);
        assert!(seen.expose_errors);
    }
}
