//! Request routing: map URL patterns and HTTP methods to handler functions.
//!
//! | Pattern              | Example match              | Captured params                  |
//! |----------------------|----------------------------|----------------------------------|
//! | `/items`             | `/items`                   | *(none)*                         |
//! | `/items/:itemName`   | `/items/Iron%20Ore`        | `itemName → "Iron Ore"`          |
//!
//! Trailing slashes are normalized on both patterns and incoming paths.
//! Routes are matched in registration order; the first route whose method and
//! pattern both match wins. A path that matches only under other methods is
//! answered with `405`, anything else with `404`.

use std::sync::Arc;

use crate::context::{Context, PathParams};
use crate::http::request::decode_component;
use crate::middleware::{BoxResponse, Middleware, MiddlewareHandler, Next, from_middleware};
use crate::{Method, Request, Response, StatusCode};

/// Type-erased async route handler.
pub type Handler = Arc<dyn Fn(Context) -> BoxResponse + Send + Sync + 'static>;

/// Conversion trait for async handler functions.
///
/// Any `Fn(Context) -> impl Future<Output = Response> + Send` that is also
/// `Send + Sync + 'static` implements this trait via the blanket impl below.
pub trait IntoHandler: Send + Sync + 'static {
    fn call(&self, ctx: Context) -> BoxResponse;
}

impl<T, F> IntoHandler for T
where
    T: Fn(Context) -> F + Send + Sync + 'static,
    F: Future<Output = Response> + Send + 'static,
{
    fn call(&self, ctx: Context) -> BoxResponse {
        Box::pin((self)(ctx))
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Static(String),
    Parameter(String),
}

#[derive(Debug, Clone)]
enum Pattern {
    Exact(String),
    Parameterized { segments: Vec<Segment> },
}

fn trim_trailing_slash(path: &str) -> &str {
    if path != "/" && path.ends_with('/') {
        &path[..path.len() - 1]
    } else {
        path
    }
}

impl Pattern {
    /// Compiles a pattern string: any `:` makes a parameterized pattern,
    /// anything else matches literally.
    fn parse(pattern: &str) -> Self {
        let pattern = trim_trailing_slash(pattern);

        if pattern.contains(':') {
            let segments = pattern
                .split('/')
                .filter(|s| !s.is_empty())
                .map(|s| match s.strip_prefix(':') {
                    Some(name) => Segment::Parameter(name.to_owned()),
                    None => Segment::Static(s.to_owned()),
                })
                .collect();
            return Pattern::Parameterized { segments };
        }

        Pattern::Exact(pattern.to_owned())
    }

    fn matches(&self, path: &str) -> Option<PathParams> {
        let path = trim_trailing_slash(path);

        match self {
            Pattern::Exact(p) => (p == path).then(PathParams::new),
            Pattern::Parameterized { segments } => {
                let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
                if segments.len() != path_segments.len() {
                    return None;
                }

                let mut params = PathParams::new();
                for (seg, raw) in segments.iter().zip(path_segments) {
                    match seg {
                        Segment::Static(s) if s != raw => return None,
                        Segment::Static(_) => {}
                        Segment::Parameter(name) => {
                            params.insert(name.clone(), decode_component(raw).into_owned());
                        }
                    }
                }
                Some(params)
            }
        }
    }
}

struct Route {
    method: Method,
    pattern: Pattern,
    handler: Handler,
}

/// HTTP request router with an ordered middleware stack.
///
/// # Examples
///
/// ```rust,no_run
/// use economy_api::{Response, Router, StatusCode};
/// use economy_api::context::Context;
/// use economy_api::middleware::LoggerMiddleware;
///
/// let mut router = Router::new();
/// router.layer(LoggerMiddleware);
/// router.get("/items/:itemName", |ctx: Context| async move {
///     let name = ctx.params().get("itemName").unwrap_or_default().to_owned();
///     Response::new(StatusCode::Ok).body(name)
/// });
/// ```
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    middlewares: Vec<MiddlewareHandler>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `GET` requests matching `path`.
    pub fn get(&mut self, path: &str, handler: impl IntoHandler) {
        self.add_route(Method::Get, path, handler);
    }

    /// Register a handler for an arbitrary method.
    pub fn add_route(&mut self, method: Method, path: &str, handler: impl IntoHandler) {
        let handler: Handler = Arc::new(move |ctx: Context| handler.call(ctx));
        self.routes.push(Route {
            method,
            pattern: Pattern::parse(path),
            handler,
        });
    }

    /// Append a middleware. Layers run in registration order, outermost first,
    /// around every matched route.
    pub fn layer(&mut self, middleware: impl Middleware + 'static) {
        self.middlewares.push(from_middleware(Arc::new(middleware)));
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Dispatch `request` to the first matching route through the middleware stack.
    pub async fn route(&self, request: Request) -> Response {
        let mut path_known = false;

        for route in &self.routes {
            let Some(params) = route.pattern.matches(request.path()) else {
                continue;
            };
            if &route.method != request.method() {
                path_known = true;
                continue;
            }

            let ctx = Context::with_params(request, params);
            if self.middlewares.is_empty() {
                return (route.handler)(ctx).await;
            }

            let handler = Arc::clone(&route.handler);
            let endpoint: MiddlewareHandler =
                Arc::new(move |ctx: Context, _next: Next| -> BoxResponse { handler(ctx) });
            let mut chain = self.middlewares.clone();
            chain.push(endpoint);
            return Next::new(chain).run(ctx).await;
        }

        if path_known {
            Response::error(StatusCode::MethodNotAllowed, "Method not allowed")
        } else {
            Response::error(StatusCode::NotFound, "Not found")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::LoggerMiddleware;

    fn make_request(method: &str, path: &str) -> Request {
        let raw = format!("{method} {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        let (req, _) = Request::parse(raw.as_bytes()).unwrap();
        req
    }

    #[test]
    fn pattern_parse_kinds() {
        assert!(matches!(Pattern::parse("/"), Pattern::Exact(s) if s == "/"));
        assert!(matches!(Pattern::parse("/items/"), Pattern::Exact(s) if s == "/items"));
        match Pattern::parse("/api/economy/items/:itemName") {
            Pattern::Parameterized { segments } => {
                assert_eq!(segments.len(), 4);
                assert!(matches!(&segments[3], Segment::Parameter(s) if s == "itemName"));
            }
            other => panic!("expected Parameterized, got {other:?}"),
        }
    }

    #[test]
    fn exact_match_normalizes_trailing_slash() {
        let pat = Pattern::parse("/listings-count");
        assert!(pat.matches("/listings-count/").is_some());
        assert!(pat.matches("/listings").is_none());
    }

    #[test]
    fn param_capture_is_decoded() {
        let pat = Pattern::parse("/items/:itemName");
        let params = pat.matches("/items/Iron%20Ore").unwrap();
        assert_eq!(params.get("itemName"), Some("Iron Ore"));
    }

    #[test]
    fn param_segment_count_must_match() {
        let pat = Pattern::parse("/items/:itemName");
        assert!(pat.matches("/items").is_none());
        assert!(pat.matches("/items/a/b").is_none());
        assert!(pat.matches("/listings/a").is_none());
    }

    #[tokio::test]
    async fn unknown_path_is_404() {
        let router = Router::new();
        let res = router.route(make_request("GET", "/")).await;
        assert_eq!(res.status(), StatusCode::NotFound);
    }

    #[tokio::test]
    async fn wrong_method_is_405() {
        let mut router = Router::new();
        router.get("/items", |_ctx: Context| async { Response::new(StatusCode::Ok) });
        let res = router.route(make_request("POST", "/items")).await;
        assert_eq!(res.status(), StatusCode::MethodNotAllowed);
    }

    #[tokio::test]
    async fn first_matching_route_wins() {
        let mut router = Router::new();
        router.get("/path", |_ctx: Context| async { Response::new(StatusCode::Ok) });
        router.get("/path", |_ctx: Context| async { Response::new(StatusCode::NotFound) });
        assert_eq!(router.len(), 2);
        let res = router.route(make_request("GET", "/path")).await;
        assert_eq!(res.status(), StatusCode::Ok);
    }

    #[tokio::test]
    async fn handler_receives_params_through_middleware() {
        let mut router = Router::new();
        router.layer(LoggerMiddleware);
        router.get("/items/:itemName", |ctx: Context| async move {
            let name = ctx.params().get("itemName").unwrap_or_default().to_owned();
            Response::new(StatusCode::Ok).body(name)
        });
        let res = router.route(make_request("GET", "/items/Gold%20Bar")).await;
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(res.content(), b"Gold Bar");
    }
}
