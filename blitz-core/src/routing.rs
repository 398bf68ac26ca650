//! Route table
//!
//! Routes live in four partitions: static (exact path), parameterized
//! (`:name` segments), wildcard (trailing `*`) and a single catch-all. Every
//! route holds a fixed array of handler slots indexed by `MethodSlot`.
//!
//! Each slot keeps the terminal handler and its per-route middleware next to
//! the composed result, so a change to the global middleware list rebuilds
//! every chain from the same parts instead of wrapping the old chain again.

use crate::handler::BoxedHandler;
use crate::method::MethodSlot;
use crate::middleware::{Middleware, compose};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Trim leading and trailing `/` from a path.
///
/// `"/api/users/"` and `"api/users"` name the same route.
#[inline]
pub fn normalize_path(path: &str) -> &str {
    path.trim_matches('/')
}

/// Which partition a route lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Static,
    Param,
    Wildcard,
    CatchAll,
}

impl RouteKind {
    /// Classify a normalized path and return the key it is stored under.
    ///
    /// A trailing `*` makes a wildcard route keyed by everything before it;
    /// any `:` makes a parameterized route; anything else is static. A
    /// wildcard prefix may itself hold `:name` segments (`users/:id/*`).
    pub fn classify(path: &str) -> (RouteKind, &str) {
        if let Some(prefix) = path.strip_suffix('*') {
            (RouteKind::Wildcard, normalize_path(prefix))
        } else if path.contains(':') {
            (RouteKind::Param, path)
        } else {
            (RouteKind::Static, path)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKind::Static => "static",
            RouteKind::Param => "param",
            RouteKind::Wildcard => "wildcard",
            RouteKind::CatchAll => "catch_all",
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

impl Segment {
    fn bind(&self, part: &str, params: &mut HashMap<String, String>) -> Option<()> {
        match self {
            Segment::Literal(lit) if lit == part => Some(()),
            Segment::Param(name) if !part.is_empty() => {
                params.insert(name.clone(), part.to_string());
                Some(())
            }
            _ => None,
        }
    }
}

/// A route key split into literal and `:name` segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    segments: Vec<Segment>,
    len: usize,
}

impl PathPattern {
    /// Split a normalized key. The empty key has no segments.
    pub fn parse(key: &str) -> Self {
        let segments = if key.is_empty() {
            Vec::new()
        } else {
            key.split('/')
                .map(|s| match s.strip_prefix(':') {
                    Some(name) => Segment::Param(name.to_string()),
                    None => Segment::Literal(s.to_string()),
                })
                .collect()
        };
        Self {
            segments,
            len: key.len(),
        }
    }

    /// Length of the key this pattern was parsed from
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    fn walk<'p>(&self, path: &'p str) -> Option<(HashMap<String, String>, Option<&'p str>)> {
        let mut params = HashMap::new();
        let mut rest = Some(path);
        for segment in &self.segments {
            let current = rest?;
            let (part, tail) = match current.split_once('/') {
                Some((part, tail)) => (part, Some(tail)),
                None => (current, None),
            };
            segment.bind(part, &mut params)?;
            rest = tail;
        }
        Some((params, rest))
    }

    /// Match the whole path, one segment per pattern segment
    pub fn match_exact(&self, path: &str) -> Option<HashMap<String, String>> {
        match self.walk(path)? {
            (params, None) => Some(params),
            (_, Some(_)) => None,
        }
    }

    /// Match the leading segments and return what follows them
    pub fn match_prefix<'p>(&self, path: &'p str) -> Option<(HashMap<String, String>, &'p str)> {
        let (params, rest) = self.walk(path)?;
        Some((params, rest.unwrap_or("")))
    }
}

/// A handler bound to one (route, method) pair
#[derive(Clone)]
pub struct RouteHandler {
    terminal: BoxedHandler,
    local: Vec<Arc<dyn Middleware>>,
    composed: BoxedHandler,
}

impl RouteHandler {
    /// Compose `terminal` with `global` followed by `local`
    pub fn new(
        terminal: BoxedHandler,
        local: Vec<Arc<dyn Middleware>>,
        global: &[Arc<dyn Middleware>],
    ) -> Self {
        let composed = Self::chain(&terminal, &local, global);
        Self {
            terminal,
            local,
            composed,
        }
    }

    fn chain(
        terminal: &BoxedHandler,
        local: &[Arc<dyn Middleware>],
        global: &[Arc<dyn Middleware>],
    ) -> BoxedHandler {
        if global.is_empty() {
            return compose(terminal.clone(), local);
        }
        let mut all = Vec::with_capacity(global.len() + local.len());
        all.extend_from_slice(global);
        all.extend_from_slice(local);
        compose(terminal.clone(), &all)
    }

    /// Recompose against a new global list. Rebuilding twice with the same
    /// list yields the same chain.
    pub fn rebuild(&mut self, global: &[Arc<dyn Middleware>]) {
        self.composed = Self::chain(&self.terminal, &self.local, global);
    }

    pub fn terminal(&self) -> &BoxedHandler {
        &self.terminal
    }

    pub fn composed(&self) -> &BoxedHandler {
        &self.composed
    }

    pub fn local_middleware_count(&self) -> usize {
        self.local.len()
    }
}

impl fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteHandler")
            .field("local_middleware", &self.local.len())
            .finish_non_exhaustive()
    }
}

/// One path key and its handler slots
#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    matcher: PathPattern,
    kind: RouteKind,
    handlers: [Option<RouteHandler>; MethodSlot::COUNT],
}

impl Route {
    pub fn new(pattern: impl Into<String>, kind: RouteKind) -> Self {
        let pattern = pattern.into();
        Self {
            matcher: PathPattern::parse(&pattern),
            pattern,
            kind,
            handlers: Default::default(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matcher(&self) -> &PathPattern {
        &self.matcher
    }

    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    pub fn is_param(&self) -> bool {
        self.kind == RouteKind::Param
    }

    pub fn is_wildcard(&self) -> bool {
        self.kind == RouteKind::Wildcard
    }

    pub fn slot(&self, slot: MethodSlot) -> Option<&RouteHandler> {
        self.handlers[slot.index()].as_ref()
    }

    /// Overwrite one slot, leaving the others untouched
    pub fn set(&mut self, slot: MethodSlot, handler: RouteHandler) {
        self.handlers[slot.index()] = Some(handler);
    }

    /// The composed handler for a concrete method, falling back to `Any`
    #[inline]
    pub fn lookup(&self, slot: MethodSlot) -> Option<&BoxedHandler> {
        self.handlers[slot.index()]
            .as_ref()
            .or(self.handlers[MethodSlot::Any.index()].as_ref())
            .map(RouteHandler::composed)
    }

    /// Composed handlers per slot, for compilation
    pub fn composed_slots(&self) -> [Option<BoxedHandler>; MethodSlot::COUNT] {
        std::array::from_fn(|i| self.handlers[i].as_ref().map(|h| h.composed.clone()))
    }

    fn rebuild(&mut self, global: &[Arc<dyn Middleware>]) {
        for handler in self.handlers.iter_mut().flatten() {
            handler.rebuild(global);
        }
    }
}

/// A resolved route for one request
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub handler: &'a BoxedHandler,
    pub kind: RouteKind,
    /// Value exposed through `HttpRequest::route_param`
    pub route_param: Option<String>,
    /// Named `:param` captures
    pub params: HashMap<String, String>,
}

/// All registered routes, partitioned by kind
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    statics: HashMap<String, Route>,
    params: Vec<Route>,
    wildcards: Vec<Route>,
    catch_all: Option<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `terminal` for one method slot on `path`.
    ///
    /// Re-registering the same path and slot replaces only that slot.
    pub fn insert(
        &mut self,
        slot: MethodSlot,
        path: &str,
        terminal: BoxedHandler,
        local: Vec<Arc<dyn Middleware>>,
        global: &[Arc<dyn Middleware>],
    ) -> RouteKind {
        let (kind, key) = RouteKind::classify(normalize_path(path));
        let handler = RouteHandler::new(terminal, local, global);

        let route = match kind {
            RouteKind::Static => self
                .statics
                .entry(key.to_string())
                .or_insert_with(|| Route::new(key, kind)),
            RouteKind::Param => Self::entry(&mut self.params, key, kind),
            RouteKind::Wildcard | RouteKind::CatchAll => {
                Self::entry(&mut self.wildcards, key, kind)
            }
        };
        route.set(slot, handler);
        kind
    }

    fn entry<'a>(routes: &'a mut Vec<Route>, key: &str, kind: RouteKind) -> &'a mut Route {
        match routes.iter().position(|r| r.pattern == key) {
            Some(i) => &mut routes[i],
            None => {
                routes.push(Route::new(key, kind));
                let last = routes.len() - 1;
                &mut routes[last]
            }
        }
    }

    /// Register the catch-all for every concrete method at once
    pub fn set_catch_all(
        &mut self,
        terminal: BoxedHandler,
        local: Vec<Arc<dyn Middleware>>,
        global: &[Arc<dyn Middleware>],
    ) {
        let handler = RouteHandler::new(terminal, local, global);
        let route = self
            .catch_all
            .get_or_insert_with(|| Route::new("*", RouteKind::CatchAll));
        for slot in MethodSlot::CONCRETE {
            route.set(slot, handler.clone());
        }
    }

    /// Rebuild every composed handler in every partition
    pub fn recompose(&mut self, global: &[Arc<dyn Middleware>]) {
        self.statics
            .values_mut()
            .chain(self.params.iter_mut())
            .chain(self.wildcards.iter_mut())
            .chain(self.catch_all.iter_mut())
            .for_each(|route| route.rebuild(global));
    }

    pub fn statics(&self) -> impl Iterator<Item = &Route> {
        self.statics.values()
    }

    /// Parameterized routes in registration order
    pub fn params(&self) -> &[Route] {
        &self.params
    }

    pub fn wildcards(&self) -> &[Route] {
        &self.wildcards
    }

    pub fn catch_all(&self) -> Option<&Route> {
        self.catch_all.as_ref()
    }

    pub fn static_len(&self) -> usize {
        self.statics.len()
    }

    /// Number of routes across all partitions, the catch-all included
    pub fn len(&self) -> usize {
        self.statics.len()
            + self.params.len()
            + self.wildcards.len()
            + usize::from(self.catch_all.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a normalized path against the live table.
    ///
    /// Order: static, parameterized (first registered wins), wildcard
    /// (longest prefix wins), catch-all. A route whose slot is empty for the
    /// method does not stop the search.
    pub fn resolve(&self, method: &str, path: &str) -> Option<RouteMatch<'_>> {
        resolve_in(
            method,
            path,
            self.statics.get(path),
            self.params.iter().map(|r| (&r.matcher, r)),
            self.wildcards.iter().map(|r| (&r.matcher, r)),
            self.catch_all.as_ref(),
        )
    }
}

/// Handler slots that can be searched for a method
pub(crate) trait SlotLookup {
    fn lookup(&self, slot: MethodSlot) -> Option<&BoxedHandler>;
}

impl SlotLookup for Route {
    fn lookup(&self, slot: MethodSlot) -> Option<&BoxedHandler> {
        Route::lookup(self, slot)
    }
}

impl SlotLookup for [Option<BoxedHandler>; MethodSlot::COUNT] {
    fn lookup(&self, slot: MethodSlot) -> Option<&BoxedHandler> {
        self[slot.index()]
            .as_ref()
            .or(self[MethodSlot::Any.index()].as_ref())
    }
}

/// The resolution order, shared by the live table and the compiled snapshot
pub(crate) fn resolve_in<'a, R, P, W>(
    method: &str,
    path: &str,
    exact: Option<&'a R>,
    params: P,
    wildcards: W,
    catch_all: Option<&'a R>,
) -> Option<RouteMatch<'a>>
where
    R: SlotLookup + 'a,
    P: IntoIterator<Item = (&'a PathPattern, &'a R)>,
    W: IntoIterator<Item = (&'a PathPattern, &'a R)>,
{
    let slot = MethodSlot::for_method(method)?;

    if let Some(handler) = exact.and_then(|r| r.lookup(slot)) {
        return Some(RouteMatch {
            handler,
            kind: RouteKind::Static,
            route_param: None,
            params: HashMap::new(),
        });
    }

    for (pattern, route) in params {
        let Some(handler) = route.lookup(slot) else {
            continue;
        };
        if let Some(params) = pattern.match_exact(path) {
            return Some(RouteMatch {
                handler,
                kind: RouteKind::Param,
                route_param: Some(path.to_string()),
                params,
            });
        }
    }

    let mut best: Option<(usize, RouteMatch<'a>)> = None;
    for (pattern, route) in wildcards {
        if best.as_ref().is_some_and(|(len, _)| *len >= pattern.len()) {
            continue;
        }
        let Some(handler) = route.lookup(slot) else {
            continue;
        };
        if let Some((params, rest)) = pattern.match_prefix(path) {
            let found = RouteMatch {
                handler,
                kind: RouteKind::Wildcard,
                route_param: Some(rest.to_string()),
                params,
            };
            best = Some((pattern.len(), found));
        }
    }
    if let Some((_, found)) = best {
        return Some(found);
    }

    catch_all
        .and_then(|r| r.lookup(slot))
        .map(|handler| RouteMatch {
            handler,
            kind: RouteKind::CatchAll,
            route_param: Some(path.to_string()),
            params: HashMap::new(),
        })
}

/// Match a normalized `:param` pattern against a normalized path.
///
/// Segment counts must be equal. A `:name` segment binds one non-empty path
/// segment; every other segment must match literally.
pub fn match_param(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    PathPattern::parse(pattern).match_exact(path)
}

/// Match a normalized wildcard prefix against a normalized path.
///
/// The prefix must end on a segment boundary and may bind `:name` segments.
/// Returns what follows it, without the separating `/`.
pub fn match_wildcard<'p>(prefix: &str, path: &'p str) -> Option<&'p str> {
    PathPattern::parse(prefix)
        .match_prefix(path)
        .map(|(_, rest)| rest)
}
