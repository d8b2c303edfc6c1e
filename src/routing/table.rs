//! The immutable route table and its conversion into an axum router.

use {
    super::{RouteEntry, normalize_path},
    crate::{Error, GuardRegistry, Result},
    axum::{
        Router,
        extract::Request,
        middleware::{self, Next},
    },
    http::Method,
    std::{collections::HashMap, fmt, sync::Arc},
};

/// An ordered, immutable set of routes.
///
/// Built once at startup through [`RouteTableBuilder`](super::RouteTableBuilder)
/// and shared by reference afterwards. Lookups go through a `matchit` radix
/// tree; each distinct path pattern owns a slot listing the entries
/// registered for it, in registration order.
pub struct RouteTable<S = ()> {
    entries: Vec<RouteEntry<S>>,
    slots: Vec<Vec<usize>>,
    matcher: matchit::Router<usize>,
}

/// The result of a successful [`RouteTable::dispatch`].
pub struct Dispatch<'a, S = ()> {
    entry: &'a RouteEntry<S>,
    params: Vec<(String, String)>,
}

impl<S> RouteTable<S> {
    pub(crate) fn from_entries(entries: Vec<RouteEntry<S>>) -> Result<Self> {
        let mut matcher = matchit::Router::new();
        let mut slots: Vec<Vec<usize>> = Vec::new();
        let mut slot_of: HashMap<String, usize> = HashMap::new();

        for (idx, entry) in entries.iter().enumerate() {
            if let Some(&slot) = slot_of.get(&entry.path) {
                slots[slot].push(idx);
                continue;
            }
            matcher.insert(entry.path.clone(), slots.len())?;
            slot_of.insert(entry.path.clone(), slots.len());
            slots.push(vec![idx]);
        }

        Ok(Self {
            entries,
            slots,
            matcher,
        })
    }

    /// Finds the entry registered for `method` and `path`.
    ///
    /// The path is normalized first, so `/dashboard/` finds `/dashboard`.
    /// HEAD requests fall back to the GET entry of the same path.
    ///
    /// # Errors
    ///
    /// `NotFound` when no entry matches both the method and the path.
    pub fn dispatch(&self, method: &Method, path: &str) -> Result<Dispatch<'_, S>> {
        let path = normalize_path(path);
        let not_found = || Error::not_found(format!("No route for {method} {path}"));

        let matched = self.matcher.at(&path).map_err(|_| not_found())?;
        let slot = self.slots.get(*matched.value).ok_or_else(not_found)?;

        let entry = self
            .find_in_slot(slot, method)
            .or_else(|| {
                (*method == Method::HEAD)
                    .then(|| self.find_in_slot(slot, &Method::GET))
                    .flatten()
            })
            .ok_or_else(not_found)?;

        let params = matched
            .params
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        Ok(Dispatch { entry, params })
    }

    fn find_in_slot(&self, slot: &[usize], method: &Method) -> Option<&RouteEntry<S>> {
        slot.iter()
            .map(|&idx| &self.entries[idx])
            .find(|entry| entry.method == *method)
    }

    /// Returns the path pattern of the route with the given name.
    ///
    /// # Errors
    ///
    /// `NotFound` when no route carries that name.
    pub fn url_for(&self, name: &str) -> Result<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name.as_deref() == Some(name))
            .map(|entry| entry.path.as_str())
            .ok_or_else(|| Error::not_found(format!("Route '{name}' is not defined")))
    }

    /// Iterates the entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry<S>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S> RouteTable<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Turns the table into an axum router.
    ///
    /// Each entry becomes a route whose guards run as a `route_layer`, in
    /// declared order, before the handler. The matched route label is
    /// recorded into the `route` field of the request span.
    ///
    /// # Errors
    ///
    /// `UnknownGuard` when an entry names a guard missing from `guards`.
    pub fn into_router(&self, guards: &GuardRegistry) -> Result<Router<S>> {
        let mut router = Router::new();

        for entry in &self.entries {
            let chain = Arc::new(guards.chain(&entry.guards)?);
            let mut method_router = entry.method_router.clone();

            if !chain.is_empty() {
                method_router = method_router.route_layer(middleware::from_fn(
                    move |request: Request, next: Next| {
                        let chain = Arc::clone(&chain);
                        async move { chain.run(request, next).await }
                    },
                ));
            }

            let label = entry.label().to_string();
            method_router = method_router.route_layer(middleware::from_fn(
                move |request: Request, next: Next| {
                    tracing::Span::current().record("route", label.as_str());
                    next.run(request)
                },
            ));

            router = router.route(&entry.path, method_router);
        }

        Ok(router)
    }
}

impl<S> fmt::Debug for RouteTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl<'a, S> Dispatch<'a, S> {
    pub fn entry(&self) -> &'a RouteEntry<S> {
        self.entry
    }

    /// Symbolic identifier of the matched handler.
    pub fn handler(&self) -> &'a str {
        &self.entry.handler
    }

    /// The guard chain that runs before the handler, in order.
    pub fn guards(&self) -> &'a [String] {
        &self.entry.guards
    }

    /// Value of a captured path parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

impl<S> fmt::Debug for Dispatch<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("entry", self.entry)
            .field("params", &self.params)
            .finish()
    }
}
