//! Startup-time construction of a [`RouteTable`].

use {
    super::{Route, RouteEntry, RouteTable},
    crate::{Error, Result},
    http::Method,
    std::collections::HashSet,
};

/// A deferred set of routes merged into a builder with [`RouteTableBuilder::include`].
///
/// Any `FnOnce(&mut RouteTableBuilder<S>) -> Result<()>` is a route source,
/// so a plain function can describe a whole section of the application.
pub trait RouteSource<S> {
    fn register_routes(self, routes: &mut RouteTableBuilder<S>) -> Result<()>;
}

impl<S, F> RouteSource<S> for F
where
    F: FnOnce(&mut RouteTableBuilder<S>) -> Result<()>,
{
    fn register_routes(self, routes: &mut RouteTableBuilder<S>) -> Result<()> {
        self(routes)
    }
}

/// Collects routes in registration order and freezes them into a [`RouteTable`].
///
/// ```rust
/// use page_routes::{Route, RouteTableBuilder};
///
/// # fn main() -> page_routes::Result<()> {
/// let mut routes = RouteTableBuilder::<()>::new();
/// routes
///     .register(Route::get("/", "home", || async { "home" }).name("home"))?
///     .group(&["auth"], |routes| {
///         routes.register(Route::get("/dashboard", "dashboard", || async { "dashboard" }))?;
///         Ok(())
///     })?;
///
/// let table = routes.build()?;
/// assert_eq!(table.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct RouteTableBuilder<S = ()> {
    entries: Vec<RouteEntry<S>>,
    guard_stack: Vec<String>,
    keys: HashSet<(Method, String)>,
    names: HashSet<String>,
}

impl<S> Default for RouteTableBuilder<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            guard_stack: Vec::new(),
            keys: HashSet::new(),
            names: HashSet::new(),
        }
    }
}

impl<S> RouteTableBuilder<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route, tagging it with the guards of every enclosing group.
    ///
    /// # Errors
    ///
    /// `DuplicateRoute` when the method and path are already registered
    /// (HEAD and GET share a slot since GET routes also answer HEAD), or
    /// when the route name is taken.
    pub fn register(&mut self, route: Route<S>) -> Result<&mut Self> {
        let method = route.method().clone();
        let path = route.path().to_string();

        let shadows = |other: Method| self.keys.contains(&(other, path.clone()));
        let taken = shadows(method.clone())
            || (method == Method::HEAD && shadows(Method::GET))
            || (method == Method::GET && shadows(Method::HEAD));
        if taken {
            return Err(Error::duplicate_route(format!(
                "{method} {path} is already registered"
            )));
        }

        let entry = route.into_entry(self.guard_stack.clone());
        if let Some(name) = &entry.name {
            if self.names.contains(name) {
                return Err(Error::duplicate_route(format!(
                    "Route name '{name}' is already used"
                )));
            }
            self.names.insert(name.clone());
        }

        tracing::debug!(
            method = %entry.method,
            path = %entry.path,
            handler = %entry.handler,
            guards = ?entry.guards,
            "Registered route"
        );

        self.keys.insert((method, path));
        self.entries.push(entry);
        Ok(self)
    }

    /// Runs `f` with `guards` appended to the active guard list.
    ///
    /// Groups nest: an entry registered in an inner group carries the outer
    /// guards first, then the inner ones.
    pub fn group<F>(&mut self, guards: &[&str], f: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let depth = self.guard_stack.len();
        self.guard_stack
            .extend(guards.iter().map(|guard| guard.to_string()));
        let result = f(self);
        self.guard_stack.truncate(depth);
        result?;
        Ok(self)
    }

    /// Merges a deferred route source at the current position.
    pub fn include<R>(&mut self, source: R) -> Result<&mut Self>
    where
        R: RouteSource<S>,
    {
        source.register_routes(self)?;
        Ok(self)
    }

    /// Freezes the collected routes.
    ///
    /// # Errors
    ///
    /// `DuplicateRoute` when two distinct path patterns would match the same
    /// requests (`/users/{id}` and `/users/{name}`), `InvalidInput` for a
    /// malformed pattern.
    pub fn build(self) -> Result<RouteTable<S>> {
        let table = RouteTable::from_entries(self.entries)?;
        tracing::info!(
            routes = table.len(),
            named = self.names.len(),
            "Route table built"
        );
        Ok(table)
    }
}
