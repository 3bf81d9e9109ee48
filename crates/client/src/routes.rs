//! Application route table and location resolution.
//!
//! Route meta is declared per record and merged parent → child at table
//! construction, so a page nested under an auth-only parent requires auth even
//! when it declares nothing itself.

use sara_auth::Role;
use url::form_urlencoded;

pub const LOGIN_ROUTE: &str = "login-page";
pub const REGISTER_ROUTE: &str = "register-page";
pub const DASHBOARD_ROUTE: &str = "dashboard";
pub const LOGIN_PATH: &str = "/login";

/// Declared navigation requirements of a route record.
///
/// `None` means "not declared here" and inherits from the parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: Option<bool>,
    pub required_roles: Option<Vec<Role>>,
}

impl RouteMeta {
    pub fn auth() -> Self {
        Self {
            requires_auth: Some(true),
            required_roles: None,
        }
    }

    pub fn roles(roles: &[Role]) -> Self {
        Self {
            requires_auth: Some(true),
            required_roles: Some(roles.to_vec()),
        }
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth.unwrap_or(false)
    }

    /// Child keys override parent keys.
    fn merged_into(&self, parent: &RouteMeta) -> RouteMeta {
        RouteMeta {
            requires_auth: self.requires_auth.or(parent.requires_auth),
            required_roles: self
                .required_roles
                .clone()
                .or_else(|| parent.required_roles.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteRecord {
    pub name: &'static str,
    pub path: &'static str,
    pub redirect: Option<&'static str>,
    pub meta: RouteMeta,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn new(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            path,
            redirect: None,
            meta: RouteMeta::default(),
            children: Vec::new(),
        }
    }

    pub fn meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn redirect(mut self, to: &'static str) -> Self {
        self.redirect = Some(to);
        self
    }

    pub fn children(mut self, children: Vec<RouteRecord>) -> Self {
        self.children = children;
        self
    }
}

/// Where a navigation wants to go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A path, optionally with a query string (`/users?page=2`).
    Path(String),
    Named {
        name: String,
        query: Vec<(String, String)>,
    },
}

impl Location {
    pub fn named(name: impl Into<String>) -> Self {
        Location::Named {
            name: name.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match self {
            Location::Named { name, mut query } => {
                query.push((key.into(), value.into()));
                Location::Named { name, query }
            }
            Location::Path(path) => {
                let (key, value): (String, String) = (key.into(), value.into());
                let sep = if path.contains('?') { '&' } else { '?' };
                let pair = form_urlencoded::Serializer::new(String::new())
                    .append_pair(&key, &value)
                    .finish();
                Location::Path(format!("{path}{sep}{pair}"))
            }
        }
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        Location::Path(value.to_string())
    }
}

impl From<String> for Location {
    fn from(value: String) -> Self {
        Location::Path(value)
    }
}

/// A location matched against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub name: &'static str,
    pub path: &'static str,
    pub query: Vec<(String, String)>,
    pub redirect: Option<&'static str>,
    pub meta: RouteMeta,
}

impl ResolvedRoute {
    /// Path plus encoded query, as a navigation would display it.
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.to_string();
        }
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
struct FlatRoute {
    name: &'static str,
    path: &'static str,
    redirect: Option<&'static str>,
    meta: RouteMeta,
}

/// Flattened, meta-merged route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<FlatRoute>,
}

impl RouteTable {
    pub fn new(records: Vec<RouteRecord>) -> Self {
        let mut routes = Vec::new();
        for record in &records {
            flatten(record, &RouteMeta::default(), &mut routes);
        }
        Self { routes }
    }

    pub fn resolve(&self, location: &Location) -> Option<ResolvedRoute> {
        match location {
            Location::Path(raw) => {
                let (path, query) = match raw.split_once('?') {
                    Some((path, query)) => (path, parse_query(query)),
                    None => (raw.as_str(), Vec::new()),
                };
                let path = normalize(path);
                let route = self.routes.iter().find(|r| r.path == path)?;
                Some(resolved(route, query))
            }
            Location::Named { name, query } => {
                let route = self.routes.iter().find(|r| r.name == name.as_str())?;
                Some(resolved(route, query.clone()))
            }
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(app_routes())
    }
}

/// The SARA application routes.
pub fn app_routes() -> Vec<RouteRecord> {
    let all_roles = [Role::Admin, Role::Manager, Role::Observer];

    vec![
        RouteRecord::new("main-page", "/")
            .redirect("/dashboard")
            .meta(RouteMeta::auth())
            .children(vec![
                RouteRecord::new(DASHBOARD_ROUTE, "/dashboard"),
                RouteRecord::new("movements", "/movements").meta(RouteMeta::roles(&all_roles)),
                RouteRecord::new("products", "/products").meta(RouteMeta::roles(&all_roles)),
                RouteRecord::new("categories", "/categories").meta(RouteMeta::roles(&all_roles)),
                RouteRecord::new("inventories", "/inventories").meta(RouteMeta::roles(&all_roles)),
                RouteRecord::new("predictions", "/predictions").meta(RouteMeta::auth()),
                RouteRecord::new("alerts", "/alerts").meta(RouteMeta::auth()),
                RouteRecord::new("reports", "/reports").meta(RouteMeta::auth()),
                RouteRecord::new("exports", "/exports").meta(RouteMeta::auth()),
                RouteRecord::new("users", "/users").meta(RouteMeta::roles(&[Role::Admin])),
            ]),
        RouteRecord::new(LOGIN_ROUTE, LOGIN_PATH),
        RouteRecord::new(REGISTER_ROUTE, "/register"),
    ]
}

fn flatten(record: &RouteRecord, parent: &RouteMeta, out: &mut Vec<FlatRoute>) {
    let meta = record.meta.merged_into(parent);
    out.push(FlatRoute {
        name: record.name,
        path: record.path,
        redirect: record.redirect,
        meta: meta.clone(),
    });
    for child in &record.children {
        flatten(child, &meta, out);
    }
}

fn resolved(route: &FlatRoute, query: Vec<(String, String)>) -> ResolvedRoute {
    ResolvedRoute {
        name: route.name,
        path: route.path,
        query,
        redirect: route.redirect,
        meta: route.meta.clone(),
    }
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
