//! Static route-id → label table used for breadcrumbs.

/// Route labels, fixed at build time.
const LABELS: &[(&str, &str)] = &[
    ("check", "Check access"),
    ("dashboard", "Home"),
    ("signin", "Sign In"),
    ("roles", "Roles"),
    ("roles-create", "Create"),
    ("roles-edit", "Edit"),
    ("policies", "Policies"),
    ("policies-create", "Create"),
    ("policies-edit", "Edit"),
    ("principals", "Principals"),
    ("principals-create", "Create"),
    ("principals-edit", "Edit"),
    ("resources", "Resources"),
    ("resources-create", "Create"),
    ("resources-edit", "Edit"),
    ("users", "Users"),
    ("users-create", "Create"),
    ("clients", "Service accounts"),
    ("clients-create", "Create"),
    ("clients-edit", "Edit"),
];

pub fn label(route_id: &str) -> Option<&'static str> {
    LABELS
        .iter()
        .find(|(id, _)| *id == route_id)
        .map(|(_, label)| *label)
}

/// A matched route (outermost first).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub id: &'a str,
    pub pathname: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbItem {
    pub label: String,
    pub href: String,
}

/// Builds the breadcrumb trail for the matched routes.
///
/// Index routes are skipped. Root matches other than the dashboard get an
/// empty href so they render as plain text.
pub fn breadcrumbs(matches: &[RouteMatch<'_>]) -> Vec<BreadcrumbItem> {
    matches
        .iter()
        .filter(|m| !m.id.ends_with("-index"))
        .map(|m| BreadcrumbItem {
            label: label(m.id)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Unlabelized: {}", m.id)),
            href: if m.id != "dashboard" && m.pathname == "/" {
                String::new()
            } else {
                m.pathname.to_string()
            },
        })
        .collect()
}
