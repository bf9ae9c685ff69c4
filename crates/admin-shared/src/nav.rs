//! Role based selection of the sidebar navigation entries.
//!
//! This only decides what is shown. It is a convenience for the user and not
//! an access control mechanism, the backend remains the authority on what a
//! role may do (for example support is meant to be read only but nothing here
//! enforces that).

use crate::uac::Role;

/// Paths of the dashboard pages
pub mod routes {
    pub const ROUTE_LOGIN: &str = "/login";
    pub const ROUTE_DASHBOARD: &str = "/dashboard";
    pub const ROUTE_ORDERS: &str = "/orders";
    pub const ROUTE_PRODUCTS: &str = "/products";
    pub const ROUTE_CATEGORIES: &str = "/categories";
    pub const ROUTE_CUSTOMERS: &str = "/customers";
    pub const ROUTE_DELIVERIES: &str = "/deliveries";
    pub const ROUTE_ANALYTICS: &str = "/analytics";
    pub const ROUTE_WEEKLY_REPORTS: &str = "/reports/weekly";
    pub const ROUTE_PROFILE: &str = "/profile";
    pub const ROUTE_SELLERS: &str = "/sellers";
    pub const ROUTE_USERS: &str = "/users";
    pub const ROUTE_DRIVERS: &str = "/drivers";
    pub const ROUTE_PROMOTIONS: &str = "/promotions";
    pub const ROUTE_REVIEWS: &str = "/reviews";
    pub const ROUTE_NOTIFICATIONS: &str = "/notifications";
    pub const ROUTE_SETTINGS: &str = "/settings";
    pub const ROUTE_HELP: &str = "/help";
}

use routes::*;

#[derive(Debug, serde::Serialize, Clone, Copy, PartialEq, Eq)]
pub struct NavEntry {
    pub label: &'static str,
    pub path: &'static str,
}

impl NavEntry {
    pub const fn new(label: &'static str, path: &'static str) -> Self {
        Self { label, path }
    }
}

pub const NAV_DASHBOARD: NavEntry = NavEntry::new("Dashboard", ROUTE_DASHBOARD);
pub const NAV_ORDERS: NavEntry = NavEntry::new("Orders", ROUTE_ORDERS);
pub const NAV_PRODUCTS: NavEntry = NavEntry::new("Products", ROUTE_PRODUCTS);
pub const NAV_CATEGORIES: NavEntry = NavEntry::new("Categories", ROUTE_CATEGORIES);
pub const NAV_CUSTOMERS: NavEntry = NavEntry::new("Customers", ROUTE_CUSTOMERS);
pub const NAV_DELIVERIES: NavEntry = NavEntry::new("Deliveries", ROUTE_DELIVERIES);
pub const NAV_ANALYTICS: NavEntry = NavEntry::new("Analytics", ROUTE_ANALYTICS);
pub const NAV_WEEKLY_REPORTS: NavEntry = NavEntry::new("Weekly Reports", ROUTE_WEEKLY_REPORTS);
pub const NAV_PROFILE: NavEntry = NavEntry::new("Profile", ROUTE_PROFILE);
pub const NAV_SELLERS: NavEntry = NavEntry::new("Sellers", ROUTE_SELLERS);
pub const NAV_USERS: NavEntry = NavEntry::new("Users", ROUTE_USERS);
pub const NAV_DRIVERS: NavEntry = NavEntry::new("Drivers", ROUTE_DRIVERS);
pub const NAV_PROMOTIONS: NavEntry = NavEntry::new("Promotions", ROUTE_PROMOTIONS);
pub const NAV_REVIEWS: NavEntry = NavEntry::new("Reviews", ROUTE_REVIEWS);
pub const NAV_SETTINGS: NavEntry = NavEntry::new("Settings", ROUTE_SETTINGS);
pub const NAV_HELP: NavEntry = NavEntry::new("Help", ROUTE_HELP);

pub const NAV_DEFAULT_PRIMARY: &[NavEntry] = &[
    NAV_DASHBOARD,
    NAV_ORDERS,
    NAV_PRODUCTS,
    NAV_CATEGORIES,
    NAV_CUSTOMERS,
    NAV_DELIVERIES,
    NAV_ANALYTICS,
    NAV_WEEKLY_REPORTS,
];
pub const NAV_DEFAULT_SECONDARY: &[NavEntry] =
    &[NAV_USERS, NAV_DRIVERS, NAV_PROMOTIONS, NAV_REVIEWS];
pub const NAV_TERTIARY: &[NavEntry] = &[NAV_SETTINGS, NAV_HELP];
pub const NAV_SELLER_PRIMARY: &[NavEntry] = &[NAV_DASHBOARD, NAV_PRODUCTS, NAV_PROFILE];
pub const NAV_MANAGER_PRIMARY: &[NavEntry] = &[NAV_DASHBOARD, NAV_ANALYTICS, NAV_WEEKLY_REPORTS];

/// The navigation groups visible for a role
#[derive(Debug, serde::Serialize, Clone, PartialEq, Eq)]
pub struct MenuView {
    pub primary: Vec<NavEntry>,
    pub secondary: Vec<NavEntry>,
    pub show_tertiary: bool,
}

impl MenuView {
    /// An absent role gets the default view
    pub fn for_role(role: Option<Role>) -> Self {
        match role {
            Some(Role::Seller) => Self::restricted(NAV_SELLER_PRIMARY),
            Some(Role::Manager) => Self::restricted(NAV_MANAGER_PRIMARY),
            Some(role) if role.is_admin() => {
                let mut result = Self::default();
                result.secondary.insert(0, NAV_SELLERS);
                result
            }
            Some(_) | None => Self::default(),
        }
    }

    /// Names that are not a known role get the default view
    pub fn for_role_name(role_name: &str) -> Self {
        Self::for_role(role_name.parse().ok())
    }

    fn restricted(primary: &[NavEntry]) -> Self {
        Self {
            primary: primary.to_vec(),
            secondary: Vec::new(),
            show_tertiary: false,
        }
    }

    pub fn tertiary(&self) -> &'static [NavEntry] {
        if self.show_tertiary {
            NAV_TERTIARY
        } else {
            &[]
        }
    }

    /// Returns `true` if any visible entry links to `path`
    pub fn is_visible(&self, path: &str) -> bool {
        self.primary
            .iter()
            .chain(self.secondary.iter())
            .chain(self.tertiary().iter())
            .any(|entry| entry.path == path)
    }
}

impl Default for MenuView {
    fn default() -> Self {
        Self {
            primary: NAV_DEFAULT_PRIMARY.to_vec(),
            secondary: NAV_DEFAULT_SECONDARY.to_vec(),
            show_tertiary: true,
        }
    }
}
