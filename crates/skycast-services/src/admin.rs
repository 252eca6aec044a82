//! Admin aggregation: usage statistics over the service's logs and users.
//!
//! The reducers are pure and operate on already fetched data. A user record
//! missing a unit preference is a data defect; it is logged and reported,
//! never counted as the default.

use skycast_auth::{Route, SessionContext};
use skycast_core::{IntegrityError, Result, Role};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::client::ApiClient;
use crate::models::{AdminLogEntry, AdminUserRecord};
use crate::weather::validate_city;

/// Number of requests per city.
pub fn city_frequency(logs: &[AdminLogEntry]) -> BTreeMap<String, usize> {
    logs.iter().fold(BTreeMap::new(), |mut counts, entry| {
        *counts.entry(entry.city.clone()).or_insert(0) += 1;
        counts
    })
}

fn unit_distribution<U>(
    users: &[AdminUserRecord],
    field: &'static str,
    unit_of: impl Fn(&AdminUserRecord) -> Option<U>,
    ordinal: impl Fn(U) -> usize,
) -> std::result::Result<[usize; 2], IntegrityError> {
    users.iter().try_fold([0, 0], |mut counts, user| match unit_of(user) {
        Some(unit) => {
            counts[ordinal(unit)] += 1;
            Ok(counts)
        }
        None => {
            tracing::error!("User {} has no {}", user.email, field);
            Err(IntegrityError::MissingField {
                record: user.email.clone(),
                field,
            })
        }
    })
}

/// `[celsius, fahrenheit]` user counts.
pub fn temperature_unit_distribution(
    users: &[AdminUserRecord],
) -> std::result::Result<[usize; 2], IntegrityError> {
    unit_distribution(
        users,
        "preferred_temperature_unit",
        |u| u.temperature_unit,
        |unit| unit.ordinal(),
    )
}

/// `[km/h, knots]` user counts.
pub fn wind_speed_unit_distribution(
    users: &[AdminUserRecord],
) -> std::result::Result<[usize; 2], IntegrityError> {
    unit_distribution(
        users,
        "preferred_wind_speed_unit",
        |u| u.wind_speed_unit,
        |unit| unit.ordinal(),
    )
}

/// Number of pages of size `page_size` needed for `len` items.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Items of 1-based `page`. Out of range pages are empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Current page of a paginated list, kept within `[1, total_pages]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: usize,
    page_size: usize,
    total_pages: usize,
}

impl PageCursor {
    pub fn new(len: usize, page_size: usize) -> Self {
        Self {
            page: 1,
            page_size,
            total_pages: total_pages(len, page_size),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    pub fn next(&mut self) -> usize {
        if self.page < self.total_pages {
            self.page += 1;
        }
        self.page
    }

    pub fn previous(&mut self) -> usize {
        if self.page > 1 {
            self.page -= 1;
        }
        self.page
    }

    /// Jump to `page`, clamped into range.
    pub fn go_to(&mut self, page: usize) -> usize {
        self.page = page.clamp(1, self.total_pages.max(1));
        self.page
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        paginate(items, self.page, self.page_size)
    }
}

/// Everything shown on the admin screen.
#[derive(Debug, Clone)]
pub struct AdminDashboard {
    pub logs: Vec<AdminLogEntry>,
    pub users: Vec<AdminUserRecord>,
    pub city_frequency: BTreeMap<String, usize>,
    pub temperature_units: std::result::Result<[usize; 2], IntegrityError>,
    pub wind_speed_units: std::result::Result<[usize; 2], IntegrityError>,
    pub cursor: PageCursor,
}

impl AdminDashboard {
    pub fn build(logs: Vec<AdminLogEntry>, users: Vec<AdminUserRecord>, page_size: usize) -> Self {
        Self {
            city_frequency: city_frequency(&logs),
            temperature_units: temperature_unit_distribution(&users),
            wind_speed_units: wind_speed_unit_distribution(&users),
            cursor: PageCursor::new(logs.len(), page_size),
            logs,
            users,
        }
    }

    pub fn logs_page(&self) -> &[AdminLogEntry] {
        self.cursor.slice(&self.logs)
    }

    /// Log entries of an explicitly requested 1-based `page`.
    ///
    /// Unlike the cursor this does not clamp: a page beyond the range is empty.
    pub fn logs_on_page(&self, page: usize) -> &[AdminLogEntry] {
        paginate(&self.logs, page, self.cursor.page_size)
    }
}

pub struct AdminView {
    api: Arc<ApiClient>,
    session: Arc<SessionContext>,
    page_size: usize,
}

impl AdminView {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionContext>, page_size: usize) -> Self {
        Self {
            api,
            session,
            page_size,
        }
    }

    /// Role gate. Non-admins are sent to the dashboard and get `false`.
    pub async fn enter(&self) -> Result<bool> {
        let token = self.session.require()?;

        match self.api.get_role(&token).await {
            Ok(Role::Admin) => Ok(true),
            Ok(Role::User) => {
                tracing::info!("Not an admin, routing to dashboard");
                self.session.navigate(Route::Dashboard);
                Ok(false)
            }
            Err(e) => {
                self.session.handle_failure(&token, &e);
                Err(e)
            }
        }
    }

    /// Fetch logs and users together and reduce them.
    pub async fn load_dashboard(&self) -> Result<AdminDashboard> {
        let token = self.session.require()?;

        let (logs, users) = tokio::join!(self.api.admin_logs(&token), self.api.admin_users(&token));

        let logs = logs.inspect_err(|e| self.session.handle_failure(&token, e))?;
        let users = users.inspect_err(|e| self.session.handle_failure(&token, e))?;

        tracing::info!("Loaded {} log entries and {} users", logs.len(), users.len());
        Ok(AdminDashboard::build(logs, users, self.page_size))
    }

    pub async fn clear_cache(&self) -> Result<()> {
        let token = self.session.require()?;
        self.api
            .clear_cache(&token)
            .await
            .inspect_err(|e| self.session.handle_failure(&token, e))?;
        tracing::info!("Weather cache cleared");
        Ok(())
    }

    pub async fn clear_city_cache(&self, city: &str) -> Result<()> {
        let city = validate_city(city)?;
        let token = self.session.require()?;
        self.api
            .clear_city_cache(&token, city)
            .await
            .inspect_err(|e| self.session.handle_failure(&token, e))?;
        tracing::info!("Weather cache cleared for {}", city);
        Ok(())
    }
}
