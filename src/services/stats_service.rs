//! Read-only aggregates over full entity lists.
//!
//! The pure functions take already-fetched lists; the async wrappers fetch
//! through the repositories and fail closed, never aggregating over a
//! partial or empty fallback.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::{
    error::{AppError, Result},
    models::{MonthlyUsers, Product, ProductGrowth, ProductStats, User, UserStats, UserStatus},
    queries::{product_queries, user_queries},
    store::DocumentStore,
};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn product_stats(products: &[Product]) -> ProductStats {
    ProductStats {
        total: products.len(),
        low_stock: products
            .iter()
            .filter(|p| p.draft.quantity <= p.draft.min_stock_level)
            .count(),
        out_of_stock: products.iter().filter(|p| p.draft.quantity == 0).count(),
        with_discount: products
            .iter()
            .filter(|p| p.draft.discount > Decimal::ZERO)
            .count(),
    }
}

pub fn product_growth(products: &[Product]) -> ProductGrowth {
    let mut growth = ProductGrowth::new();
    for date in products
        .iter()
        .filter_map(|p| parse_calendar_date(&p.draft.manufacturing_date))
    {
        *growth
            .entry(format!("{:04}-{:02}", date.year(), date.month()))
            .or_insert(0) += 1;
    }
    growth
}

pub fn user_stats(users: &[User], now: DateTime<Utc>) -> UserStats {
    UserStats {
        total_users: users.len(),
        active_users: users
            .iter()
            .filter(|u| u.status == UserStatus::Active)
            .count(),
        new_users_this_month: users
            .iter()
            .filter_map(created_at)
            .filter(|c| c.year() == now.year() && c.month() == now.month())
            .count(),
    }
}

/// Sign-ups per calendar month in chronological order. Users without a
/// creation timestamp are left out.
pub fn user_growth(users: &[User]) -> Vec<MonthlyUsers> {
    let mut buckets: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for created in users.iter().filter_map(created_at) {
        *buckets.entry((created.year(), created.month())).or_insert(0) += 1;
    }

    buckets
        .into_iter()
        .map(|((year, month), users)| MonthlyUsers {
            month: MONTH_NAMES[month as usize - 1].to_string(),
            year,
            users,
        })
        .collect()
}

pub async fn load_product_stats(store: &dyn DocumentStore) -> Result<ProductStats> {
    let products = product_queries::list_products(store)
        .await
        .map_err(|_| AppError::Store("Failed to fetch product stats".to_string()))?;
    Ok(product_stats(&products))
}

pub async fn load_product_growth(store: &dyn DocumentStore) -> Result<ProductGrowth> {
    let products = product_queries::list_products(store)
        .await
        .map_err(|_| AppError::Store("Failed to fetch product growth data".to_string()))?;
    Ok(product_growth(&products))
}

pub async fn load_user_stats(store: &dyn DocumentStore) -> Result<UserStats> {
    let users = user_queries::list_users(store)
        .await
        .map_err(|_| AppError::Store("Failed to calculate user statistics".to_string()))?;
    Ok(user_stats(&users, Utc::now()))
}

pub async fn load_user_growth(store: &dyn DocumentStore) -> Result<Vec<MonthlyUsers>> {
    let users = user_queries::list_users(store)
        .await
        .map_err(|_| AppError::Store("Failed to calculate user growth data".to_string()))?;
    Ok(user_growth(&users))
}

fn created_at(user: &User) -> Option<DateTime<Utc>> {
    user.created_at.as_ref()?.to_datetime()
}

/// Plain dates are taken as written; timestamps are bucketed by their UTC date.
fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc).date_naive())
        })
}
