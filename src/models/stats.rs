use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub with_discount: usize,
}

/// Products per `YYYY-MM` of manufacturing date, in calendar order.
pub type ProductGrowth = BTreeMap<String, usize>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: usize,
    pub active_users: usize,
    pub new_users_this_month: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyUsers {
    pub month: String,
    pub year: i32,
    pub users: usize,
}
