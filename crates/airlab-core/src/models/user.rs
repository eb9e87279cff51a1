// ABOUTME: User account model with role, billing plan, balance, and usage counters
// ABOUTME: Provides plan quota and pricing lookups used by billing and chat enforcement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::constants::billing;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular tenant
    #[default]
    User,
    /// Platform administrator
    Admin,
}

string_enum!(UserRole { User => "user", Admin => "admin" });

impl UserRole {
    /// Whether this role may use the admin panel
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Subscription plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillingPlan {
    /// Free tier
    #[default]
    Free,
    /// Paid tier for small teams
    Pro,
    /// Unlimited tier
    Business,
}

string_enum!(BillingPlan { Free => "free", Pro => "pro", Business => "business" });

impl BillingPlan {
    /// Monthly message quota, `None` meaning unlimited
    #[must_use]
    pub const fn monthly_message_quota(self) -> Option<i64> {
        match self {
            Self::Free => Some(billing::FREE_MONTHLY_MESSAGES),
            Self::Pro => Some(billing::PRO_MONTHLY_MESSAGES),
            Self::Business => None,
        }
    }

    /// Monthly price in cents
    #[must_use]
    pub const fn price_cents(self) -> i64 {
        match self {
            Self::Free => 0,
            Self::Pro => billing::PRO_PRICE_CENTS,
            Self::Business => billing::BUSINESS_PRICE_CENTS,
        }
    }
}

/// Registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,
    /// Login email (unique)
    pub email: String,
    /// Optional display name
    pub display_name: Option<String>,
    /// bcrypt password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role
    pub role: UserRole,
    /// Current billing plan
    pub plan: BillingPlan,
    /// Prepaid balance in cents
    pub balance_cents: i64,
    /// Messages consumed in the current billing period
    pub messages_used: i64,
    /// Start of the billing period `messages_used` counts against
    pub usage_period_start: DateTime<Utc>,
    /// Disabled accounts cannot log in
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last successful login or request
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Create an active free-plan user
    #[must_use]
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            password_hash,
            role: UserRole::User,
            plan: BillingPlan::Free,
            balance_cents: 0,
            messages_used: 0,
            usage_period_start: billing_period_start(now),
            is_active: true,
            created_at: now,
            last_active: now,
        }
    }

    /// Messages left in the current period, `None` meaning unlimited
    #[must_use]
    pub fn remaining_messages(&self) -> Option<i64> {
        self.plan
            .monthly_message_quota()
            .map(|quota| (quota - self.messages_used).max(0))
    }

    /// Whether the recorded billing period ended before `now`
    #[must_use]
    pub fn usage_period_elapsed(&self, now: DateTime<Utc>) -> bool {
        self.usage_period_start < billing_period_start(now)
    }
}

/// First instant of the calendar month containing `at`
///
/// Billing periods are calendar months in UTC.
#[must_use]
pub fn billing_period_start(at: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(at.year(), at.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(at)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_round_trip_and_quota() {
        assert_eq!("pro".parse::<BillingPlan>().unwrap(), BillingPlan::Pro);
        assert!("gold".parse::<BillingPlan>().is_err());
        assert_eq!(BillingPlan::Business.monthly_message_quota(), None);
    }

    #[test]
    fn test_remaining_messages_never_negative() {
        let mut user = User::new("a@b.c".into(), "hash".into(), None);
        user.messages_used = 250;
        assert_eq!(user.remaining_messages(), Some(0));
        user.plan = BillingPlan::Business;
        assert_eq!(user.remaining_messages(), None);
    }

    #[test]
    fn test_billing_period_is_calendar_month() {
        let at = Utc.with_ymd_and_hms(2026, 3, 17, 13, 45, 10).unwrap();
        let start = billing_period_start(at);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());

        let mut user = User::new("a@b.c".into(), "hash".into(), None);
        user.usage_period_start = Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 59).unwrap();
        assert!(user.usage_period_elapsed(at));
        user.usage_period_start = start;
        assert!(!user.usage_period_elapsed(at));
    }
}
