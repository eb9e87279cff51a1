// ABOUTME: Account service for billing plans, usage summaries and account deletion
// ABOUTME: Plan switches debit the prepaid balance atomically in the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::models::{billing_period_start, BillingPlan, User};
use crate::openai::AssistantsApi;
use crate::services::assistants::{delete_remote, delete_stored_objects};
use crate::storage::ObjectStorage;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Plan, quota and balance of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BillingSummary {
    /// Current plan
    pub plan: BillingPlan,
    /// Monthly message quota, `None` for unlimited
    pub monthly_quota: Option<i64>,
    /// Messages used this period
    pub messages_used: i64,
    /// Start of the current billing period
    pub period_start: DateTime<Utc>,
    /// Messages left, `None` for unlimited
    pub remaining_messages: Option<i64>,
    /// Prepaid balance
    pub balance_cents: i64,
    /// Monthly price of the current plan
    pub price_cents: i64,
}

impl From<&User> for BillingSummary {
    fn from(user: &User) -> Self {
        Self {
            plan: user.plan,
            monthly_quota: user.plan.monthly_message_quota(),
            messages_used: user.messages_used,
            period_start: user.usage_period_start,
            remaining_messages: user.remaining_messages(),
            balance_cents: user.balance_cents,
            price_cents: user.plan.price_cents(),
        }
    }
}

async fn reload(database: &Database, user_id: Uuid) -> AppResult<User> {
    database
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
}

/// Start a new billing period once the calendar month has turned
///
/// The request that wins the rollover resets the usage counter and renews a
/// paid plan by debiting its monthly price. When the balance no longer covers
/// the price the account drops to the free plan.
///
/// # Errors
///
/// `RESOURCE_NOT_FOUND` for unknown users and database errors
pub async fn refresh_billing_period(database: &Database, user_id: Uuid) -> AppResult<User> {
    let user = reload(database, user_id).await?;
    let now = Utc::now();
    if !user.usage_period_elapsed(now) {
        return Ok(user);
    }
    if !database
        .roll_usage_period(user.id, billing_period_start(now))
        .await?
    {
        return reload(database, user_id).await;
    }

    let price = user.plan.price_cents();
    if price > 0 {
        if database.change_user_plan(user.id, user.plan, price).await? {
            info!(user_id = %user.id, plan = %user.plan, price, "Renewed billing plan");
        } else {
            database.set_user_plan(user.id, BillingPlan::Free).await?;
            warn!(
                user_id = %user.id,
                plan = %user.plan,
                balance_cents = user.balance_cents,
                "Balance does not cover renewal, moved to free plan"
            );
        }
    }
    info!(user_id = %user.id, "Started new billing period");
    reload(database, user_id).await
}

/// Switch a user's plan
///
/// Paid plans debit their monthly price from the balance and start a new
/// usage period. Moving to the free plan costs nothing and keeps the usage
/// counter. Selecting the current plan changes nothing.
///
/// # Errors
///
/// `PAYMENT_REQUIRED` when the balance does not cover the price
pub async fn change_plan(database: &Database, user: &User, plan: BillingPlan) -> AppResult<User> {
    let user = refresh_billing_period(database, user.id).await?;
    if user.plan == plan {
        return Ok(user);
    }

    let price = plan.price_cents();
    if price == 0 {
        database.set_user_plan(user.id, plan).await?;
    } else {
        if !database.change_user_plan(user.id, plan, price).await? {
            return Err(AppError::new(
                ErrorCode::PaymentRequired,
                format!(
                    "The {plan} plan costs {price} cents but the balance is {} cents",
                    user.balance_cents
                ),
            ));
        }
        database.reset_messages_used(user.id).await?;
    }
    info!(user_id = %user.id, from = %user.plan, to = %plan, "Changed billing plan");
    reload(database, user.id).await
}

/// Delete an account and everything it owns
///
/// `OpenAI` assistants, vector stores and stored objects are removed on a
/// best-effort basis before the cascading database delete.
///
/// # Errors
///
/// `RESOURCE_NOT_FOUND` for unknown users and database errors
pub async fn delete_account(
    database: &Database,
    api: &dyn AssistantsApi,
    storage: &dyn ObjectStorage,
    user_id: Uuid,
) -> AppResult<()> {
    let assistants = database.list_assistants_for_user(user_id).await?;
    for assistant in &assistants {
        delete_remote(api, assistant).await;
        delete_stored_objects(database, storage, assistant.id).await;
    }

    if !database.delete_user(user_id).await? {
        return Err(AppError::not_found("User"));
    }
    info!(user_id = %user_id, assistants = assistants.len(), "Deleted account");
    Ok(())
}
