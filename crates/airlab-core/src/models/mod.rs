// ABOUTME: Domain models for users, assistants, conversations, documents, and integrations
// ABOUTME: Flat records mirroring the relational schema with JSON fields for semi-structured config
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Air Lab

/// Generate the string-backed enum helpers shared by every stored enum
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Database and wire representation
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::errors::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(crate::errors::AppError::invalid_input(format!(
                        "Unknown {} '{other}'",
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

mod assistant;
mod conversation;
mod document;
mod integration;
mod session;
mod user;

pub use assistant::{Assistant, AssistantTool, FunctionDefinition};
pub use conversation::{Channel, Conversation, MessageRole, StoredMessage};
pub use document::{DocumentStatus, GoogleDocsDocument, KnowledgeBaseEntry};
pub use integration::Integration;
pub use session::Session;
pub use user::{billing_period_start, BillingPlan, User, UserRole};
