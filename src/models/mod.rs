// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod user;

pub use activity::{Activity, ActivityType, NewActivity, CONTRIBUTION_REPOSITORY};
pub use user::User;
