//! Admin accounts and tokens for tests.

use utkrisht_core::models::{User, UserRole};

use super::TestApp;

pub const TEST_ADMIN_EMAIL: &str = "admin@utkrisht.test";
pub const TEST_ADMIN_PASSWORD: &str = "correct-horse-battery";

/// Cheapest bcrypt cost; production uses the configured cost.
const TEST_HASH_COST: u32 = 4;

pub struct TestAdmin {
    pub user: User,
    pub token: String,
}

/// Seed an ADMIN user and mint a token for it directly.
pub fn seed_admin(app: &TestApp) -> TestAdmin {
    seed_user_with_role(app, TEST_ADMIN_EMAIL, TEST_ADMIN_PASSWORD, UserRole::Admin)
}

pub fn seed_user_with_role(app: &TestApp, email: &str, password: &str, role: UserRole) -> TestAdmin {
    let hashed = bcrypt::hash(password, TEST_HASH_COST).expect("hash");
    let user = app.db.seed_user(email, &hashed, role);
    let token = app.state.jwt.issue(&user).expect("token");
    TestAdmin { user, token }
}
