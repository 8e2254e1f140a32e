//! Operator tasks shared by the `utkrisht` binary: admin account seeding and
//! tracing setup.

use serde::Serialize;
use utkrisht_core::models::UserRole;
use utkrisht_db::UserRepositoryTrait;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_ADMIN_PASSWORD: &str = "ChangeMe123!";
pub const DEFAULT_SUPERADMIN_EMAIL: &str = "superadmin@example.com";
pub const DEFAULT_SUPERADMIN_PASSWORD: &str = "SuperChangeMe123!";

/// An account to create or refresh.
#[derive(Debug, Clone)]
pub struct SeedAccount {
    pub email: String,
    pub name: &'static str,
    pub password: String,
    pub role: UserRole,
    pub default_password: bool,
}

/// What `seed` did for one account; never carries the password.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub email: String,
    pub role: UserRole,
    pub used_default_password: bool,
}

fn account<F>(
    var: &F,
    email_var: &str,
    password_var: &str,
    defaults: (&str, &str),
    name: &'static str,
    role: UserRole,
) -> SeedAccount
where
    F: Fn(&str) -> Option<String>,
{
    let email = var(email_var)
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| defaults.0.to_string());
    let password = var(password_var).filter(|p| !p.is_empty());
    SeedAccount {
        email,
        name,
        default_password: password.is_none(),
        password: password.unwrap_or_else(|| defaults.1.to_string()),
        role,
    }
}

/// The ADMIN and SUPERADMIN accounts, from `ADMIN_*` / `SUPERADMIN_*` variables.
pub fn seed_accounts<F>(var: F) -> [SeedAccount; 2]
where
    F: Fn(&str) -> Option<String>,
{
    [
        account(
            &var,
            "ADMIN_EMAIL",
            "ADMIN_PASSWORD",
            (DEFAULT_ADMIN_EMAIL, DEFAULT_ADMIN_PASSWORD),
            "Admin",
            UserRole::Admin,
        ),
        account(
            &var,
            "SUPERADMIN_EMAIL",
            "SUPERADMIN_PASSWORD",
            (DEFAULT_SUPERADMIN_EMAIL, DEFAULT_SUPERADMIN_PASSWORD),
            "Super Admin",
            UserRole::Superadmin,
        ),
    ]
}

/// Upsert every account with a freshly hashed password.
pub async fn seed(
    users: &dyn UserRepositoryTrait,
    accounts: &[SeedAccount],
    hash_cost: u32,
) -> anyhow::Result<Vec<SeedReport>> {
    let mut reports = Vec::with_capacity(accounts.len());
    for account in accounts {
        let hashed = bcrypt::hash(&account.password, hash_cost)?;
        let user = users
            .upsert(&account.email, Some(account.name), &hashed, account.role)
            .await?;
        if account.default_password {
            tracing::warn!(email = %user.email, "Seeded with the default password; change it after first login");
        }
        reports.push(SeedReport {
            email: user.email,
            role: account.role,
            used_default_password: account.default_password,
        });
    }
    Ok(reports)
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use utkrisht_db::InMemoryRepositories;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn defaults_apply_when_unset() {
        let [admin, superadmin] = seed_accounts(lookup(&[]));
        assert_eq!(admin.email, DEFAULT_ADMIN_EMAIL);
        assert_eq!(admin.role, UserRole::Admin);
        assert!(admin.default_password);
        assert_eq!(superadmin.email, DEFAULT_SUPERADMIN_EMAIL);
        assert_eq!(superadmin.password, DEFAULT_SUPERADMIN_PASSWORD);
    }

    #[test]
    fn environment_overrides_defaults() {
        let vars = [
            ("ADMIN_EMAIL", " studio@utkrisht.in "),
            ("ADMIN_PASSWORD", "a-real-password"),
            ("SUPERADMIN_PASSWORD", ""),
        ];
        let [admin, superadmin] = seed_accounts(lookup(&vars));
        assert_eq!(admin.email, "studio@utkrisht.in");
        assert!(!admin.default_password);
        assert!(superadmin.default_password);
    }

    #[tokio::test]
    async fn seed_is_idempotent_and_hides_passwords() {
        let db = InMemoryRepositories::new();
        let repos = db.repositories();
        let accounts = seed_accounts(lookup(&[("ADMIN_PASSWORD", "first-password")]));

        seed(repos.users.as_ref(), &accounts, 4).await.unwrap();
        let accounts = seed_accounts(lookup(&[("ADMIN_PASSWORD", "second-password")]));
        let reports = seed(repos.users.as_ref(), &accounts, 4).await.unwrap();

        let users = db.user_rows();
        assert_eq!(users.len(), 2);
        let admin = users.iter().find(|u| u.email == DEFAULT_ADMIN_EMAIL).unwrap();
        assert!(bcrypt::verify("second-password", &admin.hashed_password).unwrap());

        let json = serde_json::to_string(&reports).unwrap();
        assert!(!json.contains("second-password"));
        assert!(json.contains("\"usedDefaultPassword\":true"));
    }
}
