use afurada::constants::DEV_TOKEN_TTL_HOURS;
use afurada::db::{DatabaseConfig, PgUserDirectory};
use afurada::handlers::issue_token;
use afurada::{Config, get_db_pool, utils};
use anyhow::Result;
use clap::{Arg, Command};
use tracing::info;

/// Creates (or reuses) a user and prints a bearer token for it, so the API
/// can be exercised locally without a login flow.
#[tokio::main]
async fn main() -> Result<()> {
    utils::init_logging();

    let matches = Command::new("dev-user")
        .about("Create a local user and print a bearer token for it")
        .arg(
            Arg::new("username")
                .long("username")
                .help("Username to create or reuse")
                .required(true),
        )
        .arg(
            Arg::new("ttl-hours")
                .long("ttl-hours")
                .help("Token lifetime in hours")
                .value_parser(clap::value_parser!(i64)),
        )
        .get_matches();

    let username = matches
        .get_one::<String>("username")
        .ok_or_else(|| anyhow::anyhow!("--username is required"))?;
    let ttl_hours = matches.get_one::<i64>("ttl-hours").copied().unwrap_or(DEV_TOKEN_TTL_HOURS);

    let config = Config::from_env()?;
    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    let user = PgUserDirectory::new(pool).get_or_create_user(username).await?;
    info!(user_id = user.id, username = %user.username, "dev user ready");

    let token = issue_token(user.id, &config.jwt_secret, chrono::Duration::hours(ttl_hours))?;
    println!("user id: {}", user.id);
    println!("token:   {}", token);

    Ok(())
}
