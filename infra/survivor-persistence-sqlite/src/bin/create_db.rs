use survivor_persistence_sqlite::{
    DB_PATH_VAR, create_db_pool, create_schema,
    teams::{FEED_ALIASES, NFL_TEAMS, seed_aliases, seed_teams},
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let Ok(db_path) = std::env::var(DB_PATH_VAR) else {
        eprintln!("{} env var not set", DB_PATH_VAR);
        std::process::exit(1);
    };

    if let Err(e) = setup(&db_path).await {
        eprintln!("Failed to set up database {}: {}", db_path, e);
        std::process::exit(1);
    }
}

async fn setup(db_path: &str) -> sqlx::Result<()> {
    let pool = create_db_pool(db_path, true).await?;
    create_schema(&pool).await?;
    let teams = seed_teams(&pool, &NFL_TEAMS).await?;
    let aliases = seed_aliases(&pool, &FEED_ALIASES).await?;
    println!(
        "Created database tables successfully ({} teams, {} aliases added)",
        teams, aliases
    );
    Ok(())
}
