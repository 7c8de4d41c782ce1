use storefront_inventory::infra::config::{Config, StorageBackend};
use storefront_inventory::storage::postgres;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--skip-schema]\n\
         \n\
         Requires env vars:\n\
           DATABASE_URL\n\
         Optional:\n\
           DB_MAX_CONNECTIONS, ITEM_TIMEOUT_MS, INVENTORY_TIMEOUT_MS, CASCADE_ITEM_DELETE\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let skip_schema = args.iter().any(|a| a == "--skip-schema");

    // Force-read config (nice error messages if missing)
    let config = Config::from_env()?;
    if config.storage_backend != StorageBackend::Postgres {
        return Err(anyhow::anyhow!("preflight only checks the postgres backend"));
    }
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;

    println!("> Preflight:");
    println!("  ITEM_TIMEOUT={:?}", config.item_timeout);
    println!("  INVENTORY_TIMEOUT={:?}", config.inventory_timeout);
    println!("  CASCADE_ITEM_DELETE={}", config.cascade_item_delete);

    let pool = postgres::connect(database_url, 1).await?;
    let version: String = sqlx::query_scalar("SHOW server_version")
        .fetch_one(&pool)
        .await?;
    println!("  Postgres version: {}", version);

    if skip_schema {
        println!("  Skipping schema creation.");
    } else {
        postgres::ensure_schema(&pool).await?;
        println!("  Tables item and inventory are present.");
    }

    for table in ["item", "inventory"] {
        match sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&pool)
            .await
        {
            Ok(rows) => println!("  {}: {} rows", table, rows),
            Err(e) => println!("  {}: unavailable ({})", table, e),
        }
    }

    println!("> Preflight OK.");
    Ok(())
}
