use storefront_orders_api::{
    config::database_url_from_env,
    db::{DbPool, create_pool, run_migrations},
    models::Role,
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let pool = create_pool(&database_url_from_env()?).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let admin_id = ensure_account(&pool, "admin@example.com", "admin123", Role::Admin).await?;
    let user_id = ensure_account(&pool, "user@example.com", "user123", Role::User).await?;
    seed_catalog(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_account(
    pool: &DbPool,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT ((lower(email))) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured account {email} (role={role})");
    Ok(id)
}

async fn ensure_category(pool: &DbPool, name: &str, slug: &str) -> anyhow::Result<Uuid> {
    sqlx::query("INSERT INTO categories (id, name, slug) VALUES ($1, $2, $3) ON CONFLICT (slug) DO NOTHING")
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(slug)
        .execute(pool)
        .await?;

    let (id,): (Uuid,) = sqlx::query_as("SELECT id FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn seed_catalog(pool: &DbPool) -> anyhow::Result<()> {
    let puzzles = ensure_category(pool, "Puzzles", "puzzles").await?;
    let toys = ensure_category(pool, "Toys", "toys").await?;

    let products = vec![
        ("Wooden Logic Puzzle", "Classic brain teaser", 1999_i64, puzzles),
        ("Magnetic Tangram Set", "Travel-friendly tangrams", 1499, puzzles),
        ("Robot Toy Kit", "Build a small robot", 4999, toys),
    ];

    for (name, desc, price_cents, category_id) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, category_id, name, description, price_cents, is_active)
            SELECT $1, $2, $3, $4, $5, TRUE
            WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $3)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(category_id)
        .bind(name)
        .bind(desc)
        .bind(price_cents)
        .execute(pool)
        .await?;
    }

    println!("Seeded catalog");
    Ok(())
}
