//! Seed script for development: populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` and `JWT_SECRET` environment variables (reads .env).
//! Prints a bearer token per seeded user so the API can be exercised locally.

use sqlx::PgPool;
use uuid::Uuid;

const ADMIN_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);
const REVIEWER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0002);
const INSTITUTION_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0003);

const TOKEN_TTL_SECS: i64 = 7 * 24 * 3600;

struct SeedUser {
    id: Uuid,
    email: &'static str,
    full_name: &'static str,
    role: &'static str,
}

const USERS: &[SeedUser] = &[
    SeedUser {
        id: ADMIN_ID,
        email: "admin@perftrack.local",
        full_name: "Platform Administrator",
        role: "admin",
    },
    SeedUser {
        id: REVIEWER_ID,
        email: "reviewer@perftrack.local",
        full_name: "Document Reviewer",
        role: "reviewer",
    },
    SeedUser {
        id: INSTITUTION_USER_ID,
        email: "registrar@iitm.perftrack.local",
        full_name: "Registrar, IIT Madras",
        role: "institution",
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL")?;
    let jwt_secret = std::env::var("JWT_SECRET")?;
    let audience = std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".to_string());

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    println!("=== perftrack seed script ===");

    seed_users(&pool).await?;
    seed_institutions(&pool).await?;
    seed_documents(&pool).await?;
    seed_scores(&pool).await?;

    println!("\n=== Seed complete! ===");
    for user in USERS {
        let token = perftrack::services::session::issue_token(
            user.id,
            Some(user.email),
            &jwt_secret,
            &audience,
            TOKEN_TTL_SECS,
        )?;
        println!("{} ({}): Bearer {token}", user.email, user.role);
    }

    Ok(())
}

async fn seed_users(pool: &PgPool) -> anyhow::Result<()> {
    for user in USERS {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM profiles WHERE id = $1)")
            .bind(user.id)
            .fetch_one(pool)
            .await?;
        if exists {
            println!("[skip] Profile {} already exists", user.email);
            continue;
        }

        let mut tx = pool.begin().await?;
        sqlx::query("INSERT INTO profiles (id, email, full_name) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(user.email)
            .bind(user.full_name)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2::app_role)")
            .bind(user.id)
            .bind(user.role)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        println!("[done] Created {} with role {}", user.email, user.role);
    }
    Ok(())
}

async fn seed_institutions(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM institutions")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Institutions already exist ({count})");
        return Ok(());
    }

    // (name, city, state, type, naac grade, nirf rank, established, owner)
    let institutions: &[(&str, &str, &str, &str, &str, i32, i32, Option<Uuid>)] = &[
        ("Indian Institute of Technology Madras", "Chennai", "Tamil Nadu", "technical_institution", "A++", 1, 1959, Some(INSTITUTION_USER_ID)),
        ("Indian Institute of Science", "Bengaluru", "Karnataka", "research_institute", "A++", 2, 1909, None),
        ("Jawaharlal Nehru University", "New Delhi", "Delhi", "university", "A++", 10, 1969, None),
        ("Presidency College", "Chennai", "Tamil Nadu", "autonomous_college", "A+", 56, 1840, None),
        ("St. Xavier's College", "Kolkata", "West Bengal", "affiliated_college", "A++", 8, 1860, None),
    ];

    for (name, city, state, kind, grade, nirf, established, owner) in institutions {
        sqlx::query(
            "INSERT INTO institutions
                (user_id, name, city, state, type, accreditation_status, naac_grade, nirf_rank, established_year)
             VALUES ($1, $2, $3, $4, $5::institution_type, 'accredited', $6, $7, $8)",
        )
        .bind(owner)
        .bind(name)
        .bind(city)
        .bind(state)
        .bind(kind)
        .bind(grade)
        .bind(nirf)
        .bind(established)
        .execute(pool)
        .await?;
    }
    println!("[done] Created {} institutions", institutions.len());
    Ok(())
}

async fn seed_documents(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Documents already exist ({count})");
        return Ok(());
    }

    let institution_id: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM institutions WHERE user_id = $1 LIMIT 1")
            .bind(INSTITUTION_USER_ID)
            .fetch_optional(pool)
            .await?;
    let Some(institution_id) = institution_id else {
        println!("[skip] No owned institution to attach documents to");
        return Ok(());
    };

    let documents: &[(&str, &str, &str)] = &[
        ("research_report", "research-output-2024.pdf", "pending"),
        ("placement_data", "placements-2024.xlsx", "pending"),
        ("accreditation", "naac-certificate.pdf", "approved"),
        ("scheme_report", "pmkvy-participation.pdf", "under_review"),
        ("ranking_data", "nirf-submission-2024.pdf", "pending"),
    ];

    for (kind, file_name, status) in documents {
        sqlx::query(
            "INSERT INTO documents
                (institution_id, uploaded_by, document_type, file_name, file_path, file_size, status)
             VALUES ($1, $2, $3::document_type, $4, $5, $6, $7::document_status)",
        )
        .bind(institution_id)
        .bind(INSTITUTION_USER_ID)
        .bind(kind)
        .bind(file_name)
        .bind(format!("{institution_id}/{file_name}"))
        .bind(256_000_i64)
        .bind(status)
        .execute(pool)
        .await?;
    }
    println!("[done] Created {} documents", documents.len());
    Ok(())
}

async fn seed_scores(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM performance_scores")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] Performance scores already exist ({count})");
        return Ok(());
    }

    let ids: Vec<(Uuid, Option<i32>)> =
        sqlx::query_as("SELECT id, nirf_rank FROM institutions ORDER BY nirf_rank NULLS LAST")
            .fetch_all(pool)
            .await?;

    let mut created = 0;
    for year in [2023, 2024] {
        for (position, (institution_id, _)) in ids.iter().enumerate() {
            let base = 90.0 - position as f64 * 6.5 + (year - 2023) as f64;
            sqlx::query(
                "INSERT INTO performance_scores
                    (institution_id, year, research_score, placement_score, infrastructure_score,
                     accreditation_score, scheme_participation_score, total_score, rank)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(institution_id)
            .bind(year)
            .bind(base + 2.0)
            .bind(base - 1.5)
            .bind(base)
            .bind(base + 1.0)
            .bind(base - 3.0)
            .bind(base)
            .bind(position as i32 + 1)
            .execute(pool)
            .await?;
            created += 1;
        }
    }
    println!("[done] Created {created} performance scores");
    Ok(())
}
