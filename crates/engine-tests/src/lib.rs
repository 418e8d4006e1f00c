#![allow(dead_code)]

use connectors::sql::postgres::{
    adapter::PgAdapter,
    config::{PgEndpoint, PgSslMode},
};

pub mod utils;

// Test database, matching the docker-compose service used in CI.
const TEST_PG_HOST: &str = "localhost";
const TEST_PG_PORT: u16 = 5432;
const TEST_PG_USER: &str = "user";
const TEST_PG_PASSWORD: &str = "password";
const TEST_PG_DB: &str = "testdb";

fn pg_endpoint() -> PgEndpoint {
    PgEndpoint {
        host: TEST_PG_HOST.to_string(),
        port: TEST_PG_PORT,
        user: TEST_PG_USER.to_string(),
        password: TEST_PG_PASSWORD.to_string(),
        dbname: TEST_PG_DB.to_string(),
        ssl_mode: PgSslMode::Disable,
    }
}

async fn pg_adapter() -> PgAdapter {
    PgAdapter::connect(&pg_endpoint())
        .await
        .expect("connect postgres")
}

/// Drop & recreate the public schema in Postgres so it's empty.
async fn reset_postgres_schema() {
    pg_adapter()
        .await
        .exec(
            r#"
        DROP SCHEMA public CASCADE;
        CREATE SCHEMA public;
    "#,
        )
        .await
        .expect("reset postgres schema");
}
