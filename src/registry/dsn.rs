//! DSN assembly for shard backends.

use crate::metadata::ShardConnection;

/// Build the backend DSN for one shard.
///
/// The result embeds the password and must never be logged.
pub fn build_dsn(connection: &ShardConnection) -> String {
    format!(
        "postgres://{}:{}@{}:{}/{}?sslmode=disable",
        connection.username,
        connection.password,
        connection.host,
        connection.port,
        connection.database_name,
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_dsn_shape() {
        let connection = ShardConnection {
            shard_id: Uuid::nil(),
            host: "db-1.internal".into(),
            port: 5433,
            database_name: "shard_0".into(),
            username: "app".into(),
            password: "pw".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(
            build_dsn(&connection),
            "postgres://app:pw@db-1.internal:5433/shard_0?sslmode=disable"
        );
    }
}
