use shared::RecordKind;

/// Table holding records of the given kind
pub fn table_for(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Card => "cards",
        RecordKind::Credential => "logins",
        RecordKind::Text => "text_data",
        RecordKind::Binary => "bin_data",
    }
}

/// Statements run in order on every connect. All are idempotent.
pub const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        login    TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS cards (
        user_id  INTEGER NOT NULL REFERENCES users(id),
        id       TEXT NOT NULL,
        fio      TEXT NOT NULL,
        number   TEXT NOT NULL,
        date     TEXT NOT NULL,
        cvv      TEXT NOT NULL,
        metainfo TEXT NOT NULL DEFAULT '',
        UNIQUE (user_id, id)
    )",
    "CREATE TABLE IF NOT EXISTS logins (
        user_id  INTEGER NOT NULL REFERENCES users(id),
        id       TEXT NOT NULL,
        login    TEXT NOT NULL,
        password TEXT NOT NULL,
        metainfo TEXT NOT NULL DEFAULT '',
        UNIQUE (user_id, id)
    )",
    "CREATE TABLE IF NOT EXISTS text_data (
        user_id  INTEGER NOT NULL REFERENCES users(id),
        id       TEXT NOT NULL,
        content  TEXT NOT NULL,
        metainfo TEXT NOT NULL DEFAULT '',
        UNIQUE (user_id, id)
    )",
    "CREATE TABLE IF NOT EXISTS bin_data (
        user_id  INTEGER NOT NULL REFERENCES users(id),
        id       TEXT NOT NULL,
        content  BLOB NOT NULL,
        metainfo TEXT NOT NULL DEFAULT '',
        UNIQUE (user_id, id)
    )",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_table() {
        for kind in RecordKind::ALL {
            let table = table_for(kind);
            assert!(
                MIGRATIONS
                    .iter()
                    .any(|stmt| stmt.contains(&format!("EXISTS {} (", table))),
                "no table for {}",
                kind
            );
        }
    }
}
