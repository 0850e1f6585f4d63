use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Content store: running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id          TEXT PRIMARY KEY,
                email       TEXT NOT NULL UNIQUE COLLATE NOCASE,
                role        TEXT NOT NULL DEFAULT 'member',
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE posts (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                content     TEXT NOT NULL,
                author_id   TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at  TEXT,
                is_read     INTEGER NOT NULL DEFAULT 0,
                importance  TEXT
            );

            CREATE INDEX idx_posts_author ON posts(author_id);
            CREATE INDEX idx_posts_created ON posts(created_at);

            CREATE TABLE tags (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                color       TEXT NOT NULL DEFAULT '#6c757d',
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE post_tags (
                post_id     TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                tag_id      TEXT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (post_id, tag_id)
            );

            -- user_id carries no FK: a deleted account must orphan its
            -- likes on other people's posts, and SQLite treats NO ACTION
            -- as a hard restriction. Readers resolve the user via LEFT JOIN.
            CREATE TABLE likes (
                id          TEXT PRIMARY KEY,
                post_id     TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                user_id     TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(post_id, user_id)
            );

            CREATE INDEX idx_likes_post ON likes(post_id);

            -- author_id unconstrained for the same reason as likes.user_id.
            CREATE TABLE comments (
                id          TEXT PRIMARY KEY,
                post_id     TEXT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
                author_id   TEXT NOT NULL,
                content     TEXT NOT NULL,
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at  TEXT
            );

            CREATE INDEX idx_comments_post ON comments(post_id, created_at);

            -- Seed accounts: one per tier so a fresh instance has an Admin
            -- to provision with.
            INSERT OR IGNORE INTO users (id, email, role) VALUES
                ('00000000-0000-0000-0000-000000000001', 'admin@echos.dev', 'admin'),
                ('00000000-0000-0000-0000-000000000002', 'leader@echos.dev', 'leader'),
                ('00000000-0000-0000-0000-000000000003', 'member@echos.dev', 'member');

            -- Stock tag vocabulary.
            INSERT OR IGNORE INTO tags (id, name, color) VALUES
                ('00000000-0000-0000-0000-000000000101', 'Idea', '#0d6efd'),
                ('00000000-0000-0000-0000-000000000102', 'Bug Report', '#dc3545'),
                ('00000000-0000-0000-0000-000000000103', 'Improvement', '#198754'),
                ('00000000-0000-0000-0000-000000000104', 'Question', '#ffc107'),
                ('00000000-0000-0000-0000-000000000105', 'Other', '#6c757d');

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Content store migrations complete");
    Ok(())
}
