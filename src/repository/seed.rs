//! Demo catalog inserted into an empty database

use sqlx::{PgConnection, Pool, Postgres};

use crate::error::AppResult;

const PUBLISHERS: &[&str] = &["React Exact Publisher", "Grand 42 Ltd.", "Издательство МАНРОС"];

/// (first name, last name, middle name)
const AUTHORS: &[(&str, &str, Option<&str>)] = &[
    ("Владислав", "Ткаченко", Some("Юрьевич")),
    ("Уильям", "Шекспир", None),
    ("Бранимир", "Петрович", None),
    ("Бунтаро", "Футагава", None),
    ("Вилхелмиина", "Питкянен", None),
    ("Пилигримов", "Алексей", Some("Иоганнович")),
];

struct SeedBook {
    title: &'static str,
    year: i32,
    pages: i32,
    edition: i32,
    /// Indexes into `AUTHORS`
    authors: &'static [usize],
    /// Index into `PUBLISHERS`
    publisher: usize,
}

const BOOKS: &[SeedBook] = &[
    SeedBook {
        title: "Book 1",
        year: 1991,
        pages: 138,
        edition: 1,
        authors: &[0, 1],
        publisher: 0,
    },
    SeedBook {
        title: "Book 2",
        year: 1993,
        pages: 325,
        edition: 1,
        authors: &[2],
        publisher: 1,
    },
    SeedBook {
        title: "Book 2.2",
        year: 1994,
        pages: 327,
        edition: 2,
        authors: &[2],
        publisher: 1,
    },
    SeedBook {
        title: "Book 3",
        year: 1994,
        pages: 123,
        edition: 1,
        authors: &[3],
        publisher: 0,
    },
    SeedBook {
        title: "Book 1.2",
        year: 1995,
        pages: 193,
        edition: 2,
        authors: &[0, 1, 4],
        publisher: 0,
    },
    SeedBook {
        title: "Book 4",
        year: 1996,
        pages: 343,
        edition: 1,
        authors: &[3, 5],
        publisher: 2,
    },
];

/// Insert the demo catalog unless a book already exists. Returns whether rows were inserted.
pub async fn seed_demo_data(pool: &Pool<Postgres>) -> AppResult<bool> {
    let mut tx = pool.begin().await?;

    // Serialise concurrent starts so the catalog is inserted once
    sqlx::query("LOCK TABLE books IN SHARE ROW EXCLUSIVE MODE")
        .execute(&mut *tx)
        .await?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
        .fetch_one(&mut *tx)
        .await?;
    if count > 0 {
        return Ok(false);
    }

    insert_catalog(&mut tx).await?;
    tx.commit().await?;

    tracing::info!(
        publishers = PUBLISHERS.len(),
        authors = AUTHORS.len(),
        books = BOOKS.len(),
        "Demo catalog seeded"
    );
    Ok(true)
}

async fn insert_catalog(conn: &mut PgConnection) -> AppResult<()> {
    let mut publisher_ids = Vec::with_capacity(PUBLISHERS.len());
    for name in PUBLISHERS {
        let id: i64 =
            sqlx::query_scalar("INSERT INTO publishers (name) VALUES ($1) RETURNING id")
                .bind(*name)
                .fetch_one(&mut *conn)
                .await?;
        publisher_ids.push(id);
    }

    let mut author_ids = Vec::with_capacity(AUTHORS.len());
    for (first_name, last_name, middle_name) in AUTHORS {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO authors (first_name, last_name, middle_name)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(*first_name)
        .bind(*last_name)
        .bind(*middle_name)
        .fetch_one(&mut *conn)
        .await?;
        author_ids.push(id);
    }

    for book in BOOKS {
        let book_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, year, pages, edition, publisher_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(book.title)
        .bind(book.year)
        .bind(book.pages)
        .bind(book.edition)
        .bind(publisher_ids[book.publisher])
        .fetch_one(&mut *conn)
        .await?;

        let ids: Vec<i64> = book.authors.iter().map(|&i| author_ids[i]).collect();
        super::relations::link_authors(conn, book_id, &ids).await?;
    }

    Ok(())
}
