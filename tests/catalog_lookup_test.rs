use bookscan::infrastructure::{BookTable, CsvFileStorage};
use bookscan::modules::integrations::{GoogleBooksClient, OpenLibraryClient};
use bookscan::services::{CatalogService, LookupQuery, LookupResolver, ScanOutcome};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Helper to build a service against mock catalogs and a CSV file
fn setup_service(google: &MockServer, openlibrary: &MockServer, csv: &Path) -> CatalogService<CsvFileStorage> {
    let timeout = Duration::from_secs(2);
    let resolver = LookupResolver::new(vec![
        Box::new(GoogleBooksClient::new(google.uri(), None, timeout).unwrap()),
        Box::new(OpenLibraryClient::new(openlibrary.uri(), timeout).unwrap()),
    ]);
    let table = BookTable::open(CsvFileStorage::new(csv)).unwrap();
    CatalogService::new(table, resolver)
}

fn read_rows(csv: &Path) -> Vec<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(csv)
        .unwrap();
    rdr.records()
        .map(|r| r.unwrap().iter().map(|s| s.to_string()).collect())
        .collect()
}

async fn mock_google_isbn(server: &MockServer, isbn: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .and(query_param("q", format!("isbn:{}", isbn)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mock_openlibrary_isbn(server: &MockServer, isbn: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .and(query_param("bibkeys", format!("ISBN:{}", isbn)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_new_isbn_creates_one_row_from_google_fields() {
    let google = MockServer::start().await;
    let openlibrary = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("books.csv");

    mock_google_isbn(
        &google,
        "9780593312070",
        serde_json::json!({
            "items": [{
                "volumeInfo": {
                    "title": "The Frozen River",
                    "subtitle": "A Novel",
                    "authors": ["Ariel Lawhon"],
                    "publishedDate": "2023-11-07",
                    "infoLink": "http://books.google.com/books?id=frozen",
                    "industryIdentifiers": [
                        {"type": "ISBN_13", "identifier": "9780593312070"},
                        {"type": "ISBN_10", "identifier": "0593312074"}
                    ]
                }
            }]
        }),
    )
    .await;
    mock_openlibrary_isbn(
        &openlibrary,
        "9780593312070",
        serde_json::json!({
            "ISBN:9780593312070": {
                "title": "Frozen River",
                "authors": [{"name": "Lawhon, Ariel"}],
                "publish_date": "2023",
                "url": "https://openlibrary.org/books/OL1M/Frozen_River",
                "identifiers": {"isbn_13": ["9780593312070"]},
                "subjects": [{"name": "Historical fiction"}]
            }
        }),
    )
    .await;

    let mut service = setup_service(&google, &openlibrary, &csv);
    let outcome = service.scan("9780593312070").await.unwrap();

    let ScanOutcome::Added(book) = &outcome else {
        panic!("expected Added, got {:?}", outcome);
    };
    assert_eq!(book.title, "The Frozen River");
    assert_eq!(book.author, "Ariel Lawhon");
    assert_eq!(book.publish_date, "2023-11-07");
    assert_eq!(book.tags, vec!["Historical fiction".to_string()]);

    let rows = read_rows(&csv);
    assert_eq!(rows.len(), 2, "header plus one row");
    assert_eq!(
        rows[0],
        vec![
            "ISBN-13",
            "ISBN-10",
            "Title",
            "Subtitle",
            "Author",
            "Publish Date",
            "URL",
            "Scanned Input"
        ]
    );
    assert_eq!(
        rows[1],
        vec![
            "9780593312070",
            "0593312074",
            "The Frozen River",
            "A Novel",
            "Ariel Lawhon",
            "2023-11-07",
            "https://books.google.com/books?id=frozen",
            "9780593312070"
        ]
    );
}

#[tokio::test]
async fn test_google_base_with_openlibrary_tags() {
    let google = MockServer::start().await;
    let openlibrary = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mock_google_isbn(
        &google,
        "9781250400222",
        serde_json::json!({
            "items": [{
                "volumeInfo": {
                    "title": "Swordheart",
                    "authors": ["T. Kingfisher"],
                    "industryIdentifiers": [
                        {"type": "ISBN_13", "identifier": "9781250400222"}
                    ]
                }
            }]
        }),
    )
    .await;
    mock_openlibrary_isbn(
        &openlibrary,
        "9781250400222",
        serde_json::json!({
            "ISBN:9781250400222": {
                "title": "Swordheart (Reprint)",
                "subjects": [{"name": "fantasy"}]
            }
        }),
    )
    .await;

    let mut service = setup_service(&google, &openlibrary, &dir.path().join("books.csv"));
    let outcome = service.scan("9781250400222").await.unwrap();
    let book = outcome.record().expect("record");

    assert_eq!(book.title, "Swordheart");
    assert_eq!(book.author, "T. Kingfisher");
    assert_eq!(book.isbn13.as_deref(), Some("9781250400222"));
    assert_eq!(book.tags, vec!["fantasy".to_string()]);
}

#[tokio::test]
async fn test_google_failure_falls_back_to_openlibrary() {
    let google = MockServer::start().await;
    let openlibrary = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&google)
        .await;
    mock_openlibrary_isbn(
        &openlibrary,
        "9781250400222",
        serde_json::json!({
            "ISBN:9781250400222": {
                "title": "Swordheart",
                "authors": [{"name": "T. Kingfisher"}],
                "publish_date": "Jul 02, 2024"
            }
        }),
    )
    .await;

    let mut service = setup_service(&google, &openlibrary, &dir.path().join("books.csv"));
    let outcome = service.scan("9781250400222").await.unwrap();

    let ScanOutcome::Added(book) = &outcome else {
        panic!("expected Added, got {:?}", outcome);
    };
    assert_eq!(book.title, "Swordheart");
    assert_eq!(book.publish_date, "Jul 02, 2024");
    // scanned ISBN kept even though the catalog omitted it
    assert_eq!(book.isbn13.as_deref(), Some("9781250400222"));
}

#[tokio::test]
async fn test_nothing_found_leaves_table_untouched() {
    let google = MockServer::start().await;
    let openlibrary = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("books.csv");

    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"totalItems": 0})))
        .mount(&google)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&openlibrary)
        .await;

    let mut service = setup_service(&google, &openlibrary, &csv);
    let outcome = service.scan("9780593312070").await.unwrap();

    assert_eq!(outcome, ScanOutcome::NotFound);
    assert!(!outcome.is_success());
    assert!(!csv.exists());
}

#[tokio::test]
async fn test_existing_isbn_skips_catalogs() {
    let google = MockServer::start().await;
    let openlibrary = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("books.csv");
    std::fs::write(
        &csv,
        "ISBN-13,ISBN-10,Title,Subtitle,Author,Publish Date,URL,Scanned Input\n\
         9781250400222,1250400228,Swordheart,,T. Kingfisher,2018,,9781250400222\n",
    )
    .unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&google)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&openlibrary)
        .await;

    let mut service = setup_service(&google, &openlibrary, &csv);
    let outcome = service.scan("1-250-40022-8").await.unwrap();

    let ScanOutcome::AlreadyStored(book) = &outcome else {
        panic!("expected AlreadyStored, got {:?}", outcome);
    };
    assert_eq!(book.title, "Swordheart");
    assert_eq!(service.table().len(), 1);
}

#[tokio::test]
async fn test_title_author_search() {
    let google = MockServer::start().await;
    let openlibrary = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/volumes"))
        .and(query_param("q", "intitle:The Fifth Season inauthor:N. K. Jemisin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{
                "volumeInfo": {
                    "title": "The Fifth Season",
                    "authors": ["N. K. Jemisin"],
                    "publishedDate": "2015-08-04",
                    "industryIdentifiers": [
                        {"type": "ISBN_13", "identifier": "9780316229296"}
                    ]
                }
            }]
        })))
        .mount(&google)
        .await;
    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("title", "The Fifth Season"))
        .and(query_param("author", "N. K. Jemisin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "docs": [{
                "key": "/works/OL17802410W",
                "title": "The Fifth Season",
                "author_name": ["N. K. Jemisin"],
                "first_publish_year": 2015,
                "subject": ["Science fiction", "Fantasy fiction"]
            }]
        })))
        .mount(&openlibrary)
        .await;

    let mut service = setup_service(&google, &openlibrary, &dir.path().join("books.csv"));
    let outcome = service
        .lookup(
            LookupQuery::title_author("The Fifth Season", "N. K. Jemisin"),
            "The Fifth Season",
        )
        .await
        .unwrap();

    let ScanOutcome::Added(book) = &outcome else {
        panic!("expected Added, got {:?}", outcome);
    };
    assert_eq!(book.isbn13.as_deref(), Some("9780316229296"));
    assert_eq!(book.publish_date, "2015-08-04");
    assert_eq!(
        book.url.as_deref(),
        Some(format!("{}/works/OL17802410W", openlibrary.uri()).as_str())
    );
    assert_eq!(book.scanned_input, "The Fifth Season");
    assert_eq!(book.tags.len(), 2);
}

#[tokio::test]
async fn test_openlibrary_subjects_replace_google_categories() {
    let google = MockServer::start().await;
    let openlibrary = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mock_google_isbn(
        &google,
        "9781250400222",
        serde_json::json!({
            "items": [{
                "volumeInfo": {
                    "title": "Swordheart",
                    "authors": ["T. Kingfisher"],
                    "publishedDate": "2024-07-02",
                    "infoLink": "https://books.google.com/books?id=sword",
                    "industryIdentifiers": [
                        {"type": "ISBN_13", "identifier": "9781250400222"},
                        {"type": "ISBN_10", "identifier": "1250400228"}
                    ],
                    "categories": ["Fiction"]
                }
            }]
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .and(query_param("bibkeys", "ISBN:9781250400222"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ISBN:9781250400222": {
                "title": "Swordheart",
                "subjects": [{"name": "fantasy"}]
            }
        })))
        .expect(1)
        .mount(&openlibrary)
        .await;

    let mut service = setup_service(&google, &openlibrary, &dir.path().join("books.csv"));
    let outcome = service.scan("9781250400222").await.unwrap();
    let book = outcome.record().expect("record");

    assert_eq!(book.url.as_deref(), Some("https://books.google.com/books?id=sword"));
    assert_eq!(book.tags, vec!["fantasy".to_string()]);
}

#[tokio::test]
async fn test_google_categories_used_without_subjects() {
    let google = MockServer::start().await;
    let openlibrary = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    mock_google_isbn(
        &google,
        "9781250400222",
        serde_json::json!({
            "items": [{
                "volumeInfo": {
                    "title": "Swordheart",
                    "authors": ["T. Kingfisher"],
                    "industryIdentifiers": [
                        {"type": "ISBN_13", "identifier": "9781250400222"}
                    ],
                    "categories": ["Fiction"]
                }
            }]
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&openlibrary)
        .await;

    let mut service = setup_service(&google, &openlibrary, &dir.path().join("books.csv"));
    let outcome = service.scan("9781250400222").await.unwrap();
    let book = outcome.record().expect("record");

    assert_eq!(book.tags, vec!["Fiction".to_string()]);
}
