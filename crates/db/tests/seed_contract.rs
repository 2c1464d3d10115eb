//! Contract tests for the shipped fixtures: the order dataset must decode
//! into domain types and the seed articles must land in the database the
//! way the agent's tools expect to read them.

use maildesk_core::config::DatabaseConfig;
use maildesk_core::domain::order::Order;
use maildesk_core::ports::VectorIndex;
use maildesk_db::fixtures::{seed_articles, SAMPLE_ORDERS_JSON};
use maildesk_db::migrations::run_pending;
use maildesk_db::repositories::{InMemoryVectorIndex, SqlKnowledgeBaseRepository};
use maildesk_db::{connect, DbPool, StaticOrderBook};

async fn memory_pool() -> DbPool {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        timeout_secs: 30,
    };
    connect(&config).await.expect("connect")
}

#[test]
fn sample_orders_decode_into_domain_orders() {
    let orders: Vec<Order> =
        serde_json::from_str(SAMPLE_ORDERS_JSON).expect("fixture should decode");

    assert!(orders.len() >= 3);

    let mut numbers: Vec<&str> = orders.iter().map(|order| order.order_number.as_str()).collect();
    numbers.sort_unstable();
    numbers.dedup();
    assert_eq!(numbers.len(), orders.len(), "order numbers must be unique");

    let shipped = orders.iter().filter(|order| order.fulfillment.is_some()).count();
    let unshipped = orders.len() - shipped;
    assert!(shipped > 0, "fixture needs at least one shipped order");
    assert!(unshipped > 0, "fixture needs at least one unshipped order");
}

#[tokio::test]
async fn order_book_len_matches_fixture() {
    let orders: Vec<Order> = serde_json::from_str(SAMPLE_ORDERS_JSON).expect("decode");
    let book = StaticOrderBook::sample();
    assert_eq!(book.len(), orders.len());
}

#[tokio::test]
async fn seeded_articles_are_queryable_by_category() {
    let pool = memory_pool().await;
    run_pending(&pool).await.expect("run migrations");
    let repo = SqlKnowledgeBaseRepository::new(pool);

    // Seeding with placeholder embeddings; the contract under test is the
    // storage shape, not retrieval quality.
    let articles = seed_articles();
    let expected = articles.len() as i64;
    for (i, article) in articles.into_iter().enumerate() {
        let mut embedding = vec![0.0f32; 8];
        embedding[i % 8] = 1.0;
        repo.insert(&article.into_entry(embedding)).await.expect("insert");
    }

    assert_eq!(repo.count().await.expect("count"), expected);

    let policies = repo.list_by_category("policy").await.expect("list");
    assert!(!policies.is_empty());
    assert!(policies.iter().all(|entry| entry.category == "policy"));

    let query = vec![1.0f32, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    let hits = repo.query(&query, None, 3).await.expect("query");
    assert_eq!(hits.len(), 3);
    assert!(hits[0].distance <= hits[1].distance);
}

#[tokio::test]
async fn in_memory_index_ranks_like_the_sql_index() {
    let pool = memory_pool().await;
    run_pending(&pool).await.expect("run migrations");
    let repo = SqlKnowledgeBaseRepository::new(pool);
    let memory = InMemoryVectorIndex::default();

    for (i, article) in seed_articles().into_iter().enumerate() {
        let mut embedding = vec![0.0f32; 8];
        embedding[i % 8] = 1.0;
        embedding[(i + 3) % 8] = 0.4;
        let entry = article.into_entry(embedding);
        repo.insert(&entry).await.expect("insert");
        memory.insert(entry).await;
    }

    let query = vec![0.9f32, 0.1, 0.0, 0.2, 0.0, 0.0, 0.0, 0.0];
    let from_sql = repo.query(&query, Some("policy"), 3).await.expect("sql query");
    let from_memory = memory.query(&query, Some("policy"), 3).await.expect("memory query");

    let sql_ids: Vec<&str> = from_sql.iter().map(|hit| hit.id.as_str()).collect();
    let memory_ids: Vec<&str> = from_memory.iter().map(|hit| hit.id.as_str()).collect();
    assert_eq!(sql_ids, memory_ids);
}

#[tokio::test]
async fn seeding_twice_is_detectable_through_exists() {
    let pool = memory_pool().await;
    run_pending(&pool).await.expect("run migrations");
    let repo = SqlKnowledgeBaseRepository::new(pool);

    let article = seed_articles().into_iter().next().expect("at least one article");
    let title = article.title;
    let category = article.category;

    assert!(!repo.exists(title, category).await.expect("exists before"));
    repo.insert(&article.into_entry(vec![1.0, 0.0])).await.expect("insert");
    assert!(repo.exists(title, category).await.expect("exists after"));
}
