//! End-to-end: a real listener, a real SQLite store, raw HTTP over TCP.

use std::sync::Arc;

use chrono::NaiveDate;
use economy_api::Server;
use economy_api::cache::MemoryCache;
use economy_api::database::{NewListing, Season, SqliteStore};
use economy_api::economy::{self, EconomyService, EconomySettings};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

async fn seeded_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    let season = Season::new(1).unwrap();
    let listings = [(12, 1), (14, 2), (16, 2)]
        .into_iter()
        .map(|(price, d)| NewListing {
            season,
            item_name: "Iron Ore".to_owned(),
            price,
            quantity: 1,
            seller: None,
            data_date: day(d),
            ingestion_date: day(d + 1),
        })
        .collect();
    store.insert_listings(listings).await.unwrap();
    store
}

async fn roundtrip(addr: std::net::SocketAddr, target: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

fn body(response: &str) -> serde_json::Value {
    let (_, body) = response.split_once("\r\n\r\n").unwrap();
    serde_json::from_str(body).unwrap()
}

#[tokio::test]
async fn serves_economy_routes_over_tcp() {
    let settings = EconomySettings {
        current_season: Season::new(1).unwrap(),
        default_days: 7,
    };
    let service = EconomyService::new(seeded_store().await, MemoryCache::new(100, None), settings);
    let router = economy::router(Arc::new(service), "/api/economy/");

    let server = Server::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(server.serve(router, async {
        let _ = stopped.await;
    }));

    let res = roundtrip(addr, "/api/economy/listings-count").await;
    assert!(res.starts_with("HTTP/1.1 200 OK\r\n"), "{res}");
    assert!(res.contains("Connection: close\r\n"));
    assert_eq!(body(&res), serde_json::json!({ "total": 3 }));

    let res = roundtrip(addr, "/api/economy/items/Iron%20Ore?limit=1").await;
    let detail = body(&res);
    assert_eq!(detail["totalListings"], 3);
    assert_eq!(detail["history"].as_array().unwrap().len(), 1);
    assert_eq!(detail["history"][0]["date"], "2024-03-02");

    let res = roundtrip(addr, "/api/economy/listings/Iron%20Ore?ingestionDate=2024-03-03").await;
    assert_eq!(body(&res).as_array().unwrap().len(), 2);

    let res = roundtrip(addr, "/api/economy/listings/Iron%20Ore").await;
    assert!(res.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{res}");

    let res = roundtrip(addr, "/api/economy/items?days=1").await;
    let summary = body(&res);
    assert_eq!(summary["totalListings"], 3);
    assert_eq!(summary["items"][0]["listings"], 2);

    stop.send(()).unwrap();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn oversized_content_length_gets_413() {
    let server = Server::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(server.serve(economy_api::Router::new(), async {
        let _ = stopped.await;
    }));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /api/economy/items HTTP/1.1\r\nContent-Length: 18446744073709551615\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 413 Payload Too Large\r\n"), "{response}");
    assert!(response.contains("Connection: close\r\n"));

    stop.send(()).unwrap();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn malformed_request_gets_400_and_close() {
    let server = Server::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr();
    let (stop, stopped) = oneshot::channel::<()>();
    let task = tokio::spawn(server.serve(economy_api::Router::new(), async {
        let _ = stopped.await;
    }));

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(b"NOT A REQUEST\x00\r\n\r\n").await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{response}");

    stop.send(()).unwrap();
    task.await.unwrap().unwrap();
}
