use caffy_beans::{app, BeanCatalog, MemoryStore};
use std::sync::Arc;

#[tokio::test]
async fn test_serve_stops_on_shutdown_signal() {
    let catalog = BeanCatalog::new(Arc::new(MemoryStore::new()));
    let address = "127.0.0.1:0".parse().unwrap();

    let result = app::serve(address, catalog, async {}).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_serve_reports_bind_failure() {
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = occupied.local_addr().unwrap();
    let catalog = BeanCatalog::new(Arc::new(MemoryStore::new()));

    let result = app::serve(address, catalog, async {}).await;
    assert!(matches!(result, Err(caffy_beans::CatalogError::Io(_))));
}
