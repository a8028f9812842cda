//! Full session lifecycle against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives login, listing,
//! import and logout over real HTTP with `UreqSender`. The session still
//! resolves the real market host; a thin sender rewrites that host to the
//! mock server's address before handing the request to ureq.

use std::net::SocketAddr;
use std::sync::Arc;

use pobo_client::{
    AuthenticationError, Credentials, Error, HttpRequest, HttpResponse, HttpSend, ImportImage,
    ImportProduct, Locale, PoboClient, Session, TransportError, UreqSender,
};

fn start_mock_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

/// Sends every request to the mock server instead of the market host.
fn redirected(locale: Locale, addr: SocketAddr) -> Arc<dyn HttpSend> {
    let inner = UreqSender::new();
    let host = locale.base_url();
    let local = format!("http://{addr}");
    Arc::new(move |req: &HttpRequest| -> Result<HttpResponse, TransportError> {
        let mut req = req.clone();
        req.url = req.url.replacen(host, &local, 1);
        inner.send(&req)
    })
}

fn demo_credentials() -> Credentials {
    Credentials::new(mock_server::USERNAME, mock_server::PASSWORD)
}

#[test]
fn session_lifecycle() {
    let addr = start_mock_server();
    let sender = redirected(Locale::Cz, addr);

    // Step 1: wrong password is reported with the server's message.
    let err = Session::new(Credentials::new(mock_server::USERNAME, "wrong"), "CZ", sender.clone())
        .unwrap_err();
    assert_eq!(err.to_string(), "Login failed: Invalid credentials");

    // Step 2: log in.
    let session = Session::new(demo_credentials(), "CZ", sender.clone()).unwrap();
    assert!(session.is_authenticated());
    assert_eq!(session.base_url(), "https://www.pobo.cz");
    let mut pobo = PoboClient::new(session);

    // Step 3: categories.
    let categories = pobo.categories().unwrap().list().unwrap();
    assert_eq!(categories.len(), 3);
    assert_eq!(categories[0].name(), Some("Boty"));
    assert_eq!(categories[0].name_in("hu"), Some("Cipők"));
    assert_eq!(categories[1].name_in("hu"), None);
    assert!(categories[2].translations().is_empty());
    assert!(categories[2].is_deleted());

    // Step 4: first page of every product.
    let products = pobo.products().unwrap().list(1, &[]).unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].guid(), "302b8ad6-07d5-11ec-b98c-0cc47a6c9370");
    assert!(products[0].is_favourite());
    assert!(!products[1].is_favourite(), "missing is_favourite defaults to false");
    assert_eq!(products[1].created_at().to_rfc3339(), "2024-01-05T08:00:00+01:00");

    // Step 5: category filter and paging.
    let shoes = pobo.products().unwrap().list(1, &[1]).unwrap();
    let ids: Vec<i64> = shoes.iter().map(|p| p.id()).collect();
    assert_eq!(ids, vec![101, 103]);
    assert!(pobo.products().unwrap().list(2, &[1]).unwrap().is_empty());

    // Step 6: bulk import.
    let items = vec![
        ImportProduct {
            guid: "8c1d6a40-07d5-11ec-b98c-0cc47a6c9370".to_string(),
            name: "Batoh".to_string(),
            short_description: Some("30 l".to_string()),
            is_visible: true,
            categories: vec![2],
            images: vec![ImportImage {
                src: "https://cdn.pobo.cz/p/batoh.jpg".to_string(),
                main_image: Some(true),
            }],
        },
        ImportProduct {
            guid: "302b8ad6-07d5-11ec-b98c-0cc47a6c9370".to_string(),
            name: "Duplicate".to_string(),
            short_description: None,
            is_visible: true,
            categories: Vec::new(),
            images: Vec::new(),
        },
    ];
    let summary = pobo.products().unwrap().bulk_import(&items).unwrap();
    assert_eq!(summary["success"], 1);
    assert_eq!(summary["skipped"], 1);
    assert_eq!(summary["errors"], serde_json::json!([]));

    let hats = pobo.products().unwrap().list(1, &[2]).unwrap();
    let imported = hats.iter().find(|p| p.name() == "Batoh").unwrap();
    assert_eq!(imported.short_description(), Some("30 l"));
    assert_eq!(imported.image_preview(), Some("https://cdn.pobo.cz/p/batoh.jpg"));

    // Step 7: logout, after which nothing can be sent.
    pobo.logout().unwrap();
    let err = pobo.categories().unwrap_err();
    assert!(matches!(
        err,
        Error::Authentication(AuthenticationError::MissingToken)
    ));
    assert_eq!(pobo.logout().unwrap_err().to_string(), "You are not logged in.");
}

#[test]
fn stale_token_is_reported_by_the_server() {
    let addr = start_mock_server();
    let sender = redirected(Locale::Hu, addr);

    let session = Session::new(demo_credentials(), "HU", sender).unwrap();
    let transport = session.transport().unwrap();
    let mut session = session;
    session.logout().unwrap();

    // A transport captured before logout still carries the old token.
    let err = pobo_client::CategoryClient::new(transport).list().unwrap_err();
    assert!(matches!(err, Error::Api(_)));
    assert_eq!(err.to_string(), "Unauthorized");
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = Session::new(demo_credentials(), "SPACE", redirected(Locale::Space, addr)).unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}
