//! HTTP client tests against an in-process fake collaborator.

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::post};
use checkout::{
    CancelSignal, CartService, CatalogService, Collaborator, EmailService, ErrorKind,
    OrderOrchestrator, PaymentService, ServiceError, ShippingService,
};
use clients::{
    HttpCartClient, HttpCatalogClient, HttpEmailClient, HttpPaymentClient, HttpShippingClient,
};
use common::{ProductId, UserId};
use domain::{Address, CartItem, CreditCardInfo, Money, PlaceOrderRequest};
use serde_json::{Value, json};
use tokio::net::TcpListener;

async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr.to_string()
}

/// An address nothing is listening on.
async fn closed_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

fn card() -> CreditCardInfo {
    CreditCardInfo {
        credit_card_number: "4432801561520454".to_string(),
        credit_card_cvv: 672,
        credit_card_expiration_year: 2030,
        credit_card_expiration_month: 1,
    }
}

async fn get_cart(Json(body): Json<Value>) -> Json<Value> {
    if body["user_id"] == "alice" {
        Json(json!({
            "user_id": "alice",
            "items": [
                { "product_id": "OLJCESPC7Z", "quantity": 1 },
                { "product_id": "66VCHSJNUP", "quantity": 2 }
            ]
        }))
    } else {
        Json(json!({ "user_id": body["user_id"] }))
    }
}

async fn get_product(Json(body): Json<Value>) -> impl IntoResponse {
    match body["id"].as_str() {
        Some("OLJCESPC7Z") => Json(json!({
            "id": "OLJCESPC7Z",
            "name": "Sunglasses",
            "priceUsd": { "currencyCode": "USD", "units": 19, "nanos": 990000000 }
        }))
        .into_response(),
        Some("66VCHSJNUP") => Json(json!({
            "id": "66VCHSJNUP",
            "name": "Tank Top",
            "price": { "currency_code": "USD", "units": 18, "nanos": 990000000 }
        }))
        .into_response(),
        _ => (StatusCode::NOT_FOUND, "no such product").into_response(),
    }
}

async fn get_quote() -> Json<Value> {
    Json(json!({ "cost": { "currency_code": "USD", "units": 8, "nanos": 990000000 } }))
}

async fn ship_order() -> Json<Value> {
    Json(json!({ "tracking_id": "TRK-42" }))
}

async fn charge(Json(body): Json<Value>) -> impl IntoResponse {
    if body["credit_card"]["credit_card_number"] == "4000000000000002" {
        (StatusCode::PAYMENT_REQUIRED, "card declined").into_response()
    } else {
        Json(json!({ "transaction_id": "TXN-7" })).into_response()
    }
}

async fn ok() -> StatusCode {
    StatusCode::OK
}

fn collaborator() -> Router {
    Router::new()
        .route("/get-cart", post(get_cart))
        .route("/empty-cart", post(ok))
        .route("/get-product", post(get_product))
        .route("/get-quote", post(get_quote))
        .route("/ship-order", post(ship_order))
        .route("/charge", post(charge))
        .route("/send-order-confirmation", post(ok))
}

#[tokio::test]
async fn test_get_cart_decodes_items() {
    let addr = spawn(collaborator()).await;
    let client = HttpCartClient::new(&addr);

    let items = client.get_cart(&UserId::new("alice")).await.unwrap();

    assert_eq!(
        items,
        vec![CartItem::new("OLJCESPC7Z", 1), CartItem::new("66VCHSJNUP", 2)]
    );
    client.empty_cart(&UserId::new("alice")).await.unwrap();
}

#[tokio::test]
async fn test_missing_items_field_is_empty_cart() {
    let addr = spawn(collaborator()).await;
    let client = HttpCartClient::new(&addr);

    assert!(client.get_cart(&UserId::new("bob")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_product_accepts_price_usd_alias() {
    let addr = spawn(collaborator()).await;
    let client = HttpCatalogClient::new(&addr);

    let product = client
        .get_product(&ProductId::new("OLJCESPC7Z"))
        .await
        .unwrap();

    assert_eq!(product.name, "Sunglasses");
    assert_eq!(product.price, Money::new("USD", 19, 990_000_000));
}

#[tokio::test]
async fn test_unknown_product_is_not_found() {
    let addr = spawn(collaborator()).await;
    let client = HttpCatalogClient::new(&addr);

    let err = client
        .get_product(&ProductId::new("NOPE"))
        .await
        .unwrap_err();

    assert_eq!(err, ServiceError::not_found(Collaborator::Catalog, "NOPE"));
}

#[tokio::test]
async fn test_quote_and_shipment() {
    let addr = spawn(collaborator()).await;
    let client = HttpShippingClient::new(&addr);
    let items = [CartItem::new("OLJCESPC7Z", 1)];

    let quote = client.get_quote(&Address::default(), &items).await.unwrap();
    let tracking = client.ship_order(&Address::default(), &items).await.unwrap();

    assert_eq!(quote, Money::new("USD", 8, 990_000_000));
    assert_eq!(tracking, "TRK-42");
}

#[tokio::test]
async fn test_payment_required_is_declined() {
    let addr = spawn(collaborator()).await;
    let client = HttpPaymentClient::new(&addr);
    let mut declined = card();
    declined.credit_card_number = "4000000000000002".to_string();

    let err = client
        .charge(&Money::new("USD", 10, 0), &declined)
        .await
        .unwrap_err();

    assert_eq!(err, ServiceError::declined("card declined"));
    assert_eq!(err.kind(), ErrorKind::UpstreamError);
}

#[tokio::test]
async fn test_charge_returns_transaction_id() {
    let addr = spawn(collaborator()).await;
    let client = HttpPaymentClient::new(&addr);

    let txn = client
        .charge(&Money::new("USD", 10, 0), &card())
        .await
        .unwrap();

    assert_eq!(txn, "TXN-7");
}

#[tokio::test]
async fn test_gateway_error_is_unavailable() {
    let router = Router::new().route(
        "/send-order-confirmation",
        post(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let addr = spawn(router).await;
    let client = HttpEmailClient::new(&addr);
    let order = domain::OrderResult {
        order_id: common::OrderId::new(),
        shipping_tracking_id: "TRK-1".to_string(),
        shipping_cost: Money::new("USD", 1, 0),
        shipping_address: Address::default(),
        items: Vec::new(),
    };

    let err = client
        .send_order_confirmation("a@example.com", &order)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
    assert_eq!(err.service(), Collaborator::Email);
}

#[tokio::test]
async fn test_server_error_is_upstream() {
    let router = Router::new().route(
        "/get-quote",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "quote engine down") }),
    );
    let addr = spawn(router).await;
    let client = HttpShippingClient::new(&addr);

    let err = client.get_quote(&Address::default(), &[]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamError);
    assert!(err.to_string().contains("quote engine down"));
}

#[tokio::test]
async fn test_malformed_body_is_upstream() {
    let router = Router::new().route(
        "/ship-order",
        post(|| async { Json(json!({ "unexpected": true })) }),
    );
    let addr = spawn(router).await;
    let client = HttpShippingClient::new(&addr);

    let err = client.ship_order(&Address::default(), &[]).await.unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Upstream {
            service: Collaborator::Shipping,
            ..
        }
    ));
}

#[tokio::test]
async fn test_connection_refused_is_unavailable() {
    let client = HttpCartClient::new(&closed_addr().await);

    let err = client.get_cart(&UserId::new("alice")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
}

#[tokio::test]
async fn test_orchestrator_over_http() {
    let addr = spawn(collaborator()).await;
    let http = reqwest::Client::new();
    let orchestrator = OrderOrchestrator::new(
        HttpCartClient::with_client(http.clone(), &addr),
        HttpCatalogClient::with_client(http.clone(), &addr),
        HttpShippingClient::with_client(http.clone(), &addr),
        HttpPaymentClient::with_client(http.clone(), &addr),
        HttpEmailClient::with_client(http, &addr),
    );
    let request = PlaceOrderRequest {
        user_id: UserId::new("alice"),
        user_currency: "USD".to_string(),
        address: Address::default(),
        email: "alice@example.com".to_string(),
        credit_card: card(),
    };

    let order = orchestrator
        .place_order(request, &CancelSignal::never())
        .await
        .unwrap()
        .order;

    assert_eq!(order.shipping_tracking_id, "TRK-42");
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[1].cost, Money::new("USD", 18, 990_000_000));
    assert_eq!(order.shipping_cost, Money::new("USD", 8, 990_000_000));
}
