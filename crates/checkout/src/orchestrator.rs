//! Order placement orchestrator.

use std::future::Future;
use std::time::Instant;

use common::OrderId;
use domain::{Money, OrderResult, PlaceOrderRequest, PlaceOrderResponse};

use crate::cancel::{CancelSignal, Canceled};
use crate::error::{CheckoutError, Result, ServiceError};
use crate::pricer::ProductPricer;
use crate::progress::CheckoutProgress;
use crate::services::cart::CartService;
use crate::services::catalog::CatalogService;
use crate::services::email::EmailService;
use crate::services::payment::PaymentService;
use crate::services::shipping::ShippingService;
use crate::state::CheckoutState;

/// Outcome of a tracked checkout: the caller-facing result plus the states
/// the request went through.
#[derive(Debug)]
pub struct CheckoutRun {
    pub progress: CheckoutProgress,
    pub result: Result<PlaceOrderResponse>,
}

/// Places orders by driving the cart, catalog, shipping, payment and email
/// services in a fixed sequence.
///
/// Steps run strictly one after another. Failures up to and including
/// shipment abort the order; nothing already done is undone. Clearing the
/// cart and sending the confirmation are best-effort.
pub struct OrderOrchestrator<Ca, Cl, Sh, P, E>
where
    Ca: CartService,
    Cl: CatalogService,
    Sh: ShippingService,
    P: PaymentService,
    E: EmailService,
{
    cart: Ca,
    pricer: ProductPricer<Cl>,
    shipping: Sh,
    payment: P,
    email: E,
}

impl<Ca, Cl, Sh, P, E> OrderOrchestrator<Ca, Cl, Sh, P, E>
where
    Ca: CartService,
    Cl: CatalogService,
    Sh: ShippingService,
    P: PaymentService,
    E: EmailService,
{
    /// Creates a new orchestrator.
    pub fn new(cart: Ca, catalog: Cl, shipping: Sh, payment: P, email: E) -> Self {
        Self {
            cart,
            pricer: ProductPricer::new(catalog),
            shipping,
            payment,
            email,
        }
    }

    /// Places an order for the user's current cart.
    ///
    /// Returns the complete order or a single terminal error: `Canceled` if
    /// `cancel` fired before the shipment was booked, otherwise an internal
    /// error carrying the originating failure. Cancellation after shipment
    /// only cuts the best-effort steps short.
    pub async fn place_order(
        &self,
        request: PlaceOrderRequest,
        cancel: &CancelSignal,
    ) -> Result<PlaceOrderResponse> {
        self.place_order_tracked(request, cancel).await.result
    }

    /// Like [`OrderOrchestrator::place_order`], also returning the checkout's
    /// progress record.
    #[tracing::instrument(
        skip_all,
        fields(user_id = %request.user_id, order_id = tracing::field::Empty)
    )]
    pub async fn place_order_tracked(
        &self,
        request: PlaceOrderRequest,
        cancel: &CancelSignal,
    ) -> CheckoutRun {
        metrics::counter!("checkout_place_order_total").increment(1);
        let started = Instant::now();

        let order_id = OrderId::new();
        tracing::Span::current().record("order_id", tracing::field::display(order_id));
        tracing::info!("placing order");

        let mut progress = CheckoutProgress::new(order_id);
        let result = self.run(request, cancel, &mut progress).await;

        match &result {
            Ok(response) => {
                progress.advance(CheckoutState::Confirmed);
                tracing::info!(
                    items = response.order.items.len(),
                    tracking_id = %response.order.shipping_tracking_id,
                    "order placed"
                );
            }
            Err(e) => {
                progress.fail(e);
                metrics::counter!(
                    "checkout_place_order_failed",
                    "kind" => e.origin_kind().as_str()
                )
                .increment(1);
                tracing::error!(
                    step = %e.step(),
                    kind = %e.kind(),
                    origin = %e.origin_kind(),
                    error = %e,
                    "order placement failed"
                );
            }
        }

        metrics::histogram!("checkout_place_order_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        CheckoutRun { progress, result }
    }

    async fn run(
        &self,
        request: PlaceOrderRequest,
        cancel: &CancelSignal,
        progress: &mut CheckoutProgress,
    ) -> Result<PlaceOrderResponse> {
        let PlaceOrderRequest {
            user_id,
            user_currency,
            address,
            email,
            credit_card,
        } = request;

        // 1. Cart
        let cart_items = guarded(
            CheckoutState::CartFetched,
            cancel,
            self.cart.get_cart(&user_id),
        )
        .await?;
        progress.advance(CheckoutState::CartFetched);

        // 2. Line costs
        let items = guarded(
            CheckoutState::ItemsPriced,
            cancel,
            self.pricer.price_items(&cart_items),
        )
        .await?;
        let subtotal = Money::try_sum(Money::zero(user_currency), items.iter().map(|i| &i.cost))
            .map_err(|source| CheckoutError::Money {
                step: CheckoutState::ItemsPriced,
                source,
            })?;
        progress.advance(CheckoutState::ItemsPriced);

        // 3. Shipping quote
        let shipping_cost = guarded(
            CheckoutState::ShippingQuoted,
            cancel,
            self.shipping.get_quote(&address, &cart_items),
        )
        .await?;
        progress.advance(CheckoutState::ShippingQuoted);

        let total = subtotal
            .checked_add(&shipping_cost)
            .map_err(|source| CheckoutError::Money {
                step: CheckoutState::TotalComputed,
                source,
            })?;
        progress.advance(CheckoutState::TotalComputed);
        tracing::debug!(%subtotal, %shipping_cost, %total, "order total computed");

        // 4. Payment
        let transaction_id = guarded(
            CheckoutState::PaymentCharged,
            cancel,
            self.payment.charge(&total, &credit_card),
        )
        .await?;
        progress.record_transaction(&transaction_id);
        progress.advance(CheckoutState::PaymentCharged);
        tracing::info!(%transaction_id, amount = %total, "payment charged");

        // 5. Shipment
        let shipping_tracking_id = guarded(
            CheckoutState::Shipped,
            cancel,
            self.shipping.ship_order(&address, &cart_items),
        )
        .await?;
        progress.record_tracking(&shipping_tracking_id);
        progress.advance(CheckoutState::Shipped);

        // 6. Clearing the cart is best-effort once the order is paid and shipped.
        // From here on neither failures nor cancellation undo the order.
        best_effort(
            CheckoutState::CartEmptied,
            cancel,
            progress,
            self.cart.empty_cart(&user_id),
        )
        .await;
        progress.advance(CheckoutState::CartEmptied);

        let order = OrderResult {
            order_id: progress.order_id(),
            shipping_tracking_id,
            shipping_cost,
            shipping_address: address,
            items,
        };

        // 7. Confirmation email, also best-effort.
        best_effort(
            CheckoutState::Confirmed,
            cancel,
            progress,
            self.email.send_order_confirmation(&email, &order),
        )
        .await;

        Ok(PlaceOrderResponse { order })
    }
}

/// Runs a collaborator call under `cancel`, attributing failures to `step`.
async fn guarded<T, F>(step: CheckoutState, cancel: &CancelSignal, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, ServiceError>>,
{
    match cancel.run(call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(CheckoutError::Service { step, source }),
        Err(Canceled) => Err(CheckoutError::Canceled { step }),
    }
}

/// Like [`guarded`], but nothing is returned: service failures and
/// cancellation are recorded as warnings on `progress`.
///
/// A call still pending when cancellation fires is dropped.
async fn best_effort<F>(
    step: CheckoutState,
    cancel: &CancelSignal,
    progress: &mut CheckoutProgress,
    call: F,
) where
    F: Future<Output = std::result::Result<(), ServiceError>>,
{
    debug_assert!(!step.is_required(), "{step} must not be best-effort");

    match guarded(step, cancel, call).await {
        Ok(()) => {}
        Err(CheckoutError::Service { source, .. }) => progress.warn(step, &source),
        Err(_) => progress.warn_canceled(step),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::services::{
        InMemoryCartService, InMemoryCatalogService, InMemoryEmailService,
        InMemoryPaymentService, InMemoryShippingService,
    };
    use common::UserId;
    use domain::{Address, CartItem, CreditCardInfo, Product};

    type TestOrchestrator = OrderOrchestrator<
        InMemoryCartService,
        InMemoryCatalogService,
        InMemoryShippingService,
        InMemoryPaymentService,
        InMemoryEmailService,
    >;

    struct Fixture {
        orchestrator: TestOrchestrator,
        cart: InMemoryCartService,
        catalog: InMemoryCatalogService,
        shipping: InMemoryShippingService,
        payment: InMemoryPaymentService,
        email: InMemoryEmailService,
    }

    async fn setup() -> Fixture {
        let cart = InMemoryCartService::new();
        let catalog = InMemoryCatalogService::with_products([
            Product::new("P1", "Mug", Money::new("USD", 2, 500_000_000)),
            Product::new("P2", "Tote", Money::new("USD", 1, 0)),
        ]);
        let shipping = InMemoryShippingService::new();
        shipping.set_quote(Money::new("USD", 0, 990_000_000)).await;
        let payment = InMemoryPaymentService::new();
        let email = InMemoryEmailService::new();

        let orchestrator = OrderOrchestrator::new(
            cart.clone(),
            catalog.clone(),
            shipping.clone(),
            payment.clone(),
            email.clone(),
        );

        Fixture {
            orchestrator,
            cart,
            catalog,
            shipping,
            payment,
            email,
        }
    }

    fn request(user: &str) -> PlaceOrderRequest {
        PlaceOrderRequest {
            user_id: UserId::new(user),
            user_currency: "USD".to_string(),
            address: Address {
                street_address: "1600 Amphitheatre Parkway".to_string(),
                city: "Mountain View".to_string(),
                state: "CA".to_string(),
                country: "US".to_string(),
                zip_code: "94043".to_string(),
            },
            email: "someone@example.com".to_string(),
            credit_card: CreditCardInfo {
                credit_card_number: "4432801561520454".to_string(),
                credit_card_cvv: 672,
                credit_card_expiration_year: 2030,
                credit_card_expiration_month: 1,
            },
        }
    }

    async fn fill_cart(fixture: &Fixture, user: &str) {
        let user = UserId::new(user);
        fixture.cart.add_item(&user, CartItem::new("P1", 1)).await;
        fixture.cart.add_item(&user, CartItem::new("P2", 1)).await;
    }

    #[tokio::test]
    async fn test_happy_path() {
        let fixture = setup().await;
        fill_cart(&fixture, "u1").await;

        let run = fixture
            .orchestrator
            .place_order_tracked(request("u1"), &CancelSignal::never())
            .await;
        let order = run.result.unwrap().order;

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.shipping_cost, Money::new("USD", 0, 990_000_000));
        assert_eq!(order.shipping_address.zip_code, "94043");
        assert_eq!(order.order_id, run.progress.order_id());
        assert_eq!(run.progress.tracking_id(), Some(order.shipping_tracking_id.as_str()));
        assert!(fixture.shipping.has_shipment(&order.shipping_tracking_id).await);

        assert_eq!(
            fixture.payment.charged_amounts().await,
            vec![Money::new("USD", 4, 490_000_000)]
        );
        assert!(fixture.cart.items(&UserId::new("u1")).await.is_empty());
        assert_eq!(fixture.email.sent().await.len(), 1);

        assert_eq!(run.progress.state(), CheckoutState::Confirmed);
        assert_eq!(run.progress.history().len(), 9);
        assert!(run.progress.warnings().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_product_fails_before_payment() {
        let fixture = setup().await;
        let user = UserId::new("u1");
        fixture.cart.add_item(&user, CartItem::new("P1", 1)).await;
        fixture.cart.add_item(&user, CartItem::new("GONE", 1)).await;

        let run = fixture
            .orchestrator
            .place_order_tracked(request("u1"), &CancelSignal::never())
            .await;
        let err = run.result.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.origin_kind(), ErrorKind::UpstreamError);
        assert_eq!(err.step(), CheckoutState::ItemsPriced);
        assert_eq!(run.progress.state(), CheckoutState::Failed);
        assert_eq!(fixture.payment.payment_count().await, 0);
        assert_eq!(fixture.cart.items(&user).await.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_price_surfaces_as_internal() {
        let fixture = setup().await;
        fixture
            .catalog
            .replace_products([Product::new("BAD", "Broken", Money::new("USD", 1, -1))])
            .await;
        fixture
            .cart
            .add_item(&UserId::new("u1"), CartItem::new("BAD", 1))
            .await;

        let err = fixture
            .orchestrator
            .place_order(request("u1"), &CancelSignal::never())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.origin_kind(), ErrorKind::InvalidValue);
        assert!(matches!(err, CheckoutError::Money { .. }));
        assert_eq!(fixture.payment.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_cart_clear_failure_is_a_warning() {
        let fixture = setup().await;
        fill_cart(&fixture, "u1").await;
        fixture.cart.set_fail_on_empty(true).await;

        let run = fixture
            .orchestrator
            .place_order_tracked(request("u1"), &CancelSignal::never())
            .await;

        assert!(run.result.is_ok());
        assert_eq!(run.progress.state(), CheckoutState::Confirmed);
        assert_eq!(run.progress.warnings().len(), 1);
        assert_eq!(run.progress.warnings()[0].step, CheckoutState::CartEmptied);
        assert_eq!(fixture.cart.items(&UserId::new("u1")).await.len(), 2);
    }

    #[tokio::test]
    async fn test_canceled_before_start() {
        let fixture = setup().await;
        fill_cart(&fixture, "u1").await;
        let (handle, signal) = CancelSignal::new();
        handle.cancel();

        let err = fixture
            .orchestrator
            .place_order(request("u1"), &signal)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Canceled);
        assert_eq!(err.step(), CheckoutState::CartFetched);
        assert_eq!(fixture.payment.payment_count().await, 0);
    }
}
