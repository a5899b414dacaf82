use billing_server::db::{DbService, Repositories};
use billing_server::services::ReconciliationError;
use billing_server::{Config, ErrorCode, ServerState};
use rust_decimal::Decimal;
use shared::models::{
    CustomerCreate, PeopleCreate, PresentationCreate, RewardCreate, RewardType, StockUpdate,
};
use tempfile::TempDir;

async fn sqlite_state() -> (TempDir, ServerState) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("billing.db");
    let db = DbService::new(path.to_str().unwrap()).await.unwrap();
    let state = ServerState::with_repositories(Config::default(), Repositories::sqlite(db.pool));
    state.categories.seed_defaults().await.unwrap();
    (dir, state)
}

async fn category_id(state: &ServerState, name: &str) -> i64 {
    state
        .repos
        .categories
        .find_by_name(name)
        .await
        .unwrap()
        .unwrap()
        .id
}

fn ana(category_id: i64) -> CustomerCreate {
    CustomerCreate {
        people: PeopleCreate {
            first_name: "Ana".into(),
            ruc_ci: Some("0911111111".into()),
            main_email: Some("ana@example.com".into()),
            ..Default::default()
        },
        customer_category_id: category_id,
        preferred_payment_method: None,
    }
}

#[tokio::test]
async fn seeded_categories_keep_exact_decimals() {
    let (_dir, state) = sqlite_state().await;
    let categories = state.categories.find_all().await.unwrap();
    assert_eq!(categories.len(), 4);

    let empresas = categories.iter().find(|c| c.name == "Empresas").unwrap();
    assert_eq!(empresas.points_multiplier, Decimal::new(15, 1));
    assert_eq!(empresas.discount_percentage, Decimal::from(15));

    // Seeding twice is a no-op
    assert_eq!(state.categories.seed_defaults().await.unwrap(), 0);
}

#[tokio::test]
async fn reconciliation_on_sqlite() {
    let (_dir, state) = sqlite_state().await;
    let category = category_id(&state, "Usuario Final").await;

    let first = state.customers.create(ana(category)).await.unwrap();
    let err = state.customers.create(ana(category)).await.unwrap_err();
    assert!(matches!(err, ReconciliationError::AlreadyExists(ref e) if e.customer.id == first.id));

    // Email collision with another RUC/CI is found by the email fallback
    let mut other = ana(category);
    other.people.ruc_ci = Some("0922222222".into());
    let err = state.customers.create(other).await.unwrap_err();
    assert!(matches!(err, ReconciliationError::AlreadyExists(_)));

    assert_eq!(state.people.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unique_index_surfaces_as_duplicate_entry() {
    let (_dir, state) = sqlite_state().await;
    let data = PeopleCreate {
        first_name: "Luis".into(),
        ruc_ci: Some("0933333333".into()),
        ..Default::default()
    };
    state.people.create(data.clone()).await.unwrap();
    let err = state.people.create(data).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateEntry);
}

#[tokio::test]
async fn guarded_points_and_redemption() {
    let (_dir, state) = sqlite_state().await;
    let category = category_id(&state, "Usuario Final").await;
    let customer = state.customers.create(ana(category)).await.unwrap();

    state.loyalty.update_points(customer.id, 30).await.unwrap();
    let err = state
        .loyalty
        .update_points(customer.id, -50)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientPoints);
    let customer = state.loyalty.update_points(customer.id, 20).await.unwrap();
    assert_eq!(customer.loyalty_points, 50);

    let reward = state
        .rewards
        .create(RewardCreate {
            name: "Descuento $2".into(),
            description: None,
            reward_type: RewardType::Discount,
            points_cost: 40,
            discount_value: Some(Decimal::new(200, 2)),
            presentation_id: None,
            stock: Some(1),
            valid_from: None,
            valid_until: None,
            image_url: None,
            terms: None,
            active: None,
        })
        .await
        .unwrap();
    assert_eq!(reward.discount_value, Some(Decimal::from(2)));

    let now = shared::util::now_millis();
    let redemption = state.loyalty.redeem(customer.id, reward.id, now).await.unwrap();
    assert_eq!(redemption.customer.loyalty_points, 10);
    assert_eq!(redemption.reward.stock, 0);

    let err = state
        .loyalty
        .redeem(customer.id, reward.id, now)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    let history = state.loyalty.loyalty_history(customer.id).await.unwrap();
    assert_eq!(history.current_points, 10);
    assert_eq!(history.transactions.len(), 3);
    assert_eq!(history.total_redeemed, 40);
}

#[tokio::test]
async fn presentation_stock_and_soft_delete() {
    let (_dir, state) = sqlite_state().await;
    let presentation = state
        .presentations
        .create(PresentationCreate {
            product_id: 7,
            name: "Agua 500ml".into(),
            barcode: "7861000000017".into(),
            quantity: None,
            cost_price: Decimal::new(35, 2),
            last_cost_price: None,
            average_cost_price: None,
            sale_price: Decimal::new(60, 2),
            stock: Some(3),
            min_stock: Some(5),
            max_stock: None,
            active: None,
        })
        .await
        .unwrap();
    assert_eq!(presentation.quantity, 1);
    assert_eq!(presentation.sale_price, Decimal::new(60, 2));
    assert_eq!(state.presentations.low_stock().await.unwrap().len(), 1);

    let err = state
        .presentations
        .update_stock(presentation.id, StockUpdate { quantity: -4, reason: None })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    let updated = state
        .presentations
        .update_stock(presentation.id, StockUpdate { quantity: 10, reason: Some("Compra".into()) })
        .await
        .unwrap();
    assert_eq!(updated.stock, 13);
    assert!(state.presentations.low_stock().await.unwrap().is_empty());

    assert!(state.presentations.delete(presentation.id).await.unwrap());
    assert!(state.presentations.find_by_product(7).await.unwrap().is_empty());
    assert!(!state.presentations.find_one(presentation.id).await.unwrap().active);
}
