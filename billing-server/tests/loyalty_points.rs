use billing_server::db::Repositories;
use billing_server::services::{
    CustomerCategoryService, CustomerService, LoyaltyService, RewardService,
};
use billing_server::ErrorCode;
use rust_decimal::Decimal;
use shared::models::{
    CustomerCreate, LoyaltyTransactionType, PeopleCreate, RewardCreate, RewardType,
};

struct Fixture {
    loyalty: LoyaltyService,
    rewards: RewardService,
    customer_id: i64,
}

async fn fixture(category: &str, points: i64) -> Fixture {
    let repos = Repositories::in_memory();
    CustomerCategoryService::new(repos.clone())
        .seed_defaults()
        .await
        .unwrap();
    let category_id = repos
        .categories
        .find_by_name(category)
        .await
        .unwrap()
        .unwrap()
        .id;
    let customer = CustomerService::new(repos.clone())
        .create(CustomerCreate {
            people: PeopleCreate {
                first_name: "María".into(),
                ruc_ci: Some("1712345678".into()),
                ..Default::default()
            },
            customer_category_id: category_id,
            preferred_payment_method: None,
        })
        .await
        .unwrap();

    let loyalty = LoyaltyService::new(repos.clone());
    if points != 0 {
        loyalty.update_points(customer.id, points).await.unwrap();
    }
    Fixture {
        loyalty,
        rewards: RewardService::new(repos),
        customer_id: customer.id,
    }
}

fn reward(name: &str, cost: i64, stock: i64) -> RewardCreate {
    RewardCreate {
        name: name.into(),
        description: None,
        reward_type: RewardType::Discount,
        points_cost: cost,
        discount_value: Some(Decimal::from(5)),
        presentation_id: None,
        stock: Some(stock),
        valid_from: None,
        valid_until: None,
        image_url: None,
        terms: None,
        active: None,
    }
}

#[tokio::test]
async fn overdraw_is_rejected_and_balance_kept() {
    let f = fixture("Usuario Final", 30).await;

    let err = f
        .loyalty
        .update_points(f.customer_id, -50)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientPoints);

    let history = f.loyalty.loyalty_history(f.customer_id).await.unwrap();
    assert_eq!(history.current_points, 30);
    assert_eq!(history.transactions.len(), 1);
}

#[tokio::test]
async fn credit_is_recorded_as_earned() {
    let f = fixture("Usuario Final", 30).await;

    let customer = f.loyalty.update_points(f.customer_id, 20).await.unwrap();
    assert_eq!(customer.loyalty_points, 50);

    let customer = f.loyalty.update_points(f.customer_id, -50).await.unwrap();
    assert_eq!(customer.loyalty_points, 0);

    let history = f.loyalty.loyalty_history(f.customer_id).await.unwrap();
    let types: Vec<_> = history
        .transactions
        .iter()
        .map(|t| t.transaction_type)
        .collect();
    assert_eq!(
        types,
        vec![
            LoyaltyTransactionType::Adjustment,
            LoyaltyTransactionType::Earned,
            LoyaltyTransactionType::Earned,
        ]
    );
    assert_eq!(history.total_earned, 50);
}

#[tokio::test]
async fn vip_purchase_preview() {
    // Cliente VIP: threshold $5, multiplier 2, discount 10%
    let f = fixture("Cliente VIP", 0).await;
    let preview = f
        .loyalty
        .points_preview(f.customer_id, Decimal::from(50))
        .await
        .unwrap();
    assert_eq!(preview.base_points, 10);
    assert_eq!(preview.points, 20);
    assert_eq!(preview.discount, Decimal::from(5));
}

#[tokio::test]
async fn redemption_moves_points_and_stock_together() {
    let f = fixture("Usuario Final", 150).await;
    let coffee = f.rewards.create(reward("Café", 100, 1)).await.unwrap();

    let redemption = f
        .loyalty
        .redeem(f.customer_id, coffee.id, shared::util::now_millis())
        .await
        .unwrap();
    assert_eq!(redemption.customer.loyalty_points, 50);
    assert_eq!(redemption.reward.stock, 0);

    // Out of stock now, and the rejected attempt changes nothing
    let err = f
        .loyalty
        .redeem(f.customer_id, coffee.id, shared::util::now_millis())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    let history = f.loyalty.loyalty_history(f.customer_id).await.unwrap();
    assert_eq!(history.current_points, 50);
    assert_eq!(history.total_redeemed, 100);
}

#[tokio::test]
async fn available_rewards_respect_window_and_order() {
    let f = fixture("Usuario Final", 0).await;
    let now = 1_700_000_000_000;

    f.rewards.create(reward("Caro", 300, 5)).await.unwrap();
    f.rewards.create(reward("Barato", 50, 5)).await.unwrap();

    let mut expired = reward("Vencido", 10, 5);
    expired.valid_until = Some(now - 1);
    f.rewards.create(expired).await.unwrap();

    let mut upcoming = reward("Próximo", 20, 5);
    upcoming.valid_from = Some(now + 1);
    f.rewards.create(upcoming).await.unwrap();

    let mut today = reward("Hoy", 100, 5);
    today.valid_from = Some(now);
    today.valid_until = Some(now);
    f.rewards.create(today).await.unwrap();

    let inactive = f.rewards.create(reward("Inactivo", 5, 5)).await.unwrap();
    f.rewards.delete(inactive.id).await.unwrap();

    let names: Vec<String> = f
        .rewards
        .find_available(now)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["Barato", "Hoy", "Caro"]);
}
