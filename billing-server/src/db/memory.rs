//! In-memory store
//!
//! Implements every repository trait over `parking_lot`-guarded maps. Unique
//! keys mirror the SQLite schema (RUC/CI, email, one customer per person,
//! category name, barcode). Each trait call holds the write lock for its whole
//! duration, so guarded balances are checked and written atomically.

use super::repository::{
    ActivationRepository, CustomerCategoryRepository, CustomerRepository, LoyaltyRepository,
    NewCustomer, PeopleRepository, PresentationRepository, RepoError, RepoResult,
    RewardRepository, customer as customer_repo, presentation as presentation_repo,
    reward as reward_repo,
};
use crate::loyalty::apply_delta;
use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::models::{
    Activatable, Customer, CustomerCategory, CustomerCategoryCreate, CustomerCategoryUpdate,
    CustomerUpdate, LoyaltyTransaction, LoyaltyTransactionCreate, People, PeopleCreate,
    PeopleUpdate, Presentation, PresentationCreate, PresentationUpdate, Reward, RewardCreate,
    RewardUpdate,
};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Default)]
struct Tables {
    people: BTreeMap<i64, People>,
    categories: BTreeMap<i64, CustomerCategory>,
    customers: BTreeMap<i64, Customer>,
    rewards: BTreeMap<i64, Reward>,
    presentations: BTreeMap<i64, Presentation>,
    transactions: Vec<LoyaltyTransaction>,
}

/// Unique id even when several rows are created within one millisecond
fn next_id<V>(map: &BTreeMap<i64, V>) -> i64 {
    let id = shared::util::snowflake_id();
    match map.keys().next_back() {
        Some(&last) if last >= id => last + 1,
        _ => id,
    }
}

fn same_text(stored: &Option<String>, candidate: &str) -> bool {
    stored.as_deref() == Some(candidate)
}

impl Tables {
    fn check_people_unique(
        &self,
        skip_id: Option<i64>,
        ruc_ci: Option<&str>,
        email: Option<&str>,
    ) -> RepoResult<()> {
        for p in self.people.values().filter(|p| Some(p.id) != skip_id) {
            if let Some(ruc) = ruc_ci
                && same_text(&p.ruc_ci, ruc)
            {
                return Err(RepoError::Duplicate(format!("people.ruc_ci {ruc}")));
            }
            if let Some(mail) = email
                && same_text(&p.main_email, mail)
            {
                return Err(RepoError::Duplicate(format!("people.main_email {mail}")));
            }
        }
        Ok(())
    }

    fn check_category_name(&self, skip_id: Option<i64>, name: &str) -> RepoResult<()> {
        if self
            .categories
            .values()
            .any(|c| Some(c.id) != skip_id && c.name == name)
        {
            return Err(RepoError::Duplicate(format!("customer_category.name {name}")));
        }
        Ok(())
    }

    fn insufficient(resource: &'static str) -> impl Fn(crate::loyalty::BalanceError) -> RepoError {
        move |e| RepoError::from_balance(resource, e)
    }
}

/// In-memory implementation of every repository trait
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PeopleRepository for MemoryStore {
    async fn find_all(&self) -> RepoResult<Vec<People>> {
        let tables = self.tables.read();
        let mut rows: Vec<People> = tables.people.values().cloned().collect();
        rows.sort_by(|a, b| b.date_registered.cmp(&a.date_registered).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<People>> {
        Ok(self.tables.read().people.get(&id).cloned())
    }

    async fn find_by_ruc_ci(&self, ruc_ci: &str) -> RepoResult<Option<People>> {
        let tables = self.tables.read();
        Ok(tables
            .people
            .values()
            .find(|p| same_text(&p.ruc_ci, ruc_ci))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<People>> {
        let tables = self.tables.read();
        Ok(tables
            .people
            .values()
            .find(|p| same_text(&p.main_email, email))
            .cloned())
    }

    async fn create(&self, data: &PeopleCreate) -> RepoResult<People> {
        let mut tables = self.tables.write();
        tables.check_people_unique(None, data.ruc_ci.as_deref(), data.main_email.as_deref())?;
        let person = People {
            id: next_id(&tables.people),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            ruc_ci: data.ruc_ci.clone(),
            birth_date: data.birth_date.clone(),
            main_email: data.main_email.clone(),
            phone: data.phone.clone(),
            address: data.address.clone(),
            person_type: data.person_type,
            identity_type: data.identity_type,
            date_registered: shared::util::now_millis(),
        };
        tables.people.insert(person.id, person.clone());
        Ok(person)
    }

    async fn update(&self, id: i64, data: &PeopleUpdate) -> RepoResult<People> {
        let mut tables = self.tables.write();
        if !tables.people.contains_key(&id) {
            return Err(RepoError::NotFound(format!("People {id} not found")));
        }
        tables.check_people_unique(Some(id), None, data.main_email.as_deref())?;
        let person = tables
            .people
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(format!("People {id} not found")))?;
        if let Some(v) = &data.first_name {
            person.first_name = v.clone();
        }
        if let Some(v) = &data.last_name {
            person.last_name = Some(v.clone());
        }
        if let Some(v) = &data.birth_date {
            person.birth_date = Some(v.clone());
        }
        if let Some(v) = &data.main_email {
            person.main_email = Some(v.clone());
        }
        if let Some(v) = &data.phone {
            person.phone = Some(v.clone());
        }
        if let Some(v) = &data.address {
            person.address = Some(v.clone());
        }
        if let Some(v) = data.person_type {
            person.person_type = v;
        }
        if let Some(v) = data.identity_type {
            person.identity_type = v;
        }
        Ok(person.clone())
    }
}

#[async_trait]
impl CustomerCategoryRepository for MemoryStore {
    async fn find_all(&self) -> RepoResult<Vec<CustomerCategory>> {
        let tables = self.tables.read();
        let mut rows: Vec<CustomerCategory> =
            tables.categories.values().filter(|c| c.active).cloned().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<CustomerCategory>> {
        Ok(self.tables.read().categories.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> RepoResult<Option<CustomerCategory>> {
        let tables = self.tables.read();
        Ok(tables.categories.values().find(|c| c.name == name).cloned())
    }

    async fn create(&self, data: &CustomerCategoryCreate) -> RepoResult<CustomerCategory> {
        let mut tables = self.tables.write();
        tables.check_category_name(None, &data.name)?;
        let now = shared::util::now_millis();
        let category = CustomerCategory {
            id: next_id(&tables.categories),
            name: data.name.clone(),
            discount_percentage: data.discount_percentage,
            points_multiplier: data.points_multiplier,
            ticket_threshold: data.ticket_threshold,
            color: data.color.clone(),
            active: data.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        tables.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update(&self, id: i64, data: &CustomerCategoryUpdate) -> RepoResult<CustomerCategory> {
        let mut tables = self.tables.write();
        if let Some(name) = &data.name {
            tables.check_category_name(Some(id), name)?;
        }
        let category = tables
            .categories
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(format!("Customer category {id} not found")))?;
        if let Some(v) = &data.name {
            category.name = v.clone();
        }
        if let Some(v) = data.discount_percentage {
            category.discount_percentage = v;
        }
        if let Some(v) = data.points_multiplier {
            category.points_multiplier = v;
        }
        if let Some(v) = data.ticket_threshold {
            category.ticket_threshold = v;
        }
        if let Some(v) = &data.color {
            category.color = Some(v.clone());
        }
        if let Some(v) = data.active {
            category.active = v;
        }
        category.updated_at = shared::util::now_millis();
        Ok(category.clone())
    }
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn find_all(&self) -> RepoResult<Vec<Customer>> {
        let tables = self.tables.read();
        let mut rows: Vec<Customer> =
            tables.customers.values().filter(|c| c.active).cloned().collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Customer>> {
        Ok(self.tables.read().customers.get(&id).cloned())
    }

    async fn find_by_people(&self, people_id: i64) -> RepoResult<Option<Customer>> {
        let tables = self.tables.read();
        Ok(tables
            .customers
            .values()
            .find(|c| c.people_id == people_id)
            .cloned())
    }

    async fn top_by_purchases(&self, limit: i64) -> RepoResult<Vec<Customer>> {
        let tables = self.tables.read();
        let mut rows: Vec<Customer> =
            tables.customers.values().filter(|c| c.active).cloned().collect();
        rows.sort_by(|a, b| {
            b.total_purchases
                .cmp(&a.total_purchases)
                .then(a.created_at.cmp(&b.created_at))
        });
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn create(&self, data: &NewCustomer) -> RepoResult<Customer> {
        let mut tables = self.tables.write();
        if !tables.people.contains_key(&data.people_id) {
            return Err(RepoError::Validation(format!(
                "People {} does not exist",
                data.people_id
            )));
        }
        if !tables.categories.contains_key(&data.customer_category_id) {
            return Err(RepoError::Validation(format!(
                "Customer category {} does not exist",
                data.customer_category_id
            )));
        }
        if tables.customers.values().any(|c| c.people_id == data.people_id) {
            return Err(RepoError::Duplicate(format!(
                "customer.people_id {}",
                data.people_id
            )));
        }
        let now = shared::util::now_millis();
        let customer = Customer {
            id: next_id(&tables.customers),
            people_id: data.people_id,
            customer_category_id: data.customer_category_id,
            loyalty_points: 0,
            total_purchases: Decimal::ZERO,
            last_purchase_date: None,
            preferred_payment_method: data.preferred_payment_method.clone(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        tables.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn update(&self, id: i64, data: &CustomerUpdate) -> RepoResult<Customer> {
        let mut tables = self.tables.write();
        if let Some(category_id) = data.customer_category_id
            && !tables.categories.contains_key(&category_id)
        {
            return Err(RepoError::Validation(format!(
                "Customer category {category_id} does not exist"
            )));
        }
        let customer = tables
            .customers
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))?;
        if let Some(v) = data.customer_category_id {
            customer.customer_category_id = v;
        }
        if let Some(v) = &data.preferred_payment_method {
            customer.preferred_payment_method = Some(v.clone());
        }
        if let Some(v) = data.active {
            customer.active = v;
        }
        customer.updated_at = shared::util::now_millis();
        Ok(customer.clone())
    }
}

#[async_trait]
impl RewardRepository for MemoryStore {
    async fn find_all(&self) -> RepoResult<Vec<Reward>> {
        let tables = self.tables.read();
        let mut rows: Vec<Reward> = tables.rewards.values().filter(|r| r.active).cloned().collect();
        rows.sort_by_key(|r| r.points_cost);
        Ok(rows)
    }

    async fn find_available(&self, now: i64) -> RepoResult<Vec<Reward>> {
        let tables = self.tables.read();
        let mut rows: Vec<Reward> = tables
            .rewards
            .values()
            .filter(|r| r.is_available_at(now))
            .cloned()
            .collect();
        rows.sort_by_key(|r| r.points_cost);
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Reward>> {
        Ok(self.tables.read().rewards.get(&id).cloned())
    }

    async fn create(&self, data: &RewardCreate) -> RepoResult<Reward> {
        let mut tables = self.tables.write();
        if let Some(pid) = data.presentation_id
            && !tables.presentations.contains_key(&pid)
        {
            return Err(RepoError::Validation(format!("Presentation {pid} does not exist")));
        }
        let now = shared::util::now_millis();
        let reward = Reward {
            id: next_id(&tables.rewards),
            name: data.name.clone(),
            description: data.description.clone(),
            reward_type: data.reward_type,
            points_cost: data.points_cost,
            discount_value: data.discount_value,
            presentation_id: data.presentation_id,
            stock: data.stock.unwrap_or(0),
            valid_from: data.valid_from,
            valid_until: data.valid_until,
            image_url: data.image_url.clone(),
            terms: data.terms.clone(),
            active: data.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        tables.rewards.insert(reward.id, reward.clone());
        Ok(reward)
    }

    async fn update(&self, id: i64, data: &RewardUpdate) -> RepoResult<Reward> {
        let mut tables = self.tables.write();
        let reward = tables
            .rewards
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(format!("Reward {id} not found")))?;
        if let Some(v) = &data.name {
            reward.name = v.clone();
        }
        if let Some(v) = &data.description {
            reward.description = Some(v.clone());
        }
        if let Some(v) = data.reward_type {
            reward.reward_type = v;
        }
        if let Some(v) = data.points_cost {
            reward.points_cost = v;
        }
        if data.discount_value.is_some() {
            reward.discount_value = data.discount_value;
        }
        if data.presentation_id.is_some() {
            reward.presentation_id = data.presentation_id;
        }
        if let Some(v) = data.stock {
            reward.stock = v;
        }
        if data.valid_from.is_some() {
            reward.valid_from = data.valid_from;
        }
        if data.valid_until.is_some() {
            reward.valid_until = data.valid_until;
        }
        if let Some(v) = &data.image_url {
            reward.image_url = Some(v.clone());
        }
        if let Some(v) = &data.terms {
            reward.terms = Some(v.clone());
        }
        if let Some(v) = data.active {
            reward.active = v;
        }
        reward.updated_at = shared::util::now_millis();
        Ok(reward.clone())
    }

    async fn adjust_stock(&self, id: i64, delta: i64) -> RepoResult<Reward> {
        let mut tables = self.tables.write();
        let reward = tables
            .rewards
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(format!("Reward {id} not found")))?;
        reward.stock =
            apply_delta(reward.stock, delta).map_err(Tables::insufficient(reward_repo::RESOURCE))?;
        reward.updated_at = shared::util::now_millis();
        Ok(reward.clone())
    }
}

#[async_trait]
impl PresentationRepository for MemoryStore {
    async fn find_by_product(&self, product_id: i64) -> RepoResult<Vec<Presentation>> {
        let tables = self.tables.read();
        let mut rows: Vec<Presentation> = tables
            .presentations
            .values()
            .filter(|p| p.product_id == product_id && p.active)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> RepoResult<Option<Presentation>> {
        Ok(self.tables.read().presentations.get(&id).cloned())
    }

    async fn find_by_barcode(&self, barcode: &str) -> RepoResult<Option<Presentation>> {
        let tables = self.tables.read();
        Ok(tables
            .presentations
            .values()
            .find(|p| p.barcode == barcode)
            .cloned())
    }

    async fn find_low_stock(&self) -> RepoResult<Vec<Presentation>> {
        let tables = self.tables.read();
        let mut rows: Vec<Presentation> = tables
            .presentations
            .values()
            .filter(|p| p.active && p.is_low_stock())
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.stock);
        Ok(rows)
    }

    async fn create(&self, data: &PresentationCreate) -> RepoResult<Presentation> {
        let mut tables = self.tables.write();
        if tables.presentations.values().any(|p| p.barcode == data.barcode) {
            return Err(RepoError::Duplicate(format!(
                "presentation.barcode {}",
                data.barcode
            )));
        }
        let now = shared::util::now_millis();
        let presentation = Presentation {
            id: next_id(&tables.presentations),
            product_id: data.product_id,
            name: data.name.clone(),
            barcode: data.barcode.clone(),
            quantity: data.quantity.unwrap_or(1),
            cost_price: data.cost_price,
            last_cost_price: data.last_cost_price,
            average_cost_price: data.average_cost_price,
            sale_price: data.sale_price,
            stock: data.stock.unwrap_or(0),
            min_stock: data.min_stock.unwrap_or(0),
            max_stock: data.max_stock,
            active: data.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        tables.presentations.insert(presentation.id, presentation.clone());
        Ok(presentation)
    }

    async fn update(&self, id: i64, data: &PresentationUpdate) -> RepoResult<Presentation> {
        let mut tables = self.tables.write();
        let presentation = tables
            .presentations
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(format!("Presentation {id} not found")))?;
        if let Some(v) = &data.name {
            presentation.name = v.clone();
        }
        if let Some(v) = data.quantity {
            presentation.quantity = v;
        }
        if let Some(v) = data.cost_price {
            presentation.cost_price = v;
        }
        if data.last_cost_price.is_some() {
            presentation.last_cost_price = data.last_cost_price;
        }
        if data.average_cost_price.is_some() {
            presentation.average_cost_price = data.average_cost_price;
        }
        if let Some(v) = data.sale_price {
            presentation.sale_price = v;
        }
        if let Some(v) = data.min_stock {
            presentation.min_stock = v;
        }
        if data.max_stock.is_some() {
            presentation.max_stock = data.max_stock;
        }
        if let Some(v) = data.active {
            presentation.active = v;
        }
        presentation.updated_at = shared::util::now_millis();
        Ok(presentation.clone())
    }

    async fn adjust_stock(&self, id: i64, delta: i64) -> RepoResult<Presentation> {
        let mut tables = self.tables.write();
        let presentation = tables
            .presentations
            .get_mut(&id)
            .ok_or_else(|| RepoError::NotFound(format!("Presentation {id} not found")))?;
        presentation.stock = apply_delta(presentation.stock, delta)
            .map_err(Tables::insufficient(presentation_repo::RESOURCE))?;
        presentation.updated_at = shared::util::now_millis();
        Ok(presentation.clone())
    }
}

#[async_trait]
impl LoyaltyRepository for MemoryStore {
    async fn apply_points(
        &self,
        entry: &LoyaltyTransactionCreate,
    ) -> RepoResult<(Customer, LoyaltyTransaction)> {
        let mut tables = self.tables.write();
        let now = shared::util::now_millis();
        let id = shared::util::snowflake_id();
        let customer = tables
            .customers
            .get_mut(&entry.customer_id)
            .ok_or_else(|| RepoError::NotFound(format!("Customer {} not found", entry.customer_id)))?;
        customer.loyalty_points = apply_delta(customer.loyalty_points, entry.points)
            .map_err(Tables::insufficient(customer_repo::RESOURCE))?;
        customer.updated_at = now;
        let customer = customer.clone();

        let transaction = ledger_entry(id, entry, now);
        tables.transactions.push(transaction.clone());
        Ok((customer, transaction))
    }

    async fn redeem(
        &self,
        entry: &LoyaltyTransactionCreate,
    ) -> RepoResult<(Customer, Reward, LoyaltyTransaction)> {
        let reward_id = entry
            .reward_id
            .ok_or_else(|| RepoError::Validation("Redemption requires a reward".into()))?;
        let mut tables = self.tables.write();

        // Check both balances before touching either
        let points = tables
            .customers
            .get(&entry.customer_id)
            .map(|c| c.loyalty_points)
            .ok_or_else(|| RepoError::NotFound(format!("Customer {} not found", entry.customer_id)))?;
        let stock = tables
            .rewards
            .get(&reward_id)
            .map(|r| r.stock)
            .ok_or_else(|| RepoError::NotFound(format!("Reward {reward_id} not found")))?;
        let points =
            apply_delta(points, entry.points).map_err(Tables::insufficient(customer_repo::RESOURCE))?;
        let stock = apply_delta(stock, -1).map_err(Tables::insufficient(reward_repo::RESOURCE))?;

        let now = shared::util::now_millis();
        let customer = match tables.customers.get_mut(&entry.customer_id) {
            Some(c) => {
                c.loyalty_points = points;
                c.updated_at = now;
                c.clone()
            }
            None => return Err(RepoError::NotFound(format!("Customer {} not found", entry.customer_id))),
        };
        let reward = match tables.rewards.get_mut(&reward_id) {
            Some(r) => {
                r.stock = stock;
                r.updated_at = now;
                r.clone()
            }
            None => return Err(RepoError::NotFound(format!("Reward {reward_id} not found"))),
        };
        let transaction = ledger_entry(shared::util::snowflake_id(), entry, now);
        tables.transactions.push(transaction.clone());
        Ok((customer, reward, transaction))
    }

    async fn recent_transactions(
        &self,
        customer_id: i64,
        limit: Option<i64>,
    ) -> RepoResult<Vec<LoyaltyTransaction>> {
        let tables = self.tables.read();
        // Appended in order, so newest first is a reverse walk
        let rows = tables
            .transactions
            .iter()
            .rev()
            .filter(|t| t.customer_id == customer_id);
        Ok(match limit {
            Some(n) => rows.take(usize::try_from(n).unwrap_or(0)).cloned().collect(),
            None => rows.cloned().collect(),
        })
    }
}

fn ledger_entry(id: i64, entry: &LoyaltyTransactionCreate, now: i64) -> LoyaltyTransaction {
    LoyaltyTransaction {
        id,
        customer_id: entry.customer_id,
        points: entry.points,
        transaction_type: entry.transaction_type,
        description: entry.description.clone(),
        order_id: entry.order_id,
        reward_id: entry.reward_id,
        created_at: now,
    }
}

fn flip<T: Activatable>(row: Option<&mut T>, active: bool) -> bool {
    match row {
        Some(row) => {
            row.set_active(active, shared::util::now_millis());
            true
        }
        None => false,
    }
}

#[async_trait]
impl ActivationRepository for MemoryStore {
    async fn set_active(&self, table: &'static str, id: i64, active: bool) -> RepoResult<bool> {
        super::repository::activation::check_table(table)?;
        let mut tables = self.tables.write();
        let found = if table == Customer::TABLE {
            flip(tables.customers.get_mut(&id), active)
        } else if table == CustomerCategory::TABLE {
            flip(tables.categories.get_mut(&id), active)
        } else if table == Reward::TABLE {
            flip(tables.rewards.get_mut(&id), active)
        } else if table == Presentation::TABLE {
            flip(tables.presentations.get_mut(&id), active)
        } else {
            false
        };
        Ok(found)
    }
}
