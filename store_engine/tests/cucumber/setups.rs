use cucumber::given;

use crate::{cucumber::StoreWorld, support::TestEngine};

#[given("a fresh install")]
async fn fresh_database(world: &mut StoreWorld) {
    world.engine = Some(TestEngine::new().await);
}

#[given(expr = "a product {string} priced at {int} cents with {int} in stock")]
async fn add_product(world: &mut StoreWorld, name: String, price: i64, stock: i64) {
    let product = world.engine().add_product(&name, price, stock).await;
    world.products.insert(name, product.id);
}
